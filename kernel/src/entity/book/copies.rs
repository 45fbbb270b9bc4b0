use serde::{Deserialize, Serialize};

use crate::{KernelError, Rejection};

/// Physical copies of one title.
///
/// `0 <= available <= total` holds for every value of this type; the only ways to
/// move `available` are [`BookCopies::check_out`] and [`BookCopies::check_in`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct BookCopies {
    total: i32,
    available: i32,
}

impl BookCopies {
    /// A freshly catalogued title with every copy on the shelf.
    pub fn stocked(total: i32) -> error_stack::Result<Self, KernelError> {
        if total < 0 {
            return Err(KernelError::Conflict.because("Total copies cannot be negative"));
        }
        Ok(Self {
            total,
            available: total,
        })
    }

    /// Rebuilds counts read back from storage.
    pub fn restore(total: i32, available: i32) -> error_stack::Result<Self, KernelError> {
        if total < 0 || available < 0 || available > total {
            return Err(KernelError::Internal.because(format!(
                "Stored copy counts are inconsistent (total: {total}, available: {available})"
            )));
        }
        Ok(Self { total, available })
    }

    pub fn total(&self) -> i32 {
        self.total
    }

    pub fn available(&self) -> i32 {
        self.available
    }

    pub fn on_loan(&self) -> i32 {
        self.total - self.available
    }

    pub fn check_out(&self) -> error_stack::Result<Self, KernelError> {
        if self.available < 1 {
            return Err(KernelError::Conflict.because("No available copies"));
        }
        Ok(Self {
            total: self.total,
            available: self.available - 1,
        })
    }

    pub fn check_in(&self) -> error_stack::Result<Self, KernelError> {
        if self.available >= self.total {
            return Err(KernelError::Internal.because("Every copy is already on the shelf"));
        }
        Ok(Self {
            total: self.total,
            available: self.available + 1,
        })
    }

    /// Changes the number of owned copies while keeping the copies on loan untouched.
    pub fn resize(&self, total: i32) -> error_stack::Result<Self, KernelError> {
        let on_loan = self.on_loan();
        if total < on_loan {
            return Err(KernelError::Conflict.because(format!(
                "{on_loan} copies are on loan, total copies cannot drop below that"
            )));
        }
        Ok(Self {
            total,
            available: total - on_loan,
        })
    }
}
