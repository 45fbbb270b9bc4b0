mod fine;
mod id;
mod status;
mod time;
mod transition;

pub use self::{fine::*, id::*, status::*, time::*, transition::*};
use crate::entity::{BookId, CreatedAt, UserId};
use crate::KernelError;
use ::time::{Duration, OffsetDateTime};
use destructure::Destructure;
use vodca::References;

/// How long an issued copy may stay out before it starts accruing a fine.
pub const LOAN_PERIOD: Duration = Duration::days(14);

/// Upper bound on a student's records in [`BorrowStatus::LIMITED`].
pub const MAX_ACTIVE_BORROWS: i64 = 4;

/// One student's claim on one copy of a book, tracked from request to return.
#[derive(Debug, Clone, Eq, PartialEq, References, Destructure)]
pub struct Borrow {
    id: BorrowId,
    book_id: BookId,
    user_id: UserId,
    status: BorrowStatus,
    requested_at: CreatedAt<Borrow>,
    issued_at: Option<IssuedAt>,
    due_at: DueAt,
    returned_at: Option<ReturnedAt>,
    approved_by: Option<UserId>,
}

impl Borrow {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: BorrowId,
        book_id: BookId,
        user_id: UserId,
        status: BorrowStatus,
        requested_at: CreatedAt<Borrow>,
        issued_at: Option<IssuedAt>,
        due_at: DueAt,
        returned_at: Option<ReturnedAt>,
        approved_by: Option<UserId>,
    ) -> Self {
        Self {
            id,
            book_id,
            user_id,
            status,
            requested_at,
            issued_at,
            due_at,
            returned_at,
            approved_by,
        }
    }

    /// A new record in the initial `Requested` state.
    pub fn request(id: BorrowId, book_id: BookId, user_id: UserId, now: OffsetDateTime) -> Self {
        Self::new(
            id,
            book_id,
            user_id,
            BorrowStatus::Requested,
            CreatedAt::new(now),
            None,
            DueAt::new(now + LOAN_PERIOD),
            None,
            None,
        )
    }

    pub fn approve_issue(
        self,
        approver: &UserId,
        now: OffsetDateTime,
    ) -> error_stack::Result<Self, KernelError> {
        let status = self.status.advance(BorrowTransition::ApproveIssue)?;
        Ok(self.reconstruct(|borrow| {
            borrow.status = status;
            borrow.issued_at = Some(IssuedAt::new(now));
            borrow.due_at = DueAt::new(now + LOAN_PERIOD);
            borrow.approved_by = Some(approver.clone());
        }))
    }

    pub fn request_return(self) -> error_stack::Result<Self, KernelError> {
        let status = self.status.advance(BorrowTransition::RequestReturn)?;
        Ok(self.reconstruct(|borrow| borrow.status = status))
    }

    pub fn approve_return(
        self,
        approver: &UserId,
        now: OffsetDateTime,
    ) -> error_stack::Result<Self, KernelError> {
        let status = self.status.advance(BorrowTransition::ApproveReturn)?;
        Ok(self.reconstruct(|borrow| {
            borrow.status = status;
            borrow.returned_at = Some(ReturnedAt::new(now));
            borrow.approved_by = Some(approver.clone());
        }))
    }

    pub fn reject_return(self) -> error_stack::Result<Self, KernelError> {
        let status = self.status.advance(BorrowTransition::RejectReturn)?;
        Ok(self.reconstruct(|borrow| borrow.status = status))
    }

    /// Fine owed on this record as of `now`; requests that were never issued owe nothing.
    pub fn fine(&self, now: OffsetDateTime) -> Fine {
        match self.status {
            BorrowStatus::Requested => Fine::default(),
            BorrowStatus::Issued | BorrowStatus::RequestedReturn => Fine::assess(&self.due_at, now),
            BorrowStatus::Returned => {
                let settled_at = self
                    .returned_at
                    .map(|returned_at| *returned_at.as_ref())
                    .unwrap_or(now);
                Fine::assess(&self.due_at, settled_at)
            }
        }
    }
}
