use std::fmt::{Display, Formatter};

/// Every change a borrow record can go through.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum BorrowTransition {
    RequestIssue,
    ApproveIssue,
    RequestReturn,
    ApproveReturn,
    RejectReturn,
}

impl BorrowTransition {
    /// Change applied to the book's available copies in the same unit of work.
    pub fn copy_delta(&self) -> i32 {
        match self {
            BorrowTransition::ApproveIssue => -1,
            BorrowTransition::ApproveReturn => 1,
            BorrowTransition::RequestIssue
            | BorrowTransition::RequestReturn
            | BorrowTransition::RejectReturn => 0,
        }
    }
}

impl Display for BorrowTransition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BorrowTransition::RequestIssue => "request issue of",
            BorrowTransition::ApproveIssue => "approve issue of",
            BorrowTransition::RequestReturn => "request return of",
            BorrowTransition::ApproveReturn => "approve return of",
            BorrowTransition::RejectReturn => "reject return of",
        };
        f.write_str(name)
    }
}
