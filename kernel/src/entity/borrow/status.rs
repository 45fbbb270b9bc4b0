use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entity::BorrowTransition;
use crate::{KernelError, Rejection};

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum BorrowStatus {
    Requested,
    Issued,
    #[serde(rename = "Requested Return")]
    RequestedReturn,
    Returned,
}

impl BorrowStatus {
    /// Records holding a physical copy; each one is subtracted from a book's available count.
    pub const ON_LOAN: [BorrowStatus; 2] = [BorrowStatus::Issued, BorrowStatus::RequestedReturn];
    /// Records counted against a student's borrowing limit.
    pub const LIMITED: [BorrowStatus; 2] = [BorrowStatus::Requested, BorrowStatus::Issued];
    /// Everything that has not been closed yet.
    pub const OPEN: [BorrowStatus; 3] = [
        BorrowStatus::Requested,
        BorrowStatus::Issued,
        BorrowStatus::RequestedReturn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BorrowStatus::Requested => "Requested",
            BorrowStatus::Issued => "Issued",
            BorrowStatus::RequestedReturn => "Requested Return",
            BorrowStatus::Returned => "Returned",
        }
    }

    /// Status reached by applying `transition`, or `InvalidState` when the edge does not exist.
    pub fn advance(self, transition: BorrowTransition) -> error_stack::Result<Self, KernelError> {
        use BorrowStatus::*;
        use BorrowTransition::*;
        match (self, transition) {
            (Requested, ApproveIssue) => Ok(Issued),
            (Issued, RequestReturn) => Ok(RequestedReturn),
            (RequestedReturn, ApproveReturn) => Ok(Returned),
            (RequestedReturn, RejectReturn) => Ok(Issued),
            (status, transition) => Err(KernelError::InvalidState.because(format!(
                "Cannot {transition} a record that is {status}"
            ))),
        }
    }
}

impl Display for BorrowStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BorrowStatus {
    type Err = error_stack::Report<KernelError>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Requested" => Ok(BorrowStatus::Requested),
            "Issued" => Ok(BorrowStatus::Issued),
            "Requested Return" => Ok(BorrowStatus::RequestedReturn),
            "Returned" => Ok(BorrowStatus::Returned),
            other => Err(KernelError::Internal.because(format!("Unknown borrow status: {other}"))),
        }
    }
}

#[cfg(test)]
mod test {
    use super::BorrowStatus;
    use crate::entity::BorrowTransition;
    use crate::KernelError;

    #[test]
    fn follows_the_lifecycle() {
        let issued = BorrowStatus::Requested
            .advance(BorrowTransition::ApproveIssue)
            .unwrap();
        assert_eq!(issued, BorrowStatus::Issued);
        let pending = issued.advance(BorrowTransition::RequestReturn).unwrap();
        assert_eq!(pending, BorrowStatus::RequestedReturn);
        assert_eq!(
            pending.advance(BorrowTransition::RejectReturn).unwrap(),
            BorrowStatus::Issued
        );
        assert_eq!(
            pending.advance(BorrowTransition::ApproveReturn).unwrap(),
            BorrowStatus::Returned
        );
    }

    #[test]
    fn rejects_missing_edges() {
        let cases = [
            (BorrowStatus::Issued, BorrowTransition::ApproveIssue),
            (BorrowStatus::Requested, BorrowTransition::RequestReturn),
            (BorrowStatus::Issued, BorrowTransition::ApproveReturn),
            (BorrowStatus::Issued, BorrowTransition::RejectReturn),
            (BorrowStatus::Returned, BorrowTransition::RequestReturn),
            (BorrowStatus::Returned, BorrowTransition::ApproveIssue),
            (BorrowStatus::Requested, BorrowTransition::RequestIssue),
        ];
        for (status, transition) in cases {
            let error = status.advance(transition).unwrap_err();
            assert_eq!(error.current_context(), &KernelError::InvalidState);
        }
    }

    #[test]
    fn parses_stored_names() {
        assert_eq!(
            "Requested Return".parse::<BorrowStatus>().unwrap(),
            BorrowStatus::RequestedReturn
        );
        assert!("Lost".parse::<BorrowStatus>().is_err());
    }
}
