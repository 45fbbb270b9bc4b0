use vodca::References;

use crate::entity::{BorrowTransition, Role, UserId};
use crate::{KernelError, Rejection};

/// Anything a caller can ask the library to do that is not open to everyone.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Action {
    Borrow(BorrowTransition),
    ManageCatalog,
    ReviewLedger,
    ViewOwnLoans,
    ListUsers,
    AddLibrarian,
}

const STUDENT: &[Role] = &[Role::Student];
const STAFF: &[Role] = &[Role::Librarian, Role::Admin];
const ADMIN: &[Role] = &[Role::Admin];

impl Action {
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Action::Borrow(BorrowTransition::RequestIssue) => STUDENT,
            Action::Borrow(BorrowTransition::ApproveIssue) => STAFF,
            Action::Borrow(BorrowTransition::RequestReturn) => STUDENT,
            Action::Borrow(BorrowTransition::ApproveReturn) => STAFF,
            Action::Borrow(BorrowTransition::RejectReturn) => STAFF,
            Action::ManageCatalog => STAFF,
            Action::ReviewLedger => STAFF,
            Action::ViewOwnLoans => STUDENT,
            Action::ListUsers => STAFF,
            Action::AddLibrarian => ADMIN,
        }
    }

    /// Whether the caller must also be the user the target record belongs to.
    pub fn owner_only(&self) -> bool {
        matches!(self, Action::Borrow(BorrowTransition::RequestReturn))
    }
}

/// The authenticated caller of an operation.
#[derive(Debug, Clone, Eq, PartialEq, References)]
pub struct Actor {
    id: UserId,
    role: Role,
}

impl Actor {
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    pub fn authorize(&self, action: Action) -> error_stack::Result<(), KernelError> {
        if action.allowed_roles().contains(&self.role) {
            Ok(())
        } else {
            Err(KernelError::Forbidden.because("Access Denied: Unauthorized role"))
        }
    }

    /// [`Actor::authorize`] plus the ownership check for owner-only actions.
    pub fn authorize_owner(
        &self,
        action: Action,
        owner: &UserId,
    ) -> error_stack::Result<(), KernelError> {
        self.authorize(action)?;
        if action.owner_only() && owner != &self.id {
            return Err(KernelError::Forbidden.because("This borrow record belongs to another user"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use uuid::Uuid;

    use super::{Action, Actor};
    use crate::entity::{BorrowTransition, Role, UserId};
    use crate::KernelError;

    fn actor(role: Role) -> Actor {
        Actor::new(UserId::new(Uuid::new_v4()), role)
    }

    #[test]
    fn students_request_staff_approve() {
        let student = actor(Role::Student);
        let librarian = actor(Role::Librarian);
        let admin = actor(Role::Admin);

        for transition in [BorrowTransition::RequestIssue, BorrowTransition::RequestReturn] {
            assert!(student.authorize(Action::Borrow(transition)).is_ok());
            assert!(librarian.authorize(Action::Borrow(transition)).is_err());
            assert!(admin.authorize(Action::Borrow(transition)).is_err());
        }
        for transition in [
            BorrowTransition::ApproveIssue,
            BorrowTransition::ApproveReturn,
            BorrowTransition::RejectReturn,
        ] {
            let error = student.authorize(Action::Borrow(transition)).unwrap_err();
            assert_eq!(error.current_context(), &KernelError::Forbidden);
            assert!(librarian.authorize(Action::Borrow(transition)).is_ok());
            assert!(admin.authorize(Action::Borrow(transition)).is_ok());
        }
    }

    #[test]
    fn roster_is_for_staff() {
        assert!(actor(Role::Librarian).authorize(Action::ListUsers).is_ok());
        assert!(actor(Role::Admin).authorize(Action::ListUsers).is_ok());
        let error = actor(Role::Student).authorize(Action::ListUsers).unwrap_err();
        assert_eq!(error.current_context(), &KernelError::Forbidden);
    }

    #[test]
    fn only_admin_adds_librarians() {
        assert!(actor(Role::Admin).authorize(Action::AddLibrarian).is_ok());
        assert!(actor(Role::Librarian).authorize(Action::AddLibrarian).is_err());
    }

    #[test]
    fn return_request_needs_owner() {
        let student = actor(Role::Student);
        let action = Action::Borrow(BorrowTransition::RequestReturn);
        assert!(student.authorize_owner(action, student.id()).is_ok());

        let stranger = UserId::new(Uuid::new_v4());
        let error = student.authorize_owner(action, &stranger).unwrap_err();
        assert_eq!(error.current_context(), &KernelError::Forbidden);
    }

    #[test]
    fn staff_actions_ignore_ownership() {
        let librarian = actor(Role::Librarian);
        let owner = UserId::new(Uuid::new_v4());
        assert!(librarian
            .authorize_owner(Action::Borrow(BorrowTransition::ApproveReturn), &owner)
            .is_ok());
    }
}
