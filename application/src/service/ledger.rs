use time::OffsetDateTime;

use kernel::interface::database::DatabaseConnection;
use kernel::interface::query::{
    BorrowQuery, DependOnBookQuery, DependOnBorrowQuery, DependOnUserQuery,
};
use kernel::prelude::access::{Action, Actor};
use kernel::prelude::entity::BorrowStatus;
use kernel::KernelError;

use crate::service::describe;
use crate::transfer::BorrowDto;

/// Read-only views over the borrow ledger, each with fines assessed as of now.
#[async_trait::async_trait]
pub trait LedgerService:
    'static + Sync + Send + DependOnBookQuery + DependOnBorrowQuery + DependOnUserQuery
{
    /// Pending issue requests, for staff.
    async fn issue_requests(&self, actor: &Actor) -> error_stack::Result<Vec<BorrowDto>, KernelError> {
        self.review(actor, &[BorrowStatus::Requested]).await
    }

    /// Pending return requests, for staff.
    async fn return_requests(
        &self,
        actor: &Actor,
    ) -> error_stack::Result<Vec<BorrowDto>, KernelError> {
        self.review(actor, &[BorrowStatus::RequestedReturn]).await
    }

    /// Every copy currently out, for staff.
    async fn borrowed_books(&self, actor: &Actor) -> error_stack::Result<Vec<BorrowDto>, KernelError> {
        self.review(actor, &BorrowStatus::ON_LOAN).await
    }

    async fn review(
        &self,
        actor: &Actor,
        statuses: &[BorrowStatus],
    ) -> error_stack::Result<Vec<BorrowDto>, KernelError> {
        actor.authorize(Action::ReviewLedger)?;
        let mut connection = self.database_connection().transact().await?;
        let borrows = self
            .borrow_query()
            .find_by_status(&mut connection, statuses)
            .await?;
        describe(self, &mut connection, borrows, OffsetDateTime::now_utc()).await
    }

    /// The caller's own copies currently out.
    async fn own_loans(&self, actor: &Actor) -> error_stack::Result<Vec<BorrowDto>, KernelError> {
        actor.authorize(Action::ViewOwnLoans)?;
        let mut connection = self.database_connection().transact().await?;
        let borrows = self
            .borrow_query()
            .find_by_user(&mut connection, actor.id(), &BorrowStatus::ON_LOAN)
            .await?;
        describe(self, &mut connection, borrows, OffsetDateTime::now_utc()).await
    }
}

impl<T> LedgerService for T where T: DependOnBookQuery + DependOnBorrowQuery + DependOnUserQuery {}
