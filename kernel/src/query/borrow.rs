use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{BookId, Borrow, BorrowId, BorrowStatus, UserId};
use crate::KernelError;

#[async_trait::async_trait]
pub trait BorrowQuery: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn find_by_id(
        &self,
        con: &mut Self::Transaction,
        id: &BorrowId,
    ) -> error_stack::Result<Option<Borrow>, KernelError>;

    async fn lock_by_id(
        &self,
        con: &mut Self::Transaction,
        id: &BorrowId,
    ) -> error_stack::Result<Option<Borrow>, KernelError>;

    /// Newest request first.
    async fn find_by_user(
        &self,
        con: &mut Self::Transaction,
        user_id: &UserId,
        statuses: &[BorrowStatus],
    ) -> error_stack::Result<Vec<Borrow>, KernelError>;

    /// Latest issue first; records never issued sort by request time.
    async fn find_by_status(
        &self,
        con: &mut Self::Transaction,
        statuses: &[BorrowStatus],
    ) -> error_stack::Result<Vec<Borrow>, KernelError>;

    async fn count_by_user(
        &self,
        con: &mut Self::Transaction,
        user_id: &UserId,
        statuses: &[BorrowStatus],
    ) -> error_stack::Result<i64, KernelError>;

    async fn count_by_book(
        &self,
        con: &mut Self::Transaction,
        book_id: &BookId,
        statuses: &[BorrowStatus],
    ) -> error_stack::Result<i64, KernelError>;

    async fn exists_for(
        &self,
        con: &mut Self::Transaction,
        user_id: &UserId,
        book_id: &BookId,
        statuses: &[BorrowStatus],
    ) -> error_stack::Result<bool, KernelError>;

    /// Distinct users holding at least one record in `statuses`.
    async fn count_borrowers(
        &self,
        con: &mut Self::Transaction,
        statuses: &[BorrowStatus],
    ) -> error_stack::Result<i64, KernelError>;
}

pub trait DependOnBorrowQuery: 'static + Sync + Send + DependOnDatabaseConnection {
    type BorrowQuery: BorrowQuery<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn borrow_query(&self) -> &Self::BorrowQuery;
}
