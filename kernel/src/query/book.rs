use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{Book, BookId, BookIsbn, CategorySummary, SelectLimit, SelectOffset};
use crate::KernelError;

#[async_trait::async_trait]
pub trait BookQuery: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn find_by_id(
        &self,
        con: &mut Self::Transaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError>;

    /// Same as `find_by_id`, but nobody else can touch the row until `con` ends.
    async fn lock_by_id(
        &self,
        con: &mut Self::Transaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError>;

    async fn find_by_isbn(
        &self,
        con: &mut Self::Transaction,
        isbn: &BookIsbn,
    ) -> error_stack::Result<Option<Book>, KernelError>;

    /// Alphabetical by title.
    async fn find_all(
        &self,
        con: &mut Self::Transaction,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> error_stack::Result<Vec<Book>, KernelError>;

    /// Most recently catalogued first.
    async fn find_latest(
        &self,
        con: &mut Self::Transaction,
        limit: &SelectLimit,
    ) -> error_stack::Result<Vec<Book>, KernelError>;

    async fn count(&self, con: &mut Self::Transaction) -> error_stack::Result<i64, KernelError>;

    async fn count_categories(
        &self,
        con: &mut Self::Transaction,
    ) -> error_stack::Result<i64, KernelError>;

    /// Largest categories first.
    async fn top_categories(
        &self,
        con: &mut Self::Transaction,
        limit: &SelectLimit,
    ) -> error_stack::Result<Vec<CategorySummary>, KernelError>;
}

pub trait DependOnBookQuery: 'static + Sync + Send + DependOnDatabaseConnection {
    type BookQuery: BookQuery<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn book_query(&self) -> &Self::BookQuery;
}
