use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::Borrow;
use crate::KernelError;

/// Borrow records are part of the ledger and are never deleted.
#[async_trait::async_trait]
pub trait BorrowModifier: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn create(
        &self,
        con: &mut Self::Transaction,
        borrow: &Borrow,
    ) -> error_stack::Result<(), KernelError>;
    async fn update(
        &self,
        con: &mut Self::Transaction,
        borrow: &Borrow,
    ) -> error_stack::Result<(), KernelError>;
}

pub trait DependOnBorrowModifier: 'static + Sync + Send + DependOnDatabaseConnection {
    type BorrowModifier: BorrowModifier<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn borrow_modifier(&self) -> &Self::BorrowModifier;
}
