use crate::entity::BookCover;
use crate::KernelError;

/// Where uploaded cover images live. Covers that only point at an external
/// URL have no asset and are left alone.
#[async_trait::async_trait]
pub trait CoverStorage: 'static + Sync + Send {
    async fn remove(&self, cover: &BookCover) -> error_stack::Result<(), KernelError>;
}

pub trait DependOnCoverStorage: 'static + Sync + Send {
    type CoverStorage: CoverStorage;
    fn cover_storage(&self) -> &Self::CoverStorage;
}
