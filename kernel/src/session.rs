use crate::entity::{AccessToken, UserId};
use crate::KernelError;

/// Opaque bearer tokens handed out at login.
#[async_trait::async_trait]
pub trait SessionStore: 'static + Sync + Send {
    async fn issue(&self, user_id: &UserId) -> error_stack::Result<AccessToken, KernelError>;
    async fn resolve(
        &self,
        token: &AccessToken,
    ) -> error_stack::Result<Option<UserId>, KernelError>;
    async fn revoke(&self, token: &AccessToken) -> error_stack::Result<(), KernelError>;
}

pub trait DependOnSessionStore: 'static + Sync + Send {
    type SessionStore: SessionStore;
    fn session_store(&self) -> &Self::SessionStore;
}
