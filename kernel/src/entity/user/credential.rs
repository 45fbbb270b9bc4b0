use vodca::{AsRefln, Fromln, References};

use crate::entity::UserId;

/// A bcrypt hash, never the plain password.
#[derive(Clone, Eq, PartialEq, Fromln, AsRefln)]
pub struct HashedPassword(String);

impl HashedPassword {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }
}

impl std::fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("HashedPassword(..)")
    }
}

#[derive(Debug, Clone, Eq, PartialEq, References)]
pub struct Credential {
    user_id: UserId,
    password: HashedPassword,
}

impl Credential {
    pub fn new(user_id: UserId, password: HashedPassword) -> Self {
        Self { user_id, password }
    }
}

#[derive(Debug, Clone, Hash, Eq, PartialEq, Fromln, AsRefln)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}
