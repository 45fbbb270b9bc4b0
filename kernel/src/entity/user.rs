mod credential;
mod id;
mod name;
mod role;

pub use self::{credential::*, id::*, name::*, role::*};
use crate::entity::CreatedAt;
use destructure::Destructure;
use vodca::References;

#[derive(Debug, Clone, Eq, PartialEq, Destructure, References)]
pub struct User {
    id: UserId,
    name: UserName,
    email: UserEmail,
    role: Role,
    stream: Option<UserStream>,
    year: Option<UserYear>,
    created_at: CreatedAt<User>,
}

impl User {
    pub fn new(
        id: UserId,
        name: UserName,
        email: UserEmail,
        role: Role,
        stream: Option<UserStream>,
        year: Option<UserYear>,
        created_at: CreatedAt<User>,
    ) -> Self {
        Self {
            id,
            name,
            email,
            role,
            stream,
            year,
            created_at,
        }
    }
}
