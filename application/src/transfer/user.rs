use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use kernel::prelude::entity::{DestructUser, User};

use crate::transfer::BorrowDto;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct UserDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub stream: Option<String>,
    pub year: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for UserDto {
    fn from(value: User) -> Self {
        let DestructUser {
            id,
            name,
            email,
            role,
            stream,
            year,
            created_at,
        } = value.into_destruct();
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            role: role.to_string(),
            stream: stream.map(String::from),
            year: year.map(String::from),
            created_at: created_at.into(),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct UserBriefDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserBriefDto {
    fn from(value: &User) -> Self {
        Self {
            id: *value.id().as_ref(),
            name: value.name().as_ref().clone(),
            email: value.email().as_ref().clone(),
        }
    }
}

pub struct RegisterDto {
    pub name: String,
    pub email: String,
    pub password: String,
    pub stream: Option<String>,
    pub year: Option<String>,
}

pub struct AddLibrarianDto {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub struct LoginDto {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct TokenDto {
    pub access_token: String,
    pub user: UserDto,
}

pub struct LogoutDto {
    pub access_token: String,
}

pub struct AuthenticateDto {
    pub access_token: String,
}

#[derive(Debug, Clone)]
pub struct ProfileDto {
    pub user: UserDto,
    pub borrows: Vec<BorrowDto>,
}

pub struct GetAllUserDto {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// One page of accounts plus the size of the whole roster.
#[derive(Debug, Clone)]
pub struct UserListDto {
    pub users: Vec<UserDto>,
    pub total: i64,
}
