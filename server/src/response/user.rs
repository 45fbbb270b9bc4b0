use crate::controller::Exhaust;
use crate::response::{BorrowResponse, Envelope, Reply};
use application::transfer::{ProfileDto, TokenDto, UserBriefDto, UserDto, UserListDto};
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    id: Uuid,
    name: String,
    email: String,
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    year: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

impl From<UserDto> for UserResponse {
    fn from(value: UserDto) -> Self {
        Self {
            id: value.id,
            name: value.name,
            email: value.email,
            role: value.role,
            stream: value.stream,
            year: value.year,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserBriefResponse {
    id: Uuid,
    name: String,
    email: String,
}

impl From<UserBriefDto> for UserBriefResponse {
    fn from(value: UserBriefDto) -> Self {
        Self {
            id: value.id,
            name: value.name,
            email: value.email,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserPayload {
    user: UserResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPayload {
    access_token: String,
    user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct ProfilePayload {
    user: UserResponse,
    borrows: Vec<BorrowResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListPayload {
    users: Vec<UserResponse>,
    total_user: i64,
}

pub struct UserPresenter(pub Reply);

impl Exhaust<UserDto> for UserPresenter {
    type To = Envelope<UserPayload>;
    fn emit(&self, input: UserDto) -> Self::To {
        self.0.wrap(UserPayload { user: input.into() })
    }
}

impl Exhaust<TokenDto> for UserPresenter {
    type To = Envelope<TokenPayload>;
    fn emit(&self, input: TokenDto) -> Self::To {
        self.0.wrap(TokenPayload {
            access_token: input.access_token,
            user: input.user.into(),
        })
    }
}

impl Exhaust<ProfileDto> for UserPresenter {
    type To = Envelope<ProfilePayload>;
    fn emit(&self, input: ProfileDto) -> Self::To {
        self.0.wrap(ProfilePayload {
            user: input.user.into(),
            borrows: input
                .borrows
                .into_iter()
                .map(BorrowResponse::from)
                .collect(),
        })
    }
}

impl Exhaust<UserListDto> for UserPresenter {
    type To = Envelope<UserListPayload>;
    fn emit(&self, input: UserListDto) -> Self::To {
        self.0.wrap(UserListPayload {
            users: input.users.into_iter().map(UserResponse::from).collect(),
            total_user: input.total,
        })
    }
}

impl Exhaust<()> for UserPresenter {
    type To = Envelope<()>;
    fn emit(&self, input: ()) -> Self::To {
        self.0.wrap(input)
    }
}
