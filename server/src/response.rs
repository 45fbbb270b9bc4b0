mod book;
mod borrow;
mod home;
mod user;

pub use self::{book::*, borrow::*, home::*, user::*};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Status and message every presenter answers with.
#[derive(Debug, Clone, Copy)]
pub struct Reply {
    status: StatusCode,
    message: &'static str,
}

impl Reply {
    pub fn ok(message: &'static str) -> Self {
        Self {
            status: StatusCode::OK,
            message,
        }
    }

    pub fn created(message: &'static str) -> Self {
        Self {
            status: StatusCode::CREATED,
            message,
        }
    }

    fn wrap<T>(self, payload: T) -> Envelope<T> {
        Envelope {
            status: self.status,
            body: Body {
                error: false,
                message: self.message,
                payload,
            },
        }
    }
}

/// `{ "error": false, "message": ..., ...payload }`
#[derive(Debug)]
pub struct Envelope<T> {
    status: StatusCode,
    body: Body<T>,
}

#[derive(Debug, Serialize)]
struct Body<T> {
    error: bool,
    message: &'static str,
    #[serde(flatten)]
    payload: T,
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
