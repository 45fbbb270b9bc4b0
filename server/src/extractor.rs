use application::service::SessionService;
use application::transfer::AuthenticateDto;
use axum::async_trait;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::{Json, RequestPartsExt};
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use kernel::prelude::access::Actor;
use kernel::{KernelError, Rejection};

use crate::error::ErrorStatus;
use crate::handler::AppModule;

/// The caller behind a valid bearer token.
pub struct AuthorizedActor {
    pub actor: Actor,
    pub access_token: String,
}

#[async_trait]
impl FromRequestParts<AppModule> for AuthorizedActor {
    type Rejection = ErrorStatus;

    async fn from_request_parts(
        parts: &mut Parts,
        module: &AppModule,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| KernelError::Unauthorized.because("No token provided"))?;
        let access_token = bearer.token().to_string();
        let actor = module
            .authenticate(AuthenticateDto {
                access_token: access_token.clone(),
            })
            .await?;
        Ok(Self {
            actor,
            access_token,
        })
    }
}

/// [`Path`] whose rejection is an [`ErrorStatus`].
pub struct PathParam<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for PathParam<T>
where
    Path<T>: FromRequestParts<S, Rejection = PathRejection>,
    S: Send + Sync,
{
    type Rejection = ErrorStatus;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// [`Query`] whose rejection is an [`ErrorStatus`].
pub struct QueryParam<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for QueryParam<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = ErrorStatus;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// [`Json`] whose rejection is an [`ErrorStatus`].
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ErrorStatus;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
