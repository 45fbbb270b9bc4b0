use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::extractor::{AuthorizedActor, JsonBody, QueryParam};
use crate::handler::AppModule;
use crate::request::{
    AddLibrarianRequest, GetAllUserRequest, LoginRequest, LogoutRequest, RegisterRequest,
    UserTransformer,
};
use crate::response::{Reply, UserPresenter};
use application::service::{
    ProfileService, RegisterUserService, SessionService, UserDirectoryService,
};
use axum::extract::State;
use axum::routing::{get, post};
use axum::Router;

pub trait UserRouter {
    fn route_user(self) -> Self;
}

impl UserRouter for Router<AppModule> {
    fn route_user(self) -> Self {
        self.route(
            "/users",
            get(
                |State(module): State<AppModule>,
                 auth: AuthorizedActor,
                 QueryParam(req): QueryParam<GetAllUserRequest>| async move {
                    Controller::new(
                        UserTransformer,
                        UserPresenter(Reply::ok("Users fetched successfully")),
                    )
                    .intake(req)
                    .handle(|dto| async move { module.get_users(&auth.actor, dto).await })
                    .await
                    .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/users/register",
            post(
                |State(module): State<AppModule>, JsonBody(req): JsonBody<RegisterRequest>| async move {
                    Controller::new(
                        UserTransformer,
                        UserPresenter(Reply::created("User registered successfully")),
                    )
                    .intake(req)
                    .handle(|dto| async move { module.register(dto).await })
                    .await
                    .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/users/login",
            post(
                |State(module): State<AppModule>, JsonBody(req): JsonBody<LoginRequest>| async move {
                    Controller::new(UserTransformer, UserPresenter(Reply::ok("Login successful")))
                        .intake(req)
                        .handle(|dto| async move { module.login(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/users/logout",
            post(
                |State(module): State<AppModule>, auth: AuthorizedActor| async move {
                    Controller::new(
                        UserTransformer,
                        UserPresenter(Reply::ok("Logged out successfully")),
                    )
                    .intake(LogoutRequest::new(auth.access_token))
                    .handle(|dto| async move { module.logout(dto).await })
                    .await
                    .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/users/profile",
            get(
                |State(module): State<AppModule>, auth: AuthorizedActor| async move {
                    Controller::new((), UserPresenter(Reply::ok("Profile fetched")))
                        .bypass(|| async move { module.get_profile(&auth.actor).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/admin/addlibrarian",
            post(
                |State(module): State<AppModule>,
                 auth: AuthorizedActor,
                 JsonBody(req): JsonBody<AddLibrarianRequest>| async move {
                    Controller::new(
                        UserTransformer,
                        UserPresenter(Reply::created("Librarian added successfully")),
                    )
                    .intake(req)
                    .handle(|dto| async move { module.add_librarian(&auth.actor, dto).await })
                    .await
                    .map_err(ErrorStatus::from)
                },
            ),
        )
    }
}
