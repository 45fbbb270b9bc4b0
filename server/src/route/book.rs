use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::extractor::{AuthorizedActor, JsonBody, PathParam, QueryParam};
use crate::handler::AppModule;
use crate::request::{
    BookTransformer, CreateBookRequest, DeleteBookRequest, GetAllBookRequest, GetBookRequest,
    GetLatestBookRequest, UpdateBookRequest,
};
use crate::response::{BookPresenter, Reply};
use application::service::{
    CreateBookService, DeleteBookService, GetBookService, UpdateBookService,
};
use axum::extract::State;
use axum::routing::{delete, get, post, put};
use axum::Router;
use kernel::{KernelError, Rejection};
use uuid::Uuid;

pub trait BookRouter {
    fn route_book(self) -> Self;
}

impl BookRouter for Router<AppModule> {
    fn route_book(self) -> Self {
        self.route(
            "/books",
            get(
                |State(module): State<AppModule>, QueryParam(req): QueryParam<GetAllBookRequest>| async move {
                    Controller::new(BookTransformer, BookPresenter(Reply::ok("Books fetched")))
                        .intake(req)
                        .handle(|dto| async move { module.get_all_books(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/books/new",
            get(
                |State(module): State<AppModule>, QueryParam(req): QueryParam<GetLatestBookRequest>| async move {
                    Controller::new(BookTransformer, BookPresenter(Reply::ok("New books fetched")))
                        .intake(req)
                        .handle(|dto| async move { module.get_latest_books(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/books/:id",
            get(
                |State(module): State<AppModule>, PathParam(id): PathParam<Uuid>| async move {
                    Controller::new(BookTransformer, BookPresenter(Reply::ok("Book fetched")))
                        .intake(GetBookRequest::new(id))
                        .handle(|dto| async move { module.get_book(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                        .and_then(|res| {
                            res.ok_or_else(|| {
                                ErrorStatus::from(KernelError::NotFound.because("Book not found"))
                            })
                        })
                },
            ),
        )
        .route(
            "/books/add",
            post(
                |State(module): State<AppModule>,
                 auth: AuthorizedActor,
                 JsonBody(req): JsonBody<CreateBookRequest>| async move {
                    Controller::new(
                        BookTransformer,
                        BookPresenter(Reply::created("Book added successfully")),
                    )
                    .intake(req)
                    .handle(|dto| async move { module.create_book(&auth.actor, dto).await })
                    .await
                    .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/books/update/:id",
            put(
                |State(module): State<AppModule>,
                 auth: AuthorizedActor,
                 PathParam(id): PathParam<Uuid>,
                 JsonBody(req): JsonBody<UpdateBookRequest>| async move {
                    Controller::new(
                        BookTransformer,
                        BookPresenter(Reply::ok("Book updated successfully")),
                    )
                    .intake((id, req))
                    .handle(|dto| async move { module.update_book(&auth.actor, dto).await })
                    .await
                    .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/books/delete/:id",
            delete(
                |State(module): State<AppModule>, auth: AuthorizedActor, PathParam(id): PathParam<Uuid>| async move {
                    Controller::new(
                        BookTransformer,
                        BookPresenter(Reply::ok("Book deleted successfully")),
                    )
                    .intake(DeleteBookRequest::new(id))
                    .handle(|dto| async move { module.delete_book(&auth.actor, dto).await })
                    .await
                    .map_err(ErrorStatus::from)
                },
            ),
        )
    }
}
