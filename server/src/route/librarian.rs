use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::extractor::{AuthorizedActor, PathParam};
use crate::handler::AppModule;
use crate::request::{BorrowTransformer, BorrowTransitionRequest};
use crate::response::{BorrowPresenter, Reply};
use crate::route::borrow::approve_issue;
use application::service::{BorrowLifecycleService, LedgerService};
use axum::extract::State;
use axum::routing::{get, put};
use axum::Router;
use uuid::Uuid;

pub trait LibrarianRouter {
    fn route_librarian(self) -> Self;
}

impl LibrarianRouter for Router<AppModule> {
    fn route_librarian(self) -> Self {
        self.route(
            "/librarian/issuerequest",
            get(
                |State(module): State<AppModule>, auth: AuthorizedActor| async move {
                    Controller::new((), BorrowPresenter(Reply::ok("Issue requests fetched")))
                        .bypass(|| async move { module.issue_requests(&auth.actor).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route("/librarian/approverequest/:id", put(approve_issue))
        .route(
            "/librarian/returnrequest",
            get(
                |State(module): State<AppModule>, auth: AuthorizedActor| async move {
                    Controller::new((), BorrowPresenter(Reply::ok("Return requests fetched")))
                        .bypass(|| async move { module.return_requests(&auth.actor).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/librarian/approvereturnrequest/:id",
            put(
                |State(module): State<AppModule>, auth: AuthorizedActor, PathParam(id): PathParam<Uuid>| async move {
                    Controller::new(
                        BorrowTransformer,
                        BorrowPresenter(Reply::ok("Book return approved")),
                    )
                    .intake(BorrowTransitionRequest::new(id))
                    .handle(|dto| async move { module.approve_return(&auth.actor, dto).await })
                    .await
                    .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/librarian/rejectreturn/:id",
            put(
                |State(module): State<AppModule>, auth: AuthorizedActor, PathParam(id): PathParam<Uuid>| async move {
                    Controller::new(
                        BorrowTransformer,
                        BorrowPresenter(Reply::ok("Return request rejected")),
                    )
                    .intake(BorrowTransitionRequest::new(id))
                    .handle(|dto| async move { module.reject_return(&auth.actor, dto).await })
                    .await
                    .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/librarian/borrowedbooks",
            get(
                |State(module): State<AppModule>, auth: AuthorizedActor| async move {
                    Controller::new((), BorrowPresenter(Reply::ok("Borrowed books fetched")))
                        .bypass(|| async move { module.borrowed_books(&auth.actor).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
    }
}
