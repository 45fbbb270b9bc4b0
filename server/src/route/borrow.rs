use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::extractor::{AuthorizedActor, PathParam};
use crate::handler::AppModule;
use crate::request::{BorrowTransformer, BorrowTransitionRequest, RequestIssueRequest};
use crate::response::{BorrowPayload, BorrowPresenter, Envelope, Reply};
use application::service::{BorrowLifecycleService, LedgerService};
use axum::extract::State;
use axum::routing::{get, post, put};
use axum::Router;
use uuid::Uuid;

pub trait BorrowRouter {
    fn route_borrow(self) -> Self;
}

/// Mounted under both `/books/approve/:id` and `/librarian/approverequest/:id`.
pub(super) async fn approve_issue(
    State(module): State<AppModule>,
    auth: AuthorizedActor,
    PathParam(id): PathParam<Uuid>,
) -> Result<Envelope<BorrowPayload>, ErrorStatus> {
    Controller::new(
        BorrowTransformer,
        BorrowPresenter(Reply::ok("Issue request approved")),
    )
    .intake(BorrowTransitionRequest::new(id))
    .handle(|dto| async move { module.approve_issue(&auth.actor, dto).await })
    .await
    .map_err(ErrorStatus::from)
}

impl BorrowRouter for Router<AppModule> {
    fn route_borrow(self) -> Self {
        self.route(
            "/books/borrow/request-issue/:book_id",
            post(
                |State(module): State<AppModule>, auth: AuthorizedActor, PathParam(book_id): PathParam<Uuid>| async move {
                    Controller::new(
                        BorrowTransformer,
                        BorrowPresenter(Reply::created("Issue request submitted")),
                    )
                    .intake(RequestIssueRequest::new(book_id))
                    .handle(|dto| async move { module.request_issue(&auth.actor, dto).await })
                    .await
                    .map_err(ErrorStatus::from)
                },
            ),
        )
        .route("/books/approve/:id", put(approve_issue))
        .route(
            "/books/returnrequest/:id",
            put(
                |State(module): State<AppModule>, auth: AuthorizedActor, PathParam(id): PathParam<Uuid>| async move {
                    Controller::new(
                        BorrowTransformer,
                        BorrowPresenter(Reply::ok("Return request submitted")),
                    )
                    .intake(BorrowTransitionRequest::new(id))
                    .handle(|dto| async move { module.request_return(&auth.actor, dto).await })
                    .await
                    .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/books/issued",
            get(
                |State(module): State<AppModule>, auth: AuthorizedActor| async move {
                    Controller::new((), BorrowPresenter(Reply::ok("Issued books fetched")))
                        .bypass(|| async move { module.own_loans(&auth.actor).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/books/issuedrequest",
            get(
                |State(module): State<AppModule>, auth: AuthorizedActor| async move {
                    Controller::new((), BorrowPresenter(Reply::ok("Issue requests fetched")))
                        .bypass(|| async move { module.issue_requests(&auth.actor).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
    }
}
