use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::handler::AppModule;
use crate::response::{HomePresenter, Reply};
use application::service::HomeService;
use axum::extract::State;
use axum::routing::get;
use axum::Router;

pub trait HomeRouter {
    fn route_home(self) -> Self;
}

impl HomeRouter for Router<AppModule> {
    fn route_home(self) -> Self {
        self.route(
            "/home",
            get(|State(module): State<AppModule>| async move {
                Controller::new((), HomePresenter(Reply::ok("Homepage data fetched")))
                    .bypass(|| async move { module.get_home().await })
                    .await
                    .map_err(ErrorStatus::from)
            }),
        )
    }
}
