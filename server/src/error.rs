use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use error_stack::Report;
use kernel::{KernelError, Reason, Rejection};
use serde::Serialize;
use std::process::{ExitCode, Termination};

#[derive(Debug)]
pub struct StackTrace(Report<KernelError>);

impl From<Report<KernelError>> for StackTrace {
    fn from(e: Report<KernelError>) -> Self {
        StackTrace(e)
    }
}

impl Termination for StackTrace {
    fn report(self) -> ExitCode {
        self.0.report()
    }
}

#[derive(Debug)]
pub struct ErrorStatus(Report<KernelError>);

impl From<Report<KernelError>> for ErrorStatus {
    fn from(e: Report<KernelError>) -> Self {
        ErrorStatus(e)
    }
}

impl From<KernelError> for ErrorStatus {
    fn from(e: KernelError) -> Self {
        ErrorStatus(Report::new(e))
    }
}

/// Extractor rejections are answered in the same envelope as service errors.
fn rejected(status: StatusCode, text: String) -> ErrorStatus {
    let context = if status.is_server_error() {
        KernelError::Internal
    } else {
        KernelError::InvalidState
    };
    ErrorStatus(context.because(text))
}

impl From<JsonRejection> for ErrorStatus {
    fn from(rejection: JsonRejection) -> Self {
        rejected(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for ErrorStatus {
    fn from(rejection: PathRejection) -> Self {
        rejected(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ErrorStatus {
    fn from(rejection: QueryRejection) -> Self {
        rejected(rejection.status(), rejection.body_text())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: bool,
    message: String,
}

impl ErrorStatus {
    fn status(&self) -> StatusCode {
        match self.0.current_context() {
            KernelError::NotFound => StatusCode::NOT_FOUND,
            KernelError::InvalidState => StatusCode::BAD_REQUEST,
            KernelError::Forbidden => StatusCode::FORBIDDEN,
            KernelError::Conflict => StatusCode::BAD_REQUEST,
            KernelError::Unauthorized => StatusCode::UNAUTHORIZED,
            KernelError::Concurrency => StatusCode::CONFLICT,
            KernelError::Timeout => StatusCode::REQUEST_TIMEOUT,
            KernelError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The first [`Reason`] attached to the report, or the context's own text.
    ///
    /// Internal errors never leak their reason.
    fn message(&self) -> String {
        let context = self.0.current_context();
        if context == &KernelError::Internal {
            return "Internal Server Error".to_string();
        }
        self.0
            .frames()
            .find_map(|frame| frame.downcast_ref::<Reason>())
            .map(ToString::to_string)
            .unwrap_or_else(|| context.to_string())
    }
}

impl IntoResponse for ErrorStatus {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{:?}", self.0);
        } else {
            tracing::debug!("{status}: {}", self.0);
        }
        let body = ErrorBody {
            error: true,
            message: self.message(),
        };
        (status, Json(body)).into_response()
    }
}
