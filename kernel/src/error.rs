use std::fmt::Display;

use error_stack::Context;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum KernelError {
    NotFound,
    InvalidState,
    Forbidden,
    Conflict,
    Unauthorized,
    Concurrency,
    Timeout,
    Internal,
}

impl Display for KernelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KernelError::NotFound => write!(f, "Resource not found"),
            KernelError::InvalidState => write!(f, "Invalid state transition"),
            KernelError::Forbidden => write!(f, "Access denied"),
            KernelError::Conflict => write!(f, "Request conflicts with current state"),
            KernelError::Unauthorized => write!(f, "Authentication required"),
            KernelError::Concurrency => write!(f, "Concurrency error"),
            KernelError::Timeout => write!(f, "Process timed out"),
            KernelError::Internal => write!(f, "Internal kernel error"),
        }
    }
}

impl Context for KernelError {}

/// Client-facing explanation attached to a report.
///
/// The server looks for the first `Reason` frame when it renders an error body,
/// so anything attached this way ends up in the HTTP response.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Reason(String);

impl Reason {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

impl AsRef<str> for Reason {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub trait Rejection {
    fn because(self, reason: impl Into<String>) -> error_stack::Report<KernelError>;
}

impl Rejection for KernelError {
    fn because(self, reason: impl Into<String>) -> error_stack::Report<KernelError> {
        error_stack::Report::new(self).attach_printable(Reason::new(reason))
    }
}
