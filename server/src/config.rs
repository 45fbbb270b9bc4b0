use std::net::SocketAddr;

use error_stack::{Report, ResultExt};
use kernel::KernelError;

const SERVER_PORT: &str = "SERVER_PORT";
const DEFAULT_PORT: u16 = 8080;

/// Address the http listener binds to, taken from `SERVER_PORT`.
pub fn bind_address() -> error_stack::Result<SocketAddr, KernelError> {
    let port = match dotenvy::var(SERVER_PORT) {
        Ok(port) => port
            .parse::<u16>()
            .change_context_lazy(|| KernelError::Internal)
            .attach_printable_lazy(|| format!("Invalid {SERVER_PORT}: {port}"))?,
        Err(dotenvy::Error::EnvVar(std::env::VarError::NotPresent)) => DEFAULT_PORT,
        Err(e) => {
            return Err(Report::new(e)
                .change_context(KernelError::Internal)
                .attach_printable(format!("Failed to read {SERVER_PORT}")))
        }
    };
    Ok(SocketAddr::from(([0, 0, 0, 0], port)))
}
