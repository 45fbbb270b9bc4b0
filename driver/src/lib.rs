use std::str::FromStr;

use error_stack::{Report, ResultExt};
use kernel::KernelError;

pub mod database;
pub mod error;
pub mod storage;

pub(crate) fn env(key: &str) -> error_stack::Result<String, KernelError> {
    dotenvy::var(key)
        .map_err(Report::from)
        .change_context(KernelError::Internal)
        .attach_printable_lazy(|| format!("Missing environment variable: {key}"))
}

/// Reads `key`, falling back to `default` when it is not set.
pub(crate) fn env_or<T>(key: &str, default: T) -> error_stack::Result<T, KernelError>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match dotenvy::var(key) {
        Ok(value) => value
            .parse()
            .map_err(Report::from)
            .change_context(KernelError::Internal)
            .attach_printable_lazy(|| format!("Malformed environment variable: {key}")),
        Err(dotenvy::Error::EnvVar(std::env::VarError::NotPresent)) => Ok(default),
        Err(error) => Err(Report::from(error).change_context(KernelError::Internal)),
    }
}
