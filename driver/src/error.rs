use kernel::KernelError;

/// Turns a library error into a kernel report, picking the [`KernelError`]
/// that callers can act on.
pub trait ConvertError: 'static + Sized {
    type Ok;
    fn convert_error(self) -> error_stack::Result<Self::Ok, KernelError>;
}
