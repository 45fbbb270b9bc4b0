use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

use crate::{KernelError, Rejection};

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize, Fromln, AsRefln)]
pub struct BookPrice(i32);

impl BookPrice {
    pub fn new(price: impl Into<i32>) -> error_stack::Result<Self, KernelError> {
        let price = price.into();
        if price < 0 {
            return Err(KernelError::Conflict.because("Price cannot be negative"));
        }
        Ok(Self(price))
    }
}
