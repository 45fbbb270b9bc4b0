mod book;
mod borrow;
mod home;
mod user;

pub use self::{book::*, borrow::*, home::*, user::*};
