mod book;
mod borrow;
mod home;
mod librarian;
mod user;

pub use self::{book::*, borrow::*, home::*, librarian::*, user::*};
