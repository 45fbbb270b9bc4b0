pub use crate::error::*;

mod access;
mod cache;
mod database;
mod entity;
mod error;
mod modify;
mod query;
mod session;
mod storage;

#[cfg(feature = "prelude")]
pub mod prelude {
    pub mod entity {
        pub use crate::entity::*;
    }
    pub mod access {
        pub use crate::access::*;
    }
}

#[cfg(feature = "interface")]
pub mod interface {
    pub mod database {
        pub use crate::database::*;
    }
    pub mod query {
        pub use crate::query::*;
    }
    pub mod update {
        pub use crate::modify::*;
    }
    pub mod cache {
        pub use crate::cache::*;
    }
    pub mod storage {
        pub use crate::storage::*;
    }
    pub mod session {
        pub use crate::session::*;
    }
}
