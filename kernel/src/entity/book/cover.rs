use serde::{Deserialize, Serialize};
use vodca::References;

/// Where a cover image is served from, plus the storage asset backing it if we own one.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, References)]
pub struct BookCover {
    url: String,
    asset_id: Option<String>,
}

impl BookCover {
    pub fn new(url: impl Into<String>, asset_id: Option<String>) -> Self {
        Self {
            url: url.into(),
            asset_id,
        }
    }
}
