use serde::{Deserialize, Serialize};

use kernel::prelude::entity::CategorySummary;

use crate::transfer::BookDto;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HomeDto {
    pub stats: HomeStatsDto,
    pub top_categories: Vec<CategoryDto>,
    pub new_arrivals: Vec<BookDto>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct HomeStatsDto {
    pub total_books: i64,
    pub total_categories: i64,
    pub active_students: i64,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct CategoryDto {
    pub category: String,
    pub count: i64,
    pub cover_image: Option<String>,
}

impl From<CategorySummary> for CategoryDto {
    fn from(value: CategorySummary) -> Self {
        Self {
            category: value.category.into(),
            count: value.count,
            cover_image: value.cover_image,
        }
    }
}
