use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use kernel::prelude::entity::{Book, DestructBook};

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct BookDto {
    pub id: Uuid,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub category: String,
    pub description: String,
    pub total_copies: i32,
    pub available_copies: i32,
    pub price: i32,
    pub cover_image: Option<String>,
    pub cover_id: Option<String>,
    pub added_by: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Book> for BookDto {
    fn from(value: Book) -> Self {
        let DestructBook {
            id,
            isbn,
            title,
            author,
            category,
            description,
            copies,
            price,
            cover,
            added_by,
            created_at,
        } = value.into_destruct();
        let (cover_image, cover_id) = match cover {
            Some(cover) => (Some(cover.url().clone()), cover.asset_id().clone()),
            None => (None, None),
        };
        Self {
            id: id.into(),
            isbn: isbn.into(),
            title: title.into(),
            author: author.into(),
            category: category.into(),
            description: description.into(),
            total_copies: copies.total(),
            available_copies: copies.available(),
            price: price.into(),
            cover_image,
            cover_id,
            added_by: added_by.map(Uuid::from),
            created_at: created_at.into(),
        }
    }
}

/// The few book fields shown next to a borrow record.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct BookBriefDto {
    pub id: Uuid,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub cover_image: Option<String>,
}

impl From<&Book> for BookBriefDto {
    fn from(value: &Book) -> Self {
        Self {
            id: *value.id().as_ref(),
            isbn: value.isbn().as_ref().clone(),
            title: value.title().as_ref().clone(),
            author: value.author().as_ref().clone(),
            cover_image: value.cover().as_ref().map(|cover| cover.url().clone()),
        }
    }
}

pub struct GetBookDto {
    pub id: Uuid,
}

pub struct GetAllBookDto {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub struct GetLatestBookDto {
    pub limit: Option<i64>,
}

pub struct CreateBookDto {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub category: String,
    pub description: String,
    pub total_copies: i32,
    pub price: i32,
    pub cover_image: Option<String>,
    pub cover_id: Option<String>,
}

/// Fields left as `None` keep their current value.
pub struct UpdateBookDto {
    pub id: Uuid,
    pub isbn: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub total_copies: Option<i32>,
    pub price: Option<i32>,
    pub cover_image: Option<String>,
    pub cover_id: Option<String>,
}

pub struct DeleteBookDto {
    pub id: Uuid,
}
