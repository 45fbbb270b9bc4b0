use crate::controller::Exhaust;
use crate::response::{Envelope, Reply};
use application::transfer::{BookBriefDto, BookDto};
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    id: Uuid,
    isbn: String,
    title: String,
    author: String,
    category: String,
    description: String,
    total_copies: i32,
    available_copies: i32,
    price: i32,
    cover_image: Option<String>,
    cover_id: Option<String>,
    added_by: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

impl From<BookDto> for BookResponse {
    fn from(value: BookDto) -> Self {
        Self {
            id: value.id,
            isbn: value.isbn,
            title: value.title,
            author: value.author,
            category: value.category,
            description: value.description,
            total_copies: value.total_copies,
            available_copies: value.available_copies,
            price: value.price,
            cover_image: value.cover_image,
            cover_id: value.cover_id,
            added_by: value.added_by,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookBriefResponse {
    id: Uuid,
    isbn: String,
    title: String,
    author: String,
    cover_image: Option<String>,
}

impl From<BookBriefDto> for BookBriefResponse {
    fn from(value: BookBriefDto) -> Self {
        Self {
            id: value.id,
            isbn: value.isbn,
            title: value.title,
            author: value.author,
            cover_image: value.cover_image,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookPayload {
    book: BookResponse,
}

#[derive(Debug, Serialize)]
pub struct BooksPayload {
    books: Vec<BookResponse>,
}

pub struct BookPresenter(pub Reply);

impl Exhaust<BookDto> for BookPresenter {
    type To = Envelope<BookPayload>;
    fn emit(&self, input: BookDto) -> Self::To {
        self.0.wrap(BookPayload { book: input.into() })
    }
}

/// `None` when the book does not exist.
impl Exhaust<Option<BookDto>> for BookPresenter {
    type To = Option<Envelope<BookPayload>>;
    fn emit(&self, input: Option<BookDto>) -> Self::To {
        input.map(|book| Exhaust::<BookDto>::emit(self, book))
    }
}

impl Exhaust<Vec<BookDto>> for BookPresenter {
    type To = Envelope<BooksPayload>;
    fn emit(&self, input: Vec<BookDto>) -> Self::To {
        let books = input.into_iter().map(BookResponse::from).collect();
        self.0.wrap(BooksPayload { books })
    }
}

impl Exhaust<()> for BookPresenter {
    type To = Envelope<()>;
    fn emit(&self, input: ()) -> Self::To {
        self.0.wrap(input)
    }
}
