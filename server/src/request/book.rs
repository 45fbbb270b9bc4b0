use crate::controller::Intake;
use application::transfer::{
    CreateBookDto, DeleteBookDto, GetAllBookDto, GetBookDto, GetLatestBookDto, UpdateBookDto,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookRequest {
    isbn: String,
    title: String,
    author: String,
    category: String,
    #[serde(default)]
    description: String,
    total_copies: i32,
    #[serde(default)]
    price: i32,
    cover_image: Option<String>,
    cover_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookRequest {
    isbn: Option<String>,
    title: Option<String>,
    author: Option<String>,
    category: Option<String>,
    description: Option<String>,
    total_copies: Option<i32>,
    price: Option<i32>,
    cover_image: Option<String>,
    cover_id: Option<String>,
}

#[derive(Debug)]
pub struct DeleteBookRequest {
    id: Uuid,
}

impl DeleteBookRequest {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}

#[derive(Debug, Deserialize)]
pub struct GetAllBookRequest {
    limit: Option<i64>,
    offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct GetLatestBookRequest {
    limit: Option<i64>,
}

#[derive(Debug)]
pub struct GetBookRequest {
    id: Uuid,
}

impl GetBookRequest {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}

pub struct BookTransformer;

impl Intake<CreateBookRequest> for BookTransformer {
    type To = CreateBookDto;
    fn emit(&self, input: CreateBookRequest) -> Self::To {
        CreateBookDto {
            isbn: input.isbn,
            title: input.title,
            author: input.author,
            category: input.category,
            description: input.description,
            total_copies: input.total_copies,
            price: input.price,
            cover_image: input.cover_image,
            cover_id: input.cover_id,
        }
    }
}

impl Intake<(Uuid, UpdateBookRequest)> for BookTransformer {
    type To = UpdateBookDto;
    fn emit(&self, input: (Uuid, UpdateBookRequest)) -> Self::To {
        let (id, input) = input;
        UpdateBookDto {
            id,
            isbn: input.isbn,
            title: input.title,
            author: input.author,
            category: input.category,
            description: input.description,
            total_copies: input.total_copies,
            price: input.price,
            cover_image: input.cover_image,
            cover_id: input.cover_id,
        }
    }
}

impl Intake<DeleteBookRequest> for BookTransformer {
    type To = DeleteBookDto;
    fn emit(&self, input: DeleteBookRequest) -> Self::To {
        DeleteBookDto { id: input.id }
    }
}

impl Intake<GetBookRequest> for BookTransformer {
    type To = GetBookDto;
    fn emit(&self, input: GetBookRequest) -> Self::To {
        GetBookDto { id: input.id }
    }
}

impl Intake<GetAllBookRequest> for BookTransformer {
    type To = GetAllBookDto;
    fn emit(&self, input: GetAllBookRequest) -> Self::To {
        GetAllBookDto {
            limit: input.limit,
            offset: input.offset,
        }
    }
}

impl Intake<GetLatestBookRequest> for BookTransformer {
    type To = GetLatestBookDto;
    fn emit(&self, input: GetLatestBookRequest) -> Self::To {
        GetLatestBookDto { limit: input.limit }
    }
}
