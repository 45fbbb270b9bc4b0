mod category;
mod copies;
mod cover;
mod id;
mod isbn;
mod price;
mod title;

pub use self::{category::*, copies::*, cover::*, id::*, isbn::*, price::*, title::*};
use crate::entity::{CreatedAt, UserId};
use destructure::{Destructure, Mutation};
use vodca::References;

#[derive(Debug, Clone, Eq, PartialEq, References, Destructure, Mutation)]
pub struct Book {
    id: BookId,
    isbn: BookIsbn,
    title: BookTitle,
    author: BookAuthor,
    category: BookCategory,
    description: BookDescription,
    copies: BookCopies,
    price: BookPrice,
    cover: Option<BookCover>,
    added_by: Option<UserId>,
    created_at: CreatedAt<Book>,
}

impl Book {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: BookId,
        isbn: BookIsbn,
        title: BookTitle,
        author: BookAuthor,
        category: BookCategory,
        description: BookDescription,
        copies: BookCopies,
        price: BookPrice,
        cover: Option<BookCover>,
        added_by: Option<UserId>,
        created_at: CreatedAt<Book>,
    ) -> Self {
        Self {
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
        }
    }
}
