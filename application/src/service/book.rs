use time::OffsetDateTime;
use uuid::Uuid;

use kernel::interface::cache::DependOnCatalogCache;
use kernel::interface::database::{DatabaseConnection, Transaction};
use kernel::interface::query::{BookQuery, BorrowQuery, DependOnBookQuery, DependOnBorrowQuery};
use kernel::interface::storage::{CoverStorage, DependOnCoverStorage};
use kernel::interface::update::{BookModifier, DependOnBookModifier};
use kernel::prelude::access::{Action, Actor};
use kernel::prelude::entity::{
    Book, BookAuthor, BookCategory, BookCopies, BookCover, BookDescription, BookId, BookIsbn,
    BookPrice, BookTitle, BorrowStatus, CreatedAt, SelectLimit, SelectOffset,
};
use kernel::{KernelError, Rejection};

use crate::service::invalidate_home;
use crate::transfer::{
    BookDto, CreateBookDto, DeleteBookDto, GetAllBookDto, GetBookDto, GetLatestBookDto,
    UpdateBookDto,
};

#[async_trait::async_trait]
pub trait GetBookService: 'static + Sync + Send + DependOnBookQuery {
    async fn get_book(&self, dto: GetBookDto) -> error_stack::Result<Option<BookDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let id = BookId::new(dto.id);
        let book = self.book_query().find_by_id(&mut connection, &id).await?;
        Ok(book.map(BookDto::from))
    }

    async fn get_all_books(
        &self,
        dto: GetAllBookDto,
    ) -> error_stack::Result<Vec<BookDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let limit = dto.limit.map(SelectLimit::new).unwrap_or_default();
        let offset = dto.offset.map(SelectOffset::new).unwrap_or_default();
        let books = self
            .book_query()
            .find_all(&mut connection, &limit, &offset)
            .await?;
        Ok(books.into_iter().map(BookDto::from).collect())
    }

    async fn get_latest_books(
        &self,
        dto: GetLatestBookDto,
    ) -> error_stack::Result<Vec<BookDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let limit = dto.limit.map(SelectLimit::new).unwrap_or_default();
        let books = self.book_query().find_latest(&mut connection, &limit).await?;
        Ok(books.into_iter().map(BookDto::from).collect())
    }
}

impl<T> GetBookService for T where T: DependOnBookQuery {}

#[async_trait::async_trait]
pub trait CreateBookService:
    'static + Sync + Send + DependOnBookQuery + DependOnBookModifier + DependOnCatalogCache
{
    async fn create_book(
        &self,
        actor: &Actor,
        dto: CreateBookDto,
    ) -> error_stack::Result<BookDto, KernelError> {
        actor.authorize(Action::ManageCatalog)?;
        let mut connection = self.database_connection().transact().await?;

        let isbn = BookIsbn::new(dto.isbn);
        if self
            .book_query()
            .find_by_isbn(&mut connection, &isbn)
            .await?
            .is_some()
        {
            return Err(KernelError::Conflict.because("Book with this ISBN already exists"));
        }

        let book = Book::new(
            BookId::new(Uuid::new_v4()),
            isbn,
            BookTitle::new(dto.title),
            BookAuthor::new(dto.author),
            BookCategory::new(dto.category),
            BookDescription::new(dto.description),
            BookCopies::stocked(dto.total_copies)?,
            BookPrice::new(dto.price)?,
            dto.cover_image
                .map(|url| BookCover::new(url, dto.cover_id)),
            Some(actor.id().clone()),
            CreatedAt::new(OffsetDateTime::now_utc()),
        );
        self.book_modifier().create(&mut connection, &book).await?;
        connection.commit().await?;
        invalidate_home(self.catalog_cache()).await;

        tracing::info!("book {} added by {}", book.id().as_ref(), actor.id().as_ref());
        Ok(BookDto::from(book))
    }
}

impl<T> CreateBookService for T where
    T: DependOnBookQuery + DependOnBookModifier + DependOnCatalogCache
{
}

#[async_trait::async_trait]
pub trait UpdateBookService:
    'static
    + Sync
    + Send
    + DependOnBookQuery
    + DependOnBookModifier
    + DependOnCatalogCache
    + DependOnCoverStorage
{
    async fn update_book(
        &self,
        actor: &Actor,
        dto: UpdateBookDto,
    ) -> error_stack::Result<BookDto, KernelError> {
        actor.authorize(Action::ManageCatalog)?;
        let mut connection = self.database_connection().transact().await?;

        let id = BookId::new(dto.id);
        let book = self
            .book_query()
            .lock_by_id(&mut connection, &id)
            .await?
            .ok_or_else(|| KernelError::NotFound.because("Book not found"))?;

        let isbn = dto.isbn.map(BookIsbn::new);
        if let Some(isbn) = isbn.as_ref().filter(|isbn| *isbn != book.isbn()) {
            if self
                .book_query()
                .find_by_isbn(&mut connection, isbn)
                .await?
                .is_some()
            {
                return Err(KernelError::Conflict.because("Book with this ISBN already exists"));
            }
        }
        let copies = match dto.total_copies {
            Some(total) => book.copies().resize(total)?,
            None => *book.copies(),
        };
        let price = dto.price.map(BookPrice::new).transpose()?;
        let cover = dto
            .cover_image
            .map(|url| BookCover::new(url, dto.cover_id));
        let replaced = match (&cover, book.cover()) {
            (Some(new), Some(old)) if new.asset_id() != old.asset_id() => Some(old.clone()),
            _ => None,
        };

        let book = book.reconstruct(|book| {
            if let Some(isbn) = isbn {
                book.isbn = isbn;
            }
            if let Some(title) = dto.title {
                book.title = BookTitle::new(title);
            }
            if let Some(author) = dto.author {
                book.author = BookAuthor::new(author);
            }
            if let Some(category) = dto.category {
                book.category = BookCategory::new(category);
            }
            if let Some(description) = dto.description {
                book.description = BookDescription::new(description);
            }
            if let Some(price) = price {
                book.price = price;
            }
            if cover.is_some() {
                book.cover = cover;
            }
            book.copies = copies;
        });
        self.book_modifier().update(&mut connection, &book).await?;
        connection.commit().await?;
        invalidate_home(self.catalog_cache()).await;
        if let Some(old) = replaced {
            remove_cover(self.cover_storage(), &old).await;
        }

        tracing::info!("book {} updated by {}", book.id().as_ref(), actor.id().as_ref());
        Ok(BookDto::from(book))
    }
}

impl<T> UpdateBookService for T where
    T: DependOnBookQuery + DependOnBookModifier + DependOnCatalogCache + DependOnCoverStorage
{
}

#[async_trait::async_trait]
pub trait DeleteBookService:
    'static
    + Sync
    + Send
    + DependOnBookQuery
    + DependOnBookModifier
    + DependOnBorrowQuery
    + DependOnCatalogCache
    + DependOnCoverStorage
{
    async fn delete_book(
        &self,
        actor: &Actor,
        dto: DeleteBookDto,
    ) -> error_stack::Result<(), KernelError> {
        actor.authorize(Action::ManageCatalog)?;
        let mut connection = self.database_connection().transact().await?;

        let id = BookId::new(dto.id);
        let book = self
            .book_query()
            .lock_by_id(&mut connection, &id)
            .await?
            .ok_or_else(|| KernelError::NotFound.because("Book not found"))?;
        let open = self
            .borrow_query()
            .count_by_book(&mut connection, &id, &BorrowStatus::OPEN)
            .await?;
        if open > 0 {
            return Err(KernelError::Conflict.because(format!(
                "Book has {open} open borrow records and cannot be deleted"
            )));
        }

        self.book_modifier().delete(&mut connection, &id).await?;
        connection.commit().await?;
        invalidate_home(self.catalog_cache()).await;
        if let Some(cover) = book.cover() {
            remove_cover(self.cover_storage(), cover).await;
        }

        tracing::info!("book {} deleted by {}", id.as_ref(), actor.id().as_ref());
        Ok(())
    }
}

impl<T> DeleteBookService for T where
    T: DependOnBookQuery
        + DependOnBookModifier
        + DependOnBorrowQuery
        + DependOnCatalogCache
        + DependOnCoverStorage
{
}

async fn remove_cover<S: CoverStorage>(storage: &S, cover: &BookCover) {
    if let Err(report) = storage.remove(cover).await {
        tracing::warn!("failed to remove cover {}: {report:?}", cover.url());
    }
}
