use std::collections::HashMap;

use time::OffsetDateTime;

use kernel::interface::cache::{CacheKey, CatalogCache};
use kernel::interface::database::DatabaseConnection;
use kernel::interface::query::{BookQuery, DependOnBookQuery, DependOnUserQuery, UserQuery};
use kernel::prelude::entity::{BookId, Borrow, UserId};
use kernel::KernelError;

use crate::transfer::{BookBriefDto, BorrowDto, UserBriefDto};

pub use self::{book::*, borrow::*, home::*, ledger::*, user::*};

mod book;
mod borrow;
mod home;
mod ledger;
mod user;

/// Drops the cached home summary after a committed write. Failures are logged, not returned.
async fn invalidate_home<C: CatalogCache>(cache: &C) {
    if let Err(report) = cache.invalidate(&CacheKey::home()).await {
        tracing::warn!("failed to invalidate home cache: {report:?}");
    }
}

/// Attaches book and borrower details to each record.
async fn describe<T>(
    module: &T,
    con: &mut <T::DatabaseConnection as DatabaseConnection>::Transaction,
    borrows: Vec<Borrow>,
    now: OffsetDateTime,
) -> error_stack::Result<Vec<BorrowDto>, KernelError>
where
    T: DependOnBookQuery + DependOnUserQuery + ?Sized,
{
    let mut books: HashMap<BookId, Option<BookBriefDto>> = HashMap::new();
    let mut users: HashMap<UserId, Option<UserBriefDto>> = HashMap::new();
    let mut described = Vec::with_capacity(borrows.len());
    for borrow in borrows {
        let book_id = borrow.book_id().clone();
        if !books.contains_key(&book_id) {
            let book = module.book_query().find_by_id(con, &book_id).await?;
            books.insert(book_id.clone(), book.as_ref().map(BookBriefDto::from));
        }
        let user_id = borrow.user_id().clone();
        if !users.contains_key(&user_id) {
            let user = module.user_query().find_by_id(con, &user_id).await?;
            users.insert(user_id.clone(), user.as_ref().map(UserBriefDto::from));
        }
        described.push(
            BorrowDto::new(borrow, now)
                .with_book(books.get(&book_id).cloned().flatten())
                .with_user(users.get(&user_id).cloned().flatten()),
        );
    }
    Ok(described)
}
