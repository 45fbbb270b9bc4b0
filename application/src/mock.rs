//! In-memory stand-ins for every storage seam, used by the service tests.
//!
//! A transaction holds the whole state for its lifetime and works on a copy,
//! so concurrent transactions run one after another and uncommitted work is
//! simply dropped.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use kernel::interface::cache::{CacheKey, CatalogCache, DependOnCatalogCache};
use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use kernel::interface::query::{
    BookQuery, BorrowQuery, DependOnBookQuery, DependOnBorrowQuery, DependOnUserQuery, UserQuery,
};
use kernel::interface::session::{DependOnSessionStore, SessionStore};
use kernel::interface::storage::{CoverStorage, DependOnCoverStorage};
use kernel::interface::update::{
    BookModifier, BorrowModifier, DependOnBookModifier, DependOnBorrowModifier,
    DependOnUserModifier, UserModifier,
};
use kernel::prelude::access::Actor;
use kernel::prelude::entity::{
    AccessToken, Book, BookAuthor, BookCategory, BookCopies, BookCover, BookDescription, BookId,
    BookIsbn, BookPrice, BookTitle, Borrow, BorrowId, BorrowStatus, CategorySummary, CreatedAt,
    Credential, HashedPassword, Role, SelectLimit, SelectOffset, User, UserEmail, UserId,
    UserName,
};
use kernel::KernelError;

#[derive(Debug, Clone, Default)]
pub struct State {
    books: HashMap<BookId, Book>,
    borrows: HashMap<BorrowId, Borrow>,
    users: HashMap<UserId, (User, HashedPassword)>,
}

#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    state: Arc<Mutex<State>>,
}

#[async_trait::async_trait]
impl DatabaseConnection for InMemoryDatabase {
    type Transaction = InMemoryTransaction;
    async fn transact(&self) -> error_stack::Result<Self::Transaction, KernelError> {
        let guard = self.state.clone().lock_owned().await;
        let work = guard.clone();
        Ok(InMemoryTransaction { guard, work })
    }
}

pub struct InMemoryTransaction {
    guard: OwnedMutexGuard<State>,
    work: State,
}

#[async_trait::async_trait]
impl Transaction for InMemoryTransaction {
    async fn commit(self) -> error_stack::Result<(), KernelError> {
        let InMemoryTransaction { mut guard, work } = self;
        *guard = work;
        Ok(())
    }

    async fn roll_back(self) -> error_stack::Result<(), KernelError> {
        Ok(())
    }
}

fn sorted_by<T, K: Ord>(mut items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    items.sort_by_key(key);
    items
}

fn page<T>(items: Vec<T>, limit: &SelectLimit, offset: &SelectOffset) -> Vec<T> {
    items
        .into_iter()
        .skip(*offset.as_ref() as usize)
        .take(*limit.as_ref() as usize)
        .collect()
}

pub struct InMemoryBooks;

#[async_trait::async_trait]
impl BookQuery for InMemoryBooks {
    type Transaction = InMemoryTransaction;

    async fn find_by_id(
        &self,
        con: &mut InMemoryTransaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        Ok(con.work.books.get(id).cloned())
    }

    async fn lock_by_id(
        &self,
        con: &mut InMemoryTransaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        Ok(con.work.books.get(id).cloned())
    }

    async fn find_by_isbn(
        &self,
        con: &mut InMemoryTransaction,
        isbn: &BookIsbn,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        Ok(con
            .work
            .books
            .values()
            .find(|book| book.isbn() == isbn)
            .cloned())
    }

    async fn find_all(
        &self,
        con: &mut InMemoryTransaction,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        let books = sorted_by(con.work.books.values().cloned().collect(), |book| {
            (book.title().as_ref().clone(), *book.id().as_ref())
        });
        Ok(page(books, limit, offset))
    }

    async fn find_latest(
        &self,
        con: &mut InMemoryTransaction,
        limit: &SelectLimit,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        let books = sorted_by(con.work.books.values().cloned().collect(), |book| {
            std::cmp::Reverse(*book.created_at().as_ref())
        });
        Ok(page(books, limit, &SelectOffset::default()))
    }

    async fn count(&self, con: &mut InMemoryTransaction) -> error_stack::Result<i64, KernelError> {
        Ok(con.work.books.len() as i64)
    }

    async fn count_categories(
        &self,
        con: &mut InMemoryTransaction,
    ) -> error_stack::Result<i64, KernelError> {
        let mut categories: Vec<_> = con.work.books.values().map(Book::category).collect();
        categories.sort_by_key(|category| category.as_ref().clone());
        categories.dedup();
        Ok(categories.len() as i64)
    }

    async fn top_categories(
        &self,
        con: &mut InMemoryTransaction,
        limit: &SelectLimit,
    ) -> error_stack::Result<Vec<CategorySummary>, KernelError> {
        let books = sorted_by(con.work.books.values().cloned().collect(), |book| {
            *book.created_at().as_ref()
        });
        let mut summaries: Vec<CategorySummary> = Vec::new();
        for book in books {
            let cover = book.cover().as_ref().map(|cover| cover.url().clone());
            match summaries
                .iter_mut()
                .find(|summary| &summary.category == book.category())
            {
                Some(summary) => {
                    summary.count += 1;
                    summary.cover_image = summary.cover_image.take().or(cover);
                }
                None => summaries.push(CategorySummary {
                    category: book.category().clone(),
                    count: 1,
                    cover_image: cover,
                }),
            }
        }
        let summaries = sorted_by(summaries, |summary| {
            (std::cmp::Reverse(summary.count), summary.category.as_ref().clone())
        });
        Ok(page(summaries, limit, &SelectOffset::default()))
    }
}

#[async_trait::async_trait]
impl BookModifier for InMemoryBooks {
    type Transaction = InMemoryTransaction;

    async fn create(
        &self,
        con: &mut InMemoryTransaction,
        book: &Book,
    ) -> error_stack::Result<(), KernelError> {
        con.work.books.insert(book.id().clone(), book.clone());
        Ok(())
    }

    async fn update(
        &self,
        con: &mut InMemoryTransaction,
        book: &Book,
    ) -> error_stack::Result<(), KernelError> {
        con.work.books.insert(book.id().clone(), book.clone());
        Ok(())
    }

    async fn delete(
        &self,
        con: &mut InMemoryTransaction,
        book_id: &BookId,
    ) -> error_stack::Result<(), KernelError> {
        con.work.books.remove(book_id);
        Ok(())
    }
}

pub struct InMemoryBorrows;

impl InMemoryBorrows {
    fn matching<'a>(
        con: &'a InMemoryTransaction,
        statuses: &'a [BorrowStatus],
    ) -> impl Iterator<Item = &'a Borrow> + 'a {
        con.work
            .borrows
            .values()
            .filter(move |borrow| statuses.contains(borrow.status()))
    }
}

#[async_trait::async_trait]
impl BorrowQuery for InMemoryBorrows {
    type Transaction = InMemoryTransaction;

    async fn find_by_id(
        &self,
        con: &mut InMemoryTransaction,
        id: &BorrowId,
    ) -> error_stack::Result<Option<Borrow>, KernelError> {
        Ok(con.work.borrows.get(id).cloned())
    }

    async fn lock_by_id(
        &self,
        con: &mut InMemoryTransaction,
        id: &BorrowId,
    ) -> error_stack::Result<Option<Borrow>, KernelError> {
        Ok(con.work.borrows.get(id).cloned())
    }

    async fn find_by_user(
        &self,
        con: &mut InMemoryTransaction,
        user_id: &UserId,
        statuses: &[BorrowStatus],
    ) -> error_stack::Result<Vec<Borrow>, KernelError> {
        let borrows = Self::matching(con, statuses)
            .filter(|borrow| borrow.user_id() == user_id)
            .cloned()
            .collect();
        Ok(sorted_by(borrows, |borrow: &Borrow| {
            std::cmp::Reverse(*borrow.requested_at().as_ref())
        }))
    }

    async fn find_by_status(
        &self,
        con: &mut InMemoryTransaction,
        statuses: &[BorrowStatus],
    ) -> error_stack::Result<Vec<Borrow>, KernelError> {
        let borrows = Self::matching(con, statuses).cloned().collect();
        Ok(sorted_by(borrows, |borrow: &Borrow| {
            let at = borrow
                .issued_at()
                .map(|at| *at.as_ref())
                .unwrap_or(*borrow.requested_at().as_ref());
            std::cmp::Reverse(at)
        }))
    }

    async fn count_by_user(
        &self,
        con: &mut InMemoryTransaction,
        user_id: &UserId,
        statuses: &[BorrowStatus],
    ) -> error_stack::Result<i64, KernelError> {
        Ok(Self::matching(con, statuses)
            .filter(|borrow| borrow.user_id() == user_id)
            .count() as i64)
    }

    async fn count_by_book(
        &self,
        con: &mut InMemoryTransaction,
        book_id: &BookId,
        statuses: &[BorrowStatus],
    ) -> error_stack::Result<i64, KernelError> {
        Ok(Self::matching(con, statuses)
            .filter(|borrow| borrow.book_id() == book_id)
            .count() as i64)
    }

    async fn exists_for(
        &self,
        con: &mut InMemoryTransaction,
        user_id: &UserId,
        book_id: &BookId,
        statuses: &[BorrowStatus],
    ) -> error_stack::Result<bool, KernelError> {
        Ok(Self::matching(con, statuses)
            .any(|borrow| borrow.user_id() == user_id && borrow.book_id() == book_id))
    }

    async fn count_borrowers(
        &self,
        con: &mut InMemoryTransaction,
        statuses: &[BorrowStatus],
    ) -> error_stack::Result<i64, KernelError> {
        let mut users: Vec<_> = Self::matching(con, statuses)
            .map(|borrow| *borrow.user_id().as_ref())
            .collect();
        users.sort();
        users.dedup();
        Ok(users.len() as i64)
    }
}

#[async_trait::async_trait]
impl BorrowModifier for InMemoryBorrows {
    type Transaction = InMemoryTransaction;

    async fn create(
        &self,
        con: &mut InMemoryTransaction,
        borrow: &Borrow,
    ) -> error_stack::Result<(), KernelError> {
        con.work.borrows.insert(borrow.id().clone(), borrow.clone());
        Ok(())
    }

    async fn update(
        &self,
        con: &mut InMemoryTransaction,
        borrow: &Borrow,
    ) -> error_stack::Result<(), KernelError> {
        con.work.borrows.insert(borrow.id().clone(), borrow.clone());
        Ok(())
    }
}

pub struct InMemoryUsers;

#[async_trait::async_trait]
impl UserQuery for InMemoryUsers {
    type Transaction = InMemoryTransaction;

    async fn find_by_id(
        &self,
        con: &mut InMemoryTransaction,
        id: &UserId,
    ) -> error_stack::Result<Option<User>, KernelError> {
        Ok(con.work.users.get(id).map(|(user, _)| user.clone()))
    }

    async fn lock_by_id(
        &self,
        con: &mut InMemoryTransaction,
        id: &UserId,
    ) -> error_stack::Result<Option<User>, KernelError> {
        Ok(con.work.users.get(id).map(|(user, _)| user.clone()))
    }

    async fn find_by_email(
        &self,
        con: &mut InMemoryTransaction,
        email: &UserEmail,
    ) -> error_stack::Result<Option<User>, KernelError> {
        Ok(con
            .work
            .users
            .values()
            .find(|(user, _)| user.email() == email)
            .map(|(user, _)| user.clone()))
    }

    async fn find_credential(
        &self,
        con: &mut InMemoryTransaction,
        email: &UserEmail,
    ) -> error_stack::Result<Option<Credential>, KernelError> {
        Ok(con
            .work
            .users
            .values()
            .find(|(user, _)| user.email() == email)
            .map(|(user, password)| Credential::new(user.id().clone(), password.clone())))
    }

    async fn find_all(
        &self,
        con: &mut InMemoryTransaction,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> error_stack::Result<Vec<User>, KernelError> {
        let users = sorted_by(
            con.work.users.values().map(|(user, _)| user.clone()).collect(),
            |user| (*user.created_at().as_ref(), *user.id().as_ref()),
        );
        Ok(page(users, limit, offset))
    }

    async fn count(&self, con: &mut InMemoryTransaction) -> error_stack::Result<i64, KernelError> {
        Ok(con.work.users.len() as i64)
    }
}

#[async_trait::async_trait]
impl UserModifier for InMemoryUsers {
    type Transaction = InMemoryTransaction;

    async fn create(
        &self,
        con: &mut InMemoryTransaction,
        user: &User,
        password: &HashedPassword,
    ) -> error_stack::Result<(), KernelError> {
        con.work
            .users
            .insert(user.id().clone(), (user.clone(), password.clone()));
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryCache {
    entries: Arc<std::sync::Mutex<HashMap<CacheKey, serde_json::Value>>>,
}

impl InMemoryCache {
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }
}

#[async_trait::async_trait]
impl CatalogCache for InMemoryCache {
    async fn get<T>(&self, key: &CacheKey) -> error_stack::Result<Option<T>, KernelError>
    where
        T: for<'de> Deserialize<'de> + Send,
    {
        let value = self.entries.lock().unwrap().get(key).cloned();
        Ok(value.map(|value| serde_json::from_value(value).unwrap()))
    }

    async fn set<T>(&self, key: &CacheKey, value: &T) -> error_stack::Result<(), KernelError>
    where
        T: Serialize + Sync,
    {
        let value = serde_json::to_value(value).unwrap();
        self.entries.lock().unwrap().insert(key.clone(), value);
        Ok(())
    }

    async fn invalidate(&self, key: &CacheKey) -> error_stack::Result<(), KernelError> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemorySessions {
    tokens: Arc<std::sync::Mutex<HashMap<AccessToken, UserId>>>,
}

#[async_trait::async_trait]
impl SessionStore for InMemorySessions {
    async fn issue(&self, user_id: &UserId) -> error_stack::Result<AccessToken, KernelError> {
        let token = AccessToken::new(Uuid::new_v4().simple().to_string());
        self.tokens
            .lock()
            .unwrap()
            .insert(token.clone(), user_id.clone());
        Ok(token)
    }

    async fn resolve(
        &self,
        token: &AccessToken,
    ) -> error_stack::Result<Option<UserId>, KernelError> {
        Ok(self.tokens.lock().unwrap().get(token).cloned())
    }

    async fn revoke(&self, token: &AccessToken) -> error_stack::Result<(), KernelError> {
        self.tokens.lock().unwrap().remove(token);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryCovers {
    removed: Arc<std::sync::Mutex<Vec<BookCover>>>,
}

impl InMemoryCovers {
    pub fn removed(&self) -> Vec<BookCover> {
        self.removed.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CoverStorage for InMemoryCovers {
    async fn remove(&self, cover: &BookCover) -> error_stack::Result<(), KernelError> {
        self.removed.lock().unwrap().push(cover.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct TestModule {
    database: InMemoryDatabase,
    pub cache: InMemoryCache,
    pub sessions: InMemorySessions,
    pub covers: InMemoryCovers,
}

impl TestModule {
    pub async fn seed_user(&self, role: Role) -> Actor {
        let id = UserId::new(Uuid::new_v4());
        let user = User::new(
            id.clone(),
            UserName::new(format!("{role} user")),
            UserEmail::new(format!("{}@college.edu", id.as_ref().simple())),
            role,
            None,
            None,
            CreatedAt::new(OffsetDateTime::now_utc()),
        );
        let mut state = self.database.state.lock().await;
        state
            .users
            .insert(id.clone(), (user, HashedPassword::new("unused")));
        Actor::new(id, role)
    }

    pub async fn seed_book(&self, total: i32) -> BookId {
        self.seed_book_in("General", total, None).await
    }

    pub async fn seed_book_in(
        &self,
        category: &str,
        total: i32,
        cover: Option<BookCover>,
    ) -> BookId {
        let id = BookId::new(Uuid::new_v4());
        let book = Book::new(
            id.clone(),
            BookIsbn::new(id.as_ref().simple().to_string()),
            BookTitle::new("Introduction to Algorithms"),
            BookAuthor::new("Cormen"),
            BookCategory::new(category),
            BookDescription::new(""),
            BookCopies::stocked(total).unwrap(),
            BookPrice::new(900).unwrap(),
            cover,
            None,
            CreatedAt::new(OffsetDateTime::now_utc()),
        );
        let mut state = self.database.state.lock().await;
        state.books.insert(id.clone(), book);
        id
    }

    pub async fn book(&self, id: &BookId) -> Option<Book> {
        self.database.state.lock().await.books.get(id).cloned()
    }

    pub async fn borrow(&self, id: &BorrowId) -> Option<Borrow> {
        self.database.state.lock().await.borrows.get(id).cloned()
    }

    /// Overwrites a record, for moving dates into the past.
    pub async fn put_borrow(&self, borrow: Borrow) {
        let mut state = self.database.state.lock().await;
        state.borrows.insert(borrow.id().clone(), borrow);
    }
}

impl DependOnDatabaseConnection for TestModule {
    type DatabaseConnection = InMemoryDatabase;
    fn database_connection(&self) -> &Self::DatabaseConnection {
        &self.database
    }
}

impl DependOnBookQuery for TestModule {
    type BookQuery = InMemoryBooks;
    fn book_query(&self) -> &Self::BookQuery {
        &InMemoryBooks
    }
}

impl DependOnBookModifier for TestModule {
    type BookModifier = InMemoryBooks;
    fn book_modifier(&self) -> &Self::BookModifier {
        &InMemoryBooks
    }
}

impl DependOnBorrowQuery for TestModule {
    type BorrowQuery = InMemoryBorrows;
    fn borrow_query(&self) -> &Self::BorrowQuery {
        &InMemoryBorrows
    }
}

impl DependOnBorrowModifier for TestModule {
    type BorrowModifier = InMemoryBorrows;
    fn borrow_modifier(&self) -> &Self::BorrowModifier {
        &InMemoryBorrows
    }
}

impl DependOnUserQuery for TestModule {
    type UserQuery = InMemoryUsers;
    fn user_query(&self) -> &Self::UserQuery {
        &InMemoryUsers
    }
}

impl DependOnUserModifier for TestModule {
    type UserModifier = InMemoryUsers;
    fn user_modifier(&self) -> &Self::UserModifier {
        &InMemoryUsers
    }
}

impl DependOnCatalogCache for TestModule {
    type CatalogCache = InMemoryCache;
    fn catalog_cache(&self) -> &Self::CatalogCache {
        &self.cache
    }
}

impl DependOnSessionStore for TestModule {
    type SessionStore = InMemorySessions;
    fn session_store(&self) -> &Self::SessionStore {
        &self.sessions
    }
}

impl DependOnCoverStorage for TestModule {
    type CoverStorage = InMemoryCovers;
    fn cover_storage(&self) -> &Self::CoverStorage {
        &self.covers
    }
}
