use time::OffsetDateTime;
use uuid::Uuid;

use kernel::interface::cache::DependOnCatalogCache;
use kernel::interface::database::{DatabaseConnection, Transaction};
use kernel::interface::query::{
    BookQuery, BorrowQuery, DependOnBookQuery, DependOnBorrowQuery, DependOnUserQuery, UserQuery,
};
use kernel::interface::update::{
    BookModifier, BorrowModifier, DependOnBookModifier, DependOnBorrowModifier,
};
use kernel::prelude::access::{Action, Actor};
use kernel::prelude::entity::{
    BookId, Borrow, BorrowId, BorrowStatus, BorrowTransition, MAX_ACTIVE_BORROWS,
};
use kernel::{KernelError, Rejection};

use crate::service::invalidate_home;
use crate::transfer::{BorrowDto, BorrowTransitionDto, RequestIssueDto};

/// The five transitions of a borrow record.
///
/// Every transition runs in one transaction: the rows it reads are locked before
/// any rule is checked, and the record change commits together with the
/// matching change to the book's available copies.
#[async_trait::async_trait]
pub trait BorrowLifecycleService:
    'static
    + Sync
    + Send
    + DependOnUserQuery
    + DependOnBookQuery
    + DependOnBookModifier
    + DependOnBorrowQuery
    + DependOnBorrowModifier
    + DependOnCatalogCache
{
    async fn request_issue(
        &self,
        actor: &Actor,
        dto: RequestIssueDto,
    ) -> error_stack::Result<BorrowDto, KernelError> {
        actor.authorize(Action::Borrow(BorrowTransition::RequestIssue))?;
        let mut con = self.database_connection().transact().await?;

        // one student's requests run one at a time, so the limit below holds
        self.user_query()
            .lock_by_id(&mut con, actor.id())
            .await?
            .ok_or_else(|| KernelError::Unauthorized.because("User not found"))?;

        let book_id = BookId::new(dto.book_id);
        let book = self
            .book_query()
            .lock_by_id(&mut con, &book_id)
            .await?
            .ok_or_else(|| KernelError::NotFound.because("Book not found"))?;

        let active = self
            .borrow_query()
            .count_by_user(&mut con, actor.id(), &BorrowStatus::LIMITED)
            .await?;
        if active >= MAX_ACTIVE_BORROWS {
            return Err(KernelError::Conflict.because(format!(
                "Borrow limit reached (max {MAX_ACTIVE_BORROWS} books)"
            )));
        }

        let duplicate = self
            .borrow_query()
            .exists_for(&mut con, actor.id(), &book_id, &BorrowStatus::OPEN)
            .await?;
        if duplicate {
            return Err(KernelError::Conflict
                .because("You already have an active request for this book"));
        }

        let reserved = self
            .borrow_query()
            .count_by_book(&mut con, &book_id, &[BorrowStatus::Requested])
            .await?;
        if i64::from(book.copies().available()) <= reserved {
            return Err(KernelError::Conflict.because("No available copies"));
        }

        let now = OffsetDateTime::now_utc();
        let borrow = Borrow::request(
            BorrowId::new(Uuid::new_v4()),
            book_id,
            actor.id().clone(),
            now,
        );
        self.borrow_modifier().create(&mut con, &borrow).await?;
        con.commit().await?;

        tracing::info!(
            "borrow {} requested for book {} by {}",
            borrow.id().as_ref(),
            borrow.book_id().as_ref(),
            actor.id().as_ref()
        );
        Ok(BorrowDto::new(borrow, now))
    }

    async fn approve_issue(
        &self,
        actor: &Actor,
        dto: BorrowTransitionDto,
    ) -> error_stack::Result<BorrowDto, KernelError> {
        actor.authorize(Action::Borrow(BorrowTransition::ApproveIssue))?;
        let mut con = self.database_connection().transact().await?;

        let borrow = self
            .borrow_query()
            .lock_by_id(&mut con, &BorrowId::new(dto.id))
            .await?
            .ok_or_else(|| KernelError::NotFound.because("Borrow request not found"))?;
        let now = OffsetDateTime::now_utc();
        let borrow = borrow.approve_issue(actor.id(), now)?;

        let book = self
            .book_query()
            .lock_by_id(&mut con, borrow.book_id())
            .await?
            .ok_or_else(|| KernelError::NotFound.because("Book not found"))?;
        let copies = book.copies().check_out()?;
        let book = book.reconstruct(|book| book.copies = copies);

        self.book_modifier().update(&mut con, &book).await?;
        self.borrow_modifier().update(&mut con, &borrow).await?;
        con.commit().await?;
        invalidate_home(self.catalog_cache()).await;

        tracing::info!(
            "borrow {} issued by {}, {} copies left",
            borrow.id().as_ref(),
            actor.id().as_ref(),
            copies.available()
        );
        Ok(BorrowDto::new(borrow, now))
    }

    async fn request_return(
        &self,
        actor: &Actor,
        dto: BorrowTransitionDto,
    ) -> error_stack::Result<BorrowDto, KernelError> {
        let action = Action::Borrow(BorrowTransition::RequestReturn);
        actor.authorize(action)?;
        let mut con = self.database_connection().transact().await?;

        let borrow = self
            .borrow_query()
            .lock_by_id(&mut con, &BorrowId::new(dto.id))
            .await?
            .ok_or_else(|| KernelError::NotFound.because("Borrow record not found"))?;
        actor.authorize_owner(action, borrow.user_id())?;
        let borrow = borrow.request_return()?;

        self.borrow_modifier().update(&mut con, &borrow).await?;
        con.commit().await?;

        tracing::info!("return requested for borrow {}", borrow.id().as_ref());
        Ok(BorrowDto::new(borrow, OffsetDateTime::now_utc()))
    }

    async fn approve_return(
        &self,
        actor: &Actor,
        dto: BorrowTransitionDto,
    ) -> error_stack::Result<BorrowDto, KernelError> {
        actor.authorize(Action::Borrow(BorrowTransition::ApproveReturn))?;
        let mut con = self.database_connection().transact().await?;

        let borrow = self
            .borrow_query()
            .lock_by_id(&mut con, &BorrowId::new(dto.id))
            .await?
            .ok_or_else(|| KernelError::NotFound.because("Borrow record not found"))?;
        let now = OffsetDateTime::now_utc();
        let borrow = borrow.approve_return(actor.id(), now)?;

        let book = self
            .book_query()
            .lock_by_id(&mut con, borrow.book_id())
            .await?
            .ok_or_else(|| KernelError::NotFound.because("Book not found"))?;
        let copies = book.copies().check_in()?;
        let book = book.reconstruct(|book| book.copies = copies);

        self.book_modifier().update(&mut con, &book).await?;
        self.borrow_modifier().update(&mut con, &borrow).await?;
        con.commit().await?;
        invalidate_home(self.catalog_cache()).await;

        let dto = BorrowDto::new(borrow, now);
        tracing::info!("borrow {} returned, fine {}", dto.id, dto.fine);
        Ok(dto)
    }

    async fn reject_return(
        &self,
        actor: &Actor,
        dto: BorrowTransitionDto,
    ) -> error_stack::Result<BorrowDto, KernelError> {
        actor.authorize(Action::Borrow(BorrowTransition::RejectReturn))?;
        let mut con = self.database_connection().transact().await?;

        let borrow = self
            .borrow_query()
            .lock_by_id(&mut con, &BorrowId::new(dto.id))
            .await?
            .ok_or_else(|| KernelError::NotFound.because("Borrow record not found"))?;
        let borrow = borrow.reject_return()?;

        self.borrow_modifier().update(&mut con, &borrow).await?;
        con.commit().await?;

        tracing::info!("return of borrow {} rejected", borrow.id().as_ref());
        Ok(BorrowDto::new(borrow, OffsetDateTime::now_utc()))
    }
}

impl<T> BorrowLifecycleService for T where
    T: DependOnUserQuery
        + DependOnBookQuery
        + DependOnBookModifier
        + DependOnBorrowQuery
        + DependOnBorrowModifier
        + DependOnCatalogCache
{
}
