use kernel::interface::cache::{CacheKey, CatalogCache, DependOnCatalogCache};
use kernel::interface::database::DatabaseConnection;
use kernel::interface::query::{BookQuery, BorrowQuery, DependOnBookQuery, DependOnBorrowQuery};
use kernel::prelude::entity::{BorrowStatus, SelectLimit};
use kernel::KernelError;

use crate::transfer::{BookDto, CategoryDto, HomeDto, HomeStatsDto};

const TOP_CATEGORIES: i64 = 4;
const NEW_ARRIVALS: i64 = 4;

#[async_trait::async_trait]
pub trait HomeService:
    'static + Sync + Send + DependOnBookQuery + DependOnBorrowQuery + DependOnCatalogCache
{
    /// Landing page summary, served from the catalog cache while it is fresh.
    async fn get_home(&self) -> error_stack::Result<HomeDto, KernelError> {
        let key = CacheKey::home();
        match self.catalog_cache().get::<HomeDto>(&key).await {
            Ok(Some(home)) => return Ok(home),
            Ok(None) => {}
            Err(report) => tracing::warn!("home cache unavailable: {report:?}"),
        }

        let mut connection = self.database_connection().transact().await?;
        let stats = HomeStatsDto {
            total_books: self.book_query().count(&mut connection).await?,
            total_categories: self.book_query().count_categories(&mut connection).await?,
            active_students: self
                .borrow_query()
                .count_borrowers(&mut connection, &[BorrowStatus::Issued])
                .await?,
        };
        let top_categories = self
            .book_query()
            .top_categories(&mut connection, &SelectLimit::new(TOP_CATEGORIES))
            .await?
            .into_iter()
            .map(CategoryDto::from)
            .collect();
        let new_arrivals = self
            .book_query()
            .find_latest(&mut connection, &SelectLimit::new(NEW_ARRIVALS))
            .await?
            .into_iter()
            .map(BookDto::from)
            .collect();
        let home = HomeDto {
            stats,
            top_categories,
            new_arrivals,
        };

        if let Err(report) = self.catalog_cache().set(&key, &home).await {
            tracing::warn!("failed to cache home summary: {report:?}");
        }
        Ok(home)
    }
}

impl<T> HomeService for T where T: DependOnBookQuery + DependOnBorrowQuery + DependOnCatalogCache {}

#[cfg(test)]
mod test {
    use kernel::interface::cache::CacheKey;
    use kernel::prelude::entity::{BookCover, Role};

    use crate::mock::TestModule;
    use crate::service::{BorrowLifecycleService, HomeService};
    use crate::transfer::{BorrowTransitionDto, RequestIssueDto};

    #[tokio::test]
    async fn summarizes_catalog_and_loans() {
        let module = TestModule::default();
        let cover = BookCover::new("/covers/net.png", None);
        let network = module.seed_book_in("Networks", 2, Some(cover)).await;
        module.seed_book_in("Networks", 1, None).await;
        module.seed_book_in("Math", 1, None).await;

        let librarian = module.seed_user(Role::Librarian).await;
        let student = module.seed_user(Role::Student).await;
        let borrow = module
            .request_issue(
                &student,
                RequestIssueDto {
                    book_id: *network.as_ref(),
                },
            )
            .await
            .unwrap();
        // requested only, not yet active
        assert_eq!(module.get_home().await.unwrap().stats.active_students, 0);

        module
            .approve_issue(&librarian, BorrowTransitionDto { id: borrow.id })
            .await
            .unwrap();
        let home = module.get_home().await.unwrap();
        assert_eq!(home.stats.total_books, 3);
        assert_eq!(home.stats.total_categories, 2);
        assert_eq!(home.stats.active_students, 1);
        assert_eq!(home.top_categories[0].category, "Networks");
        assert_eq!(home.top_categories[0].count, 2);
        assert_eq!(
            home.top_categories[0].cover_image.as_deref(),
            Some("/covers/net.png")
        );
        assert_eq!(home.new_arrivals.len(), 3);
    }

    #[tokio::test]
    async fn served_from_cache_until_invalidated() {
        let module = TestModule::default();
        module.seed_book(1).await;
        let first = module.get_home().await.unwrap();
        assert!(module.cache.contains(&CacheKey::home()));

        // bypasses the services, so the cache is not told
        module.seed_book(1).await;
        assert_eq!(module.get_home().await.unwrap(), first);
    }
}
