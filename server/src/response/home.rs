use crate::controller::Exhaust;
use crate::response::{BookResponse, Envelope, Reply};
use application::transfer::{CategoryDto, HomeDto};
use serde::Serialize;

// shown for categories whose books have no cover
const NO_COVER: &str = "https://via.placeholder.com/150x200?text=No+Cover";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeStatsResponse {
    total_books: i64,
    total_categories: i64,
    total_active_students: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    category: String,
    count: i64,
    cover_image: String,
}

impl From<CategoryDto> for CategoryResponse {
    fn from(value: CategoryDto) -> Self {
        Self {
            category: value.category,
            count: value.count,
            cover_image: value
                .cover_image
                .filter(|cover| !cover.trim().is_empty())
                .unwrap_or_else(|| NO_COVER.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomePayload {
    stats: HomeStatsResponse,
    categories: Vec<CategoryResponse>,
    new_arrivals: Vec<BookResponse>,
}

pub struct HomePresenter(pub Reply);

impl Exhaust<HomeDto> for HomePresenter {
    type To = Envelope<HomePayload>;
    fn emit(&self, input: HomeDto) -> Self::To {
        self.0.wrap(HomePayload {
            stats: HomeStatsResponse {
                total_books: input.stats.total_books,
                total_categories: input.stats.total_categories,
                total_active_students: input.stats.active_students,
            },
            categories: input
                .top_categories
                .into_iter()
                .map(CategoryResponse::from)
                .collect(),
            new_arrivals: input
                .new_arrivals
                .into_iter()
                .map(BookResponse::from)
                .collect(),
        })
    }
}

#[cfg(test)]
mod test {
    use application::transfer::CategoryDto;

    use super::{CategoryResponse, NO_COVER};

    #[test]
    fn blank_cover_falls_back_to_placeholder() {
        for cover_image in [None, Some("  ".to_string())] {
            let response = CategoryResponse::from(CategoryDto {
                category: "Physics".to_string(),
                count: 2,
                cover_image,
            });
            assert_eq!(response.cover_image, NO_COVER);
        }
    }
}
