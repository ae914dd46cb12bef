//! Domain services: compose graph queries, apply role scoping, paginate,
//! and join display names from the identity store.

pub mod auth;
pub mod error;
pub mod injuries;
pub mod names;
pub mod players;
pub mod status;
pub mod teams;

pub use error::{ServiceError, ServiceResult};
pub use names::NameResolver;

use serde::Serialize;

/// Pagination envelope returned alongside every paged listing.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

impl Pagination {
    /// total_pages = ceil(total / limit); hasNext/hasPrevious derived from it.
    pub fn new(total: usize, page: usize, limit: usize) -> Self {
        let total_pages = total.div_ceil(limit.max(1));
        Self {
            total,
            page,
            limit,
            total_pages,
            has_next: page < total_pages,
            has_previous: page > 1 && total_pages > 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_math() {
        let p = Pagination::new(25, 2, 10);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next);
        assert!(p.has_previous);

        let p = Pagination::new(25, 3, 10);
        assert!(!p.has_next);
        assert!(p.has_previous);

        let p = Pagination::new(25, 1, 10);
        assert!(p.has_next);
        assert!(!p.has_previous);
    }

    #[test]
    fn test_pagination_empty_result() {
        let p = Pagination::new(0, 1, 10);
        assert_eq!(p.total_pages, 0);
        assert!(!p.has_next);
        assert!(!p.has_previous);
    }

    #[test]
    fn test_pagination_exact_multiple() {
        let p = Pagination::new(20, 2, 10);
        assert_eq!(p.total_pages, 2);
        assert!(!p.has_next);
    }
}
