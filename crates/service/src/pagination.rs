//! Pagination utilities for service layer
//!
//! Provides a simple `Pagination` struct and helpers to normalize inputs.

/// Records shown per page in the records view.
pub const RECORDS_PAGE_SIZE: usize = 5;

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page index
    pub page: usize,
    /// items per page
    pub per_page: usize,
}

impl Pagination {
    pub fn new(page: usize, per_page: usize) -> Self { Self { page, per_page } }

    /// Page 0 becomes 1, page size clamped to 1..=100.
    pub fn normalize(self) -> Self {
        Self { page: self.page.max(1), per_page: self.per_page.clamp(1, 100) }
    }

    /// `ceil(total / per_page)`; zero when there is nothing to show.
    pub fn total_pages(self, total: usize) -> usize {
        let per = self.normalize().per_page;
        total.div_ceil(per)
    }

    /// Half-open index range `[start, end)` of this page within `total` items.
    /// Pages past the end give an empty range at `total`.
    pub fn bounds(self, total: usize) -> (usize, usize) {
        let p = self.normalize();
        let start = (p.page - 1).saturating_mul(p.per_page).min(total);
        let end = start.saturating_add(p.per_page).min(total);
        (start, end)
    }

    pub fn slice<'a, T>(self, items: &'a [T]) -> &'a [T] {
        let (start, end) = self.bounds(items.len());
        &items[start..end]
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, per_page: RECORDS_PAGE_SIZE } }
}

#[cfg(test)]
mod tests {
    use super::Pagination;

    #[test]
    fn normalize_clamps_zero_to_defaults() {
        let p = Pagination { page: 0, per_page: 0 }.normalize();
        assert_eq!(p.page, 1);
        assert_eq!(p.per_page, 1);
    }

    #[test]
    fn normalize_clamps_upper_bound() {
        let p = Pagination { page: 5, per_page: 1000 }.normalize();
        assert_eq!(p.page, 5);
        assert_eq!(p.per_page, 100);
    }

    #[test]
    fn default_values_are_sane() {
        let d = Pagination::default();
        assert_eq!(d.page, 1);
        assert_eq!(d.per_page, 5);
    }

    #[test]
    fn pages_partition_items() {
        let items: Vec<u32> = (0..12).collect();
        let pages = Pagination::new(1, 5).total_pages(items.len());
        assert_eq!(pages, 3);
        let joined: Vec<u32> = (1..=pages)
            .flat_map(|n| Pagination::new(n, 5).slice(&items).to_vec())
            .collect();
        assert_eq!(joined, items);
        assert!(Pagination::new(4, 5).slice(&items).is_empty());
        assert_eq!(Pagination::new(0, 5).slice(&items), &items[0..5]);
        assert_eq!(Pagination::new(1, 5).total_pages(0), 0);
    }
}
