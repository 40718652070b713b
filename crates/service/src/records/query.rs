//! Narrow, order and page a record list for the records view.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use models::Record;

use crate::errors::ServiceError;
use crate::pagination::{Pagination, RECORDS_PAGE_SIZE};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Pending,
    InProgress,
}

impl StatusFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Completed => "completed",
            StatusFilter::Pending => "pending",
            StatusFilter::InProgress => "in-progress",
        }
    }

    /// Record statuses are compared lower-cased with spaces as hyphens,
    /// so `in-progress` matches `In Progress`.
    pub fn matches(self, status: &str) -> bool {
        match self {
            StatusFilter::All => true,
            other => normalize_status(status) == other.as_str(),
        }
    }
}

fn normalize_status(status: &str) -> String {
    status.trim().to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
}

/// Cost buckets on `totalCost`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CostFilter {
    #[default]
    All,
    /// below 100
    Low,
    /// 100 to 500, both ends included
    Medium,
    /// above 500
    High,
}

impl CostFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            CostFilter::All => "all",
            CostFilter::Low => "low",
            CostFilter::Medium => "medium",
            CostFilter::High => "high",
        }
    }

    pub fn matches(self, cost: f64) -> bool {
        match self {
            CostFilter::All => true,
            CostFilter::Low => cost < 100.0,
            CostFilter::Medium => (100.0..=500.0).contains(&cost),
            CostFilter::High => cost > 500.0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PlateFilter {
    #[default]
    All,
    Plate(String),
}

impl PlateFilter {
    pub fn matches(&self, plate: &str) -> bool {
        match self {
            PlateFilter::All => true,
            PlateFilter::Plate(p) => p == plate,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::Oldest => "oldest",
        }
    }
}

macro_rules! keyword_enum {
    ($ty:ty, $what:literal, [$($variant:expr),+ $(,)?]) => {
        impl FromStr for $ty {
            type Err = ServiceError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_lowercase();
                [$($variant),+]
                    .into_iter()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| ServiceError::Validation(format!("unknown {} '{}'", $what, s)))
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
        }
    };
}

keyword_enum!(StatusFilter, "status", [StatusFilter::All, StatusFilter::Completed, StatusFilter::Pending, StatusFilter::InProgress]);
keyword_enum!(CostFilter, "cost range", [CostFilter::All, CostFilter::Low, CostFilter::Medium, CostFilter::High]);
keyword_enum!(SortOrder, "sort order", [SortOrder::Newest, SortOrder::Oldest]);

impl FromStr for PlateFilter {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            Ok(PlateFilter::All)
        } else {
            Ok(PlateFilter::Plate(s.to_string()))
        }
    }
}

/// Filter criteria plus sort order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordQuery {
    pub search: String,
    pub status: StatusFilter,
    pub cost: CostFilter,
    pub plate: PlateFilter,
    pub sort: SortOrder,
}

/// One page of the filtered, sorted list.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPage {
    pub items: Vec<Record>,
    pub page: usize,
    pub total_pages: usize,
    pub total_matches: usize,
}

impl RecordQuery {
    /// Case-insensitive substring over driver, plate, model and each part's type and brand.
    pub fn matches_search(&self, r: &Record) -> bool {
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let hit = |s: &str| s.to_lowercase().contains(&needle);
        hit(&r.driver_name)
            || hit(&r.car_plate)
            || hit(&r.car_model)
            || r.parts.iter().any(|p| hit(&p.part_type) || hit(&p.brand_name))
    }

    pub fn matches(&self, r: &Record) -> bool {
        self.matches_search(r)
            && self.status.matches(&r.status)
            && self.cost.matches(r.total_cost)
            && self.plate.matches(&r.car_plate)
    }

    pub fn filter(&self, records: &[Record]) -> Vec<Record> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }

    /// Stable sort by date. Unparsable dates count as the oldest.
    pub fn sort(&self, records: &mut [Record]) {
        let key = |r: &Record| r.parsed_date().unwrap_or(NaiveDate::MIN);
        records.sort_by(|a, b| {
            let ord: Ordering = key(a).cmp(&key(b));
            match self.sort {
                SortOrder::Newest => ord.reverse(),
                SortOrder::Oldest => ord,
            }
        });
    }

    /// Filter, sort, then take one page.
    pub fn apply(&self, records: &[Record], page: Pagination) -> RecordPage {
        let mut matched = self.filter(records);
        self.sort(&mut matched);
        let page = page.normalize();
        RecordPage {
            items: page.slice(&matched).to_vec(),
            page: page.page,
            total_pages: page.total_pages(matched.len()),
            total_matches: matched.len(),
        }
    }

    pub fn has_active_filters(&self) -> bool {
        !self.search.trim().is_empty()
            || self.status != StatusFilter::All
            || self.cost != CostFilter::All
            || self.plate != PlateFilter::All
    }
}

/// Distinct plates, sorted, for the plate picker.
pub fn plate_options(records: &[Record]) -> Vec<String> {
    let mut plates: Vec<String> = records.iter().map(|r| r.car_plate.clone()).collect();
    plates.sort();
    plates.dedup();
    plates
}

/// Browsing state of the records view. Changing the search text, a filter
/// or the sort order goes back to page 1.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordBrowser {
    query: RecordQuery,
    page: usize,
    per_page: usize,
}

impl Default for RecordBrowser {
    fn default() -> Self { Self { query: RecordQuery::default(), page: 1, per_page: RECORDS_PAGE_SIZE } }
}

impl RecordBrowser {
    pub fn new() -> Self { Self::default() }

    pub fn query(&self) -> &RecordQuery { &self.query }
    pub fn page(&self) -> usize { self.page }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.query.search = text.into();
        self.page = 1;
    }

    pub fn set_status(&mut self, status: StatusFilter) {
        self.query.status = status;
        self.page = 1;
    }

    pub fn set_cost(&mut self, cost: CostFilter) {
        self.query.cost = cost;
        self.page = 1;
    }

    pub fn set_plate(&mut self, plate: PlateFilter) {
        self.query.plate = plate;
        self.page = 1;
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.query.sort = sort;
        self.page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.query = RecordQuery::default();
        self.page = 1;
    }

    pub fn has_active_filters(&self) -> bool { self.query.has_active_filters() }

    /// Jump to a page; 0 is read as 1.
    pub fn go_to(&mut self, page: usize) { self.page = page.max(1); }

    pub fn next_page(&mut self, records: &[Record]) {
        let total = self.total_pages(records).max(1);
        self.page = (self.page + 1).min(total);
    }

    pub fn prev_page(&mut self) { self.page = self.page.saturating_sub(1).max(1); }

    pub fn total_pages(&self, records: &[Record]) -> usize {
        Pagination::new(1, self.per_page).total_pages(self.query.filter(records).len())
    }

    pub fn current(&self, records: &[Record]) -> RecordPage {
        self.query.apply(records, Pagination::new(self.page, self.per_page))
    }
}
