//! Dashboard statistics over a record list.
//!
//! Everything here is a pure function of the records and a reference date,
//! so callers pass `today` explicitly.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use models::Record;

/// Shown in place of a plate when there are no records.
pub const NO_DATA: &str = "No data";

/// Months in the cost trend, current month included.
pub const TREND_MONTHS: u32 = 6;

/// Records listed under "recent activity".
pub const RECENT_LIMIT: usize = 5;

const MONTH_LABELS: [&str; 12] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MostServiced {
    pub plate: String,
    pub visits: usize,
}

impl MostServiced {
    pub fn none() -> Self { Self { plate: NO_DATA.to_string(), visits: 0 } }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartShare {
    pub part_type: String,
    pub count: usize,
    /// Share of all replaced parts, 0..=100.
    pub percent: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MonthCost {
    pub year: i32,
    pub month: u32,
    pub label: &'static str,
    pub cost: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_records: usize,
    pub parts_replaced: usize,
    pub total_parts: usize,
    pub total_cost: f64,
    pub most_serviced_car: MostServiced,
    pub parts_breakdown: BTreeMap<String, usize>,
    pub cost_trend: Vec<MonthCost>,
    pub recent: Vec<Record>,
}

impl DashboardStats {
    pub fn compute(records: &[Record], today: NaiveDate) -> Self {
        let parts_breakdown = parts_breakdown(records);
        Self {
            total_records: records.len(),
            parts_replaced: parts_breakdown.values().sum(),
            total_parts: records.iter().map(|r| r.parts.len()).sum(),
            total_cost: total_cost(records),
            most_serviced_car: most_serviced_car(records),
            parts_breakdown,
            cost_trend: cost_trend(records, today),
            recent: records.iter().take(RECENT_LIMIT).cloned().collect(),
        }
    }

    /// Breakdown entries by descending count, ties by part type.
    pub fn sorted_breakdown(&self) -> Vec<PartShare> {
        let mut shares: Vec<PartShare> = self
            .parts_breakdown
            .iter()
            .map(|(part_type, &count)| PartShare {
                part_type: part_type.clone(),
                count,
                percent: if self.parts_replaced == 0 {
                    0.0
                } else {
                    count as f64 * 100.0 / self.parts_replaced as f64
                },
            })
            .collect();
        // BTreeMap 已按名称排序，稳定排序只需比较数量
        shares.sort_by(|a, b| b.count.cmp(&a.count));
        shares
    }
}

pub fn parts_replaced(records: &[Record]) -> usize {
    records.iter().map(Record::replaced_count).sum()
}

pub fn total_cost(records: &[Record]) -> f64 {
    records.iter().map(|r| r.total_cost).sum()
}

/// Plate with the most records; on a tie the plate seen first wins.
pub fn most_serviced_car(records: &[Record]) -> MostServiced {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for r in records {
        let n = counts.entry(r.car_plate.as_str()).or_insert(0);
        if *n == 0 {
            order.push(r.car_plate.as_str());
        }
        *n += 1;
    }
    let mut best: Option<(&str, usize)> = None;
    for plate in order {
        let visits = counts[plate];
        if best.map_or(true, |(_, v)| visits > v) {
            best = Some((plate, visits));
        }
    }
    best.map_or_else(MostServiced::none, |(plate, visits)| MostServiced { plate: plate.to_string(), visits })
}

/// Replaced-part counts keyed by part type.
pub fn parts_breakdown(records: &[Record]) -> BTreeMap<String, usize> {
    let mut out = BTreeMap::new();
    for part in records.iter().flat_map(|r| r.parts.iter()).filter(|p| p.replaced.is_yes()) {
        *out.entry(part.part_type.clone()).or_insert(0) += 1;
    }
    out
}

/// Cost per calendar month for the trailing [`TREND_MONTHS`] months, oldest first.
/// Records whose date cannot be parsed are left out.
pub fn cost_trend(records: &[Record], today: NaiveDate) -> Vec<MonthCost> {
    let current = today.year() * 12 + today.month0() as i32;
    let mut buckets: Vec<MonthCost> = (0..TREND_MONTHS as i32)
        .rev()
        .map(|back| {
            let idx = current - back;
            let month0 = idx.rem_euclid(12) as u32;
            MonthCost {
                year: idx.div_euclid(12),
                month: month0 + 1,
                label: MONTH_LABELS[month0 as usize],
                cost: 0.0,
            }
        })
        .collect();

    for r in records {
        let Some(date) = r.parsed_date() else { continue };
        if let Some(bucket) = buckets.iter_mut().find(|b| b.year == date.year() && b.month == date.month()) {
            bucket.cost += r.total_cost;
        }
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::{Part, Replaced};

    fn rec(id: &str, plate: &str, cost: f64, date: &str, parts: Vec<Part>) -> Record {
        Record {
            id: id.into(),
            driver_name: "Tj".into(),
            car_plate: plate.into(),
            car_model: "Lexus".into(),
            parts_count: parts.len(),
            total_cost: cost,
            date: date.into(),
            status: "Completed".into(),
            parts,
        }
    }

    fn part(kind: &str, replaced: Replaced) -> Part {
        Part {
            part_type: kind.into(),
            replaced,
            brand_name: String::new(),
            supplier: String::new(),
            manufacture_date: String::new(),
            expiry_date: String::new(),
            change_date: String::new(),
            cost: 0.0,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, d).unwrap() }

    #[test]
    fn empty_input_is_all_zero() {
        let s = DashboardStats::compute(&[], day(2025, 11, 15));
        assert_eq!(s.total_records, 0);
        assert_eq!(s.total_cost, 0.0);
        assert_eq!(s.most_serviced_car, MostServiced::none());
        assert!(s.parts_breakdown.is_empty());
        assert_eq!(s.cost_trend.len(), 6);
        assert!(s.cost_trend.iter().all(|m| m.cost == 0.0));
    }

    #[test]
    fn most_serviced_and_total() {
        let records = vec![
            rec("1", "A1", 90.0, "2025-11-01", vec![]),
            rec("2", "A1", 70.0, "2025-11-03", vec![]),
            rec("3", "B2", 1000.0, "2025-10-03", vec![]),
        ];
        let s = DashboardStats::compute(&records, day(2025, 11, 15));
        assert_eq!(s.most_serviced_car, MostServiced { plate: "A1".into(), visits: 2 });
        assert_eq!(s.total_cost, 1160.0);
    }

    #[test]
    fn tie_goes_to_first_plate() {
        let records = vec![
            rec("1", "Z9", 1.0, "2025-11-01", vec![]),
            rec("2", "A1", 1.0, "2025-11-01", vec![]),
        ];
        assert_eq!(most_serviced_car(&records).plate, "Z9");
    }

    #[test]
    fn breakdown_counts_only_replaced() {
        let records = vec![
            rec("1", "A", 0.0, "2025-11-01", vec![part("Tire", Replaced::Yes), part("Battery", Replaced::No)]),
            rec("2", "B", 0.0, "2025-11-01", vec![part("Tire", Replaced::Yes), part("Air Filter", Replaced::Yes)]),
        ];
        let s = DashboardStats::compute(&records, day(2025, 11, 1));
        assert_eq!(s.parts_replaced, 3);
        assert_eq!(s.total_parts, 4);
        assert_eq!(parts_replaced(&records), 3);
        let sorted = s.sorted_breakdown();
        assert_eq!(sorted[0].part_type, "Tire");
        assert_eq!(sorted[0].count, 2);
        assert_eq!(sorted[1].part_type, "Air Filter");
        assert!((sorted[0].percent - 66.666).abs() < 0.01);
    }

    #[test]
    fn trend_is_year_aware_and_spans_new_year() {
        let records = vec![
            rec("1", "A", 100.0, "2025-01-10", vec![]),
            rec("2", "A", 40.0, "2024-01-20", vec![]),
            rec("3", "A", 5.0, "2024-11-02", vec![]),
            rec("4", "A", 7.0, "not a date", vec![]),
        ];
        let trend = cost_trend(&records, day(2025, 2, 14));
        let labels: Vec<&str> = trend.iter().map(|m| m.label).collect();
        assert_eq!(labels, vec!["Sep", "Oct", "Nov", "Dec", "Jan", "Feb"]);
        assert_eq!(trend[0].year, 2024);
        assert_eq!(trend[2].cost, 5.0);
        assert_eq!(trend[4].cost, 100.0);
        assert_eq!(trend[5].year, 2025);
    }

    #[test]
    fn recent_is_first_five_in_store_order() {
        let records: Vec<Record> = (1..=7).map(|i| rec(&i.to_string(), "A", 1.0, "2025-11-01", vec![])).collect();
        let s = DashboardStats::compute(&records, day(2025, 11, 1));
        let ids: Vec<&str> = s.recent.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);
    }
}
