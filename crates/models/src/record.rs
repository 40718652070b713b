use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::id;
use crate::part::Part;

/// Status stamped on every record created through the entry flow.
pub const STATUS_COMPLETED: &str = "Completed";

/// Calendar date format used for `Record::date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const COST_EPSILON: f64 = 1e-6;

/// One maintenance visit as stored in the `records` collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(deserialize_with = "id::string_or_number")]
    pub id: String,
    pub driver_name: String,
    pub car_plate: String,
    pub car_model: String,
    #[serde(default)]
    pub parts_count: usize,
    #[serde(default)]
    pub total_cost: f64,
    #[serde(default)]
    pub date: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// Create/replace payload: everything but the id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordInput {
    pub driver_name: String,
    pub car_plate: String,
    pub car_model: String,
    #[serde(default)]
    pub parts_count: usize,
    #[serde(default)]
    pub total_cost: f64,
    #[serde(default)]
    pub date: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub parts: Vec<Part>,
}

fn default_status() -> String { STATUS_COMPLETED.to_string() }

/// Parse a stored record date. Accepts `YYYY-MM-DD` and full RFC 3339 timestamps.
pub fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

impl Record {
    pub fn from_input(id: String, input: RecordInput) -> Self {
        Self {
            id,
            driver_name: input.driver_name,
            car_plate: input.car_plate,
            car_model: input.car_model,
            parts_count: input.parts_count,
            total_cost: input.total_cost,
            date: input.date,
            status: input.status,
            parts: input.parts,
        }
    }

    pub fn to_input(&self) -> RecordInput {
        RecordInput {
            driver_name: self.driver_name.clone(),
            car_plate: self.car_plate.clone(),
            car_model: self.car_model.clone(),
            parts_count: self.parts_count,
            total_cost: self.total_cost,
            date: self.date.clone(),
            status: self.status.clone(),
            parts: self.parts.clone(),
        }
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> { parse_record_date(&self.date) }

    /// Number of parts flagged as replaced.
    pub fn replaced_count(&self) -> usize {
        self.parts.iter().filter(|p| p.replaced.is_yes()).count()
    }

    pub fn parts_cost(&self) -> f64 { self.parts.iter().map(|p| p.cost).sum() }

    /// `partsCount` must equal the number of parts and `totalCost` their summed cost.
    pub fn check_consistency(&self) -> Result<(), ModelError> {
        if self.parts_count != self.parts.len() {
            return Err(ModelError::Inconsistent(format!(
                "partsCount {} but {} parts attached",
                self.parts_count,
                self.parts.len()
            )));
        }
        let sum = self.parts_cost();
        if (sum - self.total_cost).abs() > COST_EPSILON {
            return Err(ModelError::Inconsistent(format!("totalCost {} but parts sum to {}", self.total_cost, sum)));
        }
        Ok(())
    }
}

impl RecordInput {
    /// Well-formedness only; the "at least one part" rule belongs to the entry flow.
    pub fn validate(&self) -> Result<(), ModelError> {
        if !self.total_cost.is_finite() || self.total_cost < 0.0 {
            return Err(ModelError::Validation("totalCost cannot be negative".into()));
        }
        for part in &self.parts {
            part.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::part::Replaced;

    fn part(kind: &str, replaced: Replaced, cost: f64) -> Part {
        Part {
            part_type: kind.into(),
            replaced,
            brand_name: String::new(),
            supplier: String::new(),
            manufacture_date: String::new(),
            expiry_date: String::new(),
            change_date: String::new(),
            cost,
        }
    }

    #[test]
    fn parses_dates_in_both_forms() {
        assert_eq!(parse_record_date("2025-11-03"), NaiveDate::from_ymd_opt(2025, 11, 3));
        assert_eq!(parse_record_date("2025-11-03T10:00:00Z"), NaiveDate::from_ymd_opt(2025, 11, 3));
        assert_eq!(parse_record_date("soon"), None);
    }

    #[test]
    fn consistency_checks_count_and_sum() {
        let parts = vec![part("Battery", Replaced::No, 50.0), part("Air Filter", Replaced::Yes, 40.0)];
        let mut r = Record {
            id: "1".into(),
            driver_name: "Tj".into(),
            car_plate: "54212".into(),
            car_model: "Lexus".into(),
            parts_count: 2,
            total_cost: 90.0,
            date: "2025-11-01".into(),
            status: STATUS_COMPLETED.into(),
            parts,
        };
        assert!(r.check_consistency().is_ok());
        assert_eq!(r.replaced_count(), 1);
        r.total_cost = 91.0;
        assert!(matches!(r.check_consistency(), Err(ModelError::Inconsistent(_))));
        r.total_cost = 90.0;
        r.parts_count = 3;
        assert!(r.check_consistency().is_err());
    }

    #[test]
    fn input_round_trips_through_record() {
        let input = RecordInput {
            driver_name: "A".into(),
            car_plate: "P".into(),
            car_model: "M".into(),
            parts_count: 1,
            total_cost: 10.0,
            date: "2025-01-01".into(),
            status: STATUS_COMPLETED.into(),
            parts: vec![part("Tire", Replaced::Yes, 10.0)],
        };
        let r = Record::from_input("abc".into(), input.clone());
        assert_eq!(r.to_input(), input);
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["driverName"], "A");
        assert_eq!(v["partsCount"], 1);
    }

    #[test]
    fn status_defaults_when_absent() {
        let r: Record = serde_json::from_str(
            r#"{"id":3,"driverName":"x","carPlate":"p","carModel":"m","parts":[]}"#,
        )
        .unwrap();
        assert_eq!(r.id, "3");
        assert_eq!(r.status, STATUS_COMPLETED);
        assert_eq!(r.total_cost, 0.0);
    }
}
