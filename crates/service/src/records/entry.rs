//! Draft record assembled part by part before it is sent to the store.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{info, instrument, warn};

use models::record::{DATE_FORMAT, STATUS_COMPLETED};
use models::{ModelError, Part, Record, RecordInput, Replaced};

use crate::client::{ClientError, RecordsApi};

/// Field name → message. Keys are the wire names of the form fields.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// Key under which the "no parts" error is reported.
pub const PARTS_KEY: &str = "parts";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    DriverName,
    CarPlate,
    CarModel,
    PartType,
    PartReplaced,
    PartBrand,
    Supplier,
    ManufactureDate,
    ExpiryDate,
    PartChangeDate,
    PartCost,
}

impl Field {
    pub const ALL: [Field; 11] = [
        Field::DriverName,
        Field::CarPlate,
        Field::CarModel,
        Field::PartType,
        Field::PartReplaced,
        Field::PartBrand,
        Field::Supplier,
        Field::ManufactureDate,
        Field::ExpiryDate,
        Field::PartChangeDate,
        Field::PartCost,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Field::DriverName => "driverName",
            Field::CarPlate => "carPlate",
            Field::CarModel => "carModel",
            Field::PartType => "partType",
            Field::PartReplaced => "partReplaced",
            Field::PartBrand => "partBrand",
            Field::Supplier => "supplier",
            Field::ManufactureDate => "manufactureDate",
            Field::ExpiryDate => "expiryDate",
            Field::PartChangeDate => "partChangeDate",
            Field::PartCost => "partCost",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.key()) }
}

impl FromStr for Field {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|f| f.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ModelError::Validation(format!("unknown field '{s}'")))
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("record is incomplete: {}", describe(.0))]
    Invalid(FieldErrors),
    #[error("failed to save record: {0}")]
    Transport(#[from] ClientError),
}

fn describe(errors: &FieldErrors) -> String {
    errors.values().cloned().collect::<Vec<_>>().join("; ")
}

/// Part fields being edited before "add part".
#[derive(Clone, Debug, PartialEq)]
pub struct PartDraft {
    pub part_type: String,
    pub replaced: Replaced,
    pub brand_name: String,
    pub supplier: String,
    pub manufacture_date: String,
    pub expiry_date: String,
    pub change_date: String,
    /// Raw text as typed; parsed when the part is added.
    pub cost: String,
}

impl Default for PartDraft {
    fn default() -> Self {
        Self {
            part_type: String::new(),
            replaced: Replaced::No,
            brand_name: String::new(),
            supplier: String::new(),
            manufacture_date: String::new(),
            expiry_date: String::new(),
            change_date: String::new(),
            cost: "0.00".to_string(),
        }
    }
}

/// Empty or unparsable text counts as zero. The whole string must be a
/// number: `12abc` is unparsable, not 12.
fn parse_cost(raw: &str) -> f64 {
    raw.trim().parse::<f64>().ok().filter(|c| c.is_finite()).unwrap_or(0.0)
}

#[derive(Clone, Debug, Default)]
pub struct RecordEntryBuilder {
    driver_name: String,
    car_plate: String,
    car_model: String,
    draft: PartDraft,
    parts: Vec<Part>,
    errors: FieldErrors,
}

impl RecordEntryBuilder {
    pub fn new() -> Self { Self::default() }

    pub fn parts(&self) -> &[Part] { &self.parts }
    pub fn draft(&self) -> &PartDraft { &self.draft }
    pub fn errors(&self) -> &FieldErrors { &self.errors }

    pub fn value(&self, field: Field) -> String {
        match field {
            Field::DriverName => self.driver_name.clone(),
            Field::CarPlate => self.car_plate.clone(),
            Field::CarModel => self.car_model.clone(),
            Field::PartType => self.draft.part_type.clone(),
            Field::PartReplaced => self.draft.replaced.to_string(),
            Field::PartBrand => self.draft.brand_name.clone(),
            Field::Supplier => self.draft.supplier.clone(),
            Field::ManufactureDate => self.draft.manufacture_date.clone(),
            Field::ExpiryDate => self.draft.expiry_date.clone(),
            Field::PartChangeDate => self.draft.change_date.clone(),
            Field::PartCost => self.draft.cost.clone(),
        }
    }

    /// Store a field value and re-validate that field.
    pub fn set_field(&mut self, field: Field, value: &str) {
        let v = value.to_string();
        match field {
            Field::DriverName => self.driver_name = v,
            Field::CarPlate => self.car_plate = v,
            Field::CarModel => self.car_model = v,
            Field::PartType => self.draft.part_type = v,
            Field::PartReplaced => self.draft.replaced = value.parse().unwrap_or_default(),
            Field::PartBrand => self.draft.brand_name = v,
            Field::Supplier => self.draft.supplier = v,
            Field::ManufactureDate => self.draft.manufacture_date = v,
            Field::ExpiryDate => self.draft.expiry_date = v,
            Field::PartChangeDate => self.draft.change_date = v,
            Field::PartCost => self.draft.cost = v,
        }
        self.validate_field(field, value);
    }

    /// Update the error entry for one field. Fields without rules are ignored.
    pub fn validate_field(&mut self, field: Field, value: &str) {
        let trimmed = value.trim();
        let problem = match field {
            Field::DriverName if trimmed.is_empty() => Some("Driver name is required"),
            Field::DriverName if trimmed.chars().count() < 2 => Some("Driver name must be at least 2 characters"),
            Field::CarPlate if trimmed.is_empty() => Some("Car plate is required"),
            Field::CarModel if trimmed.is_empty() => Some("Car model is required"),
            Field::PartType if value.is_empty() => Some("Part type is required"),
            Field::PartCost if trimmed.parse::<f64>().is_ok_and(|c| c < 0.0) => Some("Cost cannot be negative"),
            Field::DriverName | Field::CarPlate | Field::CarModel | Field::PartType | Field::PartCost => None,
            _ => return,
        };
        match problem {
            Some(msg) => {
                self.errors.insert(field.key(), msg.to_string());
            }
            None => {
                self.errors.remove(field.key());
            }
        }
    }

    /// Move the draft into the parts list and reset it.
    /// On error nothing but the error map changes.
    pub fn add_part(&mut self) -> Result<&Part, ModelError> {
        if self.draft.part_type.is_empty() {
            let msg = "Please select a part type";
            self.errors.insert(Field::PartType.key(), msg.to_string());
            return Err(ModelError::Validation(msg.into()));
        }
        let cost = parse_cost(&self.draft.cost);
        if cost < 0.0 {
            let msg = "Cost cannot be negative";
            self.errors.insert(Field::PartCost.key(), msg.to_string());
            return Err(ModelError::Validation(msg.into()));
        }

        let d = std::mem::take(&mut self.draft);
        self.parts.push(Part {
            part_type: d.part_type,
            replaced: d.replaced,
            brand_name: d.brand_name,
            supplier: d.supplier,
            manufacture_date: d.manufacture_date,
            expiry_date: d.expiry_date,
            change_date: d.change_date,
            cost,
        });
        self.errors.remove(Field::PartType.key());
        self.errors.remove(Field::PartCost.key());
        self.errors.remove(PARTS_KEY);
        Ok(&self.parts[self.parts.len() - 1])
    }

    /// Out-of-range indexes are ignored.
    pub fn remove_part(&mut self, index: usize) -> Option<Part> {
        (index < self.parts.len()).then(|| self.parts.remove(index))
    }

    pub fn total_cost(&self) -> f64 { self.parts.iter().map(|p| p.cost).sum() }

    fn form_errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.driver_name.trim().is_empty() {
            errors.insert(Field::DriverName.key(), "Driver name is required".into());
        }
        if self.car_plate.trim().is_empty() {
            errors.insert(Field::CarPlate.key(), "Car plate is required".into());
        }
        if self.car_model.trim().is_empty() {
            errors.insert(Field::CarModel.key(), "Car model is required".into());
        }
        if self.parts.is_empty() {
            errors.insert(PARTS_KEY, "Please add at least one part".into());
        }
        errors
    }

    /// Check the whole form, replacing the error map with what was found.
    pub fn validate_form(&mut self) -> bool {
        self.errors = self.form_errors();
        self.errors.is_empty()
    }

    /// Whether the form would pass [`validate_form`](Self::validate_form), without touching errors.
    pub fn is_ready(&self) -> bool { self.form_errors().is_empty() }

    /// The create payload, stamped with `today`.
    pub fn build(&mut self, today: NaiveDate) -> Result<RecordInput, SubmitError> {
        if !self.validate_form() {
            return Err(SubmitError::Invalid(self.errors.clone()));
        }
        Ok(RecordInput {
            driver_name: self.driver_name.clone(),
            car_plate: self.car_plate.clone(),
            car_model: self.car_model.clone(),
            parts_count: self.parts.len(),
            total_cost: self.total_cost(),
            date: today.format(DATE_FORMAT).to_string(),
            status: STATUS_COMPLETED.to_string(),
            parts: self.parts.clone(),
        })
    }

    /// Validate and create the record. The builder is cleared on success and
    /// left untouched on failure or when the future is dropped, so a retry
    /// sends the same payload. `&mut self` keeps submits on one builder serial.
    #[instrument(skip(self, api), fields(plate = %self.car_plate, parts = self.parts.len()))]
    pub async fn submit(&mut self, api: &dyn RecordsApi, today: NaiveDate) -> Result<Record, SubmitError> {
        let input = self.build(today)?;
        match api.create_record(&input).await {
            Ok(record) => {
                info!(id = %record.id, total = record.total_cost, "record saved");
                *self = Self::default();
                Ok(record)
            }
            Err(e) => {
                warn!(error = %e, "record save failed");
                Err(e.into())
            }
        }
    }
}
