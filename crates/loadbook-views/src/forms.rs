//! Editable forms for loads and bookings
//!
//! Forms hold raw user input. [`LoadForm::to_payload`] and
//! [`BookingForm::to_payload`] validate it and build the request body;
//! nothing is sent unless validation passes.

use chrono::{DateTime, Utc};
use loadbook_core::{BookingPayload, Facility, Load, LoadPayload, TruckType};
use std::fmt;
use validator::{Validate, ValidationError, ValidationErrors};

/// One failed field and the message shown next to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Form field name
    pub field: String,
    /// Message in the form's wording
    pub message: String,
}

/// Validation failures of a form, in field order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(Vec<FieldError>);

impl FormErrors {
    /// Whether the form passed validation
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failed fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Failures in field order
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Message for `field`, if it failed
    #[must_use]
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }

    fn push(&mut self, field: &str, message: &str) {
        if self.message_for(field).is_none() {
            self.0.push(FieldError {
                field: field.to_string(),
                message: message.to_string(),
            });
        }
    }

    /// Reorder failures to follow `fields`
    fn sort_by_fields(&mut self, fields: &[&str]) {
        self.0.sort_by_key(|error| {
            fields
                .iter()
                .position(|field| *field == error.field)
                .unwrap_or(fields.len())
        });
    }

    /// Collect validator output, ordered by `fields`
    fn from_validation(errors: &ValidationErrors, fields: &[&str]) -> Self {
        let mut collected = Self::default();
        let by_field = errors.field_errors();
        for field in fields {
            let first = by_field
                .iter()
                .find(|(name, _)| AsRef::<str>::as_ref(name) == *field)
                .and_then(|(_, errors)| errors.first());
            if let Some(error) = first {
                let message = error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string);
                collected.push(field, &message);
            }
        }
        collected
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|error| error.message.as_str()).collect();
        f.write_str(&messages.join("; "))
    }
}

impl From<FormErrors> for loadbook_core::Error {
    fn from(errors: FormErrors) -> Self {
        errors.0.into_iter().next().map_or_else(
            || Self::Other("Form is invalid".to_string()),
            |first| Self::Validation {
                field: first.field,
                message: first.message,
            },
        )
    }
}

fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("required"))
    } else {
        Ok(())
    }
}

fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Field order used when reporting load form errors
const LOAD_FIELDS: [&str; 9] = [
    "shipper_id",
    "product_type",
    "loading_point",
    "unloading_point",
    "loading_date",
    "unloading_date",
    "truck_type",
    "no_of_trucks",
    "weight",
];

/// Input for creating or editing a load
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct LoadForm {
    /// Shipper identifier
    #[validate(custom(function = "non_blank", message = "Please enter shipper ID"))]
    pub shipper_id: String,

    /// What is being shipped
    #[validate(custom(function = "non_blank", message = "Please enter product type"))]
    pub product_type: String,

    /// Pickup location
    #[validate(custom(function = "non_blank", message = "Please enter loading point"))]
    pub loading_point: String,

    /// Delivery location
    #[validate(custom(function = "non_blank", message = "Please enter unloading point"))]
    pub unloading_point: String,

    /// Pickup date-time
    #[validate(required(message = "Please select loading date"))]
    pub loading_date: Option<DateTime<Utc>>,

    /// Delivery date-time
    #[validate(required(message = "Please select unloading date"))]
    pub unloading_date: Option<DateTime<Utc>>,

    /// Requested truck kind
    #[validate(required(message = "Please select truck type"))]
    pub truck_type: Option<TruckType>,

    /// Number of trucks
    #[validate(
        required(message = "Please enter number of trucks"),
        range(min = 1, message = "Number of trucks must be at least 1")
    )]
    pub no_of_trucks: Option<u32>,

    /// Weight in kilograms
    #[validate(
        required(message = "Please enter weight"),
        range(min = 0.0, message = "Weight cannot be negative")
    )]
    pub weight: Option<f64>,

    /// Free-form note; blank means none
    pub comment: String,
}

impl LoadForm {
    /// Pre-fill the form from an existing load
    #[must_use]
    pub fn from_load(load: &Load) -> Self {
        Self {
            shipper_id: load.shipper_id.clone(),
            product_type: load.product_type.clone(),
            loading_point: load.facility.loading_point.clone(),
            unloading_point: load.facility.unloading_point.clone(),
            loading_date: Some(load.facility.loading_date),
            unloading_date: Some(load.facility.unloading_date),
            truck_type: Some(load.truck_type.clone()),
            no_of_trucks: Some(load.no_of_trucks),
            weight: Some(load.weight),
            comment: load.comment.clone().unwrap_or_default(),
        }
    }

    /// Validate the input without building a payload
    pub fn check(&self) -> FormErrors {
        let mut errors = self
            .validate()
            .err()
            .map(|errors| FormErrors::from_validation(&errors, &LOAD_FIELDS))
            .unwrap_or_default();

        if self.truck_type.as_ref().is_some_and(|kind| !kind.is_known()) {
            errors.push("truck_type", "Please select truck type");
        }
        if self.weight.is_some_and(|weight| !weight.is_finite()) {
            errors.push("weight", "Please enter weight");
        }
        errors.sort_by_fields(&LOAD_FIELDS);
        errors
    }

    /// Validate and build the request body, nesting the facility fields
    ///
    /// # Errors
    ///
    /// Returns every failed field when the form is incomplete or out of range.
    pub fn to_payload(&self) -> Result<LoadPayload, FormErrors> {
        let errors = self.check();
        let (
            Some(loading_date),
            Some(unloading_date),
            Some(truck_type),
            Some(no_of_trucks),
            Some(weight),
        ) = (
            self.loading_date,
            self.unloading_date,
            self.truck_type.clone(),
            self.no_of_trucks,
            self.weight,
        )
        else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(LoadPayload {
            shipper_id: self.shipper_id.trim().to_string(),
            facility: Facility {
                loading_point: self.loading_point.trim().to_string(),
                unloading_point: self.unloading_point.trim().to_string(),
                loading_date,
                unloading_date,
            },
            product_type: self.product_type.trim().to_string(),
            truck_type,
            no_of_trucks,
            weight,
            comment: optional_text(&self.comment),
        })
    }
}

/// Field order used when reporting booking form errors
const BOOKING_FIELDS: [&str; 3] = ["load_id", "transporter_id", "proposed_rate"];

/// Input for proposing a booking against a posted load
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct BookingForm {
    /// Selected load
    #[validate(custom(function = "non_blank", message = "Please select a load"))]
    pub load_id: String,

    /// Transporter identifier
    #[validate(custom(function = "non_blank", message = "Please enter transporter ID"))]
    pub transporter_id: String,

    /// Proposed rate in dollars
    #[validate(
        required(message = "Please enter proposed rate"),
        range(exclusive_min = 0.0, message = "Rate must be greater than 0")
    )]
    pub proposed_rate: Option<f64>,

    /// Free-form note; blank means none
    pub comment: String,
}

impl BookingForm {
    /// Validate the input without building a payload
    pub fn check(&self) -> FormErrors {
        let mut errors = self
            .validate()
            .err()
            .map(|errors| FormErrors::from_validation(&errors, &BOOKING_FIELDS))
            .unwrap_or_default();

        if self.proposed_rate.is_some_and(|rate| !rate.is_finite()) {
            errors.push("proposed_rate", "Rate must be greater than 0");
        }
        errors
    }

    /// Validate and build the request body
    ///
    /// # Errors
    ///
    /// Returns every failed field; a rate of zero or below always fails.
    pub fn to_payload(&self) -> Result<BookingPayload, FormErrors> {
        let errors = self.check();
        let Some(proposed_rate) = self.proposed_rate else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(BookingPayload {
            load_id: self.load_id.trim().to_string(),
            transporter_id: self.transporter_id.trim().to_string(),
            proposed_rate,
            comment: optional_text(&self.comment),
        })
    }
}
