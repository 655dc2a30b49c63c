//! Core data types for loads and bookings
//!
//! Field names follow the remote API's camelCase JSON. Every entity here is a
//! transient copy of server state; nothing in the client mutates it locally.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Load identifier (opaque, assigned by the server)
pub type LoadId = String;

/// Booking identifier (opaque, assigned by the server)
pub type BookingId = String;

/// Display tone of a status badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusTone {
    /// Informational
    Blue,
    /// Positive outcome
    Green,
    /// Attention needed or withdrawn
    Orange,
    /// Negative outcome
    Red,
}

/// Kind of truck a load asks for
///
/// The server stores truck types as free text, so values outside the four
/// known kinds are kept verbatim instead of failing the whole list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TruckType {
    /// Open flatbed trailer
    Flatbed,
    /// Container chassis
    Container,
    /// Refrigerated trailer
    Refrigerated,
    /// Liquid tanker
    Tanker,
    /// Any value the client does not know about
    Other(String),
}

impl TruckType {
    /// The truck types offered in filters and forms
    pub const KNOWN: [Self; 4] = [
        Self::Flatbed,
        Self::Container,
        Self::Refrigerated,
        Self::Tanker,
    ];

    /// Wire and display name
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Flatbed => "Flatbed",
            Self::Container => "Container",
            Self::Refrigerated => "Refrigerated",
            Self::Tanker => "Tanker",
            Self::Other(other) => other,
        }
    }

    /// Whether this is one of the four kinds offered in forms
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for TruckType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Flatbed" => Self::Flatbed,
            "Container" => Self::Container,
            "Refrigerated" => Self::Refrigerated,
            "Tanker" => Self::Tanker,
            _ => Self::Other(value),
        }
    }
}

impl From<TruckType> for String {
    fn from(value: TruckType) -> Self {
        match value {
            TruckType::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for TruckType {
    type Err = crate::Error;

    /// Parses one of the known truck types, ignoring case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::KNOWN
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| crate::Error::Validation {
                field: "truckType".to_string(),
                message: format!(
                    "unknown truck type '{s}', expected one of Flatbed, Container, Refrigerated, Tanker"
                ),
            })
    }
}

impl fmt::Display for TruckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Lifecycle status of a load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadStatus {
    /// Open for bookings
    Posted,
    /// Has an active booking
    Booked,
    /// Withdrawn by the shipper
    Cancelled,
}

impl LoadStatus {
    /// All statuses in display order
    pub const ALL: [Self; 3] = [Self::Posted, Self::Booked, Self::Cancelled];

    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Posted => "POSTED",
            Self::Booked => "BOOKED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Badge tone used when listing loads
    #[must_use]
    pub const fn tone(self) -> StatusTone {
        match self {
            Self::Posted => StatusTone::Blue,
            Self::Booked => StatusTone::Green,
            Self::Cancelled => StatusTone::Orange,
        }
    }
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for LoadStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| crate::Error::Validation {
                field: "status".to_string(),
                message: format!("unknown load status '{s}'"),
            })
    }
}

/// Lifecycle status of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    /// Awaiting the shipper's decision
    Pending,
    /// Accepted by the shipper
    Accepted,
    /// Rejected by the shipper
    Rejected,
}

impl BookingStatus {
    /// All statuses in display order
    pub const ALL: [Self; 3] = [Self::Pending, Self::Accepted, Self::Rejected];

    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Badge tone used when listing bookings
    #[must_use]
    pub const fn tone(self) -> StatusTone {
        match self {
            Self::Pending => StatusTone::Orange,
            Self::Accepted => StatusTone::Green,
            Self::Rejected => StatusTone::Red,
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| crate::Error::Validation {
                field: "status".to_string(),
                message: format!("unknown booking status '{s}'"),
            })
    }
}

/// Loading/unloading locations and schedule of a load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    /// Where the cargo is picked up
    pub loading_point: String,

    /// Where the cargo is delivered
    pub unloading_point: String,

    /// Pickup date-time
    #[serde(with = "iso8601")]
    pub loading_date: DateTime<Utc>,

    /// Delivery date-time
    #[serde(with = "iso8601")]
    pub unloading_date: DateTime<Utc>,
}

impl Facility {
    /// Route label as shown in tables, e.g. `Pune → Mumbai`
    #[must_use]
    pub fn route(&self) -> String {
        format!("{} → {}", self.loading_point, self.unloading_point)
    }
}

/// A shipment request posted by a shipper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Load {
    /// Server assigned identifier
    pub id: LoadId,

    /// Shipper who posted the load
    pub shipper_id: String,

    /// Locations and schedule
    pub facility: Facility,

    /// What is being shipped
    pub product_type: String,

    /// Requested truck kind
    pub truck_type: TruckType,

    /// Number of trucks requested
    pub no_of_trucks: u32,

    /// Weight in kilograms
    pub weight: f64,

    /// Free-form note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Current lifecycle status
    pub status: LoadStatus,

    /// When the load was posted
    #[serde(default, with = "iso8601::option")]
    pub date_posted: Option<DateTime<Utc>>,
}

/// Request body for creating or updating a load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadPayload {
    /// Shipper who posts the load
    pub shipper_id: String,
    /// Locations and schedule
    pub facility: Facility,
    /// What is being shipped
    pub product_type: String,
    /// Requested truck kind
    pub truck_type: TruckType,
    /// Number of trucks requested
    pub no_of_trucks: u32,
    /// Weight in kilograms
    pub weight: f64,
    /// Free-form note, omitted when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// A transporter's proposal against a load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Server assigned identifier
    pub id: BookingId,

    /// The load this booking bids on
    pub load_id: LoadId,

    /// Transporter making the proposal
    pub transporter_id: String,

    /// Proposed rate in dollars
    pub proposed_rate: f64,

    /// Free-form note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Current lifecycle status
    pub status: BookingStatus,

    /// When the booking was requested
    #[serde(default, with = "iso8601::option")]
    pub requested_at: Option<DateTime<Utc>>,
}

/// Request body for creating or updating a booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPayload {
    /// The load to bid on
    pub load_id: LoadId,
    /// Transporter making the proposal
    pub transporter_id: String,
    /// Proposed rate in dollars
    pub proposed_rate: f64,
    /// Free-form note, omitted when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Page envelope returned by the load listing endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page; absent is treated as empty
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,

    /// Total matching items across all pages
    #[serde(default)]
    pub total_elements: u64,

    /// Total number of pages
    #[serde(default)]
    pub total_pages: u32,

    /// Zero-based index of this page
    #[serde(default)]
    pub number: u32,

    /// Requested page size
    #[serde(default)]
    pub size: u32,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            content: Vec::new(),
            total_elements: 0,
            total_pages: 0,
            number: 0,
            size: 0,
        }
    }
}

/// Error body the server attaches to 4xx/5xx responses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// HTTP status code
    #[serde(default)]
    pub status: Option<u16>,
    /// Short error class, e.g. `Business Rule Violation`
    #[serde(default)]
    pub error: Option<String>,
    /// Human readable description
    #[serde(default)]
    pub message: Option<String>,
    /// Request path that failed
    #[serde(default)]
    pub path: Option<String>,
}

/// Offset-less layouts accepted by [`parse_timestamp`]
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a user or server supplied timestamp.
///
/// Accepts RFC 3339 (`2024-01-15T10:00:00Z`, `...+05:30`), offset-less
/// date-times as the server emits them (`2024-01-15T10:00:00`,
/// `2024-01-15T10:00`, `2024-01-15 10:00`), and bare dates (midnight).
/// Offset-less values are taken as UTC.
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Format a timestamp the way request bodies carry it (`2024-01-15T10:00:00.000Z`)
#[must_use]
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Format a timestamp for table cells (`2024-01-15 10:00`)
#[must_use]
pub fn format_display(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M").to_string()
}

/// Serde adapter for ISO-8601 timestamps
pub mod iso8601 {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    /// Serialize as `YYYY-MM-DDTHH:MM:SS.mmmZ`
    ///
    /// # Errors
    ///
    /// Returns the serializer's error.
    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(value))
    }

    /// Deserialize any format accepted by [`super::parse_timestamp`]
    ///
    /// # Errors
    ///
    /// Fails when the value is not a recognizable timestamp.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid ISO-8601 timestamp '{raw}'")))
    }

    /// Same adapter for optional fields
    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

        /// Serialize `Some` as a timestamp and `None` as null
        ///
        /// # Errors
        ///
        /// Returns the serializer's error.
        #[allow(clippy::ref_option)]
        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => serializer.serialize_str(&super::super::format_timestamp(value)),
                None => serializer.serialize_none(),
            }
        }

        /// Deserialize null or a timestamp
        ///
        /// # Errors
        ///
        /// Fails when a present value is not a recognizable timestamp.
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| {
                    super::super::parse_timestamp(&raw).ok_or_else(|| {
                        D::Error::custom(format!("invalid ISO-8601 timestamp '{raw}'"))
                    })
                })
                .transpose()
        }
    }
}
