//! Query-string construction for list endpoints
//!
//! Filters are plain view-owned values; turning them into a query string is
//! a pure function so the exact request a filter change produces can be
//! checked without a server.

use loadbook_core::{BookingStatus, LoadId, LoadStatus, Result, TruckType};

/// Filters accepted by `GET /load`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadFilters {
    /// Exact shipper identifier
    pub shipper_id: Option<String>,
    /// Requested truck kind
    pub truck_type: Option<TruckType>,
    /// Lifecycle status
    pub status: Option<LoadStatus>,
    /// 1-based page number
    pub page: Option<u32>,
    /// Page size
    pub size: Option<u32>,
}

impl LoadFilters {
    /// Filter matching loads that can still receive bookings
    #[must_use]
    pub fn postable() -> Self {
        Self {
            status: Some(LoadStatus::Posted),
            ..Self::default()
        }
    }

    /// Wire key/value pairs in a stable order, unset keys left out
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(shipper_id) = &self.shipper_id {
            pairs.push(("shipperId", shipper_id.clone()));
        }
        if let Some(truck_type) = &self.truck_type {
            pairs.push(("truckType", truck_type.to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(size) = self.size {
            pairs.push(("size", size.to_string()));
        }
        pairs
    }
}

/// Filters accepted by `GET /booking`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingFilters {
    /// Exact transporter identifier
    pub transporter_id: Option<String>,
    /// Lifecycle status
    pub status: Option<BookingStatus>,
    /// Load the bookings bid on
    pub load_id: Option<LoadId>,
}

impl BookingFilters {
    /// Wire key/value pairs in a stable order, unset keys left out
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(transporter_id) = &self.transporter_id {
            pairs.push(("transporterId", transporter_id.clone()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.to_string()));
        }
        if let Some(load_id) = &self.load_id {
            pairs.push(("loadId", load_id.clone()));
        }
        pairs
    }
}

/// Form-URL-encode `pairs`, dropping pairs whose value is empty
///
/// # Errors
///
/// Returns an error if the encoder rejects the input.
pub fn build_query<K, V>(pairs: &[(K, V)]) -> Result<String>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let kept: Vec<(&str, &str)> = pairs
        .iter()
        .map(|(key, value)| (key.as_ref(), value.as_ref()))
        .filter(|(_, value)| !value.is_empty())
        .collect();

    serde_urlencoded::to_string(kept)
        .map_err(|e| loadbook_core::Error::Other(format!("Failed to encode query: {e}")))
}

/// Append an encoded query to `path`, leaving the path bare when empty
#[must_use]
pub fn with_query(path: &str, query: &str) -> String {
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    }
}

/// `path?query` for a set of filter pairs
///
/// # Errors
///
/// Returns an error if the encoder rejects the input.
pub fn list_path(path: &str, pairs: &[(&'static str, String)]) -> Result<String> {
    Ok(with_query(path, &build_query(pairs)?))
}
