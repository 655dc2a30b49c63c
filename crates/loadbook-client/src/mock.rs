//! In-memory backend for testing
//!
//! `MockApi` keeps loads and bookings in memory, applies the server's
//! business rules to them, and records every request it receives so tests
//! can assert on exactly what a view sent.

use crate::api::LoadBookingApi;
use crate::query::{BookingFilters, LoadFilters, list_path};
use async_trait::async_trait;
use chrono::Utc;
use loadbook_core::{
    Booking, BookingPayload, BookingStatus, Error, Load, LoadPayload, LoadStatus, Page, Result,
};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// One request as the mock received it
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    /// HTTP method the real client would use
    pub method: &'static str,
    /// Path relative to the base URL, including the query string
    pub path: String,
    /// JSON body, if the request carries one
    pub body: Option<Value>,
}

impl RecordedRequest {
    fn new(method: &'static str, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Injected failure for requests whose path starts with `prefix`
#[derive(Debug, Clone)]
struct FailureRule {
    prefix: String,
    status: u16,
    message: String,
}

#[derive(Debug, Default)]
struct Store {
    loads: Vec<Load>,
    bookings: Vec<Booking>,
    requests: Vec<RecordedRequest>,
    failures: Vec<FailureRule>,
}

impl Store {
    /// Record `request` and apply any matching failure rule
    fn receive(&mut self, request: RecordedRequest) -> Result<()> {
        debug!(method = request.method, path = %request.path, "Mock request");
        let failure = self
            .failures
            .iter()
            .find(|rule| request.path.starts_with(&rule.prefix))
            .cloned();
        self.requests.push(request);

        match failure {
            Some(rule) => Err(Error::Http {
                status: rule.status,
                message: rule.message,
            }),
            None => Ok(()),
        }
    }

    fn load_mut(&mut self, id: &str) -> Result<&mut Load> {
        self.loads
            .iter_mut()
            .find(|load| load.id == id)
            .ok_or_else(|| not_found("Load", id))
    }

    fn booking_mut(&mut self, id: &str) -> Result<&mut Booking> {
        self.bookings
            .iter_mut()
            .find(|booking| booking.id == id)
            .ok_or_else(|| not_found("Booking", id))
    }

    fn booking_index(&self, id: &str) -> Result<usize> {
        self.bookings
            .iter()
            .position(|booking| booking.id == id)
            .ok_or_else(|| not_found("Booking", id))
    }

    /// A booked load with no pending or accepted bookings goes back to posted
    fn revert_load_if_unbooked(&mut self, load_id: &str) {
        let still_active = self.bookings.iter().any(|booking| {
            booking.load_id == load_id
                && matches!(booking.status, BookingStatus::Pending | BookingStatus::Accepted)
        });
        if still_active {
            return;
        }
        if let Some(load) = self.loads.iter_mut().find(|load| load.id == load_id)
            && load.status == LoadStatus::Booked
        {
            load.status = LoadStatus::Posted;
            debug!(load_id, "Load reverted to POSTED");
        }
    }
}

fn not_found(resource: &str, id: &str) -> Error {
    Error::Http {
        status: 404,
        message: format!("{resource} not found with ID: {id}"),
    }
}

fn business_rule(message: &str) -> Error {
    Error::Http {
        status: 400,
        message: message.to_string(),
    }
}

/// In-memory [`LoadBookingApi`] implementation
///
/// Clones share the same store, so a test can keep one handle while a view
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct MockApi {
    store: Arc<Mutex<Store>>,
}

impl MockApi {
    /// Create an empty mock backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure every request to fail with a 500 and `message`
    #[must_use]
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.fail_requests("", 500, message);
        self
    }

    /// Fail requests whose path starts with `prefix` (e.g. `/load`)
    pub fn fail_requests(&self, prefix: impl Into<String>, status: u16, message: impl Into<String>) {
        self.store.lock().failures.push(FailureRule {
            prefix: prefix.into(),
            status,
            message: message.into(),
        });
    }

    /// Toggle a blanket failure on or off
    pub fn set_failing(&self, message: Option<&str>) {
        let mut store = self.store.lock();
        store.failures.clear();
        if let Some(message) = message {
            store.failures.push(FailureRule {
                prefix: String::new(),
                status: 500,
                message: message.to_string(),
            });
        }
    }

    /// Insert a load as if the server already held it
    pub fn seed_load(&self, load: Load) {
        self.store.lock().loads.push(load);
    }

    /// Insert a booking as if the server already held it
    pub fn seed_booking(&self, booking: Booking) {
        self.store.lock().bookings.push(booking);
    }

    /// Current server-side copy of a load
    #[must_use]
    pub fn load(&self, id: &str) -> Option<Load> {
        self.store.lock().loads.iter().find(|load| load.id == id).cloned()
    }

    /// Current server-side copy of a booking
    #[must_use]
    pub fn booking(&self, id: &str) -> Option<Booking> {
        self.store
            .lock()
            .bookings
            .iter()
            .find(|booking| booking.id == id)
            .cloned()
    }

    /// Requests received so far, oldest first
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.store.lock().requests.clone()
    }

    /// Forget recorded requests
    pub fn clear_requests(&self) {
        self.store.lock().requests.clear();
    }
}

fn matches_load(load: &Load, filters: &LoadFilters) -> bool {
    filters
        .shipper_id
        .as_ref()
        .is_none_or(|shipper| shipper.is_empty() || &load.shipper_id == shipper)
        && filters
            .truck_type
            .as_ref()
            .is_none_or(|truck| &load.truck_type == truck)
        && filters.status.is_none_or(|status| load.status == status)
}

fn matches_booking(booking: &Booking, filters: &BookingFilters) -> bool {
    filters
        .transporter_id
        .as_ref()
        .is_none_or(|transporter| transporter.is_empty() || &booking.transporter_id == transporter)
        && filters.status.is_none_or(|status| booking.status == status)
        && filters
            .load_id
            .as_ref()
            .is_none_or(|load_id| load_id.is_empty() || &booking.load_id == load_id)
}

#[async_trait]
impl LoadBookingApi for MockApi {
    async fn list_loads(&self, filters: &LoadFilters) -> Result<Page<Load>> {
        let mut store = self.store.lock();
        store.receive(
            RecordedRequest::new("GET", list_path("/load", &filters.query_pairs())?),
        )?;

        let mut matching: Vec<Load> = store
            .loads
            .iter()
            .filter(|load| matches_load(load, filters))
            .cloned()
            .collect();
        // Newest first, like the server
        matching.sort_by(|a, b| b.date_posted.cmp(&a.date_posted));

        let size = filters.size.unwrap_or(10).max(1);
        let page = filters.page.unwrap_or(1).max(1);
        let total_elements = matching.len() as u64;
        let total_pages = u32::try_from(matching.len().div_ceil(size as usize)).unwrap_or(u32::MAX);
        let content = matching
            .into_iter()
            .skip(((page - 1) * size) as usize)
            .take(size as usize)
            .collect();

        Ok(Page {
            content,
            total_elements,
            total_pages,
            number: page - 1,
            size,
        })
    }

    async fn get_load(&self, id: &str) -> Result<Load> {
        let mut store = self.store.lock();
        store.receive(RecordedRequest::new("GET", format!("/load/{id}")))?;
        Ok(store.load_mut(id)?.clone())
    }

    async fn create_load(&self, payload: &LoadPayload) -> Result<Load> {
        let mut store = self.store.lock();
        store.receive(
            RecordedRequest::new("POST", "/load").with_body(serde_json::to_value(payload)?),
        )?;

        let load = Load {
            id: Uuid::new_v4().to_string(),
            shipper_id: payload.shipper_id.clone(),
            facility: payload.facility.clone(),
            product_type: payload.product_type.clone(),
            truck_type: payload.truck_type.clone(),
            no_of_trucks: payload.no_of_trucks,
            weight: payload.weight,
            comment: payload.comment.clone(),
            status: LoadStatus::Posted,
            date_posted: Some(Utc::now()),
        };
        store.loads.push(load.clone());
        Ok(load)
    }

    async fn update_load(&self, id: &str, payload: &LoadPayload) -> Result<Load> {
        let mut store = self.store.lock();
        store.receive(
            RecordedRequest::new("PUT", format!("/load/{id}"))
                .with_body(serde_json::to_value(payload)?),
        )?;

        let load = store.load_mut(id)?;
        if load.status == LoadStatus::Cancelled {
            return Err(business_rule("Cannot update cancelled load"));
        }
        load.shipper_id.clone_from(&payload.shipper_id);
        load.facility = payload.facility.clone();
        load.product_type.clone_from(&payload.product_type);
        load.truck_type = payload.truck_type.clone();
        load.no_of_trucks = payload.no_of_trucks;
        load.weight = payload.weight;
        load.comment.clone_from(&payload.comment);
        Ok(load.clone())
    }

    async fn delete_load(&self, id: &str) -> Result<()> {
        let mut store = self.store.lock();
        store.receive(RecordedRequest::new("DELETE", format!("/load/{id}")))?;
        store.load_mut(id)?.status = LoadStatus::Cancelled;
        Ok(())
    }

    async fn list_bookings(&self, filters: &BookingFilters) -> Result<Vec<Booking>> {
        let mut store = self.store.lock();
        store.receive(
            RecordedRequest::new("GET", list_path("/booking", &filters.query_pairs())?),
        )?;

        Ok(store
            .bookings
            .iter()
            .filter(|booking| matches_booking(booking, filters))
            .cloned()
            .collect())
    }

    async fn get_booking(&self, id: &str) -> Result<Booking> {
        let mut store = self.store.lock();
        store.receive(RecordedRequest::new("GET", format!("/booking/{id}")))?;
        Ok(store.booking_mut(id)?.clone())
    }

    async fn create_booking(&self, payload: &BookingPayload) -> Result<Booking> {
        let mut store = self.store.lock();
        store.receive(
            RecordedRequest::new("POST", "/booking").with_body(serde_json::to_value(payload)?),
        )?;

        let load = store.load_mut(&payload.load_id)?;
        match load.status {
            LoadStatus::Cancelled => {
                return Err(business_rule("Cannot create booking for cancelled load"));
            }
            LoadStatus::Posted => load.status = LoadStatus::Booked,
            LoadStatus::Booked => {}
        }

        let booking = Booking {
            id: Uuid::new_v4().to_string(),
            load_id: payload.load_id.clone(),
            transporter_id: payload.transporter_id.clone(),
            proposed_rate: payload.proposed_rate,
            comment: payload.comment.clone(),
            status: BookingStatus::Pending,
            requested_at: Some(Utc::now()),
        };
        store.bookings.push(booking.clone());
        Ok(booking)
    }

    async fn update_booking(&self, id: &str, payload: &BookingPayload) -> Result<Booking> {
        let mut store = self.store.lock();
        store.receive(
            RecordedRequest::new("PUT", format!("/booking/{id}"))
                .with_body(serde_json::to_value(payload)?),
        )?;

        let booking = store.booking_mut(id)?;
        if booking.status == BookingStatus::Rejected {
            return Err(business_rule("Cannot update rejected booking"));
        }
        booking.transporter_id.clone_from(&payload.transporter_id);
        booking.proposed_rate = payload.proposed_rate;
        booking.comment.clone_from(&payload.comment);
        Ok(booking.clone())
    }

    async fn accept_booking(&self, id: &str) -> Result<Booking> {
        let mut store = self.store.lock();
        store.receive(
            RecordedRequest::new("PUT", format!("/booking/{id}/accept")),
        )?;

        let booking = store.booking_mut(id)?;
        if booking.status != BookingStatus::Pending {
            return Err(business_rule("Only pending bookings can be accepted"));
        }
        booking.status = BookingStatus::Accepted;
        let accepted = booking.clone();

        for other in &mut store.bookings {
            if other.id != id
                && other.load_id == accepted.load_id
                && other.status == BookingStatus::Pending
            {
                other.status = BookingStatus::Rejected;
            }
        }
        Ok(accepted)
    }

    async fn reject_booking(&self, id: &str) -> Result<Booking> {
        let mut store = self.store.lock();
        store.receive(
            RecordedRequest::new("PUT", format!("/booking/{id}/reject")),
        )?;

        let booking = store.booking_mut(id)?;
        if booking.status != BookingStatus::Pending {
            return Err(business_rule("Only pending bookings can be rejected"));
        }
        booking.status = BookingStatus::Rejected;

        let booking = booking.clone();
        store.revert_load_if_unbooked(&booking.load_id);
        Ok(booking)
    }

    async fn delete_booking(&self, id: &str) -> Result<()> {
        let mut store = self.store.lock();
        store.receive(RecordedRequest::new("DELETE", format!("/booking/{id}")))?;

        let index = store.booking_index(id)?;
        let removed = store.bookings.remove(index);
        store.revert_load_if_unbooked(&removed.load_id);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use loadbook_core::{Facility, TruckType};
    use pretty_assertions::assert_eq;

    fn payload(shipper: &str) -> LoadPayload {
        LoadPayload {
            shipper_id: shipper.to_string(),
            facility: Facility {
                loading_point: "Pune".to_string(),
                unloading_point: "Mumbai".to_string(),
                loading_date: Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap(),
                unloading_date: Utc.with_ymd_and_hms(2024, 3, 16, 8, 0, 0).unwrap(),
            },
            product_type: "Steel".to_string(),
            truck_type: TruckType::Flatbed,
            no_of_trucks: 1,
            weight: 500.0,
            comment: None,
        }
    }

    fn bid(load_id: &str, transporter: &str) -> BookingPayload {
        BookingPayload {
            load_id: load_id.to_string(),
            transporter_id: transporter.to_string(),
            proposed_rate: 1000.0,
            comment: None,
        }
    }

    #[tokio::test]
    async fn test_records_requests_with_query() {
        let api = MockApi::new();
        let filters = LoadFilters {
            shipper_id: Some("S1".to_string()),
            ..LoadFilters::default()
        };

        api.list_loads(&filters).await.unwrap();

        assert_eq!(
            api.requests(),
            vec![RecordedRequest::new("GET", "/load?shipperId=S1")]
        );
    }

    #[tokio::test]
    async fn test_booking_lifecycle_drives_load_status() {
        let api = MockApi::new();
        let load = api.create_load(&payload("S1")).await.unwrap();
        assert_eq!(load.status, LoadStatus::Posted);

        let first = api.create_booking(&bid(&load.id, "T1")).await.unwrap();
        let second = api.create_booking(&bid(&load.id, "T2")).await.unwrap();
        assert_eq!(api.load(&load.id).unwrap().status, LoadStatus::Booked);

        api.accept_booking(&first.id).await.unwrap();
        assert_eq!(api.booking(&second.id).unwrap().status, BookingStatus::Rejected);

        api.delete_booking(&first.id).await.unwrap();
        assert_eq!(api.load(&load.id).unwrap().status, LoadStatus::Posted);
    }

    #[tokio::test]
    async fn test_business_rules_answer_400() {
        let api = MockApi::new();
        let load = api.create_load(&payload("S1")).await.unwrap();
        api.delete_load(&load.id).await.unwrap();

        let update = api.update_load(&load.id, &payload("S1")).await.unwrap_err();
        assert_eq!(update.status(), Some(400));

        let booking = api.create_booking(&bid(&load.id, "T1")).await.unwrap_err();
        assert_eq!(
            booking.to_string(),
            "API returned error 400: Cannot create booking for cancelled load"
        );
    }

    #[tokio::test]
    async fn test_update_booking_keeps_status_and_refuses_rejected() {
        let api = MockApi::new();
        let load = api.create_load(&payload("S1")).await.unwrap();
        let booking = api.create_booking(&bid(&load.id, "T1")).await.unwrap();

        let revised = BookingPayload {
            proposed_rate: 1500.0,
            comment: Some("Revised".to_string()),
            ..bid(&load.id, "T1")
        };
        let updated = api.update_booking(&booking.id, &revised).await.unwrap();
        assert_eq!(updated.proposed_rate, 1500.0);
        assert_eq!(updated.comment.as_deref(), Some("Revised"));
        assert_eq!(updated.status, BookingStatus::Pending);

        api.reject_booking(&booking.id).await.unwrap();
        let error = api.update_booking(&booking.id, &revised).await.unwrap_err();
        assert_eq!(
            error.to_string(),
            "API returned error 400: Cannot update rejected booking"
        );
    }

    #[tokio::test]
    async fn test_missing_records_answer_404() {
        let api = MockApi::new();
        assert_eq!(api.get_load("nope").await.unwrap_err().status(), Some(404));
        assert_eq!(api.reject_booking("nope").await.unwrap_err().status(), Some(404));
        assert_eq!(
            api.accept_booking("nope").await.unwrap_err().to_string(),
            "API returned error 404: Booking not found with ID: nope"
        );
        assert_eq!(api.get_booking("nope").await.unwrap_err().status(), Some(404));
        assert_eq!(
            api.update_booking("nope", &bid("l-1", "T1")).await.unwrap_err().status(),
            Some(404)
        );
    }

    #[tokio::test]
    async fn test_failure_rules_match_path_prefix() {
        let api = MockApi::new();
        api.fail_requests("/load", 503, "down");

        assert!(api.list_bookings(&BookingFilters::default()).await.is_ok());
        let error = api.list_loads(&LoadFilters::default()).await.unwrap_err();
        assert_eq!(error.status(), Some(503));
        assert_eq!(api.requests().len(), 2);

        api.set_failing(None);
        assert!(api.list_loads(&LoadFilters::default()).await.is_ok());
    }

    #[tokio::test]
    async fn test_list_loads_pages_newest_first() {
        let api = MockApi::new();
        for shipper in ["S1", "S2", "S3"] {
            api.create_load(&payload(shipper)).await.unwrap();
        }

        let page = api
            .list_loads(&LoadFilters {
                size: Some(2),
                ..LoadFilters::default()
            })
            .await
            .unwrap();

        assert_eq!(page.total_elements, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.content.len(), 2);
    }
}
