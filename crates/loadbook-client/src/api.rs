//! Backend trait shared by the HTTP client and the in-memory mock

use crate::query::{BookingFilters, LoadFilters};
use async_trait::async_trait;
use loadbook_core::{Booking, BookingPayload, Load, LoadPayload, Page, Result};

/// Operations of the remote load & booking API
///
/// Two resource groups: loads and bookings. Every call is a single request
/// with no retry; any non-2xx answer comes back as an error.
#[async_trait]
pub trait LoadBookingApi: Send + Sync {
    /// `GET /load?<filters>`
    async fn list_loads(&self, filters: &LoadFilters) -> Result<Page<Load>>;

    /// `GET /load/{id}`
    async fn get_load(&self, id: &str) -> Result<Load>;

    /// `POST /load`
    async fn create_load(&self, payload: &LoadPayload) -> Result<Load>;

    /// `PUT /load/{id}`
    async fn update_load(&self, id: &str, payload: &LoadPayload) -> Result<Load>;

    /// `DELETE /load/{id}` (the server marks the load cancelled)
    async fn delete_load(&self, id: &str) -> Result<()>;

    /// `GET /booking?<filters>`
    async fn list_bookings(&self, filters: &BookingFilters) -> Result<Vec<Booking>>;

    /// `GET /booking/{id}`
    async fn get_booking(&self, id: &str) -> Result<Booking>;

    /// `POST /booking`
    async fn create_booking(&self, payload: &BookingPayload) -> Result<Booking>;

    /// `PUT /booking/{id}`
    async fn update_booking(&self, id: &str, payload: &BookingPayload) -> Result<Booking>;

    /// `PUT /booking/{id}/accept`
    async fn accept_booking(&self, id: &str) -> Result<Booking>;

    /// `PUT /booking/{id}/reject`
    async fn reject_booking(&self, id: &str) -> Result<Booking>;

    /// `DELETE /booking/{id}`
    async fn delete_booking(&self, id: &str) -> Result<()>;
}
