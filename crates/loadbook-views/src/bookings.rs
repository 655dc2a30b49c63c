//! Booking management view
//!
//! Lists bookings with filters and keeps a selector of loads that can still
//! take bookings. Both are re-fetched together on every filter change and
//! after every successful action.

use crate::display::{EMPTY_CELL, format_optional_time, format_rate, short_id};
use crate::forms::{BookingForm, FormErrors};
use crate::notice::Notice;
use crate::sequence::{RequestSequencer, Ticket};
use loadbook_client::{BookingFilters, LoadBookingApi, LoadFilters};
use loadbook_core::{
    Action, Actionable, Booking, BookingId, BookingStatus, Error, Load, LoadId, LoadStatus, Page,
    Result,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// One table row of the booking list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingRow {
    /// Booking identifier
    pub id: BookingId,
    /// Load ID column, shortened
    pub load_id: String,
    /// Transporter ID column
    pub transporter_id: String,
    /// Proposed Rate column
    pub proposed_rate: String,
    /// Status column
    pub status: BookingStatus,
    /// Requested At column
    pub requested_at: String,
    /// Comment column
    pub comment: String,
    /// Actions enabled for this row
    #[serde(skip)]
    pub actions: &'static [Action],
}

impl BookingRow {
    fn from_booking(booking: &Booking) -> Self {
        Self {
            id: booking.id.clone(),
            load_id: short_id(&booking.load_id),
            transporter_id: booking.transporter_id.clone(),
            proposed_rate: format_rate(booking.proposed_rate),
            status: booking.status,
            requested_at: format_optional_time(booking.requested_at.as_ref()),
            comment: booking
                .comment
                .clone()
                .unwrap_or_else(|| EMPTY_CELL.to_string()),
            actions: booking.allowed_actions(),
        }
    }
}

/// A choice in the load selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadOption {
    /// Load identifier submitted when chosen
    pub value: LoadId,
    /// Text shown for the choice
    pub label: String,
}

/// State and actions of the booking management screen
pub struct BookingView {
    api: Arc<dyn LoadBookingApi>,
    filters: BookingFilters,
    bookings: Vec<Booking>,
    posted_loads: Vec<Load>,
    loading: bool,
    notice: Option<Notice>,
    form: Option<BookingForm>,
    form_errors: FormErrors,
    sequencer: RequestSequencer,
    selector_sequencer: RequestSequencer,
}

impl std::fmt::Debug for BookingView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingView")
            .field("filters", &self.filters)
            .field("bookings", &self.bookings.len())
            .field("posted_loads", &self.posted_loads.len())
            .field("loading", &self.loading)
            .field("notice", &self.notice)
            .finish_non_exhaustive()
    }
}

impl BookingView {
    /// Create a view with no filters and empty lists
    pub fn new(api: Arc<dyn LoadBookingApi>) -> Self {
        Self {
            api,
            filters: BookingFilters::default(),
            bookings: Vec::new(),
            posted_loads: Vec::new(),
            loading: false,
            notice: None,
            form: None,
            form_errors: FormErrors::default(),
            sequencer: RequestSequencer::new(),
            selector_sequencer: RequestSequencer::new(),
        }
    }

    /// Active filters
    pub const fn filters(&self) -> &BookingFilters {
        &self.filters
    }

    /// Bookings of the last applied fetch
    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    /// Loads offered in the selector
    pub fn posted_loads(&self) -> &[Load] {
        &self.posted_loads
    }

    /// Whether the latest booking fetch is still outstanding
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Latest outcome message
    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Take the latest outcome message, clearing it
    pub const fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// The open create form, if any
    pub const fn form(&self) -> Option<&BookingForm> {
        self.form.as_ref()
    }

    /// Mutable access to the open form
    pub const fn form_mut(&mut self) -> Option<&mut BookingForm> {
        self.form.as_mut()
    }

    /// Failures from the last submit attempt
    pub const fn form_errors(&self) -> &FormErrors {
        &self.form_errors
    }

    /// Filter by transporter and re-fetch; blank clears the filter
    pub async fn set_transporter_id(&mut self, transporter_id: Option<String>) {
        self.filters.transporter_id = transporter_id.filter(|value| !value.trim().is_empty());
        self.refresh().await;
    }

    /// Filter by status and re-fetch
    pub async fn set_status(&mut self, status: Option<BookingStatus>) {
        self.filters.status = status;
        self.refresh().await;
    }

    /// Filter by load and re-fetch; blank clears the filter
    pub async fn set_load_id(&mut self, load_id: Option<LoadId>) {
        self.filters.load_id = load_id.filter(|value| !value.trim().is_empty());
        self.refresh().await;
    }

    /// Replace every filter at once and re-fetch a single time
    pub async fn set_filters(&mut self, filters: BookingFilters) {
        let non_blank = |value: Option<String>| value.filter(|value| !value.trim().is_empty());
        self.filters = BookingFilters {
            transporter_id: non_blank(filters.transporter_id),
            status: filters.status,
            load_id: non_blank(filters.load_id),
        };
        self.refresh().await;
    }

    /// Dispatch a booking fetch for the current filters
    pub fn begin_fetch(&mut self) -> Ticket<BookingFilters> {
        self.loading = true;
        self.sequencer.issue(self.filters.clone())
    }

    /// Apply a booking answer; returns `false` when it was stale and dropped
    pub fn apply_fetch(
        &mut self,
        ticket: &Ticket<BookingFilters>,
        result: Result<Vec<Booking>>,
    ) -> bool {
        if !self.sequencer.is_latest(ticket.seq) {
            debug!(
                seq = ticket.seq,
                latest = self.sequencer.latest(),
                "Discarding stale booking list response"
            );
            return false;
        }

        self.loading = false;
        match result {
            Ok(bookings) => {
                debug!(count = bookings.len(), "Bookings fetched");
                self.bookings = bookings;
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch bookings");
                self.notice = Some(Notice::error("Failed to fetch bookings"));
            }
        }
        true
    }

    /// Dispatch a fetch of the loads that can take bookings
    pub fn begin_selector_fetch(&mut self) -> Ticket<LoadFilters> {
        self.selector_sequencer.issue(LoadFilters::postable())
    }

    /// Apply a selector answer, keeping only posted loads
    ///
    /// Failures are logged and leave the previous choices in place.
    pub fn apply_selector_fetch(
        &mut self,
        ticket: &Ticket<LoadFilters>,
        result: Result<Page<Load>>,
    ) -> bool {
        if !self.selector_sequencer.is_latest(ticket.seq) {
            debug!(seq = ticket.seq, "Discarding stale load selector response");
            return false;
        }

        match result {
            Ok(page) => {
                self.posted_loads = page
                    .content
                    .into_iter()
                    .filter(|load| load.status == LoadStatus::Posted)
                    .collect();
            }
            Err(e) => warn!(error = %e, "Failed to fetch loads for selector"),
        }
        true
    }

    /// Re-fetch bookings and the load selector concurrently
    pub async fn refresh(&mut self) {
        let bookings_ticket = self.begin_fetch();
        let selector_ticket = self.begin_selector_fetch();

        let (bookings, loads) = futures::join!(
            self.api.list_bookings(&bookings_ticket.query),
            self.api.list_loads(&selector_ticket.query),
        );

        self.apply_fetch(&bookings_ticket, bookings);
        self.apply_selector_fetch(&selector_ticket, loads);
    }

    /// Open a blank booking form
    pub fn open_create(&mut self) {
        self.form = Some(BookingForm::default());
        self.form_errors = FormErrors::default();
    }

    /// Discard the open form
    pub fn close_form(&mut self) {
        self.form = None;
        self.form_errors = FormErrors::default();
    }

    /// Validate the open form and propose the booking
    ///
    /// # Errors
    ///
    /// Returns an error when no form is open, validation fails (nothing is
    /// sent), or the server rejects the request.
    pub async fn submit(&mut self) -> Result<Booking> {
        let form = self
            .form
            .as_ref()
            .ok_or_else(|| Error::Other("No booking form is open".to_string()))?;

        let payload = match form.to_payload() {
            Ok(payload) => payload,
            Err(errors) => {
                debug!(errors = %errors, "Booking form is invalid");
                self.form_errors = errors.clone();
                return Err(errors.into());
            }
        };
        self.form_errors = FormErrors::default();

        match self.api.create_booking(&payload).await {
            Ok(booking) => {
                info!(booking_id = %booking.id, load_id = %booking.load_id, "Booking created");
                self.form = None;
                self.notice = Some(Notice::success("Booking created successfully"));
                self.refresh().await;
                Ok(booking)
            }
            Err(e) => {
                error!(error = %e, "Failed to create booking");
                self.notice = Some(Notice::error("Failed to create booking"));
                Err(e)
            }
        }
    }

    /// Accept a pending booking, then re-fetch
    ///
    /// # Errors
    ///
    /// Returns [`Error::ActionNotAllowed`] unless the booking is pending, or
    /// the server's error.
    pub async fn accept(&mut self, booking: &Booking) -> Result<()> {
        self.transition(booking, Action::Accept).await
    }

    /// Reject a pending booking, then re-fetch
    ///
    /// # Errors
    ///
    /// Returns [`Error::ActionNotAllowed`] unless the booking is pending, or
    /// the server's error.
    pub async fn reject(&mut self, booking: &Booking) -> Result<()> {
        self.transition(booking, Action::Reject).await
    }

    /// Delete a booking in any status, then re-fetch
    ///
    /// # Errors
    ///
    /// Returns the server's error.
    pub async fn delete(&mut self, booking: &Booking) -> Result<()> {
        self.transition(booking, Action::Delete).await
    }

    async fn transition(&mut self, booking: &Booking, action: Action) -> Result<()> {
        booking.ensure_allowed(action)?;

        let (result, success, failure) = match action {
            Action::Accept => (
                self.api.accept_booking(&booking.id).await.map(drop),
                "Booking accepted successfully",
                "Failed to accept booking",
            ),
            Action::Reject => (
                self.api.reject_booking(&booking.id).await.map(drop),
                "Booking rejected successfully",
                "Failed to reject booking",
            ),
            Action::Delete => (
                self.api.delete_booking(&booking.id).await,
                "Booking deleted successfully",
                "Failed to delete booking",
            ),
            Action::Edit | Action::Cancel => {
                return Err(Error::ActionNotAllowed {
                    action: action.verb().to_string(),
                    status: booking.status.to_string(),
                });
            }
        };

        match result {
            Ok(()) => {
                info!(booking_id = %booking.id, action = %action, "{success}");
                self.notice = Some(Notice::success(success));
                self.refresh().await;
                Ok(())
            }
            Err(e) => {
                error!(booking_id = %booking.id, action = %action, error = %e, "{failure}");
                self.notice = Some(Notice::error(failure));
                Err(e)
            }
        }
    }

    /// Find a listed booking by identifier
    pub fn find(&self, id: &str) -> Option<&Booking> {
        self.bookings.iter().find(|booking| booking.id == id)
    }

    /// Table projection of the current list
    pub fn rows(&self) -> Vec<BookingRow> {
        self.bookings.iter().map(BookingRow::from_booking).collect()
    }

    /// Choices for the load filter: `{id8}... - {shipperId}`
    pub fn load_filter_options(&self) -> Vec<LoadOption> {
        self.posted_loads
            .iter()
            .map(|load| LoadOption {
                value: load.id.clone(),
                label: format!("{} - {}", short_id(&load.id), load.shipper_id),
            })
            .collect()
    }

    /// Choices for the create form: `{shipperId} - {productType} ({route})`
    pub fn load_choice_options(&self) -> Vec<LoadOption> {
        self.posted_loads
            .iter()
            .map(|load| LoadOption {
                value: load.id.clone(),
                label: format!(
                    "{} - {} ({})",
                    load.shipper_id,
                    load.product_type,
                    load.facility.route()
                ),
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use loadbook_client::MockApi;
    use loadbook_core::{Facility, TruckType};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn sample_load(id: &str, status: LoadStatus) -> Load {
        Load {
            id: id.to_string(),
            shipper_id: "S1".to_string(),
            facility: Facility {
                loading_point: "Pune".to_string(),
                unloading_point: "Mumbai".to_string(),
                loading_date: Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap(),
                unloading_date: Utc.with_ymd_and_hms(2024, 3, 16, 8, 0, 0).unwrap(),
            },
            product_type: "Steel".to_string(),
            truck_type: TruckType::Flatbed,
            no_of_trucks: 1,
            weight: 100.0,
            comment: None,
            status,
            date_posted: None,
        }
    }

    fn sample_booking(id: &str, load_id: &str, status: BookingStatus) -> Booking {
        Booking {
            id: id.to_string(),
            load_id: load_id.to_string(),
            transporter_id: "T9".to_string(),
            proposed_rate: 12500.5,
            comment: None,
            status,
            requested_at: Some(Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap()),
        }
    }

    fn view_with(mock: &MockApi) -> BookingView {
        BookingView::new(Arc::new(mock.clone()))
    }

    fn paths(mock: &MockApi) -> Vec<String> {
        let mut paths: Vec<String> = mock
            .requests()
            .into_iter()
            .map(|request| format!("{} {}", request.method, request.path))
            .collect();
        // The list and selector fetches run concurrently
        paths.sort();
        paths
    }

    #[tokio::test]
    async fn test_filter_change_refetches_bookings_and_selector() {
        let mock = MockApi::new();
        let mut view = view_with(&mock);

        view.set_transporter_id(Some("T9".to_string())).await;
        view.set_status(Some(BookingStatus::Pending)).await;

        assert_eq!(
            paths(&mock),
            vec![
                "GET /booking?transporterId=T9",
                "GET /booking?transporterId=T9&status=PENDING",
                "GET /load?status=POSTED",
                "GET /load?status=POSTED",
            ]
        );
    }

    #[tokio::test]
    async fn test_set_filters_fetches_once() {
        let mock = MockApi::new();
        let mut view = view_with(&mock);

        view.set_filters(BookingFilters {
            transporter_id: Some("T9".to_string()),
            status: Some(BookingStatus::Accepted),
            load_id: Some(String::new()),
        })
        .await;

        assert_eq!(
            paths(&mock),
            vec![
                "GET /booking?transporterId=T9&status=ACCEPTED",
                "GET /load?status=POSTED",
            ]
        );
    }

    #[tokio::test]
    async fn test_selector_keeps_only_posted_loads() {
        let mock = MockApi::new();
        let mut view = view_with(&mock);
        let ticket = view.begin_selector_fetch();

        view.apply_selector_fetch(
            &ticket,
            Ok(Page {
                content: vec![
                    sample_load("6f1c2b4e-aaaa", LoadStatus::Posted),
                    sample_load("7a2d3c5f-bbbb", LoadStatus::Booked),
                ],
                ..Page::default()
            }),
        );

        assert_eq!(view.posted_loads().len(), 1);
        assert_eq!(
            view.load_filter_options(),
            vec![LoadOption {
                value: "6f1c2b4e-aaaa".to_string(),
                label: "6f1c2b4e... - S1".to_string(),
            }]
        );
        assert_eq!(
            view.load_choice_options()[0].label,
            "S1 - Steel (Pune → Mumbai)"
        );
    }

    #[tokio::test]
    async fn test_selector_failure_is_not_surfaced() {
        let mock = MockApi::new();
        mock.fail_requests("/load", 500, "down");
        let mut view = view_with(&mock);

        view.refresh().await;

        assert!(view.notice().is_none());
        assert!(view.posted_loads().is_empty());
    }

    #[tokio::test]
    async fn test_booking_fetch_failure_posts_notice() {
        let mock = MockApi::new();
        mock.fail_requests("/booking", 500, "down");
        let mut view = view_with(&mock);

        view.refresh().await;

        assert_eq!(view.notice().unwrap().message, "Failed to fetch bookings");
        assert!(!view.is_loading());
    }

    #[rstest]
    #[case(Some(0.0))]
    #[case(Some(-10.0))]
    #[case(None)]
    #[tokio::test]
    async fn test_non_positive_rate_sends_nothing(#[case] rate: Option<f64>) {
        let mock = MockApi::new();
        let mut view = view_with(&mock);
        view.open_create();
        let form = view.form_mut().unwrap();
        form.load_id = "l-1".to_string();
        form.transporter_id = "T1".to_string();
        form.proposed_rate = rate;

        assert!(view.submit().await.is_err());
        assert!(mock.requests().is_empty());
        assert!(view.form().is_some());
        assert!(view.form_errors().message_for("proposed_rate").is_some());
    }

    #[tokio::test]
    async fn test_create_booking_then_refresh() {
        let mock = MockApi::new();
        mock.seed_load(sample_load("l-1", LoadStatus::Posted));
        let mut view = view_with(&mock);
        view.open_create();
        let form = view.form_mut().unwrap();
        form.load_id = "l-1".to_string();
        form.transporter_id = "T1".to_string();
        form.proposed_rate = Some(900.0);
        form.comment = "Ready Monday".to_string();

        let booking = view.submit().await.unwrap();

        let requests = mock.requests();
        assert_eq!(requests[0].method, "POST");
        assert_eq!(
            requests[0].body,
            Some(serde_json::json!({
                "loadId": "l-1",
                "transporterId": "T1",
                "proposedRate": 900.0,
                "comment": "Ready Monday"
            }))
        );
        assert_eq!(requests.len(), 3);
        assert!(view.form().is_none());
        assert_eq!(view.notice().unwrap().message, "Booking created successfully");
        assert_eq!(view.bookings()[0].id, booking.id);
        // The load is now booked, so it left the selector
        assert!(view.posted_loads().is_empty());
    }

    #[tokio::test]
    async fn test_accept_and_reject_only_while_pending() {
        let mock = MockApi::new();
        let mut view = view_with(&mock);
        let accepted = sample_booking("b-1", "l-1", BookingStatus::Accepted);

        assert!(matches!(
            view.accept(&accepted).await,
            Err(Error::ActionNotAllowed { .. })
        ));
        assert!(matches!(
            view.reject(&accepted).await,
            Err(Error::ActionNotAllowed { .. })
        ));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_accept_uses_transition_and_refreshes() {
        let mock = MockApi::new();
        mock.seed_load(sample_load("l-1", LoadStatus::Booked));
        mock.seed_booking(sample_booking("b-1", "l-1", BookingStatus::Pending));
        let mut view = view_with(&mock);

        view.accept(&sample_booking("b-1", "l-1", BookingStatus::Pending))
            .await
            .unwrap();

        assert_eq!(
            paths(&mock),
            vec!["GET /booking", "GET /load?status=POSTED", "PUT /booking/b-1/accept"]
        );
        assert_eq!(view.notice().unwrap().message, "Booking accepted successfully");
        assert_eq!(view.bookings()[0].status, BookingStatus::Accepted);
    }

    #[tokio::test]
    async fn test_delete_allowed_in_any_status() {
        let mock = MockApi::new();
        mock.seed_load(sample_load("l-1", LoadStatus::Booked));
        mock.seed_booking(sample_booking("b-1", "l-1", BookingStatus::Rejected));
        let mut view = view_with(&mock);

        view.delete(&sample_booking("b-1", "l-1", BookingStatus::Rejected))
            .await
            .unwrap();

        assert_eq!(view.notice().unwrap().message, "Booking deleted successfully");
        assert!(view.bookings().is_empty());
        assert_eq!(view.posted_loads().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_transition_posts_notice() {
        let mock = MockApi::new().with_failure("down");
        let mut view = view_with(&mock);

        let result = view
            .reject(&sample_booking("b-1", "l-1", BookingStatus::Pending))
            .await;

        assert!(result.is_err());
        assert_eq!(view.notice().unwrap().message, "Failed to reject booking");
    }

    #[test]
    fn test_stale_booking_response_is_discarded() {
        let mut view = view_with(&MockApi::new());
        let older = view.begin_fetch();
        let newer = view.begin_fetch();

        assert!(view.apply_fetch(&newer, Ok(vec![sample_booking("new", "l", BookingStatus::Pending)])));
        assert!(!view.apply_fetch(&older, Ok(Vec::new())));
        assert_eq!(view.bookings()[0].id, "new");
    }

    #[test]
    fn test_row_projection() {
        let mut view = view_with(&MockApi::new());
        let ticket = view.begin_fetch();
        view.apply_fetch(
            &ticket,
            Ok(vec![sample_booking(
                "b-1",
                "6f1c2b4e-1111-2222-3333-444455556666",
                BookingStatus::Pending,
            )]),
        );

        let row = &view.rows()[0];
        assert_eq!(row.load_id, "6f1c2b4e...");
        assert_eq!(row.proposed_rate, "$12,500.5");
        assert_eq!(row.requested_at, "2024-03-15 10:00");
        assert_eq!(row.comment, "-");
        assert_eq!(row.actions, &[Action::Accept, Action::Reject, Action::Delete]);
    }
}
