//! Load management view
//!
//! Holds the filter state, the last fetched page, the open editor and the
//! latest notice. Every filter change and every successful mutation
//! re-fetches the list from the server.

use crate::display::format_optional_time;
use crate::forms::{FormErrors, LoadForm};
use crate::notice::Notice;
use crate::sequence::{RequestSequencer, Ticket};
use loadbook_client::{LoadBookingApi, LoadFilters};
use loadbook_core::{
    Action, Actionable, Error, Load, LoadId, LoadStatus, Page, Result, TruckType,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Whether the editor creates a new load or updates an existing one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    /// Submitting posts a new load
    Create,
    /// Submitting updates the load with this identifier
    Edit(LoadId),
}

/// The open create/edit form
#[derive(Debug, Clone, PartialEq)]
pub struct LoadEditor {
    /// Create or edit
    pub mode: EditorMode,
    /// Current input
    pub form: LoadForm,
    /// Failures from the last submit attempt
    pub errors: FormErrors,
}

/// One table row of the load list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadRow {
    /// Load identifier
    pub id: LoadId,
    /// Shipper ID column
    pub shipper_id: String,
    /// Product Type column
    pub product_type: String,
    /// Truck Type column
    pub truck_type: String,
    /// Route column, `A → B`
    pub route: String,
    /// Weight (kg) column
    pub weight: String,
    /// Trucks column
    pub trucks: u32,
    /// Status column
    pub status: LoadStatus,
    /// Date Posted column
    pub date_posted: String,
    /// Actions enabled for this row
    #[serde(skip)]
    pub actions: &'static [Action],
}

impl LoadRow {
    fn from_load(load: &Load) -> Self {
        Self {
            id: load.id.clone(),
            shipper_id: load.shipper_id.clone(),
            product_type: load.product_type.clone(),
            truck_type: load.truck_type.to_string(),
            route: load.facility.route(),
            weight: load.weight.to_string(),
            trucks: load.no_of_trucks,
            status: load.status,
            date_posted: format_optional_time(load.date_posted.as_ref()),
            actions: load.allowed_actions(),
        }
    }
}

/// State and actions of the load management screen
pub struct LoadView {
    api: Arc<dyn LoadBookingApi>,
    page_size: u32,
    filters: LoadFilters,
    page: Page<Load>,
    loading: bool,
    notice: Option<Notice>,
    editor: Option<LoadEditor>,
    sequencer: RequestSequencer,
}

impl std::fmt::Debug for LoadView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadView")
            .field("filters", &self.filters)
            .field("loads", &self.page.content.len())
            .field("loading", &self.loading)
            .field("notice", &self.notice)
            .finish_non_exhaustive()
    }
}

impl LoadView {
    /// Create a view with no filters and an empty list
    pub fn new(api: Arc<dyn LoadBookingApi>, page_size: u32) -> Self {
        Self {
            api,
            page_size,
            filters: LoadFilters::default(),
            page: Page::default(),
            loading: false,
            notice: None,
            editor: None,
            sequencer: RequestSequencer::new(),
        }
    }

    /// Active filters
    pub const fn filters(&self) -> &LoadFilters {
        &self.filters
    }

    /// Loads of the last applied fetch
    pub fn loads(&self) -> &[Load] {
        &self.page.content
    }

    /// Total matching loads reported by the server
    pub const fn total(&self) -> u64 {
        self.page.total_elements
    }

    /// Whether the latest fetch is still outstanding
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

    /// The open editor, if any
    pub const fn editor(&self) -> Option<&LoadEditor> {
        self.editor.as_ref()
    }

    /// Mutable access to the open form
    pub fn form_mut(&mut self) -> Option<&mut LoadForm> {
        self.editor.as_mut().map(|editor| &mut editor.form)
    }

    /// Filter by shipper and re-fetch; blank clears the filter
    pub async fn set_shipper_id(&mut self, shipper_id: Option<String>) {
        self.filters.shipper_id = shipper_id.filter(|value| !value.trim().is_empty());
        self.refresh().await;
    }

    /// Filter by truck type and re-fetch
    pub async fn set_truck_type(&mut self, truck_type: Option<TruckType>) {
        self.filters.truck_type = truck_type;
        self.refresh().await;
    }

    /// Filter by status and re-fetch
    pub async fn set_status(&mut self, status: Option<LoadStatus>) {
        self.filters.status = status;
        self.refresh().await;
    }

    /// Replace every filter at once and re-fetch a single time
    pub async fn set_filters(&mut self, filters: LoadFilters) {
        self.filters = LoadFilters {
            shipper_id: filters.shipper_id.filter(|value| !value.trim().is_empty()),
            ..filters
        };
        self.refresh().await;
    }

    /// Dispatch a list fetch for the current filters
    ///
    /// The query holds the filters set so far plus `size`, which is always
    /// the configured page size even when no filter is set.
    /// The returned ticket carries the exact query to send; hand the answer
    /// back through [`Self::apply_fetch`].
    pub fn begin_fetch(&mut self) -> Ticket<LoadFilters> {
        self.loading = true;
        let query = LoadFilters {
            size: Some(self.page_size),
            ..self.filters.clone()
        };
        self.sequencer.issue(query)
    }

    /// Apply a list answer; returns `false` when it was stale and dropped
    pub fn apply_fetch(&mut self, ticket: &Ticket<LoadFilters>, result: Result<Page<Load>>) -> bool {
        if !self.sequencer.is_latest(ticket.seq) {
            debug!(
                seq = ticket.seq,
                latest = self.sequencer.latest(),
                "Discarding stale load list response"
            );
            return false;
        }

        self.loading = false;
        match result {
            Ok(page) => {
                debug!(count = page.content.len(), total = page.total_elements, "Loads fetched");
                self.page = page;
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch loads");
                self.notice = Some(Notice::error("Failed to fetch loads"));
            }
        }
        true
    }

    /// Re-fetch the list with the active filters
    pub async fn refresh(&mut self) {
        let ticket = self.begin_fetch();
        let result = self.api.list_loads(&ticket.query).await;
        self.apply_fetch(&ticket, result);
    }

    /// Open a blank form for a new load
    pub fn open_create(&mut self) {
        self.editor = Some(LoadEditor {
            mode: EditorMode::Create,
            form: LoadForm::default(),
            errors: FormErrors::default(),
        });
    }

    /// Open the form pre-filled from `load`
    ///
    /// # Errors
    ///
    /// Returns [`Error::ActionNotAllowed`] for a cancelled load.
    pub fn open_edit(&mut self, load: &Load) -> Result<()> {
        load.ensure_allowed(Action::Edit)?;
        self.editor = Some(LoadEditor {
            mode: EditorMode::Edit(load.id.clone()),
            form: LoadForm::from_load(load),
            errors: FormErrors::default(),
        });
        Ok(())
    }

    /// Discard the open form
    pub fn close_editor(&mut self) {
        self.editor = None;
    }

    /// Validate the open form and create or update the load
    ///
    /// On success the form closes and the list is re-fetched. A form that
    /// fails validation stays open with its errors and sends nothing; a
    /// rejected request also leaves the form open.
    ///
    /// # Errors
    ///
    /// Returns an error when no form is open, validation fails, or the
    /// server rejects the request.
    pub async fn submit(&mut self) -> Result<Load> {
        let editor = self
            .editor
            .as_mut()
            .ok_or_else(|| Error::Other("No load form is open".to_string()))?;

        let payload = match editor.form.to_payload() {
            Ok(payload) => {
                editor.errors = FormErrors::default();
                payload
            }
            Err(errors) => {
                debug!(errors = %errors, "Load form is invalid");
                editor.errors = errors.clone();
                return Err(errors.into());
            }
        };
        let mode = editor.mode.clone();

        let (result, success, failure) = match &mode {
            EditorMode::Create => (
                self.api.create_load(&payload).await,
                "Load created successfully",
                "Failed to create load",
            ),
            EditorMode::Edit(id) => (
                self.api.update_load(id, &payload).await,
                "Load updated successfully",
                "Failed to update load",
            ),
        };

        match result {
            Ok(load) => {
                info!(load_id = %load.id, "{success}");
                self.editor = None;
                self.notice = Some(Notice::success(success));
                self.refresh().await;
                Ok(load)
            }
            Err(e) => {
                error!(error = %e, "{failure}");
                self.notice = Some(Notice::error(failure));
                Err(e)
            }
        }
    }

    /// Soft-delete `load` and re-fetch
    ///
    /// # Errors
    ///
    /// Returns [`Error::ActionNotAllowed`] for a cancelled load without
    /// sending anything, or the server's error.
    pub async fn cancel(&mut self, load: &Load) -> Result<()> {
        load.ensure_allowed(Action::Cancel)?;

        match self.api.delete_load(&load.id).await {
            Ok(()) => {
                info!(load_id = %load.id, "Load cancelled");
                self.notice = Some(Notice::success("Load cancelled successfully"));
                self.refresh().await;
                Ok(())
            }
            Err(e) => {
                error!(load_id = %load.id, error = %e, "Failed to cancel load");
                self.notice = Some(Notice::error("Failed to cancel load"));
                Err(e)
            }
        }
    }

    /// Find a listed load by identifier
    pub fn find(&self, id: &str) -> Option<&Load> {
        self.page.content.iter().find(|load| load.id == id)
    }

    /// Table projection of the current list
    pub fn rows(&self) -> Vec<LoadRow> {
        self.page.content.iter().map(LoadRow::from_load).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use loadbook_client::{MockApi, RecordedRequest};
    use loadbook_core::Facility;
    use loadbook_core::types::parse_timestamp;
    use pretty_assertions::assert_eq;
    use serde_json::json;

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
            no_of_trucks: 2,
            weight: 1000.0,
            comment: None,
            status,
            date_posted: Some(Utc.with_ymd_and_hms(2024, 3, 14, 9, 30, 0).unwrap()),
        }
    }

    fn view_with(mock: &MockApi) -> LoadView {
        LoadView::new(Arc::new(mock.clone()), 10)
    }

    fn paths(mock: &MockApi) -> Vec<String> {
        mock.requests()
            .into_iter()
            .map(|request| format!("{} {}", request.method, request.path))
            .collect()
    }

    #[tokio::test]
    async fn test_each_filter_change_refetches_with_accumulated_query() {
        let mock = MockApi::new();
        let mut view = view_with(&mock);

        view.set_shipper_id(Some("S1".to_string())).await;
        view.set_truck_type(Some(TruckType::Tanker)).await;
        view.set_status(Some(LoadStatus::Posted)).await;
        view.set_shipper_id(Some("  ".to_string())).await;

        assert_eq!(
            paths(&mock),
            vec![
                "GET /load?shipperId=S1&size=10",
                "GET /load?shipperId=S1&truckType=Tanker&size=10",
                "GET /load?shipperId=S1&truckType=Tanker&status=POSTED&size=10",
                "GET /load?truckType=Tanker&status=POSTED&size=10",
            ]
        );
    }

    #[tokio::test]
    async fn test_set_filters_fetches_once() {
        let mock = MockApi::new();
        let mut view = view_with(&mock);

        view.set_filters(LoadFilters {
            shipper_id: Some(" ".to_string()),
            truck_type: Some(TruckType::Container),
            status: Some(LoadStatus::Booked),
            ..LoadFilters::default()
        })
        .await;

        assert_eq!(
            paths(&mock),
            vec!["GET /load?truckType=Container&status=BOOKED&size=10"]
        );
        assert_eq!(view.filters().shipper_id, None);
    }

    #[tokio::test]
    async fn test_create_posts_nested_payload_then_refreshes() {
        let mock = MockApi::new();
        let mut view = view_with(&mock);
        view.set_status(Some(LoadStatus::Posted)).await;
        mock.clear_requests();

        view.open_create();
        let form = view.form_mut().unwrap();
        form.shipper_id = "S1".to_string();
        form.product_type = "Steel".to_string();
        form.loading_point = "A".to_string();
        form.unloading_point = "B".to_string();
        form.loading_date = parse_timestamp("2024-03-15T08:00:00Z");
        form.unloading_date = parse_timestamp("2024-03-16T18:00:00Z");
        form.truck_type = Some(TruckType::Flatbed);
        form.no_of_trucks = Some(2);
        form.weight = Some(1000.0);

        let created = view.submit().await.unwrap();

        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[0],
            RecordedRequest {
                method: "POST",
                path: "/load".to_string(),
                body: Some(json!({
                    "shipperId": "S1",
                    "facility": {
                        "loadingPoint": "A",
                        "unloadingPoint": "B",
                        "loadingDate": "2024-03-15T08:00:00.000Z",
                        "unloadingDate": "2024-03-16T18:00:00.000Z"
                    },
                    "productType": "Steel",
                    "truckType": "Flatbed",
                    "noOfTrucks": 2,
                    "weight": 1000.0
                })),
            }
        );
        assert_eq!(requests[1].method, "GET");
        assert_eq!(requests[1].path, "/load?status=POSTED&size=10");

        assert!(view.editor().is_none());
        assert_eq!(view.notice().unwrap().message, "Load created successfully");
        assert_eq!(view.loads()[0].id, created.id);
    }

    #[tokio::test]
    async fn test_invalid_form_sends_nothing_and_stays_open() {
        let mock = MockApi::new();
        let mut view = view_with(&mock);
        view.open_create();

        let error = view.submit().await.unwrap_err();

        assert!(matches!(error, Error::Validation { .. }));
        assert!(mock.requests().is_empty());
        let editor = view.editor().unwrap();
        assert_eq!(
            editor.errors.message_for("shipper_id"),
            Some("Please enter shipper ID")
        );
    }

    #[tokio::test]
    async fn test_failed_create_keeps_form_open() {
        let mock = MockApi::new();
        let mut view = view_with(&mock);
        view.open_create();
        *view.form_mut().unwrap() = LoadForm::from_load(&sample_load("l-1", LoadStatus::Posted));
        mock.set_failing(Some("boom"));

        assert!(view.submit().await.is_err());
        assert!(view.editor().is_some());
        assert_eq!(view.notice().unwrap().message, "Failed to create load");
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_edit_updates_by_id() {
        let mock = MockApi::new();
        mock.seed_load(sample_load("l-1", LoadStatus::Booked));
        let mut view = view_with(&mock);
        view.refresh().await;
        mock.clear_requests();

        let load = view.find("l-1").unwrap().clone();
        view.open_edit(&load).unwrap();
        view.form_mut().unwrap().weight = Some(1200.0);
        let updated = view.submit().await.unwrap();

        assert_eq!(updated.weight, 1200.0);
        assert_eq!(
            paths(&mock),
            vec!["PUT /load/l-1", "GET /load?size=10"]
        );
        assert_eq!(view.notice().unwrap().message, "Load updated successfully");
    }

    #[tokio::test]
    async fn test_cancelled_load_cannot_be_edited_or_cancelled() {
        let mock = MockApi::new();
        let mut view = view_with(&mock);
        let load = sample_load("l-1", LoadStatus::Cancelled);

        assert!(matches!(
            view.open_edit(&load),
            Err(Error::ActionNotAllowed { .. })
        ));
        assert!(matches!(
            view.cancel(&load).await,
            Err(Error::ActionNotAllowed { .. })
        ));
        assert!(mock.requests().is_empty());
        assert!(view.editor().is_none());
    }

    #[tokio::test]
    async fn test_cancel_deletes_then_refreshes() {
        let mock = MockApi::new();
        mock.seed_load(sample_load("l-1", LoadStatus::Posted));
        let mut view = view_with(&mock);

        view.cancel(&sample_load("l-1", LoadStatus::Posted)).await.unwrap();

        assert_eq!(paths(&mock), vec!["DELETE /load/l-1", "GET /load?size=10"]);
        assert_eq!(view.notice().unwrap().message, "Load cancelled successfully");
        assert_eq!(view.loads()[0].status, LoadStatus::Cancelled);
        assert!(view.rows()[0].actions.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_posts_notice() {
        let mock = MockApi::new().with_failure("down");
        let mut view = view_with(&mock);

        view.refresh().await;

        assert!(!view.is_loading());
        assert_eq!(view.notice().unwrap().message, "Failed to fetch loads");
        assert!(view.notice().unwrap().is_error());
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut view = view_with(&MockApi::new());
        let older = view.begin_fetch();
        let newer = view.begin_fetch();

        let fresh = Page {
            content: vec![sample_load("new", LoadStatus::Posted)],
            ..Page::default()
        };
        let stale = Page {
            content: vec![sample_load("old", LoadStatus::Posted)],
            ..Page::default()
        };

        assert!(view.apply_fetch(&newer, Ok(fresh)));
        assert!(!view.apply_fetch(&older, Ok(stale)));
        assert_eq!(view.loads()[0].id, "new");
        assert!(!view.is_loading());
    }

    #[test]
    fn test_loading_clears_only_when_latest_settles() {
        let mut view = view_with(&MockApi::new());
        let older = view.begin_fetch();
        let newer = view.begin_fetch();

        view.apply_fetch(&older, Ok(Page::default()));
        assert!(view.is_loading());

        view.apply_fetch(&newer, Ok(Page::default()));
        assert!(!view.is_loading());
    }

    #[test]
    fn test_row_projection() {
        let mut view = view_with(&MockApi::new());
        let ticket = view.begin_fetch();
        view.apply_fetch(
            &ticket,
            Ok(Page {
                content: vec![sample_load("l-1", LoadStatus::Posted)],
                ..Page::default()
            }),
        );

        let row = &view.rows()[0];
        assert_eq!(row.route, "Pune → Mumbai");
        assert_eq!(row.weight, "1000");
        assert_eq!(row.date_posted, "2024-03-14 09:30");
        assert_eq!(row.actions, &[Action::Edit, Action::Cancel]);
    }
}
