//! Application state management

use crate::bookings::BookingView;
use crate::dashboard::Dashboard;
use crate::loads::LoadView;
use loadbook_client::{ApiClient, LoadBookingApi};
use loadbook_core::{Config, Result};
use std::sync::Arc;

/// Application state holding configuration and the API backend
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Config,
    /// Backend every view talks to
    pub api: Arc<dyn LoadBookingApi>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create state backed by the HTTP client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built from the configuration.
    pub fn new(config: Config) -> Result<Self> {
        let api = ApiClient::from_config(&config.api)?;
        Ok(Self::with_api(config, Arc::new(api)))
    }

    /// Create state backed by any implementation of the API
    pub fn with_api(config: Config, api: Arc<dyn LoadBookingApi>) -> Self {
        Self { config, api }
    }

    /// A fresh load view using the configured page size
    pub fn load_view(&self) -> LoadView {
        LoadView::new(Arc::clone(&self.api), self.config.api.page_size)
    }

    /// A fresh booking view
    pub fn booking_view(&self) -> BookingView {
        BookingView::new(Arc::clone(&self.api))
    }

    /// The dashboard content
    pub fn dashboard(&self) -> Dashboard {
        Dashboard::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loadbook_client::MockApi;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_load_view_uses_configured_page_size() {
        let mock = MockApi::new();
        let mut config = Config::default();
        config.api.page_size = 25;
        let state = AppState::with_api(config, Arc::new(mock.clone()));

        state.load_view().refresh().await;

        assert_eq!(mock.requests()[0].path, "/load?size=25");
    }

    #[test]
    fn test_new_builds_http_backend() {
        let state = AppState::new(Config::default());
        assert!(state.is_ok());
    }
}
