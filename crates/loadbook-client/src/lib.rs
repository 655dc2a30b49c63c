//! Client for the load & booking REST API
//!
//! [`ApiClient`] talks HTTP to the server; [`MockApi`] keeps the same
//! resources in memory for tests. Both implement [`LoadBookingApi`], which is
//! what the views depend on.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation,
    clippy::significant_drop_tightening
)]

pub mod api;
pub mod client;
pub mod mock;
pub mod query;

pub use api::LoadBookingApi;
pub use client::ApiClient;
pub use mock::{MockApi, RecordedRequest};
pub use query::{BookingFilters, LoadFilters, build_query};
