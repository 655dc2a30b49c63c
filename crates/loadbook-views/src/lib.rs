//! View state and actions for the load & booking client
//!
//! Each screen is an owned value holding its filters, last fetched list,
//! open form and latest notice. Views talk to the server only through
//! [`loadbook_client::LoadBookingApi`], so they run the same against the
//! HTTP client and the in-memory mock.

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
    clippy::unused_self,
    clippy::future_not_send
)]

pub mod bookings;
pub mod dashboard;
pub mod display;
pub mod forms;
pub mod loads;
pub mod notice;
pub mod sequence;
pub mod shell;
pub mod state;

pub use bookings::{BookingRow, BookingView, LoadOption};
pub use dashboard::Dashboard;
pub use forms::{BookingForm, FormErrors, LoadForm};
pub use loads::{EditorMode, LoadEditor, LoadRow, LoadView};
pub use notice::{Notice, NoticeKind};
pub use sequence::{RequestSequencer, Ticket};
pub use shell::{APP_TITLE, NAV_ITEMS, NavItem, Route};
pub use state::AppState;
