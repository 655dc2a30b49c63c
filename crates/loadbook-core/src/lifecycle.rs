//! Status lifecycle as the client sees it
//!
//! The remote server is the only enforcer of status transitions. This module
//! mirrors its transition table so the client can decide which actions to
//! offer for a record; it never changes a status locally.

use crate::types::{Booking, BookingStatus, Load, LoadStatus};
use std::fmt;

/// A state-changing request the client can offer against an existing entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    /// Edit a load's details
    Edit,
    /// Soft-delete a load
    Cancel,
    /// Accept a pending booking
    Accept,
    /// Reject a pending booking
    Reject,
    /// Remove a booking
    Delete,
}

impl Action {
    /// Lower-case verb used in notices and logs
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Cancel => "cancel",
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Entities whose status gates the actions offered for them
pub trait Actionable {
    /// Actions the client offers for this record, in display order
    fn allowed_actions(&self) -> &'static [Action];

    /// Status name for messages
    fn status_label(&self) -> &'static str;

    /// Whether `action` is offered for this record
    fn allows(&self, action: Action) -> bool {
        self.allowed_actions().contains(&action)
    }

    /// Fail with [`crate::Error::ActionNotAllowed`] unless `action` is offered
    ///
    /// # Errors
    ///
    /// Returns an error when the record's status withholds the action.
    fn ensure_allowed(&self, action: Action) -> crate::Result<()> {
        if self.allows(action) {
            Ok(())
        } else {
            Err(crate::Error::ActionNotAllowed {
                action: action.verb().to_string(),
                status: self.status_label().to_string(),
            })
        }
    }
}

impl LoadStatus {
    /// Whether the server accepts a move from `self` to `target`
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Posted, Self::Booked | Self::Cancelled)
                | (Self::Booked, Self::Posted | Self::Cancelled)
        )
    }

    /// No transition leaves this status
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Actions offered for a load in this status
    #[must_use]
    pub const fn allowed_actions(self) -> &'static [Action] {
        if self.is_terminal() {
            &[]
        } else {
            &[Action::Edit, Action::Cancel]
        }
    }
}

impl BookingStatus {
    /// Whether the server accepts a move from `self` to `target`
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Accepted | Self::Rejected)
        )
    }

    /// No transition leaves this status
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Actions offered for a booking in this status
    ///
    /// Delete is always offered; accept and reject only while pending.
    #[must_use]
    pub const fn allowed_actions(self) -> &'static [Action] {
        match self {
            Self::Pending => &[Action::Accept, Action::Reject, Action::Delete],
            Self::Accepted | Self::Rejected => &[Action::Delete],
        }
    }
}

impl Actionable for Load {
    fn allowed_actions(&self) -> &'static [Action] {
        self.status.allowed_actions()
    }

    fn status_label(&self) -> &'static str {
        self.status.as_str()
    }
}

impl Actionable for Booking {
    fn allowed_actions(&self) -> &'static [Action] {
        self.status.allowed_actions()
    }

    fn status_label(&self) -> &'static str {
        self.status.as_str()
    }
}
