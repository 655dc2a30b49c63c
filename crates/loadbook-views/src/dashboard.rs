//! Landing page with overview cards and a quick-start guide
//!
//! The counts are fixed placeholders; they are not computed from the API.

use loadbook_core::LoadStatus;
use loadbook_core::types::StatusTone;
use serde::Serialize;
use std::fmt;

/// One statistic card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatCard {
    /// Card heading
    pub title: &'static str,
    /// Displayed value
    pub value: u64,
    /// Good (green) or bad (red) emphasis
    #[serde(skip)]
    pub tone: StatusTone,
}

/// Static dashboard content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    /// Overview cards in display order
    pub cards: [StatCard; 4],
    /// Welcome heading
    pub welcome_title: &'static str,
    /// Introductory paragraph
    pub welcome: &'static str,
    /// What each section of the application does
    pub sections: [(&'static str, &'static str); 2],
    /// Numbered quick-start steps
    pub quick_start: [&'static str; 4],
    /// Meaning of each load status
    pub legend: [(LoadStatus, &'static str); 3],
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            cards: [
                StatCard {
                    title: "Total Loads",
                    value: 1,
                    tone: StatusTone::Green,
                },
                StatCard {
                    title: "Active Bookings",
                    value: 0,
                    tone: StatusTone::Red,
                },
                StatCard {
                    title: "Completed",
                    value: 0,
                    tone: StatusTone::Green,
                },
                StatCard {
                    title: "Cancelled",
                    value: 0,
                    tone: StatusTone::Red,
                },
            ],
            welcome_title: "Welcome to Load & Booking Management System",
            welcome: "This system helps you manage cargo loads and transportation bookings \
                      efficiently. Use the navigation menu above to:",
            sections: [
                ("Loads", "Create, view, and manage cargo loads"),
                ("Bookings", "Handle booking requests and status updates"),
            ],
            quick_start: [
                "Create a new load by clicking on \"Loads\" and then \"Add New Load\"",
                "Fill in the load details including pickup and delivery information",
                "Transporters can create bookings for available loads",
                "Accept or reject booking requests as needed",
            ],
            legend: [
                (LoadStatus::Posted, "Load is available for booking"),
                (LoadStatus::Booked, "Load has active bookings"),
                (LoadStatus::Cancelled, "Load is no longer available"),
            ],
        }
    }
}

impl Dashboard {
    /// The dashboard content
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl fmt::Display for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dashboard")?;
        writeln!(f)?;
        for card in &self.cards {
            writeln!(f, "  {:<16} {}", card.title, card.value)?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.welcome_title)?;
        writeln!(f, "{}", self.welcome)?;
        for (name, purpose) in &self.sections {
            writeln!(f, "  - {name}: {purpose}")?;
        }
        writeln!(f)?;
        writeln!(f, "Quick Start Guide:")?;
        for (step, text) in self.quick_start.iter().enumerate() {
            writeln!(f, "  {}. {text}", step + 1)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "The system automatically manages load statuses based on booking activities:"
        )?;
        for (status, meaning) in &self.legend {
            writeln!(f, "  {status:<9} - {meaning}")?;
        }
        Ok(())
    }
}
