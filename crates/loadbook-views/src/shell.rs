//! Application shell: title, navigation and route resolution

use serde::Serialize;
use std::fmt;

/// Title shown in the header
pub const APP_TITLE: &str = "Load & Booking Management System";

/// A screen of the application
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "route", content = "path", rename_all = "snake_case")]
pub enum Route {
    /// `/`
    Dashboard,
    /// `/loads`
    Loads,
    /// `/bookings`
    Bookings,
    /// Anything else, with the path that was asked for
    NotFound(String),
}

impl Route {
    /// Resolve a path; query strings, fragments and a trailing slash are ignored
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let bare = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim();
        let normalized = match bare.trim_end_matches('/') {
            "" => "/",
            other => other,
        };

        match normalized {
            "/" => Self::Dashboard,
            "/loads" => Self::Loads,
            "/bookings" => Self::Bookings,
            _ => Self::NotFound(path.to_string()),
        }
    }

    /// Canonical path of the route
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Dashboard => "/",
            Self::Loads => "/loads",
            Self::Bookings => "/bookings",
            Self::NotFound(path) => path,
        }
    }

    /// Heading of the screen
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Loads => "Load Management",
            Self::Bookings => "Booking Management",
            Self::NotFound(_) => "Not Found",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// An entry of the navigation menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    /// Menu label
    pub label: &'static str,
    /// Target path
    pub path: &'static str,
}

/// Navigation menu in display order
pub const NAV_ITEMS: [NavItem; 3] = [
    NavItem {
        label: "Dashboard",
        path: "/",
    },
    NavItem {
        label: "Loads",
        path: "/loads",
    },
    NavItem {
        label: "Bookings",
        path: "/bookings",
    },
];

/// Navigation entry matching `route`, if it is a menu destination
#[must_use]
pub fn active_nav(route: &Route) -> Option<NavItem> {
    NAV_ITEMS.into_iter().find(|item| item.path == route.path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("/", Route::Dashboard)]
    #[case("", Route::Dashboard)]
    #[case("/loads", Route::Loads)]
    #[case("/loads/", Route::Loads)]
    #[case("/bookings?status=PENDING", Route::Bookings)]
    #[case("/admin", Route::NotFound("/admin".to_string()))]
    #[case("/loads/123", Route::NotFound("/loads/123".to_string()))]
    fn test_route_resolution(#[case] path: &str, #[case] expected: Route) {
        assert_eq!(Route::from_path(path), expected);
    }

    #[test]
    fn test_nav_items_cover_every_screen() {
        let labels: Vec<&str> = NAV_ITEMS.iter().map(|item| item.label).collect();
        assert_eq!(labels, vec!["Dashboard", "Loads", "Bookings"]);

        for item in NAV_ITEMS {
            assert_eq!(active_nav(&Route::from_path(item.path)), Some(item));
        }
        assert_eq!(active_nav(&Route::from_path("/nope")), None);
    }

    #[test]
    fn test_title() {
        assert_eq!(APP_TITLE, "Load & Booking Management System");
        assert_eq!(Route::from_path("/x").to_string(), "Not Found");
    }
}
