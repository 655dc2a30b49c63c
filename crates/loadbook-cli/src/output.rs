//! Terminal rendering of view projections

use loadbook_core::{Action, Booking, Load};
use loadbook_core::types::format_display;
use loadbook_views::display::{EMPTY_CELL, format_optional_time, format_rate};
use loadbook_views::{BookingRow, LoadOption, LoadRow, Notice, NoticeKind};
use serde::Serialize;

/// How list commands print their results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

/// Column-aligned text table
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Start a table with the given column headers
    pub fn new(headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    /// Append a row; missing trailing cells render empty
    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Render with two spaces between columns
    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    *width = (*width).max(cell.chars().count());
                }
            }
        }

        let mut out = String::new();
        let header: Vec<String> = self.headers.iter().map(ToString::to_string).collect();
        write_line(&mut out, &header, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        write_line(&mut out, &rule, &widths);
        for row in &self.rows {
            write_line(&mut out, row, &widths);
        }
        out
    }
}

fn write_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let mut line = String::new();
    for (i, width) in widths.iter().enumerate() {
        let cell = cells.get(i).map_or("", String::as_str);
        if i > 0 {
            line.push_str("  ");
        }
        line.push_str(&format!("{cell:<width$}"));
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

fn actions_cell(actions: &[Action]) -> String {
    if actions.is_empty() {
        EMPTY_CELL.to_string()
    } else {
        actions
            .iter()
            .map(|action| action.verb())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Load list as a table
pub fn load_table(rows: &[LoadRow]) -> String {
    let mut table = Table::new(&[
        "ID",
        "Shipper ID",
        "Product Type",
        "Truck Type",
        "Route",
        "Weight (kg)",
        "Trucks",
        "Status",
        "Date Posted",
        "Actions",
    ]);
    for row in rows {
        table.push(vec![
            row.id.clone(),
            row.shipper_id.clone(),
            row.product_type.clone(),
            row.truck_type.clone(),
            row.route.clone(),
            row.weight.clone(),
            row.trucks.to_string(),
            row.status.to_string(),
            row.date_posted.clone(),
            actions_cell(row.actions),
        ]);
    }
    table.render()
}

/// Booking list as a table
pub fn booking_table(rows: &[BookingRow]) -> String {
    let mut table = Table::new(&[
        "ID",
        "Load ID",
        "Transporter ID",
        "Proposed Rate",
        "Status",
        "Requested At",
        "Comment",
        "Actions",
    ]);
    for row in rows {
        table.push(vec![
            row.id.clone(),
            row.load_id.clone(),
            row.transporter_id.clone(),
            row.proposed_rate.clone(),
            row.status.to_string(),
            row.requested_at.clone(),
            row.comment.clone(),
            actions_cell(row.actions),
        ]);
    }
    table.render()
}

/// Selector choices, one per line
pub fn option_list(options: &[LoadOption]) -> String {
    let mut table = Table::new(&["Value", "Label"]);
    for option in options {
        table.push(vec![option.value.clone(), option.label.clone()]);
    }
    table.render()
}

/// Every field of one load
pub fn load_detail(load: &Load) -> String {
    let mut table = Table::new(&["Field", "Value"]);
    let fields = [
        ("ID", load.id.clone()),
        ("Shipper ID", load.shipper_id.clone()),
        ("Product Type", load.product_type.clone()),
        ("Truck Type", load.truck_type.to_string()),
        ("Loading Point", load.facility.loading_point.clone()),
        ("Unloading Point", load.facility.unloading_point.clone()),
        ("Loading Date", format_display(&load.facility.loading_date)),
        ("Unloading Date", format_display(&load.facility.unloading_date)),
        ("Trucks", load.no_of_trucks.to_string()),
        ("Weight (kg)", load.weight.to_string()),
        ("Comment", load.comment.clone().unwrap_or_else(|| EMPTY_CELL.to_string())),
        ("Status", load.status.to_string()),
        ("Date Posted", format_optional_time(load.date_posted.as_ref())),
    ];
    for (name, value) in fields {
        table.push(vec![name.to_string(), value]);
    }
    table.render()
}

/// Every field of one booking
pub fn booking_detail(booking: &Booking) -> String {
    let mut table = Table::new(&["Field", "Value"]);
    let fields = [
        ("ID", booking.id.clone()),
        ("Load ID", booking.load_id.clone()),
        ("Transporter ID", booking.transporter_id.clone()),
        ("Proposed Rate", format_rate(booking.proposed_rate)),
        ("Status", booking.status.to_string()),
        ("Requested At", format_optional_time(booking.requested_at.as_ref())),
        (
            "Comment",
            booking.comment.clone().unwrap_or_else(|| EMPTY_CELL.to_string()),
        ),
    ];
    for (name, value) in fields {
        table.push(vec![name.to_string(), value]);
    }
    table.render()
}

/// Serialize any projection as pretty JSON
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> loadbook_core::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Print a notice: successes to stdout, failures to stderr
pub fn print_notice(notice: &Notice) {
    match notice.kind {
        NoticeKind::Success => println!("{notice}"),
        NoticeKind::Error => eprintln!("{notice}"),
    }
}
