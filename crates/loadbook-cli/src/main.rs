//! Load & Booking Management command-line client
//!
//! Drives the load, booking and dashboard views against the REST API and
//! prints their tables and notices to the terminal.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]
#![allow(clippy::future_not_send)]

mod output;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use loadbook_client::{BookingFilters, LoadFilters};
use loadbook_core::config::normalize_base_url;
use loadbook_core::types::parse_timestamp;
use loadbook_core::{BookingStatus, Config, Error, LoadStatus, Result, TruckType};
use loadbook_views::shell::active_nav;
use loadbook_views::{APP_TITLE, AppState, LoadForm, NAV_ITEMS, Notice, Route};
use output::OutputFormat;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Command line interface for the load & booking client
#[derive(Parser)]
#[command(
    name = "loadbook",
    version = env!("CARGO_PKG_VERSION"),
    about = "Load & Booking Management System",
    long_about = "Manage cargo loads and transporter bookings against the load & booking REST API."
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// API base URL (overrides configuration)
    #[arg(long, value_name = "URL", global = true)]
    base_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable structured JSON logging
    #[arg(long, global = true)]
    json: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Show the dashboard
    Dashboard,

    /// Open the screen at a path (`/`, `/loads`, `/bookings`)
    Open {
        /// Path to resolve
        #[arg(value_name = "PATH", default_value = "/")]
        path: String,
    },

    /// Manage loads
    Loads {
        /// Load subcommand
        #[command(subcommand)]
        action: LoadCommands,
    },

    /// Manage bookings
    Bookings {
        /// Booking subcommand
        #[command(subcommand)]
        action: BookingCommands,
    },

    /// Inspect configuration
    Config {
        /// Configuration subcommand
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Load management commands
#[derive(Subcommand)]
enum LoadCommands {
    /// List loads
    List {
        /// Filter by shipper ID
        #[arg(long)]
        shipper_id: Option<String>,

        /// Filter by truck type (Flatbed, Container, Refrigerated, Tanker)
        #[arg(long, value_parser = parse_truck_type)]
        truck_type: Option<TruckType>,

        /// Filter by status (POSTED, BOOKED, CANCELLED)
        #[arg(long)]
        status: Option<LoadStatus>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Show one load
    Show {
        /// Load ID
        id: String,
    },

    /// Post a new load
    Create(LoadFields),

    /// Edit a load; omitted fields keep their current value
    Edit {
        /// Load ID
        id: String,

        /// Fields to change
        #[command(flatten)]
        fields: LoadFields,
    },

    /// Cancel a load
    Cancel {
        /// Load ID
        id: String,
    },
}

/// Load form fields as flags
#[derive(Args, Debug, Default)]
struct LoadFields {
    /// Shipper ID
    #[arg(long)]
    shipper_id: Option<String>,

    /// Product type
    #[arg(long)]
    product_type: Option<String>,

    /// Loading point
    #[arg(long)]
    loading_point: Option<String>,

    /// Unloading point
    #[arg(long)]
    unloading_point: Option<String>,

    /// Loading date (`2024-03-15T08:00`, RFC 3339, or `2024-03-15`)
    #[arg(long, value_parser = parse_date)]
    loading_date: Option<DateTime<Utc>>,

    /// Unloading date
    #[arg(long, value_parser = parse_date)]
    unloading_date: Option<DateTime<Utc>>,

    /// Truck type (Flatbed, Container, Refrigerated, Tanker)
    #[arg(long, value_parser = parse_truck_type)]
    truck_type: Option<TruckType>,

    /// Number of trucks
    #[arg(long)]
    trucks: Option<u32>,

    /// Weight in kilograms
    #[arg(long, allow_negative_numbers = true)]
    weight: Option<f64>,

    /// Comment (an empty value clears it)
    #[arg(long)]
    comment: Option<String>,
}

impl LoadFields {
    /// Overwrite the form fields that were given on the command line
    fn apply_to(self, form: &mut LoadForm) {
        if let Some(value) = self.shipper_id {
            form.shipper_id = value;
        }
        if let Some(value) = self.product_type {
            form.product_type = value;
        }
        if let Some(value) = self.loading_point {
            form.loading_point = value;
        }
        if let Some(value) = self.unloading_point {
            form.unloading_point = value;
        }
        if self.loading_date.is_some() {
            form.loading_date = self.loading_date;
        }
        if self.unloading_date.is_some() {
            form.unloading_date = self.unloading_date;
        }
        if self.truck_type.is_some() {
            form.truck_type = self.truck_type;
        }
        if self.trucks.is_some() {
            form.no_of_trucks = self.trucks;
        }
        if self.weight.is_some() {
            form.weight = self.weight;
        }
        if let Some(value) = self.comment {
            form.comment = value;
        }
    }
}

/// Booking management commands
#[derive(Subcommand)]
enum BookingCommands {
    /// List bookings
    List {
        /// Filter by transporter ID
        #[arg(long)]
        transporter_id: Option<String>,

        /// Filter by status (PENDING, ACCEPTED, REJECTED)
        #[arg(long)]
        status: Option<BookingStatus>,

        /// Filter by load ID
        #[arg(long)]
        load_id: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Show one booking
    Show {
        /// Booking ID
        id: String,
    },

    /// List loads that can take bookings
    Loads,

    /// Propose a booking against a posted load
    Create {
        /// Load ID
        #[arg(long)]
        load_id: Option<String>,

        /// Transporter ID
        #[arg(long)]
        transporter_id: Option<String>,

        /// Proposed rate in dollars
        #[arg(long, allow_negative_numbers = true)]
        rate: Option<f64>,

        /// Comment
        #[arg(long)]
        comment: Option<String>,
    },

    /// Accept a pending booking
    Accept {
        /// Booking ID
        id: String,
    },

    /// Reject a pending booking
    Reject {
        /// Booking ID
        id: String,
    },

    /// Delete a booking
    Delete {
        /// Booking ID
        id: String,
    },
}

/// Configuration commands
#[derive(Subcommand)]
enum ConfigCommands {
    /// Show resolved configuration
    Show,
}

fn parse_truck_type(value: &str) -> std::result::Result<TruckType, String> {
    value.parse().map_err(|e: Error| e.to_string())
}

fn parse_date(value: &str) -> std::result::Result<DateTime<Utc>, String> {
    parse_timestamp(value).ok_or_else(|| format!("'{value}' is not a recognizable date-time"))
}

/// Main entry point for the client
///
/// # Errors
///
/// Returns error if configuration is invalid or the requested action fails
#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (for development convenience)
    if let Err(e) = dotenvy::dotenv() {
        // It's okay if .env doesn't exist
        debug!("Note: .env file not loaded: {e}");
    }

    let cli = Cli::parse();

    let config = load_config(&cli)?;
    loadbook_core::init_logging(&config.logging)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        base_url = %config.api.base_url,
        "Load & booking client starting"
    );

    let state = AppState::new(config)?;

    match cli.command {
        None | Some(Commands::Dashboard) => {
            print!("{}", state.dashboard());
            Ok(())
        }
        Some(Commands::Open { path }) => open_route(&state, &path).await,
        Some(Commands::Loads { action }) => handle_load_command(&state, action).await,
        Some(Commands::Bookings { action }) => handle_booking_command(&state, action).await,
        Some(Commands::Config { action }) => match action {
            ConfigCommands::Show => show_config(&state.config),
        },
    }
}

/// Resolve configuration from file, environment and flags
///
/// # Errors
///
/// Returns error if the configuration cannot be loaded or is invalid
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load_from(cli.config.as_deref().map(Path::new))?;

    if let Some(base_url) = &cli.base_url {
        config.api.base_url = normalize_base_url(base_url);
    }
    if let Some(level) = &cli.log_level {
        config.logging.level.clone_from(level);
    }
    if cli.json {
        config.logging.format = "json".to_string();
    }

    config.validate()?;
    Ok(config)
}

/// Show configuration as TOML
///
/// # Errors
///
/// Returns error if configuration cannot be serialized
fn show_config(config: &Config) -> Result<()> {
    let config_toml = toml::to_string_pretty(config)
        .map_err(|e| Error::configuration(format!("Failed to serialize configuration: {e}")))?;
    println!("{config_toml}");
    Ok(())
}

/// Print the outcome of a view action and pass its result through
fn finish<T>(notice: Option<Notice>, result: Result<T>) -> Result<T> {
    if let Some(notice) = notice {
        output::print_notice(&notice);
    }
    result
}

/// Print a fetch notice; a failure notice becomes the command's error
fn fetch_outcome(notice: Option<Notice>) -> Result<()> {
    let Some(notice) = notice else {
        return Ok(());
    };
    output::print_notice(&notice);
    if notice.is_error() {
        Err(Error::Other(notice.message))
    } else {
        Ok(())
    }
}

/// Render the screen a path resolves to
///
/// # Errors
///
/// Returns a not-found error for unknown paths, or the view's fetch error
async fn open_route(state: &AppState, path: &str) -> Result<()> {
    let route = Route::from_path(path);
    let active = active_nav(&route);
    let nav: Vec<String> = NAV_ITEMS
        .iter()
        .map(|item| {
            if active == Some(*item) {
                format!("[{}]", item.label)
            } else {
                item.label.to_string()
            }
        })
        .collect();
    println!("{APP_TITLE}");
    println!("{}", nav.join("  "));
    println!();

    match route {
        Route::Dashboard => {
            print!("{}", state.dashboard());
            Ok(())
        }
        Route::Loads => {
            let mut view = state.load_view();
            view.refresh().await;
            println!("{}", Route::Loads.title());
            print!("{}", output::load_table(&view.rows()));
            fetch_outcome(view.take_notice())
        }
        Route::Bookings => {
            let mut view = state.booking_view();
            view.refresh().await;
            println!("{}", Route::Bookings.title());
            print!("{}", output::booking_table(&view.rows()));
            fetch_outcome(view.take_notice())
        }
        Route::NotFound(path) => {
            eprintln!("404 - The page '{path}' does not exist");
            Err(Error::NotFound { resource: path })
        }
    }
}

/// Handle load management commands
///
/// # Errors
///
/// Returns error if validation fails, the action is not offered for the
/// load's status, or the server rejects the request
async fn handle_load_command(state: &AppState, action: LoadCommands) -> Result<()> {
    let mut view = state.load_view();

    match action {
        LoadCommands::List {
            shipper_id,
            truck_type,
            status,
            format,
        } => {
            view.set_filters(LoadFilters {
                shipper_id,
                truck_type,
                status,
                ..LoadFilters::default()
            })
            .await;
            fetch_outcome(view.take_notice())?;

            match format {
                OutputFormat::Table => {
                    print!("{}", output::load_table(&view.rows()));
                    println!("{} load(s) total", view.total());
                }
                OutputFormat::Json => println!("{}", output::to_json(&view.rows())?),
            }
            Ok(())
        }
        LoadCommands::Show { id } => {
            let load = state.api.get_load(&id).await?;
            print!("{}", output::load_detail(&load));
            Ok(())
        }
        LoadCommands::Create(fields) => {
            view.open_create();
            if let Some(form) = view.form_mut() {
                fields.apply_to(form);
            }
            let result = view.submit().await;
            report_form_errors(view.editor().map(|editor| &editor.errors));
            let load = finish(view.take_notice(), result)?;
            println!("Load ID: {}", load.id);
            Ok(())
        }
        LoadCommands::Edit { id, fields } => {
            let load = state.api.get_load(&id).await?;
            view.open_edit(&load)?;
            if let Some(form) = view.form_mut() {
                fields.apply_to(form);
            }
            let result = view.submit().await;
            report_form_errors(view.editor().map(|editor| &editor.errors));
            finish(view.take_notice(), result).map(drop)
        }
        LoadCommands::Cancel { id } => {
            let load = state.api.get_load(&id).await?;
            let result = view.cancel(&load).await;
            finish(view.take_notice(), result)
        }
    }
}

/// Handle booking management commands
///
/// # Errors
///
/// Returns error if validation fails, the action is not offered for the
/// booking's status, or the server rejects the request
async fn handle_booking_command(state: &AppState, action: BookingCommands) -> Result<()> {
    let mut view = state.booking_view();

    match action {
        BookingCommands::List {
            transporter_id,
            status,
            load_id,
            format,
        } => {
            view.set_filters(BookingFilters {
                transporter_id,
                status,
                load_id,
            })
            .await;
            fetch_outcome(view.take_notice())?;

            match format {
                OutputFormat::Table => print!("{}", output::booking_table(&view.rows())),
                OutputFormat::Json => println!("{}", output::to_json(&view.rows())?),
            }
            Ok(())
        }
        BookingCommands::Show { id } => {
            let booking = state.api.get_booking(&id).await?;
            print!("{}", output::booking_detail(&booking));
            Ok(())
        }
        BookingCommands::Loads => {
            view.refresh().await;
            print!("{}", output::option_list(&view.load_choice_options()));
            Ok(())
        }
        BookingCommands::Create {
            load_id,
            transporter_id,
            rate,
            comment,
        } => {
            view.open_create();
            if let Some(form) = view.form_mut() {
                form.load_id = load_id.unwrap_or_default();
                form.transporter_id = transporter_id.unwrap_or_default();
                form.proposed_rate = rate;
                form.comment = comment.unwrap_or_default();
            }
            let result = view.submit().await;
            report_form_errors(Some(view.form_errors()));
            let booking = finish(view.take_notice(), result)?;
            println!("Booking ID: {}", booking.id);
            Ok(())
        }
        BookingCommands::Accept { id } => {
            let booking = state.api.get_booking(&id).await?;
            let result = view.accept(&booking).await;
            finish(view.take_notice(), result)
        }
        BookingCommands::Reject { id } => {
            let booking = state.api.get_booking(&id).await?;
            let result = view.reject(&booking).await;
            finish(view.take_notice(), result)
        }
        BookingCommands::Delete { id } => {
            let booking = state.api.get_booking(&id).await?;
            let result = view.delete(&booking).await;
            finish(view.take_notice(), result)
        }
    }
}

/// Print every failed form field
fn report_form_errors(errors: Option<&loadbook_views::FormErrors>) {
    for error in errors.into_iter().flat_map(loadbook_views::FormErrors::iter) {
        eprintln!("{}: {}", error.field, error.message);
    }
}
