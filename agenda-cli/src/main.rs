mod commands;
mod render;

use anyhow::Result;
use agenda_core::Agenda;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "agenda")]
#[command(about = "Browse services, book appointments and run a small booking desk")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List services (clients only see active ones)
    Services {
        /// Only this category
        #[arg(short, long)]
        category: Option<String>,

        /// Case-insensitive name search
        #[arg(short, long)]
        search: Option<String>,

        /// Only services offering this date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,

        /// Filter by status (admin only): all, active, inactive
        #[arg(long)]
        status: Option<String>,

        /// Show slots and remaining capacity per date
        #[arg(long)]
        slots: bool,
    },
    /// Manage the service catalog (admin)
    Service {
        #[command(subcommand)]
        action: ServiceAction,
    },
    /// Book an appointment
    Book {
        /// Service id
        service: String,

        /// Date (YYYY-MM-DD); prompted if omitted
        #[arg(short, long)]
        date: Option<String>,

        /// Slot number as shown by `services --slots`; prompted if omitted
        #[arg(long)]
        slot: Option<usize>,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        email: Option<String>,
    },
    /// Move an appointment to another date or time
    Reschedule {
        appointment: String,

        /// New date (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,

        /// New time (e.g. "15:00" or "3:00 PM")
        #[arg(short, long)]
        time: String,

        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
    /// Cancel an appointment and release its slot
    Cancel {
        appointment: String,

        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
    /// Mark an appointment as delivered (admin)
    Complete { appointment: String },
    /// List appointments (all of them for admins)
    Appointments {
        /// Only my own appointments
        #[arg(long)]
        mine: bool,

        /// Only this service
        #[arg(long)]
        service: Option<String>,

        /// Only this date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// New bookings and appointments coming up in the next 24h (admin)
    Notifications,
    /// Catalog statistics and projected revenue (admin)
    Stats,
    /// Remove invalid, orphaned and past appointments
    Sweep,
    /// Delete every appointment (admin)
    Clear {
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
    /// Fill an empty catalog with demo services (admin)
    Seed,
    /// Start a session
    Login {
        #[command(subcommand)]
        method: LoginMethod,
    },
    /// Create a client account and sign in
    Register {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,
    },
    /// End the current session
    Logout,
    /// Show the current session
    Whoami,
    /// Show config and data paths
    Config {
        /// Save a new default log level (error, warn, info, debug, trace)
        #[arg(long)]
        log_level: Option<String>,
    },
}

#[derive(Subcommand)]
enum ServiceAction {
    /// Create a service
    Add(commands::service::ServiceArgs),
    /// Edit a service; omitted fields keep their current value
    Edit {
        id: String,

        #[command(flatten)]
        args: commands::service::ServiceArgs,
    },
    /// Delete a service
    Delete {
        id: String,

        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
    /// Switch a service between active and inactive
    Toggle { id: String },
}

#[derive(Subcommand)]
enum LoginMethod {
    /// Administrator login
    Admin,
    /// Quick access with a token
    Token { token: String },
    /// Continue as a guest
    Guest,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let agenda = Agenda::open()?;
    init_tracing(&agenda.config().log_level);

    // Housekeeping on every start
    let report = agenda.sweep()?;
    if report.total() > 0 {
        tracing::info!(removed = report.total(), "startup sweep");
    }

    match cli.command {
        Commands::Services {
            category,
            search,
            date,
            status,
            slots,
        } => commands::services::run(&agenda, category, search, date, status, slots),
        Commands::Service { action } => {
            agenda.require_admin()?;
            match action {
                ServiceAction::Add(args) => commands::service::add(&agenda, args),
                ServiceAction::Edit { id, args } => commands::service::edit(&agenda, &id, args),
                ServiceAction::Delete { id, force } => {
                    commands::service::delete(&agenda, &id, force)
                }
                ServiceAction::Toggle { id } => commands::service::toggle(&agenda, &id),
            }
        }
        Commands::Book {
            service,
            date,
            slot,
            name,
            phone,
            email,
        } => commands::book::run(&agenda, &service, date, slot, name, phone, email),
        Commands::Reschedule {
            appointment,
            date,
            time,
            force,
        } => commands::reschedule::run(&agenda, &appointment, &date, &time, force),
        Commands::Cancel { appointment, force } => {
            commands::cancel::run(&agenda, &appointment, force)
        }
        Commands::Complete { appointment } => {
            agenda.require_admin()?;
            commands::complete::run(&agenda, &appointment)
        }
        Commands::Appointments {
            mine,
            service,
            date,
        } => commands::appointments::run(&agenda, mine, service, date),
        Commands::Notifications => {
            agenda.require_admin()?;
            commands::notifications::run(&agenda)
        }
        Commands::Stats => {
            agenda.require_admin()?;
            commands::stats::run(&agenda)
        }
        Commands::Sweep => commands::sweep::run(&agenda),
        Commands::Clear { force } => {
            agenda.require_admin()?;
            commands::clear::run(&agenda, force)
        }
        Commands::Seed => {
            agenda.require_admin()?;
            commands::seed::run(&agenda)
        }
        Commands::Login { method } => match method {
            LoginMethod::Admin => commands::login::admin(&agenda),
            LoginMethod::Token { token } => commands::login::token(&agenda, &token),
            LoginMethod::Guest => commands::login::guest(&agenda),
        },
        Commands::Register { name, email } => commands::register::run(&agenda, name, email),
        Commands::Logout => commands::session::logout(&agenda),
        Commands::Whoami => commands::session::whoami(&agenda),
        Commands::Config { log_level } => commands::config::run(&agenda, log_level),
    }
}

/// Log to stderr. `RUST_LOG` wins over the configured level.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
