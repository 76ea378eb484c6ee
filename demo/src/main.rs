//! LABDASH Lab Report Dashboard: demo CLI
//!
//! Runs the reference scenarios against the in-memory backend, or drives a
//! live backend over HTTP with a persisted session.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- report-history
//!   cargo run -p demo -- login --email avery@example.org --password ...
//!   cargo run -p demo -- reports --search quest --sort lab --order asc
//!   cargo run -p demo -- upload ./cbc.pdf

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use labdash_client::{ClientConfig, HttpBackend};
use labdash_contracts::error::{DashError, DashResult};
use labdash_core::{
    traits::TokenStore, Dashboard, ReportQuery, ReportView, SortDirection, SortKey, UploadFile,
};
use labdash_ref::scenarios::{report_history, session_restore, upload_validation};
use labdash_storage::FileTokenStore;

// ── CLI definition ────────────────────────────────────────────────────────────

/// LABDASH lab report dashboard demo.
///
/// Scenario subcommands run against built-in mock data. The remaining
/// subcommands talk to a live backend configured by `--config` or
/// `LABDASH_API_URL`.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "LABDASH lab report dashboard demo",
    long_about = "Runs LABDASH reference scenarios (report history, session restore,\n\
                  upload validation) or drives a live backend over HTTP."
)]
struct Cli {
    /// TOML client configuration (base_url, timeout_secs, token_path).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all three reference scenarios in sequence.
    RunAll,
    /// Scenario 1: list ordering, search, trends, failed refresh.
    ReportHistory,
    /// Scenario 2: token persistence and silent restore.
    SessionRestore,
    /// Scenario 3: upload type and size validation.
    UploadValidation,

    /// Sign in to the live backend and persist the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account on the live backend and sign in.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Show the signed-in user.
    Whoami,
    /// List reports from the live backend.
    Reports {
        /// Case-insensitive match on lab name or report date.
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, value_enum, default_value_t = SortArg::Date)]
        sort: SortArg,
        #[arg(long, value_enum, default_value_t = OrderArg::Desc)]
        order: OrderArg,
        /// Only reports with abnormal parameters.
        #[arg(long)]
        abnormal_only: bool,
    },
    /// Show one report with its insights.
    Show { id: String },
    /// Validate and upload a PDF, JPEG, or PNG report.
    Upload { path: PathBuf },
    /// Delete a report.
    Delete { id: String },
    /// End the session and forget the persisted token.
    Logout,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Date,
    Lab,
    Abnormal,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Date => SortKey::Date,
            SortArg::Lab => SortKey::Lab,
            SortArg::Abnormal => SortKey::AbnormalCount,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    Asc,
    Desc,
}

impl From<OrderArg> for SortDirection {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Asc => SortDirection::Asc,
            OrderArg::Desc => SortDirection::Desc,
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    let result = match cli.command {
        Command::RunAll => {
            print_banner();
            run_all()
        }
        Command::ReportHistory => {
            print_banner();
            report_history::run_scenario()
        }
        Command::SessionRestore => {
            print_banner();
            session_restore::run_scenario()
        }
        Command::UploadValidation => {
            print_banner();
            upload_validation::run_scenario()
        }
        Command::Login { email, password } => login(config, &email, &password),
        Command::Register { name, email, password } => register(config, &name, &email, &password),
        Command::Whoami => whoami(config),
        Command::Reports { search, sort, order, abnormal_only } => {
            let query = ReportQuery {
                search,
                sort_key: sort.into(),
                direction: order.into(),
                abnormal_only,
                ..ReportQuery::default()
            };
            list_reports(config, &query)
        }
        Command::Show { id } => show_report(config, &id),
        Command::Upload { path } => upload(config, &path),
        Command::Delete { id } => delete(config, &id),
        Command::Logout => logout(config),
    };

    if let Err(e) = result {
        eprintln!("Demo error: {}", e);
        std::process::exit(1);
    }
}

// ── Scenario dispatch ─────────────────────────────────────────────────────────

fn run_all() -> DashResult<()> {
    report_history::run_scenario()?;
    session_restore::run_scenario()?;
    upload_validation::run_scenario()?;
    println!("All selected scenarios completed successfully.");
    Ok(())
}

// ── Live backend ──────────────────────────────────────────────────────────────

/// Wire a dashboard to the configured HTTP backend and the file token store.
fn connect(config_path: Option<&Path>) -> DashResult<Dashboard> {
    let config = ClientConfig::load(config_path)?;
    let tokens: Arc<dyn TokenStore> = match &config.token_path {
        Some(path) => Arc::new(FileTokenStore::new(path)),
        None => Arc::new(FileTokenStore::at_default_location()?),
    };
    let backend = Arc::new(HttpBackend::new(&config, tokens.clone())?);
    Ok(Dashboard::new(backend.clone(), backend, tokens))
}

/// Connect and restore the persisted session; fail if there is none.
fn signed_in(config_path: Option<&Path>) -> DashResult<Dashboard> {
    let dash = connect(config_path)?;
    if !dash.init()? {
        eprintln!("Not signed in. Run `demo login --email ... --password ...` first.");
        return Err(DashError::NotAuthenticated);
    }
    Ok(dash)
}

fn login(config_path: Option<&Path>, email: &str, password: &str) -> DashResult<()> {
    let dash = connect(config_path)?;
    let user = dash.login(email, password)?;
    println!("Signed in as {} ({}) [{}]", user.name, user.email, user.initials);
    println!("{} report(s) available.", dash.store().len());
    Ok(())
}

fn register(config_path: Option<&Path>, name: &str, email: &str, password: &str) -> DashResult<()> {
    let dash = connect(config_path)?;
    let user = dash.register(name, email, password)?;
    println!("Account created for {} ({}) [{}]", user.name, user.email, user.initials);
    Ok(())
}

fn whoami(config_path: Option<&Path>) -> DashResult<()> {
    let dash = signed_in(config_path)?;
    let user = dash.session().user().ok_or(DashError::NotAuthenticated)?;
    println!("{} <{}> [{}]", user.name, user.email, user.initials);
    Ok(())
}

fn list_reports(config_path: Option<&Path>, query: &ReportQuery) -> DashResult<()> {
    let dash = signed_in(config_path)?;
    let reports = ReportView::new().query(dash.store(), query);

    println!("{:<26} {:<12} {:<32} {:>8}", "ID", "DATE", "LAB", "ABNORMAL");
    for report in &reports {
        println!(
            "{:<26} {:<12} {:<32} {:>8}",
            report.id,
            report.report_info.report_date,
            report.report_info.lab_name,
            report.abnormal_count()
        );
    }
    println!();
    println!("{} of {} report(s) shown.", reports.len(), dash.store().len());

    let recommendations = dash.store().recommendations();
    if !recommendations.is_empty() {
        println!();
        println!("Recommendations:");
        for rec in &recommendations {
            println!("  [{}] {}", rec.priority, rec.title);
        }
    }
    Ok(())
}

fn show_report(config_path: Option<&Path>, id: &str) -> DashResult<()> {
    let dash = signed_in(config_path)?;
    let detail = dash.report_detail(id)?;
    let report = detail.report();

    println!("{}: {} ({})", report.id, report.report_info.lab_name, report.report_info.report_date);
    for (section, param) in report.parameters() {
        let flag = match (param.direction(), param.severity()) {
            (Some(direction), Some(severity)) => format!("{:?} / {:?}", direction, severity),
            _ => String::new(),
        };
        println!(
            "  {:<24} {:<20} {:>8} {:<8} {:<16} {}",
            section.section_name, param.name, param.value, param.unit, param.reference_range, flag
        );
    }
    println!();
    println!("Insights:");
    for insight in detail.insights() {
        println!("  [{:?}] {}", insight.severity, insight.title);
    }
    Ok(())
}

fn upload(config_path: Option<&Path>, path: &Path) -> DashResult<()> {
    let file = UploadFile::from_path(path)?;
    // Reject locally before touching the network or the session.
    file.validate()?;
    let dash = signed_in(config_path)?;
    let report = dash.upload(&file)?;
    println!("Uploaded {} as report {}", file.file_name, report.id);
    Ok(())
}

fn delete(config_path: Option<&Path>, id: &str) -> DashResult<()> {
    let dash = signed_in(config_path)?;
    dash.delete_report(id)?;
    println!("Deleted report {}", id);
    Ok(())
}

fn logout(config_path: Option<&Path>) -> DashResult<()> {
    let dash = connect(config_path)?;
    dash.logout();
    println!("Signed out.");
    Ok(())
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("LABDASH: Lab Report Dashboard");
    println!("Reference Scenarios");
    println!("==============================");
    println!();
    println!("Dashboard state per session:");
    println!("  [1] Session store: login / silent restore / logout, token persisted");
    println!("  [2] Report store: fetch replaces the list; stale responses are discarded");
    println!("  [3] Views: filter by lab or date, stable sort by date, lab, or abnormal count");
    println!("  [4] Uploads: PDF/JPEG/PNG up to 10MB, validated before any request");
    println!();
}
