use clap::{Args, Parser, Subcommand, ValueEnum};
use microloan::application::service::LoanService;
use microloan::domain::amortization::compute_amortization_with;
use microloan::domain::loan::{LoanApplication, LoanTerms, TenantId};
use microloan::domain::money::RoundingPolicy;
use microloan::domain::ports::{LoanStoreBox, ScheduleStoreBox};
use microloan::infrastructure::in_memory::{InMemoryLoanStore, InMemoryScheduleStore};
#[cfg(feature = "storage-rocksdb")]
use microloan::infrastructure::rocksdb::RocksDBStore;
use microloan::interfaces::csv::application_reader::LoanApplicationReader;
use microloan::interfaces::csv::schedule_writer::ScheduleWriter;
use miette::{IntoDiagnostic, Result};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log more detail to stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute a payment schedule without storing it
    Simulate(SimulateArgs),
    /// Store loans and their payment schedules from an applications CSV file
    Originate(OriginateArgs),
}

#[derive(Args)]
struct SimulateArgs {
    /// Amount borrowed
    #[arg(long, allow_hyphen_values = true)]
    principal: String,

    /// Annual interest rate in percent (12 means 12%)
    #[arg(long, allow_hyphen_values = true)]
    rate: String,

    /// Number of monthly installments
    #[arg(long, allow_hyphen_values = true)]
    term: String,

    /// Disbursement date (YYYY-MM-DD); the first installment is due a month later
    #[arg(long)]
    start: String,

    /// Decimal places of the currency's minor unit
    #[arg(long, default_value_t = 2)]
    scale: u32,

    #[arg(long, value_enum, default_value_t = Format::Csv)]
    format: Format,
}

#[derive(Args)]
struct OriginateArgs {
    /// Input loan applications CSV file
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Decimal places of the currency's minor unit
    #[arg(long, default_value_t = 2)]
    scale: u32,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Simulate(args) => simulate(args),
        Command::Originate(args) => originate(args).await,
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn simulate(args: SimulateArgs) -> Result<()> {
    let policy = RoundingPolicy::new(args.scale).into_diagnostic()?;
    let application = LoanApplication {
        principal: Some(args.principal),
        annual_rate: Some(args.rate),
        term_months: Some(args.term),
        start_date: Some(args.start),
        ..Default::default()
    };
    let terms = LoanTerms::try_from(&application).into_diagnostic()?;
    let result = compute_amortization_with(&terms, policy).into_diagnostic()?;

    let stdout = io::stdout();
    match args.format {
        Format::Csv => {
            let mut writer = ScheduleWriter::new(stdout.lock());
            writer.write_simulation(&result).into_diagnostic()?;
        }
        Format::Json => {
            let mut out = stdout.lock();
            serde_json::to_writer_pretty(&mut out, &result).into_diagnostic()?;
            writeln!(out).into_diagnostic()?;
        }
    }
    Ok(())
}

async fn originate(args: OriginateArgs) -> Result<()> {
    let policy = RoundingPolicy::new(args.scale).into_diagnostic()?;
    let (loan_store, schedule_store) = open_stores(args.db_path)?;
    let service = LoanService::with_policy(loan_store, schedule_store, policy);

    let file = File::open(&args.input).into_diagnostic()?;
    let reader = LoanApplicationReader::new(file);
    let mut tenants = BTreeSet::new();
    for application in reader.applications() {
        match application {
            Ok(application) => {
                if let Some(tenant) = application.tenant {
                    tenants.insert(TenantId(tenant));
                }
                if let Err(e) = service.originate(application).await {
                    warn!("Error originating loan: {}", e);
                }
            }
            Err(e) => {
                warn!("Error reading loan application: {}", e);
            }
        }
    }

    let stdout = io::stdout();
    let mut writer = ScheduleWriter::new(stdout.lock());
    for tenant in tenants {
        let loans = service.loans(tenant).await.into_diagnostic()?;
        info!(tenant = %tenant, loans = loans.len(), "writing schedules");
        for record in loans {
            let rows = service
                .schedule(tenant, record.loan)
                .await
                .into_diagnostic()?;
            writer.write_schedule(tenant, &rows).into_diagnostic()?;
        }
    }

    Ok(())
}

fn in_memory_stores() -> (LoanStoreBox, ScheduleStoreBox) {
    (
        Box::new(InMemoryLoanStore::new()),
        Box::new(InMemoryScheduleStore::new()),
    )
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(db_path: Option<PathBuf>) -> Result<(LoanStoreBox, ScheduleStoreBox)> {
    match db_path {
        Some(path) => {
            let store = RocksDBStore::open(path).into_diagnostic()?;
            Ok((Box::new(store.clone()), Box::new(store)))
        }
        None => Ok(in_memory_stores()),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(db_path: Option<PathBuf>) -> Result<(LoanStoreBox, ScheduleStoreBox)> {
    if db_path.is_some() {
        warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
        );
    }
    Ok(in_memory_stores())
}
