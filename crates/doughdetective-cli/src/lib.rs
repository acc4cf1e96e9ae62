mod config;
mod show;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::{CommandFactory as _, Parser};
use doughdetective::ledger::{CachedTransport, HttpTransport, LedgerClient, Transport};
use doughdetective::period::Month;
use doughdetective::reconcile::{self, MatchPolicy, Reconciliation};
use doughdetective::statement::read_statement;

use config::Config;

#[derive(Debug, Parser)]
#[command(
    name = "doughdetective",
    about = "Find transactions missing from a statement or from the Firefly III ledger"
)]
struct Args {
    /// Statement month in YYYYMM format, e.g. 202409
    date: Month,

    /// Name of your account, as configured under [formats]
    #[arg(short, long)]
    account: String,

    /// Config file path [default: doughdetective.toml or .doughdetective.toml]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Count a transaction as present if any counterpart matches, even one already matched
    #[arg(long)]
    any_match: bool,

    /// Fail if the ledger has no matching account instead of comparing all transactions
    #[arg(long)]
    require_account: bool,

    /// Always query the ledger, bypassing the response cache
    #[arg(long)]
    no_cache: bool,
}

pub fn run(args: impl IntoIterator<Item = String>) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "doughdetective=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    clap_complete::CompleteEnv::with_factory(Args::command).complete();

    let args = Args::parse_from(args);
    let (base_dir, config) = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::find_and_load()?
            .context("No doughdetective.toml found in the current directory")?,
    };
    let client = LedgerClient::new(&config.ledger.server, transport(&args, &base_dir, &config)?);
    let results = compare(&args, &base_dir, &config, &client)?;
    show::show_report(&results)?;

    Ok(())
}

/// Compare the statement of `args.account` for `args.date` with the ledger's transactions in the
/// same month. The statement is read before the ledger is queried.
fn compare<T: Transport>(
    args: &Args,
    base_dir: &Path,
    config: &Config,
    client: &LedgerClient<T>,
) -> Result<Reconciliation> {
    let format = config.format(&args.account)?;

    let csv_path = base_dir
        .join(&config.csv_dir)
        .join(format!("{}_{}.csv", args.date, args.account));
    let statement = read_statement(&csv_path, &format.statement)
        .with_context(|| format!("Failed to read statement {}", csv_path.display()))?;

    let ledger_account = format.ledger_account.as_deref().unwrap_or(&args.account);
    let account_id = match client.account_id(ledger_account)? {
        Some(id) => Some(id),
        None if args.require_account => {
            return Err(doughdetective::Error::AccountNotFound(ledger_account.to_owned()).into());
        }
        None => {
            tracing::warn!(
                "Ledger has no account named '{ledger_account}', comparing against all transactions"
            );
            None
        }
    };
    let ledger = client.transactions(&args.date.range(), account_id.as_deref())?;

    let policy = if args.any_match {
        MatchPolicy::Existence
    } else {
        MatchPolicy::Greedy
    };
    Ok(reconcile::reconcile(&statement, &ledger, policy))
}

fn transport(args: &Args, base_dir: &Path, config: &Config) -> Result<Box<dyn Transport>> {
    let http = HttpTransport::new(&config.ledger)?;
    if args.no_cache || !config.cache.enabled {
        return Ok(Box::new(http));
    }
    Ok(Box::new(CachedTransport::new(
        http,
        base_dir.join(&config.cache.dir),
        config.cache.expire_after(),
    )))
}
