//! Seeds the fixed chart of accounts.
//!
//! Creates every account the posting workflows need, skipping codes that
//! already exist, then checks that the account-code table resolves and the
//! trial balance is balanced.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use tally_core::accounts::AccountCode;
use tally_core::ledger::LedgerSettings;
use tally_db::{AccountRepository, ReportRepository, connect};
use tally_shared::{AppConfig, LoggingConfig};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));
    let registry = tracing_subscriber::registry().with(filter);

    if config.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    let db = connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");

    let accounts = AccountRepository::new(db.clone());
    let created = accounts.seed_chart().await?;
    for account in &created {
        info!(code = %account.code, name = %account.name, "seeded account");
    }

    let map = accounts
        .account_map()
        .await
        .context("Chart of accounts is incomplete")?;
    info!(
        accounts = AccountCode::COUNT,
        cash = %map.id(AccountCode::Cash),
        "account-code table resolved"
    );

    let reports = ReportRepository::new(db, LedgerSettings::from(&config.ledger));
    let trial_balance = reports.trial_balance().await?;
    info!(
        total_debits = %trial_balance.total_debits,
        total_credits = %trial_balance.total_credits,
        balanced = trial_balance.is_balanced,
        "trial balance checked"
    );
    anyhow::ensure!(trial_balance.is_balanced, "trial balance is not balanced");

    let discrepancies = reports.reconcile().await?;
    anyhow::ensure!(
        discrepancies.is_empty(),
        "{} account balances disagree with posted entries",
        discrepancies.len()
    );

    info!(created = created.len(), "Seeding complete");
    Ok(())
}
