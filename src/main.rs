use dotenvy::dotenv;
use site_ledger::{
    config::{
        database::{self, DEFAULT_DATABASE_URL},
        provider::{SmsCredentials, destination_override},
        settings,
    },
    core::{aggregation, ledger::Ledger},
    errors::Result,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load settings (missing config.toml means defaults)
    let settings = settings::load_default_settings()
        .inspect_err(|e| error!("Failed to load settings: {e}"))?;

    // 4. Connect to the database and create tables
    let url = database::database_url();
    if url == DEFAULT_DATABASE_URL {
        std::fs::create_dir_all("data")?;
    }
    let db = database::create_connection(&url)
        .await
        .inspect_err(|e| error!("Failed to initialize database: {e}"))?;

    // 5. Load the ledger
    let ledger = Ledger::open(db, &settings.storage_key)
        .await
        .inspect_err(|e| error!("Failed to open ledger {}: {e}", settings.storage_key))?;

    ledger
        .read(|store| {
            for (collection, count) in store.record_counts() {
                info!("{collection}: {count} records");
            }
            info!("Total material cost: {:.2}", aggregation::total_cost(store));

            let orphans = store.orphaned_rows();
            if !orphans.is_empty() {
                warn!("{} join rows point at deleted records", orphans.len());
            }
        })
        .await;

    // 6. Report whether notifications can go out
    let destination = destination_override(&settings.notifications.destination);
    match SmsCredentials::from_env() {
        Ok(_) if !destination.is_empty() => {
            info!("Notifications go to {destination} via {}", settings.notifications.api_base);
        }
        Ok(_) => warn!("SMS credentials set but no destination configured"),
        Err(e) => info!("Notifications disabled: {e}"),
    }

    Ok(())
}
