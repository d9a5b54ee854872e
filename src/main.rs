use cashier_charge::application::service::ChargeService;
use cashier_charge::config::Config;
use cashier_charge::domain::ports::ChargeStoreBox;
use cashier_charge::infrastructure::in_memory::{
    InMemoryChargeStore, InMemoryOwner, InMemoryProcessor,
};
#[cfg(feature = "storage-rocksdb")]
use cashier_charge::infrastructure::rocksdb::RocksDBChargeStore;
use cashier_charge::interfaces::csv::charge_writer::ChargeWriter;
use cashier_charge::interfaces::csv::order_reader::OrderReader;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, IsTerminal};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

fn open_store(config: &Config) -> Result<ChargeStoreBox> {
    let Some(db_path) = &config.db_path else {
        return Ok(Box::new(InMemoryChargeStore::new()));
    };

    #[cfg(feature = "storage-rocksdb")]
    let store: ChargeStoreBox = Box::new(RocksDBChargeStore::open(db_path).into_diagnostic()?);

    #[cfg(not(feature = "storage-rocksdb"))]
    let store: ChargeStoreBox = {
        tracing::warn!(
            "WARNING: Persistent storage requested via --db-path ({}), but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage.",
            db_path.display()
        );
        Box::new(InMemoryChargeStore::new())
    };

    Ok(store)
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    init_tracing(&config);

    let currency = config.default_currency().into_diagnostic()?;
    let processor = InMemoryProcessor::with_coupons(config.load_coupons().into_diagnostic()?);
    let service = ChargeService::new(Arc::new(processor.clone()), open_store(&config)?);

    // One owner per user, so repeat orders reuse the same processor customer
    let mut owners: HashMap<u64, InMemoryOwner> = HashMap::new();

    let file = File::open(&config.input).into_diagnostic()?;
    info!("Processing charge orders from: {}", config.input.display());
    for order_result in OrderReader::new(file).orders() {
        match order_result {
            Ok(order) => {
                let user = order.user;
                let owner = owners
                    .entry(user)
                    .or_insert_with(|| InMemoryOwner::new(processor.clone(), currency.clone()));
                if let Err(e) = service.process(owner, order).await {
                    error!("Error processing charge for user {}: {}", user, e);
                }
            }
            Err(e) => {
                error!("Error reading charge order: {}", e);
            }
        }
    }

    let charges = service.into_records().await.into_diagnostic()?;

    let stdout = io::stdout();
    let mut writer = ChargeWriter::new(stdout.lock());
    writer.write_charges(charges).into_diagnostic()?;

    Ok(())
}
