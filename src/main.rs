// src/main.rs

use anyhow::Context;

use serialhub::logging::init_logger;
use serialhub::{Repositories, StorageConfig, StoreHandle};

fn main() -> anyhow::Result<()> {
    // 1. CONFIGURATION & LOGGING
    let config = StorageConfig::from_env().context("failed to read storage configuration")?;
    init_logger();
    log::info!("Starting serialhub with the {} engine", config.engine);

    // 2. STORE
    let store = StoreHandle::connect(&config).context("failed to open the store")?;
    store.initialize().context("failed to initialize the store")?;

    // 3. REPOSITORIES
    let repos = Repositories::from_handle(&store);

    let statistic = repos.statistic.get().context("failed to read statistics")?;
    let serials = repos.serials.list_all().context("failed to list serials")?;
    let users = repos.users.list_all().context("failed to list users")?;

    log::info!(
        "Catalog ready: {} serials, {} users ({} admins, {} users)",
        serials.len(),
        users.len(),
        statistic.role_admin,
        statistic.role_user
    );
    Ok(())
}
