//! Conciliation gateway binary.
//!
//! Startup sequence:
//! 1. Initialise logging
//! 2. Load and validate configuration (abort on missing variables)
//! 3. Build the sheet store backend
//! 4. Serve until Ctrl-C

use anyhow::{Context, Result};
use conciliation_gateway::domain::SheetsBackend;
use conciliation_gateway::telemetry::{init_tracing, TelemetryConfig};
use conciliation_gateway::{
    GatewayConfig, GatewayError, GatewayService, GoogleSheetsStore, MemorySheetStore, SheetStore,
    SystemTimeSource, TimeSource,
};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(&TelemetryConfig::from_env()).context("failed to initialise logging")?;

    let config = match GatewayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Startup aborted");
            return Err(e).context("invalid configuration");
        }
    };
    info!(
        version = conciliation_gateway::VERSION,
        auth = ?config.auth,
        "Configuration loaded"
    );

    let time: Arc<dyn TimeSource> = Arc::new(SystemTimeSource);
    let store: Arc<dyn SheetStore> = match config.sheets.backend {
        SheetsBackend::Google => Arc::new(
            GoogleSheetsStore::from_config(&config.sheets, Arc::clone(&time))
                .map_err(GatewayError::Store)
                .context("failed to create sheets client")?,
        ),
        SheetsBackend::Memory => {
            warn!("Using in-memory sheet store; data is lost on exit");
            Arc::new(
                MemorySheetStore::new()
                    .with_sheet(config.sheets.es_sheet.clone(), Vec::new())
                    .with_sheet(config.sheets.dif_sheet.clone(), Vec::new())
                    .with_sheet(config.sheets.rej_sheet.clone(), Vec::new()),
            )
        }
    };

    let service = GatewayService::new(config, store, time)?;
    service.start().await?;
    Ok(())
}
