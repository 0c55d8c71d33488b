//! Health command - check that the composition service is up.

use anyhow::{Context, Result};
use clap::Args;
use photo_guide_core::CompositionService;
use tracing::info;

use super::{CommonArgs, ExitCode, OutputFormat};
use crate::config::AppConfig;

/// Arguments for the health command.
#[derive(Args, Clone)]
pub struct HealthArgs {
    /// Connection and output options
    #[command(flatten)]
    pub common: CommonArgs,
}

impl HealthArgs {
    /// Apply configuration file values, respecting CLI precedence.
    #[must_use]
    pub fn with_config(mut self, config: &AppConfig) -> Self {
        self.common = self.common.with_config(config);
        self
    }
}

/// Run the health command.
pub fn run(args: &HealthArgs) -> Result<ExitCode> {
    let client = args.common.client()?;
    let base_url = client.config().base_url.clone();
    info!("Checking {base_url}");

    let health = client
        .health()
        .with_context(|| format!("Service at {base_url} is not reachable"))?;

    match args.common.format() {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "server": base_url,
                "status": health.status,
                "service": health.service,
                "healthy": health.is_healthy(),
            });
            let json = if args.common.pretty {
                serde_json::to_string_pretty(&value)?
            } else {
                serde_json::to_string(&value)?
            };
            println!("{json}");
        }
        OutputFormat::Text => {
            let service = health.service.as_deref().unwrap_or("service");
            println!("{service} at {base_url}: {}", health.status);
        }
    }

    Ok(if health.is_healthy() {
        ExitCode::Success
    } else {
        ExitCode::Error
    })
}
