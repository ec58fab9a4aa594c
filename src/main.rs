use std::path::PathBuf;

use sdis_users::config::Configuration;
use sdis_users::{initialize_state, telemetry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::var("CONFIG_PATH").map(PathBuf::from).unwrap_or_default();
    let config = Configuration::default().path(path).read()?;

    telemetry::setup_logging(&config.log_level)?;
    telemetry::describe_metrics();

    let state = initialize_state(config).await?;

    if let Some(superuser) = &state.config.superuser {
        let user = state.users.ensure_superuser(superuser).await?;
        tracing::info!(username = %user, "superuser ready");
    }

    tracing::info!(
        name = %state.config.name,
        version = state.config.version(),
        "user accounts ready"
    );

    Ok(())
}
