use anyhow::Result;
use std::sync::Arc;
use tokio::sync::watch;

use appointment_monitor::client::{ClientConfig, TtpClient};
use appointment_monitor::config::Config;
use appointment_monitor::error::{self, Error, MonitorErrorTrait};
use appointment_monitor::models::Location;
use appointment_monitor::monitor::{resolve_remote, Monitor, MonitorSettings};
use appointment_monitor::notifications::{PublishRequest, PublisherRegistry, SinkKind};

pub async fn ttp(config: Config) -> Result<()> {
    let (client, locations) = match startup(&config).await {
        Ok(ready) => ready,
        Err(e) => {
            tracing::error!(
                category = %e.category(),
                recoverable = e.is_recoverable(),
                "Startup failed: {e}"
            );
            return Err(e.into());
        }
    };

    let registry = PublisherRegistry::standard(client.http_client(), &config.publishers);
    check_selections(&registry, &config);

    let monitor = Monitor::new(
        Arc::new(client),
        Arc::new(registry),
        MonitorSettings::from_config(&config.monitor),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Interrupt received, finishing in-flight checks");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl+C"),
        }
    });

    monitor.run(&locations, shutdown_rx).await;
    Ok(())
}

/// Validate configuration, build the client and resolve monitored locations
async fn startup(config: &Config) -> error::Result<(TtpClient, Vec<Location>)> {
    config
        .validate()
        .map_err(|e| Error::config(format!("{e:#}")))?;

    let client = TtpClient::new(ClientConfig::from(&config.api))?;
    let locations = resolve_remote(&client, &config.monitor.location_ids).await?;

    Ok((client, locations))
}

/// Warn about selections that can never deliver
fn check_selections(registry: &PublisherRegistry, config: &Config) {
    for selection in registry.unknown_selections(&config.monitor.publish_to) {
        tracing::warn!(
            selection = %PublishRequest::parse(selection).name,
            known = ?registry.names(),
            "Unknown publisher selected; it will be skipped"
        );
    }

    let wants_pushover = config
        .monitor
        .publish_to
        .iter()
        .any(|s| SinkKind::from_name(&PublishRequest::parse(s).name) == Some(SinkKind::Pushover));

    if wants_pushover && config.publishers.pushover_app_token.is_none() {
        tracing::warn!("Pushover selected but PUSHOVER_APP_TOKEN is not set; deliveries will fail");
    }
}
