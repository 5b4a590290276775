use anyhow::{Context, Result};

use appointment_monitor::client::{ClientConfig, TtpClient};
use appointment_monitor::config::Config;

pub async fn locations(config: Config, search: Option<String>) -> Result<()> {
    let client = TtpClient::new(ClientConfig::from(&config.api))
        .context("Failed to create scheduling API client")?;

    let locations = client
        .search_locations(search.as_deref().unwrap_or(""))
        .await
        .context("Failed to fetch the location list")?;

    if locations.is_empty() {
        match &search {
            Some(query) => println!("No locations match \"{query}\""),
            None => println!("The scheduling API returned no locations"),
        }
        return Ok(());
    }

    println!("{:>6}  {:<28} {:<24} State", "Id", "Short name", "City");
    println!("{}", "=".repeat(68));

    for location in &locations {
        let marker = if location.operational { "" } else { " (not operational)" };
        println!(
            "{:>6}  {:<28} {:<24} {}{marker}",
            location.id,
            location.short_name.trim(),
            location.city.trim(),
            location.state.trim(),
        );
    }

    println!("\n{} locations", locations.len());
    Ok(())
}
