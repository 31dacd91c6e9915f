use std::path::Path;

use anyhow::Result;
use confcal_core::config::ConfcalConfig;
use owo_colors::OwoColorize;

pub fn run(path: Option<&Path>) -> Result<()> {
    let config_path = match path {
        Some(path) => path.to_path_buf(),
        None => ConfcalConfig::config_path()?,
    };

    if !config_path.exists() {
        ConfcalConfig::create_default_config(&config_path)?;
        println!("Created {}", config_path.display().green());
    }

    let config = super::load_config(Some(&config_path))?;
    let store = config.taxonomy_store()?;

    println!("{}", "Paths".bold());
    println!("  Config:      {}", config_path.display());
    println!("  Categories:  {}", store.categories_path().display());
    println!("  Filter:      {}", store.filter_path().display());

    println!("\n{}", "Calendar".bold());
    println!("  Agenda:      {}", config.agenda_url);
    println!("  Name:        {}", config.calendar_name);
    println!("  Time zone:   {}", config.time_zone);
    println!(
        "  Account:     {}",
        config.google_account.as_deref().unwrap_or("default")
    );

    Ok(())
}
