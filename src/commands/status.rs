use anyhow::Result;
use confcal_core::config::ConfcalConfig;
use owo_colors::OwoColorize;

use crate::render::{PlanRender, Render};

pub async fn run(config: &ConfcalConfig, verbose: bool) -> Result<bool> {
    let report = super::run_pass(config, true).await?;

    println!("📅 {}", config.calendar_name);
    println!(
        "{}",
        format!(
            "   {} sessions on the agenda, {} skipped",
            report.scraped,
            report.skipped.len()
        )
        .dimmed()
    );

    for skipped in &report.skipped {
        println!("   {}", skipped.render());
    }

    println!("{}", report.plan.render(verbose));

    if !report.plan.is_empty() {
        println!("\nRun {} to apply these changes.", "confcal sync".bold());
    }

    Ok(true)
}
