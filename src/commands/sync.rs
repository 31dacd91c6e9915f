use anyhow::Result;
use confcal_core::config::ConfcalConfig;
use owo_colors::OwoColorize;

use crate::render::{PlanRender, Render, render_summary};

/// Returns whether every planned operation was applied.
pub async fn run(config: &ConfcalConfig, dry_run: bool, verbose: bool) -> Result<bool> {
    let report = super::run_pass(config, dry_run).await?;

    println!("📅 {}", config.calendar_name);

    for skipped in &report.skipped {
        println!("   {}", skipped.render());
    }

    println!("{}", report.plan.render(verbose));

    match &report.applied {
        Some(applied) => {
            for failure in &applied.failed {
                println!("   {}", failure.render());
            }
            println!("\n{}", render_summary(applied));
        }
        None => println!("\n{}", "Dry run, nothing applied".dimmed()),
    }

    Ok(report.is_success())
}
