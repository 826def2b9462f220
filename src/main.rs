use anyhow::{bail, Result};
use clap::Parser;
use colored::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod analysis;
mod charts;
mod config;
mod gerrit;
mod output;
mod stackalytics;

use crate::analysis::PointSet;
use crate::charts::ChartContext;
use crate::config::Config;
use crate::gerrit::{query, ChangeFetcher, SshTransport};
use crate::output::{Report, Reporter};
use crate::stackalytics::StackalyticsClient;

/// Generate graphs depicting how long it took patches to get merged over
/// time for a given project or a subset of its contributors.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The Gerrit project to query, for example openstack/neutron
    project: String,

    /// Zero or more Gerrit usernames, for example foo bar
    owner: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    println!("{}", "Time To Merge - Gerrit review latency charts".bright_cyan().bold());
    println!("Project: {}", cli.project.bright_white());
    if !cli.owner.is_empty() {
        println!("Owners: {}", cli.owner.join(", ").bright_white());
    }

    let config = Config::load()?;

    let query = query::build_query(&cli.project, &config.gerrit.branch, &cli.owner);
    let transport = SshTransport::new(&config.gerrit, config.gerrit_destination());
    let changes = ChangeFetcher::new(transport).fetch_all(&query).await?;

    let set = match PointSet::derive(&changes, config.charts.size_percentile) {
        Some(set) if !set.is_empty() => set,
        _ => bail!(
            "Could not parse points from data. It is likely that the createdOn timestamp of the patches found is bogus."
        ),
    };
    drop(changes);
    info!("{} patches left to chart", set.points.len());

    let ctx = ChartContext::new(&cli.project, &cli.owner, config.charts.clone());
    let stats = StackalyticsClient::new(&config.stackalytics)?;
    let charts = charts::build_all(&set, &ctx, &stats, &config.stackalytics).await?;

    let report = Report::new(&ctx, &set, charts);
    let mut reporter = Reporter::new(&config.output);
    reporter.generate_report(&report).await?;

    println!(
        "\n{} {}",
        "Charts written to".bright_green().bold(),
        reporter.output_path().bright_white()
    );

    Ok(())
}
