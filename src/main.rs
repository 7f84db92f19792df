use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};

mod charts;
mod dashboard;
mod filter;
mod loader;
mod metrics;
mod models;
mod report;

use models::FilterSelection;

#[derive(Parser)]
#[command(name = "branch-adoption-dashboard")]
#[command(about = "Adoption and deactivation analytics for retail branch accounts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Scope {
    /// Exact salesperson to filter on ("All" for no constraint)
    #[arg(long)]
    salesperson: Option<String>,
    /// Exact city to filter on ("All" for no constraint)
    #[arg(long)]
    city: Option<String>,
    /// Exact branch status to filter on ("All" for no constraint)
    #[arg(long)]
    status: Option<String>,
}

impl Scope {
    fn selection(&self) -> FilterSelection {
        FilterSelection::new(
            self.salesperson.clone(),
            self.city.clone(),
            self.status.clone(),
        )
    }

    fn label(&self) -> Option<String> {
        let selection = self.selection();
        let parts: Vec<&str> = [
            selection.salesman.as_deref(),
            selection.city.as_deref(),
            selection.branch_status.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" / "))
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the KPI summary for a filter selection
    Kpis {
        #[arg(long)]
        data: PathBuf,
        #[command(flatten)]
        scope: Scope,
    },
    /// Dump the full chart bundle as JSON
    Charts {
        #[arg(long)]
        data: PathBuf,
        #[command(flatten)]
        scope: Scope,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        data: PathBuf,
        #[command(flatten)]
        scope: Scope,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// List the filter dropdown options observed in the data
    Options {
        #[arg(long)]
        data: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let today = Utc::now().date_naive();

    match cli.command {
        Commands::Kpis { data, scope } => {
            let table = loader::load_table(&data, today)?;
            let mut dashboard = dashboard::Dashboard::new(table);
            let bundle = dashboard.set_selection(scope.selection());
            let kpis = &bundle.kpis;

            println!("Both Eval & Club: {}", kpis.both);
            println!("Only Evaluation: {}", kpis.only_eval);
            println!("Only Club: {}", kpis.only_club);
            println!(
                "Low Eval Rate (<=5%): {} ({:.1}%)",
                kpis.eval_low,
                kpis.eval_low_share()
            );
            println!(
                "Low Club Rate (<=5%): {} ({:.1}%)",
                kpis.club_low,
                kpis.club_low_share()
            );
            println!(
                "Both Rates Low (<=5%): {} ({:.1}%)",
                kpis.both_low,
                kpis.both_low_share()
            );
        }
        Commands::Charts { data, scope, out } => {
            let table = loader::load_table(&data, today)?;
            let mut dashboard = dashboard::Dashboard::new(table);
            let bundle = dashboard.set_selection(scope.selection());
            let json = serde_json::to_string_pretty(&bundle)
                .context("failed to serialize chart bundle")?;

            match out {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    println!(
                        "Chart bundle ({} charts) written to {}.",
                        bundle.charts().len(),
                        path.display()
                    );
                }
                None => println!("{json}"),
            }
        }
        Commands::Report { data, scope, out } => {
            let table = loader::load_table(&data, today)?;
            let dashboard = dashboard::Dashboard::new(table);
            let rows = filter::apply(dashboard.table(), &scope.selection());
            let report = report::build_report(scope.label().as_deref(), &rows);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
        Commands::Options { data } => {
            let table = loader::load_table(&data, today)?;
            let options = dashboard::Dashboard::new(table).filter_options();

            println!("Salespeople: {}", options.salespeople.join(", "));
            println!("Cities: {}", options.cities.join(", "));
            println!("Branch statuses: {}", options.branch_statuses.join(", "));
        }
    }

    Ok(())
}
