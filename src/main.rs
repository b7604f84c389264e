mod error;
mod fetch;
mod parser;
mod posting;
mod settings;
mod sheet;
mod sync;

use std::time::Duration;

use anyhow::Context;
use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use tracing::info;

use settings::Settings;
use sheet::{Column, MemorySheet, Sheet, SqliteSheet};
use sync::{SameDayPolicy, SyncOptions, SyncReport};

#[derive(Parser)]
#[command(
    name = "internship_sync",
    about = "Append new internship postings from a markdown listing to a local sheet"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the sheet database
    Init,
    /// Fetch the listing and append unseen open postings
    Sync {
        /// Listing URL (default: configured source_url)
        #[arg(long)]
        url: Option<String>,
        /// Year assumed for "Mon DD" dates (default: current year)
        #[arg(long)]
        year: Option<i32>,
        /// Also take postings dated on the most recent recorded day,
        /// skipping rows already in the sheet
        #[arg(long)]
        keep_same_day: bool,
        /// Report what would be appended without writing
        #[arg(long)]
        dry_run: bool,
        /// Print appended postings as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the most recent sheet rows
    List {
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
        /// Print rows as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show sheet statistics
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let settings = settings::load().context("Failed to load settings")?;

    match cli.command {
        Commands::Init => {
            open_sheet(&settings)?;
            println!("Sheet ready at {}", settings.db_path.display());
            Ok(())
        }
        Commands::Sync {
            url,
            year,
            keep_same_day,
            dry_run,
            json,
        } => {
            let url = url.unwrap_or_else(|| settings.source_url.clone());
            let reference_year = year
                .or(settings.reference_year)
                .unwrap_or_else(|| Local::now().year());
            let options = SyncOptions {
                closed_marker: settings.closed_marker.clone(),
                same_day: if keep_same_day {
                    SameDayPolicy::Keep
                } else {
                    SameDayPolicy::Drop
                },
                ..SyncOptions::new(reference_year)
            };

            let timeout = Duration::from_secs(settings.timeout_secs);
            let markdown = fetch::fetch_document(&url, timeout).await?;

            let report = if !dry_run {
                let mut store = open_sheet(&settings)?;
                sync::run(&markdown, &mut store, &options)?
            } else if settings.db_path.exists() {
                info!("Dry run: writing to an in-memory copy of the sheet");
                let store = SqliteSheet::open_read_only(&settings.db_path).with_context(|| {
                    format!("Failed to open {}", settings.db_path.display())
                })?;
                sync::dry_run(&markdown, &store, &options)?
            } else {
                info!(
                    "Dry run: {} does not exist, treating the sheet as empty",
                    settings.db_path.display()
                );
                sync::dry_run(&markdown, &MemorySheet::default(), &options)?
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&report.appended)?);
            } else {
                print_report(&report, dry_run);
            }
            Ok(())
        }
        Commands::List { limit, json } => {
            let store = open_sheet(&settings)?;
            let rows = store.range()?;
            let start = rows.len().saturating_sub(limit);
            let rows = &rows[start..];

            if json {
                let out: Vec<_> = rows
                    .iter()
                    .map(|r| {
                        serde_json::json!({
                            "row": r.row,
                            "company": r.cell(Column::Company),
                            "role": r.cell(Column::Role),
                            "location": r.cell(Column::Location),
                            "link": r.cell(Column::Link),
                            "posted": r.display(Column::Posted),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&out)?);
                return Ok(());
            }

            if rows.is_empty() {
                println!("Sheet is empty. Run 'sync' first.");
                return Ok(());
            }

            println!(
                "{:>4} | {:<24} | {:<28} | {:<20} | {:<10} | {:<40}",
                "Row", "Company", "Role", "Location", "Posted", "Link"
            );
            println!("{}", "-".repeat(141));
            for r in rows {
                println!(
                    "{:>4} | {:<24} | {:<28} | {:<20} | {:<10} | {:<40}",
                    r.row,
                    truncate(r.cell(Column::Company), 24),
                    truncate(r.cell(Column::Role), 28),
                    truncate(r.cell(Column::Location), 20),
                    r.display(Column::Posted),
                    truncate(r.cell(Column::Link), 40),
                );
            }
            println!("\n{} rows shown", rows.len());
            Ok(())
        }
        Commands::Stats => {
            let store = open_sheet(&settings)?;
            let rows = store.range()?;
            let mark = sheet::high_water_mark(&store)?;
            let last = sheet::last_filled_row(&store)?;
            println!("Database:  {}", settings.db_path.display());
            println!("Rows:      {}", rows.len());
            println!(
                "Latest:    {}",
                mark.map(|d| sheet::render_date(d, sheet::DATE_FORMAT))
                    .unwrap_or_else(|| "-".into())
            );
            println!("Next row:  {}", last + 1);
            Ok(())
        }
    }
}

fn open_sheet(settings: &Settings) -> anyhow::Result<SqliteSheet> {
    let path = &settings.db_path;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    SqliteSheet::open(path).with_context(|| format!("Failed to open {}", path.display()))
}

fn print_report(report: &SyncReport, dry_run: bool) {
    let verb = if dry_run { "Would append" } else { "Appended" };
    let mark = report
        .high_water_mark
        .map(|d| sheet::render_date(d, sheet::DATE_FORMAT))
        .unwrap_or_else(|| "none".into());
    println!("Most recent recorded date: {}", mark);

    for (i, record) in report.appended.iter().enumerate() {
        println!(
            "  row {:>4}: {} | {} | {}",
            report.first_row + i,
            truncate(&record.company, 24),
            truncate(&record.role, 32),
            sheet::render_date(record.posted, sheet::DATE_FORMAT),
        );
    }
    println!(
        "{} {} postings (skipped {}: {} closed, {} already seen, {} malformed, {} bad dates).",
        verb,
        report.appended.len(),
        report.skipped(),
        report.closed,
        report.already_seen,
        report.malformed,
        report.bad_dates,
    );
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}
