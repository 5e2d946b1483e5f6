//! Board Tester CLI Tool
//!
//! Command-line tool for exercising board rendering against the in-memory
//! schedule provider, without standing up the HTTP server.
//!
//! Usage:
//!   cargo run --bin board-tester -- --help
//!   cargo run --bin board-tester render --date 2026-02-06
//!   cargo run --bin board-tester render --date 2026-02-06 --json
//!   cargo run --bin board-tester statuses

use anyhow::Result;
use clap::{Parser, Subcommand};
use clinic_kiosk::auth::StaticCredentialProvider;
use clinic_kiosk::metrics::MetricsCollector;
use clinic_kiosk::schedule::READY_STATUSES;
use clinic_kiosk::service::BoardService;
use clinic_kiosk::upstream::InMemoryScheduleProvider;
use clinic_kiosk::utils::today_date_string;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "board-tester")]
#[command(about = "Render sample appointment boards from the in-memory schedule provider")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the sample board for a date
    Render {
        /// Schedule date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Print the full board as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show the statuses that count as checked in
    Statuses,
}

async fn render_board(date: Option<String>, json: bool) -> Result<()> {
    let date = date.unwrap_or_else(today_date_string);

    let upstream = Arc::new(InMemoryScheduleProvider::with_sample_day(&date));
    let metrics = Arc::new(MetricsCollector::new()?);
    let service = BoardService::new(
        Arc::new(StaticCredentialProvider::new("board-tester-token")),
        upstream.clone(),
        upstream.clone(),
        upstream,
        metrics,
        date.clone(),
    );

    let board = service.render_board(None).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&board)?);
        return Ok(());
    }

    println!(
        "📋 Appointments for Dr. {} on {}",
        board.doctor.full_name(),
        board.date
    );
    println!("{:-<72}", "");
    println!(
        "{:<10} {:<22} {:<20} {:<10}",
        "TIME", "PATIENT", "STATUS", "WAITING"
    );

    for detail in &board.appointments {
        let waiting = if detail.wait_time.is_empty() {
            "-".to_string()
        } else {
            format!("since {}", detail.wait_time)
        };
        println!(
            "{:<10} {:<22} {:<20} {:<10}",
            detail.appointment.scheduled_time.format("%H:%M"),
            format!(
                "{} {}",
                detail.patient.first_name, detail.patient.last_name
            ),
            detail.appointment.status,
            waiting
        );
    }

    println!("{:-<72}", "");
    println!("{} appointments", board.appointments.len());

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render { date, json } => render_board(date, json).await?,
        Commands::Statuses => {
            println!("Statuses treated as checked in:");
            for status in READY_STATUSES {
                println!("  - {}", status);
            }
        }
    }

    Ok(())
}
