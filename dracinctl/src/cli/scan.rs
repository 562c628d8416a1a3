use anyhow::Result;
use clap::{Subcommand, ValueEnum};
use dracin_client::{
    ApiClient, AuthoritativeReport, FlashKind, ScanSession, ScanSessionOptions,
    ScanUpdate, StartScanParams,
};
use dracin_model::{CurrentReport, ScanStatusView, SummaryReport};
use serde_json::json;
use tracing::info;

use super::{Context, render};

#[derive(Subcommand, Debug)]
pub enum ScanAction {
    /// Start a scan; omitted values fall back to the configured defaults
    Start {
        /// Top-level folder to scan (repeatable)
        #[arg(long = "folder", short = 'f')]
        folders: Vec<String>,
        #[arg(long, allow_hyphen_values = true)]
        batch_size: Option<i64>,
        #[arg(long, allow_hyphen_values = true)]
        pause_ms: Option<i64>,
        #[arg(long, allow_hyphen_values = true)]
        interval_ms: Option<i64>,
        /// Keep following the job after it starts
        #[arg(long)]
        watch: bool,
    },
    /// Stop the running scan
    Stop,
    /// Show the realtime status and the report for the current phase
    Status,
    /// Follow the live event stream until the scan finishes or Ctrl-C
    Watch,
    /// Show the most recent log lines kept from earlier runs
    Logs {
        #[arg(long)]
        clear: bool,
    },
    /// Refresh one report panel
    Report {
        #[arg(value_enum, default_value = "summary")]
        which: ReportChoice,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ReportChoice {
    Current,
    Summary,
}

pub async fn run(ctx: &Context, action: ScanAction) -> Result<()> {
    let mut scan = ScanSession::new(
        ctx.client.clone(),
        ctx.store.clone(),
        ScanSessionOptions::from(&ctx.config),
    );

    let result = dispatch(ctx, &mut scan, action).await;
    scan.close();
    result
}

async fn dispatch(
    ctx: &Context,
    scan: &mut ScanSession<ApiClient>,
    action: ScanAction,
) -> Result<()> {
    match action {
        ScanAction::Start {
            folders,
            batch_size,
            pause_ms,
            interval_ms,
            watch,
        } => {
            let params = StartScanParams {
                top_folders: folders,
                batch_size,
                pause_ms,
                interval_ms,
            }
            .with_defaults(&ctx.config.scan);

            scan.start(&params).await?;
            print_notices(scan);
            if watch && scan.is_running() {
                follow(ctx, scan).await?;
            } else {
                print_state(ctx, scan)?;
            }
        }
        ScanAction::Stop => {
            scan.stop().await?;
            print_notices(scan);
            print_state(ctx, scan)?;
        }
        ScanAction::Status => {
            scan.snapshot().await?;
            print_state(ctx, scan)?;
        }
        ScanAction::Watch => {
            scan.refresh().await?;
            if let Some(status) = scan.status() {
                print_status(status);
            }
            if scan.is_running() {
                follow(ctx, scan).await?;
            } else {
                println!("Scan tidak berjalan");
            }
        }
        ScanAction::Logs { clear } => {
            if clear {
                scan.clear_log();
                println!("Log dibersihkan");
            } else if ctx.json {
                let lines: Vec<&str> = scan.log().lines().collect();
                render::print_json(&lines)?;
            } else if scan.log().is_empty() {
                println!("(kosong)");
            } else {
                for line in scan.log().lines() {
                    println!("{line}");
                }
            }
        }
        ScanAction::Report { which } => match which {
            ReportChoice::Current => {
                let report = scan.refresh_current().await?;
                if ctx.json {
                    render::print_json(report)?;
                } else {
                    print_current(report);
                }
            }
            ReportChoice::Summary => {
                let report = scan.refresh_summary().await?;
                if ctx.json {
                    render::print_json(report)?;
                } else {
                    print_summary(report);
                }
            }
        },
    }
    Ok(())
}

/// Print stream-driven changes until the session leaves `Running`.
async fn follow(ctx: &Context, scan: &mut ScanSession<ApiClient>) -> Result<()> {
    info!("following scan; Ctrl-C to detach");
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let update = tokio::select! {
            update = scan.next_event() => update,
            _ = &mut ctrl_c => {
                println!("Berhenti mengikuti scan (job tetap berjalan)");
                return Ok(());
            }
        };
        let Some(update) = update else {
            break;
        };

        match update {
            ScanUpdate::StreamOpened => info!("scan stream connected"),
            ScanUpdate::Log(line) => println!("{line}"),
            ScanUpdate::Status(view) => {
                if !ctx.json && !view.friendly_message.is_empty() {
                    println!("» {}", view.friendly_message);
                }
            }
            ScanUpdate::Report => {}
            ScanUpdate::StreamLost => {
                print_notices(scan);
                println!(
                    "Job mungkin masih berjalan; jalankan `dracinctl scan status` untuk memeriksa"
                );
                return Ok(());
            }
        }
        if !scan.is_running() {
            // Drain the summary fetch triggered by the idle push.
            while let Some(ScanUpdate::Report) = scan.next_event().await {}
            break;
        }
    }

    print_state(ctx, scan)
}

fn print_notices(scan: &mut ScanSession<ApiClient>) {
    for notice in scan.take_notices() {
        match notice.kind {
            FlashKind::Success => println!("✓ {}", notice.message),
            FlashKind::Error => eprintln!("✗ {}", notice.message),
        }
    }
}

fn print_state(ctx: &Context, scan: &ScanSession<ApiClient>) -> Result<()> {
    let report = scan.reports().authoritative(scan.phase());
    if ctx.json {
        let report = match report {
            Some(AuthoritativeReport::Current(r)) => json!({"current": r}),
            Some(AuthoritativeReport::Summary(r)) => json!({"summary": r}),
            None => serde_json::Value::Null,
        };
        return render::print_json(&json!({
            "status": scan.status(),
            "report": report,
        }));
    }

    if let Some(status) = scan.status() {
        print_status(status);
    }
    match report {
        Some(AuthoritativeReport::Current(report)) => {
            println!();
            print_current(report);
        }
        Some(AuthoritativeReport::Summary(report)) => {
            println!();
            print_summary(report);
        }
        None => {}
    }
    Ok(())
}

fn print_status(status: &ScanStatusView) {
    let folder = match (&status.current_folder, status.current_folder_position) {
        (Some(folder), Some(position)) => format!(
            "{folder} ({position}/{})",
            render::or_dash(status.total_folders)
        ),
        (Some(folder), None) => folder.clone(),
        (None, _) => "-".to_string(),
    };
    let series = status
        .current_series_detail
        .as_ref()
        .map(|detail| detail.to_string());

    render::print_fields(&[
        ("status", if status.is_running { "Running" } else { "Idle" }.into()),
        ("folder", folder),
        ("pesan", render::or_dash(Some(status.friendly_message.as_str()).filter(|m| !m.is_empty()))),
        ("series", render::or_dash(series)),
    ]);
}

fn print_current(report: &CurrentReport) {
    println!("Laporan berjalan");
    print_totals(
        report.totals.series_total,
        report.totals.episodes_total,
        report.totals.tags_total,
    );

    let mut table = render::Table::new(&[
        "FOLDER", "SERIES", "EPISODES", "TAGS", "ERRORS", "NEXT INDEX",
    ]);
    for (folder, row) in &report.by_folder {
        table.row(vec![
            folder.clone(),
            render::or_dash(row.series_total),
            render::or_dash(row.episodes_total),
            render::or_dash(row.tags_total),
            render::or_dash(row.errors_total),
            render::or_dash(row.next_start_index),
        ]);
    }
    println!();
    table.print();
}

fn print_summary(report: &SummaryReport) {
    println!("Ringkasan database");
    print_totals(
        report.totals.series_total,
        report.totals.episodes_total,
        report.totals.tags_total,
    );
    if let Some(size) = report.storage_total_size {
        render::print_fields(&[("storage", render::format_bytes(size))]);
    }
}

fn print_totals(series: u64, episodes: u64, tags: u64) {
    render::print_fields(&[
        ("series", series.to_string()),
        ("episodes", episodes.to_string()),
        ("tags", tags.to_string()),
    ]);
}
