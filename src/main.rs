use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use rma::cli::{Cli, Commands, OutputFormat};
use rma::{
    AnalyticsConfig, AnalyticsService, Comment, CsvExporter, ImportFormat, OverdueReport,
    PartSortKey, PartsReport, QuotePolicy, RecordDate, RmaCase,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    let now = resolve_now(cli.now.as_deref())?;
    let service = AnalyticsService::new(config);

    match cli.command {
        Commands::Overdue {
            input,
            days,
            status,
            include_future,
            format,
            output,
        } => {
            let cases = load_cases(&service, &input)?;
            let mut query = service.query(days, status.as_deref())?;
            if include_future {
                query = query.with_include_future(true);
            }
            let report = service.overdue(&cases, query, now);
            let rendered = match format {
                OutputFormat::Json => serde_json::to_string_pretty(&report)?,
                OutputFormat::Csv => overdue_csv(&report),
            };
            write_output(output.as_ref(), &rendered)
        }
        Commands::Parts {
            input,
            comments,
            sort,
            format,
            output,
        } => {
            let cases = load_cases(&service, &input)?;
            let comments = match comments {
                Some(path) => load_comments(&path)?,
                None => Vec::new(),
            };
            let sort: PartSortKey = sort.parse()?;
            let report = service.parts(&cases, &comments, sort, now);
            let rendered = match format {
                OutputFormat::Json => serde_json::to_string_pretty(&report)?,
                OutputFormat::Csv => parts_csv(&report),
            };
            write_output(output.as_ref(), &rendered)
        }
        Commands::ExportCsv {
            input,
            rfc4180,
            output,
        } => {
            let cases = load_cases(&service, &input)?;
            let policy = if rfc4180 {
                QuotePolicy::Rfc4180
            } else {
                QuotePolicy::Naive
            };
            write_output(output.as_ref(), &CsvExporter::new(policy).export(&cases))
        }
        Commands::Import {
            input,
            existing,
            output,
            strict,
        } => {
            let existing = match existing {
                Some(path) => load_cases(&service, &path)?,
                None => Vec::new(),
            };
            let format = ImportFormat::from_path(&input)?;
            let file = File::open(&input)
                .with_context(|| format!("無法開啟匯入檔案 {}", input.display()))?;
            let report = service.import(format, BufReader::new(file), &existing)?;

            for error in &report.errors {
                eprintln!(
                    "row {}{}: {}",
                    error.row,
                    error
                        .rma_number
                        .as_deref()
                        .map(|n| format!(" ({})", n))
                        .unwrap_or_default(),
                    error.message
                );
            }
            eprintln!(
                "imported {}, failed {}, symptoms normalized {}",
                report.imported.len(),
                report.errors.len(),
                report.normalized
            );

            if let Some(path) = output {
                write_output(Some(&path), &rma_io::to_json(&report.imported)?)?;
            }
            if strict && !report.is_clean() {
                bail!("{} 列匯入失敗", report.errors.len());
            }
            Ok(())
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<AnalyticsConfig> {
    match path {
        Some(path) => AnalyticsConfig::from_file(path)
            .with_context(|| format!("無法載入配置 {}", path.display())),
        None => Ok(AnalyticsConfig::default()),
    }
}

fn resolve_now(raw: Option<&str>) -> Result<DateTime<Utc>> {
    match raw {
        None => Ok(Utc::now()),
        Some(raw) => match RecordDate::parse(raw) {
            RecordDate::Valid(now) => Ok(now),
            _ => bail!("無效的 --now: {}", raw),
        },
    }
}

/// 分析用輸入：只解析，無法解析的列略過並記錄警告
fn load_cases(service: &AnalyticsService, path: &Path) -> Result<Vec<RmaCase>> {
    let format = ImportFormat::from_path(path)?;
    let file =
        File::open(path).with_context(|| format!("無法開啟輸入檔案 {}", path.display()))?;
    let report = service.load(format, BufReader::new(file))?;
    if !report.is_clean() {
        tracing::warn!(
            "{}: {} 列無法讀取，已略過",
            path.display(),
            report.errors.len()
        );
    }
    Ok(report.imported)
}

fn load_comments(path: &Path) -> Result<Vec<Comment>> {
    let file =
        File::open(path).with_context(|| format!("無法開啟留言檔案 {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("留言檔案格式錯誤 {}", path.display()))
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("無法寫入 {}", path.display()))?;
            writeln!(file, "{}", content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}

fn overdue_csv(report: &OverdueReport) -> String {
    let header = [
        "rmaNumber",
        "siteName",
        "partName",
        "partNumber",
        "caseStatus",
        "priority",
        "ascompRaisedDate",
        "daysOverdue",
        "severity",
    ];
    let rows: Vec<Vec<String>> = report
        .overdue_rmas
        .iter()
        .map(|o| {
            let part = o.rma.part_key();
            vec![
                o.rma.rma_number.clone(),
                o.rma.site_label().to_string(),
                part.part_name,
                part.part_number,
                o.rma.status_label().to_string(),
                o.rma.priority_label().to_string(),
                o.rma.ascomp_raised_date.to_string(),
                o.days_overdue.to_string(),
                format!("{:?}", o.severity),
            ]
        })
        .collect();
    CsvExporter::default().export_table(&header, &rows)
}

fn parts_csv(report: &PartsReport) -> String {
    let header = [
        "partName",
        "partNumber",
        "totalCount",
        "pendingCount",
        "completedCount",
        "completionRate",
        "avgPendingDays",
        "maxPendingDays",
        "activeSitesCount",
        "totalCost",
        "priority",
    ];
    let rows: Vec<Vec<String>> = report
        .parts
        .iter()
        .map(|p| {
            vec![
                p.part_name.clone(),
                p.part_number.clone(),
                p.total_count.to_string(),
                p.pending_count.to_string(),
                p.completed_count.to_string(),
                p.completion_rate.to_string(),
                p.avg_pending_days.to_string(),
                p.max_pending_days.to_string(),
                p.active_sites_count.to_string(),
                p.total_cost.to_string(),
                p.priority.to_string(),
            ]
        })
        .collect();
    CsvExporter::default().export_table(&header, &rows)
}
