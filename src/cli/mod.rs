use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::model::settings::Settings;
use crate::parsers::curl;
use crate::services::{
    atomic::write_atomic,
    download_types::DownloadReport,
    encoding,
    http::{ReqwestTransport, ThreadPause},
    pipeline, settings, tabular,
};

pub mod command;
use command::{Cli, Command};

const RULE: &str = "============================================================";

fn write_report<T: Serialize>(path: Option<&Path>, report: &T) -> Result<()> {
    if let Some(path) = path {
        let json = serde_json::to_string_pretty(report)?;
        write_atomic(path, json.as_bytes())?;
        info!("Wrote report to {}", path.display());
    }
    Ok(())
}

fn print_download_summary(report: &DownloadReport) {
    println!("  Audio links processed:     {}", report.total());
    println!("  Successfully downloaded:   {}", report.downloaded);
    println!("  Already existed (skipped): {}", report.skipped);
    println!("  Failed to download:        {}", report.failed);
}

pub fn run(cli: Cli) -> Result<()> {
    let mut settings = settings::load_or_default(cli.settings.as_deref())?;

    match cli.command {
        Command::Fetch {
            capture,
            output,
            audio_dir,
            page_size,
            report,
        } => {
            if let Some(v) = capture {
                settings.capture_file = v;
            }
            if let Some(v) = output {
                settings.output_csv = v;
            }
            if let Some(v) = audio_dir {
                settings.audio_dir = v;
            }
            if let Some(v) = page_size {
                settings.page_size = v;
            }
            settings::validate(&settings)?;

            fetch(&settings, report.as_deref())
        }

        Command::AttachLinks {
            csv,
            links,
            output,
            column,
        } => {
            let column = column.unwrap_or_else(|| settings.link_column.clone());
            let links = tabular::read_links(&links)?;
            let report = tabular::attach_links(&csv, &links, &output, &column)?;

            println!("Processed {} data rows", report.data_rows);
            if report.is_mismatched() {
                println!(
                    "Note: CSV has {} data rows but there are {} audio links",
                    report.data_rows, report.links
                );
            }
            println!("Created {}", output.display());
            Ok(())
        }

        Command::AddReferences {
            csv,
            output,
            column,
        } => {
            let column = column.unwrap_or_else(|| settings.link_column.clone());
            let output = output.unwrap_or_else(|| settings.output_csv.clone());
            let report = tabular::add_references(&csv, &output, &column)?;

            println!("{RULE}");
            println!("Conversion summary:");
            println!("  Total rows processed:       {}", report.rows);
            println!("  Audio references converted: {}", report.converted);
            println!("  Empty audio links:          {}", report.empty);
            println!("  Output file:                {}", output.display());
            println!("{RULE}");
            Ok(())
        }

        Command::Download {
            csv,
            audio_dir,
            column,
            report,
        } => {
            let column = column.unwrap_or_else(|| settings.link_column.clone());
            let audio_dir = audio_dir.unwrap_or_else(|| settings.audio_dir.clone());

            let transport = ReqwestTransport::new(settings.timeout_secs)?;
            let result = pipeline::run_csv_download(
                &settings,
                &csv,
                &column,
                &audio_dir,
                &transport,
                &ThreadPause,
            )?;

            println!("{RULE}");
            println!("Download summary:");
            println!("  Rows without a link:       {}", result.without_link);
            print_download_summary(&result.download);
            println!("{RULE}");

            write_report(report.as_deref(), &result)
        }

        Command::InspectCapture { capture } => {
            let path = capture.unwrap_or_else(|| settings.capture_file.clone());
            let template = curl::parse(&encoding::read_text(&path)?)?;

            println!("Method:    {}", template.method);
            println!("Base URL:  {}", template.base_url);
            println!("User ID:   {}", template.user_id.as_deref().unwrap_or("-"));
            println!(
                "Learning:  {}",
                template.learning_language.as_deref().unwrap_or("-")
            );
            println!(
                "From:      {}",
                template.from_language.as_deref().unwrap_or("-")
            );
            println!("Headers:   {}", template.headers.len());
            for name in template.headers.keys() {
                println!("  {name}");
            }
            for (name, value) in &template.params {
                println!("Param:     {name} = {}", value.values().join(","));
            }
            println!(
                "Body:      {}",
                if template.body.is_some() { "yes" } else { "no" }
            );
            Ok(())
        }

        Command::InitSettings { path } => {
            settings::save(&path, &Settings::default())?;
            println!("Wrote default settings to {}", path.display());
            Ok(())
        }
    }
}

fn fetch(settings: &Settings, report_path: Option<&Path>) -> Result<()> {
    let transport = ReqwestTransport::new(settings.timeout_secs)?;
    let report = pipeline::run(settings, &transport, &ThreadPause)?;

    println!("{RULE}");
    if report.records == 0 {
        println!("No lexemes found; nothing written.");
        println!(
            "Check that {} holds a current bearer token and cookies.",
            settings.capture_file.display()
        );
    } else {
        println!("Lexemes retrieved: {}", report.records);
        println!("Entry issues:      {}", report.qa_issues);
        if let Some(download) = &report.download {
            print_download_summary(download);
        }
        println!(
            "Wrote {} entries to {}",
            report.written,
            settings.output_csv.display()
        );
        println!();
        println!("Next steps:");
        println!(
            "  1. Copy {}/* into the flashcard app's media folder",
            settings.audio_dir.display()
        );
        println!("  2. Import {}", settings.output_csv.display());
    }
    println!("{RULE}");

    write_report(report_path, &report)
}
