//! Leaderboard Extract
//!
//! Reads leaderboard screenshots, extracts name/score pairs through local OCR
//! or the Gemini API, prints them as a table and exports a combined CSV.

mod cli;
mod config;
mod error;
mod export;
mod extract;
mod input;
mod ocr;
mod paths;
mod pipeline;
mod record;
mod remote;
mod source;
mod table;

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use indicatif::ProgressBar;
use std::fs::OpenOptions;
use std::io::{self, BufRead, IsTerminal, Write};

use cli::SourceKind;
use config::{AppConfig, API_KEY_ENV};
use ocr::OcrSource;
use pipeline::RunOptions;
use remote::{GeminiClient, GeminiSettings, RemoteSource};
use source::ImageSource;

/// Logs a message to both console and log file with timestamp.
pub fn log(msg: &str) {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    let line = format!("[{}] {}\n", timestamp, msg);
    print!("{}", line);
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(paths::get_log_file())
    {
        let _ = file.write_all(line.as_bytes());
    }
}

fn main() -> Result<()> {
    // Set up panic hook to log panics
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = if let Some(loc) = panic_info.location() {
            format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column())
        } else {
            String::new()
        };
        let log_msg = format!("[PANIC]{} {}\n", location, msg);
        eprint!("{}", log_msg);
        if let Ok(mut file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open(paths::get_log_file())
        {
            let _ = file.write_all(log_msg.as_bytes());
        }
    }));

    // Ensure output directories exist
    if let Err(e) = paths::ensure_directories() {
        eprintln!("Warning: could not create log directory: {}", e);
    }

    let args = cli::parse_cli();
    let config = config::init_config(args.config.as_deref())?;

    let inputs = if args.inputs.is_empty() {
        vec![input::prompt_for_directory()?]
    } else {
        args.inputs.clone()
    };

    let images = input::collect_image_paths(&inputs)?;
    if images.is_empty() {
        return Err(anyhow!("No png/jpg/jpeg images found"));
    }
    log(&format!("Processing {} image(s)", images.len()));

    let source = build_source(args.source, args.api_key.as_deref(), config)?;

    let progress = ProgressBar::new(images.len() as u64);
    progress.set_style(pipeline::progress_style());

    let options = RunOptions {
        show_raw: args.show_raw,
    };
    let report = pipeline::run(&images, source.as_ref(), &options, &progress);

    if report.combined.is_empty() {
        log("No name/score pairs found; nothing to export.");
    } else {
        print!("\n{}\n", table::render_table(report.combined.records()));

        let output_path = args.output.clone().unwrap_or_else(|| config.output_file.clone());
        let mut csv_options = config.csv_options();
        if args.no_bom {
            csv_options.byte_order_mark = false;
        }
        export::write_csv(report.combined.records(), &csv_options, &output_path)?;
        log(&format!("CSV saved: {}", output_path.display()));
    }

    for failure in &report.failures {
        log(&format!("Failed: {}: {}", failure.label, failure.error));
    }
    log(&report.to_string());

    if report.aborted {
        let reason = report
            .failures
            .last()
            .map(|f| f.error.to_string())
            .unwrap_or_default();
        return Err(anyhow!("Run aborted: {}", reason));
    }

    Ok(())
}

/// Builds the source adapter selected on the command line.
fn build_source(
    kind: SourceKind,
    cli_key: Option<&str>,
    config: &AppConfig,
) -> Result<Box<dyn ImageSource>> {
    match kind {
        SourceKind::Ocr => {
            let settings = config.tesseract_settings();
            match ocr::find_tesseract_executable(&settings) {
                Ok(exe) => log(&format!("Using Tesseract: {}", exe.display())),
                Err(e) => {
                    log(&format!("Warning: {}", e));
                    log("OCR will fail for every image until Tesseract is available.");
                }
            }
            let source = OcrSource::new(settings).context("Failed to build name/score pattern")?;
            Ok(Box::new(source))
        }
        SourceKind::Ai => {
            let api_key = config
                .resolve_api_key(cli_key, std::env::var(API_KEY_ENV).ok())
                .or_else(prompt_api_key)
                .unwrap_or_default();
            if api_key.is_empty() {
                log(&format!(
                    "Warning: no API key (use --api-key, {} or config.json)",
                    API_KEY_ENV
                ));
            }

            let settings = GeminiSettings {
                api_key,
                api_base_url: config.api_base_url.clone(),
                model: config.model.clone(),
                policy: config.backoff_policy(),
            };
            let client = GeminiClient::new(settings, config.request_timeout())
                .context("Failed to create HTTP client")?;
            Ok(Box::new(RemoteSource::new(client)))
        }
    }
}

/// Asks for the API key when running interactively.
fn prompt_api_key() -> Option<String> {
    if !io::stdin().is_terminal() {
        return None;
    }
    print!("Enter Gemini API key: ");
    io::stdout().flush().ok()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).ok()?;
    let key = line.trim().to_string();
    if key.is_empty() { None } else { Some(key) }
}
