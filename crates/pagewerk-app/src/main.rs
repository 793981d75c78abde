// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pagewerk — photos to paginated PDF, and PDF pages back to images.
//
// Entry point. Initialises logging, loads the configuration, and runs the
// requested pipeline on a worker thread while showing its progress.

mod cli;
mod services;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use pagewerk_core::error::{PagewerkError, Result};
use pagewerk_core::human_errors::humanize_error;
use pagewerk_core::{AppConfig, PageSize, RenderMode};
use pagewerk_document::{DocumentDecoder, DocumentEncoder, EncoderOptions, FileBitmapSource};

use cli::{Cli, Commands};
use services::{config_store, data_dir, export, pipeline};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::info!("Pagewerk starting");

    let data_dir = data_dir::data_dir();
    let config = config_store::load_config(&data_dir);

    match run(cli.command, config, &data_dir).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            let human = humanize_error(&err);
            eprintln!("{}", human.message);
            eprintln!("  {}", human.suggestion);
            if human.retriable {
                eprintln!("  Running the command again may help.");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: AppConfig, data_dir: &Path) -> Result<()> {
    let page = command.requested_page();
    match command {
        Commands::Encode {
            output,
            title,
            images,
            ..
        } => {
            let output = match output {
                Some(path) => std::path::absolute(&path)?,
                None => data_dir::output_dir(data_dir, &config)
                    .join(format!("{}.pdf", Utc::now().timestamp_millis())),
            };
            let page = page.unwrap_or(config.default_page_size);
            let title = title.unwrap_or_else(|| config.document_title.clone());
            let written = encode(images, page, output, title, config.max_photos).await?;
            println!("  PDF: {}", written.display());
        }
        Commands::Decode {
            input,
            output,
            mode,
        } => {
            let dir = output.unwrap_or_else(|| export::default_export_dir(&input));
            let mode = mode.unwrap_or(config.render_mode);
            let files = decode(input, dir, mode).await?;
            for file in &files {
                println!("  {}", file.display());
            }
        }
        Commands::Config { save } => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            if save {
                config_store::save_config(data_dir, &config)?;
                eprintln!("Saved to {}", data_dir.join("config.json").display());
            }
        }
    }
    Ok(())
}

async fn encode(
    images: Vec<PathBuf>,
    page: PageSize,
    output: PathBuf,
    title: String,
    max_photos: usize,
) -> Result<PathBuf> {
    if images.len() > max_photos {
        return Err(PagewerkError::InvalidArgument(format!(
            "{} photos given, at most {} are allowed",
            images.len(),
            max_photos
        )));
    }

    let encoder = DocumentEncoder::with_options(EncoderOptions {
        title,
        ..EncoderOptions::default()
    });
    pipeline::run_blocking("Encoding photos", move |reporter| {
        encoder.encode(&FileBitmapSource, &images, page, &output, reporter)
    })
    .await
}

async fn decode(input: PathBuf, dir: PathBuf, mode: RenderMode) -> Result<Vec<PathBuf>> {
    let decoder = DocumentDecoder::new(mode);
    pipeline::run_blocking("Rendering pages", move |reporter| {
        export::decode_to_dir(&decoder, &input, &dir, reporter)
    })
    .await
}
