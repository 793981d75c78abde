// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line surface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pagewerk_core::{PageSize, PaperSize, RenderMode};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Combines photos into a PDF with one page per photo
    Encode {
        /// Page size in points, e.g. 1080x1920
        #[arg(long, conflicts_with = "paper")]
        page: Option<PageSize>,
        /// Named paper size (a3, a4, a5, letter, legal, tabloid)
        #[arg(long)]
        paper: Option<PaperSize>,
        /// Where to write the PDF (default: a timestamped file in the output directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Title stored in the PDF
        #[arg(long)]
        title: Option<String>,
        /// Photos, in page order
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
    /// Renders every page of a PDF to PNG files
    Decode {
        /// The PDF to render
        input: PathBuf,
        /// Directory for page-NNN.png files (default: next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Resampling quality
        #[arg(long)]
        mode: Option<RenderMode>,
    },
    /// Prints the effective configuration as JSON
    Config {
        /// Also write it to the config file, creating the file if needed
        #[arg(long)]
        save: bool,
    },
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Commands {
    /// Page size requested on the command line, if any.
    pub fn requested_page(&self) -> Option<PageSize> {
        match self {
            Commands::Encode { page, paper, .. } => {
                page.or_else(|| paper.as_ref().map(PaperSize::page_size))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn paper_name_sets_page_size() {
        let cli = Cli::parse_from(["pagewerk", "encode", "--paper", "a4", "a.jpg", "b.jpg"]);
        assert_eq!(cli.command.requested_page(), Some(PageSize::new(595, 842)));
        let Commands::Encode { images, .. } = cli.command else {
            panic!("expected encode");
        };
        assert_eq!(images.len(), 2);
    }

    #[test]
    fn page_and_paper_conflict() {
        let parsed = Cli::try_parse_from([
            "pagewerk", "encode", "--page", "100x100", "--paper", "a4", "a.jpg",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn decode_mode_parses() {
        let cli = Cli::parse_from(["pagewerk", "decode", "in.pdf", "--mode", "print"]);
        let Commands::Decode { mode, output, .. } = cli.command else {
            panic!("expected decode");
        };
        assert_eq!(mode, Some(RenderMode::Print));
        assert!(output.is_none());
    }
}
