use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "lexeme-deck",
    version,
    about = "Turn a language-learning vocabulary export into a flashcard deck with local audio"
)]
pub struct Cli {
    /// JSON settings file; flags below override it
    #[arg(long, global = true, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Replay a captured request, fetch every page, download audio, write the import CSV
    Fetch {
        #[arg(long, value_name = "FILE")]
        capture: Option<PathBuf>,

        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[arg(long, value_name = "DIR")]
        audio_dir: Option<PathBuf>,

        #[arg(long)]
        page_size: Option<usize>,

        /// Write the run report as JSON
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },

    /// Append a column of audio links (one per line) to a vocabulary CSV
    AttachLinks {
        #[arg(long, value_name = "FILE", default_value = "duolingo_vocabulary.csv")]
        csv: PathBuf,

        #[arg(long, value_name = "FILE", default_value = "duolingo_audio_file_links.txt")]
        links: PathBuf,

        #[arg(
            short,
            long,
            value_name = "FILE",
            default_value = "duolingo_vocabulary_with_audio_file_links.csv"
        )]
        output: PathBuf,

        /// Name of the new column
        #[arg(long)]
        column: Option<String>,
    },

    /// Rewrite a CSV's audio link column into [sound:...] references
    AddReferences {
        #[arg(
            long,
            value_name = "FILE",
            default_value = "duolingo_vocabulary_with_audio_file_links.csv"
        )]
        csv: PathBuf,

        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[arg(long)]
        column: Option<String>,
    },

    /// Download every audio link found in a CSV column
    Download {
        #[arg(
            long,
            value_name = "FILE",
            default_value = "duolingo_vocabulary_with_audio_file_links.csv"
        )]
        csv: PathBuf,

        #[arg(long, value_name = "DIR")]
        audio_dir: Option<PathBuf>,

        #[arg(long)]
        column: Option<String>,

        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },

    /// Parse a captured request and show what would be replayed
    InspectCapture {
        #[arg(long, value_name = "FILE")]
        capture: Option<PathBuf>,
    },

    /// Write the default settings to a JSON file
    InitSettings {
        #[arg(default_value = "lexeme-deck.json")]
        path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "lexeme-deck",
            "fetch",
            "--page-size",
            "25",
            "-vv",
            "--settings",
            "s.json",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.settings, Some(PathBuf::from("s.json")));
        match cli.command {
            Command::Fetch { page_size, .. } => assert_eq!(page_size, Some(25)),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_attach_links_defaults() {
        let cli = Cli::try_parse_from(["lexeme-deck", "attach-links"]).unwrap();
        match cli.command {
            Command::AttachLinks { csv, links, column, .. } => {
                assert_eq!(csv, PathBuf::from("duolingo_vocabulary.csv"));
                assert_eq!(links, PathBuf::from("duolingo_audio_file_links.txt"));
                assert!(column.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
