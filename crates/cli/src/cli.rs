use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "compaction-recall")]
#[command(version, about = "Session transcripts and post-compaction smart tails")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to ~/.config/compaction-recall/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Transcript directory (overrides the config file)
    #[arg(long, global = true, env = "COMPACTION_RECALL_TRANSCRIPT_DIR")]
    pub transcript_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a session as a markdown transcript
    Transcript(TranscriptArgs),

    /// Classify a session and print the tail to inject after compaction
    Tail(TailArgs),

    /// Write the transcript, build the tail pointing at it, then prune
    Compact(CompactArgs),

    /// Apply the retention policy to the transcript directory
    Prune(PruneArgs),

    /// Print a stored transcript
    Show {
        /// Session whose transcript to print
        session_id: String,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct StateInput {
    /// Session state JSON file (reads stdin when omitted)
    #[arg(long)]
    pub state: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct TranscriptArgs {
    #[command(flatten)]
    pub input: StateInput,

    /// Persist the transcript and print its path instead of the markdown
    #[arg(long)]
    pub write: bool,

    /// Omit tool call lines
    #[arg(long)]
    pub no_tools: bool,

    /// Omit agent/model annotations
    #[arg(long)]
    pub no_metadata: bool,

    #[arg(long)]
    pub max_user_chars: Option<usize>,

    #[arg(long)]
    pub max_assistant_chars: Option<usize>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct TailArgs {
    #[command(flatten)]
    pub input: StateInput,

    /// Token budget for the tail
    #[arg(long)]
    pub max_tokens: Option<usize>,

    /// Leave out the transcript pointer line
    #[arg(long)]
    pub no_pointer: bool,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CompactArgs {
    #[command(flatten)]
    pub input: StateInput,

    #[arg(long)]
    pub max_tokens: Option<usize>,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct PruneArgs {
    /// Max transcript files to keep
    #[arg(long)]
    pub max_count: Option<usize>,

    /// Max age in days
    #[arg(long)]
    pub max_age_days: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_tail_with_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "compaction-recall",
            "tail",
            "--state",
            "state.json",
            "--max-tokens",
            "300",
            "--json",
            "--transcript-dir",
            "brain/transcripts",
        ])
        .unwrap();

        assert_eq!(cli.transcript_dir, Some(PathBuf::from("brain/transcripts")));
        let Commands::Tail(args) = cli.command else {
            panic!("expected tail");
        };
        assert_eq!(args.input.state, Some(PathBuf::from("state.json")));
        assert_eq!(args.max_tokens, Some(300));
        assert!(args.json);
        assert!(!args.no_pointer);
    }

    #[test]
    fn test_parses_prune_limits() {
        let cli = Cli::try_parse_from(["compaction-recall", "-v", "prune", "--max-count", "5", "--max-age-days", "2"])
            .unwrap();
        assert!(cli.verbose);
        let Commands::Prune(args) = cli.command else {
            panic!("expected prune");
        };
        assert_eq!(args.max_count, Some(5));
        assert_eq!(args.max_age_days, Some(2));
    }

    #[test]
    fn test_show_requires_session_id() {
        assert!(Cli::try_parse_from(["compaction-recall", "show"]).is_err());
        let cli = Cli::try_parse_from(["compaction-recall", "show", "ses_1"]).unwrap();
        assert!(matches!(cli.command, Commands::Show { ref session_id } if session_id == "ses_1"));
    }

    #[test]
    fn test_transcript_flags() {
        let cli = Cli::try_parse_from(["compaction-recall", "transcript", "--write", "--no-tools", "--max-user-chars", "80"])
            .unwrap();
        let Commands::Transcript(args) = cli.command else {
            panic!("expected transcript");
        };
        assert!(args.write);
        assert!(args.no_tools);
        assert!(!args.no_metadata);
        assert_eq!(args.max_user_chars, Some(80));
        assert_eq!(args.input.state, None);
    }
}
