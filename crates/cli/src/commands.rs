//! Subcommand handlers. Each returns the text to print so the handlers can
//! be exercised without capturing stdout.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use compaction_recall_core::{
    format_transcript, generate_smart_tail, prune_transcripts, read_transcript, write_transcript, PruneOptions,
    RecallConfig, SessionState, SmartTailResult, TranscriptOptions,
};
use tokio::io::AsyncReadExt;
use tracing::info;

use crate::cli::{Commands, CompactArgs, PruneArgs, StateInput, TailArgs, TranscriptArgs};

/// Resolved settings shared by every subcommand.
pub struct Context {
    pub config: RecallConfig,
    pub transcript_dir: Option<PathBuf>,
}

impl Context {
    pub fn new(config: RecallConfig, transcript_dir_override: Option<PathBuf>) -> Self {
        let transcript_dir = transcript_dir_override
            .filter(|d| !d.as_os_str().is_empty())
            .or_else(|| config.resolved_transcript_dir());
        Self { config, transcript_dir }
    }

    fn require_transcript_dir(&self) -> Result<&Path> {
        self.transcript_dir
            .as_deref()
            .context("no transcript directory: pass --transcript-dir or set transcript_dir in the config")
    }
}

pub async fn execute(command: Commands, ctx: &Context) -> Result<String> {
    match command {
        Commands::Transcript(args) => transcript(args, ctx).await,
        Commands::Tail(args) => tail(args, ctx).await,
        Commands::Compact(args) => compact(args, ctx).await,
        Commands::Prune(args) => prune(args, ctx).await,
        Commands::Show { session_id } => show(&session_id, ctx).await,
    }
}

async fn load_state(input: &StateInput) -> Result<SessionState> {
    let raw = match &input.state {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading session state from {}", path.display()))?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("reading session state from stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("parsing session state JSON")
}

fn transcript_options(args: &TranscriptArgs, base: &TranscriptOptions) -> TranscriptOptions {
    TranscriptOptions {
        include_tools: base.include_tools && !args.no_tools,
        include_metadata: base.include_metadata && !args.no_metadata,
        max_user_chars: args.max_user_chars.unwrap_or(base.max_user_chars),
        max_assistant_chars: args.max_assistant_chars.unwrap_or(base.max_assistant_chars),
    }
}

fn prune_options(args: &PruneArgs, base: &PruneOptions) -> PruneOptions {
    PruneOptions {
        max_count: args.max_count.unwrap_or(base.max_count),
        max_age_days: args.max_age_days.unwrap_or(base.max_age_days),
    }
}

fn render_tail(result: &SmartTailResult, json: bool) -> Result<String> {
    if json {
        return serde_json::to_string_pretty(result).context("serializing tail result");
    }
    Ok(result.content.clone())
}

async fn transcript(args: TranscriptArgs, ctx: &Context) -> Result<String> {
    let state = load_state(&args.input).await?;
    let opts = transcript_options(&args, &ctx.config.transcript);
    let markdown = format_transcript(&state.session_id, &state.messages, &opts);

    if !args.write {
        return Ok(markdown);
    }
    let dir = ctx.require_transcript_dir()?;
    let path = write_transcript(dir, &state.session_id, &markdown).await?;
    Ok(path.display().to_string())
}

async fn tail(args: TailArgs, ctx: &Context) -> Result<String> {
    let state = load_state(&args.input).await?;
    let pointer_dir = if args.no_pointer { None } else { ctx.transcript_dir.as_deref() };

    let mut opts = ctx.config.tail_options(pointer_dir);
    if let Some(max_tokens) = args.max_tokens {
        opts.max_tokens = max_tokens;
    }

    let result = generate_smart_tail(&state, &opts);
    info!(
        session_id = %state.session_id,
        classification = %result.classification,
        inject = result.inject,
        "Classified session"
    );
    render_tail(&result, args.json)
}

async fn compact(args: CompactArgs, ctx: &Context) -> Result<String> {
    let state = load_state(&args.input).await?;
    let dir = ctx.require_transcript_dir()?;

    // Prune first so the transcript written below always survives.
    let removed = prune_transcripts(dir, &ctx.config.prune).await;

    let markdown = format_transcript(&state.session_id, &state.messages, &ctx.config.transcript);
    write_transcript(dir, &state.session_id, &markdown)
        .await
        .with_context(|| format!("writing transcript for session {}", state.session_id))?;

    let mut opts = ctx.config.tail_options(Some(dir));
    if let Some(max_tokens) = args.max_tokens {
        opts.max_tokens = max_tokens;
    }
    let result = generate_smart_tail(&state, &opts);

    info!(
        session_id = %state.session_id,
        classification = %result.classification,
        pruned = removed,
        "Compaction recall complete"
    );

    render_tail(&result, args.json)
}

async fn prune(args: PruneArgs, ctx: &Context) -> Result<String> {
    let dir = ctx.require_transcript_dir()?;
    let removed = prune_transcripts(dir, &prune_options(&args, &ctx.config.prune)).await;
    Ok(removed.to_string())
}

async fn show(session_id: &str, ctx: &Context) -> Result<String> {
    let dir = ctx.require_transcript_dir()?;
    match read_transcript(dir, session_id).await? {
        Some(content) => Ok(content),
        None => bail!("no transcript for session {session_id} in {}", dir.display()),
    }
}
