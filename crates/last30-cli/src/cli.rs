use clap::{Parser, ValueEnum};
use last30_core::RunFlags;

/// Report rendering.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum EmitFormat {
    /// Pretty-printed JSON report
    Json,
    /// Terminal text
    #[default]
    Compact,
    /// Markdown document
    Md,
}

/// Top-level CLI parser for the `last30days` binary.
#[derive(Debug, Parser)]
#[command(
    name = "last30days",
    version,
    about = "Research what people said about a topic in the last N days"
)]
pub struct Cli {
    /// Topic to research (words are joined with spaces)
    pub topic: Vec<String>,

    /// Lookback window in days (1-365)
    #[arg(long)]
    pub days: Option<u32>,

    /// Fewer results per source
    #[arg(long, conflicts_with = "deep")]
    pub quick: bool,

    /// More results per source
    #[arg(long)]
    pub deep: bool,

    /// Comma-separated sources: reddit, x, youtube, web
    #[arg(long, value_delimiter = ',')]
    pub sources: Option<Vec<String>>,

    /// Add web search to the default sources
    #[arg(long)]
    pub include_web: bool,

    /// Append the run to the run store
    #[arg(long)]
    pub store: bool,

    /// Report source availability and exit without searching
    #[arg(long)]
    pub diagnose: bool,

    /// Output format: json, compact, md
    #[arg(long, value_enum, default_value_t = EmitFormat::Compact)]
    pub emit: EmitFormat,

    /// Run deadline in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Quiet mode (errors only, no spinner)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Topic words as one string.
    #[must_use]
    pub fn topic(&self) -> String {
        self.topic.join(" ")
    }

    /// Run flags for [`last30_core::RunConfig::resolve`].
    #[must_use]
    pub fn run_flags(&self) -> RunFlags {
        RunFlags {
            days: self.days,
            quick: self.quick,
            deep: self.deep,
            sources: self.sources.clone(),
            include_web: self.include_web,
            store: self.store,
            timeout_secs: self.timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use pretty_assertions::assert_eq;

    use super::{Cli, EmitFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn topic_words_are_joined() {
        let cli = Cli::try_parse_from(["last30days", "rust", "async", "runtimes"]).unwrap();
        assert_eq!(cli.topic(), "rust async runtimes");
        assert_eq!(cli.emit, EmitFormat::Compact);
    }

    #[test]
    fn flags_map_to_run_flags() {
        let cli = Cli::try_parse_from([
            "last30days",
            "tokio",
            "--days",
            "7",
            "--deep",
            "--sources",
            "reddit,web",
            "--store",
            "--timeout",
            "90",
            "--emit",
            "md",
        ])
        .unwrap();
        let flags = cli.run_flags();
        assert_eq!(flags.days, Some(7));
        assert!(flags.deep);
        assert!(!flags.quick);
        assert_eq!(flags.sources, Some(vec!["reddit".to_string(), "web".to_string()]));
        assert!(flags.store);
        assert_eq!(flags.timeout_secs, Some(90));
        assert_eq!(cli.emit, EmitFormat::Md);
    }

    #[test]
    fn quick_and_deep_conflict() {
        assert!(Cli::try_parse_from(["last30days", "tokio", "--quick", "--deep"]).is_err());
    }

    #[test]
    fn diagnose_needs_no_topic() {
        let cli = Cli::try_parse_from(["last30days", "--diagnose"]).unwrap();
        assert!(cli.diagnose);
        assert!(cli.topic().is_empty());
    }

    #[test]
    fn unknown_emit_format_rejected() {
        assert!(Cli::try_parse_from(["last30days", "tokio", "--emit", "yaml"]).is_err());
    }
}
