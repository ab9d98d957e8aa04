//! Fetch command

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use magpie_core::Config;
use magpie_github::{
    format_artifact, ExtractorClient, FormattedArtifact, ReferenceKind, Traversal,
};
use tracing::warn;

use crate::markdown;

/// Fetch a GitHub issue or pull request
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// URL of the GitHub issue or pull request
    pub url: String,

    /// Output file path (prints to stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output raw extracted data without LLM formatting
    #[arg(short, long)]
    pub raw: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Maximum depth for recursive expansion of related items
    #[arg(short, long, default_value_t = 0)]
    pub depth: u32,

    /// Kinds of related items to expand (default: all kinds)
    #[arg(short = 't', long = "types", value_enum, num_args = 1..)]
    pub types: Vec<KindFilter>,
}

/// Output document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Markdown,
}

/// Reference kinds accepted by `--types`
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindFilter {
    Issue,
    PullRequest,
    Commit,
}

impl From<KindFilter> for ReferenceKind {
    fn from(filter: KindFilter) -> Self {
        match filter {
            KindFilter::Issue => ReferenceKind::Issue,
            KindFilter::PullRequest => ReferenceKind::PullRequest,
            KindFilter::Commit => ReferenceKind::Commit,
        }
    }
}

impl FetchArgs {
    /// Execute the fetch command
    pub async fn execute(&self, verbose: bool, config: &Config) -> anyhow::Result<()> {
        if self.raw && self.format == OutputFormat::Markdown {
            anyhow::bail!("--raw output is only available as JSON");
        }

        if verbose {
            println!(
                "Using extraction service at {}",
                config.extractor.base_url
            );
        }

        let client = ExtractorClient::new(config)?;

        let output_str = if self.depth > 0 {
            if self.raw {
                warn!("--raw is ignored when --depth > 0; emitting the formatted document");
            }

            println!(
                "Extracting content from {} with related items (depth: {})...",
                self.url, self.depth
            );

            let mut traversal = Traversal::new(&client);
            if !self.types.is_empty() {
                traversal = traversal
                    .include_kinds(self.types.iter().copied().map(ReferenceKind::from));
            }

            let document = traversal.run(&self.url, self.depth).await?;
            self.render(&document)?
        } else {
            println!("Extracting content from {}...", self.url);

            let record = client.fetch_artifact(&self.url).await?;

            if self.raw {
                serde_json::to_string_pretty(&record)?
            } else {
                self.render(&format_artifact(&record))?
            }
        };

        match &self.output {
            Some(path) => {
                std::fs::write(path, &output_str)?;
                println!("Output written to {}", path.display());
            }
            None => println!("{}", output_str),
        }

        Ok(())
    }

    fn render(&self, document: &FormattedArtifact) -> anyhow::Result<String> {
        Ok(match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(document)?,
            OutputFormat::Markdown => markdown::render(document),
        })
    }
}
