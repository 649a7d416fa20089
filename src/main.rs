use std::fs;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tld_trie::{codec, source, SuffixTrie, DEFAULT_OUTPUT};

#[derive(Parser)]
#[command(name = "tld-trie")]
#[command(about = "Build and query a trie of public suffixes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the JSON trie from a public suffix list
    Build {
        /// Public suffix list file ("-" for stdin)
        #[arg(short, long, default_value = "-")]
        input: String,

        /// Output JSON file
        #[arg(short, long, default_value = DEFAULT_OUTPUT)]
        output: PathBuf,

        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Look up domain names in a JSON trie
    Check {
        /// JSON trie file
        #[arg(short, long, default_value = DEFAULT_OUTPUT)]
        input: PathBuf,

        /// Domain names (comma-separated lists allowed)
        #[arg(required = true)]
        names: Vec<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tld_trie=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            input,
            output,
            pretty,
        } => build(&input, &output, pretty),
        Commands::Check { input, names } => check(&input, &names),
    }
}

fn build(input: &str, output: &Path, pretty: bool) -> Result<()> {
    let (rules, stats) = if input == "-" {
        source::read_rules_with_stats(io::stdin().lock())
            .context("Failed to read suffix list from stdin")?
    } else {
        let file = fs::File::open(input)
            .with_context(|| format!("Failed to open suffix list '{}'", input))?;
        source::read_rules_with_stats(BufReader::new(file))
            .with_context(|| format!("Failed to read suffix list '{}'", input))?
    };

    let trie: SuffixTrie = rules.iter().collect();

    codec::save_file(output, &trie, pretty)
        .with_context(|| format!("Failed to write '{}'", output.display()))?;

    tracing::info!(
        rules = stats.rules,
        skipped = stats.skipped(),
        nodes = trie.node_count(),
        output = %output.display(),
        "suffix trie written"
    );
    Ok(())
}

fn check(input: &Path, names: &[String]) -> Result<()> {
    let trie = codec::load_file(input)
        .with_context(|| format!("Failed to load trie '{}'", input.display()))?;

    for name in expand_names(names) {
        if trie.public_suffix(&name).is_none() {
            tracing::warn!(name = %name, "no known public suffix");
        }
        println!("{} ==> {}", name, trie.lookup(&name));
    }
    Ok(())
}

/// Split comma-separated arguments into normalized names, dropping empty ones
fn expand_names(args: &[String]) -> Vec<String> {
    args.iter()
        .flat_map(|arg| arg.split(','))
        .map(normalize)
        .filter(|name| !name.is_empty())
        .collect()
}

/// Trim, lowercase and drop the root dot of a fully qualified name
fn normalize(name: &str) -> String {
    let name = name.trim();
    name.strip_suffix('.').unwrap_or(name).to_lowercase()
}
