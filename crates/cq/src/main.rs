//! Command-line interface for the cq catalog query compiler.
//!
//! Exercises the compiler pipeline offline: parse a query string and
//! inspect its stages, or compile it against a vocabulary, index mappings
//! and site configuration into the exact backend request JSON.

use std::{fs, path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use cq_config::AppConfig;
use cq_search::{EsMappings, QueryParams, Search, api};
use cq_tree::build;
use cq_vocab::{Disambiguator, Vocab};

#[derive(Parser)]
#[command(name = "cq")]
#[command(about = "Catalog query compiler - from query strings to search requests")]
/// Top-level CLI options.
struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    command: Commands,
}

#[derive(Subcommand)]
/// Supported `cq` subcommands.
enum Commands {
    /// Parse a query and print its flattened form
    Parse {
        /// The query string
        query: String,

        /// Also build and print the query tree (needs a vocabulary)
        #[arg(long)]
        vocab: Option<PathBuf>,
    },

    /// Compile a query into a backend search request
    Compile {
        /// The query string
        query: String,

        /// Vocabulary JSON file
        #[arg(long)]
        vocab: PathBuf,

        /// Index mappings JSON file
        #[arg(long)]
        mappings: Option<PathBuf>,

        /// Site configuration JSON file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Object IRI (object search)
        #[arg(long)]
        object: Option<String>,

        /// Page size
        #[arg(long, default_value_t = 20)]
        limit: usize,

        /// Page offset
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

/// Runs the selected subcommand.
fn run(command: Commands) -> Result<(), String> {
    match command {
        Commands::Parse { query, vocab } => parse_command(&query, vocab.as_deref()),
        Commands::Compile {
            query,
            vocab,
            mappings,
            config,
            object,
            limit,
            offset,
        } => compile_command(
            &query,
            &vocab,
            mappings.as_deref(),
            config.as_deref(),
            object.as_deref(),
            limit,
            offset,
        ),
    }
}

/// Parses a query and prints its stages.
fn parse_command(query: &str, vocab_path: Option<&std::path::Path>) -> Result<(), String> {
    let flattened = cq_query::parse_query(query)
        .map_err(|err| err.to_string())?
        .ok_or_else(|| "empty query".to_string())?;

    println!("{flattened:#?}");

    if let Some(path) = vocab_path {
        let vocab = load_vocab(path)?;
        let disambiguator = Disambiguator::new(&vocab);
        let tree = build(&flattened, &disambiguator).map_err(|err| err.to_string())?;
        println!("{tree:#?}");
        println!("query string: {}", tree.to_query_string());
    }

    Ok(())
}

/// Compiles a query into the backend request JSON.
fn compile_command(
    query: &str,
    vocab_path: &std::path::Path,
    mappings_path: Option<&std::path::Path>,
    config_path: Option<&std::path::Path>,
    object: Option<&str>,
    limit: usize,
    offset: usize,
) -> Result<(), String> {
    let vocab = load_vocab(vocab_path)?;
    let disambiguator = Disambiguator::new(&vocab);

    let mappings = match mappings_path {
        Some(path) => EsMappings::from_json(&load_json(path)?),
        None => EsMappings::default(),
    };
    let config = match config_path {
        Some(path) => AppConfig::from_json(load_json(path)?).map_err(|err| err.to_string())?,
        None => AppConfig::default(),
    };

    let limit = limit.to_string();
    let offset = offset.to_string();
    let mut pairs = vec![
        (api::QUERY, query),
        (api::LIMIT, limit.as_str()),
        (api::OFFSET, offset.as_str()),
    ];
    if let Some(object) = object {
        pairs.push((api::OBJECT, object));
    }

    let params = QueryParams::parse(pairs).map_err(|err| err.to_string())?;
    let search =
        Search::new(params, &disambiguator, &config, &mappings).map_err(|err| err.to_string())?;

    let request = search.request();
    let pretty = serde_json::to_string_pretty(&request).map_err(|err| err.to_string())?;
    println!("{pretty}");

    if let Some(predicate_request) = search.predicate_request() {
        let pretty =
            serde_json::to_string_pretty(&predicate_request).map_err(|err| err.to_string())?;
        println!("{pretty}");
    }

    Ok(())
}

/// Loads and indexes a vocabulary file.
fn load_vocab(path: &std::path::Path) -> Result<Vocab, String> {
    Vocab::from_json(load_json(path)?).map_err(|err| err.to_string())
}

/// Loads a JSON file.
fn load_json(path: &std::path::Path) -> Result<serde_json::Value, String> {
    let content =
        fs::read_to_string(path).map_err(|err| format!("{}: {err}", path.display()))?;
    serde_json::from_str(&content).map_err(|err| format!("{}: {err}", path.display()))
}
