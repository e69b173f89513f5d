//! # trellis-cli
//!
//! Command-line interface for trellis grammars.
//!
//! Compiles grammar documents, shows how production lines are tokenized and
//! runs grammars against input files, printing the resulting syntax trees.

mod config;
mod errors;
mod render;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::*;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use trellis_eval::{SyntaxTree, parse};
use trellis_syntax::{
    Grammar, GrammarCache, GrammarError, MatchMode, Snapshot, compile_grammar_with, tokenize,
};

use config::{CONFIG_FILE, Config, OutputFormat, global_config_path};
use errors::enhance_error;
use render::{ParseReport, render_tree};

#[derive(Parser)]
#[command(name = "trellis")]
#[command(about = "Grammars embedded in Markdown, matched by a backtracking parser", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Read settings from this file instead of ~/.trellisrc and ./.trellisrc
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a grammar document and list its productions
    Check { grammar: PathBuf },
    /// Show the lexer tokens of one production line
    Tokens { line: String },
    /// Parse input files with a grammar and print the syntax trees
    Parse {
        grammar: PathBuf,
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Write a default .trellisrc
    Init {
        /// Write ~/.trellisrc instead of ./.trellisrc
        #[arg(short, long)]
        global: bool,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => Config::load_from_file(path),
        None => Config::load(),
    };
    let mut config = loaded.unwrap_or_else(|e| {
        eprintln!("{} Failed to load config: {:#}", "⚠".yellow().bold(), e);
        Config::default()
    });
    let format = match &cli.command {
        Commands::Parse { format, .. } => *format,
        _ => None,
    };
    config.merge_cli_args(format, cli.verbose, cli.no_color);

    init_logging(config.verbose);
    if !config.colored {
        colored::control::set_override(false);
    }

    let result = match cli.command {
        Commands::Check { grammar } => check_grammar(&grammar, &config),
        Commands::Tokens { line } => show_tokens(&line),
        Commands::Parse {
            grammar, inputs, ..
        } => parse_inputs(&grammar, &inputs, &config),
        Commands::Init { global, force } => init_config(global, force),
    };

    if let Err(e) = result {
        enhance_error(&e, None, None).display();
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Compiles `path`, or reports the failure against the document and exits.
fn compile_or_exit(path: &Path, config: &Config) -> Result<Grammar> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read grammar from {}", path.display()))?;

    match compile_grammar_with(&source, &config.compile_options()) {
        Ok(grammar) => Ok(grammar),
        Err(grammar_err) => {
            let err = anyhow::Error::new(grammar_err);
            enhance_error(&err, Some(path.display().to_string()), Some(source)).display();
            std::process::exit(1);
        }
    }
}

fn check_grammar(path: &Path, config: &Config) -> Result<()> {
    let grammar = compile_or_exit(path, config)?;

    if grammar.is_empty() {
        println!(
            "{} {} {}",
            "⚠".yellow().bold(),
            path.display(),
            "contains no productions".dimmed()
        );
        println!(
            "  Grammar blocks start with a line beginning with {}",
            config.open_fence.cyan()
        );
        return Ok(());
    }

    println!(
        "{} {}: {} productions (root: {})",
        "✓".green().bold(),
        path.display(),
        grammar.len(),
        grammar.root_name().unwrap_or("-").cyan()
    );

    let mut productions: Vec<_> = grammar.productions().collect();
    productions.sort_by_key(|(name, _)| *name);
    let width = productions.iter().map(|(name, _)| name.len()).max().unwrap_or(0);

    for (name, rule) in productions {
        let marker = match MatchMode::for_name(name) {
            MatchMode::Lexical => " (lexical)".dimmed(),
            MatchMode::Skipping => "".normal(),
        };
        println!("  {:<width$} = {}{}", name.cyan(), rule, marker, width = width);
    }
    Ok(())
}

fn show_tokens(line: &str) -> Result<()> {
    let tokens = tokenize(line);
    if tokens.is_empty() {
        println!("{}", "No tokens".dimmed());
        return Ok(());
    }

    for spanned in tokens {
        println!(
            "{:>4}  {}",
            spanned.column.to_string().dimmed(),
            spanned.token.display_name()
        );
    }
    Ok(())
}

fn parse_inputs(grammar_path: &Path, inputs: &[PathBuf], config: &Config) -> Result<()> {
    let cache = GrammarCache::with_default_size(config.compile_options());
    let grammar = match cache.get_or_load(grammar_path) {
        Ok(grammar) => grammar,
        Err(e) if e.downcast_ref::<GrammarError>().is_some() => {
            Arc::new(compile_or_exit(grammar_path, config)?)
        }
        Err(e) => return Err(e),
    };
    info!(
        grammar = %grammar_path.display(),
        productions = grammar.len(),
        inputs = inputs.len(),
        "parsing"
    );

    let results: Vec<(&PathBuf, Result<SyntaxTree>)> = inputs
        .par_iter()
        .map(|input| (input, parse_file(&grammar, input)))
        .collect();

    let mut failed = 0;
    let mut reports = Vec::new();

    for (input, result) in &results {
        match result {
            Ok(tree) => match config.format {
                OutputFormat::Json => reports.push(ParseReport::new(input.display().to_string(), tree)),
                OutputFormat::Tree => {
                    if inputs.len() > 1 {
                        println!("{} {}", "==>".blue().bold(), input.display());
                    }
                    print!("{}", render_tree(tree));
                }
            },
            Err(e) => {
                failed += 1;
                enhance_error(e, Some(input.display().to_string()), None).display();
            }
        }
    }

    if config.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    if failed > 0 {
        bail!("{} of {} inputs failed to parse", failed, inputs.len());
    }
    Ok(())
}

fn parse_file(grammar: &Grammar, path: &Path) -> Result<SyntaxTree> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input {}", path.display()))?;
    debug!(input = %path.display(), chars = text.chars().count(), "read input");
    parse(grammar, &Snapshot::new(&text))
}

fn init_config(global: bool, force: bool) -> Result<()> {
    let path = if global {
        global_config_path().context("Could not determine home directory")?
    } else {
        PathBuf::from(CONFIG_FILE)
    };

    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    Config::create_default(&path)?;
    println!(
        "{} Created config: {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}
