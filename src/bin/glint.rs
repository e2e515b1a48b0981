//! Command-line interface for glint
//!
//! Usage:
//!   glint highlight `<path>` [--language `<lang>`] [--config `<file>`]  - Print highlighted markup
//!   glint tokens `<path>` [--language `<lang>`]                        - Print the token tree as JSON
//!   glint languages                                                 - List registered languages
//!
//! Without `--language` the language is taken from the file extension.
//! Set `GLINT_LOG` (e.g. `GLINT_LOG=debug`) to see diagnostics on stderr.

use clap::{Arg, ArgMatches, Command};
use glint::config::{GlintConfig, Loader};
use glint::Highlighter;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    let matches = Command::new("glint")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Grammar-driven syntax highlighting")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("highlight")
                .about("Highlight a file and print the markup")
                .arg(path_arg())
                .arg(language_arg())
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .help("Configuration file layered over the defaults"),
                ),
        )
        .subcommand(
            Command::new("tokens")
                .about("Print the token tree of a file as JSON")
                .arg(path_arg())
                .arg(language_arg()),
        )
        .subcommand(Command::new("languages").about("List registered languages and aliases"))
        .get_matches();

    match matches.subcommand() {
        Some(("highlight", sub)) => handle_highlight_command(sub),
        Some(("tokens", sub)) => handle_tokens_command(sub),
        Some(("languages", _)) => handle_languages_command(),
        _ => unreachable!(),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("GLINT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn path_arg() -> Arg {
    Arg::new("path")
        .help("Path to the source file")
        .required(true)
        .index(1)
}

fn language_arg() -> Arg {
    Arg::new("language")
        .long("language")
        .short('l')
        .help("Language name or alias (defaults to the file extension)")
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn load_config(path: Option<&String>) -> GlintConfig {
    let loader = match path {
        Some(path) => Loader::new().with_file(path),
        None => Loader::new(),
    };
    loader.build().unwrap_or_else(|e| fail(e))
}

fn read_source(path: &str) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| fail(format!("cannot read {}: {}", path, e)))
}

fn language_for(matches: &ArgMatches, path: &str) -> String {
    if let Some(language) = matches.get_one::<String>("language") {
        return language.clone();
    }
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_else(|| "plain".to_string())
}

/// Handle the highlight command
fn handle_highlight_command(matches: &ArgMatches) {
    let path = matches.get_one::<String>("path").unwrap();
    let config = load_config(matches.get_one::<String>("config"));
    let highlighter = Highlighter::from_config(config).unwrap_or_else(|e| fail(e));

    let source = read_source(path);
    let language = language_for(matches, path);
    if !highlighter.store().contains(&language) {
        eprintln!("Warning: unknown language '{}', printing escaped text", language);
    }
    println!("{}", highlighter.highlight_language(&source, &language));
}

/// Handle the tokens command
fn handle_tokens_command(matches: &ArgMatches) {
    let path = matches.get_one::<String>("path").unwrap();
    let highlighter = Highlighter::new().unwrap_or_else(|e| fail(e));

    let source = read_source(path);
    let language = language_for(matches, path);
    let Some(tokens) = highlighter.tokenize(&source, &language) else {
        fail(format!("unknown language '{}'", language));
    };
    match serde_json::to_string_pretty(&tokens) {
        Ok(json) => println!("{}", json),
        Err(e) => fail(e),
    }
}

/// Handle the languages command
fn handle_languages_command() {
    let highlighter = Highlighter::new().unwrap_or_else(|e| fail(e));
    println!("Available languages:\n");
    for language in highlighter.store().languages() {
        println!("  {}", language);
    }
}
