mod config;
mod output;

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use output::TextOptions;

/// Foldlog - render CI logs with folded sections, ANSI colors and error markers
#[derive(Parser, Debug)]
#[command(name = "foldlog")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log file to render (reads stdin when omitted)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// TOML file with fold rules and error patterns (built-in presets when omitted)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the render model as JSON
    #[arg(long)]
    json: bool,

    /// Use color class names instead of RGB values
    #[arg(long)]
    symbolic_colors: bool,

    /// Do not split URLs out of the text
    #[arg(long)]
    no_linkify: bool,

    /// Show the content of folds that start collapsed
    #[arg(long)]
    expand: bool,

    /// Only print rows with error matches
    #[arg(long)]
    errors_only: bool,

    /// Keep colors and decorations in text output
    #[arg(long)]
    color: bool,

    /// Log rendering details to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(io::stderr)
        .init();

    let result = run(args);

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

fn run(args: Args) -> Result<()> {
    let log = read_log(args.file.as_deref())?;

    let mut config = config::load(args.config.as_deref())?;
    if args.symbolic_colors {
        config.use_symbolic_colors = true;
    }
    if args.no_linkify {
        config.linkify = false;
    }

    let pipeline = config.compile().context("invalid configuration")?;
    let model = pipeline.render(log.as_str());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        output::write_json(&mut out, &model)?;
    } else {
        let options = TextOptions {
            expand: args.expand,
            errors_only: args.errors_only,
            color: args.color,
        };
        output::write_text(&mut out, &model, options)?;
        output::write_summary(&mut io::stderr(), &model)?;
    }
    out.flush()?;

    Ok(())
}

fn read_log(path: Option<&std::path::Path>) -> Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
        }
        None => {
            let mut log = String::new();
            io::stdin()
                .read_to_string(&mut log)
                .context("failed to read stdin")?;
            Ok(log)
        }
    }
}
