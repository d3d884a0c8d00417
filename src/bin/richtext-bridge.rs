use clap::{Parser, Subcommand, ValueEnum};
use richtext_bridge::convert::{
    bluesky_to_editor, editor_to_bluesky, editor_to_leaflet, editor_to_mdast,
    editor_to_plain_text, leaflet_to_editor, parse_editor,
};
use richtext_bridge::{ConvertConfig, Error, Options, split_at};
use serde::Serialize;
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file with conversion options (`bracketFirstHeading`, ...)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Split documents into a thread at top-level nodes of this type
    #[arg(long, global = true, value_name = "TYPE")]
    split_at: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lower an editor document to mdast trees
    Lower { file: Option<PathBuf> },
    /// Flatten an editor document to plain text
    Text { file: Option<PathBuf> },
    /// Convert an editor document to Bluesky post records
    Bluesky { file: Option<PathBuf> },
    /// Convert an editor document to Leaflet blocks
    Leaflet { file: Option<PathBuf> },
    /// Read a platform record back into an editor document
    Read {
        #[arg(long, value_enum)]
        from: Platform,
        file: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Platform {
    Bluesky,
    Leaflet,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    let options = options(cli)?;
    match &cli.command {
        Commands::Lower { file } => {
            let doc = parse_editor(read_json(file.as_deref())?)?;
            print_json(&editor_to_mdast(&doc, &options)?)
        }
        Commands::Text { file } => {
            let doc = parse_editor(read_json(file.as_deref())?)?;
            let texts = editor_to_plain_text(&doc, &options)?;
            println!("{}", texts.join("\n\n---\n\n"));
            Ok(())
        }
        Commands::Bluesky { file } => {
            let doc = parse_editor(read_json(file.as_deref())?)?;
            print_json(&editor_to_bluesky(&doc, &options)?)
        }
        Commands::Leaflet { file } => {
            let doc = parse_editor(read_json(file.as_deref())?)?;
            print_json(&editor_to_leaflet(&doc, &options)?)
        }
        Commands::Read { from, file } => {
            let record = read_json(file.as_deref())?;
            let doc = match from {
                Platform::Bluesky => bluesky_to_editor(record, &options)?,
                Platform::Leaflet => leaflet_to_editor(record)?,
            };
            print_json(&doc)
        }
    }
}

fn options(cli: &Cli) -> Result<Options, Error> {
    let config = match &cli.config {
        Some(path) => ConvertConfig::from_json(&read_text(Some(path.as_path()))?)?,
        None => ConvertConfig::default(),
    };
    let mut options = Options::new(config);
    if let Some(node_type) = &cli.split_at {
        options = options.with_transform(split_at(node_type.as_str()));
    }
    Ok(options)
}

fn read_text(path: Option<&Path>) -> Result<String, Error> {
    let text = match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).map(|_| buf)
        }
    };
    text.map_err(|source| Error::Read {
        path: path.map_or_else(|| "stdin".to_string(), |path| path.display().to_string()),
        source,
    })
}

fn read_json(path: Option<&Path>) -> Result<Value, Error> {
    Ok(serde_json::from_str(&read_text(path)?)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
