//! Memoria CLI
//!
//! Operator tool for inspecting and editing a Memoria data directory.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use memoria::namespace::MEMORY_NAMESPACES;
use memoria::{Config, Document, Durability, Result, StoreRegistry};
use tracing_subscriber::{fmt, EnvFilter};

/// Memoria CLI
#[derive(Parser, Debug)]
#[command(name = "memoria-cli")]
#[command(about = "Inspect and edit a Memoria document store")]
#[command(version)]
struct Args {
    /// Data directory (defaults to $DATA_DIR, then ./data)
    #[arg(short, long)]
    data_dir: Option<String>,

    /// Skip fsync on writes
    #[arg(long)]
    buffered: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List namespaces present on disk
    Namespaces,

    /// Create namespace directories (defaults to the memory namespaces)
    Init {
        /// Namespaces to create
        namespaces: Vec<String>,
    },

    /// List keys in a namespace
    List {
        namespace: String,
    },

    /// Print the document under a key
    Get {
        namespace: String,
        key: String,
    },

    /// Store a JSON document under a key
    Set {
        namespace: String,
        key: String,

        /// The document, as JSON
        value: String,
    },

    /// Append a JSON item to the sequence under a key
    Append {
        namespace: String,
        key: String,

        /// The item, as JSON
        item: String,
    },

    /// Delete a key
    Del {
        namespace: String,
        key: String,
    },

    /// Check every artifact in a namespace for corruption
    Verify {
        namespace: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,memoria=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing::debug!("Memoria CLI v{}", memoria::VERSION);
    tracing::debug!("Data directory: {}", config.data_dir.display());

    let registry = StoreRegistry::new(config);
    match run(&registry, args.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Environment first, then command-line overrides
fn build_config(args: &Args) -> Result<Config> {
    let mut config = Config::from_env()?;
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.into();
    }
    if args.buffered {
        config.durability = Durability::Buffered;
    }
    Ok(config)
}

async fn run(registry: &StoreRegistry, command: Commands) -> Result<()> {
    match command {
        Commands::Namespaces => {
            for namespace in registry.discover().await? {
                println!("{}", namespace);
            }
        }
        Commands::Init { namespaces } => {
            let names: Vec<&str> = if namespaces.is_empty() {
                MEMORY_NAMESPACES.to_vec()
            } else {
                namespaces.iter().map(String::as_str).collect()
            };
            for store in registry.open_all(&names).await? {
                println!("{}", store.root().display());
            }
        }
        Commands::List { namespace } => {
            let store = registry.open(&namespace).await?;
            for key in store.list().await? {
                println!("{}", key);
            }
        }
        Commands::Get { namespace, key } => {
            let store = registry.open(&namespace).await?;
            match store.get(&key).await? {
                Some(doc) => println!("{}", serde_json::to_string_pretty(&doc)?),
                None => tracing::info!("'{}/{}' not found", namespace, key),
            }
        }
        Commands::Set {
            namespace,
            key,
            value,
        } => {
            let store = registry.open(&namespace).await?;
            store.set(&key, parse_json(&value)?).await?;
        }
        Commands::Append {
            namespace,
            key,
            item,
        } => {
            let store = registry.open(&namespace).await?;
            let items = store.append(&key, parse_json(&item)?).await?;
            let len = items.as_array().map(Vec::len).unwrap_or_default();
            println!("{}", len);
        }
        Commands::Del { namespace, key } => {
            let store = registry.open(&namespace).await?;
            if !store.delete(&key).await? {
                tracing::info!("'{}/{}' did not exist", namespace, key);
            }
        }
        Commands::Verify { namespace } => {
            let store = registry.open(&namespace).await?;
            let report = store.verify().await?;
            for corrupt in &report.corrupt {
                println!("CORRUPT {}: {}", corrupt.key, corrupt.reason);
            }
            for unreadable in &report.unreadable {
                println!("UNREADABLE {}: {}", unreadable.key, unreadable.error);
            }
            println!(
                "{} artifacts, {} healthy, {} corrupt, {} unreadable",
                report.total(),
                report.healthy.len(),
                report.corrupt.len(),
                report.unreadable.len()
            );
        }
    }

    Ok(())
}

fn parse_json(text: &str) -> Result<Document> {
    Ok(serde_json::from_str(text)?)
}
