// src/main.rs
// =============================================================================
// Entry point of the devicetype-fetch CLI.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging to stderr
// 3. Open the chosen source (GitHub or local clone)
// 4. Run the subcommand and print its result
// 5. Exit with 0 on success, 2 on any error
// =============================================================================

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, SourceArgs};
use devicetype_fetch::{open_source, select_all, DeviceTypeSource, FileContents, Tree};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so stdout stays clean for --json output.
fn init_logging(verbose: bool) {
    let default = if verbose { "devicetype_fetch=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Tree { source, json } => {
            let source = open(&source).await?;
            handle_tree(source.as_ref(), json).await
        }
        Commands::Files {
            source,
            select,
            all,
            json,
        } => {
            let source = open(&source).await?;
            let selection = if all {
                select_all(&source.enumerate_tree().await?)
            } else {
                cli::to_selection(&select)
            };
            let files = source.fetch_files(&selection).await?;
            print_files(&files, json)
        }
    }
}

async fn open(args: &SourceArgs) -> Result<Box<dyn DeviceTypeSource>> {
    let config = args.to_config()?;
    Ok(open_source(&config, !args.skip_sync).await?)
}

async fn handle_tree(source: &dyn DeviceTypeSource, json: bool) -> Result<()> {
    let tree = source.enumerate_tree().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else {
        print_tree(&tree);
    }
    Ok(())
}

// One row per model, then a summary line.
fn print_tree(tree: &Tree) {
    println!("{:<30} {:<50} {:<40}", "VENDOR", "MODEL", "SHA");
    println!("{}", "=".repeat(122));

    for (vendor, models) in tree {
        for (model, record) in models {
            println!("{:<30} {:<50} {:<40}", vendor, model, record.sha);
        }
    }

    let model_count: usize = tree.values().map(|models| models.len()).sum();
    println!();
    println!("{} vendor(s), {} model(s)", tree.len(), model_count);
}

fn print_files(files: &FileContents, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(files)?);
        return Ok(());
    }

    for (sha, text) in files {
        println!("--- {}", sha);
        print!("{}", text);
        if !text.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}
