//! Stockpile CLI
//!
//! One-shot commands against the inventory file, or the interactive menu.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use stockpile::console::validate;
use stockpile::{
    Config, Console, Format, MalformedLinePolicy, Record, SaveFailurePolicy, Store, WriteMode,
};
use tracing_subscriber::{fmt, EnvFilter};

/// Stockpile
#[derive(Parser, Debug)]
#[command(name = "stockpile")]
#[command(about = "Single-user inventory manager")]
#[command(version)]
struct Args {
    /// Backing file (defaults to inventory.json or inventory.txt by format)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Backing file format: json or delimited
    #[arg(long, default_value = "json")]
    format: Format,

    /// What to do when a save fails: log or propagate (default depends on format)
    #[arg(long)]
    on_save_failure: Option<SaveFailurePolicy>,

    /// How saves replace the file: direct or atomic (default depends on format)
    #[arg(long)]
    write_mode: Option<WriteMode>,

    /// What loading does with a malformed delimited line: skip or stop
    #[arg(long, default_value = "skip")]
    malformed_lines: MalformedLinePolicy,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add a product
    Add {
        id: String,
        name: String,
        quantity: String,
        price: String,
    },

    /// Remove a product
    Remove { id: String },

    /// Change quantity and/or price of a product
    Update {
        id: String,

        /// New quantity
        #[arg(short, long)]
        quantity: Option<String>,

        /// New price
        #[arg(short, long)]
        price: Option<String>,
    },

    /// Show one product by ID
    Show { id: String },

    /// Search products by name (case-insensitive substring)
    Search { term: String },

    /// List all products
    List,

    /// Interactive menu (the default)
    Shell,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut builder = Config::builder()
        .format(args.format)
        .on_malformed_line(args.malformed_lines);
    if let Some(path) = args.file {
        builder = builder.backing_path(path);
    }
    if let Some(policy) = args.on_save_failure {
        builder = builder.on_save_failure(policy);
    }
    if let Some(mode) = args.write_mode {
        builder = builder.write_mode(mode);
    }
    let config = builder.build();

    tracing::debug!("Stockpile v{} using {}", stockpile::VERSION, config.backing_path.display());

    let mut store = Store::open(config);

    match run(&mut store, args.command.unwrap_or(Commands::Shell)) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Execute one command; `Ok(false)` means "not found" or "already exists"
fn run(store: &mut Store, command: Commands) -> stockpile::Result<bool> {
    match command {
        Commands::Add {
            id,
            name,
            quantity,
            price,
        } => {
            let record = Record::new(
                validate::parse_id(&id)?,
                validate::parse_name(&name)?,
                validate::parse_quantity(&quantity)?,
                validate::parse_price(&price)?,
            );
            let added = store.add(record)?;
            if added {
                println!("Product added.");
            } else {
                eprintln!("Error: a product with ID '{}' already exists", id.trim());
            }
            Ok(added)
        }
        Commands::Remove { id } => {
            let removed = store.remove(id.trim())?;
            if removed {
                println!("Product removed.");
            } else {
                eprintln!("Error: no product with ID '{}'", id.trim());
            }
            Ok(removed)
        }
        Commands::Update {
            id,
            quantity,
            price,
        } => {
            let quantity = quantity
                .as_deref()
                .map(validate::parse_quantity)
                .transpose()?;
            let price = price.as_deref().map(validate::parse_price).transpose()?;
            let updated = store.update(id.trim(), quantity, price)?;
            if updated {
                println!("Product updated.");
            } else {
                eprintln!("Error: no product with ID '{}'", id.trim());
            }
            Ok(updated)
        }
        Commands::Show { id } => match store.find_by_id(id.trim()) {
            Some(record) => {
                println!("{}", record);
                Ok(true)
            }
            None => {
                eprintln!("Error: no product with ID '{}'", id.trim());
                Ok(false)
            }
        },
        Commands::Search { term } => {
            for record in store.find_by_name(&term) {
                println!("{}", record);
            }
            Ok(true)
        }
        Commands::List => {
            let all = store.list_all();
            for record in &all {
                println!("{}", record);
            }
            println!("Total: {} product(s)", all.len());
            Ok(true)
        }
        Commands::Shell => {
            let stdin = io::stdin();
            Console::new(store).run(stdin.lock(), io::stdout())?;
            Ok(true)
        }
    }
}
