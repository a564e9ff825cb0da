use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use order_undo::cli::{handle_order_command, handle_undo_command, OrderCommands, UndoCommands};
use order_undo::config::{paths::UndoPaths, settings::Settings};
use order_undo::storage::Storage;

#[derive(Parser)]
#[command(
    name = "order-undo",
    version,
    about = "Bounded undo log for order updates and deletes",
    long_about = "order-undo records a snapshot of an order before every update or \
                  delete, keeps the most recent snapshots, and lets an operator \
                  reverse the latest mutation."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Order management commands
    #[command(subcommand)]
    Order(OrderCommands),

    /// Undo log administration
    #[command(subcommand)]
    Undo(UndoCommands),

    /// Initialize the data directory and default settings
    Init,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = UndoPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    init_tracing(&settings.log_level);

    let storage = Storage::new(paths.clone())?;

    match cli.command {
        Some(Commands::Order(cmd)) => {
            handle_order_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Undo(cmd)) => {
            handle_undo_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Init) => {
            println!("Initializing order-undo at: {}", paths.base_dir().display());
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!(
                "Up to {} backups will be kept.",
                settings.retention.max_depth
            );
        }
        Some(Commands::Config) => {
            println!("order-undo Configuration");
            println!("========================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Orders file:      {}", paths.orders_file().display());
            println!("Backups file:     {}", paths.backups_file().display());
            println!("Audit log:        {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Max depth: {}", settings.retention.max_depth);
            println!("  Log name:  {}", settings.log_name);
            println!("  Log level: {}", settings.log_level);
        }
        None => {
            println!("order-undo - bounded undo log for orders");
            println!();
            println!("Run 'order-undo --help' for usage information.");
        }
    }

    Ok(())
}

/// Log to stderr, honouring `RUST_LOG` before the configured level
fn init_tracing(default_level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
