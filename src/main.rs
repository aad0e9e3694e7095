use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cardkeeper::cli::{handle_backup_command, BackupCommands};
use cardkeeper::config::{paths::KeeperPaths, settings::Settings};
use cardkeeper::storage::{BackupStore, Storage};

#[derive(Parser)]
#[command(
    name = "cardkeeper",
    version,
    about = "Desktop ID-card record manager: data engine and encrypted backup CLI",
    long_about = "cardkeeper manages the persisted data of the cardkeeper ID-card \
                  application: card-holder records, card templates, login \
                  credentials, and field definitions, with encrypted \
                  password-protected backups."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backup management commands
    #[command(subcommand)]
    Backup(BackupCommands),

    /// Initialize the data directory and default settings
    Init,

    /// Show record counts for all collections
    Status,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = KeeperPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    // Initialize storage
    let storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    match cli.command {
        Commands::Backup(cmd) => {
            handle_backup_command(&storage, &settings, &paths, cmd)?;
        }
        Commands::Init => {
            let mut settings = settings;
            settings.setup_completed = true;
            settings.save(&paths)?;
            storage.save_all()?;
            println!("Initialized cardkeeper in {}", paths.base_dir().display());
        }
        Commands::Status => {
            println!("Users:       {}", storage.all_users()?.len());
            println!("Templates:   {}", storage.all_templates()?.len());
            println!("Credentials: {}", storage.all_credentials()?.len());
            println!("Fields:      {}", storage.all_fields()?.len());
        }
        Commands::Config => {
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Backup directory: {}", paths.backup_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!(
                "Retention:        keep {} backups",
                settings.backup_retention.keep_count
            );
        }
    }

    Ok(())
}

fn init_tracing() {
    // Respect user-provided filters, default to warn to keep stdout clean.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
