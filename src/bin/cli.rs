//! CLI for node-local bucket operations

use clap::{Parser, Subcommand};
use minivol::coordinator::{
    BucketCoordinator, BucketOptions, DeleteBucketOptions, HealOpts, MakeBucketOptions,
    DEFAULT_MAX_IN_FLIGHT,
};
use minivol::drive::{DriveRef, DriveRegistry, LocalDrive};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "minivol")]
#[command(about = "minivol bucket-volume coordinator CLI")]
#[command(version)]
struct Cli {
    /// Drive root directories, in registry order
    #[arg(long = "drive", value_name = "PATH")]
    drives: Vec<PathBuf>,

    /// TOML config file (drives given on the command line take priority)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a bucket on every drive
    Create {
        /// Bucket name
        bucket: String,

        /// Treat an already-existing volume as success
        #[arg(long)]
        force: bool,
    },

    /// Delete a bucket from every drive
    Delete {
        /// Bucket name
        bucket: String,

        /// Delete volumes even when they still hold objects
        #[arg(long)]
        force: bool,
    },

    /// Show a bucket's node-local info
    Stat {
        /// Bucket name
        bucket: String,

        /// Also consult the deleted-bucket markers
        #[arg(long)]
        deleted: bool,
    },

    /// List the buckets the drive set agrees on
    List {
        /// Include soft-deleted buckets
        #[arg(long)]
        deleted: bool,
    },

    /// Heal a bucket across the drive set
    Heal {
        /// Bucket name
        bucket: String,

        /// Report drive states without mutating anything
        #[arg(long)]
        dry_run: bool,

        /// Remove the bucket as dangling instead of repairing it
        #[arg(long)]
        remove: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Drives from the command line take priority over the config file.
    let mut drives = cli.drives.clone();
    let mut max_in_flight = DEFAULT_MAX_IN_FLIGHT;
    if let Some(path) = &cli.config {
        let config = minivol::Config::from_file(path)?;
        if drives.is_empty() {
            drives = config.drives.clone();
        }
        max_in_flight = config.max_in_flight;
    }
    anyhow::ensure!(
        !drives.is_empty(),
        "no drives given; use --drive or --config"
    );

    let refs: Vec<DriveRef> = drives
        .into_iter()
        .map(|root| DriveRef::present(LocalDrive::new(root)))
        .collect();
    let coordinator = BucketCoordinator::new(Arc::new(DriveRegistry::from_refs(refs)))
        .with_max_in_flight(max_in_flight);

    match cli.command {
        Commands::Create { bucket, force } => {
            coordinator
                .create_bucket(&bucket, &MakeBucketOptions { force_create: force })
                .await?;
            println!("Created bucket {}", bucket);
        }

        Commands::Delete { bucket, force } => {
            coordinator
                .delete_bucket(&bucket, &DeleteBucketOptions { force })
                .await?;
            println!("Deleted bucket {}", bucket);
        }

        Commands::Stat { bucket, deleted } => {
            let info = coordinator
                .get_bucket_info(&bucket, &BucketOptions { deleted })
                .await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::List { deleted } => {
            let buckets = coordinator.list_buckets(&BucketOptions { deleted }).await?;
            println!("{}", serde_json::to_string_pretty(&buckets)?);
        }

        Commands::Heal {
            bucket,
            dry_run,
            remove,
        } => {
            let report = coordinator
                .heal_bucket(&bucket, &HealOpts { dry_run, remove })
                .await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
