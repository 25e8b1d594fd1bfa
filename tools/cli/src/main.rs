//! ChainVault CLI - Command line interface for vault operations.
//!
//! Stores credentials and documents encrypted under a wallet identity,
//! lists and filters them, and removes ledger entries.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use zeroize::Zeroizing;

use chainvault_common::{Error, Identity, SensitiveBytes};
use chainvault_crypto::KdfParams;
use chainvault_vault::{
    KeyMode, KeySource, KindFilter, RecordQuery, RetrievedItem, Secret, VaultConfig,
    VaultService,
};

#[derive(Parser)]
#[command(name = "chainvault")]
#[command(about = "ChainVault - Wallet-keyed encrypted secrets")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Path to the vault configuration file.
    #[arg(short, long, default_value = "chainvault.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a configuration keeping store and ledger in a local directory.
    Init {
        /// Data directory.
        #[arg(short, long)]
        dir: PathBuf,

        /// Mix a passphrase into key derivation.
        #[arg(long)]
        passphrase: bool,

        /// KDF strength for passphrase mode: "interactive", "moderate", or "sensitive".
        #[arg(short, long, default_value = "moderate")]
        strength: String,
    },

    /// Print the login message for the identity's current nonce.
    Challenge {
        #[arg(short, long)]
        identity: String,
    },

    /// Store a login credential.
    StoreCredential {
        #[arg(short, long)]
        identity: String,

        /// Service the login belongs to (e.g. "email").
        #[arg(short, long)]
        account_type: String,

        #[arg(short, long)]
        username: String,
    },

    /// Store a file.
    StoreDocument {
        #[arg(short, long)]
        identity: String,

        /// File to store.
        #[arg(short, long)]
        file: PathBuf,

        /// MIME type recorded with the file.
        #[arg(short, long, default_value = "")]
        mime_type: String,
    },

    /// List stored secrets.
    List {
        #[arg(short, long)]
        identity: String,

        /// Case-insensitive text to search for.
        #[arg(short, long)]
        search: Option<String>,

        /// Only records stored on this UTC day (YYYY-MM-DD).
        #[arg(short, long)]
        date: Option<String>,

        /// Only "credential" or "document" records.
        #[arg(short, long)]
        kind: Option<String>,

        /// Show passwords.
        #[arg(long)]
        reveal: bool,
    },

    /// Write a stored document to a file.
    Extract {
        #[arg(short, long)]
        identity: String,

        /// Record index as shown by `list`.
        #[arg(short = 'n', long)]
        index: u64,

        /// Destination file path.
        #[arg(short, long)]
        dest: PathBuf,
    },

    /// Remove a record from the ledger.
    Delete {
        #[arg(short, long)]
        identity: String,

        /// Record index as shown by `list`.
        #[arg(short = 'n', long)]
        index: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = cli.config;
    match cli.command {
        Commands::Init {
            dir,
            passphrase,
            strength,
        } => cmd_init(&config, &dir, passphrase, &strength).await,

        Commands::Challenge { identity } => cmd_challenge(&config, &identity).await,

        Commands::StoreCredential {
            identity,
            account_type,
            username,
        } => cmd_store_credential(&config, &identity, &account_type, &username).await,

        Commands::StoreDocument {
            identity,
            file,
            mime_type,
        } => cmd_store_document(&config, &identity, &file, &mime_type).await,

        Commands::List {
            identity,
            search,
            date,
            kind,
            reveal,
        } => cmd_list(&config, &identity, search, date, kind, reveal).await,

        Commands::Extract {
            identity,
            index,
            dest,
        } => cmd_extract(&config, &identity, index, &dest).await,

        Commands::Delete { identity, index } => cmd_delete(&config, &identity, index).await,
    }
}

/// Prompt for a secret without echoing it.
fn prompt_secret(prompt: &str) -> Result<Zeroizing<String>> {
    let secret = rpassword::prompt_password(prompt).context("Failed to read input")?;
    Ok(Zeroizing::new(secret))
}

fn parse_identity(identity: &str) -> Result<Identity> {
    Identity::new(identity).context("Invalid identity")
}

/// Load the configuration and assemble a service acting for `identity`.
async fn open_service(config_path: &Path, identity: &Identity) -> Result<VaultService> {
    let config = VaultConfig::load(config_path)
        .await
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;

    let keys = match &config.key_mode {
        KeyMode::Identity => KeySource::Identity,
        KeyMode::Passphrase { kdf } => {
            let passphrase = prompt_secret("Enter passphrase: ")?;
            KeySource::Passphrase {
                passphrase: SensitiveBytes::new(passphrase.as_bytes().to_vec()),
                params: kdf.clone(),
            }
        }
    };

    VaultService::from_config(&config, keys, Some(identity.clone()))
        .context("Failed to open vault")
}

/// Attach context to a store failure, calling out blobs left unreferenced.
fn store_failure(err: Error, what: &str) -> anyhow::Error {
    if let Error::Orphaned { address, .. } = &err {
        warn!(address = %address, "Blob uploaded but not referenced");
        let message = format!(
            "Failed to store {}: upload {} succeeded but the ledger entry was not written",
            what, address
        );
        return anyhow::Error::new(err).context(message);
    }
    anyhow::Error::new(err).context(format!("Failed to store {}", what))
}

/// Write a new configuration file.
async fn cmd_init(config_path: &Path, dir: &Path, passphrase: bool, strength: &str) -> Result<()> {
    info!("Initializing vault in {}", dir.display());

    if config_path.exists() {
        anyhow::bail!("Config already exists: {}", config_path.display());
    }

    let mut config = VaultConfig::local(dir);
    if passphrase {
        let kdf = KdfParams::from_preset(strength).context("Invalid strength")?;
        config = config.with_key_mode(KeyMode::Passphrase { kdf });
    }

    config
        .save(config_path)
        .await
        .context("Failed to write config")?;

    println!("Vault initialized!");
    println!("  Config: {}", config_path.display());
    println!("  Data: {}", dir.display());
    if passphrase {
        println!("  Key mode: passphrase ({})", strength);
    } else {
        println!("  Key mode: identity");
    }

    Ok(())
}

/// Print the login challenge.
async fn cmd_challenge(config_path: &Path, identity: &str) -> Result<()> {
    let identity = parse_identity(identity)?;
    let service = open_service(config_path, &identity).await?;

    let challenge = service
        .challenge(&identity)
        .await
        .context("Failed to read nonce")?;

    println!("{}", challenge.message);
    Ok(())
}

/// Store a credential; the password is prompted.
async fn cmd_store_credential(
    config_path: &Path,
    identity: &str,
    account_type: &str,
    username: &str,
) -> Result<()> {
    let identity = parse_identity(identity)?;
    let service = open_service(config_path, &identity).await?;

    let password = prompt_secret("Enter password to store: ")?;
    let secret = Secret::credential(account_type, username, password.as_str());

    let receipt = service
        .store(&identity, &secret)
        .await
        .map_err(|e| store_failure(e, "credential"))?;

    println!("Credential stored at index {}", receipt.index);
    println!("  Address: {}", receipt.content_address);
    Ok(())
}

/// Store a file.
async fn cmd_store_document(
    config_path: &Path,
    identity: &str,
    file: &Path,
    mime_type: &str,
) -> Result<()> {
    let identity = parse_identity(identity)?;

    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .context("Source path has no file name")?;
    let content = tokio::fs::read(file)
        .await
        .context("Failed to read source file")?;
    let size = content.len();

    let service = open_service(config_path, &identity).await?;
    let secret = Secret::document(file_name.clone(), mime_type, content);

    let receipt = service
        .store(&identity, &secret)
        .await
        .map_err(|e| store_failure(e, "document"))?;

    println!(
        "Document stored at index {}: {} ({} bytes)",
        receipt.index, file_name, size
    );
    println!("  Address: {}", receipt.content_address);
    Ok(())
}

fn describe(item: &RetrievedItem, reveal: bool) -> String {
    match &item.result {
        Ok(Secret::Credential(cred)) => {
            let password = if reveal {
                cred.password.as_str()
            } else {
                "********"
            };
            format!(
                "[CRED] {} / {} / {}",
                cred.account_type, cred.username, password
            )
        }
        Ok(Secret::Document(doc)) => {
            let mime = if doc.mime_type.is_empty() {
                "unknown type"
            } else {
                doc.mime_type.as_str()
            };
            format!(
                "[DOC]  {} ({}, {} bytes)",
                doc.file_name,
                mime,
                doc.bytes.len()
            )
        }
        Err(err) => format!(
            "[{}] unavailable: {}",
            item.record.kind.label(),
            err
        ),
    }
}

/// List secrets matching the filters.
async fn cmd_list(
    config_path: &Path,
    identity: &str,
    search: Option<String>,
    date: Option<String>,
    kind: Option<String>,
    reveal: bool,
) -> Result<()> {
    let identity = parse_identity(identity)?;

    let mut query = RecordQuery::new();
    if let Some(text) = search {
        query = query.with_text(text);
    }
    if let Some(date) = date {
        query = query.with_date_str(&date).context("Invalid --date")?;
    }
    if let Some(kind) = kind {
        let kind: KindFilter = kind.parse().context("Invalid --kind")?;
        query = query.with_kind(kind);
    }

    let service = open_service(config_path, &identity).await?;
    let listing = service
        .retrieve_all(&identity)
        .await
        .context("Failed to list records")?;

    let matches = query.apply(&listing);
    if matches.is_empty() {
        println!("No records found.");
        return Ok(());
    }

    for item in matches {
        let stored = item
            .record
            .stored_at()
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!("{:>4}  {}  {}", item.index, stored, describe(item, reveal));
    }

    let failures = listing.failures().count();
    if failures > 0 {
        warn!(failures, "Some records could not be retrieved");
    }

    Ok(())
}

/// Write a stored document to disk.
async fn cmd_extract(config_path: &Path, identity: &str, index: u64, dest: &Path) -> Result<()> {
    let identity = parse_identity(identity)?;
    let service = open_service(config_path, &identity).await?;

    let listing = service
        .retrieve_all(&identity)
        .await
        .context("Failed to list records")?;
    let item = listing
        .items
        .iter()
        .find(|item| item.index == index)
        .with_context(|| format!("No record at index {}", index))?;

    let doc = match &item.result {
        Ok(Secret::Document(doc)) => doc,
        Ok(Secret::Credential(_)) => anyhow::bail!("Record {} is a credential", index),
        Err(err) => anyhow::bail!("Record {} could not be retrieved: {}", index, err),
    };

    tokio::fs::write(dest, &doc.bytes)
        .await
        .context("Failed to write output file")?;

    println!(
        "Document extracted: {} -> {} ({} bytes)",
        doc.file_name,
        dest.display(),
        doc.bytes.len()
    );
    Ok(())
}

/// Remove a ledger record.
async fn cmd_delete(config_path: &Path, identity: &str, index: u64) -> Result<()> {
    let identity = parse_identity(identity)?;
    let service = open_service(config_path, &identity).await?;

    let remaining = service
        .delete_at(&identity, index)
        .await
        .with_context(|| format!("Failed to delete record {}", index))?;

    println!("Record {} deleted, {} remaining", index, remaining.len());
    Ok(())
}
