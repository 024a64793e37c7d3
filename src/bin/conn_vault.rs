// src/bin/conn_vault.rs
//! conn-vault: export/import encrypted connection files and poke at Fernet tokens

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use connection_vault::db::open_store_db;
use connection_vault::secrets::{keys, load_key, SecretStore, SqliteSecretStore};
use connection_vault::workflow::{export_to_path, import_from_path, RecordOutcome};
use connection_vault::{crypto, CollisionStrategy, CoreError, FernetKey};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "conn-vault", version, about)]
struct Cli {
    /// Connection store database
    #[arg(long, global = true, env = "CONNVAULT_STORE_DB")]
    store: Option<PathBuf>,

    /// Secrets database holding key material
    #[arg(long, global = true, env = "CONNVAULT_SECRETS_DB")]
    secrets: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a fresh random key
    Genkey {
        /// Also store it as the default transport file key
        #[arg(long)]
        save: bool,
    },
    /// Check that a key string decodes to 32 bytes
    CheckKey { key: String },
    /// Encrypt one string
    Encrypt {
        #[arg(long, env = "CONNVAULT_FILE_KEY", hide_env_values = true)]
        key: Option<String>,
        text: String,
    },
    /// Decrypt one token
    Decrypt {
        #[arg(long, env = "CONNVAULT_FILE_KEY", hide_env_values = true)]
        key: Option<String>,
        token: String,
    },
    /// Show a token's header without decrypting it
    Inspect { token: String },
    /// Write selected connections (default: all) to a transport file
    Export {
        #[arg(long)]
        out: PathBuf,
        /// Prepended to each exported conn_id (at most 10 characters)
        #[arg(long)]
        prefix: Option<String>,
        #[arg(long = "id")]
        ids: Vec<String>,
        #[arg(long, env = "CONNVAULT_FILE_KEY", hide_env_values = true)]
        key: Option<String>,
        /// Key the source store encrypts password/extra with
        #[arg(long, env = "CONNVAULT_STORE_KEY", hide_env_values = true)]
        store_key: Option<String>,
    },
    /// Read a transport file into the store
    Import {
        #[arg(long = "in")]
        input: PathBuf,
        /// stop | skip | overwrite
        #[arg(long)]
        strategy: Option<CollisionStrategy>,
        #[arg(long, env = "CONNVAULT_FILE_KEY", hide_env_values = true)]
        key: Option<String>,
        /// Key the target store encrypts password/extra with
        #[arg(long, env = "CONNVAULT_STORE_KEY", hide_env_values = true)]
        store_key: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = connection_vault::load_config();

    let secrets_path = cli
        .secrets
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.paths.secrets_db));
    let store_path = cli
        .store
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.paths.store_db));

    match cli.command {
        Command::Genkey { save } => {
            let key = FernetKey::generate();
            if save {
                let secrets = open_secrets(&secrets_path)?;
                secrets.set(keys::TRANSPORT_FILE_KEY, &key.to_base64())?;
                info!("saved as default transport file key");
            }
            println!("{}", key.to_base64());
        }
        Command::CheckKey { key } => {
            if !crypto::is_valid_key(&key) {
                bail!("key is structurally invalid: it must be Base64 for exactly 32 bytes");
            }
            println!("valid");
        }
        Command::Encrypt { key, text } => {
            let key = resolve_key(key, &secrets_path)?;
            println!("{}", crypto::encrypt_with_key(&text, &key).map_err(explain)?);
        }
        Command::Decrypt { key, token } => {
            let key = resolve_key(key, &secrets_path)?;
            println!("{}", crypto::decrypt_with_key(&token, &key).map_err(explain)?);
        }
        Command::Inspect { token } => {
            let info = crypto::inspect(&token).map_err(explain)?;
            println!("version:     {:#04x}", info.version);
            match info.issued_at {
                Some(at) => println!("issued at:   {} ({})", at.to_rfc3339(), info.timestamp),
                None => println!("issued at:   {} (out of range)", info.timestamp),
            }
            println!("iv:          {}", hex::encode(info.iv));
            println!("ciphertext:  {} bytes", info.ciphertext_len);
            println!("(header only; not authenticated)");
        }
        Command::Export {
            out,
            prefix,
            ids,
            key,
            store_key,
        } => {
            let key = resolve_key(key, &secrets_path)?;
            let store_key = resolve_store_key(store_key, &secrets_path)?;
            let prefix = prefix.or_else(|| config.transport.conn_id_prefix.clone());
            let conn = open_store_db(&store_path)
                .with_context(|| format!("opening store {}", store_path.display()))?;
            let report = export_to_path(
                &conn,
                &ids,
                &key,
                store_key.as_ref(),
                prefix.as_deref(),
                &out,
            )
            .map_err(explain)?;
            for result in &report.results {
                println!("exported  {}", result.conn_id);
            }
            info!(count = report.results.len(), path = %out.display(), "export complete");
        }
        Command::Import {
            input,
            strategy,
            key,
            store_key,
        } => {
            let key = resolve_key(key, &secrets_path)?;
            let store_key = resolve_store_key(store_key, &secrets_path)?;
            let strategy = strategy.unwrap_or(config.transport.collision_strategy);
            let mut conn = open_store_db(&store_path)
                .with_context(|| format!("opening store {}", store_path.display()))?;
            let report = import_from_path(&mut conn, &input, &key, store_key.as_ref(), strategy)
                .map_err(explain)?;
            for result in &report.results {
                let label = match &result.outcome {
                    RecordOutcome::Inserted => "inserted".to_string(),
                    RecordOutcome::Updated => "updated".to_string(),
                    RecordOutcome::Exported => "exported".to_string(),
                    RecordOutcome::Rejected(reason) => format!("rejected ({reason:?})"),
                };
                println!("{label:<22}{}", result.conn_id);
            }
            if !report.committed {
                warn!("nothing imported: conn_id collisions with strategy 'stop'");
                bail!("import stopped; rerun with --strategy skip or overwrite");
            }
        }
    }

    Ok(())
}

fn open_secrets(path: &Path) -> Result<SqliteSecretStore> {
    SqliteSecretStore::open(path).with_context(|| format!("opening secrets {}", path.display()))
}

/// `--key`/env first, then the secrets database, then an interactive prompt.
fn resolve_key(explicit: Option<String>, secrets_path: &Path) -> Result<FernetKey> {
    if let Some(key) = explicit {
        return FernetKey::parse(&key).map_err(explain);
    }
    if secrets_path.exists() {
        match load_key(&open_secrets(secrets_path)?, keys::TRANSPORT_FILE_KEY) {
            Ok(key) => return Ok(key),
            Err(CoreError::MissingSecret(_)) => {}
            Err(e) => return Err(explain(e)),
        }
    }
    let entered = rpassword::prompt_password("Transport file key: ")?;
    FernetKey::parse(entered.trim()).map_err(explain)
}

/// `--store-key`/env first, then the secrets database. No key means stored
/// values are copied as they are.
fn resolve_store_key(explicit: Option<String>, secrets_path: &Path) -> Result<Option<FernetKey>> {
    if let Some(key) = explicit {
        return FernetKey::parse(&key).map(Some).map_err(explain);
    }
    if !secrets_path.exists() {
        return Ok(None);
    }
    match load_key(&open_secrets(secrets_path)?, keys::STORE_FERNET_KEY) {
        Ok(key) => Ok(Some(key)),
        Err(CoreError::MissingSecret(_)) => Ok(None),
        Err(e) => Err(explain(e)),
    }
}

/// Turn codec errors into the two messages users need to tell apart.
fn explain(err: CoreError) -> anyhow::Error {
    if err.is_invalid_key() {
        anyhow::Error::new(err).context("the key is malformed; check what was pasted")
    } else if err.is_authentication_failure() {
        anyhow::Error::new(err).context("wrong key, or the data was modified")
    } else {
        anyhow::Error::new(err)
    }
}
