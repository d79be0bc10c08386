//! FSC-008: CLI subcommands — generate, check, hash.

use crate::core::types::{ArtifactPaths, SecretKey, VerifierState};
use crate::core::{database, parser};
use crate::error::FscError;
use crate::tripwire::{hasher, verifier};
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

/// Settings file read when `--settings` is not given, if it exists.
pub const DEFAULT_SETTINGS_PATH: &str = "fscheck.yaml";

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// YAML settings file naming the artifact paths
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Target list (one quoted path per line)
    #[arg(long, global = true)]
    pub targets: Option<PathBuf>,

    /// Digest database location
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// Auth tag location
    #[arg(long, global = true)]
    pub auth_tag: Option<PathBuf>,

    /// Log level when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fingerprint every target and seal the digest database
    Generate {
        /// Secret key for the database auth tag
        #[arg(env = "FSCHECK_KEY", hide_env_values = true)]
        key: SecretKey,
    },

    /// Authenticate the digest database, then re-check every file
    Check {
        /// Secret key for the database auth tag
        #[arg(env = "FSCHECK_KEY", hide_env_values = true)]
        key: SecretKey,

        /// Exit non-zero if any file is changed or unreadable (for CI/cron)
        #[arg(long)]
        tripwire: bool,

        /// Print the report as JSON instead of one line per file
        #[arg(long)]
        json: bool,
    },

    /// Print the fingerprint of a single file
    Hash {
        /// File to fingerprint
        path: PathBuf,
    },
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands, global: &GlobalArgs) -> Result<(), FscError> {
    match cmd {
        Commands::Generate { key } => {
            let paths = resolve_paths(global)?;
            cmd_generate(&paths, &key)
        }
        Commands::Check {
            key,
            tripwire,
            json,
        } => {
            let paths = resolve_paths(global)?;
            cmd_check(&paths, &key, tripwire, json)
        }
        Commands::Hash { path } => cmd_hash(&path),
    }
}

/// Settings file (explicit, or the default if present), then flag overrides.
pub fn resolve_paths(global: &GlobalArgs) -> Result<ArtifactPaths, FscError> {
    let mut paths = match &global.settings {
        Some(file) => parser::parse_settings_file(file)?,
        None if Path::new(DEFAULT_SETTINGS_PATH).exists() => {
            parser::parse_settings_file(Path::new(DEFAULT_SETTINGS_PATH))?
        }
        None => ArtifactPaths::default(),
    };

    if let Some(p) = &global.targets {
        paths.targets.clone_from(p);
    }
    if let Some(p) = &global.database {
        paths.database.clone_from(p);
    }
    if let Some(p) = &global.auth_tag {
        paths.auth_tag.clone_from(p);
    }

    let errors = parser::validate_settings(&paths);
    if errors.is_empty() {
        return Ok(paths);
    }
    for e in &errors {
        eprintln!("  ERROR: {}", e);
    }
    Err(FscError::InvalidSettings(errors.len()))
}

fn cmd_generate(paths: &ArtifactPaths, key: &SecretKey) -> Result<(), FscError> {
    println!("writing file hashes to {} ...", paths.database.display());
    let summary = database::generate(paths, key)?;
    println!("generating db hash in {} ...", paths.auth_tag.display());
    println!("generation complete! ({} file(s))", summary.files);
    Ok(())
}

fn cmd_check(
    paths: &ArtifactPaths,
    key: &SecretKey,
    tripwire_mode: bool,
    json: bool,
) -> Result<(), FscError> {
    let mut v = verifier::Verifier::new(paths, key);
    let report = v.run_with(|entry| {
        if !json {
            println!("{}", entry);
        }
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if report.state == VerifierState::Aborted {
        return Err(FscError::AuthenticationFailed {
            database: paths.database.clone(),
            auth_tag: paths.auth_tag.clone(),
        });
    }

    let problems = report.problems();
    tracing::info!(
        files = report.entries.len(),
        problems,
        "check complete"
    );
    if problems > 0 && tripwire_mode {
        return Err(FscError::ChangesDetected(problems));
    }
    Ok(())
}

fn cmd_hash(path: &Path) -> Result<(), FscError> {
    let fp = hasher::digest(path)?;
    println!("{}", fp);
    Ok(())
}
