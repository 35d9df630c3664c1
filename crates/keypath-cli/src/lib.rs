//! `keypath`: read and edit a JSON document by keypath.
//!
//! Provides the core logic used by the binary entry point. The document
//! comes in as a JSON string and the result goes out as pretty-printed JSON:
//! - `keypath get <keypath>`
//! - `keypath set <keypath> <json-value>`
//! - `keypath delete <keypath>` (alias `del`)
//! - `keypath extend <keypath> <json-value>`

use clap::{Args as ClapArgs, Parser, Subcommand};
use keypath::{KeyPath, KeyPathError, TreeValue};

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum CliError {
    Json(serde_json::Error),
    KeyPath(KeyPathError),
    NotFound(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Json(e)     => write!(f, "invalid JSON: {e}"),
            CliError::KeyPath(e)  => write!(f, "{e}"),
            CliError::NotFound(p) => write!(f, "not found: `{p}`"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self { CliError::Json(e) }
}

impl From<KeyPathError> for CliError {
    fn from(e: KeyPathError) -> Self { CliError::KeyPath(e) }
}

// ── Arguments ─────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "keypath",
    about = "Read or edit the JSON document on stdin by dotted keypath",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    /// Print the value at a keypath
    Get(PathArgs),
    /// Replace the value at a keypath; prints the new document
    Set(ValueArgs),
    /// Remove the key or list element at a keypath; prints the new document
    #[command(visible_alias = "del")]
    Delete(PathArgs),
    /// Append to a list or overlay a map at a keypath; prints the new document
    Extend(ValueArgs),
}

#[derive(ClapArgs, Debug, Clone, PartialEq, Eq)]
pub struct PathArgs {
    /// Dotted keypath, e.g. items.id=2.name (empty for the whole document)
    #[arg(allow_hyphen_values = true)]
    pub key_path: String,
}

#[derive(ClapArgs, Debug, Clone, PartialEq, Eq)]
pub struct ValueArgs {
    /// Dotted keypath, e.g. items.id=2.name (empty for the whole document)
    #[arg(allow_hyphen_values = true)]
    pub key_path: String,
    /// Value as raw JSON (e.g., 123, true, "str", {"a":1})
    #[arg(allow_hyphen_values = true)]
    pub value: String,
}

impl Cmd {
    pub fn key_path(&self) -> &str {
        match self {
            Cmd::Get(args) | Cmd::Delete(args) => &args.key_path,
            Cmd::Set(args) | Cmd::Extend(args) => &args.key_path,
        }
    }
}

// ── Execution ─────────────────────────────────────────────────────────────

/// Run a command against a document.
///
/// Returns the selected value for `get`, or the whole new document for the
/// editing commands.
pub fn run(cmd: &Cmd, doc_json: &str) -> Result<String, CliError> {
    let path = KeyPath::parse(cmd.key_path())?;
    let doc: TreeValue = serde_json::from_str(doc_json)?;
    tracing::debug!(command = ?cmd, path = %path, "running keypath command");

    let out = match cmd {
        Cmd::Get(args) => match keypath::get(&doc, &path)? {
            Some(found) => found.clone(),
            None => return Err(CliError::NotFound(args.key_path.clone())),
        },
        Cmd::Set(args) => {
            let value: TreeValue = serde_json::from_str(&args.value)?;
            keypath::set(&doc, &path, value)?
        }
        Cmd::Delete(_) => keypath::delete(&doc, &path)?,
        Cmd::Extend(args) => {
            let patch: TreeValue = serde_json::from_str(&args.value)?;
            keypath::extend(&doc, &path, patch)?
        }
    };
    Ok(serde_json::to_string_pretty(&out)?)
}

// ── Tests ─────────────────────────────────────────────────────────────────
