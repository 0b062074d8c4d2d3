//! CLI commands.

use std::path::{Path, PathBuf};

use clap::Args;
use faceid_faceprint::{Account, FaceGate, IdentityId, NewIdentity};
use serde::Serialize;

use crate::config::{load_config, Config};
use crate::Cli;

/// Face input read from a file.
#[derive(Debug, PartialEq)]
pub enum FaceInput {
    /// An embedding given as a JSON array of floats.
    Vector(Vec<f32>),
    /// Bytes for the embedder (raw little-endian f32 for the built-in one).
    Image(Vec<u8>),
}

/// Reads `path` as a JSON float array if it ends in `.json`, as raw bytes otherwise.
pub fn read_face(path: &Path) -> anyhow::Result<FaceInput> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        let content = std::fs::read_to_string(path)?;
        Ok(FaceInput::Vector(serde_json::from_str(&content)?))
    } else {
        Ok(FaceInput::Image(std::fs::read(path)?))
    }
}

fn get_config(cli: &Cli) -> anyhow::Result<Config> {
    load_config(cli.config.as_deref())
}

fn open_gate(cli: &Cli) -> anyhow::Result<FaceGate> {
    get_config(cli)?.open_gate()
}

fn output<T: Serialize>(cli: &Cli, value: &T, text: impl FnOnce() -> String) -> anyhow::Result<()> {
    if cli.json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}

/// Enroll a new user.
#[derive(Args)]
pub struct RegisterCommand {
    /// Username for the new account
    #[arg(long)]
    username: String,

    /// Email for the new account
    #[arg(long)]
    email: String,

    /// Embedding file (.json float array, or raw little-endian f32)
    file: PathBuf,
}

#[derive(Serialize)]
struct Registered<'a> {
    identity: &'a IdentityId,
    username: &'a str,
}

impl RegisterCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let gate = open_gate(cli)?;
        let attrs = NewIdentity {
            username: self.username.clone(),
            email: self.email.clone(),
        };
        let id = match read_face(&self.file)? {
            FaceInput::Vector(v) => gate.register(&attrs, &v)?,
            FaceInput::Image(bytes) => gate.register_image(&attrs, &bytes)?,
        };
        output(
            cli,
            &Registered {
                identity: &id,
                username: &self.username,
            },
            || format!("registered {} as {}", self.username, id),
        )
    }
}

/// Identify a face.
#[derive(Args)]
pub struct LoginCommand {
    /// Embedding file (.json float array, or raw little-endian f32)
    file: PathBuf,
}

impl LoginCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let gate = open_gate(cli)?;
        let account = match read_face(&self.file)? {
            FaceInput::Vector(v) => gate.authenticate(&v)?,
            FaceInput::Image(bytes) => gate.authenticate_image(&bytes)?,
        };
        output(cli, &account, || format!("welcome, {}", account.username))
    }
}

/// List enrolled users.
#[derive(Args)]
pub struct ListCommand {}

impl ListCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let gate = open_gate(cli)?;
        let accounts: Vec<Account> = gate.accounts()?;
        let enrolled = gate.enrolled()?;
        output(cli, &accounts, || {
            let mut lines = vec![format!(
                "{} accounts, {} enrolled faces",
                accounts.len(),
                enrolled
            )];
            for a in &accounts {
                lines.push(format!(
                    "  {}  {}  <{}>  {}",
                    a.id, a.username, a.email, a.created_at
                ));
            }
            lines.join("\n")
        })
    }
}

/// Serve the HTTP API.
#[derive(Args)]
pub struct ServeCommand {
    /// Listen address (overrides config file), e.g. :8080
    #[arg(long)]
    listen: Option<String>,
}

impl ServeCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let cfg = get_config(cli)?;
        let gate = cfg.open_gate()?;
        let addr = self.listen.clone().unwrap_or(cfg.listen);
        crate::server::start_server(&addr, gate).await
    }
}
