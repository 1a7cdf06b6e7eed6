//! Credential commands that talk to a running server.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use keymaster_cipher::Envelope;
use serde_json::Value;
use tracing::info;

use crate::client::KeymasterClient;
use crate::render;

/// Where a returned envelope goes.
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Write the envelope to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also print the decrypted secrets
    #[arg(short, long)]
    pub decrypt: bool,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// JSON file with the AppNames and Keys to store
    #[arg(short, long)]
    pub spec: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// App id to look up
    pub app_id: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// App id of the credential set to replace
    pub app_id: String,

    /// JSON file with the replacement AppNames and Keys
    #[arg(short, long)]
    pub spec: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct ReissueArgs {
    /// App id of the credential set to re-key
    pub app_id: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

pub async fn add(client: &KeymasterClient, args: AddArgs) -> anyhow::Result<()> {
    let spec = read_spec(&args.spec)?;
    let envelope = client.create(&spec).await?;
    info!("created credential set");
    emit(&envelope, &args.output)
}

pub async fn get(client: &KeymasterClient, args: GetArgs) -> anyhow::Result<()> {
    let envelope = client.get(&args.app_id).await?;
    emit(&envelope, &args.output)
}

pub async fn update(client: &KeymasterClient, args: UpdateArgs) -> anyhow::Result<()> {
    let spec = read_spec(&args.spec)?;
    let envelope = client.replace(&args.app_id, &spec).await?;
    info!(app_id = %args.app_id, "replaced credential set");
    emit(&envelope, &args.output)
}

pub async fn reissue(client: &KeymasterClient, args: ReissueArgs) -> anyhow::Result<()> {
    let envelope = client.reissue(&args.app_id).await?;
    info!(app_id = %args.app_id, "reissued cipher key");
    emit(&envelope, &args.output)
}

pub async fn list(client: &KeymasterClient) -> anyhow::Result<()> {
    let groups = client.list_apps().await?;
    print!("{}", render::app_list(&groups, client.base_url().as_str()));
    Ok(())
}

/// Read a spec file, refusing anything that is not JSON.
pub fn read_spec(path: &Path) -> anyhow::Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read spec file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Spec file {} is not valid JSON", path.display()))
}

/// Print or save the envelope, then print the plaintext if asked to.
fn emit(envelope: &Envelope, output: &OutputArgs) -> anyhow::Result<()> {
    let text = render::envelope_json(envelope)?;
    match &output.output {
        Some(path) => std::fs::write(path, format!("{text}\n"))
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{text}"),
    }

    if output.decrypt {
        println!("{}", render::decrypted_json(envelope)?);
    }
    Ok(())
}
