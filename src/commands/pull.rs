use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

use crate::api::{ApiClient, PushParams, TranslationApi};
use crate::auth::CredentialStore;
use crate::runtime::Runtime;

/// Downloads a hosted translation file and writes it as pretty-printed JSON.
#[tracing::instrument(skip(runtime, params, api_token, api_url))]
pub async fn pull<R: Runtime>(
    runtime: R,
    output: &Path,
    params: PushParams,
    api_token: Option<String>,
    api_url: Option<String>,
) -> Result<()> {
    let token = CredentialStore::new(&runtime).resolve_token(api_token.as_deref())?;
    let api = ApiClient::new(&token, api_url)?;
    run(&runtime, &api, output, &params).await
}

async fn run<R: Runtime, A: TranslationApi>(
    runtime: &R,
    api: &A,
    output: &Path,
    params: &PushParams,
) -> Result<()> {
    let translation = api.get_translation_file(params).await?;
    let key_count = translation.len();

    let contents = serde_json::to_string_pretty(&Value::Object(translation))
        .context("Failed to serialize translation file")?;
    runtime.write(output, contents.as_bytes())?;

    println!("Saved {} key(s) to {}", key_count, output.display());
    Ok(())
}
