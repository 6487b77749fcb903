use anyhow::Result;
use std::path::Path;

use crate::api::{ApiClient, PushParams, TranslationApi};
use crate::auth::CredentialStore;
use crate::bundle::build_update_request;
use crate::runtime::Runtime;

/// Uploads a translation file to a hosted bundle.
#[tracing::instrument(skip(runtime, params, tags, api_token, api_url))]
pub async fn push<R: Runtime>(
    runtime: R,
    file: &Path,
    params: PushParams,
    tags: Option<Vec<String>>,
    api_token: Option<String>,
    api_url: Option<String>,
) -> Result<()> {
    let token = CredentialStore::new(&runtime).resolve_token(api_token.as_deref())?;
    let api = ApiClient::new(&token, api_url)?;
    run(&runtime, &api, file, &params, tags.as_deref()).await
}

async fn run<R: Runtime, A: TranslationApi>(
    runtime: &R,
    api: &A,
    file: &Path,
    params: &PushParams,
    tags: Option<&[String]>,
) -> Result<()> {
    let request = build_update_request(runtime, file, tags)?;
    let response = api.update_translation_file(params, &request).await?;

    if let Some(message) = &response.message {
        println!("{}", message);
    }
    if let Some(branch) = &response.branch {
        println!("Branch: {}", branch);
    }
    if let Some(total) = response.total_keys {
        println!("{} key(s) uploaded", total);
    }
    for key in &response.keys {
        let marker = if key.updated { "updated" } else { "unchanged" };
        println!("  {} ({})", key.key, marker);
    }
    Ok(())
}
