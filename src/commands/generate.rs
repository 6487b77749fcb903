use anyhow::Result;
use log::debug;

use crate::api::{ApiClient, TranslationApi};
use crate::auth::CredentialStore;
use crate::bundle::{filter_bundles_by_changed_files, load_file_contents, save_translation_files};
use crate::git::{GitCli, GitInfo};
use crate::runtime::Runtime;

/// Sends changed translation files to the service and writes back whatever it
/// generated.
#[tracing::instrument(skip(runtime, api_url))]
pub async fn generate<R: Runtime>(
    runtime: R,
    base_branch: Option<String>,
    api_url: Option<String>,
) -> Result<()> {
    let token = CredentialStore::new(&runtime).resolve_token(None)?;
    let api = ApiClient::new(&token, api_url)?;
    run(&runtime, &GitCli, &api, base_branch.as_deref()).await
}

async fn run<R: Runtime, G: GitInfo, A: TranslationApi>(
    runtime: &R,
    git: &G,
    api: &A,
    base_branch: Option<&str>,
) -> Result<()> {
    let repo_name = git.repository_name()?;
    let branch = git.current_branch()?;
    println!("Repository: {} (branch {})", repo_name, branch);

    let config = api.repository_config(&repo_name).await?;
    let base_branch = base_branch.unwrap_or(&config.main_branch);
    debug!("Comparing against base branch {}", base_branch);

    let changed = git.changed_files(base_branch)?;
    if changed.is_empty() {
        println!("No changed files; nothing to translate");
        return Ok(());
    }

    let bundles = filter_bundles_by_changed_files(&config.files_to_sync, &changed);
    if bundles.is_empty() {
        println!("No translation files changed; nothing to translate");
        return Ok(());
    }

    let bundles = load_file_contents(runtime, bundles);
    let response = api
        .generate_translations(&repo_name, &bundles, base_branch)
        .await?;

    for updated in &response.updated_files {
        println!("{}: {} new key(s)", updated.to_path, updated.keys.len());
        for key in &updated.keys {
            println!("  + {}", key);
        }
    }

    save_translation_files(runtime, &response.files)?;
    println!("Translation files updated");
    Ok(())
}
