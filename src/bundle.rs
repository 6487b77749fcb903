//! Loading, filtering and writing translation file bundles.

use anyhow::{Context, Result, bail};
use log::{debug, warn};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;

use crate::api::{TranslationBundle, UpdateRequest};
use crate::runtime::Runtime;

/// Keeps only the bundles that contain at least one changed file.
pub fn filter_bundles_by_changed_files(
    bundles: &[TranslationBundle],
    changed_files: &BTreeSet<String>,
) -> Vec<TranslationBundle> {
    bundles
        .iter()
        .filter(|bundle| bundle.iter().any(|file| changed_files.contains(&file.path)))
        .cloned()
        .collect()
}

/// Fills in `content` for every file in the given bundles. Unreadable files
/// are skipped with a warning, matching the service's tolerance for files
/// that only exist on other branches.
pub fn load_file_contents<R: Runtime>(
    runtime: &R,
    bundles: Vec<TranslationBundle>,
) -> Vec<TranslationBundle> {
    bundles
        .into_iter()
        .map(|bundle| {
            bundle
                .into_iter()
                .map(|mut file| {
                    file.content = match runtime.read_to_string(Path::new(&file.path)) {
                        Ok(content) => Some(content),
                        Err(e) => {
                            warn!("Could not read file {}: {}", file.path, e);
                            None
                        }
                    };
                    file
                })
                .collect()
        })
        .collect()
}

/// Writes every file that carries generated content back to disk.
pub fn save_translation_files<R: Runtime>(
    runtime: &R,
    bundles: &[TranslationBundle],
) -> Result<()> {
    for bundle in bundles {
        for file in bundle {
            if let Some(new_content) = &file.new_content {
                runtime
                    .write(Path::new(&file.path), new_content.as_bytes())
                    .with_context(|| format!("Failed to write file {}", file.path))?;
                debug!("File written: {}", file.path);
            }
        }
    }
    Ok(())
}

/// Maps a file extension to the format tag the service understands.
pub fn detect_original_format(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "json" => Some("json"),
        "yaml" => Some("yaml"),
        "yml" => Some("yml"),
        "po" => Some("po"),
        "pot" => Some("pot"),
        "resx" => Some("resx"),
        "xml" => Some("xml"),
        "arb" => Some("arb"),
        "xcstrings" => Some("xcstrings"),
        "ts" => Some("ts"),
        "js" => Some("js"),
        _ => None,
    }
}

/// Builds the push body for a file. JSON-shaped formats that parse to an
/// object upload structurally; everything else (including JSON that fails to
/// parse) uploads as raw content.
pub fn build_update_request<R: Runtime>(
    runtime: &R,
    path: &Path,
    tags: Option<&[String]>,
) -> Result<UpdateRequest> {
    let content = runtime
        .read_to_string(path)
        .with_context(|| format!("Could not read file: {}", path.display()))?;

    let normalized_tags: Option<Vec<String>> = tags.and_then(|tags| {
        let cleaned: Vec<String> = tags
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if cleaned.is_empty() { None } else { Some(cleaned) }
    });

    let original_format = detect_original_format(path);

    if matches!(original_format, Some("json" | "arb" | "xcstrings"))
        && let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&content)
    {
        return Ok(UpdateRequest::Json {
            json: map,
            tags: normalized_tags,
        });
    }

    let file_name = match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name.to_string(),
        None => bail!("Could not determine file name for {}", path.display()),
    };

    Ok(UpdateRequest::Raw {
        content,
        file_name,
        original_format: original_format.map(str::to_string),
        tags: normalized_tags,
    })
}
