//! Wire types for the Glossa API. Field names follow the service's JSON
//! contract exactly.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One translation file inside a bundle. `content` is what we upload,
/// `newContent` is what the service hands back for writing to disk.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TranslationFile {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_content: Option<String>,
}

/// A set of files that are translated together (one per language, typically).
pub type TranslationBundle = Vec<TranslationFile>;

/// Per-repository configuration as served by `GET /config`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryConfig {
    pub main_branch: String,
    pub files_to_sync: Vec<TranslationBundle>,
}

/// One file the generate endpoint reported as updated.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedFileReport {
    pub to_path: String,
    #[serde(default)]
    pub keys: Vec<String>,
}

/// Terminal payload of `/cli/generate-translations`.
#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub files: Vec<TranslationBundle>,
    #[serde(default)]
    pub updated_files: Vec<UpdatedFileReport>,
}

/// Partial-progress payload emitted while a generate task is running.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct GeneratePartial {
    #[serde(rename = "keysToTranslate", default)]
    pub keys_to_translate: Vec<Value>,
}

/// Body of a push. Parsed JSON objects upload structurally; everything else
/// goes up as raw content tagged with its detected format.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum UpdateRequest {
    Json {
        json: Map<String, Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tags: Option<Vec<String>>,
    },
    Raw {
        content: String,
        #[serde(rename = "fileName")]
        file_name: String,
        #[serde(rename = "originalFormat", skip_serializing_if = "Option::is_none")]
        original_format: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tags: Option<Vec<String>>,
    },
}

/// Response of a push.
#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct UpdateResponse {
    pub message: Option<String>,
    pub branch: Option<String>,
    pub total_keys: Option<u64>,
    #[serde(default)]
    pub keys: Vec<UpdatedKey>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct UpdatedKey {
    pub key: String,
    #[serde(default)]
    pub updated: bool,
}

/// Addressing and behavior flags for push/pull against a hosted bundle.
#[derive(Debug, Clone, Default)]
pub struct PushParams {
    pub repo_id: String,
    pub language: String,
    pub bundle_name: String,
    pub override_file: Option<bool>,
    pub auto_translate: Option<bool>,
    pub wait_for_translations: Option<bool>,
    pub branch: Option<String>,
    pub user: Option<String>,
}
