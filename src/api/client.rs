use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use log::debug;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, Url};
use serde_json::{Map, Value, json};

use super::dispatch::{RequestOptions, dispatch};
use super::poll::PollConfig;
use super::response::ApiResponse;
use super::types::{
    GeneratePartial, GenerateResponse, PushParams, RepositoryConfig, TranslationBundle,
    UpdateRequest, UpdateResponse,
};

/// Production API endpoint. Overridable via `--api-url` for tests and
/// self-hosted deployments.
pub const DEFAULT_API_URL: &str = "https://app.glossa.io/api";

const USER_AGENT: &str = concat!("glossa-cli/", env!("CARGO_PKG_VERSION"));

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranslationApi: Send + Sync {
    async fn repository_config(&self, repo_name: &str) -> Result<RepositoryConfig>;
    async fn generate_translations(
        &self,
        repository_name: &str,
        files: &[TranslationBundle],
        base_branch: &str,
    ) -> Result<GenerateResponse>;
    async fn get_translation_file(&self, params: &PushParams) -> Result<Map<String, Value>>;
    async fn update_translation_file(
        &self,
        params: &PushParams,
        request: &UpdateRequest,
    ) -> Result<UpdateResponse>;
}

/// Authenticated client for the Glossa API.
pub struct ApiClient {
    client: Client,
    headers: HeaderMap,
    api_url: String,
    poll: PollConfig,
}

impl ApiClient {
    /// Builds a client carrying the bearer token on every request, including
    /// background-task status polls.
    pub fn new(api_key: &str, api_url: Option<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .context("API key contains invalid header characters")?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            headers,
            api_url: api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            poll: PollConfig::default(),
        })
    }

    /// Replaces the poll timing, used by tests to avoid real timers.
    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    fn hosted_url(&self, params: &PushParams) -> Result<Url> {
        let mut url = Url::parse(&self.api_url).context("Invalid API base URL")?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("API base URL cannot be a base"))?
            .extend([
                "public",
                "glossa-hosted",
                params.repo_id.as_str(),
                params.language.as_str(),
                params.bundle_name.as_str(),
            ]);
        Ok(url)
    }

    async fn check_response(
        response: reqwest::Response,
        operation: &str,
    ) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let status_text = status.canonical_reason().unwrap_or_default().to_string();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        let envelope = ApiResponse::new(body, status.as_u16(), status_text);
        bail!(
            "{} request failed: {} {}",
            operation,
            envelope.status,
            envelope.error_message()
        )
    }
}

#[async_trait]
impl TranslationApi for ApiClient {
    #[tracing::instrument(skip(self))]
    async fn repository_config(&self, repo_name: &str) -> Result<RepositoryConfig> {
        let url = format!("{}/config", self.api_url);
        let response = self
            .client
            .get(&url)
            .query(&[("repo", repo_name)])
            .headers(self.headers.clone())
            .send()
            .await
            .context("Failed to fetch repository config")?;

        let response = Self::check_response(response, "API").await?;
        let config = response
            .json::<RepositoryConfig>()
            .await
            .context("Failed to parse repository config")?;

        debug!("Repository config received: {:?}", config);
        Ok(config)
    }

    /// The one endpoint that may defer to a background task; goes through the
    /// dispatcher so a deferral is invisible to callers. The partial-progress
    /// notification reports how many new keys the service found.
    #[tracing::instrument(skip(self, files))]
    async fn generate_translations(
        &self,
        repository_name: &str,
        files: &[TranslationBundle],
        base_branch: &str,
    ) -> Result<GenerateResponse> {
        let body = json!({
            "repositoryName": repository_name,
            "files": files,
            "baseBranch": base_branch,
        });

        let mut notify = |partial: ApiResponse| match partial.json::<GeneratePartial>() {
            Ok(progress) => {
                println!(
                    "Found {} new keys to translate",
                    progress.keys_to_translate.len()
                );
                println!("Translating...");
            }
            Err(e) => debug!("Ignoring unparseable partial result: {}", e),
        };

        let response = dispatch(
            &self.client,
            &self.api_url,
            "/cli/generate-translations",
            RequestOptions::new(Method::POST, self.headers.clone()).with_body(body),
            &self.poll,
            Some(&mut notify),
        )
        .await
        .context("Failed to generate translations")?;

        if !response.ok() {
            bail!(
                "Translation API request failed: {} {}",
                response.status,
                response.error_message()
            );
        }

        debug!("Translation response received: {:?}", response.body);
        response.json()
    }

    #[tracing::instrument(skip(self, params))]
    async fn get_translation_file(&self, params: &PushParams) -> Result<Map<String, Value>> {
        let mut url = self.hosted_url(params)?;
        if let Some(branch) = &params.branch {
            url.query_pairs_mut().append_pair("branch", branch);
        }

        let response = self
            .client
            .get(url)
            .headers(self.headers.clone())
            .send()
            .await
            .context("Failed to fetch translation file")?;

        let response = Self::check_response(response, "Pull API").await?;
        response
            .json()
            .await
            .context("Failed to parse translation file")
    }

    #[tracing::instrument(skip(self, params, request))]
    async fn update_translation_file(
        &self,
        params: &PushParams,
        request: &UpdateRequest,
    ) -> Result<UpdateResponse> {
        let mut url = self.hosted_url(params)?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(value) = params.override_file {
                query.append_pair("override", &value.to_string());
            }
            if let Some(value) = params.auto_translate {
                query.append_pair("auto-translate", &value.to_string());
            }
            if let Some(value) = params.wait_for_translations {
                query.append_pair("wait-for-translations", &value.to_string());
            }
            if let Some(branch) = &params.branch {
                query.append_pair("branch", branch);
            }
            if let Some(user) = &params.user {
                query.append_pair("user", user);
            }
        }

        let response = self
            .client
            .post(url)
            .headers(self.headers.clone())
            .json(request)
            .send()
            .await
            .context("Failed to upload translation file")?;

        let response = Self::check_response(response, "Push API").await?;
        let result = response
            .json::<UpdateResponse>()
            .await
            .context("Failed to parse push response")?;

        debug!("Push response received: {:?}", result);
        Ok(result)
    }
}
