//! Single-call dispatch over endpoints that may defer work to a background
//! task.

use anyhow::{Context, Result};
use log::debug;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use serde_json::Value;

use super::poll::{PollConfig, poll_background_task};
use super::response::ApiResponse;

/// Method, headers and body for one dispatched call. Opaque to this layer.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl RequestOptions {
    pub fn new(method: Method, headers: HeaderMap) -> Self {
        Self {
            method,
            headers,
            body: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Extracts the task id when the body has the deferred shape: a JSON object
/// whose `taskId` field is a string.
fn deferred_task_id(body: &Value) -> Option<&str> {
    body.as_object()?.get("taskId")?.as_str()
}

/// Issues one logical request against `{base_url}{path}` and resolves to a
/// uniform [`ApiResponse`], transparently riding out a server-side deferral.
///
/// - A transport failure (connection, DNS, ...) is propagated immediately and
///   never retried here.
/// - A non-success response is returned unchanged as an `Ok` envelope; the
///   caller decides whether non-2xx is fatal.
/// - A success body of the form `{"taskId": "..."}` hands off to the poller
///   with the original headers; the caller never sees the literal task-id
///   body, only the polled terminal outcome.
/// - Any other success body passes through unmodified.
///
/// Whether the call went async is invisible past this boundary.
#[tracing::instrument(skip(client, options, poll_config, on_partial))]
pub async fn dispatch(
    client: &Client,
    base_url: &str,
    path: &str,
    options: RequestOptions,
    poll_config: &PollConfig,
    on_partial: Option<&mut (dyn FnMut(ApiResponse) + Send)>,
) -> Result<ApiResponse> {
    let url = format!("{}{}", base_url, path);
    debug!("{} {}", options.method, url);

    let mut request = client
        .request(options.method.clone(), &url)
        .headers(options.headers.clone());
    if let Some(body) = &options.body {
        request = request.json(body);
    }

    let response = request.send().await.context("Failed to send API request")?;

    let status = response.status();
    let status_text = status.canonical_reason().unwrap_or_default().to_string();

    if !status.is_success() {
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        return Ok(ApiResponse::new(body, status.as_u16(), status_text));
    }

    let body: Value = response
        .json()
        .await
        .context("Failed to parse API response")?;

    if let Some(task_id) = deferred_task_id(&body) {
        debug!("Request deferred to background task {}", task_id);
        return poll_background_task(
            client,
            base_url,
            task_id,
            &options.headers,
            poll_config,
            on_partial,
        )
        .await;
    }

    Ok(ApiResponse::new(body, status.as_u16(), status_text))
}
