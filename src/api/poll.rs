//! Polling loop for deferred background tasks.
//!
//! Some API endpoints may answer a request by handing back a task id instead
//! of a result. This module owns the loop that watches such a task until it
//! reaches a terminal state, relaying at most one partial-progress
//! notification along the way.

use anyhow::{Context, Result};
use log::debug;
use reqwest::Client;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use super::response::{ApiResponse, TaskError};

/// Timing knobs for the poll loop. Injectable so tests never wait on real
/// timers.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    /// Delay between consecutive status checks.
    pub interval: Duration,
    /// Maximum number of status checks before the task is declared timed out.
    pub max_attempts: usize,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            max_attempts: 60,
        }
    }
}

/// Status reported by the server on every poll. Owned by the server; the
/// client only observes it.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "kebab-case")]
enum TaskStatus {
    Pending,
    PartialResult,
    Completed,
}

/// Embedded outcome, present once the task has produced anything.
#[derive(Deserialize, Debug)]
struct TaskResult {
    #[serde(rename = "statusCode")]
    status_code: u16,
    #[serde(default)]
    data: Value,
}

#[derive(Deserialize, Debug)]
struct TaskStatusBody {
    status: TaskStatus,
    result: Option<TaskResult>,
}

/// Polls the status endpoint for `task_id` until it terminates.
///
/// The loop is an explicit iteration with an awaited sleep between ticks, so
/// the attempt counter and the termination condition are auditable in one
/// place. Ticks are strictly sequential; there is never more than one status
/// request in flight for the same task.
///
/// `on_partial` is invoked at most once, with a response built from the first
/// `partial-result` payload observed. It always fires before the terminal
/// resolution.
///
/// Terminal outcomes:
/// - `completed` with embedded status 200 resolves to `Ok` with the result data
/// - `completed` with any other status fails with [`TaskError::Failed`]
/// - an exhausted attempt budget fails with [`TaskError::TimedOut`] (408)
/// - a transport failure on a status check fails immediately, without
///   further polling
#[tracing::instrument(skip(client, headers, config, on_partial))]
pub async fn poll_background_task(
    client: &Client,
    base_url: &str,
    task_id: &str,
    headers: &HeaderMap,
    config: &PollConfig,
    mut on_partial: Option<&mut (dyn FnMut(ApiResponse) + Send)>,
) -> Result<ApiResponse> {
    let url = format!("{}/background-task-cli/{}", base_url, task_id);
    let mut partial_notified = false;

    for attempt in 1..=config.max_attempts {
        debug!(
            "Checking task {} (attempt {}/{})",
            task_id, attempt, config.max_attempts
        );

        let response = client
            .get(&url)
            .headers(headers.clone())
            .send()
            .await
            .context("Failed to send task status request")?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.json::<Value>().await.unwrap_or(Value::Null);
            return Err(TaskError::Failed { status, detail }.into());
        }

        let body: TaskStatusBody = response
            .json()
            .await
            .context("Failed to parse task status response")?;

        match body.status {
            TaskStatus::Completed => {
                return match body.result {
                    Some(result) if result.status_code == 200 => {
                        Ok(ApiResponse::new(result.data, 200, "ok"))
                    }
                    Some(result) => Err(TaskError::Failed {
                        status: result.status_code,
                        detail: result.data,
                    }
                    .into()),
                    // Completed without a result is a malformed terminal state.
                    None => Err(TaskError::Failed {
                        status: 500,
                        detail: Value::Null,
                    }
                    .into()),
                };
            }
            TaskStatus::PartialResult => {
                if !partial_notified {
                    if let Some(notify) = on_partial.as_mut() {
                        let data = body.result.map(|r| r.data).unwrap_or(Value::Null);
                        notify(ApiResponse::new(data, 200, "ok"));
                    }
                    partial_notified = true;
                }
            }
            TaskStatus::Pending => {}
        }

        if attempt < config.max_attempts {
            tokio::time::sleep(config.interval).await;
        }
    }

    Err(TaskError::TimedOut.into())
}
