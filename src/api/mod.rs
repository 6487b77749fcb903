//! Glossa API access: the task-polling dispatcher and the authenticated
//! client built on top of it.

mod client;
mod dispatch;
mod poll;
mod response;
mod types;

pub use client::{ApiClient, DEFAULT_API_URL, TranslationApi};
pub use dispatch::{RequestOptions, dispatch};
pub use poll::{PollConfig, poll_background_task};
pub use response::{ApiResponse, TaskError};
pub use types::{
    GeneratePartial, GenerateResponse, PushParams, RepositoryConfig, TranslationBundle,
    TranslationFile, UpdateRequest, UpdateResponse, UpdatedFileReport, UpdatedKey,
};

#[cfg(test)]
pub use client::MockTranslationApi;
