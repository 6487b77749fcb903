pub mod api;
pub mod auth;
pub mod bundle;
pub mod commands;
pub mod git;
pub mod runtime;
