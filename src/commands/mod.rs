//! Command implementations. Each command has a thin entry point that wires up
//! the real collaborators and an inner flow that is generic over them, so the
//! flows run against mocks in tests.

mod auth;
mod generate;
mod pull;
mod push;

pub use auth::auth;
pub use generate::generate;
pub use pull::pull;
pub use push::push;
