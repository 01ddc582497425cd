//! The operator-facing HTTP control surface: consumer pause/resume/status,
//! message injection, on-demand crawling, RSS task registration, and the
//! current credential.

mod error;
mod routes;
mod server;
mod state;

pub use error::ControlError;
pub use server::{ControlServer, ControlServerError};
pub use state::ControlState;
