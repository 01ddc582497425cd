//! The downstream model-invocation credential: a long-lived refresh loop
//! publishing into a single-writer, many-reader slot.

pub mod error;
pub mod provider;
pub mod refresher;

pub use error::CredentialError;
pub use provider::{Credential, CredentialProvider, HttpCredentialProvider};
pub use refresher::CredentialRefresher;
