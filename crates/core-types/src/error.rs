// In crates/core-types/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown plan tier: {0}")]
    UnknownPlanTier(String),
    #[error("Unknown agent kind: {0}")]
    UnknownAgentKind(String),
}

pub type Result<T> = std::result::Result<T, Error>;
