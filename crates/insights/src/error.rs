// In crates/insights/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("The current plan does not include this analysis")]
    PlanRestricted,
    #[error("Not enough credits: {cost} needed, {remaining} remaining")]
    InsufficientCredits { remaining: i64, cost: i64 },
    #[error("Generation failed: {0}")]
    Generation(String),
    #[error("Generation request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Store operation failed: {0}")]
    Store(#[from] database::Error),
}

impl Error {
    /// The stable error kind the API surfaces to clients.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::PlanRestricted => "plan",
            Error::InsufficientCredits { .. } => "credits",
            Error::Generation(_) | Error::RequestFailed(_) => "generation",
            Error::Store(_) => "store",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
