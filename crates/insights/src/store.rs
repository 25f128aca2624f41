// In crates/insights/src/store.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_types::{PlanTier, UserId};
use database::Db;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::{Error, Result};

/// Storage behind the insight cache and the credit gate.
///
/// Injected rather than hard-wired so multi-process deployments share state
/// through the database while tests (and single-process setups) can use the
/// in-memory implementation.
#[async_trait]
pub trait InsightStore: Send + Sync {
    /// A fresh cached text for this user and key, or `None` once expired.
    async fn cached(&self, user: &UserId, key: &str) -> Result<Option<String>>;

    /// Writes (or replaces) a cached text with the given expiry.
    async fn store(&self, user: &UserId, key: &str, text: &str, expires_at: DateTime<Utc>)
    -> Result<()>;

    /// The user's plan tier and remaining credits.
    async fn plan(&self, user: &UserId) -> Result<(PlanTier, i64)>;

    /// Atomically consumes `cost` credits; `false` if not enough remain.
    async fn try_consume(&self, user: &UserId, cost: i64) -> Result<bool>;
}

#[async_trait]
impl InsightStore for Db {
    async fn cached(&self, user: &UserId, key: &str) -> Result<Option<String>> {
        let row = self.get_cached_insight(user, key).await?;
        Ok(row.map(|r| r.response_text))
    }

    async fn store(
        &self,
        user: &UserId,
        key: &str,
        text: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        self.upsert_cached_insight(user, key, text, expires_at)
            .await
            .map_err(Error::from)
    }

    async fn plan(&self, user: &UserId) -> Result<(PlanTier, i64)> {
        self.get_plan(user).await.map_err(Error::from)
    }

    async fn try_consume(&self, user: &UserId, cost: i64) -> Result<bool> {
        self.try_consume_credits(user, cost)
            .await
            .map_err(Error::from)
    }
}

/// An in-memory store: a single-process simplification of the shared one,
/// and the test double for the gate's behavior.
#[derive(Default)]
pub struct MemoryStore {
    cache: RwLock<HashMap<(String, String), (String, DateTime<Utc>)>>,
    plans: RwLock<HashMap<String, (PlanTier, i64)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a user's plan tier and credit balance.
    pub async fn set_plan(&self, user: &UserId, tier: PlanTier, credits: i64) {
        self.plans
            .write()
            .await
            .insert(user.0.clone(), (tier, credits));
    }

    /// Inserts a cache entry directly, expiry included. Lets callers seed
    /// already-expired entries.
    pub async fn insert_entry(
        &self,
        user: &UserId,
        key: &str,
        text: &str,
        expires_at: DateTime<Utc>,
    ) {
        self.cache.write().await.insert(
            (user.0.clone(), key.to_string()),
            (text.to_string(), expires_at),
        );
    }

    pub async fn remaining_credits(&self, user: &UserId) -> i64 {
        self.plans
            .read()
            .await
            .get(&user.0)
            .map(|(_, credits)| *credits)
            .unwrap_or(0)
    }
}

#[async_trait]
impl InsightStore for MemoryStore {
    async fn cached(&self, user: &UserId, key: &str) -> Result<Option<String>> {
        let cache = self.cache.read().await;
        Ok(cache
            .get(&(user.0.clone(), key.to_string()))
            .filter(|(_, expires_at)| *expires_at > Utc::now())
            .map(|(text, _)| text.clone()))
    }

    async fn store(
        &self,
        user: &UserId,
        key: &str,
        text: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        self.insert_entry(user, key, text, expires_at).await;
        Ok(())
    }

    async fn plan(&self, user: &UserId) -> Result<(PlanTier, i64)> {
        let plans = self.plans.read().await;
        Ok(plans
            .get(&user.0)
            .copied()
            .unwrap_or((PlanTier::Free, 0)))
    }

    async fn try_consume(&self, user: &UserId, cost: i64) -> Result<bool> {
        let mut plans = self.plans.write().await;
        match plans.get_mut(&user.0) {
            Some((_, credits)) if *credits >= cost => {
                *credits -= cost;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
