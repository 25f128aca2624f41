// In crates/insights/src/lib.rs

//! The AI-insight result cache and credit gate.
//!
//! A request walks three gates in order: a per-user TTL cache (a fresh hit
//! costs nothing and makes no external call), the plan gate, and the credit
//! gate. Only a successful generation is charged, and the charge happens
//! after the result is in hand, so a failed call never costs the user.

use chrono::{Duration, Utc};
use core_types::{AgentKind, InsightFilters, UserId};
use tracing::{debug, info, warn};

pub mod client;
pub mod error;
pub mod store;

// Re-export the most important types for easy access.
pub use client::{ChatClient, Generator};
pub use error::{Error, Result};
pub use store::{InsightStore, MemoryStore};

/// Builds the deterministic cache key for an insight request.
///
/// Everything that changes the generated text participates: the agent
/// class, the import/account scoping (`"all"` when unscoped), the period,
/// the locale, and the report type. The user id is not part of the key —
/// entries are stored per user and never shared across users.
pub fn cache_key(agent: AgentKind, filters: &InsightFilters) -> String {
    format!(
        "{}:{}:{}:{}:{}:{}",
        agent.as_str(),
        filters.import_id.as_deref().unwrap_or("all"),
        filters.account_id.as_deref().unwrap_or("all"),
        filters.period.as_str(),
        filters.locale.as_deref().unwrap_or("en"),
        filters.report_type.as_deref().unwrap_or("-"),
    )
}

/// An insight text plus whether it came from the cache.
#[derive(Debug, Clone)]
pub struct InsightResponse {
    pub text: String,
    pub cached: bool,
}

/// Orchestrates cache lookup, plan/credit gating, generation, and charging.
pub struct InsightService<S, G> {
    store: S,
    generator: G,
    cache_ttl: Duration,
}

impl<S: InsightStore, G: Generator> InsightService<S, G> {
    pub fn new(store: S, generator: G, cache_ttl: Duration) -> Self {
        Self {
            store,
            generator,
            cache_ttl,
        }
    }

    /// Runs one insight request end to end.
    ///
    /// Cache read and write failures are soft: they are logged and the
    /// request proceeds as a miss, because a flaky cache must never block
    /// the critical path. Plan and credit failures are hard and happen
    /// before any external call.
    pub async fn request(
        &self,
        user: &UserId,
        agent: AgentKind,
        filters: &InsightFilters,
        prompt: &str,
    ) -> Result<InsightResponse> {
        let key = cache_key(agent, filters);

        match self.store.cached(user, &key).await {
            Ok(Some(text)) => {
                debug!(user = %user, key = %key, "insight cache hit");
                return Ok(InsightResponse { text, cached: true });
            }
            Ok(None) => {}
            Err(err) => warn!(user = %user, error = %err, "insight cache read failed, treating as miss"),
        }

        // --- Plan & credit gates (no external call on failure) ---

        let (tier, remaining) = self.store.plan(user).await?;
        if !tier.allows(agent) {
            debug!(user = %user, tier = tier.as_str(), agent = agent.as_str(), "plan gate rejected");
            return Err(Error::PlanRestricted);
        }

        let cost = agent.cost();
        if remaining < cost {
            debug!(user = %user, remaining, cost, "credit gate rejected");
            return Err(Error::InsufficientCredits { remaining, cost });
        }

        // --- External generation ---

        let text = self.generator.generate(prompt).await?;

        // Cache first, then charge. A crash in between leaves an uncharged
        // cached entry, which self-corrects once the TTL lapses.
        let expires_at = Utc::now() + self.cache_ttl;
        if let Err(err) = self.store.store(user, &key, &text, expires_at).await {
            warn!(user = %user, error = %err, "insight cache write failed, continuing");
        }

        if self.store.try_consume(user, cost).await? {
            info!(user = %user, agent = agent.as_str(), cost, "insight generated and charged");
        } else {
            // Raced to the boundary after the pre-check. The user keeps the
            // result; there is nothing left to charge.
            warn!(user = %user, cost, "credit consume found insufficient balance after generation");
        }

        Ok(InsightResponse {
            text,
            cached: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use core_types::{PlanTier, Period};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A generator that either always succeeds or always fails, counting
    /// every call.
    struct ScriptedGenerator {
        calls: AtomicUsize,
        fail: bool,
    }

    impl ScriptedGenerator {
        fn ok() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Generator for &ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(Error::Generation("upstream unavailable".to_string()))
            } else {
                Ok(format!("insight for: {prompt}"))
            }
        }
    }

    fn user() -> UserId {
        UserId("user-1".to_string())
    }

    fn filters(period: Period) -> InsightFilters {
        InsightFilters {
            period,
            ..Default::default()
        }
    }

    fn service<'a>(
        store: &'a MemoryStore,
        generator: &'a ScriptedGenerator,
    ) -> InsightService<&'a MemoryStore, &'a ScriptedGenerator> {
        InsightService::new(store, generator, Duration::hours(1))
    }

    #[async_trait]
    impl InsightStore for &MemoryStore {
        async fn cached(&self, user: &UserId, key: &str) -> Result<Option<String>> {
            (**self).cached(user, key).await
        }

        async fn store(
            &self,
            user: &UserId,
            key: &str,
            text: &str,
            expires_at: chrono::DateTime<Utc>,
        ) -> Result<()> {
            (**self).store(user, key, text, expires_at).await
        }

        async fn plan(&self, user: &UserId) -> Result<(PlanTier, i64)> {
            (**self).plan(user).await
        }

        async fn try_consume(&self, user: &UserId, cost: i64) -> Result<bool> {
            (**self).try_consume(user, cost).await
        }
    }

    #[test]
    fn cache_key_is_deterministic_and_scoped() {
        let a = cache_key(AgentKind::Analysis, &filters(Period::D30));
        let b = cache_key(AgentKind::Analysis, &filters(Period::D30));
        assert_eq!(a, b);
        assert_eq!(a, "analysis:all:all:30d:en:-");

        let scoped = cache_key(
            AgentKind::Copilot,
            &InsightFilters {
                import_id: Some("imp-9".to_string()),
                locale: Some("de".to_string()),
                period: Period::Ytd,
                ..Default::default()
            },
        );
        assert_eq!(scoped, "copilot:imp-9:all:ytd:de:-");
        assert_ne!(a, scoped);
    }

    #[tokio::test]
    async fn second_request_is_served_from_cache_without_charging() {
        let store = MemoryStore::new();
        store.set_plan(&user(), PlanTier::Pro, 5).await;
        let generator = ScriptedGenerator::ok();
        let service = service(&store, &generator);

        let first = service
            .request(&user(), AgentKind::Analysis, &filters(Period::D30), "p")
            .await
            .unwrap();
        assert!(!first.cached);

        let second = service
            .request(&user(), AgentKind::Analysis, &filters(Period::D30), "p")
            .await
            .unwrap();
        assert!(second.cached);
        assert_eq!(second.text, first.text);

        // One generation, one charge.
        assert_eq!(generator.call_count(), 1);
        assert_eq!(store.remaining_credits(&user()).await, 4);
    }

    #[tokio::test]
    async fn expired_entries_read_as_miss() {
        let store = MemoryStore::new();
        store.set_plan(&user(), PlanTier::Pro, 5).await;
        let key = cache_key(AgentKind::Analysis, &filters(Period::D30));
        store
            .insert_entry(&user(), &key, "stale", Utc::now() - Duration::minutes(1))
            .await;

        let generator = ScriptedGenerator::ok();
        let service = service(&store, &generator);
        let response = service
            .request(&user(), AgentKind::Analysis, &filters(Period::D30), "p")
            .await
            .unwrap();

        assert!(!response.cached);
        assert_ne!(response.text, "stale");
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn free_plan_is_rejected_before_any_call() {
        let store = MemoryStore::new();
        store.set_plan(&user(), PlanTier::Free, 10).await;
        let generator = ScriptedGenerator::ok();
        let service = service(&store, &generator);

        let err = service
            .request(&user(), AgentKind::Analysis, &filters(Period::D30), "p")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PlanRestricted));
        assert_eq!(err.kind(), "plan");
        assert_eq!(generator.call_count(), 0);
        assert_eq!(store.remaining_credits(&user()).await, 10);
    }

    #[tokio::test]
    async fn exhausted_credits_are_rejected_before_any_call() {
        let store = MemoryStore::new();
        store.set_plan(&user(), PlanTier::Elite, 1).await;
        let generator = ScriptedGenerator::ok();
        let service = service(&store, &generator);

        // Copilot costs 2; only 1 credit remains.
        let err = service
            .request(&user(), AgentKind::Copilot, &filters(Period::D30), "p")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientCredits {
                remaining: 1,
                cost: 2
            }
        ));
        assert_eq!(err.kind(), "credits");
        assert_eq!(generator.call_count(), 0);
        assert_eq!(store.remaining_credits(&user()).await, 1);
    }

    #[tokio::test]
    async fn pro_plan_cannot_use_the_copilot() {
        let store = MemoryStore::new();
        store.set_plan(&user(), PlanTier::Pro, 10).await;
        let generator = ScriptedGenerator::ok();
        let service = service(&store, &generator);

        let err = service
            .request(&user(), AgentKind::Copilot, &filters(Period::D30), "p")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PlanRestricted));
    }

    #[tokio::test]
    async fn failed_generation_never_charges() {
        let store = MemoryStore::new();
        store.set_plan(&user(), PlanTier::Pro, 3).await;
        let generator = ScriptedGenerator::failing();
        let service = service(&store, &generator);

        let err = service
            .request(&user(), AgentKind::Analysis, &filters(Period::D30), "p")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "generation");
        assert_eq!(generator.call_count(), 1);
        assert_eq!(store.remaining_credits(&user()).await, 3);

        // And nothing was cached.
        let key = cache_key(AgentKind::Analysis, &filters(Period::D30));
        assert!(store.cached(&user(), &key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn two_successes_decrement_by_exactly_two() {
        let store = MemoryStore::new();
        store.set_plan(&user(), PlanTier::Pro, 5).await;
        let generator = ScriptedGenerator::ok();
        let service = service(&store, &generator);

        // Different periods, so the second request is not a cache hit.
        service
            .request(&user(), AgentKind::Analysis, &filters(Period::D7), "p")
            .await
            .unwrap();
        service
            .request(&user(), AgentKind::Analysis, &filters(Period::D90), "p")
            .await
            .unwrap();

        assert_eq!(generator.call_count(), 2);
        assert_eq!(store.remaining_credits(&user()).await, 3);
    }

    #[tokio::test]
    async fn copilot_success_costs_two() {
        let store = MemoryStore::new();
        store.set_plan(&user(), PlanTier::Elite, 5).await;
        let generator = ScriptedGenerator::ok();
        let service = service(&store, &generator);

        service
            .request(&user(), AgentKind::Copilot, &filters(Period::D30), "p")
            .await
            .unwrap();
        assert_eq!(store.remaining_credits(&user()).await, 3);
    }
}
