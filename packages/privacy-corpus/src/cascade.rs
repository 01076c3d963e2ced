//! Ordered fallback tiers.
//!
//! Both retrieval cascades (lightweight fetch → headless render, full crawl
//! profile → light crawl profile) run through [`run_cascade`]. Each tier is
//! attempted in order; a recoverable error moves on, a fatal one stops.

use futures::future::BoxFuture;
use std::fmt::Display;
use tracing::{debug, warn};

use crate::error::{Escalate, Escalation};

/// Something with a name worth logging when it fails.
pub trait Tier {
    fn tier_name(&self) -> &str;
}

/// Attempt `attempt` on each tier in order.
///
/// Returns the first success. When every tier fails recoverably the last
/// tier's error is returned; an empty tier list yields `empty()`.
pub async fn run_cascade<'a, S, T, E, F>(
    tiers: &'a [S],
    empty: impl FnOnce() -> E,
    mut attempt: F,
) -> Result<T, E>
where
    S: Tier + 'a,
    E: Escalate + Display,
    F: FnMut(&'a S) -> BoxFuture<'a, Result<T, E>>,
{
    for (index, tier) in tiers.iter().enumerate() {
        debug!(tier = tier.tier_name(), position = index, "Attempting tier");
        match attempt(tier).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                let has_next = index + 1 < tiers.len();
                match e.escalation() {
                    Escalation::Recoverable if has_next => {
                        warn!(
                            tier = tier.tier_name(),
                            error = %e,
                            "Tier failed, escalating to next"
                        );
                    }
                    _ => return Err(e),
                }
            }
        }
    }

    Err(empty())
}
