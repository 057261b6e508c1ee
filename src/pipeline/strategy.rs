//! Ordered fallback chains.
//!
//! Every stage that has a preferred path and deterministic fallbacks
//! (extraction passes, pattern → LLM → default criteria, LLM → keyword
//! scoring) is expressed as a list of named strategies tried in order by
//! [`first_success`]. The first strategy that produces a value wins; the
//! attempts that came before it are kept for logging and stage reports.

use std::fmt;

use serde::Serialize;

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// Result of running one strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyOutcome<T> {
    /// Usable value; stops the chain.
    Found(T),
    /// Ran cleanly but produced nothing usable.
    Empty,
    /// Errored; the message is recorded and the chain continues.
    Failed(String),
}

impl<T> StrategyOutcome<T> {
    /// `Ok(Some(v))` → Found, `Ok(None)` → Empty, `Err(e)` → Failed.
    pub fn from_result<E: fmt::Display>(result: Result<Option<T>, E>) -> Self {
        match result {
            Ok(Some(value)) => Self::Found(value),
            Ok(None) => Self::Empty,
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}

/// A named step in a fallback chain.
pub struct Strategy<'a, I: ?Sized, T> {
    name: &'static str,
    run: Box<dyn Fn(&I) -> StrategyOutcome<T> + Send + Sync + 'a>,
}

impl<'a, I: ?Sized, T> Strategy<'a, I, T> {
    pub fn new<F>(name: &'static str, run: F) -> Self
    where
        F: Fn(&I) -> StrategyOutcome<T> + Send + Sync + 'a,
    {
        Self {
            name,
            run: Box::new(run),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Why a strategy was passed over.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "error", rename_all = "snake_case")]
pub enum SkipReason {
    Empty,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attempt {
    pub strategy: &'static str,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// Winning value plus the strategies tried before it.
#[derive(Debug, Clone)]
pub struct Resolution<T> {
    pub value: T,
    pub strategy: &'static str,
    pub skipped: Vec<Attempt>,
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            SkipReason::Empty => write!(f, "{}: empty", self.strategy),
            SkipReason::Failed(e) => write!(f, "{}: {e}", self.strategy),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Combinator
// ═══════════════════════════════════════════════════════════

/// Try `strategies` in order; the first `Found` wins.
///
/// Returns every attempt when no strategy produced a value.
pub fn first_success<I: ?Sized, T>(
    input: &I,
    strategies: &[Strategy<'_, I, T>],
) -> Result<Resolution<T>, Vec<Attempt>> {
    let mut skipped = Vec::new();

    for strategy in strategies {
        match (strategy.run)(input) {
            StrategyOutcome::Found(value) => {
                if !skipped.is_empty() {
                    tracing::debug!(
                        strategy = strategy.name,
                        skipped = skipped.len(),
                        "Fallback strategy succeeded"
                    );
                }
                return Ok(Resolution {
                    value,
                    strategy: strategy.name,
                    skipped,
                });
            }
            StrategyOutcome::Empty => {
                tracing::debug!(strategy = strategy.name, "Strategy produced nothing");
                skipped.push(Attempt {
                    strategy: strategy.name,
                    reason: SkipReason::Empty,
                });
            }
            StrategyOutcome::Failed(error) => {
                tracing::debug!(strategy = strategy.name, error = %error, "Strategy failed");
                skipped.push(Attempt {
                    strategy: strategy.name,
                    reason: SkipReason::Failed(error),
                });
            }
        }
    }

    Err(skipped)
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
