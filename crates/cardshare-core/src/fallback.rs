//! An ordered chain of interchangeable strategies.
//!
//! Both remote publishers (image hosts, QR providers) are expressed as a
//! [`FallbackChain`]: each [`Strategy`] is tried in order and its failure is a
//! typed value rather than an early return, so the caller decides whether an
//! exhausted chain degrades or surfaces.

use std::fmt;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::BoxError;

/// One way of turning an `I` into an `O`.
#[async_trait]
pub trait Strategy<I: ?Sized + Sync, O>: Send + Sync {
  /// Short name used in logs and error reports.
  fn name(&self) -> &str;

  async fn attempt(&self, input: &I) -> Result<O, BoxError>;
}

/// The output of the first strategy that succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Success<O> {
  pub value:    O,
  pub strategy: String,
}

/// A single strategy failure.
#[derive(Debug)]
pub struct Failure {
  pub strategy: String,
  pub error:    BoxError,
}

/// Every strategy in the chain failed (or the chain was empty).
#[derive(Debug, Default)]
pub struct Exhausted {
  pub failures: Vec<Failure>,
}

impl fmt::Display for Exhausted {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.failures.is_empty() {
      return f.write_str("no strategies configured");
    }
    write!(f, "all {} strategies failed", self.failures.len())?;
    for failure in &self.failures {
      write!(f, "; {}: {}", failure.strategy, failure.error)?;
    }
    Ok(())
  }
}

impl std::error::Error for Exhausted {}

pub struct FallbackChain<I: ?Sized + Sync, O> {
  strategies: Vec<Box<dyn Strategy<I, O>>>,
}

impl<I: ?Sized + Sync, O> Default for FallbackChain<I, O> {
  fn default() -> Self { Self { strategies: Vec::new() } }
}

impl<I, O> FallbackChain<I, O>
where
  I: ?Sized + Sync,
  O: Send,
{
  pub fn new() -> Self { Self::default() }

  /// Append a strategy; it is tried after every strategy added before it.
  pub fn with(mut self, strategy: impl Strategy<I, O> + 'static) -> Self {
    self.push(strategy);
    self
  }

  pub fn push(&mut self, strategy: impl Strategy<I, O> + 'static) {
    self.strategies.push(Box::new(strategy));
  }

  pub fn len(&self) -> usize { self.strategies.len() }

  pub fn is_empty(&self) -> bool { self.strategies.is_empty() }

  pub fn names(&self) -> Vec<&str> { self.strategies.iter().map(|s| s.name()).collect() }

  /// Try each strategy in order, returning the first success.
  pub async fn run(&self, input: &I) -> Result<Success<O>, Exhausted> {
    let mut failures = Vec::new();
    for strategy in &self.strategies {
      match strategy.attempt(input).await {
        Ok(value) => {
          debug!(strategy = strategy.name(), skipped = failures.len(), "strategy succeeded");
          return Ok(Success { value, strategy: strategy.name().to_owned() });
        }
        Err(error) => {
          warn!(strategy = strategy.name(), %error, "strategy failed");
          failures.push(Failure { strategy: strategy.name().to_owned(), error });
        }
      }
    }
    Err(Exhausted { failures })
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  };

  use super::*;

  struct Fixed {
    name:  &'static str,
    reply: Option<&'static str>,
    calls: Arc<AtomicUsize>,
  }

  #[async_trait]
  impl Strategy<str, String> for Fixed {
    fn name(&self) -> &str { self.name }

    async fn attempt(&self, input: &str) -> Result<String, BoxError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      match self.reply {
        Some(reply) => Ok(format!("{reply}:{input}")),
        None => Err(format!("{} is down", self.name).into()),
      }
    }
  }

  fn fixed(name: &'static str, reply: Option<&'static str>) -> (Fixed, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    (Fixed { name, reply, calls: calls.clone() }, calls)
  }

  #[tokio::test]
  async fn first_success_wins_and_later_strategies_are_not_called() {
    let (a, a_calls) = fixed("a", Some("A"));
    let (b, b_calls) = fixed("b", Some("B"));
    let chain = FallbackChain::new().with(a).with(b);

    let out = chain.run("x").await.unwrap();
    assert_eq!(out.value, "A:x");
    assert_eq!(out.strategy, "a");
    assert_eq!(a_calls.load(Ordering::SeqCst), 1);
    assert_eq!(b_calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn falls_back_in_order() {
    let (a, _) = fixed("a", None);
    let (b, _) = fixed("b", Some("B"));
    let chain = FallbackChain::new().with(a).with(b);

    let out = chain.run("x").await.unwrap();
    assert_eq!(out.strategy, "b");
    assert_eq!(out.value, "B:x");
  }

  #[tokio::test]
  async fn exhaustion_lists_every_failure() {
    let (a, _) = fixed("a", None);
    let (b, _) = fixed("b", None);
    let chain = FallbackChain::new().with(a).with(b);

    let err = chain.run("x").await.unwrap_err();
    let names: Vec<_> = err.failures.iter().map(|f| f.strategy.as_str()).collect();
    assert_eq!(names, ["a", "b"]);
    assert!(err.to_string().contains("b: b is down"), "{err}");
  }

  #[tokio::test]
  async fn empty_chain_is_exhausted() {
    let chain: FallbackChain<str, String> = FallbackChain::new();
    let err = chain.run("x").await.unwrap_err();
    assert!(err.failures.is_empty());
    assert_eq!(err.to_string(), "no strategies configured");
  }
}
