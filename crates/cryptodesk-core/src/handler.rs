//! Fan-out executor over an ordered list of wrappers.
//!
//! [`WrapperHandler`] drives a caller-supplied closure against its wrappers
//! under a [`RetryPolicy`]:
//!
//! - [`try_call`](WrapperHandler::try_call) returns the first success,
//!   starting at the wrapper that succeeded last time;
//! - [`try_call_all`](WrapperHandler::try_call_all) visits every wrapper and
//!   returns the successes keyed by wrapper name, in handler order.
//!
//! Providers are visited one after another; nothing runs in parallel. The
//! handler is the only component that logs call attempts.
//!
//! The cursor makes `try_call` take `&mut self`: a handler shared between
//! callers must be guarded by the caller (for example behind a `Mutex`).

use std::thread;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::retry::RetryPolicy;
use crate::wrapper::{SourceError, Wrapper};

/// Ordered fan-out executor. `W` is a domain capability trait object such as
/// `dyn MarketWrapper`.
pub struct WrapperHandler<W: ?Sized> {
    wrappers: Vec<Box<W>>,
    cursor: usize,
    retry: RetryPolicy,
}

impl<W: ?Sized + Wrapper> WrapperHandler<W> {
    pub fn new(wrappers: Vec<Box<W>>, retry: RetryPolicy) -> Self {
        Self {
            wrappers,
            cursor: 0,
            retry,
        }
    }

    /// Index of the wrapper the next [`try_call`](Self::try_call) starts at.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn len(&self) -> usize {
        self.wrappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wrappers.is_empty()
    }

    /// Wrapper names in handler order.
    pub fn names(&self) -> Vec<&'static str> {
        self.wrappers.iter().map(|wrapper| wrapper.name()).collect()
    }

    /// First-success call.
    ///
    /// Starting at the cursor, each wrapper gets up to
    /// `attempts_per_wrapper` invocations (sleeping the policy delay between
    /// failed attempts on the same wrapper) before the handler moves on to the
    /// next one, wrapping around. On success the cursor is left on the
    /// succeeding wrapper.
    ///
    /// # Errors
    ///
    /// [`CoreError::AllWrappersFailed`] carrying the last wrapper error once
    /// every attempt on every wrapper has failed, or immediately when the
    /// handler has no wrappers.
    pub fn try_call<T, F>(&mut self, mut call: F) -> Result<T, CoreError>
    where
        F: FnMut(&W) -> Result<T, SourceError>,
    {
        let count = self.wrappers.len();
        let mut attempts = 0;
        let mut last_error = None;

        for step in 0..count {
            let index = (self.cursor + step) % count;
            let wrapper = self.wrappers[index].as_ref();

            match self.attempt(wrapper, &mut call, &mut attempts) {
                Ok(value) => {
                    self.cursor = index;
                    return Ok(value);
                }
                Err(error) => last_error = Some(error),
            }
        }

        Err(CoreError::AllWrappersFailed {
            attempts,
            last: last_error,
        })
    }

    /// Collect-all call.
    ///
    /// Every wrapper is visited in handler order with the same per-wrapper
    /// retry budget as [`try_call`](Self::try_call). The cursor is untouched.
    ///
    /// # Errors
    ///
    /// [`CoreError::AllWrappersFailed`] only when no wrapper succeeded.
    pub fn try_call_all<T, F>(&self, mut call: F) -> Result<ProviderResults<T>, CoreError>
    where
        F: FnMut(&W) -> Result<T, SourceError>,
    {
        let mut results = ProviderResults::with_capacity(self.wrappers.len());
        let mut attempts = 0;
        let mut last_error = None;

        for wrapper in &self.wrappers {
            match self.attempt(wrapper.as_ref(), &mut call, &mut attempts) {
                Ok(value) => results.push(wrapper.name(), value),
                Err(error) => last_error = Some(error),
            }
        }

        if results.is_empty() {
            return Err(CoreError::AllWrappersFailed {
                attempts,
                last: last_error,
            });
        }
        Ok(results)
    }

    fn attempt<T, F>(
        &self,
        wrapper: &W,
        call: &mut F,
        attempts: &mut usize,
    ) -> Result<T, SourceError>
    where
        F: FnMut(&W) -> Result<T, SourceError>,
    {
        let max_attempts = self.retry.attempts_per_wrapper();
        let mut attempt = 1;

        loop {
            *attempts += 1;
            match call(wrapper) {
                Ok(value) => {
                    debug!(wrapper = wrapper.name(), attempt, "wrapper call succeeded");
                    return Ok(value);
                }
                Err(error) => {
                    warn!(
                        wrapper = wrapper.name(),
                        attempt,
                        max_attempts,
                        code = error.code(),
                        origin = %error.location(),
                        "{}",
                        error.message()
                    );
                    if attempt >= max_attempts {
                        return Err(error);
                    }
                }
            }

            attempt += 1;
            if !self.retry.delay().is_zero() {
                thread::sleep(self.retry.delay());
            }
        }
    }
}

/// Successful results of a collect-all call, keyed by wrapper name.
///
/// Iteration order is the handler's wrapper order. Serializes as a JSON
/// object with the same key order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResults<T> {
    entries: Vec<(&'static str, T)>,
}

impl<T> Default for ProviderResults<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> ProviderResults<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Appends a result; a second result for the same name replaces the first
    /// in place.
    pub fn push(&mut self, name: &'static str, value: T) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == name)
            .map(|(_, value)| value)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(name, _)| *name).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &T)> {
        self.entries.iter().map(|(name, value)| (*name, value))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn into_values(self) -> impl Iterator<Item = T> {
        self.entries.into_iter().map(|(_, value)| value)
    }
}

impl<T> ProviderResults<Vec<T>> {
    /// All items of every provider, provider by provider.
    pub fn flatten(self) -> Vec<T> {
        self.into_values().flatten().collect()
    }
}

impl<T> IntoIterator for ProviderResults<T> {
    type Item = (&'static str, T);
    type IntoIter = std::vec::IntoIter<(&'static str, T)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<T> FromIterator<(&'static str, T)> for ProviderResults<T> {
    fn from_iter<I: IntoIterator<Item = (&'static str, T)>>(iter: I) -> Self {
        let mut results = Self::new();
        for (name, value) in iter {
            results.push(name, value);
        }
        results
    }
}

impl<T: Serialize> Serialize for ProviderResults<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
