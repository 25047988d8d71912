//! Exponential backoff, independent of any transport.
//!
//! The delay after failed attempt `n` (counted from 0) is `base_delay * 2^n`.
//! No delay follows the last attempt.

use std::fmt::Display;
use std::time::Duration;

/// What to do with a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Retry,
    Fatal,
}

/// Classifies a non-success HTTP status.
///
/// 403 is a rejected credential and anything below 400 is an unexpected
/// reply; neither is retried. Every other 4xx/5xx may be transient.
pub fn classify_status(status: u16) -> Verdict {
    match status {
        403 | 0..=399 => Verdict::Fatal,
        _ => Verdict::Retry,
    }
}

/// Blocks the calling thread between attempts.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Real sleeper backed by `std::thread::sleep`.
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Last error of a failed retry loop plus how many attempts were made.
#[derive(Debug)]
pub struct RetryFailure<E> {
    pub error: E,
    pub attempts: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl BackoffPolicy {
    /// Delay after failed attempt `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Runs `op` until it succeeds, a failure is classified `Fatal`, or
    /// `max_attempts` is reached. `op` receives the 0-based attempt number.
    pub fn run<T, E, C, F>(
        &self,
        sleeper: &dyn Sleeper,
        classify: C,
        mut op: F,
    ) -> Result<T, RetryFailure<E>>
    where
        E: Display,
        C: Fn(&E) -> Verdict,
        F: FnMut(u32) -> Result<T, E>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            let error = match op(attempt) {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };
            let attempts = attempt + 1;

            if classify(&error) == Verdict::Fatal {
                crate::log(&format!(
                    "Attempt {}/{} failed with a fatal error: {}",
                    attempts, max_attempts, error
                ));
                return Err(RetryFailure { error, attempts });
            }

            if attempts >= max_attempts {
                crate::log(&format!(
                    "Attempt {}/{} failed: {}. Giving up.",
                    attempts, max_attempts, error
                ));
                return Err(RetryFailure { error, attempts });
            }

            let delay = self.delay_for(attempt);
            crate::log(&format!(
                "Attempt {}/{} failed: {}. Retrying in {:.1}s",
                attempts,
                max_attempts,
                error,
                delay.as_secs_f32()
            ));
            sleeper.sleep(delay);
            attempt += 1;
        }
    }
}
