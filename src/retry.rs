//! Bounded retry with exponential backoff around the generator call.

use std::time::Duration;

use crate::error::GenerationError;
use crate::llm::Generator;

/// Whether a failed attempt is worth repeating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    Transient,
    Fatal,
}

/// Error-text fragments (lowercased) that mark a failure as transient.
const TRANSIENT_SIGNATURES: &[&str] = &[
    "http 429",
    "rate limit",
    "rate_limit",
    "resource_exhausted",
    "too many requests",
    "http 500",
    "internal server error",
    "internal error",
    "http 502",
    "bad gateway",
    "http 503",
    "unavailable",
    "overloaded",
    "http 504",
    "timeout",
    "timed out",
    "deadline_exceeded",
];

/// Classify a failure by the signatures in its full error chain.
pub fn classify(err: &anyhow::Error) -> RetryClass {
    let text = format!("{err:#}").to_lowercase();
    if TRANSIENT_SIGNATURES.iter().any(|sig| text.contains(sig)) {
        RetryClass::Transient
    } else {
        RetryClass::Fatal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            initial_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Delay before attempt `attempt + 1`, where `attempt` starts at 1.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.initial_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

/// Call `generator` until it succeeds, fails permanently, or runs out of
/// attempts. The returned text is trimmed and never empty.
pub fn generate_with_retry<C, S>(
    generator: &dyn Generator,
    system: &str,
    user: &str,
    policy: RetryPolicy,
    classify: C,
    mut sleep: S,
) -> Result<String, GenerationError>
where
    C: Fn(&anyhow::Error) -> RetryClass,
    S: FnMut(Duration),
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match generator.generate(system, user) {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return Err(GenerationError::EmptyResponse);
                }
                if attempt > 1 {
                    log::info!("Generation succeeded on attempt {attempt}");
                }
                return Ok(text.to_string());
            }
            Err(err) => {
                let message = format!("{err:#}");
                if classify(&err) == RetryClass::Fatal {
                    return Err(GenerationError::Permanent(message));
                }
                if attempt >= max_attempts {
                    return Err(GenerationError::Exhausted {
                        attempts: attempt,
                        last: message,
                    });
                }

                let delay = policy.delay_after(attempt);
                log::warn!(
                    "Attempt {attempt}/{max_attempts} failed with a transient error, retrying in {delay:?}: {message}"
                );
                sleep(delay);
                attempt += 1;
            }
        }
    }
}
