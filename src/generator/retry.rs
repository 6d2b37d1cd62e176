use super::{GenerationError, TextGenerator};
use crate::config::GenerationConfig;
use async_trait::async_trait;
use log::{debug, info, warn};
use std::time::Duration;
use tokio::time::{sleep, timeout};

/// Wraps a generator with per-attempt timeouts and linear backoff retries.
///
/// Blank replies count as failures, since the extractor could only turn them
/// into an all-default recipe.
pub struct RetryingGenerator<G> {
    inner: G,
    retry_attempts: u32,
    retry_delay_ms: u64,
    attempt_timeout: Duration,
}

impl<G: TextGenerator> RetryingGenerator<G> {
    pub fn new(inner: G, config: &GenerationConfig) -> Self {
        Self {
            inner,
            retry_attempts: config.retry_attempts.max(1),
            retry_delay_ms: config.retry_delay_ms,
            attempt_timeout: config.timeout(),
        }
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }

    async fn attempt(&self, prompt: &str) -> Result<String, GenerationError> {
        let reply = timeout(self.attempt_timeout, self.inner.generate(prompt))
            .await
            .map_err(|_| GenerationError::Timeout(self.attempt_timeout.as_secs()))??;

        if reply.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(reply)
    }
}

#[async_trait]
impl<G: TextGenerator> TextGenerator for RetryingGenerator<G> {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let mut last_error = GenerationError::EmptyResponse;

        for attempt in 1..=self.retry_attempts {
            debug!(
                "Requesting generation from {} (attempt {}/{})",
                self.inner.provider_name(),
                attempt,
                self.retry_attempts
            );

            match self.attempt(prompt).await {
                Ok(reply) => {
                    info!(
                        "Generated recipe text using {} ({})",
                        self.inner.provider_name(),
                        self.inner.model_name()
                    );
                    return Ok(reply);
                }
                Err(e) => {
                    warn!(
                        "Provider {} failed (attempt {}/{}): {}",
                        self.inner.provider_name(),
                        attempt,
                        self.retry_attempts,
                        e
                    );
                    last_error = e;
                }
            }

            if attempt < self.retry_attempts {
                let delay = Duration::from_millis(self.retry_delay_ms * attempt as u64);
                debug!("Waiting {:?} before retry", delay);
                sleep(delay).await;
            }
        }

        Err(last_error)
    }

    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::StaticGenerator;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn test_config(retry_attempts: u32) -> GenerationConfig {
        GenerationConfig {
            model: "test-model".to_string(),
            retry_attempts,
            retry_delay_ms: 100,
            timeout: 5,
        }
    }

    /// Fails a fixed number of times, then succeeds.
    struct FlakyGenerator {
        failures: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextGenerator for FlakyGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(GenerationError::RequestFailed("503 Service Unavailable".into()))
            } else {
                Ok("TITLE: Recovered".to_string())
            }
        }

        fn provider_name(&self) -> &str {
            "flaky"
        }

        fn model_name(&self) -> &str {
            "flaky-1"
        }
    }

    struct SlowGenerator;

    #[async_trait]
    impl TextGenerator for SlowGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            sleep(Duration::from_secs(60)).await;
            Ok("TITLE: Too late".to_string())
        }

        fn provider_name(&self) -> &str {
            "slow"
        }

        fn model_name(&self) -> &str {
            "slow-1"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_retries() {
        let flaky = FlakyGenerator {
            failures: 2,
            calls: AtomicUsize::new(0),
        };
        let generator = RetryingGenerator::new(flaky, &test_config(3));

        let reply = generator.generate("prompt").await.unwrap();
        assert_eq!(reply, "TITLE: Recovered");
        assert_eq!(generator.inner().calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_last_error_when_exhausted() {
        let generator = RetryingGenerator::new(
            StaticGenerator::failing(GenerationError::RequestFailed("quota".into())),
            &test_config(2),
        );

        let err = generator.generate("prompt").await.unwrap_err();
        assert!(err.to_string().contains("quota"));
        assert_eq!(generator.inner().calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_reply_is_retried() {
        let generator = RetryingGenerator::new(StaticGenerator::new("  \n "), &test_config(3));

        let err = generator.generate("prompt").await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyResponse));
        assert_eq!(generator.inner().calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_timeout() {
        let generator = RetryingGenerator::new(SlowGenerator, &test_config(1));

        let err = generator.generate("prompt").await.unwrap_err();
        assert!(matches!(err, GenerationError::Timeout(5)));
    }

    #[test]
    fn test_zero_attempts_still_tries_once() {
        let generator = RetryingGenerator::new(StaticGenerator::new("x"), &test_config(0));
        assert_eq!(generator.retry_attempts, 1);
        assert_eq!(generator.attempt_timeout, Duration::from_secs(5));
        assert_eq!(generator.model_name(), "static");
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_credentials_error_is_surfaced() {
        let generator = RetryingGenerator::new(
            StaticGenerator::failing(GenerationError::NotConfigured("GEMINI_API_KEY".into())),
            &test_config(1),
        );

        let err = generator.generate("prompt").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Generation service not configured: GEMINI_API_KEY"
        );
    }
}
