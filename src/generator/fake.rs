use super::{GenerationError, TextGenerator};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Generator that always answers with the same reply (or the same failure).
///
/// Counts calls so tests can assert on retry behaviour.
#[derive(Debug)]
pub struct StaticGenerator {
    reply: Result<String, GenerationError>,
    model: String,
    calls: AtomicUsize,
}

impl StaticGenerator {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            model: "static".to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    /// A generator whose every call fails with `error`.
    pub fn failing(error: GenerationError) -> Self {
        Self {
            reply: Err(error),
            model: "static".to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for StaticGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone()
    }

    fn provider_name(&self) -> &str {
        "static"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
