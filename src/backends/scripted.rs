// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::errors::GenerationError;
use crate::traits::TextGenerator;

/// Replays a fixed queue of replies, one per `generate` call.
///
/// Once the queue is empty every call fails with [`GenerationError::Unavailable`].
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String, GenerationError>>>,
    prompts: Mutex<Vec<String>>,
    latency: Option<Duration>,
}

impl ScriptedGenerator {
    pub fn new<I, T>(replies: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            prompts: Mutex::new(Vec::new()),
            latency: None,
        }
    }

    /// Queue a failure after the replies already scripted.
    pub fn then_fail(self, error: GenerationError) -> Self {
        lock(&self.replies).push_back(Err(error));
        self
    }

    /// Queue another reply.
    pub fn then_reply(self, reply: impl Into<String>) -> Self {
        lock(&self.replies).push_back(Ok(reply.into()));
        self
    }

    /// Sleep this long before answering each call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn remaining(&self) -> usize {
        lock(&self.replies).len()
    }

    /// Every prompt received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        prompt: &str,
        _max_tokens: u32,
        _temperature: f32,
    ) -> Result<String, GenerationError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        lock(&self.prompts).push(prompt.to_string());
        let next = lock(&self.replies).pop_front();
        next.unwrap_or_else(|| {
            Err(GenerationError::Unavailable(
                "scripted replies exhausted".to_string(),
            ))
        })
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replies_in_order_then_exhausted() {
        let generator = ScriptedGenerator::new(vec!["one", "two"]);

        assert_eq!(generator.generate("a", 10, 0.0).await.unwrap(), "one");
        assert_eq!(generator.generate("b", 10, 0.0).await.unwrap(), "two");
        assert!(matches!(
            generator.generate("c", 10, 0.0).await,
            Err(GenerationError::Unavailable(_))
        ));
        assert_eq!(generator.prompts(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let generator = ScriptedGenerator::new(vec!["ok"])
            .then_fail(GenerationError::Rejected("too long".to_string()))
            .then_reply("recovered");

        assert!(generator.generate("", 1, 0.0).await.is_ok());
        assert_eq!(
            generator.generate("", 1, 0.0).await,
            Err(GenerationError::Rejected("too long".to_string()))
        );
        assert_eq!(generator.generate("", 1, 0.0).await.unwrap(), "recovered");
        assert_eq!(generator.remaining(), 0);
    }

    #[tokio::test]
    async fn test_latency_delays_each_reply() {
        let generator =
            ScriptedGenerator::new(vec!["slow"]).with_latency(Duration::from_millis(20));
        assert_eq!(generator.name(), "scripted");

        let started = std::time::Instant::now();
        assert_eq!(generator.generate("p", 1, 0.0).await.unwrap(), "slow");
        assert!(started.elapsed() >= Duration::from_millis(20));
    }
}
