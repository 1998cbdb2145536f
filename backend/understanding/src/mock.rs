use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use platelog_core::{VisionProvider, VisionRequest};

/// A vision provider that plays back canned replies, for tests and offline runs.
///
/// Queued replies are consumed in order; once the queue is empty every call
/// returns the fallback reply.
pub struct MockVision {
    queue: Mutex<VecDeque<Result<String, String>>>,
    fallback: Result<String, String>,
    calls: Mutex<usize>,
}

impl MockVision {
    pub fn new() -> Self {
        Self::with_response("MOCK123")
    }

    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback: Ok(response.into()),
            calls: Mutex::new(0),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback: Err(message.into()),
            calls: Mutex::new(0),
        }
    }

    pub fn then_reply(self, response: impl Into<String>) -> Self {
        self.push(Ok(response.into()));
        self
    }

    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.push(Err(message.into()));
        self
    }

    fn push(&self, reply: Result<String, String>) {
        if let Ok(mut queue) = self.queue.lock() {
            queue.push_back(reply);
        }
    }

    /// Number of `describe` calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.lock().map(|c| *c).unwrap_or(0)
    }
}

impl Default for MockVision {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VisionProvider for MockVision {
    fn name(&self) -> &str {
        "mock"
    }

    async fn describe(&self, _request: &VisionRequest<'_>) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls += 1;
        }
        let next = self
            .queue
            .lock()
            .ok()
            .and_then(|mut q| q.pop_front())
            .unwrap_or_else(|| self.fallback.clone());
        match next {
            Ok(text) => Ok(text),
            Err(message) => bail!(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platelog_core::{ImageUpload, PLATE_PROMPT};

    #[tokio::test]
    async fn test_queue_then_fallback() {
        let mock = MockVision::with_response("LAST").then_reply("FIRST").then_fail("boom");
        let image = ImageUpload::new(vec![1, 2, 3], None).unwrap();
        let req = VisionRequest { prompt: PLATE_PROMPT, image: &image };

        assert_eq!(mock.describe(&req).await.unwrap(), "FIRST");
        assert_eq!(mock.describe(&req).await.unwrap_err().to_string(), "boom");
        assert_eq!(mock.describe(&req).await.unwrap(), "LAST");
        assert_eq!(mock.calls(), 3);
    }
}
