//! Mock chat and search backends for testing.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::llm::{ChatFuture, ChatModel, ChatRequest, LlmError};
use crate::search::{SearchError, SearchFuture, WebSearch};

/// A configurable mock reply.
#[derive(Clone, Debug)]
pub enum MockReply {
    /// Successful text response.
    Text(String),
    /// Simulate a service failure with the given HTTP status.
    Fail(u16),
}

/// Pops replies in order, repeating the last one once the sequence is spent.
struct ReplySequence {
    /// Stored reversed so `pop()` yields the next reply.
    remaining: Mutex<Vec<MockReply>>,
    last: MockReply,
}

impl ReplySequence {
    fn new(mut replies: Vec<MockReply>) -> Self {
        assert!(!replies.is_empty(), "sequence must have at least one reply");
        let last = replies.last().cloned().unwrap();
        replies.reverse();
        Self {
            remaining: Mutex::new(replies),
            last,
        }
    }

    fn next(&self) -> MockReply {
        self.remaining
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| self.last.clone())
    }
}

/// A hand-rolled [`ChatModel`] that records every request.
pub struct MockChat {
    replies: ReplySequence,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockChat {
    /// Always answer with `reply`.
    pub fn new(reply: MockReply) -> Self {
        Self::with_sequence(vec![reply])
    }

    /// Answer with `replies` in order, repeating the last.
    pub fn with_sequence(replies: Vec<MockReply>) -> Self {
        Self {
            replies: ReplySequence::new(replies),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ChatModel for MockChat {
    fn model(&self) -> &str {
        "mock-chat"
    }

    fn complete<'a>(&'a self, request: &'a ChatRequest) -> ChatFuture<'a> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self.replies.next();
        Box::pin(async move {
            match reply {
                MockReply::Text(text) => Ok(text),
                MockReply::Fail(status) => Err(LlmError::Status {
                    status,
                    body: "mock outage".into(),
                }),
            }
        })
    }
}

/// A hand-rolled [`WebSearch`] that records every query.
pub struct MockSearch {
    replies: ReplySequence,
    queries: Mutex<Vec<String>>,
    call_count: AtomicUsize,
}

impl MockSearch {
    pub fn new(reply: MockReply) -> Self {
        Self::with_sequence(vec![reply])
    }

    pub fn with_sequence(replies: Vec<MockReply>) -> Self {
        Self {
            replies: ReplySequence::new(replies),
            queries: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl WebSearch for MockSearch {
    fn name(&self) -> &str {
        "mock-search"
    }

    fn search<'a>(&'a self, query: &'a str) -> SearchFuture<'a> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.to_string());
        let reply = self.replies.next();
        Box::pin(async move {
            match reply {
                MockReply::Text(text) if text.is_empty() => Err(SearchError::NoResults),
                MockReply::Text(text) => Ok(text),
                MockReply::Fail(status) => Err(SearchError::Status {
                    status,
                    body: "mock outage".into(),
                }),
            }
        })
    }
}
