//! In-memory provider that replays scripted responses and counts calls.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::Value;

use crate::provider::{CreateJobRequest, Job, PredictionApi, ProviderError};

enum Outcome {
    Ok(Value),
    Rejected(u16, String),
    Unreadable(String),
}

struct Reply {
    delay: Duration,
    outcome: Outcome,
}

impl Reply {
    fn now(outcome: Outcome) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome,
        }
    }

    async fn into_result(self) -> Result<Job, ProviderError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match self.outcome {
            Outcome::Ok(raw) => Job::from_value(raw),
            Outcome::Rejected(status, body) => Err(ProviderError::from_body(status, &body)),
            Outcome::Unreadable(message) => Err(ProviderError::Parse(message)),
        }
    }
}

#[derive(Default)]
pub(crate) struct ScriptedApi {
    creates: Mutex<VecDeque<Reply>>,
    polls: Mutex<VecDeque<Reply>>,
    poll_forever: Option<Value>,
    create_bodies: Mutex<Vec<Value>>,
    polled_ids: Mutex<Vec<String>>,
    poll_count: AtomicUsize,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_create(self, reply: Reply) -> Self {
        self.creates.lock().unwrap().push_back(reply);
        self
    }

    fn push_poll(self, reply: Reply) -> Self {
        self.polls.lock().unwrap().push_back(reply);
        self
    }

    pub fn create_ok(self, raw: Value) -> Self {
        self.push_create(Reply::now(Outcome::Ok(raw)))
    }

    /// Answer the next create with `raw` after `delay` has elapsed.
    pub fn create_stalled(self, delay: Duration, raw: Value) -> Self {
        self.push_create(Reply {
            delay,
            outcome: Outcome::Ok(raw),
        })
    }

    pub fn create_rejected(self, status: u16, body: &str) -> Self {
        self.push_create(Reply::now(Outcome::Rejected(status, body.to_string())))
    }

    /// Fail the next create without an HTTP status, like a transport or
    /// decoding failure.
    pub fn create_unreadable(self, message: &str) -> Self {
        self.push_create(Reply::now(Outcome::Unreadable(message.to_string())))
    }

    pub fn poll_ok(self, raw: Value) -> Self {
        self.push_poll(Reply::now(Outcome::Ok(raw)))
    }

    /// Answer the next poll with `raw` after `delay` has elapsed.
    pub fn poll_stalled(self, delay: Duration, raw: Value) -> Self {
        self.push_poll(Reply {
            delay,
            outcome: Outcome::Ok(raw),
        })
    }

    pub fn poll_rejected(self, status: u16, body: &str) -> Self {
        self.push_poll(Reply::now(Outcome::Rejected(status, body.to_string())))
    }

    /// Reply with `raw` to every poll once the scripted ones run out.
    pub fn poll_forever(mut self, raw: Value) -> Self {
        self.poll_forever = Some(raw);
        self
    }

    pub fn create_bodies(&self) -> Vec<Value> {
        self.create_bodies.lock().unwrap().clone()
    }

    pub fn polled_ids(&self) -> Vec<String> {
        self.polled_ids.lock().unwrap().clone()
    }

    pub fn poll_count(&self) -> usize {
        self.poll_count.load(Ordering::SeqCst)
    }
}

impl PredictionApi for ScriptedApi {
    async fn create_job(&self, req: &CreateJobRequest) -> Result<Job, ProviderError> {
        self.create_bodies
            .lock()
            .unwrap()
            .push(serde_json::to_value(req).unwrap());
        let reply = self
            .creates
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected create_job call");
        reply.into_result().await
    }

    async fn get_job(&self, id: &str) -> Result<Job, ProviderError> {
        self.poll_count.fetch_add(1, Ordering::SeqCst);
        self.polled_ids.lock().unwrap().push(id.to_string());
        let scripted = self.polls.lock().unwrap().pop_front();
        let reply = match scripted {
            Some(reply) => reply,
            None => Reply::now(Outcome::Ok(
                self.poll_forever
                    .clone()
                    .expect("unexpected get_job call"),
            )),
        };
        reply.into_result().await
    }
}
