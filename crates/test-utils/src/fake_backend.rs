use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use querydag::exec::AnswerBackend;

/// Scripted behaviour for one question.
#[derive(Debug, Clone)]
pub enum FakeBehaviour {
    /// Answer immediately.
    Answer(String),
    /// Fail immediately with this error message.
    Fail(String),
    /// Sleep, then answer.
    DelayThenAnswer(Duration, String),
}

/// Observable event recorded by the fake backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeEvent {
    Started {
        question: String,
        context: Option<String>,
    },
    Finished {
        question: String,
    },
}

/// A fake answering backend that:
/// - answers/fails/delays per scripted behaviour (echoes by default)
/// - records start/finish events and the context each call received
/// - tracks peak concurrent invocations, for concurrency-bound assertions.
pub struct FakeAnswerer {
    behaviours: HashMap<String, FakeBehaviour>,
    events: Arc<Mutex<Vec<FakeEvent>>>,
    inflight: Arc<AtomicUsize>,
    peak_inflight: Arc<AtomicUsize>,
}

impl FakeAnswerer {
    pub fn new() -> Self {
        Self {
            behaviours: HashMap::new(),
            events: Arc::new(Mutex::new(Vec::new())),
            inflight: Arc::new(AtomicUsize::new(0)),
            peak_inflight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn answer_with(mut self, question: &str, answer: &str) -> Self {
        self.behaviours.insert(
            question.to_string(),
            FakeBehaviour::Answer(answer.to_string()),
        );
        self
    }

    pub fn fail_with(mut self, question: &str, error: &str) -> Self {
        self.behaviours
            .insert(question.to_string(), FakeBehaviour::Fail(error.to_string()));
        self
    }

    pub fn delay_then_answer(mut self, question: &str, delay: Duration, answer: &str) -> Self {
        self.behaviours.insert(
            question.to_string(),
            FakeBehaviour::DelayThenAnswer(delay, answer.to_string()),
        );
        self
    }

    /// Snapshot of all recorded events, in order.
    pub fn events(&self) -> Vec<FakeEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Questions in the order the backend started answering them.
    pub fn started_questions(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                FakeEvent::Started { question, .. } => Some(question),
                FakeEvent::Finished { .. } => None,
            })
            .collect()
    }

    /// Context received for a question, if it was invoked.
    pub fn context_of(&self, question: &str) -> Option<Option<String>> {
        self.events().into_iter().find_map(|e| match e {
            FakeEvent::Started {
                question: q,
                context,
            } if q == question => Some(context),
            _ => None,
        })
    }

    /// Whether the backend was ever invoked for this question.
    pub fn was_invoked(&self, question: &str) -> bool {
        self.context_of(question).is_some()
    }

    /// Highest number of simultaneously in-flight invocations observed.
    pub fn peak_inflight(&self) -> usize {
        self.peak_inflight.load(Ordering::SeqCst)
    }
}

impl Default for FakeAnswerer {
    fn default() -> Self {
        Self::new()
    }
}

impl AnswerBackend for FakeAnswerer {
    fn answer(
        &self,
        question: &str,
        context: Option<&str>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + '_>> {
        let question = question.to_string();
        let context = context.map(str::to_string);
        let behaviour = self
            .behaviours
            .get(&question)
            .cloned()
            .unwrap_or_else(|| FakeBehaviour::Answer(format!("answered: {question}")));

        let events = Arc::clone(&self.events);
        let inflight = Arc::clone(&self.inflight);
        let peak = Arc::clone(&self.peak_inflight);

        Box::pin(async move {
            {
                let mut guard = events.lock().unwrap();
                guard.push(FakeEvent::Started {
                    question: question.clone(),
                    context,
                });
            }
            let now = inflight.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);

            let outcome = match behaviour {
                FakeBehaviour::Answer(answer) => Ok(answer),
                FakeBehaviour::Fail(error) => Err(anyhow::anyhow!(error)),
                FakeBehaviour::DelayThenAnswer(delay, answer) => {
                    tokio::time::sleep(delay).await;
                    Ok(answer)
                }
            };

            inflight.fetch_sub(1, Ordering::SeqCst);
            {
                let mut guard = events.lock().unwrap();
                guard.push(FakeEvent::Finished { question });
            }

            outcome
        })
    }
}
