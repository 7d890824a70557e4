// src/exec/backend.rs

//! The answering callback boundary.
//!
//! The scheduler never inspects how a question is answered; it only needs
//! an operation that turns `(question, upstream context)` into an answer or
//! an error. Production callers implement [`AnswerBackend`] over whatever
//! they use to answer sub-questions (retrieval, SQL, a model call);
//! tests and the CLI use the adapters below.

use std::future::Future;
use std::pin::Pin;

/// Opaque, possibly slow, possibly failing answering operation.
///
/// Implementations may block internally (network, database); the executor
/// runs each invocation on its own worker so a slow answer for one task
/// never delays an unrelated ready task while pool capacity remains.
pub trait AnswerBackend: Send + Sync {
    /// Answer one sub-question.
    ///
    /// `context` carries the concatenated answers of the task's completed
    /// dependencies, absent for independent tasks.
    fn answer(
        &self,
        question: &str,
        context: Option<&str>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + '_>>;
}

/// Adapter turning a synchronous closure into an [`AnswerBackend`].
pub struct FnBackend<F>(F);

impl<F> FnBackend<F>
where
    F: Fn(&str, Option<&str>) -> anyhow::Result<String> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> AnswerBackend for FnBackend<F>
where
    F: Fn(&str, Option<&str>) -> anyhow::Result<String> + Send + Sync,
{
    fn answer(
        &self,
        question: &str,
        context: Option<&str>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + '_>> {
        let result = (self.0)(question, context);
        Box::pin(async move { result })
    }
}

/// Placeholder backend used by `--dry-run`-adjacent simulation: echoes each
/// question as its own answer, noting how much upstream context it saw.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoBackend;

impl AnswerBackend for EchoBackend {
    fn answer(
        &self,
        question: &str,
        context: Option<&str>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + '_>> {
        let answer = match context {
            Some(ctx) => format!(
                "[simulated] {question} (saw {} upstream answer(s))",
                ctx.lines().count()
            ),
            None => format!("[simulated] {question}"),
        };
        Box::pin(async move { Ok(answer) })
    }
}
