//! Academic Q&A. Answers questions from handbook text via the LLM.
//!
//! The whole knowledge base is sent as context; rate-limited calls are retried
//! through the shared [`RetryExecutor`].

use crate::domain::{DomainError, KnowledgeBase, LlmPrompt};
use crate::ports::LlmPort;
use crate::shared::retry::{RetryExecutor, RetryPolicy, Sleeper, TokioSleeper};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

type Classifier = fn(&DomainError) -> bool;

/// Q&A service over a loaded knowledge base.
pub struct AdvisorService<S = TokioSleeper> {
    llm: Arc<dyn LlmPort>,
    knowledge: Arc<KnowledgeBase>,
    executor: RetryExecutor<Classifier, S>,
}

impl AdvisorService<TokioSleeper> {
    pub fn new(llm: Arc<dyn LlmPort>, knowledge: Arc<KnowledgeBase>, policy: RetryPolicy) -> Self {
        Self {
            llm,
            knowledge,
            executor: RetryExecutor::new(policy, DomainError::is_transient as Classifier),
        }
    }
}

impl<S: Sleeper> AdvisorService<S> {
    /// Replace the backoff sleeper (tests).
    pub fn with_sleeper<S2: Sleeper>(self, sleeper: S2) -> AdvisorService<S2> {
        AdvisorService {
            llm: self.llm,
            knowledge: self.knowledge,
            executor: self.executor.with_sleeper(sleeper),
        }
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Swap in a freshly loaded knowledge base (after a cache rebuild).
    pub fn set_knowledge(&mut self, knowledge: Arc<KnowledgeBase>) {
        self.knowledge = knowledge;
    }

    fn system_prompt() -> &'static str {
        r#"너는 광운대학교 학사 전문 상담 비서 'KW-강의마스터'야.
너는 아래 제공된 [학습된 문서들]의 내용을 완벽하게 숙지하고 있어.

[지시사항]
1. 질문에 대한 답변은 오직 제공된 문서 내용에 기반해서 작성해.
2. 답변할 때 참고한 문서의 이름(예: 장학금규정.pdf)을 언급해줘.
3. 문서에 없는 내용은 솔직하게 모른다고 답해."#
    }

    fn user_prompt(context: &str, question: &str) -> String {
        format!(
            "[학습된 문서들]\n{}\n\n[학생의 질문]\n{}",
            context, question
        )
    }

    /// Build the prompt for a question. Temperature 0 keeps answers factual.
    pub fn build_prompt(&self, question: &str) -> LlmPrompt {
        LlmPrompt {
            system: Self::system_prompt().to_string(),
            user: Self::user_prompt(&self.knowledge.content, question),
            temperature: 0.0,
        }
    }

    /// Answer a question. Retries transient LLM failures until the policy runs out
    /// or `cancel` fires.
    pub async fn ask(
        &self,
        question: &str,
        cancel: &CancellationToken,
    ) -> Result<String, DomainError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(DomainError::Input("question is empty".into()));
        }
        if self.knowledge.is_empty() {
            return Err(DomainError::KnowledgeEmpty);
        }

        let prompt = self.build_prompt(question);
        info!(
            question_len = question.len(),
            context_len = self.knowledge.content.len(),
            "asking advisor"
        );
        self.executor
            .execute_cancellable(|| self.llm.generate(&prompt), cancel)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Fails with the queued errors first, then answers.
    struct ScriptedLlm {
        failures: Mutex<Vec<DomainError>>,
        calls: AtomicU32,
        last_prompt: Mutex<Option<LlmPrompt>>,
    }

    impl ScriptedLlm {
        fn new(mut failures: Vec<DomainError>) -> Self {
            failures.reverse();
            Self {
                failures: Mutex::new(failures),
                calls: AtomicU32::new(0),
                last_prompt: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl LlmPort for ScriptedLlm {
        async fn generate(&self, prompt: &LlmPrompt) -> Result<String, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = Some(prompt.clone());
            match self.failures.lock().unwrap().pop() {
                Some(err) => Err(err),
                None => Ok("졸업학점은 130학점입니다 (학칙.txt)".to_string()),
            }
        }
    }

    struct NoSleep;

    #[async_trait]
    impl Sleeper for NoSleep {
        async fn sleep(&self, _delay: Duration) {}
    }

    fn knowledge(text: &str) -> Arc<KnowledgeBase> {
        Arc::new(KnowledgeBase {
            content: text.to_string(),
            documents: vec!["학칙.txt".into()],
        })
    }

    fn service(llm: Arc<ScriptedLlm>, kb: Arc<KnowledgeBase>) -> AdvisorService<NoSleep> {
        AdvisorService::new(llm, kb, RetryPolicy::default()).with_sleeper(NoSleep)
    }

    #[tokio::test]
    async fn test_answers_with_context_in_prompt() {
        let llm = Arc::new(ScriptedLlm::new(vec![]));
        let svc = service(Arc::clone(&llm), knowledge("졸업학점 130"));

        let answer = svc
            .ask("졸업학점이 몇이야?", &CancellationToken::new())
            .await
            .unwrap();

        assert!(answer.contains("130"));
        let prompt = llm.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.user.contains("졸업학점 130"));
        assert!(prompt.user.contains("졸업학점이 몇이야?"));
        assert_eq!(prompt.temperature, 0.0);
    }

    #[tokio::test]
    async fn test_retries_rate_limit_then_succeeds() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            DomainError::RateLimited("429".into()),
            DomainError::Unavailable("503".into()),
        ]));
        let svc = service(Arc::clone(&llm), knowledge("doc"));

        let answer = svc.ask("질문", &CancellationToken::new()).await;
        assert!(answer.is_ok());
        assert_eq!(llm.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_fatal_error_surfaces_once() {
        let llm = Arc::new(ScriptedLlm::new(vec![DomainError::Ai("400 bad key".into())]));
        let svc = service(Arc::clone(&llm), knowledge("doc"));

        let err = svc.ask("질문", &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, DomainError::Ai(ref m) if m == "400 bad key"));
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_knowledge_refuses() {
        let llm = Arc::new(ScriptedLlm::new(vec![]));
        let svc = service(Arc::clone(&llm), Arc::new(KnowledgeBase::default()));

        let err = svc.ask("질문", &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, DomainError::KnowledgeEmpty));
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancelled_token_skips_call() {
        let llm = Arc::new(ScriptedLlm::new(vec![]));
        let svc = service(Arc::clone(&llm), knowledge("doc"));
        let token = CancellationToken::new();
        token.cancel();

        let err = svc.ask("질문", &token).await.unwrap_err();
        assert!(matches!(err, DomainError::Cancelled(_)));
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }
}
