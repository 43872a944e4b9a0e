//! The assistant session and its lifecycle.
//!
//! One session slot exists at a time. Opening while a session is active
//! replaces it; the replaced session's callbacks are dropped without being
//! invoked. There is no cancellation of in-flight analysis calls: a response
//! that arrives for a superseded session is discarded by generation check.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{
    AnalyzeContext, AnalyzeRequest, ChatTurn, KnowledgeBase, KnowledgeSelection, Proposal,
};

use super::notify::Notifier;

/// Network capability the orchestrator consumes. Implemented by
/// [`super::ApiClient`] in production and by in-memory fakes in tests.
#[async_trait]
pub trait AssistantBackend: Send + Sync {
    async fn analyze(&self, request: AnalyzeRequest) -> Result<Proposal>;
    async fn knowledge_base(&self, project_id: i64) -> Result<KnowledgeBase>;
}

pub type ApplyFn = Box<dyn FnMut(&str) -> Result<()> + Send>;
pub type CancelFn = Box<dyn FnMut() + Send>;

pub struct OpenParams {
    pub project_id: i64,
    pub selected_text: String,
    pub context_before: String,
    pub context_after: String,
    pub chapter_id: Option<i64>,
    pub on_apply: ApplyFn,
    pub on_cancel: Option<CancelFn>,
}

struct AssistantSession {
    id: Uuid,
    generation: u64,
    project_id: i64,
    selected_text: String,
    context_before: String,
    context_after: String,
    chapter_id: Option<i64>,
    knowledge_base: KnowledgeBase,
    knowledge: KnowledgeSelection,
    instruction: String,
    history: Vec<ChatTurn>,
    proposal: Option<Proposal>,
    editable_proposal_text: String,
    busy: bool,
    default_style_id: Option<i64>,
    on_apply: Option<ApplyFn>,
    on_cancel: Option<CancelFn>,
}

/// Serializable view of the session for UI binding.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub project_id: i64,
    pub selected_text: String,
    pub chapter_id: Option<i64>,
    pub knowledge_base: KnowledgeBase,
    pub knowledge: KnowledgeSelection,
    pub instruction: String,
    pub history: Vec<ChatTurn>,
    pub proposal: Option<Proposal>,
    pub editable_proposal_text: String,
    pub busy: bool,
}

#[derive(Default)]
struct State {
    session: Option<AssistantSession>,
    generation: u64,
}

#[derive(Clone)]
pub struct AssistantOrchestrator {
    backend: Arc<dyn AssistantBackend>,
    notices: Arc<dyn Notifier>,
    state: Arc<Mutex<State>>,
}

impl AssistantOrchestrator {
    pub fn new(backend: Arc<dyn AssistantBackend>, notices: Arc<dyn Notifier>) -> Self {
        Self {
            backend,
            notices,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Begin a session. An empty `selected_text` is allowed; apply then goes
    /// to the clipboard instead of splicing a host. A session already open is
    /// silently replaced.
    pub async fn open(&self, params: OpenParams) -> Result<()> {
        let knowledge_base = match self.backend.knowledge_base(params.project_id).await {
            Ok(kb) => kb,
            Err(err) => {
                warn!("knowledge base fetch failed: {err}");
                self.notices.error("Failed to load knowledge base");
                KnowledgeBase::default()
            }
        };
        let default_style_id = knowledge_base.writing_style.as_ref().map(|style| style.id);

        let mut state = self.state.lock().await;
        state.generation += 1;
        if state.session.is_some() {
            debug!("replacing active assistant session");
        }
        state.session = Some(AssistantSession {
            id: Uuid::new_v4(),
            generation: state.generation,
            project_id: params.project_id,
            selected_text: params.selected_text,
            context_before: params.context_before,
            context_after: params.context_after,
            chapter_id: params.chapter_id,
            knowledge_base,
            knowledge: KnowledgeSelection::with_default_style(default_style_id),
            instruction: String::new(),
            history: Vec::new(),
            proposal: None,
            editable_proposal_text: String::new(),
            busy: false,
            default_style_id,
            on_apply: Some(params.on_apply),
            on_cancel: params.on_cancel,
        });
        Ok(())
    }

    pub async fn is_open(&self) -> bool {
        self.state.lock().await.session.is_some()
    }

    pub async fn snapshot(&self) -> Option<SessionSnapshot> {
        let state = self.state.lock().await;
        state.session.as_ref().map(|session| SessionSnapshot {
            id: session.id,
            project_id: session.project_id,
            selected_text: session.selected_text.clone(),
            chapter_id: session.chapter_id,
            knowledge_base: session.knowledge_base.clone(),
            knowledge: session.knowledge.clone(),
            instruction: session.instruction.clone(),
            history: session.history.clone(),
            proposal: session.proposal.clone(),
            editable_proposal_text: session.editable_proposal_text.clone(),
            busy: session.busy,
        })
    }

    /// Replace the knowledge selection from the UI pickers.
    pub async fn set_knowledge(&self, selection: KnowledgeSelection) {
        let mut state = self.state.lock().await;
        if let Some(session) = state.session.as_mut() {
            session.knowledge = selection;
        }
    }

    /// The user may freely edit the proposal text before applying; it is
    /// never re-derived from the proposal afterwards.
    pub async fn edit_proposal_text(&self, text: impl Into<String>) {
        let mut state = self.state.lock().await;
        if let Some(session) = state.session.as_mut() {
            session.editable_proposal_text = text.into();
        }
    }

    /// Run one analyze round. An empty instruction is a validation error and
    /// never issues a network call; a failed call leaves the previous
    /// proposal and history intact.
    pub async fn analyze(&self, instruction: &str) -> Result<()> {
        let trimmed = instruction.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation(
                "instruction must not be empty".to_string(),
            ));
        }

        let (request, generation) = {
            let mut state = self.state.lock().await;
            let Some(session) = state.session.as_mut() else {
                return Err(Error::Validation("assistant is not open".to_string()));
            };
            session.instruction = trimmed.to_string();
            session.busy = true;
            (
                AnalyzeRequest {
                    project_id: session.project_id,
                    selected_text: session.selected_text.clone(),
                    user_prompt: trimmed.to_string(),
                    context: AnalyzeContext {
                        chapter_id: session.chapter_id,
                        before_text: session.context_before.clone(),
                        after_text: session.context_after.clone(),
                    },
                    knowledge_selection: session.knowledge.clone(),
                },
                session.generation,
            )
        };

        let result = self.backend.analyze(request).await;

        let mut state = self.state.lock().await;
        if state.session.as_ref().map(|s| s.generation) != Some(generation) {
            debug!("discarding analyze response for a superseded session");
            return Ok(());
        }
        let Some(session) = state.session.as_mut() else {
            return Ok(());
        };
        session.busy = false;

        match result {
            Ok(proposal) => {
                session.history.push(ChatTurn::user(trimmed));
                session
                    .history
                    .push(ChatTurn::assistant(proposal.explanation.clone()));
                session.editable_proposal_text = proposal.suggested_text.clone();
                session.proposal = Some(proposal);
                self.notices.success("AI analysis complete");
                Ok(())
            }
            Err(err) => {
                self.notices.error("AI analysis failed");
                Err(err)
            }
        }
    }

    /// Clear the instruction input for a follow-up round. Conversation
    /// history and the latest proposal are preserved.
    pub async fn continue_chat(&self) {
        let mut state = self.state.lock().await;
        if let Some(session) = state.session.as_mut() {
            session.instruction.clear();
        }
    }

    /// Invoke the apply callback with the edited proposal text, then close.
    /// A closed assistant cannot be applied again. If the callback fails
    /// (e.g. a denied clipboard write) the session stays open so the text is
    /// not lost.
    pub async fn apply(&self) -> Result<()> {
        let (callback, text, generation) = {
            let mut state = self.state.lock().await;
            let Some(session) = state.session.as_mut() else {
                return Ok(());
            };
            (
                session.on_apply.take(),
                session.editable_proposal_text.clone(),
                session.generation,
            )
        };
        let Some(mut callback) = callback else {
            return Ok(());
        };

        match callback(&text) {
            Ok(()) => {
                let mut state = self.state.lock().await;
                if state.session.as_ref().map(|s| s.generation) == Some(generation) {
                    state.session = None;
                }
                Ok(())
            }
            Err(err) => {
                let mut state = self.state.lock().await;
                if let Some(session) = state.session.as_mut() {
                    if session.generation == generation {
                        session.on_apply = Some(callback);
                    }
                }
                Err(err)
            }
        }
    }

    /// Invoke the cancel callback, if any, and close the session.
    pub async fn cancel(&self) {
        let (callback, generation) = {
            let mut state = self.state.lock().await;
            match state.session.as_mut() {
                Some(session) => (session.on_cancel.take(), Some(session.generation)),
                None => (None, None),
            }
        };
        if let Some(mut callback) = callback {
            callback();
        }
        if let Some(generation) = generation {
            let mut state = self.state.lock().await;
            if state.session.as_ref().map(|s| s.generation) == Some(generation) {
                state.session = None;
            }
        }
    }

    /// Clear history, proposal and knowledge selection back to defaults
    /// without closing; the default writing style is re-seeded.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        if let Some(session) = state.session.as_mut() {
            session.history.clear();
            session.proposal = None;
            session.editable_proposal_text.clear();
            session.instruction.clear();
            session.knowledge = KnowledgeSelection::with_default_style(session.default_style_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WritingStyle;
    use crate::services::notify::Notice;
    use chrono::Utc;
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    struct FakeBackend {
        analyze_calls: Arc<StdMutex<u32>>,
        results: StdMutex<VecDeque<Result<Proposal>>>,
        style_id: Option<i64>,
        delay: Option<Duration>,
    }

    impl FakeBackend {
        fn new(results: Vec<Result<Proposal>>, style_id: Option<i64>) -> Arc<Self> {
            Arc::new(Self {
                analyze_calls: Arc::new(StdMutex::new(0)),
                results: StdMutex::new(results.into()),
                style_id,
                delay: None,
            })
        }

        fn proposal(text: &str) -> Proposal {
            Proposal {
                explanation: format!("rewrote as {text}"),
                suggested_text: text.to_string(),
                confidence: 0.9,
            }
        }
    }

    #[async_trait]
    impl AssistantBackend for FakeBackend {
        async fn analyze(&self, _request: AnalyzeRequest) -> Result<Proposal> {
            *self.analyze_calls.lock().unwrap() += 1;
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Error::Network("no scripted result".to_string())))
        }

        async fn knowledge_base(&self, project_id: i64) -> Result<KnowledgeBase> {
            Ok(KnowledgeBase {
                writing_style: self.style_id.map(|id| WritingStyle {
                    id,
                    project_id,
                    narrative_perspective: None,
                    language_style: None,
                    dialogue_style: None,
                    description_density: None,
                    custom_notes: None,
                    style_samples: Vec::new(),
                    ai_weight: 1.0,
                    is_active: true,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                }),
                ..KnowledgeBase::default()
            })
        }
    }

    struct NullNotices;
    impl Notifier for NullNotices {
        fn notify(&self, _notice: Notice) {}
    }

    fn params(applied: Arc<StdMutex<Vec<String>>>) -> OpenParams {
        OpenParams {
            project_id: 1,
            selected_text: "Hello".to_string(),
            context_before: String::new(),
            context_after: String::new(),
            chapter_id: None,
            on_apply: Box::new(move |text| {
                applied.lock().unwrap().push(text.to_string());
                Ok(())
            }),
            on_cancel: None,
        }
    }

    #[tokio::test]
    async fn empty_instruction_is_rejected_without_network() {
        let backend = FakeBackend::new(vec![], None);
        let calls = backend.analyze_calls.clone();
        let orchestrator = AssistantOrchestrator::new(backend, Arc::new(NullNotices));
        orchestrator
            .open(params(Arc::new(StdMutex::new(Vec::new()))))
            .await
            .unwrap();

        let err = orchestrator.analyze("   ").await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(*calls.lock().unwrap(), 0);
        assert!(orchestrator.snapshot().await.unwrap().history.is_empty());
    }

    #[tokio::test]
    async fn analyze_appends_turns_and_seeds_editable_text() {
        let backend = FakeBackend::new(vec![Ok(FakeBackend::proposal("Hi"))], None);
        let orchestrator = AssistantOrchestrator::new(backend, Arc::new(NullNotices));
        orchestrator
            .open(params(Arc::new(StdMutex::new(Vec::new()))))
            .await
            .unwrap();

        orchestrator.analyze("shorten it").await.unwrap();

        let snapshot = orchestrator.snapshot().await.unwrap();
        assert_eq!(snapshot.history.len(), 2);
        assert_eq!(snapshot.history[0].content, "shorten it");
        assert_eq!(snapshot.editable_proposal_text, "Hi");
        assert!(!snapshot.busy);
    }

    #[tokio::test]
    async fn failed_analyze_preserves_previous_round() {
        let backend = FakeBackend::new(
            vec![
                Ok(FakeBackend::proposal("first")),
                Err(Error::Network("boom".to_string())),
            ],
            None,
        );
        let orchestrator = AssistantOrchestrator::new(backend, Arc::new(NullNotices));
        orchestrator
            .open(params(Arc::new(StdMutex::new(Vec::new()))))
            .await
            .unwrap();

        orchestrator.analyze("round one").await.unwrap();
        let err = orchestrator.analyze("round two").await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));

        let snapshot = orchestrator.snapshot().await.unwrap();
        assert_eq!(snapshot.history.len(), 2);
        assert_eq!(snapshot.proposal.unwrap().suggested_text, "first");
        assert!(!snapshot.busy);
    }

    #[tokio::test]
    async fn reset_restores_default_knowledge_and_keeps_session_open() {
        let backend = FakeBackend::new(vec![Ok(FakeBackend::proposal("Hi"))], Some(9));
        let orchestrator = AssistantOrchestrator::new(backend, Arc::new(NullNotices));
        orchestrator
            .open(params(Arc::new(StdMutex::new(Vec::new()))))
            .await
            .unwrap();

        let mut selection = KnowledgeSelection::with_default_style(Some(9));
        selection.character_ids.insert(3);
        selection.worldview_ids.insert(4);
        orchestrator.set_knowledge(selection).await;
        orchestrator.analyze("do it").await.unwrap();

        orchestrator.reset().await;

        let snapshot = orchestrator.snapshot().await.unwrap();
        assert_eq!(
            snapshot.knowledge,
            KnowledgeSelection::with_default_style(Some(9))
        );
        assert!(snapshot.history.is_empty());
        assert!(snapshot.proposal.is_none());
        assert!(orchestrator.is_open().await);
    }

    #[tokio::test]
    async fn apply_invokes_callback_once_and_closes() {
        let backend = FakeBackend::new(vec![Ok(FakeBackend::proposal("Hi"))], None);
        let orchestrator = AssistantOrchestrator::new(backend, Arc::new(NullNotices));
        let applied = Arc::new(StdMutex::new(Vec::new()));
        orchestrator.open(params(applied.clone())).await.unwrap();
        orchestrator.analyze("shorten").await.unwrap();
        orchestrator.edit_proposal_text("Hi there").await;

        orchestrator.apply().await.unwrap();
        // The assistant is closed; applying again is a no-op.
        orchestrator.apply().await.unwrap();

        assert_eq!(applied.lock().unwrap().as_slice(), ["Hi there"]);
        assert!(!orchestrator.is_open().await);
    }

    #[tokio::test]
    async fn failed_apply_keeps_session_and_text() {
        let backend = FakeBackend::new(vec![Ok(FakeBackend::proposal("Hi"))], None);
        let orchestrator = AssistantOrchestrator::new(backend, Arc::new(NullNotices));
        let attempts = Arc::new(StdMutex::new(0u32));
        let attempts_in_callback = attempts.clone();
        orchestrator
            .open(OpenParams {
                project_id: 1,
                selected_text: String::new(),
                context_before: String::new(),
                context_after: String::new(),
                chapter_id: None,
                on_apply: Box::new(move |_text| {
                    let mut count = attempts_in_callback.lock().unwrap();
                    *count += 1;
                    if *count == 1 {
                        Err(Error::Clipboard("denied".to_string()))
                    } else {
                        Ok(())
                    }
                }),
                on_cancel: None,
            })
            .await
            .unwrap();
        orchestrator.analyze("draft something").await.unwrap();

        let err = orchestrator.apply().await.unwrap_err();
        assert!(matches!(err, Error::Clipboard(_)));
        // Text is not lost: the session is still open for a manual copy.
        assert!(orchestrator.is_open().await);

        orchestrator.apply().await.unwrap();
        assert!(!orchestrator.is_open().await);
        assert_eq!(*attempts.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn superseded_analyze_response_is_discarded() {
        let slow = Arc::new(FakeBackend {
            analyze_calls: Arc::new(StdMutex::new(0)),
            results: StdMutex::new(
                vec![Ok(FakeBackend::proposal("stale")), Ok(FakeBackend::proposal("fresh"))]
                    .into(),
            ),
            style_id: None,
            delay: Some(Duration::from_millis(40)),
        });
        let orchestrator = AssistantOrchestrator::new(slow, Arc::new(NullNotices));
        orchestrator
            .open(params(Arc::new(StdMutex::new(Vec::new()))))
            .await
            .unwrap();

        let in_flight = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move { orchestrator.analyze("old instruction").await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        // A second open replaces the session while the call is in flight.
        orchestrator
            .open(params(Arc::new(StdMutex::new(Vec::new()))))
            .await
            .unwrap();

        in_flight.await.unwrap().unwrap();

        let snapshot = orchestrator.snapshot().await.unwrap();
        assert!(snapshot.history.is_empty());
        assert!(snapshot.proposal.is_none());
    }

    #[tokio::test]
    async fn cancel_runs_callback_and_closes() {
        let backend = FakeBackend::new(vec![], None);
        let orchestrator = AssistantOrchestrator::new(backend, Arc::new(NullNotices));
        let cancelled = Arc::new(StdMutex::new(false));
        let cancelled_flag = cancelled.clone();
        orchestrator
            .open(OpenParams {
                project_id: 1,
                selected_text: String::new(),
                context_before: String::new(),
                context_after: String::new(),
                chapter_id: None,
                on_apply: Box::new(|_| Ok(())),
                on_cancel: Some(Box::new(move || {
                    *cancelled_flag.lock().unwrap() = true;
                })),
            })
            .await
            .unwrap();

        orchestrator.cancel().await;
        assert!(*cancelled.lock().unwrap());
        assert!(!orchestrator.is_open().await);
    }
}
