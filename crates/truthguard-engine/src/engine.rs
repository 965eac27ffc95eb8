use crate::bias::BiasCoordinator;
use crate::context::AppContext;
use crate::dialogue::DialogueCoordinator;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};
use truthguard_core::{BiasReport, Message, StoredConversation, TruthGuardResult};
use truthguard_session::{PersistenceRouter, StorageKind};

/// Assistant text recorded when a dialogue request fails.
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't process your request. Please try again.";

/// What [`ConversationEngine::send_message`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input; the transcript is untouched.
    Ignored,
    /// The reply was appended.
    Replied(Message),
    /// The request failed; this fallback message was appended.
    Failed(Message),
    /// The transcript was replaced while the request was in flight; the
    /// reply was dropped.
    Superseded,
}

/// What [`ConversationEngine::analyze_bias`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// No user message to analyze. Nothing was sent.
    NoUserMessage,
    /// The report (scored or failed) is now the current report.
    Stored(BiasReport),
    /// The transcript was replaced while the request was in flight; the
    /// report was dropped.
    Superseded,
}

/// Result of [`ConversationEngine::fact_check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactCheckOutcome {
    /// No user message to check. Nothing was sent.
    NoUserMessage,
    /// The service's misinformation triggers fired.
    Flagged,
    /// The service raised no alert.
    Clear,
    /// The request failed with this message.
    Failed(String),
}

/// A send whose user message is already in the transcript and which counts
/// toward [`ConversationEngine::is_busy`]. Hand it to
/// [`ConversationEngine::complete_send`].
#[derive(Debug)]
#[must_use = "a pending send keeps the engine busy until completed"]
pub struct PendingSend {
    text: String,
    generation: u64,
}

impl PendingSend {
    /// The utterance that will be sent.
    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Default)]
struct EngineState {
    transcript: Vec<Message>,
    report: Option<BiasReport>,
    draft: String,
    /// Dialogue requests issued but not yet completed.
    in_flight: usize,
    /// Advanced whenever the transcript is replaced wholesale. A response is
    /// applied only if this still equals the value captured at dispatch.
    generation: u64,
}

impl EngineState {
    fn last_user_text(&self) -> Option<String> {
        self.transcript
            .iter()
            .rev()
            .find(|m| m.is_user())
            .map(|m| m.text().to_string())
    }

    fn begin_send(&mut self, text: &str) -> PendingSend {
        self.transcript.push(Message::user(text));
        self.in_flight += 1;
        PendingSend {
            text: text.to_string(),
            generation: self.generation,
        }
    }

    fn replace(&mut self, messages: Vec<Message>) {
        self.transcript = messages;
        self.report = None;
        self.generation += 1;
    }
}

/// Owns the live transcript and the current bias report.
///
/// All mutation happens here; the coordinators only return data. Calls may
/// overlap: the lock is never held across an await, and the generation
/// check discards answers that arrive after the transcript was replaced.
pub struct ConversationEngine {
    dialogue: Arc<DialogueCoordinator>,
    bias: Arc<BiasCoordinator>,
    persistence: Arc<PersistenceRouter>,
    state: Mutex<EngineState>,
}

impl ConversationEngine {
    /// Builds an engine over the shared services in `ctx`.
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            dialogue: ctx.dialogue().clone(),
            bias: ctx.bias().clone(),
            persistence: ctx.persistence().clone(),
            state: Mutex::new(EngineState::default()),
        }
    }

    /// Appends `text` as a user message, asks for a reply and appends it.
    ///
    /// The user message is in the transcript before the request goes out.
    /// Only `text` is sent; earlier turns are not. Overlapping calls are not
    /// refused here; use [`try_begin_send`](Self::try_begin_send) to submit
    /// only while idle.
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        let Some(pending) = self.begin_send(text) else {
            return SendOutcome::Ignored;
        };
        self.complete_send(pending).await
    }

    /// Appends the user message and marks the engine busy, without waiting
    /// for the reply. Returns `None` for blank input.
    pub fn begin_send(&self, text: &str) -> Option<PendingSend> {
        if text.trim().is_empty() {
            return None;
        }
        Some(self.state.lock().begin_send(text))
    }

    /// Like [`begin_send`](Self::begin_send), but also returns `None` while
    /// another send is outstanding. The busy check and the transition happen
    /// under one lock.
    pub fn try_begin_send(&self, text: &str) -> Option<PendingSend> {
        if text.trim().is_empty() {
            return None;
        }
        let mut state = self.state.lock();
        if state.in_flight > 0 {
            return None;
        }
        Some(state.begin_send(text))
    }

    /// Requests the reply for a begun send and appends it.
    pub async fn complete_send(&self, pending: PendingSend) -> SendOutcome {
        let PendingSend { text, generation } = pending;
        let result = self.dialogue.request(&text).await;

        let mut state = self.state.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        state.draft.clear();

        let (reply, ok) = match result {
            Ok(reply) => (
                Message::assistant(reply.text).with_misinformation_alert(reply.fake_alert),
                true,
            ),
            Err(e) => {
                warn!(error = %e, "Dialogue request failed");
                (Message::assistant_error(FALLBACK_REPLY), false)
            }
        };

        if state.generation != generation {
            info!(
                issued = generation,
                current = state.generation,
                "Discarding reply for replaced transcript"
            );
            return SendOutcome::Superseded;
        }

        state.transcript.push(reply.clone());
        if ok {
            SendOutcome::Replied(reply)
        } else {
            SendOutcome::Failed(reply)
        }
    }

    /// Analyzes the most recent user message and stores the report,
    /// replacing any earlier one. Failures are stored as error reports.
    pub async fn analyze_bias(&self) -> AnalysisOutcome {
        let (text, generation) = {
            let state = self.state.lock();
            match state.last_user_text() {
                Some(text) => (text, state.generation),
                None => return AnalysisOutcome::NoUserMessage,
            }
        };

        let report = match self.bias.request(&text).await {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "Bias analysis failed");
                BiasReport::failed(&text, e.user_message())
            }
        };

        let mut state = self.state.lock();
        if state.generation != generation {
            info!(
                issued = generation,
                current = state.generation,
                "Discarding bias report for replaced transcript"
            );
            return AnalysisOutcome::Superseded;
        }
        if let Some(band) = report.band() {
            info!(band = %band, "Bias report stored");
        }
        state.report = Some(report.clone());
        AnalysisOutcome::Stored(report)
    }

    /// Re-submits the most recent user message and reports whether the
    /// service flagged it. Leaves the transcript and report alone.
    pub async fn fact_check(&self) -> FactCheckOutcome {
        let last = self.state.lock().last_user_text();
        let Some(text) = last else {
            return FactCheckOutcome::NoUserMessage;
        };

        match self.dialogue.request(&text).await {
            Ok(reply) if reply.fake_alert => FactCheckOutcome::Flagged,
            Ok(_) => FactCheckOutcome::Clear,
            Err(e) => {
                warn!(error = %e, "Fact check failed");
                FactCheckOutcome::Failed(e.user_message())
            }
        }
    }

    /// Clears the transcript and the current report. The session is unaffected.
    pub fn new_conversation(&self) {
        self.state.lock().replace(Vec::new());
        info!("Started new conversation");
    }

    /// Replaces the transcript with a stored conversation.
    pub fn open(&self, conversation: StoredConversation) {
        info!(
            id = %conversation.id,
            messages = conversation.messages.len(),
            "Opened stored conversation"
        );
        self.state.lock().replace(conversation.messages);
    }

    /// Saves the current transcript through the persistence router.
    pub async fn save(&self) -> TruthGuardResult<StorageKind> {
        let messages = self.transcript();
        self.persistence.save(&messages).await
    }

    /// Lists conversations from the backend the session currently routes to.
    pub async fn load(&self) -> TruthGuardResult<Vec<StoredConversation>> {
        self.persistence.load().await
    }

    /// True while any dialogue request is outstanding.
    pub fn is_busy(&self) -> bool {
        self.state.lock().in_flight > 0
    }

    /// Snapshot of the live transcript.
    pub fn transcript(&self) -> Vec<Message> {
        self.state.lock().transcript.clone()
    }

    /// The most recent stored bias report, if any.
    pub fn current_report(&self) -> Option<BiasReport> {
        self.state.lock().report.clone()
    }

    /// Text the user has typed but not yet sent.
    pub fn draft(&self) -> String {
        self.state.lock().draft.clone()
    }

    /// Replaces the draft text.
    pub fn set_draft(&self, text: impl Into<String>) {
        self.state.lock().draft = text.into();
    }

    /// Current transcript generation.
    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }
}
