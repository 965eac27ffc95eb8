use std::sync::Arc;
use tracing::debug;
use truthguard_core::{DialogueReply, DialogueService, TruthGuardError, TruthGuardResult};

/// Issues single-shot dialogue requests.
///
/// Only the utterance it is handed goes over the wire; no earlier turns are
/// sent, so each call is independent of the transcript.
pub struct DialogueCoordinator {
    service: Arc<dyn DialogueService>,
}

impl DialogueCoordinator {
    /// Wraps the dialogue capability.
    pub fn new(service: Arc<dyn DialogueService>) -> Self {
        Self { service }
    }

    /// One attempt, no retry. Blank input is rejected without a request.
    pub async fn request(&self, text: &str) -> TruthGuardResult<DialogueReply> {
        if text.trim().is_empty() {
            return Err(TruthGuardError::InvalidInput(
                "dialogue request text is empty".to_string(),
            ));
        }
        debug!(chars = text.chars().count(), "Requesting dialogue reply");
        self.service.generate_reply(text).await
    }
}
