use std::sync::Arc;
use tracing::debug;
use truthguard_core::{BiasReport, BiasService, Sentiment, TruthGuardError, TruthGuardResult};

/// Issues single-shot bias analysis requests and shapes the answer into a
/// [`BiasReport`].
pub struct BiasCoordinator {
    service: Arc<dyn BiasService>,
}

impl BiasCoordinator {
    /// Wraps the analysis capability.
    pub fn new(service: Arc<dyn BiasService>) -> Self {
        Self { service }
    }

    /// One attempt, no retry. On success the report's band is computed
    /// client-side from the score; a missing sentiment stays absent.
    pub async fn request(&self, text: &str) -> TruthGuardResult<BiasReport> {
        if text.trim().is_empty() {
            return Err(TruthGuardError::InvalidInput(
                "analysis text is empty".to_string(),
            ));
        }
        debug!(chars = text.chars().count(), "Requesting bias analysis");
        let analysis = self.service.analyze(text).await?;
        Ok(BiasReport::scored(
            analysis.text_analyzed,
            analysis.score,
            analysis.level,
            analysis.biased_phrases,
            analysis
                .sentiment
                .map(|(polarity, subjectivity)| Sentiment::new(polarity, subjectivity)),
        ))
    }
}
