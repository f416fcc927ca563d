//! Persona routing
//!
//! Decides which assistant persona should answer a question. A [`Router`]
//! checks the [`RoutingCache`](crate::cache::RoutingCache) first and falls
//! back to a [`Classifier`]: either the offline [`KeywordClassifier`] or the
//! platform backend through [`RemoteClassifier`].

mod analysis;
pub mod keyword;
pub mod remote;
mod router;

pub use analysis::{Alternative, RouteSource, Routed, RoutingAnalysis};
pub use keyword::KeywordClassifier;
pub use remote::{ClassifyError, RemoteClassifier};
pub use router::Router;

use tracing::warn;

/// The classification step run on cache misses
#[derive(Debug, Clone)]
pub enum Classifier {
    /// Local keyword tables, always available
    Keyword(KeywordClassifier),
    /// The platform backend, degrading to keywords on failure
    Remote(RemoteClassifier),
}

impl Default for Classifier {
    fn default() -> Self {
        Classifier::Keyword(KeywordClassifier::new())
    }
}

impl Classifier {
    /// Picks the remote backend when a URL is configured, keywords otherwise
    pub fn from_api_url(api_url: Option<&str>, timeout: std::time::Duration) -> Self {
        match api_url {
            Some(url) => Classifier::Remote(RemoteClassifier::with_timeout(url, timeout)),
            None => Classifier::default(),
        }
    }

    /// Classifies `question`, surfacing backend failures
    pub async fn classify(&self, question: &str) -> Result<RoutingAnalysis, ClassifyError> {
        match self {
            Classifier::Keyword(keyword) => Ok(keyword.classify(question)),
            Classifier::Remote(remote) => remote.classify(question).await,
        }
    }

    /// Classifies `question`, degrading to the keyword classifier when the
    /// backend is unavailable
    pub async fn classify_with_fallback(&self, question: &str) -> (RoutingAnalysis, RouteSource) {
        match self.classify(question).await {
            Ok(analysis) => (analysis, RouteSource::Classifier),
            Err(e) => {
                warn!(error = %e, "routing backend unavailable, using keyword classifier");
                (
                    KeywordClassifier::new().classify(question),
                    RouteSource::Fallback,
                )
            }
        }
    }

    /// Short description for status lines and logs
    pub fn describe(&self) -> String {
        match self {
            Classifier::Keyword(_) => "keyword (offline)".to_string(),
            Classifier::Remote(remote) => format!("backend {}", remote.base_url()),
        }
    }
}
