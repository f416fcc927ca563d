//! Cache-first routing service

use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use super::{Classifier, RouteSource, Routed, RoutingAnalysis};
use crate::cache::{normalize, Clock, RoutingCache, SystemClock};

/// Routes questions to personas, memoizing classifier results
///
/// Owns its cache; construct one at startup and hand it to whatever needs
/// routing suggestions.
#[derive(Debug)]
pub struct Router<C: Clock = SystemClock> {
    cache: RoutingCache<C>,
    classifier: Classifier,
}

impl<C: Clock> Router<C> {
    /// Creates a router from a cache and a classifier
    pub fn new(cache: RoutingCache<C>, classifier: Classifier) -> Self {
        Self { cache, classifier }
    }

    /// The classifier used on cache misses
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// The underlying cache
    pub fn cache(&self) -> &RoutingCache<C> {
        &self.cache
    }

    /// Returns a cached analysis for `question`, if one is still fresh
    pub fn cached(&mut self, question: &str) -> Option<RoutingAnalysis> {
        self.cache.get(question)
    }

    /// Stores a classifier result for `question`
    pub fn record(&mut self, question: &str, analysis: RoutingAnalysis) {
        self.cache.set(question, analysis);
    }

    /// Routes one question, classifying only on a cache miss
    ///
    /// Fallback results are returned but not cached, so the backend is asked
    /// again next time.
    pub async fn analyze(&mut self, question: &str) -> Routed {
        if let Some(analysis) = self.cache.get(question) {
            return Routed {
                question: question.to_string(),
                source: RouteSource::Cache,
                analysis,
            };
        }

        let (analysis, source) = self.classifier.classify_with_fallback(question).await;
        info!(
            persona = %analysis.recommended_persona_id,
            scope = %analysis.scope,
            source = source.label(),
            "routed question"
        );
        if source == RouteSource::Classifier {
            self.cache.set(question, analysis.clone());
        }

        Routed {
            question: question.to_string(),
            source,
            analysis,
        }
    }

    /// Routes several questions, classifying distinct misses concurrently
    ///
    /// Answers come back in input order. A question equivalent to an earlier
    /// one in the same batch is classified once; later copies report
    /// [`RouteSource::Cache`] when the first result was cached.
    pub async fn analyze_batch(&mut self, questions: &[String]) -> Vec<Routed> {
        let mut misses: Vec<&str> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for question in questions {
            if self.cache.get(question).is_none() && seen.insert(normalize(question)) {
                misses.push(question);
            }
        }
        debug!(total = questions.len(), misses = misses.len(), "routing batch");

        let classifier = &self.classifier;
        let outcomes = join_all(
            misses
                .iter()
                .map(|question| classifier.classify_with_fallback(question)),
        )
        .await;

        let mut fresh: HashMap<String, (RoutingAnalysis, RouteSource)> = HashMap::new();
        for (question, (analysis, source)) in misses.iter().zip(outcomes) {
            if source == RouteSource::Classifier {
                self.cache.set(question, analysis.clone());
            }
            fresh.insert(normalize(question), (analysis, source));
        }

        let mut served: HashSet<String> = HashSet::new();
        let mut routed = Vec::with_capacity(questions.len());
        for question in questions {
            let key = normalize(question);
            let answer = match fresh.get(&key) {
                Some((analysis, source)) => {
                    let source = if served.insert(key) || *source == RouteSource::Fallback {
                        *source
                    } else {
                        RouteSource::Cache
                    };
                    Routed {
                        question: question.clone(),
                        source,
                        analysis: analysis.clone(),
                    }
                }
                None => self.analyze(question).await,
            };
            routed.push(answer);
        }
        routed
    }
}

impl Router<SystemClock> {
    /// Creates a router with a default cache and the keyword classifier
    pub fn offline() -> Self {
        Self::new(RoutingCache::new(), Classifier::default())
    }
}
