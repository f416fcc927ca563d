//! Routing analysis payloads
//!
//! These types mirror the JSON the platform's classification backend returns
//! (camelCase field names on the wire).

use serde::{Deserialize, Serialize};

/// A persona recommendation for one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingAnalysis {
    /// Identifier of the recommended persona (e.g. "dr_gasnelio")
    pub recommended_persona_id: String,
    /// Confidence in the recommendation (0.0-1.0)
    pub confidence: f64,
    /// Free-text explanation of the choice
    pub reasoning: String,
    /// Topic label of the question (e.g. "dosage")
    pub scope: String,
    /// Other personas that could answer, if any
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<Alternative>,
}

/// A secondary persona suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alternative {
    /// Identifier of the alternative persona
    pub persona_id: String,
    /// Confidence in the alternative (0.0-1.0)
    pub confidence: f64,
    /// Why this persona is an option
    pub reasoning: String,
}

/// Where a routing answer came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteSource {
    /// Served from the routing cache
    Cache,
    /// Freshly computed by the configured classifier
    Classifier,
    /// The remote classifier failed; computed locally instead
    Fallback,
}

impl RouteSource {
    /// Short label for status lines
    pub fn label(&self) -> &'static str {
        match self {
            RouteSource::Cache => "cached",
            RouteSource::Classifier => "analyzed",
            RouteSource::Fallback => "offline fallback",
        }
    }
}

/// A routing answer for one question
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Routed {
    /// The question as the user typed it
    pub question: String,
    /// Where the analysis came from
    pub source: RouteSource,
    /// The recommendation
    pub analysis: RoutingAnalysis,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_backend_payload() {
        let json = r#"{
            "recommendedPersonaId": "dr_gasnelio",
            "confidence": 0.85,
            "reasoning": "clinical dosage",
            "scope": "dosage",
            "alternatives": [
                {"personaId": "ga", "confidence": 0.15, "reasoning": "follow-up"}
            ]
        }"#;

        let analysis: RoutingAnalysis = serde_json::from_str(json).expect("valid payload");

        assert_eq!(analysis.recommended_persona_id, "dr_gasnelio");
        assert!((analysis.confidence - 0.85).abs() < f64::EPSILON);
        assert_eq!(analysis.scope, "dosage");
        assert_eq!(analysis.alternatives.len(), 1);
        assert_eq!(analysis.alternatives[0].persona_id, "ga");
    }

    #[test]
    fn test_alternatives_are_optional() {
        let json = r#"{
            "recommendedPersonaId": "ga",
            "confidence": 0.6,
            "reasoning": "support",
            "scope": "emotional_support"
        }"#;

        let analysis: RoutingAnalysis = serde_json::from_str(json).expect("valid payload");

        assert!(analysis.alternatives.is_empty());
    }

    #[test]
    fn test_serializes_camel_case_without_empty_alternatives() {
        let analysis = RoutingAnalysis {
            recommended_persona_id: "ga".to_string(),
            confidence: 0.5,
            reasoning: "general".to_string(),
            scope: "general".to_string(),
            alternatives: Vec::new(),
        };

        let json = serde_json::to_string(&analysis).expect("serializable");

        assert!(json.contains("\"recommendedPersonaId\":\"ga\""));
        assert!(!json.contains("alternatives"));
    }

    #[test]
    fn test_route_source_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&RouteSource::Cache).unwrap(), "\"cache\"");
        assert_eq!(serde_json::to_string(&RouteSource::Fallback).unwrap(), "\"fallback\"");
    }

    #[test]
    fn test_route_source_labels() {
        assert_eq!(RouteSource::Cache.label(), "cached");
        assert_eq!(RouteSource::Classifier.label(), "analyzed");
        assert_eq!(RouteSource::Fallback.label(), "offline fallback");
    }
}
