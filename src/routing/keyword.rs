//! Offline keyword classifier
//!
//! Scores a question against per-scope keyword tables (Portuguese, with and
//! without accents) and recommends the persona whose register fits best.
//! Works on the normalized question, so punctuation and case never matter.

use std::cmp::Ordering;

use super::{Alternative, RoutingAnalysis};
use crate::cache::normalize;
use crate::personas::{Persona, PersonaStyle, PERSONAS};

/// Scope assigned when no keyword table matches
pub const GENERAL_SCOPE: &str = "general";

/// Base confidence before keyword evidence is counted
const BASE_CONFIDENCE: f64 = 0.5;

/// Confidence added per keyword of margin between the two registers
const CONFIDENCE_STEP: f64 = 0.1;

/// Upper bound for keyword-derived confidence
const MAX_CONFIDENCE: f64 = 0.95;

/// A topic and the phrases that signal it
struct ScopeRule {
    scope: &'static str,
    style: PersonaStyle,
    reasoning: &'static str,
    keywords: &'static [&'static str],
}

static SCOPE_RULES: [ScopeRule; 6] = [
    ScopeRule {
        scope: "dosage",
        style: PersonaStyle::Technical,
        reasoning: "Dosage question; needs the PQT-U protocol",
        keywords: &[
            "dose",
            "doses",
            "dosagem",
            "posologia",
            "mg",
            "miligramas",
            "quantos comprimidos",
            "quantidade",
            "cartela",
            "blister",
            "dose supervisionada",
            "dose mensal",
        ],
    },
    ScopeRule {
        scope: "side_effects",
        style: PersonaStyle::Technical,
        reasoning: "Adverse effect question; needs clinical assessment",
        keywords: &[
            "efeito colateral",
            "efeitos colaterais",
            "reação adversa",
            "reacao adversa",
            "reações adversas",
            "reacoes adversas",
            "pele escura",
            "urina vermelha",
            "urina laranja",
            "anemia",
            "enjoo",
            "náusea",
            "nausea",
            "coceira",
        ],
    },
    ScopeRule {
        scope: "interactions",
        style: PersonaStyle::Technical,
        reasoning: "Drug interaction question; needs pharmacological detail",
        keywords: &[
            "interação",
            "interacao",
            "interações",
            "interacoes",
            "junto com",
            "álcool",
            "alcool",
            "anticoncepcional",
            "outros remédios",
            "outros remedios",
            "misturar",
        ],
    },
    ScopeRule {
        scope: "administration",
        style: PersonaStyle::Technical,
        reasoning: "Administration question; needs precise intake instructions",
        keywords: &[
            "como tomar",
            "horário",
            "horario",
            "jejum",
            "com comida",
            "antes de comer",
            "depois de comer",
            "armazenar",
        ],
    },
    ScopeRule {
        scope: "emotional_support",
        style: PersonaStyle::Empathetic,
        reasoning: "Emotional concern; needs a warm, plain-language answer",
        keywords: &[
            "medo",
            "ansioso",
            "ansiosa",
            "preocupado",
            "preocupada",
            "triste",
            "vergonha",
            "preconceito",
            "estigma",
            "sozinho",
            "sozinha",
            "família",
            "familia",
            "contar para",
        ],
    },
    ScopeRule {
        scope: "adherence",
        style: PersonaStyle::Empathetic,
        reasoning: "Adherence concern; needs encouragement to keep treatment",
        keywords: &[
            "esqueci",
            "parar o tratamento",
            "parar de tomar",
            "abandonar",
            "desistir",
            "largar",
            "não aguento",
            "nao aguento",
            "continuar o tratamento",
        ],
    },
];

/// PQT-U drug names; any mention weighs toward the technical persona
static DRUG_NAMES: [&str; 6] = ["rifampicina", "clofazimina", "dapsona", "pqt", "pqtu", "pqt u"];

/// Local, deterministic classifier that never fails
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    /// Creates a new KeywordClassifier
    pub fn new() -> Self {
        Self
    }

    /// Recommends a persona for `question`
    pub fn classify(&self, question: &str) -> RoutingAnalysis {
        // Padding lets every phrase match on word boundaries with `contains`.
        let text = format!(" {} ", normalize(question));

        let mut technical = 0usize;
        let mut empathetic = 0usize;
        let mut best: Option<(&ScopeRule, Vec<&'static str>)> = None;

        for rule in &SCOPE_RULES {
            let matched: Vec<&'static str> = rule
                .keywords
                .iter()
                .copied()
                .filter(|keyword| contains_phrase(&text, keyword))
                .collect();
            if matched.is_empty() {
                continue;
            }

            match rule.style {
                PersonaStyle::Technical => technical += matched.len(),
                PersonaStyle::Empathetic => empathetic += matched.len(),
            }

            let beats_best = best
                .as_ref()
                .map_or(true, |(_, best_matched)| matched.len() > best_matched.len());
            if beats_best {
                best = Some((rule, matched));
            }
        }

        let drugs: Vec<&'static str> = DRUG_NAMES
            .iter()
            .copied()
            .filter(|drug| contains_phrase(&text, drug))
            .collect();
        technical += drugs.len();

        let style = match technical.cmp(&empathetic) {
            Ordering::Greater => PersonaStyle::Technical,
            Ordering::Less => PersonaStyle::Empathetic,
            Ordering::Equal => best
                .as_ref()
                .map(|(rule, _)| rule.style)
                .unwrap_or(PersonaStyle::Empathetic),
        };

        let margin = technical.abs_diff(empathetic) as f64;
        let confidence = round2((BASE_CONFIDENCE + CONFIDENCE_STEP * margin).min(MAX_CONFIDENCE));

        let (scope, reasoning) = match &best {
            Some((rule, matched)) => (
                rule.scope,
                format!("{} (matched: {})", rule.reasoning, matched.join(", ")),
            ),
            None if !drugs.is_empty() => (
                GENERAL_SCOPE,
                format!("Mentions {}; technical answer preferred", drugs.join(", ")),
            ),
            None => (
                GENERAL_SCOPE,
                "No specific topic detected; starting with a welcoming answer".to_string(),
            ),
        };

        let recommended = persona_for(style);
        let alternatives = PERSONAS
            .iter()
            .filter(|persona| persona.id != recommended.id)
            .map(|persona| Alternative {
                persona_id: persona.id.to_string(),
                confidence: round2(1.0 - confidence),
                reasoning: format!("{} perspective", persona.style.label()),
            })
            .collect();

        RoutingAnalysis {
            recommended_persona_id: recommended.id.to_string(),
            confidence,
            reasoning,
            scope: scope.to_string(),
            alternatives,
        }
    }
}

/// Returns the first persona with the given style
fn persona_for(style: PersonaStyle) -> &'static Persona {
    PERSONAS
        .iter()
        .find(|persona| persona.style == style)
        .unwrap_or(&PERSONAS[0])
}

fn contains_phrase(padded_text: &str, phrase: &str) -> bool {
    padded_text.contains(&format!(" {} ", phrase))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
