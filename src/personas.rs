//! Static persona catalog
//!
//! The assistant personas a routing analysis can point to. Each persona
//! answers dispensation questions about hanseníase treatment (PQT-U) in its
//! own register.

/// Response register of a persona
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonaStyle {
    /// Precise, clinical, cites dosages and protocols
    Technical,
    /// Warm, plain-language, focused on the patient's situation
    Empathetic,
}

impl PersonaStyle {
    /// Returns a human-readable label for the style
    pub fn label(&self) -> &'static str {
        match self {
            PersonaStyle::Technical => "Technical",
            PersonaStyle::Empathetic => "Empathetic",
        }
    }
}

/// An assistant profile a question can be routed to
///
/// Uses `&'static str` fields so the catalog can live in a static array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Persona {
    /// Identifier used in routing analyses (e.g. "dr_gasnelio")
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Short role description
    pub role: &'static str,
    /// Response register
    pub style: PersonaStyle,
    /// What the persona is best at
    pub description: &'static str,
}

/// All personas, in display order
pub static PERSONAS: [Persona; 2] = [
    Persona {
        id: "dr_gasnelio",
        name: "Dr. Gasnelio",
        role: "Clinical pharmacist",
        style: PersonaStyle::Technical,
        description: "Dosage, interactions, adverse effects and administration of the PQT-U regimen, answered with protocol references.",
    },
    Persona {
        id: "ga",
        name: "Gá",
        role: "Patient-care pharmacist",
        style: PersonaStyle::Empathetic,
        description: "Plain-language guidance, treatment adherence and emotional support for patients and families.",
    },
];

/// Returns every persona in the catalog
pub fn all_personas() -> &'static [Persona] {
    &PERSONAS
}

/// Looks up a persona by its routing identifier
pub fn get_persona_by_id(id: &str) -> Option<&'static Persona> {
    PERSONAS.iter().find(|persona| persona.id == id)
}

impl Persona {
    /// Parses user input into a persona.
    ///
    /// Matching is case-insensitive and supports aliases:
    /// - "dr_gasnelio" | "gasnelio" | "dr" | "tecnico" | "technical" -> Dr. Gasnelio
    /// - "ga" | "gá" | "empatico" | "empathetic" -> Gá
    pub fn from_alias(s: &str) -> Option<&'static Persona> {
        let id = match s.trim().to_lowercase().as_str() {
            "dr_gasnelio" | "gasnelio" | "dr" | "tecnico" | "técnico" | "technical" => {
                "dr_gasnelio"
            }
            "ga" | "gá" | "empatico" | "empático" | "empathetic" => "ga",
            _ => return None,
        };
        get_persona_by_id(id)
    }
}
