//! Command-line interface parsing for persona-router
//!
//! This module handles parsing of CLI arguments using clap, including the
//! --ask flag for one-shot routing without the TUI and the --persona flag
//! for starting with a persona already chosen.

use clap::Parser;
use std::path::PathBuf;
use thiserror::Error;

use crate::personas::Persona;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified persona name is not recognized
    #[error("Invalid persona: '{0}'. Valid personas: dr_gasnelio (gasnelio, tecnico), ga (empatico)")]
    UnknownPersona(String),
}

/// persona-router - Route hanseníase dispensation questions to the right assistant
#[derive(Parser, Debug)]
#[command(name = "persona-router")]
#[command(about = "Route hanseníase dispensation questions to the right assistant persona")]
#[command(version)]
pub struct Cli {
    /// Route a question and print the analysis as JSON instead of opening the TUI
    ///
    /// May be repeated; equivalent questions are classified once.
    ///
    /// Examples:
    ///   persona-router --ask "Qual a dose de rifampicina?"
    ///   persona-router --ask "Estou com medo" --ask "Posso beber álcool?"
    #[arg(long, value_name = "QUESTION")]
    pub ask: Vec<String>,

    /// Start the TUI with a persona already chosen
    ///
    /// Valid personas: dr_gasnelio (gasnelio, tecnico), ga (empatico)
    #[arg(long, value_name = "PERSONA")]
    pub persona: Option<String>,

    /// Lifetime of cached routing analyses, in seconds
    #[arg(long, value_name = "SECONDS")]
    pub ttl_secs: Option<u64>,

    /// Typing inactivity before a question is routed (300-1000 ms)
    #[arg(long, value_name = "MILLIS")]
    pub debounce_ms: Option<u64>,

    /// Base URL of the routing backend (keyword classification when unset)
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Timeout for backend requests, in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout_secs: Option<u64>,

    /// Path to a JSON settings file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, Default)]
pub struct StartupConfig {
    /// Persona chosen before the TUI opens (if specified)
    pub initial_persona: Option<&'static Persona>,
    /// Questions to route in one-shot mode; empty means interactive
    pub questions: Vec<String>,
}

/// Parses a persona string argument into a catalog persona.
///
/// # Arguments
/// * `s` - The persona string from CLI
///
/// # Returns
/// * `Ok(&Persona)` if the string matches a persona or alias
/// * `Err(CliError::UnknownPersona)` if the string doesn't match
pub fn parse_persona_arg(s: &str) -> Result<&'static Persona, CliError> {
    Persona::from_alias(s).ok_or_else(|| CliError::UnknownPersona(s.to_string()))
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError)` if an invalid persona was specified
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let initial_persona = cli.persona.as_deref().map(parse_persona_arg).transpose()?;

        Ok(StartupConfig {
            initial_persona,
            questions: cli.ask.clone(),
        })
    }

    /// Whether to skip the TUI and print analyses
    pub fn is_one_shot(&self) -> bool {
        !self.questions.is_empty()
    }
}
