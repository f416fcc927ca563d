//! Persona Router Library
//!
//! Routes hanseníase dispensation questions to the assistant persona best
//! suited to answer them, caching routing analyses by normalized question.

pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod debounce;
pub mod logging;
pub mod personas;
pub mod routing;
pub mod ui;
pub mod worker;
