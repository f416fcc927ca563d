//! Application state management for persona-router
//!
//! This module contains the main application state, handling keyboard input,
//! debounced routing of the typed question, and state transitions between
//! the question view and the persona list.

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Instant;
use tracing::debug;

use crate::cache::normalize;
use crate::cli::StartupConfig;
use crate::debounce::Debouncer;
use crate::personas::{all_personas, get_persona_by_id, Persona};
use crate::routing::{RouteSource, Router, RoutingAnalysis};
use crate::worker::{try_recv, AnalysisMessage, AnalysisWorker};

/// Application state enum representing the current view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Typing a question and watching the routing suggestion
    Asking,
    /// Browsing the persona catalog to pick one manually
    PersonaList,
}

/// The routing suggestion currently shown
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    /// Question the analysis answers
    pub question: String,
    /// The routing analysis
    pub analysis: RoutingAnalysis,
    /// Where the analysis came from
    pub source: RouteSource,
}

impl Recommendation {
    /// The recommended persona, if it exists in the catalog
    pub fn persona(&self) -> Option<&'static Persona> {
        get_persona_by_id(&self.analysis.recommended_persona_id)
    }
}

/// Main application struct managing state and data
pub struct App {
    /// Current application state/view
    pub state: AppState,
    /// Question being typed
    pub question: String,
    /// Latest routing suggestion for the question
    pub recommendation: Option<Recommendation>,
    /// Persona the user adopted, either from a suggestion or the list
    pub chosen_persona: Option<&'static Persona>,
    /// Index of the highlighted persona in list view
    pub selected_index: usize,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    /// When the current recommendation was produced
    pub last_analysis: Option<DateTime<Local>>,
    /// Question submitted to the worker and not answered yet
    pub pending_question: Option<String>,
    /// Cache-first routing service
    router: Router,
    /// Waits for typing to pause before routing
    debouncer: Debouncer,
    /// Runs classification off the UI loop
    worker: AnalysisWorker,
}

impl App {
    /// Creates a new App with an offline router and default debounce
    pub fn new() -> Self {
        Self::with_router(Router::offline(), Debouncer::default())
    }

    /// Creates a new App around an existing router and debouncer
    pub fn with_router(router: Router, debouncer: Debouncer) -> Self {
        Self {
            state: AppState::Asking,
            question: String::new(),
            recommendation: None,
            chosen_persona: None,
            selected_index: 0,
            should_quit: false,
            show_help: false,
            last_analysis: None,
            pending_question: None,
            router,
            debouncer,
            worker: AnalysisWorker::new(),
        }
    }

    /// Creates a new App with the given startup configuration.
    ///
    /// # Arguments
    /// * `config` - The startup configuration derived from CLI arguments
    /// * `router` - Routing service built from settings
    /// * `debouncer` - Debouncer built from settings
    pub fn with_startup_config(config: StartupConfig, router: Router, debouncer: Debouncer) -> Self {
        let mut app = Self::with_router(router, debouncer);

        if let Some(persona) = config.initial_persona {
            app.chosen_persona = Some(persona);
            app.selected_index = persona_index(persona);
        }

        app
    }

    /// The routing service
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Whether a classification is running for the current question
    pub fn is_analyzing(&self) -> bool {
        self.pending_question.is_some()
    }

    /// Returns the total number of personas
    pub fn persona_count(&self) -> usize {
        all_personas().len()
    }

    /// Returns the persona highlighted in list view, if any
    pub fn selected_persona(&self) -> Option<&'static Persona> {
        all_personas().get(self.selected_index)
    }

    /// Handles keyboard input using the current instant for debouncing
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        self.handle_key_at(key_event, Instant::now());
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `Ctrl-C`: Quit from anywhere
    /// - `F1`: Toggle help
    /// - Asking: characters and `Backspace` edit the question, `Enter`
    ///   adopts the suggested persona, `Tab` opens the persona list, `Esc`
    ///   clears the question (quits when already empty)
    /// - PersonaList: `Up`/`k`, `Down`/`j` move, `Enter` chooses, `Esc`/`Tab`
    ///   go back, `?` toggles help, `q` quits
    pub fn handle_key_at(&mut self, key_event: KeyEvent, now: Instant) {
        if key_event.modifiers.contains(KeyModifiers::CONTROL)
            && key_event.code == KeyCode::Char('c')
        {
            self.should_quit = true;
            return;
        }

        // Handle help overlay - intercepts all keys when shown
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {} // Ignore other keys when help is shown
            }
            return;
        }

        match self.state {
            AppState::Asking => match key_event.code {
                KeyCode::Char(c)
                    if !key_event
                        .modifiers
                        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
                {
                    self.question.push(c);
                    self.debouncer.touch(now);
                }
                KeyCode::Backspace => {
                    if self.question.pop().is_some() {
                        self.debouncer.touch(now);
                    }
                }
                KeyCode::Enter => {
                    self.adopt_recommendation();
                }
                KeyCode::Tab => {
                    self.state = AppState::PersonaList;
                }
                KeyCode::Esc => {
                    if self.question.is_empty() {
                        self.should_quit = true;
                    } else {
                        self.clear_question();
                    }
                }
                KeyCode::F(1) => {
                    self.show_help = true;
                }
                _ => {}
            },
            AppState::PersonaList => match key_event.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                }
                KeyCode::Esc | KeyCode::Tab => {
                    self.state = AppState::Asking;
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.move_selection_up();
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.move_selection_down();
                }
                KeyCode::Enter => {
                    if let Some(persona) = self.selected_persona() {
                        self.chosen_persona = Some(persona);
                        self.state = AppState::Asking;
                    }
                }
                KeyCode::Char('?') | KeyCode::F(1) => {
                    self.show_help = true;
                }
                _ => {}
            },
        }
    }

    /// Advances time-driven work: applies finished analyses, then routes the
    /// question if typing has paused long enough
    pub fn tick(&mut self, now: Instant) {
        while let Some(message) = try_recv(&mut self.worker) {
            self.apply_message(message);
        }

        if self.debouncer.ready(now) {
            self.route_current_question();
        }
    }

    /// Routes the typed question: cache hits apply immediately, misses go to
    /// the background worker
    fn route_current_question(&mut self) {
        let question = self.question.trim().to_string();
        if question.is_empty() {
            self.worker.cancel();
            self.pending_question = None;
            self.recommendation = None;
            return;
        }

        if let Some(analysis) = self.router.cached(&question) {
            self.worker.cancel();
            self.pending_question = None;
            self.set_recommendation(question, analysis, RouteSource::Cache);
            return;
        }

        self.worker
            .submit(self.router.classifier().clone(), question.clone());
        self.pending_question = Some(question);
    }

    /// Applies a finished analysis if it answers the question still pending
    fn apply_message(&mut self, message: AnalysisMessage) {
        let AnalysisMessage::Completed {
            question,
            analysis,
            source,
        } = message;

        if self.pending_question.as_deref() != Some(question.as_str()) {
            debug!(question = %question, "dropping stale analysis");
            return;
        }
        self.pending_question = None;

        if source == RouteSource::Classifier {
            self.router.record(&question, analysis.clone());
        }

        // The box may have been edited while the analysis ran
        if !self.is_current_question(&question) {
            debug!(question = %question, "question edited during analysis, not shown");
            return;
        }
        self.set_recommendation(question, analysis, source);
    }

    /// Whether `question` is equivalent to the text in the question box
    fn is_current_question(&self, question: &str) -> bool {
        normalize(&self.question) == normalize(question)
    }

    fn set_recommendation(&mut self, question: String, analysis: RoutingAnalysis, source: RouteSource) {
        self.recommendation = Some(Recommendation {
            question,
            analysis,
            source,
        });
        self.last_analysis = Some(Local::now());
    }

    /// Adopts the suggested persona, if it is in the catalog
    fn adopt_recommendation(&mut self) {
        let Some(recommendation) = &self.recommendation else {
            return;
        };
        if !self.is_current_question(&recommendation.question) {
            return;
        }
        if let Some(persona) = recommendation.persona() {
            self.chosen_persona = Some(persona);
            self.selected_index = persona_index(persona);
        }
    }

    /// Empties the question box and forgets any suggestion for it
    pub fn clear_question(&mut self) {
        self.question.clear();
        self.recommendation = None;
        self.pending_question = None;
        self.debouncer.cancel();
        self.worker.cancel();
    }

    /// Moves the selection up in the list, wrapping to bottom if at top
    fn move_selection_up(&mut self) {
        let count = self.persona_count();
        if count == 0 {
            return;
        }
        if self.selected_index == 0 {
            self.selected_index = count - 1;
        } else {
            self.selected_index -= 1;
        }
    }

    /// Moves the selection down in the list, wrapping to top if at bottom
    fn move_selection_down(&mut self) {
        let count = self.persona_count();
        if count == 0 {
            return;
        }
        self.selected_index = (self.selected_index + 1) % count;
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Position of a persona in the catalog
fn persona_index(persona: &Persona) -> usize {
    all_personas()
        .iter()
        .position(|p| p.id == persona.id)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::KeywordClassifier;
    use std::time::Duration;

    /// Helper to create a KeyEvent for testing
    fn key_event(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str, now: Instant) {
        for c in text.chars() {
            app.handle_key_at(key_event(KeyCode::Char(c)), now);
        }
    }

    /// An instant comfortably past the default debounce delay
    fn after_debounce(from: Instant) -> Instant {
        from + Duration::from_secs(2)
    }

    /// Ticks until the worker answers or the timeout elapses
    async fn wait_for_analysis(app: &mut App, now: Instant) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.is_analyzing() && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
            app.tick(now);
        }
    }

    // ========================================================================
    // Initial state
    // ========================================================================

    #[test]
    fn test_initial_state_is_asking() {
        let app = App::new();
        assert_eq!(app.state, AppState::Asking);
        assert!(app.question.is_empty());
        assert!(app.recommendation.is_none());
        assert!(app.chosen_persona.is_none());
        assert!(!app.should_quit);
        assert!(!app.is_analyzing());
    }

    #[test]
    fn test_default_creates_same_as_new() {
        let app1 = App::new();
        let app2 = App::default();

        assert_eq!(app1.state, app2.state);
        assert_eq!(app1.selected_index, app2.selected_index);
        assert_eq!(app1.should_quit, app2.should_quit);
    }

    #[test]
    fn test_with_startup_config_sets_persona() {
        let config = StartupConfig {
            initial_persona: get_persona_by_id("ga"),
            questions: Vec::new(),
        };
        let app = App::with_startup_config(config, Router::offline(), Debouncer::default());

        assert_eq!(app.chosen_persona.map(|p| p.id), Some("ga"));
        assert_eq!(app.selected_index, 1);
    }

    // ========================================================================
    // Question editing
    // ========================================================================

    #[test]
    fn test_typing_appends_to_question() {
        let mut app = App::new();
        type_text(&mut app, "Qual a dose?", Instant::now());
        assert_eq!(app.question, "Qual a dose?");
    }

    #[test]
    fn test_shifted_characters_are_typed() {
        let mut app = App::new();
        app.handle_key(KeyEvent::new(KeyCode::Char('Q'), KeyModifiers::SHIFT));
        assert_eq!(app.question, "Q");
    }

    #[test]
    fn test_backspace_removes_last_character() {
        let mut app = App::new();
        type_text(&mut app, "dose", Instant::now());

        app.handle_key(key_event(KeyCode::Backspace));
        assert_eq!(app.question, "dos");
    }

    #[test]
    fn test_backspace_on_empty_question_is_harmless() {
        let mut app = App::new();
        app.handle_key(key_event(KeyCode::Backspace));
        assert!(app.question.is_empty());
    }

    #[test]
    fn test_q_is_typed_not_quit_while_asking() {
        let mut app = App::new();
        app.handle_key(key_event(KeyCode::Char('q')));
        assert!(!app.should_quit);
        assert_eq!(app.question, "q");
    }

    #[test]
    fn test_esc_clears_question_then_quits() {
        let mut app = App::new();
        type_text(&mut app, "dose", Instant::now());

        app.handle_key(key_event(KeyCode::Esc));
        assert!(app.question.is_empty());
        assert!(!app.should_quit);

        app.handle_key(key_event(KeyCode::Esc));
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits_from_anywhere() {
        let mut app = App::new();
        app.state = AppState::PersonaList;
        app.show_help = true;

        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));

        assert!(app.should_quit);
    }

    // ========================================================================
    // Debounced routing
    // ========================================================================

    #[test]
    fn test_tick_before_delay_does_not_route() {
        let mut app = App::new();
        let t0 = Instant::now();
        type_text(&mut app, "qual a dose", t0);

        app.tick(t0 + Duration::from_millis(100));

        assert!(app.recommendation.is_none());
        assert!(!app.is_analyzing());
    }

    #[test]
    fn test_cache_hit_applies_without_worker() {
        let mut router = Router::offline();
        let analysis = KeywordClassifier::new().classify("Qual a dose de rifampicina?");
        router.record("Qual a dose de rifampicina?", analysis.clone());

        let mut app = App::with_router(router, Debouncer::default());
        let t0 = Instant::now();
        type_text(&mut app, "QUAL A DOSE DE RIFAMPICINA", t0);
        app.tick(after_debounce(t0));

        let recommendation = app.recommendation.as_ref().expect("cache hit should apply");
        assert_eq!(recommendation.source, RouteSource::Cache);
        assert_eq!(recommendation.analysis, analysis);
        assert!(!app.is_analyzing());
        assert!(app.last_analysis.is_some());
    }

    #[test]
    fn test_blank_question_clears_recommendation() {
        let mut router = Router::offline();
        router.record("dose", KeywordClassifier::new().classify("dose"));
        let mut app = App::with_router(router, Debouncer::default());

        let t0 = Instant::now();
        type_text(&mut app, "dose", t0);
        app.tick(after_debounce(t0));
        assert!(app.recommendation.is_some());

        let t1 = after_debounce(t0);
        for _ in 0..4 {
            app.handle_key_at(key_event(KeyCode::Backspace), t1);
        }
        type_text(&mut app, "   ", t1);
        app.tick(after_debounce(t1));

        assert!(app.recommendation.is_none());
    }

    #[tokio::test]
    async fn test_cache_miss_is_analyzed_and_recorded() {
        let mut app = App::new();
        let t0 = Instant::now();
        type_text(&mut app, "Qual a dose de rifampicina?", t0);

        let now = after_debounce(t0);
        app.tick(now);
        assert!(app.is_analyzing());

        wait_for_analysis(&mut app, now).await;

        let recommendation = app.recommendation.as_ref().expect("analysis should arrive");
        assert_eq!(recommendation.source, RouteSource::Classifier);
        assert_eq!(recommendation.analysis.recommended_persona_id, "dr_gasnelio");
        assert_eq!(app.router().cache().len(), 1);
    }

    #[tokio::test]
    async fn test_equivalent_question_hits_cache_after_analysis() {
        let mut app = App::new();
        let t0 = Instant::now();
        type_text(&mut app, "Qual a dose de rifampicina?", t0);
        let now = after_debounce(t0);
        app.tick(now);
        wait_for_analysis(&mut app, now).await;

        app.clear_question();
        type_text(&mut app, "qual a dose de rifampicina", now);
        app.tick(after_debounce(now));

        let recommendation = app.recommendation.as_ref().expect("cache hit should apply");
        assert_eq!(recommendation.source, RouteSource::Cache);
    }

    #[test]
    fn test_stale_message_is_dropped_and_not_cached() {
        let mut app = App::new();
        app.pending_question = Some("pergunta atual".to_string());

        app.apply_message(AnalysisMessage::Completed {
            question: "pergunta antiga".to_string(),
            analysis: KeywordClassifier::new().classify("pergunta antiga"),
            source: RouteSource::Classifier,
        });

        assert!(app.recommendation.is_none());
        assert!(app.is_analyzing());
        assert!(app.router().cache().is_empty());
    }

    #[tokio::test]
    async fn test_analysis_finishing_after_edit_is_cached_but_not_shown() {
        let mut app = App::new();
        let t0 = Instant::now();
        type_text(&mut app, "Estou com medo", t0);

        let t1 = after_debounce(t0);
        app.tick(t1);
        assert!(app.is_analyzing());

        // Erase the question before the analysis reports back
        for _ in 0.."Estou com medo".len() {
            app.handle_key_at(key_event(KeyCode::Backspace), t1);
        }
        assert!(app.question.is_empty());

        // Ticking at t1 keeps the debouncer from firing again
        wait_for_analysis(&mut app, t1).await;

        assert!(app.recommendation.is_none(), "result is for text no longer in the box");
        assert_eq!(app.router().cache().len(), 1, "result is still cached");

        app.handle_key_at(key_event(KeyCode::Enter), t1);
        assert!(app.chosen_persona.is_none());
    }

    #[test]
    fn test_message_for_edited_question_is_not_shown() {
        let mut app = App::new();
        app.question = "Estou com medo de".to_string();
        app.pending_question = Some("Estou com medo".to_string());

        app.apply_message(AnalysisMessage::Completed {
            question: "Estou com medo".to_string(),
            analysis: KeywordClassifier::new().classify("Estou com medo"),
            source: RouteSource::Classifier,
        });

        assert!(app.recommendation.is_none());
        assert!(!app.is_analyzing());
        assert_eq!(app.router().cache().len(), 1);
    }

    #[test]
    fn test_message_for_equivalent_text_is_shown() {
        let mut app = App::new();
        app.question = "ESTOU COM MEDO!".to_string();
        app.pending_question = Some("Estou com medo".to_string());

        app.apply_message(AnalysisMessage::Completed {
            question: "Estou com medo".to_string(),
            analysis: KeywordClassifier::new().classify("Estou com medo"),
            source: RouteSource::Classifier,
        });

        assert_eq!(
            app.recommendation.as_ref().map(|r| r.question.as_str()),
            Some("Estou com medo")
        );
    }

    #[test]
    fn test_fallback_message_is_shown_but_not_cached() {
        let mut app = App::new();
        app.question = "qual a dose".to_string();
        app.pending_question = Some("qual a dose".to_string());

        app.apply_message(AnalysisMessage::Completed {
            question: "qual a dose".to_string(),
            analysis: KeywordClassifier::new().classify("qual a dose"),
            source: RouteSource::Fallback,
        });

        assert_eq!(
            app.recommendation.as_ref().map(|r| r.source),
            Some(RouteSource::Fallback)
        );
        assert!(app.router().cache().is_empty());
    }

    // ========================================================================
    // Persona selection
    // ========================================================================

    #[test]
    fn test_enter_adopts_recommended_persona() {
        let mut app = App::new();
        app.question = "Estou com medo".to_string();
        app.recommendation = Some(Recommendation {
            question: "Estou com medo".to_string(),
            analysis: KeywordClassifier::new().classify("Estou com medo"),
            source: RouteSource::Classifier,
        });

        app.handle_key(key_event(KeyCode::Enter));

        assert_eq!(app.chosen_persona.map(|p| p.id), Some("ga"));
        assert_eq!(app.selected_index, 1);
    }

    #[test]
    fn test_enter_ignores_recommendation_for_other_text() {
        let mut app = App::new();
        app.question = "Qual a dose de rifampicina?".to_string();
        app.recommendation = Some(Recommendation {
            question: "Estou com medo".to_string(),
            analysis: KeywordClassifier::new().classify("Estou com medo"),
            source: RouteSource::Classifier,
        });

        app.handle_key(key_event(KeyCode::Enter));

        assert!(app.chosen_persona.is_none());
    }

    #[test]
    fn test_enter_without_recommendation_does_nothing() {
        let mut app = App::new();
        app.handle_key(key_event(KeyCode::Enter));
        assert!(app.chosen_persona.is_none());
    }

    #[test]
    fn test_tab_toggles_persona_list() {
        let mut app = App::new();

        app.handle_key(key_event(KeyCode::Tab));
        assert_eq!(app.state, AppState::PersonaList);

        app.handle_key(key_event(KeyCode::Tab));
        assert_eq!(app.state, AppState::Asking);
    }

    #[test]
    fn test_esc_in_persona_list_returns_to_asking() {
        let mut app = App::new();
        app.state = AppState::PersonaList;

        app.handle_key(key_event(KeyCode::Esc));

        assert_eq!(app.state, AppState::Asking);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_navigation_down_wraps() {
        let mut app = App::new();
        app.state = AppState::PersonaList;
        let count = app.persona_count();

        app.handle_key(key_event(KeyCode::Down));
        assert_eq!(app.selected_index, 1);

        app.selected_index = count - 1;
        app.handle_key(key_event(KeyCode::Char('j')));
        assert_eq!(app.selected_index, 0, "Should wrap to top");
    }

    #[test]
    fn test_navigation_up_wraps() {
        let mut app = App::new();
        app.state = AppState::PersonaList;

        app.handle_key(key_event(KeyCode::Char('k')));
        assert_eq!(app.selected_index, app.persona_count() - 1, "Should wrap to bottom");

        app.handle_key(key_event(KeyCode::Up));
        assert_eq!(app.selected_index, app.persona_count() - 2);
    }

    #[test]
    fn test_enter_in_list_chooses_persona() {
        let mut app = App::new();
        app.state = AppState::PersonaList;
        app.selected_index = 1;

        app.handle_key(key_event(KeyCode::Enter));

        assert_eq!(app.chosen_persona.map(|p| p.id), Some("ga"));
        assert_eq!(app.state, AppState::Asking);
    }

    #[test]
    fn test_q_quits_from_persona_list() {
        let mut app = App::new();
        app.state = AppState::PersonaList;

        app.handle_key(key_event(KeyCode::Char('q')));

        assert!(app.should_quit);
    }

    #[test]
    fn test_selected_persona_returns_correct_persona() {
        let mut app = App::new();
        assert_eq!(app.selected_persona().map(|p| p.id), Some("dr_gasnelio"));

        app.selected_index = 1;
        assert_eq!(app.selected_persona().map(|p| p.id), Some("ga"));
    }

    // ========================================================================
    // Help overlay
    // ========================================================================

    #[test]
    fn test_f1_opens_help_while_asking() {
        let mut app = App::new();
        app.handle_key(key_event(KeyCode::F(1)));
        assert!(app.show_help);
    }

    #[test]
    fn test_help_intercepts_keys() {
        let mut app = App::new();
        app.show_help = true;

        app.handle_key(key_event(KeyCode::Char('x')));
        assert!(app.question.is_empty(), "typing is ignored while help is shown");

        app.handle_key(key_event(KeyCode::Esc));
        assert!(!app.show_help);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_question_mark_toggles_help_in_persona_list() {
        let mut app = App::new();
        app.state = AppState::PersonaList;

        app.handle_key(key_event(KeyCode::Char('?')));
        assert!(app.show_help);

        app.handle_key(key_event(KeyCode::Char('?')));
        assert!(!app.show_help);
    }
}
