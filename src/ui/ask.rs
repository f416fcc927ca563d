//! Question screen rendering
//!
//! Renders the main view: the question being typed, the routing suggestion
//! for it with a confidence bar, and a status line with key hints.

use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Recommendation};
use crate::personas::get_persona_by_id;
use crate::routing::RouteSource;
use crate::ui::widgets::{confidence_color, ConfidenceBar};

/// Width of the confidence bar in cells
const BAR_WIDTH: u16 = 20;

/// Color for where an analysis came from
fn source_color(source: RouteSource) -> Color {
    match source {
        RouteSource::Cache => Color::Green,
        RouteSource::Classifier => Color::Cyan,
        RouteSource::Fallback => Color::Yellow,
    }
}

/// Renders the question screen
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Question input
            Constraint::Min(6),    // Recommendation
            Constraint::Length(1), // Help text
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    render_question(frame, app, chunks[1]);
    render_recommendation(frame, app, chunks[2]);
    render_help(frame, app, chunks[3]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let chosen = match app.chosen_persona {
        Some(persona) => Span::styled(
            persona.name,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        None => Span::styled("none", Style::default().fg(Color::DarkGray)),
    };

    let line = Line::from(vec![
        Span::raw(" Talking to: "),
        chosen,
        Span::styled(
            format!("   Classifier: {}", app.router().classifier().describe()),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let block = Block::default()
        .title(" Persona Router ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_question(frame: &mut Frame, app: &App, area: Rect) {
    let line = if app.question.is_empty() {
        Line::from(vec![
            Span::styled("▏", Style::default().fg(Color::Yellow)),
            Span::styled(
                "Type a question about the PQT-U treatment...",
                Style::default().fg(Color::DarkGray),
            ),
        ])
    } else {
        Line::from(vec![
            Span::raw(app.question.as_str()),
            Span::styled("▏", Style::default().fg(Color::Yellow)),
        ])
    };

    let block = Block::default()
        .title(" Question ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_recommendation(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Suggested persona ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match &app.recommendation {
        Some(recommendation) => render_card(frame, app, recommendation, inner),
        None => {
            let text = if app.is_analyzing() {
                Span::styled("Analyzing...", Style::default().fg(Color::Cyan))
            } else {
                Span::styled(
                    "A suggestion appears once you pause typing.",
                    Style::default().fg(Color::DarkGray),
                )
            };
            frame.render_widget(Paragraph::new(Line::from(text)), inner);
        }
    }
}

fn render_card(frame: &mut Frame, app: &App, recommendation: &Recommendation, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Persona
            Constraint::Length(1), // Confidence
            Constraint::Min(1),    // Reasoning and alternatives
        ])
        .split(area);

    let analysis = &recommendation.analysis;

    // Persona name and role
    let persona_lines = match recommendation.persona() {
        Some(persona) => vec![
            Line::from(vec![
                Span::styled(
                    persona.name,
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  {} · {}", persona.role, persona.style.label()),
                    Style::default().fg(Color::Gray),
                ),
            ]),
            Line::from(Span::styled(
                persona.description,
                Style::default().fg(Color::DarkGray),
            )),
        ],
        None => vec![Line::from(Span::styled(
            format!("Unknown persona '{}'", analysis.recommended_persona_id),
            Style::default().fg(Color::Red),
        ))],
    };
    frame.render_widget(Paragraph::new(persona_lines), rows[0]);

    // Confidence bar followed by the percentage
    let bar_row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(BAR_WIDTH),
            Constraint::Min(0),
        ])
        .split(rows[1]);
    frame.render_widget(ConfidenceBar::new(analysis.confidence), bar_row[0]);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format!(" {:.0}%", analysis.confidence * 100.0),
            Style::default().fg(confidence_color(analysis.confidence)),
        ))),
        bar_row[1],
    );

    // Details
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Scope: ", Style::default().fg(Color::Yellow)),
            Span::raw(analysis.scope.as_str()),
        ]),
        Line::from(vec![
            Span::styled("Why: ", Style::default().fg(Color::Yellow)),
            Span::raw(analysis.reasoning.as_str()),
        ]),
    ];

    for alternative in &analysis.alternatives {
        let name = get_persona_by_id(&alternative.persona_id)
            .map(|p| p.name)
            .unwrap_or(alternative.persona_id.as_str());
        lines.push(Line::from(vec![
            Span::styled("Also: ", Style::default().fg(Color::DarkGray)),
            Span::raw(name),
            Span::styled(
                format!(" ({:.0}%)", alternative.confidence * 100.0),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    }

    if app.chosen_persona.map(|p| p.id) != Some(analysis.recommended_persona_id.as_str()) {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Enter", Style::default().fg(Color::Yellow)),
            Span::raw(" to talk to this persona"),
        ]));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), rows[2]);
}

fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let mut help_spans = vec![
        Span::styled("Enter", Style::default().fg(Color::Yellow)),
        Span::raw(" Adopt  "),
        Span::styled("Tab", Style::default().fg(Color::Yellow)),
        Span::raw(" Personas  "),
        Span::styled("Esc", Style::default().fg(Color::Yellow)),
        Span::raw(" Clear/Quit  "),
        Span::styled("F1", Style::default().fg(Color::Yellow)),
        Span::raw(" Help"),
    ];

    if let Some(recommendation) = &app.recommendation {
        help_spans.push(Span::raw(" │ "));
        help_spans.push(Span::styled(
            recommendation.source.label(),
            Style::default().fg(source_color(recommendation.source)),
        ));
    }

    // Add analysis freshness indicator
    if let Some(last_analysis) = app.last_analysis {
        let secs_ago = (Local::now() - last_analysis).num_seconds();
        let freshness_text = if secs_ago < 5 {
            " just now".to_string()
        } else if secs_ago < 60 {
            format!(" {}s ago", secs_ago)
        } else {
            format!(" {}m ago", secs_ago / 60)
        };
        help_spans.push(Span::styled(
            freshness_text,
            Style::default().fg(Color::DarkGray),
        ));
    }

    let paragraph =
        Paragraph::new(Line::from(help_spans)).style(Style::default().fg(Color::DarkGray));

    frame.render_widget(paragraph, area);
}
