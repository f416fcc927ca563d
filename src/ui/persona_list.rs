//! Persona list screen rendering
//!
//! Lists every persona in the catalog so the user can pick one by hand,
//! marking the highlighted row, the current choice and the suggested one.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::personas::{all_personas, PersonaStyle};

/// Color for a persona's register
fn style_color(style: PersonaStyle) -> Color {
    match style {
        PersonaStyle::Technical => Color::Blue,
        PersonaStyle::Empathetic => Color::Magenta,
    }
}

/// Renders the persona list screen
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Persona list
            Constraint::Length(1), // Help text
        ])
        .split(area);

    render_list(frame, app, chunks[0]);
    render_help(frame, chunks[1]);
}

fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    let personas = all_personas();
    let suggested = app
        .recommendation
        .as_ref()
        .map(|r| r.analysis.recommended_persona_id.as_str());
    let mut lines: Vec<Line> = Vec::with_capacity(personas.len() * 3);

    for (index, persona) in personas.iter().enumerate() {
        let is_selected = index == app.selected_index;
        let cursor = if is_selected { "\u{25B8} " } else { "  " }; // ▸ or space

        let name_style = if is_selected {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        let mut spans = vec![
            Span::styled(cursor, Style::default().fg(Color::Cyan)),
            Span::styled(format!("{:<14}", persona.name), name_style),
            Span::styled(
                format!("{:<12}", persona.style.label()),
                Style::default().fg(style_color(persona.style)),
            ),
            Span::styled(persona.role, Style::default().fg(Color::Gray)),
        ];

        if app.chosen_persona.map(|p| p.id) == Some(persona.id) {
            spans.push(Span::styled("  ✓ current", Style::default().fg(Color::Green)));
        }
        if suggested == Some(persona.id) {
            spans.push(Span::styled("  ★ suggested", Style::default().fg(Color::Yellow)));
        }

        lines.push(Line::from(spans));
        lines.push(Line::from(Span::styled(
            format!("    {}", persona.description),
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(""));
    }

    let block = Block::default()
        .title(" Personas ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

fn render_help(frame: &mut Frame, area: Rect) {
    let help_text = Line::from(vec![
        Span::styled("↑/↓", Style::default().fg(Color::Yellow)),
        Span::raw(" Navigate  "),
        Span::styled("Enter", Style::default().fg(Color::Yellow)),
        Span::raw(" Choose  "),
        Span::styled("Esc", Style::default().fg(Color::Yellow)),
        Span::raw(" Back  "),
        Span::styled("?", Style::default().fg(Color::Yellow)),
        Span::raw(" Help  "),
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::raw(" Quit"),
    ]);
    let paragraph = Paragraph::new(help_text).style(Style::default().fg(Color::DarkGray));

    frame.render_widget(paragraph, area);
}
