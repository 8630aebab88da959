pub mod layout;
mod export;
mod form;
mod menu;
mod sections;
mod status_bar;

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, Screen};
use crate::status::PipelineState;

pub use layout::{calculate_form_chunks, calculate_screen_chunks, FormLayout, ScreenLayout};
pub use status_bar::status_indicator;

pub fn draw(f: &mut Frame, app: &App, state: PipelineState) {
    let layout = calculate_screen_chunks(f.area());

    match app.screen {
        Screen::Menu => menu::draw_menu(f, &layout, app),
        Screen::Sections => sections::draw_sections(f, &layout, app),
        Screen::Form => form::draw_form(f, &layout, app),
        Screen::Export => export::draw_export(f, &layout, app, state),
    }

    status_bar::draw_status_bar(f, layout.status_area, state, app.notice.as_deref());
}

fn draw_header(f: &mut Frame, area: Rect, title: &str) {
    let header = Paragraph::new(title.to_string())
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

/// Renders `(key, description)` pairs as a centered help bar.
fn draw_help(f: &mut Frame, area: Rect, entries: &[(&str, &str)]) {
    let spans: Vec<Span> = entries
        .iter()
        .flat_map(|(key, desc)| {
            [
                Span::styled(
                    key.to_string(),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::from(format!(" {}  ", desc)),
            ]
        })
        .collect();
    let help = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, area);
}

fn selected_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}
