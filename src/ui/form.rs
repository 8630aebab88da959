use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::layout::{calculate_form_chunks, FormLayout, ScreenLayout};
use super::{draw_header, draw_help};
use crate::app::{App, ExportForm, FormField};
use crate::settings::ExportScope;

fn draw_field(f: &mut Frame, area: Rect, title: &str, value: &str, focused: bool) {
    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let cursor = if focused { "_" } else { "" };
    let field = Paragraph::new(format!("{}{}", value, cursor)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(title.to_string()),
    );
    f.render_widget(field, area);
}

pub fn draw_form(f: &mut Frame, layout: &ScreenLayout, app: &App) {
    let Some(form) = app.form.as_ref() else {
        return;
    };
    let scope = match form.scope {
        ExportScope::File => "file",
        ExportScope::Selection => "section",
    };
    draw_header(
        f,
        layout.header_area,
        &format!("Export {}: {}", scope, app.source_label),
    );

    let chunks = calculate_form_chunks(layout.content_area);
    let source = Paragraph::new(app.source_text.as_str())
        .style(Style::default().fg(Color::DarkGray))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Source "));
    f.render_widget(source, chunks.source_area);

    draw_fields(f, &chunks, form);

    draw_help(
        f,
        layout.help_area,
        &[("Tab", "Next field"), ("Enter", "Start export"), ("Esc", "Cancel")],
    );
}

fn draw_fields(f: &mut Frame, chunks: &FormLayout, form: &ExportForm) {
    draw_field(
        f,
        chunks.deck_area,
        " Deck ",
        &form.deck,
        form.focused == FormField::Deck,
    );
    draw_field(
        f,
        chunks.questions_area,
        " Questions ",
        &form.questions,
        form.focused == FormField::Questions,
    );
    draw_field(
        f,
        chunks.alternatives_area,
        " Wrong alternatives per question ",
        &form.alternatives,
        form.focused == FormField::Alternatives,
    );
}
