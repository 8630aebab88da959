use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::status::PipelineState;
use crate::utils::truncate_string;

/// Icon, label and color for the pipeline indicator.
pub fn status_indicator(state: PipelineState) -> (&'static str, &'static str, Color) {
    match state {
        PipelineState::Idle => ("✓", "Idle", Color::Green),
        PipelineState::Running => ("⟳", "Exporting", Color::Yellow),
        PipelineState::Error => ("!", "Export failed", Color::Red),
    }
}

pub fn draw_status_bar(f: &mut Frame, area: Rect, state: PipelineState, notice: Option<&str>) {
    let (icon, label, color) = status_indicator(state);
    let indicator = format!(" {} {} ", icon, label);

    let mut spans = vec![Span::styled(
        indicator.clone(),
        Style::default()
            .fg(Color::Black)
            .bg(color)
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(notice) = notice {
        let room = (area.width as usize).saturating_sub(indicator.chars().count() + 1);
        spans.push(Span::from(" "));
        spans.push(Span::styled(
            truncate_string(notice, room),
            Style::default().fg(color),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
