use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::layout::ScreenLayout;
use super::{draw_header, draw_help};
use crate::app::App;
use crate::models::RunSummary;
use crate::status::PipelineState;
use crate::utils::truncate_string;

fn summary_text(summary: &RunSummary, width: usize) -> Text<'static> {
    let mut text = Text::default();
    text.push_line(Line::from(format!(
        "Delivered: {} of {}",
        summary.delivered, summary.attempted
    )));
    text.push_line(Line::from(format!("Requested: {}", summary.requested)));
    if !summary.rejected_blocks.is_empty() {
        text.push_line(Line::from(format!(
            "Malformed blocks dropped: {}",
            summary.rejected_blocks.len()
        )));
    }

    if !summary.failed.is_empty() {
        text.push_line(Line::from(""));
        text.push_line(Line::styled(
            "Failed:",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
        for (record, reason) in &summary.failed {
            text.push_line(Line::from(format!(
                "  {}",
                truncate_string(&record.question, width.saturating_sub(2))
            )));
            text.push_line(Line::styled(
                format!("    {}", truncate_string(reason, width.saturating_sub(4))),
                Style::default().fg(Color::DarkGray),
            ));
        }
    }

    if !summary.skipped.is_empty() {
        text.push_line(Line::from(""));
        text.push_line(Line::styled(
            format!("Not sent ({}):", summary.skipped.len()),
            Style::default().fg(Color::Yellow),
        ));
        for record in &summary.skipped {
            text.push_line(Line::from(format!(
                "  {}",
                truncate_string(&record.question, width.saturating_sub(2))
            )));
        }
    }
    text
}

pub fn draw_export(f: &mut Frame, layout: &ScreenLayout, app: &App, state: PipelineState) {
    draw_header(f, layout.header_area, &format!("Export: {}", app.source_label));

    let width = layout.content_area.width.saturating_sub(2) as usize;
    let body = match &app.last_result {
        None if state == PipelineState::Running => {
            Text::from("Generating questions and sending them to Anki...")
        }
        None => Text::from("Waiting for the export to start..."),
        Some(Ok(summary)) => summary_text(summary, width),
        Some(Err(e)) => Text::styled(e.to_string(), Style::default().fg(Color::Red)),
    };

    let content = Paragraph::new(body)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" Result "));
    f.render_widget(content, layout.content_area);

    draw_help(f, layout.help_area, &[("m", "Main Menu"), ("q", "Quit")]);
}
