use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

use super::layout::ScreenLayout;
use super::{draw_header, draw_help, selected_style};
use crate::app::App;
use crate::utils::{first_line, truncate_string};

pub fn draw_sections(f: &mut Frame, layout: &ScreenLayout, app: &App) {
    draw_header(f, layout.header_area, &format!("Sections of {}", app.source_label));

    let width = layout.content_area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = app
        .sections
        .iter()
        .enumerate()
        .map(|(i, section)| {
            // Preview skips the heading line itself.
            let body = section.text.lines().skip(1).collect::<Vec<_>>().join("\n");
            let preview = truncate_string(first_line(&body), width.saturating_sub(2));
            ListItem::new(vec![
                Line::from(Span::styled(
                    truncate_string(&section.heading, width),
                    selected_style(i == app.selected_section),
                )),
                Line::from(Span::styled(
                    format!("  {}", preview),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Sections "),
    );
    f.render_widget(list, layout.content_area);

    draw_help(
        f,
        layout.help_area,
        &[("↑/↓", "Navigate"), ("Enter", "Export section"), ("Esc", "Back")],
    );
}
