use ratatui::{
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

use super::layout::ScreenLayout;
use super::{draw_header, draw_help, selected_style};
use crate::app::App;
use crate::utils::truncate_string;

pub fn draw_menu(f: &mut Frame, layout: &ScreenLayout, app: &App) {
    draw_header(f, layout.header_area, "Auto Flashcards");

    let width = layout.content_area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = if app.note_files.is_empty() {
        vec![ListItem::new(format!(
            "No notes found in {}",
            app.settings.notes_dir.display()
        ))
        .style(
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )]
    } else {
        app.note_files
            .iter()
            .enumerate()
            .map(|(i, path)| {
                let name = truncate_string(&App::note_name(path), width);
                ListItem::new(name).style(selected_style(i == app.selected_file))
            })
            .collect()
    };

    let title = format!(" Notes -> deck \"{}\" ", app.settings.destination_deck);
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(title),
    );
    f.render_widget(list, layout.content_area);

    draw_help(
        f,
        layout.help_area,
        &[
            ("↑/↓", "Navigate"),
            ("Enter", "Export file"),
            ("s", "Pick section"),
            ("r", "Refresh"),
            ("q", "Quit"),
        ],
    );
}
