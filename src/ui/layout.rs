use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub struct ScreenLayout {
    pub header_area: Rect,
    pub content_area: Rect,
    pub help_area: Rect,
    pub status_area: Rect,
}

pub struct FormLayout {
    pub source_area: Rect,
    pub deck_area: Rect,
    pub questions_area: Rect,
    pub alternatives_area: Rect,
}

pub fn calculate_screen_chunks(area: Rect) -> ScreenLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(area);

    ScreenLayout {
        header_area: chunks[0],
        content_area: chunks[1],
        help_area: chunks[2],
        status_area: chunks[3],
    }
}

pub fn calculate_form_chunks(area: Rect) -> FormLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(2),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(area);

    FormLayout {
        source_area: chunks[0],
        deck_area: chunks[1],
        questions_area: chunks[2],
        alternatives_area: chunks[3],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_layout() {
        let area = Rect::new(0, 0, 100, 40);
        let layout = calculate_screen_chunks(area);

        // Margin 1 leaves 38 rows: 3 + 3 + 1 fixed, content takes the rest.
        assert_eq!(layout.header_area.height, 3);
        assert_eq!(layout.help_area.height, 3);
        assert_eq!(layout.status_area.height, 1);
        assert_eq!(layout.content_area.height, 31);
        assert_eq!(layout.status_area.y, 38);
    }

    #[test]
    fn test_form_layout() {
        let area = Rect::new(0, 0, 80, 20);
        let layout = calculate_form_chunks(area);

        assert_eq!(layout.deck_area.height, 3);
        assert_eq!(layout.questions_area.height, 3);
        assert_eq!(layout.alternatives_area.height, 3);
        assert_eq!(layout.source_area.height, 11);
    }
}
