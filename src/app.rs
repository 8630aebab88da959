use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;

use crate::config::ConfigSnapshot;
use crate::error::ExportError;
use crate::models::RunSummary;
use crate::notes::{get_note_files, load_note, split_sections, NoteSection};
use crate::settings::{ExportScope, QuestionCounts, Settings};
use crate::status::PipelineState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Screen {
    Menu,
    Sections,
    Form,
    Export,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormField {
    Deck,
    Questions,
    Alternatives,
}

impl FormField {
    fn next(self) -> Self {
        match self {
            FormField::Deck => FormField::Questions,
            FormField::Questions => FormField::Alternatives,
            FormField::Alternatives => FormField::Deck,
        }
    }

    fn prev(self) -> Self {
        match self {
            FormField::Deck => FormField::Alternatives,
            FormField::Questions => FormField::Deck,
            FormField::Alternatives => FormField::Questions,
        }
    }
}

/// Per-run overrides entered before an export starts.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportForm {
    pub scope: ExportScope,
    pub deck: String,
    pub questions: String,
    pub alternatives: String,
    pub focused: FormField,
}

impl ExportForm {
    pub fn new(settings: &Settings, scope: ExportScope) -> Self {
        let counts = settings.counts(scope);
        Self {
            scope,
            deck: settings.destination_deck.clone(),
            questions: counts.num_questions.to_string(),
            alternatives: counts.num_alternatives.to_string(),
            focused: FormField::Deck,
        }
    }

    fn focused_value(&mut self) -> &mut String {
        match self.focused {
            FormField::Deck => &mut self.deck,
            FormField::Questions => &mut self.questions,
            FormField::Alternatives => &mut self.alternatives,
        }
    }

    /// Numeric fields only accept digits.
    pub fn input(&mut self, c: char) {
        if self.focused != FormField::Deck && !c.is_ascii_digit() {
            return;
        }
        self.focused_value().push(c);
    }

    pub fn backspace(&mut self) {
        self.focused_value().pop();
    }

    /// Empty numeric fields count as zero.
    pub fn counts(&self) -> QuestionCounts {
        QuestionCounts {
            num_questions: self.questions.parse().unwrap_or(0),
            num_alternatives: self.alternatives.parse().unwrap_or(0),
        }
    }
}

/// What the event loop should do after a key press.
#[derive(Debug)]
pub enum Action {
    None,
    StartExport {
        source_text: String,
        config: ConfigSnapshot,
    },
    Quit,
}

pub struct App {
    pub screen: Screen,
    pub settings: Settings,
    pub note_files: Vec<PathBuf>,
    pub selected_file: usize,
    pub sections: Vec<NoteSection>,
    pub selected_section: usize,
    pub source_text: String,
    pub source_label: String,
    pub form: Option<ExportForm>,
    pub last_result: Option<Result<RunSummary, ExportError>>,
    pub notice: Option<String>,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        let note_files = get_note_files(&settings.notes_dir);
        Self {
            screen: Screen::Menu,
            settings,
            note_files,
            selected_file: 0,
            sections: Vec::new(),
            selected_section: 0,
            source_text: String::new(),
            source_label: String::new(),
            form: None,
            last_result: None,
            notice: None,
        }
    }

    pub fn refresh_notes(&mut self) {
        self.note_files = get_note_files(&self.settings.notes_dir);
        self.selected_file = self
            .selected_file
            .min(self.note_files.len().saturating_sub(1));
    }

    pub fn note_name(path: &std::path::Path) -> String {
        path.file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    fn load_selected_note(&mut self) -> Option<String> {
        let path = self.note_files.get(self.selected_file)?.clone();
        match load_note(&path) {
            Ok(text) if text.trim().is_empty() => {
                self.notice = Some("There is nothing in the file!".to_string());
                None
            }
            Ok(text) => {
                self.source_label = Self::note_name(&path);
                Some(text)
            }
            Err(e) => {
                self.notice = Some(format!("Could not read {}: {}", path.display(), e));
                None
            }
        }
    }

    fn open_form(&mut self, scope: ExportScope) {
        self.form = Some(ExportForm::new(&self.settings, scope));
        self.screen = Screen::Form;
    }

    pub fn handle_key(
        &mut self,
        key: KeyEvent,
        state: PipelineState,
        env_key: Option<String>,
    ) -> Action {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }

        match self.screen {
            Screen::Menu => self.handle_menu_key(key.code),
            Screen::Sections => {
                self.handle_sections_key(key.code);
                Action::None
            }
            Screen::Form => self.handle_form_key(key.code, state, env_key),
            Screen::Export => match key.code {
                KeyCode::Char('m') | KeyCode::Esc => {
                    self.screen = Screen::Menu;
                    Action::None
                }
                KeyCode::Char('q') => Action::Quit,
                _ => Action::None,
            },
        }
    }

    fn handle_menu_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Up => {
                self.selected_file = self.selected_file.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_file < self.note_files.len().saturating_sub(1) {
                    self.selected_file += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(text) = self.load_selected_note() {
                    self.source_text = text;
                    self.notice = None;
                    self.open_form(ExportScope::File);
                }
            }
            KeyCode::Char('s') => {
                if let Some(text) = self.load_selected_note() {
                    self.sections = split_sections(&text);
                    self.selected_section = 0;
                    if self.sections.is_empty() {
                        self.notice = Some("There is nothing in the file!".to_string());
                    } else {
                        self.notice = None;
                        self.screen = Screen::Sections;
                    }
                }
            }
            KeyCode::Char('r') => self.refresh_notes(),
            KeyCode::Char('q') | KeyCode::Esc => return Action::Quit,
            _ => {}
        }
        Action::None
    }

    fn handle_sections_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => {
                self.selected_section = self.selected_section.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_section < self.sections.len().saturating_sub(1) {
                    self.selected_section += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(section) = self.sections.get(self.selected_section) {
                    self.source_text = section.text.clone();
                    self.source_label = format!("{} / {}", self.source_label, section.heading);
                    self.open_form(ExportScope::Selection);
                }
            }
            KeyCode::Esc => self.screen = Screen::Menu,
            _ => {}
        }
    }

    fn handle_form_key(
        &mut self,
        code: KeyCode,
        state: PipelineState,
        env_key: Option<String>,
    ) -> Action {
        let Some(form) = self.form.as_mut() else {
            self.screen = Screen::Menu;
            return Action::None;
        };

        match code {
            KeyCode::Tab | KeyCode::Down => form.focused = form.focused.next(),
            KeyCode::BackTab | KeyCode::Up => form.focused = form.focused.prev(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(c) => form.input(c),
            KeyCode::Esc => self.screen = Screen::Menu,
            KeyCode::Enter => {
                if state == PipelineState::Running {
                    self.notice = Some(ExportError::RunInProgress.notice());
                    return Action::None;
                }
                match self.settings.snapshot(&form.deck, form.counts(), env_key) {
                    Ok(config) => {
                        self.screen = Screen::Export;
                        self.last_result = None;
                        self.notice = None;
                        return Action::StartExport {
                            source_text: self.source_text.clone(),
                            config,
                        };
                    }
                    Err(e) => self.notice = Some(e.notice()),
                }
            }
            _ => {}
        }
        Action::None
    }

    /// Records the outcome of a run started from this screen.
    pub fn finish_export(&mut self, result: Result<RunSummary, ExportError>) {
        match &result {
            Err(ExportError::RunInProgress) => {
                self.notice = Some(ExportError::RunInProgress.notice());
                return;
            }
            Ok(summary) => self.notice = Some(summary.notice()),
            Err(e) => self.notice = Some(e.notice()),
        }
        self.last_result = Some(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with_notes(notes: &[(&str, &str)]) -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        for (name, content) in notes {
            fs::write(dir.path().join(name), content).unwrap();
        }
        let mut settings = Settings::default();
        settings.notes_dir = dir.path().to_path_buf();
        settings.set_api_key("sk-test-1234567890");
        (dir, App::new(settings))
    }

    #[test]
    fn test_menu_navigation_stays_in_bounds() {
        let (_dir, mut app) = app_with_notes(&[("a.md", "A"), ("b.md", "B")]);

        app.handle_key(key(KeyCode::Up), PipelineState::Idle, None);
        assert_eq!(app.selected_file, 0);
        app.handle_key(key(KeyCode::Down), PipelineState::Idle, None);
        app.handle_key(key(KeyCode::Down), PipelineState::Idle, None);
        assert_eq!(app.selected_file, 1);
    }

    #[test]
    fn test_empty_note_is_refused() {
        let (_dir, mut app) = app_with_notes(&[("empty.md", "  \n")]);

        app.handle_key(key(KeyCode::Enter), PipelineState::Idle, None);

        assert_eq!(app.screen, Screen::Menu);
        assert_eq!(app.notice.as_deref(), Some("There is nothing in the file!"));
    }

    #[test]
    fn test_file_export_uses_file_defaults() {
        let (_dir, mut app) = app_with_notes(&[("geo.md", "Paris is the capital of France.")]);

        app.handle_key(key(KeyCode::Enter), PipelineState::Idle, None);
        assert_eq!(app.screen, Screen::Form);
        let form = app.form.as_ref().unwrap();
        assert_eq!(form.scope, ExportScope::File);
        assert_eq!(form.questions, "5");
        assert_eq!(form.deck, "Default");

        match app.handle_key(key(KeyCode::Enter), PipelineState::Idle, None) {
            Action::StartExport {
                source_text,
                config,
            } => {
                assert_eq!(source_text, "Paris is the capital of France.");
                assert_eq!(config.num_questions, 5);
                assert_eq!(config.deck_name, "Default");
            }
            other => panic!("expected StartExport, got {:?}", other),
        }
        assert_eq!(app.screen, Screen::Export);
    }

    #[test]
    fn test_section_export_uses_selection_defaults() {
        let (_dir, mut app) = app_with_notes(&[("geo.md", "# France\nParis.\n# Italy\nRome.")]);

        app.handle_key(key(KeyCode::Char('s')), PipelineState::Idle, None);
        assert_eq!(app.screen, Screen::Sections);
        assert_eq!(app.sections.len(), 2);

        app.handle_key(key(KeyCode::Down), PipelineState::Idle, None);
        app.handle_key(key(KeyCode::Enter), PipelineState::Idle, None);

        assert_eq!(app.screen, Screen::Form);
        assert_eq!(app.source_text, "# Italy\nRome.");
        assert_eq!(app.source_label, "geo / Italy");
        let form = app.form.as_ref().unwrap();
        assert_eq!(form.scope, ExportScope::Selection);
        assert_eq!(form.questions, "2");
    }

    #[test]
    fn test_form_edits_override_run() {
        let (_dir, mut app) = app_with_notes(&[("geo.md", "Paris.")]);
        app.handle_key(key(KeyCode::Enter), PipelineState::Idle, None);

        for _ in 0.."Default".len() {
            app.handle_key(key(KeyCode::Backspace), PipelineState::Idle, None);
        }
        for c in "Geo".chars() {
            app.handle_key(key(KeyCode::Char(c)), PipelineState::Idle, None);
        }
        app.handle_key(key(KeyCode::Tab), PipelineState::Idle, None);
        app.handle_key(key(KeyCode::Backspace), PipelineState::Idle, None);
        app.handle_key(key(KeyCode::Char('x')), PipelineState::Idle, None);
        app.handle_key(key(KeyCode::Char('1')), PipelineState::Idle, None);

        match app.handle_key(key(KeyCode::Enter), PipelineState::Idle, None) {
            Action::StartExport { config, .. } => {
                assert_eq!(config.deck_name, "Geo");
                assert_eq!(config.num_questions, 1);
            }
            other => panic!("expected StartExport, got {:?}", other),
        }
    }

    #[test]
    fn test_form_refuses_while_running() {
        let (_dir, mut app) = app_with_notes(&[("geo.md", "Paris.")]);
        app.handle_key(key(KeyCode::Enter), PipelineState::Idle, None);

        let action = app.handle_key(key(KeyCode::Enter), PipelineState::Running, None);

        assert!(matches!(action, Action::None));
        assert_eq!(app.screen, Screen::Form);
        assert!(app.notice.as_deref().unwrap().contains("already running"));
    }

    #[test]
    fn test_missing_api_key_is_reported_before_export() {
        let (_dir, mut app) = app_with_notes(&[("geo.md", "Paris.")]);
        app.settings.api_key = None;
        app.handle_key(key(KeyCode::Enter), PipelineState::Idle, None);

        let action = app.handle_key(key(KeyCode::Enter), PipelineState::Idle, None);

        assert!(matches!(action, Action::None));
        assert!(app.notice.as_deref().unwrap().contains("API key"));
    }

    #[test]
    fn test_ctrl_c_quits_anywhere() {
        let (_dir, mut app) = app_with_notes(&[("geo.md", "Paris.")]);
        app.handle_key(key(KeyCode::Enter), PipelineState::Idle, None);

        let action = app.handle_key(
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            PipelineState::Idle,
            None,
        );
        assert!(matches!(action, Action::Quit));
    }

    #[test]
    fn test_finish_export_ignores_rejected_second_run() {
        let (_dir, mut app) = app_with_notes(&[]);
        app.finish_export(Ok(RunSummary::new(1, vec![])));
        app.finish_export(Err(ExportError::RunInProgress));

        assert!(matches!(app.last_result, Some(Ok(_))));
        assert!(app.notice.as_deref().unwrap().contains("already running"));
    }
}
