use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use auto_flashcards::app::{Action, App};
use auto_flashcards::logger;
use auto_flashcards::settings::{api_key_from_env, get_settings_path};
use auto_flashcards::{
    draw, AnkiConnectClient, ExportError, ExportOrchestrator, OpenRouterClient, RunSummary,
    Settings, StatusReporter,
};

type Orchestrator = ExportOrchestrator<OpenRouterClient, AnkiConnectClient>;

const CONTROL_API_TIMEOUT: Duration = Duration::from_secs(10);

fn build_orchestrator(
    settings: &Settings,
    status: StatusReporter,
) -> Result<Orchestrator, ExportError> {
    let generator = OpenRouterClient::new(
        &settings.endpoint,
        Duration::from_secs(settings.request_timeout_secs),
    )?;
    let control_api = AnkiConnectClient::new(CONTROL_API_TIMEOUT)
        .map_err(|e| ExportError::InvalidConfig(format!("HTTP client: {}", e)))?;
    Ok(ExportOrchestrator::new(generator, control_api, status))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logger::init();

    let settings_path = get_settings_path();
    let settings = Settings::load(&settings_path)?;
    if !settings_path.exists() {
        settings.save(&settings_path)?;
        logger::log(&format!("Wrote default settings to {}", settings_path.display()));
    }

    let status = StatusReporter::new();
    let orchestrator = Arc::new(build_orchestrator(&settings, status.clone())?);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, App::new(settings), orchestrator, status).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        logger::log(&format!("Terminal error: {}", e));
    }
    Ok(result?)
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    orchestrator: Arc<Orchestrator>,
    status: StatusReporter,
) -> io::Result<()> {
    let mut events = EventStream::new();
    let mut state_rx = status.subscribe();
    let (result_tx, mut result_rx) =
        mpsc::unbounded_channel::<Result<RunSummary, ExportError>>();

    loop {
        let state = *state_rx.borrow_and_update();
        terminal.draw(|f| draw(f, &app, state))?;

        tokio::select! {
            event = events.next() => {
                let Some(event) = event else { break };
                let Event::Key(key) = event? else { continue };
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match app.handle_key(key, state, api_key_from_env()) {
                    Action::Quit => break,
                    Action::StartExport { source_text, config } => {
                        logger::log(&format!(
                            "Starting export of {} question(s) into '{}'",
                            config.num_questions, config.deck_name
                        ));
                        let orchestrator = Arc::clone(&orchestrator);
                        let result_tx = result_tx.clone();
                        tokio::spawn(async move {
                            let result = orchestrator.run(&source_text, &config).await;
                            let _ = result_tx.send(result);
                        });
                    }
                    Action::None => {}
                }
            }
            Some(result) = result_rx.recv() => app.finish_export(result),
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    Ok(())
}
