pub mod ai;
pub mod anki;
pub mod app;
pub mod config;
pub mod error;
pub mod export;
pub mod logger;
pub mod models;
pub mod notes;
pub mod settings;
pub mod status;
pub mod ui;
pub mod utils;

// Re-exports for convenience
pub use ai::{Generator, OpenRouterClient, DEFAULT_ENDPOINT, DEFAULT_MODEL};
pub use anki::{AnkiConnectClient, ControlApi, FlashcardSyncClient};
pub use app::{Action, App, Screen};
pub use config::{ApiKey, ConfigSnapshot, SamplingOptions};
pub use error::{ExportError, SyncError};
pub use export::ExportOrchestrator;
pub use models::{FlashcardRecord, RunSummary, SyncOutcome};
pub use settings::{ExportScope, Settings};
pub use status::{PipelineState, StatusReporter};
pub use ui::draw;
