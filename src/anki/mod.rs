pub mod client;
pub mod note;
pub mod sync;

pub use client::{AnkiConnectClient, ControlApi, NoteRequest, ANKI_CONNECT_VERSION};
pub use note::{render_front, render_note};
pub use sync::FlashcardSyncClient;
