use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::anki::client::ControlApi;
use crate::anki::note::render_note;
use crate::config::ConfigSnapshot;
use crate::error::SyncError;
use crate::logger;
use crate::models::{FlashcardRecord, SyncOutcome};

/// Delivers records of a single run to the control API, one call at a time.
///
/// When the very first call finds the control API unreachable, every later
/// record is `Skipped` without touching the network.
pub struct FlashcardSyncClient<'a, C: ControlApi> {
    api: &'a C,
    port: u16,
    note_type: &'a str,
    tags: &'a [String],
    rng: StdRng,
    calls: usize,
    unreachable: Option<String>,
}

impl<'a, C: ControlApi> FlashcardSyncClient<'a, C> {
    pub fn new(api: &'a C, config: &'a ConfigSnapshot) -> Self {
        Self::with_rng(api, config, StdRng::from_entropy())
    }

    pub fn with_rng(api: &'a C, config: &'a ConfigSnapshot, rng: StdRng) -> Self {
        Self {
            api,
            port: config.control_api_port,
            note_type: &config.note_type,
            tags: &config.tags,
            rng,
            calls: 0,
            unreachable: None,
        }
    }

    pub async fn sync(&mut self, record: &FlashcardRecord) -> SyncOutcome {
        if self.unreachable.is_some() {
            return SyncOutcome::Skipped;
        }

        let note = render_note(record, self.note_type, self.tags, &mut self.rng);
        let first_call = self.calls == 0;
        self.calls += 1;

        match self.api.add_note(self.port, &note).await {
            Ok(note_id) => {
                logger::log(&format!("Delivered note {}: {}", note_id, record.question));
                SyncOutcome::Delivered
            }
            Err(SyncError::Unreachable(reason)) => {
                logger::log(&format!("Control API unreachable: {}", reason));
                if first_call {
                    self.unreachable = Some(reason.clone());
                }
                SyncOutcome::Rejected(format!("control API unreachable: {}", reason))
            }
            Err(SyncError::Rejected(reason)) => {
                logger::log(&format!("Note rejected ({}): {}", reason, record.question));
                SyncOutcome::Rejected(reason)
            }
        }
    }

    /// Number of network calls issued so far.
    pub fn calls(&self) -> usize {
        self.calls
    }

    pub fn is_unreachable(&self) -> bool {
        self.unreachable.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anki::client::MockControlApi;
    use crate::config::test_snapshot;

    fn record(question: &str) -> FlashcardRecord {
        FlashcardRecord {
            question: question.to_string(),
            correct_answer: "answer".to_string(),
            alternatives: vec![],
            deck_name: "Default".to_string(),
        }
    }

    #[tokio::test]
    async fn test_rejection_does_not_stop_later_records() {
        let api = MockControlApi::scripted(vec![
            Ok(1),
            Err(SyncError::Rejected("deck was not found".to_string())),
        ]);
        let config = test_snapshot();
        let mut sync = FlashcardSyncClient::with_rng(&api, &config, StdRng::seed_from_u64(1));

        assert_eq!(sync.sync(&record("one")).await, SyncOutcome::Delivered);
        assert_eq!(
            sync.sync(&record("two")).await,
            SyncOutcome::Rejected("deck was not found".to_string())
        );
        assert_eq!(sync.sync(&record("three")).await, SyncOutcome::Delivered);
        assert_eq!(sync.calls(), 3);
        assert!(!sync.is_unreachable());
    }

    #[tokio::test]
    async fn test_unreachable_first_call_skips_the_rest() {
        let api = MockControlApi::scripted(vec![Err(SyncError::Unreachable(
            "connection refused".to_string(),
        ))]);
        let config = test_snapshot();
        let mut sync = FlashcardSyncClient::with_rng(&api, &config, StdRng::seed_from_u64(1));

        assert!(matches!(
            sync.sync(&record("one")).await,
            SyncOutcome::Rejected(reason) if reason.contains("unreachable")
        ));
        assert_eq!(sync.sync(&record("two")).await, SyncOutcome::Skipped);
        assert_eq!(sync.sync(&record("three")).await, SyncOutcome::Skipped);
        assert_eq!(api.calls(), 1);
        assert!(sync.is_unreachable());
    }

    #[tokio::test]
    async fn test_unreachable_later_call_is_only_a_rejection() {
        let api = MockControlApi::scripted(vec![
            Ok(1),
            Err(SyncError::Unreachable("connection reset".to_string())),
        ]);
        let config = test_snapshot();
        let mut sync = FlashcardSyncClient::with_rng(&api, &config, StdRng::seed_from_u64(1));

        sync.sync(&record("one")).await;
        assert!(matches!(sync.sync(&record("two")).await, SyncOutcome::Rejected(_)));
        assert_eq!(sync.sync(&record("three")).await, SyncOutcome::Delivered);
        assert!(!sync.is_unreachable());
    }

    #[tokio::test]
    async fn test_notes_use_configured_deck_and_type() {
        let api = MockControlApi::accepting();
        let config = test_snapshot();
        let mut sync = FlashcardSyncClient::with_rng(&api, &config, StdRng::seed_from_u64(1));

        sync.sync(&record("one")).await;
        let received = api.received.lock().unwrap();
        assert_eq!(received[0].deck_name, "Default");
        assert_eq!(received[0].model_name, "Basic");
        assert_eq!(received[0].fields.back, "answer");
    }
}
