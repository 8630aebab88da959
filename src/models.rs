use serde::Serialize;

/// One validated question ready for delivery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlashcardRecord {
    pub question: String,
    pub correct_answer: String,
    pub alternatives: Vec<String>,
    pub deck_name: String,
}

/// Why a candidate block from the provider output was dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockRejection {
    /// Zero-based position of the block in the provider output.
    pub index: usize,
    pub reason: String,
}

/// Result of validating a single candidate block.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockOutcome {
    Valid(FlashcardRecord),
    Invalid(String),
}

/// Validated records plus the blocks that did not survive validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseReport {
    pub expected: u32,
    pub records: Vec<FlashcardRecord>,
    pub rejected: Vec<BlockRejection>,
}

impl ParseReport {
    /// `(expected, produced)` when the model under- or over-produced.
    pub fn count_mismatch(&self) -> Option<(u32, usize)> {
        if self.records.len() == self.expected as usize {
            None
        } else {
            Some((self.expected, self.records.len()))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    Delivered,
    Rejected(String),
    Skipped,
}

/// Aggregated result of one export run, in generation order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunSummary {
    pub requested: u32,
    pub attempted: usize,
    pub delivered: usize,
    pub failed: Vec<(FlashcardRecord, String)>,
    pub skipped: Vec<FlashcardRecord>,
    pub rejected_blocks: Vec<BlockRejection>,
    pub control_api_unreachable: bool,
}

impl RunSummary {
    pub fn new(requested: u32, rejected_blocks: Vec<BlockRejection>) -> Self {
        Self {
            requested,
            rejected_blocks,
            ..Self::default()
        }
    }

    /// Folds one sync outcome into the summary.
    pub fn record(mut self, record: FlashcardRecord, outcome: SyncOutcome) -> Self {
        match outcome {
            SyncOutcome::Delivered => {
                self.attempted += 1;
                self.delivered += 1;
            }
            SyncOutcome::Rejected(reason) => {
                self.attempted += 1;
                self.failed.push((record, reason));
            }
            SyncOutcome::Skipped => self.skipped.push(record),
        }
        self
    }

    pub fn is_fatal(&self) -> bool {
        self.control_api_unreachable
    }

    /// Single terminal notification for the run.
    pub fn notice(&self) -> String {
        if self.control_api_unreachable {
            return format!(
                "Could not reach Anki, is it running with AnkiConnect? {} card(s) not sent.",
                self.failed.len() + self.skipped.len()
            );
        }
        if self.failed.is_empty() {
            format!("Exported {} card(s) to Anki.", self.delivered)
        } else {
            format!(
                "Exported {} of {} card(s) to Anki, {} failed.",
                self.delivered,
                self.attempted,
                self.failed.len()
            )
        }
    }
}
