use futures::stream::{self, StreamExt};

use crate::ai::client::Generator;
use crate::ai::{parser, prompt};
use crate::anki::client::ControlApi;
use crate::anki::sync::FlashcardSyncClient;
use crate::config::ConfigSnapshot;
use crate::error::ExportError;
use crate::logger;
use crate::models::RunSummary;
use crate::status::StatusReporter;

/// Runs the export pipeline: build request, generate, parse, then deliver each
/// record in order while keeping the status indicator current.
pub struct ExportOrchestrator<G: Generator, C: ControlApi> {
    generator: G,
    control_api: C,
    status: StatusReporter,
}

impl<G: Generator, C: ControlApi> ExportOrchestrator<G, C> {
    pub fn new(generator: G, control_api: C, status: StatusReporter) -> Self {
        Self {
            generator,
            control_api,
            status,
        }
    }

    pub fn status(&self) -> &StatusReporter {
        &self.status
    }

    /// Executes one export run.
    ///
    /// Rejected with [`ExportError::RunInProgress`] and no state change while
    /// another run is active. Failures before synchronization end the run and
    /// leave the status at `Error`; per-record rejections only show up in the
    /// returned summary.
    pub async fn run(
        &self,
        source_text: &str,
        config: &ConfigSnapshot,
    ) -> Result<RunSummary, ExportError> {
        self.status.begin_run()?;
        logger::log(&format!(
            "Export started: {} question(s), {} alternative(s), deck '{}'",
            config.num_questions, config.num_alternatives, config.deck_name
        ));

        match self.execute(source_text, config).await {
            Ok(summary) => {
                if summary.is_fatal() {
                    self.status.fail();
                } else {
                    self.status.complete();
                }
                logger::log(&format!("Export finished: {}", summary.notice()));
                Ok(summary)
            }
            Err(e) => {
                self.status.fail();
                logger::log(&format!("Export failed: {}", e));
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        source_text: &str,
        config: &ConfigSnapshot,
    ) -> Result<RunSummary, ExportError> {
        config.validate()?;
        let request = prompt::build(source_text, config)?;

        let raw = self.generator.generate(&request).await?;
        logger::log(&format!("Provider output ({} chars)", raw.len()));

        let report = parser::parse(
            &raw,
            request.expected_questions,
            request.expected_alternatives,
            &request.deck_name,
        )
        .inspect_err(|e| {
            if let ExportError::NoValidRecords { raw, .. } = e {
                logger::log(&format!("Unparsable provider output: {}", raw));
            }
        })?;

        if let Some((expected, produced)) = report.count_mismatch() {
            logger::log(&format!(
                "Requested {} question(s), provider produced {}",
                expected, produced
            ));
        }
        for rejection in &report.rejected {
            logger::log(&format!(
                "Block {} rejected: {}",
                rejection.index, rejection.reason
            ));
        }

        let summary = RunSummary::new(config.num_questions, report.rejected);
        let sync = FlashcardSyncClient::new(&self.control_api, config);

        let (mut summary, sync) = stream::iter(report.records)
            .fold((summary, sync), |(summary, mut sync), record| async move {
                let outcome = sync.sync(&record).await;
                (summary.record(record, outcome), sync)
            })
            .await;

        summary.control_api_unreachable = sync.is_unreachable();
        Ok(summary)
    }
}
