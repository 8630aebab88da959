use regex::Regex;

use crate::error::ExportError;
use crate::models::{BlockOutcome, BlockRejection, FlashcardRecord, ParseReport};

lazy_static::lazy_static! {
    static ref LABEL_LINE: Regex = Regex::new(
        r"(?i)^\s*(?:[-*]\s+)?(?:\d+[.)]\s*)?(\**)\s*(q|question|a|answer|d|distractor|alternative)\s*(\**)\s*[:：]\s*(\**)\s*(.*?)\s*$"
    )
    .expect("label pattern is valid");
    static ref DELIMITER_LINE: Regex = Regex::new(r"^\s*={3,}\s*$").expect("delimiter pattern is valid");
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    Question,
    Answer,
    Alternative,
}

impl Field {
    fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "q" | "question" => Field::Question,
            "a" | "answer" => Field::Answer,
            _ => Field::Alternative,
        }
    }
}

#[derive(Debug, Default)]
struct CandidateBlock {
    question: Option<String>,
    answer: Option<String>,
    alternatives: Vec<String>,
    extra_answers: usize,
    last: Option<Field>,
    /// Set by a blank line; unlabeled text after it is not part of any field.
    closed: bool,
}

impl CandidateBlock {
    fn is_empty(&self) -> bool {
        self.last.is_none()
    }

    fn push_field(&mut self, field: Field, text: &str) {
        let text = text.trim().to_string();
        match field {
            Field::Question => self.question = Some(text),
            Field::Answer => {
                if self.answer.is_some() {
                    self.extra_answers += 1;
                } else {
                    self.answer = Some(text);
                }
            }
            Field::Alternative => self.alternatives.push(text),
        }
        self.last = Some(field);
        self.closed = false;
    }

    fn close_field(&mut self) {
        self.closed = true;
    }

    /// Appends an unlabeled line to whatever field was written last, unless a
    /// blank line has ended that field.
    fn continue_field(&mut self, text: &str) {
        if self.closed {
            return;
        }
        let target = match self.last {
            Some(Field::Question) => self.question.as_mut(),
            Some(Field::Answer) if self.extra_answers == 0 => self.answer.as_mut(),
            Some(Field::Alternative) => self.alternatives.last_mut(),
            _ => None,
        };
        if let Some(value) = target {
            if !value.is_empty() {
                value.push(' ');
            }
            value.push_str(text.trim());
        }
    }

    fn validate(self, expected_alternatives: u32, deck_name: &str) -> BlockOutcome {
        let question = self.question.unwrap_or_default();
        let answer = self.answer.unwrap_or_default();

        if question.is_empty() {
            return BlockOutcome::Invalid("missing question".to_string());
        }
        if answer.is_empty() {
            return BlockOutcome::Invalid("missing answer".to_string());
        }
        if self.extra_answers > 0 {
            return BlockOutcome::Invalid("more than one answer".to_string());
        }
        if self.alternatives.len() != expected_alternatives as usize {
            return BlockOutcome::Invalid(format!(
                "expected {} alternative(s), found {}",
                expected_alternatives,
                self.alternatives.len()
            ));
        }
        if self.alternatives.iter().any(|alt| alt.is_empty()) {
            return BlockOutcome::Invalid("empty alternative".to_string());
        }
        let mut seen = vec![answer.to_lowercase()];
        for alt in &self.alternatives {
            let alt = alt.to_lowercase();
            if seen.contains(&alt) {
                return BlockOutcome::Invalid("duplicate alternative".to_string());
            }
            seen.push(alt);
        }

        BlockOutcome::Valid(FlashcardRecord {
            question,
            correct_answer: answer,
            alternatives: self.alternatives,
            deck_name: deck_name.to_string(),
        })
    }
}

/// Label content with the bold markup that wraps the line removed.
///
/// Trailing `*` are only stripped when the line opened bold that the label
/// did not close, so `D: 2**` keeps its asterisks.
fn label_content<'a>(caps: &regex::Captures<'a>) -> &'a str {
    let lead = caps.get(1).map_or(0, |m| m.as_str().len());
    let mid = caps.get(3).map_or(0, |m| m.as_str().len());
    let post = caps.get(4).map_or(0, |m| m.as_str().len());
    let content = caps.get(5).map_or("", |m| m.as_str());

    let open = if lead == 0 {
        post
    } else {
        lead.saturating_sub(mid + post)
    };
    if open == 0 {
        return content;
    }
    content
        .strip_suffix("*".repeat(open).as_str())
        .map_or(content, str::trim_end)
}

/// Splits raw provider output into candidate blocks and validates each one.
///
/// A block ends at a delimiter line or when a new question label starts while
/// the current block already has content. Text outside labeled fields, such as
/// a preamble or a line after a blank line, is ignored.
pub fn parse_blocks(raw: &str, expected_alternatives: u32, deck_name: &str) -> Vec<BlockOutcome> {
    let mut outcomes = Vec::new();
    let mut current = CandidateBlock::default();

    let flush = |block: CandidateBlock, outcomes: &mut Vec<BlockOutcome>| {
        if !block.is_empty() {
            outcomes.push(block.validate(expected_alternatives, deck_name));
        }
    };

    for line in raw.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("```") {
            continue;
        }
        if DELIMITER_LINE.is_match(line) {
            flush(std::mem::take(&mut current), &mut outcomes);
            continue;
        }
        if let Some(caps) = LABEL_LINE.captures(line) {
            let field = Field::from_label(&caps[2]);
            if field == Field::Question && !current.is_empty() {
                flush(std::mem::take(&mut current), &mut outcomes);
            }
            current.push_field(field, label_content(&caps));
        } else if trimmed.is_empty() {
            current.close_field();
        } else {
            current.continue_field(trimmed);
        }
    }
    flush(current, &mut outcomes);

    outcomes
}

/// Extracts validated flashcards from raw provider output.
///
/// Invalid blocks are reported in [`ParseReport::rejected`] without affecting
/// the others. Fails only when no block survives validation.
pub fn parse(
    raw: &str,
    expected_count: u32,
    expected_alternatives: u32,
    deck_name: &str,
) -> Result<ParseReport, ExportError> {
    let mut records = Vec::new();
    let mut rejected = Vec::new();

    for (index, outcome) in parse_blocks(raw, expected_alternatives, deck_name)
        .into_iter()
        .enumerate()
    {
        match outcome {
            BlockOutcome::Valid(record) => records.push(record),
            BlockOutcome::Invalid(reason) => rejected.push(BlockRejection { index, reason }),
        }
    }

    if records.is_empty() {
        return Err(ExportError::NoValidRecords {
            raw: raw.to_string(),
            rejected,
        });
    }

    Ok(ParseReport {
        expected: expected_count,
        records,
        rejected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(question: &str, answer: &str, alternatives: &[&str]) -> String {
        let mut lines = vec![format!("Q: {}", question), format!("A: {}", answer)];
        for alt in alternatives {
            lines.push(format!("D: {}", alt));
        }
        lines.join("\n")
    }

    #[test]
    fn test_capital_of_france() {
        let raw = block(
            "What is the capital of France?",
            "Paris",
            &["Lyon", "Marseille", "Nice"],
        );
        let report = parse(&raw, 1, 3, "Default").unwrap();

        assert_eq!(report.records.len(), 1);
        let record = &report.records[0];
        assert_eq!(record.question, "What is the capital of France?");
        assert_eq!(record.correct_answer, "Paris");
        assert_eq!(record.alternatives, vec!["Lyon", "Marseille", "Nice"]);
        assert_eq!(record.deck_name, "Default");
        assert!(report.rejected.is_empty());
        assert_eq!(report.count_mismatch(), None);
    }

    #[test]
    fn test_well_formed_blocks_preserve_order() {
        let raw = (1..=4)
            .map(|i| block(&format!("Question {}?", i), &format!("Answer {}", i), &["x", "y"]))
            .collect::<Vec<_>>()
            .join("\n===\n");
        let report = parse(&raw, 4, 2, "Deck").unwrap();

        let questions: Vec<&str> = report.records.iter().map(|r| r.question.as_str()).collect();
        assert_eq!(
            questions,
            vec!["Question 1?", "Question 2?", "Question 3?", "Question 4?"]
        );
    }

    #[test]
    fn test_wrong_alternative_count_rejects_only_that_block() {
        let blocks = vec![
            block("One?", "1", &["a", "b", "c"]),
            block("Two?", "2", &["a", "b", "c"]),
            block("Three?", "3", &["a", "b"]),
            block("Four?", "4", &["a", "b", "c"]),
            block("Five?", "5", &["a", "b", "c"]),
        ];
        let raw = blocks.join("\n===\n");
        let report = parse(&raw, 5, 3, "Default").unwrap();

        assert_eq!(report.records.len(), 4);
        assert!(report.records.iter().all(|r| r.question != "Three?"));
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].index, 2);
        assert!(report.rejected[0].reason.contains("expected 3"));
        assert_eq!(report.count_mismatch(), Some((5, 4)));
    }

    #[test]
    fn test_nothing_parsable_fails() {
        let raw = "I'm sorry, I can't help with that.";
        match parse(raw, 3, 2, "Default") {
            Err(ExportError::NoValidRecords { raw: kept, rejected }) => {
                assert_eq!(kept, raw);
                assert!(rejected.is_empty());
            }
            other => panic!("expected NoValidRecords, got {:?}", other.map(|r| r.records)),
        }
    }

    #[test]
    fn test_all_blocks_invalid_fails_with_rejections() {
        let raw = "Q: Only a question\n===\nA: Only an answer";
        match parse(raw, 2, 0, "Default") {
            Err(ExportError::NoValidRecords { rejected, .. }) => {
                assert_eq!(rejected.len(), 2);
                assert_eq!(rejected[0].reason, "missing answer");
                assert_eq!(rejected[1].reason, "missing question");
            }
            _ => panic!("expected NoValidRecords"),
        }
    }

    #[test]
    fn test_answer_only_mode_rejects_distractors() {
        let raw = format!(
            "{}\n===\n{}",
            block("Boiling point of water?", "100 C", &[]),
            block("Freezing point of water?", "0 C", &["10 C"])
        );
        let report = parse(&raw, 2, 0, "Default").unwrap();

        assert_eq!(report.records.len(), 1);
        assert!(report.records[0].alternatives.is_empty());
        assert_eq!(report.rejected[0].index, 1);
    }

    #[test]
    fn test_blocks_split_on_question_label_without_delimiter() {
        let raw = "Here are your questions:\n\nQ: First?\nA: one\n\nQ: Second?\nA: two";
        let report = parse(raw, 2, 0, "Default").unwrap();
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[1].correct_answer, "two");
    }

    #[test]
    fn test_over_production_keeps_all_records() {
        let raw = (1..=3)
            .map(|i| block(&format!("Q{}?", i), "yes", &[]))
            .collect::<Vec<_>>()
            .join("\n===\n");
        let report = parse(&raw, 1, 0, "Default").unwrap();
        assert_eq!(report.records.len(), 3);
        assert_eq!(report.count_mismatch(), Some((1, 3)));
    }

    #[test]
    fn test_markdown_decorations_and_fences() {
        let raw = "```\n1. **Question:** What is H2O?\n**Answer:** Water\n- D: Salt\n```";
        let report = parse(raw, 1, 1, "Default").unwrap();
        let record = &report.records[0];
        assert_eq!(record.question, "What is H2O?");
        assert_eq!(record.correct_answer, "Water");
        assert_eq!(record.alternatives, vec!["Salt"]);
    }

    #[test]
    fn test_multiline_question_is_joined() {
        let raw = "Q: Which planet\nis closest to the sun?\nA: Mercury";
        let report = parse(raw, 1, 0, "Default").unwrap();
        assert_eq!(
            report.records[0].question,
            "Which planet is closest to the sun?"
        );
    }

    #[test]
    fn test_duplicate_answer_rejected() {
        let outcomes = parse_blocks("Q: Pick one\nA: this\nA: that", 0, "Default");
        assert_eq!(
            outcomes,
            vec![BlockOutcome::Invalid("more than one answer".to_string())]
        );
    }

    #[test]
    fn test_empty_alternative_rejected() {
        let outcomes = parse_blocks("Q: Pick one\nA: this\nD:", 1, "Default");
        assert_eq!(
            outcomes,
            vec![BlockOutcome::Invalid("empty alternative".to_string())]
        );
    }

    #[test]
    fn test_closing_remark_after_blank_line_is_dropped() {
        let raw = "Q: What is the capital of France?\nA: Paris\nD: Lyon\nD: Marseille\nD: Nice\n\n\
                   I hope these questions help you study!";
        let report = parse(raw, 1, 3, "Default").unwrap();
        assert_eq!(report.records[0].alternatives, vec!["Lyon", "Marseille", "Nice"]);
    }

    #[test]
    fn test_chatter_between_blocks_is_dropped() {
        let raw = "Q: One?\nA: 1\n\nHere is the next question:\nQ: Two?\nA: 2";
        let report = parse(raw, 2, 0, "Default").unwrap();
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[0].correct_answer, "1");
        assert_eq!(report.records[1].correct_answer, "2");
    }

    #[test]
    fn test_alternative_repeating_answer_rejected() {
        let raw = "Q: Capital of Italy?\nA: Rome\nD: Milan\nD: rome";
        let outcomes = parse_blocks(raw, 2, "Default");
        assert_eq!(
            outcomes,
            vec![BlockOutcome::Invalid("duplicate alternative".to_string())]
        );
    }

    #[test]
    fn test_repeated_alternative_rejected() {
        let raw = "Q: Capital of Italy?\nA: Rome\nD: Milan\nD: MILAN";
        let outcomes = parse_blocks(raw, 2, "Default");
        assert_eq!(
            outcomes,
            vec![BlockOutcome::Invalid("duplicate alternative".to_string())]
        );
    }

    #[test]
    fn test_trailing_asterisks_kept_without_bold_prefix() {
        let raw = "Q: What is 2 to the power of 1?\nA: 2\nD: 2**";
        let report = parse(raw, 1, 1, "Default").unwrap();
        assert_eq!(report.records[0].alternatives, vec!["2**"]);
    }

    #[test]
    fn test_bold_wrapped_labels_are_unwrapped() {
        let raw = "**Q: What is H2O?**\nA: **Water**\n**D**: Salt";
        let report = parse(raw, 1, 1, "Default").unwrap();
        let record = &report.records[0];
        assert_eq!(record.question, "What is H2O?");
        assert_eq!(record.correct_answer, "Water");
        assert_eq!(record.alternatives, vec!["Salt"]);
    }
}
