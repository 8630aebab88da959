use rand::seq::SliceRandom;
use rand::Rng;

use crate::anki::client::{NoteFields, NoteOptions, NoteRequest};
use crate::models::FlashcardRecord;

fn escape_field(text: &str) -> String {
    html_escape::encode_text(text.trim()).replace('\n', "<br>")
}

fn option_label(index: usize) -> String {
    match u8::try_from(index) {
        Ok(i) if i < 26 => char::from(b'A' + i).to_string(),
        _ => (index + 1).to_string(),
    }
}

/// Front side: the question, then a lettered option list when the record has
/// alternatives. The correct answer is shuffled in among them.
pub fn render_front<R: Rng + ?Sized>(record: &FlashcardRecord, rng: &mut R) -> String {
    let question = escape_field(&record.question);
    if record.alternatives.is_empty() {
        return question;
    }

    let mut options: Vec<&str> = record.alternatives.iter().map(String::as_str).collect();
    options.push(&record.correct_answer);
    options.shuffle(rng);

    let choices = options
        .iter()
        .enumerate()
        .map(|(i, option)| format!("{}. {}", option_label(i), escape_field(option)))
        .collect::<Vec<_>>()
        .join("<br>");

    format!("{}<br><br>{}", question, choices)
}

pub fn render_note<R: Rng + ?Sized>(
    record: &FlashcardRecord,
    note_type: &str,
    tags: &[String],
    rng: &mut R,
) -> NoteRequest {
    NoteRequest {
        deck_name: record.deck_name.clone(),
        model_name: note_type.to_string(),
        fields: NoteFields {
            front: render_front(record, rng),
            back: escape_field(&record.correct_answer),
        },
        options: NoteOptions {
            allow_duplicate: false,
        },
        tags: tags.to_vec(),
    }
}
