use openrouter_api::{
    models::provider_preferences::ProviderPreferences,
    models::provider_preferences::ProviderSort,
    types::chat::{ChatCompletionRequest, Message},
};

use crate::config::{ApiKey, ConfigSnapshot};
use crate::error::ExportError;

/// Line separating question blocks in the model output.
pub const BLOCK_DELIMITER: &str = "===";
pub const QUESTION_LABEL: &str = "Q:";
pub const ANSWER_LABEL: &str = "A:";
pub const ALTERNATIVE_LABEL: &str = "D:";

const SYSTEM_PROMPT: &str = "You are a tutor who writes study flashcards from a student's notes. \
Follow the requested output format exactly and write nothing else.";

/// A provider request ready to be sent, with the counts the parser will enforce.
pub struct GenerationRequest {
    pub api_key: ApiKey,
    pub prompt: String,
    pub expected_questions: u32,
    pub expected_alternatives: u32,
    pub deck_name: String,
    pub body: ChatCompletionRequest,
}

fn format_instructions(num_questions: u32, num_alternatives: u32) -> String {
    let mut lines = vec![
        format!(
            "Write every question as its own block and put a line containing only {} between blocks.",
            BLOCK_DELIMITER
        ),
        "Each block looks like this:".to_string(),
        format!("{} <the question>", QUESTION_LABEL),
        format!("{} <the correct answer>", ANSWER_LABEL),
    ];
    if num_alternatives > 0 {
        lines.push(format!("{} <an incorrect but plausible answer>", ALTERNATIVE_LABEL));
        lines.push(format!(
            "Every block must have exactly {} {} line(s), each with a different incorrect answer.",
            num_alternatives, ALTERNATIVE_LABEL
        ));
    } else {
        lines.push(format!(
            "Do not write any {} lines: each block has only the question and its answer.",
            ALTERNATIVE_LABEL
        ));
    }
    lines.push(format!(
        "Write exactly {} block(s). Keep each question and answer on a single line.",
        num_questions
    ));
    lines.join("\n")
}

pub fn build_prompt(source_text: &str, num_questions: u32, num_alternatives: u32) -> String {
    format!(
        r#"Create exactly {} question(s) that test understanding of the notes below.
Each question has one correct answer and {} alternative(s).

{}

Notes:
"""
{}
""""#,
        num_questions,
        num_alternatives,
        format_instructions(num_questions, num_alternatives),
        source_text.trim()
    )
}

/// Turns source text and the run configuration into a provider request.
///
/// Fails with [`ExportError::EmptyInput`] for blank text or a zero question
/// count, so such a run never reaches the network.
pub fn build(source_text: &str, config: &ConfigSnapshot) -> Result<GenerationRequest, ExportError> {
    if source_text.trim().is_empty() {
        return Err(ExportError::EmptyInput("the source text is empty".to_string()));
    }
    if config.num_questions == 0 {
        return Err(ExportError::EmptyInput(
            "zero questions were requested".to_string(),
        ));
    }

    let prompt = build_prompt(source_text, config.num_questions, config.num_alternatives);
    let sampling = &config.sampling;
    let max_tokens = sampling
        .max_tokens_per_question
        .saturating_mul(config.num_questions);

    let messages = vec![
        Message::text("system", SYSTEM_PROMPT),
        Message::text("user", &prompt),
    ];

    let provider = ProviderPreferences::new().with_sort(ProviderSort::Throughput);

    let body = ChatCompletionRequest {
        model: config.model.clone(),
        messages,
        provider: Some(provider),
        stream: None,
        response_format: None,
        tools: None,
        tool_choice: None,
        models: None,
        transforms: None,
        route: None,
        user: None,
        max_tokens: Some(max_tokens),
        temperature: Some(sampling.temperature.into()),
        top_p: Some(sampling.top_p.into()),
        top_k: None,
        frequency_penalty: Some(sampling.frequency_penalty.into()),
        presence_penalty: Some(sampling.presence_penalty.into()),
        repetition_penalty: None,
        min_p: None,
        top_a: None,
        seed: None,
        stop: None,
        logit_bias: None,
        logprobs: None,
        top_logprobs: None,
        prediction: None,
        parallel_tool_calls: None,
        verbosity: None,
    };

    Ok(GenerationRequest {
        api_key: config.api_key.clone(),
        prompt,
        expected_questions: config.num_questions,
        expected_alternatives: config.num_alternatives,
        deck_name: config.deck_name.clone(),
        body,
    })
}
