//! Separating a model's "thinking" from its answer.
//!
//! Reasoning models wrap their deliberation in `<think> ... </think>` and
//! put the answer after the closing tag. Templates frequently open the tag
//! themselves as part of the generation prompt, so the generated text often
//! carries only the closing marker.

/// Opening marker of a reasoning segment
pub const REASONING_OPEN: &str = "<think>";
/// Closing marker of a reasoning segment
pub const REASONING_CLOSE: &str = "</think>";

/// The outcome of one generation, split for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationResult {
    /// Deliberation preceding the answer; empty when there was none
    pub reasoning: String,
    /// Final answer, appended to the transcript
    pub answer: String,
}

impl GenerationResult {
    pub fn has_reasoning(&self) -> bool {
        !self.reasoning.is_empty()
    }
}

/// Split raw model output at the first closing marker.
///
/// Text before the marker is the reasoning (opening markers removed), text
/// after it is the answer. Without a marker everything is the answer. When
/// the marker leaves an empty answer, the pre-marker text is returned as the
/// answer verbatim (trimmed) and the reasoning is dropped, so the user never
/// sees a blank reply; this can surface reasoning text as the answer.
pub fn split_reasoning(raw: &str) -> GenerationResult {
    let Some((before, after)) = raw.split_once(REASONING_CLOSE) else {
        return GenerationResult {
            reasoning: String::new(),
            answer: raw.trim().to_string(),
        };
    };

    let answer = after.trim();
    if answer.is_empty() {
        return GenerationResult {
            reasoning: String::new(),
            answer: before.trim().to_string(),
        };
    }

    GenerationResult {
        reasoning: before.trim().replace(REASONING_OPEN, "").trim().to_string(),
        answer: answer.to_string(),
    }
}
