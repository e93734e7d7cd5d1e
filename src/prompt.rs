//! System-instruction assembly for vision requests

use serde::Deserialize;

/// Fallback instruction when the request carries no prompt
pub const DEFAULT_PROMPT: &str =
    "Analyze the provided image(s) and describe what you see in detail.";

/// Strict response-language directive for Arabic
pub const ARABIC_DIRECTIVE: &str =
    "You MUST respond in Arabic only. Do not use any other language in your response.";

/// Strict response-language directive for everything else
pub const ENGLISH_DIRECTIVE: &str =
    "You MUST respond in English only. Do not use any other language in your response.";

/// Optional personalization fields folded into the system instruction
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonalTouch {
    pub nickname: Option<String>,
    pub tone: Option<String>,
    pub style: Option<String>,
}

/// Build the system instruction from language + personalization.
///
/// Plain concatenation with presence checks, nothing cleverer.
pub fn build_system_instruction(language: &str, personal: Option<&PersonalTouch>) -> String {
    let mut instruction = String::from(
        "You are a vision assistant. Examine the supplied images and answer the user's request.",
    );

    instruction.push(' ');
    instruction.push_str(if language == "ar" {
        ARABIC_DIRECTIVE
    } else {
        ENGLISH_DIRECTIVE
    });

    if let Some(touch) = personal {
        if let Some(nickname) = touch.nickname.as_deref().filter(|s| !s.is_empty()) {
            instruction.push_str(&format!(" Address the user as {}.", nickname));
        }
        if let Some(tone) = touch.tone.as_deref().filter(|s| !s.is_empty()) {
            instruction.push_str(&format!(" Use a {} tone.", tone));
        }
        if let Some(style) = touch.style.as_deref().filter(|s| !s.is_empty()) {
            instruction.push_str(&format!(" Reply style: {}.", style));
        }
    }

    instruction
}

/// Normalize image MIME types the provider rejects (`image/jpg` is not a
/// registered type; the provider wants `image/jpeg`).
pub fn normalize_mime(mime: &str) -> &str {
    match mime {
        "image/jpg" => "image/jpeg",
        other => other,
    }
}
