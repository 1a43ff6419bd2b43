//! Fixed instruction prompt for profile synthesis.

use findmystage_chat::ChatMessage;

pub const SYSTEM_PROMPT: &str = "You should serve as a professional summarizing a client's \
introduction or resume. Please make it from a first person perspective.";

pub const USER_INSTRUCTION: &str = "Please read this content. Give me a summary of the speaker's \
topics, the benefit they provide to their audience, and acting as a psychologist, give me a \
summary of their personality.";

/// Appended in structured mode so the reply can be parsed without heuristics.
pub const STRUCTURED_INSTRUCTION: &str = "Respond with a single JSON object with the keys \
\"topics\" (array of short strings), \"personality\" (array of short trait names) and \
\"summary\" (one paragraph).";

/// The two messages sent for one analysis: persona, then instruction plus text.
pub fn build_messages(text: &str, structured: bool) -> Vec<ChatMessage> {
    let instruction = if structured {
        format!("{} {}", USER_INSTRUCTION, STRUCTURED_INSTRUCTION)
    } else {
        USER_INSTRUCTION.to_string()
    };
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(format!("{}\n\n{}", instruction, text)),
    ]
}
