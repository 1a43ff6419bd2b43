//! FindMyStage Profile: turns extracted text into a speaker profile.
//!
//! One completion call produces a prose reply; three independent extractors
//! recover topics, personality traits and a summary from it, each falling
//! back through progressively weaker strategies down to fixed defaults.

pub mod parse;
pub mod prompt;
pub mod synthesizer;
pub mod types;

pub use parse::{extract_personality, extract_summary, extract_topics, parse_reply};
pub use synthesizer::Synthesizer;
pub use types::*;
