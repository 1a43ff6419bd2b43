//! Runtime orchestration: drives one analysis from input to displayed profile.
//!
//! Document → extractor → synthesizer when text is available, otherwise the
//! link-only profile API. Results land on a `ProfileBoard` that discards
//! responses from superseded requests.

pub mod board;
pub mod orchestrator;
pub mod submit;
pub mod types;

pub use board::{Outcome, ProfileBoard, Settlement};
pub use orchestrator::Analyzer;
pub use submit::LinkSubmitter;
pub use types::*;
