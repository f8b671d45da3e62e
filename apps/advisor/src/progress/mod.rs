// Progress tracking — per-session journey state and the re-evaluation
// trigger engine that decides when the scoring pipeline must run again.

pub mod engine;
pub mod journey;
