pub mod engine;
pub mod frequency;
pub mod merge;
pub mod types;
