pub mod pipeline;

pub use pipeline::{InteractionPipeline, PipelineError, PipelineState, TurnOutcome};
