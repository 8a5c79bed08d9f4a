//! Pipeline orchestration: extract → transform → load across a topic list.

pub mod pipeline;

pub use pipeline::{
    PageSink, PipelineConfig, PipelineReport, ProgressReporter, SilentProgress, TopicOutcome,
    run_pipeline,
};
