mod aggregator;
mod pipeline;
mod ranker;
mod scorer;
mod source;
mod types;

pub use pipeline::{Pipeline, PipelineOptions};
pub use ranker::Standing;
pub use source::{ActiveAuthors, AssumeActive, PostSource, PriorActivity, ProfileSource, ScoredPostSink};
pub use types::{AuthorProfile, Metrics, ScoredPost, SourcePost};

#[cfg(test)]
pub use types::Post;
