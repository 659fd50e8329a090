pub mod publisher;
pub mod report;

pub use publisher::{MetricsPublisher, PublisherSettings};
pub use report::{FailureStage, InvocationFailure, InvocationReport};
