pub mod aggregation;
pub mod assembler;
pub mod eligibility;

pub use aggregation::{JobAggregate, RunAggregator};
pub use assembler::MetricAssembler;
pub use eligibility::{EligibilityFilter, DEFAULT_ELIGIBILITY_WINDOW_SECONDS};
