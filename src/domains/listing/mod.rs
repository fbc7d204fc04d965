//! The listing core: which records a view shows and what it derives from them.
//! Nothing here performs I/O.

pub mod filter;
pub mod metrics;

pub use filter::{filter_records, FilterCriteria, FilterInput, Listable, PredicateOutcome};
pub use metrics::{
    compute_metrics, status_display, summarize_campaigns, summarize_projects, CampaignSummary, CurrencyFormat,
    Measurable, ProjectSummary, RecordMetrics, StatusDisplay, StatusTier,
};
