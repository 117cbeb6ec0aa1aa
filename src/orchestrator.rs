#[path = "orchestrator/types.rs"]
mod types;

#[path = "orchestrator/fanout.rs"]
mod fanout;

#[path = "orchestrator/audit.rs"]
mod audit;

#[path = "orchestrator/summary.rs"]
mod summary;

pub use fanout::Orchestrator;
pub use summary::{AuditSummary, ProviderStats};
pub use types::{parse_queries, AuditQuery, AuditRecord};
