//! Query several hosted LLM providers with the same prompt at once.
//!
//! An [`Orchestrator`] owns one [`ProviderAdapter`] per provider that has a
//! credential. [`Orchestrator::query_all`] fans a prompt out to them
//! concurrently and gathers a [`QueryResultSet`]; [`Orchestrator::audit`]
//! runs a list of prompts one after another and returns an
//! [`AuditRecord`] per prompt.
//!
//! ```no_run
//! use llm_orchestrator::{config::load_config, Orchestrator};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config(None)?;
//! let orchestrator = Orchestrator::from_config(&config);
//! let results = orchestrator.query("Find a Ford dealer near Aurora, CO").await?;
//! for (provider, result) in results.iter() {
//!     match result.error() {
//!         Some(err) => println!("{provider}: {err}"),
//!         None => println!("{provider}: {}", result.response().unwrap_or_default()),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod backends;
pub mod builder;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod persistence;
pub mod provider;
pub mod result;
pub mod usage;

pub use adapter::{Completion, ProviderAdapter};
pub use error::LLMError;
pub use orchestrator::{parse_queries, AuditQuery, AuditRecord, AuditSummary, Orchestrator};
pub use persistence::{JsonFileLogger, QueryLogEntry, QueryLogger};
pub use provider::ProviderId;
pub use result::{QueryResult, QueryResultSet};
