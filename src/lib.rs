//! AI Term Explainer
//!
//! Explains AI/ML terms at beginner, intermediate and expert level with an
//! LLM agent that grounds its answers in Wikipedia.
//!
//! The lookup core is usable on its own:
//!
//! ```rust,no_run
//! use term_explainer::config::WikiConfig;
//! use term_explainer::lookup::{Lookup, LookupSettings};
//! use term_explainer::wiki::WikipediaClient;
//!
//! # async fn run() -> term_explainer::Result<()> {
//! let client = WikipediaClient::new(&WikiConfig::default())?;
//! let lookup = Lookup::new(client, LookupSettings::default());
//!
//! match lookup.lookup("cross-entropy loss", 500).await {
//!     Ok(definition) => println!("{}", definition),
//!     Err(e) => println!("lookup failed: {}", e),
//! }
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod agent;
pub mod config;
pub mod error;
pub mod explain;
pub mod lookup;
pub mod tools;
pub mod ui;
pub mod wiki;

pub use error::{Error, Result};
