//! resourcery: layered resource lookup across search paths
//!
//! A [`ResourceManager`] resolves dot-delimited resource keys against a
//! category of files (`<category>.json`, `<category>.yaml`, ...) discovered
//! in a list of search directories, with in-memory overrides that outrank
//! file-backed values, per-key caching with explicit reload, pluggable
//! parsers keyed by file extension, and predicate-gated value transformers.
//!
//! # Example
//!
//! ```no_run
//! use resourcery::ResourceManager;
//!
//! let config = ResourceManager::new("config", vec!["/etc/app", "resources"])?;
//!
//! let output = config.get("PATHS.OUTPUT")?;
//! println!("{} (from {})", output, config.info("PATHS.OUTPUT")?);
//!
//! // expansion of environment references and ~ on returned values
//! let expanded = config.get_path("PATHS.OUTPUT")?.expand();
//! # Ok::<(), resourcery::Error>(())
//! ```

pub mod error;
pub mod expand;
pub mod flatten;
pub mod parser;
pub mod report;
pub mod resource;
pub mod value;

mod manager;

pub use error::{Error, ErrorKind, Result};
pub use expand::{Expand, Expandable};
pub use flatten::{flatten, SourcedValue};
pub use manager::{ManagerOptions, ResourceManager, SourceSpec, OVERRIDE_SOURCE};
pub use parser::{FnParser, Parser, ParserRegistry};
pub use report::{Incident, Reporter, Severity};
pub use resource::Resource;
pub use value::Value;
