//! File parsers and the parser registry
//!
//! A parser turns a source file into a nested [`Value`]. Parsers are
//! dispatched by lowercased file extension through a registry; the
//! process-wide registry behind [`global_registry`] is what managers
//! consult, and it is initialized with the builtin JSON (and, with the
//! default `yaml` feature, YAML) parsers on first use.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, OnceLock, RwLock};

use crate::error::{Error, Result};
use crate::value::Value;

/// Trait for file parser implementations
pub trait Parser: Send + Sync {
    /// Parse the file at `path` into a nested value
    fn parse(&self, path: &Path) -> Result<Value>;
}

/// A simple function-based parser
pub struct FnParser<F>
where
    F: Fn(&Path) -> Result<Value> + Send + Sync,
{
    func: F,
}

impl<F> FnParser<F>
where
    F: Fn(&Path) -> Result<Value> + Send + Sync,
{
    /// Create a new function-based parser
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Parser for FnParser<F>
where
    F: Fn(&Path) -> Result<Value> + Send + Sync,
{
    fn parse(&self, path: &Path) -> Result<Value> {
        (self.func)(path)
    }
}

// Global parser registry shared by all managers
static GLOBAL_REGISTRY: OnceLock<RwLock<ParserRegistry>> = OnceLock::new();

/// Get the global parser registry.
///
/// Lazily initialized with the builtin parsers. Registrations here are
/// visible to every manager immediately.
pub fn global_registry() -> &'static RwLock<ParserRegistry> {
    GLOBAL_REGISTRY.get_or_init(|| RwLock::new(ParserRegistry::with_builtins()))
}

/// Register a parser in the global registry.
///
/// The format is lowercased; a later registration for the same format
/// silently replaces the earlier one.
pub fn register_global(format: impl AsRef<str>, parser: Arc<dyn Parser>) {
    let mut registry = global_registry()
        .write()
        .expect("Global parser registry lock poisoned");
    registry.register(format, parser);
}

/// Registry of available parsers, keyed by lowercase file extension
#[derive(Clone, Default)]
pub struct ParserRegistry {
    parsers: HashMap<String, Arc<dyn Parser>>,
}

impl ParserRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    /// Create a registry with the standard builtin parsers
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_builtin_parsers();
        registry
    }

    /// Register the builtin parsers (json, and yaml when compiled in)
    fn register_builtin_parsers(&mut self) {
        self.register("json", Arc::new(FnParser::new(parse_json)));

        #[cfg(feature = "yaml")]
        self.register("yaml", Arc::new(FnParser::new(parse_yaml)));

        #[cfg(not(feature = "yaml"))]
        log::warn!("built without the 'yaml' feature; *.yaml files will not be parsed by default");
    }

    /// Register a parser for a format
    ///
    /// The format is lowercased; a later registration for the same format
    /// silently replaces the earlier one.
    pub fn register(&mut self, format: impl AsRef<str>, parser: Arc<dyn Parser>) {
        self.parsers
            .insert(format.as_ref().to_ascii_lowercase(), parser);
    }

    /// Register a function as a parser
    pub fn register_fn<F>(&mut self, format: impl AsRef<str>, func: F)
    where
        F: Fn(&Path) -> Result<Value> + Send + Sync + 'static,
    {
        self.register(format, Arc::new(FnParser::new(func)));
    }

    /// Get the parser for a format, if any
    ///
    /// Lookup is case-insensitive.
    pub fn get(&self, format: &str) -> Option<Arc<dyn Parser>> {
        self.parsers.get(&format.to_ascii_lowercase()).cloned()
    }

    /// Check if a parser is registered for a format
    pub fn contains(&self, format: &str) -> bool {
        self.parsers.contains_key(&format.to_ascii_lowercase())
    }
}

/// Builtin JSON parser: whole-file standard JSON deserialization
fn parse_json(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::io(path.display().to_string(), e.to_string()))?;
    serde_json::from_str(&content)
        .map_err(|e| Error::parse(format!("{}: {}", path.display(), e)))
}

/// Builtin YAML parser: non-executing whole-file load
#[cfg(feature = "yaml")]
fn parse_yaml(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::io(path.display().to_string(), e.to_string()))?;
    serde_yaml::from_str(&content)
        .map_err(|e| Error::parse(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Write;

    #[test]
    fn test_builtins_are_registered() {
        let registry = ParserRegistry::with_builtins();
        assert!(registry.contains("json"));
        #[cfg(feature = "yaml")]
        assert!(registry.contains("yaml"));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = ParserRegistry::with_builtins();
        assert!(registry.contains("JSON"));
        assert!(registry.get("Json").is_some());
    }

    #[test]
    fn test_registration_lowercases_format() {
        let mut registry = ParserRegistry::new();
        registry.register_fn("INI", |_| Ok(Value::Null));
        assert!(registry.contains("ini"));
    }

    #[test]
    fn test_later_registration_replaces_earlier() {
        let mut registry = ParserRegistry::new();
        registry.register_fn("txt", |_| Ok(Value::Integer(1)));
        registry.register_fn("txt", |_| Ok(Value::Integer(2)));

        let parsed = registry.get("txt").unwrap().parse(Path::new("x.txt")).unwrap();
        assert_eq!(parsed, Value::Integer(2));
    }

    #[test]
    fn test_parse_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"a": {{"b": 1}}}}"#).unwrap();

        let value = parse_json(file.path()).unwrap();
        assert_eq!(value.get("a").unwrap().get("b").unwrap().as_i64(), Some(1));
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_parse_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(file, "a:\n  b: hello\n").unwrap();

        let value = parse_yaml(file.path()).unwrap();
        assert_eq!(
            value.get("a").unwrap().get("b").unwrap().as_str(),
            Some("hello")
        );
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{{not json").unwrap();

        let err = parse_json(file.path()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let err = parse_json(Path::new("/nonexistent/resources.json")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Io);
    }

    #[test]
    fn test_global_registry_is_shared() {
        register_global("testfmt", Arc::new(FnParser::new(|_| Ok(Value::Bool(true)))));
        assert!(global_registry().read().unwrap().contains("testfmt"));
    }
}
