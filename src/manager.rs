//! The resource manager
//!
//! A [`ResourceManager`] owns one category of resource files: it derives
//! search paths from its source specification, discovers files named
//! `<category>.<extension>` in them, and resolves dot-delimited keys
//! against their parsed content. Resolution order is overrides, then the
//! cache, then a fresh scan over the discovered files in discovery order.
//!
//! Two ordering rules coexist deliberately: eager preloading walks the
//! discovered files in reverse and merges flattened entries by overwrite
//! (the first-discovered file ends up winning), while single-key lookups
//! walk forward and take the first full match. Both land on the same
//! winning file; see the tests at the bottom of this module.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use glob::Pattern;

use crate::error::{Error, Result};
use crate::flatten::{flatten, SourcedValue};
use crate::parser::{self, Parser};
use crate::report::{Incident, Reporter};
use crate::resource::Resource;
use crate::value::Value;

/// Source label reported for overridden keys
pub const OVERRIDE_SOURCE: &str = "override";

/// Where a manager looks for resource files
///
/// Either the name of an environment variable holding a platform path list
/// (`:`-separated on Unix, `;`-separated on Windows), or an explicit
/// ordered list of directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// Environment variable whose value is a path list
    Env(String),
    /// Explicit ordered directory list
    Paths(Vec<PathBuf>),
}

impl SourceSpec {
    /// Source spec reading directories from an environment variable
    pub fn env(var: impl Into<String>) -> Self {
        SourceSpec::Env(var.into())
    }

    /// Source spec over an explicit directory list
    pub fn paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        SourceSpec::Paths(paths.into_iter().map(Into::into).collect())
    }
}

impl From<&str> for SourceSpec {
    fn from(var: &str) -> Self {
        SourceSpec::Env(var.to_string())
    }
}

impl From<String> for SourceSpec {
    fn from(var: String) -> Self {
        SourceSpec::Env(var)
    }
}

impl From<Vec<PathBuf>> for SourceSpec {
    fn from(paths: Vec<PathBuf>) -> Self {
        SourceSpec::Paths(paths)
    }
}

impl From<Vec<&str>> for SourceSpec {
    fn from(paths: Vec<&str>) -> Self {
        SourceSpec::paths(paths)
    }
}

impl From<&[&str]> for SourceSpec {
    fn from(paths: &[&str]) -> Self {
        SourceSpec::paths(paths.iter().copied())
    }
}

/// Options for constructing a [`ResourceManager`]
#[derive(Debug, Clone)]
pub struct ManagerOptions {
    /// Eagerly load and flatten all discovered files at construction time
    pub preload: bool,
    /// Incident severity policy for this manager
    pub reporter: Reporter,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            preload: true,
            reporter: Reporter::new(),
        }
    }
}

/// A value-to-value rewrite gated by a predicate
struct Transformer {
    check: Box<dyn Fn(&Value) -> bool + Send + Sync>,
    apply: Box<dyn Fn(Value) -> Value + Send + Sync>,
}

/// Manages one category of resource files across a set of search paths
pub struct ResourceManager {
    category: String,
    source: SourceSpec,
    cache: RwLock<HashMap<String, SourcedValue>>,
    overrides: HashMap<String, Value>,
    transformers: Vec<Transformer>,
    reporter: Reporter,
}

impl std::fmt::Debug for ResourceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceManager")
            .field("category", &self.category)
            .field("source", &self.source)
            .field("overrides", &self.overrides)
            .field("reporter", &self.reporter)
            .field("transformers", &self.transformers.len())
            .finish_non_exhaustive()
    }
}

impl ResourceManager {
    /// Create a manager and eagerly load all discovered files
    ///
    /// # Example
    ///
    /// ```no_run
    /// use resourcery::ResourceManager;
    ///
    /// let config = ResourceManager::new("config", vec!["/etc/app", "resources"])?;
    /// let output = config.get("PATHS.OUTPUT")?;
    /// # Ok::<(), resourcery::Error>(())
    /// ```
    pub fn new(category: impl Into<String>, source: impl Into<SourceSpec>) -> Result<Self> {
        Self::with_options(category, source, ManagerOptions::default())
    }

    /// Create a manager with explicit options
    pub fn with_options(
        category: impl Into<String>,
        source: impl Into<SourceSpec>,
        options: ManagerOptions,
    ) -> Result<Self> {
        let category = category.into();
        let reporter = options.reporter;

        if category.contains('*') {
            reporter.report(
                Incident::WildcardCategory,
                format!(
                    "Using '*' in category '{}' can cause problems\nwhen files define conflicting keys",
                    category
                ),
            )?;
        }

        let mut manager = Self {
            category,
            source: source.into(),
            cache: RwLock::new(HashMap::new()),
            overrides: HashMap::new(),
            transformers: Vec::new(),
            reporter,
        };

        if options.preload {
            manager.preload()?;
        }

        Ok(manager)
    }

    /// The category prefix this manager searches for
    pub fn category(&self) -> &str {
        &self.category
    }

    /// The source specification this manager scans
    pub fn source(&self) -> &SourceSpec {
        &self.source
    }

    /// The incident severity policy of this manager
    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Get a resource, honoring the cache
    ///
    /// Overrides win over everything; otherwise the cache is consulted and
    /// on a miss the discovered files are scanned in discovery order and
    /// the first full match is cached and returned. The first matching
    /// transformer (most recently registered first) is applied before
    /// wrapping.
    pub fn get(&self, key: &str) -> Result<Resource> {
        self.fetch(key, false)
    }

    /// Get a resource, re-reading the underlying files even when cached
    ///
    /// The freshly resolved value replaces the cache entry.
    pub fn reload(&self, key: &str) -> Result<Resource> {
        self.fetch(key, true)
    }

    /// Where a resource currently comes from
    ///
    /// Returns the originating file path, or [`OVERRIDE_SOURCE`] when the
    /// key is overridden.
    pub fn info(&self, key: &str) -> Result<String> {
        Ok(self.resolve(key, false)?.source)
    }

    /// Set an in-memory override for a key
    ///
    /// Overrides always outrank cached and file-backed values. The key is
    /// not validated against any file.
    pub fn set_override(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.overrides.insert(key.into(), value.into());
    }

    /// Remove an override; does nothing if none is set
    pub fn remove_override(&mut self, key: &str) {
        self.overrides.remove(key);
    }

    /// Register a parser for a file format, globally
    ///
    /// Visible to every manager immediately. A later registration for the
    /// same format silently replaces the earlier one.
    pub fn register_parser(format: impl AsRef<str>, parser: Arc<dyn Parser>) {
        parser::register_global(format, parser);
    }

    /// Register a transformer on this manager
    ///
    /// Transformers are tried most recently registered first; the first
    /// whose predicate accepts the resolved value rewrites it, and at most
    /// one transformer is applied per lookup.
    pub fn register_transformer<C, A>(&mut self, check: C, apply: A)
    where
        C: Fn(&Value) -> bool + Send + Sync + 'static,
        A: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.transformers.push(Transformer {
            check: Box::new(check),
            apply: Box::new(apply),
        });
    }

    /// Drop all cached entries
    ///
    /// The next `get` per key scans the files again. Overrides are
    /// unaffected.
    pub fn clear_cache(&self) {
        self.cache.write().unwrap().clear();
    }

    /// Get a resource coerced to a string
    pub fn get_string(&self, key: &str) -> Result<Resource<String>> {
        let value = self.get(key)?.into_inner();
        let coerced = match value {
            Value::String(s) => s,
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => "null".to_string(),
            other => return Err(Error::type_coercion(key, "string", other.type_name())),
        };
        Ok(Resource::new(coerced))
    }

    /// Get a string resource as a path
    pub fn get_path(&self, key: &str) -> Result<Resource<PathBuf>> {
        let value = self.get(key)?.into_inner();
        match value {
            Value::String(s) => Ok(Resource::new(PathBuf::from(s))),
            other => Err(Error::type_coercion(key, "path", other.type_name())),
        }
    }

    /// Get a resource coerced to an integer
    pub fn get_i64(&self, key: &str) -> Result<i64> {
        let value = self.get(key)?.into_inner();
        match value {
            Value::Integer(i) => Ok(i),
            Value::String(s) => s
                .parse()
                .map_err(|_| Error::type_coercion(key, "integer", format!("string (\"{}\")", s))),
            other => Err(Error::type_coercion(key, "integer", other.type_name())),
        }
    }

    /// Get a resource coerced to a float
    pub fn get_f64(&self, key: &str) -> Result<f64> {
        let value = self.get(key)?.into_inner();
        match value {
            Value::Float(f) => Ok(f),
            Value::Integer(i) => Ok(i as f64),
            Value::String(s) => s
                .parse()
                .map_err(|_| Error::type_coercion(key, "float", format!("string (\"{}\")", s))),
            other => Err(Error::type_coercion(key, "float", other.type_name())),
        }
    }

    /// Get a resource coerced to a boolean; only `true`/`false` strings
    /// coerce
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        let value = self.get(key)?.into_inner();
        match value {
            Value::Bool(b) => Ok(b),
            Value::String(s) => match s.to_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(Error::type_coercion(
                    key,
                    "boolean",
                    format!("string (\"{}\") - only \"true\" or \"false\" allowed", s),
                )),
            },
            other => Err(Error::type_coercion(key, "boolean", other.type_name())),
        }
    }

    /// Resolve, transform, and wrap a key
    fn fetch(&self, key: &str, reload: bool) -> Result<Resource> {
        let entry = self.resolve(key, reload)?;
        Ok(Resource::new(self.transform(entry.value)))
    }

    /// Apply the first matching transformer, most recently registered first
    fn transform(&self, value: Value) -> Value {
        for rule in self.transformers.iter().rev() {
            if (rule.check)(&value) {
                return (rule.apply)(value);
            }
        }
        value
    }

    /// Resolve a key to its value and source label
    fn resolve(&self, key: &str, reload: bool) -> Result<SourcedValue> {
        if let Some(value) = self.overrides.get(key) {
            return Ok(SourcedValue::new(value.clone(), OVERRIDE_SOURCE));
        }

        if !reload {
            if let Some(entry) = self.cache.read().unwrap().get(key) {
                return Ok(entry.clone());
            }
        }

        if key.contains('*') {
            return Err(Error::wildcard_lookup(key));
        }

        let segments: Vec<&str> = key.split('.').collect();
        for (path, extension) in self.all_source_files()? {
            let parser = parser::global_registry().read().unwrap().get(&extension);
            let Some(parser) = parser else {
                log::warn!("No parser found for: '{}' ({})", extension, path.display());
                continue;
            };

            // every probe re-parses; only the cache above is reused
            let data = parser.parse(&path)?;

            let mut current = &data;
            let mut remaining = segments.as_slice();
            while let [head, rest @ ..] = remaining {
                match current.get(head) {
                    Some(child) => {
                        current = child;
                        remaining = rest;
                    }
                    None => break,
                }
            }
            if !remaining.is_empty() {
                continue;
            }

            let entry = SourcedValue::new(current.clone(), path.display().to_string());
            self.cache
                .write()
                .unwrap()
                .insert(key.to_string(), entry.clone());
            return Ok(entry);
        }

        Err(Error::not_found(key))
    }

    /// Load every discovered file into the cache as flattened entries
    ///
    /// Files are visited in reverse discovery order and merged by
    /// overwrite, so the first-discovered file wins in the final state.
    fn preload(&mut self) -> Result<()> {
        let files = self.all_source_files()?;
        for (path, extension) in files.iter().rev() {
            let parser = parser::global_registry().read().unwrap().get(extension);
            let Some(parser) = parser else {
                self.reporter.report(
                    Incident::UnknownExtension,
                    format!("No parser found for: '{}' ({})", extension, path.display()),
                )?;
                continue;
            };

            let data = parser.parse(path)?;
            let flat = flatten(&data, &path.display().to_string());
            self.cache.write().unwrap().extend(flat);
        }
        Ok(())
    }

    /// Candidate search directories from the source specification
    fn source_paths(&self) -> Result<Vec<PathBuf>> {
        let paths: Vec<PathBuf> = match &self.source {
            SourceSpec::Env(var) => {
                let joined = std::env::var_os(var).unwrap_or_default();
                std::env::split_paths(&joined).collect()
            }
            SourceSpec::Paths(paths) => paths.clone(),
        };

        for path in &paths {
            if path.is_file() {
                self.reporter.report(
                    Incident::ExpectedDirectory,
                    format!("Expected directory but found file: {}", path.display()),
                )?;
            }
        }

        Ok(paths)
    }

    /// Regular files in `dir` matching `<category>.*`
    ///
    /// Order is whatever the directory listing yields; deliberately not
    /// sorted. A missing or unreadable directory contributes nothing.
    fn source_files(&self, dir: &Path) -> Vec<PathBuf> {
        let pattern = match Pattern::new(&format!("{}.*", self.category)) {
            Ok(pattern) => pattern,
            Err(_) => return Vec::new(),
        };

        let dir = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map(|name| pattern.matches(name))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// All discovered files across the search paths, in discovery order,
    /// each paired with its lowercased extension
    fn all_source_files(&self) -> Result<Vec<(PathBuf, String)>> {
        let mut files = Vec::new();
        for dir in self.source_paths()? {
            for path in self.source_files(&dir) {
                let extension = path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .unwrap_or_default()
                    .to_ascii_lowercase();
                files.push((path, extension));
            }
        }
        Ok(files)
    }
}
