//! The wrapper returned by lookups
//!
//! [`Resource`] decorates a resolved value with the expand capability
//! without altering the value's native behavior: it derefs to the wrapped
//! type, so a `Resource<Value>` reads like a `Value` and a
//! `Resource<PathBuf>` like a `PathBuf`. Each lookup returns a fresh
//! wrapper; expansion never mutates in place.

use std::fmt;
use std::ops::Deref;

use crate::expand::{Expand, Expandable};
use crate::value::Value;

/// A resolved value decorated with the expand capability
#[derive(Debug, Clone, PartialEq)]
pub struct Resource<T = Value> {
    value: T,
}

impl<T> Resource<T> {
    /// Wrap a value
    pub fn new(value: T) -> Self {
        Self { value }
    }

    /// Borrow the wrapped value
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Unwrap into the contained value
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: Expandable> Resource<T> {
    /// Expand with default options (environment variables and `~`)
    pub fn expand(&self) -> Resource<T> {
        self.expand_with(&Expand::new())
    }

    /// Expand with explicit options, returning a new wrapper of the same
    /// type
    pub fn expand_with(&self, options: &Expand) -> Resource<T> {
        Resource::new(self.value.expanded(options))
    }
}

impl<T> Deref for Resource<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> AsRef<T> for Resource<T> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}

impl<T: fmt::Display> fmt::Display for Resource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

impl<T> From<T> for Resource<T> {
    fn from(value: T) -> Self {
        Resource::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_deref_gives_native_behavior() {
        let resource = Resource::new(Value::String("hello".into()));
        assert_eq!(resource.as_str(), Some("hello"));

        let path: Resource<PathBuf> = Resource::new(PathBuf::from("/a/b"));
        assert_eq!(path.file_name(), Some(std::ffi::OsStr::new("b")));
    }

    #[test]
    fn test_expand_returns_new_wrapper() {
        std::env::set_var("RSRC_WRAP_A", "X");
        let original = Resource::new(Value::String("$RSRC_WRAP_A/{t}".into()));
        let expanded = original.expand_with(&Expand::new().keyword("t", "end"));
        std::env::remove_var("RSRC_WRAP_A");

        assert_eq!(expanded.as_str(), Some("X/end"));
        // the original is untouched
        assert_eq!(original.as_str(), Some("$RSRC_WRAP_A/{t}"));
    }

    #[test]
    fn test_expand_is_a_no_op_for_non_strings() {
        let resource = Resource::new(Value::Integer(3));
        assert_eq!(resource.expand(), resource);
    }

    #[test]
    fn test_display_passthrough() {
        assert_eq!(Resource::new(Value::Integer(7)).to_string(), "7");
    }
}
