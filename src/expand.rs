//! Value expansion: environment variables, home directory, keywords
//!
//! Resolved string and path values often carry references that only make
//! sense on the machine running the lookup (`$HOME/output`, `~/cache`,
//! `{project}/scenes`). [`Expandable::expanded`] substitutes them in order:
//! environment references first, then a leading `~`, then literal
//! `{keyword}` placeholders. Unset environment variables are left as
//! literal text.

use std::path::PathBuf;

use crate::value::Value;

/// Options controlling what [`Expandable::expanded`] substitutes
#[derive(Debug, Clone)]
pub struct Expand {
    env_vars: bool,
    user: bool,
    keywords: Vec<(String, String)>,
}

impl Default for Expand {
    fn default() -> Self {
        Self::new()
    }
}

impl Expand {
    /// Create options with environment and home expansion enabled and no
    /// keywords
    pub fn new() -> Self {
        Self {
            env_vars: true,
            user: true,
            keywords: Vec::new(),
        }
    }

    /// Enable or disable environment-variable expansion
    pub fn env_vars(mut self, enabled: bool) -> Self {
        self.env_vars = enabled;
        self
    }

    /// Enable or disable leading `~` expansion
    pub fn user(mut self, enabled: bool) -> Self {
        self.user = enabled;
        self
    }

    /// Add a `{name}` placeholder substitution
    ///
    /// Replacement is literal text replacement, applied in registration
    /// order after environment and home expansion.
    pub fn keyword(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.keywords.push((name.into(), value.into()));
        self
    }
}

/// Types that support expansion
///
/// Implemented for string-like and path-like values; for [`Value`] only the
/// `String` variant expands and every other variant is returned unchanged.
pub trait Expandable: Sized {
    /// Return a new value with the substitutions in `options` applied
    fn expanded(&self, options: &Expand) -> Self;
}

impl Expandable for String {
    fn expanded(&self, options: &Expand) -> Self {
        expand_str(self, options)
    }
}

impl Expandable for PathBuf {
    fn expanded(&self, options: &Expand) -> Self {
        PathBuf::from(expand_str(&self.to_string_lossy(), options))
    }
}

impl Expandable for Value {
    fn expanded(&self, options: &Expand) -> Self {
        match self {
            Value::String(s) => Value::String(expand_str(s, options)),
            other => other.clone(),
        }
    }
}

fn expand_str(input: &str, options: &Expand) -> String {
    let mut value = input.to_string();
    if options.env_vars {
        value = expand_env(&value);
        #[cfg(windows)]
        {
            value = expand_env_windows(&value);
        }
    }
    if options.user {
        value = expand_user(&value);
    }
    for (name, replacement) in &options.keywords {
        value = value.replace(&format!("{{{}}}", name), replacement);
    }
    value
}

/// Expand `$VAR` and `${VAR}` references; unset variables stay literal
fn expand_env(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('{') => {
                chars.next();
                let mut name = String::new();
                let mut closed = false;
                while let Some(&next) = chars.peek() {
                    if next == '}' {
                        chars.next();
                        closed = true;
                        break;
                    }
                    name.push(next);
                    chars.next();
                }
                match std::env::var(&name) {
                    Ok(value) if closed && !name.is_empty() => out.push_str(&value),
                    _ => {
                        out.push_str("${");
                        out.push_str(&name);
                        if closed {
                            out.push('}');
                        }
                    }
                }
            }
            Some(&next) if next == '_' || next.is_ascii_alphanumeric() => {
                let mut name = String::new();
                while let Some(&next) = chars.peek() {
                    if next == '_' || next.is_ascii_alphanumeric() {
                        name.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                match std::env::var(&name) {
                    Ok(value) => out.push_str(&value),
                    Err(_) => {
                        out.push('$');
                        out.push_str(&name);
                    }
                }
            }
            _ => out.push('$'),
        }
    }

    out
}

/// Expand `%VAR%` references; unset variables stay literal
#[cfg(windows)]
fn expand_env_windows(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('%') {
            Some(end) => {
                let name = &after[..end];
                match std::env::var(name) {
                    Ok(value) if !name.is_empty() => out.push_str(&value),
                    _ => {
                        out.push('%');
                        out.push_str(name);
                        out.push('%');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push('%');
                out.push_str(after);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

/// Expand a leading `~`; the `~user` form is left untouched
fn expand_user(input: &str) -> String {
    let home = match dirs::home_dir() {
        Some(home) => home,
        None => return input.to_string(),
    };

    if input == "~" {
        return home.to_string_lossy().into_owned();
    }
    if let Some(rest) = input.strip_prefix("~/").or_else(|| input.strip_prefix("~\\")) {
        return home.join(rest).to_string_lossy().into_owned();
    }

    input.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    // process-wide env mutation; each test uses its own variable name
    fn with_env<R>(name: &str, value: &str, f: impl FnOnce() -> R) -> R {
        std::env::set_var(name, value);
        let result = f();
        std::env::remove_var(name);
        result
    }

    #[test]
    fn test_expand_dollar_var() {
        with_env("RSRC_EXPAND_A", "alpha", || {
            assert_eq!(expand_env("pre/$RSRC_EXPAND_A/post"), "pre/alpha/post");
        });
    }

    #[test]
    fn test_expand_braced_var() {
        with_env("RSRC_EXPAND_B", "beta", || {
            assert_eq!(expand_env("${RSRC_EXPAND_B}/x"), "beta/x");
        });
    }

    #[test]
    fn test_unset_vars_stay_literal() {
        assert_eq!(expand_env("$RSRC_EXPAND_UNSET"), "$RSRC_EXPAND_UNSET");
        assert_eq!(expand_env("${RSRC_EXPAND_UNSET}"), "${RSRC_EXPAND_UNSET}");
    }

    #[test]
    fn test_lone_and_trailing_dollar() {
        assert_eq!(expand_env("a $ b"), "a $ b");
        assert_eq!(expand_env("cost$"), "cost$");
        assert_eq!(expand_env("${unclosed"), "${unclosed");
    }

    #[test]
    fn test_expand_user_home() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand_user("~"), home.to_string_lossy());
        assert_eq!(
            expand_user("~/Documents"),
            home.join("Documents").to_string_lossy()
        );
    }

    #[test]
    fn test_tilde_user_form_is_untouched() {
        assert_eq!(expand_user("~alice/x"), "~alice/x");
        assert_eq!(expand_user("a/~/b"), "a/~/b");
    }

    #[test]
    fn test_keyword_replacement() {
        let options = Expand::new().keyword("MODE", "DEBUG");
        assert_eq!("{MODE}/out".to_string().expanded(&options), "DEBUG/out");
    }

    #[test]
    fn test_substitution_order_env_then_user_then_keywords() {
        with_env("RSRC_EXPAND_C", "~", || {
            // env produces a leading ~, which user expansion then resolves
            let expanded = "$RSRC_EXPAND_C/{leaf}"
                .to_string()
                .expanded(&Expand::new().keyword("leaf", "end"));
            let home = dirs::home_dir().unwrap();
            assert_eq!(expanded, format!("{}/end", home.to_string_lossy()));
        });
    }

    #[test]
    fn test_disabled_stages_do_nothing() {
        with_env("RSRC_EXPAND_D", "delta", || {
            let options = Expand::new().env_vars(false).user(false);
            assert_eq!("~/$RSRC_EXPAND_D".to_string().expanded(&options), "~/$RSRC_EXPAND_D");
        });
    }

    #[test]
    fn test_non_string_values_are_unchanged() {
        let options = Expand::new();
        assert_eq!(Value::Integer(7).expanded(&options), Value::Integer(7));
        assert_eq!(Value::Null.expanded(&options), Value::Null);

        let seq = Value::from(vec!["$RSRC_EXPAND_E"]);
        assert_eq!(seq.expanded(&options), seq);
    }

    #[test]
    fn test_pathbuf_expansion() {
        with_env("RSRC_EXPAND_F", "srv", || {
            let path = PathBuf::from("/data/$RSRC_EXPAND_F/out");
            assert_eq!(path.expanded(&Expand::new()), PathBuf::from("/data/srv/out"));
        });
    }
}
