//! path_match.rs - Glob matching of file paths against rule scopes.
//!
//! Standard glob semantics from the `glob` crate: `*` and `?` never cross a
//! path separator, `**` as a whole component matches any depth, `[...]` is a
//! character class.

use glob::{MatchOptions, Pattern};

use crate::errors::{RedactionError, Result};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A compiled file glob.
#[derive(Debug, Clone)]
pub struct FileGlob {
    pattern: Pattern,
    separator: char,
}

impl FileGlob {
    pub fn new(pattern: &str, separator: char) -> Result<Self> {
        let normalized = normalize(pattern, separator);
        let pattern = Pattern::new(&normalized).map_err(|source| RedactionError::InvalidGlob {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { pattern, separator })
    }

    pub fn matches(&self, path: &str) -> bool {
        self.pattern
            .matches_with(&normalize(path, self.separator), MATCH_OPTIONS)
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

/// Matches `path` against `pattern`, treating `separator` as the path
/// separator.
pub fn matches(pattern: &str, path: &str, separator: char) -> Result<bool> {
    Ok(FileGlob::new(pattern, separator)?.matches(path))
}

fn normalize(s: &str, separator: char) -> String {
    if separator == '/' {
        s.to_string()
    } else {
        s.replace(separator, "/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_does_not_cross_separator() {
        assert!(matches("logs/*.log", "logs/app.log", '/').unwrap());
        assert!(!matches("logs/*.log", "logs/nested/app.log", '/').unwrap());
        assert!(!matches("logs/*.log", "config/app.yaml", '/').unwrap());
    }

    #[test]
    fn test_double_star_matches_any_depth() {
        assert!(matches("cluster-resources/**/*.json", "cluster-resources/pods/default/x.json", '/').unwrap());
        assert!(matches("**/secrets.yaml", "a/b/secrets.yaml", '/').unwrap());
    }

    #[test]
    fn test_custom_separator() {
        assert!(matches(r"logs\*.log", r"logs\app.log", '\\').unwrap());
        assert!(!matches(r"logs\*.log", r"logs\deep\app.log", '\\').unwrap());
    }

    #[test]
    fn test_invalid_glob_is_error() {
        assert!(matches("logs/[", "logs/x", '/').is_err());
    }
}
