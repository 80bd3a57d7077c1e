//! Request-to-action mapping
//!
//! Rules are written as `"METHOD /path"` keys. `*` as the method matches any
//! method; a trailing `*` on the path turns it into a prefix match.
//!
//! When several rules match the same request, the most specific one wins:
//! 1. an exact path beats any prefix,
//! 2. a longer prefix beats a shorter one,
//! 3. an explicit method beats `*`,
//! 4. otherwise the rule inserted first wins.

use crate::{QuillError, Result};

const ANY_METHOD: &str = "*";
const WILDCARD: char = '*';

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathPattern {
    Exact(String),
    Prefix(String),
}

impl PathPattern {
    fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix(WILDCARD) {
            Some(prefix) => PathPattern::Prefix(prefix.to_string()),
            None => PathPattern::Exact(pattern.to_string()),
        }
    }

    fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(exact) => exact == path,
            PathPattern::Prefix(prefix) => path.starts_with(prefix.as_str()),
        }
    }
}

/// One `(method, path) -> action` rule
#[derive(Debug, Clone)]
pub struct ActionRule {
    /// `None` matches any method
    method: Option<String>,
    path: PathPattern,
    action: String,
}

impl ActionRule {
    /// Parse a `"METHOD /path"` key
    pub fn parse(key: &str, action: impl Into<String>) -> Result<Self> {
        let mut parts = key.split_whitespace();
        let (Some(method), Some(path), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(QuillError::Config(format!(
                "invalid action mapping key '{}', expected 'METHOD /path'",
                key
            )));
        };

        let method = if method == ANY_METHOD {
            None
        } else {
            Some(method.to_ascii_uppercase())
        };

        Ok(Self {
            method,
            path: PathPattern::parse(path),
            action: action.into(),
        })
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    fn matches(&self, method: &str, path: &str) -> bool {
        let method_ok = match &self.method {
            Some(m) => m.eq_ignore_ascii_case(method),
            None => true,
        };
        method_ok && self.path.matches(path)
    }

    /// Ordering key; larger is more specific
    fn specificity(&self) -> (bool, usize, bool) {
        let (exact, len) = match &self.path {
            PathPattern::Exact(p) => (true, p.len()),
            PathPattern::Prefix(p) => (false, p.len()),
        };
        (exact, len, self.method.is_some())
    }
}

/// Ordered set of action rules
#[derive(Debug, Clone, Default)]
pub struct ActionMap {
    rules: Vec<ActionRule>,
}

impl ActionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `("METHOD /path", action)` pairs
    pub fn from_pairs<I, K, A>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, A)>,
        K: AsRef<str>,
        A: Into<String>,
    {
        let mut map = Self::new();
        for (key, action) in pairs {
            map.insert(key.as_ref(), action)?;
        }
        Ok(map)
    }

    /// Add a rule
    pub fn insert(&mut self, key: &str, action: impl Into<String>) -> Result<&mut Self> {
        self.rules.push(ActionRule::parse(key, action)?);
        Ok(self)
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with(mut self, key: &str, action: impl Into<String>) -> Result<Self> {
        self.insert(key, action)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The most specific matching rule's action
    pub fn resolve(&self, method: &str, path: &str) -> Option<&str> {
        let mut best: Option<&ActionRule> = None;
        for rule in self.rules.iter().filter(|r| r.matches(method, path)) {
            match best {
                Some(current) if rule.specificity() <= current.specificity() => {}
                _ => best = Some(rule),
            }
        }
        best.map(ActionRule::action)
    }

    /// Resolved action, or `"{METHOD} request to {path}"` when nothing matches
    pub fn action_for(&self, method: &str, path: &str) -> String {
        match self.resolve(method, path) {
            Some(action) => action.to_string(),
            None => format!("{} request to {}", method, path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions;

    #[test]
    fn test_exact_and_prefix() {
        let map = ActionMap::new()
            .with("POST /login", actions::USER_LOGIN)
            .unwrap()
            .with("DELETE /api/indices/*", actions::INDEX_DELETE)
            .unwrap();

        assert_eq!(map.resolve("POST", "/login"), Some(actions::USER_LOGIN));
        assert_eq!(map.resolve("POST", "/login/extra"), None);
        assert_eq!(
            map.resolve("DELETE", "/api/indices/logs-2023"),
            Some(actions::INDEX_DELETE)
        );
        assert_eq!(map.resolve("GET", "/api/indices/logs-2023"), None);
    }

    #[test]
    fn test_wildcard_method() {
        let map = ActionMap::from_pairs([("* /logout", actions::USER_LOGOUT)]).unwrap();
        assert_eq!(map.resolve("GET", "/logout"), Some(actions::USER_LOGOUT));
        assert_eq!(map.resolve("POST", "/logout"), Some(actions::USER_LOGOUT));
    }

    #[test]
    fn test_exact_beats_prefix_regardless_of_order() {
        let map = ActionMap::from_pairs([
            ("* /api/dashboards*", "dashboards"),
            ("POST /api/dashboards/favorite", actions::DASHBOARD_FAVORITE),
        ])
        .unwrap();
        assert_eq!(
            map.resolve("POST", "/api/dashboards/favorite"),
            Some(actions::DASHBOARD_FAVORITE)
        );
    }

    #[test]
    fn test_longest_prefix_wins() {
        let map = ActionMap::from_pairs([
            ("POST /api/*", "api"),
            ("POST /api/folders/*", actions::FOLDER_CREATE),
        ])
        .unwrap();
        assert_eq!(
            map.resolve("POST", "/api/folders/7"),
            Some(actions::FOLDER_CREATE)
        );
        assert_eq!(map.resolve("POST", "/api/alerts"), Some("api"));
    }

    #[test]
    fn test_explicit_method_beats_wildcard() {
        let map = ActionMap::from_pairs([
            ("* /api/alerts", "any alert call"),
            ("PUT /api/alerts", actions::ALERT_UPDATE),
        ])
        .unwrap();
        assert_eq!(map.resolve("PUT", "/api/alerts"), Some(actions::ALERT_UPDATE));
        assert_eq!(map.resolve("GET", "/api/alerts"), Some("any alert call"));
    }

    #[test]
    fn test_first_rule_wins_on_tie() {
        let map = ActionMap::from_pairs([("GET /a", "first"), ("get /a", "second")]).unwrap();
        assert_eq!(map.resolve("GET", "/a"), Some("first"));
    }

    #[test]
    fn test_fallback_label() {
        let map = ActionMap::new();
        assert_eq!(map.action_for("GET", "/health"), "GET request to /health");
    }

    #[test]
    fn test_malformed_key() {
        assert!(ActionMap::new().with("/no-method", "x").is_err());
        assert!(ActionMap::new().with("GET /a extra", "x").is_err());
    }
}
