//! Secret redaction for logged transport traffic.
//!
//! Rules are declarative (literal prefix + fixed-length alphanumeric body), so new token shapes
//! can be added without touching the read/write path. Redaction only ever affects what is
//! logged; forwarded bytes are never rewritten.

use crate::error::{IoLogError, Result};
use regex::bytes::{NoExpand, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

const MASK_BYTE: u8 = b'*';

static DEFAULT_REDACTOR: LazyLock<Redactor> = LazyLock::new(Redactor::default);

/// A recognizable secret shape: `prefix` followed by exactly `body_len` ASCII alphanumerics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRule {
    pub name: String,
    pub prefix: String,
    pub body_len: usize,
}

impl SecretRule {
    #[must_use]
    pub fn new(name: impl Into<String>, prefix: impl Into<String>, body_len: usize) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            body_len,
        }
    }

    /// Classic GitHub personal access token: `ghp_` + 36 alphanumerics.
    #[must_use]
    pub fn github_pat() -> Self {
        Self::new("github_pat", "ghp_", 36)
    }
}

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: SecretRule,
    regex: Regex,
    mask: Vec<u8>,
}

impl CompiledRule {
    fn compile(rule: SecretRule) -> Result<Self> {
        let invalid = |message: &str| IoLogError::Rule {
            name: rule.name.clone(),
            message: message.to_string(),
        };
        if rule.prefix.is_empty() {
            return Err(invalid("prefix must not be empty"));
        }
        if rule.body_len == 0 {
            return Err(invalid("body length must be positive"));
        }

        let pattern = format!(
            "{}[A-Za-z0-9]{{{}}}",
            regex::escape(&rule.prefix),
            rule.body_len
        );
        let regex = Regex::new(&pattern).map_err(|e| invalid(&e.to_string()))?;

        let mut mask = rule.prefix.as_bytes().to_vec();
        mask.resize(rule.prefix.len() + rule.body_len, MASK_BYTE);

        Ok(Self { rule, regex, mask })
    }
}

/// Masks secret-shaped substrings in byte payloads.
///
/// Immutable once built; share it freely across tasks.
#[derive(Debug, Clone)]
pub struct Redactor {
    rules: Vec<CompiledRule>,
}

impl Redactor {
    /// Compile a redactor from declarative rules.
    ///
    /// # Errors
    ///
    /// Returns an error if a rule has an empty prefix, a zero-length body, or does not compile.
    pub fn new(rules: impl IntoIterator<Item = SecretRule>) -> Result<Self> {
        let rules = rules
            .into_iter()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    #[must_use]
    pub fn rules(&self) -> impl Iterator<Item = &SecretRule> {
        self.rules.iter().map(|r| &r.rule)
    }

    /// Return `payload` with every full match replaced by the rule prefix followed by `*` for
    /// each body byte. Borrows the input when nothing matches.
    #[must_use]
    pub fn redact<'a>(&self, payload: &'a [u8]) -> Cow<'a, [u8]> {
        let mut out = Cow::Borrowed(payload);
        for rule in &self.rules {
            let replaced = match rule.regex.replace_all(&out, NoExpand(&rule.mask)) {
                Cow::Owned(v) => Some(v),
                Cow::Borrowed(_) => None,
            };
            if let Some(v) = replaced {
                out = Cow::Owned(v);
            }
        }
        out
    }
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new([SecretRule::github_pat()]).expect("built-in redaction rules compile")
    }
}

/// Redact with the built-in rule set.
#[must_use]
pub fn redact(payload: &[u8]) -> Cow<'_, [u8]> {
    DEFAULT_REDACTOR.redact(payload)
}
