//! `!focus <name>` invocation parsing.

use regex::Regex;

use crate::error::{AppError, Result};

/// A recognised command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Look up this exact display name
    Lookup(String),
    /// Prefix present but no name after it
    Malformed,
}

/// Parser for one command prefix.
#[derive(Debug, Clone)]
pub struct CommandParser {
    prefix: String,
    pattern: Regex,
}

impl CommandParser {
    pub fn new(prefix: &str) -> Result<Self> {
        let pattern = Regex::new(&format!(r"^{}\s+(.*)", regex::escape(prefix)))
            .map_err(|e| AppError::config(format!("bad command prefix {prefix:?}: {e}")))?;
        Ok(Self {
            prefix: prefix.to_string(),
            pattern,
        })
    }

    /// Parse a chat message. Returns `None` for messages that aren't commands.
    ///
    /// The name runs to the end of the first line; trailing whitespace is
    /// dropped, everything else is kept verbatim because lookups are exact.
    pub fn parse(&self, content: &str) -> Option<Invocation> {
        if !content.starts_with(&self.prefix) {
            return None;
        }

        let name = self
            .pattern
            .captures(content)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim_end())
            .filter(|name| !name.is_empty());

        Some(match name {
            Some(name) => Invocation::Lookup(name.to_string()),
            None => Invocation::Malformed,
        })
    }
}
