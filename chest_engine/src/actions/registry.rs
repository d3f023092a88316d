use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use super::{ActionContext, Continuation};

/// Character separating a directive prefix from its payload.
pub const PREFIX_SPLITTER: char = ':';

/// A handler receives the acting context, the payload and the continuation it
/// must complete exactly once.
pub type DirectiveHandler = Rc<dyn Fn(&mut ActionContext<'_>, &str, Continuation)>;

/// One resolved `(prefix, payload)` action unit. The empty prefix means
/// "run the payload as a command".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub prefix: String,
    pub payload: String,
}

impl Directive {
    pub fn new(prefix: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            payload: payload.into(),
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefix.is_empty() {
            f.write_str(&self.payload)
        } else {
            write!(f, "{}: {}", self.prefix, self.payload)
        }
    }
}

/// Prefix to handler lookup table, filled at startup.
#[derive(Clone, Default)]
pub struct DirectiveRegistry {
    handlers: BTreeMap<String, DirectiveHandler>,
}

impl DirectiveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry carrying every built-in directive.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        super::handlers::install(&mut registry);
        registry
    }

    /// Register or replace the handler for `prefix`.
    pub fn register_prefix<F>(&mut self, prefix: impl Into<String>, handler: F)
    where
        F: Fn(&mut ActionContext<'_>, &str, Continuation) + 'static,
    {
        self.handlers.insert(prefix.into(), Rc::new(handler));
    }

    pub fn contains(&self, prefix: &str) -> bool {
        self.handlers.contains_key(prefix)
    }

    pub fn handler(&self, prefix: &str) -> Option<DirectiveHandler> {
        self.handlers.get(prefix).cloned()
    }

    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Split a raw line into `(prefix, payload)`.
    ///
    /// Text before the first `:` only counts as a prefix when it is
    /// registered; otherwise the whole line is a command under the empty
    /// prefix, colons included. Empty lines resolve to nothing.
    pub fn resolve<'a>(&self, line: &'a str) -> Option<(&'a str, &'a str)> {
        if let Some(index) = line.find(PREFIX_SPLITTER) {
            let prefix = &line[..index];
            if index > 0 && self.contains(prefix) {
                let payload = line[index + PREFIX_SPLITTER.len_utf8()..].trim_start();
                return Some((prefix, payload));
            }
        }
        if line.is_empty() {
            None
        } else {
            Some(("", line))
        }
    }
}

impl fmt::Debug for DirectiveRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}
