#![forbid(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use regex::Regex;

/// Names that carry a fixed meaning in generated documents.
const RESERVED: &[&str] = &["A"];

fn first_char_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z]").expect("static regex"))
}

fn illegal_chars_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[@#^*!&]").expect("static regex"))
}

#[derive(Debug)]
struct LocalScope<K> {
    names: BTreeMap<K, String>,
    used: BTreeSet<String>,
}

impl<K> Default for LocalScope<K> {
    fn default() -> Self {
        Self {
            names: BTreeMap::new(),
            used: BTreeSet::new(),
        }
    }
}

/// Deterministic, collision-free naming keyed by an arbitrary identity.
///
/// The same key always receives the same name; distinct keys never share a
/// name while both are live. Output depends only on the order of calls.
#[derive(Debug)]
pub struct UniqueNamer<K> {
    spacer: String,
    global: BTreeMap<K, String>,
    used: BTreeSet<String>,
    scopes: Vec<LocalScope<K>>,
}

impl<K: Ord + Clone> Default for UniqueNamer<K> {
    fn default() -> Self {
        Self::with_spacer("_")
    }
}

impl<K: Ord + Clone> UniqueNamer<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_spacer(spacer: impl Into<String>) -> Self {
        Self {
            spacer: spacer.into(),
            global: BTreeMap::new(),
            used: BTreeSet::new(),
            scopes: Vec::new(),
        }
    }

    pub fn get_name(&mut self, key: &K, preferred: &str) -> String {
        if let Some(name) = self.global.get(key) {
            return name.clone();
        }
        let base = if RESERVED.contains(&preferred) {
            format!("{preferred}ZZ")
        } else {
            preferred.to_string()
        };
        let name = self.fresh(&self.sanitize(&base));
        self.used.insert(name.clone());
        self.global.insert(key.clone(), name.clone());
        name
    }

    /// Name valid until the innermost scope is popped. Without an open scope
    /// this behaves like [`UniqueNamer::get_name`].
    pub fn get_local_name(&mut self, key: &K, preferred: &str) -> String {
        if self.scopes.is_empty() {
            return self.get_name(key, preferred);
        }
        if let Some(name) = self.scopes.iter().rev().find_map(|s| s.names.get(key)) {
            return name.clone();
        }
        let name = self.fresh(&self.sanitize(preferred));
        if let Some(scope) = self.scopes.last_mut() {
            scope.used.insert(name.clone());
            scope.names.insert(key.clone(), name.clone());
        }
        name
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(LocalScope::default());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn is_used(&self, name: &str) -> bool {
        self.used.contains(name) || self.scopes.iter().any(|s| s.used.contains(name))
    }

    fn fresh(&self, base: &str) -> String {
        if !self.is_used(base) {
            return base.to_string();
        }
        (0u32..)
            .map(|i| format!("{base}{}{i}", self.spacer))
            .find(|candidate| !self.is_used(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    fn sanitize(&self, s: &str) -> String {
        let prefixed = if first_char_re().is_match(s) {
            s.to_string()
        } else {
            format!("isa{}{s}", self.spacer)
        };
        illegal_chars_re()
            .replace_all(&prefixed, self.spacer.as_str())
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_same_name() {
        let mut n: UniqueNamer<u32> = UniqueNamer::new();
        assert_eq!(n.get_name(&1, "x"), "x");
        assert_eq!(n.get_name(&1, "ignored"), "x");
        assert_eq!(n.get_name(&2, "x"), "x_0");
        assert_eq!(n.get_name(&3, "x"), "x_1");
    }

    #[test]
    fn sanitizes_and_avoids_reserved() {
        let mut n: UniqueNamer<&str> = UniqueNamer::new();
        assert_eq!(n.get_name(&"a", "A"), "AZZ");
        assert_eq!(n.get_name(&"b", "x@1"), "x_1");
        assert_eq!(n.get_name(&"c", "0abc"), "isa_0abc");
    }

    #[test]
    fn local_names_are_released_on_pop() {
        let mut n: UniqueNamer<u32> = UniqueNamer::new();
        n.get_name(&0, "v");
        n.push_scope();
        assert_eq!(n.get_local_name(&1, "v"), "v_0");
        n.pop_scope();
        n.push_scope();
        assert_eq!(n.get_local_name(&2, "v"), "v_0");
        n.pop_scope();
    }
}
