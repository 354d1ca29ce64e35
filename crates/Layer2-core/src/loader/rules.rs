//! Delegation Rules - prefix policy for unit names

/// Prefixes delegated to the host runtime by default
pub const DEFAULT_LOADER_EXCEPTIONS: &[&str] = &["std.", "core.", "alloc.", "ignite.runtime."];

/// Prefixes loaded without transformation by default
pub const DEFAULT_TRANSFORMER_EXCEPTIONS: &[&str] = &["serde.", "tracing.", "ignite."];

/// How a name is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Handed to the outer resolver, never cached here
    Delegate,
    /// Loaded and cached here, transformer chain skipped
    Untransformed,
    /// Loaded, transformed and cached here
    Transformed,
}

/// Ordered, additive prefix rules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DelegationRules {
    loader_exceptions: Vec<String>,
    transformer_exceptions: Vec<String>,
}

impl DelegationRules {
    /// No rules at all
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock platform/bootstrap rules
    pub fn with_defaults() -> Self {
        let mut rules = Self::new();
        for prefix in DEFAULT_LOADER_EXCEPTIONS {
            rules.add_loader_exception(*prefix);
        }
        for prefix in DEFAULT_TRANSFORMER_EXCEPTIONS {
            rules.add_transformer_exception(*prefix);
        }
        rules
    }

    /// Append a loader-exception prefix (duplicates ignored)
    pub fn add_loader_exception(&mut self, prefix: impl Into<String>) {
        push_unique(&mut self.loader_exceptions, prefix.into());
    }

    /// Append a transformer-exception prefix (duplicates ignored)
    pub fn add_transformer_exception(&mut self, prefix: impl Into<String>) {
        push_unique(&mut self.transformer_exceptions, prefix.into());
    }

    /// First matching rule wins; loader-exceptions are checked first
    pub fn route(&self, name: &str) -> Route {
        if self.loader_exception_for(name).is_some() {
            Route::Delegate
        } else if self.transformer_exception_for(name).is_some() {
            Route::Untransformed
        } else {
            Route::Transformed
        }
    }

    pub fn loader_exception_for(&self, name: &str) -> Option<&str> {
        first_prefix(&self.loader_exceptions, name)
    }

    pub fn transformer_exception_for(&self, name: &str) -> Option<&str> {
        first_prefix(&self.transformer_exceptions, name)
    }

    pub fn loader_exceptions(&self) -> &[String] {
        &self.loader_exceptions
    }

    pub fn transformer_exceptions(&self) -> &[String] {
        &self.transformer_exceptions
    }
}

fn push_unique(list: &mut Vec<String>, prefix: String) {
    if !list.contains(&prefix) {
        list.push(prefix);
    }
}

fn first_prefix<'a>(prefixes: &'a [String], name: &str) -> Option<&'a str> {
    prefixes
        .iter()
        .find(|p| name.starts_with(p.as_str()))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_routes() {
        let rules = DelegationRules::with_defaults();
        assert_eq!(rules.route("std.collections.Map"), Route::Delegate);
        assert_eq!(rules.route("serde.Value"), Route::Untransformed);
        assert_eq!(rules.route("demo.app.Main"), Route::Transformed);
    }

    #[test]
    fn test_loader_exception_wins() {
        // ignite.runtime. matches both lists
        let rules = DelegationRules::with_defaults();
        assert!(rules.transformer_exception_for("ignite.runtime.Host").is_some());
        assert_eq!(rules.route("ignite.runtime.Host"), Route::Delegate);
        assert_eq!(rules.route("ignite.tools.Probe"), Route::Untransformed);
    }

    #[test]
    fn test_additive_and_ordered() {
        let mut rules = DelegationRules::new();
        rules.add_loader_exception("vendor.");
        rules.add_loader_exception("vendor.shared.");
        rules.add_loader_exception("vendor.");

        assert_eq!(rules.loader_exceptions().len(), 2);
        assert_eq!(rules.loader_exception_for("vendor.shared.X"), Some("vendor."));
    }

    #[test]
    fn test_prefix_is_not_a_word_match() {
        let mut rules = DelegationRules::new();
        rules.add_transformer_exception("lib");
        assert_eq!(rules.route("library.Unit"), Route::Untransformed);
        assert_eq!(rules.route("app.lib.Unit"), Route::Transformed);
    }
}
