//! Grammar configuration.
//!
//! The arithmetic grammar has exactly two knobs: where whitespace may appear,
//! and how deep rule dispatch may recurse before a parse is abandoned.

/// Default bound on nested rule dispatch. Every parenthesised group costs
/// three levels (`sum`, `prod`, `value`) on top of the four a bare integer
/// needs, so this admits 41 nested groups, which fits a 2 MiB thread stack.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Where the terminal matchers skip leading whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WhitespacePolicy {
    /// Whitespace is skipped only in front of integer literals. `"2 + 3"`
    /// stops after `2` and reports trailing input.
    #[default]
    BeforeIntegers,
    /// Whitespace is skipped in front of every terminal, including
    /// parentheses and operators.
    BeforeEveryToken,
}

impl WhitespacePolicy {
    pub fn skips_before_operators(self) -> bool {
        matches!(self, Self::BeforeEveryToken)
    }
}

/// Configuration consumed by [`crate::syntax::grammar::arithmetic_grammar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrammarConfig {
    pub whitespace: WhitespacePolicy,
    /// Maximum depth of nested rule dispatch.
    pub max_depth: usize,
}

impl GrammarConfig {
    pub fn with_whitespace(mut self, whitespace: WhitespacePolicy) -> Self {
        self.whitespace = whitespace;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self {
            whitespace: WhitespacePolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_preserves_integer_only_whitespace() {
        let config = GrammarConfig::default();
        assert_eq!(config.whitespace, WhitespacePolicy::BeforeIntegers);
        assert!(!config.whitespace.skips_before_operators());
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn setters_override_fields() {
        let config = GrammarConfig::default()
            .with_whitespace(WhitespacePolicy::BeforeEveryToken)
            .with_max_depth(12);
        assert!(config.whitespace.skips_before_operators());
        assert_eq!(config.max_depth, 12);
    }
}
