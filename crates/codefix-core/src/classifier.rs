//! Failure category → explanation lookup

use std::collections::HashMap;

use crate::types::{PROCESS_EXIT_CATEGORY, TIMEOUT_CATEGORY};

/// Explanation returned for categories the table does not know
pub const UNKNOWN_ERROR: &str = "Unknown error.";

const BUILTIN_EXPLANATIONS: &[(&str, &str)] = &[
    ("NameError", "You used a variable that was never defined."),
    ("SyntaxError", "There is a syntax issue in your code."),
    ("IndentationError", "There is a problem with the code indentation."),
    ("TypeError", "You're using the wrong data type or operation."),
    ("ZeroDivisionError", "You tried to divide by zero."),
    ("AttributeError", "You're trying to access an attribute that doesn't exist."),
    ("IndexError", "You're trying to access an invalid index in a list or string."),
    ("TabError", "Tabs and spaces are mixed in the code indentation."),
    ("KeyError", "You're trying to read a dictionary key that doesn't exist."),
    ("ValueError", "A value has the right type but an invalid content."),
    ("UnboundLocalError", "You used a local variable before assigning it."),
    ("ImportError", "A name could not be imported from a module."),
    ("ModuleNotFoundError", "You're importing a module that isn't installed."),
    ("RecursionError", "A function called itself too many times."),
    ("EOFError", "Your code tried to read input, but none was provided."),
    ("FileNotFoundError", "You're trying to open a file that doesn't exist."),
    (TIMEOUT_CATEGORY, "Your code took too long to run and was stopped."),
    (PROCESS_EXIT_CATEGORY, "Your code stopped the interpreter before it finished."),
];

/// Immutable mapping from failure category to a human-readable explanation.
///
/// Built once at startup; extending it means adding entries, never
/// branching on categories elsewhere.
#[derive(Debug, Clone)]
pub struct ErrorTable {
    entries: HashMap<String, String>,
}

impl ErrorTable {
    /// Table holding only the builtin entries
    pub fn builtin() -> Self {
        Self::with_extra(std::iter::empty::<(String, String)>())
    }

    /// Builtin entries plus `extra`, which may add or override categories
    pub fn with_extra<I, K, V>(extra: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut entries: HashMap<String, String> = BUILTIN_EXPLANATIONS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        for (category, explanation) in extra {
            entries.insert(category.into(), explanation.into());
        }

        Self { entries }
    }

    /// Explanation for `category`, or [`UNKNOWN_ERROR`] when it is not known
    pub fn explain(&self, category: &str) -> &str {
        self.entries
            .get(category)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_ERROR)
    }

    pub fn contains(&self, category: &str) -> bool {
        self.entries.contains_key(category)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ErrorTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_categories() {
        let table = ErrorTable::builtin();
        assert_eq!(
            table.explain("NameError"),
            "You used a variable that was never defined."
        );
        assert_eq!(table.explain("ZeroDivisionError"), "You tried to divide by zero.");
        assert_eq!(
            table.explain("IndexError"),
            "You're trying to access an invalid index in a list or string."
        );
    }

    #[test]
    fn test_unknown_category_falls_back() {
        let table = ErrorTable::builtin();
        assert_eq!(table.explain("FloatingPointError"), UNKNOWN_ERROR);
        assert_eq!(table.explain(""), "Unknown error.");
    }

    #[test]
    fn test_runner_categories_are_covered() {
        let table = ErrorTable::builtin();
        for category in [
            "NameError",
            "TypeError",
            "ZeroDivisionError",
            "AttributeError",
            "IndexError",
            "SyntaxError",
            "IndentationError",
            TIMEOUT_CATEGORY,
            PROCESS_EXIT_CATEGORY,
        ] {
            assert!(table.contains(category), "missing {}", category);
            assert_ne!(table.explain(category), UNKNOWN_ERROR);
        }
    }

    #[test]
    fn test_extra_entries_extend_and_override() {
        let table = ErrorTable::with_extra([
            ("OverflowError", "A number got too large."),
            ("NameError", "Undefined name."),
        ]);
        assert_eq!(table.explain("OverflowError"), "A number got too large.");
        assert_eq!(table.explain("NameError"), "Undefined name.");
        assert_eq!(table.len(), BUILTIN_EXPLANATIONS.len() + 1);
    }
}
