//! Static alias table mapping short learner phrases to canonical topics.

use std::collections::HashMap;

use super::normalizer::normalize;

/// Built-in phrase → topic entries shipped with the crate.
const BUILTIN_ALIASES: &[(&str, &str)] = &[
    // JavaScript
    ("closure", "js-closures"),
    ("closures", "js-closures"),
    ("lexical scope", "js-closures"),
    ("promises", "js-promises"),
    ("promise", "js-promises"),
    ("async await", "js-async-await"),
    ("async/await", "js-async-await"),
    ("event loop", "js-event-loop"),
    ("this keyword", "js-this"),
    ("hoisting", "js-hoisting"),
    ("prototypes", "js-prototypes"),
    ("prototype chain", "js-prototypes"),
    ("array methods", "js-array-methods"),
    ("map filter reduce", "js-array-methods"),
    // React
    ("useeffect", "react-hooks"),
    ("usestate", "react-hooks"),
    ("usememo", "react-hooks"),
    ("usecallback", "react-hooks"),
    ("hooks", "react-hooks"),
    ("react hooks", "react-hooks"),
    ("jsx", "react-jsx"),
    ("props", "react-props-state"),
    ("state", "react-props-state"),
    ("props and state", "react-props-state"),
    ("virtual dom", "react-virtual-dom"),
    ("context api", "react-context"),
    ("usecontext", "react-context"),
    // Math
    ("quadratics", "math-quadratic-equations"),
    ("quadratic formula", "math-quadratic-equations"),
    ("fractions", "math-fractions"),
    ("derivatives", "math-derivatives"),
    ("differentiation", "math-derivatives"),
    ("integrals", "math-integrals"),
    ("integration", "math-integrals"),
    ("pythagoras", "math-pythagorean-theorem"),
    ("pythagorean theorem", "math-pythagorean-theorem"),
    ("odds", "math-probability"),
    // Science
    ("photosynthesis", "science-photosynthesis"),
    ("newtons laws", "science-newtons-laws"),
    ("laws of motion", "science-newtons-laws"),
    ("periodic table", "science-periodic-table"),
    ("cells", "science-cell-biology"),
    ("cell biology", "science-cell-biology"),
    // HTML / CSS
    ("semantic html", "html-semantics"),
    ("forms", "html-forms"),
    ("flexbox", "css-flexbox"),
    ("flex", "css-flexbox"),
    ("grid", "css-grid"),
    ("css grid", "css-grid"),
    ("box model", "css-box-model"),
    ("specificity", "css-specificity"),
    // Git
    ("branching", "git-branching"),
    ("branches", "git-branching"),
    ("merge conflicts", "git-merge-conflicts"),
    ("rebase", "git-rebase"),
    ("rebasing", "git-rebase"),
    // Vibe coding
    ("prompting", "vibe-prompting"),
    ("prompt engineering", "vibe-prompting"),
    // Reading
    ("main idea", "reading-main-idea"),
    ("inference", "reading-inference"),
    ("making inferences", "reading-inference"),
];

/// Immutable phrase → canonical topic mapping.
///
/// Keys are stored normalized, so lookups are case- and
/// punctuation-insensitive. Several keys may point at the same topic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: HashMap<String, String>,
}

impl AliasTable {
    /// Builds a table from `(phrase, topic)` pairs.
    ///
    /// Phrases are normalized; pairs whose phrase normalizes to the empty
    /// string or whose topic is blank are skipped. Later pairs win on key
    /// collisions.
    #[must_use]
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .filter_map(|(phrase, topic)| {
                let key = normalize(phrase.as_ref());
                let topic = topic.as_ref().trim();
                (!key.is_empty() && !topic.is_empty()).then(|| (key, topic.to_string()))
            })
            .collect();
        Self { entries }
    }

    /// Returns the table shipped with the crate.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(BUILTIN_ALIASES.iter().copied())
    }

    /// Returns a new table with `overrides` layered on top of this one.
    #[must_use]
    pub fn merged_with(&self, overrides: &AliasTable) -> Self {
        let mut entries = self.entries.clone();
        entries.extend(
            overrides
                .entries
                .iter()
                .map(|(key, topic)| (key.clone(), topic.clone())),
        );
        Self { entries }
    }

    /// Looks up the canonical topic for `objective`.
    ///
    /// The objective is normalized first; the lookup itself is an exact key match.
    #[must_use]
    pub fn lookup(&self, objective: &str) -> Option<&str> {
        let key = normalize(objective);
        if key.is_empty() {
            return None;
        }
        self.entries.get(&key).map(String::as_str)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
