// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Named regex pattern groups with match counting.
//!
//! The classification components (intent analysis, categorization) and the
//! extractor are all driven by ordered tables of `(group name, patterns)`.
//! [`PatternSet`] compiles such a table once at construction; matching is
//! pure and infallible. Group declaration order is significant: ties are
//! broken by the first group reaching the maximum hit count.

use regex::RegexBuilder;

use recall_core::RecallError;

/// One named group of compiled patterns.
struct PatternGroup {
    name: &'static str,
    patterns: Vec<regex::Regex>,
}

/// An ordered set of named pattern groups compiled at construction time.
pub struct PatternSet {
    groups: Vec<PatternGroup>,
}

impl PatternSet {
    /// Compile a pattern table. Patterns are matched case-insensitively.
    ///
    /// Fails with [`RecallError::Pattern`] if any pattern does not compile;
    /// tables are authored in-crate, so this only fires on programmer error.
    pub fn compile(table: &[(&'static str, &[&str])]) -> Result<Self, RecallError> {
        let mut groups = Vec::with_capacity(table.len());
        for (name, patterns) in table {
            let mut compiled = Vec::with_capacity(patterns.len());
            for pattern in *patterns {
                let regex = RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| RecallError::Pattern {
                        group: (*name).to_string(),
                        message: e.to_string(),
                    })?;
                compiled.push(regex);
            }
            groups.push(PatternGroup {
                name,
                patterns: compiled,
            });
        }
        Ok(Self { groups })
    }

    /// Number of patterns declared for a group, or 0 for unknown groups.
    pub fn group_len(&self, name: &str) -> usize {
        self.groups
            .iter()
            .find(|g| g.name == name)
            .map(|g| g.patterns.len())
            .unwrap_or(0)
    }

    /// Per-group hit counts against `text`, in declaration order.
    ///
    /// A pattern contributes at most one hit regardless of how many times
    /// it occurs in the text.
    pub fn scores(&self, text: &str) -> Vec<(&'static str, usize)> {
        self.groups
            .iter()
            .map(|g| {
                let hits = g.patterns.iter().filter(|p| p.is_match(text)).count();
                (g.name, hits)
            })
            .collect()
    }

    /// The group with the most pattern hits, or `None` when nothing matched.
    ///
    /// Ties resolve to the first group (declaration order) reaching the max.
    pub fn best_match(&self, text: &str) -> Option<(&'static str, usize)> {
        let mut best: Option<(&'static str, usize)> = None;
        for (name, hits) in self.scores(text) {
            if hits > 0 && best.map(|(_, b)| hits > b).unwrap_or(true) {
                best = Some((name, hits));
            }
        }
        best
    }

    /// Names of all groups with at least one hit, in declaration order.
    pub fn matched_groups(&self, text: &str) -> Vec<&'static str> {
        self.scores(text)
            .into_iter()
            .filter(|(_, hits)| *hits > 0)
            .map(|(name, _)| name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_set() -> PatternSet {
        PatternSet::compile(&[
            ("greetings", &["\\bhello\\b", "\\bhi\\b"]),
            ("farewells", &["\\bbye\\b", "\\bgoodbye\\b", "\\bsee you\\b"]),
        ])
        .unwrap()
    }

    #[test]
    fn counts_one_hit_per_pattern() {
        let set = sample_set();
        let scores = set.scores("hello hello hi");
        assert_eq!(scores, vec![("greetings", 2), ("farewells", 0)]);
    }

    #[test]
    fn best_match_picks_highest_count() {
        let set = sample_set();
        let best = set.best_match("bye and goodbye, but also hello");
        assert_eq!(best, Some(("farewells", 2)));
    }

    #[test]
    fn best_match_tie_resolves_to_declaration_order() {
        let set = sample_set();
        // One hit each: greetings is declared first.
        let best = set.best_match("hello and goodbye");
        assert_eq!(best, Some(("greetings", 1)));
    }

    #[test]
    fn no_hits_yields_none() {
        let set = sample_set();
        assert_eq!(set.best_match("nothing relevant"), None);
        assert!(set.matched_groups("nothing relevant").is_empty());
    }

    #[test]
    fn matching_is_case_insensitive() {
        let set = sample_set();
        assert_eq!(set.best_match("HELLO there"), Some(("greetings", 1)));
    }

    #[test]
    fn invalid_pattern_fails_compilation() {
        let result = PatternSet::compile(&[("broken", &["(unclosed"])]);
        assert!(matches!(
            result,
            Err(RecallError::Pattern { group, .. }) if group == "broken"
        ));
    }

    #[test]
    fn group_len_reports_declared_sizes() {
        let set = sample_set();
        assert_eq!(set.group_len("greetings"), 2);
        assert_eq!(set.group_len("farewells"), 3);
        assert_eq!(set.group_len("unknown"), 0);
    }
}
