//! Term matching over visible page text.
//!
//! Discovery runs ask a yes/no question through [`is_relevant`], which tries a
//! list of morphological variants. Crawl runs count literal occurrences with
//! [`count_occurrences`].

/// One way of deriving a search variant from the lowercased term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantRule {
    Exact,
    NoSpaces,
    Plural,
    Gerund,
}

pub const DEFAULT_VARIANT_RULES: &[VariantRule] = &[
    VariantRule::Exact,
    VariantRule::NoSpaces,
    VariantRule::Plural,
    VariantRule::Gerund,
];

impl VariantRule {
    pub fn apply(self, term: &str) -> String {
        let lower = term.to_lowercase();
        match self {
            VariantRule::Exact => lower,
            VariantRule::NoSpaces => lower.replace(' ', ""),
            VariantRule::Plural => lower + "s",
            VariantRule::Gerund => lower + "ing",
        }
    }
}

pub fn variants(term: &str, rules: &[VariantRule]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(rules.len());
    for rule in rules {
        let variant = rule.apply(term);
        if !variant.is_empty() && !out.contains(&variant) {
            out.push(variant);
        }
    }
    out
}

/// Case-insensitive: true if any variant occurs anywhere in `text`.
pub fn is_relevant(text: &str, term: &str, rules: &[VariantRule]) -> bool {
    let haystack = text.to_lowercase();
    variants(term, rules)
        .iter()
        .any(|variant| haystack.contains(variant.as_str()))
}

/// Non-overlapping occurrences of `term` taken literally.
pub fn count_occurrences(text: &str, term: &str, case_sensitive: bool) -> usize {
    if term.is_empty() {
        return 0;
    }
    if case_sensitive {
        text.matches(term).count()
    } else {
        text.to_lowercase().matches(&term.to_lowercase()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plural_variant_matches() {
        assert!(is_relevant(
            "chocolate cakes are great",
            "cake",
            DEFAULT_VARIANT_RULES
        ));
    }

    #[test]
    fn direct_substring_matches_regardless_of_case() {
        assert!(is_relevant(
            "I love Programming in python3",
            "program",
            DEFAULT_VARIANT_RULES
        ));
    }

    #[test]
    fn no_space_variant_matches_compound_words() {
        assert!(is_relevant(
            "Our javascript guide",
            "Java Script",
            DEFAULT_VARIANT_RULES
        ));
        assert!(!is_relevant(
            "Our javascript guide",
            "Java Script",
            &[VariantRule::Exact]
        ));
    }

    #[test]
    fn unrelated_text_is_not_relevant() {
        assert!(!is_relevant("nothing here", "cake", DEFAULT_VARIANT_RULES));
    }

    #[test]
    fn variants_are_deduplicated() {
        assert_eq!(
            variants("Cake", DEFAULT_VARIANT_RULES),
            vec!["cake", "cakes", "cakeing"]
        );
    }

    #[test]
    fn counting_respects_case_flag() {
        let text = "Example example EXAMPLE";
        assert_eq!(count_occurrences(text, "example", true), 1);
        assert_eq!(count_occurrences(text, "example", false), 3);
    }

    #[test]
    fn counting_treats_term_literally() {
        assert_eq!(count_occurrences("a.b axb a.b", "a.b", true), 2);
        assert_eq!(count_occurrences("(x) (x)", "(x)", false), 2);
    }

    #[test]
    fn counting_is_non_overlapping() {
        assert_eq!(count_occurrences("aaaa", "aa", true), 2);
    }
}
