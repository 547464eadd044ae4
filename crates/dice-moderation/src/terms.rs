use std::collections::HashSet;

/// Union of seed (shipped), managed (admin-added), and remote (fetched)
/// banned-term lists, evaluated against chat content with case-folding and
/// a simple leetspeak-substitution heuristic.
#[derive(Debug, Clone, Default)]
pub struct AdaptiveTermSet {
    seed_terms: HashSet<String>,
    managed_terms: HashSet<String>,
    remote_terms: HashSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermHit {
    pub term: String,
}

impl AdaptiveTermSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_seed(&mut self, term: String) {
        self.seed_terms.insert(normalize(&term));
    }

    pub fn add_managed(&mut self, term: String) {
        self.managed_terms.insert(normalize(&term));
    }

    pub fn remove_managed(&mut self, term: &str) {
        self.managed_terms.remove(&normalize(term));
    }

    pub fn set_remote(&mut self, terms: impl IntoIterator<Item = String>) {
        self.remote_terms = terms.into_iter().map(|t| normalize(&t)).collect();
    }

    pub fn all(&self) -> Vec<String> {
        self.seed_terms
            .iter()
            .chain(self.managed_terms.iter())
            .chain(self.remote_terms.iter())
            .cloned()
            .collect()
    }

    /// Normalizes `body` (lowercase, diacritics stripped, common leet
    /// substitutions collapsed) and checks it for a whole-word or
    /// substring match against every term in the union. Returns the first
    /// matched term, if any.
    pub fn evaluate(&self, body: &str) -> Option<TermHit> {
        let normalized = normalize(body);
        self.seed_terms
            .iter()
            .chain(self.managed_terms.iter())
            .chain(self.remote_terms.iter())
            .find(|term| normalized.contains(term.as_str()))
            .map(|term| TermHit { term: term.clone() })
    }
}

/// Lowercases, strips diacritics (best-effort ASCII fold), and collapses
/// common leet substitutions (`0`→o, `1`/`!`→i, `3`→e, `4`/`@`→a, `5`/`$`→s,
/// `7`→t).
fn normalize(input: &str) -> String {
    input
        .chars()
        .filter_map(|c| {
            let c = strip_diacritic(c).to_ascii_lowercase();
            Some(match c {
                '0' => 'o',
                '1' | '!' => 'i',
                '3' => 'e',
                '4' | '@' => 'a',
                '5' | '$' => 's',
                '7' => 't',
                other => other,
            })
        })
        .collect()
}

fn strip_diacritic(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' => 'a',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_is_folded_before_matching() {
        let mut terms = AdaptiveTermSet::new();
        terms.add_seed("badword".into());
        assert!(terms.evaluate("this is BadWord here").is_some());
    }

    #[test]
    fn leet_substitutions_are_folded() {
        let mut terms = AdaptiveTermSet::new();
        terms.add_seed("badword".into());
        assert!(terms.evaluate("b4dw0rd").is_some());
    }

    #[test]
    fn clean_text_has_no_hit() {
        let mut terms = AdaptiveTermSet::new();
        terms.add_seed("badword".into());
        assert!(terms.evaluate("nothing to see here").is_none());
    }

    #[test]
    fn removed_managed_terms_no_longer_match() {
        let mut terms = AdaptiveTermSet::new();
        terms.add_managed("slur".into());
        assert!(terms.evaluate("a slur here").is_some());
        terms.remove_managed("slur");
        assert!(terms.evaluate("a slur here").is_none());
    }
}
