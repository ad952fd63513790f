use std::collections::BTreeSet;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Courtesy titles banks prepend to the payer name.
const HONORIFICS: &[&str] = &[
    "m", "mr", "mme", "mrs", "ms", "mlle", "mlles", "mm", "monsieur", "madame", "mademoiselle",
    "dr",
];

/// Lower-case and strip diacritics: "Élodie Lefèvre" → "elodie lefevre".
pub fn fold(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.nfd().filter(|c| !is_combining_mark(*c)) {
        match c {
            'œ' | 'Œ' => out.push_str("oe"),
            'æ' | 'Æ' => out.push_str("ae"),
            'ß' => out.push_str("ss"),
            'ø' | 'Ø' => out.push('o'),
            _ => out.extend(c.to_lowercase()),
        }
    }
    out
}

/// Folded alphanumeric words separated by single spaces.
pub fn normalize(text: &str) -> String {
    fold(text)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Folded text cut into runs of letters and runs of digits, everything else
/// dropped: "LOYER-UNIT12/2025" → ["loyer", "unit", "12", "2025"].
pub fn word_tokens(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut digits = false;
    for c in fold(text).chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            continue;
        }
        let is_digit = c.is_numeric();
        if !current.is_empty() && is_digit != digits {
            tokens.push(std::mem::take(&mut current));
        }
        digits = is_digit;
        current.push(c);
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Total length in chars of a token sequence.
pub fn token_chars(tokens: &[String]) -> usize {
    tokens.iter().map(|t| t.chars().count()).sum()
}

/// The set of normalized words of a name.
pub fn name_tokens(name: &str) -> BTreeSet<String> {
    normalize(name).split(' ').filter(|w| !w.is_empty()).map(str::to_string).collect()
}

/// Like `name_tokens`, minus courtesy titles ("M. Martin" → {"martin"}).
pub fn payer_tokens(payer: &str) -> BTreeSet<String> {
    let mut tokens = name_tokens(payer);
    tokens.retain(|t| !HONORIFICS.contains(&t.as_str()));
    tokens
}

/// Jaccard index of two token sets, in [0, 1]; identical sets score 1.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a == b {
        return 1.0;
    }
    let shared = a.intersection(b).count();
    let union = a.len() + b.len() - shared;
    if union == 0 {
        return 1.0;
    }
    shared as f64 / union as f64
}

/// Length in chars of the longest run of adjacent tokens shared by `a` and `b`.
/// Tokens only ever match whole, so "202" never hits inside "2025". Two-row DP
/// in O(m·n) time and O(n) space.
pub fn longest_common_run(a: &[String], b: &[String]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    let mut best = 0;

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            curr[j] = if a[i - 1] == b[j - 1] {
                prev[j - 1] + a[i - 1].chars().count()
            } else {
                0
            };
            best = best.max(curr[j]);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn fold_strips_accents_and_case() {
        assert_eq!(fold("Élodie LEFÈVRE"), "elodie lefevre");
        assert_eq!(fold("Françoise Gaëlle"), "francoise gaelle");
    }

    #[test]
    fn fold_expands_ligatures() {
        assert_eq!(fold("Cœur"), "coeur");
        assert_eq!(fold("Straße"), "strasse");
    }

    #[test]
    fn normalize_collapses_separators() {
        assert_eq!(normalize("  Jean-Pierre   DUPONT, "), "jean pierre dupont");
        assert_eq!(normalize("---"), "");
    }

    #[test]
    fn word_tokens_split_letters_from_digits() {
        assert_eq!(word_tokens("LOYER-UNIT12-2025-03"), vec!["loyer", "unit", "12", "2025", "03"]);
        assert_eq!(word_tokens(" Réf. n°42 "), vec!["ref", "n", "42"]);
        assert!(word_tokens("--/--").is_empty());
        assert_eq!(token_chars(&word_tokens("BAIL 2024/A17")), 11);
    }

    #[test]
    fn payer_tokens_drop_titles() {
        assert_eq!(payer_tokens("M. Martin"), set(&["martin"]));
        assert_eq!(payer_tokens("MME DURAND CLAIRE"), set(&["durand", "claire"]));
    }

    #[test]
    fn name_tokens_keep_single_letters() {
        assert_eq!(name_tokens("M Martin"), set(&["m", "martin"]));
    }

    #[test]
    fn jaccard_bounds() {
        let a = set(&["jean", "dupont"]);
        assert_eq!(jaccard(&a, &a), 1.0);
        assert_eq!(jaccard(&a, &set(&["marie", "curie"])), 0.0);
        assert_eq!(jaccard(&a, &set(&["jeanne", "dupont"])), 1.0 / 3.0);
    }

    #[test]
    fn jaccard_is_symmetric() {
        let a = set(&["marie", "martin"]);
        let b = set(&["martin"]);
        assert_eq!(jaccard(&a, &b), jaccard(&b, &a));
        assert_eq!(jaccard(&a, &b), 0.5);
    }

    #[test]
    fn longest_common_run_counts_whole_tokens() {
        assert_eq!(longest_common_run(&word_tokens("virement bail2024"), &word_tokens("BAIL-2024-A17")), 8);
        assert_eq!(longest_common_run(&word_tokens("abc"), &word_tokens("xyz")), 0);
        assert_eq!(longest_common_run(&[], &word_tokens("abc")), 0);
        assert_eq!(longest_common_run(&word_tokens("unit12"), &word_tokens("UNIT-12")), 6);
    }

    #[test]
    fn longest_common_run_ignores_digits_inside_other_numbers() {
        assert_eq!(longest_common_run(&word_tokens("LOYER MARS 2025"), &word_tokens("202")), 0);
        assert_eq!(longest_common_run(&word_tokens("VIR 2025-10-15"), &word_tokens("101")), 0);
        assert_eq!(longest_common_run(&word_tokens("LOYER UNIT123"), &word_tokens("UNIT12")), 4);
    }

    #[test]
    fn longest_common_run_is_commutative() {
        let a = word_tokens("loyer unit12");
        let b = word_tokens("unit1");
        assert_eq!(longest_common_run(&a, &b), longest_common_run(&b, &a));
    }
}
