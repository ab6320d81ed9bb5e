/// Damerau-Levenshtein distance (optimal string alignment) with exact element
/// equality.
pub fn distance<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    distance_by(a, b, |x, y| x == y)
}

/// Damerau-Levenshtein distance with a caller-supplied equality predicate.
///
/// Insertion, deletion, substitution and transposition of two adjacent
/// elements each cost 1. The predicate need not be transitive, which lets
/// callers compare word sequences under a typo tolerance.
pub fn distance_by<T, F>(a: &[T], b: &[T], eq: F) -> usize
where
    F: Fn(&T, &T) -> bool,
{
    let (n, m) = (a.len(), b.len());
    let mut d = vec![vec![0usize; m + 1]; n + 1];
    for (i, row) in d.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=m {
        d[0][j] = j;
    }

    for i in 1..=n {
        for j in 1..=m {
            let cost = if eq(&a[i - 1], &b[j - 1]) { 0 } else { 1 };
            let mut best = (d[i - 1][j] + 1)
                .min(d[i][j - 1] + 1)
                .min(d[i - 1][j - 1] + cost);
            if i > 1 && j > 1 && eq(&a[i - 1], &b[j - 2]) && eq(&a[i - 2], &b[j - 1]) {
                best = best.min(d[i - 2][j - 2] + 1);
            }
            d[i][j] = best;
        }
    }

    d[n][m]
}

/// Character-level distance between two words.
pub fn word_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    distance(&a, &b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_sequences_have_zero_distance() {
        for s in ["", "a", "cat", "transposition"] {
            assert_eq!(word_distance(s, s), 0);
        }
        assert_eq!(distance::<u8>(&[], &[]), 0);
    }

    #[test]
    fn empty_against_word_is_its_length() {
        assert_eq!(word_distance("", "dog"), 3);
        assert_eq!(word_distance("dog", ""), 3);
    }

    #[test]
    fn single_edits_cost_one() {
        assert_eq!(word_distance("ab", "ba"), 1);
        assert_eq!(word_distance("cat", "cats"), 1);
        assert_eq!(word_distance("cats", "cat"), 1);
        assert_eq!(word_distance("cat", "cut"), 1);
        assert_eq!(word_distance("house", "huose"), 1);
    }

    #[test]
    fn unrelated_words() {
        assert_eq!(word_distance("cat", "dog"), 3);
        assert_eq!(word_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [("ca", "abc"), ("tree", "treble"), ("abcd", "badc"), ("", "xyz")];
        for (a, b) in pairs {
            assert_eq!(word_distance(a, b), word_distance(b, a), "{a} vs {b}");
        }
    }

    #[test]
    fn word_sequences_with_tolerant_equality() {
        let a = ["huose", "tree"];
        let b = ["house", "tree"];
        assert_eq!(distance(&a, &b), 1);
        assert_eq!(distance_by(&a, &b, |x, y| word_distance(x, y) <= 1), 0);
    }

    #[test]
    fn swapped_words_count_as_one_transposition() {
        let a = ["tree", "house", "car"];
        let b = ["house", "tree", "car"];
        assert_eq!(distance(&a, &b), 1);
    }
}
