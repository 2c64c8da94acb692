//! Small helpers shared across the crate.

/// Classic dynamic-programming Levenshtein distance over unicode scalar values.
pub(crate) fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Picks the candidate closest to `value` by edit distance, if any candidate
/// is close enough to plausibly be a typo of it.
///
/// The threshold scales with the length of the unknown name, so short names
/// only match near-exact candidates while long names tolerate a few edits.
pub(crate) fn suggest_name<'a, I>(candidates: I, value: &str) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let threshold = value.chars().count() / 4 + 1;
    let mut best: Option<(&'a str, usize)> = None;

    for candidate in candidates {
        if candidate == value {
            continue;
        }
        let distance = levenshtein(candidate, value);
        if distance > threshold {
            continue;
        }
        match best {
            Some((_, current)) if current <= distance => {}
            _ => best = Some((candidate, distance)),
        }
    }

    best.map(|(name, _)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_basics() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("string", "stringg"), 1);
    }

    #[test]
    fn suggests_close_name() {
        let candidates = ["string", "nullableString", "arrayOfMixed"];
        assert_eq!(suggest_name(candidates, "stringg"), Some("string"));
        assert_eq!(suggest_name(candidates, "nullableStrink"), Some("nullableString"));
    }

    #[test]
    fn rejects_distant_name() {
        let candidates = ["string", "arrayOfMixed"];
        assert_eq!(suggest_name(candidates, "completelyDifferent"), None);
    }

    #[test]
    fn ignores_exact_match() {
        assert_eq!(suggest_name(["string"], "string"), None);
    }
}
