// Fuzzy matching for phase column suggestions

/// Levenshtein distance: single-character insertions, deletions and substitutions
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();

    if s1_chars.is_empty() {
        return s2_chars.len();
    }
    if s2_chars.is_empty() {
        return s1_chars.len();
    }

    // Single rolling row instead of the full matrix
    let mut prev: Vec<usize> = (0..=s2_chars.len()).collect();
    let mut curr = vec![0; s2_chars.len() + 1];

    for (i, c1) in s1_chars.iter().enumerate() {
        curr[0] = i + 1;
        for (j, c2) in s2_chars.iter().enumerate() {
            let cost = if c1 == c2 { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1)
                .min(curr[j] + 1)
                .min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[s2_chars.len()]
}

/// Lowercase and drop spaces, underscores and hyphens ("Panel_Installed" == "panel installed")
fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Phase columns close to `column`, closest first (at most 3).
/// An exact match is not a suggestion and is skipped.
pub fn find_near_phase_matches(
    column: &str,
    phase_columns: &[&str],
    max_distance: usize,
) -> Vec<(String, usize)> {
    let needle = normalize(column);
    let mut matches: Vec<(String, usize)> = phase_columns
        .iter()
        .filter(|candidate| **candidate != column)
        .filter_map(|candidate| {
            let distance = levenshtein_distance(&needle, &normalize(candidate));
            (distance <= max_distance).then(|| (candidate.to_string(), distance))
        })
        .collect();

    matches.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    matches.truncate(3);
    matches
}
