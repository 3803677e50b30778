use crate::model::Entry;

/// Prefix-or-subsequence test, case-insensitive.
///
/// The subsequence scan is greedy: each query character consumes the first
/// remaining occurrence in the target. For a yes/no answer that is exact, since
/// taking the earliest occurrence never rules out a later match.
pub fn is_match(target: &str, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    if target.is_empty() {
        return false;
    }

    let target_lower = target.to_lowercase();
    let query_lower = query.to_lowercase();
    if target_lower.starts_with(&query_lower) {
        return true;
    }

    let mut pending = query_lower.chars().peekable();
    for target_char in target_lower.chars() {
        match pending.peek() {
            Some(&wanted) if wanted == target_char => {
                pending.next();
            }
            Some(_) => {}
            None => break,
        }
    }
    pending.peek().is_none()
}

/// Relevance score for a matching pair, `None` when `is_match` is false.
///
/// Positions come from the same greedy scan `is_match` uses, so the gap
/// penalty can overstate the distance when a tighter alignment exists later
/// in the target.
pub fn score(target: &str, query: &str) -> Option<i64> {
    if !is_match(target, query) {
        return None;
    }
    if query.is_empty() {
        return Some(0);
    }

    let target_lower = target.to_lowercase();
    let query_lower = query.to_lowercase();
    let query_len = query_lower.chars().count() as i64;
    let target_len = target_lower.chars().count() as i64;

    if let Some(byte_position) = target_lower.find(&query_lower) {
        let position = target_lower[..byte_position].chars().count() as i64;
        let prefix_bonus = if position == 0 { 400 } else { 0 };
        let compact_bonus = query_len * 40;
        let length_penalty = (target_len - query_len).abs();
        return Some(10_000 + prefix_bonus + compact_bonus - position - length_penalty);
    }

    let positions = subsequence_positions(&target_lower, &query_lower)?;
    let start_penalty = positions[0] as i64;
    let gap_penalty: i64 = positions
        .windows(2)
        .map(|pair| pair[1].saturating_sub(pair[0] + 1) as i64)
        .sum();
    let length_penalty = (target_len - query_len).max(0);

    Some(5_000 + query_len * 30 - gap_penalty * 6 - start_penalty - length_penalty)
}

/// Keeps entries whose value matches `query`.
///
/// Unranked output preserves enumeration order. Ranked output sorts by
/// descending score and keeps enumeration order among ties.
pub fn filter_entries(entries: Vec<Entry>, query: &str, ranked: bool) -> Vec<Entry> {
    if !ranked {
        return entries
            .into_iter()
            .filter(|entry| is_match(&entry.value, query))
            .collect();
    }

    let mut scored: Vec<(i64, usize, Entry)> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| score(&entry.value, query).map(|s| (s, index, entry)))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    scored.into_iter().map(|(_, _, entry)| entry).collect()
}

fn subsequence_positions(haystack: &str, needle: &str) -> Option<Vec<usize>> {
    let hay: Vec<char> = haystack.chars().collect();
    let mut positions = Vec::with_capacity(needle.len());
    let mut next_start = 0;

    for needle_char in needle.chars() {
        let offset = hay[next_start..].iter().position(|c| *c == needle_char)?;
        let absolute = next_start + offset;
        positions.push(absolute);
        next_start = absolute + 1;
    }

    Some(positions)
}
