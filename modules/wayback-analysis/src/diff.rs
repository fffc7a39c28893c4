// Character-level text diff with semantic cleanup.
//
// Raw edits come from Myers' O(ND) algorithm in its linear-space
// "middle snake" form, after trimming the common prefix and suffix.
// Cleanup then removes short equalities stranded between larger edits,
// slides edit boundaries onto word and line breaks, and pulls overlapping
// text out of delete/insert pairs.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffOp {
    Equal,
    Insert,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffSpan {
    pub op: DiffOp,
    pub text: String,
}

impl DiffSpan {
    pub fn new(op: DiffOp, text: impl Into<String>) -> Self {
        Self {
            op,
            text: text.into(),
        }
    }
}

/// Minimal diff of `old` into `new`, with adjacent edits merged.
pub fn diff(old: &str, new: &str) -> Vec<DiffSpan> {
    let old: Vec<char> = old.chars().collect();
    let new: Vec<char> = new.chars().collect();
    into_spans(diff_chars(&old, &new))
}

/// Human-readable diff: the minimal diff followed by semantic cleanup.
pub fn semantic_diff(old: &str, new: &str) -> Vec<DiffSpan> {
    let old: Vec<char> = old.chars().collect();
    let new: Vec<char> = new.chars().collect();
    let mut edits = diff_chars(&old, &new);
    cleanup_semantic(&mut edits);
    into_spans(edits)
}

/// The text the diff starts from (equal and deleted spans).
pub fn old_text(spans: &[DiffSpan]) -> String {
    spans
        .iter()
        .filter(|s| s.op != DiffOp::Insert)
        .map(|s| s.text.as_str())
        .collect()
}

/// The text the diff produces (equal and inserted spans).
pub fn new_text(spans: &[DiffSpan]) -> String {
    spans
        .iter()
        .filter(|s| s.op != DiffOp::Delete)
        .map(|s| s.text.as_str())
        .collect()
}

// ---------------------------------------------------------------------------
// Internal representation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
struct Edit {
    op: DiffOp,
    text: Vec<char>,
}

impl Edit {
    fn new(op: DiffOp, text: &[char]) -> Self {
        Self {
            op,
            text: text.to_vec(),
        }
    }
}

fn into_spans(edits: Vec<Edit>) -> Vec<DiffSpan> {
    let mut spans: Vec<DiffSpan> = Vec::with_capacity(edits.len());
    for edit in edits.into_iter().filter(|e| !e.text.is_empty()) {
        match spans.last_mut() {
            Some(last) if last.op == edit.op => last.text.extend(edit.text),
            _ => spans.push(DiffSpan {
                op: edit.op,
                text: edit.text.into_iter().collect(),
            }),
        }
    }
    spans
}

fn common_prefix(a: &[char], b: &[char]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn common_suffix(a: &[char], b: &[char]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Length of the longest suffix of `a` that is also a prefix of `b`.
fn common_overlap(a: &[char], b: &[char]) -> usize {
    let max = a.len().min(b.len());
    (1..=max)
        .rev()
        .find(|&k| a[a.len() - k..] == b[..k])
        .unwrap_or(0)
}

fn find_sub(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn concat(a: &[char], b: &[char]) -> Vec<char> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    out.extend_from_slice(a);
    out.extend_from_slice(b);
    out
}

// ---------------------------------------------------------------------------
// Raw diff
// ---------------------------------------------------------------------------

fn diff_chars(a: &[char], b: &[char]) -> Vec<Edit> {
    if a == b {
        return if a.is_empty() {
            Vec::new()
        } else {
            vec![Edit::new(DiffOp::Equal, a)]
        };
    }

    let prefix = common_prefix(a, b);
    let (a_rest, b_rest) = (&a[prefix..], &b[prefix..]);
    let suffix = common_suffix(a_rest, b_rest);
    let a_mid = &a_rest[..a_rest.len() - suffix];
    let b_mid = &b_rest[..b_rest.len() - suffix];

    let mut edits = Vec::new();
    if prefix > 0 {
        edits.push(Edit::new(DiffOp::Equal, &a[..prefix]));
    }
    edits.extend(compute(a_mid, b_mid));
    if suffix > 0 {
        edits.push(Edit::new(DiffOp::Equal, &a_rest[a_rest.len() - suffix..]));
    }
    cleanup_merge(&mut edits);
    edits
}

/// Diff two texts that share no common prefix or suffix.
fn compute(a: &[char], b: &[char]) -> Vec<Edit> {
    if a.is_empty() {
        return vec![Edit::new(DiffOp::Insert, b)];
    }
    if b.is_empty() {
        return vec![Edit::new(DiffOp::Delete, a)];
    }

    let (long, short, op) = if a.len() > b.len() {
        (a, b, DiffOp::Delete)
    } else {
        (b, a, DiffOp::Insert)
    };
    if let Some(i) = find_sub(long, short) {
        // Shorter text sits inside the longer one
        return [
            Edit::new(op, &long[..i]),
            Edit::new(DiffOp::Equal, short),
            Edit::new(op, &long[i + short.len()..]),
        ]
        .into_iter()
        .filter(|e| !e.text.is_empty())
        .collect();
    }
    if short.len() == 1 {
        return vec![Edit::new(DiffOp::Delete, a), Edit::new(DiffOp::Insert, b)];
    }

    bisect(a, b)
}

/// Find the middle snake of the edit graph and recurse on both halves.
fn bisect(a: &[char], b: &[char]) -> Vec<Edit> {
    let n = a.len() as isize;
    let m = b.len() as isize;
    let max_d = (n + m + 1) / 2;
    let v_offset = max_d;
    let v_len = 2 * max_d;
    let mut v1 = vec![-1isize; v_len as usize];
    let mut v2 = vec![-1isize; v_len as usize];
    v1[(v_offset + 1) as usize] = 0;
    v2[(v_offset + 1) as usize] = 0;

    let delta = n - m;
    // Odd delta: the forward path meets the reverse path
    let front = delta % 2 != 0;
    let (mut k1_start, mut k1_end, mut k2_start, mut k2_end) = (0isize, 0isize, 0isize, 0isize);

    for d in 0..max_d {
        // Forward path
        let mut k1 = -d + k1_start;
        while k1 <= d - k1_end {
            let k1_off = (v_offset + k1) as usize;
            let mut x1 = if k1 == -d || (k1 != d && v1[k1_off - 1] < v1[k1_off + 1]) {
                v1[k1_off + 1]
            } else {
                v1[k1_off - 1] + 1
            };
            let mut y1 = x1 - k1;
            while x1 >= 0
                && y1 >= 0
                && x1 < n
                && y1 < m
                && a[x1 as usize] == b[y1 as usize]
            {
                x1 += 1;
                y1 += 1;
            }
            v1[k1_off] = x1;
            if x1 > n {
                k1_end += 2;
            } else if y1 > m {
                k1_start += 2;
            } else if front {
                let k2_off = v_offset + delta - k1;
                if k2_off >= 0 && k2_off < v_len && v2[k2_off as usize] != -1 {
                    let x2 = n - v2[k2_off as usize];
                    if x1 >= x2 {
                        return bisect_split(a, b, x1, y1);
                    }
                }
            }
            k1 += 2;
        }

        // Reverse path
        let mut k2 = -d + k2_start;
        while k2 <= d - k2_end {
            let k2_off = (v_offset + k2) as usize;
            let mut x2 = if k2 == -d || (k2 != d && v2[k2_off - 1] < v2[k2_off + 1]) {
                v2[k2_off + 1]
            } else {
                v2[k2_off - 1] + 1
            };
            let mut y2 = x2 - k2;
            while x2 >= 0
                && y2 >= 0
                && x2 < n
                && y2 < m
                && a[(n - x2 - 1) as usize] == b[(m - y2 - 1) as usize]
            {
                x2 += 1;
                y2 += 1;
            }
            v2[k2_off] = x2;
            if x2 > n {
                k2_end += 2;
            } else if y2 > m {
                k2_start += 2;
            } else if !front {
                let k1_off = v_offset + delta - k2;
                if k1_off >= 0 && k1_off < v_len && v1[k1_off as usize] != -1 {
                    let x1 = v1[k1_off as usize];
                    let y1 = v_offset + x1 - k1_off;
                    if x1 >= n - x2 {
                        return bisect_split(a, b, x1, y1);
                    }
                }
            }
            k2 += 2;
        }
    }

    // No commonality at all
    vec![Edit::new(DiffOp::Delete, a), Edit::new(DiffOp::Insert, b)]
}

fn bisect_split(a: &[char], b: &[char], x: isize, y: isize) -> Vec<Edit> {
    let x = x.clamp(0, a.len() as isize) as usize;
    let y = y.clamp(0, b.len() as isize) as usize;
    if (x == 0 && y == 0) || (x == a.len() && y == b.len()) {
        // A split that doesn't shrink the problem would recurse forever
        return vec![Edit::new(DiffOp::Delete, a), Edit::new(DiffOp::Insert, b)];
    }
    let mut edits = diff_chars(&a[..x], &b[..y]);
    edits.extend(diff_chars(&a[x..], &b[y..]));
    edits
}

// ---------------------------------------------------------------------------
// Merge cleanup
// ---------------------------------------------------------------------------

/// Coalesce runs of edits, factor shared text out of delete/insert pairs,
/// and slide single edits over neighbouring equalities where that removes
/// an equality.
fn cleanup_merge(edits: &mut Vec<Edit>) {
    loop {
        merge_runs(edits);
        if !shift_single_edits(edits) {
            break;
        }
    }
}

fn merge_runs(edits: &mut Vec<Edit>) {
    edits.retain(|e| !e.text.is_empty());
    // Sentinel so the final run is flushed
    edits.push(Edit::new(DiffOp::Equal, &[]));

    let mut pointer = 0usize;
    let mut count_delete = 0usize;
    let mut count_insert = 0usize;
    let mut text_delete: Vec<char> = Vec::new();
    let mut text_insert: Vec<char> = Vec::new();

    while pointer < edits.len() {
        match edits[pointer].op {
            DiffOp::Insert => {
                count_insert += 1;
                text_insert.extend_from_slice(&edits[pointer].text);
                pointer += 1;
            }
            DiffOp::Delete => {
                count_delete += 1;
                text_delete.extend_from_slice(&edits[pointer].text);
                pointer += 1;
            }
            DiffOp::Equal => {
                if count_delete + count_insert > 1 {
                    if count_delete != 0 && count_insert != 0 {
                        let common = common_prefix(&text_insert, &text_delete);
                        if common != 0 {
                            let run_start = pointer - count_delete - count_insert;
                            if run_start > 0 && edits[run_start - 1].op == DiffOp::Equal {
                                edits[run_start - 1]
                                    .text
                                    .extend_from_slice(&text_insert[..common]);
                            } else {
                                edits.insert(0, Edit::new(DiffOp::Equal, &text_insert[..common]));
                                pointer += 1;
                            }
                            text_insert.drain(..common);
                            text_delete.drain(..common);
                        }
                        let common = common_suffix(&text_insert, &text_delete);
                        if common != 0 {
                            let tail = &text_insert[text_insert.len() - common..];
                            edits[pointer].text = concat(tail, &edits[pointer].text);
                            text_insert.truncate(text_insert.len() - common);
                            text_delete.truncate(text_delete.len() - common);
                        }
                    }

                    pointer -= count_delete + count_insert;
                    edits.drain(pointer..pointer + count_delete + count_insert);
                    if !text_delete.is_empty() {
                        edits.insert(pointer, Edit::new(DiffOp::Delete, &text_delete));
                        pointer += 1;
                    }
                    if !text_insert.is_empty() {
                        edits.insert(pointer, Edit::new(DiffOp::Insert, &text_insert));
                        pointer += 1;
                    }
                    pointer += 1;
                } else if pointer != 0 && edits[pointer - 1].op == DiffOp::Equal {
                    let text = edits.remove(pointer).text;
                    edits[pointer - 1].text.extend(text);
                } else {
                    pointer += 1;
                }
                count_delete = 0;
                count_insert = 0;
                text_delete.clear();
                text_insert.clear();
            }
        }
    }

    if edits.last().is_some_and(|e| e.text.is_empty()) {
        edits.pop();
    }
}

/// `A<ins>BA</ins>C` becomes `<ins>AB</ins>AC`, and the mirror case.
/// Returns whether anything moved.
fn shift_single_edits(edits: &mut Vec<Edit>) -> bool {
    let mut changes = false;
    let mut pointer = 1;
    while pointer + 1 < edits.len() {
        if edits[pointer - 1].op == DiffOp::Equal && edits[pointer + 1].op == DiffOp::Equal {
            let prev = edits[pointer - 1].text.clone();
            let cur = edits[pointer].text.clone();
            let next = edits[pointer + 1].text.clone();

            if !prev.is_empty() && cur.ends_with(&prev) {
                edits[pointer].text = concat(&prev, &cur[..cur.len() - prev.len()]);
                edits[pointer + 1].text = concat(&prev, &next);
                edits.remove(pointer - 1);
                changes = true;
            } else if !next.is_empty() && cur.starts_with(&next) {
                edits[pointer - 1].text.extend_from_slice(&next);
                edits[pointer].text = concat(&cur[next.len()..], &next);
                edits.remove(pointer + 1);
                changes = true;
            }
        }
        pointer += 1;
    }
    changes
}

// ---------------------------------------------------------------------------
// Semantic cleanup
// ---------------------------------------------------------------------------

fn cleanup_semantic(edits: &mut Vec<Edit>) {
    let mut changes = false;
    // Indices of equalities seen so far
    let mut equalities: Vec<usize> = Vec::new();
    let mut last_equality: Option<Vec<char>> = None;
    // Edit lengths before (1) and after (2) the last equality
    let (mut ins1, mut del1, mut ins2, mut del2) = (0usize, 0usize, 0usize, 0usize);

    let mut pointer = 0usize;
    while pointer < edits.len() {
        if edits[pointer].op == DiffOp::Equal {
            equalities.push(pointer);
            ins1 = ins2;
            del1 = del2;
            ins2 = 0;
            del2 = 0;
            last_equality = Some(edits[pointer].text.clone());
        } else {
            if edits[pointer].op == DiffOp::Insert {
                ins2 += edits[pointer].text.len();
            } else {
                del2 += edits[pointer].text.len();
            }

            let eliminate = match (&last_equality, equalities.last()) {
                (Some(eq), Some(&idx))
                    if !eq.is_empty()
                        && eq.len() <= ins1.max(del1)
                        && eq.len() <= ins2.max(del2) =>
                {
                    Some((idx, eq.clone()))
                }
                _ => None,
            };

            if let Some((idx, eq)) = eliminate {
                // Replace the equality with a delete/insert pair
                edits.insert(idx, Edit { op: DiffOp::Delete, text: eq });
                edits[idx + 1].op = DiffOp::Insert;
                equalities.pop();
                // The previous equality needs re-evaluating too
                equalities.pop();
                pointer = equalities.last().map_or(0, |&i| i + 1);
                ins1 = 0;
                del1 = 0;
                ins2 = 0;
                del2 = 0;
                last_equality = None;
                changes = true;
                continue;
            }
        }
        pointer += 1;
    }

    if changes {
        cleanup_merge(edits);
    }
    cleanup_semantic_lossless(edits);
    extract_overlaps(edits);
    edits.retain(|e| !e.text.is_empty());
}

/// Slide single edits between equalities so their boundaries land on
/// blank lines, line breaks, or word breaks where possible.
fn cleanup_semantic_lossless(edits: &mut Vec<Edit>) {
    let mut pointer = 1usize;
    while pointer + 1 < edits.len() {
        if edits[pointer - 1].op != DiffOp::Equal || edits[pointer + 1].op != DiffOp::Equal {
            pointer += 1;
            continue;
        }

        let mut eq1 = edits[pointer - 1].text.clone();
        let mut edit = edits[pointer].text.clone();
        let mut eq2 = edits[pointer + 1].text.clone();

        // Shift the edit as far left as possible
        let offset = common_suffix(&eq1, &edit);
        if offset > 0 {
            let common = edit[edit.len() - offset..].to_vec();
            eq1.truncate(eq1.len() - offset);
            edit = concat(&common, &edit[..edit.len() - offset]);
            eq2 = concat(&common, &eq2);
        }

        // Then step right one character at a time, keeping the best fit
        let mut best_eq1 = eq1.clone();
        let mut best_edit = edit.clone();
        let mut best_eq2 = eq2.clone();
        let mut best_score = semantic_score(&eq1, &edit) + semantic_score(&edit, &eq2);
        while !edit.is_empty() && !eq2.is_empty() && edit[0] == eq2[0] {
            eq1.push(edit[0]);
            edit.remove(0);
            edit.push(eq2[0]);
            eq2.remove(0);
            let score = semantic_score(&eq1, &edit) + semantic_score(&edit, &eq2);
            // >= favours the rightmost of equally good positions
            if score >= best_score {
                best_score = score;
                best_eq1 = eq1.clone();
                best_edit = edit.clone();
                best_eq2 = eq2.clone();
            }
        }

        if edits[pointer - 1].text == best_eq1 {
            pointer += 1;
            continue;
        }

        let mut p = pointer;
        if best_eq1.is_empty() {
            edits.remove(p - 1);
            p -= 1;
        } else {
            edits[p - 1].text = best_eq1;
        }
        edits[p].text = best_edit;
        if best_eq2.is_empty() {
            edits.remove(p + 1);
            pointer = p;
        } else {
            edits[p + 1].text = best_eq2;
            pointer = p + 1;
        }
    }
}

/// Score how natural a boundary between `one` and `two` is (0 worst, 6 best).
fn semantic_score(one: &[char], two: &[char]) -> u8 {
    let (Some(&c1), Some(&c2)) = (one.last(), two.first()) else {
        // Edges of the text are the best boundaries
        return 6;
    };

    let non_alnum1 = !c1.is_ascii_alphanumeric();
    let non_alnum2 = !c2.is_ascii_alphanumeric();
    let space1 = non_alnum1 && c1.is_whitespace();
    let space2 = non_alnum2 && c2.is_whitespace();
    let break1 = space1 && (c1 == '\n' || c1 == '\r');
    let break2 = space2 && (c2 == '\n' || c2 == '\r');
    let blank1 = break1 && ends_with_blank_line(one);
    let blank2 = break2 && starts_with_blank_line(two);

    if blank1 || blank2 {
        5
    } else if break1 || break2 {
        4
    } else if non_alnum1 && !space1 && space2 {
        // End of sentence
        3
    } else if space1 || space2 {
        2
    } else if non_alnum1 || non_alnum2 {
        1
    } else {
        0
    }
}

fn ends_with_blank_line(text: &[char]) -> bool {
    text.ends_with(&['\n', '\n']) || text.ends_with(&['\n', '\r', '\n'])
}

fn starts_with_blank_line(text: &[char]) -> bool {
    let mut rest = text;
    for _ in 0..2 {
        if let Some(after) = rest.strip_prefix(&['\r']) {
            rest = after;
        }
        match rest.strip_prefix(&['\n']) {
            Some(after) => rest = after,
            None => return false,
        }
    }
    true
}

/// `<del>abcxxx</del><ins>xxxdef</ins>` becomes
/// `<del>abc</del>xxx<ins>def</ins>` when the overlap is at least half of
/// either side.
fn extract_overlaps(edits: &mut Vec<Edit>) {
    let mut pointer = 1usize;
    while pointer < edits.len() {
        if edits[pointer - 1].op == DiffOp::Delete && edits[pointer].op == DiffOp::Insert {
            let deletion = edits[pointer - 1].text.clone();
            let insertion = edits[pointer].text.clone();
            let overlap1 = common_overlap(&deletion, &insertion);
            let overlap2 = common_overlap(&insertion, &deletion);

            if overlap1 >= overlap2 {
                if overlap1 * 2 >= deletion.len() || overlap1 * 2 >= insertion.len() {
                    edits.insert(pointer, Edit::new(DiffOp::Equal, &insertion[..overlap1]));
                    edits[pointer - 1].text = deletion[..deletion.len() - overlap1].to_vec();
                    edits[pointer + 1].text = insertion[overlap1..].to_vec();
                    pointer += 1;
                }
            } else if overlap2 * 2 >= deletion.len() || overlap2 * 2 >= insertion.len() {
                // Reverse overlap: the insertion comes first
                edits.insert(pointer, Edit::new(DiffOp::Equal, &deletion[..overlap2]));
                edits[pointer - 1] =
                    Edit::new(DiffOp::Insert, &insertion[..insertion.len() - overlap2]);
                edits[pointer + 1] = Edit::new(DiffOp::Delete, &deletion[overlap2..]);
                pointer += 1;
            }
            pointer += 1;
        }
        pointer += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(op: DiffOp, text: &str) -> DiffSpan {
        DiffSpan::new(op, text)
    }

    use DiffOp::{Delete, Equal, Insert};

    const PAIRS: &[(&str, &str)] = &[
        ("", ""),
        ("", "abc"),
        ("abc", ""),
        ("abc", "abc"),
        ("a", "b"),
        ("abc", "ab123c"),
        ("a123bc", "abc"),
        ("mouse", "sofas"),
        ("The cat.", "The cow and the cat."),
        ("abcxxx", "xxxdef"),
        ("xxxabc", "defxxx"),
        ("1ayb2", "abxab"),
        ("abcy", "xaxcxabc"),
        ("ABCDa=bcd=efghijklmnopqrsEFGHIJKLMNOefg", "a-bcd-efghijklmnopqrs"),
        ("héllo wörld", "hello world"),
        ("🦀 crab", "crab 🦀"),
        (
            "User-agent: *\nDisallow: /private/\nDisallow: /tmp/\n",
            "User-agent: *\nDisallow: /tmp/\n\nUser-agent: GPTBot\nDisallow: /\n",
        ),
        ("line one\r\nline two\r\n", "line one\r\n\r\nline 2\r\n"),
    ];

    #[test]
    fn raw_diff_round_trips() {
        for (old, new) in PAIRS {
            let spans = diff(old, new);
            assert_eq!(&old_text(&spans), old, "old side for {old:?} -> {new:?}");
            assert_eq!(&new_text(&spans), new, "new side for {old:?} -> {new:?}");
        }
    }

    #[test]
    fn semantic_diff_round_trips() {
        for (old, new) in PAIRS {
            let spans = semantic_diff(old, new);
            assert_eq!(&old_text(&spans), old, "old side for {old:?} -> {new:?}");
            assert_eq!(&new_text(&spans), new, "new side for {old:?} -> {new:?}");
        }
    }

    #[test]
    fn swapped_round_trips() {
        for (old, new) in PAIRS {
            let spans = semantic_diff(new, old);
            assert_eq!(&new_text(&spans), old);
        }
    }

    #[test]
    fn no_empty_or_repeated_spans() {
        for (old, new) in PAIRS {
            let spans = semantic_diff(old, new);
            assert!(spans.iter().all(|s| !s.text.is_empty()));
            assert!(spans.windows(2).all(|w| w[0].op != w[1].op));
        }
    }

    /// Small deterministic generator so random pairs are reproducible.
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self) -> u64 {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            self.0 >> 33
        }

        fn text(&mut self, alphabet: &[char], max_len: u64) -> String {
            let len = self.next() % (max_len + 1);
            (0..len)
                .map(|_| alphabet[(self.next() % alphabet.len() as u64) as usize])
                .collect()
        }
    }

    #[test]
    fn random_pairs_round_trip() {
        let alphabets: [&[char]; 3] = [
            &['a', 'b'],
            &['a', 'b', 'c', ' ', '.', '\n'],
            &['x', 'é', '🦀', '\r', '\n', ' ', ':', '/'],
        ];
        let mut rng = Lcg(0x5eed_cafe);

        for round in 0..3000 {
            let alphabet = alphabets[round % alphabets.len()];
            let old = rng.text(alphabet, 24);
            let new = rng.text(alphabet, 24);

            let spans = semantic_diff(&old, &new);
            assert_eq!(old_text(&spans), old, "old side for {old:?} -> {new:?}");
            assert_eq!(new_text(&spans), new, "new side for {old:?} -> {new:?}");

            let raw = diff(&old, &new);
            assert_eq!(old_text(&raw), old, "raw old side for {old:?} -> {new:?}");
            assert_eq!(new_text(&raw), new, "raw new side for {old:?} -> {new:?}");
        }
    }

    #[test]
    fn identical_and_empty_inputs() {
        assert!(diff("", "").is_empty());
        assert_eq!(diff("abc", "abc"), vec![span(Equal, "abc")]);
        assert_eq!(diff("", "abc"), vec![span(Insert, "abc")]);
        assert_eq!(diff("abc", ""), vec![span(Delete, "abc")]);
    }

    #[test]
    fn contained_text_is_a_single_edit() {
        assert_eq!(
            diff("abc", "ab123c"),
            vec![span(Equal, "ab"), span(Insert, "123"), span(Equal, "c")]
        );
        assert_eq!(
            diff("a123bc", "abc"),
            vec![span(Equal, "a"), span(Delete, "123"), span(Equal, "bc")]
        );
    }

    #[test]
    fn single_character_flutter_collapses() {
        assert_eq!(
            semantic_diff("mouse", "sofas"),
            vec![span(Delete, "mouse"), span(Insert, "sofas")]
        );
    }

    #[test]
    fn boundaries_snap_to_word_breaks() {
        assert_eq!(
            semantic_diff("The cat.", "The cow and the cat."),
            vec![
                span(Equal, "The "),
                span(Insert, "cow and the "),
                span(Equal, "cat."),
            ]
        );
    }

    #[test]
    fn overlap_is_pulled_out() {
        assert_eq!(
            semantic_diff("abcxxx", "xxxdef"),
            vec![span(Delete, "abc"), span(Equal, "xxx"), span(Insert, "def")]
        );
    }

    #[test]
    fn robots_rule_change_keeps_shared_lines() {
        let old = "User-agent: *\nDisallow: /a\n";
        let new = "User-agent: *\nDisallow: /b\n";
        assert_eq!(
            semantic_diff(old, new),
            vec![
                span(Equal, "User-agent: *\nDisallow: /"),
                span(Delete, "a"),
                span(Insert, "b"),
                span(Equal, "\n"),
            ]
        );
    }

    #[test]
    fn overlap_helper() {
        let chars = |s: &str| s.chars().collect::<Vec<_>>();
        assert_eq!(common_overlap(&chars(""), &chars("abcd")), 0);
        assert_eq!(common_overlap(&chars("abc"), &chars("abcd")), 3);
        assert_eq!(common_overlap(&chars("123456"), &chars("abcd")), 0);
        assert_eq!(common_overlap(&chars("123456xxx"), &chars("xxxabcd")), 3);
    }

    #[test]
    fn score_prefers_line_breaks_over_words() {
        let chars = |s: &str| s.chars().collect::<Vec<_>>();
        assert_eq!(semantic_score(&chars(""), &chars("x")), 6);
        assert_eq!(semantic_score(&chars("a\n\n"), &chars("b")), 5);
        assert_eq!(semantic_score(&chars("a\n"), &chars("b")), 4);
        assert_eq!(semantic_score(&chars("a."), &chars(" b")), 3);
        assert_eq!(semantic_score(&chars("a "), &chars("b")), 2);
        assert_eq!(semantic_score(&chars("a-"), &chars("b")), 1);
        assert_eq!(semantic_score(&chars("a"), &chars("b")), 0);
    }

    #[test]
    fn spans_serialize_with_lowercase_ops() {
        let json = serde_json::to_string(&span(Insert, "x")).unwrap();
        assert_eq!(json, r#"{"op":"insert","text":"x"}"#);
    }
}
