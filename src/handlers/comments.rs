use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::{Handler, TaskReply};

/// Length of `b` from which popular characters stop seeding matches.
pub const AUTOJUNK_MIN_LEN: usize = 200;

/// Finds the two most similar lines in `comments.txt`.
pub struct SimilarCommentsHandler {
    input: PathBuf,
    output: PathBuf,
}

impl SimilarCommentsHandler {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            input: data_dir.join("comments.txt"),
            output: data_dir.join("comments-similar.txt"),
        }
    }
}

/// Ratcliff/Obershelp similarity in `[0, 1]`: `2 * matches / total_len`.
///
/// Matches are counted by taking the longest common block, then recursing
/// into the regions on either side of it. Not symmetric: ties and the
/// popular-character rule both depend on which side is `b`.
///
/// When `b` has at least [`AUTOJUNK_MIN_LEN`] characters, any character
/// occurring more than `b.len() / 100 + 1` times in it cannot seed a block,
/// though blocks found elsewhere may still grow across it.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, c) in b.iter().enumerate() {
        b2j.entry(*c).or_default().push(j);
    }
    if b.len() >= AUTOJUNK_MIN_LEN {
        let limit = b.len() / 100 + 1;
        b2j.retain(|_, positions| positions.len() <= limit);
    }

    let mut matched = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, k) = longest_match(a, b, &b2j, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            queue.push((i + k, ahi, j + k, bhi));
        }
    }
    matched
}

/// Longest block `a[i..i+k] == b[j..j+k]` inside the given windows.
/// Ties go to the earliest `i`, then the earliest `j`.
fn longest_match(
    a: &[char],
    b: &[char],
    b2j: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);
    // j2len[j] = length of the match ending at a[i-1], b[j]
    let mut j2len: HashMap<usize, usize> = HashMap::new();
    for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next: HashMap<usize, usize> = HashMap::new();
        if let Some(positions) = b2j.get(c) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = j
                    .checked_sub(1)
                    .and_then(|prev| j2len.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next.insert(j, k);
                if k > best_k {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_k = k;
                }
            }
        }
        j2len = next;
    }

    // Grow across characters the popular rule dropped from `b2j`.
    while best_i > alo && best_j > blo && a[best_i - 1] == b[best_j - 1] {
        best_i -= 1;
        best_j -= 1;
        best_k += 1;
    }
    while best_i + best_k < ahi && best_j + best_k < bhi && a[best_i + best_k] == b[best_j + best_k] {
        best_k += 1;
    }
    (best_i, best_j, best_k)
}

/// The ordered pair of distinct comments with maximal similarity.
///
/// Both orders of every pair are scored, since [`similarity`] is not
/// symmetric. Ties go to the first pair in scan order.
pub fn most_similar<'a>(comments: &[&'a str]) -> Option<(&'a str, &'a str)> {
    let mut best: Option<(&str, &str, f64)> = None;
    for a in comments {
        for b in comments {
            if a == b {
                continue;
            }
            let score = similarity(a, b);
            if best.is_none_or(|(_, _, s)| score > s) {
                best = Some((*a, *b, score));
            }
        }
    }
    best.map(|(a, b, _)| (a, b))
}

#[async_trait]
impl Handler for SimilarCommentsHandler {
    fn name(&self) -> &str {
        "similar-comments"
    }

    fn description(&self) -> &str {
        "write the most similar pair of lines in comments.txt"
    }

    async fn run(&self) -> Result<TaskReply> {
        let text = tokio::fs::read_to_string(&self.input)
            .await
            .with_context(|| format!("failed to read {}", self.input.display()))?;
        let comments: Vec<&str> = text.lines().collect();
        let Some((a, b)) = most_similar(&comments) else {
            bail!("need at least two distinct comments in {}", self.input.display());
        };
        tokio::fs::write(&self.output, format!("{a}\n{b}"))
            .await
            .with_context(|| format!("failed to write {}", self.output.display()))?;
        Ok(TaskReply::ok("Similar comments found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(x: f64, y: f64) -> bool {
        (x - y).abs() < 1e-9
    }

    #[test]
    fn identical_strings() {
        assert!(close(similarity("hello", "hello"), 1.0));
    }

    #[test]
    fn disjoint_strings() {
        assert!(close(similarity("abc", "xyz"), 0.0));
    }

    #[test]
    fn partial_overlap() {
        // "bcd" matches: 2 * 3 / 8
        assert!(close(similarity("abcd", "bcde"), 0.75));
    }

    #[test]
    fn matches_on_both_sides_of_longest_block() {
        // longest block "cd", then "a" on the left and "f" on the right
        assert!(close(similarity("abcdef", "axcdyf"), 2.0 * 4.0 / 12.0));
    }

    #[test]
    fn empty_strings() {
        assert!(close(similarity("", ""), 1.0));
        assert!(close(similarity("", "abc"), 0.0));
    }

    #[test]
    fn order_matters() {
        // "tide" vs "diet": the first block found differs per side.
        assert!(close(similarity("tide", "diet"), 0.25));
        assert!(close(similarity("diet", "tide"), 0.5));
    }

    #[test]
    fn popular_chars_in_long_b_do_not_seed_blocks() {
        let long = format!("y{}", "a".repeat(AUTOJUNK_MIN_LEN));
        assert!(close(similarity("xa", &long), 0.0));
        assert!(close(similarity(&long, "xa"), 2.0 / 203.0));
    }

    #[test]
    fn popular_chars_still_extend_a_block() {
        // 'a' is popular in b but the block grows from 'y' across it.
        let long = format!("y{}", "a".repeat(AUTOJUNK_MIN_LEN));
        assert!(close(similarity("yaa", &long), 2.0 * 3.0 / 204.0));
    }

    #[test]
    fn scores_both_orders_of_a_pair() {
        assert_eq!(most_similar(&["tide", "diet"]), Some(("diet", "tide")));
    }

    #[test]
    fn picks_the_closest_pair() {
        let comments = ["great product", "terrible service", "great products", "ok"];
        let (a, b) = most_similar(&comments).unwrap();
        let mut pair = [a, b];
        pair.sort();
        assert_eq!(pair, ["great product", "great products"]);
    }

    #[test]
    fn ignores_identical_lines() {
        let comments = ["same", "same", "different"];
        let (a, b) = most_similar(&comments).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn fewer_than_two_distinct_is_none() {
        assert!(most_similar(&["only"]).is_none());
        assert!(most_similar(&["dup", "dup"]).is_none());
        assert!(most_similar(&[]).is_none());
    }
}
