//! Ratcliff/Obershelp similarity and close-match selection.
//!
//! The similarity of two strings is `2·M / T`, where `T` is the total number of
//! characters and `M` the number of characters covered by matching blocks. Blocks
//! are found by taking the longest common substring and recursing on the pieces
//! to its left and right.
//!
//! `get_close_matches` filters with two cheap upper bounds (`real_quick_ratio`,
//! `quick_ratio`) before paying for the full `ratio`.

use std::cmp::Ordering;
use std::collections::HashMap;

/// Sequences at least this long drop "popular" characters from the match index.
const AUTOJUNK_MIN_LEN: usize = 200;

/// Similarity matcher with a fixed second sequence.
///
/// The index over `b` is built once, so scanning many candidates against one
/// query word only pays for it once.
#[derive(Debug, Clone)]
pub struct SequenceMatcher {
  /// Second sequence (the query word)
  b: Vec<char>,
  /// char → ascending positions in `b` (popular chars removed)
  b2j: HashMap<char, Vec<usize>>,
  /// char → occurrence count in `b` (for `quick_ratio`)
  b_counts: HashMap<char, usize>,
}

/// One matching block: `a[a_start..a_start+size] == b[b_start..b_start+size]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Match {
  a_start: usize,
  b_start: usize,
  size: usize,
}

impl SequenceMatcher {
  /// Creates a matcher whose second sequence is `b`.
  pub fn new(b: &str) -> Self {
    let b: Vec<char> = b.chars().collect();

    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    let mut b_counts: HashMap<char, usize> = HashMap::new();
    for (j, &c) in b.iter().enumerate() {
      b2j.entry(c).or_default().push(j);
      *b_counts.entry(c).or_default() += 1;
    }

    let n = b.len();
    if n >= AUTOJUNK_MIN_LEN {
      let popular_threshold = n / 100 + 1;
      b2j.retain(|_, positions| positions.len() <= popular_threshold);
    }

    Self { b, b2j, b_counts }
  }

  /// Similarity in `[0.0, 1.0]` between `a` and the stored sequence.
  pub fn ratio(&self, a: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let matched: usize = self.matching_blocks(&a).iter().map(|m| m.size).sum();
    calculate_ratio(matched, a.len() + self.b.len())
  }

  /// Upper bound on `ratio` from shared character counts, ignoring order.
  pub fn quick_ratio(&self, a: &str) -> f64 {
    let mut available: HashMap<char, isize> = HashMap::new();
    let mut matches = 0;
    let mut a_len = 0;

    for c in a.chars() {
      a_len += 1;
      let remaining = available
        .entry(c)
        .or_insert_with(|| self.b_counts.get(&c).copied().unwrap_or(0) as isize);
      if *remaining > 0 {
        matches += 1;
      }
      *remaining -= 1;
    }

    calculate_ratio(matches, a_len + self.b.len())
  }

  /// Upper bound on `ratio` from lengths alone.
  pub fn real_quick_ratio(&self, a: &str) -> f64 {
    let la = a.chars().count();
    let lb = self.b.len();
    calculate_ratio(la.min(lb), la + lb)
  }

  /// Matching blocks between `a` and `b`, found by recursive longest-match splitting.
  fn matching_blocks(&self, a: &[char]) -> Vec<Match> {
    let mut blocks = Vec::new();
    let mut queue = vec![(0, a.len(), 0, self.b.len())];

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
      let m = self.find_longest_match(a, alo, ahi, blo, bhi);
      if m.size == 0 {
        continue;
      }

      if alo < m.a_start && blo < m.b_start {
        queue.push((alo, m.a_start, blo, m.b_start));
      }
      if m.a_start + m.size < ahi && m.b_start + m.size < bhi {
        queue.push((m.a_start + m.size, ahi, m.b_start + m.size, bhi));
      }
      blocks.push(m);
    }

    blocks
  }

  /// Longest block of `a[alo..ahi]` matching `b[blo..bhi]`.
  ///
  /// Among equally long blocks, the one starting earliest in `a` wins, then the
  /// one starting earliest in `b`.
  fn find_longest_match(
    &self,
    a: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
  ) -> Match {
    let mut best = Match {
      a_start: alo,
      b_start: blo,
      size: 0,
    };

    // j2len[j] = length of the match ending at a[i-1] and b[j]
    let mut j2len: HashMap<usize, usize> = HashMap::new();
    for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
      let mut next_j2len: HashMap<usize, usize> = HashMap::new();
      if let Some(positions) = self.b2j.get(c) {
        for &j in positions {
          if j < blo {
            continue;
          }
          if j >= bhi {
            break;
          }
          let k = j.checked_sub(1).and_then(|prev| j2len.get(&prev)).copied().unwrap_or(0) + 1;
          next_j2len.insert(j, k);
          if k > best.size {
            best = Match {
              a_start: i + 1 - k,
              b_start: j + 1 - k,
              size: k,
            };
          }
        }
      }
      j2len = next_j2len;
    }

    // popular chars are not indexed; grow the block over equal neighbours
    while best.a_start > alo && best.b_start > blo && a[best.a_start - 1] == self.b[best.b_start - 1]
    {
      best.a_start -= 1;
      best.b_start -= 1;
      best.size += 1;
    }
    while best.a_start + best.size < ahi
      && best.b_start + best.size < bhi
      && a[best.a_start + best.size] == self.b[best.b_start + best.size]
    {
      best.size += 1;
    }

    best
  }
}

/// `2·matches / length`, with two empty sequences counting as identical
fn calculate_ratio(matches: usize, length: usize) -> f64 {
  if length == 0 {
    return 1.0;
  }
  2.0 * matches as f64 / length as f64
}

/// Returns up to `n` candidates whose similarity to `word` is at least `cutoff`.
///
/// Best matches come first; equal scores are ordered by the larger candidate
/// string first so the result does not depend on candidate iteration order.
pub fn get_close_matches<'a, I>(word: &str, candidates: I, n: usize, cutoff: f64) -> Vec<&'a str>
where
  I: IntoIterator<Item = &'a str>,
{
  if n == 0 {
    return Vec::new();
  }

  let matcher = SequenceMatcher::new(word);
  let mut scored: Vec<(f64, &'a str)> = candidates
    .into_iter()
    .filter(|candidate| {
      matcher.real_quick_ratio(candidate) >= cutoff && matcher.quick_ratio(candidate) >= cutoff
    })
    .filter_map(|candidate| {
      let score = matcher.ratio(candidate);
      (score >= cutoff).then_some((score, candidate))
    })
    .collect();

  scored.sort_by(|(score_a, a), (score_b, b)| {
    score_b.partial_cmp(score_a).unwrap_or(Ordering::Equal).then_with(|| b.cmp(a))
  });

  scored.into_iter().take(n).map(|(_, candidate)| candidate).collect()
}
