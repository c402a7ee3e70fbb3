use std::collections::HashMap;

const AUTOJUNK_MIN_LEN: usize = 200;

/// Ratcliff/Obershelp similarity over characters: `2 * M / T`, where `M` is
/// the total size of the matching blocks and `T` the combined length.
///
/// Anchors are searched in `b`; when `b` has at least 200 characters,
/// characters making up more than 1% of it are not used as anchors.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a = a.chars().collect::<Vec<_>>();
    let b = b.chars().collect::<Vec<_>>();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matcher = BlockMatcher::new(&a, &b);
    2.0 * matcher.matched_chars() as f64 / total as f64
}

struct BlockMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    b_positions: HashMap<char, Vec<usize>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Block {
    a_start: usize,
    b_start: usize,
    size: usize,
}

impl<'a> BlockMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b_positions: HashMap<char, Vec<usize>> = HashMap::new();
        for (index, character) in b.iter().enumerate() {
            b_positions.entry(*character).or_default().push(index);
        }

        if b.len() >= AUTOJUNK_MIN_LEN {
            let limit = b.len() / 100 + 1;
            b_positions.retain(|_, positions| positions.len() <= limit);
        }

        Self { a, b, b_positions }
    }

    fn longest_match(&self, a_lo: usize, a_hi: usize, b_lo: usize, b_hi: usize) -> Block {
        let mut best = Block {
            a_start: a_lo,
            b_start: b_lo,
            size: 0,
        };
        let mut run_lengths: HashMap<usize, usize> = HashMap::new();

        for i in a_lo..a_hi {
            let mut next_lengths = HashMap::new();
            if let Some(positions) = self.b_positions.get(&self.a[i]) {
                for &j in positions {
                    if j < b_lo {
                        continue;
                    }
                    if j >= b_hi {
                        break;
                    }
                    let length = j
                        .checked_sub(1)
                        .and_then(|previous| run_lengths.get(&previous))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next_lengths.insert(j, length);
                    if length > best.size {
                        best = Block {
                            a_start: i + 1 - length,
                            b_start: j + 1 - length,
                            size: length,
                        };
                    }
                }
            }
            run_lengths = next_lengths;
        }

        while best.a_start > a_lo
            && best.b_start > b_lo
            && self.a[best.a_start - 1] == self.b[best.b_start - 1]
        {
            best.a_start -= 1;
            best.b_start -= 1;
            best.size += 1;
        }
        while best.a_start + best.size < a_hi
            && best.b_start + best.size < b_hi
            && self.a[best.a_start + best.size] == self.b[best.b_start + best.size]
        {
            best.size += 1;
        }

        best
    }

    fn matching_blocks(&self) -> Vec<Block> {
        let mut pending = vec![(0, self.a.len(), 0, self.b.len())];
        let mut blocks = Vec::new();

        while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
            let block = self.longest_match(a_lo, a_hi, b_lo, b_hi);
            if block.size == 0 {
                continue;
            }

            if a_lo < block.a_start && b_lo < block.b_start {
                pending.push((a_lo, block.a_start, b_lo, block.b_start));
            }
            if block.a_start + block.size < a_hi && block.b_start + block.size < b_hi {
                pending.push((
                    block.a_start + block.size,
                    a_hi,
                    block.b_start + block.size,
                    b_hi,
                ));
            }
            blocks.push(block);
        }

        blocks.sort_by_key(|block| (block.a_start, block.b_start));
        blocks
    }

    fn matched_chars(&self) -> usize {
        self.matching_blocks().iter().map(|block| block.size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::{similarity_ratio, Block, BlockMatcher};

    fn close(left: f64, right: f64) -> bool {
        (left - right).abs() < 1e-9
    }

    #[test]
    fn identical_strings_score_one() {
        assert!(close(similarity_ratio("introduction", "introduction"), 1.0));
        assert!(close(similarity_ratio("", ""), 1.0));
    }

    #[test]
    fn disjoint_strings_score_zero() {
        assert!(close(similarity_ratio("abc", "xyz"), 0.0));
        assert!(close(similarity_ratio("abc", ""), 0.0));
    }

    #[test]
    fn ratio_counts_all_matching_blocks() {
        // "abcd" / "bcde": one block "bcd" of 3 → 6 / 8
        assert!(close(similarity_ratio("abcd", "bcde"), 0.75));
        // "qabxcd" / "abycdf": blocks "ab" and "cd" → 8 / 12
        assert!(close(similarity_ratio("qabxcd", "abycdf"), 8.0 / 12.0));
    }

    #[test]
    fn near_duplicate_headings_clear_the_default_threshold() {
        assert!(similarity_ratio("table of contents", "table of content") > 0.7);
        assert!(similarity_ratio("revision history", "acknowledgements") < 0.7);
    }

    #[test]
    fn longest_match_prefers_the_earliest_block() {
        let a = "abab".chars().collect::<Vec<_>>();
        let b = "ab".chars().collect::<Vec<_>>();
        let matcher = BlockMatcher::new(&a, &b);
        assert_eq!(
            matcher.longest_match(0, a.len(), 0, b.len()),
            Block {
                a_start: 0,
                b_start: 0,
                size: 2
            }
        );
    }

    #[test]
    fn popular_characters_are_not_anchors_in_long_text() {
        let long = "a".repeat(250);
        let a = "xa".chars().collect::<Vec<_>>();
        let b = long.chars().collect::<Vec<_>>();
        let matcher = BlockMatcher::new(&a, &b);
        assert_eq!(matcher.matched_chars(), 0);
    }
}
