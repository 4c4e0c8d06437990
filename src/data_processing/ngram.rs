// Hashed n-gram feature augmentation, the "bag of tricks" from the FastText
// paper. A tokenized example is extended with one extra feature id per
// contiguous n-gram (2 <= n <= max_n), each hashed into a fixed bucket range
// placed directly above the unigram vocabulary. Collisions between different
// n-grams are expected and acceptable; this is a lossy hash embedding, not a
// dictionary.

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Error raised for malformed augmentation parameters or inputs. These
/// indicate a configuration or programmer error and are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AugmentError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Stateless n-gram feature augmenter.
///
/// Unigram token ids live in `[0, vocab_size)`; hashed n-gram features are
/// assigned ids in `[vocab_size, vocab_size + n_buckets)`. The hash scheme is
/// pinned so that fixtures stay reproducible across platforms: each token of
/// a window is serialized as an unsigned 64-bit little-endian integer, the
/// concatenation is hashed with SHA-256, and the digest (read as a big-endian
/// integer) is reduced modulo `n_buckets`.
#[derive(Debug, Clone)]
pub struct NgramAugmenter {
    vocab_size: usize,
    n_buckets: usize,
    max_n: usize,
}

impl NgramAugmenter {
    /// Creates an augmenter, validating the parameters eagerly.
    pub fn new(vocab_size: usize, n_buckets: usize, max_n: usize) -> Result<Self, AugmentError> {
        if vocab_size == 0 {
            return Err(AugmentError::InvalidArgument(
                "vocab_size must be positive".to_string(),
            ));
        }
        if n_buckets == 0 {
            return Err(AugmentError::InvalidArgument(
                "n_buckets must be positive".to_string(),
            ));
        }
        if max_n < 1 {
            return Err(AugmentError::InvalidArgument(
                "max_n must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            vocab_size,
            n_buckets,
            max_n,
        })
    }

    /// Size of the combined feature id space, `vocab_size + n_buckets`. This
    /// is the embedding table size the downstream classifier must allocate.
    pub fn feature_space_size(&self) -> usize {
        self.vocab_size + self.n_buckets
    }

    /// Augments a unigram sequence with hashed n-gram features.
    ///
    /// The output is the input unigrams unchanged, followed by one hashed
    /// feature id per contiguous window, ordered by ascending window length
    /// and then by window start position. Sequences shorter than `n`
    /// contribute no windows of that length; the empty sequence passes
    /// through unchanged. Negative token ids are rejected before any window
    /// is hashed.
    pub fn augment(&self, unigrams: &[i64]) -> Result<Vec<i64>, AugmentError> {
        if let Some(&token) = unigrams.iter().find(|&&token| token < 0) {
            return Err(AugmentError::InvalidArgument(format!(
                "negative token id {token} in input sequence"
            )));
        }

        let mut features = unigrams.to_vec();
        for n in 2..=self.max_n {
            for window in unigrams.windows(n) {
                features.push(self.hash_window(window));
            }
        }
        Ok(features)
    }

    fn hash_window(&self, window: &[i64]) -> i64 {
        let mut hasher = Sha256::new();
        for &token in window {
            hasher.update((token as u64).to_le_bytes());
        }
        let digest = hasher.finalize();

        // Digest read as a big-endian integer modulo n_buckets, folded one
        // byte at a time. The accumulator stays below n_buckets (<= u64::MAX)
        // so the shifted value fits in a u128.
        let bucket = digest.iter().fold(0u128, |acc, &byte| {
            ((acc << 8) | u128::from(byte)) % self.n_buckets as u128
        }) as usize;

        (self.vocab_size + bucket) as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn augmenter(vocab_size: usize, n_buckets: usize, max_n: usize) -> NgramAugmenter {
        NgramAugmenter::new(vocab_size, n_buckets, max_n).unwrap()
    }

    #[test]
    fn pinned_bigram_fixture() {
        // SHA-256 over little-endian u64 windows, digest mod 100, plus 10.
        let output = augmenter(10, 100, 2).augment(&[1, 2, 3]).unwrap();
        assert_eq!(output, vec![1, 2, 3, 31, 11]);
    }

    #[test]
    fn pinned_trigram_fixture_groups_by_window_length() {
        // Bigrams first, then the single trigram.
        let output = augmenter(10, 100, 3).augment(&[1, 2, 3]).unwrap();
        assert_eq!(output, vec![1, 2, 3, 31, 11, 93]);
    }

    #[test]
    fn deterministic_across_calls() {
        let augmenter = augmenter(100_000, 1_000_000, 3);
        let input = [17, 3, 999, 42, 0, 42];
        assert_eq!(
            augmenter.augment(&input).unwrap(),
            augmenter.augment(&input).unwrap()
        );
    }

    #[test]
    fn output_length_follows_window_counts() {
        let input = [5, 6, 7, 8, 9];
        let max_n = 4;
        let output = augmenter(100, 1000, max_n).augment(&input).unwrap();
        let expected: usize = input.len()
            + (2..=max_n)
                .map(|n| input.len().saturating_sub(n - 1))
                .sum::<usize>();
        assert_eq!(output.len(), expected);
    }

    #[test]
    fn unigrams_prefix_is_preserved() {
        let input = [9, 0, 4, 4, 2];
        let output = augmenter(10, 50, 3).augment(&input).unwrap();
        assert_eq!(&output[..input.len()], &input);
    }

    #[test]
    fn hashed_features_land_in_bucket_range() {
        let (vocab_size, n_buckets) = (10, 50);
        let input = [1, 2, 3, 4, 5, 6];
        let output = augmenter(vocab_size, n_buckets, 3).augment(&input).unwrap();
        for &feature in &output[input.len()..] {
            assert!(feature >= vocab_size as i64);
            assert!(feature < (vocab_size + n_buckets) as i64);
        }
    }

    #[test]
    fn windows_are_order_sensitive() {
        // Reversing the sequence reverses the windows, so the hashed
        // features differ; this is not a bag-of-words hash.
        let forward = augmenter(10, 100, 2).augment(&[1, 2, 3]).unwrap();
        let reversed = augmenter(10, 100, 2).augment(&[3, 2, 1]).unwrap();
        assert_eq!(reversed, vec![3, 2, 1, 12, 34]);
        assert_ne!(forward[3..], reversed[3..]);
    }

    #[test]
    fn repeated_token_windows_collapse_to_one_bucket() {
        // Degenerate all-equal case: every window is identical, so every
        // hashed feature is too.
        let output = augmenter(10, 100, 2).augment(&[7, 7, 7, 7]).unwrap();
        assert_eq!(output, vec![7, 7, 7, 7, 76, 76, 76]);
    }

    #[test]
    fn empty_and_short_inputs_pass_through() {
        let augmenter = augmenter(10, 100, 2);
        assert_eq!(augmenter.augment(&[]).unwrap(), Vec::<i64>::new());
        assert_eq!(augmenter.augment(&[5]).unwrap(), vec![5]);
    }

    #[test]
    fn negative_token_is_rejected() {
        let result = augmenter(10, 100, 2).augment(&[-1]);
        assert!(matches!(result, Err(AugmentError::InvalidArgument(_))));
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert!(matches!(
            NgramAugmenter::new(0, 100, 2),
            Err(AugmentError::InvalidArgument(_))
        ));
        assert!(matches!(
            NgramAugmenter::new(10, 0, 2),
            Err(AugmentError::InvalidArgument(_))
        ));
        assert!(matches!(
            NgramAugmenter::new(10, 100, 0),
            Err(AugmentError::InvalidArgument(_))
        ));
    }

    #[test]
    fn max_n_one_keeps_unigrams_only() {
        let output = augmenter(10, 100, 1).augment(&[1, 2, 3]).unwrap();
        assert_eq!(output, vec![1, 2, 3]);
    }

    #[test]
    fn feature_space_covers_vocab_and_buckets() {
        assert_eq!(augmenter(100_000, 1_000_000, 2).feature_space_size(), 1_100_000);
    }
}
