//! FastText-style sentiment classification for IMDB movie reviews.
//!
//! Implements the averaged-embedding bag-of-features classifier from
//! Joulin et al., "Bag of Tricks for Efficient Text Classification"
//! (<http://arxiv.org/abs/1607.01759>): unigram token ids are augmented with
//! hashed n-gram features, embedded, averaged and fed through a small linear
//! head. Training uses Adam with mini-batches rather than Hogwild SGD.

mod data_processing;
mod model;

pub mod inference;
pub mod training;

pub use data_processing::{
    AugmentError, ImdbDataset, NgramAugmenter, TextClassificationDataset,
};
pub use inference::CheckpointError;
