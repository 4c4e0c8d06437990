// IMDB sentiment dataset wiring. The Hugging Face "imdb" dataset is pulled
// into a local SQLite store by burn's dataset loader and exposed through the
// TextClassificationDataset trait, which tells the rest of the pipeline how
// many classes exist and how to name them.

use burn::data::dataset::{source::huggingface::HuggingfaceDatasetLoader, Dataset, SqliteDataset};
use derive_new::new;
use serde::{Deserialize, Serialize};
use strum::EnumCount;
use strum_macros::EnumCount;

/// One example of a text classification task: the raw text and its class
/// label.
#[derive(new, Clone, Debug)]
pub struct TextClassificationItem {
    pub text: String,
    pub label: usize,
}

/// Dataset of labeled texts with class metadata.
pub trait TextClassificationDataset: Dataset<TextClassificationItem> {
    /// Number of distinct classes in the dataset.
    fn num_classes() -> usize;

    /// Human-readable name of a class label.
    fn class_name(label: usize) -> String;
}

/// Row shape of the Hugging Face "imdb" dataset.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImdbItem {
    pub text: String,
    pub label: usize,
}

/// IMDB movie review sentiment dataset (25k train / 25k test reviews).
#[derive(Debug)]
pub struct ImdbDataset {
    dataset: SqliteDataset<ImdbItem>,
}

impl Dataset<TextClassificationItem> for ImdbDataset {
    fn get(&self, index: usize) -> Option<TextClassificationItem> {
        self.dataset
            .get(index)
            .map(|item| TextClassificationItem::new(item.text, item.label))
    }

    fn len(&self) -> usize {
        self.dataset.len()
    }
}

pub enum DatasetSplit {
    Train,
    Test,
}

impl ImdbDataset {
    /// Training split of the dataset.
    pub fn train() -> Self {
        Self::new(DatasetSplit::Train)
    }

    /// Test split of the dataset.
    pub fn test() -> Self {
        Self::new(DatasetSplit::Test)
    }

    pub fn new(split: DatasetSplit) -> Self {
        let split = match split {
            DatasetSplit::Train => "train",
            DatasetSplit::Test => "test",
        };
        let dataset: SqliteDataset<ImdbItem> = HuggingfaceDatasetLoader::new("imdb")
            .dataset(split)
            .unwrap();
        Self { dataset }
    }
}

/// Sentiment classes of the IMDB dataset, in label order.
#[derive(EnumCount)]
pub enum ImdbClasses {
    Negative,
    Positive,
}

impl TextClassificationDataset for ImdbDataset {
    fn num_classes() -> usize {
        ImdbClasses::COUNT
    }

    fn class_name(label: usize) -> String {
        match label {
            0 => "Negative",
            1 => "Positive",
            _ => panic!("invalid class label {label}"),
        }
        .to_string()
    }
}
