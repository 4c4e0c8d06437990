// Turns raw labeled texts into padded tensors. Each text is tokenized into
// unigram ids, extended with hashed n-gram features, then padded to the batch
// maximum (capped at max_seq_length). Training batches carry labels and a
// padding mask; inference batches carry only tokens and the mask.

use super::{dataset::TextClassificationItem, ngram::NgramAugmenter, tokenizer::Tokenizer};
use burn::{
    data::dataloader::batcher::Batcher,
    nn::attention::generate_padding_mask,
    tensor::{backend::Backend, Bool, Data, ElementConversion, Int, Tensor},
};
use derive_new::new;
use std::sync::Arc;

/// Batcher producing padded, n-gram-augmented feature tensors.
#[derive(new)]
pub struct TextClassificationBatcher<B: Backend> {
    tokenizer: Arc<dyn Tokenizer>,
    augmenter: NgramAugmenter,
    device: B::Device,
    max_seq_length: usize,
}

/// Training batch: augmented feature ids, class labels and padding mask.
#[derive(Debug, Clone, new)]
pub struct TextClassificationTrainingBatch<B: Backend> {
    pub tokens: Tensor<B, 2, Int>,
    pub labels: Tensor<B, 1, Int>,
    pub mask_pad: Tensor<B, 2, Bool>,
}

/// Inference batch: augmented feature ids and padding mask.
#[derive(Debug, Clone, new)]
pub struct TextClassificationInferenceBatch<B: Backend> {
    pub tokens: Tensor<B, 2, Int>,
    pub mask_pad: Tensor<B, 2, Bool>,
}

impl<B: Backend> TextClassificationBatcher<B> {
    /// Tokenizes a text and appends its hashed n-gram features. Unigrams stay
    /// at the front, so truncation at max_seq_length drops hashed features
    /// before it drops words.
    fn encode_augmented(&self, text: &str) -> Vec<usize> {
        let unigrams: Vec<i64> = self
            .tokenizer
            .encode(text)
            .into_iter()
            .map(|id| id as i64)
            .collect();
        self.augmenter
            .augment(&unigrams)
            .expect("tokenizer ids are non-negative")
            .into_iter()
            .map(|id| id as usize)
            .collect()
    }
}

impl<B: Backend> Batcher<TextClassificationItem, TextClassificationTrainingBatch<B>>
    for TextClassificationBatcher<B>
{
    fn batch(&self, items: Vec<TextClassificationItem>) -> TextClassificationTrainingBatch<B> {
        let mut tokens_list = Vec::with_capacity(items.len());
        let mut labels_list = Vec::with_capacity(items.len());

        items.iter().for_each(|item| {
            tokens_list.push(self.encode_augmented(&item.text));
            labels_list.push(Tensor::from_data(
                Data::from([(item.label as i64).elem()]),
                &self.device,
            ));
        });

        let mask = generate_padding_mask(
            self.tokenizer.pad_token(),
            tokens_list,
            Some(self.max_seq_length),
            &self.device,
        );

        TextClassificationTrainingBatch {
            tokens: mask.tensor,
            labels: Tensor::cat(labels_list, 0),
            mask_pad: mask.mask,
        }
    }
}

impl<B: Backend> Batcher<String, TextClassificationInferenceBatch<B>>
    for TextClassificationBatcher<B>
{
    fn batch(&self, items: Vec<String>) -> TextClassificationInferenceBatch<B> {
        let tokens_list = items
            .iter()
            .map(|item| self.encode_augmented(item))
            .collect();

        let mask = generate_padding_mask(
            self.tokenizer.pad_token(),
            tokens_list,
            Some(self.max_seq_length),
            &self.device,
        );

        TextClassificationInferenceBatch {
            tokens: mask.tensor.to_device(&self.device),
            mask_pad: mask.mask.to_device(&self.device),
        }
    }
}
