// Loads a trained model from an artifact directory and runs it: `infer`
// prints per-sample predictions, `evaluate` computes accuracy over a
// dataset. A missing checkpoint surfaces as CheckpointError::NotFound so
// callers can fall back to training from scratch instead of failing.

use crate::{
    data_processing::{
        BertCasedTokenizer, NgramAugmenter, TextClassificationBatcher, TextClassificationDataset,
        TextClassificationInferenceBatch, Tokenizer,
    },
    model::{FastTextModel, FastTextModelConfig, FastTextModelRecord},
    training::FastTextTrainingConfig,
};
use burn::{
    config::{Config, ConfigError},
    data::dataloader::{batcher::Batcher, DataLoader, DataLoaderBuilder},
    record::{CompactRecorder, Recorder, RecorderError},
    tensor::backend::Backend,
    tensor::ElementConversion,
};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("no saved model at {0}")]
    NotFound(String),
    #[error("failed to load experiment config: {0}")]
    Config(ConfigError),
    #[error("failed to load model weights: {0}")]
    Recorder(RecorderError),
}

fn load_training_config(artifact_dir: &str) -> Result<FastTextTrainingConfig, CheckpointError> {
    let path = format!("{artifact_dir}/config.json");
    if !Path::new(&path).exists() {
        return Err(CheckpointError::NotFound(path));
    }
    FastTextTrainingConfig::load(&path).map_err(CheckpointError::Config)
}

fn load_model<B: Backend, D: TextClassificationDataset>(
    config: &FastTextTrainingConfig,
    augmenter: &NgramAugmenter,
    device: &B::Device,
    artifact_dir: &str,
) -> Result<FastTextModel<B>, CheckpointError> {
    let record: FastTextModelRecord<B> = CompactRecorder::new()
        .load(format!("{artifact_dir}/model").into(), device)
        .map_err(|err| match err {
            RecorderError::FileNotFound(path) => CheckpointError::NotFound(path),
            err => CheckpointError::Recorder(err),
        })?;

    Ok(FastTextModelConfig::new(
        augmenter.feature_space_size(),
        config.embedding_size,
        D::num_classes(),
    )
    .init_with(record))
}

/// Runs the trained classifier on text samples and prints the predicted
/// class with its probabilities for each one.
pub fn infer<B: Backend, D: TextClassificationDataset + 'static>(
    device: B::Device,
    artifact_dir: &str,
    samples: Vec<String>,
) -> Result<(), CheckpointError> {
    let config = load_training_config(artifact_dir)?;

    let tokenizer = Arc::new(BertCasedTokenizer::default());
    let augmenter = NgramAugmenter::new(tokenizer.vocab_size(), config.n_buckets, config.n_gram)
        .expect("valid n-gram augmentation parameters");

    let batcher = TextClassificationBatcher::<B>::new(
        tokenizer,
        augmenter.clone(),
        device.clone(),
        config.max_seq_length,
    );

    let model = load_model::<B, D>(&config, &augmenter, &device, artifact_dir)?;

    let item = batcher.batch(samples.clone());
    let predictions = model.inference(item);

    samples.into_iter().enumerate().for_each(|(i, text)| {
        let prediction = predictions.clone().slice([i..i + 1]);
        let probabilities = prediction.clone().to_data();
        let class_index = prediction.argmax(1).into_data().convert::<i32>().value[0] as usize;
        let class = D::class_name(class_index);

        println!(
            "\n=== Item {i} ===\n- Text: {text}\n- Probabilities: {probabilities}\n- Prediction: \
             {class}\n================"
        );
    });

    Ok(())
}

/// Computes classification accuracy of the saved model over a dataset.
pub fn evaluate<B: Backend, D: TextClassificationDataset + 'static>(
    device: B::Device,
    artifact_dir: &str,
    dataset: D,
) -> Result<f32, CheckpointError> {
    let config = load_training_config(artifact_dir)?;

    let tokenizer = Arc::new(BertCasedTokenizer::default());
    let augmenter = NgramAugmenter::new(tokenizer.vocab_size(), config.n_buckets, config.n_gram)
        .expect("valid n-gram augmentation parameters");

    let batcher = TextClassificationBatcher::<B>::new(
        tokenizer,
        augmenter.clone(),
        device.clone(),
        config.max_seq_length,
    );

    let model = load_model::<B, D>(&config, &augmenter, &device, artifact_dir)?;

    let dataloader = DataLoaderBuilder::new(batcher)
        .batch_size(config.batch_size)
        .num_workers(1)
        .build(dataset);

    let mut correct = 0usize;
    let mut total = 0usize;
    for batch in dataloader.iter() {
        let [batch_size, _seq_length] = batch.tokens.dims();
        let targets = batch.labels.clone();

        let probabilities = model.inference(TextClassificationInferenceBatch::new(
            batch.tokens,
            batch.mask_pad,
        ));
        let predictions = probabilities.argmax(1).reshape([batch_size]);

        correct += predictions
            .equal(targets)
            .int()
            .sum()
            .into_scalar()
            .elem::<i64>() as usize;
        total += batch_size;
    }

    Ok(correct as f32 / total as f32)
}
