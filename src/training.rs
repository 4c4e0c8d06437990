// Trains the FastText classifier. Wires the tokenizer, the n-gram feature
// augmenter and the batchers into burn dataloaders, builds the Learner with
// accuracy and loss metrics, fits the model with Adam at a constant learning
// rate, and saves the experiment config plus the trained weights into the
// artifact directory.

use crate::{
    data_processing::{
        BertCasedTokenizer, NgramAugmenter, TextClassificationBatcher, TextClassificationDataset,
        Tokenizer,
    },
    model::FastTextModelConfig,
};
use burn::{
    config::Config,
    data::{dataloader::DataLoaderBuilder, dataset::transform::SamplerDataset},
    module::Module,
    optim::AdamConfig,
    record::{CompactRecorder, Recorder},
    tensor::backend::AutodiffBackend,
    train::{
        metric::{AccuracyMetric, LossMetric},
        LearnerBuilder,
    },
};
use std::sync::Arc;

#[derive(Config)]
pub struct FastTextTrainingConfig {
    pub optimizer: AdamConfig,
    /// Hashed n-grams with 1 < n <= n_gram are added to the unigram features.
    #[config(default = 2)]
    pub n_gram: usize,
    /// Number of buckets used for hashing n-grams.
    #[config(default = 1_000_000)]
    pub n_buckets: usize,
    #[config(default = 50)]
    pub embedding_size: usize,
    #[config(default = 256)]
    pub max_seq_length: usize,
    #[config(default = 32)]
    pub batch_size: usize,
    #[config(default = 5)]
    pub num_epochs: usize,
    #[config(default = 1.0e-2)]
    pub learning_rate: f64,
}

pub fn train<B, D>(
    devices: Vec<B::Device>,
    dataset_train: D,
    dataset_test: D,
    config: FastTextTrainingConfig,
    artifact_dir: &str,
) where
    B: AutodiffBackend,
    D: TextClassificationDataset + 'static,
{
    let tokenizer = Arc::new(BertCasedTokenizer::default());
    let augmenter = NgramAugmenter::new(tokenizer.vocab_size(), config.n_buckets, config.n_gram)
        .expect("valid n-gram augmentation parameters");

    let batcher_train = TextClassificationBatcher::<B>::new(
        tokenizer.clone(),
        augmenter.clone(),
        devices[0].clone(),
        config.max_seq_length,
    );

    let batcher_test = TextClassificationBatcher::<B::InnerBackend>::new(
        tokenizer.clone(),
        augmenter.clone(),
        devices[0].clone(),
        config.max_seq_length,
    );

    // The embedding table spans unigrams plus hashed n-gram buckets.
    let model = FastTextModelConfig::new(
        augmenter.feature_space_size(),
        config.embedding_size,
        D::num_classes(),
    )
    .init(&devices[0]);

    let dataloader_train = DataLoaderBuilder::new(batcher_train)
        .batch_size(config.batch_size)
        .num_workers(1)
        .build(SamplerDataset::new(dataset_train, 25_000));

    let dataloader_test = DataLoaderBuilder::new(batcher_test)
        .batch_size(config.batch_size)
        .num_workers(1)
        .build(SamplerDataset::new(dataset_test, 5_000));

    let optim = config.optimizer.init();

    let learner = LearnerBuilder::new(artifact_dir)
        .metric_train_numeric(AccuracyMetric::new())
        .metric_valid_numeric(AccuracyMetric::new())
        .metric_train_numeric(LossMetric::new())
        .metric_valid_numeric(LossMetric::new())
        .with_file_checkpointer(CompactRecorder::new())
        .devices(devices)
        .num_epochs(config.num_epochs)
        .build(model, optim, config.learning_rate);

    let model_trained = learner.fit(dataloader_train, dataloader_test);

    config
        .save(format!("{artifact_dir}/config.json"))
        .expect("save experiment config");
    CompactRecorder::new()
        .record(
            model_trained.into_record(),
            format!("{artifact_dir}/model").into(),
        )
        .expect("save trained model weights");
}
