// FastText-style classifier: one embedding table over the combined
// unigram-plus-bucket feature space, averaged across non-padding positions,
// followed by a small hidden layer and a linear output head. The averaged
// bag of features ignores ordering; word order only enters through the
// hashed n-gram features themselves.

use crate::data_processing::{TextClassificationInferenceBatch, TextClassificationTrainingBatch};
use burn::{
    config::Config,
    module::Module,
    nn::{
        loss::CrossEntropyLossConfig, Embedding, EmbeddingConfig, Linear, LinearConfig,
    },
    tensor::backend::{AutodiffBackend, Backend},
    tensor::{activation::softmax, Bool, Int, Tensor},
    train::{ClassificationOutput, TrainOutput, TrainStep, ValidStep},
};

#[derive(Module, Debug)]
pub struct FastTextModel<B: Backend> {
    embedding: Embedding<B>,
    hidden: Linear<B>,
    output: Linear<B>,
    embedding_size: usize,
    n_classes: usize,
}

#[derive(Config)]
pub struct FastTextModelConfig {
    /// Size of the embedding table, `vocab_size + n_buckets`.
    pub feature_space_size: usize,
    pub embedding_size: usize,
    pub n_classes: usize,
    #[config(default = 10)]
    pub hidden_size: usize,
}

impl FastTextModelConfig {
    /// Initializes the model with random weights.
    pub fn init<B: Backend>(&self, device: &B::Device) -> FastTextModel<B> {
        FastTextModel {
            embedding: EmbeddingConfig::new(self.feature_space_size, self.embedding_size)
                .init(device),
            hidden: LinearConfig::new(self.embedding_size, self.hidden_size).init(device),
            output: LinearConfig::new(self.hidden_size, self.n_classes).init(device),
            embedding_size: self.embedding_size,
            n_classes: self.n_classes,
        }
    }

    /// Initializes the model from a saved record.
    pub fn init_with<B: Backend>(&self, record: FastTextModelRecord<B>) -> FastTextModel<B> {
        FastTextModel {
            embedding: EmbeddingConfig::new(self.feature_space_size, self.embedding_size)
                .init_with(record.embedding),
            hidden: LinearConfig::new(self.embedding_size, self.hidden_size)
                .init_with(record.hidden),
            output: LinearConfig::new(self.hidden_size, self.n_classes).init_with(record.output),
            embedding_size: self.embedding_size,
            n_classes: self.n_classes,
        }
    }
}

impl<B: Backend> FastTextModel<B> {
    /// Forward pass for training, producing cross-entropy loss.
    pub fn forward(&self, item: TextClassificationTrainingBatch<B>) -> ClassificationOutput<B> {
        let device = &self.embedding.devices()[0];

        let tokens = item.tokens.to_device(device);
        let labels = item.labels.to_device(device);
        let mask_pad = item.mask_pad.to_device(device);

        let pooled = self.averaged_embedding(tokens, mask_pad);
        let logits = self.output.forward(self.hidden.forward(pooled));

        let loss = CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits.clone(), labels.clone());

        ClassificationOutput {
            loss,
            output: logits,
            targets: labels,
        }
    }

    /// Forward pass for inference, producing class probabilities.
    pub fn inference(&self, item: TextClassificationInferenceBatch<B>) -> Tensor<B, 2> {
        let device = &self.embedding.devices()[0];

        let tokens = item.tokens.to_device(device);
        let mask_pad = item.mask_pad.to_device(device);

        let pooled = self.averaged_embedding(tokens, mask_pad);
        let logits = self.output.forward(self.hidden.forward(pooled));

        softmax(logits, 1)
    }

    /// Embeds the feature ids and averages them over non-padding positions.
    /// Rows that are entirely padding average over a clamped count of one and
    /// come out as the zero vector.
    fn averaged_embedding(
        &self,
        tokens: Tensor<B, 2, Int>,
        mask_pad: Tensor<B, 2, Bool>,
    ) -> Tensor<B, 2> {
        let [batch_size, seq_length] = tokens.dims();

        // 1.0 at real feature positions, 0.0 at padding.
        let weights = mask_pad.bool_not().int().float();

        let embedded = self.embedding.forward(tokens);
        let masked = embedded
            * weights
                .clone()
                .reshape([batch_size, seq_length, 1])
                .repeat(2, self.embedding_size);

        let summed = masked
            .sum_dim(1)
            .reshape([batch_size, self.embedding_size]);
        let counts = weights
            .sum_dim(1)
            .clamp_min(1.0)
            .repeat(1, self.embedding_size);

        summed / counts
    }
}

impl<B: AutodiffBackend> TrainStep<TextClassificationTrainingBatch<B>, ClassificationOutput<B>>
    for FastTextModel<B>
{
    fn step(&self, item: TextClassificationTrainingBatch<B>) -> TrainOutput<ClassificationOutput<B>> {
        let item = self.forward(item);
        let grads = item.loss.backward();

        TrainOutput::new(self, grads, item)
    }
}

impl<B: Backend> ValidStep<TextClassificationTrainingBatch<B>, ClassificationOutput<B>>
    for FastTextModel<B>
{
    fn step(&self, item: TextClassificationTrainingBatch<B>) -> ClassificationOutput<B> {
        self.forward(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::ndarray::NdArray;
    use burn::tensor::Data;

    type TestBackend = NdArray<f32>;

    fn small_model(device: &<TestBackend as Backend>::Device) -> FastTextModel<TestBackend> {
        FastTextModelConfig::new(40, 8, 2).init(device)
    }

    fn inference_batch(
        device: &<TestBackend as Backend>::Device,
    ) -> TextClassificationInferenceBatch<TestBackend> {
        let tokens = Tensor::from_data(
            Data::<i64, 2>::from([[1i64, 2, 35, 0], [3, 36, 0, 0]]).convert(),
            device,
        );
        let mask_pad = Tensor::from_data(
            Data::from([
                [false, false, false, true],
                [false, false, true, true],
            ]),
            device,
        );
        TextClassificationInferenceBatch::new(tokens, mask_pad)
    }

    #[test]
    fn inference_yields_a_probability_per_class() {
        let device = Default::default();
        let model = small_model(&device);

        let probs = model.inference(inference_batch(&device));
        assert_eq!(probs.dims(), [2, 2]);

        let row_sums = probs.sum_dim(1).into_data().value;
        for sum in row_sums {
            assert!((sum - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn forward_produces_finite_loss_and_logits() {
        let device = Default::default();
        let model = small_model(&device);

        let tokens = Tensor::from_data(
            Data::<i64, 2>::from([[1i64, 2, 35, 0], [3, 36, 0, 0]]).convert(),
            &device,
        );
        let mask_pad = Tensor::from_data(
            Data::from([
                [false, false, false, true],
                [false, false, true, true],
            ]),
            &device,
        );
        let labels = Tensor::from_data(Data::from([1i64, 0]).convert(), &device);

        let output = model.forward(TextClassificationTrainingBatch::new(tokens, labels, mask_pad));
        assert_eq!(output.output.dims(), [2, 2]);
        assert_eq!(output.targets.dims(), [2]);
        assert!(output.loss.into_data().value[0].is_finite());
    }

    #[test]
    fn padding_does_not_change_the_averaged_prediction() {
        let device = Default::default();
        let model = small_model(&device);

        let unpadded = TextClassificationInferenceBatch::new(
            Tensor::from_data(Data::<i64, 2>::from([[1i64, 2, 35]]).convert(), &device),
            Tensor::from_data(Data::from([[false, false, false]]), &device),
        );
        let padded = TextClassificationInferenceBatch::new(
            Tensor::from_data(Data::<i64, 2>::from([[1i64, 2, 35, 0, 0]]).convert(), &device),
            Tensor::from_data(Data::from([[false, false, false, true, true]]), &device),
        );

        let lhs = model.inference(unpadded).into_data().value;
        let rhs = model.inference(padded).into_data().value;
        for (a, b) in lhs.into_iter().zip(rhs) {
            assert!((a - b).abs() < 1e-5);
        }
    }
}
