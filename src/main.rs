use burn::optim::AdamConfig;
use burn::tensor::backend::AutodiffBackend;
use fasttext_imdb::inference::{self, CheckpointError};
use fasttext_imdb::training::{self, FastTextTrainingConfig};
use fasttext_imdb::ImdbDataset;

#[cfg(not(feature = "f16"))]
#[allow(dead_code)]
type ElemType = f32;
#[cfg(feature = "f16")]
type ElemType = burn::tensor::f16;

static ARTIFACT_DIR: &str = "/tmp/fasttext-imdb";

pub fn launch<B: AutodiffBackend>(devices: Vec<B::Device>) {
    // Reuse a previously trained model when one exists, otherwise train from
    // scratch first.
    let accuracy = match inference::evaluate::<B::InnerBackend, ImdbDataset>(
        devices[0].clone(),
        ARTIFACT_DIR,
        ImdbDataset::test(),
    ) {
        Ok(accuracy) => accuracy,
        Err(CheckpointError::NotFound(_)) => {
            let config = FastTextTrainingConfig::new(AdamConfig::new());
            training::train::<B, ImdbDataset>(
                devices.clone(),
                ImdbDataset::train(),
                ImdbDataset::test(),
                config,
                ARTIFACT_DIR,
            );
            inference::evaluate::<B::InnerBackend, ImdbDataset>(
                devices[0].clone(),
                ARTIFACT_DIR,
                ImdbDataset::test(),
            )
            .expect("trained model weights")
        }
        Err(err) => panic!("failed to load saved model: {err}"),
    };
    println!("Test accuracy: {accuracy:.5}");

    inference::infer::<B::InnerBackend, ImdbDataset>(
        devices[0].clone(),
        ARTIFACT_DIR,
        vec![
            "A heartfelt story with wonderful performances all around.".to_string(),
            "Dull, predictable and far too long. I walked out halfway.".to_string(),
        ],
    )
    .expect("trained model weights");
}

#[cfg(all(feature = "ndarray", not(feature = "wgpu")))]
mod ndarray {
    use crate::{launch, ElemType};
    use burn::backend::ndarray::{NdArray, NdArrayDevice};
    use burn::backend::Autodiff;

    pub fn run() {
        launch::<Autodiff<NdArray<ElemType>>>(vec![NdArrayDevice::Cpu]);
    }
}

#[cfg(feature = "wgpu")]
mod wgpu {
    use crate::{launch, ElemType};
    use burn::backend::wgpu::{AutoGraphicsApi, Wgpu, WgpuDevice};
    use burn::backend::Autodiff;

    pub fn run() {
        launch::<Autodiff<Wgpu<AutoGraphicsApi, ElemType, i32>>>(vec![WgpuDevice::default()]);
    }
}

fn main() {
    #[cfg(all(feature = "ndarray", not(feature = "wgpu")))]
    ndarray::run();
    #[cfg(feature = "wgpu")]
    wgpu::run();
}
