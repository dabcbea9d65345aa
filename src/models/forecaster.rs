// src/models/forecaster.rs

use std::path::{Path, PathBuf};

use log::debug;
use ndarray::{Array1, Array2, Array3, Axis};
use rand::thread_rng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("model artifact {path}: {message}")]
    Artifact { path: String, message: String },
    #[error("expected input of shape (N, {window}, 1), got {actual:?}")]
    ShapeMismatch { window: usize, actual: Vec<usize> },
    #[error("model is inconsistent: {0}")]
    InvalidModel(String),
}

/// Batch inference over scaled price windows.
///
/// Inputs have shape `(N, window, 1)`, outputs `(N, 1)`, both in scaled units.
pub trait Forecaster: Send + Sync {
    fn predict_batch(&self, inputs: &Array3<f64>) -> Result<Array2<f64>, ForecastError>;
}

/// A single dense unit
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Neuron {
    pub bias: f64,
    pub weights: Vec<f64>,
}

impl Neuron {
    /// Creates a new Neuron with Xavier-uniform weights and bias.
    pub fn new(input_size: usize) -> Self {
        let mut rng = thread_rng();
        let limit = (6.0 / input_size.max(1) as f64).sqrt();
        Neuron {
            bias: rng.gen_range(-limit..limit),
            weights: (0..input_size).map(|_| rng.gen_range(-limit..limit)).collect(),
        }
    }
}

/// Window -> ReLU hidden layer -> linear output.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DenseForecaster {
    pub window: usize,
    pub hidden: Vec<Neuron>,
    pub output: Neuron,
}

impl DenseForecaster {
    /// Creates an untrained forecaster with randomly initialised weights.
    pub fn new(window: usize, hidden_size: usize) -> Self {
        DenseForecaster {
            window,
            hidden: (0..hidden_size).map(|_| Neuron::new(window)).collect(),
            output: Neuron::new(hidden_size),
        }
    }

    /// Checks that every weight vector matches the layer it feeds from.
    pub fn validate(&self) -> Result<(), ForecastError> {
        if self.window == 0 || self.hidden.is_empty() {
            return Err(ForecastError::InvalidModel(
                "window and hidden layer must be non-empty".to_string(),
            ));
        }
        if let Some(i) = self.hidden.iter().position(|n| n.weights.len() != self.window) {
            return Err(ForecastError::InvalidModel(format!(
                "hidden neuron {} has {} weights, window is {}",
                i,
                self.hidden[i].weights.len(),
                self.window
            )));
        }
        if self.output.weights.len() != self.hidden.len() {
            return Err(ForecastError::InvalidModel(format!(
                "output neuron has {} weights for {} hidden units",
                self.output.weights.len(),
                self.hidden.len()
            )));
        }
        Ok(())
    }

    /// Saves the forecaster to a file in JSON format.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ForecastError> {
        let path = path.as_ref();
        let artifact_err = |message: String| ForecastError::Artifact {
            path: path.display().to_string(),
            message,
        };
        let serialized = serde_json::to_string(self).map_err(|e| artifact_err(e.to_string()))?;
        std::fs::write(path, serialized).map_err(|e| artifact_err(e.to_string()))?;
        Ok(())
    }

    /// Loads and validates a forecaster from a JSON file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ForecastError> {
        let path = path.as_ref();
        let artifact_err = |message: String| ForecastError::Artifact {
            path: path.display().to_string(),
            message,
        };
        let data = std::fs::read_to_string(path).map_err(|e| artifact_err(e.to_string()))?;
        let model: DenseForecaster =
            serde_json::from_str(&data).map_err(|e| artifact_err(e.to_string()))?;
        model.validate()?;
        Ok(model)
    }

    fn hidden_weights(&self) -> Result<Array2<f64>, ForecastError> {
        let flat: Vec<f64> = self.hidden.iter().flat_map(|n| n.weights.iter().copied()).collect();
        Array2::from_shape_vec((self.hidden.len(), self.window), flat)
            .map_err(|e| ForecastError::InvalidModel(e.to_string()))
    }
}

impl Forecaster for DenseForecaster {
    fn predict_batch(&self, inputs: &Array3<f64>) -> Result<Array2<f64>, ForecastError> {
        let shape = inputs.shape();
        if shape[1] != self.window || shape[2] != 1 {
            return Err(ForecastError::ShapeMismatch {
                window: self.window,
                actual: shape.to_vec(),
            });
        }
        self.validate()?;

        let x = inputs.index_axis(Axis(2), 0);
        let hidden_bias: Array1<f64> = self.hidden.iter().map(|n| n.bias).collect();
        let activations = (x.dot(&self.hidden_weights()?.t()) + &hidden_bias).mapv(relu);

        let output_weights = Array1::from_vec(self.output.weights.clone());
        let out = activations.dot(&output_weights) + self.output.bias;
        debug!("Predicted {} windows of length {}", out.len(), self.window);

        Ok(out.insert_axis(Axis(1)))
    }
}

/// Reloads a [`DenseForecaster`] from a fixed path on every batch.
#[derive(Debug, Clone)]
pub struct ArtifactForecaster {
    path: PathBuf,
}

impl ArtifactForecaster {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ArtifactForecaster { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Forecaster for ArtifactForecaster {
    fn predict_batch(&self, inputs: &Array3<f64>) -> Result<Array2<f64>, ForecastError> {
        let model = DenseForecaster::load_from_file(&self.path)?;
        debug!("Loaded model artifact from {}", self.path.display());
        model.predict_batch(inputs)
    }
}

/// ReLU activation function
fn relu(x: f64) -> f64 {
    if x > 0.0 { x } else { 0.0 }
}
