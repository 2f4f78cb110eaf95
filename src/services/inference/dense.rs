use serde::Deserialize;
use std::path::Path;

use super::{load_weights, ContentModel, InferenceError, RatingMatrix};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    Linear,
    Relu,
    Sigmoid,
}

impl Activation {
    fn apply(self, x: f32) -> f32 {
        match self {
            Activation::Linear => x,
            Activation::Relu => x.max(0.0),
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
        }
    }
}

/// Single dense layer mapping a rating row to predicted preferences
///
/// `output[j] = activation(Σ_i input[i] · weights[i][j] + bias[j])`, with one
/// input and one output per catalog article.
#[derive(Debug, Clone, Deserialize)]
pub struct DenseContentModel {
    weights: Vec<Vec<f32>>,
    bias: Vec<f32>,
    #[serde(default)]
    activation: Activation,
}

impl DenseContentModel {
    pub fn new(
        weights: Vec<Vec<f32>>,
        bias: Vec<f32>,
        activation: Activation,
    ) -> Result<Self, InferenceError> {
        let model = Self {
            weights,
            bias,
            activation,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        let model: Self = load_weights(path)?;
        model.validate()?;
        Ok(model)
    }

    pub fn num_articles(&self) -> usize {
        self.bias.len()
    }

    fn validate(&self) -> Result<(), InferenceError> {
        let n = self.bias.len();
        if self.weights.len() != n || self.weights.iter().any(|row| row.len() != n) {
            return Err(InferenceError::InvalidWeights(format!(
                "weights must be a {n}×{n} matrix matching the bias length"
            )));
        }
        Ok(())
    }
}

impl ContentModel for DenseContentModel {
    fn predict(&self, ratings: &RatingMatrix) -> Result<RatingMatrix, InferenceError> {
        let n = self.num_articles();
        if ratings.cols() != n {
            return Err(InferenceError::ShapeMismatch {
                expected: n,
                actual: ratings.cols(),
            });
        }

        let mut output = RatingMatrix::zeros(ratings.rows(), n);
        for row in 0..ratings.rows() {
            let input = ratings.row(row);
            for out in 0..n {
                let sum: f32 = input
                    .iter()
                    .zip(self.weights.iter())
                    .map(|(x, weights)| x * weights[out])
                    .sum();
                output.set(row, out, self.activation.apply(sum + self.bias[out]));
            }
        }
        Ok(output)
    }
}
