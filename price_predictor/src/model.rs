use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

/// A trained regression model over preprocessed feature vectors.
pub trait Regressor: Send + Sync {
    /// Expected feature vector length, if the artifact records one.
    fn input_dim(&self) -> Option<usize>;

    /// Price for one preprocessed row.
    fn predict(&self, x: &[f32]) -> Result<f32>;
}

/// Serialized form of a linear model: `intercept + coefficients · x`.
#[derive(Deserialize)]
struct LinearJson {
    intercept: f64,
    coefficients: Vec<f64>,
}

pub struct LinearRegressor {
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LinearRegressor {
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Self {
        Self { intercept, coefficients }
    }

    pub fn load(model_path: &str) -> Result<Self> {
        let txt = fs::read_to_string(Path::new(model_path))
            .with_context(|| format!("failed to read model at {}", model_path))?;
        let m: LinearJson =
            serde_json::from_str(&txt).with_context(|| "failed to parse linear model json")?;
        if m.coefficients.is_empty() {
            bail!("linear model has no coefficients");
        }
        Ok(Self::new(m.intercept, m.coefficients))
    }
}

impl Regressor for LinearRegressor {
    fn input_dim(&self) -> Option<usize> {
        Some(self.coefficients.len())
    }

    fn predict(&self, x: &[f32]) -> Result<f32> {
        if x.len() != self.coefficients.len() {
            bail!(
                "feature length mismatch: got {}, expected {}",
                x.len(),
                self.coefficients.len()
            );
        }
        let y = self.intercept
            + self
                .coefficients
                .iter()
                .zip(x)
                .map(|(w, v)| w * f64::from(*v))
                .sum::<f64>();
        Ok(y as f32)
    }
}

#[cfg(feature = "torch")]
pub use torch::TorchRegressor;

#[cfg(feature = "torch")]
mod torch {
    use super::Regressor;
    use anyhow::{bail, Context, Result};
    use tch::{kind::Kind, CModule, Device, Tensor};

    /// TorchScript export of the regressor. Output shape `[1]` or `[1, 1]`.
    pub struct TorchRegressor {
        model: CModule,
        device: Device,
        in_dim: usize,
    }

    impl TorchRegressor {
        pub fn load(model_path: &str, in_dim: usize) -> Result<Self> {
            let device = Device::Cpu;
            let model = CModule::load_on_device(model_path, device)
                .with_context(|| format!("failed to load TorchScript {}", model_path))?;

            // Probe output shape with a dummy forward
            let dummy = Tensor::zeros([1, in_dim as i64], (Kind::Float, device));
            let t = model.forward_ts(&[dummy])?;
            let sz = t.size();
            if sz.iter().product::<i64>() != 1 {
                bail!("unexpected model output size: {:?}", sz);
            }

            Ok(Self { model, device, in_dim })
        }
    }

    impl Regressor for TorchRegressor {
        fn input_dim(&self) -> Option<usize> {
            Some(self.in_dim)
        }

        fn predict(&self, x: &[f32]) -> Result<f32> {
            if x.len() != self.in_dim {
                bail!("feature length mismatch: got {}, expected {}", x.len(), self.in_dim);
            }
            let input = Tensor::from_slice(x)
                .reshape([1, self.in_dim as i64])
                .to_device(self.device);
            let t = self.model.forward_ts(&[input])?;
            Ok(t.reshape([-1]).double_value(&[0]) as f32)
        }
    }
}
