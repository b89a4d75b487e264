use serde::Deserialize;
use std::{fs, path::Path};
use thiserror::Error;

use crate::types::CarDescription;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("failed to read preprocessor at {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse preprocessor: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unknown {kind} column '{name}'")]
    UnknownColumn { kind: &'static str, name: String },
    #[error("column '{0}' has a zero or non-finite scale")]
    BadScale(String),
    #[error("categorical column '{0}' has no fitted categories")]
    NoCategories(String),
    #[error("preprocessor produces no features")]
    Empty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NumericColumn {
    pub name: String,
    pub mean: f64,
    pub scale: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoricalColumn {
    pub name: String,
    pub categories: Vec<String>,
}

/// Feature transformation fitted at training time.
///
/// Layout of the output vector: standardized numeric columns, then one-hot
/// blocks of the categorical columns, then the boolean flags as 0/1, each in
/// artifact order. A category the encoder never saw encodes as all zeros.
#[derive(Debug, Clone, Deserialize)]
pub struct FeaturePreprocessor {
    #[serde(default)]
    numeric: Vec<NumericColumn>,
    #[serde(default)]
    categorical: Vec<CategoricalColumn>,
    #[serde(default)]
    passthrough: Vec<String>,
}

impl FeaturePreprocessor {
    pub fn load(path: &str) -> Result<Self, PreprocessError> {
        let txt = fs::read_to_string(Path::new(path)).map_err(|source| PreprocessError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&txt)
    }

    pub fn from_json(txt: &str) -> Result<Self, PreprocessError> {
        let pre: FeaturePreprocessor = serde_json::from_str(txt)?;
        pre.check()?;
        Ok(pre)
    }

    // Every column must resolve against CarDescription, so transform never
    // has to fail on a validated request.
    fn check(&self) -> Result<(), PreprocessError> {
        let probe = CarDescription::probe();
        for col in &self.numeric {
            if probe.numeric(&col.name).is_none() {
                return Err(PreprocessError::UnknownColumn { kind: "numeric", name: col.name.clone() });
            }
            if !col.scale.is_finite() || col.scale == 0.0 || !col.mean.is_finite() {
                return Err(PreprocessError::BadScale(col.name.clone()));
            }
        }
        for col in &self.categorical {
            if probe.categorical(&col.name).is_none() {
                return Err(PreprocessError::UnknownColumn {
                    kind: "categorical",
                    name: col.name.clone(),
                });
            }
            if col.categories.is_empty() {
                return Err(PreprocessError::NoCategories(col.name.clone()));
            }
        }
        for name in &self.passthrough {
            if probe.flag(name).is_none() {
                return Err(PreprocessError::UnknownColumn { kind: "boolean", name: name.clone() });
            }
        }
        if self.width() == 0 {
            return Err(PreprocessError::Empty);
        }
        Ok(())
    }

    /// Length of every vector `transform` returns.
    pub fn width(&self) -> usize {
        self.numeric.len()
            + self.categorical.iter().map(|c| c.categories.len()).sum::<usize>()
            + self.passthrough.len()
    }

    /// Output feature names, e.g. `mileage`, `fuel=diesel`, `has_gps`.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.width());
        names.extend(self.numeric.iter().map(|c| c.name.clone()));
        for col in &self.categorical {
            names.extend(col.categories.iter().map(|cat| format!("{}={}", col.name, cat)));
        }
        names.extend(self.passthrough.iter().cloned());
        names
    }

    pub fn transform(&self, car: &CarDescription) -> Vec<f32> {
        let mut v = Vec::with_capacity(self.width());
        for col in &self.numeric {
            let x = car.numeric(&col.name).unwrap_or(col.mean);
            v.push(((x - col.mean) / col.scale) as f32);
        }
        for col in &self.categorical {
            let value = car.categorical(&col.name);
            for cat in &col.categories {
                v.push(if value == Some(cat.as_str()) { 1.0 } else { 0.0 });
            }
        }
        for name in &self.passthrough {
            v.push(if car.flag(name).unwrap_or(false) { 1.0 } else { 0.0 });
        }
        v
    }
}
