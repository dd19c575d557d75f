/// Captcha OCR: image preprocessing plus ONNX inference.
///
/// The pre-trained model lives in `<resources>/models/captcha_model.onnx`
/// with a metadata sidecar describing the input shape, the per-channel
/// normalization and the index-to-character table. One inference pass
/// yields one output head per character position.
use std::collections::HashMap;
use std::path::Path;

use image::imageops::FilterType;
use serde::Deserialize;
use tract_onnx::prelude::*;

/// Number of characters in a captcha challenge
const CAPTCHA_LEN: usize = 4;

#[derive(Debug)]
pub enum SolverError {
    /// Model or metadata file missing/unreadable
    Io(std::io::Error),
    /// Metadata sidecar could not be parsed
    Metadata(String),
    /// tract failed to load or run the model
    Model(String),
    /// The challenge bytes are not a decodable image
    Image(image::ImageError),
    /// Inference produced an output the metadata table cannot decode
    BadOutput,
}

impl std::fmt::Display for SolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverError::Io(e) => write!(f, "captcha model file error: {}", e),
            SolverError::Metadata(msg) => write!(f, "captcha model metadata error: {}", msg),
            SolverError::Model(msg) => write!(f, "captcha inference error: {}", msg),
            SolverError::Image(e) => write!(f, "captcha image error: {}", e),
            SolverError::BadOutput => write!(f, "captcha inference produced undecodable output"),
        }
    }
}

impl std::error::Error for SolverError {}

#[derive(Debug, Clone, Deserialize)]
struct Normalization {
    mean: Vec<f32>,
    std: Vec<f32>,
}

/// Metadata sidecar shipped next to the ONNX file
#[derive(Debug, Clone, Deserialize)]
pub struct ModelMetadata {
    input_shape: Vec<usize>,
    normalization: Normalization,
    idx_to_char: HashMap<String, String>,
}

impl ModelMetadata {
    fn parse(raw: &str) -> Result<Self, SolverError> {
        let metadata: ModelMetadata =
            serde_json::from_str(raw).map_err(|e| SolverError::Metadata(e.to_string()))?;

        if metadata.input_shape.len() < 3 {
            return Err(SolverError::Metadata(format!(
                "input_shape has {} dimensions, expected at least 3",
                metadata.input_shape.len()
            )));
        }
        if metadata.normalization.mean.is_empty() || metadata.normalization.std.is_empty() {
            return Err(SolverError::Metadata(
                "normalization mean/std must not be empty".to_string(),
            ));
        }
        Ok(metadata)
    }

    /// (height, width) of the model input
    fn dimensions(&self) -> (usize, usize) {
        (self.input_shape[1], self.input_shape[2])
    }
}

/// Loaded captcha model, shared read-only across redeem runs
pub struct CaptchaModel {
    plan: TypedRunnableModel<TypedModel>,
    metadata: ModelMetadata,
}

impl CaptchaModel {
    /// Load the model and its metadata from `<resources>/models/`
    pub fn load(resources: &Path) -> Result<Self, SolverError> {
        let model_path = resources.join("models").join("captcha_model.onnx");
        let metadata_path = resources.join("models").join("captcha_model_metadata.json");

        let raw = std::fs::read_to_string(&metadata_path).map_err(SolverError::Io)?;
        let metadata = ModelMetadata::parse(&raw)?;
        let (height, width) = metadata.dimensions();

        let plan = tract_onnx::onnx()
            .model_for_path(&model_path)
            .map_err(|e| SolverError::Model(e.to_string()))?
            .with_input_fact(0, f32::fact([1, 1, height, width]).into())
            .map_err(|e| SolverError::Model(e.to_string()))?
            .into_optimized()
            .map_err(|e| SolverError::Model(e.to_string()))?
            .into_runnable()
            .map_err(|e| SolverError::Model(e.to_string()))?;

        Ok(Self { plan, metadata })
    }

    /// Solve a captcha challenge from raw image bytes
    pub fn solve(&self, image_bytes: &[u8]) -> Result<String, SolverError> {
        let (height, width) = self.metadata.dimensions();

        let image = image::load_from_memory(image_bytes).map_err(SolverError::Image)?;
        let gray = image.to_luma8();
        let resized = image::imageops::resize(
            &gray,
            width as u32,
            height as u32,
            FilterType::Lanczos3,
        );

        let pixels = normalize_pixels(
            resized.as_raw(),
            self.metadata.normalization.mean[0],
            self.metadata.normalization.std[0],
        );

        let input = tract_ndarray::Array4::from_shape_vec((1, 1, height, width), pixels)
            .map_err(|e| SolverError::Model(e.to_string()))?;
        let outputs = self
            .plan
            .run(tvec!(Tensor::from(input).into()))
            .map_err(|e| SolverError::Model(e.to_string()))?;

        if outputs.len() < CAPTCHA_LEN {
            return Err(SolverError::BadOutput);
        }

        let mut solution = String::with_capacity(CAPTCHA_LEN);
        for output in outputs.iter().take(CAPTCHA_LEN) {
            let view = output
                .to_array_view::<f32>()
                .map_err(|e| SolverError::Model(e.to_string()))?;
            let scores: Vec<f32> = view.iter().copied().collect();
            let index = argmax(&scores).ok_or(SolverError::BadOutput)?;
            let character = self
                .metadata
                .idx_to_char
                .get(&index.to_string())
                .ok_or(SolverError::BadOutput)?;
            solution.push_str(character);
        }

        Ok(solution)
    }
}

/// Scale `u8` pixels into the model's normalized input space:
/// `(px / 255 - mean) / std`
fn normalize_pixels(pixels: &[u8], mean: f32, std: f32) -> Vec<f32> {
    pixels
        .iter()
        .map(|&px| (px as f32 / 255.0 - mean) / std)
        .collect()
}

/// Index of the largest score, ignoring NaNs
fn argmax(scores: &[f32]) -> Option<usize> {
    scores
        .iter()
        .enumerate()
        .filter(|(_, score)| !score.is_nan())
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    const METADATA: &str = r#"
    {
        "input_shape": [1, 50, 140],
        "normalization": {"mean": [0.5], "std": [0.25]},
        "idx_to_char": {"0": "A", "1": "B", "2": "7"}
    }
    "#;

    #[test]
    fn test_metadata_parses() {
        let metadata = ModelMetadata::parse(METADATA).unwrap();
        assert_eq!(metadata.dimensions(), (50, 140));
        assert_eq!(metadata.idx_to_char.get("2").map(String::as_str), Some("7"));
    }

    #[test]
    fn test_metadata_rejects_short_input_shape() {
        let raw = r#"{"input_shape": [1], "normalization": {"mean": [0.5], "std": [0.25]}, "idx_to_char": {}}"#;
        assert!(ModelMetadata::parse(raw).is_err());
    }

    #[test]
    fn test_metadata_rejects_empty_normalization() {
        let raw = r#"{"input_shape": [1, 50, 140], "normalization": {"mean": [], "std": []}, "idx_to_char": {}}"#;
        assert!(ModelMetadata::parse(raw).is_err());
    }

    #[test]
    fn test_normalize_pixels() {
        let normalized = normalize_pixels(&[0, 255], 0.5, 0.25);
        assert_eq!(normalized, vec![-2.0, 2.0]);
    }

    #[test]
    fn test_argmax() {
        assert_eq!(argmax(&[0.1, 0.9, 0.3]), Some(1));
        assert_eq!(argmax(&[1.0]), Some(0));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_argmax_ignores_nan() {
        assert_eq!(argmax(&[0.5, f32::NAN, 0.7]), Some(2));
    }
}
