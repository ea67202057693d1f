//! Bundled nearest-centroid image classifier
//!
//! Keeps a running mean feature vector per category and scores images by
//! softmax over negative distances to the centroids. Features are coarse
//! color histograms over a downsampled thumbnail, which is enough signal
//! for folder-level triage suggestions while keeping the model cheap to
//! refit on every commit. Incremental fits fold new examples into the
//! running means and append categories the model has not seen, so the
//! category set grows with the folder set.

use super::{Classifier, Confidences, LabeledImage};
use crate::error::{Error, Result};
use image::imageops::FilterType;
use std::collections::BTreeMap;

/// Thumbnail edge length used for feature extraction
const THUMB_SIZE: u32 = 32;

/// Histogram bins per color channel (4*4*4 = 64 features)
const BINS_PER_CHANNEL: u32 = 4;

/// Softmax temperature over negative centroid distances
const TEMPERATURE: f32 = 0.1;

/// Per-category running mean
#[derive(Debug, Clone)]
struct Centroid {
    sum: Vec<f32>,
    count: u64,
}

impl Centroid {
    fn new(dim: usize) -> Self {
        Self {
            sum: vec![0.0; dim],
            count: 0,
        }
    }

    fn add(&mut self, features: &[f32]) {
        for (acc, f) in self.sum.iter_mut().zip(features) {
            *acc += f;
        }
        self.count += 1;
    }

    fn mean(&self) -> Vec<f32> {
        let n = self.count.max(1) as f32;
        self.sum.iter().map(|s| s / n).collect()
    }
}

/// Nearest-centroid classifier over color-histogram features
pub struct CentroidClassifier {
    centroids: BTreeMap<String, Centroid>,
}

impl CentroidClassifier {
    pub fn new() -> Self {
        Self {
            centroids: BTreeMap::new(),
        }
    }

    /// Categories the model currently knows, sorted
    pub fn categories(&self) -> Vec<String> {
        self.centroids.keys().cloned().collect()
    }

    fn feature_dim() -> usize {
        (BINS_PER_CHANNEL * BINS_PER_CHANNEL * BINS_PER_CHANNEL) as usize
    }

    /// L2-normalized RGB histogram of a downsampled thumbnail
    fn features(bytes: &[u8]) -> std::result::Result<Vec<f32>, image::ImageError> {
        let img = image::load_from_memory(bytes)?;
        let thumb = img
            .resize_exact(THUMB_SIZE, THUMB_SIZE, FilterType::Triangle)
            .to_rgb8();

        let mut hist = vec![0.0f32; Self::feature_dim()];
        let bin_width = 256 / BINS_PER_CHANNEL;
        for pixel in thumb.pixels() {
            let r = pixel.0[0] as u32 / bin_width;
            let g = pixel.0[1] as u32 / bin_width;
            let b = pixel.0[2] as u32 / bin_width;
            let idx = (r * BINS_PER_CHANNEL + g) * BINS_PER_CHANNEL + b;
            hist[idx as usize] += 1.0;
        }

        let norm = hist.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in hist.iter_mut() {
                *v /= norm;
            }
        }
        Ok(hist)
    }

    fn fold_in(&mut self, examples: &[LabeledImage]) -> Result<()> {
        for example in examples {
            let features = Self::features(&example.bytes)
                .map_err(|e| Error::Training(format!("{}: {}", example.name, e)))?;
            self.centroids
                .entry(example.category.clone())
                .or_insert_with(|| Centroid::new(Self::feature_dim()))
                .add(&features);
        }
        Ok(())
    }
}

impl Default for CentroidClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for CentroidClassifier {
    fn predict(&self, bytes: &[u8]) -> Result<Confidences> {
        if self.centroids.is_empty() {
            return Err(Error::Prediction("no trained categories".to_string()));
        }

        let features =
            Self::features(bytes).map_err(|e| Error::Prediction(e.to_string()))?;

        // Softmax over negative distances: closer centroid, higher score
        let scores: Vec<(String, f32)> = self
            .centroids
            .iter()
            .map(|(category, centroid)| {
                let mean = centroid.mean();
                let dist = features
                    .iter()
                    .zip(&mean)
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum::<f32>()
                    .sqrt();
                (category.clone(), -dist / TEMPERATURE)
            })
            .collect();

        let max_score = scores
            .iter()
            .map(|(_, s)| *s)
            .fold(f32::NEG_INFINITY, f32::max);
        let exp_sum: f32 = scores.iter().map(|(_, s)| (s - max_score).exp()).sum();

        Ok(scores
            .into_iter()
            .map(|(category, s)| (category, (s - max_score).exp() / exp_sum))
            .collect())
    }

    fn fit_incremental(&mut self, examples: &[LabeledImage]) -> Result<()> {
        self.fold_in(examples)
    }

    fn fit_initial(&mut self, examples: &[LabeledImage]) -> Result<()> {
        self.centroids.clear();
        self.fold_in(examples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn solid_png(r: u8, g: u8, b: u8) -> Vec<u8> {
        let img = RgbImage::from_pixel(8, 8, Rgb([r, g, b]));
        let mut bytes = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut bytes, ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    fn example(name: &str, bytes: Vec<u8>, category: &str) -> LabeledImage {
        LabeledImage {
            name: name.to_string(),
            bytes,
            category: category.to_string(),
        }
    }

    #[test]
    fn test_predict_without_training_fails() {
        let model = CentroidClassifier::new();
        assert!(model.predict(&solid_png(10, 10, 10)).is_err());
    }

    #[test]
    fn test_distinguishes_dissimilar_colors() {
        let mut model = CentroidClassifier::new();
        model
            .fit_initial(&[
                example("r.png", solid_png(250, 10, 10), "reds"),
                example("b.png", solid_png(10, 10, 250), "blues"),
            ])
            .unwrap();

        let scores = model.predict(&solid_png(240, 20, 20)).unwrap();
        assert!(scores["reds"] > scores["blues"]);

        // Confidences form a distribution
        let total: f32 = scores.values().sum();
        assert!((total - 1.0).abs() < 1e-4);
        assert!(scores.values().all(|s| (0.0..=1.0).contains(s)));
    }

    #[test]
    fn test_incremental_fit_adds_category() {
        let mut model = CentroidClassifier::new();
        model
            .fit_initial(&[example("r.png", solid_png(250, 10, 10), "reds")])
            .unwrap();
        assert_eq!(model.categories(), vec!["reds"]);

        model
            .fit_incremental(&[example("g.png", solid_png(10, 250, 10), "greens")])
            .unwrap();
        assert_eq!(model.categories(), vec!["greens", "reds"]);

        let scores = model.predict(&solid_png(15, 245, 15)).unwrap();
        assert!(scores["greens"] > scores["reds"]);
    }

    #[test]
    fn test_fit_initial_resets_model() {
        let mut model = CentroidClassifier::new();
        model
            .fit_initial(&[example("r.png", solid_png(250, 10, 10), "reds")])
            .unwrap();
        model
            .fit_initial(&[example("b.png", solid_png(10, 10, 250), "blues")])
            .unwrap();

        assert_eq!(model.categories(), vec!["blues"]);
    }

    #[test]
    fn test_undecodable_bytes_rejected() {
        let mut model = CentroidClassifier::new();
        let result = model.fit_initial(&[example("x.png", b"not an image".to_vec(), "cats")]);
        assert!(matches!(result, Err(Error::Training(_))));
    }
}
