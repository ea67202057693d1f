//! Classifier capability
//!
//! The triage engine treats classification as an external capability:
//! prediction over current categories, incremental fitting with newly
//! committed examples, and full initial fitting. Model internals live
//! entirely behind this trait; [`centroid::CentroidClassifier`] is the
//! bundled implementation.

use crate::error::Result;
use std::collections::BTreeMap;

pub mod centroid;

pub use centroid::CentroidClassifier;

/// One labeled training example
#[derive(Debug, Clone)]
pub struct LabeledImage {
    /// Filename, for logging only
    pub name: String,
    /// Raw image bytes
    pub bytes: Vec<u8>,
    /// Category folder the image belongs to
    pub category: String,
}

/// Prediction output: category name to confidence in [0, 1]
pub type Confidences = BTreeMap<String, f32>;

/// Image classification capability
pub trait Classifier: Send {
    /// Score an image against all known categories
    fn predict(&self, bytes: &[u8]) -> Result<Confidences>;

    /// Update the model with newly labeled examples, extending the
    /// category set when examples carry unseen categories
    fn fit_incremental(&mut self, examples: &[LabeledImage]) -> Result<()>;

    /// Train from scratch on the full labeled set
    fn fit_initial(&mut self, examples: &[LabeledImage]) -> Result<()>;
}
