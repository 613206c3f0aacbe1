use image::DynamicImage;

use crate::domain::{common::entities::app_errors::CoreError, detection::entities::RawDetection};

/// Black-box vision model. Implementations are CPU bound and are only ever
/// called from the detection worker pool.
#[cfg_attr(test, mockall::automock)]
pub trait ObjectDetector: Send + Sync + 'static {
    /// Runs inference and returns every candidate scoring at least
    /// `min_confidence`, boxes in `image` pixel coordinates.
    fn infer(
        &self,
        image: &DynamicImage,
        min_confidence: f32,
    ) -> Result<Vec<RawDetection>, CoreError>;
}
