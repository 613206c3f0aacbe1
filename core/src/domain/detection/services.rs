use std::borrow::Cow;
use std::sync::atomic::{AtomicBool, Ordering};

use image::{DynamicImage, imageops::FilterType};
use tracing::{debug, info, instrument};

use crate::domain::{
    common::{DetectorConfig, entities::app_errors::CoreError},
    detection::{
        entities::DetectionSet,
        model::{ModelHandle, ModelState},
        ports::ObjectDetector,
    },
    health::entities::ModelHealth,
};

const WARMUP_EDGE: u32 = 64;

/// Turns a decoded image into a [`DetectionSet`]: downsampling, the
/// two-stage confidence filter, ordering and the output cap.
pub struct DetectorAdapter<D> {
    model: ModelHandle<D>,
    config: DetectorConfig,
    warmed_up: AtomicBool,
}

impl<D> DetectorAdapter<D>
where
    D: ObjectDetector,
{
    pub fn new(model: ModelHandle<D>, config: DetectorConfig) -> Self {
        Self {
            model,
            config,
            warmed_up: AtomicBool::new(false),
        }
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn detect(&self, image: &DynamicImage) -> Result<DetectionSet, CoreError> {
        let model = self.model.get()?;

        let (prepared, scale) = downsample(image, self.config.max_image_dimension);
        let raw = model.infer(&prepared, self.config.model_confidence)?;
        let candidates = raw.len();

        let detections = DetectionSet::from_raw(
            raw,
            self.config.min_confidence,
            self.config.max_detections,
            scale,
        );

        debug!(
            candidates,
            kept = detections.len(),
            min_confidence = self.config.min_confidence,
            "Detection filtered"
        );

        Ok(detections)
    }

    /// Loads the model and pays its first-inference cost on a blank frame.
    /// Later calls return immediately.
    pub fn warmup(&self) -> Result<(), CoreError> {
        if self.warmed_up.load(Ordering::Acquire) {
            return Ok(());
        }

        let model = self.model.get()?;
        let blank = DynamicImage::new_rgb8(WARMUP_EDGE, WARMUP_EDGE);
        model.infer(&blank, self.config.model_confidence)?;

        self.warmed_up.store(true, Ordering::Release);
        info!("Detection model warmed up");
        Ok(())
    }

    pub fn health(&self) -> ModelHealth {
        let (loaded, error) = match self.model.state() {
            ModelState::Loaded => (true, None),
            ModelState::NotLoaded => (false, None),
            ModelState::Failed(reason) => (false, Some(reason)),
        };

        ModelHealth {
            loaded,
            warmed_up: self.warmed_up.load(Ordering::Acquire),
            error,
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }
}

pub fn decode_image(data: &[u8]) -> Result<DynamicImage, CoreError> {
    if data.is_empty() {
        return Err(CoreError::ImageDecode("empty file".to_string()));
    }

    image::load_from_memory(data).map_err(|e| CoreError::ImageDecode(e.to_string()))
}

/// Shrinks `image` so its largest side is at most `max_dimension`, keeping the
/// aspect ratio. Returns the image and the `[sx, sy]` factors that map its
/// coordinates back onto the original.
pub fn downsample(image: &DynamicImage, max_dimension: u32) -> (Cow<'_, DynamicImage>, [f32; 2]) {
    let (width, height) = (image.width(), image.height());
    if max_dimension == 0 || width.max(height) <= max_dimension {
        return (Cow::Borrowed(image), [1.0, 1.0]);
    }

    let resized = image.resize(max_dimension, max_dimension, FilterType::Triangle);
    let scale = [
        width as f32 / resized.width().max(1) as f32,
        height as f32 / resized.height().max(1) as f32,
    ];

    debug!(
        from = %format!("{width}x{height}"),
        to = %format!("{}x{}", resized.width(), resized.height()),
        "Downsampled upload"
    );

    (Cow::Owned(resized), scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::detection::{
        entities::RawDetection, ports::MockObjectDetector, test_support::png_bytes,
    };

    fn config() -> DetectorConfig {
        DetectorConfig {
            min_confidence: 0.5,
            model_confidence: 0.25,
            max_detections: 8,
            max_image_dimension: 100,
            ..DetectorConfig::default()
        }
    }

    fn raw(label: &str, confidence: f32, bbox: [f32; 4]) -> RawDetection {
        RawDetection {
            class_id: 1,
            label: label.to_string(),
            confidence,
            bbox,
        }
    }

    #[test]
    fn passes_lenient_threshold_to_model_and_applies_strict_one() {
        let mut model = MockObjectDetector::new();
        model
            .expect_infer()
            .withf(|_, min_confidence| (*min_confidence - 0.25).abs() < f32::EPSILON)
            .times(1)
            .returning(|_, _| {
                Ok(vec![
                    raw("salad", 0.3, [0.0, 0.0, 10.0, 10.0]),
                    raw("pizza", 0.9, [5.0, 5.0, 50.0, 50.0]),
                ])
            });

        let adapter = DetectorAdapter::new(ModelHandle::ready(model), config());
        let image = decode_image(&png_bytes(80, 60)).unwrap();
        let detections = adapter.detect(&image).unwrap();

        assert_eq!(detections.labels(), vec!["pizza".to_string()]);
        assert_eq!(detections.as_slice()[0].bounding_box, [5, 5, 50, 50]);
    }

    #[test]
    fn large_images_are_downsampled_and_boxes_restored() {
        let mut model = MockObjectDetector::new();
        model
            .expect_infer()
            .withf(|image, _| image.width() == 100 && image.height() == 50)
            .times(1)
            .returning(|_, _| Ok(vec![raw("rice", 0.8, [10.0, 10.0, 20.0, 20.0])]));

        let adapter = DetectorAdapter::new(ModelHandle::ready(model), config());
        let image = decode_image(&png_bytes(400, 200)).unwrap();
        let detections = adapter.detect(&image).unwrap();

        assert_eq!(detections.as_slice()[0].bounding_box, [40, 40, 80, 80]);
    }

    #[test]
    fn no_detections_is_not_an_error() {
        let mut model = MockObjectDetector::new();
        model.expect_infer().returning(|_, _| Ok(Vec::new()));

        let adapter = DetectorAdapter::new(ModelHandle::ready(model), config());
        let image = decode_image(&png_bytes(32, 32)).unwrap();

        assert!(adapter.detect(&image).unwrap().is_empty());
    }

    #[test]
    fn detections_are_capped() {
        let mut model = MockObjectDetector::new();
        model.expect_infer().returning(|_, _| {
            Ok((0..20)
                .map(|i| raw("egg", 0.5 + i as f32 / 100.0, [0.0, 0.0, 1.0, 1.0]))
                .collect())
        });

        let adapter = DetectorAdapter::new(ModelHandle::ready(model), config());
        let image = decode_image(&png_bytes(32, 32)).unwrap();
        let detections = adapter.detect(&image).unwrap();

        assert_eq!(detections.len(), 8);
        assert!((detections.as_slice()[0].confidence - 0.69).abs() < 1e-6);
    }

    #[test]
    fn warmup_runs_once() {
        let mut model = MockObjectDetector::new();
        model
            .expect_infer()
            .times(1)
            .returning(|_, _| Ok(Vec::new()));

        let adapter = DetectorAdapter::new(ModelHandle::ready(model), config());
        assert!(!adapter.health().warmed_up);

        adapter.warmup().unwrap();
        adapter.warmup().unwrap();

        let health = adapter.health();
        assert!(health.loaded);
        assert!(health.warmed_up);
    }

    #[test]
    fn unavailable_model_degrades_health() {
        let adapter: DetectorAdapter<MockObjectDetector> = DetectorAdapter::new(
            ModelHandle::lazy(|| Err(CoreError::ModelUnavailable("missing".to_string()))),
            config(),
        );

        assert!(matches!(
            adapter.warmup(),
            Err(CoreError::ModelUnavailable(_))
        ));

        let health = adapter.health();
        assert!(!health.loaded);
        assert!(!health.warmed_up);
        assert!(health.error.is_some());
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(matches!(
            decode_image(b"definitely not an image"),
            Err(CoreError::ImageDecode(_))
        ));
        assert!(matches!(decode_image(&[]), Err(CoreError::ImageDecode(_))));
    }

    #[test]
    fn small_images_are_left_alone() {
        let image = decode_image(&png_bytes(50, 20)).unwrap();
        let (prepared, scale) = downsample(&image, 100);

        assert!(matches!(prepared, Cow::Borrowed(_)));
        assert_eq!(scale, [1.0, 1.0]);
    }
}
