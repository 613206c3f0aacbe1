use image::{DynamicImage, imageops::FilterType};

use crate::domain::{common::entities::app_errors::CoreError, detection::entities::RawDetection};

const PAD_VALUE: f32 = 114.0 / 255.0;
const BOX_FIELDS: usize = 4;

/// Geometry of a letterboxed frame, needed to map boxes back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
    pub width: u32,
    pub height: u32,
}

impl Letterbox {
    pub fn fit(width: u32, height: u32, input_size: u32) -> Self {
        let scale = (input_size as f32 / width.max(1) as f32)
            .min(input_size as f32 / height.max(1) as f32);
        let new_w = ((width as f32 * scale).round() as u32).clamp(1, input_size);
        let new_h = ((height as f32 * scale).round() as u32).clamp(1, input_size);

        Self {
            scale,
            pad_x: ((input_size - new_w) / 2) as f32,
            pad_y: ((input_size - new_h) / 2) as f32,
            width,
            height,
        }
    }

    /// Maps a model-space `cx, cy, w, h` box onto `[x1, y1, x2, y2]` in the
    /// source image, clamped to its bounds.
    pub fn unmap(&self, [cx, cy, w, h]: [f32; 4]) -> [f32; 4] {
        let x = |v: f32| ((v - self.pad_x) / self.scale).clamp(0.0, self.width as f32);
        let y = |v: f32| ((v - self.pad_y) / self.scale).clamp(0.0, self.height as f32);
        [
            x(cx - w / 2.0),
            y(cy - h / 2.0),
            x(cx + w / 2.0),
            y(cy + h / 2.0),
        ]
    }
}

/// Resizes into a gray-padded square and lays the pixels out as normalised
/// CHW floats.
pub fn letterbox(image: &DynamicImage, input_size: u32) -> (Vec<f32>, Letterbox) {
    let frame = Letterbox::fit(image.width(), image.height(), input_size);
    let new_w = ((image.width() as f32 * frame.scale).round() as u32).clamp(1, input_size);
    let new_h = ((image.height() as f32 * frame.scale).round() as u32).clamp(1, input_size);
    let rgb = image.resize_exact(new_w, new_h, FilterType::Triangle).to_rgb8();

    let side = input_size as usize;
    let plane = side * side;
    let mut tensor = vec![PAD_VALUE; 3 * plane];
    let (offset_x, offset_y) = (frame.pad_x as usize, frame.pad_y as usize);

    for (x, y, pixel) in rgb.enumerate_pixels() {
        let index = (offset_y + y as usize) * side + offset_x + x as usize;
        for channel in 0..3 {
            tensor[channel * plane + index] = pixel[channel] as f32 / 255.0;
        }
    }

    (tensor, frame)
}

/// Decodes a YOLO head output (`[1, 4 + classes, anchors]` or
/// `[1, anchors, 4 + classes]`) into candidates above `min_confidence`.
pub fn decode_output(
    data: &[f32],
    shape: &[i64],
    labels: &[String],
    frame: &Letterbox,
    min_confidence: f32,
) -> Result<Vec<RawDetection>, CoreError> {
    let features = BOX_FIELDS + labels.len();
    let dims: Vec<usize> = shape.iter().map(|&d| d.max(0) as usize).collect();

    let (anchors, transposed) = match dims.as_slice() {
        [1, f, a] if *f == features => (*a, true),
        [1, a, f] if *f == features => (*a, false),
        _ => {
            return Err(CoreError::Inference(format!(
                "unexpected output shape {:?} for {} classes",
                shape,
                labels.len()
            )));
        }
    };

    if data.len() < anchors * features {
        return Err(CoreError::Inference(format!(
            "output holds {} values, expected {}",
            data.len(),
            anchors * features
        )));
    }

    let value = |anchor: usize, field: usize| {
        if transposed {
            data[field * anchors + anchor]
        } else {
            data[anchor * features + field]
        }
    };

    let mut candidates = Vec::new();
    for anchor in 0..anchors {
        let (class_id, confidence) = (0..labels.len())
            .map(|class| (class, value(anchor, BOX_FIELDS + class)))
            .fold((0, f32::NEG_INFINITY), |best, current| {
                if current.1 > best.1 { current } else { best }
            });

        if !confidence.is_finite() || confidence < min_confidence {
            continue;
        }

        let raw_box = [
            value(anchor, 0),
            value(anchor, 1),
            value(anchor, 2),
            value(anchor, 3),
        ];
        if raw_box.iter().any(|v| !v.is_finite()) || raw_box[2] <= 0.0 || raw_box[3] <= 0.0 {
            continue;
        }

        let bbox = frame.unmap(raw_box);
        if bbox[2] - bbox[0] < 1.0 || bbox[3] - bbox[1] < 1.0 {
            continue;
        }

        candidates.push(RawDetection {
            class_id: class_id as u32,
            label: labels[class_id].clone(),
            confidence,
            bbox,
        });
    }

    Ok(candidates)
}

fn iou(a: &[f32; 4], b: &[f32; 4]) -> f32 {
    let width = (a[2].min(b[2]) - a[0].max(b[0])).max(0.0);
    let height = (a[3].min(b[3]) - a[1].max(b[1])).max(0.0);
    let intersection = width * height;
    let union = (a[2] - a[0]) * (a[3] - a[1]) + (b[2] - b[0]) * (b[3] - b[1]) - intersection;

    if union <= f32::EPSILON { 0.0 } else { intersection / union }
}

/// Class-wise non-maximum suppression. Output is sorted by descending
/// confidence.
pub fn non_max_suppression(mut candidates: Vec<RawDetection>, iou_threshold: f32) -> Vec<RawDetection> {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<RawDetection> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let suppressed = kept.iter().any(|existing| {
            existing.class_id == candidate.class_id
                && iou(&existing.bbox, &candidate.bbox) > iou_threshold
        });
        if !suppressed {
            kept.push(candidate);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(class_id: u32, confidence: f32, bbox: [f32; 4]) -> RawDetection {
        RawDetection {
            class_id,
            label: format!("class_{class_id}"),
            confidence,
            bbox,
        }
    }

    fn labels(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("food_{i}")).collect()
    }

    #[test]
    fn letterbox_pads_the_short_side() {
        let frame = Letterbox::fit(1280, 640, 640);

        assert_eq!(frame.scale, 0.5);
        assert_eq!(frame.pad_x, 0.0);
        assert_eq!(frame.pad_y, 160.0);
    }

    #[test]
    fn unmap_returns_source_pixels() {
        let frame = Letterbox::fit(1280, 640, 640);

        let bbox = frame.unmap([320.0, 320.0, 100.0, 50.0]);

        assert_eq!(bbox, [540.0, 270.0, 740.0, 370.0]);
    }

    #[test]
    fn letterbox_tensor_is_chw_with_gray_padding() {
        let image = DynamicImage::new_rgb8(8, 4);
        let (tensor, frame) = letterbox(&image, 8);

        assert_eq!(tensor.len(), 3 * 8 * 8);
        assert_eq!(frame.pad_y, 2.0);
        assert_eq!(tensor[0], PAD_VALUE);
        assert_eq!(tensor[2 * 8], 0.0);
    }

    #[test]
    fn decodes_both_output_layouts() {
        let frame = Letterbox::fit(640, 640, 640);
        let names = labels(2);
        // one anchor: box then two class scores
        let row = [100.0, 100.0, 40.0, 40.0, 0.1, 0.8];

        let anchors_first = decode_output(&row, &[1, 1, 6], &names, &frame, 0.25).unwrap();
        let features_first = decode_output(&row, &[1, 6, 1], &names, &frame, 0.25).unwrap();

        assert_eq!(anchors_first, features_first);
        assert_eq!(anchors_first.len(), 1);
        assert_eq!(anchors_first[0].class_id, 1);
        assert_eq!(anchors_first[0].label, "food_1");
        assert_eq!(anchors_first[0].bbox, [80.0, 80.0, 120.0, 120.0]);
    }

    #[test]
    fn drops_rows_below_threshold_or_degenerate() {
        let frame = Letterbox::fit(640, 640, 640);
        let names = labels(1);
        let rows = [
            100.0, 100.0, 40.0, 40.0, 0.1, //
            100.0, 100.0, 0.0, 40.0, 0.9, //
            200.0, 200.0, 20.0, 20.0, 0.6,
        ];

        let decoded = decode_output(&rows, &[1, 3, 5], &names, &frame, 0.25).unwrap();

        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].confidence, 0.6);
    }

    #[test]
    fn rejects_mismatched_shapes() {
        let frame = Letterbox::fit(640, 640, 640);
        let error = decode_output(&[0.0; 12], &[1, 2, 6], &labels(3), &frame, 0.25).unwrap_err();

        assert!(matches!(error, CoreError::Inference(_)));
    }

    #[test]
    fn nms_suppresses_overlaps_within_a_class_only() {
        let kept = non_max_suppression(
            vec![
                candidate(0, 0.7, [0.0, 0.0, 100.0, 100.0]),
                candidate(0, 0.9, [5.0, 5.0, 105.0, 105.0]),
                candidate(1, 0.8, [0.0, 0.0, 100.0, 100.0]),
                candidate(0, 0.6, [300.0, 300.0, 400.0, 400.0]),
            ],
            0.45,
        );

        let confidences: Vec<f32> = kept.iter().map(|d| d.confidence).collect();
        assert_eq!(confidences, vec![0.9, 0.8, 0.6]);
    }

    #[test]
    fn nms_of_nothing_is_nothing() {
        assert!(non_max_suppression(Vec::new(), 0.45).is_empty());
    }
}
