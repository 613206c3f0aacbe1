use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One labelled, localised model output, in original-image pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Detection {
    pub label: String,
    pub confidence: f32,
    /// `[x1, y1, x2, y2]`
    #[serde(rename = "bbox")]
    #[schema(value_type = Vec<i32>, example = json!([12, 40, 310, 298]))]
    pub bounding_box: [i32; 4],
    pub class_id: u32,
}

/// Candidate straight out of a model, coordinates relative to the image the
/// model was given.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    pub class_id: u32,
    pub label: String,
    pub confidence: f32,
    pub bbox: [f32; 4],
}

/// Detections sorted by descending confidence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct DetectionSet(Vec<Detection>);

impl DetectionSet {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Applies the strict confidence floor and the output cap to raw model
    /// candidates, then maps boxes back through `scale` (`[sx, sy]`).
    pub fn from_raw(
        raw: Vec<RawDetection>,
        min_confidence: f32,
        max_detections: usize,
        scale: [f32; 2],
    ) -> Self {
        let detections = select_candidates(raw, min_confidence, max_detections)
            .into_iter()
            .map(|candidate| Detection {
                bounding_box: rescale_bbox(candidate.bbox, scale),
                label: candidate.label,
                confidence: candidate.confidence,
                class_id: candidate.class_id,
            })
            .collect();

        Self(detections)
    }

    /// Unique labels in first-seen order, so the highest-confidence label leads.
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = Vec::new();
        for detection in &self.0 {
            if !labels.contains(&detection.label) {
                labels.push(detection.label.clone());
            }
        }
        labels
    }

    pub fn top(&self, n: usize) -> &[Detection] {
        &self.0[..n.min(self.0.len())]
    }

    pub fn as_slice(&self) -> &[Detection] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Detection>> for DetectionSet {
    fn from(mut detections: Vec<Detection>) -> Self {
        detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        Self(detections)
    }
}

/// Keeps candidates at or above `min_confidence`, sorted by descending
/// confidence (stable, so ties keep model order), capped at `max_detections`.
pub fn select_candidates(
    mut raw: Vec<RawDetection>,
    min_confidence: f32,
    max_detections: usize,
) -> Vec<RawDetection> {
    raw.retain(|d| d.confidence.is_finite() && d.confidence >= min_confidence);
    raw.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    raw.truncate(max_detections);
    raw
}

fn rescale_bbox(bbox: [f32; 4], [sx, sy]: [f32; 2]) -> [i32; 4] {
    let scale = |value: f32, factor: f32| (value * factor).round().max(0.0) as i32;
    [
        scale(bbox[0], sx),
        scale(bbox[1], sy),
        scale(bbox[2], sx),
        scale(bbox[3], sy),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(label: &str, confidence: f32) -> RawDetection {
        RawDetection {
            class_id: 0,
            label: label.to_string(),
            confidence,
            bbox: [10.0, 20.0, 30.0, 40.0],
        }
    }

    #[test]
    fn keeps_only_candidates_above_floor_sorted_and_capped() {
        let candidates = vec![
            raw("rice", 0.55),
            raw("salad", 0.3),
            raw("pizza", 0.9),
            raw("egg", 0.5),
            raw("tempe", 0.7),
            raw("soup", 0.49),
        ];

        let kept = select_candidates(candidates, 0.5, 3);
        let scores: Vec<f32> = kept.iter().map(|d| d.confidence).collect();

        assert_eq!(scores, vec![0.9, 0.7, 0.55]);
    }

    #[test]
    fn ties_keep_model_order() {
        let kept = select_candidates(vec![raw("a", 0.8), raw("b", 0.8), raw("c", 0.8)], 0.5, 8);
        let labels: Vec<&str> = kept.iter().map(|d| d.label.as_str()).collect();

        assert_eq!(labels, vec!["a", "b", "c"]);
    }

    #[test]
    fn non_finite_scores_are_dropped() {
        let kept = select_candidates(vec![raw("nan", f32::NAN), raw("ok", 0.6)], 0.5, 8);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].label, "ok");
    }

    #[test]
    fn labels_are_unique_in_confidence_order() {
        let set = DetectionSet::from_raw(
            vec![raw("rice", 0.6), raw("chicken", 0.95), raw("rice", 0.8)],
            0.5,
            8,
            [1.0, 1.0],
        );

        assert_eq!(set.len(), 3);
        assert_eq!(set.labels(), vec!["chicken".to_string(), "rice".to_string()]);
    }

    #[test]
    fn boxes_are_mapped_back_to_original_pixels() {
        let set = DetectionSet::from_raw(vec![raw("pizza", 0.9)], 0.5, 8, [2.0, 2.5]);

        assert_eq!(set.as_slice()[0].bounding_box, [20, 50, 60, 100]);
    }

    #[test]
    fn serializes_box_as_bbox_array() {
        let set = DetectionSet::from_raw(vec![raw("pizza", 0.75)], 0.5, 8, [1.0, 1.0]);
        let value = serde_json::to_value(&set).unwrap();

        assert_eq!(value[0]["label"], "pizza");
        assert_eq!(value[0]["bbox"], serde_json::json!([10, 20, 30, 40]));
        assert_eq!(value[0]["class_id"], 0);
    }
}
