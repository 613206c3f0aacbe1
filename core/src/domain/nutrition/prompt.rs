use std::fmt::Write;

use crate::domain::detection::entities::DetectionSet;

pub const NO_FOOD_PLACEHOLDER: &str = "Tidak ada makanan terdeteksi";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PromptStyle {
    /// Full nutritionist brief with the JSON answer schema embedded.
    #[default]
    Comprehensive,
    /// Short prose request; answers go through the heuristic parser.
    Simple,
}

const OUTPUT_SCHEMA: &str = r#"{
    "food_type": "string (jenis makanan)",
    "components": ["array", "komponen", "bahan"],
    "nutrition": {
        "protein": "string (tinggi/sedang/rendah)",
        "carbs": "string (tinggi/sedang/rendah)",
        "fat": "string (tinggi/sedang/rendah)",
        "fiber": "string (tinggi/sedang/rendah)",
        "vitamins": "string (jenis vitamin dominan)"
    },
    "deficiencies": ["array", "kekurangan", "gizi"],
    "recommendations": ["array", "rekomendasi", "saran"]
}"#;

/// Builds the LLM instruction for `labels`. Labels are listed in the order
/// given; at most `detail_limit` detections are described.
pub fn build_prompt(
    style: PromptStyle,
    labels: &[String],
    detections: &DetectionSet,
    detail_limit: usize,
) -> String {
    let foods = food_list(labels);

    match style {
        PromptStyle::Comprehensive => comprehensive(&foods, detections, detail_limit),
        PromptStyle::Simple => simple(&foods),
    }
}

fn food_list(labels: &[String]) -> String {
    if labels.is_empty() {
        NO_FOOD_PLACEHOLDER.to_string()
    } else {
        labels.join(", ")
    }
}

fn comprehensive(foods: &str, detections: &DetectionSet, detail_limit: usize) -> String {
    let mut details = String::new();
    let top = detections.top(detail_limit);
    if !top.is_empty() {
        details.push_str("Detail deteksi:\n");
        for detection in top {
            let _ = writeln!(
                details,
                "- {} (confidence: {:.2})",
                detection.label, detection.confidence
            );
        }
    }

    format!(
        "ANALISIS MAKANAN DAN NUTRISI - FORMAT JSON

Data Input:
Makanan yang terdeteksi: {foods}
{details}
Tugas Anda sebagai ahli gizi:
1. ANALISIS JENIS MAKANAN:
   - Klasifikasikan jenis makanan (berat/ringan/tradisional/modern)
   - Identifikasi komponen bahan utama

2. ANALISIS KANDUNGAN GIZI:
   - Protein: estimasi tingkat (tinggi/sedang/rendah)
   - Karbohidrat: estimasi tingkat (tinggi/sedang/rendah)
   - Lemak: estimasi tingkat (tinggi/sedang/rendah)
   - Serat: estimasi tingkat (tinggi/sedang/rendah)
   - Vitamin & Mineral: identifikasi yang dominan

3. IDENTIFIKASI KEKURANGAN:
   - Deteksi potensi kekurangan gizi
   - Analisis ketidakseimbangan nutrisi

4. REKOMENDASI:
   - Saran makanan pendamping untuk gizi seimbang
   - Rekomendasi porsi yang tepat
   - Tips penyajian yang lebih sehat

FORMAT OUTPUT (JSON):
{OUTPUT_SCHEMA}

Hanya kembalikan data JSON, tanpa penjelasan tambahan.
Analisis dalam konteks makanan Indonesia dan internasional.
"
    )
}

fn simple(foods: &str) -> String {
    format!(
        "Analisis makanan: {foods}

Berikan analisis singkat tentang:
1. Kandungan gizi utama
2. Kekurangan nutrisi
3. Rekomendasi makanan pendamping

Jawab dalam bahasa Indonesia, ringkas dan praktis.
"
    )
}
