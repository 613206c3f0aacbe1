//! Literal payloads served whenever the LLM path cannot produce an analysis.

use crate::domain::nutrition::{
    entities::{NutrientProfile, NutritionAnalysis},
    parser::parse_analysis,
};

pub const UNKNOWN_LEVEL: &str = "tidak diketahui";
pub const UNKNOWN_FOOD_TYPE: &str = "Tidak diketahui";

/// Used whenever an analysis would otherwise carry no recommendations.
pub const DEFAULT_RECOMMENDATIONS: [&str; 3] = [
    "Konsumsi makanan dengan gizi seimbang: karbohidrat, protein, sayur, dan buah",
    "Perbanyak minum air putih minimal 8 gelas per hari",
    "Batasi konsumsi gula, garam, dan lemak berlebih",
];

pub const NO_DETECTION_FOOD_TYPE: &str = "Tidak ada makanan terdeteksi";

pub const NO_DETECTION_DEFICIENCIES: [&str; 1] =
    ["Tidak ada makanan yang dapat dianalisis dari foto ini"];

pub const NO_DETECTION_RECOMMENDATIONS: [&str; 3] = [
    "Pastikan makanan terlihat jelas di dalam foto",
    "Gunakan pencahayaan yang cukup saat memotret makanan",
    "Ambil foto dari atas agar seluruh hidangan terlihat",
];

pub const ADVICE_UNAVAILABLE_RECOMMENDATIONS: [&str; 3] = [
    "Konsumsi makanan dengan gizi seimbang: karbohidrat, protein, sayur, dan buah",
    "Tambahkan sayuran atau buah sebagai pendamping untuk serat dan vitamin",
    "Coba analisis ulang beberapa saat lagi untuk rekomendasi yang lebih spesifik",
];

/// Canned answer substituted for the LLM's text when the LLM cannot be
/// reached. It goes through the same parser as a real answer.
pub const ADVICE_FALLBACK_JSON: &str = r#"{
    "food_type": "Analisis otomatis tidak tersedia",
    "components": [],
    "nutrition": {
        "protein": "tidak diketahui",
        "carbs": "tidak diketahui",
        "fat": "tidak diketahui",
        "fiber": "tidak diketahui",
        "vitamins": "tidak diketahui"
    },
    "deficiencies": ["Analisis gizi lengkap tidak tersedia saat ini"],
    "recommendations": [
        "Konsumsi makanan dengan gizi seimbang: karbohidrat, protein, sayur, dan buah",
        "Tambahkan sayuran atau buah sebagai pendamping untuk serat dan vitamin",
        "Coba analisis ulang beberapa saat lagi untuk rekomendasi yang lebih spesifik"
    ]
}"#;

/// Served when nothing was detected; the LLM is not consulted at all.
pub fn no_detection_analysis() -> NutritionAnalysis {
    NutritionAnalysis {
        food_type: NO_DETECTION_FOOD_TYPE.to_string(),
        components: Vec::new(),
        nutrition: NutrientProfile::unknown(),
        deficiencies: NO_DETECTION_DEFICIENCIES.iter().map(|s| s.to_string()).collect(),
        recommendations: NO_DETECTION_RECOMMENDATIONS
            .iter()
            .map(|s| s.to_string())
            .collect(),
    }
}

/// Served when the LLM call fails for any reason.
pub fn advice_unavailable_analysis() -> NutritionAnalysis {
    parse_analysis(ADVICE_FALLBACK_JSON).into_analysis()
}
