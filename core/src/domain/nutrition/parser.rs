use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::domain::nutrition::entities::{NutrientProfile, NutritionAnalysis};

static FENCED_JSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?\s*(\{.*\})\s*```").expect("valid fenced json pattern")
});

/// How an LLM answer was understood. All three carry a normalised analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedAnalysis {
    /// The answer was JSON in the requested shape.
    Structured(NutritionAnalysis),
    /// The answer was prose; sections and bullets were recovered line by line.
    Heuristic(NutritionAnalysis),
    /// Nothing usable was found.
    Default(NutritionAnalysis),
}

impl ParsedAnalysis {
    #[cfg(test)]
    pub fn analysis(&self) -> &NutritionAnalysis {
        match self {
            Self::Structured(analysis) | Self::Heuristic(analysis) | Self::Default(analysis) => {
                analysis
            }
        }
    }

    pub fn into_analysis(self) -> NutritionAnalysis {
        match self {
            Self::Structured(analysis) | Self::Heuristic(analysis) | Self::Default(analysis) => {
                analysis
            }
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default(_))
    }
}

pub fn parse_analysis(raw: &str) -> ParsedAnalysis {
    let text = raw.trim();

    if let Some(json) = json_candidate(text) {
        match serde_json::from_str::<NutritionAnalysis>(json) {
            Ok(analysis) => return ParsedAnalysis::Structured(analysis.normalized()),
            Err(e) => debug!(error = %e, "LLM answer is not schema JSON, scanning as text"),
        }
    }

    match scan_sections(text) {
        Some(analysis) => ParsedAnalysis::Heuristic(analysis.normalized()),
        None => ParsedAnalysis::Default(NutritionAnalysis::default()),
    }
}

fn json_candidate(text: &str) -> Option<&str> {
    if text.starts_with('{') {
        return Some(text);
    }

    FENCED_JSON
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Components,
    Nutrition,
    Deficiencies,
    Recommendations,
}

// Checked in order: "kekurangan gizi" must land in deficiencies, not nutrition.
const SECTION_KEYWORDS: [(Section, &[&str]); 4] = [
    (Section::Recommendations, &["rekomendasi", "saran", "recommend"]),
    (Section::Deficiencies, &["kekurangan", "defisiensi", "deficien"]),
    (Section::Components, &["komponen", "bahan", "component", "ingredient"]),
    (Section::Nutrition, &["gizi", "nutrisi", "nutrition", "nutrient"]),
];

fn scan_sections(text: &str) -> Option<NutritionAnalysis> {
    let mut analysis = NutritionAnalysis {
        food_type: String::new(),
        components: Vec::new(),
        nutrition: NutrientProfile::unknown(),
        deficiencies: Vec::new(),
        recommendations: Vec::new(),
    };
    let mut section = Section::None;
    let mut recognised = false;

    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if let Some(item) = bullet_item(line) {
            if item.is_empty() {
                continue;
            }

            let target = match section {
                Section::Components => &mut analysis.components,
                Section::Deficiencies => &mut analysis.deficiencies,
                Section::Recommendations => &mut analysis.recommendations,
                Section::Nutrition => {
                    recognised |= assign_nutrient(&mut analysis.nutrition, item);
                    continue;
                }
                Section::None => continue,
            };
            target.push(item.to_string());
            recognised = true;
            continue;
        }

        let lower = line.to_lowercase();

        if let Some(food_type) = food_type_value(line, &lower) {
            analysis.food_type = food_type.to_string();
            recognised = true;
            continue;
        }

        if let Some(next) = section_for(&lower) {
            section = next;
            recognised = true;
        }
    }

    recognised.then_some(analysis)
}

fn bullet_item(line: &str) -> Option<&str> {
    let rest = line
        .strip_prefix('-')
        .or_else(|| line.strip_prefix('•'))
        .or_else(|| line.strip_prefix("* "))?;
    let item = rest.trim();

    // Markdown rules ("---") are not items.
    if item.chars().all(|c| c == '-') {
        return Some("");
    }
    Some(item)
}

fn section_for(lower: &str) -> Option<Section> {
    SECTION_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| lower.contains(keyword)))
        .map(|(section, _)| *section)
}

fn food_type_value<'a>(line: &'a str, lower: &str) -> Option<&'a str> {
    if !(lower.contains("jenis makanan") || lower.contains("food type")) {
        return None;
    }

    let (_, value) = line.split_once(':')?;
    let value = value.trim().trim_matches('*').trim();
    (!value.is_empty()).then_some(value)
}

fn assign_nutrient(profile: &mut NutrientProfile, item: &str) -> bool {
    let Some((name, level)) = item.split_once(':') else {
        return false;
    };
    let level = level.trim();
    if level.is_empty() {
        return false;
    }

    let name = name.to_lowercase();
    let slot = if name.contains("protein") {
        &mut profile.protein
    } else if name.contains("karbohidrat") || name.contains("carb") {
        &mut profile.carbs
    } else if name.contains("lemak") || name.contains("fat") {
        &mut profile.fat
    } else if name.contains("serat") || name.contains("fiber") || name.contains("fibre") {
        &mut profile.fiber
    } else if name.contains("vitamin") || name.contains("mineral") {
        &mut profile.vitamins
    } else {
        return false;
    };

    *slot = level.to_string();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::nutrition::fallback::{DEFAULT_RECOMMENDATIONS, UNKNOWN_FOOD_TYPE};

    fn default_recommendations() -> Vec<String> {
        DEFAULT_RECOMMENDATIONS.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn well_formed_json_is_returned_as_is() {
        let raw = r#"
        {
            "food_type": "makanan berat tradisional",
            "components": ["nasi", "ayam goreng", "sambal"],
            "nutrition": {
                "protein": "tinggi",
                "carbs": "tinggi",
                "fat": "sedang",
                "fiber": "rendah",
                "vitamins": "vitamin B, zat besi"
            },
            "deficiencies": ["serat", "vitamin C"],
            "recommendations": ["Tambahkan lalapan", "Kurangi sambal berminyak"]
        }"#;

        let parsed = parse_analysis(raw);
        let ParsedAnalysis::Structured(analysis) = parsed else {
            panic!("expected structured parse, got {parsed:?}");
        };

        assert_eq!(analysis.food_type, "makanan berat tradisional");
        assert_eq!(analysis.components, vec!["nasi", "ayam goreng", "sambal"]);
        assert_eq!(
            analysis.nutrition,
            NutrientProfile {
                protein: "tinggi".to_string(),
                carbs: "tinggi".to_string(),
                fat: "sedang".to_string(),
                fiber: "rendah".to_string(),
                vitamins: "vitamin B, zat besi".to_string(),
            }
        );
        assert_eq!(analysis.deficiencies, vec!["serat", "vitamin C"]);
        assert_eq!(
            analysis.recommendations,
            vec!["Tambahkan lalapan", "Kurangi sambal berminyak"]
        );
    }

    #[test]
    fn fenced_json_is_unwrapped() {
        let raw = "Berikut hasilnya:\n```json\n{\"food_type\": \"camilan\", \"recommendations\": [\"Makan buah\"]}\n```";

        let parsed = parse_analysis(raw);

        assert!(matches!(parsed, ParsedAnalysis::Structured(_)));
        assert_eq!(parsed.analysis().food_type, "camilan");
        assert_eq!(parsed.analysis().recommendations, vec!["Makan buah"]);
    }

    #[test]
    fn json_with_empty_recommendations_gets_defaults() {
        let parsed = parse_analysis(r#"{"food_type": "sup", "recommendations": []}"#);

        assert!(matches!(parsed, ParsedAnalysis::Structured(_)));
        assert_eq!(parsed.analysis().recommendations, default_recommendations());
    }

    #[test]
    fn recommendation_bullets_are_collected_from_prose() {
        let raw = "Rekomendasi:\n- Eat more vegetables\n- Drink water";

        let parsed = parse_analysis(raw);

        assert!(matches!(parsed, ParsedAnalysis::Heuristic(_)));
        assert!(
            parsed
                .analysis()
                .recommendations
                .contains(&"Eat more vegetables".to_string())
        );
    }

    #[test]
    fn sections_switch_on_keywords() {
        let raw = "\
Jenis makanan: makanan berat
Komponen bahan utama:
• nasi putih
• rendang

Kandungan gizi:
- Protein: tinggi
- Karbohidrat: tinggi
- Serat: rendah
- catatan tanpa format

IDENTIFIKASI KEKURANGAN GIZI
- Kurang sayuran

Saran:
- Tambahkan sayur bayam
Terima kasih sudah bertanya
- Minum air putih";

        let parsed = parse_analysis(raw);
        let analysis = parsed.analysis();

        assert!(matches!(parsed, ParsedAnalysis::Heuristic(_)));
        assert_eq!(analysis.food_type, "makanan berat");
        assert_eq!(analysis.components, vec!["nasi putih", "rendang"]);
        assert_eq!(analysis.nutrition.protein, "tinggi");
        assert_eq!(analysis.nutrition.carbs, "tinggi");
        assert_eq!(analysis.nutrition.fiber, "rendah");
        assert_eq!(analysis.nutrition.fat, "tidak diketahui");
        assert_eq!(analysis.deficiencies, vec!["Kurang sayuran"]);
        assert_eq!(
            analysis.recommendations,
            vec!["Tambahkan sayur bayam", "Minum air putih"]
        );
    }

    #[test]
    fn prose_without_recommendations_gets_defaults() {
        let parsed = parse_analysis("Komponen:\n- tahu\n- tempe");

        assert_eq!(parsed.analysis().components, vec!["tahu", "tempe"]);
        assert_eq!(parsed.analysis().recommendations, default_recommendations());
    }

    #[test]
    fn broken_json_falls_back_to_scanning() {
        let parsed = parse_analysis("{\"food_type\": \"nasi\", \n Rekomendasi:\n- Makan sayur");

        assert!(matches!(parsed, ParsedAnalysis::Heuristic(_)));
        assert_eq!(parsed.analysis().recommendations, vec!["Makan sayur"]);
    }

    #[test]
    fn unusable_text_yields_default_analysis() {
        for raw in ["", "   ", "Maaf, saya tidak bisa membantu.", "{not json", "---\n---"] {
            let parsed = parse_analysis(raw);
            assert!(parsed.is_default(), "expected default for {raw:?}");
            assert_eq!(parsed.analysis().food_type, UNKNOWN_FOOD_TYPE);
        }
    }

    #[test]
    fn recommendations_are_never_empty() {
        let inputs = [
            "",
            "{}",
            r#"{"recommendations": null}"#,
            r#"{"recommendations": ["", "  "]}"#,
            "Rekomendasi:\n",
            "Rekomendasi:\n- \n-",
            "random words",
            "```json\n{\"components\": []}\n```",
        ];

        for raw in inputs {
            assert!(
                !parse_analysis(raw).analysis().recommendations.is_empty(),
                "empty recommendations for {raw:?}"
            );
        }
    }
}
