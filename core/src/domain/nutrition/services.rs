use tracing::{debug, warn};

use crate::domain::nutrition::{
    entities::{AnalysisSource, NutritionAnalysis},
    fallback::advice_unavailable_analysis,
    parser::{ParsedAnalysis, parse_analysis},
    ports::AdviceClient,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advice {
    pub analysis: NutritionAnalysis,
    pub source: AnalysisSource,
}

/// Asks the LLM and shapes whatever comes back. Never fails: an unreachable
/// LLM yields the canned fallback, an unreadable answer the default analysis.
pub async fn advise<A>(client: &A, prompt: String) -> Advice
where
    A: AdviceClient,
{
    match client.ask(prompt).await {
        Ok(text) => {
            let parsed = parse_analysis(&text);
            let source = if parsed.is_default() {
                AnalysisSource::Fallback
            } else {
                AnalysisSource::Llm
            };
            debug!(?source, structured = matches!(parsed, ParsedAnalysis::Structured(_)), "LLM answer parsed");

            Advice {
                analysis: parsed.into_analysis(),
                source,
            }
        }
        Err(e) => {
            warn!(error = %e, "Nutrition advice unavailable, serving fallback analysis");
            Advice {
                analysis: advice_unavailable_analysis(),
                source: AnalysisSource::Fallback,
            }
        }
    }
}
