use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};
use nutrivision_core::domain::{
    common::{DetectorConfig, LLMConfig, NutrivisionConfig, PipelineConfig},
    nutrition::prompt::PromptStyle,
};

#[derive(Debug, Clone, Parser)]
#[command(name = "nutrivision", version, about = "Food image detection and nutrition analysis API")]
pub struct Args {
    #[command(flatten)]
    pub server: ServerArgs,

    #[command(flatten)]
    pub llm: LlmArgs,

    #[command(flatten)]
    pub detector: DetectorArgs,

    #[command(flatten)]
    pub pipeline: PipelineArgs,

    #[command(flatten)]
    pub log: LogArgs,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ServerArgs {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    #[arg(long, env = "ROOT_PATH", default_value = "")]
    pub root_path: String,

    #[arg(
        long,
        env = "ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 60)]
    pub request_timeout_secs: u64,

    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = 10 * 1024 * 1024)]
    pub max_upload_bytes: usize,

    #[arg(long = "metrics", env = "METRICS_ENABLED", default_value_t = true, action = ArgAction::Set)]
    pub metrics_enabled: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct LlmArgs {
    #[arg(long, env = "MISTRAL_API_KEY", hide_env_values = true)]
    pub mistral_api_key: Option<String>,

    #[arg(long, env = "MISTRAL_MODEL", default_value = "mistral-small-latest")]
    pub mistral_model: String,

    #[arg(long, env = "MISTRAL_BASE_URL", default_value = "https://api.mistral.ai/v1")]
    pub mistral_base_url: String,

    #[arg(long, env = "LLM_TIMEOUT_SECS", default_value_t = 30)]
    pub llm_timeout_secs: u64,

    #[arg(long, env = "LLM_PROBE_TIMEOUT_SECS", default_value_t = 5)]
    pub llm_probe_timeout_secs: u64,
}

#[derive(clap::Args, Debug, Clone)]
pub struct DetectorArgs {
    #[arg(long, env = "MODEL_PATH", default_value = "models/best.onnx")]
    pub model_path: PathBuf,

    #[arg(long, env = "LABELS_PATH", default_value = "models/labels.txt")]
    pub labels_path: PathBuf,

    #[arg(
        long,
        env = "MODEL_INPUT_SIZE",
        default_value_t = 640,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub model_input_size: u32,

    #[arg(long, env = "MODEL_CONFIDENCE", default_value_t = 0.25, value_parser = parse_unit_interval)]
    pub model_confidence: f32,

    #[arg(long, env = "MIN_CONFIDENCE", default_value_t = 0.5, value_parser = parse_unit_interval)]
    pub min_confidence: f32,

    #[arg(long, env = "IOU_THRESHOLD", default_value_t = 0.45, value_parser = parse_unit_interval)]
    pub iou_threshold: f32,

    #[arg(long, env = "MAX_DETECTIONS", default_value_t = 8)]
    pub max_detections: usize,

    #[arg(long, env = "MAX_IMAGE_DIMENSION", default_value_t = 1280)]
    pub max_image_dimension: u32,
}

/// Accepts a probability-like threshold in `0.0..=1.0`.
fn parse_unit_interval(value: &str) -> Result<f32, String> {
    let parsed: f32 = value
        .parse()
        .map_err(|e| format!("`{value}` is not a number: {e}"))?;

    if (0.0..=1.0).contains(&parsed) {
        Ok(parsed)
    } else {
        Err(format!("`{value}` must be between 0.0 and 1.0"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PromptStyleArg {
    Comprehensive,
    Simple,
}

impl From<PromptStyleArg> for PromptStyle {
    fn from(style: PromptStyleArg) -> Self {
        match style {
            PromptStyleArg::Comprehensive => PromptStyle::Comprehensive,
            PromptStyleArg::Simple => PromptStyle::Simple,
        }
    }
}

#[derive(clap::Args, Debug, Clone)]
pub struct PipelineArgs {
    #[arg(long, env = "DETECTION_WORKERS", default_value_t = 4)]
    pub detection_workers: usize,

    #[arg(long, env = "MAX_BATCH_SIZE", default_value_t = 10)]
    pub max_batch_size: usize,

    #[arg(long, env = "PROMPT_DETAIL_LIMIT", default_value_t = 5)]
    pub prompt_detail_limit: usize,

    #[arg(long, env = "PROMPT_STYLE", value_enum, default_value_t = PromptStyleArg::Comprehensive)]
    pub prompt_style: PromptStyleArg,
}

#[derive(clap::Args, Debug, Clone)]
pub struct LogArgs {
    #[arg(long = "log-filter", env = "RUST_LOG", default_value = "info")]
    pub filter: String,

    #[arg(long = "log-json", env = "LOG_JSON", default_value_t = false, action = ArgAction::Set)]
    pub json: bool,
}

impl ServerArgs {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl From<Args> for NutrivisionConfig {
    fn from(args: Args) -> Self {
        let request_timeout = args.server.request_timeout();

        let llm = LLMConfig {
            api_key: args.llm.mistral_api_key.filter(|key| !key.trim().is_empty()),
            model: args.llm.mistral_model,
            base_url: args.llm.mistral_base_url,
            timeout: Duration::from_secs(args.llm.llm_timeout_secs),
            probe_timeout: Duration::from_secs(args.llm.llm_probe_timeout_secs),
        }
        .bounded_by(request_timeout);

        NutrivisionConfig {
            detector: DetectorConfig {
                model_path: args.detector.model_path,
                labels_path: args.detector.labels_path,
                input_size: args.detector.model_input_size,
                model_confidence: args.detector.model_confidence,
                min_confidence: args.detector.min_confidence,
                iou_threshold: args.detector.iou_threshold,
                max_detections: args.detector.max_detections,
                max_image_dimension: args.detector.max_image_dimension,
            },
            llm,
            pipeline: PipelineConfig {
                detection_workers: args.pipeline.detection_workers,
                max_batch_size: args.pipeline.max_batch_size,
                prompt_detail_limit: args.pipeline.prompt_detail_limit,
                prompt_style: args.pipeline.prompt_style.into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["nutrivision"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn llm_timeout_is_bounded_by_request_timeout() {
        let args = parse(&["--request-timeout-secs", "10", "--llm-timeout-secs", "45"]);

        let config = NutrivisionConfig::from(args);

        assert_eq!(config.llm.timeout, Duration::from_secs(9));
        assert!(config.llm.probe_timeout <= config.llm.timeout);
    }

    #[test]
    fn origins_are_comma_separated() {
        let args = parse(&["--allowed-origins", "http://a.test,http://b.test"]);

        assert_eq!(
            args.server.allowed_origins,
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }

    #[test]
    fn prompt_style_and_metrics_flags_parse() {
        let args = parse(&["--prompt-style", "simple", "--metrics", "false"]);

        assert!(!args.server.metrics_enabled);
        let config = NutrivisionConfig::from(args);
        assert_eq!(config.pipeline.prompt_style, PromptStyle::Simple);
    }

    #[test]
    fn out_of_range_detector_settings_are_rejected() {
        for extra in [
            ["--model-input-size", "0"],
            ["--min-confidence", "1.5"],
            ["--model-confidence", "-0.1"],
            ["--iou-threshold", "2"],
            ["--min-confidence", "high"],
        ] {
            let mut argv = vec!["nutrivision"];
            argv.extend_from_slice(&extra);
            assert!(Args::try_parse_from(argv).is_err(), "accepted {extra:?}");
        }
    }

    #[test]
    fn boundary_thresholds_are_accepted() {
        let args = parse(&["--min-confidence", "1.0", "--model-confidence", "0", "--model-input-size", "1"]);

        assert_eq!(args.detector.min_confidence, 1.0);
        assert_eq!(args.detector.model_confidence, 0.0);
        assert_eq!(args.detector.model_input_size, 1);
    }
}
