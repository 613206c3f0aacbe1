pub mod detector;
pub mod llm;
