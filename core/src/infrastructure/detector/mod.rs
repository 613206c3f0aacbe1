#[cfg(feature = "onnx")]
mod labels;
#[cfg(feature = "onnx")]
mod onnx;
#[cfg(feature = "onnx")]
mod postprocess;

#[cfg(not(feature = "onnx"))]
mod disabled;

#[cfg(not(feature = "onnx"))]
pub use disabled::DisabledDetector as FoodDetector;
#[cfg(feature = "onnx")]
pub use onnx::OnnxDetector as FoodDetector;
