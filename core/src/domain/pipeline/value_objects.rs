use bytes::Bytes;

#[derive(Debug, Clone)]
pub struct AnalyzeImageInput {
    pub filename: String,
    pub image_data: Bytes,
}

impl AnalyzeImageInput {
    pub fn new(filename: impl Into<String>, image_data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            image_data: image_data.into(),
        }
    }
}
