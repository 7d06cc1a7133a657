use async_trait::async_trait;

use crate::application::ports::image_cdn::ImageUpload;

#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Plain text of the image, one printed row per line.
    async fn recognize(&self, image: &ImageUpload) -> anyhow::Result<String>;
}
