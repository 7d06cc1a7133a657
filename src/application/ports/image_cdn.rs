use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// File name without its extension.
    pub fn stem(&self) -> &str {
        match self.file_name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.file_name,
        }
    }
}

#[async_trait]
pub trait ImageCdn: Send + Sync {
    /// Stores the image under `folder/public_id` and returns its public URL.
    async fn upload(
        &self,
        folder: &str,
        public_id: &str,
        image: &ImageUpload,
    ) -> anyhow::Result<String>;
    async fn delete(&self, url: &str) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str) -> ImageUpload {
        ImageUpload {
            file_name: name.into(),
            content_type: None,
            bytes: vec![],
        }
    }

    #[test]
    fn stem_drops_last_extension_only() {
        assert_eq!(upload("front.side.jpg").stem(), "front.side");
        assert_eq!(upload("inside").stem(), "inside");
        assert_eq!(upload(".hidden").stem(), ".hidden");
    }
}
