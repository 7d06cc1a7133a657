use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::application::ports::image_cdn::ImageUpload;
use crate::application::ports::ocr_engine::OcrEngine;

/// Client for a tesseract-server compatible endpoint (`POST {base}/tesseract`).
pub struct HttpOcrEngine {
    client: reqwest::Client,
    endpoint: String,
    language: String,
}

#[derive(Debug, Deserialize)]
struct OcrReply {
    data: OcrData,
}

#[derive(Debug, Deserialize)]
struct OcrData {
    stdout: String,
}

impl HttpOcrEngine {
    pub fn new(base_url: &str, language: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/tesseract", base_url.trim_end_matches('/')),
            language: language.to_string(),
        })
    }
}

#[async_trait]
impl OcrEngine for HttpOcrEngine {
    async fn recognize(&self, image: &ImageUpload) -> anyhow::Result<String> {
        let mut file = reqwest::multipart::Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone());
        if let Some(ct) = &image.content_type {
            file = file.mime_str(ct)?;
        }
        let options = json!({ "languages": [self.language] }).to_string();
        let form = reqwest::multipart::Form::new()
            .text("options", options)
            .part("file", file);

        let resp = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("ocr request failed: {e}"))?;
        if !resp.status().is_success() {
            anyhow::bail!("ocr service returned status {}", resp.status());
        }
        let reply: OcrReply = resp
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("unreadable ocr reply: {e}"))?;
        tracing::debug!(file = %image.file_name, chars = reply.data.stdout.len(), "ocr_recognized");
        Ok(reply.data.stdout)
    }
}
