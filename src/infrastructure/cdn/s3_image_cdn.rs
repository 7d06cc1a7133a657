use anyhow::{Context, anyhow};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::operation::create_bucket::CreateBucketError;
use aws_sdk_s3::operation::head_bucket::HeadBucketError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::{Client, error::SdkError};
use sha2::{Digest, Sha256};

use crate::application::ports::image_cdn::{ImageCdn, ImageUpload};
use crate::bootstrap::config::Config;

/// Public images in an S3-compatible bucket, served from `public_base`.
pub struct S3ImageCdn {
    client: Client,
    bucket: String,
    root_folder: String,
    public_base: String,
}

impl S3ImageCdn {
    pub async fn new(cfg: &Config) -> anyhow::Result<Self> {
        let bucket = cfg
            .s3_bucket
            .clone()
            .context("S3_BUCKET must be configured for image uploads")?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &cfg.s3_region {
            loader = loader.region(Region::new(region.clone()));
        }
        let shared_config = loader.load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&shared_config);

        if let (Some(access), Some(secret)) = (&cfg.s3_access_key, &cfg.s3_secret_key) {
            let creds = Credentials::new(
                access.clone(),
                secret.clone(),
                None,
                None,
                "autohire-s3-static",
            );
            builder = builder.credentials_provider(creds);
        }
        if let Some(endpoint) = &cfg.s3_endpoint {
            builder = builder.endpoint_url(endpoint.clone());
        }
        if cfg.s3_use_path_style {
            builder = builder.force_path_style(true);
        }
        let client = Client::from_conf(builder.build());
        ensure_bucket(&client, &bucket).await?;

        let public_base = public_base_url(cfg, &bucket);
        tracing::info!(bucket = %bucket, public_base = %public_base, "image_cdn_ready");
        Ok(Self {
            client,
            bucket,
            root_folder: cfg.cdn_root_folder.trim_matches('/').to_string(),
            public_base,
        })
    }

    fn key_from_url<'u>(&self, url: &'u str) -> Option<&'u str> {
        url.strip_prefix(&self.public_base)
            .map(|rest| rest.trim_start_matches('/'))
            .filter(|k| !k.is_empty())
    }
}

fn public_base_url(cfg: &Config, bucket: &str) -> String {
    if let Some(base) = &cfg.cdn_public_base_url {
        return base.trim_end_matches('/').to_string();
    }
    match (&cfg.s3_endpoint, &cfg.s3_region) {
        (Some(endpoint), _) => format!("{}/{bucket}", endpoint.trim_end_matches('/')),
        (None, Some(region)) => format!("https://{bucket}.s3.{region}.amazonaws.com"),
        (None, None) => format!("https://{bucket}.s3.amazonaws.com"),
    }
}

/// `root/folder/public-id-<hash>.<ext>`; the content hash keeps re-uploads of
/// the same name from overwriting each other.
pub(crate) fn object_key(root: &str, folder: &str, public_id: &str, image: &ImageUpload) -> String {
    let digest = Sha256::digest(&image.bytes);
    let short: String = digest.iter().take(6).map(|b| format!("{b:02x}")).collect();
    let safe_id: String = public_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    let file = format!("{safe_id}-{short}.{}", extension(image));
    let mut parts: Vec<&str> = [root, folder.trim_matches('/')]
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect();
    parts.push(&file);
    parts.join("/")
}

fn extension(image: &ImageUpload) -> String {
    let from_name = image
        .file_name
        .rsplit_once('.')
        .map(|(_, e)| e.to_ascii_lowercase())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()));
    from_name
        .or_else(|| {
            image
                .content_type
                .as_deref()
                .and_then(mime_guess::get_mime_extensions_str)
                .and_then(|exts| exts.first())
                .map(|e| e.to_string())
        })
        .unwrap_or_else(|| "bin".into())
}

fn content_type(image: &ImageUpload) -> String {
    image.content_type.clone().unwrap_or_else(|| {
        mime_guess::from_path(&image.file_name)
            .first_or_octet_stream()
            .to_string()
    })
}

#[async_trait]
impl ImageCdn for S3ImageCdn {
    async fn upload(
        &self,
        folder: &str,
        public_id: &str,
        image: &ImageUpload,
    ) -> anyhow::Result<String> {
        let key = object_key(&self.root_folder, folder, public_id, image);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type(image))
            .body(ByteStream::from(image.bytes.clone()))
            .send()
            .await
            .with_context(|| format!("failed to upload object {key}"))?;
        Ok(format!("{}/{key}", self.public_base))
    }

    async fn delete(&self, url: &str) -> anyhow::Result<()> {
        let Some(key) = self.key_from_url(url) else {
            tracing::warn!(url = %url, "image_url_outside_cdn");
            return Ok(());
        };
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("failed to delete object {key}"))?;
        Ok(())
    }
}

async fn ensure_bucket(client: &Client, bucket: &str) -> anyhow::Result<()> {
    match client.head_bucket().bucket(bucket).send().await {
        Ok(_) => return Ok(()),
        Err(SdkError::ServiceError(service_err)) => {
            if !matches!(service_err.err(), HeadBucketError::NotFound(_)) {
                return Err(anyhow!(service_err.err().to_string()));
            }
        }
        Err(err) => return Err(anyhow!(err.to_string())),
    }

    match client.create_bucket().bucket(bucket).send().await {
        Ok(_) => Ok(()),
        Err(SdkError::ServiceError(service_err)) => match service_err.err() {
            CreateBucketError::BucketAlreadyOwnedByYou(_) => Ok(()),
            CreateBucketError::BucketAlreadyExists(_) => Ok(()),
            other => Err(anyhow!(other.to_string())),
        },
        Err(err) => Err(anyhow!(err.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, ct: Option<&str>) -> ImageUpload {
        ImageUpload {
            file_name: name.into(),
            content_type: ct.map(Into::into),
            bytes: b"pixels".to_vec(),
        }
    }

    #[test]
    fn key_nests_root_and_folder_and_sanitizes_id() {
        let key = object_key(
            "auto-hire-hub",
            "cars",
            "front side--COID1",
            &upload("front side.JPG", Some("image/jpeg")),
        );
        assert!(key.starts_with("auto-hire-hub/cars/front-side--COID1-"));
        assert!(key.ends_with(".jpg"));
    }

    #[test]
    fn same_bytes_give_same_key() {
        let a = object_key("", "driver-license", "x", &upload("a.png", None));
        let b = object_key("", "driver-license", "x", &upload("a.png", None));
        assert_eq!(a, b);
        assert!(a.starts_with("driver-license/x-"));
    }

    #[test]
    fn extension_falls_back_to_content_type() {
        let ext = extension(&upload("blob", Some("image/png")));
        assert_eq!(ext, "png");
        assert_eq!(extension(&upload("blob", None)), "bin");
    }
}
