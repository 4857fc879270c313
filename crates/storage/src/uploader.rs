//! S3-backed artwork uploader.
//!
//! [`ArtworkUploader`] pushes a generated image buffer into the bucket
//! under the folder-per-genre layout, derives a JPEG thumbnail, and
//! returns public URLs for both.

use aws_sdk_s3::primitives::ByteStream;

use crate::keys::{artwork_key, folder_for_genre, thumbnail_key};

/// Longest edge of a derived thumbnail, in pixels.
const THUMBNAIL_MAX_EDGE: u32 = 320;

/// Storage configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Bucket receiving all artwork objects.
    pub bucket: String,
    /// Optional custom endpoint for S3-compatible stores (MinIO, R2).
    pub endpoint: Option<String>,
    /// Public base URL prepended to object keys, e.g. a CDN domain.
    pub public_base_url: String,
}

impl StorageConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                   | Required | Notes                       |
    /// |---------------------------|----------|-----------------------------|
    /// | `ARTWORK_BUCKET`          | yes      | bucket name                 |
    /// | `ARTWORK_S3_ENDPOINT`     | no       | S3-compatible endpoint      |
    /// | `ARTWORK_PUBLIC_BASE_URL` | yes      | CDN or bucket website root  |
    ///
    /// Region and credentials come from the standard AWS environment /
    /// profile chain via `aws-config`.
    pub fn from_env() -> Result<Self, StorageError> {
        let bucket = std::env::var("ARTWORK_BUCKET")
            .map_err(|_| StorageError::Config("ARTWORK_BUCKET must be set"))?;
        let public_base_url = std::env::var("ARTWORK_PUBLIC_BASE_URL")
            .map_err(|_| StorageError::Config("ARTWORK_PUBLIC_BASE_URL must be set"))?;
        let endpoint = std::env::var("ARTWORK_S3_ENDPOINT").ok();

        Ok(Self {
            bucket,
            endpoint,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Result of a successful upload: both objects durably stored, public
/// URLs resolvable, dimensions extracted from the image buffer.
#[derive(Debug, Clone)]
pub struct StoredArtwork {
    pub image_url: String,
    pub thumbnail_url: String,
    pub key: String,
    pub folder: String,
    pub width: u32,
    pub height: u32,
}

/// Errors from the storage facade.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Required configuration is missing.
    #[error("Storage configuration error: {0}")]
    Config(&'static str),

    /// The buffer could not be decoded as an image.
    #[error("Image decode error: {0}")]
    Decode(String),

    /// An S3 call failed.
    #[error("S3 error: {0}")]
    S3(String),
}

/// Uploads generated artwork into owned durable storage.
pub struct ArtworkUploader {
    client: aws_sdk_s3::Client,
    config: StorageConfig,
}

impl ArtworkUploader {
    /// Build an uploader from the ambient AWS environment and the
    /// given storage configuration.
    pub async fn new(config: StorageConfig) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(ref endpoint) = config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;
        let client = aws_sdk_s3::Client::new(&sdk_config);

        Self { client, config }
    }

    /// Build an uploader from an existing S3 client (used by tests and
    /// by callers that manage their own AWS config).
    pub fn with_client(client: aws_sdk_s3::Client, config: StorageConfig) -> Self {
        Self { client, config }
    }

    /// Store an image buffer under the genre's folder and return its
    /// public addressing.
    ///
    /// The full-size object is stored as PNG under a fresh UUID key;
    /// a JPEG thumbnail (longest edge [`THUMBNAIL_MAX_EDGE`]) is stored
    /// beside it. Dimensions are read from the decoded buffer.
    pub async fn upload(&self, bytes: &[u8], genre: &str) -> Result<StoredArtwork, StorageError> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| StorageError::Decode(e.to_string()))?;
        let (width, height) = (decoded.width(), decoded.height());

        let id = uuid::Uuid::new_v4().to_string();
        let key = artwork_key(genre, &id);
        let thumb_key = thumbnail_key(&key)
            .ok_or(StorageError::Config("generated key has unexpected layout"))?;

        // Full-size object first; a thumbnail without its image is
        // useless, the reverse is tolerable.
        self.put_object(&key, bytes.to_vec(), "image/png").await?;

        let thumb_bytes = encode_thumbnail(&decoded)?;
        self.put_object(&thumb_key, thumb_bytes, "image/jpeg")
            .await?;

        tracing::debug!(genre, key = %key, width, height, "Artwork stored");

        Ok(StoredArtwork {
            image_url: self.public_url(&key),
            thumbnail_url: self.public_url(&thumb_key),
            key,
            folder: folder_for_genre(genre),
            width,
            height,
        })
    }

    /// Delete an image object and its derived thumbnail.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.delete_object(key).await?;
        if let Some(thumb_key) = thumbnail_key(key) {
            self.delete_object(&thumb_key).await?;
        }
        Ok(())
    }

    /// Public URL for a stored object key.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.config.public_base_url)
    }

    // ---- private helpers ----

    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| StorageError::S3(e.to_string()))?;
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::S3(e.to_string()))?;
        Ok(())
    }
}

/// Downscale to the thumbnail bound and encode as JPEG.
fn encode_thumbnail(decoded: &image::DynamicImage) -> Result<Vec<u8>, StorageError> {
    let thumb = decoded.thumbnail(THUMBNAIL_MAX_EDGE, THUMBNAIL_MAX_EDGE);
    let mut out = std::io::Cursor::new(Vec::new());
    thumb
        .to_rgb8()
        .write_to(&mut out, image::ImageFormat::Jpeg)
        .map_err(|e| StorageError::Decode(e.to_string()))?;
    Ok(out.into_inner())
}
