use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{info, warn};

use crate::error::UploadError;
use crate::services::path::ExistsProbe;

/// Chunk size for streamed uploads; one progress callback per chunk
const CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// Byte-level progress callback: cumulative bytes written so far.
pub type ByteProgress<'a> = &'a (dyn Fn(u64) + Send + Sync);

/// Object operations the upload backend needs from a blob container. The
/// `ExistsProbe` supertrait is the capability path resolution runs against.
#[async_trait]
pub trait ObjectStore: ExistsProbe {
    /// Create the container when absent. Losing a creation race to a
    /// concurrent caller counts as success.
    async fn ensure_container(&self) -> Result<(), UploadError>;

    /// Store a small object in one call.
    async fn put(&self, key: &str, content_type: &str, data: Vec<u8>) -> Result<(), UploadError>;

    /// Stream an object from `reader`, reporting cumulative bytes after each
    /// chunk. Returns the number of bytes written.
    async fn put_streaming(
        &self,
        key: &str,
        content_type: &str,
        reader: Box<dyn AsyncRead + Unpin + Send>,
        on_bytes: Option<ByteProgress<'_>>,
    ) -> Result<u64, UploadError>;

    /// The backend's native public URL for an object.
    fn object_url(&self, key: &str) -> String;
}

/// S3-compatible blob container client.
pub struct S3ObjectStore {
    client: Client,
    container: String,
    endpoint: String,
}

impl S3ObjectStore {
    pub fn new(client: Client, container: String, endpoint: String) -> Self {
        Self {
            client,
            container,
            endpoint,
        }
    }
}

fn transfer_error<E, R>(err: SdkError<E, R>) -> UploadError
where
    SdkError<E, R>: std::error::Error + Send + Sync + 'static,
{
    UploadError::Transfer(DisplayErrorContext(err).to_string())
}

#[async_trait]
impl ExistsProbe for S3ObjectStore {
    async fn exists(&self, path: &str) -> Result<bool, UploadError> {
        match self
            .client
            .head_object()
            .bucket(&self.container)
            .key(path)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => {
                let service_error = err.into_service_error();
                if service_error.is_not_found() {
                    Ok(false)
                } else {
                    Err(UploadError::Transfer(service_error.to_string()))
                }
            }
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn ensure_container(&self) -> Result<(), UploadError> {
        if self
            .client
            .head_bucket()
            .bucket(&self.container)
            .send()
            .await
            .is_ok()
        {
            return Ok(());
        }

        info!("🪣 Container '{}' not found, creating...", self.container);
        match self
            .client
            .create_bucket()
            .bucket(&self.container)
            .send()
            .await
        {
            Ok(_) => {
                info!("✅ Container '{}' created", self.container);
                Ok(())
            }
            Err(err) => {
                let service_error = err.into_service_error();
                // A concurrent caller may have created it between the probe
                // and our create.
                if service_error.is_bucket_already_owned_by_you()
                    || service_error.is_bucket_already_exists()
                {
                    Ok(())
                } else {
                    Err(UploadError::ContainerAccess(service_error.to_string()))
                }
            }
        }
    }

    async fn put(&self, key: &str, content_type: &str, data: Vec<u8>) -> Result<(), UploadError> {
        self.client
            .put_object()
            .bucket(&self.container)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(transfer_error)?;
        Ok(())
    }

    async fn put_streaming(
        &self,
        key: &str,
        content_type: &str,
        mut reader: Box<dyn AsyncRead + Unpin + Send>,
        on_bytes: Option<ByteProgress<'_>>,
    ) -> Result<u64, UploadError> {
        let multipart = self
            .client
            .create_multipart_upload()
            .bucket(&self.container)
            .key(key)
            .content_type(content_type)
            .send()
            .await
            .map_err(transfer_error)?;

        let upload_id = multipart
            .upload_id()
            .ok_or_else(|| UploadError::Transfer("no multipart upload id returned".to_string()))?
            .to_string();

        let mut part_number = 1;
        let mut completed_parts = Vec::new();
        let mut total: u64 = 0;
        let mut buffer = vec![0u8; CHUNK_SIZE];

        loop {
            let mut n = 0;
            while n < CHUNK_SIZE {
                let read = reader
                    .read(&mut buffer[n..])
                    .await
                    .map_err(|e| UploadError::Transfer(e.to_string()))?;
                if read == 0 {
                    break;
                }
                n += read;
            }

            if n == 0 {
                break;
            }

            total += n as u64;
            let part = self
                .client
                .upload_part()
                .bucket(&self.container)
                .key(key)
                .upload_id(&upload_id)
                .body(ByteStream::from(buffer[..n].to_vec()))
                .part_number(part_number)
                .send()
                .await
                .map_err(transfer_error)?;

            completed_parts.push(
                CompletedPart::builder()
                    .e_tag(part.e_tag().unwrap_or_default())
                    .part_number(part_number)
                    .build(),
            );

            if let Some(callback) = on_bytes {
                callback(total);
            }
            part_number += 1;
        }

        if completed_parts.is_empty() {
            // Completing a multipart upload with zero parts is rejected, so a
            // zero-byte file becomes a plain put.
            if let Err(err) = self
                .client
                .abort_multipart_upload()
                .bucket(&self.container)
                .key(key)
                .upload_id(&upload_id)
                .send()
                .await
            {
                warn!("Abort of empty multipart upload failed: {:?}", err);
            }
            self.put(key, content_type, Vec::new()).await?;
            return Ok(0);
        }

        self.client
            .complete_multipart_upload()
            .bucket(&self.container)
            .key(key)
            .upload_id(&upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(completed_parts))
                    .build(),
            )
            .send()
            .await
            .map_err(transfer_error)?;

        Ok(total)
    }

    fn object_url(&self, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.endpoint.trim_end_matches('/'),
            self.container,
            key
        )
    }
}
