//! S3 object store backend.

use crate::ObjectStore;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use thumbra_core::{ObjectMetadata, ObjectPayload, StorageKey, content_type_for};
use thumbra_error::{StorageError, StorageErrorKind, StorageResult};

/// Connection settings for [`S3Store`].
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct S3Settings {
    region: String,
    bucket: String,
    access_key: String,
    secret_key: String,
    endpoint: Option<String>,
    force_path_style: bool,
}

impl S3Settings {
    /// Settings for AWS proper with static credentials.
    pub fn new(
        region: impl Into<String>,
        bucket: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            bucket: bucket.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            endpoint: None,
            force_path_style: false,
        }
    }

    /// Point at an S3-compatible service instead of AWS.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Address buckets by path rather than virtual host.
    pub fn with_force_path_style(mut self, force_path_style: bool) -> Self {
        self.force_path_style = force_path_style;
        self
    }
}

/// Object store backed by a single S3 bucket.
///
/// Uploaded objects are written with a public-read ACL so the CDN in front of
/// the bucket can serve them directly.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Build a client from `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageErrorKind::InvalidConfig`] if the bucket name is empty.
    #[tracing::instrument(skip(settings), fields(bucket = %settings.bucket, region = %settings.region))]
    pub async fn connect(settings: &S3Settings) -> StorageResult<Self> {
        if settings.bucket.trim().is_empty() {
            return Err(StorageError::new(StorageErrorKind::InvalidConfig(
                "s3 bucket must not be empty".to_string(),
            )));
        }

        let credentials = Credentials::new(
            &settings.access_key,
            &settings.secret_key,
            None,
            None,
            "thumbra-static",
        );
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(settings.force_path_style);
        if let Some(endpoint) = &settings.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        tracing::info!(endpoint = ?settings.endpoint, "Connected S3 store");
        Ok(Self::from_client(
            Client::from_conf(builder.build()),
            settings.bucket.clone(),
        ))
    }

    /// Wrap an already configured client.
    pub fn from_client(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Bucket objects are read from and written to.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

/// Collapse an SDK failure onto the closed storage error set.
fn classify<E>(
    key: &StorageKey,
    err: SdkError<E, HttpResponse>,
    missing: impl Fn(&E) -> bool,
) -> StorageError
where
    E: std::error::Error + Send + Sync + 'static,
{
    let status = err.raw_response().map(|response| response.status().as_u16());
    let absent = err.as_service_error().is_some_and(missing) || status == Some(404);
    if absent {
        return StorageError::new(StorageErrorKind::NotFound(key.to_string()));
    }

    let message = format!("{}: {}", key, DisplayErrorContext(&err));
    let kind = match err {
        SdkError::TimeoutError(_) => StorageErrorKind::Timeout(message),
        SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            StorageErrorKind::Transport(message)
        }
        _ => StorageErrorKind::Backend(message),
    };
    StorageError::new(kind)
}

fn to_utc(value: Option<&aws_sdk_s3::primitives::DateTime>) -> Option<DateTime<Utc>> {
    value.and_then(|dt| DateTime::from_timestamp(dt.secs(), dt.subsec_nanos()))
}

#[async_trait::async_trait]
impl ObjectStore for S3Store {
    #[tracing::instrument(skip(self, key), fields(bucket = %self.bucket, key = %key))]
    async fn get(&self, key: &StorageKey) -> StorageResult<ObjectPayload> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key.as_str())
            .send()
            .await
            .map_err(|e| classify(key, e, |e: &GetObjectError| e.is_no_such_key()))?;

        let metadata = ObjectMetadata {
            content_type: output
                .content_type()
                .map(str::to_string)
                .unwrap_or_else(|| content_type_for(key.file_name()).to_string()),
            length: output.content_length().unwrap_or_default().max(0) as u64,
            e_tag: output.e_tag().map(str::to_string),
            last_modified: to_utc(output.last_modified()),
            content_disposition: output.content_disposition().map(str::to_string),
        };

        let body: Bytes = output
            .body
            .collect()
            .await
            .map_err(|e| {
                StorageError::new(StorageErrorKind::Transport(format!(
                    "reading body of {}: {}",
                    key, e
                )))
            })?
            .into_bytes();

        tracing::debug!(size = body.len(), "Fetched object from S3");
        Ok(ObjectPayload::new(
            ObjectMetadata {
                length: body.len() as u64,
                ..metadata
            },
            body,
        ))
    }

    #[tracing::instrument(skip(self, key), fields(bucket = %self.bucket, key = %key))]
    async fn head(&self, key: &StorageKey) -> StorageResult<ObjectMetadata> {
        let output = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key.as_str())
            .send()
            .await
            .map_err(|e| classify(key, e, |e: &HeadObjectError| e.is_not_found()))?;

        Ok(ObjectMetadata {
            content_type: output
                .content_type()
                .map(str::to_string)
                .unwrap_or_else(|| content_type_for(key.file_name()).to_string()),
            length: output.content_length().unwrap_or_default().max(0) as u64,
            e_tag: output.e_tag().map(str::to_string),
            last_modified: to_utc(output.last_modified()),
            content_disposition: output.content_disposition().map(str::to_string),
        })
    }

    #[tracing::instrument(skip(self, key, body), fields(bucket = %self.bucket, key = %key, size = body.len()))]
    async fn put(&self, key: &StorageKey, body: Bytes, content_type: &str) -> StorageResult<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key.as_str())
            .body(ByteStream::from(body))
            .content_type(content_type)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| classify(key, e, |_| false))?;

        tracing::info!(content_type, "Uploaded object to S3");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::error::ErrorMetadata;
    use aws_sdk_s3::primitives::SdkBody;
    use aws_sdk_s3::types::error::{NoSuchKey, NotFound};

    fn key() -> StorageKey {
        thumbra_core::ImageLocator::new("metawiki", "a", "a0", "foo.png", "latest").storage_key()
    }

    fn response(status: u16) -> HttpResponse {
        HttpResponse::new(status.try_into().unwrap(), SdkBody::empty())
    }

    fn get_missing(e: &GetObjectError) -> bool {
        e.is_no_such_key()
    }

    fn head_missing(e: &HeadObjectError) -> bool {
        e.is_not_found()
    }

    #[test]
    fn test_no_such_key_is_not_found() {
        let err = SdkError::service_error(
            GetObjectError::NoSuchKey(NoSuchKey::builder().build()),
            response(404),
        );
        let mapped = classify(&key(), err, get_missing);
        assert!(mapped.is_not_found());
    }

    #[test]
    fn test_head_not_found_variant_is_not_found() {
        let err = SdkError::service_error(
            HeadObjectError::NotFound(NotFound::builder().build()),
            response(404),
        );
        assert!(classify(&key(), err, head_missing).is_not_found());
    }

    #[test]
    fn test_bare_404_without_code_is_not_found() {
        let err = SdkError::service_error(
            HeadObjectError::generic(ErrorMetadata::builder().build()),
            response(404),
        );
        assert!(classify(&key(), err, head_missing).is_not_found());
    }

    #[test]
    fn test_server_error_is_backend() {
        let err = SdkError::service_error(
            GetObjectError::generic(
                ErrorMetadata::builder()
                    .code("InternalError")
                    .message("We encountered an internal error")
                    .build(),
            ),
            response(500),
        );
        let mapped = classify(&key(), err, get_missing);
        assert!(!mapped.is_not_found());
        assert!(matches!(mapped.kind(), StorageErrorKind::Backend(_)));
    }

    #[test]
    fn test_access_denied_is_backend_not_missing() {
        let err = SdkError::service_error(
            HeadObjectError::generic(ErrorMetadata::builder().code("AccessDenied").build()),
            response(403),
        );
        let mapped = classify(&key(), err, head_missing);
        assert!(matches!(mapped.kind(), StorageErrorKind::Backend(_)));
    }

    #[test]
    fn test_timeout_is_timeout() {
        let err = SdkError::<GetObjectError, HttpResponse>::timeout_error("operation timed out");
        let mapped = classify(&key(), err, get_missing);
        match mapped.kind() {
            StorageErrorKind::Timeout(message) => assert!(message.contains("metawiki/a/a0/foo.png")),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[test]
    fn test_to_utc() {
        let instant = aws_sdk_s3::primitives::DateTime::from_secs_and_nanos(1_761_089_461, 500);
        let converted = to_utc(Some(&instant)).unwrap();
        assert_eq!(converted.timestamp(), 1_761_089_461);
        assert_eq!(converted.timestamp_subsec_nanos(), 500);
        assert_eq!(to_utc(None), None);
    }
}
