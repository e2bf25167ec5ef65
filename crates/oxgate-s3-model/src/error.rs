//! Error taxonomy for gateway operations.
//!
//! [`S3ErrorCode`] is a closed set: every error the gateway can emit maps
//! to exactly one code, and each code carries a default HTTP status and
//! message. Callers that need request context attach it through the
//! [`S3Error`] builders.

use std::fmt;

/// Error codes the gateway can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum S3ErrorCode {
    /// The requested bucket name is already taken.
    BucketAlreadyExists,
    /// An unexpected failure in the gateway or its backend.
    InternalError,
    /// The bucket name does not satisfy the naming rules.
    InvalidBucketName,
    /// The request body could not be parsed as the expected XML document.
    MalformedXML,
    /// The specified bucket does not exist.
    NoSuchBucket,
}

impl S3ErrorCode {
    /// Returns the error code as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BucketAlreadyExists => "BucketAlreadyExists",
            Self::InternalError => "InternalError",
            Self::InvalidBucketName => "InvalidBucketName",
            Self::MalformedXML => "MalformedXML",
            Self::NoSuchBucket => "NoSuchBucket",
        }
    }

    /// Returns the default HTTP status code for this error.
    #[must_use]
    pub fn default_status_code(&self) -> http::StatusCode {
        match self {
            Self::InvalidBucketName | Self::MalformedXML => http::StatusCode::BAD_REQUEST,
            Self::NoSuchBucket => http::StatusCode::NOT_FOUND,
            Self::BucketAlreadyExists => http::StatusCode::CONFLICT,
            Self::InternalError => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the default message for this error.
    #[must_use]
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::BucketAlreadyExists => "The requested bucket name is not available",
            Self::InternalError => "Internal server error",
            Self::InvalidBucketName => "The specified bucket is not valid",
            Self::MalformedXML => "The XML you provided was not well-formed",
            Self::NoSuchBucket => "The specified bucket does not exist",
        }
    }
}

impl fmt::Display for S3ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An S3 error response.
#[derive(Debug)]
pub struct S3Error {
    /// The error code.
    pub code: S3ErrorCode,
    /// A human-readable error message.
    pub message: String,
    /// The resource that caused the error.
    pub resource: Option<String>,
    /// The request ID.
    pub request_id: Option<String>,
    /// The HTTP status code.
    pub status_code: http::StatusCode,
    /// The underlying source error, if any.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for S3Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S3Error({}): {}", self.code, self.message)
    }
}

impl std::error::Error for S3Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl S3Error {
    /// Create a new S3Error from an error code.
    #[must_use]
    pub fn new(code: S3ErrorCode) -> Self {
        let status_code = code.default_status_code();
        let message = code.default_message().to_owned();
        Self {
            code,
            message,
            resource: None,
            request_id: None,
            status_code,
            source: None,
        }
    }

    /// Create a new S3Error with a custom message.
    #[must_use]
    pub fn with_message(code: S3ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status_code: code.default_status_code(),
            message: message.into(),
            code,
            resource: None,
            request_id: None,
            source: None,
        }
    }

    /// Set the resource that caused this error.
    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Set the request ID.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Set the source error.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Create a BucketAlreadyExists error.
    #[must_use]
    pub fn bucket_already_exists(bucket_name: impl Into<String>) -> Self {
        Self::new(S3ErrorCode::BucketAlreadyExists).with_resource(bucket_name)
    }

    /// Create an InternalError error.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::with_message(S3ErrorCode::InternalError, message)
    }

    /// Create an InvalidBucketName error.
    #[must_use]
    pub fn invalid_bucket_name(bucket_name: impl Into<String>) -> Self {
        Self::new(S3ErrorCode::InvalidBucketName).with_resource(bucket_name)
    }

    /// Create a MalformedXML error.
    #[must_use]
    pub fn malformed_xml(detail: impl Into<String>) -> Self {
        Self::new(S3ErrorCode::MalformedXML).with_resource(detail)
    }

    /// Create a NoSuchBucket error.
    #[must_use]
    pub fn no_such_bucket(bucket_name: impl Into<String>) -> Self {
        Self::new(S3ErrorCode::NoSuchBucket).with_resource(bucket_name)
    }
}

/// Create an S3Error from an error code.
///
/// # Examples
///
/// ```
/// use oxgate_s3_model::s3_error;
/// use oxgate_s3_model::error::S3ErrorCode;
///
/// let err = s3_error!(NoSuchBucket);
/// assert_eq!(err.code, S3ErrorCode::NoSuchBucket);
///
/// let err = s3_error!(MalformedXML, "unexpected trailing content");
/// assert_eq!(err.message, "unexpected trailing content");
/// ```
#[macro_export]
macro_rules! s3_error {
    ($code:ident) => {
        $crate::error::S3Error::new($crate::error::S3ErrorCode::$code)
    };
    ($code:ident, $msg:expr) => {
        $crate::error::S3Error::with_message($crate::error::S3ErrorCode::$code, $msg)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_carry_default_status_and_message() {
        let err = S3Error::new(S3ErrorCode::BucketAlreadyExists);
        assert_eq!(err.status_code, http::StatusCode::CONFLICT);
        assert_eq!(err.message, "The requested bucket name is not available");
        assert!(err.resource.is_none());
    }

    #[test]
    fn test_should_attach_resource_and_request_id() {
        let err = S3Error::malformed_xml("body")
            .with_request_id("req-42")
            .with_resource("my-bucket");
        assert_eq!(err.code, S3ErrorCode::MalformedXML);
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
        assert_eq!(err.resource.as_deref(), Some("my-bucket"));
        assert_eq!(err.request_id.as_deref(), Some("req-42"));
    }

    #[test]
    fn test_should_expose_source_error() {
        let io = std::io::Error::other("disk gone");
        let err = S3Error::internal_error("metadata write failed").with_source(io);
        let source = std::error::Error::source(&err);
        assert!(source.is_some_and(|s| s.to_string().contains("disk gone")));
    }

    #[test]
    fn test_should_map_codes_to_status() {
        assert_eq!(
            S3ErrorCode::InvalidBucketName.default_status_code(),
            http::StatusCode::BAD_REQUEST
        );
        assert_eq!(
            S3ErrorCode::NoSuchBucket.default_status_code(),
            http::StatusCode::NOT_FOUND
        );
        assert_eq!(
            S3ErrorCode::InternalError.default_status_code(),
            http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
