//! Validation for incoming requests.
//!
//! Bucket names follow the rules defined in the
//! [Amazon S3 documentation](https://docs.aws.amazon.com/AmazonS3/latest/userguide/bucketnamingrules.html).

use std::net::Ipv4Addr;

use oxgate_s3_model::{S3Error, S3ErrorCode};

/// Minimum bucket name length.
const MIN_BUCKET_NAME_LEN: usize = 3;

/// Maximum bucket name length.
const MAX_BUCKET_NAME_LEN: usize = 63;

/// Validate an S3 bucket name.
///
/// Rules (per AWS documentation):
/// - 3-63 characters long
/// - Only lowercase letters, numbers, hyphens, and dots
/// - Must start and end with a letter or number
/// - No consecutive dots (`..`)
/// - Not formatted as an IPv4 address (e.g. `192.168.0.1`)
/// - Must not start with `xn--`
/// - Must not end with `-s3alias`
/// - Must not start with `sthree-`
///
/// # Errors
///
/// Returns an `InvalidBucketName` error if any rule is violated.
///
/// # Examples
///
/// ```
/// use oxgate_s3_core::validation::validate_bucket_name;
///
/// assert!(validate_bucket_name("my-valid-bucket").is_ok());
/// assert!(validate_bucket_name("AB").is_err());
/// ```
pub fn validate_bucket_name(name: &str) -> Result<(), S3Error> {
    let len = name.len();

    if !(MIN_BUCKET_NAME_LEN..=MAX_BUCKET_NAME_LEN).contains(&len) {
        return Err(invalid_name(
            name,
            format!(
                "Bucket name must be between {MIN_BUCKET_NAME_LEN} and {MAX_BUCKET_NAME_LEN} characters long"
            ),
        ));
    }

    if !name
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'.')
    {
        return Err(invalid_name(
            name,
            "Bucket name must only contain lowercase letters, numbers, hyphens, and dots",
        ));
    }

    let first = name.as_bytes()[0];
    let last = name.as_bytes()[len - 1];
    if !(first.is_ascii_lowercase() || first.is_ascii_digit())
        || !(last.is_ascii_lowercase() || last.is_ascii_digit())
    {
        return Err(invalid_name(
            name,
            "Bucket name must start and end with a letter or number",
        ));
    }

    if name.contains("..") {
        return Err(invalid_name(
            name,
            "Bucket name must not contain consecutive dots",
        ));
    }

    if name.parse::<Ipv4Addr>().is_ok() {
        return Err(invalid_name(
            name,
            "Bucket name must not be formatted as an IP address",
        ));
    }

    if name.starts_with("xn--") {
        return Err(invalid_name(
            name,
            "Bucket name must not start with 'xn--'",
        ));
    }

    if name.ends_with("-s3alias") {
        return Err(invalid_name(
            name,
            "Bucket name must not end with '-s3alias'",
        ));
    }

    if name.starts_with("sthree-") {
        return Err(invalid_name(
            name,
            "Bucket name must not start with 'sthree-'",
        ));
    }

    Ok(())
}

fn invalid_name(name: &str, reason: impl Into<String>) -> S3Error {
    S3Error::with_message(S3ErrorCode::InvalidBucketName, reason).with_resource(name)
}
