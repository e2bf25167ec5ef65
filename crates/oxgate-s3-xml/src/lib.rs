//! S3 XML wire layer for oxgate.
//!
//! Handles the two XML surfaces of the gateway: parsing request bodies
//! into model types and formatting error responses.
//!
//! # Key components
//!
//! - [`S3Deserialize`] trait and [`from_xml`] function for parsing XML
//!   request bodies into structs
//! - [`error_to_xml`] for formatting S3 error responses as XML
//!
//! # S3 XML conventions
//!
//! - Booleans: lowercase `true`/`false`
//! - XML declaration: `<?xml version="1.0" encoding="UTF-8"?>`
//! - Errors are a flat `<Error>` element with no outer wrapper

pub mod deserialize;
pub mod error;

pub use deserialize::{S3Deserialize, from_xml};
pub use error::{XmlError, error_to_xml};
