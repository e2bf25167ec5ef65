//! XML deserialization of S3 request bodies.
//!
//! Request documents have a fixed root element per operation. [`from_xml`]
//! locates the root, checks its name against the expected one, and hands
//! the reader to the type's [`S3Deserialize`] implementation, which reads
//! child elements until the matching end tag.

use quick_xml::Reader;
use quick_xml::events::Event;

use oxgate_s3_model::CreateBucketConfiguration;

use crate::error::XmlError;

/// Trait for deserializing S3 types from XML.
///
/// Implementors parse XML elements from the reader and populate the
/// struct fields. The root element has already been consumed by the
/// caller; the implementation reads child elements until the matching
/// end tag.
pub trait S3Deserialize: Sized {
    /// Name of the document's root element.
    const ROOT: &'static str;

    /// Deserialize an instance from the given XML reader.
    ///
    /// The reader is positioned just after the opening tag of this element.
    /// The implementation should read all child content and return when
    /// the matching end tag is consumed.
    ///
    /// # Errors
    ///
    /// Returns `XmlError` if the XML is malformed or required fields are
    /// missing.
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError>;
}

/// Deserialize S3-compatible XML into a typed value.
///
/// Finds the root element, rejects a document whose root is not
/// `T::ROOT`, and delegates to the type's [`S3Deserialize`]
/// implementation.
///
/// # Errors
///
/// Returns `XmlError` if the XML is malformed, the root element is wrong,
/// or deserialization fails.
pub fn from_xml<T: S3Deserialize>(xml: &[u8]) -> Result<T, XmlError> {
    let mut reader = Reader::from_reader(xml);
    let config = reader.config_mut();
    config.trim_text(true);
    // `<Root/>` and `<Root></Root>` parse identically.
    config.expand_empty_elements = true;

    // Skip the XML declaration and find the root element.
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.name();
                let root = std::str::from_utf8(name.as_ref())
                    .map_err(|err| XmlError::ParseError(err.to_string()))?;
                if root != T::ROOT {
                    return Err(XmlError::UnexpectedElement(root.to_owned()));
                }
                return T::deserialize_xml(&mut reader);
            }
            Event::Eof => {
                return Err(XmlError::MissingElement(T::ROOT.to_owned()));
            }
            // Skip declaration, comments, processing instructions, whitespace.
            _ => {}
        }
    }
}

/// Read the text content of the current element and consume its end tag.
///
/// Expects the reader to be positioned right after a `Start` event. Reads
/// the text content and consumes through the matching `End` event.
fn read_text_content(reader: &mut Reader<&[u8]>) -> Result<String, XmlError> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(e) => {
                let decoded = e
                    .decode()
                    .map_err(|err| XmlError::ParseError(err.to_string()))?;
                let unescaped = quick_xml::escape::unescape(&decoded)
                    .map_err(|err| XmlError::ParseError(err.to_string()))?;
                text.push_str(&unescaped);
            }
            Event::End(_) => {
                return Ok(text);
            }
            Event::Eof => {
                return Err(XmlError::UnexpectedElement(
                    "unexpected EOF while reading text content".to_string(),
                ));
            }
            _ => {}
        }
    }
}

/// Skip over an element and all its children.
fn skip_element(reader: &mut Reader<&[u8]>) -> Result<(), XmlError> {
    let mut depth: u32 = 1;
    loop {
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            Event::Eof => {
                return Err(XmlError::UnexpectedElement(
                    "unexpected EOF while skipping element".to_string(),
                ));
            }
            _ => {}
        }
    }
}

impl S3Deserialize for CreateBucketConfiguration {
    const ROOT: &'static str = "CreateBucketConfiguration";

    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut location_constraint = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let name = e.name();
                    let tag_name = std::str::from_utf8(name.as_ref())
                        .map_err(|e| XmlError::ParseError(e.to_string()))?;
                    match tag_name {
                        "LocationConstraint" => {
                            location_constraint = Some(read_text_content(reader)?);
                        }
                        _ => skip_element(reader)?,
                    }
                }
                Event::End(_) => break,
                Event::Eof => {
                    return Err(XmlError::UnexpectedElement(
                        "unexpected EOF in CreateBucketConfiguration".to_string(),
                    ));
                }
                _ => {}
            }
        }

        Ok(CreateBucketConfiguration {
            location_constraint,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_parse_location_constraint() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
<CreateBucketConfiguration xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
    <LocationConstraint>eu-west-1</LocationConstraint>
</CreateBucketConfiguration>"#;

        let config: CreateBucketConfiguration =
            from_xml(xml).unwrap_or_else(|e| panic!("parse failed: {e}"));
        assert_eq!(config.location_constraint.as_deref(), Some("eu-west-1"));
    }

    #[test]
    fn test_should_parse_empty_configuration() {
        let xml = b"<CreateBucketConfiguration></CreateBucketConfiguration>";
        let config: CreateBucketConfiguration =
            from_xml(xml).unwrap_or_else(|e| panic!("parse failed: {e}"));
        assert!(config.location_constraint.is_none());
    }

    #[test]
    fn test_should_parse_self_closing_configuration() {
        let xml = b"<CreateBucketConfiguration/>";
        let config: CreateBucketConfiguration =
            from_xml(xml).unwrap_or_else(|e| panic!("parse failed: {e}"));
        assert!(config.location_constraint.is_none());
    }

    #[test]
    fn test_should_skip_unknown_children() {
        let xml = br"<CreateBucketConfiguration>
    <Bucket><Type>Directory</Type></Bucket>
    <LocationConstraint>ap-south-1</LocationConstraint>
</CreateBucketConfiguration>";

        let config: CreateBucketConfiguration =
            from_xml(xml).unwrap_or_else(|e| panic!("parse failed: {e}"));
        assert_eq!(config.location_constraint.as_deref(), Some("ap-south-1"));
    }

    #[test]
    fn test_should_unescape_text_content() {
        let xml = b"<CreateBucketConfiguration>
    <LocationConstraint>us&amp;west</LocationConstraint>
</CreateBucketConfiguration>";

        let config: CreateBucketConfiguration =
            from_xml(xml).unwrap_or_else(|e| panic!("parse failed: {e}"));
        assert_eq!(config.location_constraint.as_deref(), Some("us&west"));
    }

    #[test]
    fn test_should_reject_wrong_root_element() {
        let xml = b"<DeleteBucketConfiguration></DeleteBucketConfiguration>";
        let result = from_xml::<CreateBucketConfiguration>(xml);
        assert!(matches!(result, Err(XmlError::UnexpectedElement(_))));
    }

    #[test]
    fn test_should_reject_missing_root_element() {
        let xml = b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>";
        let result = from_xml::<CreateBucketConfiguration>(xml);
        assert!(matches!(result, Err(XmlError::MissingElement(_))));
    }

    #[test]
    fn test_should_reject_truncated_document() {
        let xml = b"<CreateBucketConfiguration><LocationConstraint>eu-";
        let result = from_xml::<CreateBucketConfiguration>(xml);
        assert!(result.is_err());
    }

    #[test]
    fn test_should_reject_plain_garbage() {
        let xml = b"this is not xml";
        let result = from_xml::<CreateBucketConfiguration>(xml);
        assert!(result.is_err());
    }
}
