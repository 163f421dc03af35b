//! Extension → content type code lookup.

use crate::error::{Error, Result};

/// Content type codes accepted by the upload endpoint, keyed by extension.
const CONTENT_TYPES: &[(&str, &str)] = &[
    ("xlsx", "excel"),
    ("xliff", "XLIFF1.2"),
    ("xlf", "XLIFF1.2"),
    ("xml", "xmlAndroid"),
    ("strings", "macStrings"),
    ("po", "PO"),
    ("properties", "propertiesJava"),
    ("yml", "YAMLi18n"),
    ("yaml", "YAMLi18n"),
    ("csv", "csv"),
    ("json", "JSON"),
    ("srt", "SRT"),
    ("md", "md"),
    ("text", "md"),
];

const EXCEL_MIMETYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const DEFAULT_MIMETYPE: &str = "application/octet-stream";

/// Every extension that can be uploaded, in table order.
pub fn allowed_extensions() -> Vec<&'static str> {
    CONTENT_TYPES.iter().map(|(extension, _)| *extension).collect()
}

/// Look up the content type code for `extension`.
///
/// The extension is everything after the first '.' of a file name, so
/// `"b.json"` (from `"a.b.json"`) is not supported even though `"json"` is.
///
/// # Errors
/// [`Error::UnsupportedExtension`] when the extension is absent from the table.
pub fn content_type_for(extension: Option<&str>) -> Result<&'static str> {
    let extension = extension.unwrap_or_default();
    CONTENT_TYPES
        .iter()
        .find(|(known, _)| *known == extension)
        .map(|(_, code)| *code)
        .ok_or_else(|| Error::UnsupportedExtension {
            extension: extension.to_string(),
            allowed: allowed_extensions().join(","),
        })
}

/// MIME type sent with an upload of the given content type.
pub fn mimetype(content_type: &str) -> &'static str {
    if content_type == "excel" {
        EXCEL_MIMETYPE
    } else {
        DEFAULT_MIMETYPE
    }
}
