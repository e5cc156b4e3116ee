//! Multipart Form Parsing
//!
//! Turns a `multipart/form-data` body into a [`FieldMap`] of text values and a
//! list of [`FormFile`]s before any validation runs.
//!
//! Field names are normalized so that browser and client conventions collapse
//! onto one key:
//! - `facilities`, `facilities[]` and `facilities[3]` all append to `facilities`
//! - `coordinates[lat]` and `coordinates.lat` both become `coordinates.lat`

use std::collections::HashMap;

use axum::extract::Multipart;
use bytes::Bytes;
use thiserror::Error;

/// Errors raised while reading a multipart body.
#[derive(Debug, Error)]
pub enum FormError {
    /// The body is not well-formed multipart.
    #[error("Malformed multipart body: {0}")]
    Malformed(String),

    /// A single file part exceeds the per-file limit.
    #[error("File '{field}' too large (max: {max_size} bytes)")]
    FileTooLarge {
        /// Normalized field name of the offending part.
        field: String,
        /// Maximum allowed size in bytes.
        max_size: usize,
    },
}

/// Normalize a multipart field name.
///
/// Bracket segments become dotted path segments; empty and numeric segments
/// are list markers and are dropped.
#[must_use]
pub fn normalize_key(raw: &str) -> String {
    let raw = raw.trim();
    let (base, rest) = raw.find('[').map_or((raw, ""), |i| raw.split_at(i));

    let mut key = base.to_string();
    for segment in rest.split(['[', ']']).filter(|s| !s.is_empty()) {
        if segment.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        key.push('.');
        key.push_str(segment);
    }
    key
}

/// Text values keyed by normalized field name, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap(HashMap<String, Vec<String>>);

impl FieldMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value under the normalized form of `key`.
    pub fn push(&mut self, key: &str, value: impl Into<String>) {
        self.0
            .entry(normalize_key(key))
            .or_default()
            .push(value.into());
    }

    /// First non-blank value for `key`, trimmed.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)?
            .iter()
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
    }

    /// Every non-blank value for `key`, trimmed.
    ///
    /// A value that is itself a JSON array of strings is expanded in place.
    #[must_use]
    pub fn list(&self, key: &str) -> Vec<String> {
        let Some(values) = self.0.get(key) else {
            return Vec::new();
        };

        let mut out = Vec::new();
        for value in values.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
            if value.starts_with('[') {
                if let Ok(items) = serde_json::from_str::<Vec<String>>(value) {
                    out.extend(
                        items
                            .into_iter()
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty()),
                    );
                    continue;
                }
            }
            out.push(value.to_string());
        }
        out
    }

    /// Whether any value at all was submitted under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.push(k.as_ref(), v);
        }
        map
    }
}

/// An uploaded file part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFile {
    /// Normalized field name.
    pub field: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// A fully buffered multipart submission.
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    pub fields: FieldMap,
    pub files: Vec<FormFile>,
}

impl MultipartForm {
    /// Read every part of `multipart`.
    ///
    /// Parts carrying a filename are files; everything else is text. Empty
    /// file parts (a file input left blank by a browser) are skipped.
    pub async fn from_multipart(
        mut multipart: Multipart,
        max_upload_size: usize,
    ) -> Result<Self, FormError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| FormError::Malformed(e.body_text()))?
        {
            let name = normalize_key(field.name().unwrap_or_default());

            if let Some(file_name) = field.file_name().map(String::from) {
                let content_type = field.content_type().map(String::from).or_else(|| {
                    mime_guess::from_path(&file_name)
                        .first()
                        .map(|m| m.to_string())
                });
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| FormError::Malformed(e.body_text()))?;

                if data.len() > max_upload_size {
                    return Err(FormError::FileTooLarge {
                        field: name,
                        max_size: max_upload_size,
                    });
                }
                if data.is_empty() {
                    continue;
                }

                form.files.push(FormFile {
                    field: name,
                    file_name,
                    content_type,
                    data,
                });
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| FormError::Malformed(e.body_text()))?;
                form.fields.push(&name, text);
            }
        }

        tracing::debug!(
            fields = form.fields.0.len(),
            files = form.files.len(),
            "Parsed multipart form"
        );
        Ok(form)
    }

    /// First file submitted under `field`.
    #[must_use]
    pub fn file(&self, field: &str) -> Option<&FormFile> {
        self.files.iter().find(|f| f.field == field)
    }

    /// All files submitted under `field`, in submission order.
    pub fn files_named<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FormFile> + 'a {
        self.files.iter().filter(move |f| f.field == field)
    }

    /// Remove and return the first file submitted under `field`.
    pub fn take_file(&mut self, field: &str) -> Option<FormFile> {
        let index = self.files.iter().position(|f| f.field == field)?;
        Some(self.files.remove(index))
    }

    /// Remove and return every file submitted under `field`.
    pub fn take_files(&mut self, field: &str) -> Vec<FormFile> {
        let (taken, kept) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|f| f.field == field);
        self.files = kept;
        taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_list_and_nested_keys() {
        assert_eq!(normalize_key("facilities"), "facilities");
        assert_eq!(normalize_key("facilities[]"), "facilities");
        assert_eq!(normalize_key("facilities[2]"), "facilities");
        assert_eq!(normalize_key("coordinates[lat]"), "coordinates.lat");
        assert_eq!(normalize_key("coordinates.lng"), "coordinates.lng");
        assert_eq!(normalize_key("a[b][0][c]"), "a.b.c");
        assert_eq!(normalize_key(" images "), "images");
    }

    #[test]
    fn text_skips_blank_values() {
        let fields: FieldMap = [("name", "   "), ("name", " Ravi "), ("empty", "")]
            .into_iter()
            .collect();

        assert_eq!(fields.text("name"), Some("Ravi"));
        assert_eq!(fields.text("empty"), None);
        assert_eq!(fields.text("missing"), None);
        assert!(fields.contains("empty"));
    }

    #[test]
    fn list_collects_repeated_and_json_values() {
        let fields: FieldMap = [
            ("facilities[]", "Wifi"),
            ("facilities[]", ""),
            ("facilities[1]", "Parking"),
            ("preferences", r#"["Non-smoker", " Vegetarian ", ""]"#),
            ("odd", "[not json"),
        ]
        .into_iter()
        .collect();

        assert_eq!(fields.list("facilities"), ["Wifi", "Parking"]);
        assert_eq!(fields.list("preferences"), ["Non-smoker", "Vegetarian"]);
        assert_eq!(fields.list("odd"), ["[not json"]);
        assert!(fields.list("missing").is_empty());
    }

    #[test]
    fn take_files_partitions_by_field() {
        let file = |field: &str, name: &str| FormFile {
            field: field.into(),
            file_name: name.into(),
            content_type: Some("image/png".into()),
            data: Bytes::from_static(b"png"),
        };
        let mut form = MultipartForm {
            fields: FieldMap::new(),
            files: vec![file("images", "a.png"), file("other", "b.png"), file("images", "c.png")],
        };

        assert_eq!(form.files_named("images").count(), 2);
        let images = form.take_files("images");
        assert_eq!(
            images.iter().map(|f| f.file_name.as_str()).collect::<Vec<_>>(),
            ["a.png", "c.png"]
        );
        assert!(form.take_file("images").is_none());
        assert_eq!(form.take_file("other").map(|f| f.file_name), Some("b.png".into()));
    }
}
