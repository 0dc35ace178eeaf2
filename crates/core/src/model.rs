//! Data model shared by the controller, coordinator and renderer.
//!
//! The analysis result is deliberately loose: the service adds, renames and
//! drops feature groups between versions, so [`FeatureSet`] keeps the raw JSON
//! and every lookup answers "maybe".

use crate::error::{AppError, Result};
use crate::image_processing::ImageProcessor;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// Intensity of the generated roast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoastLevel {
    Mild,
    #[default]
    Medium,
    Savage,
}

impl RoastLevel {
    /// All levels in selector order.
    pub const ALL: [RoastLevel; 3] = [RoastLevel::Mild, RoastLevel::Medium, RoastLevel::Savage];

    /// Wire value sent in the `roast_level` form field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mild => "mild",
            Self::Medium => "medium",
            Self::Savage => "savage",
        }
    }

    /// Button label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Mild => "Mild",
            Self::Medium => "Medium",
            Self::Savage => "Savage",
        }
    }
}

impl fmt::Display for RoastLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoastLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mild" => Ok(Self::Mild),
            "medium" => Ok(Self::Medium),
            "savage" => Ok(Self::Savage),
            other => Err(AppError::invalid_input(format!(
                "Unknown roast level '{}', expected mild, medium or savage",
                other
            ))),
        }
    }
}

/// A file handed to the client by the picker or a drop.
///
/// `content_type` is the *declared* type (from the drop payload or the file
/// extension), not sniffed from the bytes.
#[derive(Clone)]
pub struct ImageFile {
    name: String,
    content_type: String,
    bytes: Arc<[u8]>,
}

impl ImageFile {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a file from disk, declaring its content type from the extension.
    pub async fn open(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let content_type = ImageProcessor::content_type_for(path);

        Ok(Self::new(name, content_type, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the declared content type is an image type.
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

impl fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Display form of a selected image.
#[derive(Clone, PartialEq)]
pub struct Preview {
    /// `data:<type>;base64,...` for the exact bytes that will be uploaded.
    pub data_uri: String,
    /// Decoded, downscaled pixels; `None` when the bytes do not decode.
    pub bitmap: Option<PreviewBitmap>,
}

impl fmt::Debug for Preview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Preview")
            .field("data_uri_len", &self.data_uri.len())
            .field("bitmap", &self.bitmap.as_ref().map(|b| (b.width, b.height)))
            .finish()
    }
}

/// Straight RGBA8 pixels.
#[derive(Clone, PartialEq)]
pub struct PreviewBitmap {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// The image currently held by the submission controller.
#[derive(Debug, Clone)]
pub struct SelectedImage {
    file: ImageFile,
    seq: u64,
    preview: Option<Preview>,
}

impl SelectedImage {
    pub(crate) fn new(file: ImageFile, seq: u64) -> Self {
        Self { file, seq, preview: None }
    }

    pub fn file(&self) -> &ImageFile {
        &self.file
    }

    /// Position of this selection in selection order.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// `None` until the asynchronous preview read lands.
    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    pub(crate) fn set_preview(&mut self, preview: Preview) {
        self.preview = Some(preview);
    }
}

/// One outbound analysis call. Immutable once built.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    image: ImageFile,
    roast_level: RoastLevel,
}

impl AnalysisRequest {
    pub fn new(image: ImageFile, roast_level: RoastLevel) -> Self {
        Self { image, roast_level }
    }

    pub fn image(&self) -> &ImageFile {
        &self.image
    }

    pub fn roast_level(&self) -> RoastLevel {
        self.roast_level
    }
}

/// Successful response body of the analysis endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub roast: String,
    #[serde(default)]
    pub features: Option<FeatureSet>,
    pub total_processing_time_ms: f64,
    pub request_id: String,
}

/// Open, sparse mapping of feature groups.
///
/// Entries are kept as raw JSON; `null` entries count as absent and scalar
/// entries (such as `processing_time_ms`) are metadata, not groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSet(BTreeMap<String, Value>);

impl FeatureSet {
    /// Looks up a group by key.
    pub fn group(&self, name: &str) -> Option<FeatureGroup<'_>> {
        self.0.get(name).and_then(FeatureGroup::classify)
    }

    /// All present groups in key order.
    pub fn groups(&self) -> impl Iterator<Item = (&str, FeatureGroup<'_>)> {
        self.0
            .iter()
            .filter_map(|(name, value)| FeatureGroup::classify(value).map(|g| (name.as_str(), g)))
    }
}

impl From<Map<String, Value>> for FeatureSet {
    fn from(map: Map<String, Value>) -> Self {
        Self(map.into_iter().collect())
    }
}

/// A present feature group.
#[derive(Debug, Clone, Copy)]
pub enum FeatureGroup<'a> {
    /// Named scalar attributes.
    Attributes(&'a Map<String, Value>),
    /// Free-form text, as the scene analysis is sometimes sent.
    Narrative(&'a str),
}

impl<'a> FeatureGroup<'a> {
    fn classify(value: &'a Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self::Attributes(map)),
            Value::String(text) => Some(Self::Narrative(text)),
            _ => None,
        }
    }

    /// A scalar attribute, if present and non-null.
    pub fn attribute(&self, key: &str) -> Option<AttributeValue<'a>> {
        match self {
            Self::Attributes(map) => map.get(key).and_then(AttributeValue::from_json),
            Self::Narrative(_) => None,
        }
    }

    /// Every scalar attribute in key order.
    pub fn attributes(&self) -> Vec<(&'a str, AttributeValue<'a>)> {
        match self {
            Self::Attributes(map) => map
                .iter()
                .filter_map(|(k, v)| AttributeValue::from_json(v).map(|a| (k.as_str(), a)))
                .collect(),
            Self::Narrative(_) => Vec::new(),
        }
    }

    /// Narrative text: the bare string, or a `scene_description` attribute.
    pub fn narrative(&self) -> Option<&'a str> {
        match self {
            Self::Narrative(text) => Some(text),
            Self::Attributes(map) => map.get("scene_description").and_then(Value::as_str),
        }
    }
}

/// A scalar attribute value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttributeValue<'a> {
    Number(&'a Number),
    Text(&'a str),
    Flag(bool),
}

impl<'a> AttributeValue<'a> {
    fn from_json(value: &'a Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Self::Number(n)),
            Value::String(s) => Some(Self::Text(s)),
            Value::Bool(b) => Some(Self::Flag(*b)),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl fmt::Display for AttributeValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => {
                if let Some(i) = n.as_i64() {
                    write!(f, "{}", i)
                } else if let Some(u) = n.as_u64() {
                    write!(f, "{}", u)
                } else {
                    let v = n.as_f64().unwrap_or_default();
                    // 7.0 prints as 7, the way the service's own clients show it
                    if v.fract() == 0.0 && v.abs() < 1e15 {
                        write!(f, "{}", v as i64)
                    } else {
                        write!(f, "{}", v)
                    }
                }
            }
            Self::Text(s) => f.write_str(s),
            Self::Flag(b) => f.write_str(if *b { "yes" } else { "no" }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result_from(value: Value) -> AnalysisResult {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn roast_level_defaults_to_medium_and_parses_case_insensitively() {
        assert_eq!(RoastLevel::default(), RoastLevel::Medium);
        assert_eq!("SAVAGE".parse::<RoastLevel>().unwrap(), RoastLevel::Savage);
        assert!(matches!("spicy".parse::<RoastLevel>(), Err(AppError::InvalidInput(_))));
        assert_eq!(serde_json::to_value(RoastLevel::Mild).unwrap(), json!("mild"));
    }

    #[test]
    fn image_file_checks_declared_type_only() {
        let png = ImageFile::new("a.png", "image/png", vec![1, 2, 3]);
        let txt = ImageFile::new("a.txt", "text/plain", b"hello".to_vec());
        assert!(png.is_image());
        assert!(!txt.is_image());
        assert_eq!(png.len(), 3);
    }

    #[test]
    fn result_without_features_parses() {
        let result = result_from(json!({
            "roast": "Nice try.",
            "total_processing_time_ms": 10.0,
            "request_id": "r1",
            "status": "success"
        }));
        assert!(result.features.is_none());
    }

    #[test]
    fn null_groups_are_absent_and_scalars_are_metadata() {
        let result = result_from(json!({
            "roast": "r",
            "features": {
                "face_analysis": {"face_count": 0},
                "body_analysis": null,
                "processing_time_ms": 42.0
            },
            "total_processing_time_ms": 1.0,
            "request_id": "r"
        }));
        let features = result.features.unwrap();
        assert!(features.group("body_analysis").is_none());
        assert!(features.group("processing_time_ms").is_none());
        let names: Vec<_> = features.groups().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["face_analysis"]);
    }

    #[test]
    fn zero_is_a_present_attribute() {
        let features: FeatureSet = serde_json::from_value(json!({
            "face_analysis": {"face_count": 0, "gender": null, "faces": []}
        }))
        .unwrap();
        let face = features.group("face_analysis").unwrap();
        let count = face.attribute("face_count").unwrap();
        assert_eq!(count.to_string(), "0");
        assert!(face.attribute("gender").is_none());
        assert!(face.attribute("faces").is_none());
        assert_eq!(face.attributes().len(), 1);
    }

    #[test]
    fn narrative_accepts_bare_string_or_scene_description() {
        let bare: FeatureSet =
            serde_json::from_value(json!({"vlm_scene_analysis": "a desk"})).unwrap();
        let nested: FeatureSet = serde_json::from_value(json!({
            "vlm_scene_analysis": {"scene_description": "a desk"}
        }))
        .unwrap();
        assert_eq!(bare.group("vlm_scene_analysis").unwrap().narrative(), Some("a desk"));
        assert_eq!(nested.group("vlm_scene_analysis").unwrap().narrative(), Some("a desk"));
    }

    #[test]
    fn numbers_print_like_json_clients() {
        let values = json!([7.0, 7.5, 25, -3]);
        let printed: Vec<String> = values
            .as_array()
            .unwrap()
            .iter()
            .map(|v| AttributeValue::from_json(v).unwrap().to_string())
            .collect();
        assert_eq!(printed, vec!["7", "7.5", "25", "-3"]);
    }
}
