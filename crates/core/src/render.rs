//! Result renderer.
//!
//! [`render`] is a pure function from an [`AnalysisResult`] to a
//! [`RenderedView`]: plain data that the egui panel draws and the CLI prints.
//! A block appears iff its group is present, a row iff its attribute is
//! present. Zero counts are present values.

use crate::model::{AnalysisResult, AttributeValue, FeatureGroup, FeatureSet};
use std::fmt;

/// Label of the control that requests a reset from the result view.
pub const RESET_LABEL: &str = "Roast Another Image";

/// Heading above the feature blocks.
pub const DETAILS_HEADING: &str = "Analysis Details";

/// How a known attribute's value is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueFormat {
    Plain,
    Approximate,
    OutOf(u32),
}

struct RowSpec {
    key: &'static str,
    label: &'static str,
    format: ValueFormat,
}

const fn row(key: &'static str, label: &'static str, format: ValueFormat) -> RowSpec {
    RowSpec { key, label, format }
}

enum Body {
    Rows(&'static [RowSpec]),
    Narrative,
}

struct GroupSpec {
    key: &'static str,
    title: &'static str,
    body: Body,
}

use ValueFormat::{Approximate, OutOf, Plain};

const FACE_ROWS: &[RowSpec] = &[
    row("face_count", "Faces Detected", Plain),
    row("gender", "Gender", Plain),
    row("age", "Age", Approximate),
    row("emotion", "Emotion", Plain),
    row("attractiveness_score", "Attractiveness", OutOf(10)),
];

const BODY_ROWS: &[RowSpec] = &[
    row("pose", "Pose", Plain),
    row("body_type", "Body Type", Plain),
    row("clothing_style", "Style", Plain),
    row("fashion_style", "Fashion", Plain),
    row("dressing_score", "Dressing", OutOf(10)),
];

const DEMOGRAPHICS_ROWS: &[RowSpec] = &[
    row("race", "Race", Plain),
    row("ethnicity", "Ethnicity", Plain),
    row("skin_tone", "Skin Tone", Plain),
];

const SCENE_ROWS: &[RowSpec] = &[
    row("scene_type", "Scene", Plain),
    row("background_type", "Background", Plain),
    row("background_quality", "Background Quality", Plain),
];

const QUALITY_ROWS: &[RowSpec] = &[
    row("quality_score", "Quality", OutOf(10)),
    row("image_quality_score", "Image Quality", OutOf(100)),
    row("aesthetic_score", "Aesthetics", OutOf(10)),
    row("composition_score", "Composition", OutOf(10)),
    row("lighting_quality", "Lighting", Plain),
];

/// Known groups in display order.
const KNOWN_GROUPS: &[GroupSpec] = &[
    GroupSpec { key: "face_analysis", title: "Face Analysis", body: Body::Rows(FACE_ROWS) },
    GroupSpec { key: "body_analysis", title: "Body Analysis", body: Body::Rows(BODY_ROWS) },
    GroupSpec { key: "demographics", title: "Demographics", body: Body::Rows(DEMOGRAPHICS_ROWS) },
    GroupSpec { key: "object_scene", title: "Scene & Objects", body: Body::Rows(SCENE_ROWS) },
    GroupSpec {
        key: "quality_aesthetics",
        title: "Quality & Aesthetics",
        body: Body::Rows(QUALITY_ROWS),
    },
    GroupSpec { key: "vlm_scene_analysis", title: "Scene Analysis", body: Body::Narrative },
];

/// One label/value line inside a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRow {
    pub label: String,
    pub value: String,
}

/// A titled block for one present feature group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureBlock {
    /// Group key in the result, e.g. `face_analysis`.
    pub key: String,
    pub title: String,
    pub rows: Vec<AttributeRow>,
    /// Free-form text, for narrative groups.
    pub narrative: Option<String>,
}

impl FeatureBlock {
    /// The value of the row with the given label.
    pub fn value_of(&self, label: &str) -> Option<&str> {
        self.rows.iter().find(|r| r.label == label).map(|r| r.value.as_str())
    }
}

/// Everything the result panel shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedView {
    pub roast: String,
    /// `None` when the result carried no `features` at all.
    pub details: Option<Vec<FeatureBlock>>,
    /// Total processing time, two decimals, e.g. `123.40ms`.
    pub processing_time: String,
    pub request_id: String,
    pub reset_label: &'static str,
}

impl RenderedView {
    /// Blocks in display order (empty when there are no details).
    pub fn blocks(&self) -> &[FeatureBlock] {
        self.details.as_deref().unwrap_or_default()
    }

    pub fn block(&self, key: &str) -> Option<&FeatureBlock> {
        self.blocks().iter().find(|b| b.key == key)
    }
}

/// Renders a result.
pub fn render(result: &AnalysisResult) -> RenderedView {
    RenderedView {
        roast: result.roast.clone(),
        details: result.features.as_ref().map(render_features),
        processing_time: format!("{:.2}ms", result.total_processing_time_ms),
        request_id: result.request_id.clone(),
        reset_label: RESET_LABEL,
    }
}

fn render_features(features: &FeatureSet) -> Vec<FeatureBlock> {
    let mut blocks: Vec<FeatureBlock> = KNOWN_GROUPS
        .iter()
        .filter_map(|spec| features.group(spec.key).map(|group| render_known(spec, group)))
        .collect();

    // Groups this client has never heard of still get a block.
    blocks.extend(
        features
            .groups()
            .filter(|(key, _)| !KNOWN_GROUPS.iter().any(|spec| spec.key == *key))
            .map(|(key, group)| render_unknown(key, group)),
    );

    blocks
}

fn render_known(spec: &GroupSpec, group: FeatureGroup<'_>) -> FeatureBlock {
    let (rows, narrative) = match &spec.body {
        Body::Rows(specs) => {
            let rows = specs
                .iter()
                .filter_map(|s| {
                    group.attribute(s.key).map(|value| AttributeRow {
                        label: s.label.to_string(),
                        value: format_value(value, s.format),
                    })
                })
                .collect();
            (rows, None)
        }
        Body::Narrative => (Vec::new(), group.narrative().map(str::to_string)),
    };

    FeatureBlock {
        key: spec.key.to_string(),
        title: spec.title.to_string(),
        rows,
        narrative,
    }
}

fn render_unknown(key: &str, group: FeatureGroup<'_>) -> FeatureBlock {
    let narrative = match group {
        FeatureGroup::Narrative(text) => Some(text.to_string()),
        FeatureGroup::Attributes(_) => None,
    };

    FeatureBlock {
        key: key.to_string(),
        title: title_case(key),
        rows: group
            .attributes()
            .into_iter()
            .map(|(name, value)| AttributeRow {
                label: title_case(name),
                value: format_value(value, Plain),
            })
            .collect(),
        narrative,
    }
}

fn format_value(value: AttributeValue<'_>, format: ValueFormat) -> String {
    let shown = match value {
        AttributeValue::Text(text) => humanize(text),
        other => other.to_string(),
    };

    match format {
        Plain => shown,
        Approximate => format!("~{}", shown),
        OutOf(max) => format!("{}/{}", shown, max),
    }
}

/// `plus_size` -> `plus size`.
fn humanize(text: &str) -> String {
    text.replace('_', " ")
}

/// `pet_analysis` -> `Pet Analysis`.
fn title_case(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl fmt::Display for RenderedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Your Roast")?;
        writeln!(f, "{}", self.roast)?;

        if let Some(blocks) = &self.details {
            writeln!(f)?;
            writeln!(f, "{}", DETAILS_HEADING)?;
            for block in blocks {
                writeln!(f)?;
                writeln!(f, "  {}", block.title)?;
                for row in &block.rows {
                    writeln!(f, "    {}: {}", row.label, row.value)?;
                }
                if let Some(text) = &block.narrative {
                    writeln!(f, "    {}", text)?;
                }
            }
        }

        writeln!(f)?;
        writeln!(f, "Processing Time: {}", self.processing_time)?;
        write!(f, "Request ID: {}", self.request_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn result_with(features: Option<Value>) -> AnalysisResult {
        let mut body = json!({
            "roast": "You look like a default avatar.",
            "total_processing_time_ms": 123.4,
            "request_id": "abc"
        });
        if let Some(features) = features {
            body["features"] = features;
        }
        serde_json::from_value(body).unwrap()
    }

    fn keys(view: &RenderedView) -> Vec<&str> {
        view.blocks().iter().map(|b| b.key.as_str()).collect()
    }

    #[test]
    fn zero_face_count_is_rendered() {
        let view = render(&result_with(Some(json!({"face_analysis": {"face_count": 0}}))));

        assert_eq!(keys(&view), vec!["face_analysis"]);
        let face = view.block("face_analysis").unwrap();
        assert_eq!(face.title, "Face Analysis");
        assert_eq!(face.rows.len(), 1);
        assert_eq!(face.value_of("Faces Detected"), Some("0"));
        assert!(view.to_string().contains("Faces Detected: 0"));
    }

    #[test]
    fn scene_only_result_renders_only_scene_block() {
        let view = render(&result_with(Some(json!({
            "vlm_scene_analysis": {"scene_description": "a desk"}
        }))));

        assert_eq!(keys(&view), vec!["vlm_scene_analysis"]);
        let scene = view.block("vlm_scene_analysis").unwrap();
        assert_eq!(scene.title, "Scene Analysis");
        assert_eq!(scene.narrative.as_deref(), Some("a desk"));
    }

    #[test]
    fn roast_and_stats_are_always_rendered() {
        let view = render(&result_with(None));
        assert_eq!(view.roast, "You look like a default avatar.");
        assert_eq!(view.processing_time, "123.40ms");
        assert_eq!(view.request_id, "abc");
        assert_eq!(view.reset_label, RESET_LABEL);
        assert!(view.details.is_none());

        let text = view.to_string();
        assert!(text.contains("Processing Time: 123.40ms"));
        assert!(text.contains("Request ID: abc"));
        assert!(!text.contains(DETAILS_HEADING));
    }

    #[test]
    fn attribute_formats_follow_the_group() {
        let view = render(&result_with(Some(json!({
            "face_analysis": {
                "face_count": 1,
                "gender": "female",
                "age": 27,
                "emotion": "happy",
                "attractiveness_score": 7.5
            },
            "body_analysis": {"body_type": "plus_size", "pose_keypoints": [[0.1, 0.2]]},
            "quality_aesthetics": {
                "image_quality_score": 64.0,
                "aesthetic_score": 6.0,
                "lighting_quality": "harsh"
            }
        }))));

        let face = view.block("face_analysis").unwrap();
        assert_eq!(face.value_of("Age"), Some("~27"));
        assert_eq!(face.value_of("Attractiveness"), Some("7.5/10"));
        assert_eq!(face.value_of("Gender"), Some("female"));

        let body = view.block("body_analysis").unwrap();
        assert_eq!(body.rows.len(), 1);
        assert_eq!(body.value_of("Body Type"), Some("plus size"));

        let quality = view.block("quality_aesthetics").unwrap();
        assert_eq!(quality.value_of("Image Quality"), Some("64/100"));
        assert_eq!(quality.value_of("Aesthetics"), Some("6/10"));
        assert_eq!(quality.value_of("Lighting"), Some("harsh"));
        assert_eq!(quality.value_of("Quality"), None);
    }

    #[test]
    fn known_groups_keep_display_order_and_nulls_are_absent() {
        let view = render(&result_with(Some(json!({
            "vlm_scene_analysis": "cluttered bedroom",
            "quality_aesthetics": {"quality_score": 3},
            "face_analysis": {"face_count": 2},
            "demographics": null,
            "processing_time_ms": 50.0
        }))));

        assert_eq!(keys(&view), vec!["face_analysis", "quality_aesthetics", "vlm_scene_analysis"]);
        assert_eq!(
            view.block("vlm_scene_analysis").unwrap().narrative.as_deref(),
            Some("cluttered bedroom")
        );
    }

    #[test]
    fn unknown_groups_render_generically_after_known_ones() {
        let view = render(&result_with(Some(json!({
            "pet_analysis": {
                "pet_count": 0,
                "species": "golden_retriever",
                "is_good": true,
                "boxes": []
            },
            "face_analysis": {"face_count": 1},
            "aura_reading": "mostly beige"
        }))));

        assert_eq!(keys(&view), vec!["face_analysis", "aura_reading", "pet_analysis"]);

        let pets = view.block("pet_analysis").unwrap();
        assert_eq!(pets.title, "Pet Analysis");
        assert_eq!(pets.value_of("Pet Count"), Some("0"));
        assert_eq!(pets.value_of("Species"), Some("golden retriever"));
        assert_eq!(pets.value_of("Is Good"), Some("yes"));
        assert_eq!(pets.rows.len(), 3);

        let aura = view.block("aura_reading").unwrap();
        assert_eq!(aura.title, "Aura Reading");
        assert_eq!(aura.narrative.as_deref(), Some("mostly beige"));
    }

    #[test]
    fn empty_known_group_still_gets_a_block() {
        let view = render(&result_with(Some(json!({"demographics": {}}))));
        let block = view.block("demographics").unwrap();
        assert_eq!(block.title, "Demographics");
        assert!(block.rows.is_empty());
    }

    #[test]
    fn title_case_handles_odd_keys() {
        assert_eq!(title_case("face_count"), "Face Count");
        assert_eq!(title_case("__x__y"), "X Y");
        assert_eq!(title_case("single"), "Single");
    }
}
