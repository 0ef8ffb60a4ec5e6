//! Render output types.
//!
//! Each entry of `lOutputs` selects what a render produces through its type
//! tag, e.g. `/shutterline/render/output/image:1` or
//! `/shutterline/render/output/anytruth/pos3d:1`. Only the path segments
//! after `render/output/` matter: a main type and an optional specific type.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

const OUTPUT_TAG_MARKER: &str = "render/output/";

/// One render output type of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderOutput {
    /// Type tag selecting the output kind.
    #[serde(rename = "sDTI")]
    pub dti: String,

    /// Folder (relative to the job target directory) that direct-to-file
    /// outputs are written to.
    #[serde(rename = "sFolder", default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,

    /// Host-specific modifiers applied while this output type is active.
    #[serde(rename = "lModifier", default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<serde_json::Value>,
}

/// Ground-truth annotation produced instead of a shaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    Label,
    Pos3d,
    LocalPos3d,
    ObjectIdx,
    ObjectLoc3d,
}

/// Parsed render output kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderOutputKind {
    /// Shaded image written through the host compositor.
    Image,
    /// Viewport (OpenGL) snapshot written directly to a file.
    ImageOpenGl,
    /// Ground-truth annotation render.
    AnyTruth(AnnotationKind),
    /// The prepared scene saved as a host scene file.
    Blend,
    /// Prepare the scene but produce no output.
    None,
}

impl AnnotationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Label => "label",
            Self::Pos3d => "pos3d",
            Self::LocalPos3d => "local-pos3d",
            Self::ObjectIdx => "object-idx",
            Self::ObjectLoc3d => "object-loc3d",
        }
    }

    fn parse(specific: &str) -> Option<Self> {
        match specific {
            "label" => Some(Self::Label),
            "pos3d" => Some(Self::Pos3d),
            "local-pos3d" => Some(Self::LocalPos3d),
            "object-idx" => Some(Self::ObjectIdx),
            "object-loc3d" => Some(Self::ObjectLoc3d),
            _ => None,
        }
    }

    /// Whether label metadata is exported next to the rendered frame.
    pub fn exports_label_data(self) -> bool {
        matches!(self, Self::Label | Self::Pos3d)
    }
}

impl RenderOutputKind {
    /// Main type segment of the tag.
    pub fn main_type(self) -> &'static str {
        match self {
            Self::Image | Self::ImageOpenGl => "image",
            Self::AnyTruth(_) => "anytruth",
            Self::Blend => "blend",
            Self::None => "none",
        }
    }

    /// Specific type segment of the tag, if any.
    pub fn specific_type(self) -> Option<&'static str> {
        match self {
            Self::ImageOpenGl => Some("openGL"),
            Self::AnyTruth(kind) => Some(kind.as_str()),
            _ => None,
        }
    }

    /// Whether a render call through the host's regular render path is made.
    pub fn uses_render_call(self) -> bool {
        matches!(self, Self::Image | Self::AnyTruth(_))
    }
}

impl fmt::Display for RenderOutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.specific_type() {
            Some(specific) => write!(f, "{}/{}", self.main_type(), specific),
            None => f.write_str(self.main_type()),
        }
    }
}

impl RenderOutput {
    /// Create an output entry from a type tag.
    pub fn new(dti: impl Into<String>) -> Self {
        Self {
            dti: dti.into(),
            folder: None,
            modifiers: Vec::new(),
        }
    }

    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    /// Parse the type tag into an output kind.
    pub fn kind(&self) -> Result<RenderOutputKind, ModelError> {
        let start = self.dti.find(OUTPUT_TAG_MARKER).ok_or_else(|| {
            ModelError::invalid(format!(
                "Invalid render output configuration given: '{}'",
                self.dti
            ))
        })?;
        let rest = &self.dti[start + OUTPUT_TAG_MARKER.len()..];
        let path = rest.split(':').next().unwrap_or_default();
        let mut segments = path.split('/').filter(|s| !s.is_empty());

        let main = segments
            .next()
            .ok_or_else(|| ModelError::invalid("No specific render output type given"))?;
        let specific = segments.next();

        match (main, specific) {
            ("image", None) => Ok(RenderOutputKind::Image),
            ("image", Some("openGL")) => Ok(RenderOutputKind::ImageOpenGl),
            ("anytruth", Some(specific)) => AnnotationKind::parse(specific)
                .map(RenderOutputKind::AnyTruth)
                .ok_or_else(|| {
                    ModelError::invalid(format!(
                        "Unsupported AnyTruth render output type '{specific}'"
                    ))
                }),
            ("anytruth", None) => Err(ModelError::invalid(
                "No specific AnyTruth render output type given",
            )),
            ("blend", None) => Ok(RenderOutputKind::Blend),
            ("none", None) => Ok(RenderOutputKind::None),
            _ => Err(ModelError::invalid(format!(
                "Render output type '{}' not supported",
                self.dti
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_output_kinds() {
        let cases = [
            ("/shutterline/render/output/image:1", RenderOutputKind::Image),
            (
                "/shutterline/render/output/image/openGL:1",
                RenderOutputKind::ImageOpenGl,
            ),
            (
                "/shutterline/render/output/anytruth/local-pos3d:1",
                RenderOutputKind::AnyTruth(AnnotationKind::LocalPos3d),
            ),
            ("render/output/blend:1.0", RenderOutputKind::Blend),
            ("render/output/none", RenderOutputKind::None),
        ];
        for (dti, expected) in cases {
            assert_eq!(RenderOutput::new(dti).kind().unwrap(), expected, "{dti}");
        }
    }

    #[test]
    fn test_reject_unknown_outputs() {
        for dti in [
            "/shutterline/render/settings/main:1",
            "render/output/anytruth:1",
            "render/output/anytruth/depth:1",
            "render/output/video:1",
            "render/output/:1",
        ] {
            assert!(RenderOutput::new(dti).kind().is_err(), "{dti}");
        }
    }

    #[test]
    fn test_kind_display_joins_types() {
        assert_eq!(
            RenderOutputKind::AnyTruth(AnnotationKind::Label).to_string(),
            "anytruth/label"
        );
        assert_eq!(RenderOutputKind::Image.to_string(), "image");
        assert_eq!(RenderOutputKind::ImageOpenGl.to_string(), "image/openGL");
    }
}
