//! Slide fragments, slide specs and the mutation requests sent to Google Slides.
//!
//! [`MutationOp`] serializes to exactly one entry of a
//! `presentations.batchUpdate` `requests` array, so a [`Batch`] can be handed
//! to the API adapter without any further translation.

use std::fmt;

use serde::Serialize;

/// Marker prepended to body lines that came from list items.
pub const BULLET: &str = "• ";

/// One delimiter-separated, trimmed, non-empty piece of a Markdown document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideFragment<'a>(&'a str);

impl<'a> SlideFragment<'a> {
    /// Trim `piece` and wrap it, returning `None` when nothing is left.
    pub fn from_piece(piece: &'a str) -> Option<Self> {
        let trimmed = piece.trim();
        (!trimmed.is_empty()).then_some(Self(trimmed))
    }

    pub fn as_str(&self) -> &'a str {
        self.0
    }
}

/// Title and body content derived from one fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SlideSpec {
    pub title: Option<String>,
    pub body_lines: Vec<String>,
}

impl SlideSpec {
    /// The text inserted into the title shape: the heading, or `Slide N`.
    pub fn display_title(&self, index: usize) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None => format!("Slide {}", index + 1),
        }
    }

    /// Body lines separated by a blank line.
    pub fn body_text(&self) -> String {
        self.body_lines.join("\n\n")
    }
}

/// Ordered mutation requests for a whole document.
pub type Batch = Vec<MutationOp>;

/// Page element identifier, unique within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    pub(crate) fn new(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationOp {
    CreateSlide(CreateSlide),
    CreateShape(CreateShape),
    InsertText(InsertText),
    UpdateTextStyle(UpdateTextStyle),
}

impl MutationOp {
    pub fn create_slide(object_id: ObjectId, insertion_index: usize) -> Self {
        Self::CreateSlide(CreateSlide {
            object_id,
            insertion_index,
            slide_layout_reference: LayoutReference {
                predefined_layout: PredefinedLayout::TitleAndBody,
            },
        })
    }

    pub fn create_text_box(object_id: ObjectId, page_object_id: ObjectId, frame: Frame) -> Self {
        Self::CreateShape(CreateShape {
            object_id,
            shape_type: ShapeType::TextBox,
            element_properties: ElementProperties {
                page_object_id,
                size: Size {
                    width: Dimension::pt(frame.width),
                    height: Dimension::pt(frame.height),
                },
                transform: AffineTransform {
                    scale_x: 1.0,
                    scale_y: 1.0,
                    translate_x: frame.x,
                    translate_y: frame.y,
                    unit: Unit::Pt,
                },
            },
        })
    }

    pub fn insert_text(object_id: ObjectId, text: String) -> Self {
        Self::InsertText(InsertText {
            object_id,
            text,
            insertion_index: 0,
        })
    }

    /// Apply `style` to the whole text of `object_id`.
    pub fn style_all_text(object_id: ObjectId, style: TextStyle) -> Self {
        let fields = style.fields();
        Self::UpdateTextStyle(UpdateTextStyle {
            object_id,
            style,
            text_range: TextRange {
                kind: RangeType::All,
            },
            fields,
        })
    }

    /// Request name as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            MutationOp::CreateSlide(_) => "createSlide",
            MutationOp::CreateShape(_) => "createShape",
            MutationOp::InsertText(_) => "insertText",
            MutationOp::UpdateTextStyle(_) => "updateTextStyle",
        }
    }

    /// The object the request creates or addresses.
    pub fn object_id(&self) -> &ObjectId {
        match self {
            MutationOp::CreateSlide(op) => &op.object_id,
            MutationOp::CreateShape(op) => &op.object_id,
            MutationOp::InsertText(op) => &op.object_id,
            MutationOp::UpdateTextStyle(op) => &op.object_id,
        }
    }

    /// True for requests that bring a new object into the presentation.
    pub fn creates_object(&self) -> bool {
        matches!(self, MutationOp::CreateSlide(_) | MutationOp::CreateShape(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSlide {
    pub object_id: ObjectId,
    pub insertion_index: usize,
    pub slide_layout_reference: LayoutReference,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutReference {
    pub predefined_layout: PredefinedLayout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PredefinedLayout {
    TitleAndBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShape {
    pub object_id: ObjectId,
    pub shape_type: ShapeType,
    pub element_properties: ElementProperties,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShapeType {
    TextBox,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementProperties {
    pub page_object_id: ObjectId,
    pub size: Size,
    pub transform: AffineTransform,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Size {
    pub width: Dimension,
    pub height: Dimension,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffineTransform {
    pub scale_x: f64,
    pub scale_y: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    pub unit: Unit,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Dimension {
    pub magnitude: f64,
    pub unit: Unit,
}

impl Dimension {
    pub const fn pt(magnitude: f64) -> Self {
        Self {
            magnitude,
            unit: Unit::Pt,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Unit {
    Pt,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertText {
    pub object_id: ObjectId,
    pub text: String,
    pub insertion_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTextStyle {
    pub object_id: ObjectId,
    pub style: TextStyle,
    pub text_range: TextRange,
    pub fields: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<Dimension>,
}

impl TextStyle {
    /// Field mask naming every property this style sets.
    pub fn fields(&self) -> String {
        let mut fields = Vec::new();
        if self.bold.is_some() {
            fields.push("bold");
        }
        if self.font_size.is_some() {
            fields.push("fontSize");
        }
        fields.join(",")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextRange {
    #[serde(rename = "type")]
    pub kind: RangeType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RangeType {
    All,
}

/// Placement of a shape on the slide, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}
