//! Turning one slide fragment into its [`SlideSpec`] and mutation requests.

use std::iter::Peekable;

use tracing::debug;

use crate::application::tokens::{BlockToken, tokenize};
use crate::domain::{
    ids::{IdentifierGenerator, ObjectKind},
    slides::{BULLET, Dimension, Frame, MutationOp, ObjectId, SlideFragment, SlideSpec, TextStyle},
};

/// Number of requests emitted for every slide.
pub const OPS_PER_SLIDE: usize = 7;

pub const TITLE_FRAME: Frame = Frame {
    x: 50.0,
    y: 50.0,
    width: 600.0,
    height: 50.0,
};

pub const BODY_FRAME: Frame = Frame {
    x: 50.0,
    y: 120.0,
    width: 600.0,
    height: 350.0,
};

pub const TITLE_STYLE: TextStyle = TextStyle {
    bold: Some(true),
    font_size: Some(Dimension::pt(24.0)),
};

pub const BODY_STYLE: TextStyle = TextStyle {
    bold: None,
    font_size: Some(Dimension::pt(14.0)),
};

/// Result of scanning a token stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scan {
    pub spec: SlideSpec,
    /// Tokens that contributed nothing to the slide.
    pub ignored: usize,
}

/// Build the slide at position `index` from `fragment`.
pub fn build<G>(
    fragment: SlideFragment<'_>,
    index: usize,
    ids: &mut G,
) -> (SlideSpec, [MutationOp; OPS_PER_SLIDE])
where
    G: IdentifierGenerator + ?Sized,
{
    let Scan { spec, ignored } = scan(tokenize(fragment.as_str()));
    if ignored > 0 {
        debug!(
            target = "md2slides::builder",
            slide = index,
            ignored,
            "skipped markdown blocks without a slide representation"
        );
    }

    let slide = SlideIds {
        slide: ids.next_id(ObjectKind::Slide),
        title: ids.next_id(ObjectKind::TitleShape),
        body: ids.next_id(ObjectKind::BodyShape),
    };
    let ops = slide_template(slide, index, spec.display_title(index), spec.body_text());
    (spec, ops)
}

/// Walk `tokens` once, collecting the title and body lines.
///
/// Opening tokens consume the inline token directly after them, so inline
/// content is never visited twice. A later heading replaces an earlier title.
pub fn scan<I>(tokens: I) -> Scan
where
    I: IntoIterator<Item = BlockToken>,
{
    let mut tokens = tokens.into_iter().peekable();
    let mut scan = Scan::default();

    while let Some(token) = tokens.next() {
        match token {
            BlockToken::HeadingOpen => {
                if let Some(text) = next_inline(&mut tokens).filter(|text| !text.is_empty()) {
                    scan.spec.title = Some(text);
                }
            }
            BlockToken::ParagraphOpen => {
                if let Some(text) = next_inline(&mut tokens) {
                    scan.spec.body_lines.push(text);
                }
            }
            BlockToken::ListItemOpen => {
                if let Some(text) = next_inline(&mut tokens) {
                    scan.spec.body_lines.push(format!("{BULLET}{text}"));
                }
            }
            BlockToken::Inline(_) | BlockToken::Other(_) => scan.ignored += 1,
        }
    }

    scan
}

fn next_inline<I>(tokens: &mut Peekable<I>) -> Option<String>
where
    I: Iterator<Item = BlockToken>,
{
    match tokens.next_if(|token| matches!(token, BlockToken::Inline(_)))? {
        BlockToken::Inline(text) => Some(text),
        _ => None,
    }
}

struct SlideIds {
    slide: ObjectId,
    title: ObjectId,
    body: ObjectId,
}

/// The fixed request sequence for one slide.
fn slide_template(
    ids: SlideIds,
    index: usize,
    title: String,
    body: String,
) -> [MutationOp; OPS_PER_SLIDE] {
    let SlideIds { slide, title: title_id, body: body_id } = ids;
    [
        MutationOp::create_slide(slide.clone(), index),
        MutationOp::create_text_box(title_id.clone(), slide.clone(), TITLE_FRAME),
        MutationOp::insert_text(title_id.clone(), title),
        MutationOp::style_all_text(title_id, TITLE_STYLE),
        MutationOp::create_text_box(body_id.clone(), slide, BODY_FRAME),
        MutationOp::insert_text(body_id.clone(), body),
        MutationOp::style_all_text(body_id, BODY_STYLE),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ids::SequentialIds,
        slides::{CreateShape, InsertText, UpdateTextStyle},
    };

    fn fragment(text: &str) -> SlideFragment<'_> {
        SlideFragment::from_piece(text).expect("non-empty fragment")
    }

    fn ids() -> SequentialIds {
        SequentialIds::new("test").expect("prefix")
    }

    #[test]
    fn heading_becomes_title_and_paragraphs_become_lines() {
        let (spec, _) = build(fragment("# Hello\n\nWorld\n\nAgain"), 0, &mut ids());
        assert_eq!(spec.title.as_deref(), Some("Hello"));
        assert_eq!(spec.body_lines, ["World", "Again"]);
    }

    #[test]
    fn list_items_are_bulleted_in_order() {
        let (spec, _) = build(fragment("intro\n\n- a\n- b"), 1, &mut ids());
        assert_eq!(spec.title, None);
        assert_eq!(spec.body_lines, ["intro", "• a", "• b"]);
    }

    #[test]
    fn emits_seven_ops_in_fixed_order() {
        let (_, ops) = build(fragment("# T\n\nbody"), 3, &mut ids());
        let kinds: Vec<_> = ops.iter().map(MutationOp::kind).collect();
        assert_eq!(
            kinds,
            [
                "createSlide",
                "createShape",
                "insertText",
                "updateTextStyle",
                "createShape",
                "insertText",
                "updateTextStyle",
            ]
        );
        match &ops[0] {
            MutationOp::CreateSlide(slide) => assert_eq!(slide.insertion_index, 3),
            other => panic!("expected createSlide, got {other:?}"),
        }
    }

    #[test]
    fn title_and_body_ops_target_their_shapes() {
        let (_, ops) = build(fragment("# Title\n\nline one\n\nline two"), 0, &mut ids());

        let MutationOp::CreateShape(CreateShape {
            object_id: title_id,
            element_properties,
            ..
        }) = &ops[1]
        else {
            panic!("expected title shape");
        };
        assert_eq!(element_properties.page_object_id, *ops[0].object_id());
        assert_eq!(element_properties.transform.translate_y, 50.0);
        assert_eq!(element_properties.size.height.magnitude, 50.0);

        let MutationOp::InsertText(InsertText { object_id, text, .. }) = &ops[2] else {
            panic!("expected title text");
        };
        assert_eq!(object_id, title_id);
        assert_eq!(text, "Title");

        let MutationOp::UpdateTextStyle(UpdateTextStyle { style, fields, .. }) = &ops[3] else {
            panic!("expected title style");
        };
        assert_eq!(style.bold, Some(true));
        assert_eq!(fields, "bold,fontSize");

        let MutationOp::CreateShape(CreateShape {
            object_id: body_id,
            element_properties,
            ..
        }) = &ops[4]
        else {
            panic!("expected body shape");
        };
        assert_ne!(body_id, title_id);
        assert_eq!(element_properties.transform.translate_y, 120.0);
        assert_eq!(element_properties.size.height.magnitude, 350.0);

        let MutationOp::InsertText(InsertText { object_id, text, .. }) = &ops[5] else {
            panic!("expected body text");
        };
        assert_eq!(object_id, body_id);
        assert_eq!(text, "line one\n\nline two");

        let MutationOp::UpdateTextStyle(UpdateTextStyle { style, fields, .. }) = &ops[6] else {
            panic!("expected body style");
        };
        assert_eq!(style.bold, None);
        assert_eq!(fields, "fontSize");
    }

    #[test]
    fn missing_heading_falls_back_to_slide_number() {
        let (spec, ops) = build(fragment("just text"), 4, &mut ids());
        assert_eq!(spec.title, None);
        let MutationOp::InsertText(InsertText { text, .. }) = &ops[2] else {
            panic!("expected title text");
        };
        assert_eq!(text, "Slide 5");
    }

    #[test]
    fn scan_consumes_inline_after_opening_token() {
        let scan = scan([
            BlockToken::HeadingOpen,
            BlockToken::inline("Title"),
            BlockToken::Other("code_block"),
            BlockToken::ParagraphOpen,
            BlockToken::inline("text"),
            BlockToken::inline("stray"),
        ]);
        assert_eq!(scan.spec.title.as_deref(), Some("Title"));
        assert_eq!(scan.spec.body_lines, ["text"]);
        assert_eq!(scan.ignored, 2);
    }

    #[test]
    fn opening_token_without_inline_consumes_only_itself() {
        let scan = scan([
            BlockToken::ListItemOpen,
            BlockToken::ParagraphOpen,
            BlockToken::inline("kept"),
        ]);
        assert_eq!(scan.spec.body_lines, ["kept"]);
        assert_eq!(scan.ignored, 0);
    }

    #[test]
    fn later_heading_replaces_title() {
        let scan = scan([
            BlockToken::HeadingOpen,
            BlockToken::inline("First"),
            BlockToken::HeadingOpen,
            BlockToken::inline("Second"),
        ]);
        assert_eq!(scan.spec.title.as_deref(), Some("Second"));
    }

    #[test]
    fn heading_only_slide_still_gets_a_styled_empty_body() {
        let (spec, ops) = build(fragment("# Thanks"), 2, &mut ids());
        assert_eq!(spec.title.as_deref(), Some("Thanks"));
        assert!(spec.body_lines.is_empty());
        assert_eq!(ops.len(), OPS_PER_SLIDE);

        let MutationOp::InsertText(InsertText { text, .. }) = &ops[5] else {
            panic!("expected body text");
        };
        assert_eq!(text, "");
        let MutationOp::UpdateTextStyle(UpdateTextStyle { object_id, fields, .. }) = &ops[6] else {
            panic!("expected body style");
        };
        assert_eq!(object_id, ops[4].object_id());
        assert_eq!(fields, "fontSize");
    }

    #[test]
    fn unrecognised_blocks_leave_an_empty_spec() {
        let (spec, ops) = build(fragment("```\ncode\n```"), 0, &mut ids());
        assert_eq!(spec, SlideSpec::default());
        assert_eq!(ops.len(), OPS_PER_SLIDE);
    }
}
