//! Block-level token stream for one slide fragment.
//!
//! The fragment is parsed with Comrak and its AST flattened into a sequence of
//! [`BlockToken`]s: an opening token for every heading, paragraph and list
//! item, each followed by an [`BlockToken::Inline`] token carrying its plain
//! text. Blocks with no slide representation collapse into a single
//! [`BlockToken::Other`].

use comrak::{
    Arena,
    nodes::{AstNode, NodeValue},
    options::Options,
    parse_document,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockToken {
    HeadingOpen,
    ParagraphOpen,
    ListItemOpen,
    Inline(String),
    /// A block the slide builder does not render, named by its kind.
    Other(&'static str),
}

impl BlockToken {
    pub fn inline(text: impl Into<String>) -> Self {
        Self::Inline(text.into())
    }
}

/// Parse `markdown` and flatten it into block tokens in document order.
pub fn tokenize(markdown: &str) -> Vec<BlockToken> {
    let arena = Arena::new();
    let options = parser_options();
    let root = parse_document(&arena, markdown, &options);

    let mut tokens = Vec::new();
    for block in root.children() {
        push_block(block, &mut tokens);
    }
    tokens
}

fn parser_options() -> Options<'static> {
    let mut options = Options::default();
    // Tables and strikethrough must be recognised so their source text does
    // not leak into paragraphs.
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options
}

enum BlockKind {
    Heading,
    Paragraph,
    List,
    Quote,
    Unrendered(&'static str),
}

fn block_kind(node: &AstNode<'_>) -> BlockKind {
    match &node.data.borrow().value {
        NodeValue::Heading(..) => BlockKind::Heading,
        NodeValue::Paragraph => BlockKind::Paragraph,
        NodeValue::List(..) => BlockKind::List,
        NodeValue::BlockQuote => BlockKind::Quote,
        NodeValue::CodeBlock(..) => BlockKind::Unrendered("code_block"),
        NodeValue::Table(..) => BlockKind::Unrendered("table"),
        NodeValue::ThematicBreak => BlockKind::Unrendered("thematic_break"),
        NodeValue::HtmlBlock(..) => BlockKind::Unrendered("html_block"),
        _ => BlockKind::Unrendered("block"),
    }
}

fn push_block<'a>(node: &'a AstNode<'a>, tokens: &mut Vec<BlockToken>) {
    match block_kind(node) {
        BlockKind::Heading => {
            tokens.push(BlockToken::HeadingOpen);
            tokens.push(BlockToken::Inline(inline_text(node)));
        }
        BlockKind::Paragraph => {
            tokens.push(BlockToken::ParagraphOpen);
            tokens.push(BlockToken::Inline(inline_text(node)));
        }
        BlockKind::List => {
            for item in node.children() {
                push_list_item(item, tokens);
            }
        }
        BlockKind::Quote => {
            for child in node.children() {
                push_block(child, tokens);
            }
        }
        BlockKind::Unrendered(name) => tokens.push(BlockToken::Other(name)),
    }
}

/// A list item contributes the text of its leading paragraph; anything nested
/// below it is not rendered.
fn push_list_item<'a>(item: &'a AstNode<'a>, tokens: &mut Vec<BlockToken>) {
    tokens.push(BlockToken::ListItemOpen);

    let mut children = item.children();
    if let Some(first) = children.next() {
        match block_kind(first) {
            BlockKind::Paragraph => tokens.push(BlockToken::Inline(inline_text(first))),
            BlockKind::List => tokens.push(BlockToken::Other("nested_list")),
            BlockKind::Unrendered(name) => tokens.push(BlockToken::Other(name)),
            BlockKind::Heading | BlockKind::Quote => tokens.push(BlockToken::Other("block")),
        }
    }
    for rest in children {
        let name = match block_kind(rest) {
            BlockKind::List => "nested_list",
            BlockKind::Unrendered(name) => name,
            _ => "list_item_block",
        };
        tokens.push(BlockToken::Other(name));
    }
}

fn inline_text<'a>(node: &'a AstNode<'a>) -> String {
    fn walk<'a>(node: &'a AstNode<'a>, buffer: &mut String) {
        {
            let data = node.data.borrow();
            match &data.value {
                NodeValue::Text(text) => buffer.push_str(text),
                NodeValue::Code(code) => buffer.push_str(&code.literal),
                NodeValue::LineBreak | NodeValue::SoftBreak => buffer.push('\n'),
                _ => {}
            }
        }
        for child in node.children() {
            walk(child, buffer);
        }
    }

    let mut buffer = String::new();
    walk(node, &mut buffer);
    buffer.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use BlockToken::*;

    #[test]
    fn heading_and_paragraph_produce_open_inline_pairs() {
        let tokens = tokenize("# Hello\n\nWorld");
        assert_eq!(
            tokens,
            [HeadingOpen, BlockToken::inline("Hello"), ParagraphOpen, BlockToken::inline("World")]
        );
    }

    #[test]
    fn list_items_carry_their_leading_paragraph() {
        let tokens = tokenize("- a\n- b\n\n1. c");
        assert_eq!(
            tokens,
            [
                ListItemOpen,
                BlockToken::inline("a"),
                ListItemOpen,
                BlockToken::inline("b"),
                ListItemOpen,
                BlockToken::inline("c"),
            ]
        );
    }

    #[test]
    fn inline_markup_is_flattened_to_plain_text() {
        let tokens = tokenize("Some **bold** and `code` and [a link](https://example.com)");
        assert_eq!(
            tokens,
            [ParagraphOpen, BlockToken::inline("Some bold and code and a link")]
        );
    }

    #[test]
    fn soft_breaks_become_newlines() {
        let tokens = tokenize("first line\nsecond line");
        assert_eq!(
            tokens,
            [ParagraphOpen, BlockToken::inline("first line\nsecond line")]
        );
    }

    #[test]
    fn unrendered_blocks_become_other_tokens() {
        let tokens = tokenize("```rust\nfn main() {}\n```\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n***");
        assert_eq!(
            tokens,
            [Other("code_block"), Other("table"), Other("thematic_break")]
        );
    }

    #[test]
    fn nested_lists_are_not_rendered() {
        let tokens = tokenize("- outer\n  - inner");
        assert_eq!(
            tokens,
            [ListItemOpen, BlockToken::inline("outer"), Other("nested_list")]
        );
    }

    #[test]
    fn block_quote_paragraphs_are_kept() {
        let tokens = tokenize("> quoted words");
        assert_eq!(tokens, [ParagraphOpen, BlockToken::inline("quoted words")]);
    }
}
