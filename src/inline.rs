use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

/// One element of a parsed markdown inline-content tree.
///
/// Owned by the caller, borrowed by the renderer for the duration of one
/// render call. Trees are finite and acyclic by construction.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineNode {
    Text(String),
    SoftBreak,
    LineBreak,
    Code(String),
    Html(String),
    Emphasis(Vec<InlineNode>),
    Strong(Vec<InlineNode>),
    Strikethrough(Vec<InlineNode>),
    Link {
        destination: String,
        children: Vec<InlineNode>,
    },
    Image {
        source: String,
        children: Vec<InlineNode>,
    },
}

enum Scope {
    Emphasis,
    Strong,
    Strikethrough,
    Link(String),
    Image(String),
}

struct TreeBuilder {
    stack: Vec<(Scope, Vec<InlineNode>)>,
    root: Vec<InlineNode>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: Vec::new(),
            root: Vec::new(),
        }
    }

    fn push(&mut self, node: InlineNode) {
        match self.stack.last_mut() {
            Some((_, children)) => children.push(node),
            None => self.root.push(node),
        }
    }

    fn open(&mut self, scope: Scope) {
        self.stack.push((scope, Vec::new()));
    }

    fn close(&mut self) {
        let Some((scope, children)) = self.stack.pop() else {
            return;
        };

        let node = match scope {
            Scope::Emphasis => InlineNode::Emphasis(children),
            Scope::Strong => InlineNode::Strong(children),
            Scope::Strikethrough => InlineNode::Strikethrough(children),
            Scope::Link(destination) => InlineNode::Link {
                destination,
                children,
            },
            Scope::Image(source) => InlineNode::Image { source, children },
        };
        self.push(node);
    }

    fn finish(mut self) -> Vec<InlineNode> {
        // Unterminated containers still contribute their children.
        while !self.stack.is_empty() {
            self.close();
        }
        self.root
    }
}

/// Parse a markdown snippet into its inline content.
///
/// Block-level structure contributes no nodes; feed this inline content
/// such as a single paragraph.
pub fn inline_nodes(markdown: &str) -> Vec<InlineNode> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(markdown, options);

    let mut builder = TreeBuilder::new();

    for event in parser {
        match event {
            Event::Start(tag) => match tag {
                Tag::Emphasis => builder.open(Scope::Emphasis),
                Tag::Strong => builder.open(Scope::Strong),
                Tag::Strikethrough => builder.open(Scope::Strikethrough),
                Tag::Link { dest_url, .. } => builder.open(Scope::Link(dest_url.to_string())),
                Tag::Image { dest_url, .. } => builder.open(Scope::Image(dest_url.to_string())),
                _ => {}
            },
            Event::End(tag_end) => match tag_end {
                TagEnd::Emphasis
                | TagEnd::Strong
                | TagEnd::Strikethrough
                | TagEnd::Link
                | TagEnd::Image => builder.close(),
                _ => {}
            },
            Event::Text(text) => builder.push(InlineNode::Text(text.to_string())),
            Event::Code(code) => builder.push(InlineNode::Code(code.to_string())),
            Event::Html(html) | Event::InlineHtml(html) => {
                builder.push(InlineNode::Html(html.to_string()))
            }
            Event::SoftBreak => builder.push(InlineNode::SoftBreak),
            Event::HardBreak => builder.push(InlineNode::LineBreak),
            _ => {}
        }
    }

    builder.finish()
}
