use ego_tree::iter::Edge;
use scraper::{Html, Node};

/// Elements whose text never reaches the reader.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Elements that start a new line or box when rendered.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "details", "dialog", "div", "dl",
    "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "hr", "li", "main", "nav", "ol", "option", "p", "pre", "section", "summary",
    "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Strip markup from rendered HTML, keeping only visible text.
///
/// Text nodes inside one block are concatenated without separators, so a
/// figure split across inline elements (`<b>76.5%</b> of retail`) reads as
/// one phrase. Block boundaries (`li`, `td`, `p`, `br` ...) become a space,
/// so neighbouring list items or cells never fuse into one number.
/// Whitespace runs, including non-breaking spaces, collapse to a single space.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut raw = String::with_capacity(html.len() / 4);
    let mut hidden_depth = 0usize;

    for edge in document.tree.root().traverse() {
        match edge {
            Edge::Open(node) => match node.value() {
                Node::Element(el) if HIDDEN_ELEMENTS.contains(&el.name()) => hidden_depth += 1,
                Node::Element(el) if BLOCK_ELEMENTS.contains(&el.name()) => raw.push(' '),
                Node::Text(text) if hidden_depth == 0 => raw.push_str(text),
                _ => {}
            },
            Edge::Close(node) => match node.value() {
                Node::Element(el) if HIDDEN_ELEMENTS.contains(&el.name()) => {
                    hidden_depth = hidden_depth.saturating_sub(1)
                }
                Node::Element(el) if BLOCK_ELEMENTS.contains(&el.name()) => raw.push(' '),
                _ => {}
            },
        }
    }

    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
