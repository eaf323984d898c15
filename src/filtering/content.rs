// Content extraction: visible text and word counts
use scraper::{Html, Node};

use crate::filtering::types::CandidateResult;

/// Elements whose text never reaches the reader
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Visible text of a document, text nodes joined by single spaces
pub fn visible_text(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let document = Html::parse_document(html);
    let mut parts: Vec<&str> = Vec::new();

    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| match ancestor.value() {
            Node::Element(element) => HIDDEN_ELEMENTS.contains(&element.name()),
            _ => false,
        });

        if !hidden {
            let text: &str = text;
            if !text.trim().is_empty() {
                parts.push(text);
            }
        }
    }

    parts.join(" ")
}

/// Whitespace-separated token count of the visible text
pub fn word_count_html(html: &str) -> usize {
    visible_text(html).split_whitespace().count()
}

/// Word count of a candidate's page
pub fn word_count(candidate: &CandidateResult) -> usize {
    word_count_html(&candidate.html)
}
