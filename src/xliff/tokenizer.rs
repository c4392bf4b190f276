/*!
 * Inline markup tokenization for mixed-content elements.
 *
 * Every non-text child of a `<source>` (inline elements, CDATA, comments,
 * processing instructions) is swapped for a positional `__XLF_TAG_i__`
 * token so that only plain text reaches the model. After translation the
 * tokens are replaced by copies of the original nodes.
 */

use log::debug;

use super::dom::{XmlElement, XmlNode};

/// Token standing in for the non-text child at `index`
pub fn tag_token(index: usize) -> String {
    format!("__XLF_TAG_{}__", index)
}

/// Plain text with inline markup replaced by tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedMarkup {
    /// Concatenated text with one token per non-text child
    pub text: String,
    /// Copies of the replaced nodes, indexed by token number
    pub nodes: Vec<XmlNode>,
}

/// Flatten the direct children of `element` into tokenized text
pub fn extract_text_with_tokens(element: &XmlElement) -> TokenizedMarkup {
    let mut text = String::new();
    let mut nodes = Vec::new();

    for child in &element.children {
        match child {
            XmlNode::Text(value) => text.push_str(value),
            other => {
                text.push_str(&tag_token(nodes.len()));
                nodes.push(other.clone());
            }
        }
    }

    TokenizedMarkup { text, nodes }
}

/// Rebuild a child sequence from translated text and the stored nodes.
///
/// Tokens are searched in ascending index order, each one after the previous.
/// If any token cannot be found the whole text becomes a single text node.
pub fn rehydrate_nodes_from_tokens(translated: &str, nodes: &[XmlNode]) -> Vec<XmlNode> {
    if nodes.is_empty() {
        return vec![XmlNode::text(translated)];
    }

    let mut rebuilt = Vec::with_capacity(nodes.len() * 2 + 1);
    let mut cursor = 0;

    for (index, node) in nodes.iter().enumerate() {
        let token = tag_token(index);
        let Some(offset) = translated[cursor..].find(&token) else {
            debug!("Markup token {} lost, writing unit as plain text", token);
            return vec![XmlNode::text(translated)];
        };

        let before = &translated[cursor..cursor + offset];
        if !before.is_empty() {
            rebuilt.push(XmlNode::text(before));
        }
        rebuilt.push(node.clone());
        cursor += offset + token.len();
    }

    let rest = &translated[cursor..];
    if !rest.is_empty() {
        rebuilt.push(XmlNode::text(rest));
    }

    rebuilt
}
