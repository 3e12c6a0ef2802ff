//! XML document helpers shared by the markup and build-descriptor families.

pub mod xpath;

use roxmltree::{Document, Node, ParsingOptions};

pub use xpath::{XNode, XPath, XPathError};

pub fn parse(text: &str) -> Result<Document<'_>, roxmltree::Error> {
    Document::parse_with_options(
        text,
        ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        },
    )
}

/// `name` is either a local name (any namespace) or `prefix:local`, resolved against the
/// namespaces in scope at `node`.
pub fn element_has_name(node: Node<'_, '_>, name: &str) -> bool {
    if !node.is_element() {
        return false;
    }
    let tag = node.tag_name();
    match name.split_once(':') {
        None => tag.name() == name,
        Some((prefix, local)) => {
            tag.name() == local
                && tag.namespace().is_some()
                && node.lookup_namespace_uri(Some(prefix)) == tag.namespace()
        }
    }
}

/// Value of the attribute called `name` (`local` without namespace, or `prefix:local`).
pub fn attribute_value<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    match name.split_once(':') {
        None => node
            .attributes()
            .find(|a| a.namespace().is_none() && a.name() == name)
            .map(|a| a.value()),
        Some((prefix, local)) => {
            let uri = node.lookup_namespace_uri(Some(prefix))?;
            node.attributes()
                .find(|a| a.namespace() == Some(uri) && a.name() == local)
                .map(|a| a.value())
        }
    }
}

/// Elements in document order whose name matches `name`.
pub fn elements_named<'a, 'i>(doc: &'a Document<'i>, name: &str) -> Vec<Node<'a, 'i>> {
    doc.descendants()
        .filter(|n| element_has_name(*n, name))
        .collect()
}

/// First child element with the given local name.
pub fn child<'a, 'i>(node: Node<'a, 'i>, local: &str) -> Option<Node<'a, 'i>> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == local)
}

/// Trimmed text of the first child element with the given local name.
pub fn child_text<'a>(node: Node<'a, '_>, local: &str) -> Option<&'a str> {
    child(node, local)
        .and_then(|c| c.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
