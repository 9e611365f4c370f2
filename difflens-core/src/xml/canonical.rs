//! Single-line XML canonicalization.

use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

use super::tree::{write_nodes, Attribute, Element, Node};

/// Name of the synthetic element wrapped around fragments.
const WRAPPER: &str = "dummyroot";

/// Lines starting with this are parsed as standalone documents.
const XML_DECLARATION: &str = "<?xml";

/// Not allowed in character data outside a CDATA section.
const CDATA_END: &str = "]]>";

/// Why a line could not be treated as XML. Never leaves this module's
/// public fallback path; exposed for diagnostics via [`try_canonicalize`].
#[derive(Error, Debug)]
pub enum FragmentError {
    #[error("XML syntax error: {0}")]
    Syntax(#[from] quick_xml::Error),

    #[error("malformed attribute: {0}")]
    Attribute(#[from] AttrError),

    #[error("invalid UTF-8 in markup: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("invalid XML name '{0}'")]
    InvalidName(String),

    #[error("unbalanced tags near '{0}'")]
    Unbalanced(String),

    #[error("malformed document: {0}")]
    Structure(&'static str),
}

/// Canonical form of a diff line.
///
/// Identity (trimmed) when `xml_mode` is off or the line is blank. Otherwise
/// the line is parsed as XML, attributes are sorted by name on every element
/// and the result is serialized compactly. Any parse failure yields the
/// trimmed line, so an unparsable line can only ever match literally.
pub fn canonicalize(text: &str, xml_mode: bool) -> String {
    let trimmed = text.trim();
    if !xml_mode || trimmed.is_empty() {
        return trimmed.to_string();
    }

    match try_canonicalize(trimmed) {
        Ok(canonical) => canonical,
        Err(err) => {
            tracing::trace!(error = %err, line = trimmed, "not an XML fragment, using literal text");
            trimmed.to_string()
        }
    }
}

/// Canonicalize a trimmed line, reporting why parsing failed.
pub fn try_canonicalize(fragment: &str) -> Result<String, FragmentError> {
    if fragment.starts_with(XML_DECLARATION) {
        let mut nodes = parse_document(fragment)?;
        sort_all(&mut nodes);
        return Ok(write_nodes(&nodes));
    }

    let wrapped = format!("<{WRAPPER}>{fragment}</{WRAPPER}>");
    let mut nodes = parse_nodes(&wrapped, false)?;
    match nodes.as_mut_slice() {
        [Node::Element(root)] if root.name == WRAPPER => {
            root.sort_attributes();
            Ok(write_nodes(&root.children))
        }
        _ => Err(FragmentError::Structure("content outside the wrapper element")),
    }
}

fn sort_all(nodes: &mut [Node]) {
    for node in nodes {
        if let Node::Element(element) = node {
            element.sort_attributes();
        }
    }
}

/// Parse a line that carries its own XML declaration.
///
/// Whitespace and the DOCTYPE outside the root element are dropped; exactly
/// one root element is required.
fn parse_document(input: &str) -> Result<Vec<Node>, FragmentError> {
    let nodes: Vec<Node> = parse_nodes(input, true)?
        .into_iter()
        .filter(|node| !matches!(node, Node::Text(text) if text.trim().is_empty()))
        .collect();

    if nodes.iter().any(|node| matches!(node, Node::Text(_) | Node::CData(_))) {
        return Err(FragmentError::Structure("character data outside the root element"));
    }
    match nodes.iter().filter(|node| node.is_element()).count() {
        1 => Ok(nodes),
        0 => Err(FragmentError::Structure("no root element")),
        _ => Err(FragmentError::Structure("more than one root element")),
    }
}

/// Read all events into a list of top-level nodes.
///
/// `declared` allows an XML declaration as the very first event and a
/// DOCTYPE at the top level.
fn parse_nodes(input: &str, declared: bool) -> Result<Vec<Node>, FragmentError> {
    let mut reader = Reader::from_str(input);
    let mut stack: Vec<Element> = Vec::new();
    let mut top: Vec<Node> = Vec::new();
    let mut first_event = true;

    loop {
        let event = reader.read_event()?;
        let at_start = std::mem::replace(&mut first_event, false);

        let node = match event {
            Event::Start(e) => {
                stack.push(start_element(&e)?);
                continue;
            }
            Event::Empty(e) => Node::Element(start_element(&e)?),
            Event::End(e) => {
                let name = std::str::from_utf8(e.name().into_inner())?;
                match stack.pop() {
                    Some(element) if element.name == name => Node::Element(element),
                    _ => return Err(FragmentError::Unbalanced(name.to_string())),
                }
            }
            Event::Text(e) => {
                if std::str::from_utf8(&e)?.contains(CDATA_END) {
                    return Err(FragmentError::Structure("']]>' in character data"));
                }
                // Rejects bare '&' and undefined entities
                Node::Text(e.unescape()?.into_owned())
            }
            Event::CData(e) => Node::CData(std::str::from_utf8(&e)?.to_string()),
            Event::Comment(e) => Node::Comment(std::str::from_utf8(&e)?.to_string()),
            Event::PI(e) => Node::ProcessingInstruction(std::str::from_utf8(&e)?.to_string()),
            Event::Decl(e) => {
                if !(declared && at_start) {
                    return Err(FragmentError::Structure("misplaced XML declaration"));
                }
                e.version()?;
                continue;
            }
            Event::DocType(_) => {
                if !declared || !stack.is_empty() {
                    return Err(FragmentError::Structure("misplaced DOCTYPE"));
                }
                continue;
            }
            Event::Eof => break,
        };

        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => top.push(node),
        }
    }

    if let Some(open) = stack.last() {
        return Err(FragmentError::Unbalanced(open.name.clone()));
    }
    Ok(top)
}

fn start_element(e: &BytesStart<'_>) -> Result<Element, FragmentError> {
    let name = checked_name(e.name().as_ref())?;
    let mut element = Element::new(name);

    for attr in e.attributes() {
        let attr = attr?;
        attr.unescape_value()?;
        let value = std::str::from_utf8(&attr.value)?;
        if value.contains('<') {
            return Err(FragmentError::Structure("'<' in attribute value"));
        }
        element.attributes.push(Attribute {
            name: checked_name(attr.key.as_ref())?,
            value: value.to_string(),
        });
    }
    Ok(element)
}

/// Decode a tag or attribute name and reject obviously illegal ones.
fn checked_name(raw: &[u8]) -> Result<String, FragmentError> {
    let name = std::str::from_utf8(raw)?;
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == ':');
    let valid_rest = chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.'));

    if valid_start && valid_rest {
        Ok(name.to_string())
    } else {
        Err(FragmentError::InvalidName(name.to_string()))
    }
}
