//! Minimal owned XML tree used for canonicalization.
//!
//! Text nodes hold unescaped character data and are escaped again on write.
//! Attribute values, CDATA, comments and processing instructions keep their
//! source text. Attribute order, text escaping and the empty-element form are
//! what change when a tree is written back out.

/// A parsed attribute. `value` is the raw, still-escaped value text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// An element with its attributes and child nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

/// Any node that can appear inside an element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Sort attributes by name on this element and every descendant.
    pub fn sort_attributes(&mut self) {
        if self.attributes.len() > 1 {
            self.attributes.sort_by(|a, b| a.name.cmp(&b.name));
        }
        for child in &mut self.children {
            if let Node::Element(element) = child {
                element.sort_attributes();
            }
        }
    }

    /// Append the compact serialization of this element.
    pub fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for attr in &self.attributes {
            out.push(' ');
            out.push_str(&attr.name);
            out.push_str("=\"");
            // Values quoted with ' may contain a literal "
            out.push_str(&attr.value.replace('"', "&quot;"));
            out.push('"');
        }

        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }

        out.push('>');
        for child in &self.children {
            child.write_to(out);
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

impl Node {
    pub fn write_to(&self, out: &mut String) {
        match self {
            Node::Element(element) => element.write_to(out),
            Node::Text(text) => escape_text(text, out),
            Node::CData(data) => {
                out.push_str("<![CDATA[");
                out.push_str(data);
                out.push_str("]]>");
            }
            Node::Comment(comment) => {
                out.push_str("<!--");
                out.push_str(comment);
                out.push_str("-->");
            }
            Node::ProcessingInstruction(body) => {
                out.push_str("<?");
                out.push_str(body);
                out.push_str("?>");
            }
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }
}

/// Append character data with the markup characters escaped.
fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

/// Serialize a sequence of nodes back to back.
pub fn write_nodes(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        node.write_to(&mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(name: &str, value: &str) -> Attribute {
        Attribute {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_sort_is_recursive() {
        let mut inner = Element::new("child");
        inner.attributes = vec![attr("z", "1"), attr("a", "2")];

        let mut outer = Element::new("parent");
        outer.attributes = vec![attr("b", "x"), attr("a", "y")];
        outer.children.push(Node::Element(inner));

        outer.sort_attributes();

        let mut out = String::new();
        outer.write_to(&mut out);
        assert_eq!(
            out,
            r#"<parent a="y" b="x"><child a="2" z="1"/></parent>"#
        );
    }

    #[test]
    fn test_empty_element_form() {
        let mut out = String::new();
        Element::new("flow").write_to(&mut out);
        assert_eq!(out, "<flow/>");
    }

    #[test]
    fn test_double_quote_in_value_escaped() {
        let mut element = Element::new("a");
        element.attributes.push(attr("title", "say \"hi\""));

        let mut out = String::new();
        element.write_to(&mut out);
        assert_eq!(out, r#"<a title="say &quot;hi&quot;"/>"#);
    }

    #[test]
    fn test_text_escaped_on_write() {
        let nodes = vec![Node::Text("a < b && c > d".to_string())];
        assert_eq!(write_nodes(&nodes), "a &lt; b &amp;&amp; c &gt; d");
    }

    #[test]
    fn test_write_nodes_concatenates() {
        let nodes = vec![
            Node::Comment(" c ".to_string()),
            Node::Text("text".to_string()),
            Node::CData("<raw>".to_string()),
            Node::ProcessingInstruction("target data".to_string()),
        ];
        assert_eq!(
            write_nodes(&nodes),
            "<!-- c -->text<![CDATA[<raw>]]><?target data?>"
        );
    }
}
