/*!
 * Minimal mutable XML tree.
 *
 * Documents are read with `quick-xml` into owned nodes, edited in place and
 * written back out. Whitespace-only text is kept as ordinary text nodes so the
 * layout of the input survives a round trip. Cloning a node is a deep copy.
 */

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::errors::XliffError;

/// A node in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    /// Element with attributes and children
    Element(XmlElement),
    /// Unescaped character data
    Text(String),
    /// CDATA section content
    CData(String),
    /// Comment body
    Comment(String),
    /// Processing instruction content (`target data`)
    ProcessingInstruction(String),
    /// Document type declaration content
    DocType(String),
}

impl XmlNode {
    /// Shorthand for a text node
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Element view of this node, if it is one
    pub fn as_element(&self) -> Option<&XmlElement> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }
}

impl From<XmlElement> for XmlNode {
    fn from(element: XmlElement) -> Self {
        Self::Element(element)
    }
}

/// An element, its attributes in document order and its children
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    /// Qualified name as written (`prefix:local` or `local`)
    pub name: String,
    /// Attributes with unescaped values
    pub attributes: Vec<(String, String)>,
    /// Child nodes
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Create an empty element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Name without namespace prefix
    pub fn local_name(&self) -> &str {
        split_qname(&self.name).1
    }

    /// Namespace prefix, if any
    pub fn prefix(&self) -> Option<&str> {
        split_qname(&self.name).0
    }

    /// Look up an attribute value by qualified name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set or replace an attribute
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.attributes.push((name.to_string(), value.to_string())),
        }
    }

    /// Concatenated text of all descendant text and CDATA nodes
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                XmlNode::Text(text) | XmlNode::CData(text) => out.push_str(text),
                XmlNode::Element(element) => element.collect_text(out),
                _ => {}
            }
        }
    }

    /// Index of the first child element in namespace `ns` with local name `local`
    pub fn find_child(&self, scope: &NamespaceScope, ns: &str, local: &str) -> Option<usize> {
        self.children.iter().position(|child| match child {
            XmlNode::Element(element) => {
                element.local_name() == local && scope.enter(element).resolve(element) == Some(ns)
            }
            _ => false,
        })
    }

    /// Mutable element child at `index`
    pub fn child_element_mut(&mut self, index: usize) -> Option<&mut XmlElement> {
        match self.children.get_mut(index) {
            Some(XmlNode::Element(element)) => Some(element),
            _ => None,
        }
    }

    /// Element child at `index`
    pub fn child_element(&self, index: usize) -> Option<&XmlElement> {
        self.children.get(index).and_then(XmlNode::as_element)
    }
}

fn split_qname(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}

/// In-scope namespace bindings while walking the tree
#[derive(Debug, Clone, Default)]
pub struct NamespaceScope {
    bindings: Vec<(Option<String>, String)>,
}

impl NamespaceScope {
    /// Scope as seen from inside `element`
    pub fn enter(&self, element: &XmlElement) -> Self {
        let mut scope = self.clone();
        for (key, value) in &element.attributes {
            if key == "xmlns" {
                scope.bindings.push((None, value.clone()));
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                scope.bindings.push((Some(prefix.to_string()), value.clone()));
            }
        }
        scope
    }

    /// Namespace URI of `element`; the scope must already include it
    pub fn resolve(&self, element: &XmlElement) -> Option<&str> {
        let prefix = element.prefix();
        self.bindings
            .iter()
            .rev()
            .find(|(bound, _)| bound.as_deref() == prefix)
            .map(|(_, uri)| uri.as_str())
            .filter(|uri| !uri.is_empty())
    }
}

/// Location of an element found by [`XmlDocument::find_elements`]
#[derive(Debug, Clone)]
pub struct ElementMatch {
    /// Child indices from the document's top-level nodes down to the element
    pub path: Vec<usize>,
    /// Namespace scope inside the element
    pub scope: NamespaceScope,
}

/// The `<?xml ...?>` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDeclaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

/// A parsed document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    /// Declaration, if the input had one
    pub declaration: Option<XmlDeclaration>,
    /// Top-level nodes; exactly one of them is the root element
    pub nodes: Vec<XmlNode>,
}

impl XmlDocument {
    /// Parse a document, keeping all whitespace
    pub fn parse(input: &str) -> Result<Self, XliffError> {
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);
        let mut reader = Reader::from_str(input);
        reader.trim_text(false);

        let mut declaration = None;
        let mut top_level: Vec<XmlNode> = Vec::new();
        let mut open: Vec<XmlElement> = Vec::new();

        loop {
            let node = match reader.read_event()? {
                Event::Eof => break,
                Event::Decl(decl) => {
                    declaration = Some(read_declaration(&decl)?);
                    continue;
                }
                Event::Start(start) => {
                    open.push(read_element(&start)?);
                    continue;
                }
                Event::End(_) => {
                    let Some(element) = open.pop() else {
                        return Err(XliffError::Parse("unexpected closing tag".to_string()));
                    };
                    XmlNode::Element(element)
                }
                Event::Empty(start) => XmlNode::Element(read_element(&start)?),
                Event::Text(text) => XmlNode::Text(text.unescape()?.into_owned()),
                Event::CData(cdata) => XmlNode::CData(bytes_to_string(&cdata)?),
                Event::Comment(comment) => XmlNode::Comment(bytes_to_string(&comment)?),
                Event::PI(pi) => XmlNode::ProcessingInstruction(bytes_to_string(&pi)?),
                Event::DocType(doctype) => XmlNode::DocType(bytes_to_string(&doctype)?),
            };

            match open.last_mut() {
                Some(parent) => parent.children.push(node),
                None => top_level.push(node),
            }
        }

        if let Some(unclosed) = open.last() {
            return Err(XliffError::Parse(format!("unclosed element <{}>", unclosed.name)));
        }

        let document = Self {
            declaration,
            nodes: top_level,
        };
        document.root().ok_or(XliffError::MissingRoot)?;
        Ok(document)
    }

    /// Root element
    pub fn root(&self) -> Option<&XmlElement> {
        self.nodes.iter().find_map(XmlNode::as_element)
    }

    /// All elements with namespace `ns` and local name `local`, in document order
    pub fn find_elements(&self, ns: &str, local: &str) -> Vec<ElementMatch> {
        let mut found = Vec::new();
        let scope = NamespaceScope::default();
        for (index, node) in self.nodes.iter().enumerate() {
            if let XmlNode::Element(element) = node {
                collect_matches(element, &scope, ns, local, &mut vec![index], &mut found);
            }
        }
        found
    }

    /// Element reached by following `path`
    pub fn element_at_mut(&mut self, path: &[usize]) -> Option<&mut XmlElement> {
        let (first, rest) = path.split_first()?;
        let mut current = match self.nodes.get_mut(*first)? {
            XmlNode::Element(element) => element,
            _ => return None,
        };
        for index in rest {
            current = current.child_element_mut(*index)?;
        }
        Some(current)
    }

    /// Serialize the tree back to a string
    pub fn to_xml_string(&self) -> Result<String, XliffError> {
        let mut writer = Writer::new(Vec::new());

        if let Some(decl) = &self.declaration {
            writer.write_event(Event::Decl(BytesDecl::new(
                &decl.version,
                decl.encoding.as_deref(),
                decl.standalone.as_deref(),
            )))?;
        }
        for node in &self.nodes {
            write_node(&mut writer, node)?;
        }

        Ok(String::from_utf8(writer.into_inner())?)
    }
}

fn collect_matches(
    element: &XmlElement,
    parent_scope: &NamespaceScope,
    ns: &str,
    local: &str,
    path: &mut Vec<usize>,
    found: &mut Vec<ElementMatch>,
) {
    let scope = parent_scope.enter(element);
    if element.local_name() == local && scope.resolve(element) == Some(ns) {
        found.push(ElementMatch {
            path: path.clone(),
            scope: scope.clone(),
        });
    }
    for (index, child) in element.children.iter().enumerate() {
        if let XmlNode::Element(child) = child {
            path.push(index);
            collect_matches(child, &scope, ns, local, path, found);
            path.pop();
        }
    }
}

fn read_element(start: &BytesStart) -> Result<XmlElement, XliffError> {
    let mut element = XmlElement::new(bytes_to_string(start.name().as_ref())?);
    for attribute in start.attributes() {
        let attribute = attribute?;
        let key = bytes_to_string(attribute.key.as_ref())?;
        let value = attribute.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn read_declaration(decl: &BytesDecl) -> Result<XmlDeclaration, XliffError> {
    let version = bytes_to_string(&decl.version()?)?;
    let encoding = match decl.encoding() {
        Some(encoding) => Some(bytes_to_string(&encoding?)?),
        None => None,
    };
    let standalone = match decl.standalone() {
        Some(standalone) => Some(bytes_to_string(&standalone?)?),
        None => None,
    };
    Ok(XmlDeclaration {
        version,
        encoding,
        standalone,
    })
}

fn bytes_to_string(bytes: &[u8]) -> Result<String, XliffError> {
    Ok(String::from_utf8(bytes.to_vec())?)
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &XmlNode) -> Result<(), XliffError> {
    match node {
        XmlNode::Element(element) => {
            let mut start = BytesStart::new(element.name.as_str());
            for (key, value) in &element.attributes {
                start.push_attribute((key.as_str(), value.as_str()));
            }
            if element.children.is_empty() {
                writer.write_event(Event::Empty(start))?;
            } else {
                writer.write_event(Event::Start(start))?;
                for child in &element.children {
                    write_node(writer, child)?;
                }
                writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
            }
        }
        XmlNode::Text(text) => {
            if !text.is_empty() {
                writer.write_event(Event::Text(BytesText::new(text)))?;
            }
        }
        XmlNode::CData(text) => writer.write_event(Event::CData(BytesCData::new(text.as_str())))?,
        XmlNode::Comment(text) => {
            writer.write_event(Event::Comment(BytesText::from_escaped(text.as_str())))?;
        }
        XmlNode::ProcessingInstruction(text) => {
            writer.write_event(Event::PI(BytesText::from_escaped(text.as_str())))?;
        }
        XmlNode::DocType(text) => {
            writer.write_event(Event::DocType(BytesText::from_escaped(text.as_str())))?;
        }
    }
    Ok(())
}
