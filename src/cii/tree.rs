use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::core::MalformedXmlError;

/// Index of a node inside its [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct NodeData {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    index_in_parent: usize,
    /// One past the last descendant. Nodes are stored in document order, so
    /// the subtree of node `i` is exactly `i..end`.
    end: usize,
    offset: u64,
}

/// An XML document as an arena of element nodes.
///
/// Element names keep their namespace prefix (`ram:ID`), which is how CII
/// producers address elements. Only elements, their attributes and their
/// text content are kept; comments, processing instructions and the
/// declaration are dropped.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
}

impl Document {
    /// Parse a UTF-8 XML payload.
    pub fn parse(input: &[u8]) -> Result<Self, MalformedXmlError> {
        let text = std::str::from_utf8(input).map_err(|e| {
            MalformedXmlError::at(input, e.valid_up_to() as u64, format!("invalid UTF-8: {e}"))
        })?;
        let (text, base) = match text.strip_prefix('\u{feff}') {
            Some(rest) => (rest, '\u{feff}'.len_utf8() as u64),
            None => (text, 0),
        };

        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);
        let mut builder = TreeBuilder::default();

        loop {
            let offset = base + reader.buffer_position() as u64;
            let fail = |message: String| MalformedXmlError::at(input, offset, message);
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    let (name, attributes) = read_start(e).map_err(fail)?;
                    builder.open(name, attributes, offset).map_err(fail)?;
                }
                Ok(Event::Empty(ref e)) => {
                    let (name, attributes) = read_start(e).map_err(fail)?;
                    builder.open(name, attributes, offset).map_err(fail)?;
                    builder.close();
                }
                Ok(Event::End(_)) => builder.close(),
                Ok(Event::Text(ref e)) => {
                    let text = e.unescape().map_err(|e| fail(e.to_string()))?;
                    builder.text(&text).map_err(fail)?;
                }
                Ok(Event::CData(e)) => {
                    let raw = e.into_inner();
                    let text = std::str::from_utf8(&raw).map_err(|e| fail(e.to_string()))?;
                    builder.text(text).map_err(fail)?;
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    let at = base + reader.error_position() as u64;
                    return Err(MalformedXmlError::at(input, at, e.to_string()));
                }
            }
        }

        let eof = input.len() as u64;
        builder
            .finish()
            .map_err(|message| MalformedXmlError::at(input, eof, message))
    }

    /// The document element.
    pub fn root(&self) -> Node<'_> {
        Node {
            doc: self,
            id: NodeId(0),
        }
    }

    /// Look up a node by id. Ids are only meaningful for the document that
    /// produced them.
    pub fn node(&self, id: NodeId) -> Option<Node<'_>> {
        (id.0 < self.nodes.len()).then_some(Node { doc: self, id })
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false for a parsed document; there is at least a root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn read_start(e: &BytesStart<'_>) -> Result<(String, Vec<(String, String)>), String> {
    let name = std::str::from_utf8(e.name().as_ref())
        .map_err(|e| e.to_string())?
        .to_string();
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| e.to_string())?
            .to_string();
        let value = attr.unescape_value().map_err(|e| e.to_string())?;
        attributes.push((key, value.into_owned()));
    }
    Ok((name, attributes))
}

#[derive(Default)]
struct TreeBuilder {
    nodes: Vec<NodeData>,
    open: Vec<usize>,
}

impl TreeBuilder {
    fn open(
        &mut self,
        name: String,
        attributes: Vec<(String, String)>,
        offset: u64,
    ) -> Result<(), String> {
        let parent = self.open.last().copied();
        if parent.is_none() && !self.nodes.is_empty() {
            return Err(format!("element <{name}> after the root element"));
        }
        let id = self.nodes.len();
        let index_in_parent = match parent {
            Some(p) => {
                let siblings = &mut self.nodes[p].children;
                siblings.push(NodeId(id));
                siblings.len() - 1
            }
            None => 0,
        };
        self.nodes.push(NodeData {
            name,
            attributes,
            text: String::new(),
            parent: parent.map(NodeId),
            children: Vec::new(),
            index_in_parent,
            end: id + 1,
            offset,
        });
        self.open.push(id);
        Ok(())
    }

    fn close(&mut self) {
        if let Some(id) = self.open.pop() {
            self.nodes[id].end = self.nodes.len();
        }
    }

    fn text(&mut self, text: &str) -> Result<(), String> {
        match self.open.last() {
            Some(&id) => {
                self.nodes[id].text.push_str(text);
                Ok(())
            }
            None if text.trim().is_empty() => Ok(()),
            None => Err("text outside the root element".to_string()),
        }
    }

    fn finish(self) -> Result<Document, String> {
        if let Some(&id) = self.open.last() {
            return Err(format!("unclosed element <{}>", self.nodes[id].name));
        }
        if self.nodes.is_empty() {
            return Err("no root element".to_string());
        }
        Ok(Document { nodes: self.nodes })
    }
}

/// A borrowed handle to one element of a [`Document`].
#[derive(Clone, Copy)]
pub struct Node<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> Node<'a> {
    fn data(&self) -> &'a NodeData {
        &self.doc.nodes[self.id.0]
    }

    fn at(&self, id: NodeId) -> Node<'a> {
        Node { doc: self.doc, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Qualified tag name, prefix included (e.g. `ram:ID`).
    pub fn name(&self) -> &'a str {
        &self.data().name
    }

    /// Tag name without its namespace prefix.
    pub fn local_name(&self) -> &'a str {
        let name = self.name();
        name.rsplit_once(':').map_or(name, |(_, local)| local)
    }

    /// Text directly inside this element, trimmed. Empty when there is none.
    pub fn text(&self) -> &'a str {
        self.data().text.trim()
    }

    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.data()
            .attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Byte offset of the start tag in the input.
    pub fn offset(&self) -> u64 {
        self.data().offset
    }

    pub fn parent(&self) -> Option<Node<'a>> {
        self.data().parent.map(|p| self.at(p))
    }

    pub fn children(self) -> impl Iterator<Item = Node<'a>> {
        self.data().children.iter().map(move |&id| self.at(id))
    }

    pub fn next_sibling(&self) -> Option<Node<'a>> {
        let parent = self.parent()?;
        let index = self.data().index_in_parent + 1;
        parent.data().children.get(index).map(|&id| self.at(id))
    }

    pub fn previous_sibling(&self) -> Option<Node<'a>> {
        let parent = self.parent()?;
        let index = self.data().index_in_parent.checked_sub(1)?;
        parent.data().children.get(index).map(|&id| self.at(id))
    }

    /// All elements below this one in document order, excluding itself.
    pub fn descendants(self) -> impl Iterator<Item = Node<'a>> {
        (self.id.0 + 1..self.data().end).map(move |i| self.at(NodeId(i)))
    }

    /// Whether `other` lies inside this node's subtree (or is this node).
    pub fn contains(&self, other: &Node<'_>) -> bool {
        std::ptr::eq(self.doc, other.doc) && (self.id.0..self.data().end).contains(&other.id.0)
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id.0)
            .field("name", &self.name())
            .field("text", &self.text())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rsm:Root xmlns:rsm="urn:a" xmlns:ram="urn:b">
  <!-- header -->
  <ram:ID>R-1</ram:ID>
  <ram:Empty/>
  <ram:Group>
    <ram:Qty unitCode="HUR">2</ram:Qty>
    <ram:Name>Müller &amp; Söhne</ram:Name>
  </ram:Group>
  <ram:Note><![CDATA[a < b]]></ram:Note>
</rsm:Root>"#;

    #[test]
    fn parses_elements_in_document_order() {
        let doc = Document::parse(SAMPLE.as_bytes()).unwrap();
        assert_eq!(doc.len(), 7);
        let root = doc.root();
        assert_eq!(root.name(), "rsm:Root");
        assert_eq!(root.local_name(), "Root");
        let names: Vec<_> = root.children().map(|n| n.name()).collect();
        assert_eq!(names, ["ram:ID", "ram:Empty", "ram:Group", "ram:Note"]);
    }

    #[test]
    fn text_attributes_and_entities() {
        let doc = Document::parse(SAMPLE.as_bytes()).unwrap();
        let group = doc.root().children().nth(2).unwrap();
        let qty = group.children().next().unwrap();
        assert_eq!(qty.text(), "2");
        assert_eq!(qty.attribute("unitCode"), Some("HUR"));
        assert_eq!(qty.attribute("currencyID"), None);
        assert_eq!(qty.next_sibling().unwrap().text(), "Müller & Söhne");
        assert_eq!(doc.root().children().last().unwrap().text(), "a < b");
    }

    #[test]
    fn empty_element_has_no_children() {
        let doc = Document::parse(SAMPLE.as_bytes()).unwrap();
        let empty = doc.root().children().nth(1).unwrap();
        assert_eq!(empty.name(), "ram:Empty");
        assert_eq!(empty.children().count(), 0);
        assert_eq!(empty.text(), "");
    }

    #[test]
    fn navigation() {
        let doc = Document::parse(SAMPLE.as_bytes()).unwrap();
        let root = doc.root();
        let group = root.children().nth(2).unwrap();
        let name = group.children().nth(1).unwrap();

        assert_eq!(name.parent(), Some(group));
        assert_eq!(group.parent(), Some(root));
        assert_eq!(root.parent(), None);
        assert_eq!(name.next_sibling(), None);
        assert_eq!(name.previous_sibling().unwrap().name(), "ram:Qty");
        assert_eq!(root.children().next().unwrap().previous_sibling(), None);

        let below_group: Vec<_> = group.descendants().map(|n| n.name()).collect();
        assert_eq!(below_group, ["ram:Qty", "ram:Name"]);
        assert_eq!(root.descendants().count(), 6);
        assert!(group.contains(&name));
        assert!(!group.contains(&root));
        assert_eq!(doc.node(name.id()), Some(name));
    }

    #[test]
    fn unclosed_element_is_malformed() {
        let err = Document::parse(b"<a><b>text</b>").unwrap_err();
        assert!(err.message.contains("unclosed"), "{err}");
        assert_eq!(err.offset, 14);
    }

    #[test]
    fn mismatched_end_tag_is_malformed() {
        let err = Document::parse(b"<a>\n<b></c></a>").unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn invalid_utf8_reports_offset() {
        let err = Document::parse(b"<a>ok\xff</a>").unwrap_err();
        assert_eq!(err.offset, 5);
        assert!(err.message.contains("UTF-8"));
    }

    #[test]
    fn rejects_missing_and_multiple_roots() {
        assert!(Document::parse(b"").unwrap_err().message.contains("no root"));
        assert!(Document::parse(b"<?xml version=\"1.0\"?>").is_err());
        assert!(Document::parse(b"<a/><b/>").is_err());
        assert!(Document::parse(b"<a/>trailing").is_err());
    }

    #[test]
    fn byte_order_mark_is_skipped() {
        let mut input = "\u{feff}".as_bytes().to_vec();
        input.extend_from_slice(b"<a>x</a>");
        let doc = Document::parse(&input).unwrap();
        assert_eq!(doc.root().text(), "x");
        assert_eq!(doc.root().offset(), 3);
    }
}
