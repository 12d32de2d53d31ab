//! Element-tree input for the decoder.
//!
//! The decoder never touches XML text directly. It walks anything that
//! implements [`XmlNode`]: a tag, attribute lookup, optional text, and ordered
//! element children. Two implementations ship with the crate:
//!
//! - [`Element`], an owned tree that is easy to build in code and tests
//! - `roxmltree::Node`, used by [`Document::from_xml`](crate::Document::from_xml)
//!   to decode XML text

use crate::decoder::DecodeOptions;
use crate::error::Result;
use crate::scan;

/// Read-only view of one element in a parsed tree.
pub trait XmlNode: Sized {
    /// Local tag name, without namespace prefix.
    fn tag(&self) -> &str;

    fn attribute(&self, name: &str) -> Option<&str>;

    /// Text between the start tag and the first child, if any.
    fn text(&self) -> Option<&str>;

    /// Element children in document order. Text, comments and processing
    /// instructions are not included.
    fn children(&self) -> Vec<Self>;
}

/// An owned element tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Element with a `name` attribute, the form every keyed child takes.
    pub fn named(tag: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(tag).with_attribute("name", name)
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn child_elements(&self) -> &[Element] {
        &self.children
    }

    /// Parse XML text into an owned tree rooted at the document element.
    ///
    /// Input nested deeper than a default decode accepts is rejected with
    /// [`SonError::DepthLimitExceeded`](crate::SonError::DepthLimitExceeded)
    /// before parsing.
    pub fn parse(xml: &str) -> Result<Self> {
        scan::check_depth(xml, DecodeOptions::DEFAULT_MAX_DEPTH)?;
        let tree = roxmltree::Document::parse(xml)?;
        Ok(Self::from(tree.root_element()))
    }
}

impl<'a, 'input> From<roxmltree::Node<'a, 'input>> for Element {
    fn from(node: roxmltree::Node<'a, 'input>) -> Self {
        Self {
            tag: node.tag_name().name().to_string(),
            attributes: node
                .attributes()
                .map(|attr| (attr.name().to_string(), attr.value().to_string()))
                .collect(),
            text: node.text().map(str::to_string),
            children: node
                .children()
                .filter(|child| child.is_element())
                .map(Element::from)
                .collect(),
        }
    }
}

impl<'e> XmlNode for &'e Element {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn children(&self) -> Vec<Self> {
        let element: &'e Element = *self;
        element.children.iter().collect()
    }
}

impl<'a, 'input> XmlNode for roxmltree::Node<'a, 'input> {
    fn tag(&self) -> &str {
        self.tag_name().name()
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        roxmltree::Node::attribute(self, name)
    }

    fn text(&self) -> Option<&str> {
        roxmltree::Node::text(self)
    }

    fn children(&self) -> Vec<Self> {
        roxmltree::Node::children(self)
            .filter(|child| child.is_element())
            .collect()
    }
}
