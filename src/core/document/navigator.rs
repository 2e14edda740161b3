//! Namespace-aware navigation over a parsed XML document.
//!
//! Every other component reaches document nodes through [`Navigator`] and the
//! [`Element`] handle; neither exposes the underlying parser. Paths are
//! slash-separated qualified names (`tns:GorPart/tns:NilReturnStructure`)
//! whose prefixes are resolved through an explicit [`Namespaces`] value.

use crate::domain::{Result, RillError};
use std::collections::BTreeMap;

/// Namespace of the multi-return operational return schema
pub const MULTI_RETURN_NAMESPACE: &str =
    "http://www.environment-agency.gov.uk/XMLSchemas/GOR/SAPMultiReturn/06";

/// Prefix the import paths use for the multi-return namespace
pub const MULTI_RETURN_PREFIX: &str = "tns";

/// Prefix to namespace URI bindings used when resolving paths
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Namespaces {
    bindings: BTreeMap<String, String>,
}

impl Namespaces {
    /// Creates an empty set of bindings
    pub fn new() -> Self {
        Self::default()
    }

    /// Bindings for the multi-return schema, with `tns` bound to `uri`
    ///
    /// # Examples
    ///
    /// ```
    /// use rill::core::document::{Namespaces, MULTI_RETURN_NAMESPACE};
    ///
    /// let namespaces = Namespaces::multi_return(MULTI_RETURN_NAMESPACE);
    /// assert_eq!(namespaces.uri("tns"), Some(MULTI_RETURN_NAMESPACE));
    /// ```
    pub fn multi_return(uri: impl Into<String>) -> Self {
        Self::new().with_binding(MULTI_RETURN_PREFIX, uri)
    }

    /// Adds or replaces a binding
    pub fn with_binding(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.bindings.insert(prefix.into(), uri.into());
        self
    }

    /// Resolves a prefix to its URI
    pub fn uri(&self, prefix: &str) -> Option<&str> {
        self.bindings.get(prefix).map(String::as_str)
    }
}

/// A parsed XML document
pub struct XmlDocument<'input> {
    document: roxmltree::Document<'input>,
}

impl<'input> XmlDocument<'input> {
    /// Parses document text
    ///
    /// # Errors
    ///
    /// Returns [`RillError::Parse`] if the text is not well-formed XML.
    pub fn parse(text: &'input str) -> Result<Self> {
        let document = roxmltree::Document::parse(text)?;
        Ok(Self { document })
    }

    /// Returns the root element
    pub fn root(&self) -> Element<'_, 'input> {
        Element {
            node: self.document.root_element(),
        }
    }
}

/// Handle to an element node of an [`XmlDocument`]
#[derive(Debug, Clone, Copy)]
pub struct Element<'a, 'input> {
    node: roxmltree::Node<'a, 'input>,
}

impl<'a, 'input> Element<'a, 'input> {
    /// Tag name without namespace
    pub fn local_name(&self) -> &'a str {
        self.node.tag_name().name()
    }

    /// Namespace URI of the element, if any
    pub fn namespace(&self) -> Option<&'a str> {
        self.node.tag_name().namespace()
    }

    /// Trimmed text content, or an empty string if there is none
    ///
    /// Text split by comments or processing instructions is joined. Text of
    /// child elements is not included.
    pub fn text(&self) -> String {
        let text: String = self
            .node
            .children()
            .filter(|node| node.is_text())
            .filter_map(|node| node.text())
            .collect();
        text.trim().to_string()
    }

    /// Element children in document order
    pub fn children(&self) -> impl Iterator<Item = Element<'a, 'input>> {
        self.node
            .children()
            .filter(|child| child.is_element())
            .map(|node| Element { node })
    }

    /// Byte position of the element in the source text, for diagnostics
    pub fn position(&self) -> usize {
        self.node.range().start
    }
}

/// One `prefix:local` step of a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Step<'p> {
    prefix: Option<&'p str>,
    local: &'p str,
}

impl<'p> Step<'p> {
    fn parse(segment: &'p str) -> Self {
        match segment.split_once(':') {
            Some((prefix, local)) => Step {
                prefix: Some(prefix),
                local,
            },
            None => Step {
                prefix: None,
                local: segment,
            },
        }
    }
}

/// Resolves qualified paths against elements
///
/// # Examples
///
/// ```
/// use rill::core::document::{Navigator, Namespaces, XmlDocument};
///
/// let xml = r#"<t:a xmlns:t="urn:x"><t:b>1</t:b><t:b>2</t:b></t:a>"#;
/// let doc = XmlDocument::parse(xml).unwrap();
/// let namespaces = Namespaces::new().with_binding("t", "urn:x");
/// let nav = Navigator::new(&namespaces);
///
/// assert_eq!(nav.find(doc.root(), "t:b").len(), 2);
/// assert_eq!(nav.text(doc.root(), "t:b", "-"), "1");
/// assert_eq!(nav.text(doc.root(), "t:c", "-"), "-");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Navigator<'ns> {
    namespaces: &'ns Namespaces,
}

impl<'ns> Navigator<'ns> {
    /// Creates a navigator resolving prefixes through `namespaces`
    pub fn new(namespaces: &'ns Namespaces) -> Self {
        Self { namespaces }
    }

    /// Returns the bindings in use
    pub fn namespaces(&self) -> &'ns Namespaces {
        self.namespaces
    }

    /// First element matching `path` below `node`, in document order
    pub fn get<'a, 'input>(
        &self,
        node: Element<'a, 'input>,
        path: &str,
    ) -> Option<Element<'a, 'input>> {
        self.find(node, path).into_iter().next()
    }

    /// All elements matching `path` below `node`, in document order
    pub fn find<'a, 'input>(&self, node: Element<'a, 'input>, path: &str) -> Vec<Element<'a, 'input>> {
        let mut current = vec![node];
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            let step = Step::parse(segment);
            current = current
                .into_iter()
                .flat_map(|element| element.children())
                .filter(|child| self.matches(*child, step))
                .collect();
            if current.is_empty() {
                break;
            }
        }
        current
    }

    /// Trimmed text of the first element matching `path`, or `default`
    pub fn text(&self, node: Element<'_, '_>, path: &str, default: &str) -> String {
        self.text_opt(node, path)
            .unwrap_or_else(|| default.to_string())
    }

    /// Trimmed text of the first element matching `path`, if present
    pub fn text_opt(&self, node: Element<'_, '_>, path: &str) -> Option<String> {
        self.get(node, path).map(|element| element.text())
    }

    /// Whether `element` has the qualified name `name` (e.g. `tns:DailyTotal`)
    pub fn has_name(&self, element: Element<'_, '_>, name: &str) -> bool {
        self.matches(element, Step::parse(name))
    }

    /// Checks that `element` lives in the namespace bound to `prefix`
    ///
    /// # Errors
    ///
    /// Returns [`RillError::Parse`] if the prefix is unbound or the element
    /// belongs to another namespace.
    pub fn ensure_namespace(&self, element: Element<'_, '_>, prefix: &str) -> Result<()> {
        let uri = self.namespaces.uri(prefix).ok_or_else(|| {
            RillError::Parse(format!("No namespace bound to prefix '{prefix}'"))
        })?;

        if element.namespace() != Some(uri) {
            return Err(RillError::Parse(format!(
                "Element <{}> is not bound to namespace {uri} (found {})",
                element.local_name(),
                element.namespace().unwrap_or("no namespace")
            )));
        }
        Ok(())
    }

    fn matches(&self, element: Element<'_, '_>, step: Step<'_>) -> bool {
        if element.local_name() != step.local {
            return false;
        }
        match step.prefix {
            Some(prefix) => match self.namespaces.uri(prefix) {
                Some(uri) => element.namespace() == Some(uri),
                None => {
                    tracing::debug!(prefix = prefix, "Path uses an unbound namespace prefix");
                    false
                }
            },
            None => element.namespace().is_none(),
        }
    }
}
