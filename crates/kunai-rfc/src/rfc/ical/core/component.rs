//! Component tree (RFC 5545 §3.4, §3.6).

use super::content_line::ContentLine;

/// A `BEGIN:`/`END:` block.
///
/// The name is kept as authored; comparisons are case-insensitive. `begin`
/// and `end` hold the raw wrapper lines so they survive projection unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub name: String,
    pub begin: String,
    pub end: String,
    pub nodes: Vec<Node>,
}

/// A child of a component, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Property(ContentLine),
    Component(Component),
}

impl Component {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            begin: format!("BEGIN:{name}"),
            end: format!("END:{name}"),
            name,
            nodes: Vec::new(),
        }
    }

    /// Copy of this component with no children, wrapper lines intact.
    #[must_use]
    pub fn empty_like(&self) -> Self {
        Self {
            name: self.name.clone(),
            begin: self.begin.clone(),
            end: self.end.clone(),
            nodes: Vec::new(),
        }
    }

    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn properties(&self) -> impl Iterator<Item = &ContentLine> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Property(line) => Some(line),
            Node::Component(_) => None,
        })
    }

    pub fn properties_named<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a ContentLine> + use<'a, 'n> {
        self.properties().filter(move |line| line.is(name))
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&ContentLine> {
        self.properties().find(|line| line.is(name))
    }

    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Component(comp) => Some(comp),
            Node::Property(_) => None,
        })
    }

    pub fn components_named<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a Component> + use<'a, 'n> {
        self.components().filter(move |comp| comp.is(name))
    }

    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        self.property("UID").map(|line| line.value.trim())
    }

    pub fn push_property(&mut self, line: ContentLine) {
        self.nodes.push(Node::Property(line));
    }

    pub fn push_component(&mut self, component: Component) {
        self.nodes.push(Node::Component(component));
    }

    /// Appends the raw text of this component, each line terminated by CRLF.
    pub fn write_to(&self, out: &mut String) {
        out.push_str(&self.begin);
        out.push_str("\r\n");
        for node in &self.nodes {
            match node {
                Node::Property(line) => {
                    out.push_str(&line.raw);
                    out.push_str("\r\n");
                }
                Node::Component(child) => child.write_to(out),
            }
        }
        out.push_str(&self.end);
        out.push_str("\r\n");
    }

    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }
}
