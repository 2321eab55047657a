use super::*;
use crate::selector::{Combinator, Compound, SelectorChain, parse_selector_list};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct NodeId(pub(crate) usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    pub(crate) attrs: HashMap<String, String>,
}

/// Arena-backed document tree. Detached nodes keep their slot.
#[derive(Debug, Clone)]
pub(crate) struct Dom {
    nodes: Vec<Node>,
    pub(crate) root: NodeId,
}

impl Dom {
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
            root: NodeId(0),
        }
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            kind,
        });
        if let Some(slot) = self.nodes.get_mut(parent.0) {
            slot.children.push(id);
        }
        id
    }

    pub(crate) fn create_element(
        &mut self,
        parent: NodeId,
        tag_name: String,
        attrs: HashMap<String, String>,
    ) -> NodeId {
        self.push(parent, NodeKind::Element(Element { tag_name, attrs }))
    }

    pub(crate) fn create_text(&mut self, parent: NodeId, text: String) -> NodeId {
        self.push(parent, NodeKind::Text(text))
    }

    /// Every element ever created, connected or not, in creation order.
    pub(crate) fn all_elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| matches!(node.kind, NodeKind::Element(_)))
            .map(|(idx, _)| NodeId(idx))
    }

    pub(crate) fn element(&self, node: NodeId) -> Option<&Element> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(node.0)?.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|slot| slot.children.as_slice())
            .unwrap_or_default()
    }

    pub(crate) fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|element| element.tag_name.as_str())
    }

    pub(crate) fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    /// `node` followed by its ancestors up to the detached top or the document.
    pub(crate) fn ancestors_inclusive(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(node), |current| self.parent(*current))
    }

    pub(crate) fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?.attrs.get(name).map(String::as_str)
    }

    pub(crate) fn has_attr(&self, node: NodeId, name: &str) -> bool {
        self.attr(node, name).is_some()
    }

    pub(crate) fn set_attr(&mut self, node: NodeId, name: &str, value: &str) -> bool {
        match self.element_mut(node) {
            Some(element) => {
                element
                    .attrs
                    .insert(name.to_ascii_lowercase(), value.to_string());
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove_attr(&mut self, node: NodeId, name: &str) -> bool {
        self.element_mut(node)
            .and_then(|element| element.attrs.remove(name))
            .is_some()
    }

    pub(crate) fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        self.children(node)
            .iter()
            .copied()
            .filter(|child| self.element(*child).is_some())
            .collect()
    }

    pub(crate) fn is_connected(&self, node: NodeId) -> bool {
        self.ancestors_inclusive(node).any(|current| current == self.root)
    }

    pub(crate) fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.parent(node) else {
            return;
        };
        if let Some(slot) = self.nodes.get_mut(parent.0) {
            slot.children.retain(|child| *child != node);
        }
        if let Some(slot) = self.nodes.get_mut(node.0) {
            slot.parent = None;
        }
    }

    pub(crate) fn closest_with_attr(&self, node: NodeId, name: &str) -> Option<NodeId> {
        self.ancestors_inclusive(node)
            .find(|current| self.has_attr(*current, name))
    }

    pub(crate) fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        match self.nodes.get(node.0).map(|slot| &slot.kind) {
            Some(NodeKind::Text(text)) => out.push_str(text),
            Some(_) => {
                for child in self.children(node) {
                    self.collect_text(*child, out);
                }
            }
            None => {}
        }
    }

    /// Replaces all children of an element with a single text node.
    pub(crate) fn set_text_content(&mut self, node: NodeId, value: &str) {
        if self.element(node).is_none() {
            return;
        }
        for child in self.children(node).to_vec() {
            self.detach(child);
        }
        if !value.is_empty() {
            self.create_text(node, value.to_string());
        }
    }

    pub(crate) fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        self.query_selector_all_from(self.root, selector)
    }

    pub(crate) fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    /// Descendants of `scope` matching `selector`, in document order.
    pub(crate) fn query_selector_all_from(
        &self,
        scope: NodeId,
        selector: &str,
    ) -> Result<Vec<NodeId>> {
        let chains = parse_selector_list(selector)?;
        let mut matched = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            if self.element(node).is_some()
                && chains.iter().any(|chain| self.matches_chain(node, chain))
            {
                matched.push(node);
            }
            stack.extend(self.children(node).iter().rev().copied());
        }
        Ok(matched)
    }

    fn matches_compound(&self, node: NodeId, compound: &Compound) -> bool {
        let Some(element) = self.element(node) else {
            return false;
        };
        let class_list = element.attrs.get("class").map(String::as_str).unwrap_or("");

        compound
            .tag
            .as_ref()
            .is_none_or(|tag| element.tag_name.eq_ignore_ascii_case(tag))
            && compound
                .id
                .as_ref()
                .is_none_or(|id| element.attrs.get("id") == Some(id))
            && compound
                .classes
                .iter()
                .all(|class| class_list.split_whitespace().any(|have| have == class))
            && compound
                .filters
                .iter()
                .all(|filter| filter.accepts(&element.attrs))
    }

    fn matches_chain(&self, node: NodeId, chain: &SelectorChain) -> bool {
        self.matches_compound(node, &chain.subject) && self.matches_ancestors(node, &chain.ancestors)
    }

    fn matches_ancestors(&self, node: NodeId, rest: &[(Combinator, Compound)]) -> bool {
        let Some(((combinator, compound), remaining)) = rest.split_first() else {
            return true;
        };
        let mut candidates = std::iter::successors(self.parent(node), |current| {
            self.parent(*current)
        });
        match combinator {
            Combinator::Child => candidates.next().is_some_and(|parent| {
                self.matches_compound(parent, compound) && self.matches_ancestors(parent, remaining)
            }),
            Combinator::Descendant => candidates.any(|ancestor| {
                self.matches_compound(ancestor, compound)
                    && self.matches_ancestors(ancestor, remaining)
            }),
        }
    }

    /// Serializes `node` back to markup with attributes in sorted order.
    pub(crate) fn dump_node(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_markup(node, &mut out);
        out
    }

    fn write_markup(&self, node: NodeId, out: &mut String) {
        let Some(slot) = self.nodes.get(node.0) else {
            return;
        };
        match &slot.kind {
            NodeKind::Text(text) => out.push_str(&escape_text(text)),
            NodeKind::Document => {
                for child in &slot.children {
                    self.write_markup(*child, out);
                }
            }
            NodeKind::Element(element) => {
                let sorted: BTreeMap<_, _> = element.attrs.iter().collect();
                out.push('<');
                out.push_str(&element.tag_name);
                for (name, value) in sorted {
                    out.push_str(&format!(
                        " {name}=\"{}\"",
                        escape_text(value).replace('"', "&quot;")
                    ));
                }
                out.push('>');
                if crate::html::is_void_tag(&element.tag_name) {
                    return;
                }
                for child in &slot.children {
                    self.write_markup(*child, out);
                }
                out.push_str(&format!("</{}>", element.tag_name));
            }
        }
    }
}

fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}
