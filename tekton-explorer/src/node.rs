//! Tree node model for Tekton resources
//!
//! A node is a closed variant: a category grouping one resource kind, a single resource,
//! or an error placeholder shown where a child fetch failed. Nodes hold a weak reference
//! to their parent and never own their children; children are fetched on demand.
//! Each node also carries a copy of its ancestors' kinds and labels, so its identity
//! survives the ancestors being dropped.

use serde::Serialize;
use std::sync::{Arc, Weak};
use tekton_shared::{ResourceDescriptor, ResourceKind, Result, Scope};

use crate::cache::ResourceCache;

pub type NodeRef = Arc<ResourceNode>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Category(ResourceKind),
    Resource(ResourceKind),
    ErrorPlaceholder,
}

/// How a host should draw a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeItem {
    pub label: String,
    pub context_value: String,
    pub collapsible: bool,
    pub description: Option<String>,
}

#[derive(Debug)]
pub struct ResourceNode {
    kind: NodeKind,
    name: String,
    parent: Option<Weak<ResourceNode>>,
    /// Kinds and labels of the ancestors, root first
    lineage: Vec<(NodeKind, String)>,
    generation: u64,
    descriptor: Option<ResourceDescriptor>,
}

impl ResourceNode {
    pub fn category(kind: ResourceKind, generation: u64) -> NodeRef {
        Arc::new(Self {
            kind: NodeKind::Category(kind),
            name: kind.category_label(),
            parent: None,
            lineage: Vec::new(),
            generation,
            descriptor: None,
        })
    }

    pub fn resource(
        descriptor: ResourceDescriptor,
        parent: Option<&NodeRef>,
        generation: u64,
    ) -> NodeRef {
        Arc::new(Self {
            kind: NodeKind::Resource(descriptor.kind),
            name: descriptor.name.clone(),
            parent: parent.map(Arc::downgrade),
            lineage: parent.map(|p| p.child_lineage()).unwrap_or_default(),
            generation,
            descriptor: Some(descriptor),
        })
    }

    /// A bare resource node, as built from a name the user typed
    pub fn named(kind: ResourceKind, name: impl Into<String>, parent: Option<&NodeRef>) -> NodeRef {
        let generation = parent.map(|p| p.generation).unwrap_or_default();
        Self::resource(ResourceDescriptor::new(kind, name), parent, generation)
    }

    pub fn error_placeholder(message: impl Into<String>, parent: &NodeRef) -> NodeRef {
        Arc::new(Self {
            kind: NodeKind::ErrorPlaceholder,
            name: message.into(),
            parent: Some(Arc::downgrade(parent)),
            lineage: parent.child_lineage(),
            generation: parent.generation,
            descriptor: None,
        })
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Resource kind of a resource node
    pub fn resource_kind(&self) -> Option<ResourceKind> {
        match self.kind {
            NodeKind::Resource(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// The owning node, if it is still alive
    pub fn get_parent(&self) -> Option<NodeRef> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn descriptor(&self) -> Option<&ResourceDescriptor> {
        self.descriptor.as_ref()
    }

    pub fn context_value(&self) -> String {
        match self.kind {
            NodeKind::Category(kind) => format!("{}s", kind.context_value()),
            NodeKind::Resource(kind) => kind.context_value().to_string(),
            NodeKind::ErrorPlaceholder => "error".to_string(),
        }
    }

    /// Ancestor kinds and labels, root first. Available even after the ancestors are gone.
    pub fn lineage(&self) -> &[(NodeKind, String)] {
        &self.lineage
    }

    fn child_lineage(&self) -> Vec<(NodeKind, String)> {
        let mut lineage = self.lineage.clone();
        lineage.push((self.kind, self.name.clone()));
        lineage
    }

    /// Labels from the root down to this node
    pub fn path(&self) -> Vec<String> {
        self.lineage
            .iter()
            .map(|(_, label)| label.clone())
            .chain(std::iter::once(self.name.clone()))
            .collect()
    }

    /// The listing this node's children come from, or `None` for leaves
    fn child_query(&self) -> Option<(ResourceKind, Scope)> {
        match self.kind {
            NodeKind::Category(kind) => Some((kind, Scope::All)),
            NodeKind::Resource(kind) => kind
                .child_kind()
                .map(|child| (child, Scope::owned_by(kind, self.name.clone()))),
            NodeKind::ErrorPlaceholder => None,
        }
    }

    pub fn tree_item(&self) -> TreeItem {
        TreeItem {
            label: self.name.clone(),
            context_value: self.context_value(),
            collapsible: self.child_query().is_some(),
            description: self.descriptor.as_ref().and_then(|d| d.status.clone()),
        }
    }

    /// Fetch this node's children through the cache. Leaves yield an empty list.
    pub async fn get_children(self: &Arc<Self>, cache: &ResourceCache) -> Result<Vec<NodeRef>> {
        let Some((kind, scope)) = self.child_query() else {
            return Ok(Vec::new());
        };

        let descriptors = cache.get(kind, &scope).await?;
        Ok(descriptors
            .into_iter()
            .map(|descriptor| Self::resource(descriptor, Some(self), self.generation))
            .collect())
    }
}
