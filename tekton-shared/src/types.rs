//! Shared types for the Tekton resource domain

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tekton resource kinds shown in the explorer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Pipeline,
    PipelineRun,
    Task,
    TaskRun,
    ClusterTask,
    Trigger,
    TriggerBinding,
    TriggerTemplate,
    PipelineResource,
    EventListener,
    Condition,
}

impl ResourceKind {
    /// Top-level categories, in the order the tree shows them.
    pub const ROOTS: [ResourceKind; 9] = [
        ResourceKind::Pipeline,
        ResourceKind::Task,
        ResourceKind::ClusterTask,
        ResourceKind::PipelineResource,
        ResourceKind::Condition,
        ResourceKind::TriggerTemplate,
        ResourceKind::TriggerBinding,
        ResourceKind::EventListener,
        ResourceKind::Trigger,
    ];

    /// Singular display name, e.g. `PipelineRun`
    pub fn display_name(&self) -> &'static str {
        match self {
            ResourceKind::Pipeline => "Pipeline",
            ResourceKind::PipelineRun => "PipelineRun",
            ResourceKind::Task => "Task",
            ResourceKind::TaskRun => "TaskRun",
            ResourceKind::ClusterTask => "ClusterTask",
            ResourceKind::Trigger => "Trigger",
            ResourceKind::TriggerBinding => "TriggerBinding",
            ResourceKind::TriggerTemplate => "TriggerTemplate",
            ResourceKind::PipelineResource => "PipelineResource",
            ResourceKind::EventListener => "EventListener",
            ResourceKind::Condition => "Condition",
        }
    }

    /// Label of the category node grouping resources of this kind
    pub fn category_label(&self) -> String {
        format!("{}s", self.display_name())
    }

    /// The noun `tkn` uses for this kind. `Trigger` has no tkn subcommand.
    pub fn tkn_noun(&self) -> Option<&'static str> {
        match self {
            ResourceKind::Pipeline => Some("pipeline"),
            ResourceKind::PipelineRun => Some("pipelinerun"),
            ResourceKind::Task => Some("task"),
            ResourceKind::TaskRun => Some("taskrun"),
            ResourceKind::ClusterTask => Some("clustertask"),
            ResourceKind::TriggerBinding => Some("triggerbinding"),
            ResourceKind::TriggerTemplate => Some("triggertemplate"),
            ResourceKind::PipelineResource => Some("resource"),
            ResourceKind::EventListener => Some("eventlistener"),
            ResourceKind::Condition => Some("condition"),
            ResourceKind::Trigger => None,
        }
    }

    /// Tag used by hosts to decide which commands apply to a node
    pub fn context_value(&self) -> &'static str {
        match self {
            ResourceKind::Pipeline => "pipeline",
            ResourceKind::PipelineRun => "pipelinerun",
            ResourceKind::Task => "task",
            ResourceKind::TaskRun => "taskrun",
            ResourceKind::ClusterTask => "clustertask",
            ResourceKind::Trigger => "trigger",
            ResourceKind::TriggerBinding => "triggerbinding",
            ResourceKind::TriggerTemplate => "triggertemplate",
            ResourceKind::PipelineResource => "pipelineresource",
            ResourceKind::EventListener => "eventlistener",
            ResourceKind::Condition => "condition",
        }
    }

    /// Kind of the resources listed beneath a resource of this kind, if any
    pub fn child_kind(&self) -> Option<ResourceKind> {
        match self {
            ResourceKind::Pipeline => Some(ResourceKind::PipelineRun),
            ResourceKind::PipelineRun => Some(ResourceKind::TaskRun),
            ResourceKind::Task => Some(ResourceKind::TaskRun),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Narrows a listing to the resources owned by one parent
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    All,
    OwnedBy { kind: ResourceKind, name: String },
}

impl Scope {
    pub fn owned_by(kind: ResourceKind, name: impl Into<String>) -> Self {
        Scope::OwnedBy {
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::All => f.write_str("all"),
            Scope::OwnedBy { kind, name } => write!(f, "{}/{}", kind.context_value(), name),
        }
    }
}

/// A resolved cluster resource as returned by a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub kind: ResourceKind,
    pub name: String,
    pub namespace: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    /// Reason of the first status condition, e.g. `Succeeded` or `Running`
    pub status: Option<String>,
}

impl ResourceDescriptor {
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            namespace: None,
            created_at: None,
            status: None,
        }
    }
}

/// Kubernetes list envelope printed by `tkn ... -o json` and `kubectl get ... -o json`
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceList {
    #[serde(default)]
    pub items: Vec<ResourceItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceItem {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub status: Option<ResourceStatus>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,
    pub namespace: Option<String>,
    pub creation_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceStatus {
    #[serde(default)]
    pub conditions: Vec<StatusCondition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusCondition {
    pub reason: Option<String>,
}

impl ResourceList {
    /// Parse listing output. tkn answers `No <kind>s found` in plain text when a list is empty.
    pub fn parse(output: &str) -> crate::Result<Self> {
        let trimmed = output.trim();
        if trimmed.is_empty() || trimmed.starts_with("No ") {
            return Ok(Self { items: Vec::new() });
        }
        Ok(serde_json::from_str(trimmed)?)
    }

    /// Convert into descriptors, keeping the order the cluster returned
    pub fn into_descriptors(self, kind: ResourceKind) -> Vec<ResourceDescriptor> {
        self.items
            .into_iter()
            .map(|item| ResourceDescriptor {
                kind,
                name: item.metadata.name,
                namespace: item.metadata.namespace,
                created_at: item.metadata.creation_timestamp,
                status: item
                    .status
                    .and_then(|s| s.conditions.into_iter().find_map(|c| c.reason)),
            })
            .collect()
    }
}
