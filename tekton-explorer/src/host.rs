//! Host UI surface consumed by the explorer and the command resolver

use async_trait::async_trait;
use tekton_shared::Result;

use crate::node::NodeRef;

/// One entry of a selection prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickPickItem {
    pub label: String,
    pub description: Option<String>,
}

impl QuickPickItem {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuickPickOptions {
    pub place_holder: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBoxOptions {
    pub prompt: String,
    pub place_holder: Option<String>,
}

/// Prompts and notifications. `None` from a prompt means the user dismissed it.
#[async_trait]
pub trait Host: Send + Sync {
    async fn show_quick_pick(
        &self,
        items: Vec<QuickPickItem>,
        options: QuickPickOptions,
    ) -> Option<QuickPickItem>;

    async fn show_input_box(&self, options: InputBoxOptions) -> Option<String>;

    fn show_error_message(&self, message: &str);

    fn show_info_message(&self, message: &str);

    /// Register the tree widget the explorer drives
    fn create_tree_view(&self, view_id: &str) -> Box<dyn TreeView>;
}

/// The tree widget registered with the host
#[async_trait]
pub trait TreeView: Send + Sync {
    /// Scroll `node` into view, expanding its ancestors
    async fn reveal(&self, node: &NodeRef) -> Result<()>;

    fn dispose(&self);
}
