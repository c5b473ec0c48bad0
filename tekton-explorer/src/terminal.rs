//! Terminal host: dialoguer prompts, a printing tree view and tree rendering

use async_trait::async_trait;
use dialoguer::{Input, Select};
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use tekton_cli::{OutputStream, TerminalLine};
use tekton_shared::Result;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::explorer::PipelineExplorer;
use crate::host::{Host, InputBoxOptions, QuickPickItem, QuickPickOptions, TreeView};
use crate::node::{NodeRef, TreeItem};

#[derive(Debug, Default)]
pub struct TerminalHost;

impl TerminalHost {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Host for TerminalHost {
    async fn show_quick_pick(
        &self,
        items: Vec<QuickPickItem>,
        options: QuickPickOptions,
    ) -> Option<QuickPickItem> {
        let labels: Vec<String> = items
            .iter()
            .map(|item| match &item.description {
                Some(description) => format!("{} ({})", item.label, description),
                None => item.label.clone(),
            })
            .collect();

        let selection = tokio::task::spawn_blocking(move || {
            Select::new()
                .with_prompt(options.place_holder)
                .items(&labels)
                .default(0)
                .interact_opt()
        })
        .await;

        match selection {
            Ok(Ok(Some(index))) => items.into_iter().nth(index),
            Ok(Ok(None)) => None,
            Ok(Err(e)) => {
                warn!("Selection prompt failed: {}", e);
                None
            }
            Err(e) => {
                warn!("Selection prompt task failed: {}", e);
                None
            }
        }
    }

    async fn show_input_box(&self, options: InputBoxOptions) -> Option<String> {
        let prompt = match options.place_holder {
            Some(hint) => format!("{} ({})", options.prompt, hint),
            None => options.prompt,
        };

        let answer = tokio::task::spawn_blocking(move || {
            Input::<String>::new()
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()
        })
        .await;

        match answer {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                warn!("Input prompt failed: {}", e);
                None
            }
            Err(e) => {
                warn!("Input prompt task failed: {}", e);
                None
            }
        }
    }

    fn show_error_message(&self, message: &str) {
        eprintln!("error: {}", message);
    }

    fn show_info_message(&self, message: &str) {
        println!("{}", message);
    }

    fn create_tree_view(&self, view_id: &str) -> Box<dyn TreeView> {
        Box::new(TerminalTreeView {
            view_id: view_id.to_string(),
        })
    }
}

/// Tree view that prints the path of revealed nodes
pub struct TerminalTreeView {
    view_id: String,
}

#[async_trait]
impl TreeView for TerminalTreeView {
    async fn reveal(&self, node: &NodeRef) -> Result<()> {
        println!("{}", node.path().join(" > "));
        Ok(())
    }

    fn dispose(&self) {
        debug!("Tree view {} disposed", self.view_id);
    }
}

/// Serializable copy of part of the tree
#[derive(Debug, Clone, Serialize)]
pub struct TreeSnapshot {
    #[serde(flatten)]
    pub item: TreeItem,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeSnapshot>,
}

/// The root categories plus `depth` expanded levels below them
pub async fn snapshot(explorer: &PipelineExplorer, depth: usize) -> Vec<TreeSnapshot> {
    snapshot_level(explorer, None, depth + 1).await
}

fn snapshot_level<'a>(
    explorer: &'a PipelineExplorer,
    node: Option<&'a NodeRef>,
    remaining: usize,
) -> Pin<Box<dyn Future<Output = Vec<TreeSnapshot>> + 'a>> {
    Box::pin(async move {
        if remaining == 0 {
            return Vec::new();
        }

        let mut level = Vec::new();
        for child in explorer.get_children(node).await {
            let item = explorer.get_tree_item(&child).tree_item();
            let children = if item.collapsible {
                snapshot_level(explorer, Some(&child), remaining - 1).await
            } else {
                Vec::new()
            };
            level.push(TreeSnapshot { item, children });
        }
        level
    })
}

/// Indented text rendering of a snapshot
pub fn render(snapshot: &[TreeSnapshot]) -> String {
    let mut out = String::new();
    render_into(snapshot, 0, &mut out);
    out
}

fn render_into(snapshot: &[TreeSnapshot], depth: usize, out: &mut String) {
    for node in snapshot {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&node.item.label);
        if let Some(description) = &node.item.description {
            out.push_str(&format!(" ({})", description));
        }
        out.push('\n');
        render_into(&node.children, depth + 1, out);
    }
}

/// Print streamed command output until every sender is gone
pub async fn print_terminal(mut lines: mpsc::UnboundedReceiver<TerminalLine>) {
    while let Some(line) = lines.recv().await {
        match line.stream {
            OutputStream::Stdout => println!("{}", line.text),
            OutputStream::Stderr => eprintln!("{}", line.text),
        }
    }
}
