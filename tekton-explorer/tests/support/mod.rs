//! Scripted collaborators for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tekton_cli::{CliResult, StreamHandle, Tkn};
use tekton_explorer::host::{Host, InputBoxOptions, QuickPickItem, QuickPickOptions, TreeView};
use tekton_explorer::notifier::ChangeNotifier;
use tekton_explorer::{AppContext, NodeRef};
use tekton_shared::{ExplorerConfig, ResourceDescriptor, ResourceKind, Result, Scope, TektonError};

/// Serves canned listings and records every command it is asked to run
#[derive(Default)]
pub struct ScriptedTkn {
    listings: Mutex<HashMap<(ResourceKind, Scope), Vec<ResourceDescriptor>>>,
    failing: Mutex<HashSet<ResourceKind>>,
    result: Mutex<Option<CliResult>>,
    pub list_calls: Mutex<Vec<(ResourceKind, Scope)>>,
    pub executed: Mutex<Vec<String>>,
    pub terminal: Mutex<Vec<String>>,
}

impl ScriptedTkn {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_listing(&self, kind: ResourceKind, scope: Scope, names: &[&str]) {
        let descriptors = names
            .iter()
            .map(|name| ResourceDescriptor::new(kind, *name))
            .collect();
        self.listings.lock().insert((kind, scope), descriptors);
    }

    pub fn fail_listing(&self, kind: ResourceKind) {
        self.failing.lock().insert(kind);
    }

    /// Result returned by captured commands; success with empty output otherwise
    pub fn set_result(&self, result: CliResult) {
        *self.result.lock() = Some(result);
    }

    pub fn list_count(&self) -> usize {
        self.list_calls.lock().len()
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().clone()
    }

    pub fn terminal(&self) -> Vec<String> {
        self.terminal.lock().clone()
    }
}

#[async_trait]
impl Tkn for ScriptedTkn {
    async fn execute(&self, command: &str) -> CliResult {
        self.executed.lock().push(command.to_string());
        self.result.lock().clone().unwrap_or_default()
    }

    fn execute_in_terminal(&self, command: &str) -> StreamHandle {
        self.terminal.lock().push(command.to_string());
        StreamHandle::completed(command)
    }

    async fn list(&self, kind: ResourceKind, scope: &Scope) -> Result<Vec<ResourceDescriptor>> {
        self.list_calls.lock().push((kind, scope.clone()));
        if self.failing.lock().contains(&kind) {
            return Err(TektonError::Cli("cluster unreachable".to_string()));
        }
        Ok(self
            .listings
            .lock()
            .get(&(kind, scope.clone()))
            .cloned()
            .unwrap_or_default())
    }
}

/// A quick-pick prompt as the user saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShownPick {
    pub place_holder: String,
    pub labels: Vec<String>,
}

/// Answers prompts from queues. An empty queue or a `None` answer dismisses the prompt.
#[derive(Default)]
pub struct ScriptedHost {
    picks: Mutex<VecDeque<Option<String>>>,
    inputs: Mutex<VecDeque<Option<String>>>,
    pub shown_picks: Mutex<Vec<ShownPick>>,
    pub shown_inputs: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
    pub infos: Mutex<Vec<String>>,
    pub view: Arc<RecordingTreeView>,
}

impl ScriptedHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn answer_pick(&self, label: Option<&str>) {
        self.picks.lock().push_back(label.map(str::to_string));
    }

    pub fn answer_input(&self, value: Option<&str>) {
        self.inputs.lock().push_back(value.map(str::to_string));
    }

    pub fn shown_picks(&self) -> Vec<ShownPick> {
        self.shown_picks.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }
}

#[async_trait]
impl Host for ScriptedHost {
    async fn show_quick_pick(
        &self,
        items: Vec<QuickPickItem>,
        options: QuickPickOptions,
    ) -> Option<QuickPickItem> {
        self.shown_picks.lock().push(ShownPick {
            place_holder: options.place_holder,
            labels: items.iter().map(|i| i.label.clone()).collect(),
        });

        let answer = self.picks.lock().pop_front().flatten()?;
        items.into_iter().find(|item| item.label == answer)
    }

    async fn show_input_box(&self, options: InputBoxOptions) -> Option<String> {
        self.shown_inputs.lock().push(options.prompt);
        self.inputs.lock().pop_front().flatten()
    }

    fn show_error_message(&self, message: &str) {
        self.errors.lock().push(message.to_string());
    }

    fn show_info_message(&self, message: &str) {
        self.infos.lock().push(message.to_string());
    }

    fn create_tree_view(&self, _view_id: &str) -> Box<dyn TreeView> {
        Box::new(SharedView(self.view.clone()))
    }
}

/// Records every reveal as (label path, node generation)
#[derive(Default)]
pub struct RecordingTreeView {
    pub revealed: Mutex<Vec<(Vec<String>, u64)>>,
    pub disposed: AtomicBool,
}

impl RecordingTreeView {
    pub fn revealed(&self) -> Vec<(Vec<String>, u64)> {
        self.revealed.lock().clone()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

struct SharedView(Arc<RecordingTreeView>);

#[async_trait]
impl TreeView for SharedView {
    async fn reveal(&self, node: &NodeRef) -> Result<()> {
        self.0
            .revealed
            .lock()
            .push((node.path(), node.generation()));
        Ok(())
    }

    fn dispose(&self) {
        self.0.disposed.store(true, Ordering::SeqCst);
    }
}

pub fn context(tkn: &Arc<ScriptedTkn>, host: &Arc<ScriptedHost>) -> AppContext {
    AppContext::new(
        tkn.clone(),
        host.clone(),
        &ExplorerConfig::default(),
        None,
    )
}

pub fn context_with_notifier(
    tkn: &Arc<ScriptedTkn>,
    host: &Arc<ScriptedHost>,
    notifier: ChangeNotifier,
) -> AppContext {
    AppContext::new(
        tkn.clone(),
        host.clone(),
        &ExplorerConfig::default(),
        Some(notifier),
    )
}

pub fn pipeline_runs_of(pipeline: &str) -> Scope {
    Scope::owned_by(ResourceKind::Pipeline, pipeline)
}

/// Labels of a list of nodes
pub fn labels(nodes: &[NodeRef]) -> Vec<String> {
    nodes.iter().map(|n| n.get_name().to_string()).collect()
}
