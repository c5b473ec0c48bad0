//! Tree explorer: supplies the tree widget with nodes and owns the refresh protocol

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tekton_shared::{ResourceKind, Result, TektonError};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::ResourceCache;
use crate::host::{Host, TreeView};
use crate::node::{NodeRef, ResourceNode};
use crate::notifier::ChangeNotifier;

pub const VIEW_ID: &str = "tektonPipelineExplorer";

const CHANGE_CAPACITY: usize = 64;

/// Change notification fired by `refresh`; `target: None` means the whole tree
#[derive(Debug, Clone)]
pub struct TreeChange {
    pub target: Option<NodeRef>,
}

pub struct PipelineExplorer {
    cache: Arc<ResourceCache>,
    tree_view: Mutex<Option<Arc<dyn TreeView>>>,
    notifier: Mutex<Option<ChangeNotifier>>,
    watch_task: Mutex<Option<JoinHandle<()>>>,
    changes: broadcast::Sender<TreeChange>,
    generation: AtomicU64,
    /// Nodes handed out during the current generation, keyed by label path.
    /// Children only hold weak parent links, so this keeps ancestors alive.
    nodes: Mutex<HashMap<Vec<String>, NodeRef>>,
}

impl PipelineExplorer {
    /// Build the explorer, register its tree widget and subscribe to context file changes.
    ///
    /// Must be called from within a tokio runtime when a notifier is given.
    pub fn start(
        cache: Arc<ResourceCache>,
        notifier: Option<ChangeNotifier>,
        host: &dyn Host,
    ) -> Arc<Self> {
        let tree_view: Arc<dyn TreeView> = Arc::from(host.create_tree_view(VIEW_ID));
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);

        let explorer = Arc::new(Self {
            cache,
            tree_view: Mutex::new(Some(tree_view)),
            notifier: Mutex::new(None),
            watch_task: Mutex::new(None),
            changes,
            generation: AtomicU64::new(0),
            nodes: Mutex::new(HashMap::new()),
        });

        if let Some(notifier) = notifier {
            explorer.attach(notifier);
        }

        explorer
    }

    /// Every context file change triggers a full refresh
    fn attach(self: &Arc<Self>, notifier: ChangeNotifier) {
        let mut rx = notifier.subscribe();
        let explorer = Arc::downgrade(self);

        let task = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(_) | Err(RecvError::Lagged(_)) => match explorer.upgrade() {
                        Some(explorer) => {
                            info!("Cluster context changed, refreshing");
                            explorer.refresh(None);
                        }
                        None => break,
                    },
                    Err(RecvError::Closed) => break,
                }
            }
        });

        *self.watch_task.lock() = Some(task);
        *self.notifier.lock() = Some(notifier);
    }

    /// Nodes describe themselves
    pub fn get_tree_item(&self, node: &NodeRef) -> NodeRef {
        node.clone()
    }

    /// Children of `node`, or the root categories when `node` is `None`.
    /// The root categories are a fixed list built without the cache or the cluster.
    ///
    /// A failed fetch yields a single error placeholder instead of an error.
    pub async fn get_children(&self, node: Option<&NodeRef>) -> Vec<NodeRef> {
        let generation = self.generation.load(Ordering::SeqCst);

        let children = match node {
            None => ResourceKind::ROOTS
                .iter()
                .map(|kind| ResourceNode::category(*kind, generation))
                .collect(),
            Some(parent) => match parent.get_children(&self.cache).await {
                Ok(children) => children,
                Err(e) => {
                    warn!("Failed to load children of {}: {}", parent.get_name(), e);
                    vec![ResourceNode::error_placeholder(e.to_string(), parent)]
                }
            },
        };

        self.retain(&children);
        children
    }

    pub fn get_parent(&self, node: &NodeRef) -> Option<NodeRef> {
        node.get_parent()
    }

    fn retain(&self, children: &[NodeRef]) {
        let current = self.generation.load(Ordering::SeqCst);
        let mut nodes = self.nodes.lock();
        for child in children.iter().filter(|c| c.generation() == current) {
            nodes.insert(child.path(), child.clone());
        }
    }

    /// Ask the widget to re-query `target`, or everything when `target` is `None`.
    ///
    /// A global refresh also drops the resource cache and starts a new node generation.
    /// Fetches already in flight may still deliver old data; the next refresh corrects it.
    pub fn refresh(&self, target: Option<&NodeRef>) {
        if target.is_none() {
            self.cache.invalidate_all();
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            self.nodes.lock().clear();
            debug!("Explorer refreshed, generation {}", generation);
        }

        // Nobody listening is not an error.
        let _ = self.changes.send(TreeChange {
            target: target.cloned(),
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TreeChange> {
        self.changes.subscribe()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Whether `node` belongs to the current generation
    pub fn is_current(&self, node: &NodeRef) -> bool {
        node.generation() == self.generation()
    }

    /// Find the current node with the given label path, walking down from the roots
    pub async fn resolve_path(&self, path: &[String]) -> Option<NodeRef> {
        let mut level = self.get_children(None).await;
        let mut found = None;

        for (depth, label) in path.iter().enumerate() {
            let next = level.into_iter().find(|n| n.get_name() == label)?;
            level = if depth + 1 < path.len() {
                self.get_children(Some(&next)).await
            } else {
                Vec::new()
            };
            found = Some(next);
        }

        found
    }

    /// Refresh the node's parent, then scroll the node into view.
    ///
    /// A node from an older generation is first re-resolved from the roots.
    pub async fn reveal(&self, node: &NodeRef) -> Result<()> {
        let node = if self.is_current(node) {
            node.clone()
        } else {
            let path = node.path();
            debug!("Re-resolving stale node {}", path.join("/"));
            self.resolve_path(&path)
                .await
                .ok_or_else(|| TektonError::ResourceNotFound(path.join("/")))?
        };

        self.refresh(node.get_parent().as_ref());

        let tree_view = self.tree_view.lock().clone();
        match tree_view {
            Some(view) => view.reveal(&node).await,
            None => Err(TektonError::InvalidOperation(
                "Explorer has been disposed".to_string(),
            )),
        }
    }

    /// Close the context file watch and release the tree widget
    pub fn dispose(&self) {
        if let Some(notifier) = self.notifier.lock().take() {
            notifier.close();
        }
        if let Some(task) = self.watch_task.lock().take() {
            task.abort();
        }
        if let Some(view) = self.tree_view.lock().take() {
            view.dispose();
        }
        self.nodes.lock().clear();
        info!("Explorer disposed");
    }
}
