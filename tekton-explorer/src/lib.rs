//! Tekton Pipeline Explorer
//!
//! Browses Tekton resources of the current cluster as a lazily expanded tree and resolves
//! user actions (describe, logs, start, cancel, delete) into `tkn` invocations.

pub mod cache;
pub mod commands;
pub mod context;
pub mod explorer;
pub mod host;
pub mod node;
pub mod notifier;
pub mod resolver;
pub mod terminal;

pub use cache::{CacheStats, ResourceCache};
pub use context::AppContext;
pub use explorer::{PipelineExplorer, TreeChange, VIEW_ID};
pub use host::{Host, InputBoxOptions, QuickPickItem, QuickPickOptions, TreeView};
pub use node::{NodeKind, NodeRef, ResourceNode, TreeItem};
pub use notifier::{ChangeNotifier, FileChanged};
pub use resolver::{Action, CommandResolver, ExecutionMode, Outcome};
