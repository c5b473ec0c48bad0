//! The CLI wrapper seam consumed by the explorer

use async_trait::async_trait;
use tekton_shared::{ResourceDescriptor, ResourceKind, ResourceList, Result, Scope, TektonError};

use crate::command;
use crate::executor::{CliExecutor, CliResult, StreamHandle};

/// Cluster access through the tkn CLI.
///
/// `execute` is awaited and structured; `execute_in_terminal` is fire-and-forget.
#[async_trait]
pub trait Tkn: Send + Sync {
    /// Run a command and capture its output. CLI failures are reported in the result, not as `Err`.
    async fn execute(&self, command: &str) -> CliResult;

    /// Run a command whose output goes to the terminal view
    fn execute_in_terminal(&self, command: &str) -> StreamHandle;

    /// List resources of `kind` within `scope`, in the order the cluster returns them
    async fn list(&self, kind: ResourceKind, scope: &Scope) -> Result<Vec<ResourceDescriptor>>;

    async fn get_pipelines(&self) -> Result<Vec<ResourceDescriptor>> {
        self.list(ResourceKind::Pipeline, &Scope::All).await
    }

    async fn get_pipeline_runs(&self, pipeline: &str) -> Result<Vec<ResourceDescriptor>> {
        self.list(
            ResourceKind::PipelineRun,
            &Scope::owned_by(ResourceKind::Pipeline, pipeline),
        )
        .await
    }

    async fn get_tasks(&self) -> Result<Vec<ResourceDescriptor>> {
        self.list(ResourceKind::Task, &Scope::All).await
    }

    async fn get_task_runs(&self, task: &str) -> Result<Vec<ResourceDescriptor>> {
        self.list(ResourceKind::TaskRun, &Scope::owned_by(ResourceKind::Task, task))
            .await
    }
}

/// `Tkn` backed by real processes
pub struct TknCli {
    executor: CliExecutor,
}

impl TknCli {
    pub fn new(executor: CliExecutor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl Tkn for TknCli {
    async fn execute(&self, command: &str) -> CliResult {
        self.executor.run_captured(command).await
    }

    fn execute_in_terminal(&self, command: &str) -> StreamHandle {
        self.executor.run_streaming(command)
    }

    async fn list(&self, kind: ResourceKind, scope: &Scope) -> Result<Vec<ResourceDescriptor>> {
        let command = command::list(kind, scope).ok_or_else(|| {
            TektonError::InvalidOperation(format!("No listing for {} in scope {}", kind, scope))
        })?;

        let result = self.executor.run_captured(&command).await;
        if let Some(error) = result.error {
            return Err(TektonError::Cli(error));
        }

        let descriptors = ResourceList::parse(&result.stdout)?.into_descriptors(kind);
        tracing::debug!(
            "Listed {} {} resource(s) in scope {}",
            descriptors.len(),
            kind,
            scope
        );
        Ok(descriptors)
    }
}
