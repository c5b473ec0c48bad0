//! Command templates: pure functions from an action and resource names to a literal CLI command

use shell_words::quote;
use tekton_shared::{ResourceKind, Scope};

/// Label the Tekton controller puts on TaskRuns created for a PipelineRun
const PIPELINE_RUN_LABEL: &str = "tekton.dev/pipelineRun";

/// Listing command for `kind` narrowed to `scope`, or `None` when the pair has no listing
pub fn list(kind: ResourceKind, scope: &Scope) -> Option<String> {
    match (kind, scope) {
        (ResourceKind::Pipeline, Scope::All) => Some(list_pipelines()),
        (ResourceKind::Trigger, Scope::All) => {
            Some("kubectl get triggers.triggers.tekton.dev -o json".to_string())
        }
        (kind, Scope::All) => kind
            .tkn_noun()
            .map(|noun| format!("tkn {} list -o json", noun)),
        (
            ResourceKind::PipelineRun,
            Scope::OwnedBy {
                kind: ResourceKind::Pipeline,
                name,
            },
        ) => Some(list_pipeline_runs(name)),
        (
            ResourceKind::TaskRun,
            Scope::OwnedBy {
                kind: ResourceKind::Task,
                name,
            },
        ) => Some(list_task_runs(name)),
        (
            ResourceKind::TaskRun,
            Scope::OwnedBy {
                kind: ResourceKind::PipelineRun,
                name,
            },
        ) => Some(list_task_runs_for_pipeline_run(name)),
        _ => None,
    }
}

pub fn list_pipelines() -> String {
    "tkn pipeline list -o json".to_string()
}

pub fn list_pipeline_runs(pipeline: &str) -> String {
    format!("tkn pipelinerun list {} -o json", quote(pipeline))
}

pub fn list_task_runs(task: &str) -> String {
    format!("tkn taskrun list {} -o json", quote(task))
}

pub fn list_task_runs_for_pipeline_run(pipeline_run: &str) -> String {
    let selector = format!("{}={}", PIPELINE_RUN_LABEL, pipeline_run);
    format!("tkn taskrun list --label {} -o json", quote(&selector))
}

pub fn describe_pipelines(name: &str) -> String {
    format!("tkn pipeline describe {}", quote(name))
}

/// Start a pipeline. An empty `run_name` leaves naming to tkn.
pub fn start_pipeline(name: &str, run_name: &str) -> String {
    if run_name.trim().is_empty() {
        format!("tkn pipeline start {}", quote(name))
    } else {
        format!(
            "tkn pipeline start {} --prefix-name {}",
            quote(name),
            quote(run_name.trim())
        )
    }
}

pub fn delete_pipeline(name: &str) -> String {
    format!("tkn pipeline delete {} -f", quote(name))
}

pub fn describe_pipeline_runs(name: &str) -> String {
    format!("tkn pipelinerun describe {}", quote(name))
}

pub fn show_pipeline_run_logs(name: &str) -> String {
    format!("tkn pipelinerun logs {}", quote(name))
}

pub fn cancel_pipeline_run(name: &str) -> String {
    format!("tkn pipelinerun cancel {}", quote(name))
}

pub fn delete_pipeline_run(name: &str) -> String {
    format!("tkn pipelinerun delete {} -f", quote(name))
}

pub fn describe_tasks(name: &str) -> String {
    format!("tkn task describe {}", quote(name))
}

pub fn delete_task(name: &str) -> String {
    format!("tkn task delete {} -f", quote(name))
}

pub fn describe_task_runs(name: &str) -> String {
    format!("tkn taskrun describe {}", quote(name))
}

pub fn show_task_run_logs(name: &str) -> String {
    format!("tkn taskrun logs {}", quote(name))
}

pub fn delete_task_run(name: &str) -> String {
    format!("tkn taskrun delete {} -f", quote(name))
}

pub fn describe_cluster_tasks(name: &str) -> String {
    format!("tkn clustertask describe {}", quote(name))
}
