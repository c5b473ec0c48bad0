//! Command resolver: turns a user action with an optional context resource into one CLI command
//!
//! Without context the resolver walks the hierarchy top-down (`NeedPipeline` then
//! `NeedPipelineRun`, or whatever levels the action declares), prompting at each level.
//! Dismissing any prompt aborts the whole chain with no command run. Once every level is
//! known the command is built from the action's template and run in the action's mode.

use std::collections::HashMap;
use tekton_cli::{command, CliResult, StreamHandle};
use tekton_shared::{ResourceKind, Result, Scope, TektonError};
use tracing::{debug, info};

use crate::context::AppContext;
use crate::host::{InputBoxOptions, QuickPickItem, QuickPickOptions};
use crate::node::{NodeKind, NodeRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    StartPipeline,
    DescribePipeline,
    DeletePipeline,
    DescribePipelineRun,
    ShowPipelineRunLogs,
    CancelPipelineRun,
    DeletePipelineRun,
    DescribeTask,
    DeleteTask,
    DescribeTaskRun,
    ShowTaskRunLogs,
    DeleteTaskRun,
    DescribeClusterTask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Streamed into the terminal view, not awaited
    Terminal,
    /// Awaited, with structured output
    Captured,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Pick one resource of `kind`, scoped to the previous pick
    Pick {
        kind: ResourceKind,
        place_holder: &'static str,
    },
    /// Free-text value
    Input {
        prompt: &'static str,
        place_holder: &'static str,
    },
}

pub struct ActionSpec {
    pub action: Action,
    pub steps: &'static [Step],
    pub mode: ExecutionMode,
    /// Successful runs change cluster state and invalidate the cache
    pub mutates: bool,
    pub template: fn(&Resolved) -> String,
}

impl ActionSpec {
    /// Kind of the resource the command finally targets
    pub fn target_kind(&self) -> Option<ResourceKind> {
        self.steps.iter().rev().find_map(|step| match step {
            Step::Pick { kind, .. } => Some(*kind),
            Step::Input { .. } => None,
        })
    }
}

const fn pick(kind: ResourceKind, place_holder: &'static str) -> Step {
    Step::Pick { kind, place_holder }
}

pub static ACTIONS: [ActionSpec; 13] = [
    ActionSpec {
        action: Action::StartPipeline,
        steps: &[
            pick(
                ResourceKind::Pipeline,
                "In which Pipeline you want to create a PipelineRun",
            ),
            Step::Input {
                prompt: "Provide a name for the PipelineRun",
                place_holder: "Leave empty to let tkn generate one",
            },
        ],
        mode: ExecutionMode::Captured,
        mutates: true,
        template: start_pipeline,
    },
    ActionSpec {
        action: Action::DescribePipeline,
        steps: &[pick(
            ResourceKind::Pipeline,
            "Select Pipeline you want to describe",
        )],
        mode: ExecutionMode::Terminal,
        mutates: false,
        template: describe_pipeline,
    },
    ActionSpec {
        action: Action::DeletePipeline,
        steps: &[pick(ResourceKind::Pipeline, "Select Pipeline you want to delete")],
        mode: ExecutionMode::Captured,
        mutates: true,
        template: delete_pipeline,
    },
    ActionSpec {
        action: Action::DescribePipelineRun,
        steps: &[
            pick(
                ResourceKind::Pipeline,
                "From which pipeline you want to describe PipelineRun",
            ),
            pick(
                ResourceKind::PipelineRun,
                "Select PipelineRun you want to describe",
            ),
        ],
        mode: ExecutionMode::Terminal,
        mutates: false,
        template: describe_pipeline_run,
    },
    ActionSpec {
        action: Action::ShowPipelineRunLogs,
        steps: &[
            pick(
                ResourceKind::Pipeline,
                "From which pipeline you want to see PipelineRun logs",
            ),
            pick(
                ResourceKind::PipelineRun,
                "Select PipelineRun you want to see logs for",
            ),
        ],
        mode: ExecutionMode::Terminal,
        mutates: false,
        template: pipeline_run_logs,
    },
    ActionSpec {
        action: Action::CancelPipelineRun,
        steps: &[
            pick(
                ResourceKind::Pipeline,
                "From which pipeline you want to cancel PipelineRun",
            ),
            pick(
                ResourceKind::PipelineRun,
                "Select PipelineRun you want to cancel",
            ),
        ],
        mode: ExecutionMode::Captured,
        mutates: true,
        template: cancel_pipeline_run,
    },
    ActionSpec {
        action: Action::DeletePipelineRun,
        steps: &[
            pick(
                ResourceKind::Pipeline,
                "From which pipeline you want to delete PipelineRun",
            ),
            pick(
                ResourceKind::PipelineRun,
                "Select PipelineRun you want to delete",
            ),
        ],
        mode: ExecutionMode::Captured,
        mutates: true,
        template: delete_pipeline_run,
    },
    ActionSpec {
        action: Action::DescribeTask,
        steps: &[pick(ResourceKind::Task, "Select Task you want to describe")],
        mode: ExecutionMode::Terminal,
        mutates: false,
        template: describe_task,
    },
    ActionSpec {
        action: Action::DeleteTask,
        steps: &[pick(ResourceKind::Task, "Select Task you want to delete")],
        mode: ExecutionMode::Captured,
        mutates: true,
        template: delete_task,
    },
    ActionSpec {
        action: Action::DescribeTaskRun,
        steps: &[
            pick(
                ResourceKind::Task,
                "From which task you want to describe TaskRun",
            ),
            pick(ResourceKind::TaskRun, "Select TaskRun you want to describe"),
        ],
        mode: ExecutionMode::Terminal,
        mutates: false,
        template: describe_task_run,
    },
    ActionSpec {
        action: Action::ShowTaskRunLogs,
        steps: &[
            pick(
                ResourceKind::Task,
                "From which task you want to see TaskRun logs",
            ),
            pick(ResourceKind::TaskRun, "Select TaskRun you want to see logs for"),
        ],
        mode: ExecutionMode::Terminal,
        mutates: false,
        template: task_run_logs,
    },
    ActionSpec {
        action: Action::DeleteTaskRun,
        steps: &[
            pick(ResourceKind::Task, "From which task you want to delete TaskRun"),
            pick(ResourceKind::TaskRun, "Select TaskRun you want to delete"),
        ],
        mode: ExecutionMode::Captured,
        mutates: true,
        template: delete_task_run,
    },
    ActionSpec {
        action: Action::DescribeClusterTask,
        steps: &[pick(
            ResourceKind::ClusterTask,
            "Select ClusterTask you want to describe",
        )],
        mode: ExecutionMode::Terminal,
        mutates: false,
        template: describe_cluster_task,
    },
];

fn start_pipeline(r: &Resolved) -> String {
    command::start_pipeline(r.target(), r.input().unwrap_or_default())
}

fn describe_pipeline(r: &Resolved) -> String {
    command::describe_pipelines(r.target())
}

fn delete_pipeline(r: &Resolved) -> String {
    command::delete_pipeline(r.target())
}

fn describe_pipeline_run(r: &Resolved) -> String {
    command::describe_pipeline_runs(r.target())
}

fn pipeline_run_logs(r: &Resolved) -> String {
    command::show_pipeline_run_logs(r.target())
}

fn cancel_pipeline_run(r: &Resolved) -> String {
    command::cancel_pipeline_run(r.target())
}

fn delete_pipeline_run(r: &Resolved) -> String {
    command::delete_pipeline_run(r.target())
}

fn describe_task(r: &Resolved) -> String {
    command::describe_tasks(r.target())
}

fn delete_task(r: &Resolved) -> String {
    command::delete_task(r.target())
}

fn describe_task_run(r: &Resolved) -> String {
    command::describe_task_runs(r.target())
}

fn task_run_logs(r: &Resolved) -> String {
    command::show_task_run_logs(r.target())
}

fn delete_task_run(r: &Resolved) -> String {
    command::delete_task_run(r.target())
}

fn describe_cluster_task(r: &Resolved) -> String {
    command::describe_cluster_tasks(r.target())
}

impl Action {
    pub fn spec(self) -> &'static ActionSpec {
        // Every variant has exactly one entry; the table order follows the enum.
        &ACTIONS[self as usize]
    }
}

/// Names chosen for each level, plus the free-text input if the action asks for one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolved {
    picks: Vec<(ResourceKind, String)>,
    input: Option<String>,
}

impl Resolved {
    /// The most specific resource picked
    pub fn target(&self) -> &str {
        self.picks
            .last()
            .map(|(_, name)| name.as_str())
            .unwrap_or_default()
    }

    pub fn input(&self) -> Option<&str> {
        self.input.as_deref()
    }
}

#[derive(Debug)]
pub enum Resolution {
    Resolved(Resolved),
    Cancelled,
}

/// What ran once an action was resolved
#[derive(Debug)]
pub enum Outcome {
    Terminal {
        command: String,
        handle: StreamHandle,
    },
    Captured {
        command: String,
        result: CliResult,
    },
}

impl Outcome {
    pub fn command(&self) -> &str {
        match self {
            Outcome::Terminal { command, .. } | Outcome::Captured { command, .. } => command,
        }
    }
}

pub struct CommandResolver {
    ctx: AppContext,
}

impl CommandResolver {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    /// Resolve `action` and run it.
    ///
    /// `Ok(None)` means the user cancelled a prompt and nothing ran.
    pub async fn run(&self, action: Action, context: Option<&NodeRef>) -> Result<Option<Outcome>> {
        let spec = action.spec();
        let resolved = match self.resolve(spec, context).await? {
            Resolution::Resolved(resolved) => resolved,
            Resolution::Cancelled => {
                debug!("{:?} cancelled by user", action);
                return Ok(None);
            }
        };

        Ok(Some(self.execute(spec, &resolved).await))
    }

    /// Walk the action's steps, prompting wherever the context does not already decide
    pub async fn resolve(
        &self,
        spec: &ActionSpec,
        context: Option<&NodeRef>,
    ) -> Result<Resolution> {
        let known = match context {
            Some(node) => Some(Self::context_names(spec, node)?),
            None => None,
        };

        let mut resolved = Resolved::default();
        let mut scope = Scope::All;

        for step in spec.steps {
            match *step {
                Step::Pick { kind, place_holder } => {
                    let name = match &known {
                        // Context names the target; ancestors it cannot name are not needed.
                        Some(known) => match known.get(&kind) {
                            Some(name) => name.clone(),
                            None => continue,
                        },
                        None => match self.pick(kind, &scope, place_holder).await? {
                            Some(name) => name,
                            None => return Ok(Resolution::Cancelled),
                        },
                    };
                    scope = Scope::owned_by(kind, name.clone());
                    resolved.picks.push((kind, name));
                }
                Step::Input {
                    prompt,
                    place_holder,
                } => {
                    let options = InputBoxOptions {
                        prompt: prompt.to_string(),
                        place_holder: Some(place_holder.to_string()),
                    };
                    match self.ctx.host.show_input_box(options).await {
                        Some(value) => resolved.input = Some(value),
                        None => return Ok(Resolution::Cancelled),
                    }
                }
            }
        }

        Ok(Resolution::Resolved(resolved))
    }

    /// Names the context node and its ancestors supply, keyed by kind
    fn context_names(spec: &ActionSpec, node: &NodeRef) -> Result<HashMap<ResourceKind, String>> {
        let target = spec.target_kind();
        if node.resource_kind().is_none() || node.resource_kind() != target {
            return Err(TektonError::InvalidOperation(format!(
                "{:?} cannot run on {}",
                spec.action,
                node.get_name()
            )));
        }

        let mut names = HashMap::new();
        let own = (node.kind(), node.get_name().to_string());
        for (kind, name) in std::iter::once(&own).chain(node.lineage().iter().rev()) {
            if let NodeKind::Resource(kind) = kind {
                names.entry(*kind).or_insert_with(|| name.clone());
            }
        }
        Ok(names)
    }

    /// Prompt for one resource of `kind`. `Ok(None)` when the prompt is dismissed.
    async fn pick(
        &self,
        kind: ResourceKind,
        scope: &Scope,
        place_holder: &str,
    ) -> Result<Option<String>> {
        debug!("Resolving: need {} in scope {}", kind, scope);

        let candidates = self.ctx.cache.get(kind, scope).await?;
        if candidates.is_empty() {
            return Err(TektonError::NoCandidates { kind });
        }

        let items = candidates
            .into_iter()
            .map(|c| QuickPickItem {
                label: c.name,
                description: c.status,
            })
            .collect();
        let options = QuickPickOptions {
            place_holder: place_holder.to_string(),
        };

        Ok(self
            .ctx
            .host
            .show_quick_pick(items, options)
            .await
            .map(|item| item.label))
    }

    async fn execute(&self, spec: &ActionSpec, resolved: &Resolved) -> Outcome {
        let command = (spec.template)(resolved);
        info!("Running {:?}: {}", spec.action, command);

        match spec.mode {
            ExecutionMode::Terminal => {
                let handle = self.ctx.tkn.execute_in_terminal(&command);
                Outcome::Terminal { command, handle }
            }
            ExecutionMode::Captured => {
                let result = self.ctx.tkn.execute(&command).await;
                if result.is_success() && spec.mutates {
                    self.ctx.explorer.refresh(None);
                }
                Outcome::Captured { command, result }
            }
        }
    }
}
