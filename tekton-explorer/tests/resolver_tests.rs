mod support;

use support::{context, pipeline_runs_of, ScriptedHost, ScriptedTkn};
use tekton_cli::{command, CliResult};
use tekton_explorer::resolver::Outcome;
use tekton_explorer::{commands, Action, ResourceNode};
use tekton_shared::{ResourceKind, Scope, TektonError};

fn cluster() -> std::sync::Arc<ScriptedTkn> {
    let tkn = ScriptedTkn::new();
    tkn.set_listing(
        ResourceKind::Pipeline,
        Scope::All,
        &["pipelineA", "pipelineB"],
    );
    tkn.set_listing(
        ResourceKind::PipelineRun,
        pipeline_runs_of("pipelineA"),
        &["pr1", "pr2"],
    );
    tkn
}

#[tokio::test]
async fn test_dismissed_pick_runs_nothing() {
    let tkn = cluster();
    let host = ScriptedHost::new();
    host.answer_pick(None);
    let ctx = context(&tkn, &host);

    let outcome = commands::invoke(&ctx, Action::ShowPipelineRunLogs, None)
        .await
        .unwrap();

    assert!(outcome.is_none());
    assert!(tkn.executed().is_empty());
    assert!(tkn.terminal().is_empty());
    assert!(host.errors().is_empty());
    assert_eq!(host.shown_picks().len(), 1);
}

#[tokio::test]
async fn test_dismissed_second_level_runs_nothing() {
    let tkn = cluster();
    let host = ScriptedHost::new();
    host.answer_pick(Some("pipelineA"));
    host.answer_pick(None);
    let ctx = context(&tkn, &host);

    let outcome = commands::invoke(&ctx, Action::DescribePipelineRun, None)
        .await
        .unwrap();

    assert!(outcome.is_none());
    assert!(tkn.terminal().is_empty());
    assert_eq!(host.shown_picks().len(), 2);
}

#[tokio::test]
async fn test_no_pipelines_reports_exact_message() {
    let tkn = ScriptedTkn::new();
    let host = ScriptedHost::new();
    let ctx = context(&tkn, &host);

    let err = commands::invoke(&ctx, Action::ShowPipelineRunLogs, None)
        .await
        .unwrap_err();

    let expected =
        "You need at least one Pipeline available. Please create new Tekton Pipeline and try again.";
    assert!(matches!(
        err,
        TektonError::NoCandidates {
            kind: ResourceKind::Pipeline
        }
    ));
    assert_eq!(err.to_string(), expected);
    assert_eq!(host.errors(), vec![expected.to_string()]);
    assert!(host.shown_picks().is_empty());
    assert!(tkn.terminal().is_empty());
}

#[tokio::test]
async fn test_no_runs_for_selected_pipeline() {
    let tkn = cluster();
    let host = ScriptedHost::new();
    host.answer_pick(Some("pipelineB"));
    let ctx = context(&tkn, &host);

    let err = commands::invoke(&ctx, Action::DescribePipelineRun, None)
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "You need at least one PipelineRun available. Please create new Tekton PipelineRun and try again."
    );
    assert_eq!(host.shown_picks().len(), 1);
}

#[tokio::test]
async fn test_logs_without_context_prompts_top_down() {
    let tkn = cluster();
    let host = ScriptedHost::new();
    host.answer_pick(Some("pipelineA"));
    host.answer_pick(Some("pr1"));
    let ctx = context(&tkn, &host);

    let outcome = commands::invoke(&ctx, Action::ShowPipelineRunLogs, None)
        .await
        .unwrap()
        .unwrap();

    assert!(matches!(outcome, Outcome::Terminal { .. }));
    assert_eq!(outcome.command(), command::show_pipeline_run_logs("pr1"));
    assert_eq!(tkn.terminal(), vec![command::show_pipeline_run_logs("pr1")]);
    assert!(tkn.executed().is_empty());

    let shown = host.shown_picks();
    assert_eq!(shown.len(), 2);
    assert_eq!(
        shown[0].place_holder,
        "From which pipeline you want to see PipelineRun logs"
    );
    assert_eq!(shown[0].labels, vec!["pipelineA", "pipelineB"]);
    assert_eq!(
        shown[1].place_holder,
        "Select PipelineRun you want to see logs for"
    );
    assert_eq!(shown[1].labels, vec!["pr1", "pr2"]);

    // The second level was listed in the first pick's scope
    let calls = tkn.list_calls.lock().clone();
    assert_eq!(
        calls[1],
        (ResourceKind::PipelineRun, pipeline_runs_of("pipelineA"))
    );
}

#[tokio::test]
async fn test_logs_with_single_candidates_still_prompts() {
    let tkn = ScriptedTkn::new();
    tkn.set_listing(ResourceKind::Pipeline, Scope::All, &["pipelineA"]);
    tkn.set_listing(
        ResourceKind::PipelineRun,
        pipeline_runs_of("pipelineA"),
        &["pr1"],
    );
    let host = ScriptedHost::new();
    host.answer_pick(Some("pipelineA"));
    host.answer_pick(Some("pr1"));
    let ctx = context(&tkn, &host);

    let outcome = commands::invoke(&ctx, Action::ShowPipelineRunLogs, None)
        .await
        .unwrap()
        .unwrap();

    let shown = host.shown_picks();
    assert_eq!(shown.len(), 2);
    assert_eq!(shown[0].labels, vec!["pipelineA"]);
    assert_eq!(shown[1].labels, vec!["pr1"]);
    assert_eq!(outcome.command(), command::show_pipeline_run_logs("pr1"));
    assert_eq!(tkn.terminal(), vec![command::show_pipeline_run_logs("pr1")]);
}

#[tokio::test]
async fn test_context_skips_every_prompt() {
    let tkn = cluster();
    let host = ScriptedHost::new();
    let ctx = context(&tkn, &host);
    let node = ResourceNode::named(ResourceKind::PipelineRun, "pr1", None);

    let outcome = commands::invoke(&ctx, Action::DescribePipelineRun, Some(&node))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(outcome.command(), command::describe_pipeline_runs("pr1"));
    assert_eq!(tkn.terminal(), vec![command::describe_pipeline_runs("pr1")]);
    assert!(host.shown_picks().is_empty());
    assert_eq!(tkn.list_count(), 0);
}

#[tokio::test]
async fn test_tree_node_context() {
    let tkn = cluster();
    let host = ScriptedHost::new();
    let ctx = context(&tkn, &host);

    let roots = ctx.explorer.get_children(None).await;
    let pipelines = ctx.explorer.get_children(Some(&roots[0])).await;
    let runs = ctx.explorer.get_children(Some(&pipelines[0])).await;
    assert_eq!(runs[1].get_name(), "pr2");

    commands::invoke(&ctx, Action::ShowPipelineRunLogs, Some(&runs[1]))
        .await
        .unwrap();

    assert_eq!(tkn.terminal(), vec![command::show_pipeline_run_logs("pr2")]);
    assert!(host.shown_picks().is_empty());
}

#[tokio::test]
async fn test_start_pipeline_and_refresh() {
    let tkn = cluster();
    let host = ScriptedHost::new();
    host.answer_pick(Some("pipelineA"));
    host.answer_input(Some("run1"));
    let ctx = context(&tkn, &host);
    let mut changes = ctx.explorer.subscribe();

    let outcome = commands::invoke(&ctx, Action::StartPipeline, None)
        .await
        .unwrap()
        .unwrap();

    assert!(matches!(outcome, Outcome::Captured { .. }));
    assert_eq!(
        tkn.executed(),
        vec![command::start_pipeline("pipelineA", "run1")]
    );
    assert_eq!(
        host.shown_picks()[0].place_holder,
        "In which Pipeline you want to create a PipelineRun"
    );
    assert_eq!(
        host.shown_inputs.lock().clone(),
        vec!["Provide a name for the PipelineRun".to_string()]
    );

    // A successful mutation drops the cache and refreshes the whole tree
    assert!(ctx.cache.is_empty());
    assert_eq!(ctx.explorer.generation(), 1);
    assert!(changes.try_recv().unwrap().target.is_none());
}

#[tokio::test]
async fn test_start_with_context_still_asks_for_name() {
    let tkn = cluster();
    let host = ScriptedHost::new();
    host.answer_input(Some(""));
    let ctx = context(&tkn, &host);
    let node = ResourceNode::named(ResourceKind::Pipeline, "pipelineB", None);

    commands::invoke(&ctx, Action::StartPipeline, Some(&node))
        .await
        .unwrap()
        .unwrap();

    assert!(host.shown_picks().is_empty());
    assert_eq!(host.shown_inputs.lock().len(), 1);
    assert_eq!(tkn.executed(), vec![command::start_pipeline("pipelineB", "")]);
}

#[tokio::test]
async fn test_dismissed_name_cancels_start() {
    let tkn = cluster();
    let host = ScriptedHost::new();
    host.answer_pick(Some("pipelineA"));
    host.answer_input(None);
    let ctx = context(&tkn, &host);

    let outcome = commands::invoke(&ctx, Action::StartPipeline, None)
        .await
        .unwrap();

    assert!(outcome.is_none());
    assert!(tkn.executed().is_empty());
    assert_eq!(ctx.explorer.generation(), 0);
}

#[tokio::test]
async fn test_failed_mutation_is_reported_and_keeps_tree() {
    let tkn = cluster();
    tkn.set_result(CliResult::failed("pipelineruns.tekton.dev \"pr1\" not found"));
    let host = ScriptedHost::new();
    let ctx = context(&tkn, &host);
    let node = ResourceNode::named(ResourceKind::PipelineRun, "pr1", None);

    let outcome = commands::invoke(&ctx, Action::DeletePipelineRun, Some(&node))
        .await
        .unwrap()
        .unwrap();

    match outcome {
        Outcome::Captured {
            command: ran,
            result,
        } => {
            assert_eq!(ran, command::delete_pipeline_run("pr1"));
            assert!(!result.is_success());
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(
        host.errors(),
        vec!["pipelineruns.tekton.dev \"pr1\" not found".to_string()]
    );
    assert_eq!(ctx.explorer.generation(), 0);
}

#[tokio::test]
async fn test_captured_output_is_shown() {
    let tkn = cluster();
    tkn.set_result(CliResult::ok("PipelineRun cancelled\n"));
    let host = ScriptedHost::new();
    let ctx = context(&tkn, &host);
    let node = ResourceNode::named(ResourceKind::PipelineRun, "pr2", None);

    commands::invoke(&ctx, Action::CancelPipelineRun, Some(&node))
        .await
        .unwrap();

    assert_eq!(
        host.infos.lock().clone(),
        vec!["PipelineRun cancelled".to_string()]
    );
    assert_eq!(tkn.executed(), vec![command::cancel_pipeline_run("pr2")]);
}

#[tokio::test]
async fn test_context_of_wrong_kind_is_rejected() {
    let tkn = cluster();
    let host = ScriptedHost::new();
    let ctx = context(&tkn, &host);
    let node = ResourceNode::named(ResourceKind::Task, "build", None);

    let err = commands::invoke(&ctx, Action::DescribePipelineRun, Some(&node))
        .await
        .unwrap_err();

    assert!(matches!(err, TektonError::InvalidOperation(_)));
    assert_eq!(host.errors().len(), 1);
    assert!(tkn.terminal().is_empty());
}

#[tokio::test]
async fn test_category_node_is_not_a_context() {
    let tkn = cluster();
    let host = ScriptedHost::new();
    let ctx = context(&tkn, &host);
    let roots = ctx.explorer.get_children(None).await;

    let err = commands::invoke(&ctx, Action::DescribePipeline, Some(&roots[0]))
        .await
        .unwrap_err();

    assert!(matches!(err, TektonError::InvalidOperation(_)));
}

#[tokio::test]
async fn test_task_run_logs_scoped_by_task() {
    let tkn = ScriptedTkn::new();
    tkn.set_listing(ResourceKind::Task, Scope::All, &["lint"]);
    tkn.set_listing(
        ResourceKind::TaskRun,
        Scope::owned_by(ResourceKind::Task, "lint"),
        &["lint-run-1"],
    );
    let host = ScriptedHost::new();
    host.answer_pick(Some("lint"));
    host.answer_pick(Some("lint-run-1"));
    let ctx = context(&tkn, &host);

    commands::invoke(&ctx, Action::ShowTaskRunLogs, None)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        tkn.terminal(),
        vec![command::show_task_run_logs("lint-run-1")]
    );
    assert_eq!(
        host.shown_picks()[0].place_holder,
        "From which task you want to see TaskRun logs"
    );
}

#[tokio::test]
async fn test_second_resolution_uses_cached_candidates() {
    let tkn = cluster();
    let host = ScriptedHost::new();
    for _ in 0..2 {
        host.answer_pick(Some("pipelineA"));
        host.answer_pick(Some("pr1"));
    }
    let ctx = context(&tkn, &host);

    commands::invoke(&ctx, Action::DescribePipelineRun, None)
        .await
        .unwrap();
    commands::invoke(&ctx, Action::ShowPipelineRunLogs, None)
        .await
        .unwrap();

    assert_eq!(tkn.list_count(), 2);
    assert_eq!(tkn.terminal().len(), 2);
}
