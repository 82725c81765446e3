//! Subcommand implementations: run, resume, state, history, graph.

use std::io::Write;

use serde_json::Value;
use tokio_stream::StreamExt;
use weft::{
    generate_dot, generate_mermaid, Command, CompiledStateGraph, GraphInput, Interrupt,
    RunnableConfig, StreamEvent, StreamMode,
};

use crate::demos::{Demo, DemoInput};
use crate::display::{write_checkpoint, write_event, write_history_line};
use crate::{Persistence, RunError};

/// Which stream events `run` and `resume` print.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputMode {
    /// Full state after the input and after every step.
    #[default]
    Values,
    /// Each node's partial update.
    Updates,
}

impl From<OutputMode> for StreamMode {
    fn from(mode: OutputMode) -> Self {
        match mode {
            OutputMode::Values => StreamMode::Values,
            OutputMode::Updates => StreamMode::Updates,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum DiagramFormat {
    #[default]
    Dot,
    Mermaid,
}

/// Options shared by `run` and `resume`.
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    /// Thread to run on; `run` generates one when absent.
    pub thread_id: Option<String>,
    pub user_id: Option<String>,
    pub mode: OutputMode,
    pub recursion_limit: Option<usize>,
}

impl RunOptions {
    fn config(&self, thread_id: &str) -> RunnableConfig {
        let mut config = RunnableConfig::for_thread(thread_id);
        if let Some(user) = &self.user_id {
            config = config.with_user_id(user.clone());
        }
        if let Some(limit) = self.recursion_limit {
            config = config.with_recursion_limit(limit);
        }
        config
    }
}

/// How a `run` or `resume` ended.
#[derive(Clone, Debug, PartialEq)]
pub enum RunOutcome {
    Completed,
    Suspended(Vec<Interrupt>),
}

fn new_thread_id() -> String {
    format!("thread-{}", uuid::Uuid::new_v4())
}

/// Resume values are JSON when they parse as JSON, plain strings otherwise.
pub fn parse_resume_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Starts a demo run on a thread (new or existing) and prints its stream.
pub async fn run(
    demo: Demo,
    input: &DemoInput,
    opts: &RunOptions,
    persistence: &Persistence,
    out: &mut impl Write,
) -> Result<RunOutcome, RunError> {
    let graph = demo.build(persistence)?;
    let thread_id = opts.thread_id.clone().unwrap_or_else(new_thread_id);
    writeln!(out, "thread: {}", thread_id)?;
    let outcome = execute(
        &graph,
        demo.input(input).into(),
        opts.config(&thread_id),
        opts.mode,
        out,
    )
    .await?;
    write_outcome(out, demo, &thread_id, &outcome)?;
    Ok(outcome)
}

/// Answers the pending interrupt of `thread_id` with `value`.
pub async fn resume(
    demo: Demo,
    thread_id: &str,
    value: Value,
    opts: &RunOptions,
    persistence: &Persistence,
    out: &mut impl Write,
) -> Result<RunOutcome, RunError> {
    let graph = demo.build(persistence)?;
    let outcome = execute(
        &graph,
        Command::resume(value).into(),
        opts.config(thread_id),
        opts.mode,
        out,
    )
    .await?;
    write_outcome(out, demo, thread_id, &outcome)?;
    Ok(outcome)
}

async fn execute(
    graph: &CompiledStateGraph,
    input: GraphInput,
    config: RunnableConfig,
    mode: OutputMode,
    out: &mut impl Write,
) -> Result<RunOutcome, RunError> {
    let mut events = graph.stream(input, Some(config), [StreamMode::from(mode)]);
    let mut outcome = RunOutcome::Completed;
    while let Some(item) = events.next().await {
        let event = item?;
        write_event(out, &event)?;
        if let StreamEvent::Interrupt(interrupts) = event {
            outcome = RunOutcome::Suspended(interrupts);
        }
    }
    Ok(outcome)
}

fn write_outcome(
    out: &mut impl Write,
    demo: Demo,
    thread_id: &str,
    outcome: &RunOutcome,
) -> Result<(), RunError> {
    match outcome {
        RunOutcome::Completed => writeln!(out, "done")?,
        RunOutcome::Suspended(_) => writeln!(
            out,
            "suspended; continue with: weft resume {} --thread {} <value>",
            demo.name(),
            thread_id
        )?,
    }
    Ok(())
}

/// Prints the latest checkpoint of a thread.
pub async fn state(
    thread_id: &str,
    persistence: &Persistence,
    out: &mut impl Write,
) -> Result<(), RunError> {
    let latest = persistence
        .checkpointer
        .load_latest(thread_id)
        .await?
        .ok_or_else(|| RunError::NoCheckpoint(thread_id.to_string()))?;
    write_checkpoint(out, &latest)?;
    Ok(())
}

/// Prints a thread's checkpoints, oldest first; `limit` keeps the most recent.
pub async fn history(
    thread_id: &str,
    limit: Option<usize>,
    persistence: &Persistence,
    out: &mut impl Write,
) -> Result<(), RunError> {
    let checkpoints = persistence.checkpointer.list(thread_id, limit).await?;
    if checkpoints.is_empty() {
        return Err(RunError::NoCheckpoint(thread_id.to_string()));
    }
    for cp in &checkpoints {
        write_history_line(out, cp)?;
    }
    Ok(())
}

/// Prints a demo's node and edge table as DOT or Mermaid text.
pub fn graph(demo: Demo, format: DiagramFormat, out: &mut impl Write) -> Result<(), RunError> {
    let compiled = demo.build(&Persistence::in_memory())?;
    let text = match format {
        DiagramFormat::Dot => generate_dot(&compiled),
        DiagramFormat::Mermaid => generate_mermaid(&compiled),
    };
    writeln!(out, "{}", text.trim_end())?;
    Ok(())
}
