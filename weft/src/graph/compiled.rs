//! Compiled state graph: the step-by-step executor.
//!
//! A run proceeds in steps. Every node in the active set runs concurrently
//! against the step-start snapshot; their updates are merged in node
//! registration order and committed together, then the next active set is
//! computed from static edges and routers evaluated on the merged state.
//! With a checkpointer and a `thread_id`, every commit is saved as a
//! checkpoint, and a node returning `NodeOutput::Suspend` stops the run with
//! the step recorded for `GraphInput::Resume`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::error::GraphError;
use crate::graph::conditional::NextEntry;
use crate::graph::context::NodeContext;
use crate::graph::interrupt::{GraphInput, Interrupt};
use crate::graph::logging::{
    log_checkpoint_saved, log_graph_complete, log_graph_error, log_graph_start, log_interrupt,
    log_node_complete, log_node_start, log_resume, log_routing, log_state_update, log_step_start,
};
use crate::graph::node::{Node, NodeOutput};
use crate::graph::state_graph::{END, START};
use crate::memory::{
    Checkpoint, CheckpointSource, Checkpointer, PendingWrite, RunnableConfig, Store,
};
use crate::state::{PartialUpdate, StateSchema, StateSnapshot};
use crate::stream::{EventSink, StreamEvent, StreamMode};

/// Result of `invoke`: the state reached and any pending interrupts.
///
/// A non-empty `interrupts` means the run is suspended; `state` is then the
/// last committed state (the suspended step is not applied).
#[derive(Debug, Clone, PartialEq)]
pub struct GraphOutput {
    pub state: StateSnapshot,
    pub interrupts: Vec<Interrupt>,
}

impl GraphOutput {
    pub fn is_interrupted(&self) -> bool {
        !self.interrupts.is_empty()
    }
}

/// The step about to run: where it reads from and what is already known about it.
struct PendingStep {
    state: StateSnapshot,
    active: Vec<String>,
    /// Updates of nodes that finished before a sibling suspended.
    carried: Vec<PendingWrite>,
    /// Resume value per interrupted node.
    resume: HashMap<String, Value>,
}

/// Executable graph produced by `StateGraph::compile`.
///
/// Immutable and cheap to clone; `stream` clones it into the spawned task.
#[derive(Clone)]
pub struct CompiledStateGraph {
    pub(super) schema: StateSchema,
    /// Nodes in registration order.
    pub(super) nodes: Vec<(String, Arc<dyn Node>)>,
    /// Outgoing edges per node and for START.
    pub(super) next_map: HashMap<String, NextEntry>,
    pub(super) checkpointer: Option<Arc<dyn Checkpointer>>,
    pub(super) store: Option<Arc<dyn Store>>,
}

impl CompiledStateGraph {
    pub(super) fn new(
        schema: StateSchema,
        nodes: Vec<(String, Arc<dyn Node>)>,
        next_map: HashMap<String, NextEntry>,
        checkpointer: Option<Arc<dyn Checkpointer>>,
        store: Option<Arc<dyn Store>>,
    ) -> Self {
        Self {
            schema,
            nodes,
            next_map,
            checkpointer,
            store,
        }
    }

    /// Runs the graph until it finishes or suspends.
    ///
    /// - `GraphInput::Values`: merged into the thread's latest state (or the
    ///   schema defaults for a new thread); execution starts at START.
    /// - `GraphInput::Resume`: re-runs the suspended node(s) of the thread's
    ///   pending step with the resume value.
    /// - `GraphInput::Continue`: re-runs the thread's pending step, e.g.
    ///   after a node failure.
    ///
    /// Checkpointing happens only when the graph has a checkpointer and
    /// `config.thread_id` is set.
    pub async fn invoke(
        &self,
        input: impl Into<GraphInput>,
        config: Option<RunnableConfig>,
    ) -> Result<GraphOutput, GraphError> {
        let config = config.unwrap_or_default();
        self.run(input.into(), &config, None).await
    }

    /// Streams graph execution, emitting events via a channel-backed Stream.
    ///
    /// A failing run yields one `Err` item and ends the stream. A suspended
    /// run ends with `StreamEvent::Interrupt`.
    pub fn stream(
        &self,
        input: impl Into<GraphInput>,
        config: Option<RunnableConfig>,
        stream_mode: impl Into<HashSet<StreamMode>>,
    ) -> ReceiverStream<Result<StreamEvent, GraphError>> {
        let (tx, rx) = mpsc::channel(128);
        let graph = self.clone();
        let input = input.into();
        let sink = EventSink::new(tx, stream_mode.into());

        tokio::spawn(async move {
            let config = config.unwrap_or_default();
            if let Err(e) = graph.run(input, &config, Some(&sink)).await {
                sink.error(e).await;
            }
        });

        ReceiverStream::new(rx)
    }

    /// Latest checkpoint of the thread: state, next nodes, pending interrupts, step.
    pub async fn get_state(&self, thread_id: &str) -> Result<Option<Checkpoint>, GraphError> {
        let checkpointer = self
            .checkpointer
            .as_ref()
            .ok_or(GraphError::CheckpointerRequired("get_state"))?;
        Ok(checkpointer.load_latest(thread_id).await?)
    }

    /// Checkpoints of the thread, oldest first; `limit` keeps the most recent ones.
    pub async fn get_state_history(
        &self,
        thread_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Checkpoint>, GraphError> {
        let checkpointer = self
            .checkpointer
            .as_ref()
            .ok_or(GraphError::CheckpointerRequired("get_state_history"))?;
        Ok(checkpointer.list(thread_id, limit).await?)
    }

    pub fn schema(&self) -> &StateSchema {
        &self.schema
    }

    /// Returns the shared store if the graph was built with `with_store(store)`.
    pub fn store(&self) -> Option<&Arc<dyn Store>> {
        self.store.as_ref()
    }

    /// Node names in registration order.
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|(n, _)| n.as_str())
    }

    async fn run(
        &self,
        input: GraphInput,
        config: &RunnableConfig,
        sink: Option<&EventSink>,
    ) -> Result<GraphOutput, GraphError> {
        log_graph_start(config.thread_id.as_deref());
        let result = self.run_loop(input, config, sink).await;
        if let Err(e) = &result {
            log_graph_error(e);
        }
        result
    }

    fn persistence<'a>(
        &'a self,
        config: &'a RunnableConfig,
    ) -> Option<(&'a dyn Checkpointer, &'a str)> {
        match (&self.checkpointer, &config.thread_id) {
            (Some(cp), Some(thread)) => Some((cp.as_ref(), thread.as_str())),
            _ => None,
        }
    }

    async fn run_loop(
        &self,
        input: GraphInput,
        config: &RunnableConfig,
        sink: Option<&EventSink>,
    ) -> Result<GraphOutput, GraphError> {
        let persist = self.persistence(config);
        let latest = match persist {
            Some((cp, thread)) => cp.load_latest(thread).await?,
            None => None,
        };
        let mut step = latest.as_ref().map_or(0, |c| c.step + 1);

        let pending = match input {
            GraphInput::Values(update) => {
                let base = match &latest {
                    Some(cp) => cp.state.clone(),
                    None => self.schema.empty_state(),
                };
                let state = self.schema.merge(&base, &update)?;
                let active = self.next_active(&[START.to_string()], &state)?;
                if let Some((cp, thread)) = persist {
                    let checkpoint =
                        Checkpoint::new(thread, step, CheckpointSource::Input, state.clone())
                            .with_next(active.clone());
                    self.save(cp, &checkpoint, sink).await?;
                }
                if let Some(sink) = sink {
                    sink.values(&state).await;
                }
                step += 1;
                PendingStep {
                    state,
                    active,
                    carried: Vec::new(),
                    resume: HashMap::new(),
                }
            }
            GraphInput::Resume(cmd) => {
                let (_, thread) = persist.ok_or(GraphError::CheckpointerRequired("resume"))?;
                let cp = match latest {
                    Some(cp) if cp.is_interrupted() => cp,
                    _ => return Err(GraphError::NoPendingInterrupt(thread.to_string())),
                };
                let nodes: Vec<String> = cp.interrupts.iter().map(|i| i.node.clone()).collect();
                log_resume(thread, &nodes);
                PendingStep {
                    state: cp.state,
                    active: cp.next,
                    carried: cp.pending_writes,
                    resume: nodes
                        .into_iter()
                        .map(|n| (n, cmd.resume.clone()))
                        .collect(),
                }
            }
            GraphInput::Continue => {
                let (_, thread) = persist.ok_or(GraphError::CheckpointerRequired("continue"))?;
                let cp = latest.ok_or_else(|| GraphError::NothingToContinue(thread.to_string()))?;
                PendingStep {
                    state: cp.state,
                    active: cp.next,
                    carried: cp.pending_writes,
                    resume: HashMap::new(),
                }
            }
        };

        let PendingStep {
            mut state,
            mut active,
            mut carried,
            mut resume,
        } = pending;
        let limit = config.recursion_limit;
        let mut executed = 0usize;

        while !active.is_empty() {
            if executed >= limit {
                tracing::warn!(limit, step, "Recursion limit reached");
                return Err(GraphError::RecursionLimitExceeded { limit, state });
            }
            executed += 1;
            log_step_start(step, &active);

            let finished: HashSet<&str> = carried.iter().map(|w| w.node.as_str()).collect();
            let mut runs = Vec::new();
            for name in active.iter().filter(|n| !finished.contains(n.as_str())) {
                let node = self
                    .node(name)
                    .ok_or_else(|| GraphError::UnknownNode(name.clone()))?;
                let ctx = NodeContext::new(
                    name.clone(),
                    step,
                    config.clone(),
                    self.store.clone(),
                    resume.remove(name),
                );
                runs.push((node, ctx));
            }

            let snapshot = &state;
            let results = join_all(runs.iter().map(|(node, ctx)| async move {
                log_node_start(ctx.node(), step);
                node.run(snapshot, ctx).await
            }))
            .await;

            let mut writes: HashMap<String, PartialUpdate> = carried
                .drain(..)
                .map(|w| (w.node, w.update))
                .collect();
            let mut interrupts = Vec::new();
            for ((_, ctx), result) in runs.iter().zip(results) {
                match result {
                    Ok(output) => {
                        log_node_complete(ctx.node(), output.kind());
                        match output {
                            NodeOutput::Continue(update) => {
                                // Checked here so an invalid write never reaches pending_writes.
                                self.schema.validate(&update)?;
                                writes.insert(ctx.node().to_string(), update);
                            }
                            NodeOutput::Suspend(payload) => {
                                log_interrupt(ctx.node(), step);
                                interrupts.push(Interrupt::new(ctx.node(), payload));
                            }
                        }
                    }
                    Err(source) => {
                        return Err(GraphError::NodeFailed {
                            node: ctx.node().to_string(),
                            source,
                        });
                    }
                }
            }

            if !interrupts.is_empty() {
                let pending_writes: Vec<PendingWrite> = active
                    .iter()
                    .filter_map(|n| {
                        writes.remove(n).map(|update| PendingWrite {
                            node: n.clone(),
                            update,
                        })
                    })
                    .collect();
                match persist {
                    Some((cp, thread)) => {
                        let checkpoint =
                            Checkpoint::new(thread, step, CheckpointSource::Loop, state.clone())
                                .with_next(active.clone())
                                .with_interrupts(interrupts.clone())
                                .with_pending_writes(pending_writes);
                        self.save(cp, &checkpoint, sink).await?;
                    }
                    None => tracing::warn!("Run suspended without a checkpointer; it cannot be resumed"),
                }
                if let Some(sink) = sink {
                    sink.interrupt(&interrupts).await;
                }
                log_graph_complete(executed, interrupts.len());
                return Ok(GraphOutput { state, interrupts });
            }

            let ordered: Vec<(String, PartialUpdate)> = active
                .iter()
                .filter_map(|n| writes.remove(n).map(|u| (n.clone(), u)))
                .collect();
            let merged = self
                .schema
                .merge_all(&state, ordered.iter().map(|(_, u)| u))?;
            let writers: Vec<&str> = ordered.iter().map(|(n, _)| n.as_str()).collect();
            log_state_update(step, &writers);

            let next = self.next_active(&active, &merged)?;
            if let Some((cp, thread)) = persist {
                let checkpoint =
                    Checkpoint::new(thread, step, CheckpointSource::Loop, merged.clone())
                        .with_next(next.clone());
                self.save(cp, &checkpoint, sink).await?;
            }
            if let Some(sink) = sink {
                for (node, update) in &ordered {
                    sink.update(node, update).await;
                }
                sink.values(&merged).await;
            }

            state = merged;
            active = next;
            step += 1;
        }

        log_graph_complete(executed, 0);
        Ok(GraphOutput {
            state,
            interrupts: Vec::new(),
        })
    }

    async fn save(
        &self,
        checkpointer: &dyn Checkpointer,
        checkpoint: &Checkpoint,
        sink: Option<&EventSink>,
    ) -> Result<(), GraphError> {
        let id = checkpointer.save(checkpoint).await?;
        log_checkpoint_saved(&checkpoint.thread_id, checkpoint.step, &id);
        if let Some(sink) = sink {
            sink.checkpoint(checkpoint).await;
        }
        Ok(())
    }

    fn node(&self, name: &str) -> Option<&Arc<dyn Node>> {
        self.nodes.iter().find(|(n, _)| n == name).map(|(_, node)| node)
    }

    fn rank(&self, name: &str) -> usize {
        self.nodes
            .iter()
            .position(|(n, _)| n == name)
            .unwrap_or(usize::MAX)
    }

    /// Successors of `completed` on `state`: static targets plus router
    /// results, without END, deduplicated, in node registration order.
    fn next_active(
        &self,
        completed: &[String],
        state: &StateSnapshot,
    ) -> Result<Vec<String>, GraphError> {
        let mut next: Vec<String> = Vec::new();
        for from in completed {
            let targets = match self.next_map.get(from) {
                None => continue,
                Some(NextEntry::Static(targets)) => targets.clone(),
                Some(NextEntry::Conditional(router)) => router.resolve(from, state)?,
            };
            for target in targets {
                log_routing(from, &target);
                if target != END && !next.contains(&target) {
                    next.push(target);
                }
            }
        }
        next.sort_by_key(|n| self.rank(n));
        Ok(next)
    }
}
