//! Demo graphs bundled with the harness.
//!
//! | Demo          | Shows                                                    |
//! |---------------|----------------------------------------------------------|
//! | `parallel`    | fan-out a→{b,c}→d with an appending reducer              |
//! | `conditional` | router picking `{b,c}` or `{c,d}` from the `which` field |
//! | `review`      | human-in-the-loop edit through an interrupt              |
//! | `chat`        | multi-turn conversation on a thread                      |
//! | `memory`      | per-user facts in the store, shared across threads       |
//! | `crag`        | corrective retrieval: grade, rewrite, web search         |
//! | `rag`         | retrieve then generate, no grading                       |
//! | `tools`       | agent loop calling tools until the model answers         |
//! | `helpdesk`    | triage, responder and escalation agents in a line        |
//!
//! Every collaborator is a mock from `weft`, so demos run offline.

mod chat;
mod conditional;
mod crag;
mod helpdesk;
mod memory;
mod parallel;
mod rag;
mod review;
mod tools;

use std::sync::Arc;

use serde_json::json;
use weft::{sync_node, CompiledStateGraph, Node, PartialUpdate, StateGraph};

use crate::{Persistence, RunError};

/// Bundled demo graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Demo {
    Parallel,
    Conditional,
    Review,
    Chat,
    Memory,
    Crag,
    Rag,
    Tools,
    Helpdesk,
}

/// User-supplied input for a demo run.
#[derive(Clone, Debug, Default)]
pub struct DemoInput {
    /// Free text: chat message, review topic, question, or helpdesk issue.
    pub text: Option<String>,
    /// Routing key for `conditional`.
    pub which: Option<String>,
}

impl Demo {
    pub fn name(self) -> &'static str {
        match self {
            Demo::Parallel => "parallel",
            Demo::Conditional => "conditional",
            Demo::Review => "review",
            Demo::Chat => "chat",
            Demo::Memory => "memory",
            Demo::Crag => "crag",
            Demo::Rag => "rag",
            Demo::Tools => "tools",
            Demo::Helpdesk => "helpdesk",
        }
    }

    /// Builds the demo graph with the given checkpointer and store.
    pub fn build(self, persistence: &Persistence) -> Result<CompiledStateGraph, RunError> {
        let graph = match self {
            Demo::Parallel => parallel::graph()?,
            Demo::Conditional => conditional::graph()?,
            Demo::Review => review::graph()?,
            Demo::Chat => chat::graph()?,
            Demo::Memory => memory::graph()?,
            Demo::Crag => crag::graph()?,
            Demo::Rag => rag::graph()?,
            Demo::Tools => tools::graph()?,
            Demo::Helpdesk => helpdesk::graph()?,
        };
        Ok(graph
            .with_store(persistence.store.clone())
            .compile_with_checkpointer(persistence.checkpointer.clone())?)
    }

    /// First input of a run.
    pub fn input(self, input: &DemoInput) -> PartialUpdate {
        let text = input.text.as_deref();
        match self {
            Demo::Parallel => parallel::input(),
            Demo::Conditional => conditional::input(input.which.as_deref()),
            Demo::Review => review::input(text),
            Demo::Chat | Demo::Memory => chat::input(text),
            Demo::Crag => crag::input(text),
            Demo::Rag => rag::input(text),
            Demo::Tools => tools::input(text),
            Demo::Helpdesk => helpdesk::input(text),
        }
    }
}

/// Node appending `"I'm <NAME>"` to `aggregate`.
fn announce(name: &str) -> Arc<dyn Node> {
    let line = format!("I'm {}", name.to_uppercase());
    sync_node(move |_, _| {
        Ok(PartialUpdate::new()
            .with("aggregate", json!([line.clone()]))
            .into())
    })
}

fn add_announcers(graph: &mut StateGraph, names: &[&str]) {
    for name in names {
        graph.add_node(*name, announce(name));
    }
}
