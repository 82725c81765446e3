//! Helpdesk agents in a line: triage picks a category, the responder drafts
//! an answer for that category, escalation decides whether a manager takes
//! over. `final_answer` holds what the user gets.

use std::sync::Arc;

use async_trait::async_trait;
use weft::{
    LlmClient, Message, MockLlm, Node, NodeContext, NodeError, NodeOutput, PartialUpdate,
    Reducer, StateGraph, StateSchema, StateSnapshot, END, START,
};

use crate::RunError;

const DEFAULT_ISSUE: &str = "I was charged twice for my subscription this month.";
const ESCALATED: &str = "Escalated to human manager.";

fn field<'a>(state: &'a StateSnapshot, name: &str) -> &'a str {
    state.get_str(name).unwrap_or_default()
}

struct Triage {
    llm: Arc<dyn LlmClient>,
}

#[async_trait]
impl Node for Triage {
    async fn run(&self, state: &StateSnapshot, _ctx: &NodeContext) -> Result<NodeOutput, NodeError> {
        let prompt = [Message::user(format!(
            "Categorize the user issue below as one of [Billing, Technical, General].\n\nIssue: {}\nCategory:",
            field(state, "input")
        ))];
        let category = self.llm.invoke(&prompt).await?.content.trim().to_string();
        tracing::debug!(category = %category, "triaged");
        Ok(PartialUpdate::new().with("category", category).into())
    }
}

struct Responder {
    llm: Arc<dyn LlmClient>,
}

#[async_trait]
impl Node for Responder {
    async fn run(&self, state: &StateSnapshot, _ctx: &NodeContext) -> Result<NodeOutput, NodeError> {
        let prompt = [
            Message::system(format!(
                "You are a helpdesk responder specialized in {} issues.",
                field(state, "category")
            )),
            Message::user(format!("Complaint: {}", field(state, "input"))),
        ];
        let response = self.llm.invoke(&prompt).await?.content.trim().to_string();
        Ok(PartialUpdate::new().with("response", response).into())
    }
}

struct Escalation {
    llm: Arc<dyn LlmClient>,
}

#[async_trait]
impl Node for Escalation {
    async fn run(&self, state: &StateSnapshot, _ctx: &NodeContext) -> Result<NodeOutput, NodeError> {
        let response = field(state, "response");
        let prompt = [Message::user(format!(
            "Review the following draft response and determine if it should be escalated to a manager.\n\nResponse:\n{}\n\nIf it sounds uncertain or controversial, say YES.\nElse, say NO.\nAnswer:",
            response
        ))];
        let verdict = self.llm.invoke(&prompt).await?.content.trim().to_lowercase();
        let escalate = verdict.starts_with("yes");
        let final_answer = if escalate { ESCALATED } else { response };
        Ok(PartialUpdate::new()
            .with("escalate", escalate)
            .with("final_answer", final_answer)
            .into())
    }
}

fn contains_any(text: &str, words: &[&str]) -> bool {
    let text = text.to_lowercase();
    words.iter().any(|w| text.contains(w))
}

/// Mock model covering the three prompts above.
fn reply(messages: &[Message]) -> String {
    let body = messages.last().map(Message::content).unwrap_or_default();
    if let Some(issue) = body.split_once("Issue: ").map(|(_, rest)| rest) {
        let category = if contains_any(issue, &["charge", "invoice", "refund", "bill", "payment"]) {
            "Billing"
        } else if contains_any(issue, &["error", "crash", "bug", "login", "install"]) {
            "Technical"
        } else {
            "General"
        };
        return category.to_string();
    }
    if let Some(draft) = body.split_once("Response:\n").map(|(_, rest)| rest) {
        let controversial = contains_any(draft, &["lawyer", "legal", "not sure"]);
        let verdict = if controversial { "YES" } else { "NO" };
        return verdict.to_string();
    }
    let category = messages
        .first()
        .map(Message::content)
        .and_then(|s| s.strip_prefix("You are a helpdesk responder specialized in "))
        .and_then(|s| s.split_once(' '))
        .map(|(c, _)| c)
        .unwrap_or("General");
    let complaint = body.strip_prefix("Complaint: ").unwrap_or(body);
    format!(
        "Thanks for contacting {} support about \"{}\". We are looking into it and will follow up within one business day.",
        category, complaint
    )
}

pub(super) fn graph() -> Result<StateGraph, RunError> {
    let schema = StateSchema::builder()
        .field("input", Reducer::LastWins)
        .field("category", Reducer::LastWins)
        .field("response", Reducer::LastWins)
        .field("escalate", Reducer::LastWins)
        .field("final_answer", Reducer::LastWins)
        .build()?;
    let llm: Arc<dyn LlmClient> = Arc::new(MockLlm::from_fn(reply));
    let mut graph = StateGraph::new(schema);
    graph
        .add_node("triage", Arc::new(Triage { llm: llm.clone() }))
        .add_node("responder", Arc::new(Responder { llm: llm.clone() }))
        .add_node("escalation", Arc::new(Escalation { llm }))
        .add_edge(START, "triage")
        .add_edge("triage", "responder")
        .add_edge("responder", "escalation")
        .add_edge("escalation", END);
    Ok(graph)
}

pub(super) fn input(issue: Option<&str>) -> PartialUpdate {
    PartialUpdate::new().with("input", issue.unwrap_or(DEFAULT_ISSUE))
}
