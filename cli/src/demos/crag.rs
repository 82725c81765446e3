//! Corrective retrieval: retrieve documents for the question, keep the ones a
//! grader finds relevant, and when none survive rewrite the question and fall
//! back to web search before generating the answer.
//!
//! ```text
//! retrieve -> grade_documents -+-> generate -> END
//!                              +-> transform_query -> web_search -> generate
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use weft::{
    Document, InMemoryRetriever, LlmClient, Message, MockLlm, MockToolSource, Node, NodeContext,
    NodeError, NodeOutput, PartialUpdate, Reducer, Retriever, StateGraph, StateSchema,
    StateSnapshot, ToolSource, END, START,
};

use crate::RunError;

const DEFAULT_QUESTION: &str = "Explain how the different types of agent memory work.";
const TOP_K: usize = 4;

fn question(state: &StateSnapshot) -> &str {
    state.get_str("question").unwrap_or_default()
}

fn documents(state: &StateSnapshot) -> Result<Vec<Document>, NodeError> {
    state
        .get_array("documents")
        .iter()
        .map(|v| {
            serde_json::from_value(v.clone())
                .map_err(|e| NodeError::InvalidState(format!("document: {}", e)))
        })
        .collect()
}

fn documents_value(docs: &[Document]) -> Result<Value, NodeError> {
    serde_json::to_value(docs).map_err(|e| NodeError::InvalidState(e.to_string()))
}

pub(super) struct Retrieve {
    pub(super) retriever: Arc<dyn Retriever>,
}

#[async_trait]
impl Node for Retrieve {
    async fn run(&self, state: &StateSnapshot, _ctx: &NodeContext) -> Result<NodeOutput, NodeError> {
        let docs = self.retriever.retrieve(question(state), TOP_K).await?;
        tracing::debug!(count = docs.len(), "retrieved documents");
        Ok(PartialUpdate::new()
            .with("documents", documents_value(&docs)?)
            .into())
    }
}

/// Asks the grader about each document; keeps those answered "yes".
struct GradeDocuments {
    grader: Arc<dyn LlmClient>,
}

#[async_trait]
impl Node for GradeDocuments {
    async fn run(&self, state: &StateSnapshot, _ctx: &NodeContext) -> Result<NodeOutput, NodeError> {
        let mut relevant = Vec::new();
        for doc in documents(state)? {
            let prompt = [
                Message::system("Grade the relevance of the document to the question. Answer yes or no."),
                Message::user(format!("Document: {}\nQuestion: {}", doc.content, question(state))),
            ];
            let grade = self.grader.invoke(&prompt).await?;
            if grade.content.trim().eq_ignore_ascii_case("yes") {
                relevant.push(doc);
            }
        }
        Ok(PartialUpdate::new()
            .with("documents", documents_value(&relevant)?)
            .into())
    }
}

struct TransformQuery {
    llm: Arc<dyn LlmClient>,
}

#[async_trait]
impl Node for TransformQuery {
    async fn run(&self, state: &StateSnapshot, _ctx: &NodeContext) -> Result<NodeOutput, NodeError> {
        let prompt = [
            Message::system("Formulate an improved question for web search."),
            Message::user(question(state)),
        ];
        let better = self.llm.invoke(&prompt).await?;
        Ok(PartialUpdate::new().with("question", better.content).into())
    }
}

/// Appends one document made of the `web_search` tool's result.
struct WebSearch {
    tools: Arc<dyn ToolSource>,
}

#[async_trait]
impl Node for WebSearch {
    async fn run(&self, state: &StateSnapshot, _ctx: &NodeContext) -> Result<NodeOutput, NodeError> {
        let result = self
            .tools
            .call_tool("web_search", json!({ "query": question(state) }))
            .await?;
        let mut docs = documents(state)?;
        docs.push(Document::new("web", result.text));
        Ok(PartialUpdate::new()
            .with("documents", documents_value(&docs)?)
            .into())
    }
}

pub(super) struct Generate {
    pub(super) llm: Arc<dyn LlmClient>,
}

#[async_trait]
impl Node for Generate {
    async fn run(&self, state: &StateSnapshot, _ctx: &NodeContext) -> Result<NodeOutput, NodeError> {
        let context: Vec<String> = documents(state)?.into_iter().map(|d| d.content).collect();
        let prompt = [
            Message::system("Answer the question from the context in three sentences at most."),
            Message::user(format!(
                "Question: {}\nContext: {}",
                question(state),
                context.join("\n")
            )),
        ];
        let answer = self.llm.invoke(&prompt).await?;
        Ok(PartialUpdate::new().with("generation", answer.content).into())
    }
}

fn decide_to_generate(state: &StateSnapshot) -> &'static str {
    if state.get_array("documents").is_empty() {
        "transform_query"
    } else {
        "generate"
    }
}

fn words(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 3)
        .map(str::to_lowercase)
        .collect()
}

/// Mock grader: "yes" when document and question share a word longer than three letters.
fn grade(messages: &[Message]) -> String {
    let body = messages.last().map(Message::content).unwrap_or_default();
    let (doc, question) = body
        .strip_prefix("Document: ")
        .and_then(|rest| rest.split_once("\nQuestion: "))
        .unwrap_or(("", ""));
    let verdict = if words(doc).is_disjoint(&words(question)) {
        "no"
    } else {
        "yes"
    };
    verdict.to_string()
}

pub(super) fn corpus() -> Vec<Document> {
    vec![
        Document::new(
            "memory-short",
            "Short-term memory keeps the agent's working context: the recent conversation inside the model's context window.",
        ),
        Document::new(
            "memory-long",
            "Long-term memory lets an agent recall information across sessions, usually through an external vector store queried at run time.",
        ),
        Document::new(
            "memory-sensory",
            "Sensory memory corresponds to embedding raw inputs such as text or images before they reach the agent.",
        ),
        Document::new(
            "attacks",
            "Adversarial prompts and jailbreaks try to make a language model ignore its safety instructions.",
        ),
    ]
}

/// `question`, `documents` and `generation`, shared with the plain retrieval demo.
pub(super) fn schema() -> Result<StateSchema, RunError> {
    Ok(StateSchema::builder()
        .field_with_default("question", Reducer::LastWins, json!(""))
        .field_with_default("documents", Reducer::LastWins, json!([]))
        .field("generation", Reducer::LastWins)
        .build()?)
}

/// Mock writer: answers with the first line of the context.
pub(super) fn writer() -> Arc<dyn LlmClient> {
    Arc::new(MockLlm::from_fn(|messages| {
        let body = messages.last().map(Message::content).unwrap_or_default();
        let context = body.split_once("\nContext: ").map(|(_, c)| c).unwrap_or_default();
        match context.lines().next() {
            Some(first) if !first.is_empty() => format!("In short: {}", first),
            _ => "I don't know.".to_string(),
        }
    }))
}

pub(super) fn graph() -> Result<StateGraph, RunError> {
    let retriever = Arc::new(InMemoryRetriever::new(corpus()));
    let tools = Arc::new(MockToolSource::new().with_handler("web_search", |args| {
        let query = args.get("query").and_then(Value::as_str).unwrap_or_default();
        Ok(format!("Web result for \"{}\": agents combine short-term and long-term memory.", query))
    }));
    let rewriter = Arc::new(MockLlm::from_fn(|messages| {
        let q = messages.last().map(Message::content).unwrap_or_default();
        format!("{} (agent memory)", q.trim_end_matches('?'))
    }));

    let mut graph = StateGraph::new(schema()?);
    graph
        .add_node("retrieve", Arc::new(Retrieve { retriever }))
        .add_node(
            "grade_documents",
            Arc::new(GradeDocuments {
                grader: Arc::new(MockLlm::from_fn(grade)),
            }),
        )
        .add_node("generate", Arc::new(Generate { llm: writer() }))
        .add_node("transform_query", Arc::new(TransformQuery { llm: rewriter }))
        .add_node("web_search", Arc::new(WebSearch { tools }))
        .add_edge(START, "retrieve")
        .add_edge("retrieve", "grade_documents")
        .add_conditional_edges(
            "grade_documents",
            decide_to_generate,
            ["generate", "transform_query"],
        )
        .add_edge("transform_query", "web_search")
        .add_edge("web_search", "generate")
        .add_edge("generate", END);
    Ok(graph)
}

pub(super) fn input(question: Option<&str>) -> PartialUpdate {
    PartialUpdate::new().with("question", question.unwrap_or(DEFAULT_QUESTION))
}
