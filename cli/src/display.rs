//! Text rendering of stream events and checkpoints.

use std::io::{self, Write};

use weft::{Checkpoint, StreamEvent};

/// Longest state preview in one history line.
const PREVIEW_LEN: usize = 80;

/// Truncates a string to at most `max` chars; appends "..." when truncated. UTF-8 safe.
pub(crate) fn truncate_display(s: &str, max: usize) -> String {
    const SUFFIX: &str = "...";
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max <= SUFFIX.len() {
        return s.chars().take(max).collect();
    }
    let head: String = s.chars().take(max - SUFFIX.len()).collect();
    format!("{}{}", head, SUFFIX)
}

pub(crate) fn write_event(out: &mut impl Write, event: &StreamEvent) -> io::Result<()> {
    match event {
        StreamEvent::Values(state) => writeln!(out, "values: {}", state.to_value()),
        StreamEvent::Updates { node, update } => {
            writeln!(out, "update [{}]: {}", node, update.to_value())
        }
        StreamEvent::Checkpoint(cp) => writeln!(
            out,
            "checkpoint: step {} next {:?} ({})",
            cp.step, cp.next, cp.checkpoint_id
        ),
        StreamEvent::Interrupt(interrupts) => {
            for interrupt in interrupts {
                writeln!(out, "interrupted at {}: {}", interrupt.node, interrupt.value)?;
            }
            Ok(())
        }
    }
}

fn status(cp: &Checkpoint) -> &'static str {
    if cp.is_interrupted() {
        "interrupted"
    } else if cp.is_done() {
        "done"
    } else {
        "pending"
    }
}

/// Full view of one checkpoint: header, next nodes, interrupts, pretty state.
pub(crate) fn write_checkpoint(out: &mut impl Write, cp: &Checkpoint) -> io::Result<()> {
    writeln!(out, "thread: {}", cp.thread_id)?;
    writeln!(out, "step: {} ({:?}, {})", cp.step, cp.source, status(cp))?;
    writeln!(out, "checkpoint: {} at {}", cp.id, cp.ts)?;
    writeln!(out, "next: {:?}", cp.next)?;
    for interrupt in &cp.interrupts {
        writeln!(out, "interrupt [{}]: {}", interrupt.node, interrupt.value)?;
    }
    for write in &cp.pending_writes {
        writeln!(out, "pending write [{}]: {}", write.node, write.update.to_value())?;
    }
    let pretty = serde_json::to_string_pretty(&cp.state.to_value())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(out, "state: {}", pretty)
}

/// One line per checkpoint for `history`.
pub(crate) fn write_history_line(out: &mut impl Write, cp: &Checkpoint) -> io::Result<()> {
    writeln!(
        out,
        "{:>4}  {:<11} next={:?}  {}",
        cp.step,
        status(cp),
        cp.next,
        truncate_display(&cp.state.to_value().to_string(), PREVIEW_LEN)
    )
}
