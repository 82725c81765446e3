//! Weft CLI binary: run the bundled demo graphs, resume suspended threads,
//! inspect checkpoints, export diagrams.

mod logging;

use std::io::Write;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use weft_cli::{
    parse_resume_value, Demo, DemoInput, DiagramFormat, OutputMode, Persistence, RunError,
    RunOptions,
};
use weft_config::GraphSettings;

const APP_NAME: &str = "weft";

#[derive(Parser, Debug)]
#[command(name = "weft")]
#[command(about = "Weft: run state-graph demos with checkpointed threads")]
struct Args {
    #[command(subcommand)]
    cmd: Command,

    /// Verbose: log steps, node runs, routing and checkpoints to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// SQLite file for checkpoints and the store (default: WEFT_CHECKPOINT_DB or config)
    #[arg(long, value_name = "PATH", global = true)]
    db: Option<std::path::PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start a demo run (a new thread unless --thread names an existing one)
    Run(RunArgs),
    /// Answer the pending interrupt of a thread
    Resume(ResumeArgs),
    /// Show the latest checkpoint of a thread
    State(ThreadArgs),
    /// List the checkpoints of a thread, oldest first
    History(HistoryArgs),
    /// Print a demo's graph as DOT or Mermaid
    Graph(GraphArgs),
}

#[derive(clap::Args, Debug)]
struct StreamArgs {
    /// User id; the memory demo keys stored facts by it
    #[arg(long, value_name = "ID")]
    user: Option<String>,

    /// Events to print
    #[arg(long, value_enum, default_value_t = OutputMode::Values)]
    mode: OutputMode,

    /// Maximum steps for this invocation (default: WEFT_RECURSION_LIMIT, config, or 25)
    #[arg(long, value_name = "N")]
    recursion_limit: Option<usize>,
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    #[arg(value_enum)]
    demo: Demo,

    /// Thread id (generated when absent)
    #[arg(long, value_name = "ID")]
    thread: Option<String>,

    /// Message, topic or question for the demo
    #[arg(short, long, value_name = "TEXT")]
    input: Option<String>,

    /// Routing key for the conditional demo ("bc" or "cd")
    #[arg(long, value_name = "KEY")]
    which: Option<String>,

    #[command(flatten)]
    stream: StreamArgs,
}

#[derive(clap::Args, Debug)]
struct ResumeArgs {
    #[arg(value_enum)]
    demo: Demo,

    #[arg(long, value_name = "ID")]
    thread: String,

    /// Resume value: JSON, or plain text
    value: String,

    #[command(flatten)]
    stream: StreamArgs,
}

#[derive(clap::Args, Debug)]
struct ThreadArgs {
    #[arg(long, value_name = "ID")]
    thread: String,
}

#[derive(clap::Args, Debug)]
struct HistoryArgs {
    #[arg(long, value_name = "ID")]
    thread: String,

    /// Show only the most recent N checkpoints
    #[arg(long, value_name = "N")]
    limit: Option<usize>,
}

#[derive(clap::Args, Debug)]
struct GraphArgs {
    #[arg(value_enum)]
    demo: Demo,

    #[arg(long, value_enum, default_value_t = DiagramFormat::Dot)]
    format: DiagramFormat,
}

fn run_options(thread: Option<String>, stream: StreamArgs, settings: &GraphSettings) -> RunOptions {
    RunOptions {
        thread_id: thread,
        user_id: stream.user,
        mode: stream.mode,
        recursion_limit: stream.recursion_limit.or(settings.recursion_limit),
    }
}

async fn dispatch(args: Args, settings: GraphSettings) -> Result<(), RunError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if let Command::Graph(g) = &args.cmd {
        return weft_cli::graph(g.demo, g.format, &mut out);
    }

    let db = args.db.unwrap_or_else(|| settings.checkpoint_db.clone());
    tracing::debug!(db = %db.display(), "opening persistence");
    let persistence = Persistence::sqlite(&db)?;

    match args.cmd {
        Command::Run(r) => {
            let input = DemoInput {
                text: r.input,
                which: r.which,
            };
            let opts = run_options(r.thread, r.stream, &settings);
            weft_cli::run(r.demo, &input, &opts, &persistence, &mut out).await?;
        }
        Command::Resume(r) => {
            let opts = run_options(Some(r.thread.clone()), r.stream, &settings);
            let value = parse_resume_value(&r.value);
            weft_cli::resume(r.demo, &r.thread, value, &opts, &persistence, &mut out).await?;
        }
        Command::State(t) => weft_cli::state(&t.thread, &persistence, &mut out).await?,
        Command::History(h) => {
            weft_cli::history(&h.thread, h.limit, &persistence, &mut out).await?
        }
        Command::Graph(_) => {}
    }
    out.flush()?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    weft_config::load_and_apply(APP_NAME, None).ok();
    let args = Args::parse();

    let settings = match GraphSettings::resolve(APP_NAME) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("weft: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = logging::init(args.verbose, settings.log_filter.as_deref()) {
        eprintln!("weft: {}", e);
        return ExitCode::FAILURE;
    }

    match dispatch(args, settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("weft: {}", e);
            ExitCode::FAILURE
        }
    }
}
