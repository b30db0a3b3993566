use clap::Parser;
use std::collections::VecDeque;
use std::fs;
use std::io::{self, Write};
use std::time::Duration;
use tejun::prelude::*;
use tracing_subscriber::EnvFilter;

/// Runs guided workflows in the terminal
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory of workflow JSON documents
    workflows_dir: Option<String>,
    /// UID, alias or name of the workflow to start
    workflow: Option<String>,

    /// Optional TOML engine config
    #[arg(short, long)]
    config: Option<String>,

    /// Username seeded into the session
    #[arg(short, long)]
    username: Option<String>,

    /// File with one response per line, used instead of prompting
    #[arg(short, long)]
    script: Option<String>,

    /// Run in interactive mode to be prompted for inputs
    #[arg(short = 'i', long, help = "Run in interactive 'human' mode")]
    human: bool,
}

struct RunOptions {
    workflows_dir: String,
    workflow: String,
    config_path: Option<String>,
    username: Option<String>,
    script: Option<VecDeque<String>>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.human {
        run_interactive(cli).await;
    } else {
        run_non_interactive(cli).await;
    }
}

/// Runs the CLI in non-interactive mode, taking all arguments from the command line.
async fn run_non_interactive(cli: Cli) {
    let workflows_dir = cli.workflows_dir.unwrap_or_else(|| {
        exit_with_error("Workflow directory is required in non-interactive mode.");
    });
    let workflow = cli.workflow.unwrap_or_else(|| {
        exit_with_error("Workflow id is required in non-interactive mode.");
    });
    let script = cli.script.map(|path| load_script(&path));

    run_workflow(RunOptions {
        workflows_dir,
        workflow,
        config_path: cli.config,
        username: cli.username,
        script,
    })
    .await;
}

/// Runs the CLI in an interactive, human-friendly mode with prompts.
async fn run_interactive(cli: Cli) {
    println!("--- Tejun Interactive Mode ---");

    let workflows_dir = match cli.workflows_dir {
        Some(dir) => dir,
        None => prompt_for_input("Enter workflow directory", Some("workflows")),
    };
    let workflow = match cli.workflow {
        Some(id) => id,
        None => prompt_for_input("Enter workflow id", None),
    };
    let config_path = match cli.config {
        Some(path) => Some(path),
        None => Some(prompt_for_input("Enter config path (optional)", Some("")))
            .filter(|path| !path.is_empty()),
    };

    run_workflow(RunOptions {
        workflows_dir,
        workflow,
        config_path,
        username: cli.username,
        script: None,
    })
    .await;
}

async fn run_workflow(options: RunOptions) {
    let config = match &options.config_path {
        Some(path) => EngineConfig::from_file(Path::new(path))
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load config: {}", e))),
        None => EngineConfig::default(),
    };
    let catalog = CatalogResolver::from_dir(Path::new(&options.workflows_dir))
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load workflows: {}", e)));
    println!(
        "Loaded {} workflow(s) from '{}'",
        catalog.len(),
        options.workflows_dir
    );

    let pace = Duration::from_millis(config.pace_ms);
    let mut script = options.script;
    let mut session = Session::new(config);
    session.start_session(SystemContext {
        interaction_id: None,
        username: options.username,
    });

    let mut state = session
        .start_workflow(&catalog, &options.workflow)
        .await
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to start workflow: {}", e)));

    loop {
        if !show_events(&mut session, pace).await {
            println!("\nInteraction ended.");
            return;
        }

        if session.is_confirmation_pending() {
            let reply = next_input(&mut script, "End the interaction? [y/N]");
            let confirmed = matches!(reply.to_ascii_lowercase().as_str(), "y" | "yes");
            state = session.confirm_end_interaction(confirmed);
            continue;
        }

        match state {
            EngineState::Blocked { row } => {
                let input = next_input(&mut script, "Your response");
                match respond(&mut session, row, &input) {
                    Ok(_) => state = session.drive(&catalog).await,
                    Err(e) => println!("  ! {}", e),
                }
            }
            EngineState::Suspended { .. } | EngineState::Advancing => {
                state = session.drive(&catalog).await;
            }
            EngineState::Idle => break,
        }
    }

    println!("\nWorkflow finished.");
    let notes = session.notes().text();
    if !notes.is_empty() {
        println!("\n--- Notes ---");
        println!("{}", notes);
    }
}

/// Prints queued events, pausing `pace` before each new row. Returns false
/// once the consumer has been told to navigate away.
async fn show_events(session: &mut Session, pace: Duration) -> bool {
    for event in session.drain_events() {
        match event {
            SessionEvent::RowAdded(id) => {
                if !pace.is_zero() {
                    tokio::time::sleep(pace).await;
                }
                if let Some(row) = session.row(id) {
                    println!("{}", TranscriptFormatter::format_row(session, row));
                }
            }
            SessionEvent::RowsRetracted(ids) => println!("  ~ {} row(s) withdrawn", ids.len()),
            SessionEvent::NotesAppended(note) => println!("  + note: {}", note),
            SessionEvent::WorkflowLoaded { name, depth } if depth > 0 => {
                println!("\n== {} (level {}) ==", name, depth)
            }
            SessionEvent::WorkflowLoaded { name, .. } => println!("\n== {} ==", name),
            SessionEvent::WorkflowResumed { name } => println!("\n== back to {} ==", name),
            SessionEvent::WorkflowEnded { name } => println!("\n== {} ended ==", name),
            SessionEvent::LoadSkipped { name, reason } => {
                println!("  ! skipped '{}': {}", name, reason)
            }
            SessionEvent::ConfirmationRequested => {}
            SessionEvent::NavigateAway => return false,
        }
    }
    true
}

/// Answers a Question by number, GUID or text, or offers a Collect value.
fn respond(
    session: &mut Session,
    row: RowId,
    input: &str,
) -> std::result::Result<EngineState, InputError> {
    let Some(kind) = session.row(row).map(|r| r.step.kind.label()) else {
        return Err(InputError::UnknownRow(row));
    };
    if kind != "Question" {
        return session.collect_value(row, input);
    }

    let offered = session.available_answers(row)?;
    let chosen = input
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| offered.get(i))
        .or_else(|| {
            offered.iter().find(|answer| {
                answer.guid.eq_ignore_ascii_case(input) || answer.text.eq_ignore_ascii_case(input)
            })
        })
        .map(|answer| answer.guid.clone())
        .unwrap_or_else(|| input.to_string());
    session.answer_question(row, &chosen)
}

fn next_input(script: &mut Option<VecDeque<String>>, prompt: &str) -> String {
    match script {
        Some(lines) => {
            let line = lines.pop_front().unwrap_or_else(|| {
                exit_with_error("Script ran out of responses while the workflow was waiting.")
            });
            println!("> {}: {}", prompt, line);
            line
        }
        None => prompt_for_input(prompt, None),
    }
}

fn load_script(path: &str) -> VecDeque<String> {
    fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read script '{}': {}", path, e)))
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// A helper function to prompt the user and read a line of input.
fn prompt_for_input(prompt_text: &str, default: Option<&str>) -> String {
    let mut line = String::new();
    let default_prompt = default
        .filter(|d| !d.is_empty())
        .map_or("".to_string(), |d| format!(" [default: {}]", d));

    print!("> {}{}: ", prompt_text, default_prompt);
    io::stdout().flush().unwrap();

    io::stdin()
        .read_line(&mut line)
        .expect("Failed to read line");
    let trimmed = line.trim().to_string();

    if trimmed.is_empty() {
        default.unwrap_or("").to_string()
    } else {
        trimmed
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
