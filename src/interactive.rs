//! Interactive prompt: multi-line entries, one running analysis at a time.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

use orchestrator::view::{render_state, RenderOptions};
use orchestrator::{IgnoreReason, RequestOrchestrator, Submission};
use price_client::AnalysisTransport;

const BUSY_NOTICE: &str = "An analysis is already running; please wait for it to finish.";

/// What a completed line of input asks for.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Quit,
    ToggleSources,
    Description(String),
}

/// Accumulates lines into one description. An entry ends at an empty line
/// or a lone `.`; commands are only recognized at the start of an entry.
#[derive(Debug, Default)]
struct EntryReader {
    entry: String,
}

impl EntryReader {
    fn push_line(&mut self, line: &str) -> Option<Input> {
        let trimmed = line.trim();

        if self.entry.is_empty() {
            match trimmed {
                ":quit" | ":q" => return Some(Input::Quit),
                ":sources" => return Some(Input::ToggleSources),
                "" | "." => return None,
                _ => {}
            }
        }

        if trimmed.is_empty() || trimmed == "." {
            return Some(Input::Description(std::mem::take(&mut self.entry)));
        }
        if !self.entry.is_empty() {
            self.entry.push('\n');
        }
        self.entry.push_str(line);
        None
    }

    /// Whatever was typed before EOF without a terminator.
    fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.entry);
        (!rest.trim().is_empty()).then_some(rest)
    }
}

fn report(submission: Submission, show_sources: bool) {
    match submission {
        Submission::Ignored(IgnoreReason::EmptyInput) => {}
        Submission::Ignored(IgnoreReason::AlreadyInFlight) => println!("{}", BUSY_NOTICE),
        Submission::Settled(state) => {
            println!("{}", render_state(&state, RenderOptions { show_sources }));
        }
    }
}

/// Spawn an analysis of `text` unless one is already running. Returns
/// whether a request was started.
fn start_submission<T>(
    orchestrator: &Arc<RequestOrchestrator<T>>,
    running: &mut Option<JoinHandle<Submission>>,
    text: String,
) -> bool
where
    T: AnalysisTransport + 'static,
{
    if running.is_some() {
        println!("{}", BUSY_NOTICE);
        return false;
    }
    let orchestrator = orchestrator.clone();
    *running = Some(tokio::spawn(async move { orchestrator.submit(&text).await }));
    true
}

/// Read descriptions from stdin until `:quit` or EOF. Input keeps being read
/// while a request runs; the running request is awaited before returning.
pub async fn run<T>(orchestrator: Arc<RequestOrchestrator<T>>, mut show_sources: bool) -> Result<()>
where
    T: AnalysisTransport + 'static,
{
    let mut running: Option<JoinHandle<Submission>> = None;
    let mut reader = EntryReader::default();

    println!("Paste the description of the item and finish it with an empty line.");
    println!("Commands: :sources toggles the sources panel, :quit exits.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            joined = async {
                match running.as_mut() {
                    Some(handle) => handle.await,
                    None => std::future::pending().await,
                }
            } => {
                running = None;
                report(joined.context("analysis task failed")?, show_sources);
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match reader.push_line(&line) {
                    Some(Input::Quit) => break,
                    Some(Input::ToggleSources) => {
                        show_sources = !show_sources;
                        let state = orchestrator.state();
                        if state.result().is_some() {
                            println!("{}", render_state(&state, RenderOptions { show_sources }));
                        }
                    }
                    Some(Input::Description(text)) => {
                        start_submission(&orchestrator, &mut running, text);
                    }
                    None => {}
                }
            }
        }
    }

    if let Some(text) = reader.finish() {
        start_submission(&orchestrator, &mut running, text);
    }
    if let Some(handle) = running {
        report(handle.await.context("analysis task failed")?, show_sources);
    }
    Ok(())
}
