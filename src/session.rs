//! Components to ask a question with recent history as context, and to look back at the log.

use std::io::{self, Read};
use std::os::fd::AsRawFd;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::cli::AskArgs;
use crate::config::Settings;
use crate::context::build_context;
use crate::errors::AskError;
use crate::history::{JsonFileLog, LogEntry, LogStore};
use crate::openai::{Completer, OpenAiClient};
use crate::response::normalize;

/// What one `ask` cycle should do besides asking
#[derive(Debug, Clone, Copy)]
pub struct AskOptions {
    /// Replay recent turns from the log.
    pub use_context: bool,
    /// Append the new turn to the log.
    pub persist: bool,
}

impl Default for AskOptions {
    fn default() -> Self {
        AskOptions {
            use_context: true,
            persist: true,
        }
    }
}

/// One question/answer cycle: read the log, ask, record.
///
/// `now` is used both for the conversation cutoff and as the entry timestamp
/// when the API does not report one.
pub fn ask<C: Completer, L: LogStore>(
    completer: &C,
    log: &mut L,
    prompt: &str,
    options: AskOptions,
    now: DateTime<Utc>,
) -> Result<String, AskError> {
    let past = if options.use_context {
        build_context(&log.read(), now)
    } else {
        Vec::new()
    };
    debug!(turns = past.len() / 2, "conversation context");

    let response = completer.complete(prompt, past)?;
    let answer = normalize(Some(&response));

    if options.persist {
        log.append(LogEntry::from_response(prompt, response, now))?;
        info!("logged answer");
    }
    Ok(answer)
}

/// Join the prompt words, appending anything piped through stdin
fn read_prompt(words: Vec<String>) -> Result<String, AskError> {
    let mut prompt = words.join(" ");
    let stdin_fileno = io::stdin().as_raw_fd();
    if !nix::unistd::isatty(stdin_fileno).unwrap_or(false) {
        let mut piped_input = String::new();
        io::stdin().read_to_string(&mut piped_input)?;
        prompt = join_piped(&prompt, &piped_input);
    }
    if prompt.trim().is_empty() {
        return Err(AskError::EmptyPrompt);
    }
    Ok(prompt)
}

fn join_piped(prompt: &str, piped: &str) -> String {
    let piped = piped.trim_end();
    match (prompt.is_empty(), piped.is_empty()) {
        (_, true) => prompt.to_string(),
        (true, false) => piped.to_string(),
        (false, false) => format!("{}\n\n{}", prompt, piped),
    }
}

/// Ask a question and print the answer
pub fn run_ask(words: Vec<String>, args: AskArgs) -> Result<(), AskError> {
    let settings = Settings::from_env()?.with_args(&args);
    let prompt = read_prompt(words)?;
    let client = OpenAiClient::new(&settings)?;
    let mut log = JsonFileLog::new(&settings.log_path);
    let options = AskOptions {
        use_context: !args.no_context,
        persist: !args.no_log,
    };

    let answer = ask(&client, &mut log, &prompt, options, Utc::now())?;
    println!("{}", answer);
    Ok(())
}

/// Render the last `limit` entries, oldest first
fn format_history(entries: &[LogEntry], limit: usize) -> String {
    let skip = entries.len().saturating_sub(limit);
    entries[skip..]
        .iter()
        .map(|entry| {
            let when = DateTime::from_timestamp(entry.created, 0)
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default();
            format!("[{}] > {}\n{}\n", when, entry.prompt, entry.display_text())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Print the most recent log entries
pub fn run_history(log: Option<std::path::PathBuf>, limit: usize) -> Result<(), AskError> {
    let path = match log {
        Some(path) => path,
        None => Settings::from_env()?.log_path,
    };
    let entries = JsonFileLog::new(&path).read();
    if entries.is_empty() {
        println!("No questions logged in {} yet.", path.display());
        return Ok(());
    }
    print!("{}", format_history(&entries, limit));
    Ok(())
}
