use std::{
    fmt::{self, Display},
    path::PathBuf,
    str::FromStr,
};

use clap::{Parser, Subcommand};

/// The default model to use for questions.
pub const DEFAULT_LLM: Model = Model::Gpt4oMini;
/// The default system instruction sent after the conversation.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant answering questions asked from a terminal. \
Answer concisely, in plain text without markdown.";
/// Number of log entries shown by `history` when no limit is given.
pub const DEFAULT_HISTORY_LIMIT: usize = 5;

/// Which API endpoint a model is served from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Chat,
    Completions,
}

/// Various models supported by askgpt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Model {
    Gpt4o,
    Gpt4oMini,
    Gpt35Turbo,
    Gpt35TurboInstruct,
}

impl Model {
    pub fn all_models() -> Vec<String> {
        [
            Model::Gpt4o,
            Model::Gpt4oMini,
            Model::Gpt35Turbo,
            Model::Gpt35TurboInstruct,
        ]
        .iter()
        .map(|m| m.to_string())
        .collect()
    }

    pub fn endpoint(&self) -> Endpoint {
        match self {
            Model::Gpt35TurboInstruct => Endpoint::Completions,
            _ => Endpoint::Chat,
        }
    }
}

impl FromStr for Model {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gpt-4o" => Ok(Model::Gpt4o),
            "gpt4o" => Ok(Model::Gpt4o),
            "gpt-4o-mini" => Ok(Model::Gpt4oMini),
            "gpt4o-mini" => Ok(Model::Gpt4oMini),
            "gpt-3.5-turbo" => Ok(Model::Gpt35Turbo),
            "gpt-3.5-turbo-instruct" => Ok(Model::Gpt35TurboInstruct),
            _ => Err(format!(
                "Invalid model: {}. Choose from: {}.",
                s,
                Model::all_models().join(", ")
            )),
        }
    }
}

impl Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::Gpt4o => write!(f, "gpt-4o"),
            Model::Gpt4oMini => write!(f, "gpt-4o-mini"),
            Model::Gpt35Turbo => write!(f, "gpt-3.5-turbo"),
            Model::Gpt35TurboInstruct => write!(f, "gpt-3.5-turbo-instruct"),
        }
    }
}

/// CLI for `askgpt`
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

/// askgpt subcommands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Asks GPT a question. Questions and answers from the last few
    /// minutes are sent along as conversation context. Anything piped
    /// through stdin is appended to the prompt.
    #[command(alias = "a")]
    Ask {
        prompt: Vec<String>,
        #[command(flatten)]
        options: AskArgs,
    },
    /// Shows the most recent questions and answers from the log.
    #[command(alias = "h")]
    History {
        #[arg(short, long)]
        log: Option<PathBuf>,
        #[arg(short = 'n', long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: usize,
    },
}

/// Flags for `ask`, each overriding the matching `ASKGPT_*` env var
#[derive(Debug, Clone, Default, clap::Args)]
pub struct AskArgs {
    #[arg(short, long)]
    pub model: Option<Model>,
    #[arg(short, long)]
    pub log: Option<PathBuf>,
    #[arg(short, long)]
    pub temperature: Option<f32>,
    #[arg(long)]
    pub max_tokens: Option<u32>,
    /// Do not send recent questions as context
    #[arg(long)]
    pub no_context: bool,
    /// Do not write this question to the log
    #[arg(long)]
    pub no_log: bool,
}
