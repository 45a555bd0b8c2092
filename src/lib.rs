//! # askgpt
//! Ask GPT from the command line, with a short memory of what you just asked.
//!
//! A command line program that forwards a prompt to the OpenAI API, prints the answer and
//! appends the exchange to a JSON log. Questions asked within the last five minutes are replayed
//! as conversation context, so follow-up questions work.
//!
//! ## Usage
//! ```shell
//! $ askgpt ask what is the capital of France
//! $ askgpt a and of Germany?
//! $ cargo build 2>&1 | askgpt ask why does this fail
//! $ askgpt history -n 3
//! ```
//!
//! ## Environment Variables:
//! - `OPENAI_API_KEY`: Required for `ask`. May also be set in a `.env` file.
//! - `ASKGPT_LLM`: Optional. The model to use (default: gpt-4o-mini, also valid: gpt-4o, gpt-3.5-turbo, gpt-3.5-turbo-instruct)
//! - `ASKGPT_LOG`: Optional. The log file (default: `~/.askgpt/log.json`).
//! - `ASKGPT_API_BASE`: Optional. Base URL of an OpenAI compatible API.
//! - `ASKGPT_TEMPERATURE`, `ASKGPT_MAX_TOKENS`: Optional. Sampling temperature (default 0.6) and reply length limit (default 256).
//! - `ASKGPT_SYSTEM`: Optional. The system instruction sent with every question.
//!
//! ## Notes:
//! - Answers cut off by the token limit end in `...`.
//! - The log is never pruned. Delete it to forget.
//!
pub mod cli;
pub mod config;
pub mod context;
pub mod errors;
pub mod history;
pub mod openai;
pub mod response;
pub mod session;
