//! CLI domain: parse, route, output, and presentation only.
//! No domain orchestration; single route table dispatches to domain services.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::{map_error, CommandOutput};
pub use parse::{Cli, Commands};
pub use presentation::{format_fingerprint_text, format_verify_json, format_verify_text};
pub use route::RunContext;
