use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::task::{Priority, TaskDraft};

#[derive(Debug, Clone)]
pub struct PreprocessedArgs {
    pub cleaned_args: Vec<OsString>,
    pub rc_overrides: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "taskpop",
    version,
    about = "Manage the taskpop to-do collection from the command line",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append,
        global = true
    )]
    pub rc_overrides: Vec<KeyVal>,

    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// JSON file holding the key-value area.
    #[arg(long = "data", global = true)]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a task.
    Add {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "", value_parser = parse_priority_code)]
        priority: String,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long, default_value = "")]
        attachment: String,
        #[arg(long = "due", default_value = "")]
        due_date: String,
    },
    /// List tasks, optionally filtered by category and priority.
    List {
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long, default_value = "", value_parser = parse_priority_code)]
        priority: String,
    },
    /// Mark a task completed.
    Done { id: u64 },
    /// Mark a task not completed.
    Undone { id: u64 },
    /// Delete a task.
    Delete { id: u64 },
    /// Print the stored collection as JSON.
    Export,
    /// Replace the stored collection with a JSON array of tasks.
    Import { file: PathBuf },
}

impl Command {
    pub fn into_draft(self) -> Option<TaskDraft> {
        match self {
            Command::Add {
                text,
                description,
                priority,
                category,
                attachment,
                due_date,
            } => Some(TaskDraft {
                text: text.join(" "),
                description,
                priority,
                category,
                attachment,
                due_date,
            }),
            _ => None,
        }
    }
}

/// Accepts "", "1".."3", or the names low/medium/high.
pub fn parse_priority_code(raw: &str) -> anyhow::Result<String> {
    if raw.is_empty() {
        return Ok(String::new());
    }
    if let Some(priority) = Priority::from_code(raw) {
        return Ok(priority.code().to_string());
    }
    Priority::ALL
        .into_iter()
        .find(|p| p.name().eq_ignore_ascii_case(raw))
        .map(|p| p.code().to_string())
        .ok_or_else(|| anyhow!("invalid priority {raw:?}; expected 1, 2, 3, low, medium or high"))
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

/// Pulls positional `rc.key=value` (or `rc.key:value`) arguments out before
/// clap sees them.
#[tracing::instrument(skip_all)]
pub fn preprocess_args(raw: &[OsString]) -> anyhow::Result<PreprocessedArgs> {
    let mut cleaned = Vec::with_capacity(raw.len());
    let mut overrides: Vec<(String, String)> = Vec::new();

    let mut iter = raw.iter().cloned();
    if let Some(bin) = iter.next() {
        cleaned.push(bin);
    }

    for arg in iter {
        let s = arg.to_string_lossy();
        if let Some(rest) = s.strip_prefix("rc.") {
            let parsed = if let Some((k, v)) = rest.split_once('=') {
                Some((format!("rc.{k}"), v.to_string()))
            } else if let Some((k, v)) = rest.split_once(':') {
                Some((format!("rc.{k}"), v.to_string()))
            } else {
                None
            };

            if let Some((k, v)) = parsed {
                debug!(key = %k, value = %v, "captured positional rc override");
                overrides.push((k, v));
                continue;
            }
        }

        cleaned.push(arg);
    }

    Ok(PreprocessedArgs {
        cleaned_args: cleaned,
        rc_overrides: overrides,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn positional_rc_overrides_are_extracted() {
        let pre = preprocess_args(&os(&[
            "taskpop",
            "rc.storage.key=todo",
            "list",
            "rc.color:off",
        ]))
        .expect("preprocess");

        assert_eq!(pre.cleaned_args, os(&["taskpop", "list"]));
        assert_eq!(
            pre.rc_overrides,
            vec![
                ("rc.storage.key".to_string(), "todo".to_string()),
                ("rc.color".to_string(), "off".to_string()),
            ]
        );
    }

    #[test]
    fn add_collects_words_and_normalizes_priority() {
        let cli = GlobalCli::try_parse_from([
            "taskpop",
            "-vv",
            "add",
            "Buy",
            "milk",
            "--priority",
            "medium",
            "--category",
            "errand",
        ])
        .expect("parse");

        assert_eq!(cli.verbose, 2);
        let draft = cli
            .command
            .expect("subcommand")
            .into_draft()
            .expect("add builds a draft");
        assert_eq!(draft.text, "Buy milk");
        assert_eq!(draft.priority, "2");
        assert_eq!(draft.category, "errand");
        assert_eq!(draft.due_date, "");
    }

    #[test]
    fn unknown_priority_is_rejected() {
        assert!(GlobalCli::try_parse_from(["taskpop", "list", "--priority", "urgent"]).is_err());
        assert_eq!(parse_priority_code("3").expect("code"), "3");
        assert_eq!(parse_priority_code("").expect("empty"), "");
    }

    #[test]
    fn rc_flag_parses_key_value() {
        let cli = GlobalCli::try_parse_from(["taskpop", "--rc", "color = off", "export"])
            .expect("parse");
        assert_eq!(cli.rc_overrides.len(), 1);
        assert_eq!(cli.rc_overrides[0].key, "color");
        assert_eq!(cli.rc_overrides[0].value, "off");
        assert_eq!(cli.command, Some(Command::Export));
    }
}
