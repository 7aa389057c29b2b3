use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::commands;
use crate::config::Config;

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
    name = "taskflow",
    version,
    about = "TaskFlow: project and task dashboard on the command line",
    disable_help_subcommand = true,
    arg_required_else_help = false
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,

    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append
    )]
    pub rc_overrides: Vec<KeyVal>,

    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    #[arg(long = "data")]
    pub data: Option<PathBuf>,

    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub rest: Vec<OsString>,
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
        .with_target(true)
        .with_level(true)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

/// `rc.key=value` tokens anywhere on the line become config overrides, the
/// rest stays positional.
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
        if let Some(rest) = s.strip_prefix("rc.")
            && let Some((k, v)) = rest.split_once('=')
        {
            debug!(key = %k, value = %v, "captured positional rc override");
            overrides.push((format!("rc.{k}"), v.to_string()));
            continue;
        }

        cleaned.push(arg);
    }

    Ok(PreprocessedArgs {
        cleaned_args: cleaned,
        rc_overrides: overrides,
    })
}

/// A parsed command line: the scope (entity or standalone command), the
/// action within that scope, and whatever trailing arguments remain.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub scope: String,
    pub action: String,
    pub args: Vec<String>,
}

impl Invocation {
    #[tracing::instrument(skip(cfg, rest))]
    pub fn parse(cfg: &Config, rest: Vec<OsString>) -> anyhow::Result<Self> {
        let tokens: Vec<String> = rest
            .into_iter()
            .map(|arg| arg.to_string_lossy().to_string())
            .collect();

        if tokens.is_empty() {
            let scope = cfg
                .get("default.command")
                .unwrap_or_else(|| "overview".to_string());
            let action = if commands::known_actions(&scope).is_empty() {
                String::new()
            } else {
                commands::default_action(&scope).to_string()
            };
            debug!(scope = %scope, "no explicit command, using default");
            return Ok(Self {
                scope,
                action,
                args: vec![],
            });
        }

        let scopes = commands::known_scopes();
        let scope = commands::expand_command_abbrev(&tokens[0], &scopes)
            .ok_or_else(|| anyhow!("unknown command: {}", tokens[0]))?
            .to_string();

        let actions = commands::known_actions(&scope);
        if actions.is_empty() {
            // standalone command; everything after it is arguments
            return Ok(Self {
                scope,
                action: String::new(),
                args: tokens[1..].to_vec(),
            });
        }

        let (action, args) = match tokens.get(1) {
            Some(token) => {
                let action = commands::expand_command_abbrev(token, &actions)
                    .ok_or_else(|| anyhow!("unknown {scope} action: {token}"))?;
                (action.to_string(), tokens[2..].to_vec())
            }
            None => (commands::default_action(&scope).to_string(), vec![]),
        };

        debug!(scope = %scope, action = %action, args = args.len(), "resolved invocation");
        Ok(Self {
            scope,
            action,
            args,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use super::Invocation;
    use crate::config::Config;

    fn cfg() -> Config {
        // /dev/null rc keeps the test hermetic
        unsafe { std::env::set_var("TASKFLOWRC", "/dev/null") };
        Config::load(None).expect("load config")
    }

    fn tokens(parts: &[&str]) -> Vec<OsString> {
        parts.iter().map(OsString::from).collect()
    }

    #[test]
    fn empty_invocation_falls_back_to_default_command() {
        let inv = Invocation::parse(&cfg(), vec![]).expect("parse");
        assert_eq!(inv.scope, "overview");
        assert!(inv.args.is_empty());
    }

    #[test]
    fn scope_and_action_support_unambiguous_prefixes() {
        let inv =
            Invocation::parse(&cfg(), tokens(&["proj", "li", "status:active"])).expect("parse");
        assert_eq!(inv.scope, "project");
        assert_eq!(inv.action, "list");
        assert_eq!(inv.args, vec!["status:active".to_string()]);
    }

    #[test]
    fn missing_action_uses_the_scope_default() {
        let inv = Invocation::parse(&cfg(), tokens(&["inbox"])).expect("parse");
        assert_eq!(inv.scope, "inbox");
        assert_eq!(inv.action, "list");
    }

    #[test]
    fn ambiguous_prefix_is_rejected() {
        // "d" could be delete or duplicate
        assert!(Invocation::parse(&cfg(), tokens(&["project", "d", "x"])).is_err());
    }

    #[test]
    fn standalone_commands_take_raw_args() {
        let inv = Invocation::parse(&cfg(), tokens(&["search", "mobile", "app"])).expect("parse");
        assert_eq!(inv.scope, "search");
        assert!(inv.action.is_empty());
        assert_eq!(inv.args, vec!["mobile".to_string(), "app".to_string()]);
    }
}
