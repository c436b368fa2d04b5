use std::{
    borrow::Cow,
    fmt,
    io::{self, BufRead},
};

use clap::Parser;
use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::{ValidationContext, ValidationResult, Validator},
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};
use shell_words::split;

use crate::utils::build_info;

use super::output;
use super::shell_context::{CliMode, ShellContext};
use super::CliError;

const SCRIPT_ENV: &str = "FINTRACK_CLI_SCRIPT";
const DEFAULT_USER_ID: i64 = 1;
const SHELL_COMMANDS: [&str; 6] = ["tap", "menu", "help", "version", "exit", "quit"];

/// Command-line arguments of `fintrack_cli`.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "fintrack_cli")]
#[command(about = "Personal income and expense ledger")]
#[command(version)]
pub struct CliArgs {
    /// Ledger user the session acts as
    #[arg(long = "user", default_value_t = DEFAULT_USER_ID)]
    pub user_id: i64,

    /// Display name sent with every message
    #[arg(long = "name")]
    pub username: Option<String>,
}

enum LoopControl {
    Continue,
    Exit,
}

pub fn run_cli(args: CliArgs) -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        colored::control::set_override(false);
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode, &args)?;
    context.send_message("/start")?;

    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context),
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<CommandHelper, DefaultHistory>::new()?;
    editor.set_helper(Some(CommandHelper::new()));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);

    while context.running {
        match editor.readline(&context.prompt()) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                editor.add_history_entry(trimmed).ok();
                match handle_line(context, trimmed) {
                    Ok(LoopControl::Continue) => {}
                    Ok(LoopControl::Exit) => break,
                    Err(err) => output::error(err),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                output::info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        if !context.running {
            break;
        }
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match handle_line(context, trimmed) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => output::error(err),
        }
    }
    Ok(())
}

/// Shell keywords are handled locally; every other line is a chat message.
fn handle_line(context: &mut ShellContext, line: &str) -> Result<LoopControl, CliError> {
    let keyword = line
        .split_whitespace()
        .next()
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !SHELL_COMMANDS.contains(&keyword.as_str()) {
        context.send_message(line)?;
        return Ok(LoopControl::Continue);
    }

    let tokens = parse_command_line(line).map_err(|err| CliError::Input(err.to_string()))?;
    let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();
    match keyword.as_str() {
        "tap" => {
            if args.is_empty() {
                return Err(CliError::Input("usage: tap <button number | payload>".into()));
            }
            let data = context.resolve_button(&args.join(" "));
            context.send_callback(&data)?;
        }
        "menu" => match &context.last_menu {
            Some(menu) => output::menu(menu),
            None => output::warning("No menu yet."),
        },
        "help" => print_help(),
        "version" => print_version(),
        _ => {
            context.running = false;
            return Ok(LoopControl::Exit);
        }
    }
    Ok(LoopControl::Continue)
}

fn print_help() {
    output::section("Shell commands");
    println!("  tap <n|payload>  press button n of the last menu, or send a raw payload");
    println!("  menu             show the last menu again");
    println!("  version          show build metadata");
    println!("  exit, quit       leave the shell");
    println!("  anything else    is sent as a chat message (/help lists chat commands)");
}

fn print_version() {
    let meta = build_info::current();
    output::section(format!("fintrack {}", meta.version));
    for (label, value) in meta.rows() {
        println!("  {label:<11}: {value}");
    }
}

struct CommandHelper {
    commands: Vec<String>,
}

impl CommandHelper {
    fn new() -> Self {
        let mut commands: Vec<String> = SHELL_COMMANDS.iter().map(|name| name.to_string()).collect();
        commands.sort();
        Self { commands }
    }
}

impl Helper for CommandHelper {}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let prefix = &line[..pos];
        if prefix.contains(char::is_whitespace) {
            return Ok((pos, Vec::new()));
        }
        let needle = prefix.to_ascii_lowercase();
        let candidates = self
            .commands
            .iter()
            .filter(|name| name.starts_with(&needle))
            .map(|name| Pair {
                display: name.clone(),
                replacement: name.clone(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;
}

impl Highlighter for CommandHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Borrowed(line)
    }
}

impl Validator for CommandHelper {
    fn validate(&self, _ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        Ok(ValidationResult::Valid(None))
    }
}

fn parse_command_line(input: &str) -> Result<Vec<String>, ParseError> {
    split(input).map_err(|err| ParseError {
        message: err.to_string(),
    })
}

#[derive(Debug)]
struct ParseError {
    message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
