//! Main CLI application

use crate::config::{load_env_file, parse_config_auto, parse_config_file, Config};
use crate::error::{ConfigError, RmkError};
use crate::logging;
use crate::runner::{
    default_interpreter, plan, referenced_keys, Context, Engine, Executor, Registry, ShellExecutor,
    VariableResolver, Verbosity,
};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use clap_complete::Shell;
use std::collections::HashMap;
use std::env;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;

/// What the user asked to run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    /// Target to run; the registry default when absent
    pub target: Option<String>,
    /// `KEY=value` overrides in command-line order
    pub assignments: Vec<(String, String)>,
    pub verbosity: Verbosity,
    pub dry_run: bool,
}

impl Request {
    /// Split positional arguments into one target and `KEY=value` assignments
    pub fn from_args<I, S>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut request = Request::default();

        for arg in args {
            let arg = arg.as_ref();
            if let Some((key, value)) = parse_assignment(arg) {
                request.assignments.push((key, value));
            } else if let Some(existing) = &request.target {
                return Err(ConfigError::Invalid(format!(
                    "only one target may be given (got '{}' and '{}')",
                    existing, arg
                )));
            } else {
                request.target = Some(arg.to_string());
            }
        }

        Ok(request)
    }
}

/// Parse `KEY=value`, where KEY is a variable name
fn parse_assignment(arg: &str) -> Option<(String, String)> {
    let (key, value) = arg.split_once('=')?;
    let mut chars = key.chars();
    let first = chars.next()?;
    if !(first.is_ascii_alphabetic() || first == '_')
        || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return None;
    }
    Some((key.to_string(), value.to_string()))
}

/// CLI application
pub struct App {
    /// Parsed configuration
    config: Config,
    /// Config file path
    config_path: PathBuf,
    /// Validated targets
    registry: Registry,
}

impl App {
    /// Create a new app from the discovered configuration file
    pub fn new() -> Result<Self, RmkError> {
        let (config, config_path) = parse_config_auto()?;
        Self::from_parts(config, config_path)
    }

    /// Create app with a specific config file
    pub fn with_config_file(path: PathBuf) -> Result<Self, RmkError> {
        let config = parse_config_file(&path)?;
        Self::from_parts(config, path)
    }

    /// Create app from an already parsed configuration
    pub fn from_parts(config: Config, config_path: PathBuf) -> Result<Self, RmkError> {
        let registry = Registry::from_config(&config)?;
        Ok(App {
            config,
            config_path,
            registry,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Run a request with the configured shell, writing help output to stdout
    pub fn run(&self, request: &Request) -> Result<i32, RmkError> {
        let interpreter = self
            .config
            .interpreter
            .clone()
            .unwrap_or_else(default_interpreter);
        let executor = ShellExecutor::new(interpreter);

        let stdout = io::stdout();
        let mut out = stdout.lock();
        let code = self.run_with(request, &executor, &mut out)?;
        out.flush()?;
        Ok(code)
    }

    /// Run a request through the given executor and return the exit code
    pub fn run_with<W: Write>(
        &self,
        request: &Request,
        executor: &dyn Executor,
        out: &mut W,
    ) -> Result<i32, RmkError> {
        let ctx = Context::new()
            .with_config_path(self.config_path.clone())
            .with_verbosity(request.verbosity)
            .with_dry_run(request.dry_run);

        let root = request
            .target
            .as_deref()
            .unwrap_or_else(|| self.registry.default_target());

        // Everything that can fail before a step runs happens here
        let plan = plan(root, &self.registry)?;
        let referenced = referenced_keys(plan.resolve(&self.registry)?);

        let resolver = VariableResolver::new(&self.config.vars, executor, ctx.working_dir.clone());
        let overrides = overrides(&resolver, &request.assignments);
        let vars = resolver.resolve(&overrides, &referenced)?;

        ctx.print_debug(&format!("Plan: {}", plan.targets().join(" -> ")));

        let engine = Engine::new(&self.registry, executor, &ctx);
        let result = engine.run(plan, &vars, out)?;
        Ok(result.exit_code())
    }
}

/// Environment values of declared keys, then command-line assignments on top
fn overrides(
    resolver: &VariableResolver<'_>,
    assignments: &[(String, String)],
) -> HashMap<String, String> {
    let mut overrides: HashMap<String, String> = resolver
        .declared_keys()
        .into_iter()
        .filter_map(|key| env::var(key).ok().map(|value| (key.to_string(), value)))
        .collect();

    for (key, value) in assignments {
        overrides.insert(key.clone(), value.clone());
    }
    overrides
}

/// Build the clap command
pub fn build_command() -> Command {
    Command::new("rmk")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A declarative target runner")
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Path to rmk.yml config file"),
        )
        .arg(
            Arg::new("dry-run")
                .short('n')
                .long("dry-run")
                .help("Print the plan and commands without running them")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print command output and errors")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Print no output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("completions")
                .long("completions")
                .value_name("SHELL")
                .value_parser(value_parser!(Shell))
                .help("Print shell completions and exit"),
        )
        .arg(
            Arg::new("args")
                .value_name("TARGET | KEY=value")
                .num_args(0..)
                .action(ArgAction::Append)
                .help("Target to run and variable overrides"),
        )
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("silent") {
        Verbosity::Silent
    } else if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

/// Run the CLI application with the process arguments
pub fn run() -> Result<i32, RmkError> {
    run_from(env::args_os())
}

/// Run the CLI application with explicit arguments, returning the exit code
pub fn run_from<I, T>(args: I) -> Result<i32, RmkError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut command = build_command();
    let matches = command.clone().get_matches_from(args);

    let verbosity = get_verbosity(&matches);
    logging::init(verbosity);

    if let Some(shell) = matches.get_one::<Shell>("completions") {
        clap_complete::generate(*shell, &mut command, "rmk", &mut io::stdout());
        return Ok(0);
    }

    let positional = matches
        .get_many::<String>("args")
        .map(|values| values.cloned().collect::<Vec<_>>())
        .unwrap_or_default();
    let mut request = Request::from_args(positional)?;
    request.verbosity = verbosity;
    request.dry_run = matches.get_flag("dry-run");

    let app = match matches.get_one::<PathBuf>("file") {
        Some(path) => App::with_config_file(path.clone())?,
        None => App::new()?,
    };
    load_env_file(&app.config_path)?;

    app.run(&request)
}
