use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{error::ErrorKind, ArgMatches, CommandFactory, FromArgMatches, Parser, ValueEnum};
use pyone::{
    runtime::{Interpreter, Preamble, Program, DEFAULT_INTERPRETER},
    ExpansionEngine,
};
use tracing_subscriber::EnvFilter;

/// Expand a one-liner into indented Python and run it
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Print the expanded script instead of running it
    #[arg(long, short)]
    debug: bool,

    /// Dump the expansion in a structured format (only with --debug)
    #[arg(long, requires = "debug")]
    format: Option<DumpFormat>,

    /// Add `import MODULES` at the beginning of the script
    #[arg(long = "import", short = 'i', value_name = "MODULES")]
    imports: Vec<String>,

    /// Add `from MODULE import *` for each comma separated module
    #[arg(long = "from", short = 'f', value_name = "MODULES")]
    from: Vec<String>,

    /// The field separator used in EL{ } loops
    #[arg(long, short = 'F')]
    delim: Option<String>,

    /// Number of spaces per indentation level
    #[arg(long, default_value_t = 4)]
    indent: usize,

    /// The Python interpreter to hand the script to
    #[arg(long, env = "PYONE_PYTHON", default_value = DEFAULT_INTERPRETER)]
    python: String,

    /// Read the script from a file instead of the first argument
    #[arg(long)]
    file: Option<PathBuf>,

    /// The script, followed by arguments available as `argv`
    /// If --file is given, all of these are arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum DumpFormat {
    Json,
    Yaml,
    Toml,
}

fn dump(program: &Program, format: DumpFormat) -> anyhow::Result<String> {
    Ok(match format {
        DumpFormat::Json => serde_json::to_string_pretty(program)?,
        DumpFormat::Yaml => serde_yaml::to_string(program)?,
        DumpFormat::Toml => toml::to_string(program)?,
    })
}

/// Builds the preamble with `-i` and `-f` lines in command line order.
fn preamble(matches: &ArgMatches, imports: &[String], from: &[String]) -> Preamble {
    let indices = |id: &str| matches.indices_of(id).into_iter().flatten();
    let mut entries = indices("imports")
        .zip(imports.iter().map(|modules| (false, modules)))
        .chain(indices("from").zip(from.iter().map(|modules| (true, modules))))
        .collect::<Vec<_>>();
    entries.sort_by_key(|(index, _)| *index);

    let mut preamble = Preamble::new();
    for (_, (all_from, modules)) in entries {
        if all_from {
            preamble.import_all_from(modules);
        } else {
            preamble.import(modules);
        }
    }
    preamble
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = Args::command().get_matches();
    let Args {
        debug,
        format,
        imports,
        from,
        delim,
        indent,
        python,
        file,
        args,
    } = Args::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());

    let engine = ExpansionEngine::new().with_indent(" ".repeat(indent));
    let (expansion, argv) = match file {
        Some(path) => {
            let expansion = engine.expand_file(&path)?;
            let argv = std::iter::once(path.display().to_string())
                .chain(args)
                .collect::<Vec<_>>();
            (expansion, argv)
        }
        None => {
            let Some(script) = args.first() else {
                Args::command()
                    .error(
                        ErrorKind::MissingRequiredArgument,
                        "a script or --file is required",
                    )
                    .exit();
            };
            let expansion = engine
                .expand(script)
                .with_context(|| format!("failed to expand script: {script}"))?;
            (expansion, args)
        }
    };

    let mut program = Program::new(preamble(&matches, &imports, &from), expansion);
    if let Some(delim) = delim {
        program = program.with_delimiter(delim);
    }
    tracing::debug!(lines = program.lines().len(), "assembled program");

    if debug {
        match format {
            Some(format) => println!("{}", dump(&program, format)?.trim_end()),
            None => println!("{}", program.listing()),
        }
        return Ok(ExitCode::SUCCESS);
    }

    let status = Interpreter::new(python).run(&program, &argv)?;
    Ok(status
        .code()
        .and_then(|code| u8::try_from(code).ok())
        .map_or(ExitCode::FAILURE, ExitCode::from))
}
