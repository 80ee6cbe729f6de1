// ABOUTME: CLI binary for pagefold.
// ABOUTME: Applies JSON pipelines to HTML files or stdin and splits content at separator elements.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args as ClapArgs, Parser, Subcommand};
use env_logger::{Builder, Env, Target};
use pagefold::{Pipeline, Placement, Splitter, TransformError};

#[derive(Parser, Debug)]
#[command(name = "pagefold")]
#[command(about = "Post-process generated HTML with selector-driven transforms")]
struct Args {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the steps of a pipeline file over the input
    Apply {
        /// Pipeline JSON file
        #[arg(short = 'p', long = "pipeline")]
        pipeline: PathBuf,

        #[command(flatten)]
        io: IoArgs,
    },
    /// Split the input into partitions at elements matching a selector
    Split {
        /// CSS selector matching the separator elements
        #[arg(short = 's', long = "selector")]
        selector: String,

        /// Where separators go: none (dropped), before or after
        #[arg(long = "placement", default_value = "none")]
        placement: Placement,

        /// Start every partition with its separator, dropping leading content
        #[arg(long = "on-start")]
        on_start: bool,

        /// Treat the input as a full document and split its body
        #[arg(long = "document")]
        document: bool,

        #[command(flatten)]
        io: IoArgs,
    },
}

#[derive(ClapArgs, Debug)]
struct IoArgs {
    /// Output file path (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Output partitions as a JSON array of strings
    #[arg(long = "json")]
    json_output: bool,

    /// HTML file to read (default: stdin)
    #[arg()]
    input: Option<PathBuf>,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    Builder::from_env(Env::default().default_filter_or(default))
        .target(Target::Stderr)
        .init();
}

fn read_input(input: Option<&Path>) -> io::Result<String> {
    match input {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Format partitions as a JSON array, or as raw markup separated by blank lines.
fn format_output(partitions: &[String], json_output: bool) -> Result<String, serde_json::Error> {
    if json_output {
        serde_json::to_string_pretty(partitions)
    } else {
        Ok(partitions.join("\n\n"))
    }
}

fn run_command(command: &Command, content: &str) -> Result<Vec<String>, TransformError> {
    match command {
        Command::Apply { pipeline, .. } => Pipeline::from_path(pipeline)?.run(content),
        Command::Split {
            selector,
            placement,
            on_start,
            document,
            ..
        } => {
            let splitter = Splitter::new(selector.as_str()).placement(*placement);
            let body;
            let content = if *document {
                body = pagefold::dom::Fragment::parse_document(content).inner_html()?;
                body.as_str()
            } else {
                content
            };
            if *on_start {
                splitter.split_on_start(content)
            } else {
                splitter.split(content)
            }
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let io_args = match &args.command {
        Command::Apply { io, .. } | Command::Split { io, .. } => io,
    };

    let content = match read_input(io_args.input.as_deref()) {
        Ok(content) => content,
        Err(e) => {
            match &io_args.input {
                Some(path) => eprintln!("error reading file {:?}: {}", path, e),
                None => eprintln!("error reading stdin: {}", e),
            }
            return ExitCode::from(1);
        }
    };

    let partitions = match run_command(&args.command, &content) {
        Ok(partitions) => partitions,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(1);
        }
    };
    log::debug!("{} partition(s)", partitions.len());

    let output_str = match format_output(&partitions, io_args.json_output) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error encoding output: {}", e);
            return ExitCode::from(1);
        }
    };

    if let Some(output_path) = &io_args.output {
        if let Err(e) = fs::write(output_path, &output_str) {
            eprintln!("error writing to {:?}: {}", output_path, e);
            return ExitCode::from(1);
        }
    } else {
        println!("{}", output_str);
    }

    ExitCode::SUCCESS
}
