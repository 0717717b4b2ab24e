use clap::{Parser, Subcommand};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::{stdin, stdout};
use tower_lsp_server::{LspService, Server};

use nvtx_ranges::config::WorkspaceSettings;
use nvtx_ranges::lsp::{SettingsEventKind, load_settings};
use nvtx_ranges::plan::build_plan;
use nvtx_ranges::{Range, RangeKind, RangeServer, RangeStore, validate};

/// Keeps NVTX profiling ranges anchored to source lines while files are edited
#[derive(Parser)]
#[command(name = "nvtx-ranges")]
#[command(version)]
#[command(
    about = "Keeps NVTX profiling ranges anchored to source lines; runs a language server on stdio by default"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print stored ranges, one per line
    List {
        /// Range file (default: rangesFile from nvtx-ranges.toml, else .vscode/nvtx_ranges.json)
        #[arg(long)]
        ranges: Option<PathBuf>,

        /// Only show ranges of this source file
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Check every stored range; exits with status 1 when any is invalid
    Validate {
        /// Range file (default: rangesFile from nvtx-ranges.toml, else .vscode/nvtx_ranges.json)
        #[arg(long)]
        ranges: Option<PathBuf>,
    },
    /// Print the instrumentation plan derived from the enabled ranges
    Plan {
        /// Range file (default: rangesFile from nvtx-ranges.toml, else .vscode/nvtx_ranges.json)
        #[arg(long)]
        ranges: Option<PathBuf>,

        /// Write the plan here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // stdout carries the LSP channel; logs go to stderr
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::List { ranges, file }) => {
            let settings = project_settings();
            let ranges = match read_ranges(&settings, ranges) {
                Ok(ranges) => ranges,
                Err(code) => return code,
            };
            for range in ranges
                .iter()
                .filter(|range| file.as_deref().is_none_or(|file| range.belongs_to(file)))
            {
                println!("{}", describe(range));
            }
            ExitCode::SUCCESS
        }
        Some(Commands::Validate { ranges }) => {
            let settings = project_settings();
            let ranges = match read_ranges(&settings, ranges) {
                Ok(ranges) => ranges,
                Err(code) => return code,
            };
            let problems = validation_problems(&ranges);
            for problem in &problems {
                println!("{}", problem);
            }
            if problems.is_empty() {
                eprintln!("{} ranges OK", ranges.len());
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Some(Commands::Plan { ranges, output }) => {
            let settings = project_settings();
            let ranges = match read_ranges(&settings, ranges) {
                Ok(ranges) => ranges,
                Err(code) => return code,
            };
            let json = build_plan(&ranges, &settings.templates).and_then(|plan| {
                serde_json::to_string_pretty(&plan)
                    .map_err(|err| nvtx_ranges::RangeError::invalid(vec![err.to_string()]))
            });
            let json = match json {
                Ok(json) => json,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            };
            match output {
                Some(path) => {
                    if let Err(e) = fs::write(&path, format!("{json}\n")) {
                        eprintln!("Error: failed to write {}: {}", path.display(), e);
                        return ExitCode::FAILURE;
                    }
                    eprintln!("Plan written to {}", path.display());
                }
                None => println!("{}", json),
            }
            ExitCode::SUCCESS
        }
        None => {
            let stdin = stdin();
            let stdout = stdout();

            let (service, socket) = LspService::new(RangeServer::new);
            Server::new(stdin, stdout, socket).serve(service).await;
            ExitCode::SUCCESS
        }
    }
}

/// Settings for the project in the current directory.
fn project_settings() -> WorkspaceSettings {
    let cwd = std::env::current_dir().ok();
    let outcome = load_settings(cwd.as_deref(), None);
    for event in &outcome.events {
        match event.kind {
            SettingsEventKind::Info => log::info!("{}", event.message),
            SettingsEventKind::Warning => log::warn!("{}", event.message),
        }
    }
    outcome.settings
}

fn read_ranges(
    settings: &WorkspaceSettings,
    ranges: Option<PathBuf>,
) -> Result<Vec<Range>, ExitCode> {
    let path = ranges.unwrap_or_else(|| PathBuf::from(&settings.ranges_file));
    RangeStore::new(path).read_all().map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::FAILURE
    })
}

fn describe(range: &Range) -> String {
    let lines = match (range.kind, range.end_line) {
        (RangeKind::Block, Some(end)) => format!("{}-{}", range.start_line, end),
        _ => range.start_line.to_string(),
    };
    let kind = match range.kind {
        RangeKind::Block => "block",
        RangeKind::Event => "event",
    };
    let state = if range.enabled { "" } else { "\tdisabled" };
    format!(
        "{}\t{}\t{}\t{}:{}{}",
        range.id,
        kind,
        range.name,
        range.file_path,
        lines,
        state
    )
}

fn validation_problems(ranges: &[Range]) -> Vec<String> {
    let mut problems = Vec::new();
    let mut seen = HashSet::new();
    for range in ranges {
        if !seen.insert(range.id.as_str()) {
            problems.push(format!("{}: duplicate id", range.id));
        }
        for error in validate(range).errors {
            problems.push(format!("{} ({}): {}", range.id, range.name, error));
        }
    }
    problems
}
