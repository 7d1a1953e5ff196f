use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use excel_mcp::cli;
use excel_mcp::config::{WorkspaceConfig, DEFAULT_ROOT, ROOT_ENV};
use excel_mcp::dispatch::Dispatcher;
use excel_mcp::logging;

#[derive(Parser)]
#[command(name = "excel")]
#[command(about = "Create, edit and inspect Excel workbooks from the command line")]
#[command(long_about = "Excel - workbook tools without a spreadsheet application

Runs the same tools the MCP and HTTP servers expose, one call at a time.
All file names are relative to the documents root.

COMMANDS:
  tools   - List tools and their arguments
  call    - Run one tool with a JSON argument object
  files   - List workbooks in the documents root
  sheets  - List the sheets of one workbook

EXAMPLES:
  excel call create_excel_file --args '{\"filename\":\"report.xlsx\"}'
  excel call write_cell --args '{\"filename\":\"report.xlsx\",\"sheet\":\"Sheet1\",\"cell\":\"A1\",\"value\":\"Total\",\"bold\":true}'
  excel --root /srv/books sheets report.xlsx

Set EXCEL_FILES_DIR or pass --root to choose the documents root.")]
#[command(version)]
struct Cli {
    /// Directory holding the workbooks
    #[arg(long, global = true, default_value = DEFAULT_ROOT, env = ROOT_ENV)]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available tools
    Tools {
        /// Show each tool's arguments
        #[arg(short, long)]
        verbose: bool,
    },

    #[command(long_about = "Run one tool.

The tool's result is printed to stdout. On failure the error message is
printed to stderr and the exit code is non-zero.

EXAMPLES:
  excel call list_sheets --args '{\"filename\":\"report.xlsx\"}'
  excel call read_range --args '{\"filename\":\"report.xlsx\",\"sheet\":\"Sheet1\",\"cell_range\":\"A1:C3\"}'")]
    /// Run one tool
    Call {
        /// Tool name (see `excel tools`)
        tool: String,

        /// Arguments as a JSON object
        #[arg(short, long)]
        args: Option<String>,
    },

    /// List workbooks in the documents root
    Files,

    /// List the sheets of a workbook
    Sheets {
        /// Workbook file name, relative to the root
        file: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init("excel_mcp=warn");

    let config = WorkspaceConfig::new(cli.root);
    config
        .prepare()
        .with_context(|| format!("cannot create documents root {}", config.root_dir.display()))?;
    let dispatcher = Dispatcher::new(&config);

    let result = match cli.command {
        Commands::Tools { verbose } => cli::tools(&dispatcher, verbose),
        Commands::Call { tool, args } => cli::call(&dispatcher, &tool, args.as_deref()),
        Commands::Files => cli::files(&dispatcher),
        Commands::Sheets { file } => cli::sheets(&dispatcher, &file),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "❌".red(), e.to_string().red());
        std::process::exit(1);
    }
    Ok(())
}
