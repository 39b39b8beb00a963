//! reaper-mcp - MCP server for REAPER
//!
//! Usage:
//!   reaper-mcp
//!
//! The server communicates over stdio using JSON-RPC 2.0.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use reaper_core::{BridgeConnector, Config, Connect, Simulator};
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;

use reaper_mcp::setup::BRIDGE_SCRIPT;
use reaper_mcp::tools::all_tools;
use reaper_mcp::{McpServer, ReaperClient, ReaperSetup, ToolFacade};

#[derive(Parser)]
#[command(name = "reaper-mcp")]
#[command(about = "MCP server exposing REAPER's scripting surface")]
#[command(version)]
#[command(after_help = "\
REAPER must be running with the reaper-mcp bridge script loaded. The first
failed connection configures REAPER automatically; restart REAPER afterwards.

EXAMPLES:
    reaper-mcp                                   # Serve MCP over stdio
    reaper-mcp tools                             # List available tools
    reaper-mcp call set_tempo --json-args '{\"tempo\": 96}'
    reaper-mcp --offline call get_project_info   # Try against a simulated project
    reaper-mcp configure                         # Configure REAPER by hand")]
struct Cli {
    /// Config file (defaults to <config dir>/reaper-mcp/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use a simulated REAPER project instead of the bridge
    #[arg(long, global = true)]
    offline: bool,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the MCP server over stdio (default)
    Serve,

    /// List the tools the server exposes
    Tools {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Call a tool directly and print its payload
    Call {
        /// Tool name to call
        tool: String,

        /// Arguments as a JSON object
        #[arg(long)]
        json_args: Option<String>,
    },

    /// Point REAPER at the bridge
    Configure,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::resolve(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => cmd_serve(&config, cli.offline),
        Commands::Tools { json } => cmd_tools(json),
        Commands::Call { tool, json_args } => {
            cmd_call(&config, cli.offline, &tool, json_args.as_deref())
        }
        Commands::Configure => cmd_configure(&config),
    }
}

/// Logging goes to stderr; stdout is for MCP protocol
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_client(config: &Config, offline: bool) -> ReaperClient {
    let connector: Box<dyn Connect> = if offline {
        tracing::info!("Using simulated REAPER project");
        Box::new(Simulator::new().connector())
    } else {
        tracing::info!("Using REAPER bridge at {}", config.bridge_addr);
        Box::new(BridgeConnector::new(config.bridge_addr.clone()))
    };
    ReaperClient::new(connector, Box::new(ReaperSetup::from_config(config)))
}

/// Run the stdio server
fn cmd_serve(config: &Config, offline: bool) -> Result<()> {
    tracing::info!("Starting reaper-mcp server");

    let rt = tokio::runtime::Runtime::new()?;
    let mut server = McpServer::new(config.server_name.clone(), build_client(config, offline));
    rt.block_on(server.run())
}

/// List tools
fn cmd_tools(json: bool) -> Result<()> {
    let tools = all_tools();

    if json {
        println!("{}", serde_json::to_string_pretty(&tools)?);
        return Ok(());
    }

    for tool in &tools {
        println!("{:24} {}", tool.name, tool.description);
    }
    println!();
    println!("{} tools", tools.len());
    Ok(())
}

/// Call one tool through the facade
fn cmd_call(config: &Config, offline: bool, tool: &str, json_args: Option<&str>) -> Result<()> {
    let arguments: Map<String, Value> = match json_args {
        Some(json_str) => serde_json::from_str(json_str).context("Failed to parse --json-args")?,
        None => Map::new(),
    };

    let mut facade = ToolFacade::new(build_client(config, offline));
    let result = facade.call_tool(tool, arguments);
    println!("{}", result.text());

    if result.is_error {
        std::process::exit(1);
    }
    Ok(())
}

/// Run auto-configuration by hand
fn cmd_configure(config: &Config) -> Result<()> {
    let setup = ReaperSetup::from_config(config);
    let report = setup.run().with_context(|| {
        format!("Could not configure REAPER at {}", setup.resource_dir().display())
    })?;

    println!("Wrote {}", report.settings_file.display());
    if report.hook_added {
        println!("Added bridge hook to {}", report.startup_script.display());
    } else {
        println!("Bridge hook already present in {}", report.startup_script.display());
    }
    if !report.bridge_script_found {
        bail!(
            "{} not found in the Scripts directory; install it, then restart REAPER",
            BRIDGE_SCRIPT
        );
    }
    println!();
    println!("Restart REAPER to load the bridge.");
    Ok(())
}
