//! CLI definitions, inventory modes, and tracing setup.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::Result;
use swinventory_core::InventoryPolicy;
use swinventory_core::pipeline::{host_inventory, list_inventory};
use swinventory_shared::{
    AppConfig, InventoryDocument, init_config, load_config, load_config_from, parse_field_list,
};
use swinventory_source::SourceOptions;
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// swinventory: SolarWinds dynamic inventory for Ansible.
#[derive(Parser)]
#[command(
    name = "swinventory",
    version,
    about = "Build an Ansible dynamic inventory from SolarWinds node records.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Print the full inventory as JSON.
    #[arg(long, conflicts_with = "host")]
    pub list: bool,

    /// Print variables for one host (always empty; host vars ship in `--list`).
    #[arg(long, value_name = "HOSTNAME")]
    pub host: Option<String>,

    /// Config file (defaults to ~/.swinventory/swinventory.toml).
    #[arg(long, env = "SWINVENTORY_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: Overrides,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Settings that override the config file, from flags or environment.
#[derive(Args, Debug, Default)]
pub(crate) struct Overrides {
    /// SolarWinds server address, optionally with scheme and port.
    #[arg(long, env = "SOLARWINDS_HOST")]
    pub server: Option<String>,

    /// SolarWinds API user.
    #[arg(long, env = "SOLARWINDS_USERNAME")]
    pub username: Option<String>,

    /// SWQL query to run.
    #[arg(long, env = "SOLARWINDS_QUERY")]
    pub query: Option<String>,

    /// Verify the server's TLS certificate (true/false).
    #[arg(
        long,
        env = "SOLARWINDS_VERIFY_SSL",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub validate_certs: Option<bool>,

    /// Field used as the inventory hostname.
    #[arg(long, env = "SOLARWINDS_HOSTNAME_FIELD")]
    pub hostname_field: Option<String>,

    /// Field matched against category substrings.
    #[arg(long, env = "SOLARWINDS_CATEGORY_FIELD")]
    pub category_field: Option<String>,

    /// Comma-separated fields copied into host variables.
    #[arg(long, env = "SOLARWINDS_HOSTVAR_FIELDS")]
    pub hostvar_fields: Option<String>,

    /// Comma-separated fields to group hosts on ("False" for none).
    #[arg(long, env = "SOLARWINDS_GROUP_ON_FIELDS")]
    pub group_on_fields: Option<String>,

    /// Categories, e.g. "Windows;Linux:Linux,Red Hat,Debian;Other:".
    #[arg(long, env = "SOLARWINDS_CATEGORIES")]
    pub categories: Option<String>,
}

impl Overrides {
    /// Layer these overrides onto a loaded config.
    pub(crate) fn apply(&self, config: &mut AppConfig) {
        let sw = &mut config.solarwinds;
        if let Some(server) = &self.server {
            sw.host = Some(server.clone());
        }
        if let Some(username) = &self.username {
            sw.username = Some(username.clone());
        }
        if let Some(query) = &self.query {
            sw.query = query.clone();
        }
        if let Some(validate) = self.validate_certs {
            sw.validate_certs = validate;
        }

        let inv = &mut config.inventory;
        if let Some(field) = &self.hostname_field {
            inv.hostname_field = field.clone();
        }
        if let Some(field) = &self.category_field {
            inv.category_field = field.clone();
        }
        if let Some(fields) = &self.hostvar_fields {
            inv.hostvar_fields = parse_field_list(fields);
        }
        if let Some(fields) = &self.group_on_fields {
            inv.group_on_fields = parse_field_list(fields);
        }
        if let Some(categories) = &self.categories {
            inv.categories_definition = categories.clone();
        }
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration (file, environment, and flags).
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
///
/// Logs go to stderr: stdout carries the inventory document.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "swinventory=warn",
        1 => "swinventory=info",
        2 => "swinventory=debug",
        _ => "swinventory=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Some(Command::Config { action }) => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(&cli).await,
        },
        None if cli.list => cmd_list(&cli).await,
        None => cmd_host(cli.host.as_deref()).await,
    }
}

/// Load the config file and layer environment/flag overrides on top.
fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    cli.overrides.apply(&mut config);
    Ok(config)
}

fn print_document(doc: &InventoryDocument) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(doc)?);
    Ok(())
}

async fn cmd_list(cli: &Cli) -> Result<()> {
    let config = resolve_config(cli)?;

    // Both are checked before any request goes out.
    let policy = InventoryPolicy::from_config(&config.inventory)?;
    let source = SourceOptions::from_config(&config.solarwinds)?;

    info!(
        server = %source.host,
        hostname_field = %policy.hostname_field,
        categories = policy.categories.len(),
        "building inventory"
    );

    let doc = list_inventory(&source, &policy).await?;
    print_document(&doc)
}

async fn cmd_host(host: Option<&str>) -> Result<()> {
    let doc = match host {
        Some(hostname) => host_inventory(hostname),
        None => InventoryDocument::empty(),
    };
    print_document(&doc)
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(cli: &Cli) -> Result<()> {
    let config = resolve_config(cli)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
