use std::{
    path::{Path, PathBuf},
    process,
};

use clap::{Parser, Subcommand};
use console::style;
use paybridge_driver_http::{HttpTransport, HttpTransportConfig};
use paybridge_sdk::{
    ConfigSource, DEFAULT_SECTION, EnvSource, GatewayClient, Layered, PartialSettings,
};
use url::Url;

mod commands;
mod manifest;

use manifest::{LoadManifestError, Manifest};

#[derive(Clone, Debug)]
pub struct Context {
    pub manifest: Manifest,
    pub section: String,
    /// Settings given on the command line; they win over manifest and environment
    pub overrides: PartialSettings,
    pub transport: HttpTransportConfig,
}

impl Context {
    /// Build a ready gateway client from the manifest, the environment and the
    /// command-line overrides, in that order of precedence.
    pub async fn connect(&self) -> Result<GatewayClient<HttpTransport>, String> {
        tracing::debug!(
            "Connecting gateway section '{}' (api url: {:?}, timeout: {}ms)",
            self.section,
            self.transport.api_url.as_ref().map(Url::as_str),
            self.transport.timeout_ms
        );
        let base = Layered::new()
            .with_source(self.manifest.gateways.clone())
            .with_source(EnvSource::new())
            .read(&self.section);

        let client = GatewayClient::connect(
            &base,
            &self.overrides,
            HttpTransport::new(self.transport.clone()),
        )
        .await
        .map_err(|e| e.to_string())?;

        if client.credentials().environment().is_production() {
            eprintln!(
                "{} Using the production gateway; pass --sandbox for test processing",
                style("Live:").yellow().bold()
            );
        }
        Ok(client)
    }
}

#[derive(Parser, Debug)]
#[clap(author, version, about = "Paybridge - payment gateway client", long_about = None)]
struct Opts {
    /// Path to the paybridge.yaml manifest file
    #[arg(
        long = "manifest-path",
        short = 'm',
        global = true,
        default_value = "./paybridge.yaml"
    )]
    manifest_path: PathBuf,

    /// Gateway section to read from the manifest and environment
    #[arg(long = "section", global = true, default_value = DEFAULT_SECTION)]
    section: String,

    /// Use the processor sandbox instead of production
    #[arg(long = "sandbox", short = 's', global = true)]
    sandbox: bool,

    #[arg(long = "merchant-id", global = true)]
    merchant_id: Option<String>,

    #[arg(long = "public-key", global = true)]
    public_key: Option<String>,

    #[arg(long = "private-key", global = true)]
    private_key: Option<String>,

    /// Default merchant account for sales and client tokens
    #[arg(long = "merchant-account-id", global = true)]
    merchant_account_id: Option<String>,

    /// Override the processor base URL
    #[arg(long = "api-url", global = true)]
    api_url: Option<Url>,

    /// Per-request timeout in milliseconds
    #[arg(long = "timeout-ms", global = true)]
    timeout_ms: Option<u64>,

    #[clap(subcommand)]
    command: Command,
}

impl Opts {
    fn overrides(&self) -> PartialSettings {
        PartialSettings {
            merchant_id: self.merchant_id.clone(),
            public_key: self.public_key.clone(),
            private_key: self.private_key.clone(),
            merchant_account_id: self.merchant_account_id.clone(),
            production: self.sandbox.then_some(false),
        }
    }

    fn transport_config(&self, manifest: &Manifest) -> HttpTransportConfig {
        let mut config = HttpTransportConfig::default();
        if let Some(api_url) = self.api_url.clone().or(manifest.transport.api_url.clone()) {
            config = config.with_api_url(api_url);
        }
        if let Some(timeout_ms) = self.timeout_ms.or(manifest.transport.timeout_ms) {
            config = config.with_timeout_ms(timeout_ms);
        }
        config
    }
}

#[derive(Subcommand, PartialEq, Clone, Debug)]
enum Command {
    /// Generate a client token for a front-end
    Token(commands::TokenCommand),
    /// Submit a sale
    Sale(commands::SaleCommand),
    /// Customer vault commands
    Customer {
        #[clap(subcommand)]
        command: CustomerCommand,
    },
}

#[derive(Subcommand, PartialEq, Clone, Debug)]
pub enum CustomerCommand {
    /// Find a customer by id
    Find(commands::FindCustomerCommand),
}

#[tokio::main]
async fn main() {
    let opts: Opts = match Opts::try_parse() {
        Ok(opts) => opts,
        Err(e) => {
            let _ = e.print();
            process::exit(e.exit_code());
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let manifest_dir = opts
        .manifest_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    if let Some(env_file) = load_dotenv(&manifest_dir) {
        eprintln!(
            "{} Loaded environment from {}",
            style("✓").green(),
            env_file.display()
        );
    }

    let manifest = match load_manifest(&opts.manifest_path) {
        Ok(manifest) => manifest,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red(), e);
            process::exit(1);
        }
    };

    let ctx = Context {
        section: opts.section.clone(),
        overrides: opts.overrides(),
        transport: opts.transport_config(&manifest),
        manifest,
    };

    if let Err(e) = handle_command(opts.command, &ctx).await {
        eprintln!("{} {}", style("Error:").red(), e);
        process::exit(1);
    }
}

/// Read the manifest, or start from an empty one when the file does not exist
fn load_manifest(path: &Path) -> Result<Manifest, LoadManifestError> {
    match Manifest::load_or_default(path)? {
        Some(manifest) => {
            eprintln!(
                "{} Loaded manifest from {}",
                style("✓").green(),
                path.display()
            );
            Ok(manifest)
        }
        None => {
            eprintln!(
                "{} No manifest at {}, using environment and flags only",
                style("Warning:").yellow(),
                path.display()
            );
            Ok(Manifest::default())
        }
    }
}

/// Export `.env` from `dir` into the process environment for [`EnvSource`].
/// Returns the file path when one was loaded.
fn load_dotenv(dir: &Path) -> Option<PathBuf> {
    let path = dir.join(".env");
    match dotenvy::from_path(&path) {
        Ok(()) => Some(path),
        Err(e) if e.not_found() => None,
        Err(e) => {
            tracing::warn!("Ignoring {}: {}", path.display(), e);
            None
        }
    }
}

async fn handle_command(command: Command, ctx: &Context) -> Result<(), String> {
    match command {
        Command::Token(cmd) => cmd.execute(ctx).await,
        Command::Sale(cmd) => cmd.execute(ctx).await,
        Command::Customer { command } => match command {
            CustomerCommand::Find(cmd) => cmd.execute(ctx).await,
        },
    }
}
