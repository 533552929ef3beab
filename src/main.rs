use anyhow::Result;
use clap::Parser;
use sd_install::{
    commands::{self, InstallOptions, PlatformOverride},
    install::ConfigOptions,
    platform::{Arch, HostDetector, Os},
    release::SD_LOCAL_VERSION,
};
use std::path::PathBuf;
use std::time::Duration;

/// sd-install - sd-local installer
///
/// Download the sd-local release built for this machine, check its SHA-256
/// digest against a built-in table and install it as an executable.
///
/// If the GITHUB_TOKEN environment variable is set, it is sent with every
/// download. This is useful for avoiding rate limits.
///
/// Examples:
///   sd-install install              # Install sd-local 1.0.58 into the default bin directory
///   sd-install resolve --json       # Show the URL and digest for this machine
#[derive(Parser, Debug)]
#[command(author, version = commands::VERSION, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory to install into (defaults to /usr/local/bin as root, ~/.local/bin otherwise)
    #[arg(long, env = "SD_INSTALL_BIN_DIR", value_name = "PATH", global = true)]
    pub bin_dir: Option<PathBuf>,

    /// Release download base URL (defaults to the sd-local GitHub releases page)
    #[arg(long, env = "SD_INSTALL_BASE_URL", value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// Download timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 300, global = true)]
    pub timeout: u64,

    /// Download attempts before giving up
    #[arg(long, value_name = "N", default_value_t = 3, global = true)]
    pub retries: usize,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Download, verify and install sd-local
    Install(InstallArgs),

    /// Show the release entry for this platform without downloading
    Resolve(ResolveArgs),

    /// List every platform in the release table
    Platforms(PlatformsArgs),

    /// Check a downloaded file against the release table
    Verify(VerifyArgs),

    /// Print the installer version and detected platform
    Version,
}

#[derive(clap::Args, Debug)]
pub struct TargetArgs {
    /// Release version to use
    #[arg(long, default_value = SD_LOCAL_VERSION)]
    pub version: String,

    /// Target OS instead of the host's (macos, linux, windows, freebsd)
    #[arg(long)]
    pub os: Option<Os>,

    /// Target architecture instead of the host's (amd64, arm64)
    #[arg(long)]
    pub arch: Option<Arch>,
}

impl TargetArgs {
    fn platform(&self) -> PlatformOverride {
        PlatformOverride {
            os: self.os,
            arch: self.arch,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct InstallArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// File name of the installed binary
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Skip running the installed binary with --help
    #[arg(long)]
    pub no_check: bool,

    /// Replace an existing binary without asking
    #[arg(short = 'y', long)]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug)]
pub struct PlatformsArgs {
    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug)]
pub struct VerifyArgs {
    /// File to check
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    #[command(flatten)]
    pub target: TargetArgs,
}

impl Cli {
    fn config_options(&self) -> ConfigOptions {
        ConfigOptions {
            bin_dir: self.bin_dir.clone(),
            base_url: self.base_url.clone(),
            timeout: Some(Duration::from_secs(self.timeout)),
            retries: Some(self.retries),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = sd_install::runtime::RealRuntime;

    match &cli.command {
        Commands::Install(args) => {
            let options = InstallOptions {
                version: args.target.version.clone(),
                name: args.name.clone(),
                platform: args.target.platform(),
                self_check: !args.no_check,
                assume_yes: args.yes,
            };
            commands::install(runtime, cli.config_options(), options).await?
        }
        Commands::Resolve(args) => {
            let table = commands::release_table(cli.base_url.as_deref())?;
            let detector = args.target.platform().detector();
            commands::resolve(&table, &detector, &args.target.version, args.json)?
        }
        Commands::Platforms(args) => {
            let table = commands::release_table(cli.base_url.as_deref())?;
            commands::platforms(&table, args.json)?
        }
        Commands::Verify(args) => {
            let table = commands::release_table(cli.base_url.as_deref())?;
            let detector = args.target.platform().detector();
            commands::verify(&runtime, &table, &detector, &args.file, &args.target.version)?
        }
        Commands::Version => commands::version(&HostDetector::new())?,
    }
    Ok(())
}
