use crate::catalog::Category;
use crate::config::FailurePolicy;
use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use tracing::Level;

#[derive(Debug, Clone)]
pub enum Command {
    Sync {
        config_path: Option<String>,
        overrides: RunOverrides,
    },
    List {
        config_path: Option<String>,
        overrides: RunOverrides,
    },
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub categories: Vec<Category>,
    pub years: Vec<String>,
    pub mandatory_only: bool,
    pub optional_only: bool,
    pub destination: Option<String>,
    pub dry_run: Option<bool>,
    pub no_size_probe: bool,
    pub failure_policy: Option<FailurePolicy>,
}

pub struct Args {
    pub command: Command,
    pub log_level: Level,
}

#[derive(Debug, Parser)]
#[command(
    name = "loopmirror",
    version,
    author = "Nick Guletskii",
    about = "Mirror GarageBand, Logic Pro and MainStage audio content packages into a local directory"
)]
struct Cli {
    #[arg(
        short = 'v',
        long = "verbose",
        help = "Sets the level of verbosity",
        action = ArgAction::Count,
        global = true
    )]
    verbose: u8,

    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Optional config file (YAML, TOML or JSON)",
        global = true
    )]
    config: Option<String>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, ClapArgs)]
struct SelectionArgs {
    #[arg(
        long = "category",
        value_name = "CATEGORY",
        help = "Content categories to mirror (repeat or use comma-separated values)",
        action = ArgAction::Append,
        value_delimiter = ','
    )]
    categories: Vec<Category>,

    #[arg(
        long = "year",
        value_name = "YEAR",
        help = "Content release years to mirror (repeat or use comma-separated values)",
        action = ArgAction::Append,
        value_delimiter = ','
    )]
    years: Vec<String>,

    #[arg(
        long = "mandatory-only",
        help = "Only select mandatory packages",
        conflicts_with = "optional_only"
    )]
    mandatory_only: bool,

    #[arg(long = "optional-only", help = "Only select optional packages")]
    optional_only: bool,

    #[arg(
        long = "no-size-probe",
        help = "Trust the sizes declared in feed documents instead of asking the server"
    )]
    no_size_probe: bool,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Download every selected package that is not already present locally
    Sync {
        #[command(flatten)]
        selection: SelectionArgs,

        #[arg(
            short = 'd',
            long = "destination",
            value_name = "DIR",
            help = "Overrides the directory content is mirrored into"
        )]
        destination: Option<String>,

        #[arg(
            long = "dry-run",
            help = "Report what would be downloaded without downloading anything",
            conflicts_with = "live"
        )]
        dry_run: bool,

        #[arg(long = "live", help = "Download content")]
        live: bool,

        #[arg(
            long = "failure-policy",
            value_name = "POLICY",
            help = "What to do when a single package fails to download"
        )]
        failure_policy: Option<FailurePolicy>,
    },

    /// Print the selected packages without downloading them
    List {
        #[command(flatten)]
        selection: SelectionArgs,
    },
}

impl SelectionArgs {
    fn into_overrides(self) -> RunOverrides {
        RunOverrides {
            categories: self.categories,
            years: self.years,
            mandatory_only: self.mandatory_only,
            optional_only: self.optional_only,
            no_size_probe: self.no_size_probe,
            ..RunOverrides::default()
        }
    }
}

pub fn parse_args() -> Args {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy()
                .add_directive("hyper_util=warn".parse().unwrap())
                .add_directive("reqwest=warn".parse().unwrap()),
        )
        .init();

    let command = match cli.command {
        CliCommand::Sync {
            selection,
            destination,
            dry_run,
            live,
            failure_policy,
        } => Command::Sync {
            config_path: cli.config,
            overrides: RunOverrides {
                destination,
                dry_run: match (dry_run, live) {
                    (true, _) => Some(true),
                    (false, true) => Some(false),
                    (false, false) => None,
                },
                failure_policy,
                ..selection.into_overrides()
            },
        },
        CliCommand::List { selection } => Command::List {
            config_path: cli.config,
            overrides: selection.into_overrides(),
        },
    };

    Args { command, log_level }
}
