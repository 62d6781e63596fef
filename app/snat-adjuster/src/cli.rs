use clap::{Args, Parser, ValueEnum};

#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    #[command(flatten)]
    pub global_args: GlobalArgs,
    /// output format of the applied (or planned) SNAT actions
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::TableWithHeaders)]
    pub output: OutputFormat,
}

#[derive(Debug, Default, Args)]
pub struct GlobalArgs {
    /// only consider pods from this namespace (all namespaces if unset)
    #[arg(short = 'n', long)]
    pub namespace: Option<String>,
    /// override default kubeconfig (skips in-cluster configuration)
    #[arg(long)]
    pub kube_config: Option<String>,
    /// override default kubeconfig context (skips in-cluster configuration)
    #[arg(long)]
    pub kube_context: Option<String>,
    /// cloud region of the NAT gateways (REGION env var if unset)
    #[arg(long)]
    pub region: Option<String>,
    /// gateway API endpoint (VOLC_ENDPOINT env var if unset)
    #[arg(long)]
    pub endpoint: Option<String>,
    /// if set, the plan is printed but no SNAT rule is created or deleted
    #[arg(long)]
    pub dry_run: bool,
    /// enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose_logging: bool,
    /// enable trace output (more detailed than verbose, overrides it if present)
    #[arg(long = "trace")]
    pub trace_logging: bool,
}

impl GlobalArgs {
    pub fn get_log_level(&self) -> LogLevel {
        if self.trace_logging {
            return LogLevel::Trace;
        }

        if self.verbose_logging {
            return LogLevel::Verbose;
        }

        LogLevel::Normal
    }
}

pub enum LogLevel {
    Normal,
    Verbose,
    Trace,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// pod names only
    Names,
    Table,
    TableWithHeaders,
    Json,
    JsonPretty,
    Yaml,
}
