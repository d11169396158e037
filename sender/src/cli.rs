use clap::Args as ClapArgs;

use crate::config::{DEFAULT_CONFIG_PATH, FileConfig, Overrides, Settings};

/// Flags of `sbsend`. Use with `#[command(flatten)] send: SendArgs` and
/// `args_override_self = true` so a repeated flag keeps its last value.
#[derive(Clone, Debug, ClapArgs)]
pub struct SendArgs {
    /// Path to the JSON config file (optional)
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Number of messages to send [config default: 5]
    #[arg(short = 'c', long = "count", value_name = "MessageCount")]
    pub count: Option<u32>,

    /// Message prefix; "hoge" gives "hoge msg <n>/<count> yyyy/mm/dd hh:mm:ss"
    #[arg(short = 'p', long = "prefix", value_name = "MessagePrefix")]
    pub prefix: Option<String>,

    /// Destination queue name
    #[arg(short = 'n', long = "name", value_name = "QueueName")]
    pub name: Option<String>,

    /// Connection string (Endpoint=..;Region=..;AccessKeyId=..;SecretAccessKey=..)
    #[arg(short = 's', long = "connectionstring", value_name = "ConnectionString")]
    pub connection_string: Option<String>,
}

impl SendArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            count: self.count,
            prefix: self.prefix.clone(),
            queue_name: self.name.clone(),
            connection_string: self.connection_string.clone(),
        }
    }
}

/// Config file merged with the flags.
pub fn merged_settings(args: &SendArgs) -> Settings {
    Settings::merge(FileConfig::load(&args.config), &args.overrides())
}

/// What `sbsend` does with the merged settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launch {
    /// No connection string: print usage and exit without touching the network.
    Usage,
    Send(Settings),
}

pub fn launch(args: &SendArgs) -> Launch {
    let settings = merged_settings(args);
    if settings.has_connection() {
        Launch::Send(settings)
    } else {
        Launch::Usage
    }
}
