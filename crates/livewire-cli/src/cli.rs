use clap::Parser;

/// livewire: follow a broadcast and a per-user realtime channel.
#[derive(Parser, Debug)]
#[command(name = "livewire", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Credential for the user channel.
    #[arg(long, env = "LIVEWIRE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Only follow the broadcast channel.
    #[arg(long)]
    pub broadcast_only: bool,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Args {
    /// Whether the user channel should be opened.
    pub fn follows_user(&self) -> bool {
        !self.broadcast_only && self.token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

pub fn parse() -> Args {
    Args::parse()
}
