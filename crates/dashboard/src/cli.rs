use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dashboard", version, about = "Pulseboard dashboard service")]
pub(crate) struct Args {
    #[arg(long, default_value = "config/dashboard-config.toml")]
    pub(crate) config: PathBuf,
    #[arg(long, default_value = "127.0.0.1:19409")]
    pub(crate) listen_addr: String,
    /// Overrides api.base_url from the config file.
    #[arg(long)]
    pub(crate) api_base_url: Option<String>,
    #[arg(long, default_value_t = false)]
    pub(crate) log_to_stderr: bool,
}
