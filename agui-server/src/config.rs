//! Server configuration from flags and environment.

use std::net::SocketAddr;
use std::time::Duration;

use agui_core::orchestrator::DEFAULT_USER_ID;
use agui_core::AdapterConfig;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "agui-server", version, about = "AG-UI streaming server")]
pub struct Config {
    /// Interface to bind.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Application name used for runner sessions.
    #[arg(long, env = "APP_NAME", default_value = "agent-rs-ag-ui")]
    pub app_name: String,

    /// User that runner sessions are attributed to.
    #[arg(long, env = "AGUI_USER_ID", default_value = DEFAULT_USER_ID)]
    pub user_id: String,

    /// Hard limit on one agent run, in seconds.
    #[arg(long, env = "AGUI_RUN_TIMEOUT_SECS", default_value_t = 60)]
    pub run_timeout_secs: u64,

    /// Thread state idle longer than this is evicted, in seconds.
    #[arg(long, env = "AGUI_STATE_TTL_SECS", default_value_t = 3600)]
    pub state_ttl_secs: u64,

    /// How often to sweep thread state, in seconds. 0 disables the sweep.
    #[arg(long, env = "AGUI_CLEANUP_INTERVAL_SECS", default_value_t = 300)]
    pub cleanup_interval_secs: u64,

    /// Grace period for in-flight streams on shutdown, in seconds.
    #[arg(long, env = "AGUI_SHUTDOWN_TIMEOUT_SECS", default_value_t = 5)]
    pub shutdown_timeout_secs: u64,
}

impl Config {
    /// Load `.env` if present, then parse the command line.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::parse()
    }

    /// Address to bind, as `host:port`.
    pub fn bind_addr(&self) -> String {
        match self.host.parse::<std::net::IpAddr>() {
            Ok(ip) => SocketAddr::new(ip, self.port).to_string(),
            Err(_) => format!("{}:{}", self.host, self.port),
        }
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }

    pub fn state_ttl(&self) -> Duration {
        Duration::from_secs(self.state_ttl_secs)
    }

    /// `None` when the sweep is disabled.
    pub fn cleanup_interval(&self) -> Option<Duration> {
        (self.cleanup_interval_secs > 0).then(|| Duration::from_secs(self.cleanup_interval_secs))
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// Adapter settings derived from this configuration.
    pub fn adapter_config(&self) -> AdapterConfig {
        AdapterConfig {
            app_name: self.app_name.clone(),
            timeout: self.run_timeout(),
            ..AdapterConfig::default()
        }
    }
}
