use std::{env, net::SocketAddr, sync::Arc};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{hydrate_env_file, ConfigError};

static SUBSCRIBER_OWNER: OnceCell<SubscriberOwner> = OnceCell::new();
static PROMETHEUS: OnceCell<Arc<PrometheusHandle>> = OnceCell::new();

/// Observability options for processes embedding the Supabase client.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    log_filter: String,
    metrics_address: Option<String>,
}

impl TelemetryConfig {
    /// Reads `<PREFIX>_LOG_FILTER` (default `info`) and
    /// `<PREFIX>_METRICS_ADDRESS` (default: no listener).
    pub fn from_env(prefix: &str) -> Self {
        warn_unreadable_env_file(hydrate_env_file());

        let prefix = prefix.trim().to_ascii_uppercase();
        Self {
            log_filter: non_blank_var(&format!("{prefix}_LOG_FILTER"))
                .unwrap_or_else(|| "info".to_string()),
            metrics_address: non_blank_var(&format!("{prefix}_METRICS_ADDRESS")),
        }
    }

    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    pub fn metrics_address(&self) -> Option<&str> {
        self.metrics_address.as_deref()
    }
}

fn non_blank_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn warn_unreadable_env_file(result: Result<(), ConfigError>) {
    if let Err(err) = result {
        warn!(error = %err, "ignoring unreadable .env file");
    }
}

/// Who owns the process-wide tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberOwner {
    /// `init_telemetry` installed the fmt subscriber.
    Telemetry,
    /// A subscriber was already in place; events go to it.
    Host,
}

/// Handle to the Prometheus recorder plus the subscriber ownership decided on
/// the first successful call.
#[derive(Clone)]
pub struct TelemetryGuard {
    prometheus: Arc<PrometheusHandle>,
    subscriber: SubscriberOwner,
}

impl TelemetryGuard {
    pub fn render_metrics(&self) -> String {
        self.prometheus.render()
    }

    pub fn subscriber_owner(&self) -> SubscriberOwner {
        self.subscriber
    }

    pub fn shares_recorder_with(&self, other: &TelemetryGuard) -> bool {
        Arc::ptr_eq(&self.prometheus, &other.prometheus)
    }
}

/// Installs the fmt subscriber (unless the host already has one) and the
/// Prometheus recorder. Repeated calls return the same recorder and owner.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let subscriber = ensure_subscriber(config)?;
    let prometheus = ensure_recorder(config)?;

    Ok(TelemetryGuard {
        prometheus,
        subscriber,
    })
}

fn ensure_subscriber(config: &TelemetryConfig) -> Result<SubscriberOwner, TelemetryError> {
    if let Some(owner) = SUBSCRIBER_OWNER.get() {
        return Ok(*owner);
    }

    let filter = parse_log_filter(config.log_filter())?;
    let attempt = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init();
    let owner = match attempt {
        Ok(()) => SubscriberOwner::Telemetry,
        Err(err) => {
            warn!(error = %err, "keeping the tracing subscriber installed by the host");
            SubscriberOwner::Host
        }
    };

    Ok(*SUBSCRIBER_OWNER.get_or_init(|| owner))
}

fn ensure_recorder(config: &TelemetryConfig) -> Result<Arc<PrometheusHandle>, TelemetryError> {
    PROMETHEUS
        .get_or_try_init(|| {
            let builder = match config.metrics_address() {
                Some(address) => {
                    PrometheusBuilder::new().with_http_listener(parse_metrics_address(address)?)
                }
                None => PrometheusBuilder::new(),
            };
            builder
                .install_recorder()
                .map(Arc::new)
                .map_err(|err| TelemetryError::Recorder(err.to_string()))
        })
        .cloned()
}

fn parse_log_filter(filter: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(filter).map_err(|err| TelemetryError::LogFilter {
        filter: filter.to_string(),
        reason: err.to_string(),
    })
}

fn parse_metrics_address(address: &str) -> Result<SocketAddr, TelemetryError> {
    address
        .parse()
        .map_err(|err: std::net::AddrParseError| TelemetryError::MetricsAddress {
            address: address.to_string(),
            reason: err.to_string(),
        })
}

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter `{filter}`: {reason}")]
    LogFilter { filter: String, reason: String },
    #[error("invalid metrics address `{address}`: {reason}")]
    MetricsAddress { address: String, reason: String },
    #[error("failed to install prometheus recorder: {0}")]
    Recorder(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use tracing_test::traced_test;

    static ENV_GUARD: Mutex<()> = Mutex::new(());

    #[test]
    fn telemetry_config_uses_defaults() {
        let _guard = ENV_GUARD.lock().unwrap();
        env::set_var("SUPABASE_BOOTSTRAP_SKIP_DOTENV", "1");
        env::remove_var("SUPABASE_LOG_FILTER");
        env::remove_var("SUPABASE_METRICS_ADDRESS");

        let cfg = TelemetryConfig::from_env("supabase");
        assert_eq!(cfg.log_filter(), "info");
        assert_eq!(cfg.metrics_address(), None);
    }

    #[test]
    fn telemetry_config_reads_env() {
        let _guard = ENV_GUARD.lock().unwrap();
        env::set_var("SUPABASE_BOOTSTRAP_SKIP_DOTENV", "1");
        env::set_var("SUPABASE_LOG_FILTER", "supabase_bootstrap_client=debug");
        env::set_var("SUPABASE_METRICS_ADDRESS", "127.0.0.1:9898");

        let cfg = TelemetryConfig::from_env(" SUPABASE ");
        assert_eq!(cfg.log_filter(), "supabase_bootstrap_client=debug");
        assert_eq!(cfg.metrics_address(), Some("127.0.0.1:9898"));

        env::remove_var("SUPABASE_LOG_FILTER");
        env::remove_var("SUPABASE_METRICS_ADDRESS");
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let _guard = ENV_GUARD.lock().unwrap();
        env::set_var("SUPABASE_BOOTSTRAP_SKIP_DOTENV", "1");
        env::set_var("SUPABASE_LOG_FILTER", " ");
        env::set_var("SUPABASE_METRICS_ADDRESS", "  ");

        let cfg = TelemetryConfig::from_env("SUPABASE");
        assert_eq!(cfg.log_filter(), "info");
        assert_eq!(cfg.metrics_address(), None);

        env::remove_var("SUPABASE_LOG_FILTER");
        env::remove_var("SUPABASE_METRICS_ADDRESS");
    }

    #[traced_test]
    #[test]
    fn unreadable_env_file_is_logged() {
        warn_unreadable_env_file(Err(ConfigError::Dotenv {
            source: dotenvy::Error::LineParse("BROKEN LINE".to_string(), 0),
        }));

        assert!(logs_contain("ignoring unreadable .env file"));
    }

    #[traced_test]
    #[test]
    fn readable_env_file_logs_nothing() {
        warn_unreadable_env_file(Ok(()));

        assert!(!logs_contain("ignoring unreadable .env file"));
    }

    #[test]
    fn malformed_inputs_are_rejected() {
        assert!(matches!(
            parse_log_filter("supabase_bootstrap_client=loudest"),
            Err(TelemetryError::LogFilter { filter, .. }) if filter == "supabase_bootstrap_client=loudest"
        ));
        assert!(matches!(
            parse_metrics_address("not-an-address"),
            Err(TelemetryError::MetricsAddress { address, .. }) if address == "not-an-address"
        ));
        assert!(parse_metrics_address("127.0.0.1:9000").is_ok());
    }
}
