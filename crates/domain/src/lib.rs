//! Domain-level building blocks shared by Supabase client consumers: the
//! project configuration and the process telemetry wiring.

pub mod config;
pub mod services;

pub use config::{
    project_config, ConfigError, SupabaseConfig, DEFAULT_SUPABASE_KEY, DEFAULT_SUPABASE_URL,
};
pub use services::telemetry::{
    init_telemetry, SubscriberOwner, TelemetryConfig, TelemetryError, TelemetryGuard,
};
