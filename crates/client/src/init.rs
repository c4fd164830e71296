use metrics::counter;
use tracing::error;

use supabase_bootstrap_domain::config::{project_config, SupabaseConfig};

use crate::sdk::SupabaseSdk;

/// Diagnostic emitted when no SDK was supplied.
pub const SDK_NOT_LOADED: &str = "Supabase SDK not loaded";

/// Creates a client through `sdk` when one is available.
///
/// With an SDK, `create_client` runs exactly once with the configured URL and
/// key, and its return value comes back untouched. Without one, a single
/// error event is logged, `supabase_client_init_total{result="sdk_missing"}`
/// is incremented, and `None` is returned. The SDK path records nothing of its
/// own. Nothing is cached: every call re-checks `sdk` and may construct a
/// fresh client.
pub fn init_client<S>(sdk: Option<&S>, config: &SupabaseConfig) -> Option<S::Client>
where
    S: SupabaseSdk + ?Sized,
{
    match sdk {
        Some(sdk) => Some(sdk.create_client(config.url(), config.key())),
        None => {
            counter!("supabase_client_init_total", "result" => "sdk_missing").increment(1);
            error!("{}", SDK_NOT_LOADED);
            None
        }
    }
}

/// [`init_client`] against the process-wide project configuration.
pub fn init_project_client<S>(sdk: Option<&S>) -> Option<S::Client>
where
    S: SupabaseSdk + ?Sized,
{
    init_client(sdk, project_config())
}

/// Two-variant view of an initialization attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome<C> {
    Created(C),
    SdkMissing,
}

impl<C> InitOutcome<C> {
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }

    pub fn into_option(self) -> Option<C> {
        match self {
            Self::Created(client) => Some(client),
            Self::SdkMissing => None,
        }
    }
}

impl<C> From<Option<C>> for InitOutcome<C> {
    fn from(value: Option<C>) -> Self {
        match value {
            Some(client) => Self::Created(client),
            None => Self::SdkMissing,
        }
    }
}

/// Owns a configuration together with the SDK (if any) it should be handed to.
#[derive(Debug, Clone)]
pub struct SupabaseInitializer<S> {
    config: SupabaseConfig,
    sdk: Option<S>,
}

impl<S> SupabaseInitializer<S>
where
    S: SupabaseSdk,
{
    pub fn with_sdk(config: SupabaseConfig, sdk: S) -> Self {
        Self {
            config,
            sdk: Some(sdk),
        }
    }

    pub fn without_sdk(config: SupabaseConfig) -> Self {
        Self { config, sdk: None }
    }

    pub fn config(&self) -> &SupabaseConfig {
        &self.config
    }

    pub fn has_sdk(&self) -> bool {
        self.sdk.is_some()
    }

    pub fn init(&self) -> Option<S::Client> {
        init_client(self.sdk.as_ref(), &self.config)
    }

    pub fn init_outcome(&self) -> InitOutcome<S::Client> {
        self.init().into()
    }
}
