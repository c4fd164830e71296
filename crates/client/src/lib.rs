//! Supabase client bootstrap: hands the project configuration to whichever
//! SDK the caller supplies and reports when none is available.

pub mod http;
pub mod init;
pub mod sdk;

pub use http::{ClientBuildError, HttpSdk, SupabaseClient};
pub use init::{
    init_client, init_project_client, InitOutcome, SupabaseInitializer, SDK_NOT_LOADED,
};
pub use sdk::SupabaseSdk;
pub use supabase_bootstrap_domain::config::{project_config, SupabaseConfig};
