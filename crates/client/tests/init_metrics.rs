//! Runs in its own process so the global Prometheus recorder only sees the
//! calls made here.

use std::env;

use supabase_bootstrap_client::{init_client, project_config, HttpSdk, SupabaseConfig};
use supabase_bootstrap_domain::{init_telemetry, TelemetryConfig};

#[test]
fn only_the_missing_sdk_path_is_counted() {
    env::set_var("SUPABASE_BOOTSTRAP_SKIP_DOTENV", "1");
    env::remove_var("CLIENT_TEST_LOG_FILTER");
    env::remove_var("CLIENT_TEST_METRICS_ADDRESS");
    let telemetry =
        init_telemetry(&TelemetryConfig::from_env("CLIENT_TEST")).expect("telemetry inits");

    let created = init_client(Some(&|_: &str, _: &str| 7u8), project_config());
    assert_eq!(created, Some(7));
    assert!(!telemetry
        .render_metrics()
        .contains("supabase_client_init_total"));

    let config = SupabaseConfig::new("https://example.test", "test-key");
    assert!(init_client::<HttpSdk>(None, &config).is_none());
    let rendered = telemetry.render_metrics();
    assert!(rendered.contains(r#"supabase_client_init_total{result="sdk_missing"} 1"#));
    assert!(!rendered.contains(r#"result="created""#));
}
