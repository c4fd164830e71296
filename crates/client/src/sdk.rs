/// The client library the initializer delegates to.
///
/// Callers hand an implementation to [`crate::init_client`] instead of the
/// initializer looking one up from ambient state. Whatever `create_client`
/// returns is passed back to the caller unexamined, including any failure the
/// implementation chooses to encode in `Client`.
pub trait SupabaseSdk {
    type Client;

    fn create_client(&self, url: &str, key: &str) -> Self::Client;
}

impl<F, C> SupabaseSdk for F
where
    F: Fn(&str, &str) -> C,
{
    type Client = C;

    fn create_client(&self, url: &str, key: &str) -> C {
        self(url, key)
    }
}
