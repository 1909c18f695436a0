//! CORS policy.
//!
//! Every origin, method and header is allowed. Credentials are only
//! allowed when explicitly enabled: browsers refuse `*` together with
//! credentials, so that mode reflects the caller's origin instead, which
//! lets any site make credentialed requests.

use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

pub fn cors_layer(allow_credentials: bool) -> CorsLayer {
    if !allow_credentials {
        return CorsLayer::permissive();
    }
    tracing::warn!(
        "CORS_ALLOW_CREDENTIALS is enabled: any origin may send credentialed requests"
    );
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
