use rand::Rng;
use url::Url;

/// Generate a random anti-replay `state` value for the login redirect.
///
/// 16 random bytes, hex encoded.
pub fn generate_state() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill(&mut bytes);
    hex::encode(bytes)
}

/// Frontend URL carrying an `error` query parameter.
pub fn with_error_param(base: &Url, error: &str) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut().append_pair("error", error);
    url
}
