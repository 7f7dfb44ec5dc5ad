use base64::{Engine, engine::general_purpose::STANDARD};

use crate::{config, types::TokenResponse, utils};

/// Refreshes an expired access token using a refresh token.
///
/// Exchanges a refresh token for a new access token at the source provider's
/// token endpoint, authenticating the client with Basic credentials. The
/// response carries the new access token, its lifetime in seconds, and a
/// replacement refresh token only if the provider rotated it.
///
/// # Errors
///
/// Returns an error message on network failure, a non-success status from
/// the token endpoint, or a malformed response body. The caller (the
/// credential store) clears the credential on any of these.
pub async fn refresh_token(refresh_token: &str) -> Result<TokenResponse, String> {
    let basic = STANDARD.encode(format!(
        "{}:{}",
        config::source_client_id(),
        config::source_client_secret()
    ));

    let client = utils::http_client();
    let res = client
        .post(config::source_token_url())
        .header(reqwest::header::AUTHORIZATION, format!("Basic {basic}"))
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if !res.status().is_success() {
        return Err(format!("token endpoint returned {}", res.status()));
    }

    res.json::<TokenResponse>().await.map_err(|e| e.to_string())
}
