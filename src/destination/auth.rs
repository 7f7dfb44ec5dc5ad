use base64::{Engine, engine::general_purpose::STANDARD};

use crate::{config, types::TokenResponse, utils};

/// Refreshes an expired destination access token using a refresh token.
///
/// Same shape as the source refresh: `grant_type=refresh_token` against the
/// destination token endpoint with Basic client credentials.
pub async fn refresh_token(refresh_token: &str) -> Result<TokenResponse, String> {
    let basic = STANDARD.encode(format!(
        "{}:{}",
        config::destination_client_id(),
        config::destination_client_secret()
    ));

    let client = utils::http_client();
    let res = client
        .post(config::destination_token_url())
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
