use axum::{
    extract::Request,
    http::header,
    middleware::Next,
    response::IntoResponse,
};

use axum_extra::extract::cookie::CookieJar;

use crate::{
    error::{ErrorMessage, HttpError},
    upstream::BrokerSession,
    utils::token,
};

/// Requires a broker token from the `token` cookie or an `Authorization:
/// Bearer` header and exposes it to handlers as a [`BrokerSession`]. The token
/// is not verified here; the property API decides whether it is still valid.
pub async fn auth(
    cookie_jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, HttpError> {
    let token = cookie_jar
        .get("token")
        .map(|cookie| cookie.value().trim().to_string())
        .filter(|token| !token.is_empty())
        .or_else(|| {
            req.headers()
                .get(header::AUTHORIZATION)
                .and_then(|auth_header| auth_header.to_str().ok())
                .and_then(token::bearer_from_header)
        });

    let token = token.ok_or_else(|| {
        HttpError::unauthorized(ErrorMessage::TokenNotProvided.to_string())
    })?;

    let session = BrokerSession::new(token);
    tracing::debug!(session = %session.fingerprint(), "authenticated request");

    req.extensions_mut().insert(session);

    Ok(next.run(req).await)
}
