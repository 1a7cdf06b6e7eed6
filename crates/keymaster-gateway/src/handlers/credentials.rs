//! Credentials resource handlers.

use axum::extract::rejection::{BytesRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use keymaster_cipher::Envelope;
use keymaster_store::{Credential, StoreError};
use tracing::{debug, info};

use super::HandlerContext;
use crate::error::GatewayError;
use crate::protocol::CredentialsRequest;
use crate::routes::CredentialsRoute;
use crate::Result;

/// `/api/credentials`
pub async fn collection(
    State(ctx): State<HandlerContext>,
    method: Method,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Response> {
    let body = body?;
    let route = CredentialsRoute::resolve(&method, "")?;
    dispatch(&ctx, route, &body).await
}

/// `/api/credentials/*tail`
pub async fn item(
    State(ctx): State<HandlerContext>,
    method: Method,
    tail: std::result::Result<Path<String>, PathRejection>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Response> {
    let Path(tail) = tail?;
    let body = body?;
    let route = CredentialsRoute::resolve(&method, &tail)?;
    dispatch(&ctx, route, &body).await
}

async fn dispatch(ctx: &HandlerContext, route: CredentialsRoute, body: &[u8]) -> Result<Response> {
    let response = match route {
        CredentialsRoute::Create => {
            (StatusCode::CREATED, Json(create(ctx, body).await?)).into_response()
        }
        CredentialsRoute::Retrieve { app_name } => {
            Json(retrieve(ctx, &app_name).await?).into_response()
        }
        CredentialsRoute::Replace { app_name } => {
            Json(replace(ctx, &app_name, body).await?).into_response()
        }
        CredentialsRoute::Reissue { app_name } => {
            Json(reissue(ctx, &app_name).await?).into_response()
        }
    };
    Ok(response)
}

/// Bind new app names to a fresh credential.
pub async fn create(ctx: &HandlerContext, body: &[u8]) -> Result<Envelope> {
    let request = CredentialsRequest::parse(body)?;

    let bound = ctx
        .repository
        .existing_app_names(&request.app_name_list())
        .await?;
    if !bound.is_empty() {
        return Err(StoreError::Conflict(bound).into());
    }

    let cipher_key = keymaster_cipher::generate_key();
    let saved = ctx
        .repository
        .save(request.into_credential(cipher_key.to_string()))
        .await?;

    info!(
        credentials_id = ?saved.id,
        app_names = ?saved.app_name_list(),
        "created credential"
    );
    seal(&saved)
}

/// Seal the stored secrets of the credential bound to `app_name`.
pub async fn retrieve(ctx: &HandlerContext, app_name: &str) -> Result<Envelope> {
    let credential = ctx.repository.find_by_app_name(app_name).await?;
    debug!(app_name, credentials_id = ?credential.id, "retrieved credential");
    seal(&credential)
}

/// Substitute the app names and secrets of the credential bound to
/// `app_name`, keeping its cipher key.
pub async fn replace(ctx: &HandlerContext, app_name: &str, body: &[u8]) -> Result<Envelope> {
    let old = ctx.repository.find_by_app_name(app_name).await?;
    let request = CredentialsRequest::parse(body)?;

    let old_id = old
        .id
        .ok_or_else(|| GatewayError::Internal("stored credential has no id".to_string()))?;
    let replacement = request.into_credential(old.cipher_key);
    let saved = ctx.repository.replace_cascade(old_id, replacement).await?;

    info!(
        old_credentials_id = old_id,
        credentials_id = ?saved.id,
        app_names = ?saved.app_name_list(),
        "replaced credential"
    );
    seal(&saved)
}

/// Give the credential bound to `app_name` a new cipher key.
pub async fn reissue(ctx: &HandlerContext, app_name: &str) -> Result<Envelope> {
    let mut credential = ctx.repository.find_by_app_name(app_name).await?;
    credential.cipher_key = keymaster_cipher::generate_key().to_string();
    let saved = ctx.repository.save(credential).await?;

    info!(app_name, credentials_id = ?saved.id, "reissued cipher key");
    seal(&saved)
}

fn seal(credential: &Credential) -> Result<Envelope> {
    Ok(keymaster_cipher::seal(
        &credential.cipher_key,
        credential.secrets(),
    )?)
}
