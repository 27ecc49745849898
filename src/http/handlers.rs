//! Axum HTTP handlers for mock entity CRUD
//!
//! Reads serve stored artifacts verbatim; saves and deletes go through
//! validation before touching the store.

use axum::{
    extract::{
        multipart::{Multipart, MultipartError},
        FromRequest, Path, Request, State,
    },
    http::{header, HeaderName, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Form, Json,
};
use axum_extra::{headers::ContentType, TypedHeader};
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    domain::{
        entity::{Identifier, MockEntity},
        payload::{FormPayload, JsonPayload, SavePayload, SaveRequest},
    },
    errors::AppError,
    storage::{Artifact, StorageError},
    AppState,
};

pub const IDENTIFIER_HEADER: HeaderName = HeaderName::from_static("x-mock-identifier");

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ListedMock {
    pub name: String,
    pub entity: MockEntity,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// `GET /mock/api/mock/data/{name}`: the stored response body, byte for byte.
pub async fn read_content(
    State(state): State<AppState>,
    Path(name): Path<String>,
    uri: Uri,
) -> Result<Response, AppError> {
    let body = read_artifact(&state, &uri, &name, Artifact::Body).await?;
    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        body,
    )
        .into_response())
}

/// Any method on `/mock/api/mock/{name}`.
pub async fn mock_crud(
    State(state): State<AppState>,
    Path(name): Path<String>,
    content_type: Option<TypedHeader<ContentType>>,
    request: Request,
) -> Result<Response, AppError> {
    dispatch(&state, Some(name), content_type, request).await
}

/// Any method on `/mock/api/mock`, where no name is addressed.
pub async fn mock_collection(
    State(state): State<AppState>,
    content_type: Option<TypedHeader<ContentType>>,
    request: Request,
) -> Result<Response, AppError> {
    dispatch(&state, None, content_type, request).await
}

async fn dispatch(
    state: &AppState,
    name: Option<String>,
    content_type: Option<TypedHeader<ContentType>>,
    request: Request,
) -> Result<Response, AppError> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    match (&method, name) {
        (&Method::GET, Some(name)) => get_entity(state, &uri, &name).await,
        (&Method::GET, None) => list_entities(state).await,
        (&Method::POST | &Method::PUT, _) => save_entity(state, content_type, request).await,
        (&Method::DELETE, name) => delete_entity(state, &uri, name.as_deref().unwrap_or("")).await,
        _ => Err(AppError::bad_request("Unknown request method.")),
    }
}

async fn get_entity(state: &AppState, uri: &Uri, name: &str) -> Result<Response, AppError> {
    let metadata = read_artifact(state, uri, name, Artifact::Metadata).await?;
    Ok(([(header::CONTENT_TYPE, "application/json")], metadata).into_response())
}

async fn list_entities(state: &AppState) -> Result<Response, AppError> {
    let identifiers = state.store.list().await.map_err(AppError::from)?;

    let mut listed = Vec::with_capacity(identifiers.len());
    for identifier in identifiers {
        let decoded = match state
            .store
            .read_resource(&identifier, Artifact::Metadata)
            .await
        {
            Ok(metadata) => {
                serde_json::from_slice::<MockEntity>(&metadata).map_err(|err| err.to_string())
            }
            Err(err) => Err(err.to_string()),
        };

        match decoded {
            Ok(entity) => listed.push(ListedMock {
                name: identifier.to_string(),
                entity,
            }),
            Err(error) => {
                warn!(identifier = %identifier, error = %error, "skipping unreadable mock metadata");
            }
        }
    }

    Ok(Json(listed).into_response())
}

async fn save_entity(
    state: &AppState,
    content_type: Option<TypedHeader<ContentType>>,
    request: Request,
) -> Result<Response, AppError> {
    let mut save = decode_save_request(content_type, request).await;
    save.validate_with(state.validator.as_ref());
    if !save.is_valid() {
        return Err(AppError::validation(save.field_errors));
    }

    let identifier = state
        .store
        .write_entity(&save.entity, &save.body)
        .await
        .map_err(|err| AppError::internal(err.to_string()))?;

    info!(
        identifier = %identifier,
        uri = %save.entity.uri,
        method = %save.entity.method,
        status_code = save.entity.status_code,
        "mock saved"
    );

    Ok((
        StatusCode::FOUND,
        [
            (header::LOCATION, state.management_path.to_string()),
            (IDENTIFIER_HEADER, identifier.to_string()),
        ],
    )
        .into_response())
}

async fn delete_entity(state: &AppState, uri: &Uri, name: &str) -> Result<Response, AppError> {
    let identifier = parse_identifier(uri, name)?;
    info!(identifier = %identifier, "deleting mock");

    // Both artifacts are attempted even when the first removal fails.
    let mut failures = Vec::new();
    for artifact in [Artifact::Metadata, Artifact::Body] {
        if let Err(err) = state.store.remove(&identifier, artifact).await {
            failures.push(format!("{} artifact: {err}", artifact.label()));
        }
    }

    if failures.is_empty() {
        Ok(StatusCode::OK.into_response())
    } else {
        Err(AppError::internal(format!(
            "Failed to delete {identifier}: {}",
            failures.join("; ")
        )))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PayloadKind {
    Json,
    Multipart,
    UrlEncoded,
}

async fn decode_save_request(
    content_type: Option<TypedHeader<ContentType>>,
    request: Request,
) -> SaveRequest {
    match payload_kind(content_type.as_ref()) {
        PayloadKind::Json => match Json::<JsonPayload>::from_request(request, &()).await {
            Ok(Json(payload)) => SaveRequest::from(SavePayload::Json(payload)),
            Err(rejection) => SaveRequest::undecodable("json", rejection.body_text()),
        },
        PayloadKind::Multipart => match Multipart::from_request(request, &()).await {
            Ok(multipart) => match read_multipart_form(multipart).await {
                Ok(payload) => SaveRequest::from(SavePayload::Form(payload)),
                Err(err) => SaveRequest::undecodable("form", err.body_text()),
            },
            Err(rejection) => SaveRequest::undecodable("form", rejection.body_text()),
        },
        PayloadKind::UrlEncoded => match Form::<FormPayload>::from_request(request, &()).await {
            Ok(Form(payload)) => SaveRequest::from(SavePayload::Form(payload)),
            Err(rejection) => SaveRequest::undecodable("form", rejection.body_text()),
        },
    }
}

// Same field names as the urlencoded form; unknown parts are skipped unread.
async fn read_multipart_form(mut multipart: Multipart) -> Result<FormPayload, MultipartError> {
    let mut payload = FormPayload::default();
    while let Some(field) = multipart.next_field().await? {
        let slot = match field.name() {
            Some("URI") => &mut payload.uri,
            Some("Method") => &mut payload.method,
            Some("ContentType") => &mut payload.content_type,
            Some("StatusCode") => &mut payload.status_code,
            Some("body") => &mut payload.body,
            _ => continue,
        };
        *slot = field.text().await?;
    }
    Ok(payload)
}

fn payload_kind(content_type: Option<&TypedHeader<ContentType>>) -> PayloadKind {
    let Some(TypedHeader(content_type)) = content_type else {
        return PayloadKind::UrlEncoded;
    };

    let value = content_type.to_string();
    let essence = value.split(';').next().unwrap_or_default().trim();
    if essence.eq_ignore_ascii_case("application/json") {
        PayloadKind::Json
    } else if essence.eq_ignore_ascii_case("multipart/form-data") {
        PayloadKind::Multipart
    } else {
        PayloadKind::UrlEncoded
    }
}

fn parse_identifier(uri: &Uri, name: &str) -> Result<Identifier, AppError> {
    Identifier::parse(name).map_err(|_| {
        AppError::bad_request(format!(
            "Invalid request, name may only be [0-9A-Za-z_]: {uri}"
        ))
    })
}

async fn read_artifact(
    state: &AppState,
    uri: &Uri,
    name: &str,
    artifact: Artifact,
) -> Result<Vec<u8>, AppError> {
    let identifier = parse_identifier(uri, name)?;
    state
        .store
        .read_resource(&identifier, artifact)
        .await
        .map_err(|err| match err {
            StorageError::NotFound { .. } => AppError::not_found(format!(
                "Was not able to find resource: {uri} Failed with error: {err}"
            )),
            other => AppError::internal(format!(
                "Internal error while reading resource: {uri} Failed with error: {other}"
            )),
        })
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn content_type_header(value: &'static str) -> Option<TypedHeader<ContentType>> {
        use axum_extra::headers::{Header, HeaderMapExt};

        let mut headers = axum::http::HeaderMap::new();
        headers.insert(ContentType::name(), HeaderValue::from_static(value));
        headers.typed_get::<ContentType>().map(TypedHeader)
    }

    #[test]
    fn payload_kind_ignores_parameters_and_case() {
        let kind = |value| payload_kind(content_type_header(value).as_ref());

        assert_eq!(kind("application/json"), PayloadKind::Json);
        assert_eq!(kind("Application/JSON; charset=utf-8"), PayloadKind::Json);
        assert_eq!(kind("multipart/form-data; boundary=xyz"), PayloadKind::Multipart);
        assert_eq!(
            kind("application/x-www-form-urlencoded"),
            PayloadKind::UrlEncoded
        );
        assert_eq!(kind("text/json"), PayloadKind::UrlEncoded);
        assert_eq!(payload_kind(None), PayloadKind::UrlEncoded);
    }

    #[test]
    fn invalid_name_message_mentions_request() {
        let uri: Uri = "/mock/api/mock/fo!o".parse().expect("valid uri");
        let err = parse_identifier(&uri, "fo!o").expect_err("expected invalid name");
        assert_eq!(
            err.to_string(),
            "Invalid request, name may only be [0-9A-Za-z_]: /mock/api/mock/fo!o"
        );
    }
}
