// src/handlers/imports.rs

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::catalog::{DataImport, ImportType},
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportStartedResponse {
    pub import_id: Uuid,
}

/// Shape of the multipart form, for the docs page only.
#[derive(Debug, ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ImportUploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: String,
    pub import_type: ImportType,
}

// POST /api/import/upload
//
// The upload returns as soon as the import record exists; the parsing runs
// detached and progress is read back from the status endpoint.
#[utoipa::path(
    post,
    path = "/api/import/upload",
    tag = "Imports",
    request_body(content = ImportUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 202, description = "Import accepted and running", body = ImportStartedResponse),
        (status = 400, description = "Missing file, empty file or unknown import type")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_import(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut filename: Option<String> = None;
    let mut bytes: Option<Vec<u8>> = None;
    let mut import_type: Option<ImportType> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Malformed multipart request: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                filename = field.file_name().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Failed to read upload: {}", e)))?;
                bytes = Some(data.to_vec());
            }
            Some("importType") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Failed to read upload: {}", e)))?;
                import_type = Some(parse_import_type(&raw)?);
            }
            _ => {}
        }
    }

    let bytes =
        bytes.ok_or_else(|| AppError::InvalidInput("Missing 'file' field.".to_string()))?;
    let import_type = import_type
        .ok_or_else(|| AppError::InvalidInput("Missing 'importType' field.".to_string()))?;
    let filename = filename.unwrap_or_else(|| "upload.csv".to_string());

    let import = app_state
        .import_service
        .start_import(&filename, import_type, bytes, &user)
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(ImportStartedResponse {
            import_id: import.id,
        }),
    ))
}

// GET /api/import/{id}/status
#[utoipa::path(
    get,
    path = "/api/import/{id}/status",
    tag = "Imports",
    responses(
        (status = 200, description = "Current status, counters and row errors", body = DataImport),
        (status = 404, description = "Unknown import")
    ),
    params(
        ("id" = Uuid, Path, description = "Import id")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_import_status(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DataImport>, AppError> {
    let import = app_state.import_service.get_status(id).await?;
    Ok(Json(import))
}

fn parse_import_type(raw: &str) -> Result<ImportType, AppError> {
    match raw.trim() {
        "appliance_matrix" => Ok(ImportType::ApplianceMatrix),
        "kbb_pricelist" => Ok(ImportType::KbbPricelist),
        other => Err(AppError::InvalidInput(format!(
            "Unknown import type '{}'.",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_type_field_accepts_known_values_only() {
        assert_eq!(
            parse_import_type("appliance_matrix").unwrap(),
            ImportType::ApplianceMatrix
        );
        assert_eq!(
            parse_import_type(" kbb_pricelist ").unwrap(),
            ImportType::KbbPricelist
        );
        assert!(parse_import_type("price_matrix").is_err());
    }
}
