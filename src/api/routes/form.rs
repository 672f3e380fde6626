//! Report form handlers: render the form and accept submissions.

use super::ATTACHMENT_FIELD;
use crate::api::page::{self, Banner};
use crate::api::{AppState, body_limit};
use crate::config::UploadConfig;
use crate::error::{DispatchError, Error, Result, SubmissionError, ToHttpStatus};
// Named in the `utoipa::path` responses so the schema ref resolves to `ApiError`
#[allow(unused_imports)]
use crate::error::ApiError;
use crate::types::{Attachment, DispatchReport, LegOutcome, ReportFields, Submission};
use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{Field, MultipartError, MultipartRejection},
    },
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
};

/// GET / - Report form
#[utoipa::path(
    get,
    path = "/",
    tag = "form",
    responses(
        (status = 200, description = "HTML report form", content_type = "text/html")
    )
)]
pub async fn show_form(State(state): State<AppState>) -> Html<String> {
    Html(page::render_form(
        &state.config.upload,
        state.relay.is_configured(),
        None,
    ))
}

/// POST / - Submit a report with an optional attachment
///
/// Browsers get the form page back with a status banner. Clients that
/// send `Accept: application/json` get the dispatch report or an
/// [`crate::error::ApiError`] body with the same status code.
#[utoipa::path(
    post,
    path = "/",
    tag = "form",
    request_body(
        content = crate::types::ReportFields,
        description = "Report fields plus an optional `attachment` file part",
        content_type = "multipart/form-data"
    ),
    responses(
        (status = 200, description = "Report delivered (text, attachment, or both)", body = crate::types::DispatchReport),
        (status = 400, description = "Malformed form or file type not allowed", body = ApiError),
        (status = 413, description = "Attachment or request body too large", body = ApiError),
        (status = 500, description = "Temporary upload could not be stored", body = ApiError),
        (status = 502, description = "Telegram did not accept the report", body = ApiError),
        (status = 503, description = "BOT_TOKEN or CHAT_ID not set", body = ApiError)
    )
)]
pub async fn submit_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Response {
    let json = wants_json(&headers);

    let result = match multipart {
        Ok(multipart) => handle_submission(&state, multipart).await,
        Err(rejection) => Err(SubmissionError::MalformedForm(rejection.body_text()).into()),
    };

    match result {
        Ok(report) => {
            if json {
                return (StatusCode::OK, Json(report)).into_response();
            }
            render(&state, StatusCode::OK, Banner::Success(success_message(&report)))
        }
        Err(e) => {
            tracing::warn!(error = %e, code = e.error_code(), "report not delivered");
            if json {
                return e.into_response();
            }
            let status =
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            render(&state, status, Banner::Error(failure_message(&e)))
        }
    }
}

async fn handle_submission(state: &AppState, multipart: Multipart) -> Result<DispatchReport> {
    let submission = read_submission(multipart, &state.config.upload).await?;
    tracing::info!(
        attachment = ?submission.attachment,
        text_chars = submission.text.chars().count(),
        "received report"
    );
    state.relay.dispatch(submission).await
}

/// Collect report fields and the optional attachment from a multipart body.
///
/// The attachment's type is checked from its file name before the body is
/// read, and reading stops as soon as the size ceiling is passed.
async fn read_submission(mut multipart: Multipart, limits: &UploadConfig) -> Result<Submission> {
    let mut fields = ReportFields::default();
    let mut attachment = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| form_error(e, limits))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == ATTACHMENT_FIELD {
            let client_name = field.file_name().unwrap_or_default().to_string();
            if client_name.is_empty() {
                // Browsers post an empty file part when nothing was chosen
                continue;
            }
            Attachment::check_type(&client_name, limits)?;
            let bytes = read_capped(field, limits).await?;
            attachment = Some(Attachment::from_upload(&client_name, bytes, limits)?);
        } else {
            let value = field.text().await.map_err(|e| form_error(e, limits))?;
            if !fields.set(&name, value) {
                tracing::debug!(field = %name, "ignoring unknown form field");
            }
        }
    }

    Ok(fields.into_submission(attachment))
}

async fn read_capped(mut field: Field<'_>, limits: &UploadConfig) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(|e| form_error(e, limits))? {
        bytes.extend_from_slice(&chunk);
        let size = bytes.len() as u64;
        if size > limits.max_upload_bytes {
            return Err(SubmissionError::TooLarge {
                size,
                limit: limits.max_upload_bytes,
            }
            .into());
        }
    }
    Ok(bytes)
}

fn form_error(e: MultipartError, limits: &UploadConfig) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        SubmissionError::BodyTooLarge {
            limit: body_limit(limits),
        }
        .into()
    } else {
        SubmissionError::MalformedForm(e.body_text()).into()
    }
}

fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json") && !accept.contains("text/html"))
}

fn render(state: &AppState, status: StatusCode, banner: Banner) -> Response {
    let html = page::render_form(
        &state.config.upload,
        state.relay.is_configured(),
        Some(&banner),
    );
    (status, Html(html)).into_response()
}

fn success_message(report: &DispatchReport) -> String {
    match (&report.message, &report.attachment) {
        (LegOutcome::Failed { error }, _) => {
            format!("Attachment sent to Telegram ✅ but the report text failed: {error}")
        }
        (_, Some(LegOutcome::Failed { error })) => {
            format!("Report sent to Telegram ✅ but the attachment failed: {error}")
        }
        _ => "Report sent to Telegram ✅".to_string(),
    }
}

fn failure_message(error: &Error) -> String {
    match error {
        Error::Submission(e) => format!("Report not sent: {e}"),
        Error::Dispatch(DispatchError::Failed(reason)) => {
            format!("Failed to send report. Error: {reason}")
        }
        Error::Dispatch(e) => format!("Failed to send report. Error: {e}"),
        other => format!("Failed to send report. Error: {other}"),
    }
}
