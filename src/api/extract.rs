use super::error::ApiError;
use crate::attachments::Upload;
use crate::core::{Caller, NewTicket};
use crate::error::OfficeTicketError;
use crate::service::TicketService;
use async_trait::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Multipart, Request};
use axum::http::request::Parts;
use axum::http::{HeaderMap, header};
use axum::Json;

/// Multipart field carrying attachments
const ATTACHMENT_FIELD: &str = "attachments";

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then_some(token.trim())
}

/// The verified caller, or anonymous when no token was sent
///
/// A token that is present but invalid is rejected with 401 rather than
/// downgraded to anonymous.
#[derive(Debug, Clone)]
pub struct RequestCaller(pub Caller);

#[async_trait]
impl FromRequestParts<TicketService> for RequestCaller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        service: &TicketService,
    ) -> Result<Self, Self::Rejection> {
        let caller = service.caller(bearer_token(&parts.headers)).await?;
        Ok(Self(caller))
    }
}

/// Ticket intake from either a JSON body or a multipart form
#[derive(Debug)]
pub struct TicketIntake {
    pub ticket: NewTicket,
    pub uploads: Vec<Upload>,
}

#[async_trait]
impl FromRequest<TicketService> for TicketIntake {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &TicketService) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("multipart/form-data"));

        if !is_multipart {
            let Json(ticket) = Json::<NewTicket>::from_request(req, state)
                .await
                .map_err(|e| OfficeTicketError::InvalidInput(e.body_text()))?;
            return Ok(Self {
                ticket,
                uploads: Vec::new(),
            });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| OfficeTicketError::InvalidInput(e.body_text()))?;
        read_multipart(&mut multipart).await
    }
}

async fn read_multipart(multipart: &mut Multipart) -> Result<TicketIntake, ApiError> {
    let invalid = |e: axum::extract::multipart::MultipartError| {
        OfficeTicketError::InvalidInput(format!("Malformed form data: {}", e.body_text()))
    };

    let mut ticket = NewTicket {
        employee_name: String::new(),
        employee_email: String::new(),
        department: String::new(),
        location: String::new(),
        category: String::new(),
        sub_category: None,
        description: String::new(),
    };
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == ATTACHMENT_FIELD {
            let file_name = field.file_name().unwrap_or("attachment").to_string();
            let bytes = field.bytes().await.map_err(invalid)?;
            uploads.push(Upload::new(file_name, bytes.to_vec()));
            continue;
        }

        let value = field.text().await.map_err(invalid)?;
        match name.as_str() {
            "employee_name" => ticket.employee_name = value,
            "employee_email" => ticket.employee_email = value,
            "department" => ticket.department = value,
            "location" => ticket.location = value,
            "category" => ticket.category = value,
            "sub_category" => ticket.sub_category = Some(value),
            "description" => ticket.description = value,
            other => tracing::debug!("Ignoring unknown form field {other}"),
        }
    }

    Ok(TicketIntake { ticket, uploads })
}
