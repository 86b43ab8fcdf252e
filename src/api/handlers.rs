use super::error::ApiResult;
use super::extract::{RequestCaller, TicketIntake};
use crate::core::{
    DashboardStats, Registration, Status, StatusChange, Ticket, TicketDetail, TicketFilter,
    TicketNo, User,
};
use crate::service::{LoginResponse, TicketService};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: Status,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub assigned_to: String,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub comment: String,
}

fn parse_ticket_no(raw: &str) -> ApiResult<TicketNo> {
    Ok(raw.parse()?)
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "timestamp": chrono::Utc::now(),
    }))
}

pub async fn register(
    State(service): State<TicketService>,
    RequestCaller(caller): RequestCaller,
    Json(registration): Json<Registration>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = service.register_user(&caller, registration).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn register_employee(
    State(service): State<TicketService>,
    Json(registration): Json<Registration>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = service.register_employee(registration).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(service): State<TicketService>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    Ok(Json(service.login(&request.email, &request.password).await?))
}

pub async fn create_ticket(
    State(service): State<TicketService>,
    intake: TicketIntake,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let ticket = service.create_ticket(intake.ticket, intake.uploads).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Ticket created successfully",
            "ticket_no": ticket.ticket_no,
            "ticket": ticket,
        })),
    ))
}

pub async fn list_tickets(
    State(service): State<TicketService>,
    RequestCaller(caller): RequestCaller,
    Query(filter): Query<TicketFilter>,
) -> ApiResult<Json<Vec<Ticket>>> {
    Ok(Json(service.list_tickets(&caller, filter).await?))
}

pub async fn my_tickets(
    State(service): State<TicketService>,
    RequestCaller(caller): RequestCaller,
) -> ApiResult<Json<Vec<Ticket>>> {
    Ok(Json(service.my_tickets(&caller).await?))
}

pub async fn manager_tickets(
    State(service): State<TicketService>,
    RequestCaller(caller): RequestCaller,
    Query(filter): Query<TicketFilter>,
) -> ApiResult<Json<Vec<Ticket>>> {
    Ok(Json(service.manager_tickets(&caller, filter).await?))
}

pub async fn manager_stats(
    State(service): State<TicketService>,
    RequestCaller(caller): RequestCaller,
) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(service.manager_stats(&caller).await?))
}

pub async fn assign_ticket(
    State(service): State<TicketService>,
    RequestCaller(caller): RequestCaller,
    Path(ticket_no): Path<String>,
    Json(request): Json<AssignRequest>,
) -> ApiResult<Json<Ticket>> {
    let ticket_no = parse_ticket_no(&ticket_no)?;
    let ticket = service
        .assign_ticket(
            &caller,
            &ticket_no,
            &request.assigned_to,
            request.comment.as_deref(),
        )
        .await?;
    Ok(Json(ticket))
}

pub async fn ticket_detail(
    State(service): State<TicketService>,
    Path(ticket_no): Path<String>,
) -> ApiResult<Json<TicketDetail>> {
    let ticket_no = parse_ticket_no(&ticket_no)?;
    Ok(Json(service.ticket_detail(&ticket_no).await?))
}

pub async fn add_comment(
    State(service): State<TicketService>,
    RequestCaller(caller): RequestCaller,
    Path(ticket_no): Path<String>,
    Json(request): Json<CommentRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let ticket_no = parse_ticket_no(&ticket_no)?;
    service
        .add_comment(&caller, &ticket_no, &request.comment)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Comment added successfully" })),
    ))
}

pub async fn change_status(
    State(service): State<TicketService>,
    RequestCaller(caller): RequestCaller,
    Path(ticket_no): Path<String>,
    Json(request): Json<StatusRequest>,
) -> ApiResult<Json<Ticket>> {
    let ticket_no = parse_ticket_no(&ticket_no)?;
    let mut change = StatusChange::to(request.status);
    if let Some(comment) = request.comment {
        change = change.with_comment(comment);
    }
    if let Some(assigned_to) = request.assigned_to {
        change = change.with_assignee(assigned_to);
    }
    Ok(Json(
        service.change_status(&caller, &ticket_no, change).await?,
    ))
}

pub async fn freeze_old(
    State(service): State<TicketService>,
    RequestCaller(caller): RequestCaller,
) -> ApiResult<Json<Value>> {
    let frozen = service.freeze_sweep(&caller).await?;
    Ok(Json(json!({
        "message": format!("{frozen} tickets frozen"),
        "frozen": frozen,
    })))
}

pub async fn dashboard(
    State(service): State<TicketService>,
    RequestCaller(caller): RequestCaller,
) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(service.dashboard(&caller).await?))
}

pub async fn list_users(
    State(service): State<TicketService>,
    RequestCaller(caller): RequestCaller,
) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(service.list_users(&caller).await?))
}
