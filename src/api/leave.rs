use actix_web::{HttpResponse, Responder, error::ErrorBadRequest, web};
use chrono::{FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::config::Config;
use crate::model::leave_application::{ApplicationStatus, LeaveApplication, LeaveType};
use crate::workflow::{
    Actor, ApplicationStore, ApplicationSummary, LeaveAction, LeaveRequest, LeaveWorkflow,
    UserDirectory,
};

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = "SICK")]
    pub leave_type: LeaveType,
    #[schema(example = "2024-03-01", format = "date", value_type = String)]
    pub from_date: NaiveDate,
    #[schema(example = "2024-03-03", format = "date", value_type = String)]
    pub to_date: NaiveDate,
    #[schema(example = "Fever, doctor advised rest")]
    pub reason: String,
}

#[derive(Deserialize, ToSchema)]
pub struct RejectLeave {
    #[schema(example = "insufficient notice")]
    pub reason: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    /// Filter by leave status
    #[schema(example = "PENDING_FACULTY")]
    pub status: Option<ApplicationStatus>,
    /// Pagination page number (start with 1)
    #[schema(example = 1)]
    pub page: Option<u64>,
    /// Pagination per page number
    #[schema(example = 10)]
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveApplication>,
    #[schema(example = 1)]
    pub page: u64,
    #[schema(example = 10)]
    pub per_page: u64,
    #[schema(example = 1)]
    pub total: u64,
}

#[derive(Deserialize, IntoParams)]
pub struct SummaryQuery {
    /// Caller's offset from UTC in minutes, e.g. 330 for UTC+05:30
    pub tz_offset_minutes: Option<i32>,
}

#[derive(Serialize, ToSchema)]
pub struct SummaryResponse {
    #[serde(flatten)]
    pub summary: ApplicationSummary,
    /// Faculty registered in the department; HOD only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faculty_members: Option<u64>,
}

/* =========================
Create leave application
========================= */
/// Submit a leave application (student)
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body(content = CreateLeave, description = "Leave application", content_type = "application/json"),
    responses(
        (status = 201, description = "Application submitted", body = LeaveApplication),
        (status = 400, description = "to_date before from_date"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only students can apply"),
        (status = 422, description = "No unique faculty or HOD assigned")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn create_leave<S, D>(
    actor: Actor,
    workflow: web::Data<LeaveWorkflow<S, D>>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder>
where
    S: ApplicationStore + 'static,
    D: UserDirectory + 'static,
{
    let payload = payload.into_inner();
    let request = LeaveRequest {
        leave_type: payload.leave_type,
        from_date: payload.from_date,
        to_date: payload.to_date,
        reason: payload.reason.trim().to_string(),
    };

    let application = workflow
        .create_application(&actor, actor.id, request)
        .await?;

    Ok(HttpResponse::Created().json(application))
}

/// List the applications visible to the caller
#[utoipa::path(
    get,
    path = "/api/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn leave_list<S, D>(
    actor: Actor,
    workflow: web::Data<LeaveWorkflow<S, D>>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder>
where
    S: ApplicationStore + 'static,
    D: UserDirectory + 'static,
{
    let visible = workflow.list_visible_applications(&actor).await?;
    Ok(HttpResponse::Ok().json(paginate(visible, &query)))
}

/// Applies the status filter, then cuts out the requested page.
fn paginate(mut visible: Vec<LeaveApplication>, filter: &LeaveFilter) -> LeaveListResponse {
    let per_page = filter.per_page.unwrap_or(10).clamp(1, 100);
    let page = filter.page.unwrap_or(1).max(1);
    // Pages past the end are empty, never an overflow.
    let offset = usize::try_from((page - 1).saturating_mul(per_page)).unwrap_or(usize::MAX);

    if let Some(status) = filter.status {
        visible.retain(|app| app.status == status);
    }

    let total = visible.len() as u64;
    let data = visible
        .into_iter()
        .skip(offset)
        .take(per_page as usize)
        .collect();

    LeaveListResponse {
        data,
        page,
        per_page,
        total,
    }
}

/// Status counts over the caller's visible applications
#[utoipa::path(
    get,
    path = "/api/leave/summary",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Derived counts", body = SummaryResponse),
        (status = 400, description = "Offset out of range"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn leave_summary<S, D>(
    actor: Actor,
    workflow: web::Data<LeaveWorkflow<S, D>>,
    config: web::Data<Config>,
    query: web::Query<SummaryQuery>,
) -> actix_web::Result<impl Responder>
where
    S: ApplicationStore + 'static,
    D: UserDirectory + 'static,
{
    let offset = utc_offset(
        query
            .tz_offset_minutes
            .unwrap_or(config.default_utc_offset_minutes),
    )?;

    let summary = workflow
        .summarize_visible(&actor, Utc::now(), offset)
        .await?;
    let faculty_members = workflow.department_faculty_count(&actor).await?;

    Ok(HttpResponse::Ok().json(SummaryResponse {
        summary,
        faculty_members,
    }))
}

fn utc_offset(minutes: i32) -> actix_web::Result<FixedOffset> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| ErrorBadRequest("tz_offset_minutes out of range"))
}

/// Fetch one application the caller may see
#[utoipa::path(
    get,
    path = "/api/leave/{leave_id}",
    params(("leave_id" = u64, Path, description = "ID of the leave application")),
    responses(
        (status = 200, description = "Leave application", body = LeaveApplication),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Outside the caller's scope"),
        (status = 404, description = "Leave application not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn get_leave<S, D>(
    actor: Actor,
    workflow: web::Data<LeaveWorkflow<S, D>>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder>
where
    S: ApplicationStore + 'static,
    D: UserDirectory + 'static,
{
    let application = workflow
        .get_visible_application(&actor, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(application))
}

/* =========================
Review decisions
========================= */
/// Approve: faculty forward to the HOD, the HOD grants the leave
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/approve",
    params(("leave_id" = u64, Path, description = "ID of the leave application")),
    responses(
        (status = 200, description = "Application moved forward", body = LeaveApplication),
        (status = 403, description = "Not the assigned reviewer"),
        (status = 404, description = "Leave application not found"),
        (status = 409, description = "Not awaiting this reviewer, or already decided")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn approve_leave<S, D>(
    actor: Actor,
    workflow: web::Data<LeaveWorkflow<S, D>>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder>
where
    S: ApplicationStore + 'static,
    D: UserDirectory + 'static,
{
    let application = workflow
        .transition(&actor, path.into_inner(), LeaveAction::Approve, None)
        .await?;
    Ok(HttpResponse::Ok().json(application))
}

/// Reject with a reason
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/reject",
    params(("leave_id" = u64, Path, description = "ID of the leave application")),
    request_body(content = RejectLeave, content_type = "application/json"),
    responses(
        (status = 200, description = "Application rejected", body = LeaveApplication),
        (status = 400, description = "Rejection reason missing"),
        (status = 403, description = "Not the assigned reviewer"),
        (status = 404, description = "Leave application not found"),
        (status = 409, description = "Not awaiting this reviewer, or already decided")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn reject_leave<S, D>(
    actor: Actor,
    workflow: web::Data<LeaveWorkflow<S, D>>,
    path: web::Path<u64>,
    payload: Option<web::Json<RejectLeave>>,
) -> actix_web::Result<impl Responder>
where
    S: ApplicationStore + 'static,
    D: UserDirectory + 'static,
{
    let reason = payload.and_then(|p| p.into_inner().reason);
    let application = workflow
        .transition(&actor, path.into_inner(), LeaveAction::Reject, reason)
        .await?;
    Ok(HttpResponse::Ok().json(application))
}
