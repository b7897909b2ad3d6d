use crate::api::leave::{CreateLeave, LeaveFilter, LeaveListResponse, RejectLeave, SummaryResponse};
use crate::auth::handlers::LoginResponse;
use crate::model::leave_application::{ApplicationStatus, LeaveApplication, LeaveType};
use crate::model::role::Role;
use crate::models::{LoginReqDto, RegisterReq};
use crate::workflow::{Actor, ApplicationSummary};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Desk API",
        version = "1.0.0",
        description = r#"
## Student Leave Approval

Students submit leave applications, the faculty member assigned to their
department/year/section reviews them, and the head of department gives the
final decision.

### Workflow
`PENDING_FACULTY` → `PENDING_HOD` → `APPROVED`, or `REJECTED` from either
pending state. Decided applications never reopen.

### Security
All `/api` endpoints require a **JWT Bearer** access token. What a caller can
see and decide depends on the role in the token: students see their own
applications, faculty see applications routed to them, HODs see their
department.
"#,
    ),
    paths(
        crate::auth::handlers::register,
        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,
        crate::auth::handlers::me,

        crate::api::leave::create_leave,
        crate::api::leave::leave_list,
        crate::api::leave::leave_summary,
        crate::api::leave::get_leave,
        crate::api::leave::approve_leave,
        crate::api::leave::reject_leave
    ),
    components(
        schemas(
            RegisterReq,
            LoginReqDto,
            LoginResponse,
            Actor,
            Role,
            CreateLeave,
            RejectLeave,
            LeaveFilter,
            LeaveListResponse,
            LeaveApplication,
            LeaveType,
            ApplicationStatus,
            ApplicationSummary,
            SummaryResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration and tokens"),
        (name = "Leave", description = "Leave application workflow"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
