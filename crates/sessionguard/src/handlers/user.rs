//! Handlers for the authenticated user's data.
//!
//! Both routes sit behind the session guard; they only shape the session the
//! guard already validated.

use axum::Json;
use serde::Serialize;
use sessionguard_auth::Authenticated;

/// Public view of the signed-in user.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: UserProfile,
}

/// User view for the dashboard, with the session's authorization claims.
#[derive(Debug, Serialize)]
pub struct DashboardUser {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub role: Option<String>,
    pub permissions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub user: DashboardUser,
}

/// GET /api/user
pub async fn get_user(Authenticated(session): Authenticated) -> Json<UserResponse> {
    tracing::debug!(user_id = %session.user.id, "serving user profile");

    let user = session.user;
    Json(UserResponse {
        user: UserProfile {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
        },
    })
}

/// GET /api/dashboard
pub async fn dashboard(Authenticated(session): Authenticated) -> Json<DashboardResponse> {
    tracing::debug!(
        user_id = %session.user.id,
        role = session.role.as_deref().unwrap_or("none"),
        permissions = session.permissions.len(),
        "serving dashboard"
    );

    let user = session.user;
    Json(DashboardResponse {
        user: DashboardUser {
            profile: UserProfile {
                id: user.id,
                email: user.email,
                first_name: user.first_name,
                last_name: user.last_name,
            },
            role: session.role,
            permissions: session.permissions,
        },
    })
}
