//! Account route handlers.
//!
//! The profile lives only in the session; anonymous visitors are sent
//! to the login page.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::{IntoResponse, Redirect, Response};
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::models::CurrentUser;
use crate::models::session as session_state;

/// Profile display data for templates.
#[derive(Clone)]
pub struct UserView {
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}

impl From<CurrentUser> for UserView {
    fn from(user: CurrentUser) -> Self {
        Self {
            name: user.name,
            email: user.email.to_string(),
            avatar: user.avatar,
        }
    }
}

/// Account overview template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountTemplate {
    pub user: UserView,
}

/// Display the account overview.
#[instrument(skip(session))]
pub async fn index(session: Session) -> Response {
    match session_state::current_user(&session).await {
        Some(user) => AccountTemplate {
            user: UserView::from(user),
        }
        .into_response(),
        None => Redirect::to("/auth/login").into_response(),
    }
}
