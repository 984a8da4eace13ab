//! Authentication route handlers.
//!
//! Login and registration mutate session state only - there is no
//! account backend and no credential storage. Validation failures
//! re-render the form with a blocking notice, form left in place.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use uuid::Uuid;

use velour_core::Email;

use crate::error::Result;
use crate::filters;
use crate::models::CurrentUser;
use crate::models::session as session_state;

/// Minimum accepted password length.
const MIN_PASSWORD_LENGTH: usize = 6;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub password_confirm: String,
    /// Checkbox; absent when unchecked.
    pub accept_terms: Option<bool>,
}

// =============================================================================
// Validation
// =============================================================================

fn validate_password(password: &str) -> std::result::Result<(), String> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        ));
    }
    Ok(())
}

fn validate_login(form: &LoginForm) -> std::result::Result<Email, String> {
    let email = Email::parse(form.email.trim()).map_err(|e| e.to_string())?;
    validate_password(&form.password)?;
    Ok(email)
}

fn validate_registration(form: &RegisterForm) -> std::result::Result<Email, String> {
    let email = Email::parse(form.email.trim()).map_err(|e| e.to_string())?;
    validate_password(&form.password)?;
    if form.password != form.password_confirm {
        return Err("Passwords do not match".to_owned());
    }
    if !form.accept_terms.unwrap_or(false) {
        return Err("You must accept the terms and conditions".to_owned());
    }
    Ok(email)
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the login page.
pub async fn login_page() -> LoginTemplate {
    LoginTemplate { error: None }
}

/// Handle a login submission.
#[instrument(skip(session, form))]
pub async fn login(session: Session, Form(form): Form<LoginForm>) -> Result<Response> {
    let email = match validate_login(&form) {
        Ok(email) => email,
        Err(message) => {
            return Ok(LoginTemplate {
                error: Some(message),
            }
            .into_response());
        }
    };

    let user = CurrentUser {
        id: Uuid::new_v4(),
        name: email.local_part().to_owned(),
        email,
        avatar: None,
    };
    session_state::set_current_user(&session, &user).await?;
    tracing::info!(user = %user.email, "Signed in");

    Ok(Redirect::to("/").into_response())
}

/// Display the registration page.
pub async fn register_page() -> RegisterTemplate {
    RegisterTemplate { error: None }
}

/// Handle a registration submission.
///
/// Registration signs the new profile straight in - the profile lives
/// only in the session.
#[instrument(skip(session, form))]
pub async fn register(session: Session, Form(form): Form<RegisterForm>) -> Result<Response> {
    let email = match validate_registration(&form) {
        Ok(email) => email,
        Err(message) => {
            return Ok(RegisterTemplate {
                error: Some(message),
            }
            .into_response());
        }
    };

    let name = if form.name.trim().is_empty() {
        email.local_part().to_owned()
    } else {
        form.name.trim().to_owned()
    };
    let user = CurrentUser {
        id: Uuid::new_v4(),
        name,
        email,
        avatar: None,
    };
    session_state::set_current_user(&session, &user).await?;
    tracing::info!(user = %user.email, "Registered");

    Ok(Redirect::to("/").into_response())
}

/// Sign the user out.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect> {
    session_state::clear_current_user(&session).await?;
    Ok(Redirect::to("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_form() -> RegisterForm {
        RegisterForm {
            name: "Ana".to_owned(),
            email: "ana@example.com".to_owned(),
            phone: None,
            password: "hunter22".to_owned(),
            password_confirm: "hunter22".to_owned(),
            accept_terms: Some(true),
        }
    }

    #[test]
    fn valid_login_passes() {
        let form = LoginForm {
            email: "ana@example.com".to_owned(),
            password: "hunter22".to_owned(),
        };
        assert!(validate_login(&form).is_ok());
    }

    #[test]
    fn short_passwords_are_rejected() {
        let form = LoginForm {
            email: "ana@example.com".to_owned(),
            password: "abc".to_owned(),
        };
        assert!(validate_login(&form).is_err());
    }

    #[test]
    fn valid_registration_passes() {
        assert!(validate_registration(&register_form()).is_ok());
    }

    #[test]
    fn mismatched_passwords_are_rejected() {
        let form = RegisterForm {
            password_confirm: "different".to_owned(),
            ..register_form()
        };
        let err = validate_registration(&form).expect_err("mismatch must fail");
        assert_eq!(err, "Passwords do not match");
    }

    #[test]
    fn terms_must_be_accepted() {
        let form = RegisterForm {
            accept_terms: None,
            ..register_form()
        };
        assert!(validate_registration(&form).is_err());
    }

    #[test]
    fn bad_email_is_rejected() {
        let form = RegisterForm {
            email: "not-an-email".to_owned(),
            ..register_form()
        };
        assert!(validate_registration(&form).is_err());
    }
}
