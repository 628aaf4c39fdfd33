//! # pb-api Handlers
//!
//! This module coordinates the flow between HTTP requests and core ports.

use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{web, HttpRequest, HttpResponse};
use askama::Template;
use pb_core::error::AppError;
use pb_core::models::{HistoryEntry, Identity};
use pb_core::traits::{AuthProvider, DomainRepo, UserRepo};
use pb_ui::{
    CreateAccountTemplate, CreatePostTemplate, HomepageTemplate, LoginTemplate, ParkTemplate,
};
use serde::Deserialize;

use crate::middleware::{current_user, require_login, SESSION_COOKIE};
use crate::validate::{self, LOGIN_FAILED, USERNAME_TAKEN};
use crate::sanitize::strip_markup;

/// State shared across all Actix-web workers.
pub struct AppState {
    pub users: Box<dyn UserRepo>,
    pub domain: Box<dyn DomainRepo>,
    pub auth: Box<dyn AuthProvider>,
}

#[derive(Deserialize)]
pub struct CredentialsForm {
    username: String,
    password: String,
}

#[derive(Deserialize)]
pub struct PostForm {
    title: String,
    body: String,
}

#[derive(Deserialize)]
pub struct ReserveForm {
    park: String,
}

fn render<T: Template>(template: T) -> HttpResponse {
    match template.render() {
        Ok(body) => HttpResponse::Ok().content_type("text/html").body(body),
        Err(err) => {
            log::error!("template rendering failed: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

fn redirect(location: &'static str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", location))
        .finish()
}

fn internal_error(context: &str, err: AppError) -> HttpResponse {
    log::error!("{context}: {err}");
    HttpResponse::InternalServerError().finish()
}

/// The session cookie carrying a freshly minted token. Scoped to the
/// token lifetime and unreadable from scripts.
fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .max_age(CookieDuration::days(1))
        .finish()
}

async fn load_history(
    data: &AppState,
    user_id: Option<i64>,
) -> Result<Vec<HistoryEntry>, HttpResponse> {
    data.domain
        .history_for(user_id)
        .await
        .map_err(|err| internal_error("history lookup failed", err))
}

fn login_failed() -> Vec<String> {
    vec![LOGIN_FAILED.to_string()]
}

pub async fn index(req: HttpRequest) -> HttpResponse {
    if current_user(&req).is_some() {
        return redirect("/homepage");
    }
    render(LoginTemplate { errors: &[] })
}

pub async fn login_page(req: HttpRequest) -> HttpResponse {
    if current_user(&req).is_some() {
        return redirect("/homepage");
    }
    render(LoginTemplate { errors: &[] })
}

pub async fn login(data: web::Data<AppState>, form: web::Form<CredentialsForm>) -> HttpResponse {
    let errors = validate::validate_login(&form.username, &form.password);
    if !errors.is_empty() {
        return render(LoginTemplate { errors: &errors });
    }

    let username = form.username.trim();
    let user = match data.users.find_by_username(username).await {
        Ok(user) => user,
        Err(err) => return internal_error("user lookup failed", err),
    };

    // Unknown username and wrong password take the same path: one
    // collapsed message, no enumeration via error text.
    let Some(user) = user else {
        log::warn!("failed login attempt for unknown username");
        return render(LoginTemplate {
            errors: &login_failed(),
        });
    };
    if !data.auth.verify_password(&form.password, &user.password_hash) {
        log::warn!(
            "failed login attempt for {username}",
            username = user.username
        );
        return render(LoginTemplate {
            errors: &login_failed(),
        });
    }

    let identity = Identity {
        user_id: user.id,
        username: user.username,
    };
    let token = match data.auth.issue_session(&identity) {
        Ok(token) => token,
        Err(err) => return internal_error("session signing failed", err),
    };

    log::info!("{username} logged in", username = identity.username);
    HttpResponse::SeeOther()
        .cookie(session_cookie(token))
        .insert_header(("Location", "/homepage"))
        .finish()
}

pub async fn register(data: web::Data<AppState>, form: web::Form<CredentialsForm>) -> HttpResponse {
    let username = form.username.trim().to_string();

    let mut errors = Vec::new();
    validate::validate_username(&username, &mut errors);
    validate::validate_password(&form.password, &mut errors);

    if !username.is_empty() {
        match data.users.username_taken(&username).await {
            Ok(true) => errors.push(USERNAME_TAKEN.to_string()),
            Ok(false) => {}
            Err(err) => return internal_error("username lookup failed", err),
        }
    }

    if !errors.is_empty() {
        return render(LoginTemplate { errors: &errors });
    }

    let digest = match data.auth.hash_password(&form.password) {
        Ok(digest) => digest,
        Err(err) => return internal_error("password hashing failed", err),
    };

    let user = match data.users.create_user(&username, &digest).await {
        Ok(user) => user,
        // Lost a race with a concurrent registration for the same name.
        Err(AppError::Conflict(_)) => {
            return render(LoginTemplate {
                errors: &[USERNAME_TAKEN.to_string()],
            })
        }
        Err(err) => return internal_error("account creation failed", err),
    };

    // Registration implies login: mint a session for the new identity.
    let identity = Identity {
        user_id: user.id,
        username: user.username,
    };
    let token = match data.auth.issue_session(&identity) {
        Ok(token) => token,
        Err(err) => return internal_error("session signing failed", err),
    };

    log::info!("registered {username}");
    HttpResponse::SeeOther()
        .cookie(session_cookie(token))
        .insert_header(("Location", "/homepage"))
        .finish()
}

pub async fn logout() -> HttpResponse {
    let expired = Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .max_age(CookieDuration::ZERO)
        .finish();
    HttpResponse::SeeOther()
        .cookie(expired)
        .insert_header(("Location", "/"))
        .finish()
}

pub async fn create_account_page(data: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    let user = current_user(&req);
    let history = match load_history(&data, user.map(|u| u.user_id)).await {
        Ok(history) => history,
        Err(resp) => return resp,
    };
    render(CreateAccountTemplate { history: &history })
}

pub async fn homepage(data: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    let user = match require_login(&req) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let history = match load_history(&data, Some(user.user_id)).await {
        Ok(history) => history,
        Err(resp) => return resp,
    };
    render(HomepageTemplate { history: &history })
}

pub async fn park_page(data: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    let user = current_user(&req);
    let history = match load_history(&data, user.map(|u| u.user_id)).await {
        Ok(history) => history,
        Err(resp) => return resp,
    };
    render(ParkTemplate {
        errors: &[],
        history: &history,
    })
}

/// POST /park renders the landing view, mirroring the navigation
/// endpoints below.
pub async fn park_post(data: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    landing_with_history(&data, current_user(&req)).await
}

pub async fn create_post_page(data: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    let user = match require_login(&req) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let history = match load_history(&data, Some(user.user_id)).await {
        Ok(history) => history,
        Err(resp) => return resp,
    };
    render(CreatePostTemplate {
        errors: &[],
        history: &history,
    })
}

pub async fn create_post(
    data: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<PostForm>,
) -> HttpResponse {
    let user = match require_login(&req) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    let title = strip_markup(form.title.trim());
    let body = strip_markup(form.body.trim());
    let errors = validate::validate_post(&title, &body);
    if !errors.is_empty() {
        let history = match load_history(&data, Some(user.user_id)).await {
            Ok(history) => history,
            Err(resp) => return resp,
        };
        return render(CreatePostTemplate {
            errors: &errors,
            history: &history,
        });
    }

    // Authorship comes from the session identity; nothing in the form
    // can redirect it.
    match data.domain.create_post(&user, &title, &body).await {
        Ok(post) => {
            log::debug!("post {id} created by {author}", id = post.id, author = user.username);
            redirect("/homepage")
        }
        Err(err) => internal_error("post insertion failed", err),
    }
}

pub async fn reserve(
    data: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<ReserveForm>,
) -> HttpResponse {
    let user = match require_login(&req) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    let reservation = match validate::parse_reservation(&form.park) {
        Ok(reservation) => reservation,
        Err(errors) => {
            let history = match load_history(&data, Some(user.user_id)).await {
                Ok(history) => history,
                Err(resp) => return resp,
            };
            return render(ParkTemplate {
                errors: &errors,
                history: &history,
            });
        }
    };

    if let Err(err) = data.domain.record_reservation(&user, reservation).await {
        return internal_error("reservation insertion failed", err);
    }

    let history = match load_history(&data, Some(user.user_id)).await {
        Ok(history) => history,
        Err(resp) => return resp,
    };
    render(ParkTemplate {
        errors: &[],
        history: &history,
    })
}

pub async fn navigate_home(data: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    landing_with_history(&data, current_user(&req)).await
}

pub async fn navigate_reserve(data: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    landing_with_history(&data, current_user(&req)).await
}

pub async fn view_history(data: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    let user = match require_login(&req) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    landing_with_history(&data, Some(user)).await
}

/// The landing view with the caller's history; anonymous callers get an
/// empty list, never an error.
async fn landing_with_history(data: &AppState, user: Option<Identity>) -> HttpResponse {
    let history = match load_history(data, user.map(|u| u.user_id)).await {
        Ok(history) => history,
        Err(resp) => return resp,
    };
    render(HomepageTemplate { history: &history })
}
