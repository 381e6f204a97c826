use std::sync::Arc;

use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
};
use axum_extra::extract::{
    WithRejection,
    cookie::{Cookie, CookieJar, SameSite},
};
use tera::Context;
use tracing::{error, info, warn};

use board_db::{Database, StoreError};
use board_types::api::{LoginForm, RegisterForm};

use crate::error::{ApiError, ErrorPage};
use crate::middleware::TOKEN_COOKIE;
use crate::render::Templates;
use crate::token::TokenIssuer;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub tokens: TokenIssuer,
    pub templates: Templates,
}

impl AppStateInner {
    pub fn new(db: Database, tokens: TokenIssuer, templates: Templates) -> AppState {
        Arc::new(Self { db, tokens, templates })
    }
}

/// Run a store call off the async runtime.
pub(crate) async fn with_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    let result = tokio::task::spawn_blocking(move || f(&state.db)).await?;
    Ok(result?)
}

pub async fn login_page(State(state): State<AppState>) -> Result<Html<String>, ErrorPage> {
    state
        .templates
        .render("login.html", &Context::new())
        .map_err(|e| {
            error!("Failed to render login page: {}", e);
            ErrorPage::system("Could not display the login page.", "/login")
        })
}

pub async fn register_page(State(state): State<AppState>) -> Result<Html<String>, ErrorPage> {
    state
        .templates
        .render("register.html", &Context::new())
        .map_err(|e| {
            error!("Failed to render register page: {}", e);
            ErrorPage::system("Could not display the registration page.", "/register")
        })
}

pub async fn register(
    State(state): State<AppState>,
    WithRejection(Form(form), _): WithRejection<Form<RegisterForm>, ErrorPage>,
) -> Result<impl IntoResponse, ErrorPage> {
    let username = form.username.trim().to_string();
    let registration_failed = || {
        ErrorPage::new(
            StatusCode::CONFLICT,
            "Registration error",
            "Registration failed. The username may already be taken.",
            "/register",
        )
    };

    if form.password.is_empty() {
        return Err(registration_failed());
    }

    match with_db(&state, move |db| db.create_user(&username, &form.password)).await {
        Ok(_) => Ok(Redirect::to("/login")),
        Err(ApiError::Store(StoreError::DuplicateUser | StoreError::InvalidUsername)) => {
            Err(registration_failed())
        }
        Err(e) => {
            error!("Registration failed: {}", e);
            Err(ErrorPage::system("An error occurred during registration.", "/register"))
        }
    }
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Form(form), _): WithRejection<Form<LoginForm>, ErrorPage>,
) -> Result<impl IntoResponse, ErrorPage> {
    let username = form.username.trim().to_string();

    let user = match with_db(&state, move |db| db.authenticate(&username, &form.password)).await {
        Ok(user) => user,
        Err(ApiError::Store(StoreError::NotFound | StoreError::InvalidCredentials)) => {
            warn!("Failed login attempt");
            return Err(ErrorPage::new(
                StatusCode::UNAUTHORIZED,
                "Login error",
                "Incorrect username or password.",
                "/login",
            ));
        }
        Err(e) => {
            error!("Login failed: {}", e);
            return Err(ErrorPage::system("An error occurred while logging in.", "/login"));
        }
    };

    let token = state.tokens.issue(user.id, &user.username).map_err(|e| {
        error!("Failed to issue token: {}", e);
        ErrorPage::system("An error occurred while logging in.", "/login")
    })?;

    let cookie = Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(state.tokens.ttl().num_seconds()));

    info!("User {} logged in", user.username);
    Ok((jar.add(cookie), Redirect::to("/")))
}

pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let mut cookie = Cookie::from(TOKEN_COOKIE);
    cookie.set_path("/");

    (jar.remove(cookie), Redirect::to("/login"))
}
