use axum::{
    Extension, Form,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::WithRejection;
use tera::Context;
use tracing::{error, info};

use board_db::StoreError;
use board_types::api::{ListQuery, MessageForm, SearchQuery};
use board_types::pagination::requested_page;
use board_types::validation::search_term;
use board_types::{MessageInput, PER_PAGE, Pagination};

use crate::auth::{AppState, with_db};
use crate::error::{ApiError, ErrorPage};
use crate::token::AuthUser;

/// Message ids come straight from the URL; anything that is not a number
/// cannot name a message.
fn parse_id(raw: &str) -> Result<i64, ErrorPage> {
    raw.parse().map_err(|_| ErrorPage::message_not_found())
}

/// Map a failed store call to a page. `action` completes "An error occurred
/// while ..." for system failures.
fn failure(err: ApiError, action: &str, back_url: &str) -> ErrorPage {
    match err {
        ApiError::Store(StoreError::NotFound) => ErrorPage::message_not_found(),
        ApiError::Store(StoreError::Unauthorized) => {
            ErrorPage::forbidden("You can only change your own messages.", back_url)
        }
        e => {
            error!("Failed while {}: {}", action, e);
            ErrorPage::system(&format!("An error occurred while {action}."), back_url)
        }
    }
}

fn render(state: &AppState, name: &str, context: &Context, back_url: &str) -> Result<Html<String>, ErrorPage> {
    state
        .templates
        .render(name, context)
        .map_err(|e| failure(e.into(), "displaying the page", back_url))
}

fn user_context(user: &AuthUser) -> Context {
    let mut context = Context::new();
    context.insert("user_id", &user.id);
    context.insert("username", &user.username);
    context
}

pub async fn list_messages(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Extension(user): Extension<AuthUser>,
) -> Result<Html<String>, ErrorPage> {
    let page = requested_page(query.page.as_deref());

    let result = with_db(&state, move |db| db.list_messages(page, PER_PAGE))
        .await
        .map_err(|e| failure(e, "loading messages", "/"))?;

    let mut context = user_context(&user);
    context.insert("messages", &result.messages);
    context.insert("pagination", &Pagination::new(page, PER_PAGE, result.total));
    render(&state, "index.html", &context, "/")
}

pub async fn search_messages(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, ErrorPage> {
    let Ok(term) = search_term(query.q.as_deref()) else {
        return Ok(Redirect::to("/").into_response());
    };
    let term = term.to_string();

    let needle = term.clone();
    let messages = with_db(&state, move |db| db.search_messages(&needle))
        .await
        .map_err(|e| failure(e, "searching messages", "/"))?;

    let mut context = user_context(&user);
    context.insert("messages", &messages);
    context.insert("query", &term);
    Ok(render(&state, "index.html", &context, "/")?.into_response())
}

pub async fn show_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(user): Extension<AuthUser>,
) -> Result<Html<String>, ErrorPage> {
    let id = parse_id(&id)?;

    let message = with_db(&state, move |db| db.get_message(id))
        .await
        .map_err(|e| failure(e, "loading the message", "/"))?;

    let mut context = user_context(&user);
    context.insert("message", &message);
    render(&state, "detail.html", &context, "/")
}

pub async fn create_message(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Form(form), _): WithRejection<Form<MessageForm>, ErrorPage>,
) -> Result<Redirect, ErrorPage> {
    let input = MessageInput::parse(&form.title, &form.content)
        .map_err(|e| ErrorPage::invalid_input(&e, "/"))?;

    let owner = user.id;
    let id = with_db(&state, move |db| db.create_message(&input.title, &input.content, owner))
        .await
        .map_err(|e| failure(e, "creating the message", "/"))?;

    info!("User {} created message {}", user.username, id);
    Ok(Redirect::to("/"))
}

pub async fn edit_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(user): Extension<AuthUser>,
) -> Result<Html<String>, ErrorPage> {
    let id = parse_id(&id)?;
    let detail_url = format!("/messages/{id}");

    let message = with_db(&state, move |db| db.get_message(id))
        .await
        .map_err(|e| failure(e, "loading the message", "/"))?;

    if message.owner_id != user.id {
        return Err(ErrorPage::forbidden("You can only edit your own messages.", detail_url));
    }

    let mut context = user_context(&user);
    context.insert("message", &message);
    render(&state, "edit.html", &context, &detail_url)
}

pub async fn update_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Form(form), _): WithRejection<Form<MessageForm>, ErrorPage>,
) -> Result<Redirect, ErrorPage> {
    let id = parse_id(&id)?;
    let detail_url = format!("/messages/{id}");

    let input = MessageInput::parse(&form.title, &form.content)
        .map_err(|e| ErrorPage::invalid_input(&e, format!("{detail_url}/edit")))?;

    let requester = user.id;
    with_db(&state, move |db| {
        db.update_message(id, &input.title, &input.content, requester)
    })
    .await
    .map_err(|e| failure(e, "updating the message", &detail_url))?;

    info!("User {} updated message {}", user.username, id);
    Ok(Redirect::to(&detail_url))
}

pub async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(user): Extension<AuthUser>,
) -> Result<Redirect, ErrorPage> {
    let id = parse_id(&id)?;

    let requester = user.id;
    with_db(&state, move |db| db.delete_message(id, requester))
        .await
        .map_err(|e| failure(e, "deleting the message", "/"))?;

    info!("User {} deleted message {}", user.username, id);
    Ok(Redirect::to("/"))
}
