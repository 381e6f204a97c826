use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use tera::{Context, Tera};
use tracing::error;

use crate::auth::AppState;
use crate::error::ErrorPage;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("detail.html", include_str!("../templates/detail.html")),
    ("edit.html", include_str!("../templates/edit.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("register.html", include_str!("../templates/register.html")),
    ("error.html", include_str!("../templates/error.html")),
];

/// Page templates compiled into the binary.
pub struct Templates {
    tera: Tera,
}

impl Templates {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())?;
        Ok(Self { tera })
    }

    pub fn render(&self, name: &str, context: &Context) -> Result<Html<String>, tera::Error> {
        self.tera.render(name, context).map(Html)
    }

    pub fn render_error(&self, page: &ErrorPage) -> Response {
        let mut context = Context::new();
        context.insert("error_title", page.title);
        context.insert("error_message", &page.message);
        context.insert("back_url", &page.back_url);

        match self.render("error.html", &context) {
            Ok(html) => (page.status, html).into_response(),
            Err(e) => {
                error!("Failed to render error page: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, page.message.clone()).into_response()
            }
        }
    }
}

/// Replace any response carrying an `ErrorPage` with the rendered page.
pub async fn render_error_pages(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let mut res = next.run(req).await;

    match res.extensions_mut().remove::<ErrorPage>() {
        Some(page) => state.templates.render_error(&page),
        None => res,
    }
}
