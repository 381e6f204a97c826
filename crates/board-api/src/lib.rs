pub mod auth;
pub mod error;
pub mod messages;
pub mod middleware;
pub mod render;
pub mod routes;
pub mod token;

pub use auth::{AppState, AppStateInner};
pub use render::Templates;
pub use routes::router;
pub use token::TokenIssuer;
