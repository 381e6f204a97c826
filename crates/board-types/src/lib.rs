pub mod api;
pub mod pagination;
pub mod validation;

pub use pagination::{PER_PAGE, Pagination};
pub use validation::{MAX_FIELD_CHARS, MessageInput, ValidationError};
