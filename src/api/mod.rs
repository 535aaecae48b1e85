mod error;
mod extract;
mod handlers;
mod routes;
mod static_files;

pub use error::{ApiError, ErrorResponse, SuccessResponse};
pub use extract::Lang;
pub use handlers::AppState;
pub use routes::create_api_router;
