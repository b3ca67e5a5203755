pub mod error;
pub mod events;
pub mod groups;
pub mod health;
mod response;

pub use error::AppError;
