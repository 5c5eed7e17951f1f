pub mod client;
pub mod traits;
pub mod types;

pub use client::HttpApi;
pub use traits::MessApi;
pub use types::{NewMess, NewReview, RegisterForm};
