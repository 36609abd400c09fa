pub mod api;
pub mod category;
pub mod config;
pub mod customer;
pub mod data;
pub mod error;
pub mod invoice;
pub mod product;
pub mod repository;
pub mod service;

pub use api::*;
pub use category::*;
pub use customer::*;
pub use data::*;
pub use error::*;
pub use invoice::*;
pub use product::*;
pub use repository::*;
pub use service::*;

pub const APP_NAME: &'static str = env!("CARGO_PKG_NAME");
