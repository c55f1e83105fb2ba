pub mod admin;
pub mod auth;
pub mod document;
pub mod member_image;

pub(crate) mod streaming;
