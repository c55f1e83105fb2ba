pub mod auth;
pub mod document;
pub mod member_image;
pub mod shared;
