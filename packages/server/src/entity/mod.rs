pub mod document;
pub mod member_image;
pub mod user;
