pub mod filename;
pub mod filesize;
pub mod hash;
pub mod jwt;
