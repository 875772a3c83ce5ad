pub mod admin;
pub mod catalog;
pub mod migrate;
pub mod password;
pub mod seed;
