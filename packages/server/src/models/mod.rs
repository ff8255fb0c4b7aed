pub mod auth;
pub mod company;
pub mod question;
pub mod shared;
pub mod submission;
pub mod tag;
pub mod user;
