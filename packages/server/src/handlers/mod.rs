pub mod auth;
pub mod company;
pub mod question;
pub mod submission;
pub mod tag;
pub mod user;
