pub mod audit;
pub mod dispatch;
pub mod init;
pub mod member;
pub mod org;
pub mod project;
pub mod shared;
pub mod task;
pub mod user;
