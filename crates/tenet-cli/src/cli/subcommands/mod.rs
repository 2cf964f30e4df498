pub mod audit;
pub mod member;
pub mod org;
pub mod project;
pub mod task;
pub mod user;

pub use audit::AuditCommands;
pub use member::MemberCommands;
pub use org::OrgCommands;
pub use project::ProjectCommands;
pub use task::TaskCommands;
pub use user::UserCommands;
