//! Entity structs for all Tenet domain objects.
//!
//! Each entity maps to a table in the libSQL database (see
//! `tenet-db/migrations/001_initial.sql`). All structs derive `Serialize`,
//! `Deserialize`, and `JsonSchema`.

mod audit;
mod membership;
mod organization;
mod project;
mod session;
mod task;
mod user;

pub use audit::AuditLogEntry;
pub use membership::Membership;
pub use organization::Organization;
pub use project::Project;
pub use session::Session;
pub use task::Task;
pub use user::User;
