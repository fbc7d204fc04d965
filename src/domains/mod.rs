pub mod campaign;
pub mod listing;
pub mod project;
pub mod submission;
pub mod user;

pub use campaign::{CampaignRecord, CampaignService};
pub use project::{ProjectRecord, ProjectService};
pub use user::{UserProfile, UserService};
