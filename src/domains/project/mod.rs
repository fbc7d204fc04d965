pub mod service;
pub mod types;

pub use service::{ProjectService, ProjectServiceImpl};
pub use types::{Enrollment, EnrollmentStatus, ProjectQuery, ProjectRecord};
