//! Field-service scheduling: service catalogue, technicians and work requests

pub mod schedule;
pub mod service_note;
pub mod service_rating;
pub mod service_request;
pub mod service_type;
pub mod technician;
pub mod technician_specialization;

pub use service_request::{Priority, RequestStatus};
pub use technician::SkillLevel;
