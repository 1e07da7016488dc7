//! Service catalogue, technicians, work requests and their bookings

pub mod requests;
pub mod schedules;
pub mod service_types;
pub mod technicians;

pub use requests::ServiceRequestService;
pub use schedules::ScheduleService;
pub use service_types::ServiceTypeService;
pub use technicians::TechnicianService;
