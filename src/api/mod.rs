pub mod attendance;
pub mod dashboard;
pub mod employee;
pub mod holiday;
pub mod leave_request;
