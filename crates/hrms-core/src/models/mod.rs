//! Data models for HRMS entities.
//!
//! - `Employee`, `NewEmployee`, `Photo`: employee directory records
//! - `AttendanceRecord`, `MarkAttendance`, `AttendanceStatus`: daily attendance
//! - `DashboardStats`, `HealthStatus`: summary and health endpoints

pub mod attendance;
pub mod dashboard;
pub mod employee;

pub use attendance::{AttendanceRecord, AttendanceStatus, MarkAttendance};
pub use dashboard::{DashboardStats, HealthStatus};
pub use employee::{Employee, NewEmployee, Photo};
