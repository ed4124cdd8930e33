use serde::{Deserialize, Serialize};

/// Counts from `GET /api/dashboard/stats`. Missing counts read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total_employees: u64,
    #[serde(default)]
    pub present_today: u64,
    #[serde(default)]
    pub absent_today: u64,
}

impl DashboardStats {
    pub fn marked_today(&self) -> u64 {
        self.present_today + self.absent_today
    }

    pub fn unmarked_today(&self) -> u64 {
        self.total_employees.saturating_sub(self.marked_today())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}
