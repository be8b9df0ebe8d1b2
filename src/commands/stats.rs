//! Stats Commands
//!
//! Read-only endpoints feeding the navbar badge and the chart widgets.

use super::HttpApi;
use crate::error::SyncError;
use crate::models::{DashboardStats, SubjectHours, UserStatsResponse};

impl HttpApi {
    pub async fn user_stats(&self) -> Result<UserStatsResponse, SyncError> {
        self.get("/api/user/stats").await
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, SyncError> {
        self.get("/api/dashboard-stats").await
    }

    pub async fn subject_hours(&self) -> Result<Vec<SubjectHours>, SyncError> {
        self.get("/api/analytics/chart-data?type=subjects").await
    }
}
