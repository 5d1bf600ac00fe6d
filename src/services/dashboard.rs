//! Dashboard data: statistics, analytics, widgets and alerts.

use futures_util::future::join3;
use serde_json::{Value, json};
use tracing::warn;

use super::endpoints::dashboard as endpoints;
use super::{invalidate, to_params};
use crate::client::ApiClient;
use crate::types::{
    Alert, AnalyticsQuery, ApiResponse, DashboardOverview, DashboardSnapshot, DashboardStats,
    PerformanceMetrics, RealtimeMetrics, ReportQuery, RequestDescriptor, Widget, WidgetLayout,
};
use crate::Result;

#[derive(Debug, Clone)]
pub struct DashboardService {
    client: ApiClient,
}

impl DashboardService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn stats(&self) -> Result<ApiResponse<DashboardStats>> {
        self.client.get(endpoints::STATS).await
    }

    pub async fn overview(&self) -> Result<ApiResponse<DashboardOverview>> {
        self.client.get(endpoints::OVERVIEW).await
    }

    /// Analytics series. The backend decides the shape, so it stays untyped.
    pub async fn analytics(&self, query: Option<&AnalyticsQuery>) -> Result<ApiResponse<Value>> {
        let params = query.map(to_params).transpose()?.unwrap_or_default();
        self.client
            .request(RequestDescriptor::get(endpoints::ANALYTICS).params(params))
            .await
    }

    pub async fn reports(&self, query: Option<&ReportQuery>) -> Result<ApiResponse<Value>> {
        let params = query.map(to_params).transpose()?.unwrap_or_default();
        self.client
            .request(RequestDescriptor::get(endpoints::REPORTS).params(params))
            .await
    }

    pub async fn realtime_metrics(&self) -> Result<ApiResponse<RealtimeMetrics>> {
        self.client.get(endpoints::REALTIME).await
    }

    pub async fn widgets(&self) -> Result<ApiResponse<Vec<Widget>>> {
        self.client.get(endpoints::WIDGETS).await
    }

    pub async fn update_widgets(&self, widgets: &[WidgetLayout]) -> Result<ApiResponse<Value>> {
        let request = RequestDescriptor::put(endpoints::WIDGETS).body(json!({ "widgets": widgets }));
        self.client.mutate(request, invalidate(endpoints::WIDGETS)).await
    }

    pub async fn alerts(&self) -> Result<ApiResponse<Vec<Alert>>> {
        self.client.get(endpoints::ALERTS).await
    }

    pub async fn mark_alert_read(&self, alert_id: &str) -> Result<ApiResponse<Value>> {
        let request = RequestDescriptor::patch(endpoints::alert_read(alert_id));
        self.client.mutate(request, invalidate(endpoints::ALERTS)).await
    }

    pub async fn mark_all_alerts_read(&self) -> Result<ApiResponse<Value>> {
        let request = RequestDescriptor::patch(endpoints::ALERTS_READ_ALL);
        self.client.mutate(request, invalidate(endpoints::ALERTS)).await
    }

    pub async fn performance_metrics(&self) -> Result<ApiResponse<PerformanceMetrics>> {
        self.client.get(endpoints::PERFORMANCE).await
    }

    /// Drop cached stats, overview and analytics.
    pub fn clear_cache(&self) {
        for url in [endpoints::STATS, endpoints::OVERVIEW, endpoints::ANALYTICS] {
            self.client.invalidate_resource(url);
        }
    }

    /// Refetch stats, overview and analytics concurrently.
    ///
    /// Individual failures are logged and leave their slot empty; the
    /// snapshot itself always succeeds.
    pub async fn refresh_data(&self) -> ApiResponse<DashboardSnapshot> {
        self.clear_cache();

        let (stats, overview, analytics) =
            join3(self.stats(), self.overview(), self.analytics(None)).await;

        ApiResponse::ok(DashboardSnapshot {
            stats: settled("stats", stats),
            overview: settled("overview", overview),
            analytics: settled("analytics", analytics),
        })
    }
}

fn settled<T>(part: &str, result: Result<ApiResponse<T>>) -> Option<T> {
    match result {
        Ok(response) if response.success => response.data,
        Ok(response) => {
            warn!(part, message = ?response.message, "dashboard refresh returned no data");
            None
        }
        Err(e) => {
            warn!(part, error = %e, "dashboard refresh failed");
            None
        }
    }
}
