//! Typed access to the dashboard's resource endpoints
//!
//! Each entity has exactly one path. Reads go through the page loader and never
//! fail; writes return the client's `Result`.

use crate::auth_client::ApiRequester;
use crate::coerce;
use crate::error::{ClientError, Result};
use crate::loader::{self, LoadIssue, ViewState};
use crate::types::{ApiMethod, Role};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub mod endpoints {
    pub const WORK_ORDERS: &str = "work-order-list/";
    pub const ACTIVE_WORK_ORDERS: &str = "active-work-orders/";
    pub const UNRELEASED_WORK_ORDERS: &str = "unreleased-work-orders/";
    pub const WORK_REQUESTS: &str = "work-requests/";
    pub const CREATE_WORK_REQUEST: &str = "work-requests/create/";
    pub const USERS: &str = "users/";
    pub const USER_STATS: &str = "users/stats/";
    pub const REGISTER_USER: &str = "regist/";
    pub const DIVISIONS: &str = "divisions/";
    pub const ENERGY: &str = "energy/";
    pub const DOCUMENTS: &str = "documents/";
    pub const DOCUMENT_UPLOAD: &str = "documents/upload/";
    pub const AUDIT_TRAIL: &str = "audit-trail/";
    pub const ANALYTICS: &str = "analytics/";
    pub const CATEGORY_ANALYTICS: &str = "category-analytics/";
    pub const EQUIPMENT_ANALYTICS: &str = "equipment-analytics/";
    pub const MONTHLY_TREND: &str = "monthly-trend/";
    pub const DOWNTIME: &str = "downtime/";

    pub fn user_status(user_id: i64) -> String {
        format!("users/{user_id}/status/")
    }

    pub fn user_reset_password(user_id: i64) -> String {
        format!("users/{user_id}/reset-password/")
    }

    pub fn document(document_id: &str) -> String {
        format!("documents/{document_id}/")
    }
}

// Work orders

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorkOrder {
    #[serde(deserialize_with = "coerce::text")]
    pub no: String,
    #[serde(deserialize_with = "coerce::text")]
    pub title: String,
    #[serde(deserialize_with = "coerce::optional_text")]
    pub wo_created_date: Option<String>,
    #[serde(deserialize_with = "coerce::text")]
    pub wo_status: String,
    #[serde(deserialize_with = "coerce::text")]
    pub resource: String,
    #[serde(deserialize_with = "coerce::text")]
    pub wo_description: String,
    #[serde(deserialize_with = "coerce::text")]
    pub wo_type: String,
    #[serde(deserialize_with = "coerce::text")]
    pub wr_requestor: String,
    #[serde(deserialize_with = "coerce::optional_text")]
    pub wo_actual_completion_date: Option<String>,
    #[serde(deserialize_with = "coerce::number")]
    pub actual_duration: f64,
    #[serde(deserialize_with = "coerce::integer")]
    pub year: i64,
    #[serde(deserialize_with = "coerce::integer")]
    pub month: i64,
    #[serde(deserialize_with = "coerce::integer")]
    pub week_of_month: i64,
}

/// Weekly released/unreleased work-order count with week-over-week change
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WeeklyWorkOrderCount {
    #[serde(deserialize_with = "coerce::integer")]
    pub year: i64,
    #[serde(deserialize_with = "coerce::integer")]
    pub month: i64,
    #[serde(deserialize_with = "coerce::integer")]
    pub week_of_month: i64,
    #[serde(rename = "released_count", alias = "unreleased_count", deserialize_with = "coerce::number")]
    pub count: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub last_week_count: f64,
    #[serde(alias = "diff_from_last_week_unreleased", deserialize_with = "coerce::number")]
    pub diff_from_last_week: f64,
}

pub async fn work_orders<R: ApiRequester>(api: &R) -> ViewState<Vec<WorkOrder>> {
    loader::load_list(api, endpoints::WORK_ORDERS).await
}

pub async fn active_work_orders<R: ApiRequester>(api: &R) -> ViewState<Vec<WeeklyWorkOrderCount>> {
    loader::load_list(api, endpoints::ACTIVE_WORK_ORDERS).await
}

pub async fn unreleased_work_orders<R: ApiRequester>(api: &R) -> ViewState<Vec<WeeklyWorkOrderCount>> {
    loader::load_list(api, endpoints::UNRELEASED_WORK_ORDERS).await
}

// Work requests

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorkRequest {
    #[serde(deserialize_with = "coerce::text")]
    pub wr_number: String,
    #[serde(deserialize_with = "coerce::text")]
    pub title: String,
    #[serde(alias = "wo_description", deserialize_with = "coerce::text")]
    pub description: String,
    #[serde(deserialize_with = "coerce::text")]
    pub resource: String,
    #[serde(deserialize_with = "coerce::text")]
    pub wr_type: String,
    #[serde(deserialize_with = "coerce::text")]
    pub urgency: String,
    #[serde(deserialize_with = "coerce::text")]
    pub status: String,
    #[serde(deserialize_with = "coerce::text")]
    pub wr_requestor: String,
    #[serde(deserialize_with = "coerce::optional_text")]
    pub created_at: Option<String>,
}

/// Body of a new work request; the server assigns number and status
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewWorkRequest {
    pub title: String,
    pub description: String,
    pub asset_number: String,
    pub asset_department: String,
    pub resource: String,
    pub urgency: String,
    pub wr_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_cause: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_failure_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_by_date: Option<String>,
}

impl NewWorkRequest {
    fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("title", &self.title),
            ("description", &self.description),
            ("urgency", &self.urgency),
            ("wr_type", &self.wr_type),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ClientError::InvalidRequest(format!("missing fields: {}", missing.join(", "))))
        }
    }
}

pub async fn work_requests<R: ApiRequester>(api: &R) -> ViewState<Vec<WorkRequest>> {
    loader::load_list(api, endpoints::WORK_REQUESTS).await
}

pub async fn submit_work_request<R: ApiRequester>(api: &R, request: &NewWorkRequest) -> Result<Value> {
    request.validate()?;
    let body = serde_json::to_value(request)?;
    api.request(ApiMethod::Post, endpoints::CREATE_WORK_REQUEST, Some(&body)).await
}

// Users

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UserAccount {
    #[serde(deserialize_with = "coerce::integer")]
    pub id: i64,
    #[serde(deserialize_with = "coerce::text")]
    pub username: String,
    #[serde(deserialize_with = "coerce::text")]
    pub full_name: String,
    #[serde(deserialize_with = "coerce::text")]
    pub email: String,
    #[serde(deserialize_with = "coerce::text")]
    pub role: String,
    #[serde(deserialize_with = "coerce::text")]
    pub division: String,
    #[serde(deserialize_with = "coerce::text")]
    pub status: String,
    #[serde(deserialize_with = "coerce::optional_text")]
    pub date_joined: Option<String>,
}

impl UserAccount {
    pub fn is_active(&self) -> bool {
        self.status.eq_ignore_ascii_case("active")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UserStats {
    #[serde(deserialize_with = "coerce::integer")]
    pub total_users: i64,
    #[serde(deserialize_with = "coerce::integer")]
    pub active_users: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AccountStatus {
    Active,
    Inactive,
}

/// Body of an admin-created account
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub division: String,
}

pub async fn users<R: ApiRequester>(api: &R) -> ViewState<Vec<UserAccount>> {
    loader::load_list(api, endpoints::USERS).await
}

pub async fn user_stats<R: ApiRequester>(api: &R) -> ViewState<UserStats> {
    loader::load_one(api, endpoints::USER_STATS).await
}

pub async fn set_user_status<R: ApiRequester>(api: &R, user_id: i64, status: AccountStatus) -> Result<Value> {
    let body = serde_json::json!({ "status": status });
    api.request(ApiMethod::Patch, &endpoints::user_status(user_id), Some(&body))
        .await
}

pub async fn reset_user_password<R: ApiRequester>(api: &R, user_id: i64, new_password: &str) -> Result<Value> {
    if new_password.is_empty() {
        return Err(ClientError::InvalidRequest("new password is empty".to_string()));
    }
    let body = serde_json::json!({ "new_password": new_password });
    api.request(ApiMethod::Post, &endpoints::user_reset_password(user_id), Some(&body))
        .await
}

pub async fn register_user<R: ApiRequester>(api: &R, user: &NewUser) -> Result<Value> {
    if user.username.trim().is_empty() || user.password.is_empty() || user.full_name.trim().is_empty() {
        return Err(ClientError::InvalidRequest(
            "username, password and full name are required".to_string(),
        ));
    }
    let body = serde_json::to_value(user)?;
    api.request(ApiMethod::Post, endpoints::REGISTER_USER, Some(&body)).await
}

pub async fn divisions<R: ApiRequester>(api: &R) -> ViewState<Vec<String>> {
    loader::load_list::<Value, R>(api, endpoints::DIVISIONS)
        .await
        .map(|items| items.iter().filter_map(coerce::safe_text).collect())
}

// Energy

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnergyReading {
    #[serde(rename = "type", deserialize_with = "coerce::text")]
    pub kind: String,
    #[serde(deserialize_with = "coerce::number")]
    pub current: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub budget: f64,
    #[serde(deserialize_with = "coerce::text")]
    pub unit: String,
}

impl EnergyReading {
    /// Share of budget used, in percent; zero when there is no budget
    pub fn budget_used_percent(&self) -> f64 {
        if self.budget > 0.0 {
            self.current / self.budget * 100.0
        } else {
            0.0
        }
    }
}

pub async fn energy<R: ApiRequester>(api: &R) -> ViewState<Vec<EnergyReading>> {
    loader::load_list(api, endpoints::ENERGY).await
}

// Documents

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Document {
    #[serde(deserialize_with = "coerce::text")]
    pub id: String,
    #[serde(deserialize_with = "coerce::text")]
    pub file_name: String,
    #[serde(deserialize_with = "coerce::text")]
    pub file_url: String,
    #[serde(deserialize_with = "coerce::text")]
    pub category: String,
    #[serde(deserialize_with = "coerce::text")]
    pub department: String,
    #[serde(deserialize_with = "coerce::text")]
    pub version: String,
    #[serde(deserialize_with = "coerce::text")]
    pub status: String,
    #[serde(deserialize_with = "coerce::text")]
    pub description: String,
    #[serde(deserialize_with = "coerce::optional_text")]
    pub uploaded_at: Option<String>,
    #[serde(deserialize_with = "coerce::text")]
    pub uploaded_by_name: String,
    /// Bytes
    #[serde(deserialize_with = "coerce::integer")]
    pub size: i64,
}

/// Largest file the dashboard accepts for upload
pub const MAX_DOCUMENT_SIZE_MB: i64 = 10;

/// Metadata for a file already placed in object storage
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewDocument {
    pub file_name: String,
    pub category: String,
    pub department: String,
    pub version: String,
    pub description: String,
    pub file_url: String,
    /// Bytes
    pub size: i64,
}

impl NewDocument {
    fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("file_name", &self.file_name),
            ("category", &self.category),
            ("department", &self.department),
            ("file_url", &self.file_url),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(ClientError::InvalidRequest(format!("missing fields: {}", missing.join(", "))));
        }
        if self.size < 0 || self.size > MAX_DOCUMENT_SIZE_MB * 1024 * 1024 {
            return Err(ClientError::InvalidRequest(format!(
                "file size {} bytes is outside the {MAX_DOCUMENT_SIZE_MB}MB limit",
                self.size
            )));
        }
        Ok(())
    }
}

pub async fn documents<R: ApiRequester>(api: &R) -> ViewState<Vec<Document>> {
    loader::load_list(api, endpoints::DOCUMENTS).await
}

/// Register an uploaded file's metadata with the documents library
pub async fn upload_document<R: ApiRequester>(api: &R, document: &NewDocument) -> Result<Value> {
    document.validate()?;
    let body = serde_json::to_value(document)?;
    api.request(ApiMethod::Post, endpoints::DOCUMENT_UPLOAD, Some(&body)).await
}

pub async fn delete_document<R: ApiRequester>(api: &R, document_id: &str) -> Result<()> {
    if document_id.trim().is_empty() {
        return Err(ClientError::InvalidRequest("document id is empty".to_string()));
    }
    api.request(ApiMethod::Delete, &endpoints::document(document_id), None)
        .await?;
    Ok(())
}

// Audit trail

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AuditEntry {
    #[serde(deserialize_with = "coerce::optional_text")]
    pub action_time: Option<String>,
    #[serde(deserialize_with = "coerce::text")]
    pub user: String,
    #[serde(deserialize_with = "coerce::text")]
    pub content_type: String,
    #[serde(deserialize_with = "coerce::text")]
    pub object_id: String,
    #[serde(deserialize_with = "coerce::text")]
    pub object_repr: String,
    #[serde(deserialize_with = "coerce::integer")]
    pub action_flag: i64,
    #[serde(deserialize_with = "coerce::text")]
    pub change_message: String,
}

pub async fn audit_trail<R: ApiRequester>(api: &R) -> ViewState<Vec<AuditEntry>> {
    loader::load_list(api, endpoints::AUDIT_TRAIL).await
}

// Analytics

/// Time window for analytics series
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnalyticsPeriod {
    OneMonth,
    ThreeMonths,
    #[default]
    SixMonths,
    OneYear,
}

impl AnalyticsPeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            AnalyticsPeriod::OneMonth => "1month",
            AnalyticsPeriod::ThreeMonths => "3months",
            AnalyticsPeriod::SixMonths => "6months",
            AnalyticsPeriod::OneYear => "1year",
        }
    }
}

impl fmt::Display for AnalyticsPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReliabilityPoint {
    #[serde(deserialize_with = "coerce::text")]
    pub date: String,
    #[serde(deserialize_with = "coerce::number")]
    pub mttr_hours: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub mtbf_hours: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub failure_count: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CategoryAnalytics {
    #[serde(alias = "resource", deserialize_with = "coerce::text")]
    pub category: String,
    #[serde(deserialize_with = "coerce::number")]
    pub count: f64,
    #[serde(rename = "avgMttr", deserialize_with = "coerce::number")]
    pub avg_mttr: f64,
    #[serde(rename = "avgMtbf", deserialize_with = "coerce::number")]
    pub avg_mtbf: f64,
    #[serde(deserialize_with = "coerce::text")]
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EquipmentAnalytics {
    #[serde(alias = "asset_group", deserialize_with = "coerce::text")]
    pub equipment: String,
    #[serde(deserialize_with = "coerce::number")]
    pub mttr: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub mtbf: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub failures: f64,
    #[serde(deserialize_with = "coerce::text")]
    pub date: String,
}

/// Planned vs unplanned maintenance for one bucket (month or week)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MaintenanceSplit {
    #[serde(alias = "month", alias = "week", deserialize_with = "coerce::text")]
    pub label: String,
    #[serde(deserialize_with = "coerce::number")]
    pub planned: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub unplanned: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub total: f64,
    #[serde(deserialize_with = "coerce::text")]
    pub date: String,
}

/// Headline reliability figures, taken from the latest analytics point
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReliabilitySummary {
    pub mttr_hours: f64,
    pub mtbf_hours: f64,
    pub failure_count: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyticsReport {
    pub period: AnalyticsPeriod,
    pub reliability: Vec<ReliabilityPoint>,
    pub categories: Vec<CategoryAnalytics>,
    pub equipment: Vec<EquipmentAnalytics>,
    pub monthly_trend: Vec<MaintenanceSplit>,
    pub downtime: Vec<MaintenanceSplit>,
    pub summary: ReliabilitySummary,
    /// Series that could not be loaded, by path
    pub issues: Vec<(&'static str, LoadIssue)>,
}

impl AnalyticsReport {
    pub fn requires_login(&self) -> bool {
        self.issues
            .iter()
            .any(|(_, issue)| matches!(issue, LoadIssue::LoginRequired))
    }
}

fn with_period(path: &str, period: AnalyticsPeriod) -> String {
    format!("{path}?period={period}")
}

/// Fetch all five analytics series in parallel; a failed series is empty
pub async fn analytics_report<R: ApiRequester>(api: &R, period: AnalyticsPeriod) -> AnalyticsReport {
    let analytics_path = with_period(endpoints::ANALYTICS, period);
    let category_path = with_period(endpoints::CATEGORY_ANALYTICS, period);
    let equipment_path = with_period(endpoints::EQUIPMENT_ANALYTICS, period);
    let trend_path = with_period(endpoints::MONTHLY_TREND, period);
    let downtime_path = with_period(endpoints::DOWNTIME, period);

    let (reliability, categories, equipment, monthly_trend, downtime) = tokio::join!(
        loader::load_list::<ReliabilityPoint, R>(api, &analytics_path),
        loader::load_list::<CategoryAnalytics, R>(api, &category_path),
        loader::load_list::<EquipmentAnalytics, R>(api, &equipment_path),
        loader::load_list::<MaintenanceSplit, R>(api, &trend_path),
        loader::load_list::<MaintenanceSplit, R>(api, &downtime_path),
    );

    let mut issues = Vec::new();
    let mut collect = |path: &'static str, issue: Option<LoadIssue>| {
        if let Some(issue) = issue {
            issues.push((path, issue));
        }
    };
    collect(endpoints::ANALYTICS, reliability.issue);
    collect(endpoints::CATEGORY_ANALYTICS, categories.issue);
    collect(endpoints::EQUIPMENT_ANALYTICS, equipment.issue);
    collect(endpoints::MONTHLY_TREND, monthly_trend.issue);
    collect(endpoints::DOWNTIME, downtime.issue);

    let summary = reliability
        .data
        .last()
        .map(|latest| ReliabilitySummary {
            mttr_hours: latest.mttr_hours,
            mtbf_hours: latest.mtbf_hours,
            failure_count: latest.failure_count,
        })
        .unwrap_or_default();

    AnalyticsReport {
        period,
        reliability: reliability.data,
        categories: categories.data,
        equipment: equipment.data,
        monthly_trend: monthly_trend.data,
        downtime: downtime.data,
        summary,
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::test_support::CannedRequester;
    use serde_json::json;

    #[tokio::test]
    async fn test_work_orders_coerce_fields() {
        let api = CannedRequester::new().respond(
            endpoints::WORK_ORDERS,
            json!([{
                "no": 101,
                "title": "Replace bearing",
                "wo_created_date": "2024-05-02",
                "wo_status": "Released",
                "actual_duration": "1.5",
                "year": "2024",
                "month": 5,
                "week_of_month": null
            }]),
        );

        let state = work_orders(&api).await;
        assert!(state.is_ready());
        let order = &state.data[0];
        assert_eq!(order.no, "101");
        assert_eq!(order.actual_duration, 1.5);
        assert_eq!(order.year, 2024);
        assert_eq!(order.week_of_month, 0);
        assert_eq!(order.wo_actual_completion_date, None);
    }

    #[tokio::test]
    async fn test_weekly_counts_accept_both_shapes() {
        let api = CannedRequester::new()
            .respond(
                endpoints::ACTIVE_WORK_ORDERS,
                json!([{"year": 2024, "month": 5, "week_of_month": 2, "released_count": 7, "last_week_count": 4, "diff_from_last_week": 3}]),
            )
            .respond(
                endpoints::UNRELEASED_WORK_ORDERS,
                json!([{"year": 2024, "month": 5, "week_of_month": 1, "unreleased_count": 2, "last_week_count": null, "diff_from_last_week_unreleased": 2}]),
            );

        let active = active_work_orders(&api).await;
        assert_eq!(active.data[0].count, 7.0);
        assert_eq!(active.data[0].diff_from_last_week, 3.0);

        let unreleased = unreleased_work_orders(&api).await;
        assert_eq!(unreleased.data[0].count, 2.0);
        assert_eq!(unreleased.data[0].last_week_count, 0.0);
        assert_eq!(unreleased.data[0].diff_from_last_week, 2.0);
    }

    #[tokio::test]
    async fn test_submit_work_request() {
        let api = CannedRequester::new().respond(endpoints::CREATE_WORK_REQUEST, json!({"wr_number": "WR-1A2B3C"}));
        let request = NewWorkRequest {
            title: "Leaking valve".to_string(),
            description: "Valve V-12 leaks".to_string(),
            urgency: "high".to_string(),
            wr_type: "corrective".to_string(),
            ..NewWorkRequest::default()
        };

        let created = submit_work_request(&api, &request).await.unwrap();
        assert_eq!(created["wr_number"], "WR-1A2B3C");

        let calls = api.calls();
        assert_eq!(calls.len(), 1);
        let (method, path, body) = &calls[0];
        assert_eq!(*method, ApiMethod::Post);
        assert_eq!(path, endpoints::CREATE_WORK_REQUEST);
        let body = body.as_ref().unwrap();
        assert_eq!(body["title"], "Leaking valve");
        assert!(body.get("failure_code").is_none());
    }

    #[tokio::test]
    async fn test_incomplete_work_request_is_not_sent() {
        let api = CannedRequester::new();
        let result = submit_work_request(&api, &NewWorkRequest::default()).await;
        assert!(matches!(result, Err(ClientError::InvalidRequest(_))));
        assert!(api.calls().is_empty());
    }

    fn manual() -> NewDocument {
        NewDocument {
            file_name: "Pump SOP".to_string(),
            category: "SOP".to_string(),
            department: "Engineering".to_string(),
            version: "2".to_string(),
            file_url: "https://files.example/sop/pump.pdf".to_string(),
            size: 2048,
            ..NewDocument::default()
        }
    }

    #[tokio::test]
    async fn test_upload_document() {
        let api = CannedRequester::new().respond(endpoints::DOCUMENT_UPLOAD, json!({"id": 9}));

        let created = upload_document(&api, &manual()).await.unwrap();
        assert_eq!(created["id"], 9);

        let calls = api.calls();
        assert_eq!(calls.len(), 1);
        let (method, path, body) = &calls[0];
        assert_eq!(*method, ApiMethod::Post);
        assert_eq!(path, endpoints::DOCUMENT_UPLOAD);
        let body = body.as_ref().unwrap();
        assert_eq!(body["file_url"], "https://files.example/sop/pump.pdf");
        assert_eq!(body["size"], 2048);
        assert_eq!(body["description"], "");
    }

    #[tokio::test]
    async fn test_oversized_or_incomplete_document_is_not_sent() {
        let api = CannedRequester::new();

        let oversized = NewDocument {
            size: MAX_DOCUMENT_SIZE_MB * 1024 * 1024 + 1,
            ..manual()
        };
        let result = upload_document(&api, &oversized).await;
        assert!(matches!(result, Err(ClientError::InvalidRequest(_))));

        let unnamed = NewDocument {
            file_name: " ".to_string(),
            ..manual()
        };
        let result = upload_document(&api, &unnamed).await;
        assert!(matches!(result, Err(ClientError::InvalidRequest(msg)) if msg.contains("file_name")));

        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_set_user_status() {
        let api = CannedRequester::new().respond("users/5/status/", json!({"message": "Status updated successfully"}));
        set_user_status(&api, 5, AccountStatus::Inactive).await.unwrap();

        let calls = api.calls();
        assert_eq!(calls[0].0, ApiMethod::Patch);
        assert_eq!(calls[0].2, Some(json!({"status": "Inactive"})));
    }

    #[tokio::test]
    async fn test_register_user_sends_role_name() {
        let api = CannedRequester::new().respond(endpoints::REGISTER_USER, json!({"message": "User created"}));
        let user = NewUser {
            username: "dina".to_string(),
            password: "secret".to_string(),
            full_name: "Dina QAC".to_string(),
            email: String::new(),
            role: Role::Qac,
            division: String::new(),
        };
        register_user(&api, &user).await.unwrap();
        assert_eq!(api.calls()[0].2.as_ref().unwrap()["role"], "qac");
    }

    #[tokio::test]
    async fn test_user_stats_and_divisions() {
        let api = CannedRequester::new()
            .respond(endpoints::USER_STATS, json!({"total_users": 12, "active_users": "9"}))
            .respond(endpoints::DIVISIONS, json!(["IT", "QA", null, "EN"]));

        assert_eq!(user_stats(&api).await.data, UserStats { total_users: 12, active_users: 9 });
        assert_eq!(divisions(&api).await.data, vec!["IT", "QA", "EN"]);
    }

    #[tokio::test]
    async fn test_energy_budget() {
        let api = CannedRequester::new().respond(
            endpoints::ENERGY,
            json!([{"type": "listrik", "current": "25", "budget": 100, "unit": "kWh"}, {"type": "air", "current": 3, "budget": 0, "unit": "m³"}]),
        );
        let readings = energy(&api).await.data;
        assert_eq!(readings[0].kind, "listrik");
        assert_eq!(readings[0].budget_used_percent(), 25.0);
        assert_eq!(readings[1].budget_used_percent(), 0.0);
    }

    #[tokio::test]
    async fn test_delete_document() {
        let api = CannedRequester::new().respond("documents/abc/", Value::Null);
        delete_document(&api, "abc").await.unwrap();
        assert_eq!(api.calls()[0].0, ApiMethod::Delete);

        assert!(delete_document(&api, " ").await.is_err());
    }

    #[tokio::test]
    async fn test_analytics_report() {
        let api = CannedRequester::new()
            .respond(
                "analytics/?period=1year",
                json!([
                    {"date": "2024-01", "mttr_hours": "2", "mtbf_hours": 100, "failure_count": 3},
                    {"date": "2024-02", "mttr_hours": 1.5, "mtbf_hours": "abc", "failure_count": 1}
                ]),
            )
            .respond("category-analytics/?period=1year", json!([{"resource": "MTC", "count": 4, "avgMttr": "1.2"}]))
            .respond("equipment-analytics/?period=1year", json!({"not": "a list"}))
            .respond("monthly-trend/?period=1year", json!([{"month": "2024-02", "planned": 3, "unplanned": 1, "total": 4}]));

        let report = analytics_report(&api, AnalyticsPeriod::OneYear).await;

        assert_eq!(report.reliability.len(), 2);
        assert_eq!(
            report.summary,
            ReliabilitySummary { mttr_hours: 1.5, mtbf_hours: 0.0, failure_count: 1.0 }
        );
        assert_eq!(report.categories[0].category, "MTC");
        assert_eq!(report.categories[0].avg_mttr, 1.2);
        assert!(report.equipment.is_empty());
        assert_eq!(report.monthly_trend[0].label, "2024-02");
        assert!(report.downtime.is_empty());

        let failed: Vec<&str> = report.issues.iter().map(|(path, _)| *path).collect();
        assert_eq!(failed, vec![endpoints::EQUIPMENT_ANALYTICS, endpoints::DOWNTIME]);
        assert!(!report.requires_login());
        assert_eq!(api.calls().len(), 5);
    }

    #[tokio::test]
    async fn test_analytics_report_without_session() {
        let api = CannedRequester::unauthenticated();
        let report = analytics_report(&api, AnalyticsPeriod::default()).await;
        assert!(report.requires_login());
        assert_eq!(report.summary, ReliabilitySummary::default());
        assert_eq!(report.issues.len(), 5);
    }
}
