/// 后台管理 API 客户端
///
/// 登录获取令牌，然后用 Bearer 令牌读取仪表盘数据
use futures::future::try_join_all;
use reqwest::{header, Client};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AdminError, AppError, AppResult, ConfigError, TransportError};
use crate::models::AccessToken;

/// 仪表盘指标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardMetric {
    SalesTotal,
    TaxTotal,
    ProcessedResumes,
    AvgProcessingTime,
    FailedResumes,
    WeeklyResumes,
}

impl DashboardMetric {
    pub const ALL: [DashboardMetric; 6] = [
        DashboardMetric::SalesTotal,
        DashboardMetric::TaxTotal,
        DashboardMetric::ProcessedResumes,
        DashboardMetric::AvgProcessingTime,
        DashboardMetric::FailedResumes,
        DashboardMetric::WeeklyResumes,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            DashboardMetric::SalesTotal => "/dashboard/sales/total",
            DashboardMetric::TaxTotal => "/dashboard/sales/tax-total",
            DashboardMetric::ProcessedResumes => "/dashboard/total/processed-resumes",
            DashboardMetric::AvgProcessingTime => "/dashboard/resumes/avg-processing-time",
            DashboardMetric::FailedResumes => "/dashboard/resumes/failed-total",
            DashboardMetric::WeeklyResumes => "/dashboard/resumes/weekly",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DashboardMetric::SalesTotal => "sales_total",
            DashboardMetric::TaxTotal => "tax_total",
            DashboardMetric::ProcessedResumes => "processed_resumes",
            DashboardMetric::AvgProcessingTime => "avg_processing_time",
            DashboardMetric::FailedResumes => "failed_resumes",
            DashboardMetric::WeeklyResumes => "weekly_resumes",
        }
    }
}

/// 仪表盘快照，按 [`DashboardMetric::ALL`] 的顺序保存原始 JSON
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub readings: Vec<(DashboardMetric, Value)>,
}

impl DashboardSnapshot {
    pub fn get(&self, metric: DashboardMetric) -> Option<&Value> {
        self.readings
            .iter()
            .find(|(m, _)| *m == metric)
            .map(|(_, v)| v)
    }

    pub fn to_json(&self) -> Value {
        let map = self
            .readings
            .iter()
            .map(|(m, v)| (m.label().to_string(), v.clone()))
            .collect::<serde_json::Map<_, _>>();
        Value::Object(map)
    }
}

/// 后台管理客户端
pub struct AdminClient {
    client: Client,
    base_url: String,
}

impl AdminClient {
    /// 创建新的后台客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| AppError::Config(ConfigError::HttpClient { source: e }))?;

        Ok(Self {
            client,
            base_url: config.admin_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// 用户名密码登录
    pub async fn login(&self, username: &str, password: &str) -> AppResult<AccessToken> {
        let endpoint = "/dashboard/token";
        let response = self
            .client
            .post(format!("{}{}", self.base_url, endpoint))
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .map_err(|e| request_failed(endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdminError::InvalidCredentials {
                status: status.as_u16(),
            }
            .into());
        }

        let body = response.bytes().await.map_err(|e| request_failed(endpoint, e))?;
        let token: AccessToken =
            serde_json::from_slice(&body).map_err(|e| AdminError::InvalidJson {
                endpoint: endpoint.to_string(),
                source: e,
            })?;

        if token.access_token.trim().is_empty() {
            return Err(AdminError::MissingToken.into());
        }

        info!("✓ 登录成功");
        Ok(token)
    }

    /// 读取单个指标
    pub async fn fetch_metric(
        &self,
        token: &AccessToken,
        metric: DashboardMetric,
    ) -> AppResult<Value> {
        let endpoint = metric.path();
        debug!("读取仪表盘指标: {}", endpoint);

        let response = self
            .client
            .get(format!("{}{}", self.base_url, endpoint))
            .header(header::AUTHORIZATION, format!("Bearer {}", token.access_token))
            .send()
            .await
            .map_err(|e| request_failed(endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdminError::Rejected {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let body = response.bytes().await.map_err(|e| request_failed(endpoint, e))?;
        serde_json::from_slice(&body).map_err(|e| {
            AdminError::InvalidJson {
                endpoint: endpoint.to_string(),
                source: e,
            }
            .into()
        })
    }

    /// 并发读取全部指标
    pub async fn dashboard(&self, token: &AccessToken) -> AppResult<DashboardSnapshot> {
        let values = try_join_all(
            DashboardMetric::ALL
                .iter()
                .map(|metric| self.fetch_metric(token, *metric)),
        )
        .await?;

        Ok(DashboardSnapshot {
            readings: DashboardMetric::ALL.iter().copied().zip(values).collect(),
        })
    }
}

fn request_failed(endpoint: &str, err: reqwest::Error) -> AppError {
    AdminError::RequestFailed {
        endpoint: endpoint.to_string(),
        source: TransportError::from(err),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_json_uses_labels() {
        let snapshot = DashboardSnapshot {
            readings: vec![
                (DashboardMetric::SalesTotal, serde_json::json!({"total": 10})),
                (DashboardMetric::WeeklyResumes, serde_json::json!([1, 2])),
            ],
        };

        let json = snapshot.to_json();
        assert_eq!(json["sales_total"]["total"], 10);
        assert_eq!(json["weekly_resumes"][1], 2);
        assert!(snapshot.get(DashboardMetric::TaxTotal).is_none());
    }

    #[test]
    fn test_metric_paths_are_distinct() {
        let mut paths: Vec<_> = DashboardMetric::ALL.iter().map(|m| m.path()).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), DashboardMetric::ALL.len());
    }
}
