//! 记录存储 API 客户端
//!
//! 封装所有与记录存储（REST 风格批量写入）相关的调用逻辑

use crate::config::Config;
use crate::error::AppError;
use crate::models::McqRecord;
use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

/// 批量写入结果
///
/// 区分"写入了若干行"与"一行也没写入"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertOutcome {
    pub rows_written: usize,
}

impl InsertOutcome {
    pub fn wrote_rows(&self) -> bool {
        self.rows_written > 0
    }
}

/// 记录存储能力
///
/// 写入按批进行，没有行级的部分成功语义；重试由调用方负责
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// 批量写入一组记录
    ///
    /// # 参数
    /// - `table`: 目标数据表名
    /// - `records`: 待写入的记录
    ///
    /// # 返回
    /// 返回写入行数
    async fn insert(&self, table: &str, records: &[McqRecord]) -> Result<InsertOutcome>;
}

/// 记录存储客户端
pub struct RecordStoreClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RecordStoreClient {
    /// 创建新的记录存储客户端
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config
                .record_store_api_base_url
                .trim_end_matches('/')
                .to_string(),
            api_key: config.record_store_key.clone(),
        }
    }

    /// 拼接数据表端点
    fn endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }
}

#[async_trait]
impl RecordStore for RecordStoreClient {
    async fn insert(&self, table: &str, records: &[McqRecord]) -> Result<InsertOutcome> {
        let endpoint = self.endpoint(table);

        debug!("批量写入 {} 条记录 → {}", records.len(), endpoint);

        let response = self
            .http
            .post(&endpoint)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=representation")
            .json(records)
            .send()
            .await
            .map_err(|e| AppError::upload_request_failed(endpoint.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(
                AppError::upload_bad_status(endpoint.as_str(), status.as_u16(), body).into(),
            );
        }

        // return=representation：返回的数组长度即写入行数
        let rows: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| AppError::upload_response_parse_failed(endpoint.as_str(), e))?;

        debug!("写入结果: {} 行", rows.len());

        Ok(InsertOutcome {
            rows_written: rows.len(),
        })
    }
}
