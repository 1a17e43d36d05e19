//! 文档渲染客户端
//!
//! 封装 DOCX → LaTeX 的转换调用（pandoc 子进程）

use crate::config::Config;
use crate::error::AppError;
use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

/// 文档渲染能力
///
/// 核心流程只依赖这个窄接口，测试用假实现替换；
/// 渲染失败必须以错误传播，不允许悄悄返回空文本
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    /// 把一份文档渲染成标记文本
    ///
    /// # 参数
    /// - `input`: 源文档路径
    /// - `output`: 渲染产物的落盘位置
    ///
    /// # 返回
    /// 返回渲染出的标记文本
    async fn render(&self, input: &Path, output: &Path) -> Result<String>;
}

/// pandoc 渲染客户端
pub struct PandocClient {
    pandoc_path: String,
}

impl PandocClient {
    /// 创建新的渲染客户端
    pub fn new(config: &Config) -> Self {
        Self {
            pandoc_path: config.pandoc_path.clone(),
        }
    }
}

#[async_trait]
impl DocumentRenderer for PandocClient {
    async fn render(&self, input: &Path, output: &Path) -> Result<String> {
        if !input.exists() {
            return Err(AppError::file_not_found(input.display().to_string()).into());
        }

        let result = tokio::process::Command::new(&self.pandoc_path)
            .arg(input)
            .args(["-f", "docx", "-t", "latex", "-o"])
            .arg(output)
            .output()
            .await
            .map_err(|e| AppError::convert_launch_failed(self.pandoc_path.as_str(), e))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            return Err(AppError::conversion_failed(input.display().to_string(), stderr).into());
        }

        let text = tokio::fs::read_to_string(output)
            .await
            .map_err(|e| AppError::output_read_failed(output.display().to_string(), e))?;

        debug!(
            "渲染完成 {} → {} ({} 字符)",
            input.display(),
            output.display(),
            text.chars().count()
        );
        Ok(text)
    }
}
