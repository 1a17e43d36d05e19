use crate::error::AppError;
use anyhow::Result;
use std::path::Path;

/// 程序配置
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    /// 题目文档路径（DOCX）
    pub question_docx: String,
    /// 答案文档路径（DOCX）
    pub answer_docx: String,
    /// 科目（随记录原样上传）
    pub subject: String,
    /// 年份（随记录原样上传）
    pub year: String,
    /// 试卷/分组标识（可选）
    pub test_id: Option<String>,
    /// pandoc 可执行文件路径
    pub pandoc_path: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    // --- 记录存储 API 配置 ---
    pub record_store_api_base_url: String,
    pub record_store_key: String,
    /// 目标数据表
    pub record_store_table: String,
    /// 批量上传最大尝试次数
    pub max_upload_attempts: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            question_docx: "input/questions.docx".to_string(),
            answer_docx: "input/answers.docx".to_string(),
            subject: String::new(),
            year: String::new(),
            test_id: None,
            pandoc_path: "pandoc".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            record_store_api_base_url: "http://127.0.0.1:54321".to_string(),
            record_store_key: String::new(),
            record_store_table: "questions".to_string(),
            max_upload_attempts: 3,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            question_docx: std::env::var("QUESTION_DOCX").unwrap_or(default.question_docx),
            answer_docx: std::env::var("ANSWER_DOCX").unwrap_or(default.answer_docx),
            subject: std::env::var("SUBJECT").unwrap_or(default.subject),
            year: std::env::var("YEAR").unwrap_or(default.year),
            test_id: std::env::var("TEST_ID").ok(),
            pandoc_path: std::env::var("PANDOC_PATH").unwrap_or(default.pandoc_path),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            record_store_api_base_url: std::env::var("RECORD_STORE_API_BASE_URL").unwrap_or(default.record_store_api_base_url),
            record_store_key: std::env::var("RECORD_STORE_KEY").unwrap_or(default.record_store_key),
            record_store_table: std::env::var("RECORD_STORE_TABLE").unwrap_or(default.record_store_table),
            max_upload_attempts: std::env::var("MAX_UPLOAD_ATTEMPTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_upload_attempts),
        }
    }

    /// 从 TOML 配置文件加载（未出现的字段用默认值）
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AppError::file_not_found(path.display().to_string()).into());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(AppError::from)?;
        Ok(config)
    }
}
