//! 试卷处理上下文
//!
//! 封装"我正在处理哪一对文档、带什么元数据"这一信息

use crate::config::Config;
use std::fmt::Display;

/// 试卷处理上下文
///
/// 包含组装上传记录所需的全部调用方元数据
#[derive(Debug, Clone)]
pub struct PaperCtx {
    /// 科目
    pub subject: String,

    /// 年份
    pub year: String,

    /// 试卷/分组标识（可选）
    pub test_id: Option<String>,

    /// 试卷标签（仅用于日志显示）
    pub paper_label: String,
}

impl PaperCtx {
    /// 创建新的试卷上下文
    pub fn new(
        subject: String,
        year: String,
        test_id: Option<String>,
        paper_label: String,
    ) -> Self {
        Self {
            subject,
            year,
            test_id,
            paper_label,
        }
    }

    /// 从配置构造上下文
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.subject.clone(),
            config.year.clone(),
            config.test_id.clone(),
            config.question_docx.clone(),
        )
    }
}

impl Display for PaperCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[试卷 {} 科目#{} 年份#{}]",
            self.paper_label, self.subject, self.year
        )
    }
}
