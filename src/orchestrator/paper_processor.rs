//! 试卷处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责一对文档的端到端处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：写日志文件头、创建渲染客户端与存储客户端
//! 2. **流程调度**：委托 workflow::ExtractFlow 完成提取
//! 3. **记录组装与上传**：委托 upload_processor 完成
//! 4. **全局统计**：汇总本次运行的处理结果
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理解析细节
//! - **资源所有者**：唯一持有渲染客户端和存储客户端的模块
//! - **向下委托**：编排层 → workflow → services → clients

use anyhow::Result;
use std::path::Path;
use tracing::warn;

use crate::clients::{PandocClient, RecordStoreClient};
use crate::config::Config;
use crate::orchestrator::upload_processor::{self, UploadStats};
use crate::utils::logging::{init_log_file, log_startup, print_final_stats};
use crate::workflow::{ExtractFlow, PaperCtx};

/// 应用主结构
pub struct App {
    config: Config,
    renderer: PandocClient,
    store: RecordStoreClient,
    flow: ExtractFlow,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        init_log_file(&config.output_log_file)?;

        log_startup(&config);

        let renderer = PandocClient::new(&config);
        let store = RecordStoreClient::new(&config);
        let flow = ExtractFlow::new(&config);

        Ok(Self {
            config,
            renderer,
            store,
            flow,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        let ctx = PaperCtx::from_config(&self.config);

        // 提取流程：形状 → 渲染 → 解析 → 归属
        let outcome = self
            .flow
            .run(
                &self.renderer,
                &ctx,
                Path::new(&self.config.question_docx),
                Path::new(&self.config.answer_docx),
            )
            .await?;

        if outcome.questions.is_empty() {
            warn!("⚠️ 没有解析出任何题目，程序结束");
            return Ok(());
        }

        // 组装并上传记录
        let (records, without_answer) =
            upload_processor::assemble_records(&outcome.questions, &outcome.answers, &ctx)?;

        let insert = upload_processor::upload_records(
            &self.store,
            &self.config.record_store_table,
            &records,
            self.config.max_upload_attempts,
        )
        .await?;

        // 输出最终统计
        let stats = UploadStats {
            assembled: records.len(),
            without_answer,
            rows_written: insert.rows_written,
        };
        print_final_stats(&stats, &self.config.output_log_file);

        Ok(())
    }
}
