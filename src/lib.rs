//! # Extract Question Upload
//!
//! 一个从 DOCX 试卷中提取选择题并批量上传的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 外部协作层（Clients）
//! - `clients/` - 封装外部协作方，核心流程只依赖窄接口
//! - `PandocClient` - 文档渲染能力（DOCX → LaTeX）
//! - `RecordStoreClient` - 记录存储能力（REST 批量写入）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个能力只做一件事
//! - `ShapeExtractor` - 从文档包提取形状序列
//! - `QuestionParser` / `ChoiceTableParser` - 题目与选项表解析
//! - `AnswerParser` - 答案区块解析（含形状回引）
//! - `ShapeLinker` - 四级启发式形状归属
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一对文档"的完整提取流程
//! - `PaperCtx` - 上下文封装（科目 + 年份 + 试卷标识）
//! - `ExtractFlow` - 流程编排（形状 → 渲染 → 解析 → 归属）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/paper_processor` - 应用生命周期与端到端调度
//! - `orchestrator/upload_processor` - 记录组装与带重试的批量上传
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{DocumentRenderer, InsertOutcome, PandocClient, RecordStore, RecordStoreClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Answer, AnswerMap, Choice, McqRecord, Question, Shape};
pub use orchestrator::App;
pub use services::{
    AnswerParser, ChoiceTableParser, QuestionParser, ShapeExtractor, ShapeLinker,
};
pub use workflow::{ExtractFlow, ExtractOutcome, PaperCtx};
