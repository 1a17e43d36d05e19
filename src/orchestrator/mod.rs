//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责端到端调度和统计，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `paper_processor` - 试卷处理器
//! - 管理应用生命周期（初始化、运行）
//! - 持有渲染客户端与存储客户端
//! - 委托 workflow 完成提取，委托 upload_processor 完成上传
//! - 输出全局统计信息
//!
//! ### `upload_processor` - 记录组装与批量上传
//! - 把题目 + 答案映射拍平成上传记录
//! - 批量写入记录存储，失败时有限次重试（无退避）
//! - 整批成功或整批报失败，没有部分提交语义
//!
//! ## 层次关系
//!
//! ```text
//! paper_processor (处理一对文档)
//!     ↓
//! workflow::ExtractFlow (提取：形状 → 渲染 → 解析 → 归属)
//!     ↓
//! services (能力层：extract / parse / link)
//!     ↓
//! clients (外部协作方：pandoc / 记录存储)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：paper_processor 管生命周期，upload_processor 管上传
//! 2. **资源隔离**：只有编排层持有外部客户端
//! 3. **向下依赖**：编排层 → workflow → services → clients
//! 4. **无业务逻辑**：只做调度和统计，不做具体解析判断

pub mod paper_processor;
pub mod upload_processor;

// 重新导出主要类型
pub use paper_processor::App;
pub use upload_processor::{assemble_records, upload_records, UploadStats};
