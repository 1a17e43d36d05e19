//! 提取流程 - 流程层
//!
//! 核心职责：定义"一对文档"的完整提取流程
//!
//! 流程顺序：
//! 1. 提取形状（题目文档 + 答案文档，顺序拼接）
//! 2. 渲染 DOCX → LaTeX（两份互不依赖，并行渲染）
//! 3. 解析题目 / 解析答案
//! 4. 形状归属（四级启发式链）

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

use crate::clients::DocumentRenderer;
use crate::config::Config;
use crate::models::{AnswerMap, Question};
use crate::services::{AnswerParser, LinkStats, QuestionParser, ShapeExtractor, ShapeLinker};
use crate::workflow::paper_ctx::PaperCtx;

/// 提取结果
#[derive(Debug)]
pub struct ExtractOutcome {
    pub questions: Vec<Question>,
    pub answers: AnswerMap,
    /// 两份文档合计提取的形状数
    pub shape_count: usize,
    pub link_stats: LinkStats,
}

/// 提取流程
///
/// - 编排完整的提取流程
/// - 不持有任何外部资源，渲染能力由调用方注入
/// - 只依赖业务能力（services）
pub struct ExtractFlow {
    shape_extractor: ShapeExtractor,
    question_parser: QuestionParser,
    answer_parser: AnswerParser,
    shape_linker: ShapeLinker,
    verbose_logging: bool,
}

impl ExtractFlow {
    /// 创建新的提取流程
    pub fn new(config: &Config) -> Self {
        Self {
            shape_extractor: ShapeExtractor::new(),
            question_parser: QuestionParser::new(),
            answer_parser: AnswerParser::new(),
            shape_linker: ShapeLinker::new(),
            verbose_logging: config.verbose_logging,
        }
    }

    pub async fn run(
        &self,
        renderer: &dyn DocumentRenderer,
        ctx: &PaperCtx,
        question_docx: &Path,
        answer_docx: &Path,
    ) -> Result<ExtractOutcome> {
        // ========== 步骤 1: 提取形状 ==========
        // 形状直接来自原始文档包，与渲染无关；
        // 序列顺序必须是 题目文档在前、答案文档在后
        info!("{} 📦 正在提取文档形状...", ctx);

        let (question_bytes, answer_bytes) = tokio::try_join!(
            tokio::fs::read(question_docx),
            tokio::fs::read(answer_docx),
        )
        .with_context(|| {
            format!(
                "无法读取文档: {} / {}",
                question_docx.display(),
                answer_docx.display()
            )
        })?;

        let mut shapes = self
            .shape_extractor
            .extract(&question_bytes, &question_docx.display().to_string())?;
        shapes.extend(
            self.shape_extractor
                .extract(&answer_bytes, &answer_docx.display().to_string())?,
        );

        // ========== 步骤 2: 渲染 ==========
        info!("{} 📄 正在渲染文档...", ctx);

        let temp_dir = std::env::temp_dir();
        let temp_q = temp_dir.join("temp_q.tex");
        let temp_a = temp_dir.join("temp_a.tex");
        let (questions_tex, answers_tex) = tokio::try_join!(
            renderer.render(question_docx, &temp_q),
            renderer.render(answer_docx, &temp_a),
        )?;

        // ========== 步骤 3: 解析题目 / 答案 ==========
        let mut questions = self.question_parser.parse(&questions_tex)?;
        let mut answers = self.answer_parser.parse(&answers_tex, &shapes)?;

        if questions.is_empty() {
            warn!("{} ⚠️ 没有解析出任何题目", ctx);
        }

        if self.verbose_logging {
            for question in &questions {
                info!("{}   {}", ctx, question);
            }
        }

        // ========== 步骤 4: 形状归属 ==========
        let link_stats = self.shape_linker.link(&shapes, &mut questions, &mut answers)?;

        info!(
            "{} ✓ 提取完成: {} 道题目 / {} 条答案 / {} 个形状",
            ctx,
            questions.len(),
            answers.len(),
            shapes.len()
        );

        Ok(ExtractOutcome {
            questions,
            answers,
            shape_count: shapes.len(),
            link_stats,
        })
    }
}
