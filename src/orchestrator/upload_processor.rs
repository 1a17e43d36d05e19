//! 记录组装与批量上传 - 编排层
//!
//! 把解析结果拍平成上传记录，并带重试地交给记录存储。
//! 整批写入没有行级的部分成功语义：任何一次尝试写入了行
//! 即视为成功，重试耗尽则整批报失败

use anyhow::Result;
use tracing::{info, warn};
use uuid::Uuid;

use crate::clients::{InsertOutcome, RecordStore};
use crate::error::AppError;
use crate::models::{AnswerMap, McqRecord, Question};
use crate::utils::logging::truncate_text;
use crate::workflow::PaperCtx;

/// 上传统计
#[derive(Debug, Default, Clone, Copy)]
pub struct UploadStats {
    /// 组装出的记录数
    pub assembled: usize,
    /// 未匹配到答案的题目数
    pub without_answer: usize,
    /// 实际写入行数
    pub rows_written: usize,
}

/// 组装上传记录
///
/// 每道题按题号查答案映射；查不到时 answer/explanation 置空。
/// 返回记录列表与未匹配到答案的题目数
pub fn assemble_records(
    questions: &[Question],
    answers: &AnswerMap,
    ctx: &PaperCtx,
) -> Result<(Vec<McqRecord>, usize)> {
    let mut records = Vec::with_capacity(questions.len());
    let mut without_answer = 0;

    for question in questions {
        let (answer, explanation) = match answers.get(&question.number) {
            Some(found) => {
                info!(
                    "✓ 题目 {} 匹配到答案: {}",
                    question.number,
                    found.answer.as_deref().unwrap_or("None")
                );
                (found.answer.clone(), Some(found.explanation.clone()))
            }
            None => {
                warn!(
                    "⚠️ 题目 {} 没有匹配到答案: {}",
                    question.number,
                    truncate_text(&question.question, 30)
                );
                without_answer += 1;
                (None, None)
            }
        };

        records.push(McqRecord {
            id: Uuid::new_v4().to_string(),
            question_number: question.number,
            question_text: question.question.clone(),
            options: serde_json::to_string(&question.choices)?,
            correct_answer: answer,
            explanation,
            subject: ctx.subject.clone(),
            year: ctx.year.clone(),
            test_id: ctx.test_id.clone(),
        });
    }

    Ok((records, without_answer))
}

/// 批量上传（含重试，无退避）
///
/// # 参数
/// - `store`: 记录存储
/// - `table`: 目标数据表
/// - `records`: 待上传的记录
/// - `max_attempts`: 最大尝试次数
pub async fn upload_records(
    store: &dyn RecordStore,
    table: &str,
    records: &[McqRecord],
    max_attempts: usize,
) -> Result<InsertOutcome> {
    if records.is_empty() {
        warn!("⚠️ 没有可上传的记录，跳过写入");
        return Ok(InsertOutcome::default());
    }

    for attempt in 1..=max_attempts {
        match store.insert(table, records).await {
            Ok(outcome) if outcome.wrote_rows() => {
                info!(
                    "✅ 成功上传 {} 条记录 (第 {} 次尝试)",
                    outcome.rows_written, attempt
                );
                return Ok(outcome);
            }
            Ok(_) => {
                warn!("❌ 第 {}/{} 次上传未写入任何行", attempt, max_attempts);
            }
            Err(e) => {
                warn!("⚠️ 第 {}/{} 次上传失败: {}", attempt, max_attempts, e);
            }
        }
    }

    Err(AppError::upload_retries_exhausted(max_attempts).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 失败若干次后才成功的假存储
    struct FlakyStore {
        failures_before_success: usize,
        attempts: AtomicUsize,
    }

    impl FlakyStore {
        fn new(failures_before_success: usize) -> Self {
            Self {
                failures_before_success,
                attempts: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RecordStore for FlakyStore {
        async fn insert(&self, _table: &str, records: &[McqRecord]) -> Result<InsertOutcome> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            if attempt < self.failures_before_success {
                anyhow::bail!("模拟的网络故障");
            }
            Ok(InsertOutcome {
                rows_written: records.len(),
            })
        }
    }

    fn ctx() -> PaperCtx {
        PaperCtx::new(
            "历史".to_string(),
            "2024".to_string(),
            Some("mock-test".to_string()),
            "试卷A".to_string(),
        )
    }

    fn sample_question(number: u32) -> Question {
        use crate::models::Choice;
        Question::new(
            number,
            format!("题干 {}", number),
            vec![
                Choice { option: 'A', choice: "甲".to_string() },
                Choice { option: 'B', choice: "乙".to_string() },
            ],
        )
    }

    fn sample_record() -> McqRecord {
        McqRecord {
            id: "fixed".to_string(),
            question_number: 1,
            question_text: "题干".to_string(),
            options: "[]".to_string(),
            correct_answer: None,
            explanation: None,
            subject: "历史".to_string(),
            year: "2024".to_string(),
            test_id: None,
        }
    }

    #[test]
    fn test_assemble_merges_answer_fields() {
        use crate::models::Answer;

        let questions = vec![sample_question(1), sample_question(2)];
        let mut answers = AnswerMap::new();
        answers.insert(
            1,
            Answer {
                number: 1,
                answer: Some("B".to_string()),
                explanation: "因为如此".to_string(),
                shapes: Vec::new(),
            },
        );

        let (records, without_answer) =
            assemble_records(&questions, &answers, &ctx()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(without_answer, 1);

        assert_eq!(records[0].correct_answer.as_deref(), Some("B"));
        assert_eq!(records[0].explanation.as_deref(), Some("因为如此"));
        assert_eq!(records[1].correct_answer, None);
        assert_eq!(records[1].explanation, None);

        // 元数据来自调用方
        assert_eq!(records[0].subject, "历史");
        assert_eq!(records[0].year, "2024");
        assert_eq!(records[0].test_id.as_deref(), Some("mock-test"));

        // 选项按字母顺序序列化
        assert!(records[0].options.contains("\"option\":\"A\""));
    }

    #[test]
    fn test_assemble_generates_unique_ids() {
        let questions = vec![sample_question(1), sample_question(2)];
        let answers = AnswerMap::new();
        let (records, _) = assemble_records(&questions, &answers, &ctx()).unwrap();
        assert_ne!(records[0].id, records[1].id);
    }

    #[tokio::test]
    async fn test_upload_succeeds_first_attempt() {
        let store = FlakyStore::new(0);
        let outcome = upload_records(&store, "questions", &[sample_record()], 3)
            .await
            .unwrap();
        assert_eq!(outcome.rows_written, 1);
        assert_eq!(store.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_upload_retries_then_succeeds() {
        let store = FlakyStore::new(2);
        let outcome = upload_records(&store, "questions", &[sample_record()], 3)
            .await
            .unwrap();
        assert!(outcome.wrote_rows());
        assert_eq!(store.attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_upload_fails_after_exhausting_retries() {
        let store = FlakyStore::new(usize::MAX);
        let result = upload_records(&store, "questions", &[sample_record()], 3).await;
        assert!(result.is_err());
        assert_eq!(store.attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_empty_batch_skips_store_call() {
        let store = FlakyStore::new(usize::MAX);
        let outcome = upload_records(&store, "questions", &[], 3).await.unwrap();
        assert_eq!(outcome.rows_written, 0);
        assert_eq!(store.attempts.load(Ordering::SeqCst), 0);
    }
}
