//! 形状归属服务 - 业务能力层
//!
//! 源文档不携带可靠的"形状→锚点"标识，这里用一条显式的
//! 四级启发式链为每个形状挑一个归属：数字直配、题干子串、
//! 解析子串、兜底。链条按序求值，首个命中即停；
//! 全部决策先收集为独立的归属结果，最后一次性写入输出，
//! 不在迭代中修改共享集合

use crate::models::{AnswerMap, Question, Shape};
use anyhow::Result;
use regex::Regex;
use tracing::{debug, info, warn};

/// 单个形状的归属目标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget {
    /// 归属到题目（题目序列下标）
    Question(usize),
    /// 归属到答案（题号键）
    Answer(u32),
}

/// 归属统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LinkStats {
    pub to_questions: usize,
    pub to_answers: usize,
    pub dropped: usize,
}

/// 形状归属器
pub struct ShapeLinker;

impl ShapeLinker {
    pub fn new() -> Self {
        Self
    }

    /// 把完整形状序列归属到题目/答案上
    ///
    /// 每个形状恰好归属一次；只有题目和答案同时为空时才会丢弃
    pub fn link(
        &self,
        shapes: &[Shape],
        questions: &mut [Question],
        answers: &mut AnswerMap,
    ) -> Result<LinkStats> {
        let mut stats = LinkStats::default();

        // 先收集全部归属决策，再统一写入
        let mut assignments: Vec<(usize, LinkTarget)> = Vec::new();

        for (index, shape) in shapes.iter().enumerate() {
            let combined = shape.combined_text();

            let target = self
                .tier_numeric_direct(&combined, questions, answers)?
                .or_else(|| self.tier_question_substring(&combined, questions))
                .or_else(|| self.tier_answer_substring(&combined, answers))
                .or_else(|| self.tier_fallback(questions, answers));

            match target {
                Some(target) => {
                    debug!("✅ 形状 {} 归属到 {:?}: {}", index + 1, target, shape);
                    assignments.push((index, target));
                }
                None => {
                    warn!("⚠️ 没有可归属的题目或答案，丢弃形状 {}", index + 1);
                    stats.dropped += 1;
                }
            }
        }

        for (index, target) in assignments {
            match target {
                LinkTarget::Question(q_index) => {
                    if let Some(question) = questions.get_mut(q_index) {
                        question.shapes.push(shapes[index].clone());
                        stats.to_questions += 1;
                    }
                }
                LinkTarget::Answer(number) => {
                    if let Some(answer) = answers.get_mut(&number) {
                        answer.shapes.push(shapes[index].clone());
                        stats.to_answers += 1;
                    }
                }
            }
        }

        if !shapes.is_empty() {
            info!(
                "✅ 形状归属完成: 题目 {} / 答案 {} / 丢弃 {}",
                stats.to_questions, stats.to_answers, stats.dropped
            );
        }

        Ok(stats)
    }

    /// 第一级：取文本中出现的第一个整数，与题号精确相等则归属；
    /// 题目优先于答案
    fn tier_numeric_direct(
        &self,
        combined: &str,
        questions: &[Question],
        answers: &AnswerMap,
    ) -> Result<Option<LinkTarget>> {
        let number = Regex::new(r"\b(\d+)\b")?;

        let num: u32 = match number
            .captures(combined)
            .and_then(|cap| cap.get(1))
            .and_then(|m| m.as_str().parse().ok())
        {
            Some(n) => n,
            None => return Ok(None),
        };

        if let Some(q_index) = questions.iter().position(|q| q.number == num) {
            return Ok(Some(LinkTarget::Question(q_index)));
        }
        if answers.contains_key(&num) {
            return Ok(Some(LinkTarget::Answer(num)));
        }

        Ok(None)
    }

    /// 第二级：形状文本非空且是某道题干的子串（大小写不敏感），
    /// 取序列中第一道命中的题
    fn tier_question_substring(
        &self,
        combined: &str,
        questions: &[Question],
    ) -> Option<LinkTarget> {
        if combined.is_empty() {
            return None;
        }
        questions
            .iter()
            .position(|q| q.question.to_lowercase().contains(combined))
            .map(LinkTarget::Question)
    }

    /// 第三级：同样的子串检验换到答案解析上，按题号升序取首个命中
    fn tier_answer_substring(&self, combined: &str, answers: &AnswerMap) -> Option<LinkTarget> {
        if combined.is_empty() {
            return None;
        }
        answers
            .iter()
            .find(|(_, a)| a.explanation.to_lowercase().contains(combined))
            .map(|(&number, _)| LinkTarget::Answer(number))
    }

    /// 第四级（兜底）：最后一道题；没有题目时取题号最大的答案
    fn tier_fallback(&self, questions: &[Question], answers: &AnswerMap) -> Option<LinkTarget> {
        if !questions.is_empty() {
            return Some(LinkTarget::Question(questions.len() - 1));
        }
        answers
            .keys()
            .next_back()
            .map(|&number| LinkTarget::Answer(number))
    }
}

impl Default for ShapeLinker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Answer, Question};

    fn question(number: u32, text: &str) -> Question {
        Question::new(number, text.to_string(), Vec::new())
    }

    fn answer(number: u32, explanation: &str) -> Answer {
        Answer {
            number,
            answer: Some("A".to_string()),
            explanation: explanation.to_string(),
            shapes: Vec::new(),
        }
    }

    fn shape_with_context(context: &str) -> Shape {
        Shape {
            shape_type: "spPr".to_string(),
            context: vec![context.to_string()],
            ..Default::default()
        }
    }

    fn link(
        shapes: &[Shape],
        questions: &mut Vec<Question>,
        answers: &mut AnswerMap,
    ) -> LinkStats {
        ShapeLinker::new()
            .link(shapes, questions, answers)
            .unwrap()
    }

    #[test]
    fn test_numeric_direct_to_question() {
        // 上下文里独立出现的 "2" 精确等于题号 2，
        // 即便题干文本里含有 "22" 也按数字直配归属
        let mut questions = vec![question(2, "数到 22 为止")];
        let mut answers = AnswerMap::new();
        let shapes = vec![shape_with_context("图 2")];

        let stats = link(&shapes, &mut questions, &mut answers);
        assert_eq!(stats.to_questions, 1);
        assert_eq!(questions[0].shapes.len(), 1);
    }

    #[test]
    fn test_numeric_direct_prefers_question_over_answer() {
        let mut questions = vec![question(3, "题干")];
        let mut answers = AnswerMap::new();
        answers.insert(3, answer(3, "解析"));
        let shapes = vec![shape_with_context("3")];

        link(&shapes, &mut questions, &mut answers);
        assert_eq!(questions[0].shapes.len(), 1);
        assert!(answers[&3].shapes.is_empty());
    }

    #[test]
    fn test_numeric_direct_to_answer() {
        let mut questions = vec![question(1, "题干")];
        let mut answers = AnswerMap::new();
        answers.insert(9, answer(9, "解析"));
        let shapes = vec![shape_with_context("9")];

        let stats = link(&shapes, &mut questions, &mut answers);
        assert_eq!(stats.to_answers, 1);
        assert_eq!(answers[&9].shapes.len(), 1);
    }

    #[test]
    fn test_question_substring_match() {
        let mut questions = vec![
            question(1, "关于河流的题目"),
            question(5, "这里有一幅 示意图 需要观察"),
        ];
        let mut answers = AnswerMap::new();
        let shapes = vec![shape_with_context("示意图")];

        link(&shapes, &mut questions, &mut answers);
        assert!(questions[0].shapes.is_empty());
        assert_eq!(questions[1].shapes.len(), 1);
    }

    #[test]
    fn test_answer_substring_match() {
        let mut questions = vec![question(1, "无关题干")];
        let mut answers = AnswerMap::new();
        answers.insert(4, answer(4, "详见 受力分析 部分"));
        let shapes = vec![shape_with_context("受力分析")];

        let stats = link(&shapes, &mut questions, &mut answers);
        assert_eq!(stats.to_answers, 1);
        assert_eq!(answers[&4].shapes.len(), 1);
    }

    #[test]
    fn test_fallback_to_last_question() {
        let mut questions = vec![question(1, "甲"), question(2, "乙")];
        let mut answers = AnswerMap::new();
        let shapes = vec![shape_with_context("完全匹配不上的文本")];

        link(&shapes, &mut questions, &mut answers);
        assert!(questions[0].shapes.is_empty());
        assert_eq!(questions[1].shapes.len(), 1);
    }

    #[test]
    fn test_fallback_to_max_answer_key() {
        let mut questions = Vec::new();
        let mut answers = AnswerMap::new();
        answers.insert(3, answer(3, "甲"));
        answers.insert(7, answer(7, "乙"));
        let shapes = vec![shape_with_context("匹配不上的文本")];

        link(&shapes, &mut questions, &mut answers);
        assert!(answers[&3].shapes.is_empty());
        assert_eq!(answers[&7].shapes.len(), 1);
    }

    #[test]
    fn test_dropped_only_when_both_empty() {
        let mut questions = Vec::new();
        let mut answers = AnswerMap::new();
        let shapes = vec![shape_with_context("任意文本")];

        let stats = link(&shapes, &mut questions, &mut answers);
        assert_eq!(stats.dropped, 1);
    }

    #[test]
    fn test_every_shape_assigned_exactly_once() {
        let mut questions = vec![question(1, "第一题"), question(2, "第二题")];
        let mut answers = AnswerMap::new();
        answers.insert(2, answer(2, "第二题解析"));

        let shapes = vec![
            shape_with_context("1"),
            shape_with_context("第二题"),
            shape_with_context("随便什么"),
        ];

        let stats = link(&shapes, &mut questions, &mut answers);
        let attached: usize = questions.iter().map(|q| q.shapes.len()).sum::<usize>()
            + answers.values().map(|a| a.shapes.len()).sum::<usize>();
        assert_eq!(attached, shapes.len());
        assert_eq!(stats.dropped, 0);
        assert_eq!(stats.to_questions + stats.to_answers, shapes.len());
    }

    #[test]
    fn test_zero_shapes_is_noop() {
        let mut questions = vec![question(1, "题干")];
        let mut answers = AnswerMap::new();
        answers.insert(1, answer(1, "解析"));

        let stats = link(&[], &mut questions, &mut answers);
        assert_eq!(stats, LinkStats::default());
        assert!(questions[0].shapes.is_empty());
        assert!(answers[&1].shapes.is_empty());
    }
}
