use crate::models::shape::Shape;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 单个选项
///
/// 同一道题内选项字母唯一，输出按字母升序排列
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// 选项字母（大写）
    pub option: char,
    /// 选项内容
    pub choice: String,
}

/// 一道题目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// 题号（解析阶段保证唯一）
    pub number: u32,
    /// 题干文本（保留题干内嵌的非选项表格）
    pub question: String,
    /// 选项列表（按字母升序）
    pub choices: Vec<Choice>,
    /// 归属到本题的形状（由 ShapeLinker 填充）
    #[serde(default)]
    pub shapes: Vec<Shape>,
    /// 正确答案（组装阶段从答案映射填充）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    /// 解析说明（组装阶段从答案映射填充）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    pub fn new(number: u32, question: String, choices: Vec<Choice>) -> Self {
        Self {
            number,
            question,
            choices,
            shapes: Vec::new(),
            answer: None,
            explanation: None,
        }
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 截断题干以便显示（最多80个字符）
        let preview = if self.question.chars().count() > 80 {
            self.question.chars().take(80).collect::<String>() + "..."
        } else {
            self.question.clone()
        };
        write!(f, "{}. {} [{} 个选项]", self.number, preview, self.choices.len())
    }
}

/// 答案区块的解析结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// 题号（同时是映射键）
    pub number: u32,
    /// 校验通过的答案字母，或原文哨兵 "No Answer is given"；
    /// 其余取值一律归一化为 None
    pub answer: Option<String>,
    /// 解析说明（正文 + 可选引用块）
    pub explanation: String,
    /// 解析说明中回引的形状
    #[serde(default)]
    pub shapes: Vec<Shape>,
}

/// 题号 → 答案 的映射
///
/// BTreeMap 保证按题号升序迭代，形状归属因此是确定性的
pub type AnswerMap = BTreeMap<u32, Answer>;

/// 最终上传的题目记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McqRecord {
    /// 随机唯一ID
    pub id: String,
    pub question_number: u32,
    pub question_text: String,
    /// 选项列表的 JSON 序列化（保持字母顺序）
    pub options: String,
    pub correct_answer: Option<String>,
    pub explanation: Option<String>,
    pub subject: String,
    pub year: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_id: Option<String>,
}
