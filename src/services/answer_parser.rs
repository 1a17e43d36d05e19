//! 答案解析服务 - 业务能力层
//!
//! 答案文档的结构是重复出现的区块：
//! 题号标记、解析正文、可选引用块、`\textbf{Answer}: 值`。
//! 本模块以 Answer 标签为界把全文切成区块，再在区块内
//! 按显式优先级恢复题号（加粗标记优先于裸数字）

use crate::models::{Answer, AnswerMap, Shape};
use anyhow::Result;
use regex::Regex;
use tracing::{debug, info, warn};

/// 合法答案取值的闭集
///
/// 集合之外的取值一律归一化为 None，解析正文始终保留
static VALID_ANSWERS: phf::Set<&'static str> = phf::phf_set! {
    "A",
    "B",
    "C",
    "D",
    "No Answer is given",
};

/// 答案解析器
pub struct AnswerParser;

impl AnswerParser {
    pub fn new() -> Self {
        Self
    }

    /// 解析整篇答案标记文本
    ///
    /// `shapes` 是题目文档+答案文档拼接后的完整形状序列，
    /// 解析正文中的 "Shape N" 回引按 1 起始下标指向该序列
    pub fn parse(&self, text: &str, shapes: &[Shape]) -> Result<AnswerMap> {
        // 每个 Answer 标签终结一个区块
        let label = Regex::new(r"\\textbf\{Answer\}\s*:\s*([^\n■\\]+)")?;

        let mut answers = AnswerMap::new();
        let mut section_start = 0;

        for cap in label.captures_iter(text) {
            let whole = match cap.get(0) {
                Some(m) => m,
                None => continue,
            };
            let section = &text[section_start..whole.start()];
            section_start = whole.end();

            let token = cap.get(1).map(|m| m.as_str().trim()).unwrap_or("");

            match self.parse_section(section, token, shapes)? {
                Some(answer) => {
                    debug!(
                        "✅ 解析答案 {}: {:?}, 解析说明 {} 字符, {} 个形状",
                        answer.number,
                        answer.answer,
                        answer.explanation.chars().count(),
                        answer.shapes.len()
                    );
                    answers.insert(answer.number, answer);
                }
                None => {
                    warn!("⚠️ 答案区块缺少可恢复的题号，已跳过");
                }
            }
        }

        if answers.is_empty() {
            warn!("⚠️ 答案文本中未找到任何匹配的答案区块");
        } else {
            info!("✅ 解析得到 {} 条答案", answers.len());
        }

        Ok(answers)
    }

    /// 解析单个答案区块；题号无法恢复时返回 None
    fn parse_section(
        &self,
        section: &str,
        token: &str,
        shapes: &[Shape],
    ) -> Result<Option<Answer>> {
        let (number, explanation_source) = match self.resolve_number(section)? {
            Some(found) => found,
            None => return Ok(None),
        };

        let explanation = self.build_explanation(explanation_source)?;
        let answer = self.validate_token(number, token);
        let shapes = self.resolve_shape_refs(number, &explanation, shapes)?;

        Ok(Some(Answer {
            number,
            answer,
            explanation,
            shapes,
        }))
    }

    /// 恢复区块题号：加粗标记与裸数字取先出现者，
    /// 位置相同时加粗标记优先；返回题号与其后的正文切片
    fn resolve_number<'a>(&self, section: &'a str) -> Result<Option<(u32, &'a str)>> {
        let bold = Regex::new(r"\\textbf\{(\d+)\s*\.?\s*\}")?;
        let plain = Regex::new(r"(\d+)[.\s]*")?;

        let bold_match = bold.captures(section);
        let plain_match = plain.captures(section);

        let chosen = match (&bold_match, &plain_match) {
            (Some(b), Some(p)) => {
                let b_start = b.get(0).map(|m| m.start()).unwrap_or(usize::MAX);
                let p_start = p.get(0).map(|m| m.start()).unwrap_or(usize::MAX);
                if b_start <= p_start {
                    bold_match.as_ref()
                } else {
                    plain_match.as_ref()
                }
            }
            (Some(_), None) => bold_match.as_ref(),
            (None, Some(_)) => plain_match.as_ref(),
            (None, None) => None,
        };

        let cap = match chosen {
            Some(cap) => cap,
            None => return Ok(None),
        };

        let number = match cap.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) {
            Some(n) => n,
            None => return Ok(None),
        };
        let rest_start = cap.get(0).map(|m| m.end()).unwrap_or(0);

        Ok(Some((number, &section[rest_start..])))
    }

    /// 拼接解析说明：正文 + 可选引用块，两者都非空时以换行连接
    fn build_explanation(&self, source: &str) -> Result<String> {
        let quote = Regex::new(r"(?s)\\begin\{quote\}(.*?)\\end\{quote\}")?;

        let explanation = match quote.captures(source) {
            Some(cap) => {
                let quote_start = cap.get(0).map(|m| m.start()).unwrap_or(source.len());
                let pre_quote = source[..quote_start].trim();
                let quote_text = cap.get(1).map(|m| m.as_str().trim()).unwrap_or("");

                if !pre_quote.is_empty() && !quote_text.is_empty() {
                    format!("{}\n{}", pre_quote, quote_text)
                } else if !quote_text.is_empty() {
                    quote_text.to_string()
                } else {
                    pre_quote.to_string()
                }
            }
            None => source.trim().to_string(),
        };

        Ok(explanation)
    }

    /// 校验答案取值；闭集之外归一化为 None
    fn validate_token(&self, number: u32, token: &str) -> Option<String> {
        if VALID_ANSWERS.contains(token) {
            Some(token.to_string())
        } else {
            warn!("⚠️ 题目 {} 的答案取值无法识别: '{}'", number, token);
            None
        }
    }

    /// 解析说明中的形状回引（"Shape N"，大小写不敏感，1 起始下标）
    fn resolve_shape_refs(
        &self,
        number: u32,
        explanation: &str,
        shapes: &[Shape],
    ) -> Result<Vec<Shape>> {
        let reference = Regex::new(r"(?i)shape\s*[\w.\-]*?(\d+)")?;

        let mut resolved = Vec::new();
        for cap in reference.captures_iter(explanation) {
            let index: usize = match cap.get(1).and_then(|m| m.as_str().parse().ok()) {
                Some(i) => i,
                None => continue,
            };

            if index >= 1 && index <= shapes.len() {
                resolved.push(shapes[index - 1].clone());
            } else {
                warn!(
                    "⚠️ 答案 {} 回引的形状 {} 超出范围 (共 {} 个)",
                    number,
                    index,
                    shapes.len()
                );
            }
        }

        Ok(resolved)
    }
}

impl Default for AnswerParser {
    fn default() -> Self {
        Self::new()
    }
}
