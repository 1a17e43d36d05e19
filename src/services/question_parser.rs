//! 题目解析服务 - 业务能力层
//!
//! 把题目文档渲染出的标记文本切分成一道道题目：
//! 按加粗题号标记分段，每段中最后一张表格视为选项表，
//! 其余表格原样保留在题干里

use crate::models::Question;
use crate::services::choice_table::ChoiceTableParser;
use anyhow::Result;
use regex::Regex;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// 题目解析器
pub struct QuestionParser {
    choice_parser: ChoiceTableParser,
}

impl QuestionParser {
    pub fn new() -> Self {
        Self {
            choice_parser: ChoiceTableParser::new(),
        }
    }

    /// 解析整篇题目标记文本
    ///
    /// 切分规则：加粗的"整数+句点"标记开启一段题目，
    /// 第一个标记之前的文本没有可恢复的题号，直接丢弃；
    /// 题号重复时保留首次出现的那道题
    pub fn parse(&self, text: &str) -> Result<Vec<Question>> {
        // 题号标记：\textbf{N.}（兼容 N) 写法）
        let marker = Regex::new(r"\\textbf\{(\d+)\s*[.)]?\s*\}")?;

        let markers: Vec<(usize, usize, u32)> = marker
            .captures_iter(text)
            .filter_map(|cap| {
                let whole = cap.get(0)?;
                let number = cap.get(1)?.as_str().parse::<u32>().ok()?;
                Some((whole.start(), whole.end(), number))
            })
            .collect();

        if markers.is_empty() {
            warn!("⚠️ 文本中未找到任何题号标记");
            return Ok(Vec::new());
        }

        // 第一个标记之前的内容无题号可用
        let leading = text[..markers[0].0].trim();
        if !leading.is_empty() {
            debug!("丢弃无题号的前导片段（{} 字符）", leading.chars().count());
        }

        let mut questions = Vec::new();
        let mut seen_numbers: HashSet<u32> = HashSet::new();

        for (i, &(_, body_start, number)) in markers.iter().enumerate() {
            let body_end = markers
                .get(i + 1)
                .map(|&(next_start, _, _)| next_start)
                .unwrap_or(text.len());
            let body = &text[body_start..body_end];

            if !seen_numbers.insert(number) {
                warn!("⚠️ 题号 {} 重复出现，丢弃后出现的一道", number);
                continue;
            }

            questions.push(self.parse_body(number, body)?);
        }

        info!("✅ 解析得到 {} 道题目", questions.len());
        Ok(questions)
    }

    /// 解析单个题目段落：定位全部表格，最后一张作为选项表摘除，
    /// 其余表格原样保留在题干中
    fn parse_body(&self, number: u32, body: &str) -> Result<Question> {
        // 表格环境整体用懒惰匹配，内容可跨多行富文本
        let table = Regex::new(
            r"(?s)\\begin\{longtable\}(?:\[[^\]]*\])?(?:\{[^}]*\})?(.*?)\\end\{longtable\}",
        )?;

        let tables: Vec<(usize, usize, &str)> = table
            .captures_iter(body)
            .filter_map(|cap| {
                let whole = cap.get(0)?;
                let inner = cap.get(1)?.as_str();
                Some((whole.start(), whole.end(), inner))
            })
            .collect();

        let (question_text, choices) = match tables.last() {
            Some(&(start, end, inner)) => {
                // 只摘除最后一张表，前面的表格属于题干的插图内容
                let mut remainder = String::with_capacity(body.len());
                remainder.push_str(&body[..start]);
                remainder.push_str(&body[end..]);

                (normalize_whitespace(&remainder), self.choice_parser.parse(inner)?)
            }
            None => {
                warn!("⚠️ 题目 {} 中没有找到选项表格", number);
                (normalize_whitespace(body), Vec::new())
            }
        };

        debug!("题目 {}: {} 个选项", number, choices.len());
        Ok(Question::new(number, question_text, choices))
    }
}

impl Default for QuestionParser {
    fn default() -> Self {
        Self::new()
    }
}

/// 逐行修剪后以单个空格拼接
fn normalize_whitespace(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}
