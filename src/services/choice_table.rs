//! 选项表格解析服务 - 业务能力层
//!
//! 只负责"把一张表格的原始内容解析成选项列表"这一件事，
//! 不关心表格来自哪道题

use crate::models::Choice;
use anyhow::Result;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

/// 选项表格解析器
///
/// 职责：
/// - 清理表格标记产生的格式符号
/// - 按单列 / 多列两种布局提取 (字母, 内容) 对
/// - 按首次出现去重，按字母升序输出
#[derive(Debug, Default)]
pub struct ChoiceTableParser;

/// 去掉单元格内容两端的空白和残留的行分隔符
fn clean_cell(text: &str) -> String {
    text.trim().trim_end_matches('\\').trim_end().to_string()
}

impl ChoiceTableParser {
    pub fn new() -> Self {
        Self
    }

    /// 解析一张选项表格的原始内容
    ///
    /// 布局由原始内容中是否出现列分隔符 `&` 推断：
    /// 无 `&` 为单列布局，有 `&` 为多列布局
    pub fn parse(&self, table_raw: &str) -> Result<Vec<Choice>> {
        // 布局判断基于清理前的原始内容
        let single_column = !table_raw.contains('&');

        let cleaned = self.strip_table_markup(table_raw)?;

        let collected = if single_column {
            self.parse_single_column(&cleaned)?
        } else {
            self.parse_multi_column(&cleaned)?
        };

        // 按首次出现去重，同时按字母升序排列
        let mut seen: BTreeMap<char, String> = BTreeMap::new();
        for (option, choice) in collected {
            seen.entry(option).or_insert(choice);
        }

        let choices: Vec<Choice> = seen
            .into_iter()
            .map(|(option, choice)| Choice { option, choice })
            .collect();

        debug!("表格解析得到 {} 个选项", choices.len());
        Ok(choices)
    }

    /// 去掉表格标记特有的格式符号
    ///
    /// 行分隔符（`\\`、`\tabularnewline`）统一转成换行，
    /// 标尺命令直接删除，注释行在行遍历时丢弃
    fn strip_table_markup(&self, raw: &str) -> Result<String> {
        let rules = Regex::new(r"\\(toprule|midrule|bottomrule|endhead|endfoot|hline)")?;

        let text = raw
            .replace("\\tabularnewline", "\n")
            .replace("\\\\", "\n");

        Ok(rules.replace_all(&text, "").into_owned())
    }

    /// 单列布局：以"大写字母+句点"开头的行开启一个选项，
    /// 无标记的行作为上一个选项的续行（以空格拼接）
    fn parse_single_column(&self, cleaned: &str) -> Result<Vec<(char, String)>> {
        let marker = Regex::new(r"^([A-Z])\.\s*(.*)$")?;
        let mut collected: Vec<(char, String)> = Vec::new();

        for line in cleaned.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('%') {
                continue;
            }

            if let Some(cap) = marker.captures(line) {
                if let Some(option) = cap[1].chars().next() {
                    collected.push((option, clean_cell(&cap[2])));
                }
            } else if let Some(last) = collected.last_mut() {
                // 续行
                if !last.1.is_empty() {
                    last.1.push(' ');
                }
                last.1.push_str(&clean_cell(line));
            }
        }

        Ok(collected)
    }

    /// 多列布局：去掉列分隔符后拍平成一行，
    /// 再按字母标记的位置切片（每段内容延伸到下一个标记或结尾）
    fn parse_multi_column(&self, cleaned: &str) -> Result<Vec<(char, String)>> {
        let flat = cleaned
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('%'))
            .collect::<Vec<_>>()
            .join(" ")
            .replace('&', " ");

        let marker = Regex::new(r"([A-Z])\.\s*")?;
        let markers: Vec<(usize, usize, char)> = marker
            .captures_iter(&flat)
            .filter_map(|cap| {
                let whole = cap.get(0)?;
                let option = cap.get(1)?.as_str().chars().next()?;
                Some((whole.start(), whole.end(), option))
            })
            .collect();

        let mut collected = Vec::new();
        for (i, &(_, content_start, option)) in markers.iter().enumerate() {
            let content_end = markers
                .get(i + 1)
                .map(|&(next_start, _, _)| next_start)
                .unwrap_or(flat.len());
            let choice = clean_cell(&flat[content_start..content_end]);
            collected.push((option, choice));
        }

        Ok(collected)
    }
}
