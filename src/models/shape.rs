use serde::{Deserialize, Serialize};

/// 形状坐标信息（EMU 单位）
///
/// DOCX 的绘图标记只在 `<wp:extent>` 中可靠地暴露尺寸，
/// 绝对位置无法稳定获取，因此 x/y 始终为 None
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: Option<u64>,
    pub y: Option<u64>,
    pub width: Option<u64>,
    pub height: Option<u64>,
}

/// 从文档中提取出的图形形状
///
/// 由 ShapeExtractor 创建，创建后不再修改；
/// ShapeLinker 只读消费，并把形状归属到唯一的题目或答案
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Shape {
    /// 形状类型（取自最具体的 shape-properties 子元素，否则为外层标签名）
    #[serde(rename = "type")]
    pub shape_type: String,
    /// 形状内部的文本（按文档顺序）
    #[serde(default)]
    pub labels: Vec<String>,
    /// 最近一个包裹段落内的全部文本
    #[serde(default)]
    pub context: Vec<String>,
    pub coordinates: Coordinates,
}

impl Shape {
    /// 拼接 labels + context 并转小写，供启发式匹配使用
    pub fn combined_text(&self) -> String {
        self.labels
            .iter()
            .chain(self.context.iter())
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 截断文本以便日志显示
        let text = self.combined_text();
        let preview = if text.chars().count() > 30 {
            text.chars().take(30).collect::<String>() + "..."
        } else {
            text
        };
        write!(f, "{} [{}]", self.shape_type, preview)
    }
}
