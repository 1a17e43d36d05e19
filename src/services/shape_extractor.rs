//! 形状提取服务 - 业务能力层
//!
//! 遍历 DOCX 包内部含绘图/VML 标记的部件，找出可绘制的
//! 形状元素并产出扁平有序的形状序列。序列顺序（部件顺序 +
//! 元素发现顺序）是有语义的：答案解析里的 "Shape N" 回引
//! 就是对这个序列的 1 起始下标

use crate::models::{Coordinates, Shape};
use anyhow::{Context, Result};
use roxmltree::Node;
use std::io::{Cursor, Read};
use tracing::{debug, info, warn};
use zip::ZipArchive;

// OOXML / VML 固定命名空间集
const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_WP: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
const NS_V: &str = "urn:schemas-microsoft-com:vml";
const NS_WPS: &str = "http://schemas.microsoft.com/office/word/2010/wordprocessingShape";

/// 形状提取器
pub struct ShapeExtractor;

impl ShapeExtractor {
    pub fn new() -> Self {
        Self
    }

    /// 从一份 DOCX 的原始字节中提取全部形状
    ///
    /// 单个部件解析失败只记日志并跳过；
    /// 整个包无法打开才作为错误向上传播
    pub fn extract(&self, bytes: &[u8], source: &str) -> Result<Vec<Shape>> {
        let cursor = Cursor::new(bytes);
        let mut archive = ZipArchive::new(cursor)
            .with_context(|| format!("无法打开文档包: {}", source))?;

        let mut shapes = Vec::new();

        for index in 0..archive.len() {
            let mut part = match archive.by_index(index) {
                Ok(part) => part,
                Err(e) => {
                    warn!("⚠️ 读取部件 {} 失败 ({}): {}", index, source, e);
                    continue;
                }
            };

            let part_name = part.name().to_string();
            if !part_name.contains("drawing") && !part_name.contains("vml") {
                continue;
            }

            let mut xml = String::new();
            if let Err(e) = part.read_to_string(&mut xml) {
                warn!("⚠️ 读取部件内容失败 {} ({}): {}", part_name, source, e);
                continue;
            }

            match roxmltree::Document::parse(&xml) {
                Ok(doc) => {
                    let before = shapes.len();
                    self.collect_shapes(&doc, &mut shapes);
                    debug!("部件 {}: {} 个形状", part_name, shapes.len() - before);
                }
                Err(e) => {
                    warn!("⚠️ 解析部件失败 {} ({}): {}", part_name, source, e);
                }
            }
        }

        info!("✅ 从 {} 提取到 {} 个形状", source, shapes.len());
        Ok(shapes)
    }

    /// 按文档顺序收集一个部件里的形状元素
    fn collect_shapes(&self, doc: &roxmltree::Document<'_>, shapes: &mut Vec<Shape>) {
        for node in doc
            .descendants()
            .filter(|n| n.is_element() && is_shape_element(n))
        {
            shapes.push(self.build_shape(node));
        }
    }

    /// 从一个形状元素构造 Shape 记录
    fn build_shape(&self, node: Node<'_, '_>) -> Shape {
        // 类型默认取外层标签名（去掉命名空间）
        let mut shape_type = node.tag_name().name().to_string();

        // 有更具体的 shape-properties 子元素时用它的标签名
        if let Some(props) = node
            .descendants()
            .filter(|d| d.id() != node.id())
            .find(|d| is_shape_properties(d))
        {
            shape_type = props.tag_name().name().to_string();
        }

        // 尺寸来自 <wp:extent>，绝对位置拿不到
        let mut coordinates = Coordinates::default();
        if let Some(extent) = node
            .descendants()
            .find(|d| d.tag_name().namespace() == Some(NS_WP) && d.tag_name().name() == "extent")
        {
            coordinates.width = extent.attribute("cx").and_then(|v| v.parse().ok());
            coordinates.height = extent.attribute("cy").and_then(|v| v.parse().ok());
        }

        // 形状内部文本
        let labels = collect_text_runs(node);

        // 上下文：最近一个包裹段落里的全部文本
        let context = node
            .ancestors()
            .skip(1)
            .find(|a| a.tag_name().namespace() == Some(NS_W) && a.tag_name().name() == "p")
            .map(collect_text_runs)
            .unwrap_or_default();

        Shape {
            shape_type,
            labels,
            context,
            coordinates,
        }
    }
}

impl Default for ShapeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// 锚定/内联绘图、VML 形状、画布形状
fn is_shape_element(node: &Node<'_, '_>) -> bool {
    let name = node.tag_name().name();
    match node.tag_name().namespace() {
        Some(NS_WP) => name == "anchor" || name == "inline",
        Some(NS_V) => name == "shape",
        Some(NS_WPS) => name == "sp",
        _ => false,
    }
}

/// 最具体的 shape-properties 子元素
fn is_shape_properties(node: &Node<'_, '_>) -> bool {
    let name = node.tag_name().name();
    match node.tag_name().namespace() {
        Some(NS_A) | Some(NS_WPS) => name == "spPr",
        Some(NS_V) => name == "shape",
        _ => false,
    }
}

/// 收集一个元素下所有 <w:t> 的文本（文档顺序）
fn collect_text_runs(node: Node<'_, '_>) -> Vec<String> {
    node.descendants()
        .filter(|d| d.tag_name().namespace() == Some(NS_W) && d.tag_name().name() == "t")
        .filter_map(|t| t.text())
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
        .collect()
}
