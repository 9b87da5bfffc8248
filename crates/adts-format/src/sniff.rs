//! 格式探测.
//!
//! ADTS 裸流必须以一个有效帧开头 (可选的前导 ID3v2 标签除外).
//! 同步点出现在更靠后的位置时不接受, 交给能识别外层容器的探测器处理,
//! 以免与内嵌相似字节模式的其他格式冲突.

use adts_core::AdtsResult;
use log::debug;

use crate::config::ExtractorConfig;
use crate::io::{ByteSource, read_full_at};
use crate::metadata::MIMETYPE_AUDIO_AAC;
use crate::scanner::find_next_frame;

/// 探测成功时报告的置信度
pub const SNIFF_CONFIDENCE: f32 = 0.8;

/// ID3v2 标签头大小
const ID3V2_HEADER_SIZE: u64 = 10;

/// 探测结果
#[derive(Debug, Clone, PartialEq)]
pub struct SniffResult {
    /// 轨道 MIME 类型
    pub mime: &'static str,
    /// 置信度 (0.0 ~ 1.0)
    pub confidence: f32,
    /// 第一帧的偏移, 用于构造解封装器
    pub start_offset: u64,
}

/// 格式探测器 trait
pub trait FormatSniffer {
    /// 探测器名称
    fn name(&self) -> &'static str;

    /// 探测数据源
    ///
    /// # 返回
    /// - `Ok(Some(result))`: 识别为此格式
    /// - `Ok(None)`: 不是此格式
    /// - `Err(e)`: 数据源 I/O 错误
    fn sniff(&self, source: &dyn ByteSource) -> AdtsResult<Option<SniffResult>>;
}

/// AAC ADTS 格式探测器
#[derive(Debug, Clone, Default)]
pub struct AacSniffer {
    config: ExtractorConfig,
}

impl AacSniffer {
    /// 使用指定配置创建探测器
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }
}

impl FormatSniffer for AacSniffer {
    fn name(&self) -> &'static str {
        "aac"
    }

    fn sniff(&self, source: &dyn ByteSource) -> AdtsResult<Option<SniffResult>> {
        sniff_with_config(source, &self.config)
    }
}

/// 使用默认配置探测
pub fn sniff(source: &dyn ByteSource) -> AdtsResult<Option<SniffResult>> {
    sniff_with_config(source, &ExtractorConfig::default())
}

/// 使用指定配置探测
pub fn sniff_with_config(
    source: &dyn ByteSource,
    config: &ExtractorConfig,
) -> AdtsResult<Option<SniffResult>> {
    let start = skip_id3v2(source)?;
    let limit = start.saturating_add(config.sniff_prefix_size.max(1));

    match find_next_frame(source, start, limit)? {
        Some(pos) if pos == start => {
            debug!("AAC: 探测成功, 起始偏移 {start}");
            Ok(Some(SniffResult {
                mime: MIMETYPE_AUDIO_AAC,
                confidence: SNIFF_CONFIDENCE,
                start_offset: start,
            }))
        }
        Some(pos) => {
            debug!("AAC: 同步点位于 {pos}, 不在起始偏移 {start}, 不接受");
            Ok(None)
        }
        None => Ok(None),
    }
}

/// 跳过开头的 ID3v2 标签 (可能有多个), 返回其后的偏移
pub fn skip_id3v2(source: &dyn ByteSource) -> AdtsResult<u64> {
    let mut pos = 0u64;
    loop {
        let mut header = [0u8; ID3V2_HEADER_SIZE as usize];
        if read_full_at(source, pos, &mut header)? < header.len() {
            return Ok(pos);
        }
        let Some(tag_size) = id3v2_tag_size(&header) else {
            return Ok(pos);
        };
        debug!("AAC: 跳过 ID3v2 标签, 偏移 {pos}, 大小 {tag_size}");
        pos += tag_size;
    }
}

/// 解析 ID3v2 标签头, 返回整个标签的大小 (含标签头与可选的标签尾)
fn id3v2_tag_size(header: &[u8; ID3V2_HEADER_SIZE as usize]) -> Option<u64> {
    if &header[..3] != b"ID3" || header[3] == 0xFF || header[4] == 0xFF {
        return None;
    }
    // Syncsafe integer: 每字节最高位必须为 0
    if header[6..10].iter().any(|b| b & 0x80 != 0) {
        return None;
    }
    let size = (u64::from(header[6]) << 21)
        | (u64::from(header[7]) << 14)
        | (u64::from(header[8]) << 7)
        | u64::from(header[9]);
    let has_footer = header[5] & 0x10 != 0;
    Some(ID3V2_HEADER_SIZE + size + if has_footer { ID3V2_HEADER_SIZE } else { 0 })
}
