//! 访问单元 (Access Unit).
//!
//! 对应一个完整的 ADTS 帧 (帧头 + 原始数据块), 是交给下游解码器的最小单位.

use bytes::Bytes;

use crate::header::AdtsHeader;

/// 访问单元
#[derive(Debug, Clone)]
pub struct AccessUnit {
    /// 完整 ADTS 帧数据 (含帧头)
    pub data: Bytes,
    /// 显示时间戳 (微秒)
    pub pts_us: i64,
    /// 时长 (微秒)
    pub duration_us: i64,
    /// 帧序号
    pub frame_index: usize,
    /// 在数据源中的字节偏移
    pub offset: u64,
    /// 是否可独立解码 (ADTS 帧总是可以)
    pub is_sync: bool,
}

impl AccessUnit {
    /// 数据大小 (字节)
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 解析自身的帧头
    pub fn header(&self) -> Option<AdtsHeader> {
        AdtsHeader::parse(&self.data)
    }

    /// 去掉 ADTS 帧头后的原始 AAC 数据
    ///
    /// 帧头无法解析时返回完整数据.
    pub fn payload(&self) -> Bytes {
        match self.header() {
            Some(h) if h.header_size() <= self.data.len() => self.data.slice(h.header_size()..),
            _ => self.data.clone(),
        }
    }
}
