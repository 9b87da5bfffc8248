//! 轨道读取器.
//!
//! 按帧索引顺序读取访问单元, 支持按时间定位. 每次读取都重新解析帧头,
//! 以得到确切的帧长度并校验索引仍然有效.

use std::sync::Arc;

use adts_core::{AdtsError, AdtsResult};
use bytes::BytesMut;
use log::debug;

use crate::access_unit::AccessUnit;
use crate::extractor::{MediaTrack, ReadOptions};
use crate::header::parse_header_at;
use crate::index::FrameIndex;
use crate::io::{ByteSource, read_full_at};
use crate::metadata::TrackMetadata;

/// 轨道读取器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    /// 已创建, 尚未开始
    Created,
    /// 读取中
    Started,
    /// 已停止
    Stopped,
}

/// ADTS 轨道读取器
///
/// 帧索引和元数据由解封装器共享, 读取器只拥有自己的游标.
pub struct TrackReader<'a> {
    source: &'a dyn ByteSource,
    index: Arc<FrameIndex>,
    meta: Arc<TrackMetadata>,
    state: TrackState,
    /// 下一次读取的帧序号
    cursor: usize,
}

impl<'a> TrackReader<'a> {
    pub(crate) fn new(
        source: &'a dyn ByteSource,
        index: Arc<FrameIndex>,
        meta: Arc<TrackMetadata>,
    ) -> Self {
        Self {
            source,
            index,
            meta,
            state: TrackState::Created,
            cursor: 0,
        }
    }

    /// 当前状态
    pub fn state(&self) -> TrackState {
        self.state
    }

    /// 下一次读取的帧序号
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// 帧数
    pub fn frame_count(&self) -> usize {
        self.index.len()
    }

    /// 读取第 `frame_index` 帧
    fn read_frame(&self, frame_index: usize) -> AdtsResult<AccessUnit> {
        let offset = self.index.offset(frame_index).ok_or(AdtsError::Eof)?;
        let header = parse_header_at(self.source, offset)?.ok_or_else(|| {
            AdtsError::InvalidData(format!("AAC: 第 {frame_index} 帧 (偏移 {offset}) 帧头已失效"))
        })?;

        let frame_end = offset + header.frame_length as u64;
        let expected_end = self
            .index
            .offset(frame_index + 1)
            .unwrap_or(self.index.end_offset());
        if frame_end != expected_end {
            return Err(AdtsError::InvalidData(format!(
                "AAC: 第 {frame_index} 帧结束于 {frame_end}, 索引记录为 {expected_end}"
            )));
        }

        let mut data = BytesMut::zeroed(header.frame_size());
        let n = read_full_at(self.source, offset, &mut data)?;
        if n < data.len() {
            return Err(AdtsError::InvalidData(format!(
                "AAC: 第 {frame_index} 帧数据不完整, 需要 {} 字节, 实际 {n} 字节",
                data.len()
            )));
        }

        Ok(AccessUnit {
            data: data.freeze(),
            pts_us: self.index.pts_us(frame_index),
            duration_us: self.index.frame_duration_us(),
            frame_index,
            offset,
            is_sync: true,
        })
    }
}

impl MediaTrack for TrackReader<'_> {
    fn start(&mut self) -> AdtsResult<()> {
        if self.state == TrackState::Started {
            return Err(AdtsError::InvalidState("轨道已经开始读取".into()));
        }
        self.state = TrackState::Started;
        self.cursor = 0;
        Ok(())
    }

    fn stop(&mut self) -> AdtsResult<()> {
        if self.state != TrackState::Started {
            return Err(AdtsError::InvalidState(format!(
                "轨道未处于读取状态: {:?}",
                self.state
            )));
        }
        self.state = TrackState::Stopped;
        Ok(())
    }

    fn format(&self) -> &TrackMetadata {
        &self.meta
    }

    fn read(&mut self, options: &ReadOptions) -> AdtsResult<AccessUnit> {
        if self.state != TrackState::Started {
            return Err(AdtsError::InvalidState("read 之前必须先调用 start".into()));
        }

        if let Some(time_us) = options.seek_to_us {
            self.cursor = self.index.frame_for_time(time_us);
            debug!("AAC: seek {time_us}us -> 第 {} 帧", self.cursor);
        }

        let unit = self.read_frame(self.cursor)?;
        self.cursor += 1;
        Ok(unit)
    }
}
