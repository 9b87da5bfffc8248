//! AAC ADTS 解封装器.
//!
//! 构造时一次性建立帧索引, 之后只读. 轨道读取器共享同一份索引,
//! 各自维护读取游标.

use std::sync::Arc;

use adts_core::{AdtsError, AdtsResult};
use log::{debug, warn};

use crate::config::ExtractorConfig;
use crate::extractor::MediaExtractor;
use crate::index::FrameIndex;
use crate::io::ByteSource;
use crate::metadata::{MIMETYPE_CONTAINER_ADTS, MetaSink, TrackMetadata, keys};
use crate::track::TrackReader;

/// 初始化结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitCheck {
    /// 初始化成功
    Ok,
    /// 起始偏移处没有可确认的 ADTS 帧
    NoValidFrames,
    /// 声道配置为保留值, 无法确定声道数
    UnsupportedChannelConfig(u8),
}

/// 轨道数据: 索引与元数据总是同时存在
#[derive(Debug)]
struct TrackData {
    index: Arc<FrameIndex>,
    meta: Arc<TrackMetadata>,
}

/// AAC ADTS 解封装器
///
/// 借用数据源, 数据源必须比解封装器及其所有轨道读取器活得更久.
pub struct AacExtractor<'a> {
    /// 数据源
    source: &'a dyn ByteSource,
    /// 第一帧的偏移 (跳过 ID3v2 标签之后)
    start_offset: u64,
    /// 初始化结果
    init_check: InitCheck,
    /// 初始化成功时的轨道数据
    track: Option<TrackData>,
}

impl<'a> AacExtractor<'a> {
    /// 在 `start_offset` 处创建解封装器并建立帧索引
    ///
    /// 找不到有效帧不是错误, 通过 [`AacExtractor::init_check`] 反映;
    /// 只有数据源的 I/O 错误才返回 `Err`.
    pub fn new(source: &'a dyn ByteSource, start_offset: u64) -> AdtsResult<Self> {
        Self::with_config(source, start_offset, &ExtractorConfig::default())
    }

    /// 使用指定配置创建解封装器
    pub fn with_config(
        source: &'a dyn ByteSource,
        start_offset: u64,
        config: &ExtractorConfig,
    ) -> AdtsResult<Self> {
        let mut extractor = Self {
            source,
            start_offset,
            init_check: InitCheck::NoValidFrames,
            track: None,
        };

        let Some(index) = FrameIndex::build(source, start_offset)? else {
            warn!("AAC: 偏移 {start_offset} 处未找到有效的 ADTS 帧");
            return Ok(extractor);
        };
        if index.is_empty() {
            return Ok(extractor);
        }

        let Some(meta) = TrackMetadata::from_index(&index, config.max_input_size_margin) else {
            let cc = index.first_header().channel_configuration;
            warn!("AAC: 不支持的声道配置 {cc}");
            extractor.init_check = InitCheck::UnsupportedChannelConfig(cc);
            return Ok(extractor);
        };

        debug!(
            "AAC: profile={} sr={} ch={} frames={} duration={}us",
            index.first_header().profile_name(),
            meta.sample_rate,
            meta.channel_count,
            index.len(),
            meta.duration_us,
        );

        extractor.init_check = InitCheck::Ok;
        extractor.track = Some(TrackData {
            index: Arc::new(index),
            meta: Arc::new(meta),
        });
        Ok(extractor)
    }

    /// 初始化结果
    pub fn init_check(&self) -> InitCheck {
        self.init_check
    }

    /// 第一帧的偏移
    pub fn start_offset(&self) -> u64 {
        self.start_offset
    }

    /// 帧索引 (初始化失败时为 `None`)
    pub fn frame_index(&self) -> Option<&FrameIndex> {
        self.track.as_ref().map(|t| t.index.as_ref())
    }

    /// 指定轨道的元数据
    pub fn track_metadata(&self, index: usize) -> AdtsResult<&TrackMetadata> {
        self.track_data(index).map(|t| t.meta.as_ref())
    }

    fn track_data(&self, index: usize) -> AdtsResult<&TrackData> {
        if index != 0 {
            return Err(AdtsError::OutOfRange(index));
        }
        self.track.as_ref().ok_or(AdtsError::NotInitialized)
    }
}

impl<'a> MediaExtractor for AacExtractor<'a> {
    type Track = TrackReader<'a>;

    fn name(&self) -> &'static str {
        "AACExtractor"
    }

    fn count_tracks(&self) -> usize {
        usize::from(self.init_check == InitCheck::Ok)
    }

    fn get_track(&self, index: usize) -> AdtsResult<TrackReader<'a>> {
        let track = self.track_data(index)?;
        Ok(TrackReader::new(
            self.source,
            Arc::clone(&track.index),
            Arc::clone(&track.meta),
        ))
    }

    fn get_track_meta_data(&self, index: usize, sink: &mut dyn MetaSink) -> AdtsResult<()> {
        self.track_data(index)?.meta.write_to(sink);
        Ok(())
    }

    fn get_meta_data(&self, sink: &mut dyn MetaSink) -> AdtsResult<()> {
        if self.init_check != InitCheck::Ok {
            return Err(AdtsError::NotInitialized);
        }
        sink.set_string(keys::MIME, MIMETYPE_CONTAINER_ADTS);
        Ok(())
    }
}
