//! 元数据记录.
//!
//! 解封装器把格式参数写入调用方提供的 [`MetaSink`], 键名与宿主媒体管线约定一致.
//! [`MetaData`] 是基于有序映射的默认实现.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::index::FrameIndex;

/// 轨道 MIME 类型 (封装在 MPEG-4 中的 AAC)
pub const MIMETYPE_AUDIO_AAC: &str = "audio/mp4a-latm";

/// 容器 MIME 类型 (ADTS 裸流)
pub const MIMETYPE_CONTAINER_ADTS: &str = "audio/aac-adts";

/// 报告的位深 (解码输出为 16 位 PCM)
pub const BITS_PER_SAMPLE: i32 = 16;

/// 元数据键名
pub mod keys {
    /// MIME 类型
    pub const MIME: &str = "mime";
    /// 采样率
    pub const SAMPLE_RATE: &str = "sample-rate";
    /// 声道数
    pub const CHANNEL_COUNT: &str = "channel-count";
    /// 时长 (微秒)
    pub const DURATION_US: &str = "durationUs";
    /// 解码器输入缓冲区大小提示
    pub const MAX_INPUT_SIZE: &str = "max-input-size";
    /// 位深
    pub const BITS_PER_SAMPLE: &str = "bits-per-sample";
    /// AAC 音频对象类型
    pub const AAC_PROFILE: &str = "aac-profile";
    /// 编解码器私有数据 (AudioSpecificConfig)
    pub const CSD_0: &str = "csd-0";
}

/// 元数据写入接口
pub trait MetaSink {
    /// 写入字符串
    fn set_string(&mut self, key: &str, value: &str);
    /// 写入 32 位整数
    fn set_i32(&mut self, key: &str, value: i32);
    /// 写入 64 位整数
    fn set_i64(&mut self, key: &str, value: i64);
    /// 写入字节数据
    fn set_bytes(&mut self, key: &str, value: &[u8]);
}

/// 元数据值
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetaValue {
    /// 字符串
    Str(String),
    /// 32 位整数
    Int32(i32),
    /// 64 位整数
    Int64(i64),
    /// 字节数据
    Bytes(Vec<u8>),
}

/// 基于有序映射的元数据记录
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MetaData {
    entries: BTreeMap<String, MetaValue>,
}

impl MetaData {
    /// 创建空记录
    pub fn new() -> Self {
        Self::default()
    }

    /// 按键查找
    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.entries.get(key)
    }

    /// 按键查找字符串
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.entries.get(key)? {
            MetaValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// 按键查找 32 位整数
    pub fn get_i32(&self, key: &str) -> Option<i32> {
        match self.entries.get(key)? {
            MetaValue::Int32(v) => Some(*v),
            _ => None,
        }
    }

    /// 按键查找 64 位整数
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.entries.get(key)? {
            MetaValue::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// 按键查找字节数据
    pub fn get_bytes(&self, key: &str) -> Option<&[u8]> {
        match self.entries.get(key)? {
            MetaValue::Bytes(v) => Some(v),
            _ => None,
        }
    }

    /// 条目数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 遍历全部条目 (按键排序)
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetaValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl MetaSink for MetaData {
    fn set_string(&mut self, key: &str, value: &str) {
        self.entries
            .insert(key.to_string(), MetaValue::Str(value.to_string()));
    }

    fn set_i32(&mut self, key: &str, value: i32) {
        self.entries.insert(key.to_string(), MetaValue::Int32(value));
    }

    fn set_i64(&mut self, key: &str, value: i64) {
        self.entries.insert(key.to_string(), MetaValue::Int64(value));
    }

    fn set_bytes(&mut self, key: &str, value: &[u8]) {
        self.entries
            .insert(key.to_string(), MetaValue::Bytes(value.to_vec()));
    }
}

/// 轨道元数据
///
/// 由第一帧帧头和帧索引推导, 整条流不变.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackMetadata {
    /// MIME 类型
    pub mime: &'static str,
    /// 采样率 (Hz)
    pub sample_rate: u32,
    /// 声道数
    pub channel_count: u32,
    /// 位深
    pub bits_per_sample: i32,
    /// 总时长 (微秒)
    pub duration_us: i64,
    /// 解码器输入缓冲区大小提示 (最大帧长度 + 余量)
    pub max_input_size: usize,
    /// AAC 音频对象类型 (profile + 1)
    pub aac_profile: u8,
    /// AudioSpecificConfig
    pub csd: [u8; 2],
}

impl TrackMetadata {
    /// 从帧索引推导轨道元数据
    ///
    /// 声道配置为保留值 (0 或 7) 时返回 `None`.
    pub fn from_index(index: &FrameIndex, max_input_size_margin: usize) -> Option<Self> {
        let header = index.first_header();
        Some(Self {
            mime: MIMETYPE_AUDIO_AAC,
            sample_rate: header.sample_rate(),
            channel_count: header.channel_count()?,
            bits_per_sample: BITS_PER_SAMPLE,
            duration_us: index.duration_us(),
            max_input_size: index.max_frame_size() + max_input_size_margin,
            aac_profile: header.audio_object_type(),
            csd: header.audio_specific_config(),
        })
    }

    /// 写入元数据记录
    pub fn write_to(&self, sink: &mut dyn MetaSink) {
        sink.set_string(keys::MIME, self.mime);
        sink.set_i32(keys::SAMPLE_RATE, self.sample_rate as i32);
        sink.set_i32(keys::CHANNEL_COUNT, self.channel_count as i32);
        sink.set_i32(keys::BITS_PER_SAMPLE, self.bits_per_sample);
        sink.set_i64(keys::DURATION_US, self.duration_us);
        sink.set_i32(
            keys::MAX_INPUT_SIZE,
            i32::try_from(self.max_input_size).unwrap_or(i32::MAX),
        );
        sink.set_i32(keys::AAC_PROFILE, i32::from(self.aac_profile));
        sink.set_bytes(keys::CSD_0, &self.csd);
    }
}
