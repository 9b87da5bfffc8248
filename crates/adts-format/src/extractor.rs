//! 解封装器 (Extractor) trait 定义.
//!
//! 宿主媒体管线只通过这两个 trait 与解封装器交互.
//!
//! 使用流程:
//! 1. 调用 `sniff()` 探测格式, 得到起始偏移
//! 2. 在起始偏移处构造解封装器 (构造时完成帧索引)
//! 3. 调用 `count_tracks()` / `get_track_meta_data()` 获取轨道信息
//! 4. 调用 `get_track()` 得到轨道读取器, `start()` 后循环 `read()`

use adts_core::AdtsResult;

use crate::access_unit::AccessUnit;
use crate::metadata::{MetaSink, TrackMetadata};

/// 解封装器 trait
pub trait MediaExtractor {
    /// 轨道读取器类型
    type Track: MediaTrack;

    /// 解封装器名称
    fn name(&self) -> &'static str;

    /// 轨道数量 (初始化失败时为 0)
    fn count_tracks(&self) -> usize;

    /// 创建轨道读取器
    fn get_track(&self, index: usize) -> AdtsResult<Self::Track>;

    /// 写入指定轨道的元数据
    fn get_track_meta_data(&self, index: usize, sink: &mut dyn MetaSink) -> AdtsResult<()>;

    /// 写入容器级元数据
    fn get_meta_data(&self, sink: &mut dyn MetaSink) -> AdtsResult<()>;
}

/// 轨道读取器 trait
///
/// 状态机: Created --start--> Started --stop--> Stopped --start--> Started
pub trait MediaTrack {
    /// 开始读取, 游标回到第 0 帧
    fn start(&mut self) -> AdtsResult<()>;

    /// 停止读取
    fn stop(&mut self) -> AdtsResult<()>;

    /// 轨道元数据
    fn format(&self) -> &TrackMetadata;

    /// 读取下一个访问单元
    ///
    /// # 返回
    /// - `Ok(unit)`: 成功读取一帧
    /// - `Err(AdtsError::Eof)`: 已读完最后一帧
    fn read(&mut self, options: &ReadOptions) -> AdtsResult<AccessUnit>;
}

/// 读取选项
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// 读取前定位到的目标时间 (微秒)
    pub seek_to_us: Option<i64>,
}

impl ReadOptions {
    /// 先定位到 `time_us` 再读取
    pub fn seek(time_us: i64) -> Self {
        Self {
            seek_to_us: Some(time_us),
        }
    }
}
