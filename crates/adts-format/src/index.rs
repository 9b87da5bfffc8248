//! 帧索引构建.
//!
//! 构造解封装器时从起始偏移顺序遍历整个码流, 记录每一帧的字节偏移.
//! 只保存偏移量, 帧长度在读取时重新解析帧头得到.

use adts_core::AdtsResult;
use adts_core::time::samples_to_us;
use log::{debug, warn};

use crate::header::{AdtsHeader, SAMPLES_PER_FRAME, parse_header_at};
use crate::io::{ByteSource, read_full_at};
use crate::scanner::find_next_frame;

/// 帧索引
///
/// 构建完成后只读, 由解封装器通过 `Arc` 共享给所有轨道读取器.
#[derive(Debug)]
pub struct FrameIndex {
    /// 各帧起始偏移 (严格递增)
    offsets: Vec<u64>,
    /// 第一帧帧头, 决定整条流的配置
    first_header: AdtsHeader,
    /// 每帧时长 (微秒)
    frame_duration_us: i64,
    /// 观察到的最大帧长度
    max_frame_size: usize,
    /// 最后一帧之后的偏移
    end_offset: u64,
}

impl FrameIndex {
    /// 从 `start_offset` 开始构建帧索引
    ///
    /// 起始位置必须是经过确认的帧, 否则返回 `Ok(None)`.
    /// 遇到无效帧头、流配置变化或被截断的帧时停止, 已索引的帧保留.
    pub fn build(source: &dyn ByteSource, start_offset: u64) -> AdtsResult<Option<Self>> {
        if find_next_frame(source, start_offset, start_offset + 1)?.is_none() {
            debug!("ADTS: 偏移 {start_offset} 处没有可确认的帧");
            return Ok(None);
        }
        let Some(first_header) = parse_header_at(source, start_offset)? else {
            return Ok(None);
        };

        let size = source.size();
        let mut offsets = Vec::new();
        let mut max_frame_size = 0;
        let mut offset = start_offset;

        loop {
            if size.is_some_and(|s| offset >= s) {
                break;
            }
            let Some(header) = parse_header_at(source, offset)? else {
                debug!("ADTS: 偏移 {offset} 处不是有效帧头, 丢弃其后数据");
                break;
            };
            if !header.same_config(&first_header) {
                warn!(
                    "ADTS: 偏移 {offset} 处流配置变化 ({}), 停止索引",
                    describe_config_change(&first_header, &header)
                );
                break;
            }
            let frame_end = offset + header.frame_length as u64;
            if !frame_available(source, size, frame_end)? {
                debug!("ADTS: 偏移 {offset} 处的帧被截断, 停止索引");
                break;
            }

            offsets.push(offset);
            max_frame_size = max_frame_size.max(header.frame_size());
            offset = frame_end;
        }

        let frame_duration_us =
            samples_to_us(u64::from(SAMPLES_PER_FRAME), first_header.sample_rate());
        debug!(
            "ADTS: 索引完成, {} 帧, 每帧 {frame_duration_us}us, 最大帧 {max_frame_size} 字节",
            offsets.len(),
        );

        Ok(Some(Self {
            offsets,
            first_header,
            frame_duration_us,
            max_frame_size,
            end_offset: offset,
        }))
    }

    /// 帧数
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// 是否没有任何帧
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// 第 `index` 帧的起始偏移
    pub fn offset(&self, index: usize) -> Option<u64> {
        self.offsets.get(index).copied()
    }

    /// 全部帧偏移
    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    /// 第一帧帧头
    pub fn first_header(&self) -> &AdtsHeader {
        &self.first_header
    }

    /// 每帧时长 (微秒)
    pub fn frame_duration_us(&self) -> i64 {
        self.frame_duration_us
    }

    /// 总时长 (微秒) = 帧数 × 每帧时长
    pub fn duration_us(&self) -> i64 {
        self.offsets.len() as i64 * self.frame_duration_us
    }

    /// 最大帧长度 (字节)
    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    /// 最后一个完整帧之后的偏移
    pub fn end_offset(&self) -> u64 {
        self.end_offset
    }

    /// 第 `index` 帧的显示时间戳 (微秒)
    pub fn pts_us(&self, index: usize) -> i64 {
        index as i64 * self.frame_duration_us
    }

    /// 查找显示时间戳不大于 `time_us` 的最后一帧
    ///
    /// 负值定位到第 0 帧, 超过最后一帧的时间定位到最后一帧.
    pub fn frame_for_time(&self, time_us: i64) -> usize {
        if time_us <= 0 || self.frame_duration_us <= 0 {
            return 0;
        }
        let index = usize::try_from(time_us / self.frame_duration_us).unwrap_or(usize::MAX);
        index.min(self.offsets.len().saturating_sub(1))
    }
}

/// 描述两个帧头之间的配置差异, 只列出变化的字段
fn describe_config_change(from: &AdtsHeader, to: &AdtsHeader) -> String {
    let mut changes = Vec::new();
    if from.profile != to.profile {
        changes.push(format!("profile {} -> {}", from.profile, to.profile));
    }
    if from.sampling_frequency_index != to.sampling_frequency_index {
        changes.push(format!(
            "sfi {} -> {}",
            from.sampling_frequency_index, to.sampling_frequency_index
        ));
    }
    if from.channel_configuration != to.channel_configuration {
        changes.push(format!(
            "ch {} -> {}",
            from.channel_configuration, to.channel_configuration
        ));
    }
    changes.join(", ")
}

/// 以 `frame_end` 结尾的帧是否完整可读
fn frame_available(source: &dyn ByteSource, size: Option<u64>, frame_end: u64) -> AdtsResult<bool> {
    if let Some(size) = size {
        return Ok(frame_end <= size);
    }
    let mut probe = [0u8; 1];
    Ok(read_full_at(source, frame_end - 1, &mut probe)? == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemorySource;
    use crate::testutil::{FrameSpec, build_frame, build_stream, init_logger};

    fn build(data: Vec<u8>) -> Option<FrameIndex> {
        FrameIndex::build(&MemorySource::new(data), 0).unwrap()
    }

    #[test]
    fn test_偏移链式关系() {
        let mut data = Vec::new();
        for len in [10usize, 200, 33, 1000, 7] {
            data.extend_from_slice(&build_frame(&FrameSpec {
                payload_len: len,
                ..FrameSpec::default()
            }));
        }
        let source = MemorySource::new(data.clone());
        let index = FrameIndex::build(&source, 0).unwrap().unwrap();

        assert_eq!(index.len(), 5);
        assert_eq!(index.max_frame_size(), 1007);
        for i in 0..index.len() - 1 {
            let offset = index.offset(i).unwrap();
            let header = parse_header_at(&source, offset).unwrap().unwrap();
            assert_eq!(
                offset + header.frame_length as u64,
                index.offset(i + 1).unwrap()
            );
        }
        assert_eq!(index.end_offset(), data.len() as u64);
    }

    #[test]
    fn test_时长() {
        let index = build(build_stream(&FrameSpec::default(), 10)).unwrap();
        // 48kHz: 1024 * 1e6 / 48000 = 21333
        assert_eq!(index.frame_duration_us(), 21333);
        assert_eq!(index.duration_us(), 10 * 21333);
        assert_eq!(
            index.duration_us(),
            index.len() as i64 * index.frame_duration_us()
        );
    }

    #[test]
    fn test_尾部截断帧() {
        let spec = FrameSpec::default();
        let mut data = build_stream(&spec, 3);
        let mut tail = build_frame(&spec);
        tail.truncate(30);
        data.extend_from_slice(&tail);

        let index = build(data.clone()).unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.end_offset(), 3 * 57);

        // 长度未知时同样只保留完整帧
        let source = MemorySource::streaming(data);
        let index = FrameIndex::build(&source, 0).unwrap().unwrap();
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_单帧后跟截断帧头() {
        let frame = build_frame(&FrameSpec::default());
        let mut data = frame.clone();
        data.extend_from_slice(&frame[..4]);

        let index = build(data.clone()).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.end_offset(), 57);

        let source = MemorySource::streaming(data);
        let index = FrameIndex::build(&source, 0).unwrap().unwrap();
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_尾部垃圾() {
        let mut data = build_stream(&FrameSpec::default(), 4);
        data.extend_from_slice(b"TAG garbage that is not adts");
        let index = build(data).unwrap();
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn test_流配置变化() {
        init_logger();
        let mut data = build_stream(&FrameSpec::default(), 2);
        data.extend_from_slice(&build_stream(
            &FrameSpec {
                sampling_frequency_index: 4,
                ..FrameSpec::default()
            },
            2,
        ));
        let index = build(data).unwrap();
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_profile_变化() {
        init_logger();
        let main_spec = FrameSpec {
            profile: 0,
            ..FrameSpec::default()
        };
        let mut data = build_stream(&FrameSpec::default(), 3);
        data.extend_from_slice(&build_stream(&main_spec, 2));
        let index = build(data).unwrap();
        assert_eq!(index.len(), 3);

        let lc = AdtsHeader::parse(&build_frame(&FrameSpec::default())).unwrap();
        let main = AdtsHeader::parse(&build_frame(&main_spec)).unwrap();
        assert_eq!(describe_config_change(&lc, &main), "profile 1 -> 0");

        let mono_44k = AdtsHeader::parse(&build_frame(&FrameSpec {
            sampling_frequency_index: 4,
            channel_configuration: 1,
            ..FrameSpec::default()
        }))
        .unwrap();
        assert_eq!(
            describe_config_change(&lc, &mono_44k),
            "sfi 3 -> 4, ch 2 -> 1"
        );
    }

    #[test]
    fn test_crc_帧() {
        let spec = FrameSpec {
            crc: true,
            payload_len: 120,
            ..FrameSpec::default()
        };
        let index = build(build_stream(&spec, 6)).unwrap();
        assert_eq!(index.len(), 6);
        assert_eq!(index.offset(1), Some(129));
        assert!(index.first_header().crc.is_some());
    }

    #[test]
    fn test_起始处没有帧() {
        assert!(build(Vec::new()).is_none());
        assert!(build(vec![0u8; 512]).is_none());

        // 帧不在起始偏移处: 不会向后搜索
        let mut data = vec![0x55u8; 5];
        data.extend_from_slice(&build_stream(&FrameSpec::default(), 3));
        assert!(build(data).is_none());
    }

    #[test]
    fn test_非零起始偏移() {
        let mut data = vec![0x55u8; 5];
        data.extend_from_slice(&build_stream(&FrameSpec::default(), 3));
        let index = FrameIndex::build(&MemorySource::new(data), 5)
            .unwrap()
            .unwrap();
        assert_eq!(index.offsets(), &[5, 62, 119]);
    }

    #[test]
    fn test_按时间定位帧() {
        let index = build(build_stream(&FrameSpec::default(), 5)).unwrap();
        let d = index.frame_duration_us();
        assert_eq!(index.frame_for_time(0), 0);
        assert_eq!(index.frame_for_time(-100), 0);
        assert_eq!(index.frame_for_time(d - 1), 0);
        assert_eq!(index.frame_for_time(d), 1);
        assert_eq!(index.frame_for_time(3 * d + d / 2), 3);
        assert_eq!(index.frame_for_time(i64::MAX), 4);
        assert_eq!(index.pts_us(3), 3 * d);
    }
}
