//! ADTS 帧头解析.
//!
//! ADTS (Audio Data Transport Stream) 是 AAC 音频最常见的裸流封装格式.
//! 每个 ADTS 帧由固定/可变头部 + AAC 原始数据块组成.
//!
//! # ADTS 帧头结构 (7 或 9 字节)
//! ```text
//! 固定头部 (28 bits):
//!   syncword (12 bits = 0xFFF)
//!   ID (1 bit): 0=MPEG-4, 1=MPEG-2
//!   layer (2 bits): 恒为 0
//!   protection_absent (1 bit): 1=无 CRC, 0=有 CRC
//!   profile (2 bits): 0=Main, 1=LC, 2=SSR, 3=LTP
//!   sampling_frequency_index (4 bits)
//!   private_bit (1 bit)
//!   channel_configuration (3 bits)
//!   original_copy (1 bit), home (1 bit)
//! 可变头部 (28 bits):
//!   copyright_identification_bit (1 bit), copyright_identification_start (1 bit)
//!   frame_length (13 bits): 含头部的完整帧大小
//!   adts_buffer_fullness (11 bits)
//!   number_of_raw_data_blocks_in_frame (2 bits)
//! [crc_check (16 bits)] 仅当 protection_absent=0
//! ```

use adts_core::{AdtsResult, BitReader};
use byteorder::{BigEndian, ByteOrder};

use crate::io::{ByteSource, read_full_at};

/// 不含 CRC 的帧头大小
pub const MIN_HEADER_SIZE: usize = 7;

/// 含 CRC 的帧头大小
pub const MAX_HEADER_SIZE: usize = 9;

/// 每帧采样数 (仅支持 1024 采样帧, 不支持 960)
pub const SAMPLES_PER_FRAME: u32 = 1024;

/// AAC 采样率索引表 (ISO 14496-3), 13~15 为保留值
const SAMPLE_RATES: [u32; 13] = [
    96000, 88200, 64000, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000, 7350,
];

/// 最大有效采样率索引
pub const MAX_SAMPLING_FREQUENCY_INDEX: u8 = 12;

/// MPEG 版本 (ADTS ID 位)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpegVersion {
    /// ID=0
    Mpeg4,
    /// ID=1
    Mpeg2,
}

/// ADTS 帧头
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdtsHeader {
    /// MPEG 版本
    pub mpeg_version: MpegVersion,
    /// 是否无 CRC
    pub protection_absent: bool,
    /// AAC Profile (0=Main, 1=LC, 2=SSR, 3=LTP)
    pub profile: u8,
    /// 采样率索引 (0~12)
    pub sampling_frequency_index: u8,
    /// 声道配置
    pub channel_configuration: u8,
    /// 帧总大小 (含头部)
    pub frame_length: u16,
    /// 码率缓冲充满度 (0x7FF 表示可变码率)
    pub buffer_fullness: u16,
    /// 帧内原始数据块数量 (已加 1)
    pub number_of_raw_data_blocks: u8,
    /// CRC 校验值 (仅当 protection_absent=0)
    pub crc: Option<u16>,
}

/// 前两个字节是否可能是 ADTS 帧头 (同步字 0xFFF 且 layer=0)
pub(crate) fn is_sync_candidate(b0: u8, b1: u8) -> bool {
    b0 == 0xFF && (b1 & 0xF6) == 0xF0
}

impl AdtsHeader {
    /// 从字节切片解析帧头
    ///
    /// 数据不足、同步字不匹配、layer 非 0、采样率索引为保留值、
    /// 或 frame_length 小于帧头本身大小时返回 `None`.
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < MIN_HEADER_SIZE {
            return None;
        }

        let mut br = BitReader::new(data);
        if br.read_bits(12).ok()? != 0xFFF {
            return None;
        }
        let mpeg_version = if br.read_flag().ok()? {
            MpegVersion::Mpeg2
        } else {
            MpegVersion::Mpeg4
        };
        // layer 必须为 0
        if br.read_bits(2).ok()? != 0 {
            return None;
        }
        let protection_absent = br.read_flag().ok()?;
        let profile = br.read_bits(2).ok()? as u8;
        let sampling_frequency_index = br.read_bits(4).ok()? as u8;
        br.skip_bits(1).ok()?; // private_bit
        let channel_configuration = br.read_bits(3).ok()? as u8;
        br.skip_bits(4).ok()?; // original_copy, home, copyright 位
        let frame_length = br.read_bits(13).ok()? as u16;
        let buffer_fullness = br.read_bits(11).ok()? as u16;
        let number_of_raw_data_blocks = br.read_bits(2).ok()? as u8 + 1;

        if sampling_frequency_index > MAX_SAMPLING_FREQUENCY_INDEX {
            return None;
        }

        let header_size = if protection_absent {
            MIN_HEADER_SIZE
        } else {
            MAX_HEADER_SIZE
        };
        if usize::from(frame_length) < header_size {
            return None;
        }

        let crc = if protection_absent {
            None
        } else {
            if data.len() < MAX_HEADER_SIZE {
                return None;
            }
            Some(BigEndian::read_u16(&data[MIN_HEADER_SIZE..MAX_HEADER_SIZE]))
        };

        Some(Self {
            mpeg_version,
            protection_absent,
            profile,
            sampling_frequency_index,
            channel_configuration,
            frame_length,
            buffer_fullness,
            number_of_raw_data_blocks,
            crc,
        })
    }

    /// 帧头大小 (7 或 9 字节)
    pub fn header_size(&self) -> usize {
        if self.protection_absent {
            MIN_HEADER_SIZE
        } else {
            MAX_HEADER_SIZE
        }
    }

    /// 帧总大小 (字节)
    pub fn frame_size(&self) -> usize {
        usize::from(self.frame_length)
    }

    /// 帧数据大小 (不含帧头)
    pub fn payload_size(&self) -> usize {
        self.frame_size() - self.header_size()
    }

    /// 采样率 (Hz)
    pub fn sample_rate(&self) -> u32 {
        SAMPLE_RATES[usize::from(self.sampling_frequency_index)]
    }

    /// 声道数
    ///
    /// 配置 0 (由 PCE 定义) 与 7 (保留) 无法直接得出声道数, 返回 `None`.
    pub fn channel_count(&self) -> Option<u32> {
        match self.channel_configuration {
            1..=6 => Some(u32::from(self.channel_configuration)),
            _ => None,
        }
    }

    /// MPEG-4 音频对象类型 (profile + 1)
    pub fn audio_object_type(&self) -> u8 {
        self.profile + 1
    }

    /// Profile 名称
    pub fn profile_name(&self) -> &'static str {
        match self.profile {
            0 => "Main",
            1 => "LC",
            2 => "SSR",
            _ => "LTP",
        }
    }

    /// 构造 AudioSpecificConfig (2 字节, ISO 14496-3)
    ///
    /// audioObjectType (5 bits) + samplingFrequencyIndex (4 bits)
    /// + channelConfiguration (4 bits) + 填充 (3 bits)
    pub fn audio_specific_config(&self) -> [u8; 2] {
        let aot = self.audio_object_type();
        let sfi = self.sampling_frequency_index;
        let cc = self.channel_configuration;
        [(aot << 3) | (sfi >> 1), ((sfi & 1) << 7) | (cc << 3)]
    }

    /// 与另一帧头的流配置是否一致 (采样率/声道/profile)
    pub fn same_config(&self, other: &Self) -> bool {
        self.sampling_frequency_index == other.sampling_frequency_index
            && self.channel_configuration == other.channel_configuration
            && self.profile == other.profile
    }
}

/// 在数据源的 `offset` 处解析帧头
///
/// 畸形帧头返回 `Ok(None)`, 只有数据源的 I/O 错误才返回 `Err`.
pub fn parse_header_at(source: &dyn ByteSource, offset: u64) -> AdtsResult<Option<AdtsHeader>> {
    let mut buf = [0u8; MAX_HEADER_SIZE];
    let n = read_full_at(source, offset, &mut buf)?;
    if n < MIN_HEADER_SIZE {
        return Ok(None);
    }
    Ok(AdtsHeader::parse(&buf[..n]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemorySource;
    use crate::testutil::{FrameSpec, build_frame};

    #[test]
    fn test_adts_header_parse() {
        let frame = build_frame(&FrameSpec {
            payload_len: 10,
            ..FrameSpec::default()
        });
        let header = AdtsHeader::parse(&frame).expect("应该解析成功");
        assert_eq!(header.mpeg_version, MpegVersion::Mpeg4);
        assert_eq!(header.profile, 1);
        assert_eq!(header.profile_name(), "LC");
        assert_eq!(header.sampling_frequency_index, 3);
        assert_eq!(header.sample_rate(), 48000);
        assert_eq!(header.channel_configuration, 2);
        assert_eq!(header.channel_count(), Some(2));
        assert_eq!(header.frame_length, 17);
        assert_eq!(header.buffer_fullness, 0x7FF);
        assert_eq!(header.number_of_raw_data_blocks, 1);
        assert_eq!(header.header_size(), 7);
        assert_eq!(header.payload_size(), 10);
        assert!(header.crc.is_none());
    }

    #[test]
    fn test_crc_帧头() {
        let frame = build_frame(&FrameSpec {
            crc: true,
            payload_len: 20,
            ..FrameSpec::default()
        });
        let header = AdtsHeader::parse(&frame).unwrap();
        assert!(!header.protection_absent);
        assert_eq!(header.header_size(), 9);
        assert_eq!(header.frame_size(), 29);
        assert_eq!(header.crc, Some(0x1234));

        // 有 CRC 但只给 7 字节, 视为数据不足
        assert!(AdtsHeader::parse(&frame[..7]).is_none());
    }

    #[test]
    fn test_adts_invalid_sync() {
        assert!(AdtsHeader::parse(&[0x00; 7]).is_none());
        // 0xFFE: MPEG 音频同步字而不是 ADTS
        assert!(
            AdtsHeader::parse(&[0xFF, 0xE1, 0x4C, 0x80, 0x02, 0x3F, 0xFC]).is_none()
        );
    }

    #[test]
    fn test_layer_非零() {
        let mut frame = build_frame(&FrameSpec::default());
        frame[1] |= 0x02;
        assert!(AdtsHeader::parse(&frame).is_none());
    }

    #[test]
    fn test_保留采样率索引() {
        for sfi in 13..=15 {
            let frame = build_frame(&FrameSpec {
                sampling_frequency_index: sfi,
                ..FrameSpec::default()
            });
            assert!(AdtsHeader::parse(&frame).is_none(), "sfi={sfi} 应被拒绝");
        }
        let frame = build_frame(&FrameSpec {
            sampling_frequency_index: 12,
            ..FrameSpec::default()
        });
        assert_eq!(AdtsHeader::parse(&frame).unwrap().sample_rate(), 7350);
    }

    #[test]
    fn test_frame_length_小于帧头() {
        let mut frame = build_frame(&FrameSpec::default());
        // frame_length = 6
        frame[3] &= 0xFC;
        frame[4] = 0x00;
        frame[5] = (6 << 5) | (frame[5] & 0x1F);
        assert!(AdtsHeader::parse(&frame).is_none());

        // 有 CRC 时 frame_length = 8 仍然不足 9 字节
        let mut frame = build_frame(&FrameSpec {
            crc: true,
            ..FrameSpec::default()
        });
        frame[3] &= 0xFC;
        frame[4] = 0x01;
        frame[5] &= 0x1F;
        assert!(AdtsHeader::parse(&frame).is_none());
    }

    #[test]
    fn test_数据不足() {
        let frame = build_frame(&FrameSpec::default());
        assert!(AdtsHeader::parse(&frame[..6]).is_none());
    }

    #[test]
    fn test_保留声道配置() {
        for cc in [0u8, 7] {
            let frame = build_frame(&FrameSpec {
                channel_configuration: cc,
                ..FrameSpec::default()
            });
            let header = AdtsHeader::parse(&frame).expect("声道配置不影响语法有效性");
            assert_eq!(header.channel_count(), None);
        }
    }

    #[test]
    fn test_audio_specific_config() {
        let header = AdtsHeader::parse(&build_frame(&FrameSpec::default())).unwrap();
        // AOT=2(LC), sr_index=3(48kHz), ch=2
        // byte0 = 0b_00010_001 = 0x11
        // byte1 = 0b_1_0010_000 = 0x90
        assert_eq!(header.audio_object_type(), 2);
        assert_eq!(header.audio_specific_config(), [0x11, 0x90]);
    }

    #[test]
    fn test_parse_header_at() {
        let mut data = vec![0u8; 3];
        data.extend_from_slice(&build_frame(&FrameSpec::default()));
        let source = MemorySource::new(data);

        assert!(parse_header_at(&source, 0).unwrap().is_none());
        let header = parse_header_at(&source, 3).unwrap().unwrap();
        assert_eq!(header.frame_length, 57);
        // 末尾不足 7 字节
        assert!(parse_header_at(&source, 55).unwrap().is_none());
        assert!(parse_header_at(&source, 1000).unwrap().is_none());
    }

    #[test]
    fn test_配置比较() {
        let a = AdtsHeader::parse(&build_frame(&FrameSpec::default())).unwrap();
        let b = AdtsHeader::parse(&build_frame(&FrameSpec {
            payload_len: 99,
            ..FrameSpec::default()
        }))
        .unwrap();
        let c = AdtsHeader::parse(&build_frame(&FrameSpec {
            sampling_frequency_index: 4,
            ..FrameSpec::default()
        }))
        .unwrap();
        assert!(a.same_config(&b));
        assert!(!a.same_config(&c));
    }

    #[test]
    fn test_sync_候选() {
        assert!(is_sync_candidate(0xFF, 0xF1));
        assert!(is_sync_candidate(0xFF, 0xF9));
        assert!(!is_sync_candidate(0xFF, 0xFB));
        assert!(!is_sync_candidate(0xFE, 0xF1));
    }
}
