//! 测试辅助: 构造 ADTS 帧与码流.

/// 测试帧参数
#[derive(Debug, Clone)]
pub(crate) struct FrameSpec {
    /// profile (1=LC)
    pub profile: u8,
    /// 采样率索引 (3=48kHz)
    pub sampling_frequency_index: u8,
    /// 声道配置
    pub channel_configuration: u8,
    /// 帧数据长度 (不含帧头)
    pub payload_len: usize,
    /// 是否携带 CRC
    pub crc: bool,
}

impl Default for FrameSpec {
    fn default() -> Self {
        Self {
            profile: 1,
            sampling_frequency_index: 3,
            channel_configuration: 2,
            payload_len: 50,
            crc: false,
        }
    }
}

/// 构造一个 ADTS 帧
///
/// 帧数据为 `i % 251`, 不会出现 0xFF, 因此不会产生伪同步字.
pub(crate) fn build_frame(spec: &FrameSpec) -> Vec<u8> {
    let header_size = if spec.crc { 9 } else { 7 };
    let frame_length = (header_size + spec.payload_len) as u16;
    let fullness: u16 = 0x7FF;

    let mut frame = Vec::with_capacity(frame_length as usize);
    frame.push(0xFF);
    // ID(0=MPEG-4) + layer(00) + protection_absent
    frame.push(if spec.crc { 0xF0 } else { 0xF1 });
    frame.push(
        (spec.profile << 6)
            | ((spec.sampling_frequency_index & 0x0F) << 2)
            | ((spec.channel_configuration >> 2) & 0x01),
    );
    frame.push(((spec.channel_configuration & 0x03) << 6) | ((frame_length >> 11) as u8 & 0x03));
    frame.push((frame_length >> 3) as u8);
    frame.push((((frame_length & 0x07) as u8) << 5) | ((fullness >> 6) as u8 & 0x1F));
    // buffer_fullness 低 6 位 + number_of_raw_data_blocks(0)
    frame.push(((fullness & 0x3F) as u8) << 2);
    if spec.crc {
        frame.extend_from_slice(&[0x12, 0x34]);
    }
    frame.extend((0..spec.payload_len).map(|i| (i % 251) as u8));
    frame
}

/// 构造由 `count` 个相同参数帧组成的码流
pub(crate) fn build_stream(spec: &FrameSpec, count: usize) -> Vec<u8> {
    let frame = build_frame(spec);
    let mut data = Vec::with_capacity(frame.len() * count);
    for _ in 0..count {
        data.extend_from_slice(&frame);
    }
    data
}

/// 在测试输出中显示 `log` 日志
pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
