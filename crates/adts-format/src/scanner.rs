//! ADTS 同步扫描.
//!
//! 音频负载中随时可能出现 `0xFFF` 位模式, 单看一个帧头误判率很高.
//! 候选帧必须满足: 帧头有效, 并且 `候选偏移 + frame_length` 处紧跟另一个有效帧头,
//! 或者数据流恰好在该处结束, 或者其后只剩一个被截断的帧头.

use adts_core::AdtsResult;
use log::trace;

use crate::header::{
    AdtsHeader, MAX_HEADER_SIZE, MAX_SAMPLING_FREQUENCY_INDEX, MIN_HEADER_SIZE, is_sync_candidate,
    parse_header_at,
};
use crate::io::{ByteSource, read_full_at};

/// 扫描时每次读取的窗口大小
const SCAN_WINDOW_SIZE: usize = 4096;

/// 在 `[from_offset, search_limit)` 内查找下一个经过确认的帧起始偏移
///
/// 按字节逐个检查候选位置 (ADTS 同步字总是字节对齐的).
/// 到达数据流末尾或限制位置仍未找到时返回 `Ok(None)`.
pub fn find_next_frame(
    source: &dyn ByteSource,
    from_offset: u64,
    search_limit: u64,
) -> AdtsResult<Option<u64>> {
    let mut window = vec![0u8; SCAN_WINDOW_SIZE];
    let mut base = from_offset;

    while base < search_limit {
        let n = read_full_at(source, base, &mut window)?;
        if n < 2 {
            return Ok(None);
        }

        // 相邻两个字节才能判断同步字, 窗口最后一个字节留到下一轮
        let scan_len = (n - 1).min(usize::try_from(search_limit - base).unwrap_or(usize::MAX));
        for i in 0..scan_len {
            if !is_sync_candidate(window[i], window[i + 1]) {
                continue;
            }
            let candidate = base + i as u64;
            if confirm_frame_at(source, candidate)?.is_some() {
                return Ok(Some(candidate));
            }
            trace!("ADTS: 偏移 {candidate} 处的同步字未通过确认");
        }

        if n < window.len() {
            return Ok(None);
        }
        base += (n - 1) as u64;
    }

    Ok(None)
}

/// 确认 `offset` 处是一个真实的 ADTS 帧
///
/// 返回该帧的帧头; 帧头无效、帧不完整或下一帧位置不是有效帧头时返回 `Ok(None)`.
/// 帧之后剩余的数据不足一个帧头时, 只要它是有效帧头的开头 (被截断的尾帧) 也接受.
pub fn confirm_frame_at(source: &dyn ByteSource, offset: u64) -> AdtsResult<Option<AdtsHeader>> {
    let Some(header) = parse_header_at(source, offset)? else {
        return Ok(None);
    };
    let next = offset + header.frame_length as u64;

    match source.size() {
        Some(size) if next > size => return Ok(None),
        Some(size) if next == size => return Ok(Some(header)),
        Some(_) => {}
        None => {
            let mut probe = [0u8; 1];
            // 帧的最后一个字节不可读: 帧被截断
            if read_full_at(source, next - 1, &mut probe)? == 0 {
                return Ok(None);
            }
        }
    }

    let mut tail = [0u8; MAX_HEADER_SIZE];
    let n = read_full_at(source, next, &mut tail)?;
    // 帧之后再无数据: 恰好结束
    if n == 0 {
        return Ok(Some(header));
    }
    if AdtsHeader::parse(&tail[..n]).is_some() || is_truncated_header(&tail[..n]) {
        return Ok(Some(header));
    }
    Ok(None)
}

/// `data` 是否为一个被数据流末尾截断的帧头
///
/// 数据必须短于该帧头所需的长度, 且已有的字节与有效帧头一致.
fn is_truncated_header(data: &[u8]) -> bool {
    match data {
        [] => false,
        [b0] => *b0 == 0xFF,
        [b0, b1, rest @ ..] => {
            if !is_sync_candidate(*b0, *b1) {
                return false;
            }
            let header_size = if b1 & 0x01 != 0 {
                MIN_HEADER_SIZE
            } else {
                MAX_HEADER_SIZE
            };
            if data.len() >= header_size {
                return false;
            }
            match rest.first() {
                Some(b2) => (b2 >> 2) & 0x0F <= MAX_SAMPLING_FREQUENCY_INDEX,
                None => true,
            }
        }
    }
}
