//! 比特流读取器.
//!
//! 从字节缓冲区中按位读取数据, 供 ADTS 帧头等定长位域结构解析使用.
//!
//! 按大端位序读取 (MSB first), 与 ISO 14496-3 的位域定义一致.

use crate::{AdtsError, AdtsResult};

/// 比特流读取器
///
/// # 示例
/// ```
/// use adts_core::bitreader::BitReader;
///
/// let data = [0xFF, 0xF1];
/// let mut br = BitReader::new(&data);
/// assert_eq!(br.read_bits(12).unwrap(), 0xFFF);
/// assert!(!br.read_flag().unwrap());
/// assert_eq!(br.read_bits(2).unwrap(), 0);
/// assert!(br.read_flag().unwrap());
/// ```
pub struct BitReader<'a> {
    /// 源数据
    data: &'a [u8],
    /// 当前字节索引
    byte_pos: usize,
    /// 当前字节中的位位置 (0-7, 0 表示最高位)
    bit_pos: u8,
}

impl<'a> BitReader<'a> {
    /// 创建新的比特流读取器
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            byte_pos: 0,
            bit_pos: 0,
        }
    }

    /// 获取剩余可读位数
    pub fn bits_left(&self) -> usize {
        if self.byte_pos >= self.data.len() {
            return 0;
        }
        (self.data.len() - self.byte_pos) * 8 - self.bit_pos as usize
    }

    /// 读取 1 个位并作为布尔值返回
    pub fn read_flag(&mut self) -> AdtsResult<bool> {
        Ok(self.read_bits(1)? != 0)
    }

    /// 读取 N 个位 (最多 32 位)
    ///
    /// 返回值的低 N 位有效.
    pub fn read_bits(&mut self, n: u32) -> AdtsResult<u32> {
        if n == 0 {
            return Ok(0);
        }
        if n > 32 {
            return Err(AdtsError::InvalidArgument(format!(
                "read_bits: n={n} 超过 32 位"
            )));
        }
        if (n as usize) > self.bits_left() {
            return Err(AdtsError::Eof);
        }

        let mut result: u32 = 0;
        let mut remaining = n;

        while remaining > 0 {
            let available = 8 - u32::from(self.bit_pos);
            let to_read = remaining.min(available);

            let shift = available - to_read;
            let mask = ((1u32 << to_read) - 1) as u8;
            let bits = (self.data[self.byte_pos] >> shift) & mask;

            result = (result << to_read) | u32::from(bits);

            self.bit_pos += to_read as u8;
            if self.bit_pos >= 8 {
                self.bit_pos = 0;
                self.byte_pos += 1;
            }
            remaining -= to_read;
        }

        Ok(result)
    }

    /// 跳过 N 个位
    pub fn skip_bits(&mut self, n: u32) -> AdtsResult<()> {
        if (n as usize) > self.bits_left() {
            return Err(AdtsError::Eof);
        }

        let total_bits = u32::from(self.bit_pos) + n;
        self.byte_pos += (total_bits / 8) as usize;
        self.bit_pos = (total_bits % 8) as u8;
        Ok(())
    }
}
