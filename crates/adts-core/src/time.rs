//! 时间换算工具.
//!
//! 解封装层统一使用微秒 (µs) 作为时间单位.

/// 每秒微秒数
pub const MICROS_PER_SECOND: i64 = 1_000_000;

/// 将采样数换算为微秒 (向下取整)
///
/// `sample_rate` 为 0 时返回 0.
pub fn samples_to_us(samples: u64, sample_rate: u32) -> i64 {
    if sample_rate == 0 {
        return 0;
    }
    let us = u128::from(samples) * MICROS_PER_SECOND as u128 / u128::from(sample_rate);
    i64::try_from(us).unwrap_or(i64::MAX)
}

/// 将微秒换算为秒 (f64)
pub fn us_to_seconds(us: i64) -> f64 {
    us as f64 / MICROS_PER_SECOND as f64
}
