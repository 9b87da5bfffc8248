//! # adts-core
//!
//! ADTS 解封装框架核心库, 提供错误类型、比特流读取器和时间换算工具.
//!
//! 上层的 `adts-format` 在此基础上实现帧头解析、同步扫描与索引.

pub mod bitreader;
pub mod error;
pub mod time;

// 重导出常用类型
pub use bitreader::BitReader;
pub use error::{AdtsError, AdtsResult};
