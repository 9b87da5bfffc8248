//! # adts
//!
//! 纯 Rust 实现的 AAC ADTS 裸流解封装器.
//!
//! - **探测**: 判断数据源是否为以有效帧开头的 ADTS 码流
//! - **索引**: 构造时建立帧偏移表, 推导每帧时长与总时长
//! - **读取**: 单条音频轨道的顺序读取与按时间定位
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use adts::format::{AacExtractor, FileSource, MediaExtractor, MediaTrack, ReadOptions};
//!
//! # fn main() -> adts::core::AdtsResult<()> {
//! let source = FileSource::open("audio.aac")?;
//! let extractor = AacExtractor::new(&source, 0)?;
//! let mut track = extractor.get_track(0)?;
//! track.start()?;
//! let unit = track.read(&ReadOptions::seek(1_000_000))?;
//! println!("pts={}us size={}", unit.pts_us, unit.size());
//! # Ok(())
//! # }
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `adts-core` | 错误类型, 比特流读取, 时间换算 |
//! | `adts-format` | 帧头解析, 同步扫描, 帧索引, 轨道读取, 格式探测 |

/// 核心类型与工具
pub use adts_core as core;

/// 解封装框架
pub use adts_format as format;

pub mod logging;

/// 获取版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
