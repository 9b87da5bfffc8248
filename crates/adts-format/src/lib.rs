//! # adts-format
//!
//! AAC ADTS 裸流解封装库.
//!
//! 探测数据源是否为 ADTS 码流, 构造时建立帧偏移索引,
//! 对外提供单条音频轨道的元数据、顺序读取与按时间定位.
//!
//! ```
//! use adts_format::{AacExtractor, MediaExtractor, MediaTrack, MemorySource, ReadOptions, sniff};
//!
//! # fn main() -> adts_core::AdtsResult<()> {
//! let source = MemorySource::new(Vec::new());
//! if let Some(result) = sniff(&source)? {
//!     let extractor = AacExtractor::new(&source, result.start_offset)?;
//!     let mut track = extractor.get_track(0)?;
//!     track.start()?;
//!     while let Ok(unit) = track.read(&ReadOptions::default()) {
//!         println!("pts={}us size={}", unit.pts_us, unit.size());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod aac;
pub mod access_unit;
pub mod config;
pub mod extractor;
pub mod header;
pub mod index;
pub mod io;
pub mod metadata;
pub mod scanner;
pub mod sniff;
pub mod track;

#[cfg(test)]
pub(crate) mod testutil;

// 重导出常用类型
pub use aac::{AacExtractor, InitCheck};
pub use access_unit::AccessUnit;
pub use config::ExtractorConfig;
pub use extractor::{MediaExtractor, MediaTrack, ReadOptions};
pub use header::{AdtsHeader, parse_header_at};
pub use index::FrameIndex;
pub use io::{ByteSource, FileSource, MemorySource};
pub use metadata::{MetaData, MetaSink, MetaValue, TrackMetadata};
pub use scanner::find_next_frame;
pub use sniff::{AacSniffer, FormatSniffer, SniffResult, sniff};
pub use track::{TrackReader, TrackState};
