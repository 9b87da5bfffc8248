//! 统一错误类型定义.
//!
//! 所有 adts crate 共用的错误类型, 支持跨模块传播.

use thiserror::Error;

/// ADTS 解封装统一错误类型
///
/// 畸形帧头不属于错误: 解析器以 `None` 表示, 由扫描器自行跳过.
/// 只有调用方可见的失败才会以此类型返回.
#[derive(Debug, Error)]
pub enum AdtsError {
    /// 无效参数
    #[error("无效参数: {0}")]
    InvalidArgument(String),

    /// 状态机使用错误 (如未 start 就 read)
    #[error("无效状态: {0}")]
    InvalidState(String),

    /// 无效数据 (已索引的帧无法再次解析等)
    #[error("无效数据: {0}")]
    InvalidData(String),

    /// 底层数据源 I/O 错误
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 已到达流末尾
    #[error("已到达流末尾")]
    Eof,

    /// 轨道索引越界
    #[error("轨道索引越界: {0}")]
    OutOfRange(usize),

    /// 解封装器未成功初始化 (未找到有效帧)
    #[error("解封装器未初始化")]
    NotInitialized,
}

/// 统一 Result 类型
pub type AdtsResult<T> = Result<T, AdtsError>;

impl AdtsError {
    /// 是否为流末尾
    pub fn is_eof(&self) -> bool {
        matches!(self, Self::Eof)
    }
}
