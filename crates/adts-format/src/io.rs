//! 数据源抽象层.
//!
//! 解封装器只依赖按偏移读取的能力 (`read_at`), 不维护共享的读位置,
//! 因此同一个数据源可以被多个轨道读取器同时使用.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Mutex;

use bytes::Bytes;

use adts_core::AdtsResult;

/// 数据源 trait
///
/// 实现此 trait 以支持不同的数据来源 (内存、文件、网络缓存等).
pub trait ByteSource: Send + Sync {
    /// 从 `offset` 处读取数据到 `buf`
    ///
    /// # 返回
    /// - `Ok(n)`: 实际读取的字节数, 小于 `buf.len()` 表示到达 (当前) 末尾
    /// - `Err(e)`: I/O 错误
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// 获取总大小, `None` 表示未知或仍在增长
    fn size(&self) -> Option<u64>;
}

/// 尽量读满 `buf`, 返回实际读取的字节数
///
/// 底层返回 0 视为到达末尾, 短读不是错误; I/O 错误原样向上传播.
pub fn read_full_at(source: &dyn ByteSource, offset: u64, buf: &mut [u8]) -> AdtsResult<usize> {
    let mut total = 0;
    while total < buf.len() {
        let n = match source.read_at(offset + total as u64, &mut buf[total..]) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        if n == 0 {
            break;
        }
        total += n;
    }
    Ok(total)
}

/// 内存数据源
///
/// 用于测试和内存中处理. 可以隐藏总大小以模拟长度未知的流.
#[derive(Debug, Clone)]
pub struct MemorySource {
    /// 数据缓冲区
    data: Bytes,
    /// 是否对外报告总大小
    report_size: bool,
}

impl MemorySource {
    /// 从已有数据创建
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            report_size: true,
        }
    }

    /// 创建不报告总大小的数据源 (模拟流式输入)
    pub fn streaming(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            report_size: false,
        }
    }

    /// 获取内部数据的引用
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl ByteSource for MemorySource {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let len = self.data.len() as u64;
        if offset >= len {
            return Ok(0);
        }
        let start = offset as usize;
        let to_read = buf.len().min(self.data.len() - start);
        buf[..to_read].copy_from_slice(&self.data[start..start + to_read]);
        Ok(to_read)
    }

    fn size(&self) -> Option<u64> {
        self.report_size.then_some(self.data.len() as u64)
    }
}

/// 文件数据源
///
/// `seek + read` 需要成对执行, 用互斥锁保护文件句柄.
#[derive(Debug)]
pub struct FileSource {
    file: Mutex<File>,
    size: Option<u64>,
}

impl FileSource {
    /// 从文件路径打开 (只读)
    pub fn open(path: impl AsRef<Path>) -> AdtsResult<Self> {
        let file = File::open(path)?;
        Ok(Self::new(file))
    }

    /// 从已打开的文件创建
    pub fn new(file: File) -> Self {
        let size = file.metadata().ok().map(|m| m.len());
        Self {
            file: Mutex::new(file),
            size,
        }
    }
}

impl ByteSource for FileSource {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::other("文件句柄锁已中毒"))?;
        file.seek(SeekFrom::Start(offset))?;
        file.read(buf)
    }

    fn size(&self) -> Option<u64> {
        self.size
    }
}
