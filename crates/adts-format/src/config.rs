//! 解封装器配置.

use serde::{Deserialize, Serialize};

/// 探测时允许的候选同步点范围 (字节)
pub const DEFAULT_SNIFF_PREFIX_SIZE: u64 = 1024;

/// max-input-size 在最大帧长度之上附加的余量 (字节)
pub const DEFAULT_MAX_INPUT_SIZE_MARGIN: usize = 64;

/// 解封装器配置
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// 探测时扫描的前缀长度 (从起始偏移算起)
    pub sniff_prefix_size: u64,
    /// max-input-size 余量
    pub max_input_size_margin: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            sniff_prefix_size: DEFAULT_SNIFF_PREFIX_SIZE,
            max_input_size_margin: DEFAULT_MAX_INPUT_SIZE_MARGIN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_缺省字段使用默认值() {
        let config: ExtractorConfig = serde_json::from_str(r#"{"sniff_prefix_size": 16}"#).unwrap();
        assert_eq!(config.sniff_prefix_size, 16);
        assert_eq!(config.max_input_size_margin, DEFAULT_MAX_INPUT_SIZE_MARGIN);

        let config: ExtractorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ExtractorConfig::default());
    }
}
