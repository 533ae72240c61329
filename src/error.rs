//! # 错误类型
//!
//! 库内所有操作共用的错误枚举。命令处理层会用 `anyhow` 为其附加上下文。

use thiserror::Error;

/// 库操作的结果类型别名。
pub type Result<T> = std::result::Result<T, StegoError>;

/// 读写 BMP 或隐藏、提取消息时可能出现的错误。
#[derive(Error, Debug)]
pub enum StegoError {
    /// 文件不是受支持的 BMP 格式。
    #[error("Invalid BMP file: {0}")]
    Format(String),

    /// 文件无法打开、读取或写入，或者数据提前结束。
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// 消息加上结束标记后超出了图像容量。
    #[error("Message too long: needs {required} characters, image holds {available}")]
    Capacity { required: usize, available: usize },

    /// 字符无法用单个字节表示。
    #[error("Unsupported character {character:?} at index {index}: only code points up to U+00FF can be hidden")]
    UnsupportedCharacter { character: char, index: usize },

    /// 隐写配置无效。
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
