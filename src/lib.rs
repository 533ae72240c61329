//! # bmp_lsb 库
//!
//! 本库包含 BMP 最低有效位隐写工具的核心逻辑：
//!
//! * [`bmp`]：逐字节保真地读取与写回 24 位 BMP。
//! * [`bits`]：文本与比特序列之间的转换。
//! * [`steganography`]：容量计算、消息隐藏与提取。
//!
//! ```no_run
//! use bmp_lsb::{Bitmap, StegoConfig, embed, extract};
//!
//! # fn main() -> bmp_lsb::Result<()> {
//! let config = StegoConfig::default();
//! let mut picture = Bitmap::load("cover.bmp")?;
//! embed(&mut picture, "hi", &config)?;
//! picture.save("doctored_cover.bmp")?;
//!
//! let recovered = extract(&Bitmap::load("doctored_cover.bmp")?, &config)?;
//! assert_eq!(recovered.message(), "hi");
//! # Ok(())
//! # }
//! ```

// 声明库包含的所有模块。

pub mod bits;
pub mod bmp;
pub mod cli;
pub mod constants;
pub mod error;
pub mod handler;
pub mod interactive;
pub mod steganography;

pub use bmp::{Bitmap, Pixel};
pub use error::{Result, StegoError};
pub use steganography::{Extraction, StegoConfig, capacity, embed, extract, message_capacity};
