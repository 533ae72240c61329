/// 默认的载荷结束标记。
/// 隐藏时追加在消息末尾，提取时以它的首次出现作为消息边界，因此不需要长度字段。
pub const DELIMITER: &str = "###END###";

/// 每个字符占用的比特数 (每个字符按 `u8` 处理)。
pub const BITS_PER_CHAR: usize = 8;

/// 每个像素可用于隐写的通道数 (B, G, R 各一个最低有效位)。
pub const CHANNELS_PER_PIXEL: usize = 3;

/// BMP 文件头 (BITMAPFILEHEADER) 的固定大小 (字节)。
pub const BMP_FILE_HEADER_SIZE: usize = 14;

/// BITMAPINFOHEADER 中位于位深度字段之后、被跳过的剩余字节数。
pub const DIB_HEADER_TAIL_SIZE: usize = 24;

/// 文件开头的签名。
pub const BMP_SIGNATURE: [u8; 2] = *b"BM";

/// 唯一支持的位深度。
pub const SUPPORTED_BITS_PER_PIXEL: u16 = 24;

/// 提取时，至少收集到这么多比特后才开始周期性地查找结束标记。
pub const SCAN_WINDOW_BITS: usize = 100_000;

/// 周期性查找结束标记的间隔 (比特)。
pub const CHECK_INTERVAL_BITS: usize = 8_000;

/// 未找到结束标记时，参与回退结果的已解码字符数。
pub const FALLBACK_SCAN_CHARS: usize = 500;

/// 回退结果的最大字符数。
pub const FALLBACK_MAX_CHARS: usize = 200;
