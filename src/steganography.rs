//! # 隐写核心模块
//!
//! 在像素每个颜色通道的最低有效位中写入或读取消息比特。
//!
//! 扫描顺序固定：按行优先遍历像素 (第 0 行、第 0 列开始)，
//! 每个像素内按 Blue, Green, Red 的顺序访问通道。
//! 消息之后追加结束标记，提取时以标记的首次出现作为消息边界。

use crate::bits::{ByteAssembler, decode_latin1, encode_latin1, text_to_bits};
use crate::bmp::Bitmap;
use crate::constants::{
    BITS_PER_CHAR, CHANNELS_PER_PIXEL, CHECK_INTERVAL_BITS, DELIMITER, FALLBACK_MAX_CHARS,
    FALLBACK_SCAN_CHARS, SCAN_WINDOW_BITS,
};
use crate::error::{Result, StegoError};
use log::debug;

/// 隐藏与提取时使用的配置，显式传入每次调用。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StegoConfig {
    /// 追加在消息之后的结束标记。
    pub delimiter: String,
    /// 收集到 `min(通道总数, scan_window_bits)` 个比特后才开始周期性检查。
    pub scan_window_bits: usize,
    /// 周期性检查结束标记的间隔 (比特)。
    pub check_interval_bits: usize,
}

impl Default for StegoConfig {
    fn default() -> Self {
        Self {
            delimiter: DELIMITER.to_string(),
            scan_window_bits: SCAN_WINDOW_BITS,
            check_interval_bits: CHECK_INTERVAL_BITS,
        }
    }
}

impl StegoConfig {
    /// 使用自定义结束标记，其余参数取默认值。
    pub fn with_delimiter(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
            ..Self::default()
        }
    }

    /// 校验配置。
    ///
    /// # Errors
    ///
    /// 结束标记为空、含有单字节无法表示的字符，或检查间隔为零时返回
    /// [`StegoError::InvalidConfig`]。
    pub fn validate(&self) -> Result<()> {
        if self.delimiter.is_empty() {
            return Err(StegoError::InvalidConfig(
                "delimiter must not be empty".to_string(),
            ));
        }
        if let Err(err) = encode_latin1(&self.delimiter) {
            return Err(StegoError::InvalidConfig(format!("delimiter: {err}")));
        }
        if self.check_interval_bits == 0 {
            return Err(StegoError::InvalidConfig(
                "check interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// 结束标记占用的字符数。
    pub fn delimiter_len(&self) -> usize {
        self.delimiter.chars().count()
    }
}

/// 提取结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// 找到了结束标记，内容为标记之前的文本。
    Found(String),
    /// 没有找到结束标记。内容只是尽力而为的猜测：
    /// 前 500 个已解码字符中的可打印字符，最多 200 个。
    Uncertain(String),
}

impl Extraction {
    pub fn message(&self) -> &str {
        match self {
            Extraction::Found(text) | Extraction::Uncertain(text) => text,
        }
    }

    pub fn into_message(self) -> String {
        match self {
            Extraction::Found(text) | Extraction::Uncertain(text) => text,
        }
    }

    pub fn is_uncertain(&self) -> bool {
        matches!(self, Extraction::Uncertain(_))
    }
}

/// 图像最多可容纳的字符数：每个像素 3 个比特，每个字符 8 个比特。
/// 没有为结束标记预留空间，参见 [`message_capacity`]。
pub fn capacity(width: usize, height: usize) -> usize {
    width * height * CHANNELS_PER_PIXEL / BITS_PER_CHAR
}

/// 扣除结束标记之后，消息本身可用的最大字符数。
pub fn message_capacity(width: usize, height: usize, config: &StegoConfig) -> usize {
    capacity(width, height).saturating_sub(config.delimiter_len())
}

/// 将消息隐藏到图像的像素中，返回写入的比特数。
///
/// 容量在修改任何像素之前检查，失败时图像保持不变。
/// 文件头与填充字节不受影响。
///
/// # Errors
///
/// * 配置无效时返回 [`StegoError::InvalidConfig`]。
/// * 消息含有码点大于 `U+00FF` 的字符时返回 [`StegoError::UnsupportedCharacter`]。
/// * 消息加结束标记超出 [`capacity`] 时返回 [`StegoError::Capacity`]。
pub fn embed(bitmap: &mut Bitmap, message: &str, config: &StegoConfig) -> Result<usize> {
    config.validate()?;

    let payload = format!("{message}{}", config.delimiter);
    let bits = text_to_bits(&payload)?;

    let required = payload.chars().count();
    let available = capacity(bitmap.width(), bitmap.height());
    if required > available {
        return Err(StegoError::Capacity {
            required,
            available,
        });
    }

    debug!(
        "embedding {} characters ({} bits) into {}x{} pixels",
        required,
        bits.len(),
        bitmap.width(),
        bitmap.height()
    );

    let channels = bitmap.pixels_mut().iter_mut().flatten();
    let mut written = 0;
    for (channel, &bit) in channels.zip(&bits) {
        *channel = (*channel & 0xFE) | u8::from(bit);
        written += 1;
    }

    debug!("embedded {written} bits");
    Ok(written)
}

/// 从图像中提取隐藏的消息。
///
/// 收集到 `min(通道总数, scan_window_bits)` 个比特后，每隔
/// `check_interval_bits` 个比特检查一次已解码内容中是否出现结束标记，
/// 一旦出现立即停止扫描。周期检查错过的标记仍会在扫描结束后的完整解码中找到。
///
/// # Errors
///
/// 配置无效时返回 [`StegoError::InvalidConfig`]。
pub fn extract(bitmap: &Bitmap, config: &StegoConfig) -> Result<Extraction> {
    let (extraction, scanned) = scan(bitmap, config)?;
    debug!("scanned {scanned} bits");
    Ok(extraction)
}

/// 执行提取扫描，同时返回实际读取的比特数。
fn scan(bitmap: &Bitmap, config: &StegoConfig) -> Result<(Extraction, usize)> {
    config.validate()?;
    let delimiter = encode_latin1(&config.delimiter)?;

    let total_bits = bitmap.pixels().len() * CHANNELS_PER_PIXEL;
    let threshold = total_bits.min(config.scan_window_bits);

    let mut assembler = ByteAssembler::default();
    let mut decoded = Vec::with_capacity(total_bits / BITS_PER_CHAR);
    // 在此位置之前开始的窗口都已确认不是结束标记。
    let mut searched = 0;
    let mut collected = 0;

    for &channel in bitmap.pixels().iter().flatten() {
        if let Some(byte) = assembler.push(channel & 1 == 1) {
            decoded.push(byte);
        }
        collected += 1;

        if collected >= threshold && collected % config.check_interval_bits == 0 {
            if let Some(end) = find_from(&decoded, &delimiter, searched) {
                debug!("delimiter found after scanning {collected} of {total_bits} bits");
                return Ok((Extraction::Found(decode_latin1(&decoded[..end])), collected));
            }
            searched = decoded.len().saturating_sub(delimiter.len() - 1);
        }
    }

    if let Some(end) = find_from(&decoded, &delimiter, searched) {
        debug!("delimiter found after a full scan of {total_bits} bits");
        return Ok((Extraction::Found(decode_latin1(&decoded[..end])), collected));
    }

    debug!("delimiter not found in {total_bits} bits");
    let head = &decoded[..decoded.len().min(FALLBACK_SCAN_CHARS)];
    let fallback = decode_latin1(head)
        .chars()
        .filter(|&c| is_printable(c))
        .take(FALLBACK_MAX_CHARS)
        .collect();
    Ok((Extraction::Uncertain(fallback), collected))
}

fn find_from(haystack: &[u8], needle: &[u8], start: usize) -> Option<usize> {
    haystack
        .get(start..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|offset| start + offset)
}

/// 空格之外的控制字符与分隔符不可打印。
fn is_printable(c: char) -> bool {
    !c.is_control() && !matches!(c, '\u{A0}' | '\u{AD}')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bmp::test_support::build_bmp;
    use std::io::Cursor;

    fn bitmap(width: i32, height: i32, pixel: impl Fn(usize, usize) -> [u8; 3]) -> Bitmap {
        let bytes = build_bmp(width, height, 24, 0, pixel);
        Bitmap::from_reader(Cursor::new(bytes)).unwrap()
    }

    fn noise(row: usize, col: usize) -> [u8; 3] {
        let seed = (row * 31 + col * 17) as u8;
        [seed, seed.wrapping_mul(3), seed.wrapping_add(101)]
    }

    #[test]
    fn capacity_counts_three_bits_per_pixel() {
        assert_eq!(capacity(4, 4), 6);
        assert_eq!(capacity(100, 100), 3750);
        assert_eq!(capacity(2, 2), 1);
        assert_eq!(capacity(1, 1), 0);
    }

    #[test]
    fn message_capacity_subtracts_delimiter() {
        let config = StegoConfig::default();
        assert_eq!(message_capacity(100, 100, &config), 3750 - 9);
        assert_eq!(message_capacity(2, 2, &config), 0);
    }

    #[test]
    fn round_trip_recovers_message() {
        let mut image = bitmap(10, 10, noise);
        let config = StegoConfig::default();

        let written = embed(&mut image, "hi", &config).unwrap();
        assert_eq!(written, (2 + 9) * 8);
        assert_eq!(
            extract(&image, &config).unwrap(),
            Extraction::Found("hi".to_string())
        );
    }

    #[test]
    fn embed_sets_lsbs_in_blue_green_red_order() {
        let mut image = bitmap(8, 8, |_, _| [0xFF, 0xFF, 0xFF]);
        let config = StegoConfig::with_delimiter("#");
        embed(&mut image, "A", &config).unwrap();

        let bits: Vec<u8> = image.pixels().iter().flatten().map(|c| c & 1).collect();
        // "A#" = 0x41 0x23
        assert_eq!(
            &bits[..16],
            &[0, 1, 0, 0, 0, 0, 0, 1, 0, 0, 1, 0, 0, 0, 1, 1]
        );
        assert!(bits[16..].iter().all(|&b| b == 1));
        assert!(image.pixels().iter().flatten().all(|&c| c >= 0xFE));
    }

    #[test]
    fn embed_leaves_remaining_channels_untouched() {
        let original = bitmap(10, 10, noise);
        let mut image = original.clone();
        let written = embed(&mut image, "x", &StegoConfig::default()).unwrap();

        let before: Vec<u8> = original.pixels().iter().flatten().copied().collect();
        let after: Vec<u8> = image.pixels().iter().flatten().copied().collect();
        assert_eq!(&before[written..], &after[written..]);
        assert_eq!(original.header_bytes(), image.header_bytes());
    }

    #[test]
    fn over_capacity_is_rejected_before_mutation() {
        let original = bitmap(2, 2, noise);
        let mut image = original.clone();

        let err = embed(&mut image, "a", &StegoConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            StegoError::Capacity {
                required: 10,
                available: 1
            }
        ));
        assert_eq!(image, original);
    }

    #[test]
    fn unsupported_character_is_rejected_before_mutation() {
        let original = bitmap(20, 20, noise);
        let mut image = original.clone();

        let err = embed(&mut image, "ok ✓", &StegoConfig::default()).unwrap_err();
        assert!(matches!(err, StegoError::UnsupportedCharacter { index: 3, .. }));
        assert_eq!(image, original);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut image = bitmap(10, 10, noise);
        let empty = StegoConfig::with_delimiter("");
        assert!(matches!(
            embed(&mut image, "hi", &empty),
            Err(StegoError::InvalidConfig(_))
        ));

        let zero_interval = StegoConfig {
            check_interval_bits: 0,
            ..StegoConfig::default()
        };
        assert!(matches!(
            extract(&image, &zero_interval),
            Err(StegoError::InvalidConfig(_))
        ));
    }

    #[test]
    fn latin1_message_round_trips() {
        let mut image = bitmap(40, 40, noise);
        let config = StegoConfig::default();
        let message = "Grüße, señor! ¿Qué tal? ÿ";

        embed(&mut image, message, &config).unwrap();
        assert_eq!(extract(&image, &config).unwrap().message(), message);
    }

    #[test]
    fn early_exit_returns_text_before_first_delimiter() {
        let mut image = bitmap(64, 64, noise);
        let config = StegoConfig {
            delimiter: "##".to_string(),
            scan_window_bits: 16,
            check_interval_bits: 8,
        };

        embed(&mut image, "first##second", &config).unwrap();
        assert_eq!(
            extract(&image, &config).unwrap(),
            Extraction::Found("first".to_string())
        );
    }

    #[test]
    fn default_config_stops_early_on_large_image() {
        // 200x200 共 120 000 个比特；从 100 000 开始每 8 000 比特检查一次，
        // 第一次检查发生在 104 000 比特处。
        let mut image = bitmap(200, 200, noise);
        let config = StegoConfig::default();
        embed(&mut image, "hello", &config).unwrap();

        let (extraction, scanned) = scan(&image, &config).unwrap();
        assert_eq!(extraction, Extraction::Found("hello".to_string()));
        assert_eq!(scanned, 104_000);
        assert!(scanned < 200 * 200 * 3);
    }

    #[test]
    fn default_config_scans_small_image_completely() {
        let mut image = bitmap(100, 100, noise);
        let config = StegoConfig::default();
        embed(&mut image, "hello", &config).unwrap();

        let (extraction, scanned) = scan(&image, &config).unwrap();
        assert_eq!(extraction, Extraction::Found("hello".to_string()));
        assert_eq!(scanned, 100 * 100 * 3);
    }

    #[test]
    fn delimiter_missed_by_periodic_checks_is_found_at_the_end() {
        // 96 个通道，检查间隔大于总比特数，因此只有最终解码会看到结束标记。
        let mut image = bitmap(4, 8, noise);
        let config = StegoConfig {
            delimiter: "$".to_string(),
            scan_window_bits: 10,
            check_interval_bits: 1_000,
        };

        embed(&mut image, "abc", &config).unwrap();
        assert_eq!(
            extract(&image, &config).unwrap(),
            Extraction::Found("abc".to_string())
        );
    }

    #[test]
    fn delimiter_spanning_check_boundary_is_found() {
        // 间隔 16 比特 (2 个字符)，结束标记 "XYZ" 跨越检查点。
        let mut image = bitmap(16, 16, noise);
        let config = StegoConfig {
            delimiter: "XYZ".to_string(),
            scan_window_bits: 0,
            check_interval_bits: 16,
        };

        embed(&mut image, "msg", &config).unwrap();
        assert_eq!(extract(&image, &config).unwrap().message(), "msg");
    }

    #[test]
    fn missing_delimiter_yields_uncertain_printable_fallback() {
        let mut image = bitmap(40, 40, |_, _| [0, 0, 0]);
        embed(&mut image, "\u{7}Hi\u{7}", &StegoConfig::default()).unwrap();

        let result = extract(&image, &StegoConfig::with_delimiter("@@")).unwrap();
        assert!(result.is_uncertain());
        assert_eq!(result.message(), "Hi###END###");
    }

    #[test]
    fn fallback_never_exceeds_two_hundred_characters() {
        let mut image = bitmap(100, 100, |_, _| [0, 0, 0]);
        let message = "a".repeat(1_000);
        embed(&mut image, &message, &StegoConfig::default()).unwrap();

        let result = extract(&image, &StegoConfig::with_delimiter("@@")).unwrap();
        assert!(result.is_uncertain());
        assert_eq!(result.into_message(), "a".repeat(200));
    }

    #[test]
    fn untouched_image_is_uncertain() {
        let image = bitmap(50, 50, noise);
        let result = extract(&image, &StegoConfig::default()).unwrap();
        assert!(result.is_uncertain());
        assert!(result.message().chars().count() <= 200);
    }
}
