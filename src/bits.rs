//! # 比特打包模块
//!
//! 文本与比特序列之间的确定性、可逆转换。
//! 每个字符固定占用一个字节 (Latin-1)，按高位在前的顺序展开为 8 个比特。

use crate::constants::BITS_PER_CHAR;
use crate::error::{Result, StegoError};

/// 将文本编码为单字节字符序列。
///
/// # Errors
///
/// 任何码点大于 `U+00FF` 的字符都会返回 [`StegoError::UnsupportedCharacter`]，
/// 而不是被截断为低 8 位。
pub fn encode_latin1(text: &str) -> Result<Vec<u8>> {
    text.chars()
        .enumerate()
        .map(|(index, character)| {
            u8::try_from(u32::from(character))
                .map_err(|_| StegoError::UnsupportedCharacter { character, index })
        })
        .collect()
}

/// 将单字节字符序列还原为文本，每个字节映射为同码点的字符。
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// 按高位在前的顺序展开一个字节。
pub fn byte_to_bits(byte: u8) -> impl Iterator<Item = bool> {
    (0..BITS_PER_CHAR).rev().map(move |shift| (byte >> shift) & 1 == 1)
}

/// 将文本转换为比特序列，字符顺序保持不变。
///
/// # Errors
///
/// 与 [`encode_latin1`] 相同。
pub fn text_to_bits(text: &str) -> Result<Vec<bool>> {
    let bytes = encode_latin1(text)?;
    Ok(bytes.into_iter().flat_map(byte_to_bits).collect())
}

/// 将比特序列按 8 位一组转换回文本。
///
/// 末尾不足 8 位的一组会被丢弃，不会补齐。
pub fn bits_to_text(bits: &[bool]) -> String {
    let mut assembler = ByteAssembler::default();
    let bytes: Vec<u8> = bits.iter().filter_map(|&bit| assembler.push(bit)).collect();
    decode_latin1(&bytes)
}

/// 逐比特收集并拼装字节，高位在前。
#[derive(Debug, Default, Clone)]
pub struct ByteAssembler {
    current: u8,
    filled: usize,
}

impl ByteAssembler {
    /// 追加一个比特。凑满 8 位时返回完整的字节并重新开始。
    pub fn push(&mut self, bit: bool) -> Option<u8> {
        self.current = (self.current << 1) | u8::from(bit);
        self.filled += 1;

        if self.filled == BITS_PER_CHAR {
            self.filled = 0;
            Some(std::mem::take(&mut self.current))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_to_bits_is_msb_first() {
        let bits = text_to_bits("A").unwrap();
        // 'A' = 0x41 = 0100_0001
        assert_eq!(
            bits,
            vec![false, true, false, false, false, false, false, true]
        );
    }

    #[test]
    fn bits_to_text_inverts_text_to_bits() {
        let text = "Hello, Wörld! ÿ\u{0}\t~";
        let bits = text_to_bits(text).unwrap();
        assert_eq!(bits.len(), text.chars().count() * 8);
        assert_eq!(bits_to_text(&bits), text);
    }

    #[test]
    fn trailing_partial_group_is_discarded() {
        let mut bits = text_to_bits("ok").unwrap();
        bits.extend([true, false, true]);
        assert_eq!(bits_to_text(&bits), "ok");
        assert_eq!(bits_to_text(&bits[..7]), "");
    }

    #[test]
    fn characters_above_latin1_are_rejected() {
        let err = text_to_bits("ab€").unwrap_err();
        match err {
            StegoError::UnsupportedCharacter { character, index } => {
                assert_eq!(character, '€');
                assert_eq!(index, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn assembler_emits_a_byte_every_eight_bits() {
        let mut assembler = ByteAssembler::default();
        for bit in byte_to_bits(0xA5).take(5) {
            assert_eq!(assembler.push(bit), None);
        }
        let rest: Vec<_> = byte_to_bits(0xA5)
            .skip(5)
            .chain(byte_to_bits(0x3C))
            .filter_map(|bit| assembler.push(bit))
            .collect();
        assert_eq!(rest, vec![0xA5, 0x3C]);
    }
}
