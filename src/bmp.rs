//! # BMP 编解码模块
//!
//! 读取与写回未压缩的 24 位 BMP 文件。
//!
//! 文件头 (从文件开头到像素数据偏移处的全部字节) 被原样保存为不透明的字节块，
//! 写回时逐字节复制，不会重新计算任何字段。像素行按磁盘上的顺序读取，
//! 不根据高度字段的符号翻转，因此行索引只表示位置。

use crate::constants::{
    BMP_FILE_HEADER_SIZE, BMP_SIGNATURE, CHANNELS_PER_PIXEL, DIB_HEADER_TAIL_SIZE,
    SUPPORTED_BITS_PER_PIXEL,
};
use crate::error::{Result, StegoError};
use log::debug;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// 一个像素，通道顺序为 (Blue, Green, Red)，与磁盘上的字节顺序一致。
pub type Pixel = [u8; CHANNELS_PER_PIXEL];

/// 已加载到内存中的 24 位 BMP 图像。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    header_bytes: Vec<u8>,
    row_padding: usize,
    /// 按行优先顺序平铺存储的像素，长度恒为 `width * height`。
    pixels: Vec<Pixel>,
}

/// 每行像素数据之后的填充字节数，使行长度对齐到 4 字节。
pub fn row_padding(width: usize) -> usize {
    (4 - (width * CHANNELS_PER_PIXEL) % 4) % 4
}

impl Bitmap {
    /// 从文件加载 BMP 图像。
    ///
    /// # Errors
    ///
    /// * 文件无法打开或数据不完整时返回 [`StegoError::Io`]。
    /// * 签名不是 `BM`、位深度不是 24 或尺寸为零时返回 [`StegoError::Format`]。
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let bitmap = Self::from_reader(BufReader::new(file))?;
        debug!(
            "loaded {}x{} bitmap from {}",
            bitmap.width,
            bitmap.height,
            path.display()
        );
        Ok(bitmap)
    }

    /// 从任意可定位的读取器解析 BMP 图像。
    pub fn from_reader<R: Read + Seek>(mut reader: R) -> Result<Self> {
        let mut signature = [0u8; 2];
        reader.read_exact(&mut signature)?;
        if signature != BMP_SIGNATURE {
            return Err(StegoError::Format(format!(
                "expected signature \"BM\", found {signature:02X?}"
            )));
        }

        let _file_size = read_u32(&mut reader)?;
        let mut reserved = [0u8; 4];
        reader.read_exact(&mut reserved)?;
        let data_offset = read_u32(&mut reader)? as usize;
        if data_offset < BMP_FILE_HEADER_SIZE {
            return Err(StegoError::Format(format!(
                "pixel data offset {data_offset} points into the file header"
            )));
        }

        let _dib_header_size = read_u32(&mut reader)?;
        let raw_width = read_i32(&mut reader)?;
        let raw_height = read_i32(&mut reader)?;
        let _color_planes = read_u16(&mut reader)?;
        let bits_per_pixel = read_u16(&mut reader)?;

        if bits_per_pixel != SUPPORTED_BITS_PER_PIXEL {
            return Err(StegoError::Format(format!(
                "only {SUPPORTED_BITS_PER_PIXEL}-bit BMP is supported (got {bits_per_pixel}-bit)"
            )));
        }

        let mut dib_tail = [0u8; DIB_HEADER_TAIL_SIZE];
        reader.read_exact(&mut dib_tail)?;

        // 高度的符号表示行序，这里只取绝对值，行按磁盘顺序读取。
        let width = raw_width.unsigned_abs() as usize;
        let height = raw_height.unsigned_abs() as usize;
        if width == 0 || height == 0 {
            return Err(StegoError::Format(format!(
                "image dimensions must be positive (got {width}x{height})"
            )));
        }

        let row_padding = row_padding(width);
        let row_len = width
            .checked_mul(CHANNELS_PER_PIXEL)
            .and_then(|n| n.checked_add(row_padding));
        let data_end = row_len
            .and_then(|n| n.checked_mul(height))
            .and_then(|n| n.checked_add(data_offset));

        // 先确认文件确实包含声明的数据，再按头部字段分配缓冲区。
        let stream_len = reader.seek(SeekFrom::End(0))?;
        let (Some(row_len), Some(data_end)) = (row_len, data_end) else {
            return Err(StegoError::Format(format!(
                "declared dimensions {width}x{height} are too large"
            )));
        };
        if data_end as u64 > stream_len {
            return Err(StegoError::Io(io::Error::new(
                ErrorKind::UnexpectedEof,
                format!(
                    "header declares {data_end} bytes of header and pixel data, file has {stream_len}"
                ),
            )));
        }

        reader.seek(SeekFrom::Start(0))?;
        let mut header_bytes = vec![0u8; data_offset];
        reader.read_exact(&mut header_bytes)?;
        reader.seek(SeekFrom::Start(data_offset as u64))?;

        let mut row = vec![0u8; row_len];
        let mut pixels = Vec::with_capacity(width * height);

        for _ in 0..height {
            reader.read_exact(&mut row)?;
            pixels.extend(
                row[..width * CHANNELS_PER_PIXEL]
                    .chunks_exact(CHANNELS_PER_PIXEL)
                    .map(|bgr| [bgr[0], bgr[1], bgr[2]]),
            );
        }

        Ok(Self {
            width,
            height,
            header_bytes,
            row_padding,
            pixels,
        })
    }

    /// 将图像写入文件。
    ///
    /// # Errors
    ///
    /// 目标文件无法创建或写入时返回 [`StegoError::Io`]。
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        debug!("saved {}x{} bitmap to {}", self.width, self.height, path.display());
        Ok(())
    }

    /// 先原样写出文件头，再逐行写出像素 (B, G, R) 和零填充字节。
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.header_bytes)?;

        let padding = vec![0u8; self.row_padding];
        for row in self.rows() {
            for pixel in row {
                writer.write_all(pixel)?;
            }
            writer.write_all(&padding)?;
        }

        Ok(())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn row_padding(&self) -> usize {
        self.row_padding
    }

    pub fn header_bytes(&self) -> &[u8] {
        &self.header_bytes
    }

    /// 按磁盘顺序迭代像素行。
    pub fn rows(&self) -> impl Iterator<Item = &[Pixel]> {
        self.pixels.chunks_exact(self.width)
    }

    /// 行优先顺序的全部像素。
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// 行优先顺序的全部像素，可修改通道值但无法改变图像结构。
    pub fn pixels_mut(&mut self) -> &mut [Pixel] {
        &mut self.pixels
    }
}

fn read_u16<R: Read>(reader: &mut R) -> Result<u16> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_i32<R: Read>(reader: &mut R) -> Result<i32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}
