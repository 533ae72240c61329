//! # 命令处理逻辑模块
//!
//! 包含处理 `hide`、`recover` 和 `capacity` 子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、调用核心隐写算法以及向用户报告结果。

use crate::bmp::Bitmap;
use crate::cli::{CapacityArgs, HideArgs, RecoverArgs};
use crate::steganography::{StegoConfig, capacity, embed, extract, message_capacity};
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// 处理 'Hide' 命令的执行逻辑。
///
/// 负责读取图像和文本、检查隐写空间是否足够、调用隐写核心函数隐藏消息，
/// 最后将结果写入目标图像文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径与消息来源的 `HideArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入的图像或文本文件，或图像不是 24 位 BMP。
/// * 消息为空，或图像没有足够的空间来隐藏消息。
/// * 目标文件已存在且未指定 `--force`。
/// * 无法写入到目标图像文件。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    let config = StegoConfig::with_delimiter(args.delimiter);
    config.validate()?;

    let mut picture = load_bitmap(&args.image)?;

    let message = match (args.message, &args.text) {
        (Some(message), _) => message,
        (None, Some(text)) => fs::read_to_string(text).with_context(|| {
            format!(
                "Unable to read text file: {}",
                text.to_string_lossy().red().bold()
            )
        })?,
        (None, None) => anyhow::bail!("No message given. Use --message or --text."),
    };

    anyhow::ensure!(!message.is_empty(), "Message cannot be empty.");

    let required_space = message.chars().count();
    let available_space = message_capacity(picture.width(), picture.height(), &config);

    anyhow::ensure!(
        available_space >= required_space,
        "Not enough space in the image to hide the text. \nRequired: {}, Available: {}",
        required_space.to_string().red().bold(),
        available_space.to_string().green().bold()
    );

    let dest = args
        .dest
        .unwrap_or_else(|| default_path(&args.image, "doctored_", None));
    ensure_writable(&dest, args.force)?;

    let written = embed(&mut picture, &message, &config)
        .with_context(|| "Failed to hide the message in the image.")?;

    picture.save(&dest).with_context(|| {
        format!(
            "Unable to write to target image file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The text has been successfully hidden ({} bits) and saved: {}",
        written.to_string().green(),
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Recover' 命令的执行逻辑。
///
/// 负责读取经过隐写的图像文件、调用提取函数获取消息并打印。
/// 未找到结束标记时结果只是猜测，会显示警告。
/// 指定了 `--text` 时还会把消息写入该文件。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入的图像文件，或图像不是 24 位 BMP。
/// * 目标文本文件已存在且未指定 `--force`。
/// * 无法写入到目标文本文件。
pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    let config = StegoConfig::with_delimiter(args.delimiter);
    config.validate()?;

    if let Some(text) = &args.text {
        ensure_writable(text, args.force)?;
    }

    let picture = load_bitmap(&args.image)?;
    let extraction = extract(&picture, &config)?;

    if extraction.is_uncertain() {
        println!("{}", uncertain_warning());
    }
    println!("{}", extraction.message());

    if let Some(text) = &args.text {
        fs::write(text, extraction.into_message()).with_context(|| {
            format!(
                "Unable to write to target text file: {}",
                text.to_string_lossy().red().bold()
            )
        })?;

        println!(
            "The text has been successfully recovered and saved: {}",
            text.to_string_lossy().green().bold()
        );
    }

    Ok(())
}

/// 处理 'Capacity' 命令：打印图像尺寸与可容纳的字符数。
pub fn handle_capacity(args: CapacityArgs) -> Result<()> {
    let config = StegoConfig::with_delimiter(args.delimiter);
    config.validate()?;

    let picture = load_bitmap(&args.image)?;
    let (width, height) = (picture.width(), picture.height());

    println!("Image: {}x{}", width, height);
    println!(
        "Capacity: {} characters ({} usable for the message after the {}-character delimiter)",
        capacity(width, height).to_string().green().bold(),
        message_capacity(width, height, &config).to_string().green().bold(),
        config.delimiter_len()
    );

    Ok(())
}

/// 加载 BMP 图像，并在错误中附上路径。
pub fn load_bitmap(path: &Path) -> Result<Bitmap> {
    Bitmap::load(path).with_context(|| {
        format!(
            "Unable to load BMP image: {}",
            path.to_string_lossy().red().bold()
        )
    })
}

/// 提取结果不确定时显示的警告。
pub fn uncertain_warning() -> String {
    "Warning: delimiter not found. The text below is a best-effort guess."
        .yellow()
        .bold()
        .to_string()
}

/// 在 `source` 所在目录中生成带前缀的默认输出路径，`extension` 为 `None` 时沿用原扩展名。
pub fn default_path(source: &Path, prefix: &str, extension: Option<&str>) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = extension
        .map(str::to_owned)
        .or_else(|| source.extension().map(|e| e.to_string_lossy().into_owned()));

    let file_name = match extension {
        Some(ext) => format!("{prefix}{stem}.{ext}"),
        None => format!("{prefix}{stem}"),
    };
    source.with_file_name(file_name)
}

fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {}. \nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}
