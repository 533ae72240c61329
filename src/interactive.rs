//! # 交互式菜单模块
//!
//! 提供三项操作的菜单：隐藏消息、提取消息、退出。
//! 输入与输出均为泛型，既可以连接终端，也可以在测试中使用内存缓冲区。
//! 单次操作失败只会打印错误并回到菜单；输入结束时正常退出。

use crate::bmp::Bitmap;
use crate::handler::uncertain_warning;
use crate::steganography::{StegoConfig, capacity, embed, extract, message_capacity};
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

const RULE: &str = "============================================================";

/// 一次操作结束后菜单应该怎么做。
enum Step {
    Continue,
    Quit,
}

/// 交互式会话。
struct Session<R, W> {
    input: R,
    output: W,
    config: StegoConfig,
}

/// 在给定的输入输出上运行菜单，直到用户选择退出或输入结束。
pub fn run<R: BufRead, W: Write>(input: R, output: W, config: StegoConfig) -> Result<()> {
    config.validate()?;
    Session {
        input,
        output,
        config,
    }
    .run()
}

impl<R: BufRead, W: Write> Session<R, W> {
    fn run(&mut self) -> Result<()> {
        writeln!(self.output, "{RULE}")?;
        writeln!(self.output, "{}", "BMP STEGANOGRAPHY TOOL".bold())?;
        writeln!(self.output, "{RULE}")?;

        loop {
            self.show_menu()?;
            let Some(choice) = self.prompt("\nEnter your choice (1-3): ")? else {
                break;
            };

            let step = match choice.as_str() {
                "1" => self.hide_workflow(),
                "2" => self.extract_workflow(),
                "3" => {
                    writeln!(self.output, "\nGoodbye!")?;
                    break;
                }
                _ => {
                    writeln!(
                        self.output,
                        "{}",
                        "Invalid choice. Please enter 1, 2, or 3".red()
                    )?;
                    Ok(Step::Continue)
                }
            };

            match step {
                Ok(Step::Continue) => {}
                Ok(Step::Quit) => break,
                Err(err) => writeln!(self.output, "\n{} {err:#}", "Error:".red().bold())?,
            }
        }

        self.output.flush()?;
        Ok(())
    }

    fn show_menu(&mut self) -> Result<()> {
        writeln!(self.output, "\n{RULE}")?;
        writeln!(self.output, "MENU:")?;
        writeln!(self.output, "{RULE}")?;
        writeln!(self.output, "  1. Hide a message (Encode)")?;
        writeln!(self.output, "  2. Extract a message (Decode)")?;
        writeln!(self.output, "  3. Exit")?;
        writeln!(self.output, "{RULE}")?;
        Ok(())
    }

    fn hide_workflow(&mut self) -> Result<Step> {
        writeln!(self.output, "\n{}", "ENCODE MODE - Hide Your Message".bold())?;

        let Some(input_path) = self.prompt_path("\nInput BMP file: ", true)? else {
            return Ok(Step::Quit);
        };
        let mut picture = Bitmap::load(&input_path).with_context(|| {
            format!("Unable to load BMP image: {}", input_path.display())
        })?;

        let (width, height) = (picture.width(), picture.height());
        writeln!(
            self.output,
            "Loaded {}x{} BMP. Image can hold up to {} characters",
            width,
            height,
            capacity(width, height).to_string().green()
        )?;

        let Some(message) = self.prompt("\nEnter your secret message:\nMessage: ")? else {
            return Ok(Step::Quit);
        };
        if message.is_empty() {
            writeln!(self.output, "{}", "Message cannot be empty".red())?;
            return Ok(Step::Continue);
        }

        let maximum = message_capacity(width, height, &self.config);
        if message.chars().count() > maximum {
            writeln!(
                self.output,
                "{} Maximum: {} characters",
                "Message too long!".red(),
                maximum
            )?;
            return Ok(Step::Continue);
        }

        let written = embed(&mut picture, &message, &self.config)?;
        writeln!(self.output, "Encoded {written} bits")?;

        let Some(output_path) = self.prompt_path("\nOutput BMP file: ", false)? else {
            return Ok(Step::Quit);
        };
        picture.save(&output_path).with_context(|| {
            format!("Unable to write to target image file: {}", output_path.display())
        })?;

        writeln!(
            self.output,
            "\n{} Message hidden in {}",
            "Success!".green().bold(),
            output_path.display()
        )?;
        Ok(Step::Continue)
    }

    fn extract_workflow(&mut self) -> Result<Step> {
        writeln!(self.output, "\n{}", "DECODE MODE - Extract Hidden Message".bold())?;

        let Some(input_path) = self.prompt_path("\nEncoded BMP file: ", true)? else {
            return Ok(Step::Quit);
        };
        let picture = Bitmap::load(&input_path).with_context(|| {
            format!("Unable to load BMP image: {}", input_path.display())
        })?;
        let extraction = extract(&picture, &self.config)?;

        writeln!(self.output, "\n{RULE}")?;
        writeln!(self.output, "EXTRACTED MESSAGE:")?;
        writeln!(self.output, "{RULE}")?;
        if extraction.is_uncertain() {
            writeln!(self.output, "{}", uncertain_warning())?;
        }
        writeln!(self.output, "{}", extraction.message())?;
        writeln!(self.output, "{RULE}")?;

        let Some(choice) = self.prompt("\nSave message to text file? (y/n): ")? else {
            return Ok(Step::Quit);
        };
        if choice.eq_ignore_ascii_case("y") {
            let Some(file_name) = self.prompt("Output filename: ")? else {
                return Ok(Step::Quit);
            };
            if !file_name.is_empty() {
                fs::write(&file_name, extraction.message())
                    .with_context(|| format!("Unable to write to target text file: {file_name}"))?;
                writeln!(self.output, "Saved to {}", file_name.green())?;
            }
        }

        Ok(Step::Continue)
    }

    /// 打印提示并读取一行，去掉首尾空白。输入结束时返回 `None`。
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// 反复询问路径，直到得到非空路径 (且在 `must_exist` 时文件存在)。
    fn prompt_path(&mut self, label: &str, must_exist: bool) -> Result<Option<PathBuf>> {
        loop {
            let Some(answer) = self.prompt(label)? else {
                return Ok(None);
            };

            if answer.is_empty() {
                writeln!(self.output, "{}", "Path cannot be empty".red())?;
                continue;
            }

            let path = PathBuf::from(answer);
            if must_exist && !path.exists() {
                writeln!(
                    self.output,
                    "{} {}",
                    "File not found:".red(),
                    path.display()
                )?;
                self.list_bmp_hints(Path::new("."))?;
                continue;
            }

            return Ok(Some(path));
        }
    }

    fn list_bmp_hints(&mut self, dir: &Path) -> Result<()> {
        let Ok(entries) = fs::read_dir(dir) else {
            return Ok(());
        };

        let mut candidates: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.to_ascii_lowercase().ends_with(".bmp"))
            .collect();
        candidates.sort();

        if !candidates.is_empty() {
            writeln!(self.output, "   BMP files in current directory:")?;
            for name in candidates {
                writeln!(self.output, "      - {name}")?;
            }
        }
        Ok(())
    }
}
