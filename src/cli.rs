//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use crate::constants::DELIMITER;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// 一款基于 LSB (最低有效位) 隐写术的命令行工具，用于在未压缩的 24 位 BMP 图像中隐藏或提取文本。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款基于 LSB (最低有效位) 隐写术的命令行工具，用于在未压缩的 24 位 BMP 图像中隐藏或提取文本。\n消息之后追加结束标记，提取时无需知道消息长度。"
)]
pub struct Cli {
    /// 输出更详细的日志 (-v 为 debug，-vv 为 trace)。也可以通过 RUST_LOG 设置。
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令。
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 在 24 位 BMP 图像中隐藏一段文本。
    Hide(HideArgs),

    /// 从经过隐写的 BMP 图像中提取隐藏的文本。
    Recover(RecoverArgs),

    /// 显示图像可容纳的字符数。
    Capacity(CapacityArgs),

    /// 进入交互式菜单。
    Interactive,
}

/// 'hide' 命令所需的参数。
#[derive(Args, Debug)]
#[command(group(
    clap::ArgGroup::new("payload")
        .required(true)
        .args(["message", "text"])
))]
pub struct HideArgs {
    /// 用于隐写的输入 BMP 图像路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 直接在命令行中给出要隐藏的文本。
    #[arg(short, long)]
    pub message: Option<String>,

    /// 要隐藏的文本内容的文件路径。
    #[arg(short, long)]
    pub text: Option<PathBuf>,

    /// 结果图像的输出路径。省略时为输入图像旁边的 `doctored_<文件名>`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 输出文件已存在时覆盖它。
    #[arg(short, long)]
    pub force: bool,

    /// 追加在消息之后的结束标记。
    #[arg(long, default_value = DELIMITER)]
    pub delimiter: String,
}

/// 'recover' 命令所需的参数。
#[derive(Args, Debug)]
pub struct RecoverArgs {
    /// 已隐藏文本数据的图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 将提取出的文本保存到此路径。省略时只打印到终端。
    #[arg(short, long)]
    pub text: Option<PathBuf>,

    /// 输出文件已存在时覆盖它。
    #[arg(short, long)]
    pub force: bool,

    /// 隐藏时使用的结束标记。
    #[arg(long, default_value = DELIMITER)]
    pub delimiter: String,
}

/// 'capacity' 命令所需的参数。
#[derive(Args, Debug)]
pub struct CapacityArgs {
    /// 要检查的 BMP 图像路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 计算可用消息长度时扣除的结束标记。
    #[arg(long, default_value = DELIMITER)]
    pub delimiter: String,
}
