use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;
use std::io::{self, Write};

use bmp_lsb::{
    cli::{Cli, Commands},
    handler::{handle_capacity, handle_hide, handle_recover},
    interactive,
    steganography::StegoConfig,
};

/// 初始化日志：默认只输出警告，`-v` 为 debug，`-vv` 为 trace，
/// `RUST_LOG` 环境变量可以覆盖这一设置。
fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    Builder::new()
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// 程序的主入口点
///
/// 负责解析命令行参数，并根据指定的子命令
/// 将执行分派到相应的处理函数
fn main() -> anyhow::Result<()> {
    // 解析命令行参数
    let cli = Cli::parse();
    init_logger(cli.verbose);

    // 根据子命令调用相应的处理函数
    match cli.command {
        Commands::Hide(args) => handle_hide(args),
        Commands::Recover(args) => handle_recover(args),
        Commands::Capacity(args) => handle_capacity(args),
        Commands::Interactive => {
            interactive::run(io::stdin().lock(), io::stdout().lock(), StegoConfig::default())
        }
    }
}
