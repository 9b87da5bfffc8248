//! adts-probe - ADTS 码流信息探测工具
//!
//! 探测文件是否为 AAC ADTS 裸流, 输出轨道信息, 可选列出帧或从指定时间开始读取.

use std::path::Path;
use std::process;

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use adts::logging::{self, LoggingConfig};
use adts_core::AdtsError;
use adts_format::{
    AacExtractor, ExtractorConfig, FileSource, MediaExtractor, MediaTrack, MetaData, ReadOptions,
    TrackMetadata, sniff::sniff_with_config,
};

/// ADTS 码流信息探测工具
#[derive(Parser, Debug)]
#[command(name = "adts-probe", version, about = "AAC ADTS 裸流信息探测工具")]
struct Cli {
    /// 输入文件路径
    input: String,

    /// 列出帧信息
    #[arg(long)]
    frames: bool,

    /// 从指定时间 (微秒) 开始列出帧
    #[arg(long)]
    seek_us: Option<i64>,

    /// 最多列出的帧数
    #[arg(long)]
    limit: Option<usize>,

    /// 输出 JSON 格式
    #[arg(long)]
    json: bool,

    /// 日志级别
    #[arg(long)]
    log_level: Option<String>,

    /// 日志文件目录
    #[arg(long)]
    log_dir: Option<String>,

    /// JSON 配置文件 (logging / extractor 两节)
    #[arg(long)]
    config: Option<String>,
}

/// 配置文件
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProbeConfig {
    logging: LoggingConfig,
    extractor: ExtractorConfig,
}

// ============================================================
// 输出结构体
// ============================================================

/// 完整探测结果
#[derive(Serialize)]
struct ProbeOutput {
    format: FormatInfo,
    track: TrackMetadata,
    meta: MetaData,
    #[serde(skip_serializing_if = "Option::is_none")]
    frames: Option<Vec<FrameInfo>>,
}

/// 格式信息
#[derive(Serialize)]
struct FormatInfo {
    filename: String,
    extractor: &'static str,
    mime: &'static str,
    confidence: f32,
    start_offset: u64,
    nb_tracks: usize,
    nb_frames: usize,
    frame_duration_us: i64,
}

/// 帧信息
#[derive(Serialize)]
struct FrameInfo {
    index: usize,
    pts_us: i64,
    offset: u64,
    size: usize,
}

/// 帧列表选项
struct FrameOptions {
    seek_us: Option<i64>,
    limit: Option<usize>,
}

// ============================================================
// 主逻辑
// ============================================================

fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("错误: {e:#}");
            process::exit(1);
        }
    };
    if let Err(e) = logging::init(&config.logging) {
        eprintln!("错误: 日志初始化失败: {e:#}");
        process::exit(1);
    }

    let frame_options = (cli.frames || cli.seek_us.is_some()).then_some(FrameOptions {
        seek_us: cli.seek_us,
        limit: cli.limit,
    });

    let output = match probe_file(&cli.input, &config.extractor, frame_options.as_ref()) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("错误: {e:#}");
            process::exit(1);
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("错误: JSON 序列化失败: {e}");
                process::exit(1);
            }
        }
    } else {
        print_text(&output);
    }
}

/// 合并配置文件与命令行参数 (命令行优先)
fn load_config(cli: &Cli) -> Result<ProbeConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("读取配置文件失败, path={path}"))?;
            serde_json::from_str(&text).with_context(|| format!("解析配置文件失败, path={path}"))?
        }
        None => ProbeConfig::default(),
    };
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(dir) = &cli.log_dir {
        config.logging.directory = Some(dir.clone());
    }
    Ok(config)
}

/// 探测文件并收集输出
fn probe_file(
    path: &str,
    config: &ExtractorConfig,
    frame_options: Option<&FrameOptions>,
) -> Result<ProbeOutput> {
    let source =
        FileSource::open(Path::new(path)).with_context(|| format!("无法打开文件 '{path}'"))?;

    let Some(sniffed) = sniff_with_config(&source, config).context("探测失败")? else {
        bail!("'{path}' 不是 ADTS 码流");
    };
    info!(
        "格式: {} (置信度 {}, 起始偏移 {})",
        sniffed.mime, sniffed.confidence, sniffed.start_offset
    );

    let extractor = AacExtractor::with_config(&source, sniffed.start_offset, config)
        .context("建立帧索引失败")?;
    if extractor.count_tracks() == 0 {
        bail!("初始化失败: {:?}", extractor.init_check());
    }

    let track = extractor.track_metadata(0)?.clone();
    let mut meta = MetaData::new();
    extractor.get_track_meta_data(0, &mut meta)?;

    let (nb_frames, frame_duration_us) = extractor
        .frame_index()
        .map(|index| (index.len(), index.frame_duration_us()))
        .unwrap_or_default();

    let frames = match frame_options {
        Some(options) => Some(list_frames(&extractor, options)?),
        None => None,
    };

    Ok(ProbeOutput {
        format: FormatInfo {
            filename: path.to_string(),
            extractor: extractor.name(),
            mime: sniffed.mime,
            confidence: sniffed.confidence,
            start_offset: sniffed.start_offset,
            nb_tracks: extractor.count_tracks(),
            nb_frames,
            frame_duration_us,
        },
        track,
        meta,
        frames,
    })
}

/// 读取帧列表
fn list_frames(extractor: &AacExtractor<'_>, options: &FrameOptions) -> Result<Vec<FrameInfo>> {
    let mut reader = extractor.get_track(0)?;
    reader.start()?;

    let limit = options.limit.unwrap_or(usize::MAX);
    let mut frames = Vec::new();
    let mut read_options = options.seek_us.map(ReadOptions::seek).unwrap_or_default();

    while frames.len() < limit {
        let unit = match reader.read(&read_options) {
            Ok(unit) => unit,
            Err(AdtsError::Eof) => break,
            Err(e) => return Err(e).context("读取帧失败"),
        };
        read_options = ReadOptions::default();
        frames.push(FrameInfo {
            index: unit.frame_index,
            pts_us: unit.pts_us,
            offset: unit.offset,
            size: unit.size(),
        });
    }
    reader.stop()?;

    debug!("共读取 {} 帧", frames.len());
    Ok(frames)
}

/// 文本输出
fn print_text(output: &ProbeOutput) {
    let format = &output.format;
    println!("[FORMAT]");
    println!("  文件名       : {}", format.filename);
    println!("  解封装器     : {}", format.extractor);
    println!("  MIME         : {}", format.mime);
    println!("  探测置信度   : {}", format.confidence);
    println!("  起始偏移     : {}", format.start_offset);
    println!("  轨道数       : {}", format.nb_tracks);
    println!("[/FORMAT]");
    println!();

    let track = &output.track;
    println!("[TRACK #0]");
    println!("  MIME         : {}", track.mime);
    println!("  采样率       : {} Hz", track.sample_rate);
    println!("  声道数       : {}", track.channel_count);
    println!("  AAC 对象类型 : {}", track.aac_profile);
    println!(
        "  时长         : {:.3} 秒",
        adts_core::time::us_to_seconds(track.duration_us)
    );
    println!("  帧数         : {}", format.nb_frames);
    println!("  每帧时长     : {} us", format.frame_duration_us);
    println!("  最大输入     : {} 字节", track.max_input_size);
    println!("[/TRACK]");

    if let Some(frames) = &output.frames {
        println!();
        println!("[FRAMES]");
        for frame in frames {
            println!(
                "  #{:<6} pts={:<12} offset={:<10} size={}",
                frame.index, frame.pts_us, frame.offset, frame.size
            );
        }
        println!("[/FRAMES]");
    }
}
