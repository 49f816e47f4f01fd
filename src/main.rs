//! makeit 命令行入口
//!
//! 组装适配器（Gemini 或离线 Fake）并调用应用层 Handler

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use makeit::application::ports::{
    GuideStoragePort, ImageGeneratorPort, MediaCachePort, TtsEnginePort, VisionAnalyzerPort,
};
use makeit::application::{
    CreateGuide, CreateGuideHandler, ExportGuide, ExportGuideHandler, ExportScore,
    ExportScoreHandler, GetNarrationHandler, GetNarrationQuery, Pacing, ScoreResult,
    ScoreResultHandler,
};
use makeit::config::{load_config, print_config, AppConfig};
use makeit::domain::guide::{slugify, GuideMode, GuideSession, UploadedImage};
use makeit::domain::image::{encode_png, split_composite_nonempty, Quadrant};
use makeit::infrastructure::adapters::fake::{
    FakeImageGenerator, FakeTtsClient, FakeVisionAnalyzer,
};
use makeit::infrastructure::adapters::gemini::{
    GeminiClient, GeminiClientConfig, GeminiImageGenerator, GeminiTtsClient,
    GeminiVisionAnalyzer,
};
use makeit::infrastructure::adapters::{
    FileGuideStorage, ImageprocComparisonRenderer, MiniJinjaProtocolExporter,
};
use makeit::infrastructure::memory::InMemoryMediaCache;
use makeit::infrastructure::persistence::SledMediaStore;

#[derive(Parser, Debug)]
#[command(name = "makeit", version, about = "Turn a photo into a step-by-step guide")]
struct Args {
    /// Explicit configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use deterministic offline adapters instead of Gemini
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a making guide for the object in the photo
    Make {
        photo: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Build a recipe for the dish in the photo
    Cook {
        photo: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Find where to get a product or how to visit a landmark
    Find {
        photo: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Score a result photo against a saved guide
    Score {
        result: PathBuf,
        #[arg(long)]
        guide: PathBuf,
    },
    /// Narrate text to a WAV file
    Narrate {
        text: String,
        #[arg(long)]
        out: PathBuf,
    },
    /// Split a 2x2 composite image into four PNGs
    Split {
        composite: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
}

/// 上游适配器
struct Upstream {
    analyzer: Arc<dyn VisionAnalyzerPort>,
    generator: Arc<dyn ImageGeneratorPort>,
    tts: Arc<dyn TtsEnginePort>,
}

impl Upstream {
    fn build(config: &AppConfig, offline: bool) -> anyhow::Result<Self> {
        if offline {
            tracing::info!("Using offline adapters");
            return Ok(Self {
                analyzer: Arc::new(FakeVisionAnalyzer::with_defaults()),
                generator: Arc::new(FakeImageGenerator::new()),
                tts: Arc::new(FakeTtsClient::with_defaults()),
            });
        }

        let client = Arc::new(
            GeminiClient::new(GeminiClientConfig {
                api_key: config.gemini.api_key.clone(),
                base_url: config.gemini.base_url.clone(),
                timeout_secs: config.gemini.timeout_secs,
            })
            .context("Set MAKEIT_GEMINI__API_KEY or pass --offline")?,
        );

        Ok(Self {
            analyzer: Arc::new(GeminiVisionAnalyzer::new(
                client.clone(),
                &config.gemini.text_model,
            )),
            generator: Arc::new(GeminiImageGenerator::new(
                client.clone(),
                &config.gemini.image_model,
            )),
            tts: Arc::new(GeminiTtsClient::new(client, &config.gemini.tts_model)),
        })
    }
}

async fn image_cache(config: &AppConfig) -> anyhow::Result<Arc<dyn MediaCachePort>> {
    if !config.cache.persist_images {
        return Ok(InMemoryMediaCache::new().arc());
    }

    if let Some(parent) = Path::new(&config.cache.db_path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let store = SledMediaStore::open(&config.cache.db_path)?.arc();
    Ok(InMemoryMediaCache::persistent(store).await?.arc())
}

fn narration_handler(
    config: &AppConfig,
    upstream: &Upstream,
    pacing: Pacing,
) -> GetNarrationHandler {
    GetNarrationHandler::new(
        upstream.tts.clone(),
        InMemoryMediaCache::new().arc(),
        config.gemini.voice.clone(),
        pacing,
    )
}

async fn read_photo(path: &Path) -> anyhow::Result<UploadedImage> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    UploadedImage::from_bytes(bytes).with_context(|| format!("{} is not an image", path.display()))
}

async fn run_guide(
    config: &AppConfig,
    upstream: &Upstream,
    mode: GuideMode,
    photo: &Path,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let pacing = Pacing::from_millis(config.pacing.delay_ms);
    let photo = read_photo(photo).await?;

    let create = CreateGuideHandler::new(
        upstream.analyzer.clone(),
        upstream.generator.clone(),
        image_cache(config).await?,
        pacing,
        config.output.fallback,
    );
    let session = create.handle(CreateGuide { mode, photo }).await?;
    let original = session.original().clone();
    let protocol = session
        .into_protocol()
        .context("Guide generation produced no protocol")?;

    let narrations = narration_handler(config, upstream, pacing)
        .preload(&protocol)
        .await?;

    let guide_dir = out.unwrap_or_else(|| config.output.dir.join(slugify(&protocol.item_name)));
    let storage = Arc::new(FileGuideStorage::new(&guide_dir).await?);
    let export = ExportGuideHandler::new(storage, Arc::new(MiniJinjaProtocolExporter::new()));
    let response = export
        .handle(ExportGuide {
            protocol,
            original,
            narrations,
        })
        .await?;

    println!("Guide written to {}", response.guide_dir.display());
    println!("Open {}", response.html_path.display());
    Ok(())
}

async fn run_score(
    config: &AppConfig,
    upstream: &Upstream,
    result: &Path,
    guide: &Path,
) -> anyhow::Result<()> {
    let pacing = Pacing::from_millis(config.pacing.delay_ms);
    let storage = Arc::new(FileGuideStorage::new(guide).await?);
    let stored = storage
        .load_guide()
        .await
        .with_context(|| format!("No saved guide in {}", guide.display()))?;
    let mut session = GuideSession::resume(stored.protocol, stored.original);

    let score = ScoreResultHandler::new(
        upstream.analyzer.clone(),
        Arc::new(narration_handler(config, upstream, pacing)),
        Arc::new(ImageprocComparisonRenderer::new()),
        pacing,
    );
    let response = score
        .handle(
            &mut session,
            ScoreResult {
                photo: read_photo(result).await?,
            },
        )
        .await?;

    for axis in response.analysis.scores.axes() {
        println!("{:<24} {}/5", axis.label, axis.score);
    }
    println!("Average: {:.1}", response.analysis.scores.average());
    println!("{}", response.analysis.feedback);

    let export = ExportScoreHandler::new(storage);
    let written = export
        .handle(ExportScore {
            analysis: response.analysis,
            feedback_audio: response.feedback_audio,
            comparison: response.comparison,
        })
        .await?;
    println!("Feedback: {}", written.feedback_path.display());
    println!("Comparison: {}", written.comparison_path.display());
    Ok(())
}

async fn run_narrate(
    config: &AppConfig,
    upstream: &Upstream,
    text: String,
    out: &Path,
) -> anyhow::Result<()> {
    let handler = narration_handler(config, upstream, Pacing::none());
    let key = format!("narrate-{}", text);
    let response = handler.handle(GetNarrationQuery::new(text, key)).await?;
    tokio::fs::write(out, &response.wav).await?;
    println!("Wrote {} ({} bytes)", out.display(), response.wav.len());
    Ok(())
}

async fn run_split(composite: &Path, out: &Path) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(composite)
        .await
        .with_context(|| format!("Failed to read {}", composite.display()))?;
    let quadrants = split_composite_nonempty(&bytes)
        .with_context(|| format!("Cannot split {}", composite.display()))?;
    tokio::fs::create_dir_all(out).await?;

    for (quadrant, image) in Quadrant::ALL.iter().zip(quadrants.iter()) {
        let path = out.join(format!("quadrant-{}.png", quadrant.index() + 1));
        tokio::fs::write(&path, encode_png(image)?).await?;
        println!("{}", path.display());
    }
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("warn,makeit={}", config.log.level))
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config(args.config.as_deref())
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);
    print_config(&config);

    if let Command::Split { composite, out } = &args.command {
        return run_split(composite, out).await;
    }

    let upstream = Upstream::build(&config, args.offline)?;

    match args.command {
        Command::Make { photo, out } => {
            run_guide(&config, &upstream, GuideMode::Make, &photo, out).await
        }
        Command::Cook { photo, out } => {
            run_guide(&config, &upstream, GuideMode::Cook, &photo, out).await
        }
        Command::Find { photo, out } => {
            run_guide(&config, &upstream, GuideMode::Find, &photo, out).await
        }
        Command::Score { result, guide } => run_score(&config, &upstream, &result, &guide).await,
        Command::Narrate { text, out } => run_narrate(&config, &upstream, text, &out).await,
        Command::Split { .. } => Ok(()),
    }
}
