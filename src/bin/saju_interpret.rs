use clap::Parser;
use saju_palja::app::pipelines::{SajuPipeline, SajuRequest};
use saju_palja::config::SajuArgs;
use saju_palja::core::engine::RunReport;
use saju_palja::utils::{logger, validation::Validate};
use saju_palja::{AnalysisEngine, LlmConfig, LocalStorage, OpenAiClient, Result};

async fn run(args: SajuArgs) -> Result<RunReport> {
    args.validate()?;

    // 載入配置，命令列參數優先
    let mut config = LlmConfig::load(args.config.as_deref())?;
    if let Some(output) = args.output {
        config.output.path = output;
    }
    if let Some(model) = args.model {
        tracing::info!("🔧 Text model overridden to: {}", model);
        config.models.text = model;
    }
    config.validate()?;

    let storage = LocalStorage::new(config.output.path.clone());
    let llm = OpenAiClient::from_config(&config)?;
    let request = SajuRequest {
        sex: args.sex,
        birth: args.birth,
        palja: args.palja,
        timezone: args.tz,
        longitude: args.lng,
    };

    let pipeline = SajuPipeline::new(storage, llm, config.models.text.clone(), request);
    AnalysisEngine::new(pipeline).run().await
}

#[tokio::main]
async fn main() {
    let args = SajuArgs::parse();

    logger::init_logger(args.verbose, args.log_json);
    tracing::info!("🚀 Starting saju interpretation");

    match run(args).await {
        Ok(report) => {
            match serde_json::to_string_pretty(&report.summary) {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    eprintln!("❌ {}", e);
                    std::process::exit(3);
                }
            }
            tracing::info!("✅ Done, {} file(s) written", report.saved.len());
        }
        Err(e) => {
            tracing::error!(
                "❌ Saju interpretation failed: {} (Category: {:?})",
                e,
                e.category()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    }
}
