use clap::Parser;
use saju_palja::app::pipelines::{PhysiognomyModels, PhysiognomyPipeline, PhysiognomyRequest};
use saju_palja::config::FaceArgs;
use saju_palja::core::engine::RunReport;
use saju_palja::utils::{logger, validation::Validate};
use saju_palja::{AnalysisEngine, LlmConfig, LocalStorage, OpenAiClient, Result};
use std::path::PathBuf;

async fn run(args: FaceArgs) -> Result<RunReport> {
    args.validate()?;

    let mut config = LlmConfig::load(args.config.as_deref())?;
    if let Some(output) = args.output {
        config.output.path = output;
    }
    if let Some(model) = args.vision_model {
        tracing::info!("🔧 Vision model overridden to: {}", model);
        config.models.vision = model;
    }
    config.validate()?;

    let storage = LocalStorage::new(config.output.path.clone());
    let llm = OpenAiClient::from_config(&config)?;
    let request = PhysiognomyRequest {
        image_path: PathBuf::from(&args.image),
        sex: args.sex,
        age: args.age,
        partner_image: args.partner_image,
    };

    let models = PhysiognomyModels::from(&config);
    let pipeline = PhysiognomyPipeline::new(storage, llm, models, request);
    AnalysisEngine::new(pipeline).run().await
}

#[tokio::main]
async fn main() {
    let args = FaceArgs::parse();

    logger::init_logger(args.verbose, args.log_json);
    tracing::info!("🚀 Starting face reading for {}", args.image);

    match run(args).await {
        Ok(report) => {
            match serde_json::to_string_pretty(&report.summary) {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    eprintln!("❌ {}", e);
                    std::process::exit(3);
                }
            }
            for name in &report.saved {
                tracing::info!("📁 {}", name);
            }
        }
        Err(e) => {
            tracing::error!("❌ Face reading failed: {} (Category: {:?})", e, e.category());
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    }
}
