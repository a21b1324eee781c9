use crate::domain::model::{
    AnalysisResult, DayInfo, ImageRequest, LlmReply, TextRequest, VisionRequest,
};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Solar-date oracle: sexagenary pillars and solar-term presence for a civil date.
pub trait CalendarOracle: Send + Sync {
    fn day_info(&self, year: i32, month: u32, day: u32) -> Result<DayInfo>;
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete_text(&self, req: TextRequest) -> Result<LlmReply>;
    async fn complete_vision(&self, req: VisionRequest) -> Result<LlmReply>;
    async fn generate_image(&self, req: ImageRequest) -> Result<Vec<u8>>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    type Extracted: Send;

    async fn extract(&self) -> Result<Self::Extracted>;
    async fn transform(&self, data: Self::Extracted) -> Result<AnalysisResult>;
    async fn load(&self, result: AnalysisResult) -> Result<Vec<String>>;
}
