use crate::core::Storage;
use crate::utils::error::Result;
use chrono::{DateTime, Local, TimeZone};
use std::path::Path;
use tokio::fs;

/// `{prefix}_{YYYYMMDD_HHMMSS}.{ext}`
pub fn timestamped_name<Tz: TimeZone>(prefix: &str, ext: &str, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}_{}.{}", prefix, now.format("%Y%m%d_%H%M%S"), ext)
}

pub fn timestamped_name_now(prefix: &str, ext: &str) -> String {
    timestamped_name(prefix, ext, &Local::now())
}

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = fs::read(full_path).await?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(full_path, data).await?;
        Ok(())
    }
}
