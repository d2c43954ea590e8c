//! Label spooler
//!
//! Downloads a purchased label from its URL and hands the bytes to the
//! named printer.

use crate::error::{PrintError, PrintResult};
use crate::printer::Printer;
use crate::registry::PrinterRegistry;
use async_trait::async_trait;
use shared::backend::PrintSpooler;
use shared::error::AppResult;
use shared::models::PrinterInfo;
use std::time::Duration;
use tracing::{info, instrument};

pub struct LabelSpooler {
    registry: PrinterRegistry,
    http: reqwest::Client,
}

impl LabelSpooler {
    pub fn new(registry: PrinterRegistry) -> PrintResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .map_err(|e| PrintError::InvalidConfig(e.to_string()))?;
        Ok(Self { registry, http })
    }

    pub fn registry(&self) -> &PrinterRegistry {
        &self.registry
    }

    async fn download(&self, label_url: &str) -> PrintResult<Vec<u8>> {
        let response = self
            .http
            .get(label_url)
            .send()
            .await
            .map_err(|e| PrintError::Download(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PrintError::Download(format!("{} returned {}", label_url, status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PrintError::Download(e.to_string()))?;
        if bytes.is_empty() {
            return Err(PrintError::Download(format!("{} is empty", label_url)));
        }
        Ok(bytes.to_vec())
    }

    /// Download and print in one step
    #[instrument(skip(self))]
    pub async fn spool(&self, label_url: &str, printer_name: &str) -> PrintResult<()> {
        let printer = self.registry.get(printer_name)?;
        let data = self.download(label_url).await?;
        info!(bytes = data.len(), "Label downloaded");
        printer.print(&data).await
    }
}

#[async_trait]
impl PrintSpooler for LabelSpooler {
    async fn list_printers(&self) -> AppResult<Vec<PrinterInfo>> {
        Ok(self.registry.list())
    }

    async fn print_label(&self, label_url: &str, printer_name: &str) -> AppResult<()> {
        Ok(self.spool(label_url, printer_name).await?)
    }
}
