//! `push_zip`: package a directory into a zip archive and optionally upload it.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use async_trait::async_trait;
use promptos_core::config::{expand_home, PushZipConfig};
use promptos_core::types::CommandResult;
use reqwest::header::CONTENT_TYPE;
use walkdir::WalkDir;

use crate::action::{is_output, output_marker, Action};
use crate::error::ActionError;

pub struct PushZipAction {
    config: PushZipConfig,
    client: reqwest::Client,
}

impl PushZipAction {
    pub fn new(config: PushZipConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    async fn upload(&self, archive: &Path, url: &str) -> Result<(), ActionError> {
        let bytes = tokio::fs::read(archive).await?;
        tracing::info!(url = %url, size = bytes.len(), "Uploading archive");

        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, "application/zip")
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ActionError::Upload(format!("{}: {}", status, body.trim())));
        }
        Ok(())
    }
}

/// Write every file under `source` into a zip at `output`, skipping entries
/// whose file name is in `exclude`. Returns the number of files written.
pub fn write_archive(
    source: &Path,
    output: &Path,
    exclude: &[String],
) -> Result<usize, ActionError> {
    if !source.is_dir() {
        return Err(ActionError::Archive(format!(
            "source directory {} does not exist",
            source.display()
        )));
    }
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // The archive may live inside the tree being packaged.
    let file = File::create(output)?;
    let marker = output_marker(output);

    let walker = WalkDir::new(source)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !exclude
                    .iter()
                    .any(|name| entry.file_name().to_string_lossy() == name.as_str())
        });

    let mut zip = zip::ZipWriter::new(file);
    let options =
        zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut count = 0;
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() || is_output(entry.path(), marker.as_deref()) {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| ActionError::Archive(e.to_string()))?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        zip.start_file(name, options)?;
        zip.write_all(&std::fs::read(entry.path())?)?;
        count += 1;
    }

    zip.finish()?;
    Ok(count)
}

#[async_trait]
impl Action for PushZipAction {
    fn name(&self) -> &'static str {
        "push_zip"
    }

    async fn run(&self) -> Result<CommandResult, ActionError> {
        let source = expand_home(&self.config.source_dir);
        let output = expand_home(&self.config.output_path);
        let exclude = self.config.exclude.clone();

        tracing::info!(
            source = %source.display(),
            output = %output.display(),
            "Packaging archive"
        );

        let archive_path = output.clone();
        let count =
            tokio::task::spawn_blocking(move || write_archive(&source, &archive_path, &exclude))
                .await
                .map_err(|e| ActionError::Failed(format!("packaging task aborted: {}", e)))??;

        let message = match self.config.upload_url.as_deref() {
            Some(url) => {
                self.upload(&output, url).await?;
                format!("Pacote com {} arquivos enviado para {}", count, url)
            }
            None => format!("Pacote com {} arquivos criado em {}", count, output.display()),
        };

        Ok(CommandResult::success(message).with_speak(self.config.speak))
    }

    fn describe(&self) -> String {
        match &self.config.upload_url {
            Some(url) => format!("Zip {} and upload to {}", self.config.source_dir, url),
            None => format!("Zip {} into {}", self.config.source_dir, self.config.output_path),
        }
    }
}
