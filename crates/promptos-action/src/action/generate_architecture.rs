//! `generate_architecture`: write a Markdown overview of a project tree.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use promptos_core::config::{expand_home, ArchitectureConfig};
use promptos_core::types::CommandResult;
use walkdir::{DirEntry, WalkDir};

use crate::action::{is_output, output_marker, Action};
use crate::error::ActionError;

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &["target", "node_modules", "__pycache__"];

pub struct GenerateArchitectureAction {
    config: ArchitectureConfig,
}

impl GenerateArchitectureAction {
    pub fn new(config: ArchitectureConfig) -> Self {
        Self { config }
    }

    fn output_path(&self, project: &Path) -> PathBuf {
        let output = expand_home(&self.config.output_path);
        if output.is_absolute() {
            output
        } else {
            project.join(output)
        }
    }
}

/// A directory line in the rendered tree.
#[derive(Debug)]
struct DirLine {
    relative: PathBuf,
    level: usize,
    name: String,
}

/// What a walk of the project found.
#[derive(Debug, Default)]
struct Survey {
    dirs: Vec<DirLine>,
    files_per_dir: HashMap<PathBuf, usize>,
    extensions: BTreeMap<String, usize>,
    total_files: usize,
}

fn is_listed(entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return true;
    }
    let name = entry.file_name().to_string_lossy();
    if name.starts_with('.') {
        return false;
    }
    !(entry.file_type().is_dir() && SKIPPED_DIRS.iter().any(|dir| *dir == name))
}

/// Walk `project` in name order. Directories down to `max_depth` levels are
/// listed; files are counted in every listed directory and in the root.
fn survey(project: &Path, max_depth: usize, skip: &Path) -> Result<Survey, ActionError> {
    let marker = output_marker(skip);
    let mut survey = Survey::default();

    let walker = WalkDir::new(project)
        .min_depth(1)
        .max_depth(max_depth + 1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(is_listed);

    for entry in walker {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(project)
            .map_err(|e| ActionError::Failed(e.to_string()))?
            .to_path_buf();

        if entry.file_type().is_dir() {
            // The deepest level is only reached to count its parent's files.
            if entry.depth() <= max_depth {
                survey.dirs.push(DirLine {
                    name: entry.file_name().to_string_lossy().to_string(),
                    level: entry.depth() - 1,
                    relative,
                });
            }
        } else if entry.file_type().is_file() && !is_output(entry.path(), marker.as_deref()) {
            let parent = relative.parent().map(Path::to_path_buf).unwrap_or_default();
            *survey.files_per_dir.entry(parent).or_insert(0) += 1;
            survey.total_files += 1;
            let ext = entry
                .path()
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .unwrap_or_else(|| "(sem extensão)".to_string());
            *survey.extensions.entry(ext).or_insert(0) += 1;
        }
    }
    Ok(survey)
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        "arquivo"
    } else {
        "arquivos"
    }
}

/// Render the architecture document for `project`, leaving out `skip`.
pub fn render_document(
    project: &Path,
    max_depth: usize,
    skip: &Path,
) -> Result<String, ActionError> {
    if !project.is_dir() {
        return Err(ActionError::Failed(format!(
            "project directory {} does not exist",
            project.display()
        )));
    }

    let survey = survey(project, max_depth, skip)?;
    let files_in = |dir: &Path| survey.files_per_dir.get(dir).copied().unwrap_or(0);
    let root_files = files_in(Path::new(""));

    let title = project
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
        .unwrap_or_else(|| ".".to_string());

    let mut doc = String::new();
    let _ = writeln!(doc, "# Arquitetura: {}\n", title);
    let _ = writeln!(
        doc,
        "{} {} na raiz, {} {} no total (profundidade máxima {}).\n",
        root_files,
        plural(root_files),
        survey.total_files,
        plural(survey.total_files),
        max_depth
    );
    doc.push_str("## Estrutura\n\n");
    if survey.dirs.is_empty() {
        doc.push_str("_Nenhum subdiretório._\n");
    }
    for dir in &survey.dirs {
        let files = files_in(&dir.relative);
        let _ = writeln!(
            doc,
            "{}- `{}/` ({} {})",
            "  ".repeat(dir.level),
            dir.name,
            files,
            plural(files)
        );
    }
    doc.push_str("\n## Tipos de arquivo\n\n| Extensão | Arquivos |\n|---|---|\n");
    for (ext, count) in &survey.extensions {
        let _ = writeln!(doc, "| {} | {} |", ext, count);
    }
    Ok(doc)
}

#[async_trait]
impl Action for GenerateArchitectureAction {
    fn name(&self) -> &'static str {
        "generate_architecture"
    }

    async fn run(&self) -> Result<CommandResult, ActionError> {
        let project = expand_home(&self.config.project_dir);
        let output = self.output_path(&project);
        let max_depth = self.config.max_depth;

        tracing::info!(
            project = %project.display(),
            output = %output.display(),
            "Generating architecture document"
        );

        let target = output.clone();
        tokio::task::spawn_blocking(move || -> Result<(), ActionError> {
            let doc = render_document(&project, max_depth, &target)?;
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&target, doc)?;
            Ok(())
        })
        .await
        .map_err(|e| ActionError::Failed(format!("generation task aborted: {}", e)))??;

        Ok(
            CommandResult::success(format!("Arquitetura gerada em {}", output.display()))
                .with_speak(self.config.speak),
        )
    }

    fn describe(&self) -> String {
        format!(
            "Describe {} into {}",
            self.config.project_dir, self.config.output_path
        )
    }
}
