//! Turns staged modules into named output files and a manifest.

use std::fs;
use std::path::{Component, Path, PathBuf};

use indexmap::IndexMap;
use trellis_config::{
    AssetKind, AssetRule, BuildDescriptor, ChunkAssigner, Externals, OutputNaming, RuleMatcher,
    ServerBuildDescriptor, SplitChunks,
};

use crate::error::{OutputError, Result};
use crate::manifest::Manifest;
use crate::staging::StagedModule;

/// The part of a descriptor the output stage acts on.
#[derive(Debug, Clone)]
pub struct EmitPlan {
    pub entry_chunk: String,
    pub output_dir: PathBuf,
    pub public_path: String,
    pub naming: OutputNaming,
    pub rules: Vec<AssetRule>,
    pub split_chunks: SplitChunks,
    pub max_chunks: Option<usize>,
    pub externals: Option<Externals>,
    pub manifest: Option<PathBuf>,
}

impl From<&BuildDescriptor> for EmitPlan {
    fn from(descriptor: &BuildDescriptor) -> Self {
        Self {
            entry_chunk: descriptor.entry.name.clone(),
            output_dir: descriptor.output.path.clone(),
            public_path: descriptor.output.public_path.clone(),
            naming: descriptor.output.naming.clone(),
            rules: descriptor.rules.clone(),
            split_chunks: descriptor.optimization.split_chunks.clone(),
            max_chunks: None,
            externals: None,
            manifest: descriptor.output.manifest.clone(),
        }
    }
}

impl From<&ServerBuildDescriptor> for EmitPlan {
    fn from(descriptor: &ServerBuildDescriptor) -> Self {
        Self {
            entry_chunk: descriptor.entry.name.clone(),
            output_dir: descriptor.output.path.clone(),
            public_path: descriptor.output.public_path.clone(),
            naming: descriptor.output.naming.clone(),
            rules: descriptor.rules.clone(),
            split_chunks: descriptor.optimization.split_chunks.clone(),
            max_chunks: Some(descriptor.max_chunks),
            externals: Some(descriptor.externals),
            manifest: descriptor.output.manifest.clone(),
        }
    }
}

/// A file written by [`Emitter::emit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedFile {
    /// Manifest key (`main.js`, `styles.css`, `img/logo.png`)
    pub logical_name: String,
    pub file_name: String,
    pub path: PathBuf,
    pub kind: AssetKind,
    pub size: usize,
}

#[derive(Debug, Clone, Default)]
pub struct EmitReport {
    pub files: Vec<EmittedFile>,
    pub manifest: Manifest,
    pub manifest_path: Option<PathBuf>,
    /// Modules left out: externals and media the bundle only references
    pub skipped: usize,
}

impl EmitReport {
    pub fn total_size(&self) -> usize {
        self.files.iter().map(|f| f.size).sum()
    }

    pub fn scripts(&self) -> impl Iterator<Item = &EmittedFile> {
        self.files.iter().filter(|f| f.kind == AssetKind::Script)
    }

    pub fn stylesheets(&self) -> impl Iterator<Item = &EmittedFile> {
        self.files.iter().filter(|f| f.kind == AssetKind::Style)
    }
}

#[derive(Debug, Default)]
struct ChunkContent {
    scripts: Vec<u8>,
    styles: Vec<u8>,
}

impl ChunkContent {
    fn absorb(&mut self, other: ChunkContent) {
        append_module(&mut self.scripts, &other.scripts);
        append_module(&mut self.styles, &other.styles);
    }
}

fn append_module(buffer: &mut Vec<u8>, module: &[u8]) {
    if module.is_empty() {
        return;
    }
    if !buffer.is_empty() && !buffer.ends_with(b"\n") {
        buffer.push(b'\n');
    }
    buffer.extend_from_slice(module);
}

#[derive(Debug)]
struct PendingFile {
    file: EmittedFile,
    content: Vec<u8>,
}

pub struct Emitter<'p> {
    plan: &'p EmitPlan,
    matcher: RuleMatcher<'p>,
    assigner: ChunkAssigner<'p>,
}

impl<'p> Emitter<'p> {
    pub fn new(plan: &'p EmitPlan) -> Result<Self> {
        Ok(Self {
            plan,
            matcher: RuleMatcher::new(&plan.rules)?,
            assigner: plan.split_chunks.assigner()?,
        })
    }

    /// Name and write every output file, then the manifest.
    ///
    /// Nothing is written unless every module is handled by a rule.
    pub fn emit(&self, modules: &[StagedModule]) -> Result<EmitReport> {
        let (pending, manifest, skipped) = self.render(modules)?;

        let mut writes: Vec<(PathBuf, Vec<u8>)> = pending
            .iter()
            .map(|p| (p.file.path.clone(), p.content.clone()))
            .collect();
        if let Some(path) = &self.plan.manifest {
            writes.push((path.clone(), manifest.to_json_pretty().into_bytes()));
        }

        fs::create_dir_all(&self.plan.output_dir).map_err(|source| OutputError::Write {
            path: self.plan.output_dir.clone(),
            source,
        })?;
        write_files_atomic(&writes)?;

        let report = EmitReport {
            files: pending.into_iter().map(|p| p.file).collect(),
            manifest,
            manifest_path: self.plan.manifest.clone(),
            skipped,
        };
        tracing::info!(
            dir = %self.plan.output_dir.display(),
            files = report.files.len(),
            bytes = report.total_size(),
            "emitted bundle"
        );
        Ok(report)
    }

    fn render(&self, modules: &[StagedModule]) -> Result<(Vec<PendingFile>, Manifest, usize)> {
        let plan = self.plan;
        let mut chunks: IndexMap<String, ChunkContent> = IndexMap::new();
        chunks.insert(plan.entry_chunk.clone(), ChunkContent::default());
        let mut assets = Vec::new();
        let mut skipped = 0;

        for module in modules {
            if plan.externals.is_some_and(|ext| ext.excludes(&module.path)) {
                tracing::debug!(path = %module.path.display(), "external, not bundled");
                skipped += 1;
                continue;
            }

            let rule = self
                .matcher
                .classify(&module.path)
                .ok_or_else(|| OutputError::UnhandledModule(module.path.clone()))?;
            if !rule.emit {
                skipped += 1;
                continue;
            }

            match rule.kind {
                AssetKind::Script | AssetKind::Style => {
                    let module_path = module.path.to_string_lossy().replace('\\', "/");
                    let chunk = self.assigner.assign(&module_path, &module.chunk);
                    let content = chunks.entry(chunk.to_string()).or_default();
                    let buffer = if rule.kind == AssetKind::Script {
                        &mut content.scripts
                    } else {
                        &mut content.styles
                    };
                    append_module(buffer, &module.content);
                }
                AssetKind::Font | AssetKind::Image => assets.push((rule.kind, module)),
            }
        }

        if let Some(max) = plan.max_chunks {
            limit_chunks(&mut chunks, max.max(1));
        }

        let mut pending = Vec::new();
        let mut manifest = Manifest::new();

        for (chunk, content) in chunks {
            let initial = self.is_initial(&chunk);
            for (kind, ext, bytes) in [
                (AssetKind::Script, "js", content.scripts),
                (AssetKind::Style, "css", content.styles),
            ] {
                if bytes.is_empty() {
                    continue;
                }
                let template = match (kind, initial) {
                    (AssetKind::Script, true) => &plan.naming.filename,
                    (AssetKind::Script, false) => &plan.naming.chunk_filename,
                    (_, true) => &plan.naming.css_filename,
                    (_, false) => &plan.naming.css_chunk_filename,
                };
                let file_name = template.render(&chunk, ext, &bytes);
                pending.push(self.pending(format!("{chunk}.{ext}"), file_name, kind, bytes)?);
            }
        }

        for (kind, module) in assets {
            // Keyed by staged path: `a/logo.png` and `b/logo.png` are different assets.
            let logical = module.path.to_string_lossy().replace('\\', "/");
            let stem = module
                .path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .ok_or_else(|| OutputError::InvalidFileName(logical.clone()))?;
            let ext = module
                .path
                .extension()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let file_name = plan.naming.asset_filename.render(&stem, &ext, &module.content);
            pending.push(self.pending(logical, file_name, kind, module.content.clone())?);
        }

        for p in &pending {
            manifest.insert(
                p.file.logical_name.clone(),
                format!("{}{}", plan.public_path, p.file.file_name),
            );
        }

        Ok((merge_same_names(pending)?, manifest, skipped))
    }

    fn pending(
        &self,
        logical_name: String,
        file_name: String,
        kind: AssetKind,
        content: Vec<u8>,
    ) -> Result<PendingFile> {
        validate_file_name(&file_name)?;
        Ok(PendingFile {
            file: EmittedFile {
                logical_name,
                path: self.plan.output_dir.join(&file_name),
                file_name,
                kind,
                size: content.len(),
            },
            content,
        })
    }

    /// Entry and cache-group chunks load with the page.
    fn is_initial(&self, chunk: &str) -> bool {
        chunk == self.plan.entry_chunk
            || self
                .plan
                .split_chunks
                .cache_groups
                .iter()
                .any(|group| group.name == chunk)
    }
}

/// Fold trailing chunks into their predecessor until at most `max` remain.
/// The entry chunk is first and always survives.
fn limit_chunks(chunks: &mut IndexMap<String, ChunkContent>, max: usize) {
    while chunks.len() > max {
        let Some((name, tail)) = chunks.pop() else {
            break;
        };
        let Some((into, last)) = chunks.last_mut() else {
            break;
        };
        tracing::debug!(chunk = %name, into = %into, "merged chunk");
        last.absorb(tail);
    }
}

/// Outputs rendered to the same name are written once when their bytes match.
/// Different bytes under one name is an error, raised before anything is written.
fn merge_same_names(pending: Vec<PendingFile>) -> Result<Vec<PendingFile>> {
    let mut merged: IndexMap<String, PendingFile> = IndexMap::with_capacity(pending.len());
    for p in pending {
        match merged.get(&p.file.file_name) {
            Some(existing) if existing.content == p.content => {
                tracing::debug!(
                    file = %p.file.file_name,
                    key = %p.file.logical_name,
                    "identical output, written once"
                );
            }
            Some(existing) => {
                return Err(OutputError::NameConflict {
                    file_name: p.file.file_name,
                    first: existing.file.logical_name.clone(),
                    second: p.file.logical_name,
                });
            }
            None => {
                merged.insert(p.file.file_name.clone(), p);
            }
        }
    }
    Ok(merged.into_values().collect())
}

fn validate_file_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.contains('\\') => Ok(()),
        _ => Err(OutputError::InvalidFileName(name.to_string())),
    }
}

/// Write all files or none: contents go to `.tmp` siblings first and are
/// renamed into place once every write succeeded.
fn write_files_atomic(operations: &[(PathBuf, Vec<u8>)]) -> Result<()> {
    let mut temp_files: Vec<(PathBuf, PathBuf)> = Vec::new();

    for (target, content) in operations {
        if let Some(parent) = target.parent() {
            if let Err(source) = fs::create_dir_all(parent) {
                cleanup_temp_files(&temp_files);
                return Err(OutputError::Write {
                    path: parent.to_path_buf(),
                    source,
                });
            }
        }

        let mut temp_name = target.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp = PathBuf::from(temp_name);
        if let Err(source) = fs::write(&temp, content) {
            cleanup_temp_files(&temp_files);
            return Err(OutputError::Write { path: temp, source });
        }
        temp_files.push((temp, target.clone()));
    }

    for (temp, target) in &temp_files {
        if let Err(source) = fs::rename(temp, target) {
            cleanup_temp_files(&temp_files);
            return Err(OutputError::Write {
                path: target.clone(),
                source,
            });
        }
    }

    Ok(())
}

fn cleanup_temp_files(temp_files: &[(PathBuf, PathBuf)]) {
    for (temp, _) in temp_files {
        if temp.exists() {
            if let Err(e) = fs::remove_file(temp) {
                tracing::warn!(path = %temp.display(), error = %e, "failed to remove temporary file");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use trellis_config::{BuildContext, BuildMode, ProjectLayout};

    fn layout(root: &Path) -> ProjectLayout {
        ProjectLayout {
            static_root: root.join("static"),
            server_output_dir: root.join("build/ssr"),
            ..ProjectLayout::default()
        }
    }

    fn client_plan(mode: BuildMode, root: &Path) -> EmitPlan {
        let ctx = BuildContext::new(mode, 6969, None, layout(root));
        EmitPlan::from(&BuildDescriptor::client(&ctx))
    }

    #[test]
    fn unhandled_module_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let plan = client_plan(BuildMode::Development, temp.path());
        let emitter = Emitter::new(&plan).unwrap();

        let err = emitter
            .emit(&[
                StagedModule::new("main", "index.js", "a()"),
                StagedModule::new("main", "notes.txt", "hi"),
            ])
            .unwrap_err();

        assert!(matches!(err, OutputError::UnhandledModule(p) if p == Path::new("notes.txt")));
        assert!(!plan.output_dir.join("main.js").exists());
    }

    #[test]
    fn development_names_follow_chunks() {
        let temp = TempDir::new().unwrap();
        let plan = client_plan(BuildMode::Development, temp.path());
        let report = Emitter::new(&plan)
            .unwrap()
            .emit(&[
                StagedModule::new("main", "index.jsx", "main()"),
                StagedModule::new("admin", "admin/Users.jsx", "users()"),
                StagedModule::new("main", "logo.png", vec![0x89, b'P', b'N', b'G']),
            ])
            .unwrap();

        let names: Vec<_> = report.files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, ["main.js", "admin.chunk.js", "logo.png"]);
        assert_eq!(report.manifest.get("admin.js"), Some("/dist/admin.chunk.js"));
        assert_eq!(report.manifest.get("logo.png"), Some("/dist/logo.png"));
    }

    #[test]
    fn concatenation_separates_modules() {
        let mut buffer = Vec::new();
        append_module(&mut buffer, b"a()");
        append_module(&mut buffer, b"b()\n");
        append_module(&mut buffer, b"");
        append_module(&mut buffer, b"c()");
        assert_eq!(buffer, b"a()\nb()\nc()");
    }

    #[test]
    fn limit_keeps_entry_first() {
        let mut chunks = IndexMap::new();
        for (name, code) in [("main", "m"), ("a", "a"), ("b", "b")] {
            chunks.insert(
                name.to_string(),
                ChunkContent {
                    scripts: code.as_bytes().to_vec(),
                    styles: Vec::new(),
                },
            );
        }
        limit_chunks(&mut chunks, 1);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks["main"].scripts, b"m\na\nb");
    }

    fn pending_file(logical: &str, file_name: &str, content: &str) -> PendingFile {
        PendingFile {
            file: EmittedFile {
                logical_name: logical.to_string(),
                file_name: file_name.to_string(),
                path: PathBuf::from(file_name),
                kind: AssetKind::Image,
                size: content.len(),
            },
            content: content.as_bytes().to_vec(),
        }
    }

    #[test]
    fn identical_outputs_merge() {
        let merged = merge_same_names(vec![
            pending_file("a/logo.png", "abc.png", "x"),
            pending_file("main.js", "main.js", "m"),
            pending_file("b/logo.png", "abc.png", "x"),
        ])
        .unwrap();
        let names: Vec<_> = merged.iter().map(|p| p.file.logical_name.as_str()).collect();
        assert_eq!(names, ["a/logo.png", "main.js"]);
    }

    #[test]
    fn different_outputs_under_one_name_conflict() {
        let err = merge_same_names(vec![
            pending_file("a/logo.png", "logo.png", "x"),
            pending_file("b/logo.png", "logo.png", "y"),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            OutputError::NameConflict { file_name, first, second }
                if file_name == "logo.png" && first == "a/logo.png" && second == "b/logo.png"
        ));
    }

    #[test]
    fn file_names_must_be_plain() {
        assert!(validate_file_name("main.js").is_ok());
        assert!(validate_file_name("../main.js").is_err());
        assert!(validate_file_name("a/main.js").is_err());
        assert!(validate_file_name("a\\main.js").is_err());
        assert!(validate_file_name("").is_err());
    }

    #[test]
    fn atomic_write_leaves_no_temp_files() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("out/main.js");
        write_files_atomic(&[(target.clone(), b"x".to_vec())]).unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"x");
        assert!(!temp.path().join("out/main.js.tmp").exists());
    }
}
