//! Document conversion orchestration.
//!
//! Wraps the normalization engine with the surrounding pipeline: stage the
//! normalized Markdown into a temporary file, run Pandoc against the style
//! template and layout filter, optionally merge the cover/TOC page from the
//! template, and move the artifact to its timestamped final name.
//!
//! Both external tools are opaque processes judged by their exit status.
//! Temporary artifacts live next to the input file and are removed on every
//! exit path, success or failure.

use crate::error::{Error, Result};
use crate::frontmatter;
use crate::normalize::{normalize_with_report, NormalizeOptions, NormalizeReport};
use chrono::Local;
use log::debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Options for the conversion pipeline.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Pandoc executable to invoke.
    pub pandoc_program: PathBuf,

    /// Reference `.docx` carrying the output styles (and the cover/TOC
    /// page when a merge tool is configured).
    pub reference_doc: PathBuf,

    /// Lua filter applying layout rules during conversion.
    pub lua_filter: Option<PathBuf>,

    /// Cover/TOC merge tool, invoked as
    /// `<tool> <reference_doc> <artifact> <artifact> [--title <title>]`.
    pub merge_tool: Option<PathBuf>,

    /// Explicit output path. When unset the artifact lands next to the
    /// input as `<stem>_<timestamp>.docx`.
    pub output: Option<PathBuf>,

    /// Keep the normalized intermediate Markdown for inspection.
    pub keep_intermediate: bool,

    /// Normalization options applied before conversion.
    pub normalize: NormalizeOptions,
}

impl ConvertOptions {
    /// Creates options for the given reference template.
    pub fn new(reference_doc: impl Into<PathBuf>) -> Self {
        Self {
            pandoc_program: PathBuf::from("pandoc"),
            reference_doc: reference_doc.into(),
            lua_filter: None,
            merge_tool: None,
            output: None,
            keep_intermediate: false,
            normalize: NormalizeOptions::default(),
        }
    }

    /// Sets the Pandoc executable.
    pub fn with_pandoc_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.pandoc_program = program.into();
        self
    }

    /// Sets the Lua layout filter.
    pub fn with_lua_filter(mut self, filter: impl Into<PathBuf>) -> Self {
        self.lua_filter = Some(filter.into());
        self
    }

    /// Sets the cover/TOC merge tool.
    pub fn with_merge_tool(mut self, tool: impl Into<PathBuf>) -> Self {
        self.merge_tool = Some(tool.into());
        self
    }

    /// Sets an explicit output path.
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Keeps the normalized intermediate Markdown next to the input.
    pub fn keep_intermediate(mut self) -> Self {
        self.keep_intermediate = true;
        self
    }

    /// Sets the normalization options.
    pub fn with_normalize_options(mut self, options: NormalizeOptions) -> Self {
        self.normalize = options;
        self
    }
}

/// What a conversion run produced.
#[derive(Debug)]
pub struct ConvertOutcome {
    /// Final artifact path.
    pub output: PathBuf,
    /// Title extracted from front-matter, if any.
    pub title: Option<String>,
    /// Report from the normalization pass.
    pub report: NormalizeReport,
}

/// Runs the full pipeline: normalize, convert, merge, rename.
pub fn convert_file(input: impl AsRef<Path>, options: &ConvertOptions) -> Result<ConvertOutcome> {
    let input = input.as_ref();

    if !options.reference_doc.is_file() {
        return Err(Error::MissingComponent(format!(
            "reference template not found: {}",
            options.reference_doc.display()
        )));
    }
    if let Some(filter) = &options.lua_filter {
        if !filter.is_file() {
            return Err(Error::MissingComponent(format!(
                "layout filter not found: {}",
                filter.display()
            )));
        }
    }
    if let Some(tool) = &options.merge_tool {
        if !tool.is_file() {
            return Err(Error::MissingComponent(format!(
                "merge tool not found: {}",
                tool.display()
            )));
        }
    }

    let source = fs::read_to_string(input)?;
    let (normalized, report) = normalize_with_report(&source, &options.normalize)?;
    let title = frontmatter::extract_title(&normalized);

    let work_dir = match input.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    // ASCII-named temporaries in the input's directory sidestep tool
    // trouble with non-ASCII paths; both are deleted on drop if any later
    // step fails.
    let staged = tempfile::Builder::new()
        .prefix("mdpress-input-")
        .suffix(".md")
        .tempfile_in(work_dir)?;
    fs::write(staged.path(), &normalized)?;

    let artifact = tempfile::Builder::new()
        .prefix("mdpress-output-")
        .suffix(".docx")
        .tempfile_in(work_dir)?;

    run_pandoc(options, staged.path(), artifact.path())?;

    if options.merge_tool.is_some() {
        run_merge(options, artifact.path(), title.as_deref())?;
    }

    let output = match &options.output {
        Some(path) => path.clone(),
        None => default_output_path(input, work_dir),
    };

    if options.keep_intermediate {
        let (_, kept) = staged.keep().map_err(|e| Error::Io(e.error))?;
        debug!("kept intermediate markdown at {}", kept.display());
    }

    artifact
        .persist(&output)
        .map_err(|e| Error::Io(e.error))?;

    Ok(ConvertOutcome {
        output,
        title,
        report,
    })
}

fn run_pandoc(options: &ConvertOptions, input: &Path, output: &Path) -> Result<()> {
    let mut cmd = Command::new(&options.pandoc_program);
    cmd.arg(input)
        .arg("-o")
        .arg(output)
        .arg(format!(
            "--reference-doc={}",
            options.reference_doc.display()
        ))
        .arg("--standalone");
    if let Some(filter) = &options.lua_filter {
        cmd.arg(format!("--lua-filter={}", filter.display()));
    }

    debug!("running {:?}", cmd);
    let status = cmd.status().map_err(|e| spawn_error(e, &options.pandoc_program))?;
    if !status.success() {
        return Err(Error::Conversion(format!(
            "{} exited with {}",
            options.pandoc_program.display(),
            status
        )));
    }
    Ok(())
}

fn run_merge(options: &ConvertOptions, artifact: &Path, title: Option<&str>) -> Result<()> {
    let Some(tool) = &options.merge_tool else {
        return Ok(());
    };

    let mut cmd = Command::new(tool);
    cmd.arg(&options.reference_doc).arg(artifact).arg(artifact);
    if let Some(title) = title {
        cmd.arg("--title").arg(title);
    }

    debug!("running {:?}", cmd);
    let status = cmd.status().map_err(|e| spawn_error(e, tool))?;
    if !status.success() {
        return Err(Error::Merge(format!(
            "{} exited with {}",
            tool.display(),
            status
        )));
    }
    Ok(())
}

fn spawn_error(err: io::Error, program: &Path) -> Error {
    if err.kind() == io::ErrorKind::NotFound {
        Error::MissingComponent(format!("cannot execute {}", program.display()))
    } else {
        Error::Io(err)
    }
}

fn default_output_path(input: &Path, work_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    work_dir.join(format!("{}_{}.docx", stem, timestamp()))
}

fn timestamp() -> String {
    Local::now().format("%Y-%m-%dT%H-%M-%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_template_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.md");
        fs::write(&input, "正文").unwrap();

        let options = ConvertOptions::new(dir.path().join("absent.docx"));
        match convert_file(&input, &options) {
            Err(Error::MissingComponent(msg)) => assert!(msg.contains("absent.docx")),
            other => panic!("expected missing-component error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_filter_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.md");
        fs::write(&input, "正文").unwrap();
        let template = dir.path().join("style.docx");
        fs::write(&template, b"stub").unwrap();

        let options =
            ConvertOptions::new(&template).with_lua_filter(dir.path().join("absent.lua"));
        match convert_file(&input, &options) {
            Err(Error::MissingComponent(msg)) => assert!(msg.contains("absent.lua")),
            other => panic!("expected missing-component error, got {other:?}"),
        }
    }

    #[test]
    fn test_timestamp_shape() {
        let stamp = timestamp();
        assert_eq!(stamp.len(), 19);
        assert_eq!(&stamp[4..5], "-");
        assert_eq!(&stamp[10..11], "T");
        assert!(!stamp.contains(':'));
    }

    #[test]
    fn test_default_output_path_uses_stem() {
        let path = default_output_path(Path::new("/tmp/报告.md"), Path::new("/tmp"));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("报告_"));
        assert!(name.ends_with(".docx"));
    }

    #[cfg(unix)]
    fn fake_tool(dir: &Path, name: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "#!/bin/sh\nexit 0").unwrap();
        let mut perms = file.metadata().unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[cfg(unix)]
    fn failing_tool(dir: &Path, name: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "#!/bin/sh\nexit 3").unwrap();
        let mut perms = file.metadata().unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[test]
    #[cfg(unix)]
    fn test_pipeline_with_stub_tools() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.md");
        fs::write(&input, "---\ntitle: 测试 报告\n---\n\n数据 123\n").unwrap();
        let template = dir.path().join("style.docx");
        fs::write(&template, b"stub").unwrap();
        let output = dir.path().join("final.docx");

        let options = ConvertOptions::new(&template)
            .with_pandoc_program(fake_tool(dir.path(), "fake-pandoc"))
            .with_merge_tool(fake_tool(dir.path(), "fake-merge"))
            .with_output(&output);

        let outcome = convert_file(&input, &options).unwrap();
        assert_eq!(outcome.output, output);
        assert!(output.exists());
        // Normalization ran before title extraction.
        assert_eq!(outcome.title.as_deref(), Some("测试报告"));
        assert_eq!(outcome.report.lines_rewritten, 2);

        // No temporaries left behind.
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("mdpress-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    #[cfg(unix)]
    fn test_failing_converter_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.md");
        fs::write(&input, "正文\n").unwrap();
        let template = dir.path().join("style.docx");
        fs::write(&template, b"stub").unwrap();

        let options = ConvertOptions::new(&template)
            .with_pandoc_program(failing_tool(dir.path(), "fail-pandoc"));

        match convert_file(&input, &options) {
            Err(Error::Conversion(msg)) => assert!(msg.contains("fail-pandoc")),
            other => panic!("expected conversion error, got {other:?}"),
        }

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("mdpress-"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
