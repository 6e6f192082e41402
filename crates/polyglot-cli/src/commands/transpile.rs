//! Transpile command - convert a source file to another language.

use super::supported;
use crate::config::{MetadataOutput, PolyglotConfig};
use clap::Args;
use polyglot_syntax::{
    LanguageMetadata, Reader, reader_for_extension, reader_for_language, readers,
    writer_for_language, writers,
};
use std::path::{Path, PathBuf};

/// Transpile command arguments
#[derive(Args, Debug, Default)]
pub struct TranspileArgs {
    /// Input source file
    #[arg(required = true)]
    pub input: Option<PathBuf>,

    /// Source language (detected from the extension if omitted)
    #[arg(short, long)]
    pub source: Option<String>,

    /// Target language
    #[arg(short, long, required = true)]
    pub target: Option<String>,

    /// Output file (defaults to the input stem with the target extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write type metadata to <output>.meta.json instead of comments
    #[arg(long)]
    pub sidecar: bool,
}

/// What a successful run produced.
#[derive(Debug)]
pub struct Transpiled {
    pub source_language: &'static str,
    pub target_language: &'static str,
    pub output_path: PathBuf,
    pub sidecar_path: Option<PathBuf>,
}

/// Run the transpile command
pub fn run(args: &TranspileArgs, config: &PolyglotConfig) -> i32 {
    match transpile(args, config) {
        Ok(done) => {
            eprintln!(
                "Transpiled {} -> {} ({} -> {})",
                args.input.as_deref().unwrap_or(Path::new("-")).display(),
                done.output_path.display(),
                done.source_language,
                done.target_language
            );
            0
        }
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}

/// Resolve languages, parse, generate, then write. Nothing is written
/// unless every earlier step succeeded, and a failed write leaves neither
/// the output nor its sidecar behind.
pub fn transpile(args: &TranspileArgs, config: &PolyglotConfig) -> Result<Transpiled, String> {
    let input = args
        .input
        .as_deref()
        .ok_or_else(|| "no input file given".to_string())?;
    let target = args
        .target
        .as_deref()
        .ok_or_else(|| "no target language given (use --target)".to_string())?;

    let reader = source_reader(input, args.source.as_deref())?;
    let writer = writer_for_language(target).ok_or_else(|| {
        format!(
            "unknown target language '{target}' (supported: {})",
            supported(writers().iter().map(|w| w.language()))
        )
    })?;
    if reader.language() == writer.language() {
        return Err(format!(
            "source and target language are both {}",
            reader.language()
        ));
    }

    let content = std::fs::read_to_string(input)
        .map_err(|e| format!("failed to read {}: {}", input.display(), e))?;
    let sidecar_in = with_suffix(input, config.input.metadata_file());
    let module = match load_sidecar(&sidecar_in)? {
        Some(records) => {
            tracing::debug!(
                "using {} records from {}",
                records.len(),
                sidecar_in.display()
            );
            reader.read_with_metadata(&content, records)
        }
        None => reader.read(&content),
    }
    .map_err(|e| {
        format!(
            "failed to parse {} as {}: {}",
            input.display(),
            reader.language(),
            e
        )
    })?;

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| input.with_extension(writer.extension()));
    if !config.output.overwrite() && output_path.exists() {
        return Err(format!(
            "{} already exists (output.overwrite is false)",
            output_path.display()
        ));
    }

    let (code, sidecar) = if args.sidecar || config.output.metadata() == MetadataOutput::Sidecar {
        let out = writer.write_with_metadata(&module);
        let json = serde_json::to_string_pretty(&out.metadata)
            .map_err(|e| format!("failed to encode metadata: {e}"))?;
        let path = with_suffix(&output_path, config.input.metadata_file());
        (out.code, Some((path, json)))
    } else {
        (writer.write(&module), None)
    };

    // Sidecar first; a failed code write removes it again.
    let sidecar_path = match sidecar {
        Some((path, json)) => {
            std::fs::write(&path, json)
                .map_err(|e| format!("failed to write {}: {}", path.display(), e))?;
            Some(path)
        }
        None => None,
    };
    if let Err(e) = std::fs::write(&output_path, code) {
        if let Some(path) = &sidecar_path {
            if let Err(cleanup) = std::fs::remove_file(path) {
                tracing::warn!("failed to remove {}: {}", path.display(), cleanup);
            }
        }
        return Err(format!("failed to write {}: {}", output_path.display(), e));
    }

    Ok(Transpiled {
        source_language: reader.language(),
        target_language: writer.language(),
        output_path,
        sidecar_path,
    })
}

/// Reader named by `--source`, else the one owning the input's extension.
fn source_reader(input: &Path, source: Option<&str>) -> Result<&'static dyn Reader, String> {
    let names = || supported(readers().iter().map(|r| r.language()));
    match source {
        Some(lang) => reader_for_language(lang)
            .ok_or_else(|| format!("unknown source language '{lang}' (supported: {})", names())),
        None => input
            .extension()
            .and_then(|e| e.to_str())
            .and_then(|e| reader_for_extension(&e.to_ascii_lowercase()))
            .ok_or_else(|| {
                format!(
                    "cannot detect the language of {}; use --source (supported: {})",
                    input.display(),
                    names()
                )
            }),
    }
}

/// `path` with `suffix` appended to its full file name.
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Read a sidecar record list if the file exists.
///
/// Entries that are not objects become empty records so later entries keep
/// their position.
fn load_sidecar(path: &Path) -> Result<Option<Vec<LanguageMetadata>>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    let values: Vec<serde_json::Value> = serde_json::from_str(&content)
        .map_err(|e| format!("invalid metadata file {}: {}", path.display(), e))?;
    Ok(Some(
        values
            .iter()
            .map(|v| LanguageMetadata::from_value(v).unwrap_or_default())
            .collect(),
    ))
}
