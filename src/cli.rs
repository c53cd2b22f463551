// ============================================================================
// paintcore CLI: headless batch editing via command-line arguments
// ============================================================================
//
// Usage examples:
//   paintcore --input photo.png --script annotate.pcmd --output result.png
//   paintcore -i photo.jpg -o out.png                   (format inferred from output ext)
//   paintcore -i "shots/*.png" --script redact.pcmd --output-dir processed/
//   paintcore --width 320 --height 200 --script logo.pcmd -o logo.png
//   paintcore -i scratch.pcs -o scratch.png              (raw snapshot to PNG)
//
// Everything runs synchronously on the current thread.  Each input gets its
// own EditorSession, so history and clipboard never leak between files.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::io::{is_readable_path, is_writable_extension, load_image, save_image};
use crate::ops::script::run_script;
use crate::session::EditorSession;
use crate::settings::EditorSettings;

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// paintcore headless raster editor.
///
/// Apply command scripts to images and convert between formats.
#[derive(Parser, Debug)]
#[command(
    name = "paintcore",
    version,
    about = "paintcore headless raster editor",
    long_about = "Run paintcore command scripts on image files, or on a blank canvas,\n\
                  and write the result. Reads PNG, JPEG, WEBP, BMP, TGA, ICO and TIFF;\n\
                  writes all of them except WEBP. Raw .pcs snapshots go both ways.\n\n\
                  Example:\n  \
                  paintcore --input photo.png --script annotate.pcmd --output result.png\n  \
                  paintcore --width 640 --height 480 --script draw.pcmd -o drawing.png"
)]
pub struct CliArgs {
    /// Input file(s). Glob patterns accepted (e.g. "*.png", "shots/*.jpg").
    /// Without input a blank canvas is created (see --width/--height).
    #[arg(short, long, num_args = 1..)]
    pub input: Vec<String>,

    /// Command script to run on each image.
    /// If omitted, images are only loaded and re-saved (format conversion).
    #[arg(short, long, value_name = "SCRIPT")]
    pub script: Option<PathBuf>,

    /// Output file path. Only valid for single-file input.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory for batch processing.
    /// Files are written here with the original stem and the --format extension.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Extension used when the output name is derived from the input name
    /// (png, jpg, bmp, tga, ico, tiff or pcs).
    #[arg(short, long, default_value = "png", value_name = "EXT")]
    pub format: String,

    /// Blank canvas width (defaults to the settings file).
    #[arg(long)]
    pub width: Option<u32>,

    /// Blank canvas height (defaults to the settings file).
    #[arg(long)]
    pub height: Option<u32>,

    /// Undo steps kept per session.
    #[arg(long, value_name = "N")]
    pub undo_steps: Option<usize>,

    /// Print every command outcome and per-file timing.
    #[arg(short, long)]
    pub verbose: bool,

    /// Store the effective settings (file plus overrides) as the new defaults.
    #[arg(long)]
    pub save_settings: bool,
}

impl CliArgs {
    /// Settings file values with command-line overrides applied.
    pub fn settings(&self) -> EditorSettings {
        let mut settings = EditorSettings::load();
        if let Some(w) = self.width {
            settings.canvas_width = w;
        }
        if let Some(h) = self.height {
            settings.canvas_height = h;
        }
        if let Some(n) = self.undo_steps {
            settings.max_undo_steps = n;
        }
        settings
    }
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run all CLI processing and return an OS exit code.
/// `0` = all files succeeded, `1` = one or more files failed.
pub fn run(args: CliArgs) -> ExitCode {
    let settings = args.settings();
    if args.save_settings {
        match settings.save() {
            Ok(path) => println!("settings saved to {}", path.display()),
            Err(e) => {
                eprintln!("error: could not save settings: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    let Some(ext) = output_extension(&args.format) else {
        eprintln!("error: cannot write '{}' files.", args.format);
        return ExitCode::FAILURE;
    };

    let script_source: Option<String> = match &args.script {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(src) => Some(src),
            Err(e) => {
                eprintln!("error: could not read script '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };

    // -- Blank canvas mode -------------------------------------------------
    if args.input.is_empty() {
        let Some(output) = args.output.as_deref() else {
            eprintln!("error: --output is required when no --input is given.");
            return ExitCode::FAILURE;
        };
        return match run_one(None, output, script_source.as_deref(), &settings, args.verbose) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let inputs = resolve_inputs(&args.input);
    if inputs.is_empty() {
        eprintln!("error: no input files matched the given pattern(s).");
        return ExitCode::FAILURE;
    }

    if inputs.len() > 1 && args.output.is_some() && args.output_dir.is_none() {
        eprintln!(
            "error: {} input files given but --output only accepts a single file path.\n\
             Use --output-dir to specify a destination directory for batch processing.",
            inputs.len()
        );
        return ExitCode::FAILURE;
    }

    if let Some(dir) = &args.output_dir
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        eprintln!("error: could not create output directory '{}': {}", dir.display(), e);
        return ExitCode::FAILURE;
    }

    let total = inputs.len();
    let multi = total > 1;
    let mut any_failure = false;

    for (idx, input_path) in inputs.iter().enumerate() {
        if multi || args.verbose {
            println!("[{}/{}] {}", idx + 1, total, input_path.display());
        }

        let file_start = Instant::now();

        let Some(output_path) =
            build_output_path(input_path, args.output.as_deref(), args.output_dir.as_deref(), &ext)
        else {
            eprintln!("  error: cannot determine output path for '{}'.", input_path.display());
            any_failure = true;
            continue;
        };

        match run_one(Some(input_path.as_path()), &output_path, script_source.as_deref(), &settings, args.verbose) {
            Ok(()) => {
                if args.verbose || multi {
                    println!(
                        "  -> {} ({:.0}ms)",
                        output_path.display(),
                        file_start.elapsed().as_secs_f64() * 1000.0
                    );
                }
            }
            Err(e) => {
                eprintln!("  error: {}", e);
                log::error!("{}: {}", input_path.display(), e);
                any_failure = true;
            }
        }
    }

    if any_failure { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

// ============================================================================
// Per-file processing pipeline
// ============================================================================

pub fn run_one(
    input: Option<&Path>,
    output: &Path,
    script: Option<&str>,
    settings: &EditorSettings,
    verbose: bool,
) -> Result<(), String> {
    // -- Step 1: Load ----------------------------------------------------
    let mut session = match input {
        Some(path) => {
            let buffer = load_image(path).map_err(|e| format!("load failed: {}", e))?;
            let mut session = EditorSession::from_buffer(buffer, settings.clone());
            if let Some(name) = path.file_name() {
                session.set_name(name.to_string_lossy());
            }
            session
        }
        None => EditorSession::new(settings.clone()).map_err(|e| format!("cannot create canvas: {}", e))?,
    };

    // -- Step 2: Run script (optional) -----------------------------------
    if let Some(src) = script {
        let outcomes = run_script(&mut session, src).map_err(|e| format!("script error: {}", e))?;
        if verbose {
            for outcome in &outcomes {
                println!("  [script] {}", outcome);
            }
        }
    }

    // -- Step 3: Save ----------------------------------------------------
    // A placement still floating at the end of the script is kept in the output.
    let result = session.preview();
    save_image(&result, output).map_err(|e| format!("save failed: {}", e))?;
    drop(result);
    session.mark_saved();

    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Expand glob patterns and literal paths into loadable files, in argument
/// order with duplicates dropped.  Glob matches are sorted; directories and
/// files paintcore cannot decode are skipped with a warning.
pub fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let literal = Path::new(pattern);
        if literal.exists() {
            push_input(literal.to_path_buf(), &mut result);
            continue;
        }

        let mut matches: Vec<PathBuf> = match glob::glob(pattern) {
            Ok(entries) => entries.flatten().collect(),
            Err(e) => {
                log::warn!("invalid glob '{}': {}", pattern, e);
                continue;
            }
        };
        if matches.is_empty() {
            log::warn!("pattern '{}' matched no files", pattern);
        }
        matches.sort();
        for path in matches {
            push_input(path, &mut result);
        }
    }

    result
}

fn push_input(path: PathBuf, result: &mut Vec<PathBuf>) {
    if !path.is_file() || !is_readable_path(&path) {
        log::warn!("skipping '{}': not a readable image", path.display());
    } else if !result.contains(&path) {
        result.push(path);
    }
}

/// Normalize `--format` (`png`, `.JPG`, `pcs`, ...) to a writable extension.
pub fn output_extension(format: &str) -> Option<String> {
    let ext = format.trim_start_matches('.').to_ascii_lowercase();
    is_writable_extension(&ext).then_some(ext)
}

/// Where one input's result goes.
///
/// An explicit `--output` wins.  Otherwise the input stem gets `ext`, inside
/// `--output-dir` when given or next to the input.  A name that would
/// replace the input itself gets an `_edited` suffix, so a `.pcs` snapshot
/// converted to `pcs` never overwrites its source.
pub fn build_output_path(input: &Path, output: Option<&Path>, output_dir: Option<&Path>, ext: &str) -> Option<PathBuf> {
    if let Some(out) = output {
        return Some(out.to_path_buf());
    }

    let stem = input.file_stem()?.to_string_lossy().into_owned();
    let dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };

    let candidate = dir.join(format!("{}.{}", stem, ext));
    if candidate == input {
        Some(dir.join(format!("{}_edited.{}", stem, ext)))
    } else {
        Some(candidate)
    }
}
