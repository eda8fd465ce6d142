use page_detector::diagnostics::DetectionReport;
use page_detector::image::io::{load_grayscale_image, save_grayscale_u8, write_json_file};
use page_detector::kernels::ReferenceKernels;
use page_detector::{prepare_processing_image, Enhancement, PageDetector, ScanParams};
use std::env;
use std::path::PathBuf;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let program = env::args()
        .next()
        .unwrap_or_else(|| "page_demo".to_string());
    let config = parse_args(&program)?;

    let gray = load_grayscale_image(&config.input_path)?;

    let mut params = ScanParams::default();
    params.use_fallback = !config.no_fallback;

    let kernels = ReferenceKernels;
    let (processing, scale) = prepare_processing_image(
        gray.as_view(),
        config.max_dim,
        config.enhance,
        &params,
        &kernels,
    );
    if scale > 1.0 {
        params.scale_factor = scale;
        if config.enhance == Enhancement::Equalize {
            // The fused kernel already equalized contrast at source resolution.
            params.skip_clahe = true;
        }
    }
    if let Some(path) = &config.dump_processed {
        save_grayscale_u8(&processing, path)?;
        println!("Processing image written to {}", path.display());
    }

    let detector = PageDetector::new(params);
    let report = detector.process_with_diagnostics(processing.as_view());

    if config.format.includes_text() {
        print_text_summary(&report);
    }

    if config.format.includes_json() {
        if let Some(path) = config.json_out {
            write_json_file(&path, &report)?;
            if !config.format.includes_text() {
                println!("JSON report written to {}", path.display());
            } else {
                println!("\nJSON report written to {}", path.display());
            }
        } else {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| format!("Failed to serialize JSON: {e}"))?;
            if config.format == OutputFormat::Both {
                println!("\nJSON report:\n{json}");
            } else {
                println!("{json}");
            }
        }
    }

    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
    Both,
}

impl OutputFormat {
    fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "both" => Ok(Self::Both),
            other => Err(format!("Unknown format '{other}'. Use text|json|both.")),
        }
    }

    fn includes_text(&self) -> bool {
        matches!(self, Self::Text | Self::Both)
    }

    fn includes_json(&self) -> bool {
        matches!(self, Self::Json | Self::Both)
    }
}

struct CliConfig {
    input_path: PathBuf,
    format: OutputFormat,
    json_out: Option<PathBuf>,
    max_dim: usize,
    enhance: Enhancement,
    dump_processed: Option<PathBuf>,
    no_fallback: bool,
}

fn parse_args(program: &str) -> Result<CliConfig, String> {
    let mut args = env::args().skip(1).peekable();
    let mut input_path: Option<PathBuf> = None;
    let mut format = OutputFormat::Text;
    let mut json_out: Option<PathBuf> = None;
    let mut max_dim = 0usize;
    let mut enhance = Enhancement::Equalize;
    let mut dump_processed: Option<PathBuf> = None;
    let mut no_fallback = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                println!("{}", usage(program));
                std::process::exit(0);
            }
            "--format" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("--format expects a value\n{}", usage(program)))?;
                format = OutputFormat::from_str(&value)?;
            }
            "--json-out" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("--json-out expects a path\n{}", usage(program)))?;
                json_out = Some(PathBuf::from(value));
            }
            "--max-dim" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("--max-dim expects a value\n{}", usage(program)))?;
                max_dim = value
                    .parse()
                    .map_err(|_| format!("Invalid max dimension '{value}'"))?;
            }
            "--enhance" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("--enhance expects a value\n{}", usage(program)))?;
                enhance = match value.to_lowercase().as_str() {
                    "clahe" => Enhancement::Equalize,
                    "sharpen" => Enhancement::Sharpen,
                    other => {
                        return Err(format!("Unknown enhancement '{other}'. Use clahe|sharpen."))
                    }
                };
            }
            "--dump-processed" => {
                let value = args.next().ok_or_else(|| {
                    format!("--dump-processed expects a path\n{}", usage(program))
                })?;
                dump_processed = Some(PathBuf::from(value));
            }
            "--no-fallback" => {
                no_fallback = true;
            }
            _ if arg.starts_with('-') => {
                return Err(format!("Unknown option '{arg}'\n{}", usage(program)));
            }
            _ => {
                if input_path.is_some() {
                    return Err(format!(
                        "Unexpected positional argument '{arg}'\n{}",
                        usage(program)
                    ));
                }
                input_path = Some(PathBuf::from(arg));
            }
        }
    }

    let input_path = input_path.ok_or_else(|| usage(program))?;
    Ok(CliConfig {
        input_path,
        format,
        json_out,
        max_dim,
        enhance,
        dump_processed,
        no_fallback,
    })
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {program} <image> [--format text|json|both] [--json-out report.json] \\\n         [--max-dim px] [--enhance clahe|sharpen] [--dump-processed out.png] [--no-fallback]\n\n\
Detects a document quadrilateral in a photograph and emits diagnostics.\n\
Examples:\n  {program} photo.jpg --format both --json-out photo_report.json\n  {program} scan.png --max-dim 1080\n"
    )
}

fn print_text_summary(report: &DetectionReport) {
    let scan = &report.scan;
    println!("Detection summary");
    println!("  found: {}", scan.found);
    println!("  score: {:.3}", scan.score);
    println!("  latency_ms: {:.3}", scan.latency_ms);
    match scan.strategy {
        Some(strategy) => println!("  strategy: {strategy}"),
        None if scan.fallback => println!("  strategy: raw-contour fallback"),
        None => println!("  strategy: -"),
    }
    match &scan.corners {
        Some(corners) => {
            println!("  corners:");
            for corner in corners {
                println!("    ({:.1}, {:.1})", corner.x, corner.y);
            }
        }
        None => println!("  corners: none"),
    }

    let trace = &report.trace;
    println!(
        "\nInput: {}x{} scale_factor={:.3}",
        trace.input.width, trace.input.height, trace.input.scale_factor
    );
    for strategy in &trace.strategies {
        match &strategy.error {
            Some(err) => println!(
                "  {}: failed ({err}) elapsed_ms={:.3}",
                strategy.strategy, strategy.elapsed_ms
            ),
            None => {
                let candidate = match &strategy.candidate {
                    Some(c) => format!(
                        "score={:.3} area_ratio={:.3} angle_score={:.3} eps={:.4}",
                        c.score, c.area_ratio, c.angle_score, c.epsilon
                    ),
                    None => "no candidate".to_string(),
                };
                println!(
                    "  {}: contours={} kept={} {} elapsed_ms={:.3}",
                    strategy.strategy,
                    strategy.contours_total,
                    strategy.contours_after_prefilter,
                    candidate,
                    strategy.elapsed_ms
                );
            }
        }
    }
}
