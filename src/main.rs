use clap::{Parser, Subcommand, ValueEnum};
use image_workbench::config::{self, WorkbenchConfig};
use image_workbench::imaging::{
    AspectParams, BlurRadius, CropMargins, CropParams, CustomSizeParams, EdgeAlgorithm, GlcmAngle,
    KernelSize, MorphologyParams, TextureFeature, TextureParams, Threshold, ToneParams,
};
use image_workbench::output;
use image_workbench::types::{OutputSpec, SourceDescriptor, StatusResult};
use image_workbench::workbench::{MaskSource, Workbench, failure_message};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "image-workbench")]
#[command(about = "Resize, crop, mask, edge-detect, morph and analyze images")]
#[command(long_about = "\
Resize, crop, mask, edge-detect, morph and analyze images

Every command reads one source image (PNG, JPEG, BMP, GIF, TIFF or SVG) and
writes its result next to the others:

  output/
  ├── photo/
  │   ├── photo_aspect_square.png        # aspect --square
  │   ├── photo_aspect_binary_blur.png   # aspect --binary 0.5 --blur 1
  │   ├── photo_sobel.png                # edge --algorithm sobel
  │   └── photo_morph_erosion.png        # morph --erosion 3
  └── features/
      ├── photo_Contrast.png             # texture --save
      ├── photo_combined.png
      └── photo_stats.csv

SVG sources are rendered onto a white square canvas and always saved as PNG.

Run 'image-workbench gen-config' to generate a documented workbench.toml.")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./workbench.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output directory (defaults to <default_dir>/<source stem>)
    #[arg(long, global = true)]
    out_dir: Option<String>,

    /// Output file name (defaults to <stem>_<mode><ext>)
    #[arg(long, global = true)]
    out_name: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

/// Optional binarize and blur stages shared by the resize commands.
#[derive(clap::Args, Clone)]
struct ToneArgs {
    /// Binarize at this threshold (0-1)
    #[arg(long)]
    binary: Option<f32>,
    /// Gaussian blur with this radius (0.1-10), applied after binarize
    #[arg(long)]
    blur: Option<f32>,
}

impl ToneArgs {
    fn params(&self) -> ToneParams {
        ToneParams {
            binary: self.binary.map(Threshold::new),
            blur: self.blur.map(BlurRadius::new),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum EdgeKind {
    Roberts,
    Sobel,
    Prewitt,
    Laplacian,
    Log,
    Canny,
}

#[derive(Subcommand)]
enum Command {
    /// Fit the long side into a target size and pad with white
    Aspect {
        file: PathBuf,
        #[arg(long, default_value_t = 512)]
        size: u32,
        #[arg(long, default_value_t = 0)]
        margin: u32,
        /// Pad to a square canvas
        #[arg(long)]
        square: bool,
        #[command(flatten)]
        tone: ToneArgs,
    },
    /// Resize to exact dimensions
    Custom {
        file: PathBuf,
        #[arg(long, default_value_t = 512)]
        width: u32,
        #[arg(long, default_value_t = 512)]
        height: u32,
        #[command(flatten)]
        tone: ToneArgs,
    },
    /// Crop margins off, then fit to a target size
    Crop {
        #[arg(required_unless_present = "batch")]
        file: Option<PathBuf>,
        /// Crop every supported image in this folder
        #[arg(long, conflicts_with = "file")]
        batch: Option<PathBuf>,
        #[arg(long, default_value_t = 0)]
        top: u32,
        #[arg(long, default_value_t = 0)]
        bottom: u32,
        #[arg(long, default_value_t = 0)]
        left: u32,
        #[arg(long, default_value_t = 0)]
        right: u32,
        #[arg(long, default_value_t = 512)]
        size: u32,
        #[arg(long, default_value_t = 0)]
        margin: u32,
        #[arg(long)]
        square: bool,
    },
    /// Paint black or a second image through a binary mask
    Mask {
        mask: PathBuf,
        /// Foreground image (black when omitted)
        #[arg(long)]
        source: Option<PathBuf>,
    },
    /// Edge detection
    Edge {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = EdgeKind::Sobel)]
        algorithm: EdgeKind,
        /// Gaussian sigma for LoG
        #[arg(long, default_value_t = 1.0)]
        sigma: f32,
        /// Canny low threshold
        #[arg(long, default_value_t = 50.0)]
        low: f32,
        /// Canny high threshold
        #[arg(long, default_value_t = 150.0)]
        high: f32,
    },
    /// Threshold, then erosion / dilation / opening / closing
    Morph {
        file: PathBuf,
        #[arg(long, value_parser = parse_kernel)]
        erosion: Option<KernelSize>,
        #[arg(long, value_parser = parse_kernel)]
        dilation: Option<KernelSize>,
        #[arg(long, value_parser = parse_kernel)]
        opening: Option<KernelSize>,
        #[arg(long, value_parser = parse_kernel)]
        closing: Option<KernelSize>,
    },
    /// GLCM texture features
    Texture {
        file: PathBuf,
        #[arg(long, default_value_t = 1)]
        distance: u32,
        /// Angle in degrees: 0, 45, 90 or 135 (repeatable)
        #[arg(long = "angle", value_parser = parse_angle, default_values_t = [GlcmAngle::Deg0])]
        angles: Vec<GlcmAngle>,
        #[arg(long, default_value_t = 64)]
        levels: u32,
        #[arg(long)]
        no_symmetric: bool,
        #[arg(long)]
        no_normalize: bool,
        /// Feature to compute (repeatable, default all)
        #[arg(long = "feature", value_parser = parse_feature)]
        features: Vec<TextureFeature>,
        /// Write maps, combined figure and stats CSV
        #[arg(long)]
        save: bool,
    },
    /// List supported images in a directory
    List {
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
    /// Print a stock workbench.toml with all options documented
    GenConfig,
}

fn parse_kernel(s: &str) -> Result<KernelSize, String> {
    let value: u32 = s.parse().map_err(|e| format!("{e}"))?;
    KernelSize::new(value).map_err(|e| e.to_string())
}

fn parse_angle(s: &str) -> Result<GlcmAngle, String> {
    let degrees: u32 = s.trim_end_matches('°').parse().map_err(|e| format!("{e}"))?;
    GlcmAngle::from_degrees(degrees).ok_or_else(|| "angle must be 0, 45, 90 or 135".to_string())
}

fn parse_feature(s: &str) -> Result<TextureFeature, String> {
    TextureFeature::parse(s).ok_or_else(|| {
        let names: Vec<&str> = TextureFeature::ALL.iter().map(|f| f.name()).collect();
        format!("unknown feature '{s}', expected one of {}", names.join(", "))
    })
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = self
            .to_possible_value()
            .map(|v| v.get_name().to_string())
            .unwrap_or_default();
        f.write_str(&name)
    }
}

fn edge_algorithm(kind: EdgeKind, sigma: f32, low: f32, high: f32) -> EdgeAlgorithm {
    match kind {
        EdgeKind::Roberts => EdgeAlgorithm::Roberts,
        EdgeKind::Sobel => EdgeAlgorithm::Sobel,
        EdgeKind::Prewitt => EdgeAlgorithm::Prewitt,
        EdgeKind::Laplacian => EdgeAlgorithm::Laplacian,
        EdgeKind::Log => EdgeAlgorithm::log(sigma),
        EdgeKind::Canny => EdgeAlgorithm::canny(low, high),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<WorkbenchConfig, config::ConfigError> {
    match path {
        Some(path) if !path.exists() => Err(config::ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("config file not found: {}", path.display()),
        ))),
        Some(path) => config::load_config_file(path),
        None => config::load_config(Path::new(".")),
    }
}

/// Print as JSON, or as text through the matching `output::print_*`.
fn emit<T: Serialize>(json: bool, value: &T, print: impl FnOnce()) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", output::format_json(value)?);
    } else {
        print();
    }
    Ok(())
}

fn emit_status(json: bool, status: &StatusResult) -> Result<bool, serde_json::Error> {
    emit(json, status, || output::print_status(status))?;
    Ok(status.success)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let workbench = Workbench::new(load_config(cli.config.as_deref())?)?;
    let out = OutputSpec::new(cli.out_dir.clone(), cli.out_name.clone());
    let source = |path: &Path| SourceDescriptor::from_path(path);

    let success = match cli.command {
        Command::Aspect {
            file,
            size,
            margin,
            square,
            tone,
        } => {
            let status = match AspectParams::new(size, margin, square) {
                Ok(params) => workbench.aspect(&source(&file), &params, &tone.params(), &out).status,
                Err(e) => StatusResult::failed(failure_message(&e)),
            };
            emit_status(cli.json, &status)?
        }
        Command::Custom {
            file,
            width,
            height,
            tone,
        } => {
            let params = CustomSizeParams::new(width, height);
            let outcome = workbench.custom(&source(&file), &params, &tone.params(), &out);
            emit_status(cli.json, &outcome.status)?
        }
        Command::Crop {
            file,
            batch,
            top,
            bottom,
            left,
            right,
            size,
            margin,
            square,
        } => {
            let margins = CropMargins {
                top,
                bottom,
                left,
                right,
            };
            let params = CropParams::new(margins, size, square, margin);
            match (batch, file) {
                (Some(folder), _) => {
                    let report = workbench.crop_batch(&folder, &params, &out);
                    emit(cli.json, &report, || output::print_batch(&report))?;
                    report.is_success()
                }
                (None, Some(file)) => {
                    let outcome = workbench.crop(&source(&file), &params, &out);
                    emit_status(cli.json, &outcome.status)?
                }
                (None, None) => emit_status(
                    cli.json,
                    &StatusResult::failed("No image selected".to_string()),
                )?,
            }
        }
        Command::Mask { mask, source: fill } => {
            let fill = match fill {
                Some(path) => MaskSource::Image(source(&path)),
                None => MaskSource::BlackFill,
            };
            let outcome = workbench.mask(&source(&mask), &fill, &out);
            emit_status(cli.json, &outcome.status)?
        }
        Command::Edge {
            file,
            algorithm,
            sigma,
            low,
            high,
        } => {
            let algorithm = edge_algorithm(algorithm, sigma, low, high);
            let outcome = workbench.edges(&source(&file), algorithm, &out);
            emit_status(cli.json, &outcome.status)?
        }
        Command::Morph {
            file,
            erosion,
            dilation,
            opening,
            closing,
        } => {
            let params = MorphologyParams {
                erosion,
                dilation,
                opening,
                closing,
            };
            let outcome = workbench.morphology(&source(&file), &params, &out);
            emit_status(cli.json, &outcome.status)?
        }
        Command::Texture {
            file,
            distance,
            angles,
            levels,
            no_symmetric,
            no_normalize,
            features,
            save,
        } => {
            let features = if features.is_empty() {
                TextureFeature::ALL.to_vec()
            } else {
                features
            };
            let params = TextureParams::new(
                distance,
                &angles,
                levels,
                !no_symmetric,
                !no_normalize,
                &features,
            );
            let report = workbench.texture(&source(&file), &params);
            emit(cli.json, &report.table, || output::print_texture_table(&report.table))?;
            if save && report.is_success() {
                let status = workbench.save_texture(report.session.as_ref(), &out);
                emit_status(cli.json, &status)?
            } else {
                report.is_success()
            }
        }
        Command::List { dir } => {
            let names = workbench.list(&dir);
            emit(cli.json, &names, || output::print_image_list(&dir, &names))?;
            true
        }
        Command::GenConfig => true,
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}
