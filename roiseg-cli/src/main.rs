//! `roiseg` command line: segment one grayscale image and write a false-colour
//! label map.

mod log_setup;
mod preprocess;
mod render;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use roiseg::{Config, LabelGrid, Segmenter, extract_roi, resize_nearest};

const USAGE: &str = "Usage: roiseg <input> <output.png> \
                     [--config cfg.yaml] [--size N] [--seed S] [--debug-dir DIR]";

/// Working resolution the image is resized to before segmentation.
const DEFAULT_SIZE: u32 = 128;

#[derive(Debug, PartialEq)]
struct Args {
    input: PathBuf,
    output: PathBuf,
    config: Option<PathBuf>,
    size: u32,
    seed: Option<u64>,
    debug_dir: Option<PathBuf>,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut positional = Vec::new();
        let mut config = None;
        let mut size = DEFAULT_SIZE;
        let mut seed = None;
        let mut debug_dir = None;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let mut value = |flag: &str| {
                args.next()
                    .with_context(|| format!("{flag} needs a value\n{USAGE}"))
            };
            match arg.as_str() {
                "--config" => config = Some(PathBuf::from(value("--config")?)),
                "--size" => {
                    size = value("--size")?
                        .parse()
                        .context("--size must be a positive integer")?;
                    if size == 0 {
                        bail!("--size must be a positive integer");
                    }
                }
                "--seed" => {
                    seed = Some(
                        value("--seed")?
                            .parse()
                            .context("--seed must be an unsigned integer")?,
                    )
                }
                "--debug-dir" => debug_dir = Some(PathBuf::from(value("--debug-dir")?)),
                flag if flag.starts_with("--") => bail!("unknown option {flag}\n{USAGE}"),
                _ => positional.push(PathBuf::from(arg)),
            }
        }

        let [input, output]: [PathBuf; 2] = positional
            .try_into()
            .map_err(|_| anyhow::anyhow!("expected <input> and <output.png>\n{USAGE}"))?;

        Ok(Self {
            input,
            output,
            config,
            size,
            seed,
            debug_dir,
        })
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_yml::from_str(&text)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => Config::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    Ok(config)
}

fn save_labels(labels: &LabelGrid, path: &Path) -> Result<()> {
    render::labels_to_rgb(labels)
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))
}

fn run(args: &Args) -> Result<()> {
    let config = load_config(args)?;

    let gray = image::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?
        .to_luma8();
    let (width, height) = gray.dimensions();
    tracing::info!(
        "Loaded {} ({width}x{height}), working size {}",
        args.input.display(),
        args.size
    );

    let working = preprocess::preprocess(&gray, args.size);
    let intensity = render::gray_to_intensity(&working);

    let roi = extract_roi(&intensity);
    let result = Segmenter::from_config(config).segment(&intensity, &roi)?;
    let labels = resize_nearest(&result.labels, width as usize, height as usize);

    save_labels(&labels, &args.output)?;
    tracing::info!(
        "Wrote {} regions to {}",
        result.region_count(),
        args.output.display()
    );

    if let Some(dir) = &args.debug_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        let working_path = dir.join("working.png");
        working
            .save(&working_path)
            .with_context(|| format!("failed to write {}", working_path.display()))?;
        let roi_path = dir.join("roi.png");
        render::mask_to_gray(&roi)
            .save(&roi_path)
            .with_context(|| format!("failed to write {}", roi_path.display()))?;
        save_labels(&result.refined, &dir.join("refined.png"))?;
        save_labels(&result.merged, &dir.join("merged.png"))?;
        save_labels(&result.labels, &dir.join("final.png"))?;
        tracing::debug!("Debug images written to {}", dir.display());
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse(std::env::args().skip(1))?;
    log_setup::setup_logging("info", Path::new("logs"))?;
    run(&args)
}
