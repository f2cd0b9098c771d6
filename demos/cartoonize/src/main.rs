use argh::FromArgs;
use std::path::{Path, PathBuf};

use fotofx::{
    filters::{rgb_image_from_raw, simple, FilterError, FilterRegistry},
    image::{Image, ImageSize},
    imgproc::{fft::log_power_spectrum, filter::Kernel},
};

mod session;
use session::EditSession;

/// One editing step given on the command line.
#[derive(Debug, Clone, PartialEq)]
enum Step {
    /// Apply a registered filter, `name[:param]`.
    Filter { name: String, params: Vec<f32> },
    /// Go back to the loaded image.
    Reset,
}

fn to_step(s: &str) -> Result<Step, String> {
    if s == "reset" {
        return Ok(Step::Reset);
    }

    let (name, params) = match s.split_once(':') {
        Some((name, param)) => {
            let value = param
                .trim()
                .parse::<f32>()
                .map_err(|e| format!("invalid parameter `{param}`: {e}"))?;
            (name, vec![value])
        }
        None => (s, Vec::new()),
    };

    Ok(Step::Filter {
        name: name.to_string(),
        params,
    })
}

fn to_kernel(s: &str) -> Result<Kernel, String> {
    let weights = s
        .split(',')
        .map(|w| w.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid kernel weight: {e}"))?;

    let side = (weights.len() as f64).sqrt() as usize;
    Kernel::new(side, weights).map_err(|e| e.to_string())
}

#[derive(FromArgs)]
/// Apply cartoon and classic filters to an image
struct Args {
    /// path to the input image
    #[argh(option, short = 'i')]
    input: Option<PathBuf>,

    /// path to write the edited image to
    #[argh(option, short = 'o')]
    output: Option<PathBuf>,

    /// filter to apply as `name[:param]`, repeat to chain, `reset` restores the input
    #[argh(option, short = 'f', from_str_fn(to_step))]
    filter: Vec<Step>,

    /// odd square kernel given as comma separated row-major weights
    #[argh(option, short = 'k', from_str_fn(to_kernel))]
    kernel: Option<Kernel>,

    /// intensity of a frequency domain gaussian blur applied last
    #[argh(option)]
    fft_blur: Option<f32>,

    /// path to write the log power spectrum of the result to
    #[argh(option)]
    spectrum: Option<PathBuf>,

    /// print the available filters as JSON and exit
    #[argh(switch)]
    list: bool,
}

fn load_rgb(path: &Path) -> Result<Image<u8, 3>, Box<dyn std::error::Error>> {
    let decoded = image::open(path)?.to_rgb8();
    let size = ImageSize {
        width: decoded.width() as usize,
        height: decoded.height() as usize,
    };
    Ok(rgb_image_from_raw(size, 3, decoded.into_raw())?)
}

fn save_rgb(path: &Path, img: &Image<u8, 3>) -> Result<(), Box<dyn std::error::Error>> {
    let buffer = image::RgbImage::from_raw(
        img.width() as u32,
        img.height() as u32,
        img.as_slice().to_vec(),
    )
    .ok_or("failed to create the output buffer")?;
    buffer.save(path)?;
    Ok(())
}

fn save_spectrum(path: &Path, img: &Image<u8, 3>) -> Result<(), Box<dyn std::error::Error>> {
    let scaled = img.cast_and_scale::<f32>(1.0 / 255.0)?;
    let spectrum = log_power_spectrum(&scaled).map_err(FilterError::from)?;

    // stretch to the full 8 bit range for viewing
    let data = spectrum.as_slice();
    let max = data.iter().copied().fold(0.0f32, f32::max);
    let gain = if max > 0.0 { 255.0 / max } else { 0.0 };
    let pixels = data
        .iter()
        .map(|&v| (v * gain).round().clamp(0.0, 255.0) as u8)
        .collect();

    let buffer =
        image::GrayImage::from_raw(spectrum.width() as u32, spectrum.height() as u32, pixels)
            .ok_or("failed to create the spectrum buffer")?;
    buffer.save(path)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Args = argh::from_env();
    let registry = FilterRegistry::new();

    if args.list {
        let filters = registry
            .iter()
            .map(|kind| {
                serde_json::json!({
                    "name": kind,
                    "param": kind.param_spec(),
                })
            })
            .collect::<Vec<_>>();
        println!("{}", serde_json::to_string_pretty(&filters)?);
        return Ok(());
    }

    let input = args.input.ok_or("an input image is required, see --help")?;
    let image = load_rgb(&input)?;
    log::info!("Loaded {} ({})", input.display(), image.size());

    let mut session = EditSession::new(image);

    for step in &args.filter {
        match step {
            Step::Filter { name, params } => {
                session.apply(&registry, name, params)?;
                log::info!("Applied {name}");
            }
            Step::Reset => {
                session.reset();
                log::info!("Restored the original {} image", session.original().size());
            }
        }
    }

    if let Some(kernel) = &args.kernel {
        session.apply_with(|img| simple::convolve(img, kernel))?;
        log::info!("Applied a {0}x{0} kernel", kernel.side());
    }

    if let Some(intensity) = args.fft_blur {
        session.apply_with(|img| simple::fft_blur(img, intensity))?;
        log::info!("Applied fft blur with intensity {intensity}");
    }

    if let Some(path) = &args.spectrum {
        save_spectrum(path, session.modified())?;
        log::info!("Saved spectrum to {}", path.display());
    }

    match &args.output {
        Some(path) => {
            save_rgb(path, session.modified())?;
            log::info!("Saved {}", path.display());
        }
        None => log::warn!(
            "No output path given, {} steps were applied to {}",
            args.filter.len(),
            input.display()
        ),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_steps() {
        assert_eq!(to_step("reset"), Ok(Step::Reset));
        assert_eq!(
            to_step("gaussian:4"),
            Ok(Step::Filter {
                name: "gaussian".to_string(),
                params: vec![4.0],
            })
        );
        assert_eq!(
            to_step("edge enhance more"),
            Ok(Step::Filter {
                name: "edge enhance more".to_string(),
                params: vec![],
            })
        );
        assert!(to_step("gaussian:big").is_err());
    }

    #[test]
    fn parse_kernel() {
        let kernel = to_kernel("0,0,0, 0,1,0, 0,0,0").map(|k| k.side());
        assert_eq!(kernel, Ok(3));
        assert!(to_kernel("1,2,3,4").is_err());
        assert!(to_kernel("1,2,x").is_err());
    }
}
