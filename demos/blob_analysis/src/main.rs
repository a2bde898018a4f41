use argh::FromArgs;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use binmorph::{
    image::{Image, ImageSize},
    imgproc::{
        blobs::AreaComparator,
        labeling::{colorize_labels, Connectivity},
        morphology::{self, BorderMode, KernelShape},
        pipeline::{AreaFilter, BlobPipeline, BlobPipelineConfig, Cleanup},
    },
};

#[derive(FromArgs)]
/// Label and measure the blobs of a synthetic scene
struct Args {
    /// image width (default: 96)
    #[argh(option, default = "96")]
    width: usize,

    /// image height (default: 64)
    #[argh(option, default = "64")]
    height: usize,

    /// number of rectangles painted into the scene (default: 8)
    #[argh(option, short = 'n', default = "8")]
    num_shapes: usize,

    /// fraction of background pixels flipped to foreground (default: 0.01)
    #[argh(option, default = "0.01")]
    noise: f64,

    /// random seed (default: 42)
    #[argh(option, default = "42")]
    seed: u64,

    /// kernel size (default: 3)
    #[argh(option, short = 's', default = "3")]
    kernel_size: usize,

    /// kernel shape: box, cross, ellipse (default: box)
    #[argh(option, short = 'k', default = "String::from(\"box\")")]
    kernel_shape: String,

    /// cleanup before labeling: none, open, close (default: open)
    #[argh(option, default = "String::from(\"open\")")]
    cleanup: String,

    /// use 4-connectivity instead of 8-connectivity
    #[argh(switch)]
    four: bool,

    /// keep only blobs with an area greater than this (default: 0)
    #[argh(option, default = "0")]
    min_area: u64,
}

fn synthetic_scene(args: &Args) -> Result<Image<u8, 1>, Box<dyn std::error::Error>> {
    let size = ImageSize {
        width: args.width,
        height: args.height,
    };
    let mut image = Image::<u8, 1>::from_size_val(size, 0)?;
    let mut rng = StdRng::seed_from_u64(args.seed);

    for _ in 0..args.num_shapes {
        let w = rng.random_range(2..=args.width.max(3) / 4 + 2);
        let h = rng.random_range(2..=args.height.max(3) / 4 + 2);
        let x0 = rng.random_range(0..args.width.saturating_sub(w).max(1));
        let y0 = rng.random_range(0..args.height.saturating_sub(h).max(1));
        for y in y0..(y0 + h).min(args.height) {
            for x in x0..(x0 + w).min(args.width) {
                image.set_pixel(x, y, 0, 255)?;
            }
        }
    }

    for v in image.as_slice_mut() {
        if *v == 0 && rng.random_bool(args.noise.clamp(0.0, 1.0)) {
            *v = 255;
        }
    }

    Ok(image)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let scene = synthetic_scene(&args)?;

    let kernel = match args.kernel_shape.as_str() {
        "cross" => KernelShape::Cross {
            size: args.kernel_size,
        },
        "ellipse" => KernelShape::Ellipse {
            width: args.kernel_size,
            height: args.kernel_size,
        },
        _ => KernelShape::Box {
            size: args.kernel_size,
        },
    };

    let cleanup = match args.cleanup.as_str() {
        "open" => Some(Cleanup::Open),
        "close" => Some(Cleanup::Close),
        _ => None,
    };

    let config = BlobPipelineConfig {
        threshold: morphology::DEFAULT_THRESHOLD,
        cleanup,
        kernel,
        border: BorderMode::Background,
        connectivity: if args.four {
            Connectivity::Four
        } else {
            Connectivity::Eight
        },
        area_filter: Some(AreaFilter {
            threshold: args.min_area,
            comparator: AreaComparator::Greater,
        }),
    };
    log::info!("running pipeline with {config:?}");

    let analysis = BlobPipeline::new(config)?.run(&scene)?;

    log::info!(
        "{} components, {} kept",
        analysis.labels.num_components(),
        analysis.selected.len()
    );

    println!(
        "{:>6} {:>6} {:>16} {:>20} {:>8}",
        "label", "area", "centroid", "bbox (x,y,w,h)", "contour"
    );
    for blob in analysis.selected.values() {
        let bb = blob.bounding_box;
        println!(
            "{:>6} {:>6} {:>16} {:>20} {:>8}",
            blob.label,
            blob.area,
            format!("({:.1}, {:.1})", blob.centroid.0, blob.centroid.1),
            format!("({}, {}, {}, {})", bb.x, bb.y, bb.width, bb.height),
            blob.boundary.len()
        );
    }

    // show the kept blobs as ascii art when the scene is small enough
    if args.width <= 120 {
        let colors = colorize_labels(&analysis.labels)?;
        for y in 0..analysis.filtered.height() {
            let row: String = (0..analysis.filtered.width())
                .map(|x| {
                    let kept = analysis.filtered.get_pixel(x, y, 0).unwrap_or(0) != 0;
                    let labeled = colors.pixel(x, y).map(|p| p[0] != 0).unwrap_or(false);
                    match (kept, labeled) {
                        (true, _) => '#',
                        (false, true) => '+',
                        _ => '.',
                    }
                })
                .collect();
            println!("{row}");
        }
    }

    Ok(())
}
