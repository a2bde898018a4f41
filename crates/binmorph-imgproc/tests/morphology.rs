use binmorph_image::{Image, ImageSize};
use binmorph_imgproc::binary::{difference, invert};
use binmorph_imgproc::labeling::{label, Connectivity};
use binmorph_imgproc::morphology::{
    close, dilate, erode, open, prune, skeletonize, BorderMode, KernelShape, SkeletonMode,
    StructuringElement,
};
use binmorph_imgproc::ImgprocError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const THRESHOLD: u8 = 128;

fn random_binary(rng: &mut StdRng, width: usize, height: usize, p: f64) -> Image<u8, 1> {
    let data = (0..width * height)
        .map(|_| if rng.random_bool(p) { 255 } else { 0 })
        .collect();
    Image::new(ImageSize { width, height }, data).unwrap()
}

fn random_kernel(rng: &mut StdRng) -> StructuringElement {
    let width = rng.random_range(1..=4);
    let height = rng.random_range(1..=4);
    let mut mask: Vec<bool> = (0..width * height).map(|_| rng.random_bool(0.6)).collect();
    mask[0] = true;
    let anchor = (rng.random_range(0..width), rng.random_range(0..height));
    StructuringElement::from_mask(width, height, mask, anchor).unwrap()
}

fn is_subset(a: &Image<u8, 1>, b: &Image<u8, 1>) -> bool {
    a.as_slice()
        .iter()
        .zip(b.as_slice())
        .all(|(&x, &y)| x == 0 || y != 0)
}

fn kernels() -> Vec<StructuringElement> {
    vec![
        StructuringElement::new(KernelShape::Box { size: 1 }).unwrap(),
        StructuringElement::new(KernelShape::Box { size: 3 }).unwrap(),
        StructuringElement::default(),
        StructuringElement::new(KernelShape::Cross { size: 3 }).unwrap(),
        StructuringElement::new(KernelShape::Ellipse {
            width: 5,
            height: 3,
        })
        .unwrap(),
    ]
}

#[test]
fn erosion_shrinks_and_dilation_grows() -> Result<(), ImgprocError> {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
        let src = random_binary(&mut rng, 17, 11, 0.55);
        for size in [1, 3, 5] {
            let kernel = StructuringElement::new(KernelShape::Box { size })?;
            for border in [BorderMode::Background, BorderMode::Ignore] {
                let eroded = erode(&src, &kernel, THRESHOLD, border)?;
                let dilated = dilate(&src, &kernel, THRESHOLD, border)?;
                assert!(is_subset(&eroded, &src));
                assert!(is_subset(&src, &dilated));
            }
        }
    }
    Ok(())
}

#[test]
fn opening_and_closing_are_idempotent() -> Result<(), ImgprocError> {
    let mut rng = StdRng::seed_from_u64(11);
    let mut all_kernels = kernels();
    all_kernels.extend((0..10).map(|_| random_kernel(&mut rng)));

    for kernel in &all_kernels {
        let src = random_binary(&mut rng, 16, 16, 0.5);
        for border in [BorderMode::Background, BorderMode::Ignore] {
            let opened = open(&src, kernel, THRESHOLD, border)?;
            assert_eq!(open(&opened, kernel, THRESHOLD, border)?, opened);
            assert!(is_subset(&opened, &src));

            let closed = close(&src, kernel, THRESHOLD, border)?;
            assert_eq!(close(&closed, kernel, THRESHOLD, border)?, closed);
            assert!(is_subset(&src, &closed));
        }
    }
    Ok(())
}

#[test]
fn dilation_is_dual_to_erosion() -> Result<(), ImgprocError> {
    let mut rng = StdRng::seed_from_u64(3);
    let mut all_kernels = kernels();
    all_kernels.extend((0..20).map(|_| random_kernel(&mut rng)));

    for kernel in &all_kernels {
        let src = random_binary(&mut rng, 13, 9, 0.4);
        let dilated = dilate(&src, kernel, THRESHOLD, BorderMode::Ignore)?;
        let inverted = invert(&src)?;
        let dual = invert(&erode(&inverted, kernel, THRESHOLD, BorderMode::Ignore)?)?;
        assert_eq!(dilated, dual);
    }
    Ok(())
}

#[test]
fn duality_holds_away_from_the_border() -> Result<(), ImgprocError> {
    let mut rng = StdRng::seed_from_u64(5);
    let kernel = StructuringElement::new(KernelShape::Box { size: 3 })?;

    // a one pixel background frame keeps every read of a 3x3 kernel inside the image
    let mut src = random_binary(&mut rng, 12, 12, 0.5);
    for i in 0..12 {
        for (x, y) in [(i, 0), (i, 11), (0, i), (11, i)] {
            src.set_pixel(x, y, 0, 0)?;
        }
    }

    let dilated = dilate(&src, &kernel, THRESHOLD, BorderMode::Background)?;
    let dual = invert(&erode(
        &invert(&src)?,
        &kernel,
        THRESHOLD,
        BorderMode::Background,
    )?)?;
    for y in 1..11 {
        for x in 1..11 {
            assert_eq!(dilated.get_pixel(x, y, 0)?, dual.get_pixel(x, y, 0)?);
        }
    }
    Ok(())
}

#[test]
fn skeleton_is_a_thin_fixed_point() -> Result<(), ImgprocError> {
    let mut rng = StdRng::seed_from_u64(13);
    for _ in 0..10 {
        let src = random_binary(&mut rng, 20, 14, 0.7);
        let skeleton = skeletonize(&src, THRESHOLD, &SkeletonMode::TransitionCount)?;
        assert!(is_subset(&skeleton, &src));
        assert_eq!(
            skeletonize(&skeleton, THRESHOLD, &SkeletonMode::TransitionCount)?,
            skeleton
        );

        let kernel = StructuringElement::new(KernelShape::Cross { size: 3 })?;
        let residues = skeletonize(&src, THRESHOLD, &SkeletonMode::Lantuejoul(kernel))?;
        assert!(is_subset(&residues, &src));
    }
    Ok(())
}

#[test]
fn skeleton_keeps_every_component() -> Result<(), ImgprocError> {
    let mut rng = StdRng::seed_from_u64(29);
    for _ in 0..200 {
        let p = rng.random_range(0.3..0.8);
        let src = random_binary(&mut rng, 20, 14, p);
        let skeleton = skeletonize(&src, THRESHOLD, &SkeletonMode::TransitionCount)?;

        let components = label(&src, Connectivity::Eight)?;
        for &component in components.labels() {
            let survives = components
                .image()
                .as_slice()
                .iter()
                .zip(skeleton.as_slice())
                .any(|(&l, &v)| l == component && v != 0);
            assert!(survives, "component {component} vanished");
        }

        // thinning neither erases nor splits components
        let thinned = label(&skeleton, Connectivity::Eight)?;
        assert_eq!(thinned.num_components(), components.num_components());
    }
    Ok(())
}

#[test]
fn prune_only_removes_pixels() -> Result<(), ImgprocError> {
    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..10 {
        let src = random_binary(&mut rng, 15, 15, 0.3);
        let once = prune(&src, 1, THRESHOLD)?;
        let thrice = prune(&src, 3, THRESHOLD)?;
        assert!(is_subset(&once, &src));
        assert!(is_subset(&thrice, &once));
        assert_eq!(prune(&src, 0, THRESHOLD)?, src);

        // whatever is removed must have been foreground
        let removed = difference(&src, &thrice)?;
        assert!(is_subset(&removed, &src));
    }
    Ok(())
}
