/// Border handling modes for morphological operations.
///
/// Decides what a kernel cell reads when it is translated outside of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BorderMode {
    /// Out-of-bounds pixels are background for every operator.
    ///
    /// Erosion shrinks foreground touching the border; dilation never grows past it.
    #[default]
    Background,

    /// Out-of-bounds kernel cells are skipped.
    ///
    /// They read as foreground for erosion and background for dilation, so the
    /// border neither shrinks nor grows the result. Under this mode
    /// `dilate(I) == invert(erode(invert(I)))` holds on every pixel.
    Ignore,
}

impl BorderMode {
    /// Value read outside the image by erosion.
    pub(crate) fn erosion_outside(self) -> bool {
        match self {
            BorderMode::Background => false,
            BorderMode::Ignore => true,
        }
    }

    /// Value read outside the image by dilation.
    pub(crate) fn dilation_outside(self) -> bool {
        false
    }
}
