use ndarray::{s, Array2, ArrayView2};

/// A square (or edge-clipped) sub-image cut from a frame.
#[derive(Clone, Debug)]
pub struct Window {
    pub data: Array2<f32>,
    /// Frame `(row, col)` of `data[[0, 0]]`. Negative for zero-padded
    /// windows that start outside the frame.
    pub origin: (isize, isize),
}

impl Window {
    /// Map a window-relative `(row, col)` position to frame `[x, y]`.
    pub fn to_frame(&self, row: f64, col: f64) -> [f64; 2] {
        [col + self.origin.1 as f64, row + self.origin.0 as f64]
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }
}

/// Window bounds `[start, start + size)` along one axis, centered on `center`.
fn span(center: usize, size: usize) -> (isize, isize) {
    let start = center as isize - (size / 2) as isize;
    (start, start + size as isize)
}

/// Cut a `size x size` window centered on the frame pixel `(row, col)`.
///
/// Parts of the window outside the frame are zero, so the result always has
/// the requested size.
pub fn crop_padded(frame: &ArrayView2<f32>, center: (usize, usize), size: usize) -> Window {
    let (h, w) = frame.dim();
    let (r0, r1) = span(center.0, size);
    let (c0, c1) = span(center.1, size);

    let mut data = Array2::<f32>::zeros((size, size));

    let src_r0 = r0.clamp(0, h as isize);
    let src_r1 = r1.clamp(0, h as isize);
    let src_c0 = c0.clamp(0, w as isize);
    let src_c1 = c1.clamp(0, w as isize);

    if src_r1 > src_r0 && src_c1 > src_c0 {
        let dst_r = (src_r0 - r0) as usize;
        let dst_c = (src_c0 - c0) as usize;
        let rows = (src_r1 - src_r0) as usize;
        let cols = (src_c1 - src_c0) as usize;
        data.slice_mut(s![dst_r..dst_r + rows, dst_c..dst_c + cols])
            .assign(&frame.slice(s![
                src_r0 as usize..src_r1 as usize,
                src_c0 as usize..src_c1 as usize
            ]));
    }

    Window {
        data,
        origin: (r0, c0),
    }
}

/// Cut a window of nominal side `size` centered on `(row, col)`, clipped to
/// the frame. Near the border the window is smaller than requested.
pub fn crop_clipped(frame: &ArrayView2<f32>, center: (usize, usize), size: usize) -> Window {
    let (h, w) = frame.dim();
    let (r0, r1) = span(center.0, size);
    let (c0, c1) = span(center.1, size);

    let r0 = r0.clamp(0, h as isize) as usize;
    let r1 = r1.clamp(0, h as isize) as usize;
    let c0 = c0.clamp(0, w as isize) as usize;
    let c1 = c1.clamp(0, w as isize) as usize;

    Window {
        data: frame.slice(s![r0..r1.max(r0), c0..c1.max(c0)]).to_owned(),
        origin: (r0 as isize, c0 as isize),
    }
}
