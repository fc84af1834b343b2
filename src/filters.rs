use crate::math::Color;

/// A width x height buffer of colors, the shape the filters read and write.
pub struct ColorGrid<'a> {
    pub width: usize,
    pub height: usize,
    pub pixels: &'a [Color],
}

impl<'a> ColorGrid<'a> {
    fn get(&self, x: i64, y: i64) -> Color {
        let cx = x.clamp(0, self.width as i64 - 1) as usize;
        let cy = y.clamp(0, self.height as i64 - 1) as usize;
        self.pixels[cy * self.width + cx]
    }
}

/// 3x3 edge-preserving low-pass with kernel [[1,2,1],[2,4,2],[1,2,1]]/16 and
/// clamped boundary sampling. Writes into a destination distinct from source.
pub fn box_filter(src: &ColorGrid, dst: &mut [Color]) {
    const WEIGHTS: [[f64; 3]; 3] = [[1.0, 2.0, 1.0], [2.0, 4.0, 2.0], [1.0, 2.0, 1.0]];
    for y in 0..src.height {
        for x in 0..src.width {
            let mut sum = Color::zero();
            for (dy, row) in WEIGHTS.iter().enumerate() {
                for (dx, &weight) in row.iter().enumerate() {
                    let sx = x as i64 + dx as i64 - 1;
                    let sy = y as i64 + dy as i64 - 1;
                    sum += src.get(sx, sy) * weight;
                }
            }
            dst[y * src.width + x] = sum * (1.0 / 16.0);
        }
    }
}

/// 3x3 per-channel median filter: sorts the 9 clamped-boundary samples per
/// channel independently and takes the 5th (middle) element.
pub fn median_filter(src: &ColorGrid, dst: &mut [Color]) {
    for y in 0..src.height {
        for x in 0..src.width {
            let mut r = [0.0f64; 9];
            let mut g = [0.0f64; 9];
            let mut b = [0.0f64; 9];
            let mut i = 0;
            for dy in -1..=1i64 {
                for dx in -1..=1i64 {
                    let c = src.get(x as i64 + dx, y as i64 + dy);
                    r[i] = c.x;
                    g[i] = c.y;
                    b[i] = c.z;
                    i += 1;
                }
            }
            r.sort_by(|a, b| a.partial_cmp(b).unwrap());
            g.sort_by(|a, b| a.partial_cmp(b).unwrap());
            b.sort_by(|a, b| a.partial_cmp(b).unwrap());
            dst[y * src.width + x] = Color::new(r[4], g[4], b[4]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_filter_removes_a_single_outlier_pixel() {
        let width = 3;
        let height = 3;
        let mut pixels = vec![Color::new(0.1, 0.1, 0.1); width * height];
        pixels[4] = Color::new(10.0, 10.0, 10.0); // center outlier
        let src = ColorGrid {
            width,
            height,
            pixels: &pixels,
        };
        let mut dst = vec![Color::zero(); width * height];
        median_filter(&src, &mut dst);
        assert!((dst[4].x - 0.1).abs() < 1e-9);
    }
}
