/// One rectangular tile of the image, in pixel coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Tile {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

/// Partitions a `width x height` image into tile-sized rectangles (sweeping
/// in raster order) and round-robin assigns each to one of `num_threads`
/// per-thread lists. Tiles touching the image's right/bottom boundary are
/// clipped so no tile extends past the image.
pub fn schedule_tiles(
    width: usize,
    height: usize,
    tile_width: usize,
    tile_height: usize,
    num_threads: usize,
) -> Vec<Vec<Tile>> {
    let tile_width = tile_width.max(1);
    let tile_height = tile_height.max(1);
    let num_threads = num_threads.max(1);
    let mut per_thread: Vec<Vec<Tile>> = (0..num_threads).map(|_| Vec::new()).collect();

    let mut thread_cursor = 0;
    let mut y = 0;
    while y < height {
        let h = tile_height.min(height - y);
        let mut x = 0;
        while x < width {
            let w = tile_width.min(width - x);
            per_thread[thread_cursor % num_threads].push(Tile {
                x,
                y,
                width: w,
                height: h,
            });
            thread_cursor += 1;
            x += tile_width;
        }
        y += tile_height;
    }
    per_thread
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiles_cover_the_whole_image_with_no_overlap() {
        let per_thread = schedule_tiles(37, 23, 8, 8, 4);
        let mut covered = vec![0u32; 37 * 23];
        for tiles in &per_thread {
            for t in tiles {
                for yy in t.y..t.y + t.height {
                    for xx in t.x..t.x + t.width {
                        covered[yy * 37 + xx] += 1;
                    }
                }
            }
        }
        assert!(covered.iter().all(|&c| c == 1));
    }

    #[test]
    fn boundary_tiles_are_clipped_to_image_bounds() {
        let per_thread = schedule_tiles(10, 10, 8, 8, 1);
        for t in &per_thread[0] {
            assert!(t.x + t.width <= 10);
            assert!(t.y + t.height <= 10);
        }
    }
}
