use std::iter::FusedIterator;
use std::num::NonZeroU32;

use crate::geometry::{ScreenBlock, ScreenPoint};

pub trait ScreenBlockExt {
    fn internal_points(&self) -> InternalPoints;
    fn tile_ordering(&self, tile_size: NonZeroU32) -> Vec<ScreenBlock>;
}

impl ScreenBlockExt for ScreenBlock {
    /// Create an iterator over (x, y) coordinates inside the block,
    /// in C order (x changes first, then y)
    fn internal_points(&self) -> InternalPoints {
        if self.min.x >= self.max.x || self.min.y >= self.max.y {
            InternalPoints::empty()
        } else {
            InternalPoints {
                min_x: self.min.x,
                max: self.max,
                cursor: self.min,
            }
        }
    }

    /// Split the block into tiles of (at most) tile_size * tile_size pixels and
    /// order them in a spiral starting near the middle of the block.
    /// Tiles at the bottom and right side may be clipped if the tile size
    /// doesn't evenly divide the block size.
    fn tile_ordering(&self, tile_size: NonZeroU32) -> Vec<ScreenBlock> {
        if self.min.x >= self.max.x || self.min.y >= self.max.y {
            return Vec::new();
        }

        let tile_size = tile_size.get();
        let grid_w = self.width().div_ceil(tile_size) as i64;
        let grid_h = self.height().div_ceil(tile_size) as i64;
        let total = (grid_w * grid_h) as usize;

        let tile_at = |cx: i64, cy: i64| {
            let min = ScreenPoint::new(
                self.min.x + (cx as u32) * tile_size,
                self.min.y + (cy as u32) * tile_size,
            );
            let max = ScreenPoint::new(
                (min.x + tile_size).min(self.max.x),
                (min.y + tile_size).min(self.max.y),
            );
            ScreenBlock::new(min, max)
        };

        // Walk a square spiral outwards from the center tile, keeping only the
        // positions that fall inside the tile grid. The walk is bounded because
        // every ring visits at least one in-grid cell until all are collected.
        let (mut cx, mut cy) = (grid_w / 2, grid_h / 2);
        let (mut dx, mut dy) = (1i64, 0i64);
        let mut segment = 1i64;
        let mut ordering = Vec::with_capacity(total);

        while ordering.len() < total {
            for _ in 0..2 {
                for _ in 0..segment {
                    if cx >= 0 && cx < grid_w && cy >= 0 && cy < grid_h {
                        ordering.push(tile_at(cx, cy));
                        if ordering.len() == total {
                            return ordering;
                        }
                    }
                    cx += dx;
                    cy += dy;
                }
                // turn 90 degrees
                (dx, dy) = (-dy, dx);
            }
            segment += 1;
        }

        ordering
    }
}

#[derive(Copy, Clone, Debug)]
pub struct InternalPoints {
    min_x: u32,
    max: ScreenPoint,
    cursor: ScreenPoint,
}

impl InternalPoints {
    fn empty() -> Self {
        InternalPoints {
            min_x: 1,
            max: ScreenPoint::origin(),
            cursor: ScreenPoint::origin(),
        }
    }
}

impl Iterator for InternalPoints {
    type Item = ScreenPoint;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor.y >= self.max.y {
            return None;
        }

        let ret = self.cursor;

        self.cursor.x += 1;
        if self.cursor.x >= self.max.x {
            self.cursor.x = self.min_x;
            self.cursor.y += 1;
        }

        Some(ret)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.len();
        (len, Some(len))
    }
}

impl ExactSizeIterator for InternalPoints {
    fn len(&self) -> usize {
        if self.cursor.y >= self.max.y {
            0
        } else {
            let remaining_rows = (self.max.y - self.cursor.y - 1) as usize;
            let row_width = (self.max.x - self.min_x) as usize;
            let current_row = (self.max.x - self.cursor.x) as usize;
            remaining_rows * row_width + current_row
        }
    }
}

impl FusedIterator for InternalPoints {}

#[cfg(test)]
mod test {
    use super::*;
    use assert2::assert;
    use test_strategy::proptest;

    fn check_covers_block(points: impl Iterator<Item = ScreenPoint>, block: &ScreenBlock) {
        let w = block.width() as usize;
        let h = block.height() as usize;
        let mut seen = vec![false; w * h];
        for p in points {
            assert!(p.x >= block.min.x && p.x < block.max.x);
            assert!(p.y >= block.min.y && p.y < block.max.y);
            let index = (p.x - block.min.x) as usize + (p.y - block.min.y) as usize * w;
            assert!(!seen[index], "pixel visited twice: {p:?}");
            seen[index] = true;
        }
        assert!(seen.into_iter().all(|v| v));
    }

    #[proptest]
    fn internal_points_cover_all(
        #[strategy(0u32..50)] min_x: u32,
        #[strategy(0u32..50)] min_y: u32,
        #[strategy(1u32..50)] w: u32,
        #[strategy(1u32..50)] h: u32,
    ) {
        let block = ScreenBlock::new(
            ScreenPoint::new(min_x, min_y),
            ScreenPoint::new(min_x + w, min_y + h),
        );
        check_covers_block(block.internal_points(), &block);
    }

    #[proptest]
    fn internal_points_exact_length(
        #[strategy(1u32..50)] w: u32,
        #[strategy(1u32..50)] h: u32,
    ) {
        let block = ScreenBlock::new(ScreenPoint::origin(), ScreenPoint::new(w, h));
        let mut iter = block.internal_points();
        let mut remaining = (w * h) as usize;
        assert!(iter.len() == remaining);
        while iter.next().is_some() {
            remaining -= 1;
            assert!(iter.len() == remaining);
        }
    }

    #[proptest]
    fn tiles_cover_all_pixels(
        #[strategy(1u32..100)] w: u32,
        #[strategy(1u32..100)] h: u32,
        #[strategy(1u32..32)] tile_size: u32,
    ) {
        let block = ScreenBlock::new(ScreenPoint::origin(), ScreenPoint::new(w, h));
        let tiles = block.tile_ordering(tile_size.try_into().unwrap());
        check_covers_block(
            tiles.iter().flat_map(|tile| tile.internal_points()),
            &block,
        );
    }

    #[proptest]
    fn tile_ordering_is_a_spiral(
        #[strategy(1u32..100)] w: u32,
        #[strategy(1u32..100)] h: u32,
        #[strategy(1u32..32)] tile_size: u32,
    ) {
        let block = ScreenBlock::new(ScreenPoint::origin(), ScreenPoint::new(w, h));
        let tiles = block.tile_ordering(tile_size.try_into().unwrap());

        // Tiles must move away from the starting tile in rings of
        // non-decreasing chebyshev distance.
        let first = &tiles[0];
        let mut prev_distance = 0;
        for tile in &tiles {
            let distance = std::cmp::max(
                first.min.x.abs_diff(tile.min.x),
                first.min.y.abs_diff(tile.min.y),
            ) / tile_size;
            assert!(distance + 1 >= prev_distance);
            prev_distance = prev_distance.max(distance);
        }
    }

    #[test]
    fn empty_block_has_no_tiles() {
        let block = ScreenBlock::new(ScreenPoint::new(5, 5), ScreenPoint::new(5, 10));
        assert!(block.tile_ordering(8.try_into().unwrap()).is_empty());
        assert!(block.internal_points().next().is_none());
    }
}
