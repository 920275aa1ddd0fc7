use crate::geometry::Rect;

use super::PlacementHeuristic;

/// A MAXRECTS-style free-rectangle packer over a single canvas. No rotation is attempted:
/// `allow_rotation` does not exist in this crate's config, matching the exclusion of rotation
/// from the packing search.
pub struct MaxRectsPacker {
    canvas: Rect,
    free: Vec<Rect>,
    used: Vec<Rect>,
    heuristic: PlacementHeuristic,
}

impl MaxRectsPacker {
    pub fn new(width: u32, height: u32, heuristic: PlacementHeuristic) -> Self {
        let canvas = Rect::new(0, 0, width, height);
        Self {
            canvas,
            free: vec![canvas],
            used: Vec::new(),
            heuristic,
        }
    }

    pub fn used_rects(&self) -> &[Rect] {
        &self.used
    }

    pub fn free_list_len(&self) -> usize {
        self.free.len()
    }

    /// Attempts to place a `w x h` rectangle. Returns its top-left position on success.
    pub fn insert(&mut self, w: u32, h: u32) -> Option<Rect> {
        let rect = self.find_position(w, h)?;
        self.place_rect(&rect);
        Some(rect)
    }

    fn find_position(&self, w: u32, h: u32) -> Option<Rect> {
        let mut best_score1 = i64::MAX;
        let mut best_score2 = i64::MAX;
        let mut best: Option<Rect> = None;

        for fr in &self.free {
            if fr.w < w || fr.h < h {
                continue;
            }
            let (s1, s2) = self.score(fr, w, h);
            if s1 < best_score1 || (s1 == best_score1 && s2 < best_score2) {
                best_score1 = s1;
                best_score2 = s2;
                best = Some(Rect::new(fr.x, fr.y, w, h));
            }
        }
        best
    }

    fn score(&self, fr: &Rect, w: u32, h: u32) -> (i64, i64) {
        let leftover_h = fr.w as i64 - w as i64;
        let leftover_v = fr.h as i64 - h as i64;
        let short_fit = leftover_h.min(leftover_v);
        let long_fit = leftover_h.max(leftover_v);
        let area_fit = (fr.w as i64 * fr.h as i64) - (w as i64 * h as i64);
        match self.heuristic {
            PlacementHeuristic::BestAreaFit => (area_fit, short_fit),
            PlacementHeuristic::BestShortSideFit => (short_fit, long_fit),
            PlacementHeuristic::BestLongSideFit => (long_fit, short_fit),
            PlacementHeuristic::BottomLeft => (fr.y as i64, fr.x as i64),
            PlacementHeuristic::ContactPoint => {
                let contact = self.contact_point_score(fr.x, fr.y, w, h);
                (-(contact as i64), area_fit)
            }
        }
    }

    /// Contact length: canvas-edge hugging plus shared edges with already-used rectangles.
    /// Each used-rectangle contribution is gated by touching the edge at all, then counted as
    /// the fixed `min(h, u.h)` / `min(w, u.w)`, not the actual overlapping span.
    fn contact_point_score(&self, x: u32, y: u32, w: u32, h: u32) -> u32 {
        let mut score = 0u32;
        if x == self.canvas.x {
            score += h;
        }
        if y == self.canvas.y {
            score += w;
        }
        for u in &self.used {
            if x == u.right() {
                score += h.min(u.h);
            }
            if y == u.bottom() {
                score += w.min(u.w);
            }
        }
        score
    }

    fn place_rect(&mut self, node: &Rect) {
        let mut new_free: Vec<Rect> = Vec::with_capacity(self.free.len());
        for fr in self.free.iter() {
            if !fr.intersects(node) {
                new_free.push(*fr);
                continue;
            }
            let ix1 = fr.x.max(node.x);
            let iy1 = fr.y.max(node.y);
            let ix2 = fr.right().min(node.right());
            let iy2 = fr.bottom().min(node.bottom());

            // above
            if iy1 > fr.y {
                new_free.push(Rect::new(fr.x, fr.y, fr.w, iy1 - fr.y));
            }
            // below
            if iy2 < fr.bottom() {
                new_free.push(Rect::new(fr.x, iy2, fr.w, fr.bottom() - iy2));
            }
            // left
            if ix1 > fr.x {
                let h = iy2.saturating_sub(iy1);
                if h > 0 {
                    new_free.push(Rect::new(fr.x, iy1, ix1 - fr.x, h));
                }
            }
            // right
            if ix2 < fr.right() {
                let h = iy2.saturating_sub(iy1);
                if h > 0 {
                    new_free.push(Rect::new(ix2, iy1, fr.right() - ix2, h));
                }
            }
        }
        self.free = new_free;
        self.prune_free_list();
        self.used.push(*node);
    }

    /// Removes any free rectangle fully contained in another.
    fn prune_free_list(&mut self) {
        let mut i = 0;
        while i < self.free.len() {
            let a = self.free[i];
            let mut removed = false;
            let mut j = i + 1;
            while j < self.free.len() {
                let b = self.free[j];
                if b.contains(&a) {
                    removed = true;
                    break;
                }
                if a.contains(&b) {
                    self.free.remove(j);
                    continue;
                }
                j += 1;
            }
            if removed {
                self.free.remove(i);
            } else {
                i += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn places_first_rect_at_origin() {
        let mut p = MaxRectsPacker::new(100, 100, PlacementHeuristic::BestAreaFit);
        let r = p.insert(10, 20).unwrap();
        assert_eq!((r.x, r.y, r.w, r.h), (0, 0, 10, 20));
    }

    #[test]
    fn refuses_oversized_rect() {
        let mut p = MaxRectsPacker::new(10, 10, PlacementHeuristic::BestAreaFit);
        assert!(p.insert(20, 20).is_none());
    }

    #[test]
    fn used_rects_never_overlap() {
        let mut p = MaxRectsPacker::new(64, 64, PlacementHeuristic::BottomLeft);
        let mut placed = Vec::new();
        for _ in 0..10 {
            if let Some(r) = p.insert(8, 8) {
                placed.push(r);
            }
        }
        for i in 0..placed.len() {
            for j in (i + 1)..placed.len() {
                assert!(!placed[i].intersects(&placed[j]));
            }
        }
    }

    #[test]
    fn free_list_stays_pruned() {
        let mut p = MaxRectsPacker::new(32, 32, PlacementHeuristic::BestShortSideFit);
        p.insert(4, 4);
        p.insert(4, 4);
        for i in 0..p.free.len() {
            for j in 0..p.free.len() {
                if i != j {
                    assert!(!p.free[j].contains(&p.free[i]));
                }
            }
        }
    }

    #[test]
    fn contact_point_prefers_hugging_used_edge() {
        let mut p = MaxRectsPacker::new(20, 10, PlacementHeuristic::ContactPoint);
        let first = p.insert(10, 10).unwrap();
        assert_eq!((first.x, first.y), (0, 0));
        let second = p.insert(10, 10).unwrap();
        assert_eq!((second.x, second.y), (10, 0));
    }
}
