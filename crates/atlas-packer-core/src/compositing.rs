use image::RgbaImage;

/// Blits all of `src` into `canvas` at destination top-left `(dx, dy)`. No rotation, no
/// extrusion, no debug outlines: this crate's packer never rotates and the Non-goals exclude
/// edge-extrusion/GPU-upload concerns, so a plain copy is all compositing needs to do.
pub fn blit_rgba(src: &RgbaImage, canvas: &mut RgbaImage, dx: u32, dy: u32) {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = src.dimensions();
    for yy in 0..sh {
        if dy + yy >= ch {
            break;
        }
        for xx in 0..sw {
            if dx + xx >= cw {
                break;
            }
            let px = *src.get_pixel(xx, yy);
            canvas.put_pixel(dx + xx, dy + yy, px);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn blit_copies_every_pixel_in_bounds() {
        let mut src = RgbaImage::new(2, 2);
        src.put_pixel(0, 0, Rgba([1, 2, 3, 4]));
        src.put_pixel(1, 1, Rgba([5, 6, 7, 8]));
        let mut canvas = RgbaImage::new(4, 4);
        blit_rgba(&src, &mut canvas, 1, 1);
        assert_eq!(*canvas.get_pixel(1, 1), Rgba([1, 2, 3, 4]));
        assert_eq!(*canvas.get_pixel(2, 2), Rgba([5, 6, 7, 8]));
        assert_eq!(*canvas.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn blit_clips_against_canvas_bounds() {
        let src = RgbaImage::new(5, 5);
        let mut canvas = RgbaImage::new(3, 3);
        // Should not panic even though src overflows canvas from (1,1).
        blit_rgba(&src, &mut canvas, 1, 1);
    }
}
