use egui::{pos2, vec2, Pos2, Vec2};

pub const MIN_SCALE: f32 = 0.1;
pub const MAX_SCALE: f32 = 10.0;

/// Pan/zoom transform between screen space (canvas pixels) and world space
/// (image pixels). The mapping is `screen = world * scale + offset`.
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    scale: f32,
    offset: Vec2,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: Vec2::ZERO,
        }
    }
}

impl Viewport {
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Convert screen-space coords to world (image) space.
    pub fn to_world(&self, screen: Pos2) -> Pos2 {
        pos2(
            (screen.x - self.offset.x) / self.scale,
            (screen.y - self.offset.y) / self.scale,
        )
    }

    /// Convert world (image) coords to screen space.
    pub fn to_screen(&self, world: Pos2) -> Pos2 {
        pos2(
            world.x * self.scale + self.offset.x,
            world.y * self.scale + self.offset.y,
        )
    }

    /// Pan deltas are screen-space, not scaled.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Zoom so that the world point under `screen` stays under `screen`.
    pub fn zoom_at(&mut self, screen: Pos2, new_scale: f32) {
        let new_scale = new_scale.clamp(MIN_SCALE, MAX_SCALE);
        let anchor = self.to_world(screen);
        self.scale = new_scale;
        self.offset = screen.to_vec2() - anchor.to_vec2() * new_scale;
    }

    /// Same anchoring as `zoom_at`, anchored at the viewport center instead of
    /// the pointer. Used by the toolbar zoom buttons.
    pub fn set_scale_around_center(&mut self, new_scale: f32, viewport_size: Vec2) {
        self.zoom_at((viewport_size * 0.5).to_pos2(), new_scale);
    }

    /// Position the image centered in the viewport at the current scale.
    pub fn center_on(&mut self, image_size: Vec2, viewport_size: Vec2) {
        self.offset = (viewport_size - image_size * self.scale) * 0.5;
    }

    pub fn reset(&mut self, viewport_size: Vec2, image_size: Vec2) {
        self.scale = 1.0;
        self.center_on(image_size, viewport_size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Pos2, b: Pos2) {
        assert!((a - b).length() < 1e-3, "{a:?} != {b:?}");
    }

    #[test]
    fn to_screen_inverts_to_world() {
        let mut vp = Viewport::default();
        vp.pan(vec2(13.5, -70.25));
        vp.zoom_at(pos2(40.0, 40.0), 2.5);
        for p in [pos2(0.0, 0.0), pos2(17.0, 230.0), pos2(-55.0, 3.125)] {
            assert_close(vp.to_screen(vp.to_world(p)), p);
            assert_close(vp.to_world(vp.to_screen(p)), p);
        }
    }

    #[test]
    fn zoom_keeps_cursor_anchor_fixed() {
        let mut vp = Viewport::default();
        vp.pan(vec2(20.0, 5.0));
        let cursor = pos2(120.0, 90.0);
        let before = vp.to_world(cursor);
        vp.zoom_at(cursor, 3.7);
        assert_close(vp.to_world(cursor), before);
        vp.zoom_at(cursor, 0.4);
        assert_close(vp.to_world(cursor), before);
    }

    #[test]
    fn scale_stays_clamped() {
        let mut vp = Viewport::default();
        for _ in 0..100 {
            let s = vp.scale() * 1.1;
            vp.zoom_at(pos2(10.0, 10.0), s);
        }
        assert_eq!(vp.scale(), MAX_SCALE);
        for _ in 0..200 {
            let s = vp.scale() * 0.9;
            vp.zoom_at(pos2(10.0, 10.0), s);
        }
        assert_eq!(vp.scale(), MIN_SCALE);
    }

    #[test]
    fn pan_is_screen_space() {
        let mut vp = Viewport::default();
        vp.zoom_at(pos2(0.0, 0.0), 2.0);
        let before = vp.to_screen(pos2(10.0, 10.0));
        vp.pan(vec2(7.0, -3.0));
        let after = vp.to_screen(pos2(10.0, 10.0));
        assert_close(after, before + vec2(7.0, -3.0));
    }

    #[test]
    fn center_anchored_scale_keeps_center_fixed() {
        let mut vp = Viewport::default();
        let view = vec2(800.0, 600.0);
        vp.center_on(vec2(100.0, 80.0), view);
        let center_world = vp.to_world((view * 0.5).to_pos2());
        vp.set_scale_around_center(4.0, view);
        assert_close(vp.to_world((view * 0.5).to_pos2()), center_world);
    }

    #[test]
    fn reset_centers_image_at_unit_scale() {
        let mut vp = Viewport::default();
        vp.zoom_at(pos2(33.0, 44.0), 5.0);
        vp.pan(vec2(100.0, 100.0));
        vp.reset(vec2(800.0, 600.0), vec2(200.0, 100.0));
        assert_eq!(vp.scale(), 1.0);
        assert_close(vp.to_screen(pos2(100.0, 50.0)), pos2(400.0, 300.0));
    }
}
