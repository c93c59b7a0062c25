use egui::Pos2;

pub type SpriteId = u64;

/// A named rectangular region in world (image) coordinates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpriteRect {
    pub id: SpriteId,
    pub name: String,
    pub comment: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl SpriteRect {
    // Sums are done in f32: imported documents may carry coordinates large
    // enough to overflow a u32 addition.
    pub fn contains(&self, world: Pos2) -> bool {
        world.x >= self.x as f32
            && world.x <= self.x as f32 + self.width as f32
            && world.y >= self.y as f32
            && world.y <= self.y as f32 + self.height as f32
    }
}

/// The uncommitted rectangle shown while a draw gesture is in progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PreviewRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PreviewRect {
    pub fn has_area(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Clamp the moving corner into the image, round everything to whole pixels,
/// and express the span as min-corner plus extent.
pub fn normalize(
    start: Pos2,
    current: Pos2,
    image_width: u32,
    image_height: u32,
) -> PreviewRect {
    let sx = start.x.round();
    let sy = start.y.round();
    let cx = current.x.clamp(0.0, image_width as f32).round();
    let cy = current.y.clamp(0.0, image_height as f32).round();
    PreviewRect {
        x: sx.min(cx) as u32,
        y: sy.min(cy) as u32,
        width: (cx - sx).abs() as u32,
        height: (cy - sy).abs() as u32,
    }
}

/// Ordered collection of sprite rectangles. Insertion order is z-order: later
/// entries draw on top and win hit-tests. Ids are never reused.
#[derive(Debug, Default)]
pub struct SpriteStore {
    sprites: Vec<SpriteRect>,
    next_id: SpriteId,
    selected: Option<SpriteId>,
}

impl SpriteStore {
    pub fn sprites(&self) -> &[SpriteRect] {
        &self.sprites
    }

    pub fn get(&self, id: SpriteId) -> Option<&SpriteRect> {
        self.sprites.iter().find(|s| s.id == id)
    }

    pub fn selected(&self) -> Option<SpriteId> {
        self.selected
    }

    pub fn select(&mut self, id: Option<SpriteId>) {
        self.selected = id;
    }

    /// Append a rectangle with a fresh id and the default sequential name.
    /// Zero-area rectangles are discarded and nothing is added.
    pub fn create(&mut self, x: u32, y: u32, width: u32, height: u32) -> Option<SpriteId> {
        if width == 0 || height == 0 {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        // Default names can repeat after deletions; no uniqueness is promised.
        let name = format!("sprite_{}", self.sprites.len());
        self.sprites.push(SpriteRect {
            id,
            name,
            comment: String::new(),
            x,
            y,
            width,
            height,
        });
        Some(id)
    }

    /// Topmost-wins: the most recently added rectangle containing the point.
    /// Bounds are inclusive on all four edges.
    pub fn hit_test(&self, world: Pos2) -> Option<SpriteId> {
        self.sprites
            .iter()
            .rev()
            .find(|s| s.contains(world))
            .map(|s| s.id)
    }

    pub fn rename(&mut self, id: SpriteId, name: &str) {
        if let Some(s) = self.sprites.iter_mut().find(|s| s.id == id) {
            s.name = name.to_owned();
        }
    }

    pub fn set_comment(&mut self, id: SpriteId, comment: &str) {
        if let Some(s) = self.sprites.iter_mut().find(|s| s.id == id) {
            s.comment = comment.to_owned();
        }
    }

    pub fn delete(&mut self, id: SpriteId) {
        let before = self.sprites.len();
        self.sprites.retain(|s| s.id != id);
        if self.sprites.len() != before {
            log::debug!("deleted sprite {id}");
            if self.selected == Some(id) {
                self.selected = None;
            }
        }
    }

    /// Wholesale replacement used by import: previous ids and selection are
    /// gone, every entry gets a fresh id.
    pub fn replace_all(
        &mut self,
        entries: impl IntoIterator<Item = (String, String, u32, u32, u32, u32)>,
    ) {
        self.sprites.clear();
        self.selected = None;
        for (name, comment, x, y, width, height) in entries {
            let id = self.next_id;
            self.next_id += 1;
            self.sprites.push(SpriteRect {
                id,
                name,
                comment,
                x,
                y,
                width,
                height,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn create_assigns_sequential_default_names() {
        let mut store = SpriteStore::default();
        let a = store.create(0, 0, 10, 10).unwrap();
        let b = store.create(5, 5, 10, 10).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.get(a).unwrap().name, "sprite_0");
        assert_eq!(store.get(b).unwrap().name, "sprite_1");
    }

    #[test]
    fn default_name_can_repeat_after_delete() {
        let mut store = SpriteStore::default();
        let a = store.create(0, 0, 10, 10).unwrap();
        store.delete(a);
        let b = store.create(0, 0, 10, 10).unwrap();
        assert_eq!(store.get(b).unwrap().name, "sprite_0");
        assert_ne!(a, b, "ids are never reused");
    }

    #[test]
    fn zero_area_is_discarded() {
        let mut store = SpriteStore::default();
        assert_eq!(store.create(1, 1, 0, 5), None);
        assert_eq!(store.create(1, 1, 5, 0), None);
        assert!(store.sprites().is_empty());
    }

    #[test]
    fn hit_test_is_topmost_wins() {
        let mut store = SpriteStore::default();
        let bottom = store.create(0, 0, 50, 50).unwrap();
        let top = store.create(20, 20, 50, 50).unwrap();
        assert_eq!(store.hit_test(pos2(30.0, 30.0)), Some(top));
        assert_eq!(store.hit_test(pos2(5.0, 5.0)), Some(bottom));
        assert_eq!(store.hit_test(pos2(200.0, 200.0)), None);
    }

    #[test]
    fn hit_test_bounds_are_inclusive() {
        let mut store = SpriteStore::default();
        let id = store.create(10, 10, 20, 20).unwrap();
        assert_eq!(store.hit_test(pos2(10.0, 10.0)), Some(id));
        assert_eq!(store.hit_test(pos2(30.0, 30.0)), Some(id));
        assert_eq!(store.hit_test(pos2(30.1, 30.0)), None);
    }

    #[test]
    fn huge_imported_geometry_does_not_overflow() {
        let mut store = SpriteStore::default();
        store.replace_all(vec![(
            "big".to_owned(),
            String::new(),
            4_000_000_000,
            4_000_000_000,
            4_000_000_000,
            4_000_000_000,
        )]);
        let id = store.sprites()[0].id;
        assert_eq!(store.hit_test(pos2(4.5e9, 4.5e9)), Some(id));
        assert_eq!(store.hit_test(pos2(10.0, 10.0)), None);
    }

    #[test]
    fn mutations_on_unknown_id_are_noops() {
        let mut store = SpriteStore::default();
        let id = store.create(0, 0, 5, 5).unwrap();
        store.rename(id + 100, "ghost");
        store.set_comment(id + 100, "ghost");
        store.delete(id + 100);
        assert_eq!(store.sprites().len(), 1);
        assert_eq!(store.get(id).unwrap().name, "sprite_0");
    }

    #[test]
    fn delete_clears_matching_selection() {
        let mut store = SpriteStore::default();
        let a = store.create(0, 0, 5, 5).unwrap();
        let b = store.create(0, 0, 5, 5).unwrap();
        store.select(Some(a));
        store.delete(b);
        assert_eq!(store.selected(), Some(a));
        store.delete(a);
        assert_eq!(store.selected(), None);
    }

    #[test]
    fn normalize_orders_corners_and_clamps() {
        let r = normalize(pos2(50.0, 40.0), pos2(10.0, 10.0), 100, 80);
        assert_eq!(
            r,
            PreviewRect {
                x: 10,
                y: 10,
                width: 40,
                height: 30
            }
        );
        // Moving corner clamped to the image edge.
        let r = normalize(pos2(90.0, 70.0), pos2(500.0, -20.0), 100, 80);
        assert_eq!(
            r,
            PreviewRect {
                x: 90,
                y: 0,
                width: 10,
                height: 70
            }
        );
    }

    #[test]
    fn normalize_rounds_to_whole_pixels() {
        let r = normalize(pos2(10.4, 10.6), pos2(20.5, 19.4), 100, 80);
        assert_eq!((r.x, r.y), (10, 11));
        assert_eq!((r.width, r.height), (11, 8));
    }

    #[test]
    fn replace_all_assigns_fresh_ids() {
        let mut store = SpriteStore::default();
        let old = store.create(0, 0, 5, 5).unwrap();
        store.select(Some(old));
        store.replace_all(vec![
            ("walk".to_owned(), "first frame".to_owned(), 0, 0, 16, 16),
            ("run".to_owned(), String::new(), 16, 0, 16, 16),
        ]);
        assert_eq!(store.selected(), None);
        assert_eq!(store.sprites().len(), 2);
        assert!(store.sprites().iter().all(|s| s.id != old));
        assert_eq!(store.sprites()[0].comment, "first frame");
    }
}
