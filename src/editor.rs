use egui::{Pos2, Vec2};

use crate::document::{self, SpriteDoc};
use crate::grid::{self, TileDescriptor, TileSize};
use crate::sprites::{self, PreviewRect, SpriteId, SpriteRect, SpriteStore};
use crate::viewport::Viewport;

/// Which editing surface is active: the tile grid inspector or the sprite
/// region editor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Tiles,
    Sprites,
}

/// What a press-and-drag means in sprite mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tool {
    Select,
    Rect,
}

#[derive(Clone, Copy, Debug)]
enum Gesture {
    Idle,
    // Last pointer position in screen space, updated on every move.
    Panning { last: Pos2 },
    // Rounded world point of the press, the fixed corner of the draw.
    Drawing { anchor: Pos2 },
}

/// Outputs consumed by presentation code.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EditorEvent {
    /// Delivered on every pointer move in tile mode; `None` outside the image.
    HoverTile(Option<TileDescriptor>),
    /// Delivered whenever the selected sprite changes.
    Selection(Option<SpriteId>),
}

/// One editor instance: viewport, sprite store, and the pointer-driven state
/// machine that mutates them. Every transition is total; invalid gestures are
/// absorbed as no-ops.
pub struct Editor {
    viewport: Viewport,
    store: SpriteStore,
    image_size: Option<(u32, u32)>,
    tile_size: TileSize,
    mode: Mode,
    tool: Tool,
    gesture: Gesture,
    preview: Option<PreviewRect>,
    events: Vec<EditorEvent>,
    dirty: bool,
}

impl Default for Editor {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            store: SpriteStore::default(),
            image_size: None,
            tile_size: TileSize::default(),
            mode: Mode::Tiles,
            tool: Tool::Select,
            gesture: Gesture::Idle,
            preview: None,
            events: Vec::new(),
            dirty: false,
        }
    }
}

impl Editor {
    // ── Queries ─────────────────────────────────────────────────────────────

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn scale(&self) -> f32 {
        self.viewport.scale()
    }

    pub fn image_size(&self) -> Option<(u32, u32)> {
        self.image_size
    }

    pub fn tile_size(&self) -> TileSize {
        self.tile_size
    }

    pub fn grid_size(&self) -> Option<(u32, u32)> {
        self.image_size
            .map(|(w, h)| grid::grid_size(self.tile_size, w, h))
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn sprites(&self) -> &[SpriteRect] {
        self.store.sprites()
    }

    pub fn sprite(&self, id: SpriteId) -> Option<&SpriteRect> {
        self.store.get(id)
    }

    pub fn selection(&self) -> Option<SpriteId> {
        self.store.selected()
    }

    pub fn preview(&self) -> Option<PreviewRect> {
        self.preview
    }

    pub fn gesture_active(&self) -> bool {
        !matches!(self.gesture, Gesture::Idle)
    }

    /// Drain events emitted since the last call.
    pub fn take_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    /// True when state changed since the last call and a repaint is wanted.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    // ── Configuration ───────────────────────────────────────────────────────

    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            self.mode = mode;
            self.gesture = Gesture::Idle;
            self.preview = None;
            self.dirty = true;
        }
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    pub fn set_tile_size(&mut self, tile: TileSize) {
        if tile.width > 0 && tile.height > 0 && tile != self.tile_size {
            self.tile_size = tile;
            self.dirty = true;
        }
    }

    /// Register a freshly decoded image; the viewport re-centers on it.
    pub fn set_image(&mut self, width: u32, height: u32, viewport_size: Vec2) {
        self.image_size = Some((width, height));
        self.viewport
            .reset(viewport_size, Vec2::new(width as f32, height as f32));
        self.gesture = Gesture::Idle;
        self.preview = None;
        self.dirty = true;
    }

    pub fn reset_view(&mut self, viewport_size: Vec2) {
        if let Some((w, h)) = self.image_size {
            self.viewport
                .reset(viewport_size, Vec2::new(w as f32, h as f32));
            self.dirty = true;
        }
    }

    pub fn set_scale_around_center(&mut self, scale: f32, viewport_size: Vec2) {
        self.viewport.set_scale_around_center(scale, viewport_size);
        self.dirty = true;
    }

    // ── Pointer transitions ─────────────────────────────────────────────────

    pub fn pointer_down(&mut self, screen: Pos2) {
        match (self.mode, self.tool) {
            (Mode::Sprites, Tool::Rect) => {
                let world = self.viewport.to_world(screen);
                if self.world_in_image(world) {
                    self.gesture = Gesture::Drawing {
                        anchor: world.round(),
                    };
                }
                // Presses outside the image are absorbed.
            }
            (Mode::Sprites, Tool::Select) => {
                let world = self.viewport.to_world(screen);
                if let Some(id) = self.store.hit_test(world) {
                    // Selection is a single click; no drag state is entered.
                    self.set_selection(Some(id));
                } else {
                    self.set_selection(None);
                    self.gesture = Gesture::Panning { last: screen };
                }
            }
            (Mode::Tiles, _) => {
                self.gesture = Gesture::Panning { last: screen };
            }
        }
        self.dirty = true;
    }

    pub fn pointer_move(&mut self, screen: Pos2) {
        match self.gesture {
            Gesture::Panning { last } => {
                self.viewport.pan(screen - last);
                self.gesture = Gesture::Panning { last: screen };
                self.dirty = true;
            }
            Gesture::Drawing { anchor } => {
                if let Some((w, h)) = self.image_size {
                    let world = self.viewport.to_world(screen);
                    self.preview = Some(sprites::normalize(anchor, world, w, h));
                    self.dirty = true;
                }
            }
            Gesture::Idle => {
                if self.mode == Mode::Tiles {
                    let hover = self.image_size.and_then(|(w, h)| {
                        grid::tile_at(
                            self.viewport.to_world(screen),
                            self.tile_size,
                            w,
                            h,
                            screen,
                        )
                    });
                    self.events.push(EditorEvent::HoverTile(hover));
                    self.dirty = true;
                }
            }
        }
    }

    pub fn pointer_up(&mut self) {
        if let Gesture::Drawing { .. } = self.gesture {
            if let Some(p) = self.preview.take() {
                if p.has_area() {
                    if let Some(id) = self.store.create(p.x, p.y, p.width, p.height) {
                        log::debug!(
                            "committed sprite {id} at ({}, {}) {}x{}",
                            p.x,
                            p.y,
                            p.width,
                            p.height
                        );
                        self.set_selection(Some(id));
                    }
                }
            }
        }
        self.gesture = Gesture::Idle;
        self.preview = None;
        self.dirty = true;
    }

    /// The pointer left the canvas: finish whatever gesture was in flight so
    /// the drag is not lost.
    pub fn pointer_leave(&mut self) {
        self.pointer_up();
        if self.mode == Mode::Tiles {
            self.events.push(EditorEvent::HoverTile(None));
        }
    }

    /// Wheel zoom, available in every state. One notch scales by 1.1 or 0.9,
    /// anchored at the pointer.
    pub fn wheel(&mut self, screen: Pos2, scroll_y: f32) {
        if scroll_y == 0.0 {
            return;
        }
        let factor = if scroll_y > 0.0 { 1.1 } else { 0.9 };
        self.viewport
            .zoom_at(screen, self.viewport.scale() * factor);
        self.dirty = true;
    }

    // ── Sprite mutation ─────────────────────────────────────────────────────

    pub fn select_sprite(&mut self, id: Option<SpriteId>) {
        self.set_selection(id);
        self.dirty = true;
    }

    pub fn rename_sprite(&mut self, id: SpriteId, name: &str) {
        self.store.rename(id, name);
        self.dirty = true;
    }

    pub fn set_sprite_comment(&mut self, id: SpriteId, comment: &str) {
        self.store.set_comment(id, comment);
        self.dirty = true;
    }

    pub fn delete_sprite(&mut self, id: SpriteId) {
        let was_selected = self.store.selected() == Some(id);
        self.store.delete(id);
        if was_selected && self.store.selected().is_none() {
            self.events.push(EditorEvent::Selection(None));
        }
        self.dirty = true;
    }

    // ── Documents ───────────────────────────────────────────────────────────

    pub fn export(&self, image_name: &str) -> SpriteDoc {
        document::export(&self.store, image_name)
    }

    pub fn import(&mut self, doc: &SpriteDoc) {
        let had_selection = self.store.selected().is_some();
        document::import(&mut self.store, doc);
        if had_selection {
            self.events.push(EditorEvent::Selection(None));
        }
        self.dirty = true;
    }

    // ── Internals ───────────────────────────────────────────────────────────

    fn world_in_image(&self, world: Pos2) -> bool {
        match self.image_size {
            Some((w, h)) => {
                world.x >= 0.0 && world.y >= 0.0 && world.x < w as f32 && world.y < h as f32
            }
            None => false,
        }
    }

    fn set_selection(&mut self, id: Option<SpriteId>) {
        if self.store.selected() != id {
            self.store.select(id);
            self.events.push(EditorEvent::Selection(id));
        }
    }
}
