use std::path::PathBuf;

use eframe::egui;
use image::DynamicImage;

use crate::document;
use crate::editor::{Editor, EditorEvent, Mode, Tool};
use crate::grid::{TileDescriptor, TileSize};
use crate::sprites::SpriteId;

const SPRITE_STROKE: egui::Color32 = egui::Color32::from_rgb(235, 80, 60);
const PREVIEW_STROKE: egui::Color32 = egui::Color32::from_rgb(255, 200, 60);
const GRID_LINE: egui::Color32 = egui::Color32::from_rgba_premultiplied(140, 140, 140, 90);
const TILE_FILL: egui::Color32 = egui::Color32::from_rgba_premultiplied(40, 90, 160, 60);

pub struct TilescopeApp {
    editor: Editor,

    image_path: Option<PathBuf>,
    raw_image: Option<DynamicImage>,
    texture: Option<egui::TextureHandle>,
    // Re-center the viewport once the canvas size is known.
    fit_view: bool,
    canvas_size: egui::Vec2,

    hover: Option<TileDescriptor>,
    tile_width: u32,
    tile_height: u32,

    // Edit buffers for the selected sprite, refilled on selection change.
    name_buf: String,
    comment_buf: String,

    status: String,
}

impl TilescopeApp {
    pub fn new(image_path: Option<PathBuf>) -> Self {
        let tile = TileSize::default();
        let mut app = Self {
            editor: Editor::default(),
            image_path: None,
            raw_image: None,
            texture: None,
            fit_view: false,
            canvas_size: egui::vec2(800.0, 600.0),
            hover: None,
            tile_width: tile.width,
            tile_height: tile.height,
            name_buf: String::new(),
            comment_buf: String::new(),
            status: "Open an image to get started".to_owned(),
        };
        if let Some(path) = image_path {
            app.load_image(path);
        }
        app
    }

    fn load_image(&mut self, path: PathBuf) {
        match image::open(&path) {
            Ok(img) => {
                log::info!(
                    "loaded image {} ({}x{})",
                    path.display(),
                    img.width(),
                    img.height()
                );
                self.status = format!(
                    "{} — {}x{}",
                    path.file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    img.width(),
                    img.height()
                );
                self.raw_image = Some(img);
                self.image_path = Some(path);
                self.texture = None;
                self.fit_view = true;
            }
            Err(err) => {
                log::warn!("could not open {}: {err}", path.display());
                self.status = format!("Could not open image: {err}");
            }
        }
    }

    fn image_name(&self) -> String {
        self.image_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_owned())
    }

    fn export_document(&mut self) {
        let doc = self.editor.export(&self.image_name());
        let text = match document::encode(&doc) {
            Ok(text) => text,
            Err(err) => {
                self.status = format!("Export failed: {err}");
                return;
            }
        };
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Sprite document", &["toml"])
            .set_file_name("sprites.toml")
            .save_file()
        else {
            return;
        };
        match std::fs::write(&path, text) {
            Ok(()) => {
                log::info!(
                    "exported {} sprite(s) to {}",
                    doc.sprites.len(),
                    path.display()
                );
                self.status = format!("Exported {} sprite(s)", doc.sprites.len());
            }
            Err(err) => self.status = format!("Export failed: {err}"),
        }
    }

    fn import_document(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Sprite document", &["toml"])
            .pick_file()
        else {
            return;
        };
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) => {
                self.status = format!("Import failed: {err}");
                return;
            }
        };
        match document::decode(&text) {
            Ok(doc) => {
                self.editor.import(&doc);
                self.status = format!("Imported {} sprite(s)", doc.sprites.len());
            }
            Err(err) => {
                log::warn!("rejected {}: {err}", path.display());
                self.status = format!("Import failed: {err}");
            }
        }
    }

    fn ensure_texture(&mut self, ctx: &egui::Context) {
        if self.texture.is_some() {
            return;
        }
        if let Some(ref img) = self.raw_image {
            let rgba = img.to_rgba8();
            let size = [rgba.width() as usize, rgba.height() as usize];
            let pixels = rgba.as_flat_samples();
            let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
            self.texture =
                Some(ctx.load_texture("image", color_image, egui::TextureOptions::NEAREST));
        }
    }

    fn sync_selection_buffers(&mut self, id: Option<SpriteId>) {
        match id.and_then(|id| self.editor.sprite(id)) {
            Some(s) => {
                self.name_buf = s.name.clone();
                self.comment_buf = s.comment.clone();
            }
            None => {
                self.name_buf.clear();
                self.comment_buf.clear();
            }
        }
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Open image…").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Images", &["png", "jpg", "jpeg", "gif", "bmp", "webp"])
                    .pick_file()
                {
                    self.load_image(path);
                }
            }
            ui.separator();

            let mut mode = self.editor.mode();
            ui.selectable_value(&mut mode, Mode::Tiles, "Tiles");
            ui.selectable_value(&mut mode, Mode::Sprites, "Sprites");
            self.editor.set_mode(mode);
            ui.separator();

            match self.editor.mode() {
                Mode::Tiles => {
                    ui.label("Tile:");
                    ui.add(egui::DragValue::new(&mut self.tile_width).range(1..=1024));
                    ui.label("×");
                    ui.add(egui::DragValue::new(&mut self.tile_height).range(1..=1024));
                    self.editor.set_tile_size(TileSize {
                        width: self.tile_width,
                        height: self.tile_height,
                    });
                    if let Some((cols, rows)) = self.editor.grid_size() {
                        ui.label(format!("{cols} × {rows} tiles"));
                    }
                }
                Mode::Sprites => {
                    let mut tool = self.editor.tool();
                    ui.selectable_value(&mut tool, Tool::Select, "Select");
                    ui.selectable_value(&mut tool, Tool::Rect, "Rect");
                    self.editor.set_tool(tool);
                    ui.separator();
                    if ui.button("Export…").clicked() {
                        self.export_document();
                    }
                    if ui.button("Import…").clicked() {
                        self.import_document();
                    }
                }
            }
            ui.separator();

            if ui.button("−").clicked() {
                self.editor
                    .set_scale_around_center(self.editor.scale() * 0.9, self.canvas_size);
            }
            if ui.button("+").clicked() {
                self.editor
                    .set_scale_around_center(self.editor.scale() * 1.1, self.canvas_size);
            }
            if ui.button("Fit").clicked() {
                self.editor.reset_view(self.canvas_size);
            }
            ui.label(format!("Zoom: {:.0}%", self.editor.scale() * 100.0));
        });
    }

    fn sprite_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Sprites");
        let rows: Vec<(SpriteId, String)> = self
            .editor
            .sprites()
            .iter()
            .map(|s| {
                (
                    s.id,
                    format!("{} — {}×{} @ ({}, {})", s.name, s.width, s.height, s.x, s.y),
                )
            })
            .collect();
        let selected = self.editor.selection();

        let mut clicked = None;
        let mut deleted = None;
        egui::ScrollArea::vertical().show(ui, |ui| {
            for (id, label) in &rows {
                ui.horizontal(|ui| {
                    if ui.selectable_label(selected == Some(*id), label).clicked() {
                        clicked = Some(*id);
                    }
                    if ui.small_button("✕").clicked() {
                        deleted = Some(*id);
                    }
                });
            }
        });
        if let Some(id) = clicked {
            self.editor.select_sprite(Some(id));
        }
        if let Some(id) = deleted {
            self.editor.delete_sprite(id);
        }

        if let Some(id) = self.editor.selection() {
            ui.separator();
            ui.label("Name:");
            if ui.text_edit_singleline(&mut self.name_buf).changed() {
                self.editor.rename_sprite(id, &self.name_buf);
            }
            ui.label("Comment:");
            if ui.text_edit_multiline(&mut self.comment_buf).changed() {
                self.editor.set_sprite_comment(id, &self.comment_buf);
            }
            if ui.button("Delete").clicked() {
                self.editor.delete_sprite(id);
            }
        }
    }

    fn paint_grid(&self, painter: &egui::Painter, origin: egui::Pos2) {
        let Some((w, h)) = self.editor.image_size() else {
            return;
        };
        let Some((cols, rows)) = self.editor.grid_size() else {
            return;
        };
        let tile = self.editor.tile_size();
        let vp = self.editor.viewport();
        let to_screen =
            |x: f32, y: f32| origin + vp.to_screen(egui::pos2(x, y)).to_vec2();
        let stroke = egui::Stroke::new(1.0, GRID_LINE);

        for col in 0..=cols {
            let x = (col * tile.width).min(w) as f32;
            painter.line_segment([to_screen(x, 0.0), to_screen(x, h as f32)], stroke);
        }
        for row in 0..=rows {
            let y = (row * tile.height).min(h) as f32;
            painter.line_segment([to_screen(0.0, y), to_screen(w as f32, y)], stroke);
        }

        if let Some(td) = &self.hover {
            let max_x = (td.x + tile.width).min(w) as f32;
            let max_y = (td.y + tile.height).min(h) as f32;
            let rect = egui::Rect::from_min_max(
                to_screen(td.x as f32, td.y as f32),
                to_screen(max_x, max_y),
            );
            painter.rect_filled(rect, 0.0, TILE_FILL);
            painter.text(
                td.mouse + origin.to_vec2() + egui::vec2(14.0, 18.0),
                egui::Align2::LEFT_TOP,
                format!(
                    "tile {} (col {}, row {}) @ {},{}",
                    td.index, td.col, td.row, td.x, td.y
                ),
                egui::FontId::proportional(13.0),
                egui::Color32::WHITE,
            );
        }
    }

    fn paint_sprites(&self, painter: &egui::Painter, origin: egui::Pos2) {
        let vp = self.editor.viewport();
        let to_screen =
            |x: f32, y: f32| origin + vp.to_screen(egui::pos2(x, y)).to_vec2();
        let selected = self.editor.selection();

        for s in self.editor.sprites() {
            // f32 sums: imported geometry can exceed u32 addition range.
            let rect = egui::Rect::from_min_max(
                to_screen(s.x as f32, s.y as f32),
                to_screen(s.x as f32 + s.width as f32, s.y as f32 + s.height as f32),
            );
            painter.rect_stroke(
                rect,
                0.0,
                egui::Stroke::new(2.0, SPRITE_STROKE),
                egui::StrokeKind::Middle,
            );
            painter.text(
                rect.left_top() + egui::vec2(2.0, -2.0),
                egui::Align2::LEFT_BOTTOM,
                &s.name,
                egui::FontId::proportional(12.0),
                SPRITE_STROKE,
            );
            if selected == Some(s.id) {
                painter.rect_stroke(
                    rect.expand(4.0),
                    2.0,
                    egui::Stroke::new(1.5, egui::Color32::from_rgb(0, 120, 255)),
                    egui::StrokeKind::Middle,
                );
            }
        }

        if let Some(p) = self.editor.preview() {
            let rect = egui::Rect::from_min_max(
                to_screen(p.x as f32, p.y as f32),
                to_screen(p.x as f32 + p.width as f32, p.y as f32 + p.height as f32),
            );
            painter.rect_stroke(
                rect,
                0.0,
                egui::Stroke::new(2.0, PREVIEW_STROKE),
                egui::StrokeKind::Middle,
            );
        }
    }

    fn canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let canvas_rect = response.rect;
        self.canvas_size = canvas_rect.size();
        let origin = canvas_rect.min;

        if self.fit_view {
            if let Some(ref img) = self.raw_image {
                self.editor
                    .set_image(img.width(), img.height(), self.canvas_size);
            }
            self.fit_view = false;
        }

        painter.rect_filled(canvas_rect, 0.0, egui::Color32::from_gray(40));

        if let Some(ref tex) = self.texture {
            if let Some((w, h)) = self.editor.image_size() {
                let vp = self.editor.viewport();
                let img_rect = egui::Rect::from_min_max(
                    origin + vp.to_screen(egui::Pos2::ZERO).to_vec2(),
                    origin + vp.to_screen(egui::pos2(w as f32, h as f32)).to_vec2(),
                );
                painter.image(
                    tex.id(),
                    img_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
            }
        }

        match self.editor.mode() {
            Mode::Tiles => self.paint_grid(&painter, origin),
            Mode::Sprites => self.paint_sprites(&painter, origin),
        }

        // Wheel zoom, anchored at the cursor.
        let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
        if scroll != 0.0 && response.hovered() {
            if let Some(cursor) = response.hover_pos() {
                self.editor.wheel((cursor - origin).to_pos2(), scroll);
            }
        }

        // Pointer events, in canvas-relative screen coordinates.
        let (pressed, released, moving, pointer_pos) = ui.ctx().input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.is_moving(),
                i.pointer.latest_pos(),
            )
        });
        if pressed && response.hovered() {
            if let Some(p) = pointer_pos {
                self.editor.pointer_down((p - origin).to_pos2());
            }
        }
        if moving && response.hovered() {
            if let Some(p) = pointer_pos {
                self.editor.pointer_move((p - origin).to_pos2());
            }
        }
        if released && self.editor.gesture_active() {
            self.editor.pointer_up();
        }
        // Leaving the canvas, whether into another panel or out of the
        // window, ends any gesture and clears a latched tile hover.
        if !response.hovered() && (self.editor.gesture_active() || self.hover.is_some()) {
            self.editor.pointer_leave();
            self.hover = None;
        }
    }
}

impl eframe::App for TilescopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ensure_texture(ctx);

        let typing = ctx.wants_keyboard_input();
        if !typing && ctx.input(|i| i.key_pressed(egui::Key::Delete)) {
            if let Some(id) = self.editor.selection() {
                self.editor.delete_sprite(id);
            }
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.toolbar(ui));
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.label(&self.status);
        });
        if self.editor.mode() == Mode::Sprites {
            egui::SidePanel::right("sprites")
                .default_width(260.0)
                .show(ctx, |ui| self.sprite_panel(ui));
        }
        egui::CentralPanel::default().show(ctx, |ui| self.canvas(ui));

        for event in self.editor.take_events() {
            match event {
                EditorEvent::HoverTile(td) => self.hover = td,
                EditorEvent::Selection(id) => self.sync_selection_buffers(id),
            }
        }
        if self.editor.take_dirty() {
            ctx.request_repaint();
        }
    }
}
