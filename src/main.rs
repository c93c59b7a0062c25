use std::path::PathBuf;

use eframe::egui;

mod app;
mod document;
mod editor;
mod grid;
mod sprites;
mod viewport;

use app::TilescopeApp;

fn main() {
    env_logger::init();

    // Optional image path; everything can also be opened from the toolbar.
    let image_path = std::env::args().nth(1).map(PathBuf::from);
    if let Some(ref path) = image_path {
        if !path.exists() {
            eprintln!("File not found: {}", path.display());
            std::process::exit(1);
        }
    }

    let title = match image_path {
        Some(ref path) => format!(
            "tilescope — {}",
            path.file_name().unwrap_or_default().to_str().unwrap_or("")
        ),
        None => "tilescope".to_owned(),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title(&title),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| Ok(Box::new(TilescopeApp::new(image_path)))),
    )
    .expect("Failed to run eframe");
}
