use std::path::PathBuf;

use clap::Parser;
use eframe::egui;
use egui_extras::{Column, TableBuilder};
use leafmark::config::MAX_BRUSH_SIZE;
use leafmark::ledger::COLUMNS;
use leafmark::{AnnotatorConfig, AnnotatorError, MarkerPosition, Session, ToolMode};

// ── CLI ─────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "leafmark",
    about = "Count stomata and trichomes and measure vein coverage on leaf micrographs"
)]
struct Cli {
    /// Image to open at start-up (PNG, JPEG or BMP)
    image: Option<PathBuf>,

    /// JSON file with the default brush size
    #[arg(long)]
    config: Option<PathBuf>,
}

// ── App ─────────────────────────────────────────────────────────────────────

struct LeafmarkApp {
    session: Session,

    texture: Option<egui::TextureHandle>,
    // (image generation, buffer revision) last uploaded to the GPU
    uploaded: Option<(u64, u64)>,
    generation: u64,

    show_table: bool,
    warning: Option<String>,

    // pan & zoom
    pan: egui::Vec2,
    zoom: f32,
    panning: bool,
}

impl LeafmarkApp {
    fn new(session: Session) -> Self {
        Self {
            session,
            texture: None,
            uploaded: None,
            generation: 0,
            show_table: false,
            warning: None,
            pan: egui::Vec2::ZERO,
            zoom: 1.0,
            panning: false,
        }
    }

    fn image_size(&self) -> egui::Vec2 {
        self.session
            .buffer()
            .map(|b| {
                let (w, h) = b.dimensions();
                egui::vec2(w as f32, h as f32)
            })
            .unwrap_or(egui::vec2(1000.0, 1000.0))
    }

    /// Convert image-space coords to screen-space
    fn image_to_screen(&self, canvas_rect: egui::Rect, img_pos: egui::Pos2) -> egui::Pos2 {
        let center = canvas_rect.center();
        center + self.pan + (img_pos.to_vec2() - self.image_size() * 0.5) * self.zoom
    }

    /// Convert screen-space coords to image-space
    fn screen_to_image(&self, canvas_rect: egui::Rect, screen_pos: egui::Pos2) -> egui::Pos2 {
        let center = canvas_rect.center();
        let rel = screen_pos - center - self.pan;
        let size = self.image_size();
        egui::pos2(rel.x / self.zoom + size.x * 0.5, rel.y / self.zoom + size.y * 0.5)
    }

    fn image_rect_on_screen(&self, canvas_rect: egui::Rect) -> egui::Rect {
        let top_left = self.image_to_screen(canvas_rect, egui::Pos2::ZERO);
        let bot_right = self.image_to_screen(canvas_rect, self.image_size().to_pos2());
        egui::Rect::from_min_max(top_left, bot_right)
    }

    fn to_marker_position(&self, canvas_rect: egui::Rect, screen_pos: egui::Pos2) -> MarkerPosition {
        let p = self.screen_to_image(canvas_rect, screen_pos);
        MarkerPosition::new(p.x.floor() as i32, p.y.floor() as i32)
    }

    fn open_image_dialog(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .set_title("Select an Image")
            .add_filter("Image Files", &["jpg", "jpeg", "png", "bmp"])
            .pick_file()
        else {
            return;
        };
        match self.session.open_image(&path) {
            Ok(()) => {
                self.generation += 1;
                self.pan = egui::Vec2::ZERO;
                self.zoom = 1.0;
            }
            Err(e) => {
                log::error!("{e}: {}", error_chain(&e));
                self.warning = Some(format!("Could not open {}", path.display()));
            }
        }
    }

    fn calculate(&mut self) {
        match self.session.calculate() {
            Ok(_) => self.show_table = true,
            Err(AnnotatorError::NoImageLoaded) => {
                self.warning = Some("No image loaded.".to_string());
            }
            Err(e) => log::error!("{e}"),
        }
    }

    fn export_dialog(&mut self) {
        let destination = rfd::FileDialog::new()
            .set_file_name("measurements.csv")
            .add_filter("CSV files", &["csv"])
            .save_file();
        if let Err(e) = self.session.export_csv(destination.as_deref()) {
            log::error!("{e}: {}", error_chain(&e));
            self.warning = Some(e.to_string());
        }
    }

    /// Re-upload the composited image when the buffer changed.
    fn sync_texture(&mut self, ctx: &egui::Context) {
        let Some(buffer) = self.session.buffer() else {
            self.texture = None;
            self.uploaded = None;
            return;
        };
        let key = (self.generation, buffer.revision());
        if self.uploaded == Some(key) {
            return;
        }
        let rgb = buffer.composite();
        let size = [rgb.width() as usize, rgb.height() as usize];
        let color_image = egui::ColorImage::from_rgb(size, rgb.as_raw());
        match &mut self.texture {
            Some(tex) => tex.set(color_image, egui::TextureOptions::LINEAR),
            None => {
                self.texture =
                    Some(ctx.load_texture("image", color_image, egui::TextureOptions::LINEAR));
            }
        }
        self.uploaded = Some(key);
    }

    /// Outline under the cursor showing what a click would draw.
    fn draw_cursor_preview(&self, painter: &egui::Painter, pos: egui::Pos2) {
        let tool = self.session.tool();
        let (radius, color) = match tool.marker_style() {
            Some(style) => {
                let [r, g, b] = style.color.0;
                (style.radius as f32, egui::Color32::from_rgb(r, g, b))
            }
            None => (self.session.brush_size() as f32, egui::Color32::RED),
        };
        painter.circle_stroke(pos, radius * self.zoom, egui::Stroke::new(1.0, color));
    }

    fn table_window(&mut self, ctx: &egui::Context) {
        let mut open = self.show_table;
        let mut export_clicked = false;
        let rows = self.session.ledger().rows();

        egui::Window::new("Measurements Table")
            .open(&mut open)
            .resizable(true)
            .default_width(440.0)
            .show(ctx, |ui| {
                TableBuilder::new(ui)
                    .striped(true)
                    .max_scroll_height(320.0)
                    .columns(Column::auto().at_least(100.0), COLUMNS.len())
                    .header(20.0, |mut header| {
                        for title in COLUMNS {
                            header.col(|ui| {
                                ui.strong(title);
                            });
                        }
                    })
                    .body(|mut body| {
                        for row in rows {
                            body.row(18.0, |mut r| {
                                r.col(|ui| {
                                    ui.label(&row.image_id);
                                });
                                r.col(|ui| {
                                    ui.label(row.stomata_count.to_string());
                                });
                                r.col(|ui| {
                                    ui.label(row.trichome_count.to_string());
                                });
                                r.col(|ui| {
                                    ui.label(format!("{:.2}", row.vein_coverage));
                                });
                            });
                        }
                    });
                ui.separator();
                if ui.button("Export to CSV").clicked() {
                    export_clicked = true;
                }
            });

        self.show_table = open;
        if export_clicked {
            self.export_dialog();
        }
    }

    fn warning_window(&mut self, ctx: &egui::Context) {
        let Some(message) = self.warning.clone() else {
            return;
        };
        egui::Window::new("Warning")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(&message);
                if ui.button("OK").clicked() {
                    self.warning = None;
                }
            });
    }
}

fn error_chain(e: &AnnotatorError) -> String {
    let mut parts = Vec::new();
    let mut source = std::error::Error::source(e);
    while let Some(s) = source {
        parts.push(s.to_string());
        source = s.source();
    }
    parts.join(": ")
}

// ── eframe App impl ────────────────────────────────────────────────────────

impl eframe::App for LeafmarkApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.sync_texture(ctx);

        // Top toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Open Image").clicked() {
                    self.open_image_dialog();
                }
                ui.separator();
                for tool in ToolMode::ALL {
                    let selected = self.session.tool() == tool;
                    if ui.selectable_label(selected, tool.label()).clicked() {
                        self.session.select_tool(tool);
                    }
                }
                ui.separator();
                ui.label("Brush:");
                let mut brush = self.session.brush_size();
                if ui
                    .add(egui::Slider::new(&mut brush, 0..=MAX_BRUSH_SIZE))
                    .changed()
                {
                    self.session.set_brush_size(brush);
                }
                ui.separator();
                if ui.button("Calculate").clicked() {
                    self.calculate();
                }
                if ui.button("Show Table").clicked() {
                    self.show_table = true;
                }
                ui.separator();
                ui.label(format!("Zoom: {:.0}%", self.zoom * 100.0));
                if let Some(buffer) = self.session.buffer() {
                    ui.separator();
                    ui.label(format!(
                        "{} | stomata {} | trichomes {}",
                        buffer.image_id(),
                        buffer.stomata_positions().len(),
                        buffer.trichome_positions().len()
                    ));
                }
            });
        });

        // Canvas
        egui::CentralPanel::default().show(ctx, |ui| {
            let (response, painter) =
                ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
            let canvas_rect = response.rect;

            painter.rect_filled(canvas_rect, 0.0, egui::Color32::from_gray(40));

            let img_rect = self.image_rect_on_screen(canvas_rect);
            if let Some(ref tex) = self.texture {
                painter.image(
                    tex.id(),
                    img_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
            } else {
                painter.text(
                    canvas_rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "Open an image to start annotating",
                    egui::FontId::proportional(18.0),
                    egui::Color32::from_gray(160),
                );
            }

            if self.texture.is_some() {
                if let Some(pos) = response.hover_pos() {
                    self.draw_cursor_preview(&painter, pos);
                }
            }

            // Handle pan (middle mouse button)
            let middle_down = ctx.input(|i| i.pointer.middle_down());
            if middle_down {
                let delta = ctx.input(|i| i.pointer.delta());
                self.pan += delta;
                self.panning = true;
            } else {
                self.panning = false;
            }

            // Handle zoom (scroll wheel)
            let scroll_delta = ctx.input(|i| i.smooth_scroll_delta.y);
            if scroll_delta != 0.0 && response.hovered() {
                let zoom_factor = 1.0 + scroll_delta * 0.002;
                let new_zoom = (self.zoom * zoom_factor).clamp(0.1, 10.0);
                if let Some(cursor) = response.hover_pos() {
                    let center = canvas_rect.center();
                    let cursor_rel = cursor - center - self.pan;
                    self.pan -= cursor_rel * (new_zoom / self.zoom - 1.0);
                }
                self.zoom = new_zoom;
            }

            if self.panning {
                return;
            }

            // Clicks only count on the image; drags keep painting past its edge.
            let pressed = ctx.input(|i| i.pointer.primary_pressed());
            if pressed && response.hovered() {
                if let Some(pos) = response.hover_pos().filter(|p| img_rect.contains(*p)) {
                    let position = self.to_marker_position(canvas_rect, pos);
                    self.session.on_pointer_down(position);
                }
            }

            if response.dragged_by(egui::PointerButton::Primary)
                && response.drag_delta() != egui::Vec2::ZERO
            {
                if let Some(pos) = ctx.input(|i| i.pointer.interact_pos()) {
                    let position = self.to_marker_position(canvas_rect, pos);
                    self.session.on_pointer_drag(position);
                }
            }
        });

        self.table_window(ctx);
        self.warning_window(ctx);
    }
}

// ── Main ────────────────────────────────────────────────────────────────────

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => match AnnotatorConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{e}: {}", error_chain(&e));
                std::process::exit(1);
            }
        },
        None => AnnotatorConfig::default(),
    };

    let mut app = LeafmarkApp::new(Session::new(config));
    if let Some(path) = cli.image.as_deref() {
        match app.session.open_image(path) {
            Ok(()) => app.generation += 1,
            Err(e) => log::error!("{e}: {}", error_chain(&e)),
        }
    }

    let title = "Leaf Annotator";
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 1000.0])
            .with_title(title),
        ..Default::default()
    };

    eframe::run_native(title, options, Box::new(move |_cc| Ok(Box::new(app))))
}
