use eframe::egui;
use mapview_core::geo::format_coords;
use mapview_core::viewport::pixel_to_normalized;
use mapview_core::{
    ClickOutcome, KeyAction, MapSession, MapType, SearchOutcome, Theme, YandexClient,
};

const CONTROLS_HINT: &str = "PgUp/PgDn: zoom | Arrows: move | Left: address | Right: organization";

const KEY_BINDINGS: [(egui::Key, KeyAction); 6] = [
    (egui::Key::PageUp, KeyAction::ZoomIn),
    (egui::Key::PageDown, KeyAction::ZoomOut),
    (egui::Key::ArrowUp, KeyAction::PanUp),
    (egui::Key::ArrowDown, KeyAction::PanDown),
    (egui::Key::ArrowLeft, KeyAction::PanLeft),
    (egui::Key::ArrowRight, KeyAction::PanRight),
];

#[derive(Debug, Clone, Copy, PartialEq)]
enum ClickKind {
    Address,
    Organization,
}

pub struct MapViewApp {
    session: MapSession<YandexClient>,

    // Map display
    texture: Option<egui::TextureHandle>,
    map_error: Option<String>,
    needs_reload: bool,

    // UI state
    search_input: String,
    error_message: Option<String>,
}

impl MapViewApp {
    pub fn new(client: YandexClient, map_size: (u32, u32)) -> Self {
        Self {
            session: MapSession::new(client, map_size),
            texture: None,
            map_error: None,
            needs_reload: true,
            search_input: String::new(),
            error_message: None,
        }
    }

    fn reload_map(&mut self, ctx: &egui::Context) {
        self.needs_reload = false;

        match self.session.render() {
            Ok(map) => {
                let size = [map.width() as usize, map.height() as usize];
                let pixels = egui::ColorImage::from_rgba_unmultiplied(size, map.image.as_raw());
                self.texture = Some(ctx.load_texture("map", pixels, egui::TextureOptions::LINEAR));
                self.map_error = None;
            }
            Err(e) => {
                log::warn!("Map loading failed: {:#}", e);
                self.texture = None;
                self.map_error = Some(format!("Map loading error: {}", e));
            }
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        // Arrow keys belong to the search field while it has focus
        if ctx.wants_keyboard_input() {
            return;
        }

        for (key, action) in KEY_BINDINGS {
            if ctx.input(|i| i.key_pressed(key)) {
                let before = *self.session.state();
                if *self.session.key(action) != before {
                    self.needs_reload = true;
                }
            }
        }
    }

    fn handle_click(&mut self, kind: ClickKind, norm: (f64, f64)) {
        self.error_message = None;

        let result = match kind {
            ClickKind::Address => self.session.click_reverse(norm.0, norm.1),
            ClickKind::Organization => self.session.click_organization(norm.0, norm.1),
        };

        match result {
            Ok(ClickOutcome::Address(_)) | Ok(ClickOutcome::Organization(_)) => {}
            Ok(outcome) => log::debug!("Click lookup: {:?}", outcome),
            Err(e) => {
                log::warn!("Lookup failed: {:#}", e);
                self.error_message = Some(format!("Lookup failed: {}", e));
            }
        }

        // The marker moved even when the lookup failed
        self.needs_reload = true;
    }

    fn run_search(&mut self) {
        self.error_message = None;

        match self.session.search(&self.search_input) {
            Ok(SearchOutcome::Found(_)) => self.needs_reload = true,
            Ok(SearchOutcome::NotFound) => {}
            Ok(SearchOutcome::EmptyQuery) => {
                self.error_message = Some("Enter a search query".to_string());
            }
            Err(e) => {
                log::warn!("Search failed: {:#}", e);
                self.error_message = Some(format!("Search failed: {}", e));
            }
        }
    }

    fn reset(&mut self) {
        self.session.reset();
        self.search_input.clear();
        self.error_message = None;
        self.needs_reload = true;
    }

    fn render_map(&mut self, ui: &mut egui::Ui) {
        let Some(texture) = &self.texture else {
            ui.centered_and_justified(|ui| match &self.map_error {
                Some(error) => ui.colored_label(egui::Color32::RED, error),
                None => ui.spinner(),
            });
            return;
        };

        let response = ui
            .add(egui::Image::new(texture).sense(egui::Sense::click()))
            .on_hover_cursor(egui::CursorIcon::Crosshair);

        let kind = if response.clicked() {
            Some(ClickKind::Address)
        } else if response.secondary_clicked() {
            Some(ClickKind::Organization)
        } else {
            None
        };

        if let (Some(kind), Some(pos)) = (kind, response.interact_pointer_pos()) {
            let rect = response.rect;
            let local = pos - rect.min;
            if let Some(norm) = pixel_to_normalized(
                f64::from(local.x),
                f64::from(local.y),
                f64::from(rect.width()),
                f64::from(rect.height()),
            ) {
                self.handle_click(kind, norm);
            }
        }

        ui.label(
            egui::RichText::new(CONTROLS_HINT)
                .small()
                .color(egui::Color32::GRAY),
        );
    }

    fn render_search(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.strong("Search");
            let input = ui.add(
                egui::TextEdit::singleline(&mut self.search_input)
                    .hint_text("Address or place..."),
            );
            let submitted = input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            ui.horizontal(|ui| {
                if ui.button("🔍 Search").clicked() || submitted {
                    self.run_search();
                }
                if ui.button("✖ Reset").clicked() {
                    self.reset();
                }
            });
        });
    }

    fn render_address(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.strong("Address");
            ui.label(self.session.address_line());

            let mut include_postal = self.session.include_postal_code();
            if ui.checkbox(&mut include_postal, "Append postal code").changed() {
                self.session.set_include_postal_code(include_postal);
            }
        });
    }

    fn render_settings(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.strong("Map settings");

            let state = *self.session.state();

            let mut theme = state.theme;
            egui::ComboBox::from_label("Theme")
                .selected_text(theme.label())
                .show_ui(ui, |ui| {
                    for option in [Theme::Light, Theme::Dark] {
                        ui.selectable_value(&mut theme, option, option.label());
                    }
                });
            if theme != state.theme {
                self.session.set_theme(theme);
                self.needs_reload = true;
            }

            let mut map_type = state.map_type;
            egui::ComboBox::from_label("Layers")
                .selected_text(map_type.label())
                .show_ui(ui, |ui| {
                    for option in MapType::ALL {
                        ui.selectable_value(&mut map_type, option, option.label());
                    }
                });
            if map_type != state.map_type {
                self.session.set_map_type(map_type);
                self.needs_reload = true;
            }

            ui.horizontal(|ui| {
                ui.label("Coordinates:");
                ui.monospace(format_coords(&state.center));
            });
            ui.horizontal(|ui| {
                ui.label("Zoom:");
                ui.monospace(state.zoom.to_string());
            });
        });
    }
}

impl eframe::App for MapViewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_keys(ctx);

        egui::SidePanel::right("controls")
            .resizable(false)
            .min_width(280.0)
            .show(ctx, |ui| {
                ui.add_space(8.0);
                self.render_search(ui);
                ui.add_space(8.0);
                self.render_address(ui);
                ui.add_space(8.0);
                self.render_settings(ui);

                if let Some(error) = &self.error_message {
                    ui.add_space(8.0);
                    ui.colored_label(egui::Color32::RED, format!("❌ {}", error));
                }
                if let Some(status) = self.session.status() {
                    ui.add_space(8.0);
                    ui.colored_label(egui::Color32::LIGHT_BLUE, format!("ℹ️ {}", status));
                }
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_map(ui);
        });

        // Blocking fetch; the frame after a gesture shows the new map
        if self.needs_reload {
            self.reload_map(ctx);
            ctx.request_repaint();
        }
    }
}
