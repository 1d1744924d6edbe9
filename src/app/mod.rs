use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context};
use taxon_lens::config::PhysicsConfig;
use taxon_lens::graph::{PassRegistry, Viewport};
use taxon_lens::{Catalog, CommandSender, GraphEngine, LensConfig, LensWarning, ViewCommand};

mod canvas;
mod search;
mod ui;

type LoadResult = Result<Catalog, String>;

pub struct TaxonLensApp {
    catalog_path: PathBuf,
    config: LensConfig,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    engine: GraphEngine,
    commands: CommandSender,
    catalog_path: PathBuf,
    viewport: Viewport,
    search: String,
    search_edited_at: Option<f64>,
    detail_id: Option<String>,
    dragging: Option<String>,
    hovered: Option<usize>,
    last_world_size: Option<egui::Vec2>,
    physics: PhysicsConfig,
    lens_limit: usize,
    warnings: Vec<LensWarning>,
    status: Option<String>,
}

impl ViewModel {
    const SEARCH_DEBOUNCE_SECS: f64 = 0.25;
    const MAX_SHOWN_WARNINGS: usize = 64;

    fn new(catalog: Catalog, config: &LensConfig, catalog_path: PathBuf) -> Self {
        let physics = config.physics;
        let engine = GraphEngine::new(catalog, config.clone(), PassRegistry::with_defaults());
        let commands = engine.sender();
        tracing::info!(
            records = engine.model().record_count(),
            path = %catalog_path.display(),
            "catalog ready"
        );

        Self {
            engine,
            commands,
            catalog_path,
            viewport: Viewport::default(),
            search: String::new(),
            search_edited_at: None,
            detail_id: None,
            dragging: None,
            hovered: None,
            last_world_size: None,
            physics,
            lens_limit: 24,
            warnings: Vec::new(),
            status: None,
        }
    }

    fn send(&self, command: ViewCommand) {
        if self.commands.send(command).is_err() {
            tracing::warn!("graph engine dropped its command queue");
        }
    }

    fn collect_warnings(&mut self) {
        self.warnings.extend(self.engine.take_warnings());
        let excess = self.warnings.len().saturating_sub(Self::MAX_SHOWN_WARNINGS);
        self.warnings.drain(..excess);
    }
}

impl TaxonLensApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, catalog_path: PathBuf, config: LensConfig) -> Self {
        let state = AppState::Loading {
            rx: Self::spawn_load(catalog_path.clone(), config.clone()),
        };
        Self {
            catalog_path,
            config,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(path: PathBuf, config: LensConfig) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = Catalog::load(&path, &config.schema).map_err(|error| format!("{error:#}"));
            if let Err(error) = &result {
                tracing::error!(%error, "catalog load failed");
            }
            let _ = tx.send(result);
        });

        rx
    }

    fn ready(&self, catalog: Catalog) -> AppState {
        AppState::Ready(Box::new(ViewModel::new(
            catalog,
            &self.config,
            self.catalog_path.clone(),
        )))
    }
}

impl eframe::App for TaxonLensApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let mut retry = false;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(result);
                } else {
                    ctx.request_repaint();
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading catalog...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load catalog");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                model.show(ctx, &mut reload_requested, self.reload_rx.is_some());

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(
                        self.catalog_path.clone(),
                        self.config.clone(),
                    ));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(catalog)) => model.send(ViewCommand::ReplaceCatalog(catalog)),
                        Ok(Err(error)) => model.status = Some(format!("Reload failed: {error}")),
                        Err(TryRecvError::Empty) => self.reload_rx = Some(rx),
                        Err(TryRecvError::Disconnected) => {
                            model.status = Some("Background load worker disconnected".to_owned());
                        }
                    }
                }
            }
        }

        if retry {
            self.state = AppState::Loading {
                rx: Self::spawn_load(self.catalog_path.clone(), self.config.clone()),
            };
        } else if let Some(result) = transition {
            self.state = match result {
                Ok(catalog) => self.ready(catalog),
                Err(error) => AppState::Error(error),
            };
        }
    }
}
