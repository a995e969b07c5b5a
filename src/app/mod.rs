use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Pos2, Rect, Vec2, pos2};
use tracing::{error, info};

use crate::config::ViewSettings;
use crate::source::{GraphData, LinkKind, NodeKind, load_graph};

mod camera;
mod filter;
mod graph;
mod highlight;
mod interaction;
mod navigation;
mod paint;
mod physics;
mod render_utils;
mod simulation;
mod ui;

use camera::Camera;
use filter::FilterState;
use highlight::SelectionState;
use interaction::InteractionMachine;
use navigation::{NavigationRequest, Navigator, UrlNavigator};
use physics::PhysicsConfig;
use simulation::SimulationController;

type LoadResult = Result<GraphData, String>;

pub struct RelGraphApp {
    payload_path: PathBuf,
    settings: ViewSettings,
    navigator: Box<dyn Navigator>,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    graph: GraphData,
    filter: FilterState,
    selection: SelectionState,
    interaction: InteractionMachine,
    simulation: SimulationController,
    physics: PhysicsConfig,
    camera: Camera,
    show_labels: bool,
    search: String,
    graph_dirty: bool,
    render_graph_revision: u64,
    render: RenderGraph,
    search_match_cache: Option<SearchMatchCache>,
    canvas_rect: Rect,
    pending_navigation: Option<NavigationRequest>,
    status: Option<String>,
}

struct SearchMatchCache {
    query: String,
    graph_revision: u64,
    matches: Arc<HashSet<usize>>,
}

/// Who may move a node: the simulation, an active drag, or nobody until released.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Ownership {
    Simulated,
    Dragged,
    Pinned,
}

#[derive(Default)]
struct RenderGraph {
    nodes: Vec<RenderNode>,
    links: Vec<RenderLink>,
    index_by_id: HashMap<String, usize>,
    /// Layout of nodes currently filtered out, restored if they become visible again.
    parked: HashMap<String, RenderNode>,
    physics_scratch: PhysicsScratch,
    view_scratch: ViewScratch,
}

#[derive(Default)]
struct PhysicsScratch {
    positions: Vec<Vec2>,
    forces: Vec<Vec2>,
}

#[derive(Default)]
struct ViewScratch {
    screen_positions: Vec<Pos2>,
    screen_radii: Vec<f32>,
}

#[derive(Clone, Debug)]
struct RenderNode {
    id: String,
    kind: NodeKind,
    world_pos: Vec2,
    velocity: Vec2,
    ownership: Ownership,
}

#[derive(Clone, Debug)]
struct RenderLink {
    id: String,
    source: usize,
    target: usize,
    kind: LinkKind,
}

impl RelGraphApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        payload_path: PathBuf,
        settings: ViewSettings,
        record_url: Option<String>,
    ) -> Self {
        let state = Self::start_load(payload_path.clone());
        Self {
            payload_path,
            settings,
            navigator: Box::new(UrlNavigator::new(record_url)),
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(payload_path: PathBuf) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_graph(&payload_path).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(payload_path: PathBuf) -> AppState {
        info!(path = %payload_path.display(), "loading graph payload");
        AppState::Loading {
            rx: Self::spawn_load(payload_path),
        }
    }

    fn load_failed(message: String) -> AppState {
        error!(%message, "graph payload load failed");
        AppState::Error(message)
    }

    fn disconnected() -> AppState {
        Self::load_failed("Background load worker disconnected".to_owned())
    }

    fn transition(&mut self, next_state: AppState) {
        self.reload_rx = None;
        self.state = next_state;
    }

    fn retry(&mut self) {
        let next_state = Self::start_load(self.payload_path.clone());
        self.transition(next_state);
    }

    /// Next state once the initial load worker has answered, if it has.
    fn poll_initial_load(&self) -> Option<AppState> {
        let AppState::Loading { rx } = &self.state else {
            return None;
        };

        match rx.try_recv() {
            Ok(Ok(graph)) => Some(AppState::Ready(Box::new(ViewModel::new(
                graph,
                &self.settings,
            )))),
            Ok(Err(message)) => Some(Self::load_failed(message)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Self::disconnected()),
        }
    }

    fn request_refresh(&mut self) {
        if self.reload_rx.is_none() && matches!(self.state, AppState::Ready(_)) {
            info!(path = %self.payload_path.display(), "refreshing graph payload");
            self.reload_rx = Some(Self::spawn_load(self.payload_path.clone()));
        }
    }

    /// Applies a finished refresh to the ready model. A failed refresh yields
    /// the error state; a pending one keeps its receiver.
    fn poll_refresh(&mut self) -> Option<AppState> {
        let rx = self.reload_rx.take()?;

        match rx.try_recv() {
            Ok(Ok(graph)) => {
                if let AppState::Ready(model) = &mut self.state {
                    model.replace_graph(graph);
                }
                None
            }
            Ok(Err(message)) => Some(Self::load_failed(message)),
            Err(TryRecvError::Empty) => {
                self.reload_rx = Some(rx);
                None
            }
            Err(TryRecvError::Disconnected) => Some(Self::disconnected()),
        }
    }
}

impl eframe::App for RelGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        if let Some(next_state) = self.poll_initial_load() {
            self.transition(next_state);
        }

        let mut retry_requested = false;
        let mut reload_requested = false;

        match &mut self.state {
            AppState::Loading { .. } => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading relationship graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint();
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the relationship graph");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    retry_requested = ui.button("Retry").clicked();
                });
            }
            AppState::Ready(model) => {
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &mut reload_requested, is_reloading);

                if let Some(request) = model.pending_navigation.take() {
                    model.status = Some(self.navigator.open_record(ctx, &request));
                }
            }
        }

        if retry_requested {
            self.retry();
        }
        if reload_requested {
            self.request_refresh();
        }
        if let Some(next_state) = self.poll_refresh() {
            self.transition(next_state);
        }
        if self.reload_rx.is_some() {
            ctx.request_repaint();
        }
    }
}

fn default_canvas_rect() -> Rect {
    Rect::from_min_max(pos2(0.0, 0.0), pos2(960.0, 640.0))
}

#[cfg(test)]
pub(in crate::app) mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::app::filter::tests::scenario_graph;

    /// View model over the m1/p1/f1/t1 scenario with its render graph built.
    pub(in crate::app) fn scenario_model() -> ViewModel {
        let mut model = ViewModel::new(scenario_graph(), &ViewSettings::default());
        model.rebuild_render_graph();
        model
    }

    #[test]
    fn new_model_starts_running_with_every_node_displayed() {
        let model = scenario_model();
        assert!(model.simulation.is_running());
        assert!(!model.graph_dirty);
        assert_eq!(model.render.nodes.len(), 4);
        assert_eq!(model.render.links.len(), 3);
        assert!(
            model
                .render
                .nodes
                .iter()
                .all(|node| node.ownership == Ownership::Simulated)
        );
    }

    fn app_in(state: AppState) -> RelGraphApp {
        RelGraphApp {
            payload_path: PathBuf::from("/nonexistent/relgraph-payload.json"),
            settings: ViewSettings::default(),
            navigator: Box::new(UrlNavigator::default()),
            state,
            reload_rx: None,
        }
    }

    fn answered(result: LoadResult) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();
        tx.send(result).unwrap();
        rx
    }

    fn error_message(app: &RelGraphApp) -> Option<&str> {
        match &app.state {
            AppState::Error(message) => Some(message.as_str()),
            _ => None,
        }
    }

    #[test]
    fn initial_load_waits_then_becomes_ready() {
        let (tx, rx) = mpsc::channel();
        let mut app = app_in(AppState::Loading { rx });
        assert!(app.poll_initial_load().is_none());

        tx.send(Ok(scenario_graph())).unwrap();
        let next_state = app.poll_initial_load().unwrap();
        app.transition(next_state);

        let AppState::Ready(model) = &app.state else {
            panic!("expected the ready state");
        };
        assert_eq!(model.graph.node_count(), 4);
        assert!(app.poll_initial_load().is_none());
    }

    #[test]
    fn initial_load_failure_shows_the_error() {
        let mut app = app_in(AppState::Loading {
            rx: answered(Err("bad payload".to_owned())),
        });
        let next_state = app.poll_initial_load().unwrap();
        app.transition(next_state);
        assert_eq!(error_message(&app), Some("bad payload"));
    }

    #[test]
    fn vanished_worker_is_an_error() {
        let (tx, rx) = mpsc::channel::<LoadResult>();
        drop(tx);
        let app = app_in(AppState::Loading { rx });
        let next_state = app.poll_initial_load().unwrap();
        assert!(matches!(next_state, AppState::Error(message) if message.contains("disconnected")));
    }

    #[test]
    fn successful_refresh_replaces_the_graph_in_place() {
        let mut model = scenario_model();
        model.set_selected(Some("m1".to_owned()));
        let mut app = app_in(AppState::Ready(Box::new(model)));
        app.reload_rx = Some(answered(Ok(scenario_graph())));

        assert!(app.poll_refresh().is_none());
        assert!(app.reload_rx.is_none());
        let AppState::Ready(model) = &app.state else {
            panic!("expected the ready state");
        };
        assert!(!model.selection.is_active());
        assert!(model.graph_dirty);
        assert_eq!(model.status.as_deref(), Some("Graph refreshed"));
    }

    #[test]
    fn pending_refresh_keeps_its_receiver() {
        let (_tx, rx) = mpsc::channel();
        let mut app = app_in(AppState::Ready(Box::new(scenario_model())));
        app.reload_rx = Some(rx);

        assert!(app.poll_refresh().is_none());
        assert!(app.reload_rx.is_some());

        app.request_refresh();
        assert!(app.reload_rx.is_some());
    }

    #[test]
    fn failed_refresh_shows_the_error_and_drops_the_receiver() {
        let mut app = app_in(AppState::Ready(Box::new(scenario_model())));
        app.reload_rx = Some(answered(Err("payload went away".to_owned())));

        let next_state = app.poll_refresh().unwrap();
        app.transition(next_state);
        assert_eq!(error_message(&app), Some("payload went away"));
        assert!(app.reload_rx.is_none());
        assert!(app.poll_refresh().is_none());
    }

    #[test]
    fn retry_reloads_from_disk() {
        let mut app = app_in(AppState::Error("earlier failure".to_owned()));
        app.retry();
        assert!(matches!(app.state, AppState::Loading { .. }));

        let deadline = Instant::now() + Duration::from_secs(5);
        let next_state = loop {
            if let Some(next_state) = app.poll_initial_load() {
                break next_state;
            }
            assert!(Instant::now() < deadline, "load worker never answered");
            std::thread::sleep(Duration::from_millis(10));
        };
        app.transition(next_state);

        let message = error_message(&app).unwrap();
        assert!(message.contains("failed to read graph payload"), "{message}");
    }
}
