//! Pipe paths for Slint rendering.
//!
//! [`PipePathRenderer`] snapshots every pipe of a [`NodeGraph`] into
//! render rows (SVG path commands, stroke colour, width, tentative flag)
//! and can keep a Slint `VecModel` in step with them.
//!
//! ```ignore
//! let model = Rc::new(VecModel::<PipePath>::default());
//! let mut renderer = PipePathRenderer::new();
//! renderer.bind_model(model.clone(), |id, commands, color, width, tentative| PipePath {
//!     id,
//!     commands,
//!     color: color.into(),
//!     width,
//!     tentative,
//! });
//! window.set_pipe_paths(ModelRc::from(model));
//!
//! // after every graph change
//! renderer.update(&graph);
//! ```

use crate::graph::NodeGraph;
use crate::pipe::Pipe;
use slint::{Color, Model, ModelRc, SharedString, VecModel};
use std::rc::Rc;
use tracing::trace;

/// Render data for one pipe
#[derive(Debug, Clone, PartialEq)]
pub struct PipePathData {
    pub id: i32,
    pub path_commands: String,
    pub color: Color,
    pub line_width: f32,
    pub tentative: bool,
}

impl PipePathData {
    pub fn from_pipe(pipe: &Pipe) -> Self {
        let (color, line_width) = pipe.current_stroke();
        Self {
            id: pipe.id().get(),
            path_commands: pipe.path().to_svg_commands(),
            color,
            line_width,
            tentative: pipe.is_tentative(),
        }
    }
}

/// Render rows for every pipe, provisional ones included, in creation order
pub fn pipe_paths(graph: &NodeGraph) -> Vec<PipePathData> {
    graph.pipes().map(PipePathData::from_pipe).collect()
}

trait ModelSyncer {
    fn sync(&self, paths: &[PipePathData]);
}

struct ConcreteModelSyncer<P, F> {
    model: Rc<VecModel<P>>,
    constructor: F,
}

impl<P, F> ModelSyncer for ConcreteModelSyncer<P, F>
where
    P: Clone + 'static,
    F: Fn(i32, SharedString, Color, f32, bool) -> P,
{
    fn sync(&self, paths: &[PipePathData]) {
        sync_rows(&self.model, paths, &self.constructor);
    }
}

fn sync_rows<P, F>(model: &VecModel<P>, paths: &[PipePathData], constructor: &F)
where
    P: Clone + 'static,
    F: Fn(i32, SharedString, Color, f32, bool) -> P,
{
    for (i, path) in paths.iter().enumerate() {
        let item = constructor(
            path.id,
            SharedString::from(path.path_commands.as_str()),
            path.color,
            path.line_width,
            path.tentative,
        );
        if i < model.row_count() {
            model.set_row_data(i, item);
        } else {
            model.push(item);
        }
    }
    while model.row_count() > paths.len() {
        model.remove(model.row_count() - 1);
    }
}

/// Keeps the latest pipe render rows and an optional bound Slint model.
#[derive(Default)]
pub struct PipePathRenderer {
    paths: Vec<PipePathData>,
    syncer: Option<Box<dyn ModelSyncer>>,
}

impl PipePathRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a model; every later [`update`](Self::update) rewrites it in place.
    ///
    /// `constructor` receives `(id, path_commands, color, line_width, tentative)`.
    pub fn bind_model<P, F>(&mut self, model: Rc<VecModel<P>>, constructor: F)
    where
        P: Clone + 'static,
        F: Fn(i32, SharedString, Color, f32, bool) -> P + 'static,
    {
        self.syncer = Some(Box::new(ConcreteModelSyncer { model, constructor }));
    }

    pub fn is_bound(&self) -> bool {
        self.syncer.is_some()
    }

    /// Re-read every pipe from `graph` and push the rows to the bound model.
    pub fn update(&mut self, graph: &NodeGraph) {
        self.paths = pipe_paths(graph);
        trace!(rows = self.paths.len(), "pipe paths refreshed");
        if let Some(syncer) = &self.syncer {
            syncer.sync(&self.paths);
        }
    }

    pub fn paths(&self) -> &[PipePathData] {
        &self.paths
    }

    /// Build a fresh model from the current rows.
    pub fn create_paths_model<P, F>(&self, constructor: F) -> ModelRc<P>
    where
        P: Clone + 'static,
        F: Fn(i32, SharedString, Color, f32, bool) -> P + 'static,
    {
        let model = Rc::new(VecModel::default());
        sync_rows(&model, &self.paths, &constructor);
        ModelRc::from(model)
    }

    /// Rewrite an existing model in place from the current rows.
    pub fn update_paths_model<P, F>(&self, model: &VecModel<P>, constructor: F)
    where
        P: Clone + 'static,
        F: Fn(i32, SharedString, Color, f32, bool) -> P,
    {
        sync_rows(model, &self.paths, &constructor);
    }
}
