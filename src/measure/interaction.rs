//! Interaction state machine for the measurement canvas.
//!
//! Tool switches and pointer events arrive here and are translated into
//! [`AreaStore`] mutations. Every transition is a synchronous update; callers redraw
//! afterwards.
//!
//! | mode   | event                         | effect                                   |
//! |--------|-------------------------------|------------------------------------------|
//! | select | pointer down                  | select the first area containing it      |
//! | draw   | pointer down                  | start or extend the current path         |
//! | draw   | finish                        | commit (>= 3 points) and return to select|
//! | edit   | pointer down on a vertex      | begin dragging that vertex               |
//! | edit   | pointer move while dragging   | move the vertex, recompute measurements  |

use bevy::prelude::*;

use super::geometry::nearest_vertex;
use super::store::AreaStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorMode {
    #[default]
    Select,
    Edit,
    Draw,
}

impl EditorMode {
    pub fn display_name(&self) -> &'static str {
        match self {
            EditorMode::Select => "Select (V)",
            EditorMode::Edit => "Edit (E)",
            EditorMode::Draw => "Draw (D)",
        }
    }

    pub fn all() -> &'static [EditorMode] {
        &[EditorMode::Select, EditorMode::Edit, EditorMode::Draw]
    }
}

/// What a pointer event did, for callers that want to react (cursor, logging).
#[derive(Debug, Clone, PartialEq)]
pub enum PointerOutcome {
    Nothing,
    Selected(String),
    PathStarted,
    PathExtended(usize),
    DragStarted { id: String, vertex: usize },
}

/// Vertex currently being dragged in edit mode.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexDrag {
    pub area_id: String,
    pub vertex: usize,
}

#[derive(Resource, Debug, Default)]
pub struct InteractionState {
    mode: EditorMode,
    current_path: Vec<Vec2>,
    drag: Option<VertexDrag>,
}

impl InteractionState {
    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    /// Points of the in-progress draw (empty unless drawing).
    pub fn current_path(&self) -> &[Vec2] {
        &self.current_path
    }

    pub fn drag(&self) -> Option<&VertexDrag> {
        self.drag.as_ref()
    }

    pub fn is_drawing(&self) -> bool {
        self.mode == EditorMode::Draw && !self.current_path.is_empty()
    }

    /// Explicit tool switch. Switching into draw always starts from an empty path.
    pub fn switch_tool(&mut self, mode: EditorMode) {
        if mode == EditorMode::Draw {
            self.current_path.clear();
        }
        if mode != EditorMode::Edit {
            self.drag = None;
        }
        if self.mode != mode {
            debug!("Editor mode {:?} -> {:?}", self.mode, mode);
        }
        self.mode = mode;
    }

    /// Primary-button press at `point`.
    ///
    /// `vertex_radius` is the hit radius for vertex handles in canvas units (already
    /// scaled for zoom by the caller).
    pub fn pointer_down(
        &mut self,
        point: Vec2,
        vertex_radius: f32,
        store: &mut AreaStore,
    ) -> PointerOutcome {
        match self.mode {
            EditorMode::Select => select_at(point, store),
            EditorMode::Draw => {
                self.current_path.push(point);
                if self.current_path.len() == 1 {
                    PointerOutcome::PathStarted
                } else {
                    PointerOutcome::PathExtended(self.current_path.len())
                }
            }
            EditorMode::Edit => {
                if let Some(selected) = store.selected()
                    && let Some(vertex) =
                        nearest_vertex(selected.coordinates(), point, vertex_radius)
                {
                    let id = selected.id().to_string();
                    self.drag = Some(VertexDrag {
                        area_id: id.clone(),
                        vertex,
                    });
                    return PointerOutcome::DragStarted { id, vertex };
                }
                // Not on a handle: let the user pick which area to edit
                select_at(point, store)
            }
        }
    }

    /// Pointer moved to `point` with the primary button held.
    pub fn pointer_move(&mut self, point: Vec2, store: &mut AreaStore) -> bool {
        let Some(drag) = self.drag.clone() else {
            return false;
        };
        self.drag_vertex(&drag.area_id, drag.vertex, point, store)
    }

    pub fn pointer_up(&mut self) {
        if let Some(drag) = self.drag.take() {
            debug!("Finished dragging vertex {} of {}", drag.vertex, drag.area_id);
        }
    }

    /// Replace vertex `index` of the selected area. Only valid in edit mode and only for
    /// the currently selected area; anything else is a no-op.
    pub fn drag_vertex(
        &mut self,
        area_id: &str,
        index: usize,
        point: Vec2,
        store: &mut AreaStore,
    ) -> bool {
        if self.mode != EditorMode::Edit || store.selected_area_id() != Some(area_id) {
            return false;
        }
        store.move_vertex(area_id, index, point)
    }

    /// Commit the current path (if it has at least three points) and return to select.
    pub fn finish_drawing(&mut self, store: &mut AreaStore) -> Option<String> {
        if self.mode != EditorMode::Draw {
            return None;
        }
        let path = std::mem::take(&mut self.current_path);
        let committed = store.commit_drawn_polygon(&path);
        self.mode = EditorMode::Select;
        committed
    }

    /// Drop the in-progress path and keep drawing.
    pub fn cancel_drawing(&mut self) {
        if !self.current_path.is_empty() {
            debug!("Cancelled draw with {} points", self.current_path.len());
        }
        self.current_path.clear();
    }
}

fn select_at(point: Vec2, store: &mut AreaStore) -> PointerOutcome {
    let Some(id) = store.find_containing(point).map(|a| a.id().to_string()) else {
        return PointerOutcome::Nothing;
    };
    store.select(&id);
    PointerOutcome::Selected(id)
}
