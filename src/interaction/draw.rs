use geo::{Geometry, LineString, Polygon};

use super::vertex::DragSession;
use crate::domain::{DrawMode, Provenance, ToolEvent};
use crate::geojson::{FeatureCollection, from_projected};
use crate::geometry::{Extent, GeometryEngine, PlanarOps, unwrap_coordinates};
use crate::viewport::Viewport;

/// What happened when a draw gesture ended
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOutcome {
    /// No draw tool was active
    Ignored,
    /// Released without moving; the tool stays active for another try
    Degenerate,
    /// Freehand shape crosses itself; the tool stays active
    Invalid(Geometry<f64>),
    /// Accepted shape. `geometry` is projected, `collection` geographic.
    Committed {
        geometry: Geometry<f64>,
        collection: FeatureCollection,
        provenance: Provenance,
    },
}

/// Draw mode plus the pointer state that goes with it
#[derive(Debug, Clone, Default)]
pub struct DrawController {
    mode: DrawMode,
    invalid_draw: bool,
    drag: Option<DragSession>,
}

impl DrawController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    pub fn invalid_draw(&self) -> bool {
        self.invalid_draw
    }

    pub fn set_invalid_draw(&mut self, invalid: bool) {
        self.invalid_draw = invalid;
    }

    pub fn drag(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    pub(crate) fn drag_mut(&mut self) -> Option<&mut DragSession> {
        self.drag.as_mut()
    }

    pub fn begin_drag(&mut self, session: DragSession) -> bool {
        if !self.mode.allows_vertex_editing() {
            return false;
        }
        self.drag = Some(session);
        true
    }

    pub fn end_drag(&mut self) -> Option<DragSession> {
        self.drag.take()
    }

    /// Feed a tool event through the mode machine.
    ///
    /// The viewport is brought back inside the valid extent first: draw
    /// handlers misbehave once the view has wrapped several worlds away.
    pub fn handle(&mut self, event: ToolEvent, viewport: &mut Viewport) -> DrawMode {
        viewport.go_to_valid_extent();
        let next = self.mode.transition(event);
        if next != self.mode {
            log::debug!("draw mode {:?} -> {:?}", self.mode, next);
        }
        if next.is_drawing() {
            self.drag = None;
        }
        if event == ToolEvent::Cancel {
            self.invalid_draw = false;
        }
        self.mode = next;
        next
    }

    /// A new sketch started. Returns whether the draw layer should be cleared.
    pub fn draw_start(&mut self) -> bool {
        self.mode.is_drawing()
    }

    /// Finish a sketch given as a projected ring
    pub fn draw_end<P: PlanarOps>(
        &mut self,
        ring: &LineString<f64>,
        projection: &Extent,
        engine: &GeometryEngine<P>,
    ) -> DrawOutcome {
        let Some(provenance) = self.mode.provenance() else {
            return DrawOutcome::Ignored;
        };

        let unwrapped = unwrap_coordinates(std::slice::from_ref(ring), projection);
        let Some(exterior) = unwrapped.into_iter().next() else {
            return DrawOutcome::Degenerate;
        };
        let geometry = Geometry::Polygon(Polygon::new(exterior, vec![]));
        let collection = from_projected(&geometry);

        let degenerate = match collection.features.first().and_then(|f| f.bbox.as_deref()) {
            Some([min_x, min_y, max_x, max_y]) => min_x == max_x || min_y == max_y,
            _ => true,
        };
        if degenerate {
            log::debug!("discarding draw with no area");
            return DrawOutcome::Degenerate;
        }

        if self.mode == DrawMode::DrawFree && !engine.is_valid_polygon(&collection) {
            log::debug!("freehand draw is not a valid polygon");
            self.invalid_draw = true;
            return DrawOutcome::Invalid(geometry);
        }

        self.invalid_draw = false;
        self.mode = self.mode.transition(ToolEvent::Finish);
        DrawOutcome::Committed {
            geometry,
            collection,
            provenance,
        }
    }
}
