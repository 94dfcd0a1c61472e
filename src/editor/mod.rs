//! One AOI editing surface: a viewport, the session it edits, the draw
//! controller and the projected draw layer shown on the map
//!
//! Every editor owns its own state, so several can run side by side.

use geo::{Coord, Geometry, LineString, Polygon};

use crate::config::EditorConfig;
use crate::domain::{DrawMode, Provenance, SearchResult, ToolEvent};
use crate::error::{AoiError, Result};
use crate::geojson::{self, Feature, FeatureCollection};
use crate::geometry::{
    Extent, GeoOps, GeometryEngine, PlanarOps, unproject_geometry, unwrap_extent, unwrap_geometry,
};
use crate::interaction::{DragSession, DrawController, DrawOutcome, drag_ring, find_vertex};
use crate::session::{AoiSession, CUSTOM_POLYGON_TITLE};
use crate::viewport::Viewport;

/// Flags the surrounding UI renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Signals {
    /// The working selection may be used for the next step
    pub next_enabled: bool,
    /// The last draw or vertex edit produced a self-crossing shape
    pub invalid_draw: bool,
}

/// Result of a pointer event in the vertex drag protocol
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// No vertex is being dragged
    Idle,
    Moved,
    /// The move would collapse the shape; the previous ring is kept
    Rejected,
    /// Released on a valid shape, which is now the working selection
    Committed(FeatureCollection),
    /// Released on a self-crossing shape; the selection is unchanged
    Invalid,
}

fn polygons(geometry: &Geometry<f64>) -> Vec<&Polygon<f64>> {
    match geometry {
        Geometry::Polygon(p) => vec![p],
        Geometry::MultiPolygon(mp) => mp.0.iter().collect(),
        _ => Vec::new(),
    }
}

fn polygon_mut(geometry: &mut Geometry<f64>, index: usize) -> Option<&mut Polygon<f64>> {
    match geometry {
        Geometry::Polygon(p) if index == 0 => Some(p),
        Geometry::MultiPolygon(mp) => mp.0.get_mut(index),
        _ => None,
    }
}

fn to_geographic(layer: &[Geometry<f64>]) -> FeatureCollection {
    FeatureCollection::new(
        layer
            .iter()
            .map(|g| Feature::new(geojson::from_geo(&unproject_geometry(g))))
            .collect(),
    )
}

pub struct AoiEditor<P: PlanarOps = GeoOps> {
    config: EditorConfig,
    viewport: Viewport,
    session: AoiSession<P>,
    draw: DrawController,
    /// Projected shapes currently on the map
    layer: Vec<Geometry<f64>>,
    /// Highlighted vertex under the pointer
    marker: Option<Coord<f64>>,
    buffer_preview: Option<FeatureCollection>,
    pending_buffer_m: f64,
    next_enabled: bool,
}

impl AoiEditor<GeoOps> {
    pub fn new(config: EditorConfig) -> Self {
        Self::with_engine(config, GeometryEngine::new())
    }
}

impl Default for AoiEditor<GeoOps> {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl<P: PlanarOps> AoiEditor<P> {
    pub fn with_engine(config: EditorConfig, engine: GeometryEngine<P>) -> Self {
        let mut viewport = Viewport::new(config.viewport_width_px, config.viewport_height_px)
            .with_tile_size(config.tile_size_px)
            .with_zoom_limits(config.min_zoom, config.max_zoom);
        viewport.set_zoom(config.initial_zoom);

        let session =
            AoiSession::new(engine).with_limits(config.max_buffer_m, config.max_aoi_sq_km);

        Self {
            config,
            viewport,
            session,
            draw: DrawController::new(),
            layer: Vec::new(),
            marker: None,
            buffer_preview: None,
            pending_buffer_m: 0.0,
            next_enabled: false,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn session(&self) -> &AoiSession<P> {
        &self.session
    }

    pub fn mode(&self) -> DrawMode {
        self.draw.mode()
    }

    pub fn layer(&self) -> &[Geometry<f64>] {
        &self.layer
    }

    pub fn marker(&self) -> Option<Coord<f64>> {
        self.marker
    }

    pub fn buffer_preview(&self) -> Option<&FeatureCollection> {
        self.buffer_preview.as_ref()
    }

    pub fn pending_buffer_m(&self) -> f64 {
        self.pending_buffer_m
    }

    /// The current selection in EPSG:4326
    pub fn working(&self) -> Option<&FeatureCollection> {
        self.session.working()
    }

    pub fn signals(&self) -> Signals {
        Signals {
            next_enabled: self.next_enabled,
            invalid_draw: self.draw.invalid_draw(),
        }
    }

    fn refresh_next_enabled(&mut self) {
        self.next_enabled = self.session.next_enabled();
    }

    /// Put the working selection on the map
    fn show_working(&mut self) {
        self.layer = self.working().map(geojson::to_projected).unwrap_or_default();
        self.buffer_preview = None;
        self.pending_buffer_m = 0.0;
        self.refresh_next_enabled();
    }

    /// Pick the box or freehand tool. `ToolEvent::Cancel` behaves like
    /// [`AoiEditor::cancel`].
    pub fn select_tool(&mut self, event: ToolEvent) -> DrawMode {
        if event == ToolEvent::Cancel {
            self.cancel();
            return self.draw.mode();
        }
        self.marker = None;
        self.draw.handle(event, &mut self.viewport)
    }

    /// Leave any tool, clearing the drawing and the selection
    pub fn cancel(&mut self) {
        self.draw.handle(ToolEvent::Cancel, &mut self.viewport);
        self.draw.end_drag();
        self.layer.clear();
        self.marker = None;
        self.buffer_preview = None;
        self.pending_buffer_m = 0.0;
        self.session.clear();
        self.next_enabled = false;
    }

    pub fn draw_start(&mut self) {
        if self.draw.draw_start() {
            self.layer.clear();
        }
    }

    /// Finish a sketch given as a projected ring
    pub fn draw_end(&mut self, ring: &LineString<f64>) -> DrawOutcome {
        let outcome = self
            .draw
            .draw_end(ring, self.viewport.projection(), self.session.engine());

        match &outcome {
            DrawOutcome::Committed {
                geometry,
                collection,
                provenance,
            } => {
                let description = match provenance {
                    Provenance::Box => "Box",
                    _ => "Draw",
                };
                self.session.set_from_drawn_geometry(
                    collection.clone(),
                    *provenance,
                    CUSTOM_POLYGON_TITLE,
                    description,
                );
                self.layer = vec![geometry.clone()];
                self.buffer_preview = None;
                self.pending_buffer_m = 0.0;
                self.refresh_next_enabled();
            }
            DrawOutcome::Invalid(geometry) => {
                // leave the sketch visible so the user can see what crossed
                self.layer = vec![geometry.clone()];
            }
            DrawOutcome::Degenerate | DrawOutcome::Ignored => {}
        }
        outcome
    }

    fn hit_vertex(&self, pixel: Coord<f64>) -> Option<DragSession> {
        let tolerance = self.config.vertex_tolerance_px;
        self.layer.iter().enumerate().find_map(|(f, geometry)| {
            polygons(geometry).into_iter().enumerate().find_map(|(p, polygon)| {
                find_vertex(pixel, polygon.exterior(), tolerance, &self.viewport)
                    .map(|(v, coord)| DragSession::new(f, p, v, coord))
            })
        })
    }

    /// Pointer pressed: start dragging the vertex under it, if any
    pub fn pointer_down(&mut self, pixel: Coord<f64>) -> bool {
        if !self.draw.mode().allows_vertex_editing() {
            return false;
        }
        match self.hit_vertex(pixel) {
            Some(session) => {
                log::trace!(
                    "picked vertex {} of feature {}",
                    session.vertex,
                    session.feature
                );
                self.draw.begin_drag(session)
            }
            None => false,
        }
    }

    /// Pointer moved with a vertex picked
    pub fn pointer_drag(&mut self, pixel: Coord<f64>) -> DragOutcome {
        let to = self.viewport.coordinate_from_pixel(pixel);
        let Some(session) = self.draw.drag().copied() else {
            return DragOutcome::Idle;
        };
        let Some(polygon) = self
            .layer
            .get_mut(session.feature)
            .and_then(|g| polygon_mut(g, session.polygon))
        else {
            return DragOutcome::Idle;
        };

        let Some(ring) = drag_ring(polygon.exterior(), &session, to) else {
            return DragOutcome::Rejected;
        };
        polygon.exterior_mut(|exterior| *exterior = ring);

        if let Some(active) = self.draw.drag_mut() {
            active.coordinate = to;
        }
        self.marker = Some(to);
        DragOutcome::Moved
    }

    /// Pointer released: unwrap the edited shape and commit it if valid
    pub fn pointer_up(&mut self) -> DragOutcome {
        let Some(session) = self.draw.end_drag() else {
            return DragOutcome::Idle;
        };
        self.marker = None;

        let projection = *self.viewport.projection();
        let Some(geometry) = self.layer.get_mut(session.feature) else {
            return DragOutcome::Idle;
        };
        *geometry = unwrap_geometry(geometry, &projection);

        let collection = to_geographic(&self.layer);
        let edited = collection
            .features
            .get(session.feature)
            .cloned()
            .map(FeatureCollection::single)
            .unwrap_or_default();

        if !self.session.engine().is_valid_polygon(&edited) {
            log::debug!("vertex edit produced an invalid polygon");
            self.draw.set_invalid_draw(true);
            self.next_enabled = false;
            return DragOutcome::Invalid;
        }

        if let Err(e) = self.session.commit_edit(collection.clone()) {
            log::debug!("vertex edit not committed: {e}");
            return DragOutcome::Invalid;
        }
        self.draw.set_invalid_draw(false);
        self.buffer_preview = None;
        self.pending_buffer_m = 0.0;
        self.refresh_next_enabled();
        DragOutcome::Committed(collection)
    }

    /// Pointer moved with nothing picked: highlight the vertex under it
    pub fn pointer_move(&mut self, pixel: Coord<f64>) -> Option<Coord<f64>> {
        if self.draw.drag().is_some() {
            return self.marker;
        }
        self.marker = None;
        if self.layer.iter().all(|g| polygons(g).is_empty()) {
            return None;
        }
        self.viewport.go_to_valid_extent();
        self.marker = self.hit_vertex(pixel).map(|s| s.coordinate);
        self.marker
    }

    /// Select exactly what the map currently shows
    pub fn select_map_view(&mut self) -> Option<&FeatureCollection> {
        self.draw.handle(ToolEvent::Cancel, &mut self.viewport);
        let projection = *self.viewport.projection();
        let visible = unwrap_extent(&self.viewport.calculate_extent(), &projection);
        let geometry: Geometry<f64> = visible.to_polygon().into();
        let collection = geojson::from_projected(&geometry);

        self.session.set_from_map_view(collection);
        self.layer = vec![geometry];
        self.buffer_preview = None;
        self.pending_buffer_m = 0.0;
        self.refresh_next_enabled();
        self.working()
    }

    /// Use a search hit as the selection and zoom to it
    pub fn apply_search(&mut self, result: &SearchResult) {
        self.draw.handle(ToolEvent::Cancel, &mut self.viewport);
        self.session.set_from_search(result);
        self.show_working();
        self.zoom_to_selection();
    }

    /// Use an imported collection as the selection and zoom to it
    pub fn import(&mut self, collection: FeatureCollection, filename: &str) {
        self.draw.handle(ToolEvent::Cancel, &mut self.viewport);
        self.session.set_from_import(collection, filename);
        self.show_working();
        self.zoom_to_selection();
    }

    /// Compute a buffered outline for display without committing it.
    ///
    /// A rejected distance leaves the previous preview in place.
    pub fn preview_buffer(&mut self, distance_m: f64) -> Result<&FeatureCollection> {
        let preview = self.session.preview_buffer(distance_m)?;
        self.pending_buffer_m = distance_m;
        Ok(self.buffer_preview.insert(preview))
    }

    /// Make the previewed buffer the working selection.
    ///
    /// Fails with [`AoiError::NoPendingBuffer`] when nothing was previewed.
    pub fn commit_buffer(&mut self) -> Result<()> {
        if self.buffer_preview.is_none() {
            return Err(AoiError::NoPendingBuffer);
        }
        self.apply_buffer(self.pending_buffer_m)
    }

    /// Discard the preview and reset the pending distance
    pub fn close_buffer_dialog(&mut self) {
        self.buffer_preview = None;
        self.pending_buffer_m = 0.0;
    }

    /// Buffer the selection by `distance_m` in one step
    pub fn apply_buffer(&mut self, distance_m: f64) -> Result<()> {
        self.session.apply_buffer(distance_m)?;
        self.show_working();
        Ok(())
    }

    /// Go back to the shape as first selected
    pub fn revert(&mut self) -> Result<()> {
        self.session.revert()?;
        self.draw.set_invalid_draw(false);
        self.show_working();
        Ok(())
    }

    /// Fit the view to the selection: one feature is fitted directly (points
    /// only re-centre), several are fitted by their combined extent
    pub fn zoom_to_selection(&mut self) {
        match self.layer.as_slice() {
            [] => {}
            [single] => self.viewport.fit_to_geometry(single),
            many => {
                let mut extent: Option<Extent> = None;
                for e in many.iter().filter_map(Extent::of_geometry) {
                    match extent.as_mut() {
                        Some(acc) => acc.extend(&e),
                        None => extent = Some(e),
                    }
                }
                if let Some(extent) = extent {
                    self.viewport.fit_extent(&extent);
                }
            }
        }
    }

    pub fn reset_map(&mut self) {
        self.viewport.reset_to_world();
    }

    /// Centre of the selection's extent in EPSG:4326
    pub fn selection_center(&self) -> Option<Coord<f64>> {
        let working = self.working()?;
        let mut extent: Option<Extent> = None;
        for geometry in working.geometries().filter_map(|g| geojson::to_geo(g).ok()) {
            if let Some(e) = Extent::of_geometry(&geometry) {
                match extent.as_mut() {
                    Some(acc) => acc.extend(&e),
                    None => extent = Some(e),
                }
            }
        }
        extent.map(|e| e.center())
    }
}
