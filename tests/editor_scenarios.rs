use aoikit::config::EditorConfig;
use aoikit::domain::{DrawMode, Provenance, SearchResult, ToolEvent};
use aoikit::geojson::{Feature, FeatureCollection, Geometry, GeometryKind, to_geo};
use aoikit::geometry::{Extent, area_sq_km};
use aoikit::interaction::{DrawOutcome, is_box};
use aoikit::{AoiEditor, AoiError, DragOutcome};
use geo::{Coord, LineString};

fn box_ring(min: (f64, f64), max: (f64, f64)) -> LineString<f64> {
    Extent::new(min.0, min.1, max.0, max.1).to_ring()
}

fn draw_box(editor: &mut AoiEditor, min: (f64, f64), max: (f64, f64)) -> DrawOutcome {
    editor.select_tool(ToolEvent::SelectBox);
    editor.draw_start();
    editor.draw_end(&box_ring(min, max))
}

fn search_point(lon: f64, lat: f64) -> SearchResult {
    let feature: Feature = serde_json::from_value(serde_json::json!({
        "type": "Feature",
        "geometry": {"type": "Point", "coordinates": [lon, lat]},
        "properties": {"name": "Trailhead", "country": "Norway"}
    }))
    .unwrap();
    SearchResult::from_feature(feature)
}

fn first_geometry(fc: &FeatureCollection) -> geo::Geometry<f64> {
    to_geo(fc.features[0].geometry.as_ref().unwrap()).unwrap()
}

#[test]
fn scenario_a_box_draw_enables_next() {
    let mut editor = AoiEditor::default();
    let outcome = draw_box(&mut editor, (0.0, 0.0), (10.0, 10.0));
    assert!(matches!(outcome, DrawOutcome::Committed { .. }));

    let working = editor.working().unwrap();
    let expected = Extent::new(0.0, 0.0, 10.0, 10.0).serialize();
    assert_eq!(working.features[0].bbox.as_deref(), Some(&expected[..]));

    let record = editor.session().record().unwrap();
    assert_eq!(record.provenance(), Provenance::Box);
    assert_eq!(record.title(), "Custom Polygon");
    assert_eq!(record.description(), "Box");
    assert_eq!(editor.mode(), DrawMode::Normal);
    assert!(editor.signals().next_enabled);
    assert!(!editor.signals().invalid_draw);
}

#[test]
fn scenario_b_bowtie_freehand_is_flagged() {
    let mut editor = AoiEditor::default();
    draw_box(&mut editor, (0.0, 0.0), (50_000.0, 50_000.0));
    let before = editor.working().cloned();

    editor.select_tool(ToolEvent::SelectFree);
    editor.draw_start();
    let bowtie = LineString::from(vec![
        (0.0, 0.0),
        (40_000.0, 40_000.0),
        (40_000.0, 0.0),
        (0.0, 40_000.0),
        (0.0, 0.0),
    ]);
    let outcome = editor.draw_end(&bowtie);

    assert!(matches!(outcome, DrawOutcome::Invalid(_)));
    assert!(editor.signals().invalid_draw);
    assert_eq!(editor.mode(), DrawMode::DrawFree);
    assert_eq!(editor.working().cloned(), before);
}

#[test]
fn scenario_c_out_of_range_buffer_is_rejected() {
    let mut editor = AoiEditor::default();
    editor.apply_search(&search_point(10.7, 59.9));

    let err = editor.apply_buffer(15_000.0).unwrap_err();
    assert!(matches!(err, AoiError::BufferOutOfRange { .. }));
    assert_eq!(editor.session().record().unwrap().buffer_m(), 0.0);
    assert!(editor.preview_buffer(15_000.0).is_err());
    assert!(editor.buffer_preview().is_none());
}

#[test]
fn scenario_d_buffered_search_point_is_polygon() {
    let mut editor = AoiEditor::default();
    // on the equator projected meters are close to ground meters
    editor.apply_search(&search_point(10.7, 0.0));
    assert!(!editor.signals().next_enabled);

    editor.apply_buffer(1000.0).unwrap();
    let working = editor.working().unwrap();
    assert_eq!(
        working.features[0].geometry.as_ref().map(Geometry::kind),
        Some(GeometryKind::Polygon)
    );
    // a 1 km disc is a little over 3 km²
    let area = area_sq_km(&first_geometry(working));
    assert!(area > 3.0 && area < 3.3, "area was {area}");
    assert!(editor.signals().next_enabled);
}

#[test]
fn zero_buffer_still_gives_search_point_an_area() {
    let mut editor = AoiEditor::default();
    editor.apply_search(&search_point(10.7, 0.0));

    editor.apply_buffer(0.0).unwrap();
    let working = editor.working().unwrap();
    assert_eq!(
        working.features[0].geometry.as_ref().map(Geometry::kind),
        Some(GeometryKind::Polygon)
    );
    assert!(area_sq_km(&first_geometry(working)) > 0.0);
    assert!(editor.signals().next_enabled);
}

#[test]
fn scenario_e_revert_after_buffer() {
    let mut editor = AoiEditor::default();
    editor.apply_search(&search_point(10.7, 59.9));
    let original = editor.working().cloned().unwrap();

    editor.apply_buffer(2500.0).unwrap();
    assert_ne!(editor.working(), Some(&original));

    editor.revert().unwrap();
    let record = editor.session().record().unwrap();
    assert_eq!(record.working(), &original);
    assert_eq!(record.buffer_m(), 0.0);
}

#[test]
fn buffer_preview_only_commits_on_request() {
    let mut editor = AoiEditor::default();
    draw_box(&mut editor, (0.0, 0.0), (20_000.0, 20_000.0));
    let drawn = editor.working().cloned().unwrap();

    editor.preview_buffer(800.0).unwrap();
    assert!(editor.buffer_preview().is_some());
    assert_eq!(editor.working(), Some(&drawn));

    editor.close_buffer_dialog();
    assert!(editor.buffer_preview().is_none());
    assert_eq!(editor.pending_buffer_m(), 0.0);
    assert_eq!(editor.working(), Some(&drawn));

    editor.preview_buffer(800.0).unwrap();
    editor.commit_buffer().unwrap();
    assert_ne!(editor.working(), Some(&drawn));
    assert_eq!(editor.session().record().unwrap().buffer_m(), 800.0);
    assert!(editor.buffer_preview().is_none());
}

#[test]
fn commit_without_preview_is_an_error() {
    let mut editor = AoiEditor::default();
    draw_box(&mut editor, (0.0, 0.0), (20_000.0, 20_000.0));
    let drawn = editor.working().cloned();

    assert!(matches!(editor.commit_buffer(), Err(AoiError::NoPendingBuffer)));

    editor.preview_buffer(500.0).unwrap();
    editor.close_buffer_dialog();
    assert!(matches!(editor.commit_buffer(), Err(AoiError::NoPendingBuffer)));
    assert_eq!(editor.working().cloned(), drawn);
}

#[test]
fn box_vertex_drag_keeps_box() {
    let mut editor = AoiEditor::default();
    draw_box(&mut editor, (0.0, 0.0), (50_000.0, 50_000.0));
    editor.zoom_to_selection();

    let corner = editor
        .viewport()
        .pixel_from_coordinate(Coord { x: 50_000.0, y: 50_000.0 });
    assert!(editor.pointer_down(corner));

    let target = Coord {
        x: corner.x + 60.0,
        y: corner.y + 25.0,
    };
    assert_eq!(editor.pointer_drag(target), DragOutcome::Moved);
    assert!(editor.marker().is_some());

    let outcome = editor.pointer_up();
    assert!(matches!(outcome, DragOutcome::Committed(_)));
    assert!(editor.marker().is_none());

    let geo::Geometry::Polygon(polygon) = &editor.layer()[0] else {
        panic!("expected a polygon on the draw layer");
    };
    assert!(is_box(polygon.exterior()));

    let moved = editor.viewport().coordinate_from_pixel(target);
    let extent = Extent::from_coords(&polygon.exterior().0).unwrap();
    assert!((extent.max_x - moved.x).abs() < 1e-6);
    assert!((extent.max_y - moved.y).abs() < 1e-6);
    assert_eq!(extent.min_x, 0.0);

    // the edit is the new working shape; the revert target is the draw
    let record = editor.session().record().unwrap();
    assert_ne!(record.working(), record.original());
    assert!(editor.signals().next_enabled);
}

#[test]
fn collapsing_drag_is_ignored_but_drag_continues() {
    let mut editor = AoiEditor::default();
    draw_box(&mut editor, (0.0, 0.0), (50_000.0, 50_000.0));
    // power-of-two resolution keeps pixel <-> meter conversions exact
    editor.viewport_mut().set_center(Coord { x: 25_000.0, y: 25_000.0 });
    editor.viewport_mut().set_resolution(64.0);

    let vp = editor.viewport().clone();
    let corner = vp.pixel_from_coordinate(Coord { x: 50_000.0, y: 50_000.0 });
    let left_edge = vp.pixel_from_coordinate(Coord { x: 0.0, y: 50_000.0 });
    assert!(editor.pointer_down(corner));

    let before = editor.layer().to_vec();
    assert_eq!(editor.pointer_drag(left_edge), DragOutcome::Rejected);
    assert_eq!(editor.layer(), &before[..]);

    let inward = Coord {
        x: corner.x - 40.0,
        y: corner.y,
    };
    assert_eq!(editor.pointer_drag(inward), DragOutcome::Moved);
    assert!(matches!(editor.pointer_up(), DragOutcome::Committed(_)));

    let geo::Geometry::Polygon(polygon) = &editor.layer()[0] else {
        panic!("expected a polygon on the draw layer");
    };
    let extent = Extent::from_coords(&polygon.exterior().0).unwrap();
    assert_eq!(extent.max_x, 50_000.0 - 40.0 * 64.0);
}

#[test]
fn self_crossing_vertex_edit_is_not_committed() {
    let mut editor = AoiEditor::default();
    editor.select_tool(ToolEvent::SelectFree);
    editor.draw_start();
    let pentagon = LineString::from(vec![
        (0.0, 0.0),
        (40_000.0, 0.0),
        (50_000.0, 30_000.0),
        (20_000.0, 50_000.0),
        (-10_000.0, 30_000.0),
        (0.0, 0.0),
    ]);
    assert!(matches!(editor.draw_end(&pentagon), DrawOutcome::Committed { .. }));
    assert!(editor.signals().next_enabled);
    let before = editor.working().cloned();

    editor.viewport_mut().set_center(Coord { x: 20_000.0, y: 20_000.0 });
    editor.viewport_mut().set_resolution(64.0);
    let vp = editor.viewport().clone();
    let apex = vp.pixel_from_coordinate(Coord { x: 20_000.0, y: 50_000.0 });
    let below_base = vp.pixel_from_coordinate(Coord { x: 20_000.0, y: -20_000.0 });

    assert!(editor.pointer_down(apex));
    assert_eq!(editor.pointer_drag(below_base), DragOutcome::Moved);
    assert_eq!(editor.pointer_up(), DragOutcome::Invalid);

    assert!(editor.signals().invalid_draw);
    assert!(!editor.signals().next_enabled);
    assert_eq!(editor.working().cloned(), before);
}

#[test]
fn no_vertex_editing_while_drawing() {
    let mut editor = AoiEditor::default();
    draw_box(&mut editor, (0.0, 0.0), (50_000.0, 50_000.0));
    editor.zoom_to_selection();
    let corner = editor
        .viewport()
        .pixel_from_coordinate(Coord { x: 0.0, y: 0.0 });

    editor.select_tool(ToolEvent::SelectBox);
    assert!(!editor.pointer_down(corner));
    assert_eq!(editor.pointer_drag(corner), DragOutcome::Idle);
    assert_eq!(editor.pointer_up(), DragOutcome::Idle);
}

#[test]
fn hover_marks_vertex() {
    let mut editor = AoiEditor::default();
    draw_box(&mut editor, (0.0, 0.0), (50_000.0, 50_000.0));
    editor.zoom_to_selection();
    let corner = editor
        .viewport()
        .pixel_from_coordinate(Coord { x: 0.0, y: 50_000.0 });

    assert_eq!(
        editor.pointer_move(Coord {
            x: corner.x + 3.0,
            y: corner.y + 3.0,
        }),
        Some(Coord { x: 0.0, y: 50_000.0 })
    );
    assert_eq!(
        editor.pointer_move(Coord {
            x: corner.x + 200.0,
            y: corner.y + 200.0,
        }),
        None
    );
}

#[test]
fn cancel_clears_everything() {
    let mut editor = AoiEditor::default();
    draw_box(&mut editor, (0.0, 0.0), (50_000.0, 50_000.0));
    editor.select_tool(ToolEvent::SelectFree);
    editor.cancel();

    assert_eq!(editor.mode(), DrawMode::Normal);
    assert!(editor.layer().is_empty());
    assert!(editor.working().is_none());
    assert!(!editor.signals().next_enabled);
}

#[test]
fn map_view_selection_covers_viewport() {
    let mut editor = AoiEditor::default();
    editor.viewport_mut().set_center(Coord { x: 1.0e6, y: 5.0e6 });
    editor.viewport_mut().set_zoom(8.0);

    let working = editor.select_map_view().cloned().unwrap();
    let record = editor.session().record().unwrap();
    assert_eq!(record.provenance(), Provenance::MapView);
    assert_eq!(record.description(), "Map View");

    let expected = editor.viewport().calculate_extent().serialize();
    assert_eq!(working.features[0].bbox.as_deref(), Some(&expected[..]));
    assert!(editor.signals().next_enabled);
}

#[test]
fn import_labels_and_area_limit() {
    let config = EditorConfig {
        max_aoi_sq_km: Some(10.0),
        ..EditorConfig::default()
    };
    let mut editor = AoiEditor::new(config);
    let square = FeatureCollection::single(Feature::new(Geometry::Polygon {
        coordinates: vec![vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![0.0, 1.0],
            vec![0.0, 0.0],
        ]],
    }));
    editor.import(square, "district.geojson");

    let record = editor.session().record().unwrap();
    assert_eq!(record.title(), "district.geojson");
    assert_eq!(record.description(), "Polygon");
    assert_eq!(record.provenance(), Provenance::Import);
    // a one degree square is far above the 10 km² limit
    assert!(!editor.signals().next_enabled);
    assert_eq!(editor.layer().len(), 1);
}

#[test]
fn editors_do_not_share_state() {
    let mut a = AoiEditor::default();
    let b = AoiEditor::default();
    draw_box(&mut a, (0.0, 0.0), (10_000.0, 10_000.0));
    a.viewport_mut().set_zoom(12.0);

    assert!(a.working().is_some());
    assert!(b.working().is_none());
    assert_ne!(a.viewport(), b.viewport());
}

#[test]
fn zoom_to_point_selection_keeps_zoom() {
    let mut editor = AoiEditor::default();
    editor.viewport_mut().set_zoom(9.0);
    let zoom = editor.viewport().zoom_level();
    editor.apply_search(&search_point(10.7, 59.9));
    assert_eq!(editor.viewport().zoom_level(), zoom);

    let center = editor.selection_center().unwrap();
    assert!((center.x - 10.7).abs() < 1e-9);
    assert!((center.y - 59.9).abs() < 1e-9);

    editor.reset_map();
    assert!(editor.viewport().zoom_level() <= 2);
}
