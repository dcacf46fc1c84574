use gpui_form_core::{
    BuilderConfig, Bounds, Canvas, CanvasConfig, DataTransfer, DragSource, DropOutcome,
    DropRejection, DropzoneConfig, ElementNode, FormBuilder, InsertionMarker, Point,
};

fn dump(items: &[ElementNode], depth: usize, out: &mut String) {
    for node in items {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&node.id);
        out.push('\n');
        dump(&node.children, depth + 1, out);
    }
}

fn canvas_dump(builder: &FormBuilder, canvas_id: &str) -> String {
    let mut s = String::new();
    dump(builder.canvas(canvas_id).unwrap().tree().children(), 0, &mut s);
    s.trim_end().to_string()
}

fn source(canvas_id: &str, element_id: &str) -> DragSource {
    DragSource::Canvas {
        canvas_id: canvas_id.into(),
        element_id: element_id.into(),
    }
}

fn layout() -> Canvas {
    Canvas::new("form")
        .config(
            CanvasConfig::default().dropzone(
                "columns",
                DropzoneConfig::default().allow_horizontal(true).capacity(2),
            ),
        )
        .items(vec![
            ElementNode::new("section", "section")
                .child(ElementNode::new("title", "text"))
                .child(
                    ElementNode::new("columns", "row")
                        .child(ElementNode::new("left", "column"))
                        .child(ElementNode::new("right", "column")),
                ),
            ElementNode::new("footer", "text"),
        ])
}

#[test]
fn moving_a_container_keeps_its_children() {
    let mut builder = FormBuilder::new().canvas_with(layout());
    let mut transfer = DataTransfer::new();

    builder.drag_start(&source("form", "columns"), &mut transfer).unwrap();
    builder
        .drag_over(
            "form",
            "footer",
            Point::new(10., 205.),
            Bounds::new(0., 200., 400., 20.),
        )
        .unwrap();
    let outcome = builder.drop("form", "form", &transfer).unwrap();
    builder.drag_end(&source("form", "columns"));

    assert!(matches!(outcome, DropOutcome::Moved { .. }));
    assert_eq!(
        canvas_dump(&builder, "form"),
        r#"section
  title
columns
  left
  right
footer"#
    );
}

#[test]
fn drop_into_own_subtree_is_rejected() {
    let mut builder = FormBuilder::new().canvas_with(layout());
    let mut transfer = DataTransfer::new();
    let before = canvas_dump(&builder, "form");

    builder.drag_start(&source("form", "section"), &mut transfer).unwrap();

    // Hovering descendants of the dragged element resolves nothing.
    let hovered = builder
        .drag_over(
            "form",
            "left",
            Point::new(10., 10.),
            Bounds::new(0., 0., 100., 100.),
        )
        .unwrap();
    assert_eq!(hovered, None);
    let marker = builder
        .canvas("form")
        .unwrap()
        .entry("left")
        .unwrap()
        .item()
        .marker();
    assert_eq!(marker, InsertionMarker::None);

    let outcome = builder.drop("form", "left", &transfer).unwrap();
    builder.drag_end(&source("form", "section"));

    assert_eq!(outcome, DropOutcome::Rejected(DropRejection::IntoOwnSubtree));
    assert_eq!(canvas_dump(&builder, "form"), before);
}

#[test]
fn full_dropzone_rejects_new_children_but_allows_reorder() {
    let mut builder = FormBuilder::new().canvas_with(layout());

    let mut transfer = DataTransfer::new();
    builder.drag_start(&source("form", "footer"), &mut transfer).unwrap();

    // "columns" holds two children and has capacity two: no classification.
    let hovered = builder
        .drag_over(
            "form",
            "left",
            Point::new(10., 10.),
            Bounds::new(0., 0., 100., 100.),
        )
        .unwrap();
    assert_eq!(hovered, None);
    assert_eq!(builder.session().drop_position(), None);

    let outcome = builder.drop("form", "columns", &transfer).unwrap();
    builder.drag_end(&source("form", "footer"));
    assert_eq!(outcome, DropOutcome::Rejected(DropRejection::NoSpace));

    let mut transfer = DataTransfer::new();
    builder.drag_start(&source("form", "right"), &mut transfer).unwrap();
    builder.drop("form", "columns", &transfer).unwrap();
    builder.drag_end(&source("form", "right"));

    let columns = builder.canvas("form").unwrap().tree().zone("columns").unwrap();
    let ids: Vec<_> = columns.iter().map(|node| node.id.as_str()).collect();
    assert_eq!(ids, vec!["left", "right"]);

    // Once the origin can no longer be removed, a same-zone drop would be a
    // copy, so the full zone turns it away.
    let mut builder = FormBuilder::new().canvas_with(layout().validate_origin(|_, _| false));
    let mut transfer = DataTransfer::new();
    builder.drag_start(&source("form", "left"), &mut transfer).unwrap();
    let outcome = builder.drop("form", "columns", &transfer).unwrap();
    builder.drag_end(&source("form", "left"));

    assert_eq!(outcome, DropOutcome::Rejected(DropRejection::NoSpace));
    let tree = builder.canvas("form").unwrap().tree();
    assert_eq!(tree.zone_len("columns"), Some(2));
}

#[test]
fn horizontal_zone_classifies_on_x() {
    let mut builder = FormBuilder::new().canvas_with(
        Canvas::new("form")
            .config(
                CanvasConfig::default()
                    .dropzone("row", DropzoneConfig::default().allow_horizontal(true)),
            )
            .items(vec![
                ElementNode::new("row", "row")
                    .child(ElementNode::new("a", "text"))
                    .child(ElementNode::new("b", "text")),
            ]),
    );
    let mut transfer = DataTransfer::new();
    builder.drag_start(&source("form", "a"), &mut transfer).unwrap();

    let bounds = Bounds::new(100., 0., 100., 40.);
    let left = builder
        .drag_over("form", "b", Point::new(120., 39.), bounds)
        .unwrap()
        .unwrap();
    assert_eq!(left.index, 1);
    let right = builder
        .drag_over("form", "b", Point::new(150., 1.), bounds)
        .unwrap()
        .unwrap();
    assert_eq!(right.index, 2);
}

#[test]
fn move_between_canvases() {
    let mut builder = FormBuilder::new()
        .canvas_with(layout())
        .canvas_with(Canvas::new("sidebar").items(vec![ElementNode::new("note", "text")]));
    let mut transfer = DataTransfer::new();

    builder.drag_start(&source("form", "title"), &mut transfer).unwrap();
    let outcome = builder.drop("sidebar", "sidebar", &transfer).unwrap();
    builder.drag_end(&source("form", "title"));

    assert!(matches!(outcome, DropOutcome::Moved { ref from, .. } if from.canvas_id == "form"));
    assert_eq!(canvas_dump(&builder, "sidebar"), "note\ntitle");
    assert!(!builder.canvas("form").unwrap().tree().contains("title"));
}

#[test]
fn custom_origin_validation_can_veto_removal() {
    let mut builder = FormBuilder::new()
        .canvas_with(layout().validate_origin(|_, origin| origin.element_id != "title"));
    let mut transfer = DataTransfer::new();

    builder.drag_start(&source("form", "title"), &mut transfer).unwrap();
    let outcome = builder.drop("form", "columns", &transfer);
    builder.drag_end(&source("form", "title"));

    // "columns" is full, so try the root instead.
    assert!(matches!(
        outcome,
        Ok(DropOutcome::Rejected(DropRejection::NoSpace))
    ));

    let mut transfer = DataTransfer::new();
    builder.drag_start(&source("form", "title"), &mut transfer).unwrap();
    let outcome = builder.drop("form", "form", &transfer).unwrap();
    builder.drag_end(&source("form", "title"));

    assert!(matches!(outcome, DropOutcome::Copied { .. }));
    let ids = builder.canvas("form").unwrap().tree().element_ids();
    assert_eq!(ids.iter().filter(|id| **id == "title").count(), 2);
}

#[test]
fn state_survives_json() {
    let config = BuilderConfig::from_json(
        r#"{
            "canvases": { "form": { "dropzones": { "form": { "capacity": 4 } } } },
            "palette": [ { "id": "text", "type": "text", "name": "Text" } ]
        }"#,
    )
    .unwrap();
    let mut builder = FormBuilder::from_config(config.clone());
    builder
        .canvas_mut("form")
        .unwrap()
        .insert("form", 0, ElementNode::new("row", "row").child(ElementNode::new("a", "text")))
        .unwrap();
    let json = builder.state_json().unwrap();

    let mut restored = FormBuilder::from_config(config);
    restored.load_state_json(&json).unwrap();
    assert_eq!(
        restored.canvas("form").unwrap().tree(),
        builder.canvas("form").unwrap().tree()
    );
    assert_eq!(restored.palette().len(), 1);
    assert!(restored.load_state_json(r#"{"nope": {"id": "nope"}}"#).is_err());
}
