use std::cell::Cell;
use std::rc::Rc;

use gpui_form_core::{
    Bounds, Canvas, DataTransfer, DragEffect, DragSource, DropOutcome, ElementNode, FormBuilder,
    FormError, PaletteEntry, Point, TRANSFER_FORMAT,
};
use serde_json::json;

fn builder() -> FormBuilder {
    let counter = Rc::new(Cell::new(0));
    let mut builder = FormBuilder::new()
        .id_generator(move |payload| {
            counter.set(counter.get() + 1);
            format!("{}-{}", payload.id, counter.get())
        })
        .canvas_with(Canvas::new("form").items(vec![
            ElementNode::new("name", "text"),
            ElementNode::new("email", "email"),
        ]));
    builder.register_palette_elements([
        PaletteEntry::new("text", "text").name("Text"),
        PaletteEntry::new("select", "select")
            .name("Select")
            .fields(vec![json!({"label": "One"}), json!({"label": "Two"})]),
    ]);
    builder
}

fn palette(entry_id: &str) -> DragSource {
    DragSource::Palette {
        entry_id: entry_id.into(),
    }
}

fn root_ids(builder: &FormBuilder) -> Vec<String> {
    builder
        .canvas("form")
        .unwrap()
        .tree()
        .children()
        .iter()
        .map(|node| node.id.clone())
        .collect()
}

#[test]
fn palette_drop_creates_fresh_elements() {
    let mut builder = builder();

    for _ in 0..2 {
        let mut transfer = DataTransfer::new();
        builder.drag_start(&palette("text"), &mut transfer).unwrap();
        assert_eq!(transfer.effect_allowed(), DragEffect::Copy);
        assert!(builder.session().dragged_element().is_none());

        builder
            .drag_over(
                "form",
                "name",
                Point::new(5., 5.),
                Bounds::new(0., 0., 100., 30.),
            )
            .unwrap();
        let outcome = builder.drop("form", "form", &transfer).unwrap();
        assert!(matches!(outcome, DropOutcome::Inserted { .. }));
        builder.drag_end(&palette("text"));
    }

    assert_eq!(root_ids(&builder), vec!["text-1", "text-2", "name", "email"]);
    assert!(builder.session().is_idle());
}

#[test]
fn palette_fields_are_copied_onto_the_node() {
    let mut builder = builder();
    let mut transfer = DataTransfer::new();

    builder.drag_start(&palette("select"), &mut transfer).unwrap();
    builder.drop("form", "form", &transfer).unwrap();
    builder.drag_end(&palette("select"));

    let node = builder.canvas("form").unwrap().tree().find("select-1").unwrap();
    assert_eq!(node.kind, "select");
    assert_eq!(node.name.as_deref(), Some("Select"));
    assert_eq!(node.fields.as_ref().map(Vec::len), Some(2));
}

#[test]
fn unknown_palette_entry_is_an_error() {
    let mut builder = builder();
    let mut transfer = DataTransfer::new();
    assert!(matches!(
        builder.drag_start(&palette("missing"), &mut transfer),
        Err(FormError::UnknownPaletteEntry(_))
    ));
}

#[test]
fn trash_removes_the_dragged_element() {
    let mut builder = builder();
    let source = DragSource::Canvas {
        canvas_id: "form".into(),
        element_id: "email".into(),
    };
    let mut transfer = DataTransfer::new();

    builder.drag_start(&source, &mut transfer).unwrap();
    let removed = builder.drop_on_trash(&transfer).unwrap();
    builder.drag_end(&source);

    assert_eq!(removed.map(|node| node.id), Some("email".to_string()));
    assert_eq!(root_ids(&builder), vec!["name"]);
}

#[test]
fn trash_ignores_palette_payloads() {
    let mut builder = builder();
    let mut transfer = DataTransfer::new();

    builder.drag_start(&palette("text"), &mut transfer).unwrap();
    assert_eq!(builder.drop_on_trash(&transfer).unwrap(), None);
    builder.drag_end(&palette("text"));
    assert_eq!(root_ids(&builder), vec!["name", "email"]);
}

#[test]
fn cancelled_drag_leaves_everything_untouched() {
    let mut builder = builder();
    let before = builder.canvas("form").unwrap().tree().clone();
    let source = DragSource::Canvas {
        canvas_id: "form".into(),
        element_id: "name".into(),
    };
    let mut transfer = DataTransfer::new();

    assert!(builder.session().is_idle());
    builder.drag_start(&source, &mut transfer).unwrap();
    builder
        .drag_over(
            "form",
            "email",
            Point::new(5., 40.),
            Bounds::new(0., 30., 100., 30.),
        )
        .unwrap();
    builder.drag_leave("form", "email").unwrap();
    builder.drag_end(&source);

    assert!(builder.session().is_idle());
    assert_eq!(builder.canvas("form").unwrap().tree(), &before);
}

#[test]
fn malformed_transfer_is_reported() {
    let mut builder = builder();
    let mut transfer = DataTransfer::new();
    transfer.set_data(TRANSFER_FORMAT, "not json");

    assert!(matches!(
        builder.drop("form", "form", &transfer),
        Err(FormError::InvalidPayload(_))
    ));
    assert!(matches!(
        builder.drop("form", "form", &DataTransfer::new()),
        Err(FormError::MissingTransferData(_))
    ));
}
