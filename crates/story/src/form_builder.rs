use std::{cell::RefCell, rc::Rc};

use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::ActiveTheme as _;
use gpui_component::list::ListItem;
use gpui_component::{h_flex, v_flex};
use gpui_form_builder::{FormBuilderState, FormRowState, form_builder};
use gpui_form_core::{
    BuilderConfig, Canvas, DragPhase, DraggableItem, DropOutcome, ElementNode, FormBuilder,
};
use serde_json::json;

const DEMO_CONFIG: &str = r#"{
    "canvases": {
        "form": {
            "dropzones": {
                "contact-row": { "allow_horizontal": true, "capacity": 2 }
            }
        }
    },
    "palette": [
        { "id": "text", "type": "text", "name": "Text input" },
        { "id": "email", "type": "email", "name": "Email" },
        { "id": "checkbox", "type": "checkbox", "name": "Checkbox" },
        {
            "id": "select",
            "type": "select",
            "name": "Select",
            "fields": [{ "label": "Yes" }, { "label": "No" }]
        },
        { "id": "section", "type": "section", "name": "Section" }
    ]
}"#;

pub struct FormBuilderExample {
    state: Entity<FormBuilderState>,
    events: Rc<RefCell<Vec<String>>>,
}

impl FormBuilderExample {
    pub fn view(_window: &mut Window, cx: &mut App) -> Entity<Self> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let builder = demo_builder();

        let state = cx.new(|cx| {
            let on_drop_events = Rc::clone(&events);
            let on_trash_events = Rc::clone(&events);
            FormBuilderState::new(builder, cx)
                .container_kinds(["section", "row"])
                .on_drop(move |outcome, _| {
                    on_drop_events.borrow_mut().push(describe(outcome));
                })
                .on_trash(move |removed| {
                    on_trash_events
                        .borrow_mut()
                        .push(format!("trashed {}", removed.id));
                })
        });
        cx.new(|_| Self { state, events })
    }
}

impl Render for FormBuilderExample {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let state_json = self
            .state
            .read(cx)
            .builder()
            .state()
            .get("form")
            .and_then(|state| serde_json::to_string_pretty(state).ok())
            .unwrap_or_default();
        let events = self.events.borrow().iter().rev().take(8).cloned().collect::<Vec<_>>();

        v_flex()
            .size_full()
            .p(px(16.))
            .gap_y_3()
            .child(
                v_flex()
                    .gap_y_1()
                    .child(div().text_xl().font_weight(FontWeight::BOLD).child("Form Builder"))
                    .child(
                        div()
                            .text_sm()
                            .text_color(theme.muted_foreground)
                            .child("Tip: drag palette entries onto the form. Upper half of a row = Before, lower half = After; the contact row is horizontal and holds two fields. Drag an element onto the trash to remove it."),
                    ),
            )
            .child(
                h_flex()
                    .flex_1()
                    .min_h(px(0.))
                    .gap_x_3()
                    .items_start()
                    .child(
                        div()
                            .flex_1()
                            .min_w(px(0.))
                            .h_full()
                            .rounded(px(12.))
                            .border_1()
                            .border_color(theme.border)
                            .bg(theme.background)
                            .p(px(12.))
                            .child(form_builder(&self.state, |item, row_state, _window, cx| {
                                render_form_row(item, row_state, cx)
                            })),
                    )
                    .child(
                        v_flex()
                            .w(px(360.))
                            .h_full()
                            .gap_y_2()
                            .child(div().text_sm().font_weight(FontWeight::MEDIUM).child("Events"))
                            .child(render_lines(events.join("\n")))
                            .child(
                                div()
                                    .text_sm()
                                    .font_weight(FontWeight::MEDIUM)
                                    .child("Debug (canvas state)"),
                            )
                            .child(
                                div()
                                    .flex_1()
                                    .min_h(px(0.))
                                    .rounded(px(12.))
                                    .border_1()
                                    .border_color(theme.border)
                                    .bg(theme.background)
                                    .p(px(12.))
                                    .child(render_lines(state_json)),
                            ),
                    ),
            )
    }
}

fn render_form_row(item: &DraggableItem, row_state: FormRowState, cx: &mut App) -> ListItem {
    let theme = cx.theme();
    let label = item.name.clone().unwrap_or_else(|| item.kind.clone());
    let just_dropped = row_state.phase == DragPhase::Dropped;

    ListItem::new(SharedString::from(format!("story-row-{}", item.id)))
        .when(row_state.dragging, |this| this.opacity(0.4))
        .child(
            h_flex()
                .gap_x_2()
                .items_center()
                .child(
                    div()
                        .text_xs()
                        .text_color(theme.muted_foreground)
                        .child(item.kind.clone()),
                )
                .child(label)
                .when(just_dropped, |this| {
                    this.child(div().text_xs().text_color(theme.primary).child("dropped"))
                }),
        )
}

fn render_lines(text: String) -> impl IntoElement {
    let lines = text
        .lines()
        .map(|line| div().text_sm().child(line.to_string()));
    v_flex().gap_y_0p5().children(lines)
}

fn describe(outcome: &DropOutcome) -> String {
    match outcome {
        DropOutcome::Inserted {
            element_id,
            placement,
        } => format!(
            "inserted {element_id} into {} at {}",
            placement.dropzone_id, placement.index
        ),
        DropOutcome::Moved {
            element_id,
            placement,
            from,
        } => format!(
            "moved {element_id} from {}[{}] to {}[{}]",
            from.dropzone_id, from.index, placement.dropzone_id, placement.index
        ),
        DropOutcome::Copied {
            element_id,
            placement,
        } => format!(
            "copied {element_id} into {} at {}",
            placement.dropzone_id, placement.index
        ),
        DropOutcome::Rejected(reason) => format!("rejected: {reason:?}"),
    }
}

fn demo_builder() -> FormBuilder {
    let config = BuilderConfig::from_json(DEMO_CONFIG).unwrap_or_else(|err| {
        tracing::warn!(%err, "demo config is invalid, starting empty");
        BuilderConfig::default()
    });
    let canvas_config = config.canvases.get("form").cloned().unwrap_or_default();

    let mut builder = FormBuilder::from_config(config);
    builder.add_canvas(Canvas::new("form").config(canvas_config).items(demo_items()));
    if let Some(canvas) = builder.canvas_mut("form") {
        canvas.on_initialized(|tree| {
            tracing::info!(elements = tree.element_ids().len(), "form canvas ready");
        });
        canvas.on_change(|tree| {
            tracing::debug!(elements = tree.element_ids().len(), "form canvas changed");
        });
    }
    builder
}

fn demo_items() -> Vec<ElementNode> {
    vec![
        ElementNode::new("title", "heading").name("Contact us"),
        ElementNode::new("contact-row", "row")
            .name("Contact")
            .child(ElementNode::new("first-name", "text").name("First name"))
            .child(ElementNode::new("last-name", "text").name("Last name")),
        ElementNode::new("email", "email").name("Email"),
        ElementNode::new("topic", "select")
            .name("Topic")
            .payload(json!({ "required": true })),
        ElementNode::new("details", "section")
            .name("Details")
            .child(ElementNode::new("message", "textarea").name("Message")),
    ]
}
