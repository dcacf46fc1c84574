use std::collections::HashSet;
use std::{cell::RefCell, rc::Rc};

use gpui::{
    AnyElement, App, AppContext as _, Context, CursorStyle, DragMoveEvent, ElementId, Entity,
    EntityId, FocusHandle, Hsla, InteractiveElement as _, IntoElement, ParentElement as _, Render,
    RenderOnce, SharedString, StatefulInteractiveElement as _, StyleRefinement, Styled, Window,
    div, prelude::FluentBuilder as _, px,
};
use gpui_component::list::ListItem;
use gpui_component::{ActiveTheme as _, StyledExt as _, h_flex, v_flex};
use gpui_form_core::{
    Axis, Canvas, DataTransfer, DragPhase, DragSource, DraggableItem, DropOutcome, ElementNode,
    FormBuilder, InsertionMarker,
};

use crate::ghost::DragGhost;
use crate::hover::{RowHitboxes, RowKey, form_bounds, form_point};

const CONTEXT: &str = "FormBuilder";

/// Create a [`FormBuilderView`].
pub fn form_builder<R>(state: &Entity<FormBuilderState>, render_item: R) -> FormBuilderView
where
    R: Fn(&DraggableItem, FormRowState, &mut Window, &mut App) -> ListItem + 'static,
{
    FormBuilderView::new(state, render_item)
}

type RenderItem = Rc<dyn Fn(&DraggableItem, FormRowState, &mut Window, &mut App) -> ListItem>;

/// Value carried by the platform drag. The transfer is shared between the source
/// that fills it and the target that reads it.
#[derive(Clone)]
struct FormDrag {
    builder_id: EntityId,
    source: DragSource,
    kind: SharedString,
    label: SharedString,
    transfer: Rc<RefCell<DataTransfer>>,
}

impl FormDrag {
    fn new(builder_id: EntityId, source: DragSource, item: &DraggableItem) -> Self {
        Self {
            builder_id,
            source,
            kind: item.kind.clone().into(),
            label: item_label(item),
            transfer: Rc::new(RefCell::new(DataTransfer::new())),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FormRowState {
    pub depth: usize,
    pub dragging: bool,
    pub phase: DragPhase,
    pub marker: InsertionMarker,
}

#[derive(Default)]
struct FormBuilderCallbacks {
    on_drop: Option<Rc<dyn Fn(&DropOutcome, &FormBuilder)>>,
    on_trash: Option<Rc<dyn Fn(&ElementNode)>>,
}

/// State for the palette, canvases and trash of a form builder.
pub struct FormBuilderState {
    focus_handle: FocusHandle,
    builder: FormBuilder,
    containers: HashSet<String>,
    initialized: bool,
    drag_source: Option<DragSource>,
    hitboxes: RowHitboxes,
    callbacks: FormBuilderCallbacks,
    render_item: RenderItem,
}

impl FormBuilderState {
    pub fn new(builder: FormBuilder, cx: &mut App) -> Self {
        Self {
            focus_handle: cx.focus_handle(),
            builder,
            containers: HashSet::new(),
            initialized: false,
            drag_source: None,
            hitboxes: RowHitboxes::default(),
            callbacks: FormBuilderCallbacks::default(),
            render_item: Rc::new(default_render_item),
        }
    }

    /// Element kinds rendered with a nested dropzone even while they have no children.
    pub fn container_kinds(mut self, kinds: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.containers = kinds.into_iter().map(Into::into).collect();
        self
    }

    /// Provide a callback invoked after every drop on a canvas, accepted or not.
    pub fn on_drop(mut self, on_drop: impl Fn(&DropOutcome, &FormBuilder) + 'static) -> Self {
        self.callbacks.on_drop = Some(Rc::new(on_drop));
        self
    }

    /// Provide a callback invoked with the element removed by the trash.
    pub fn on_trash(mut self, on_trash: impl Fn(&ElementNode) + 'static) -> Self {
        self.callbacks.on_trash = Some(Rc::new(on_trash));
        self
    }

    pub fn builder(&self) -> &FormBuilder {
        &self.builder
    }

    pub fn update_builder<R>(
        &mut self,
        update: impl FnOnce(&mut FormBuilder) -> R,
        cx: &mut Context<Self>,
    ) -> R {
        let result = update(&mut self.builder);
        cx.notify();
        result
    }

    fn on_drag_start(&mut self, drag: &FormDrag, _window: &mut Window, cx: &mut Context<Self>) {
        self.hitboxes.clear();
        match self
            .builder
            .drag_start(&drag.source, &mut drag.transfer.borrow_mut())
        {
            Ok(()) => self.drag_source = Some(drag.source.clone()),
            Err(err) => tracing::warn!(%err, source = ?drag.source, "drag start failed"),
        }
        cx.notify();
    }

    fn on_row_drag_move(
        &mut self,
        key: &RowKey,
        depth: usize,
        event: &DragMoveEvent<FormDrag>,
        cx: &mut Context<Self>,
    ) {
        if !cx.has_active_drag() {
            return;
        }

        let builder_id = event.drag(cx).builder_id;
        if builder_id != cx.entity_id() {
            return;
        }

        let position = event.event.position;
        self.hitboxes.record(key.clone(), depth, event.bounds);
        if self.hitboxes.innermost(position) != Some(key) {
            if self.hitboxes.hovered() == Some(key) {
                self.hitboxes.set_hovered(None);
                self.leave_row(key);
                cx.notify();
            }
            return;
        }

        if let Some(previous) = self.hitboxes.set_hovered(Some(key.clone())) {
            self.leave_row(&previous);
            cx.notify();
        }

        let resolved = self.builder.drag_over(
            &key.canvas_id,
            &key.element_id,
            form_point(position),
            form_bounds(event.bounds),
        );
        match resolved {
            Ok(Some(_)) => cx.notify(),
            Ok(None) => {}
            Err(err) => tracing::warn!(%err, "drag over failed"),
        }
    }

    fn leave_row(&mut self, key: &RowKey) {
        if let Err(err) = self.builder.drag_leave(&key.canvas_id, &key.element_id) {
            tracing::debug!(%err, "drag left a row that no longer exists");
        }
    }

    fn on_drop_in_zone(
        &mut self,
        canvas_id: &str,
        dropzone_id: &str,
        drag: &FormDrag,
        cx: &mut Context<Self>,
    ) {
        if drag.builder_id != cx.entity_id() {
            return;
        }

        let result = self
            .builder
            .drop(canvas_id, dropzone_id, &drag.transfer.borrow());
        match result {
            Ok(outcome) => {
                if let Some(on_drop) = self.callbacks.on_drop.clone() {
                    on_drop(&outcome, &self.builder);
                }
            }
            Err(err) => tracing::warn!(%err, canvas_id, dropzone_id, "drop failed"),
        }
        self.finish_drag();
        cx.notify();
    }

    fn on_drop_on_trash(&mut self, drag: &FormDrag, _window: &mut Window, cx: &mut Context<Self>) {
        if drag.builder_id != cx.entity_id() {
            return;
        }

        match self.builder.drop_on_trash(&drag.transfer.borrow()) {
            Ok(Some(removed)) => {
                if let Some(on_trash) = self.callbacks.on_trash.clone() {
                    on_trash(&removed);
                }
            }
            Ok(None) => {}
            Err(err) => tracing::warn!(%err, "drop on trash failed"),
        }
        self.finish_drag();
        cx.notify();
    }

    fn finish_drag(&mut self) {
        if let Some(source) = self.drag_source.take() {
            self.builder.drag_end(&source);
        }
        self.hitboxes.clear();
    }

    fn mark_initialized(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        let ids: Vec<String> = self
            .builder
            .canvases()
            .map(|canvas| canvas.id().to_string())
            .collect();
        for id in ids {
            if let Some(canvas) = self.builder.canvas_mut(&id) {
                canvas.mark_initialized();
            }
        }
    }

    fn zone_model(
        &self,
        canvas: &Canvas,
        zone_id: &str,
        nodes: &[ElementNode],
        depth: usize,
    ) -> ZoneModel {
        let rows = nodes
            .iter()
            .filter_map(|node| {
                let item = canvas.entry(&node.id)?.item().clone();
                let zone = (self.containers.contains(&node.kind) || !node.children.is_empty())
                    .then(|| self.zone_model(canvas, &node.id, &node.children, depth + 1));
                Some(RowModel {
                    key: RowKey::new(canvas.id().to_string(), node.id.clone()),
                    item,
                    depth,
                    zone,
                })
            })
            .collect();

        ZoneModel {
            canvas_id: canvas.id().to_string().into(),
            zone_id: zone_id.to_string().into(),
            axis: canvas.dropzone_config(zone_id).axis(),
            rows,
        }
    }
}

struct ZoneModel {
    canvas_id: SharedString,
    zone_id: SharedString,
    axis: Axis,
    rows: Vec<RowModel>,
}

struct RowModel {
    key: RowKey,
    item: DraggableItem,
    depth: usize,
    zone: Option<ZoneModel>,
}

/// Per-frame values shared by every row.
struct RowRenderer {
    state_entity: Entity<FormBuilderState>,
    builder_id: EntityId,
    dragged: Option<DragSource>,
    render_item: RenderItem,
    drop_target: Hsla,
    drag_border: Hsla,
    border: Hsla,
}

impl RowRenderer {
    fn render_zone(
        &self,
        zone: ZoneModel,
        window: &mut Window,
        cx: &mut Context<FormBuilderState>,
    ) -> AnyElement {
        let ZoneModel {
            canvas_id,
            zone_id,
            axis,
            rows,
        } = zone;
        let rows: Vec<AnyElement> = rows
            .into_iter()
            .map(|row| self.render_row(row, axis, window, cx))
            .collect();

        let container = match axis {
            Axis::Horizontal => h_flex().flex_wrap().gap_x_2(),
            Axis::Vertical => v_flex().gap_y_1(),
        };
        container
            .min_h(px(36.))
            .p(px(6.))
            .rounded(px(6.))
            .border_1()
            .border_color(self.border)
            .on_drop::<FormDrag>(cx.listener(move |this, drag, _window, cx| {
                this.on_drop_in_zone(&canvas_id, &zone_id, drag, cx);
            }))
            .children(rows)
            .into_any_element()
    }

    fn render_row(
        &self,
        row: RowModel,
        axis: Axis,
        window: &mut Window,
        cx: &mut Context<FormBuilderState>,
    ) -> AnyElement {
        let RowModel {
            key,
            item,
            depth,
            zone,
        } = row;

        let dragging = cx.has_active_drag()
            && matches!(
                &self.dragged,
                Some(DragSource::Canvas { canvas_id, element_id })
                    if canvas_id == key.canvas_id.as_str()
                        && element_id == key.element_id.as_str()
            );
        let marker = item.marker();
        let row_state = FormRowState {
            depth,
            dragging,
            phase: item.phase(),
            marker,
        };
        let list_item = (self.render_item)(&item, row_state, window, cx);
        let nested = zone.map(|zone| self.render_zone(zone, window, cx));

        let source = DragSource::Canvas {
            canvas_id: key.canvas_id.to_string(),
            element_id: key.element_id.to_string(),
        };
        let drag_value = FormDrag::new(self.builder_id, source, &item);
        let drop_target_bg = self.drop_target;
        let row_key = key.clone();

        div()
            .id(ElementId::Name(
                format!("form-row-{}-{}", key.canvas_id, key.element_id).into(),
            ))
            .border_color(self.drag_border)
            .map(|this| match (axis, marker) {
                (_, InsertionMarker::None) => this,
                (Axis::Vertical, InsertionMarker::Before) => this.border_t_2(),
                (Axis::Vertical, InsertionMarker::After) => this.border_b_2(),
                (Axis::Horizontal, InsertionMarker::Before) => this.border_l_2(),
                (Axis::Horizontal, InsertionMarker::After) => this.border_r_2(),
            })
            .when(marker != InsertionMarker::None, |this| {
                this.bg(drop_target_bg.alpha(drop_target_bg.a.max(0.2)))
            })
            .when(dragging, |this| this.opacity(0.4))
            .child(list_item)
            .when_some(nested, |this, nested| this.child(div().pl(px(12.)).child(nested)))
            .on_drag_move::<FormDrag>(cx.listener(move |this, event, _window, cx| {
                this.on_row_drag_move(&row_key, depth, event, cx);
            }))
            .when(item.is_draggable(), |this| {
                let state_entity = self.state_entity.clone();
                this.cursor(CursorStyle::OpenHand)
                    .on_drag(drag_value, move |drag, _offset, window, cx| {
                        state_entity.update(cx, |state, cx| {
                            state.on_drag_start(drag, window, cx);
                        });
                        let (kind, label) = (drag.kind.clone(), drag.label.clone());
                        cx.new(|_| DragGhost::new(kind, label))
                    })
            })
            .into_any_element()
    }

    fn render_palette_entry(
        &self,
        ix: usize,
        item: &DraggableItem,
        window: &mut Window,
        cx: &mut Context<FormBuilderState>,
    ) -> AnyElement {
        let list_item = (self.render_item)(item, FormRowState::default(), window, cx);
        let source = DragSource::Palette {
            entry_id: item.id.clone(),
        };
        let drag_value = FormDrag::new(self.builder_id, source, item);
        let state_entity = self.state_entity.clone();

        div()
            .id(("form-palette", ix))
            .cursor(CursorStyle::OpenHand)
            .child(list_item)
            .on_drag(drag_value, move |drag, _offset, window, cx| {
                state_entity.update(cx, |state, cx| {
                    state.on_drag_start(drag, window, cx);
                });
                let (kind, label) = (drag.kind.clone(), drag.label.clone());
                cx.new(|_| DragGhost::new(kind, label))
            })
            .into_any_element()
    }
}

impl Render for FormBuilderState {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        if !cx.has_active_drag() {
            self.finish_drag();
        }
        self.mark_initialized();

        let theme = cx.theme();
        let renderer = RowRenderer {
            state_entity: cx.entity(),
            builder_id: cx.entity_id(),
            dragged: self.drag_source.clone(),
            render_item: Rc::clone(&self.render_item),
            drop_target: theme.drop_target,
            drag_border: theme.drag_border,
            border: theme.border,
        };
        let muted = theme.muted_foreground;

        let zones: Vec<(SharedString, ZoneModel)> = self
            .builder
            .canvases()
            .map(|canvas| {
                let tree = canvas.tree();
                let zone = self.zone_model(canvas, tree.root_id(), tree.children(), 0);
                (SharedString::from(canvas.id().to_string()), zone)
            })
            .collect();
        let palette_items: Vec<DraggableItem> = self.builder.palette().items().to_vec();

        let palette = palette_items
            .iter()
            .enumerate()
            .map(|(ix, item)| renderer.render_palette_entry(ix, item, window, cx))
            .collect::<Vec<_>>();
        let canvases = zones
            .into_iter()
            .map(|(canvas_id, zone)| {
                v_flex()
                    .gap_y_1()
                    .child(div().text_sm().text_color(muted).child(canvas_id))
                    .child(renderer.render_zone(zone, window, cx))
            })
            .collect::<Vec<_>>();

        let trash_bg = renderer.drop_target;
        h_flex()
            .id("form-builder-state")
            .size_full()
            .items_start()
            .gap_x_3()
            .child(
                v_flex()
                    .w(px(220.))
                    .gap_y_2()
                    .child(v_flex().gap_y_1().children(palette))
                    .child(
                        div()
                            .id("form-trash")
                            .p(px(12.))
                            .rounded(px(6.))
                            .border_1()
                            .border_color(renderer.border)
                            .text_sm()
                            .text_color(muted)
                            .child("Drop here to remove")
                            .drag_over::<FormDrag>(move |style, _, _, _| style.bg(trash_bg))
                            .on_drop::<FormDrag>(cx.listener(Self::on_drop_on_trash)),
                    ),
            )
            .child(v_flex().flex_1().min_w(px(0.)).gap_y_3().children(canvases))
    }
}

fn default_render_item(
    item: &DraggableItem,
    _: FormRowState,
    _: &mut Window,
    _: &mut App,
) -> ListItem {
    ListItem::new(SharedString::from(format!("form-item-{}", item.id))).child(item_label(item))
}

fn item_label(item: &DraggableItem) -> SharedString {
    item.name.clone().unwrap_or_else(|| item.kind.clone()).into()
}

/// A drag-and-drop form builder element: palette, canvases and trash.
#[derive(IntoElement)]
pub struct FormBuilderView {
    id: ElementId,
    state: Entity<FormBuilderState>,
    style: StyleRefinement,
    render_item: RenderItem,
}

impl FormBuilderView {
    pub fn new<R>(state: &Entity<FormBuilderState>, render_item: R) -> Self
    where
        R: Fn(&DraggableItem, FormRowState, &mut Window, &mut App) -> ListItem + 'static,
    {
        Self {
            id: ElementId::Name(format!("form-builder-{}", state.entity_id()).into()),
            state: state.clone(),
            style: StyleRefinement::default(),
            render_item: Rc::new(render_item),
        }
    }
}

impl Styled for FormBuilderView {
    fn style(&mut self) -> &mut StyleRefinement {
        &mut self.style
    }
}

impl RenderOnce for FormBuilderView {
    fn render(self, _window: &mut Window, cx: &mut App) -> impl IntoElement {
        let focus_handle = self.state.read(cx).focus_handle.clone();
        self.state
            .update(cx, |state, _| state.render_item = self.render_item);

        div()
            .id(self.id)
            .key_context(CONTEXT)
            .track_focus(&focus_handle)
            .size_full()
            .child(self.state)
            .refine_style(&self.style)
    }
}
