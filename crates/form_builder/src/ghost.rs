use gpui::{
    Context, FontWeight, IntoElement, ParentElement as _, Render, SharedString, Styled as _,
    Window, div, px,
};
use gpui_component::{ActiveTheme as _, h_flex};

/// Floating preview that follows the pointer while an element is dragged.
pub(crate) struct DragGhost {
    kind: SharedString,
    label: SharedString,
}

impl DragGhost {
    pub(crate) fn new(kind: SharedString, label: SharedString) -> Self {
        Self { kind, label }
    }
}

impl Render for DragGhost {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        h_flex()
            .gap_x_2()
            .px(px(10.))
            .py(px(6.))
            .rounded(px(8.))
            .bg(theme.popover)
            .border_1()
            .border_color(theme.drag_border)
            .shadow_md()
            .text_color(theme.popover_foreground)
            .text_sm()
            .child(
                div()
                    .text_xs()
                    .font_weight(FontWeight::MEDIUM)
                    .text_color(theme.muted_foreground)
                    .child(self.kind.clone()),
            )
            .child(self.label.clone())
    }
}
