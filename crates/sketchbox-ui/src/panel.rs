//! Parameter panel: one labelled row per declared parameter.
//!
//! Widgets write the value of their control into the session's
//! [`LiveValues`] whenever it changes; the render tick reads the store.
//! The panel is rebuilt from scratch after every reload, so a
//! [`LayoutContext`] lives for exactly one rebuild.

use std::f64::consts::TAU;
use std::path::{Path, PathBuf};

use gtk4::prelude::*;
use gtk4::{
    gdk, Adjustment, Box, Button, CheckButton, ColorButton, ComboBoxText, Entry,
    FileChooserAction, FileChooserDialog, FontButton, Label, ListBox, Orientation,
    ResponseType, Scale, ScrolledWindow, SelectionMode, SizeGroup, SizeGroupMode, SpinButton,
    TextView, Widget,
};
use sketchbox_core::Rgba;
use sketchbox_params::{
    ImageSource, LiveValues, Parameter, ParameterDrag, ParameterGroup, ParameterKind, Value,
};
use tracing::debug;

use crate::dial::dial;

const ROW_SPACING: i32 = 6;
const ROW_MARGIN: i32 = 5;
const ENTRY_DIGITS: u32 = 3;
/// Spin button resolution for angles, in radians.
const ANGLE_STEP: f64 = 1.0 / 3600.0;

/// Shared state for building one generation of parameter widgets.
pub struct LayoutContext {
    /// Keeps the name column aligned.
    pub labels: SizeGroup,
    /// Keeps the leading entry of compound widgets aligned.
    pub entries: SizeGroup,
    pub live: LiveValues,
    pub drag_threshold: f64,
}

impl LayoutContext {
    pub fn new(live: LiveValues, drag_threshold: f64) -> Self {
        Self {
            labels: SizeGroup::new(SizeGroupMode::Horizontal),
            entries: SizeGroup::new(SizeGroupMode::Horizontal),
            live,
            drag_threshold,
        }
    }
}

/// Builds the list of parameter rows.
pub fn build_list(params: &ParameterGroup, ctx: &LayoutContext) -> ListBox {
    let listbox = ListBox::new();
    listbox.set_selection_mode(SelectionMode::None);

    for param in params.iter() {
        let row = Box::new(Orientation::Horizontal, ROW_SPACING);
        row.set_margin_top(ROW_MARGIN);
        row.set_margin_bottom(ROW_MARGIN);
        row.set_margin_start(ROW_MARGIN * 2);
        row.set_margin_end(ROW_MARGIN * 2);

        let label = Label::new(None);
        label.set_markup(&format!(
            "<b><tt>{}</tt></b>",
            glib::markup_escape_text(param.name())
        ));
        label.set_xalign(0.0);
        label.set_tooltip_text(Some(&param.kind().describe().to_string()));
        ctx.labels.add_widget(&label);
        row.append(&label);

        let widget = parameter_widget(param, ctx);
        widget.set_hexpand(true);
        row.append(&widget);
        listbox.append(&row);
    }

    listbox
}

/// The control for one parameter.
pub fn parameter_widget(param: &Parameter, ctx: &LayoutContext) -> Widget {
    match param.kind() {
        ParameterKind::Numeric {
            lower,
            upper,
            step,
            default,
        } => numeric_widget(param, ctx, *lower, *upper, *step, *default),
        ParameterKind::Angle { default } => angle_widget(param, ctx, *default),
        ParameterKind::Infinite { default, .. } => infinite_widget(param, ctx, *default),
        ParameterKind::Toggle { default } => {
            let check = CheckButton::builder().active(*default).build();
            let (live, name) = (ctx.live.clone(), param.name().to_string());
            check.connect_toggled(move |check| {
                live.set(name.clone(), Value::Bool(check.is_active()));
            });
            check.upcast()
        }
        ParameterKind::Color { default } => color_widget(param, ctx, *default),
        ParameterKind::Text {
            default,
            multiline: true,
        } => multiline_widget(param, ctx, default),
        ParameterKind::Text { default, .. } => {
            let entry = Entry::new();
            entry.set_text(default);
            let (live, name) = (ctx.live.clone(), param.name().to_string());
            entry.connect_changed(move |entry| {
                live.set(name.clone(), Value::Text(entry.text().to_string()));
            });
            entry.upcast()
        }
        ParameterKind::Choice {
            alternatives,
            default,
            with_entry,
        } => choice_widget(param, ctx, alternatives, *default, *with_entry),
        ParameterKind::Font { default } => font_widget(param, ctx, default),
        ParameterKind::Image { default } => {
            let path = match default {
                ImageSource::Empty => None,
                ImageSource::File(path) => Some(path.clone()),
            };
            file_widget(param, ctx, "Choose Image", path, |path| {
                Value::Image(ImageSource::File(path))
            })
        }
        ParameterKind::Script { default } => {
            file_widget(param, ctx, "Choose Script", Some(default.clone()), Value::Script)
        }
        ParameterKind::Point { .. } | ParameterKind::Table { .. } | ParameterKind::Custom { .. } => {
            text_widget(param, ctx)
        }
    }
}

fn numeric_widget(
    param: &Parameter,
    ctx: &LayoutContext,
    lower: f64,
    upper: f64,
    step: f64,
    default: f64,
) -> Widget {
    let adjustment = Adjustment::new(default, lower, upper, step, step * 10.0, 0.0);
    let spin = SpinButton::new(Some(&adjustment), step, ENTRY_DIGITS);
    ctx.entries.add_widget(&spin);
    let scale = Scale::new(Orientation::Horizontal, Some(&adjustment));
    scale.set_draw_value(true);
    scale.set_hexpand(true);

    let (live, name) = (ctx.live.clone(), param.name().to_string());
    adjustment.connect_value_changed(move |adj| {
        live.set(name.clone(), Value::Number(adj.value()));
    });

    let row = Box::new(Orientation::Horizontal, ROW_SPACING * 2);
    row.append(&spin);
    row.append(&scale);
    row.upcast()
}

fn value_label(value: f64) -> Label {
    let label = Label::new(Some(&format!("{value:.2}")));
    label.set_hexpand(true);
    label.set_xalign(1.0);
    label
}

/// Current number for `name`, falling back to `default`.
fn live_number(live: &LiveValues, name: &str, default: f64) -> f64 {
    live.get(name)
        .and_then(|v| v.as_number())
        .unwrap_or(default)
}

fn angle_widget(param: &Parameter, ctx: &LayoutContext, default: f64) -> Widget {
    let adjustment = Adjustment::new(default, 0.0, TAU, ANGLE_STEP, 0.1, 0.0);
    let spin = SpinButton::new(Some(&adjustment), ANGLE_STEP, ENTRY_DIGITS);
    spin.set_wrap(true);
    ctx.entries.add_widget(&spin);
    let label = value_label(default);

    let (live, name) = (ctx.live.clone(), param.name().to_string());
    let value = move || live_number(&live, &name, default);
    let adj = adjustment.clone();
    let Some(drag) = ParameterDrag::new(param, ctx.live.clone()) else {
        return spin.upcast();
    };
    let knob = dial(
        drag.on_change(move |v| adj.set_value(v)),
        ctx.drag_threshold,
        value,
    );

    let (live, name, area, text) = (
        ctx.live.clone(),
        param.name().to_string(),
        knob.clone(),
        label.clone(),
    );
    adjustment.connect_value_changed(move |adj| {
        live.set(name.clone(), Value::Number(adj.value()));
        text.set_text(&format!("{:.2}", adj.value()));
        area.queue_draw();
    });

    let row = Box::new(Orientation::Horizontal, ROW_SPACING * 2);
    row.append(&spin);
    row.append(&knob);
    row.append(&label);
    row.upcast()
}

fn infinite_widget(param: &Parameter, ctx: &LayoutContext, default: f64) -> Widget {
    let entry = Entry::new();
    entry.set_text(&default.to_string());
    ctx.entries.add_widget(&entry);
    let label = value_label(default);

    let (live, name) = (ctx.live.clone(), param.name().to_string());
    let value = move || live_number(&live, &name, default);
    let Some(drag) = ParameterDrag::new(param, ctx.live.clone()) else {
        return entry.upcast();
    };
    let (shown, text) = (entry.clone(), label.clone());
    let knob = dial(
        drag.on_change(move |v| {
            shown.set_text(&format!("{v:.2}"));
            text.set_text(&format!("{v:.2}"));
        }),
        ctx.drag_threshold,
        value,
    );

    let (live, param_, area, text) = (ctx.live.clone(), param.clone(), knob.clone(), label.clone());
    entry.connect_activate(move |entry| match param_.parse_text(&entry.text()) {
        Ok(value) => {
            if let Some(n) = value.as_number() {
                text.set_text(&format!("{n:.2}"));
            }
            live.set(param_.name().to_string(), value);
            entry.remove_css_class("error");
            area.queue_draw();
        }
        Err(e) => {
            debug!(error = %e, "rejected parameter text");
            entry.add_css_class("error");
        }
    });

    let row = Box::new(Orientation::Horizontal, ROW_SPACING * 2);
    row.append(&entry);
    row.append(&knob);
    row.append(&label);
    row.upcast()
}

fn color_widget(param: &Parameter, ctx: &LayoutContext, default: Rgba) -> Widget {
    let rgba = gdk::RGBA::new(
        default.r as f32,
        default.g as f32,
        default.b as f32,
        default.a as f32,
    );
    let button = ColorButton::with_rgba(&rgba);
    button.set_use_alpha(true);
    let (live, name) = (ctx.live.clone(), param.name().to_string());
    button.connect_color_set(move |button| {
        let c = button.rgba();
        let color = Rgba::new(
            c.red() as f64,
            c.green() as f64,
            c.blue() as f64,
            c.alpha() as f64,
        );
        live.set(name.clone(), Value::Color(color));
    });
    button.upcast()
}

fn multiline_widget(param: &Parameter, ctx: &LayoutContext, default: &str) -> Widget {
    let view = TextView::new();
    view.set_editable(true);
    let buffer = view.buffer();
    buffer.set_text(default);
    let (live, name) = (ctx.live.clone(), param.name().to_string());
    buffer.connect_changed(move |buffer| {
        let (start, end) = buffer.bounds();
        let text = buffer.text(&start, &end, true);
        live.set(name.clone(), Value::Text(text.to_string()));
    });

    ScrolledWindow::builder()
        .child(&view)
        .min_content_height(80)
        .build()
        .upcast()
}

fn choice_widget(
    param: &Parameter,
    ctx: &LayoutContext,
    alternatives: &[(String, Value)],
    default: usize,
    with_entry: bool,
) -> Widget {
    let combo = if with_entry {
        ComboBoxText::with_entry()
    } else {
        ComboBoxText::new()
    };
    for (label, _) in alternatives {
        combo.append_text(label);
    }
    combo.set_active(u32::try_from(default).ok());

    let (live, param_) = (ctx.live.clone(), param.clone());
    combo.connect_changed(move |combo| {
        let Some(text) = combo.active_text() else {
            return;
        };
        // typed text must still name one of the alternatives
        match param_.parse_text(&text) {
            Ok(value) => live.set(param_.name().to_string(), value),
            Err(e) => debug!(error = %e, "rejected choice text"),
        }
    });
    combo.upcast()
}

/// Strips a trailing point size from a font description.
pub fn font_without_size(font: &str) -> String {
    let mut words: Vec<&str> = font.split_whitespace().collect();
    if words.len() > 1 && words.last().is_some_and(|w| w.parse::<f64>().is_ok()) {
        words.pop();
    }
    words.join(" ")
}

fn font_widget(param: &Parameter, ctx: &LayoutContext, default: &str) -> Widget {
    let button = FontButton::with_font(default);
    button.set_use_font(true);
    button.set_use_size(false);
    button.set_show_size(false);
    let (live, name) = (ctx.live.clone(), param.name().to_string());
    button.connect_font_set(move |button| {
        if let Some(font) = button.font() {
            live.set(name.clone(), Value::Text(font_without_size(&font)));
        }
    });
    button.upcast()
}

fn file_label(path: Option<&Path>) -> String {
    path.and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "(none)".to_string())
}

fn file_widget(
    param: &Parameter,
    ctx: &LayoutContext,
    title: &'static str,
    initial: Option<PathBuf>,
    to_value: impl Fn(PathBuf) -> Value + Clone + 'static,
) -> Widget {
    let button = Button::with_label(&file_label(initial.as_deref()));
    if let Some(path) = &initial {
        button.set_tooltip_text(Some(&path.display().to_string()));
    }

    let (live, name) = (ctx.live.clone(), param.name().to_string());
    button.connect_clicked(move |button| {
        let dialog = FileChooserDialog::new(
            Some(title),
            button.root().and_downcast_ref::<gtk4::Window>(),
            FileChooserAction::Open,
            &[("Cancel", ResponseType::Cancel), ("Open", ResponseType::Accept)],
        );
        dialog.set_modal(true);

        let (live, name, button, to_value) =
            (live.clone(), name.clone(), button.clone(), to_value.clone());
        dialog.connect_response(move |d, response| {
            if response == ResponseType::Accept {
                if let Some(path) = d.file().and_then(|file| file.path()) {
                    button.set_label(&file_label(Some(&path)));
                    button.set_tooltip_text(Some(&path.display().to_string()));
                    live.set(name.clone(), to_value(path));
                }
            }
            d.close();
        });
        dialog.present();
    });
    button.upcast()
}

/// Free text in the parameter's own grammar; applied on Enter.
fn text_widget(param: &Parameter, ctx: &LayoutContext) -> Widget {
    let entry = Entry::new();
    entry.set_text(&param.format_text(&param.default_value()));
    let (live, param_) = (ctx.live.clone(), param.clone());
    entry.connect_activate(move |entry| match param_.parse_text(&entry.text()) {
        Ok(value) => {
            live.set(param_.name().to_string(), value);
            entry.remove_css_class("error");
            entry.set_tooltip_text(None);
        }
        Err(e) => {
            entry.add_css_class("error");
            entry.set_tooltip_text(Some(&e.to_string()));
        }
    });
    entry.upcast()
}
