use std::cell::RefCell;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use gtk4::prelude::*;
use gtk4::{gio, ApplicationWindow, EventControllerKey, ScrolledWindow};
use libadwaita::Application as AdwApplication;
use sketchbox_script::{RenderOptions, SharedInput};
use sketchbox_settings::Config;
use tracing::{debug, info, warn};

use crate::canvas::RenderView;
use crate::panel::{build_list, LayoutContext};
use crate::session::Session;

pub const APP_ID: &str = "io.github.sketchbox.Sketchbox";

/// Everything the windows need, resolved from the command line and config.
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub script: PathBuf,
    pub config: Config,
    pub render: RenderOptions,
    /// Reload when the script changes on disk
    pub watch: bool,
    /// Stream input snapshots from stdin
    pub read_stdin: bool,
}

/// Asks for a script with a native file dialog.
pub fn choose_script() -> anyhow::Result<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Open sketch")
        .add_filter("Rhai scripts", &["rhai"])
        .pick_file()
        .ok_or_else(|| anyhow::anyhow!("no script selected"))
}

/// The render window, the parameter panel and the session they share.
struct Sandbox {
    session: Rc<RefCell<Session>>,
    view: RenderView,
    panel: ScrolledWindow,
    drag_threshold: f64,
}

impl Sandbox {
    fn reload(&self) {
        self.session.borrow_mut().reload();
        self.refresh();
    }

    /// Rebuilds the panel and resizes the canvas after a load.
    fn refresh(&self) {
        let session = self.session.borrow();
        let ctx = LayoutContext::new(session.live().clone(), self.drag_threshold);
        let list = build_list(session.script().params(), &ctx);
        self.panel.set_child(Some(&list));
        self.view.set_resolution(session.script().resolution());
        self.view.area.queue_draw();
        debug!(params = session.script().params().len(), "panel rebuilt");
    }
}

fn build_windows(app: &AdwApplication, options: &AppOptions) {
    let input = SharedInput::new();
    if options.read_stdin {
        if let Err(e) = input.spawn_reader(BufReader::new(io::stdin())) {
            warn!(error = %e, "cannot read stdin");
        }
    }

    let mut session = Session::open(&options.script, options.render.clone(), input);
    if options.watch {
        session.watch();
    }
    let title = session.path().display().to_string();
    let session = Rc::new(RefCell::new(session));

    let drag_threshold = options.config.render.drag_threshold;
    let sandbox = Rc::new(Sandbox {
        view: RenderView::new(session.clone(), drag_threshold),
        panel: ScrolledWindow::new(),
        session,
        drag_threshold,
    });
    sandbox.refresh();

    let render_window = ApplicationWindow::builder()
        .application(app)
        .title(format!("Render: {title}"))
        .child(&sandbox.view.scrolled)
        .build();

    let panel_window = ApplicationWindow::builder()
        .application(app)
        .title(format!("Parameters: {title}"))
        .default_width(options.config.window.panel_width as i32)
        .default_height(options.config.window.panel_height as i32)
        .child(&sandbox.panel)
        .build();

    let keys = EventControllerKey::new();
    let sb = sandbox.clone();
    keys.connect_key_pressed(move |_, key, _, _| {
        debug!(key = ?key.name(), "reload requested");
        sb.reload();
        glib::Propagation::Stop
    });
    render_window.add_controller(keys);

    for window in [&render_window, &panel_window] {
        let app = app.clone();
        window.connect_close_request(move |_| {
            app.quit();
            glib::Propagation::Proceed
        });
    }

    let sb = sandbox;
    glib::timeout_add_local(
        Duration::from_millis(options.config.render.tick_interval_ms),
        move || {
            let changed = sb.session.borrow_mut().poll_watcher();
            if changed {
                sb.refresh();
            } else {
                sb.view.area.queue_draw();
            }
            glib::ControlFlow::Continue
        },
    );

    panel_window.present();
    render_window.present();
    info!(script = %title, "sandbox open");
}

/// Opens both windows and runs the main loop until either is closed.
pub fn run(options: AppOptions) -> glib::ExitCode {
    let app = AdwApplication::builder()
        .application_id(APP_ID)
        .flags(gio::ApplicationFlags::NON_UNIQUE)
        .build();

    let options = Rc::new(options);
    app.connect_activate(move |app| build_windows(app, &options));

    // arguments were already parsed by the binary
    app.run_with_args::<&str>(&[])
}
