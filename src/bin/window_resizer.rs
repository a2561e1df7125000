use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use window_resizer::actor::onboarding::GuideMessage;
use window_resizer::actor::rpc::{RpcActor, RpcClient};
use window_resizer::actor::{self, onboarding};
use window_resizer::common::config::Config;
use window_resizer::common::log;
use window_resizer::model::prefs::{CLOSE_ON_APPLY_KEY, JsonFileStore, PreferenceStore};
use window_resizer::model::session::Preview;
use window_resizer::model::{
    CustomRatio, InteractionMode, RatioSelection, ResizerSession, SessionOptions, Status,
};
use window_resizer::sys::geometry::Rect;
use window_resizer::sys::host::{WindowHost, WindowId, WindowUpdate};
use window_resizer::sys::snapshot::SnapshotHost;

const RPC_OWNER: &str = "window-resizer";

#[derive(Parser)]
#[command(version, about = "Resize a window to an exact size and aspect ratio")]
struct Cli {
    /// Config file (defaults to <config dir>/window-resizer/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON snapshot describing displays and windows.
    #[arg(long, global = true)]
    host: Option<PathBuf>,

    /// Preference file (defaults to <data dir>/window-resizer/prefs.json).
    #[arg(long, global = true)]
    prefs: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the displays the host reports.
    Displays,
    /// Show the display and display-local rect for a window.
    Locate {
        #[arg(long)]
        window: Option<WindowId>,
    },
    /// Show the geometry an apply would produce, without applying it.
    Preview(Edit),
    /// Apply the edited geometry to the target window.
    Apply {
        #[command(flatten)]
        edit: Edit,
        /// Keep the resizer open after applying.
        #[arg(long)]
        keep_open: bool,
    },
    /// Set whether the resizer closes itself after a successful apply.
    CloseOnApply {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
    /// Talk to the background router.
    Rpc {
        #[command(subcommand)]
        call: RpcCall,
    },
    /// Validate an onboarding message payload given as JSON.
    Guide { payload: String },
}

#[derive(Subcommand, Clone, Copy)]
enum RpcCall {
    Ping,
    CounterGet,
    CounterIncrement,
}

#[derive(Args, Clone)]
struct Edit {
    /// Target window; defaults to the stored target.
    #[arg(long)]
    window: Option<WindowId>,
    /// `free`, `custom`, or one of the named ratios such as `16:9`.
    #[arg(long)]
    ratio: Option<RatioSelection>,
    #[arg(long, requires = "custom_height")]
    custom_width: Option<f64>,
    #[arg(long, requires = "custom_width")]
    custom_height: Option<f64>,
    /// Move by this many display pixels.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    dx: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    dy: f64,
    /// Grow from the top-left corner by this many display pixels.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    dw: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    dh: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    target: Option<WindowId>,
    ratio: String,
    system_rect: Option<Rect>,
    virtual_rect: Option<Rect>,
    /// The rects as drawn in the preview container.
    preview: Preview,
    #[serde(skip_serializing_if = "Option::is_none")]
    update: Option<WindowUpdate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<Status>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("failed to load config")?;
    log::init(&config.settings.log_filter);
    debug!(?config, "loaded config");

    let prefs = JsonFileStore::new(prefs_path(&cli, &config)?);

    match cli.command {
        Command::Displays => {
            let host = open_host(cli.host.as_deref())?;
            print_json(&host.list_displays().await?)
        }
        Command::Locate { window } => {
            let host = open_host(cli.host.as_deref())?;
            let located = window_resizer::sys::screen::locate(&host, window).await?;
            print_json(&located)
        }
        Command::Preview(edit) => {
            let host = open_host(cli.host.as_deref())?;
            let session = edited_session(host, &prefs, &config, &edit).await?;
            print_json(&report(&session, None))
        }
        Command::Apply { edit, keep_open } => {
            let host = open_host(cli.host.as_deref())?;
            let mut session = edited_session(host, &prefs, &config, &edit).await?;
            if keep_open {
                session.override_close_on_apply(false);
            }
            let result = session.apply().await;
            print_json(&report(&session, result.as_ref().ok().copied()))?;
            result.map(|_| ()).context("apply failed")
        }
        Command::CloseOnApply { enabled } => {
            prefs
                .set(CLOSE_ON_APPLY_KEY, enabled.into())
                .context("failed to store preference")?;
            print_json(&enabled)
        }
        Command::Rpc { call } => {
            let (tx, rx) = actor::channel();
            tokio::spawn(RpcActor::new(RPC_OWNER, prefs, rx).run());
            let client = RpcClient::new(RPC_OWNER, tx);
            match call {
                RpcCall::Ping => print_json(&client.ping().await?),
                RpcCall::CounterGet => print_json(&client.counter_get().await?),
                RpcCall::CounterIncrement => print_json(&client.counter_increment().await?),
            }
        }
        Command::Guide { payload } => {
            let payload: serde_json::Value =
                serde_json::from_str(&payload).context("payload is not JSON")?;
            let Some(message) = GuideMessage::parse(&payload) else {
                bail!("not an onboarding message");
            };
            if let Some(toast) = onboarding::receive(&payload) {
                eprintln!("{toast}");
            }
            println!("{}", message.markdown());
            Ok(())
        }
    }
}

fn prefs_path(cli: &Cli, config: &Config) -> anyhow::Result<PathBuf> {
    cli.prefs
        .clone()
        .or_else(|| config.settings.prefs_path.clone())
        .or_else(JsonFileStore::default_path)
        .context("no preference file path available")
}

fn open_host(path: Option<&Path>) -> anyhow::Result<SnapshotHost> {
    let path = path.context("--host <snapshot.json> is required for this command")?;
    SnapshotHost::open(path).with_context(|| format!("failed to open host {}", path.display()))
}

async fn edited_session<'a>(
    host: SnapshotHost,
    prefs: &'a JsonFileStore,
    config: &Config,
    edit: &Edit,
) -> anyhow::Result<ResizerSession<SnapshotHost, &'a JsonFileStore>> {
    let mut options: SessionOptions = config.session_options();
    options.target = edit.window;
    if let Some(ratio) = edit.ratio {
        options.selection = ratio;
    }
    if let (Some(w), Some(h)) = (edit.custom_width, edit.custom_height) {
        options.custom = CustomRatio::new(w, h);
    }

    let mut session = ResizerSession::new(host, prefs, options);
    session.load().await.context("failed to locate window")?;

    // Replay the edits as pointer gestures in preview space.
    let scale = session.scale();
    if edit.dx != 0.0 || edit.dy != 0.0 {
        session.pointer_down(InteractionMode::Drag, 0.0, 0.0);
        session.pointer_move(edit.dx * scale, edit.dy * scale);
        session.pointer_up();
    }
    if edit.dw != 0.0 || edit.dh != 0.0 {
        session.pointer_down(InteractionMode::Resize, 0.0, 0.0);
        session.pointer_move(edit.dw * scale, edit.dh * scale);
        session.pointer_up();
    }
    Ok(session)
}

fn report<H: WindowHost, P: PreferenceStore>(
    session: &ResizerSession<H, P>,
    update: Option<WindowUpdate>,
) -> Report {
    Report {
        target: session.target(),
        ratio: session.ratio_label(),
        system_rect: session.system_rect().copied(),
        virtual_rect: session.virtual_rect().copied(),
        preview: session.preview(),
        update,
        status: session.status().cloned(),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
