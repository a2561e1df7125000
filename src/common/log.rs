use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_tree::HierarchicalLayer;

/// Installs the global subscriber, writing an indented span tree to stderr.
///
/// `RUST_LOG` overrides `default_filter`. Safe to call more than once; later
/// calls are ignored.
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let tree = HierarchicalLayer::default()
        .with_writer(std::io::stderr)
        .with_indent_lines(true)
        .with_targets(true);

    // Ignore the error if a subscriber is already set (tests, embedders).
    let _ = tracing_subscriber::registry().with(filter).with(tree).try_init();
}
