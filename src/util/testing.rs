//! Shared test setup: tracing output and a small reference topology.

use std::sync::Once;

use tracing::info;
use tracing_subscriber::{fmt, fmt::format::FmtSpan, prelude::*, EnvFilter};

use crate::domain::{NodeId, NodeKind, TopologyArena};

static TEST_SETUP: Once = Once::new();

/// Installs a test-writer subscriber once per test binary.
///
/// `RUST_LOG` overrides the default of tracing this crate only.
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("topotree=trace"));
        let layer = fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter);

        if tracing_subscriber::registry().with(layer).try_init().is_ok() {
            info!("Test Setup complete");
        }
    });
}

/// Two clusters, the first holding two servers and the first server one bucket.
///
/// ```text
/// c1
/// ├── s1
/// │   └── b1
/// └── s2
/// c2
/// ```
pub struct TwoClusters {
    pub tree: TopologyArena,
    pub c1: NodeId,
    pub c2: NodeId,
    pub s1: NodeId,
    pub s2: NodeId,
    pub b1: NodeId,
}

impl TwoClusters {
    pub fn build() -> Self {
        init_test_setup();
        let mut tree = TopologyArena::new();
        let c1 = add(&mut tree, None, NodeKind::Cluster);
        let c2 = add(&mut tree, None, NodeKind::Cluster);
        let s1 = add(&mut tree, Some(c1), NodeKind::Server);
        let s2 = add(&mut tree, Some(c1), NodeKind::Server);
        let b1 = add(&mut tree, Some(s1), NodeKind::Bucket);
        Self {
            tree,
            c1,
            c2,
            s1,
            s2,
            b1,
        }
    }
}

fn add(tree: &mut TopologyArena, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
    match tree.add_child(parent, kind) {
        Ok(id) => id,
        Err(e) => panic!("reference topology is valid: {e}"),
    }
}
