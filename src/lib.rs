//! In-memory ledger of banks, clients and their current, deposit and credit accounts.
pub mod bank;

use std::sync::Once;

use tracing_subscriber::{EnvFilter, filter::Directive, fmt};

static TRACING_INIT: Once = Once::new();

/// Installs the global tracing subscriber. `RUST_LOG` extends the default `bank_ledger=info`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let mut filter = EnvFilter::from_default_env();
        if let Ok(directive) = "bank_ledger=info".parse::<Directive>() {
            filter = filter.add_directive(directive);
        }
        fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    });
}
