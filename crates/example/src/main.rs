//! Plugin resolution CLI.
//!
//! # Usage
//!
//! ```bash
//! resolve [--format pretty|compact|json] [--defaults <json>] <plugin>...
//! ```
//!
//! # Example
//!
//! ```bash
//! resolve reader writer backend=key_value "fallbacks={\"de\":\"en\"}"
//! ```

use example::{Invocation, init_tracing, run};
use pluggable_system::registry::PluginRegistry;

fn main() {
    let _ = dotenvy::dotenv();

    let invocation = match Invocation::parse(std::env::args().skip(1)) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Usage: resolve [--format pretty|compact|json] [--defaults <json>] <plugin>...");
            std::process::exit(2);
        }
    };
    init_tracing(invocation.format);

    match run(&invocation, PluginRegistry::global()) {
        Ok(report) => println!("{report}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
