//! `dynbind info`

use dynbind_engine::config::OVERLOAD_POLICY_ENV;

use super::Session;
use crate::output::StyledOutput;

pub fn execute(session: &Session, out: &mut StyledOutput) {
    out.header(&format!("dynbind v{}", env!("CARGO_PKG_VERSION")));
    out.line(&format!("Sample model: v{}", dynbind_sample::VERSION));
    out.newline();

    out.header("Configuration");
    out.line(&format!(
        "  Forward references: {}",
        session.config.build.resolve_forward_references
    ));
    out.line(&format!(
        "  Overload policy:    {:?}",
        session.dispatcher.options().overload_policy
    ));
    match std::env::var(OVERLOAD_POLICY_ENV) {
        Ok(value) => out.line(&format!("  {}={}", OVERLOAD_POLICY_ENV, value)),
        Err(_) => out.line(&format!("  {} (not set)", OVERLOAD_POLICY_ENV)),
    }
    out.newline();

    let Ok(catalog) = session.catalog() else {
        out.warning("Catalog is not built");
        return;
    };
    out.header("Catalog");
    out.line(&format!("  Classes:           {}", catalog.class_count()));
    out.line(&format!("  Channels:          {}", catalog.channel_count()));
    out.line(&format!("  Global methods:    {}", catalog.global_methods().len()));
    out.line(&format!("  Global properties: {}", catalog.global_properties().len()));

    let groups = catalog.classes_grouped_by_module();
    if !groups.is_empty() {
        out.newline();
        out.header("Modules");
        for (module, classes) in groups {
            out.line(&format!("  {}: {}", module, classes.join(", ")));
        }
    }
}
