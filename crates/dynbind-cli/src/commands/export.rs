//! `dynbind export`

use std::path::Path;

use dynbind_engine::{CatalogExporter, ExportConfig};

use super::Session;
use crate::output::StyledOutput;

pub fn execute(
    session: &Session,
    config: ExportConfig,
    output: Option<&Path>,
    out: &mut StyledOutput,
) -> anyhow::Result<()> {
    let catalog = session.catalog()?;
    let exporter = CatalogExporter::new(config);

    match output {
        Some(path) => {
            let summary = exporter.export_to_file(&catalog, path)?;
            out.success(&format!(
                "Exported {} classes ({} methods, {} properties), {} channels ({} events) to {}",
                summary.classes,
                summary.methods,
                summary.properties,
                summary.channels,
                summary.events,
                path.display()
            ));
        }
        None => out.line(&exporter.export(&catalog)?),
    }
    Ok(())
}
