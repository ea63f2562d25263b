//! `dynbind list`

use dynbind_engine::catalog::{ClassDescriptor, MethodDescriptor, ParameterDescriptor};

use super::Session;
use crate::output::StyledOutput;

/// Filters for the class listing
#[derive(Debug, Default)]
pub struct ListFilter {
    pub category: Option<String>,
    pub module: Option<String>,
    pub channels: bool,
}

pub fn execute(
    session: &Session,
    class: Option<&str>,
    filter: &ListFilter,
    out: &mut StyledOutput,
) -> anyhow::Result<()> {
    let catalog = session.catalog()?;

    if filter.channels {
        for channel in catalog.channels() {
            out.header(&channel.name);
            if let Some(address) = &channel.address {
                out.line(&format!("  address: {} {}", address.type_name, address.name));
            }
            for event in &channel.events {
                let mode = match (event.broadcast.is_some(), event.addressed.is_some()) {
                    (true, true) => "broadcast, addressed",
                    (true, false) => "broadcast",
                    (false, true) => "addressed",
                    (false, false) => "no sender",
                };
                out.line(&format!("  {}({})  [{}]", event.name, params(&event.parameters), mode));
            }
        }
        return Ok(());
    }

    if let Some(name) = class {
        let Some(class) = catalog.get_class(name) else {
            anyhow::bail!("Class not found: {}", name);
        };
        describe_class(class, out);
        return Ok(());
    }

    let classes = match (&filter.module, &filter.category) {
        (Some(module), _) => catalog.classes_by_module(module, true),
        (None, Some(category)) => catalog.classes_by_category(category, true),
        (None, None) => catalog.classes(),
    };
    for class in classes {
        let mut line = class.name.clone();
        if !class.doc.category.is_empty() {
            line.push_str(&format!("  [{}]", class.doc.category));
        }
        if class.doc.deprecated {
            out.warning(&format!("{}  (deprecated)", line));
        } else {
            out.line(&line);
        }
    }
    Ok(())
}

fn describe_class(class: &ClassDescriptor, out: &mut StyledOutput) {
    out.header(&class.name);
    if !class.doc.description.is_empty() {
        out.line(&format!("  {}", class.doc.description));
    }
    if !class.base_classes.is_empty() {
        out.line(&format!("  extends {}", class.base_classes.join(", ")));
    }
    if !class.source_module.is_empty() {
        out.line(&format!("  module {}", class.source_module));
    }

    if !class.constructors.is_empty() {
        out.newline();
        out.header("Constructors");
        for ctor in &class.constructors {
            out.line(&format!("  {}", signature(ctor)));
        }
    }
    if !class.methods.is_empty() {
        out.newline();
        out.header("Methods");
        for method in &class.methods {
            out.line(&format!("  {}", signature(method)));
        }
    }
    if !class.properties.is_empty() {
        out.newline();
        out.header("Properties");
        for property in &class.properties {
            let access = match (property.has_getter(), property.has_setter()) {
                (true, true) => "get/set",
                (true, false) => "get",
                _ => "set",
            };
            out.line(&format!(
                "  {}: {}  [{}]",
                property.name, property.value.type_name, access
            ));
        }
    }
}

fn params(parameters: &[ParameterDescriptor]) -> String {
    parameters
        .iter()
        .map(|p| format!("{} {}", p.type_name, p.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn signature(method: &MethodDescriptor) -> String {
    let mut sig = String::new();
    if method.is_static {
        sig.push_str("static ");
    }
    sig.push_str(&format!(
        "{} {}({})",
        method.return_value.type_name,
        method.name,
        params(&method.parameters)
    ));
    if method.is_const {
        sig.push_str(" const");
    }
    if !method.binding.is_bound() {
        sig.push_str("  (unbound)");
    }
    sig
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynbind_engine::catalog::TypeCatalog;

    fn method<'c>(catalog: &'c TypeCatalog, class: &str, name: &'c str) -> &'c MethodDescriptor {
        catalog
            .get_class(class)
            .unwrap()
            .methods_named(name)
            .next()
            .unwrap()
    }

    #[test]
    fn test_signatures() {
        let session = Session::open(None, false).unwrap();
        let catalog = session.catalog().unwrap();

        assert_eq!(
            signature(method(&catalog, "Math", "Lerp")),
            "static double Lerp(double from, double to, double t)"
        );
        assert_eq!(signature(method(&catalog, "Widget", "Area")), "int32 Area() const");
        assert_eq!(
            signature(method(&catalog, "Unbound", "Ping")),
            "static int32 Ping()  (unbound)"
        );
    }
}
