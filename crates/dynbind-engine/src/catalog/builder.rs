//! Catalog builder
//!
//! A build is a single pass over the registry's class, channel, free
//! function and free property tables. Each class is entered into the class
//! map before its members are reflected, so self-references classify as
//! handles. Base classes resolve only against classes seen earlier in the
//! pass unless [`BuildOptions::resolve_forward_references`] is set.

use std::sync::Arc;

use dynbind_sdk::{
    NativeRegistry, RegistryChannel, RegistryClass, RegistryMethod, RegistryParameter,
    RegistryProperty, TypeId,
};
use log::{debug, info, warn};
use parking_lot::RwLock;

use super::classifier::{type_name, ClassNames, Classifier};
use super::{
    Binding, BuildError, BuildOptions, ChannelDescriptor, ClassDescriptor, Documentation,
    EventDescriptor, MethodDescriptor, ParameterDescriptor, PropertyDescriptor, TypeCatalog,
};
use crate::marshal::MarshalKind;

/// Builds and publishes the type catalog.
///
/// The published catalog is an `Arc` snapshot swapped in only after a build
/// completes, so readers never observe a partial catalog.
#[derive(Debug, Default)]
pub struct Reflector {
    options: BuildOptions,
    classifier: Classifier,
    catalog: RwLock<Option<Arc<TypeCatalog>>>,
}

impl Reflector {
    /// Create with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with explicit options
    pub fn with_options(options: BuildOptions) -> Self {
        Reflector {
            options,
            ..Self::default()
        }
    }

    /// Build options in effect
    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Build a catalog from `registry` and publish it.
    ///
    /// A missing registry clears the published catalog and fails.
    pub fn build(&self, registry: Option<&NativeRegistry>) -> Result<Arc<TypeCatalog>, BuildError> {
        let Some(registry) = registry else {
            warn!("Catalog build requested without a registry; clearing catalog");
            self.clear();
            return Err(BuildError::NullRegistry);
        };

        info!(
            "Building type catalog ({} classes, {} channels in registry)",
            registry.class_count(),
            registry.channel_count()
        );

        self.classifier.reset();
        let mut pass = BuildPass::new(&self.classifier);
        pass.run(registry);
        if self.options.resolve_forward_references {
            pass.resolve_forward_references();
        }

        let catalog = Arc::new(pass.catalog);
        *self.catalog.write() = Some(Arc::clone(&catalog));

        info!(
            "Type catalog built: {} classes, {} channels, {} global methods, {} global properties",
            catalog.class_count(),
            catalog.channel_count(),
            catalog.global_methods().len(),
            catalog.global_properties().len()
        );
        Ok(catalog)
    }

    /// Drop the published catalog and the classifier cache
    pub fn clear(&self) {
        *self.catalog.write() = None;
        self.classifier.reset();
        debug!("Type catalog cleared");
    }

    /// Current catalog snapshot
    pub fn catalog(&self) -> Option<Arc<TypeCatalog>> {
        self.catalog.read().clone()
    }

    /// Check whether a catalog is published
    pub fn is_built(&self) -> bool {
        self.catalog.read().is_some()
    }

    /// Classifier backing the current catalog
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Annotate a class with its declaring module. Returns false if absent.
    pub fn set_class_module(&self, class_name: &str, module: &str) -> bool {
        self.annotate(|catalog| catalog.set_class_module(class_name, module))
    }

    /// Annotate a channel with its declaring module. Returns false if absent.
    pub fn set_channel_module(&self, channel_name: &str, module: &str) -> bool {
        self.annotate(|catalog| catalog.set_channel_module(channel_name, module))
    }

    fn annotate(&self, f: impl FnOnce(&mut TypeCatalog) -> bool) -> bool {
        let mut slot = self.catalog.write();
        match slot.as_mut() {
            Some(catalog) => f(Arc::make_mut(catalog)),
            None => false,
        }
    }
}

// ============================================================================
// Build pass
// ============================================================================

struct BuildPass<'a> {
    classifier: &'a Classifier,
    known: ClassNames,
    catalog: TypeCatalog,
    /// Classes with at least one unresolved base, with their full base list
    pending_bases: Vec<(String, Vec<TypeId>)>,
}

impl<'a> BuildPass<'a> {
    fn new(classifier: &'a Classifier) -> Self {
        BuildPass {
            classifier,
            known: ClassNames::default(),
            catalog: TypeCatalog::new(),
            pending_bases: Vec::new(),
        }
    }

    fn run(&mut self, registry: &NativeRegistry) {
        for (name, class) in registry.classes() {
            if !class.attributes.is_exposed() {
                debug!("Skipping hidden class {}", name);
                continue;
            }
            self.reflect_class(name, class);
        }

        for (name, channel) in registry.channels() {
            if !channel.attributes.is_exposed() {
                debug!("Skipping hidden channel {}", name);
                continue;
            }
            self.reflect_channel(name, channel);
        }

        for (name, method) in registry.methods() {
            if method.attributes.is_exposed() {
                let descriptor = self.reflect_method(name, "", method);
                self.catalog.global_methods.push(descriptor);
            }
        }

        for (name, property) in registry.properties() {
            if property.attributes.is_exposed() {
                if let Some(descriptor) = self.reflect_property(name, "", property) {
                    self.catalog.global_properties.push(descriptor);
                }
            }
        }
    }

    fn reflect_class(&mut self, name: &str, class: &RegistryClass) {
        debug!("Reflecting class {} {}", name, class.type_id);
        self.known.insert(class.type_id, name.to_string());
        // Earlier classes may have seen this id before it was admitted.
        self.classifier.forget(class.type_id);

        let mut base_classes = Vec::with_capacity(class.base_classes.len());
        for base in &class.base_classes {
            match self.known.get(base) {
                Some(base_name) => base_classes.push(base_name.clone()),
                None => warn!("Class {} has unresolved base {}", name, base),
            }
        }
        if base_classes.len() < class.base_classes.len() {
            self.pending_bases.push((name.to_string(), class.base_classes.clone()));
        }

        let methods: Vec<MethodDescriptor> = class
            .methods
            .iter()
            .filter(|(_, m)| m.attributes.is_exposed())
            .map(|(method_name, m)| self.reflect_method(method_name, name, m))
            .collect();

        let owner = ParameterDescriptor::new(
            "",
            name,
            class.type_id,
            MarshalKind::OpaqueHandle(name.to_string()),
        );
        let constructors: Vec<MethodDescriptor> = class
            .constructors
            .iter()
            .flatten()
            .filter(|c| c.attributes.is_exposed())
            .enumerate()
            .map(|(index, c)| {
                let mut ctor = self.reflect_method(&format!("Constructor_{}", index), name, c);
                ctor.is_static = true;
                if ctor.return_value.kind.is_void() {
                    ctor.return_value = owner.clone();
                }
                ctor
            })
            .collect();

        let properties: Vec<PropertyDescriptor> = class
            .properties
            .iter()
            .filter(|(_, p)| p.attributes.is_exposed())
            .filter_map(|(prop_name, p)| self.reflect_property(prop_name, name, p))
            .collect();

        self.catalog.classes.insert(
            name.to_string(),
            ClassDescriptor {
                name: name.to_string(),
                type_id: class.type_id,
                base_classes,
                methods,
                constructors,
                properties,
                lifecycle: class.lifecycle.clone(),
                doc: Documentation::from(&class.attributes),
                source_module: class.attributes.module.clone().unwrap_or_default(),
            },
        );
    }

    fn reflect_method(&self, name: &str, class_name: &str, method: &RegistryMethod) -> MethodDescriptor {
        let receiver = usize::from(method.is_member);
        let parameters: Vec<ParameterDescriptor> = method
            .arguments
            .iter()
            .skip(receiver)
            .enumerate()
            .map(|(index, p)| self.describe(p, index))
            .collect();

        MethodDescriptor {
            name: name.to_string(),
            class_name: class_name.to_string(),
            is_static: !method.is_member || method.arguments.is_empty(),
            is_const: method.is_const,
            parameters,
            return_value: self.describe_result(method.result.as_ref()),
            binding: Binding::new(method.call.clone(), method.is_member),
            doc: Documentation::from(&method.attributes),
        }
    }

    fn reflect_property(
        &self,
        name: &str,
        class_name: &str,
        property: &RegistryProperty,
    ) -> Option<PropertyDescriptor> {
        if property.getter.is_none() && property.setter.is_none() {
            debug!("Skipping property {} with no accessors", name);
            return None;
        }

        let from_getter = property
            .getter
            .as_ref()
            .and_then(|g| g.result.as_ref())
            .map(|r| self.describe(r, 0));
        let from_setter = property.setter.as_ref().and_then(|s| {
            s.arguments
                .get(usize::from(s.is_member))
                .map(|p| self.describe(p, 0))
        });
        // An unclassifiable getter type defers to the setter's argument.
        let mut value = match from_getter {
            Some(d) if d.kind != MarshalKind::Unknown => d,
            getter => from_setter.or(getter).unwrap_or_else(ParameterDescriptor::void),
        };
        value.name = name.to_string();

        Some(PropertyDescriptor {
            name: name.to_string(),
            class_name: class_name.to_string(),
            value,
            getter: property
                .getter
                .as_ref()
                .map(|g| Binding::new(g.call.clone(), g.is_member)),
            setter: property
                .setter
                .as_ref()
                .map(|s| Binding::new(s.call.clone(), s.is_member)),
            doc: Documentation::from(&property.attributes),
        })
    }

    fn reflect_channel(&mut self, name: &str, channel: &RegistryChannel) {
        debug!("Reflecting channel {} {}", name, channel.type_id);

        let address = channel.address.as_ref().map(|a| {
            let mut d = self.describe(a, 0);
            if a.name.as_deref().map_or(true, str::is_empty) {
                d.name = "address".to_string();
            }
            d
        });

        let events: Vec<EventDescriptor> = channel
            .events
            .iter()
            .filter(|(_, e)| e.attributes.is_exposed())
            .map(|(event_name, e)| {
                // The addressed sender's argument 0 is the address.
                let (sender, skip) = match (&e.event, &e.broadcast) {
                    (Some(addressed), _) => (Some(addressed), 1),
                    (None, Some(broadcast)) => (Some(broadcast), 0),
                    (None, None) => (None, 0),
                };
                let parameters: Vec<ParameterDescriptor> = sender
                    .map(|s| {
                        s.arguments
                            .iter()
                            .skip(skip)
                            .enumerate()
                            .map(|(index, p)| self.describe(p, index))
                            .collect()
                    })
                    .unwrap_or_default();
                let return_value = self.describe_result(sender.and_then(|s| s.result.as_ref()));

                EventDescriptor {
                    name: event_name.clone(),
                    channel_name: name.to_string(),
                    is_broadcast: e.broadcast.is_some(),
                    parameters,
                    return_value,
                    broadcast: e.broadcast.as_ref().map(|b| Binding::new(b.call.clone(), false)),
                    addressed: e.event.as_ref().map(|a| Binding::new(a.call.clone(), false)),
                    doc: Documentation::from(&e.attributes),
                }
            })
            .collect();

        self.catalog.channels.insert(
            name.to_string(),
            ChannelDescriptor {
                name: name.to_string(),
                type_id: channel.type_id,
                address,
                events,
                doc: Documentation::from(&channel.attributes),
                source_module: channel.attributes.module.clone().unwrap_or_default(),
            },
        );
    }

    fn describe(&self, param: &RegistryParameter, index: usize) -> ParameterDescriptor {
        let name = match param.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("arg{}", index),
        };
        ParameterDescriptor::new(
            name,
            type_name(param.type_id, &self.known),
            param.type_id,
            self.classifier.classify(param.type_id, &self.known),
        )
        .with_traits(param.traits)
    }

    fn describe_result(&self, result: Option<&RegistryParameter>) -> ParameterDescriptor {
        match result {
            Some(r) => {
                let mut d = self.describe(r, 0);
                d.name = String::new();
                d
            }
            None => ParameterDescriptor::void(),
        }
    }

    // ========================================================================
    // Second pass
    // ========================================================================

    fn resolve_forward_references(&mut self) {
        for (class_name, bases) in std::mem::take(&mut self.pending_bases) {
            let resolved: Vec<String> = bases
                .iter()
                .filter_map(|id| self.known.get(id).cloned())
                .collect();
            if resolved.len() < bases.len() {
                warn!("Class {} still has unresolved bases after second pass", class_name);
            }
            if let Some(class) = self.catalog.classes.get_mut(&class_name) {
                class.base_classes = resolved;
            }
        }

        self.classifier.forget_unknown();
        let classifier = self.classifier;
        let known = &self.known;
        let refresh = |p: &mut ParameterDescriptor| {
            if p.kind == MarshalKind::Unknown {
                p.kind = classifier.classify(p.type_id, known);
                p.type_name = type_name(p.type_id, known);
            }
        };
        let refresh_method = |m: &mut MethodDescriptor| {
            m.parameters.iter_mut().for_each(refresh);
            refresh(&mut m.return_value);
        };

        for class in self.catalog.classes.values_mut() {
            class.methods.iter_mut().for_each(refresh_method);
            class.constructors.iter_mut().for_each(refresh_method);
            class.properties.iter_mut().for_each(|p| refresh(&mut p.value));
        }
        for channel in self.catalog.channels.values_mut() {
            if let Some(address) = channel.address.as_mut() {
                refresh(address);
            }
            for event in &mut channel.events {
                event.parameters.iter_mut().for_each(refresh);
                refresh(&mut event.return_value);
            }
        }
        self.catalog.global_methods.iter_mut().for_each(refresh_method);
        self.catalog
            .global_properties
            .iter_mut()
            .for_each(|p| refresh(&mut p.value));

        debug!("Forward references resolved");
    }
}
