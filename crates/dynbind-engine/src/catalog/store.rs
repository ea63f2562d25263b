//! The built type catalog and its queries

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use super::{ChannelDescriptor, ClassDescriptor, MethodDescriptor, PropertyDescriptor};

/// Module name used for classes and channels with no declared module
pub const UNKNOWN_MODULE: &str = "Unknown";

/// Immutable result of a catalog build.
///
/// Classes and channels are unique by name. Free functions and properties are
/// kept in registration order.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    pub(crate) classes: FxHashMap<String, ClassDescriptor>,
    pub(crate) channels: FxHashMap<String, ChannelDescriptor>,
    pub(crate) global_methods: Vec<MethodDescriptor>,
    pub(crate) global_properties: Vec<PropertyDescriptor>,
}

/// `category` matches `filter` exactly or as a `filter/` sub-category
pub fn category_matches(category: &str, filter: &str) -> bool {
    category == filter
        || (category.len() > filter.len()
            && category.starts_with(filter)
            && category.as_bytes()[filter.len()] == b'/')
}

impl TypeCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Classes
    // ========================================================================

    /// Class names, sorted
    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.classes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Look up a class
    pub fn get_class(&self, name: &str) -> Option<&ClassDescriptor> {
        self.classes.get(name)
    }

    /// Check for a class
    pub fn has_class(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Check for a method on a class
    pub fn has_method(&self, class_name: &str, method_name: &str) -> bool {
        self.classes
            .get(class_name)
            .map(|c| c.has_method(method_name))
            .unwrap_or(false)
    }

    /// All classes, sorted by name
    pub fn classes(&self) -> Vec<&ClassDescriptor> {
        let mut classes: Vec<&ClassDescriptor> = self.classes.values().collect();
        classes.sort_unstable_by(|a, b| a.name.cmp(&b.name));
        classes
    }

    /// Number of classes
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Classes in `category` (or a sub-category); an empty filter matches all
    pub fn classes_by_category(&self, category: &str, include_deprecated: bool) -> Vec<&ClassDescriptor> {
        self.classes()
            .into_iter()
            .filter(|c| include_deprecated || !c.doc.deprecated)
            .filter(|c| category.is_empty() || category_matches(&c.doc.category, category))
            .collect()
    }

    /// Classes listing `base_name` as a direct base
    pub fn derived_classes(&self, base_name: &str) -> Vec<&ClassDescriptor> {
        self.classes()
            .into_iter()
            .filter(|c| c.base_classes.iter().any(|b| b == base_name))
            .collect()
    }

    // ========================================================================
    // Channels
    // ========================================================================

    /// Channel names, sorted
    pub fn channel_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.channels.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Look up a channel
    pub fn get_channel(&self, name: &str) -> Option<&ChannelDescriptor> {
        self.channels.get(name)
    }

    /// Check for a channel
    pub fn has_channel(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }

    /// All channels, sorted by name
    pub fn channels(&self) -> Vec<&ChannelDescriptor> {
        let mut channels: Vec<&ChannelDescriptor> = self.channels.values().collect();
        channels.sort_unstable_by(|a, b| a.name.cmp(&b.name));
        channels
    }

    /// Number of channels
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    // ========================================================================
    // Globals
    // ========================================================================

    /// Free functions in registration order
    pub fn global_methods(&self) -> &[MethodDescriptor] {
        &self.global_methods
    }

    /// Free properties in registration order
    pub fn global_properties(&self) -> &[PropertyDescriptor] {
        &self.global_properties
    }

    /// Overloads of a free function
    pub fn find_global_methods<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MethodDescriptor> {
        self.global_methods.iter().filter(move |m| m.name == name)
    }

    /// Look up a free property
    pub fn find_global_property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.global_properties.iter().find(|p| p.name == name)
    }

    // ========================================================================
    // Provenance
    // ========================================================================

    /// Classes declared by `module`
    pub fn classes_by_module(&self, module: &str, include_deprecated: bool) -> Vec<&ClassDescriptor> {
        self.classes()
            .into_iter()
            .filter(|c| c.source_module == module)
            .filter(|c| include_deprecated || !c.doc.deprecated)
            .collect()
    }

    /// Channels declared by `module`
    pub fn channels_by_module(&self, module: &str) -> Vec<&ChannelDescriptor> {
        self.channels()
            .into_iter()
            .filter(|c| c.source_module == module)
            .collect()
    }

    /// Distinct non-empty module names, sorted
    pub fn module_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .classes
            .values()
            .map(|c| c.source_module.as_str())
            .chain(self.channels.values().map(|c| c.source_module.as_str()))
            .filter(|m| !m.is_empty())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Class names grouped by module; classes with no module go under `"Unknown"`
    pub fn classes_grouped_by_module(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut groups: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for class in self.classes() {
            let module = if class.source_module.is_empty() {
                UNKNOWN_MODULE
            } else {
                class.source_module.as_str()
            };
            groups.entry(module).or_default().push(&class.name);
        }
        groups
    }

    /// Annotate a class with its declaring module. Returns false if absent.
    pub fn set_class_module(&mut self, class_name: &str, module: &str) -> bool {
        match self.classes.get_mut(class_name) {
            Some(class) => {
                class.source_module = module.to_string();
                true
            }
            None => false,
        }
    }

    /// Annotate a channel with its declaring module. Returns false if absent.
    pub fn set_channel_module(&mut self, channel_name: &str, module: &str) -> bool {
        match self.channels.get_mut(channel_name) {
            Some(channel) => {
                channel.source_module = module.to_string();
                true
            }
            None => false,
        }
    }
}
