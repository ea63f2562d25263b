//! Serialized shape of an exported catalog

use serde::Serialize;

use super::{ExportConfig, ExportSummary};
use crate::catalog::{
    ChannelDescriptor, ClassDescriptor, EventDescriptor, MethodDescriptor, ParameterDescriptor,
    PropertyDescriptor, TypeCatalog,
};

#[derive(Serialize)]
pub(super) struct Document<'a> {
    classes: Vec<ClassEntry<'a>>,
    channels: Vec<ChannelEntry<'a>>,
    global_methods: Vec<MethodEntry<'a>>,
    global_properties: Vec<PropertyEntry<'a>>,
}

#[derive(Serialize)]
struct ClassEntry<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    type_id: Option<String>,
    description: &'a str,
    category: &'a str,
    is_deprecated: bool,
    source_module: &'a str,
    base_classes: &'a [String],
    constructors: Vec<MethodEntry<'a>>,
    methods: Vec<MethodEntry<'a>>,
    properties: Vec<PropertyEntry<'a>>,
}

#[derive(Serialize)]
struct MethodEntry<'a> {
    name: &'a str,
    class_name: &'a str,
    is_static: bool,
    is_const: bool,
    description: &'a str,
    category: &'a str,
    is_deprecated: bool,
    deprecation_message: &'a str,
    return_type: ParameterEntry<'a>,
    parameters: Vec<ParameterEntry<'a>>,
}

#[derive(Serialize)]
struct PropertyEntry<'a> {
    name: &'a str,
    class_name: &'a str,
    has_getter: bool,
    has_setter: bool,
    description: &'a str,
    is_deprecated: bool,
    value_type: ParameterEntry<'a>,
}

#[derive(Serialize)]
struct ChannelEntry<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    type_id: Option<String>,
    description: &'a str,
    category: &'a str,
    source_module: &'a str,
    address_type: Option<ParameterEntry<'a>>,
    events: Vec<EventEntry<'a>>,
}

#[derive(Serialize)]
struct EventEntry<'a> {
    name: &'a str,
    channel_name: &'a str,
    is_broadcast: bool,
    return_type: ParameterEntry<'a>,
    parameters: Vec<ParameterEntry<'a>>,
}

#[derive(Serialize)]
struct ParameterEntry<'a> {
    name: &'a str,
    type_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    type_id: Option<String>,
    is_pointer: bool,
    is_reference: bool,
    is_const: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    marshal_type: Option<&'static str>,
}

impl<'a> Document<'a> {
    pub(super) fn build(catalog: &'a TypeCatalog, config: &ExportConfig) -> Self {
        let builder = EntryBuilder { config };
        Document {
            classes: catalog
                .classes()
                .into_iter()
                .filter(|c| config.admits_class(&c.name, &c.doc.category, c.doc.deprecated))
                .map(|c| builder.class(c))
                .collect(),
            channels: catalog
                .channels()
                .into_iter()
                .filter(|c| config.admits_category(&c.doc.category))
                .map(|c| builder.channel(c))
                .collect(),
            global_methods: catalog
                .global_methods()
                .iter()
                .filter(|m| config.include_deprecated || !m.doc.deprecated)
                .map(|m| builder.method(m))
                .collect(),
            global_properties: catalog
                .global_properties()
                .iter()
                .filter(|p| config.include_deprecated || !p.doc.deprecated)
                .map(|p| builder.property(p))
                .collect(),
        }
    }

    pub(super) fn summary(&self) -> ExportSummary {
        ExportSummary {
            classes: self.classes.len(),
            methods: self
                .classes
                .iter()
                .map(|c| c.methods.len() + c.constructors.len())
                .sum(),
            properties: self.classes.iter().map(|c| c.properties.len()).sum(),
            channels: self.channels.len(),
            events: self.channels.iter().map(|c| c.events.len()).sum(),
            global_methods: self.global_methods.len(),
            global_properties: self.global_properties.len(),
        }
    }
}

struct EntryBuilder<'c> {
    config: &'c ExportConfig,
}

impl EntryBuilder<'_> {
    fn type_id(&self, id: dynbind_sdk::TypeId) -> Option<String> {
        self.config.include_type_ids.then(|| id.to_string())
    }

    fn class<'a>(&self, class: &'a ClassDescriptor) -> ClassEntry<'a> {
        ClassEntry {
            name: &class.name,
            type_id: self.type_id(class.type_id),
            description: &class.doc.description,
            category: &class.doc.category,
            is_deprecated: class.doc.deprecated,
            source_module: &class.source_module,
            base_classes: &class.base_classes,
            constructors: class.constructors.iter().map(|m| self.method(m)).collect(),
            methods: class
                .methods
                .iter()
                .filter(|m| self.config.include_deprecated || !m.doc.deprecated)
                .map(|m| self.method(m))
                .collect(),
            properties: class
                .properties
                .iter()
                .filter(|p| self.config.include_deprecated || !p.doc.deprecated)
                .map(|p| self.property(p))
                .collect(),
        }
    }

    fn method<'a>(&self, method: &'a MethodDescriptor) -> MethodEntry<'a> {
        MethodEntry {
            name: &method.name,
            class_name: &method.class_name,
            is_static: method.is_static,
            is_const: method.is_const,
            description: &method.doc.description,
            category: &method.doc.category,
            is_deprecated: method.doc.deprecated,
            deprecation_message: &method.doc.deprecation_message,
            return_type: self.parameter(&method.return_value),
            parameters: method.parameters.iter().map(|p| self.parameter(p)).collect(),
        }
    }

    fn property<'a>(&self, property: &'a PropertyDescriptor) -> PropertyEntry<'a> {
        PropertyEntry {
            name: &property.name,
            class_name: &property.class_name,
            has_getter: property.has_getter(),
            has_setter: property.has_setter(),
            description: &property.doc.description,
            is_deprecated: property.doc.deprecated,
            value_type: self.parameter(&property.value),
        }
    }

    fn channel<'a>(&self, channel: &'a ChannelDescriptor) -> ChannelEntry<'a> {
        ChannelEntry {
            name: &channel.name,
            type_id: self.type_id(channel.type_id),
            description: &channel.doc.description,
            category: &channel.doc.category,
            source_module: &channel.source_module,
            address_type: channel.address.as_ref().map(|a| self.parameter(a)),
            events: channel.events.iter().map(|e| self.event(e)).collect(),
        }
    }

    fn event<'a>(&self, event: &'a EventDescriptor) -> EventEntry<'a> {
        EventEntry {
            name: &event.name,
            channel_name: &event.channel_name,
            is_broadcast: event.is_broadcast,
            return_type: self.parameter(&event.return_value),
            parameters: event.parameters.iter().map(|p| self.parameter(p)).collect(),
        }
    }

    fn parameter<'a>(&self, param: &'a ParameterDescriptor) -> ParameterEntry<'a> {
        ParameterEntry {
            name: &param.name,
            type_name: &param.type_name,
            type_id: self.type_id(param.type_id),
            is_pointer: param.is_pointer(),
            is_reference: param.is_reference(),
            is_const: param.is_const(),
            marshal_type: self
                .config
                .include_marshal_types
                .then(|| param.kind.export_name()),
        }
    }
}
