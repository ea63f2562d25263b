//! Catalog descriptors
//!
//! Immutable metadata records produced by a catalog build. Descriptors are
//! owned by the [`TypeCatalog`](super::TypeCatalog) and handed out by
//! reference.

use std::fmt;

use dynbind_sdk::{builtin, Attributes, ClassLifecycle, NativeCallFn, ParamTraits, TypeId};

use crate::marshal::MarshalKind;

// ============================================================================
// Shared pieces
// ============================================================================

/// Documentation metadata carried over from registry attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Documentation {
    /// Description text
    pub description: String,
    /// Category path
    pub category: String,
    /// Deprecated flag
    pub deprecated: bool,
    /// Deprecation message
    pub deprecation_message: String,
}

impl From<&Attributes> for Documentation {
    fn from(attributes: &Attributes) -> Self {
        Documentation {
            description: attributes.description.clone().unwrap_or_default(),
            category: attributes.category.clone().unwrap_or_default(),
            deprecated: attributes.deprecated,
            deprecation_message: attributes.deprecation_message.clone().unwrap_or_default(),
        }
    }
}

/// Reference to a native callable.
///
/// A binding can be present in the catalog without a callable; the
/// dispatcher rejects such calls instead of the builder dropping them.
#[derive(Clone, Default)]
pub struct Binding {
    call: Option<NativeCallFn>,
    is_member: bool,
}

impl Binding {
    /// Create from an optional callable
    pub fn new(call: Option<NativeCallFn>, is_member: bool) -> Self {
        Binding { call, is_member }
    }

    /// The callable, if bound
    pub fn call(&self) -> Option<&NativeCallFn> {
        self.call.as_ref()
    }

    /// Check whether a callable is bound
    pub fn is_bound(&self) -> bool {
        self.call.is_some()
    }

    /// Whether the callable takes an implicit receiver
    pub fn is_member(&self) -> bool {
        self.is_member
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("bound", &self.call.is_some())
            .field("is_member", &self.is_member)
            .finish()
    }
}

// ============================================================================
// Parameters
// ============================================================================

/// One argument or result slot
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    /// Parameter name (empty for results)
    pub name: String,
    /// Declared type name
    pub type_name: String,
    /// Declared type id
    pub type_id: TypeId,
    /// Marshal classification
    pub kind: MarshalKind,
    /// Qualifiers
    pub traits: ParamTraits,
}

impl ParameterDescriptor {
    /// Create a descriptor with no qualifiers
    pub fn new(
        name: impl Into<String>,
        type_name: impl Into<String>,
        type_id: TypeId,
        kind: MarshalKind,
    ) -> Self {
        ParameterDescriptor {
            name: name.into(),
            type_name: type_name.into(),
            type_id,
            kind,
            traits: ParamTraits::NONE,
        }
    }

    /// The void result slot
    pub fn void() -> Self {
        Self::new("", "void", builtin::VOID, MarshalKind::Void)
    }

    /// Add qualifiers
    pub fn with_traits(mut self, traits: ParamTraits) -> Self {
        self.traits |= traits;
        self
    }

    /// Pointer qualifier
    pub fn is_pointer(&self) -> bool {
        self.traits.is_pointer()
    }

    /// Reference qualifier
    pub fn is_reference(&self) -> bool {
        self.traits.is_reference()
    }

    /// Const qualifier
    pub fn is_const(&self) -> bool {
        self.traits.is_const()
    }
}

// ============================================================================
// Members
// ============================================================================

/// A method, free function or constructor.
///
/// `parameters` excludes the implicit receiver of instance methods.
#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    /// Method name (`Constructor_N` for constructors)
    pub name: String,
    /// Owning class, empty for free functions
    pub class_name: String,
    /// Static flag
    pub is_static: bool,
    /// Const flag
    pub is_const: bool,
    /// Parameters in declaration order
    pub parameters: Vec<ParameterDescriptor>,
    /// Result slot
    pub return_value: ParameterDescriptor,
    /// Native binding
    pub binding: Binding,
    /// Documentation
    pub doc: Documentation,
}

impl MethodDescriptor {
    /// Number of explicit parameters
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// `Class.Method`, or just the name for free functions
    pub fn qualified_name(&self) -> String {
        if self.class_name.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.class_name, self.name)
        }
    }
}

/// A property accessed through getter/setter bindings
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    /// Property name
    pub name: String,
    /// Owning class, empty for global properties
    pub class_name: String,
    /// Value slot
    pub value: ParameterDescriptor,
    /// Getter binding, when the property has a getter
    pub getter: Option<Binding>,
    /// Setter binding, when the property has a setter
    pub setter: Option<Binding>,
    /// Documentation
    pub doc: Documentation,
}

impl PropertyDescriptor {
    /// Getter present
    pub fn has_getter(&self) -> bool {
        self.getter.is_some()
    }

    /// Setter present
    pub fn has_setter(&self) -> bool {
        self.setter.is_some()
    }

    /// `Class.Property`, or just the name for globals
    pub fn qualified_name(&self) -> String {
        if self.class_name.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.class_name, self.name)
        }
    }
}

/// A channel event.
///
/// `parameters` excludes the address of addressed senders.
#[derive(Debug, Clone)]
pub struct EventDescriptor {
    /// Event name
    pub name: String,
    /// Owning channel
    pub channel_name: String,
    /// Has a broadcast sender
    pub is_broadcast: bool,
    /// Parameters in declaration order
    pub parameters: Vec<ParameterDescriptor>,
    /// Result slot
    pub return_value: ParameterDescriptor,
    /// Broadcast sender
    pub broadcast: Option<Binding>,
    /// Addressed sender
    pub addressed: Option<Binding>,
    /// Documentation
    pub doc: Documentation,
}

impl EventDescriptor {
    /// `Channel.Event`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.channel_name, self.name)
    }
}

// ============================================================================
// Types
// ============================================================================

/// A reflected class
#[derive(Debug, Clone)]
pub struct ClassDescriptor {
    /// Class name
    pub name: String,
    /// Stable type id
    pub type_id: TypeId,
    /// Resolved base class names
    pub base_classes: Vec<String>,
    /// Methods, overloads included
    pub methods: Vec<MethodDescriptor>,
    /// Constructors (`Constructor_0`, `Constructor_1`, ...)
    pub constructors: Vec<MethodDescriptor>,
    /// Properties
    pub properties: Vec<PropertyDescriptor>,
    /// Allocation and construction hooks
    pub lifecycle: ClassLifecycle,
    /// Documentation
    pub doc: Documentation,
    /// Declaring module, empty when unknown
    pub source_module: String,
}

impl ClassDescriptor {
    /// Overloads of `name` in declaration order
    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MethodDescriptor> {
        self.methods.iter().filter(move |m| m.name == name)
    }

    /// Check for a method name
    pub fn has_method(&self, name: &str) -> bool {
        self.methods.iter().any(|m| m.name == name)
    }

    /// Look up a property
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Method names, first occurrence order, overloads collapsed
    pub fn method_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::with_capacity(self.methods.len());
        for m in &self.methods {
            if !names.contains(&m.name.as_str()) {
                names.push(&m.name);
            }
        }
        names
    }

    /// Property names in declaration order
    pub fn property_names(&self) -> Vec<&str> {
        self.properties.iter().map(|p| p.name.as_str()).collect()
    }
}

/// A reflected publish/subscribe channel
#[derive(Debug, Clone)]
pub struct ChannelDescriptor {
    /// Channel name
    pub name: String,
    /// Stable type id
    pub type_id: TypeId,
    /// Address slot for addressed channels
    pub address: Option<ParameterDescriptor>,
    /// Events in declaration order
    pub events: Vec<EventDescriptor>,
    /// Documentation
    pub doc: Documentation,
    /// Declaring module, empty when unknown
    pub source_module: String,
}

impl ChannelDescriptor {
    /// Look up an event
    pub fn event(&self, name: &str) -> Option<&EventDescriptor> {
        self.events.iter().find(|e| e.name == name)
    }

    /// Event names in declaration order
    pub fn event_names(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.name.as_str()).collect()
    }
}
