//! Native reflection registry
//!
//! The tables a native object model fills in to describe itself: classes,
//! publish/subscribe channels, free functions and free properties. The
//! catalog builder walks these tables once per build and never mutates them.
//!
//! Iteration order is registration order. Classes, channels and global
//! properties are unique by name (re-registering replaces in place); methods
//! may repeat a name to form an overload set.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::{Handle, NativeCallFn, ParamTraits, TypeId};

// ============================================================================
// Attributes
// ============================================================================

bit_flags! {
    /// Surfaces an entry is explicitly hidden from. Any set flag excludes it.
    pub struct ExcludeFlags: u8 {
        /// Hidden from listings
        const LIST = 0b0001;
        /// Hidden from generated documentation
        const DOCUMENTATION = 0b0010;
        /// Preview-only API
        const PREVIEW = 0b0100;
        /// Hidden from editor UI
        const UI = 0b1000;
    }
}

bit_flags! {
    /// Audiences an entry is scoped to
    pub struct ScopeFlags: u8 {
        /// Everyone
        const COMMON = 0b001;
        /// Launcher only
        const LAUNCHER = 0b010;
        /// Automation and tooling
        const AUTOMATION = 0b100;
    }
}

/// Attribute set attached to every registry entry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    /// Explicit exclusion flags
    pub exclude: ExcludeFlags,
    /// Scope, when the entry declares one
    pub scope: Option<ScopeFlags>,
    /// Human-readable description
    pub description: Option<String>,
    /// Category path (`"Math/Vector"`)
    pub category: Option<String>,
    /// Deprecated flag
    pub deprecated: bool,
    /// Message explaining the deprecation
    pub deprecation_message: Option<String>,
    /// Declaring module
    pub module: Option<String>,
}

impl Attributes {
    /// Empty attribute set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set exclusion flags
    pub fn exclude(mut self, flags: ExcludeFlags) -> Self {
        self.exclude |= flags;
        self
    }

    /// Set scope flags
    pub fn scope(mut self, flags: ScopeFlags) -> Self {
        self.scope = Some(flags);
        self
    }

    /// Set description
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Set category
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Mark deprecated with an optional message
    pub fn deprecated(mut self, message: Option<&str>) -> Self {
        self.deprecated = true;
        self.deprecation_message = message.map(str::to_string);
        self
    }

    /// Set declaring module
    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Whether the entry may be exposed outside the native side.
    ///
    /// Hidden when any exclusion flag is set, or when a scope is declared
    /// that includes neither `COMMON` nor `AUTOMATION`.
    pub fn is_exposed(&self) -> bool {
        if !self.exclude.is_empty() {
            return false;
        }
        match self.scope {
            Some(scope) => scope.intersects(ScopeFlags::COMMON | ScopeFlags::AUTOMATION),
            None => true,
        }
    }
}

// ============================================================================
// Methods and Properties
// ============================================================================

/// One argument or result slot of a native callable
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryParameter {
    /// Declared name, if the native side recorded one
    pub name: Option<String>,
    /// Declared type
    pub type_id: TypeId,
    /// Qualifiers
    pub traits: ParamTraits,
}

impl RegistryParameter {
    /// Unnamed parameter
    pub fn new(type_id: TypeId) -> Self {
        RegistryParameter {
            name: None,
            type_id,
            traits: ParamTraits::NONE,
        }
    }

    /// Named parameter
    pub fn named(name: impl Into<String>, type_id: TypeId) -> Self {
        RegistryParameter {
            name: Some(name.into()),
            type_id,
            traits: ParamTraits::NONE,
        }
    }

    /// Add qualifiers
    pub fn with_traits(mut self, traits: ParamTraits) -> Self {
        self.traits |= traits;
        self
    }
}

/// A native method, free function, constructor or event sender.
///
/// For member methods `arguments[0]` is the implicit receiver.
#[derive(Clone, Default)]
pub struct RegistryMethod {
    /// Declared arguments, receiver included
    pub arguments: Vec<RegistryParameter>,
    /// Result slot; `None` means void
    pub result: Option<RegistryParameter>,
    /// Takes an implicit receiver
    pub is_member: bool,
    /// Const-qualified member
    pub is_const: bool,
    /// Attributes
    pub attributes: Attributes,
    /// Bound callable; `None` when the native side exposes no binding
    pub call: Option<NativeCallFn>,
}

impl RegistryMethod {
    /// Static method with no arguments and a void result
    pub fn new() -> Self {
        Self::default()
    }

    /// Member method whose receiver has type `owner`
    pub fn member(owner: TypeId) -> Self {
        RegistryMethod {
            arguments: vec![RegistryParameter::named("this", owner).with_traits(ParamTraits::POINTER)],
            is_member: true,
            ..Self::default()
        }
    }

    /// Mark const
    pub fn constant(mut self) -> Self {
        self.is_const = true;
        self
    }

    /// Append an unnamed argument
    pub fn arg(self, type_id: TypeId) -> Self {
        self.param(RegistryParameter::new(type_id))
    }

    /// Append a named argument
    pub fn named_arg(self, name: impl Into<String>, type_id: TypeId) -> Self {
        self.param(RegistryParameter::named(name, type_id))
    }

    /// Append a fully specified argument
    pub fn param(mut self, param: RegistryParameter) -> Self {
        self.arguments.push(param);
        self
    }

    /// Set the result type
    pub fn returns(self, type_id: TypeId) -> Self {
        self.returns_param(RegistryParameter::new(type_id))
    }

    /// Set a fully specified result slot
    pub fn returns_param(mut self, param: RegistryParameter) -> Self {
        self.result = Some(param);
        self
    }

    /// Set attributes
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Bind the native callable
    pub fn bind(mut self, call: NativeCallFn) -> Self {
        self.call = Some(call);
        self
    }

    /// Declared arity, receiver included
    pub fn arity(&self) -> usize {
        self.arguments.len()
    }
}

impl fmt::Debug for RegistryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryMethod")
            .field("arguments", &self.arguments)
            .field("result", &self.result)
            .field("is_member", &self.is_member)
            .field("is_const", &self.is_const)
            .field("attributes", &self.attributes)
            .field("bound", &self.call.is_some())
            .finish()
    }
}

/// A property backed by getter/setter methods
#[derive(Debug, Clone, Default)]
pub struct RegistryProperty {
    /// Getter
    pub getter: Option<RegistryMethod>,
    /// Setter
    pub setter: Option<RegistryMethod>,
    /// Attributes
    pub attributes: Attributes,
}

impl RegistryProperty {
    /// Property with neither accessor
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the getter
    pub fn getter(mut self, method: RegistryMethod) -> Self {
        self.getter = Some(method);
        self
    }

    /// Set the setter
    pub fn setter(mut self, method: RegistryMethod) -> Self {
        self.setter = Some(method);
        self
    }

    /// Set attributes
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }
}

// ============================================================================
// Classes
// ============================================================================

/// Allocate raw, uninitialized storage for one object
pub type AllocateFn = Arc<dyn Fn() -> Handle + Send + Sync>;
/// Construct an object in place in allocated storage
pub type ConstructFn = Arc<dyn Fn(Handle) -> bool + Send + Sync>;
/// Destroy an object in place, or release its storage
pub type ReleaseFn = Arc<dyn Fn(Handle) + Send + Sync>;

/// Allocation and construction hooks of a class
#[derive(Clone, Default)]
pub struct ClassLifecycle {
    /// Storage allocator
    pub allocate: Option<AllocateFn>,
    /// In-place default constructor
    pub default_constructor: Option<ConstructFn>,
    /// In-place destructor
    pub destructor: Option<ReleaseFn>,
    /// Storage deallocator
    pub deallocate: Option<ReleaseFn>,
}

impl ClassLifecycle {
    /// Hooks that box a `T::default()` and drop it again
    pub fn boxed<T: Default + 'static>() -> Self {
        use std::mem::MaybeUninit;

        ClassLifecycle {
            allocate: Some(Arc::new(|| Handle::from_box(Box::new(MaybeUninit::<T>::uninit())))),
            default_constructor: Some(Arc::new(|handle: Handle| {
                if handle.is_null() {
                    return false;
                }
                unsafe { (handle.as_ptr() as *mut T).write(T::default()) };
                true
            })),
            destructor: Some(Arc::new(|handle: Handle| {
                if !handle.is_null() {
                    unsafe { std::ptr::drop_in_place(handle.as_ptr() as *mut T) };
                }
            })),
            deallocate: Some(Arc::new(|handle: Handle| unsafe {
                drop(handle.into_box::<MaybeUninit<T>>());
            })),
        }
    }
}

impl fmt::Debug for ClassLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassLifecycle")
            .field("allocate", &self.allocate.is_some())
            .field("default_constructor", &self.default_constructor.is_some())
            .field("destructor", &self.destructor.is_some())
            .field("deallocate", &self.deallocate.is_some())
            .finish()
    }
}

/// A reflected native class
#[derive(Debug, Clone, Default)]
pub struct RegistryClass {
    /// Stable type id
    pub type_id: TypeId,
    /// Base class ids, nearest first
    pub base_classes: Vec<TypeId>,
    /// Methods in declaration order; names may repeat
    pub methods: Vec<(String, RegistryMethod)>,
    /// Properties in declaration order
    pub properties: Vec<(String, RegistryProperty)>,
    /// Constructors; `None` entries are unbound and skipped
    pub constructors: Vec<Option<RegistryMethod>>,
    /// Lifecycle hooks
    pub lifecycle: ClassLifecycle,
    /// Attributes
    pub attributes: Attributes,
}

impl RegistryClass {
    /// Empty class
    pub fn new(type_id: TypeId) -> Self {
        RegistryClass {
            type_id,
            ..Self::default()
        }
    }

    /// Add a base class
    pub fn base(mut self, type_id: TypeId) -> Self {
        self.base_classes.push(type_id);
        self
    }

    /// Add a method (or another overload of an existing name)
    pub fn method(mut self, name: impl Into<String>, method: RegistryMethod) -> Self {
        self.methods.push((name.into(), method));
        self
    }

    /// Add a property
    pub fn property(mut self, name: impl Into<String>, property: RegistryProperty) -> Self {
        self.properties.push((name.into(), property));
        self
    }

    /// Add a constructor
    pub fn constructor(mut self, constructor: Option<RegistryMethod>) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// Set lifecycle hooks
    pub fn lifecycle(mut self, lifecycle: ClassLifecycle) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    /// Set attributes
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }
}

// ============================================================================
// Channels
// ============================================================================

/// One event of a channel.
///
/// The addressed sender takes the address as `arguments[0]`.
#[derive(Debug, Clone, Default)]
pub struct RegistryEvent {
    /// Sender delivering to every handler
    pub broadcast: Option<RegistryMethod>,
    /// Sender delivering to handlers at one address
    pub event: Option<RegistryMethod>,
    /// Attributes
    pub attributes: Attributes,
}

impl RegistryEvent {
    /// Event with no senders
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the broadcast sender
    pub fn broadcast(mut self, sender: RegistryMethod) -> Self {
        self.broadcast = Some(sender);
        self
    }

    /// Set the addressed sender
    pub fn addressed(mut self, sender: RegistryMethod) -> Self {
        self.event = Some(sender);
        self
    }
}

/// A publish/subscribe channel
#[derive(Debug, Clone, Default)]
pub struct RegistryChannel {
    /// Stable type id
    pub type_id: TypeId,
    /// Address parameter for addressed channels
    pub address: Option<RegistryParameter>,
    /// Events in declaration order
    pub events: Vec<(String, RegistryEvent)>,
    /// Attributes
    pub attributes: Attributes,
}

impl RegistryChannel {
    /// Empty channel
    pub fn new(type_id: TypeId) -> Self {
        RegistryChannel {
            type_id,
            ..Self::default()
        }
    }

    /// Set the address parameter
    pub fn address(mut self, address: RegistryParameter) -> Self {
        self.address = Some(address);
        self
    }

    /// Add an event
    pub fn event(mut self, name: impl Into<String>, event: RegistryEvent) -> Self {
        self.events.push((name.into(), event));
        self
    }

    /// Set attributes
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Insertion-ordered table unique by name
#[derive(Debug, Clone)]
pub struct NamedTable<T> {
    entries: Vec<(String, T)>,
    index: HashMap<String, usize>,
}

impl<T> Default for NamedTable<T> {
    fn default() -> Self {
        NamedTable {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> NamedTable<T> {
    /// Insert or replace in place
    pub fn insert(&mut self, name: String, value: T) {
        match self.index.get(&name) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, value));
            }
        }
    }

    /// Look up by name
    pub fn get(&self, name: &str) -> Option<&T> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    /// Entries in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The full reflection registry of a native object model
#[derive(Debug, Clone, Default)]
pub struct NativeRegistry {
    classes: NamedTable<RegistryClass>,
    channels: NamedTable<RegistryChannel>,
    methods: Vec<(String, RegistryMethod)>,
    properties: NamedTable<RegistryProperty>,
}

impl NativeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class
    pub fn register_class(&mut self, name: impl Into<String>, class: RegistryClass) {
        self.classes.insert(name.into(), class);
    }

    /// Register a channel
    pub fn register_channel(&mut self, name: impl Into<String>, channel: RegistryChannel) {
        self.channels.insert(name.into(), channel);
    }

    /// Register a free function (repeat a name for overloads)
    pub fn register_method(&mut self, name: impl Into<String>, method: RegistryMethod) {
        self.methods.push((name.into(), method));
    }

    /// Register a free property
    pub fn register_property(&mut self, name: impl Into<String>, property: RegistryProperty) {
        self.properties.insert(name.into(), property);
    }

    /// Class table
    pub fn classes(&self) -> impl Iterator<Item = (&str, &RegistryClass)> {
        self.classes.iter()
    }

    /// Channel table
    pub fn channels(&self) -> impl Iterator<Item = (&str, &RegistryChannel)> {
        self.channels.iter()
    }

    /// Free function table
    pub fn methods(&self) -> impl Iterator<Item = (&str, &RegistryMethod)> {
        self.methods.iter().map(|(n, m)| (n.as_str(), m))
    }

    /// Free property table
    pub fn properties(&self) -> impl Iterator<Item = (&str, &RegistryProperty)> {
        self.properties.iter()
    }

    /// Look up a class by name
    pub fn class(&self, name: &str) -> Option<&RegistryClass> {
        self.classes.get(name)
    }

    /// Look up a channel by name
    pub fn channel(&self, name: &str) -> Option<&RegistryChannel> {
        self.channels.get(name)
    }

    /// Number of registered classes
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Number of registered channels
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
            && self.channels.is_empty()
            && self.methods.is_empty()
            && self.properties.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin;

    #[test]
    fn test_visibility_predicate() {
        assert!(Attributes::new().is_exposed());
        assert!(!Attributes::new().exclude(ExcludeFlags::LIST).is_exposed());
        assert!(!Attributes::new().exclude(ExcludeFlags::UI).is_exposed());
        assert!(Attributes::new().scope(ScopeFlags::COMMON).is_exposed());
        assert!(Attributes::new().scope(ScopeFlags::AUTOMATION).is_exposed());
        assert!(!Attributes::new().scope(ScopeFlags::LAUNCHER).is_exposed());
        assert!(!Attributes::new().scope(ScopeFlags::NONE).is_exposed());
    }

    #[test]
    fn test_registry_order_and_replace() {
        let mut registry = NativeRegistry::new();
        registry.register_class("B", RegistryClass::new(TypeId::from_name("B")));
        registry.register_class("A", RegistryClass::new(TypeId::from_name("A")));
        registry.register_class("B", RegistryClass::new(TypeId::from_name("B2")));

        let names: Vec<&str> = registry.classes().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(registry.class("B").unwrap().type_id, TypeId::from_name("B2"));
        assert_eq!(registry.class_count(), 2);
    }

    #[test]
    fn test_overloaded_free_functions() {
        let mut registry = NativeRegistry::new();
        registry.register_method("Add", RegistryMethod::new().arg(builtin::S32).arg(builtin::S32));
        registry.register_method("Add", RegistryMethod::new().arg(builtin::F32).arg(builtin::F32));
        assert_eq!(registry.methods().count(), 2);
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_member_method_has_receiver() {
        let owner = TypeId::from_name("Widget");
        let m = RegistryMethod::member(owner).arg(builtin::S32);
        assert!(m.is_member);
        assert_eq!(m.arity(), 2);
        assert_eq!(m.arguments[0].type_id, owner);
        assert!(m.arguments[0].traits.is_pointer());
    }

    #[test]
    fn test_boxed_lifecycle() {
        #[derive(Default)]
        struct Counter {
            value: u32,
        }

        let hooks = ClassLifecycle::boxed::<Counter>();
        let handle = (hooks.allocate.as_ref().unwrap())();
        assert!((hooks.default_constructor.as_ref().unwrap())(handle));
        unsafe {
            handle.as_mut::<Counter>().unwrap().value = 3;
            assert_eq!(handle.as_ref::<Counter>().unwrap().value, 3);
        }
        (hooks.destructor.as_ref().unwrap())(handle);
        (hooks.deallocate.as_ref().unwrap())(handle);
    }
}
