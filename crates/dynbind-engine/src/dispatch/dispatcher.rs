use std::sync::Arc;

use dynbind_sdk::{Handle, NativeArgument, NativeCallFn, TypeId};
use log::{debug, trace};

use super::resolve::{resolve_overload, Resolution};
use super::{CallFlavor, DispatchError, DispatchOptions, DispatchResult};
use crate::catalog::{
    Binding, ClassDescriptor, MethodDescriptor, ParameterDescriptor, PropertyDescriptor,
    Reflector, TypeCatalog,
};
use crate::marshal::{
    allocate_return_slot, marshal_from_native, marshal_to_native, MarshalError, MarshalledValue,
    ScratchArena,
};

/// Resolves and invokes calls against the reflector's published catalog.
///
/// The dispatcher holds no per-call state; every verb takes the current
/// catalog snapshot and its own scratch arena.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    reflector: Arc<Reflector>,
    options: DispatchOptions,
}

impl Dispatcher {
    /// Create over `reflector` with default options
    pub fn new(reflector: Arc<Reflector>) -> Self {
        Self::with_options(reflector, DispatchOptions::default())
    }

    /// Create over `reflector` with explicit options
    pub fn with_options(reflector: Arc<Reflector>, options: DispatchOptions) -> Self {
        Dispatcher { reflector, options }
    }

    /// The reflector whose catalog is dispatched against
    pub fn reflector(&self) -> &Arc<Reflector> {
        &self.reflector
    }

    /// Options in effect
    pub fn options(&self) -> &DispatchOptions {
        &self.options
    }

    /// Check whether a catalog is published
    pub fn is_initialized(&self) -> bool {
        self.reflector.is_built()
    }

    pub(super) fn catalog(&self) -> Result<Arc<TypeCatalog>, DispatchError> {
        self.reflector.catalog().ok_or(DispatchError::Uninitialized)
    }

    // ========================================================================
    // Verbs
    // ========================================================================

    /// Call a static method
    pub fn invoke_static(&self, class_name: &str, method_name: &str, args: &[MarshalledValue]) -> DispatchResult {
        finish("invoke_static", self.try_invoke_static(class_name, method_name, args))
    }

    /// Call an instance method on `instance`
    pub fn invoke_instance(
        &self,
        class_name: &str,
        method_name: &str,
        instance: Handle,
        args: &[MarshalledValue],
    ) -> DispatchResult {
        finish(
            "invoke_instance",
            self.try_invoke_instance(class_name, method_name, instance, args),
        )
    }

    /// Call a free function
    pub fn invoke_global(&self, method_name: &str, args: &[MarshalledValue]) -> DispatchResult {
        finish("invoke_global", self.try_invoke_global(method_name, args))
    }

    /// Read a class property; `instance` may be null for static accessors
    pub fn get_property(&self, class_name: &str, property_name: &str, instance: Handle) -> DispatchResult {
        finish("get_property", self.try_get_property(class_name, property_name, instance))
    }

    /// Write a class property; `instance` may be null for static accessors
    pub fn set_property(
        &self,
        class_name: &str,
        property_name: &str,
        instance: Handle,
        value: &MarshalledValue,
    ) -> DispatchResult {
        finish(
            "set_property",
            self.try_set_property(class_name, property_name, instance, value),
        )
    }

    /// Read a free property
    pub fn get_global_property(&self, property_name: &str) -> DispatchResult {
        finish("get_global_property", self.try_get_global_property(property_name))
    }

    /// Write a free property
    pub fn set_global_property(&self, property_name: &str, value: &MarshalledValue) -> DispatchResult {
        finish(
            "set_global_property",
            self.try_set_global_property(property_name, value),
        )
    }

    /// Create an instance. The caller owns the returned handle.
    pub fn create_instance(&self, class_name: &str, args: &[MarshalledValue]) -> DispatchResult {
        finish("create_instance", self.try_create_instance(class_name, args))
    }

    /// Destroy an instance created by [`Dispatcher::create_instance`]
    pub fn destroy_instance(&self, class_name: &str, instance: Handle) -> DispatchResult {
        finish("destroy_instance", self.try_destroy_instance(class_name, instance))
    }

    // ========================================================================
    // Methods
    // ========================================================================

    fn try_invoke_static(
        &self,
        class_name: &str,
        method_name: &str,
        args: &[MarshalledValue],
    ) -> Result<MarshalledValue, DispatchError> {
        let catalog = self.catalog()?;
        let class = find_class(&catalog, class_name)?;
        let method = self.resolve(
            CallFlavor::Static,
            || format!("{}.{}", class_name, method_name),
            class.methods_named(method_name).filter(|m| m.is_static),
            args,
        )?;
        let call = bound(method)?;
        NativeCall::new(&method.qualified_name(), call)
            .run(&method.parameters, args, Some(&method.return_value), false)
    }

    fn try_invoke_instance(
        &self,
        class_name: &str,
        method_name: &str,
        instance: Handle,
        args: &[MarshalledValue],
    ) -> Result<MarshalledValue, DispatchError> {
        let catalog = self.catalog()?;
        let class = find_class(&catalog, class_name)?;
        let method = self.resolve(
            CallFlavor::Instance,
            || format!("{}.{}", class_name, method_name),
            class.methods_named(method_name).filter(|m| !m.is_static),
            args,
        )?;
        let call = bound(method)?;
        if instance.is_null() {
            return Err(DispatchError::NullInstance);
        }
        NativeCall::new(&method.qualified_name(), call)
            .leading(NativeArgument::from_handle(instance, class.type_id))
            .run(&method.parameters, args, Some(&method.return_value), false)
    }

    fn try_invoke_global(&self, method_name: &str, args: &[MarshalledValue]) -> Result<MarshalledValue, DispatchError> {
        let catalog = self.catalog()?;
        let method = self.resolve(
            CallFlavor::Global,
            || method_name.to_string(),
            catalog.find_global_methods(method_name),
            args,
        )?;
        let call = bound(method)?;
        NativeCall::new(&method.qualified_name(), call)
            .run(&method.parameters, args, Some(&method.return_value), false)
    }

    fn resolve<'c>(
        &self,
        flavor: CallFlavor,
        target: impl FnOnce() -> String,
        candidates: impl IntoIterator<Item = &'c MethodDescriptor>,
        args: &[MarshalledValue],
    ) -> Result<&'c MethodDescriptor, DispatchError> {
        match resolve_overload(candidates, args, self.options.overload_policy) {
            Resolution::Found(method) => Ok(method),
            Resolution::ArityMismatch { available } => Err(DispatchError::ArityMismatch {
                flavor,
                target: target(),
                supplied: args.len(),
                available,
            }),
            Resolution::NotFound => Err(DispatchError::MethodNotFound {
                flavor,
                target: target(),
            }),
        }
    }

    // ========================================================================
    // Properties
    // ========================================================================

    fn try_get_property(
        &self,
        class_name: &str,
        property_name: &str,
        instance: Handle,
    ) -> Result<MarshalledValue, DispatchError> {
        let catalog = self.catalog()?;
        let class = find_class(&catalog, class_name)?;
        let property = find_property(class, property_name)?;
        read_property(property, instance, class.type_id)
    }

    fn try_set_property(
        &self,
        class_name: &str,
        property_name: &str,
        instance: Handle,
        value: &MarshalledValue,
    ) -> Result<MarshalledValue, DispatchError> {
        let catalog = self.catalog()?;
        let class = find_class(&catalog, class_name)?;
        let property = find_property(class, property_name)?;
        write_property(property, instance, class.type_id, value)
    }

    fn try_get_global_property(&self, property_name: &str) -> Result<MarshalledValue, DispatchError> {
        let catalog = self.catalog()?;
        let property = catalog
            .find_global_property(property_name)
            .ok_or_else(|| DispatchError::PropertyNotFound(property_name.to_string()))?;
        read_property(property, Handle::null(), TypeId::NULL)
    }

    fn try_set_global_property(
        &self,
        property_name: &str,
        value: &MarshalledValue,
    ) -> Result<MarshalledValue, DispatchError> {
        let catalog = self.catalog()?;
        let property = catalog
            .find_global_property(property_name)
            .ok_or_else(|| DispatchError::PropertyNotFound(property_name.to_string()))?;
        write_property(property, Handle::null(), TypeId::NULL, value)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    fn try_create_instance(&self, class_name: &str, args: &[MarshalledValue]) -> Result<MarshalledValue, DispatchError> {
        let catalog = self.catalog()?;
        let class = find_class(&catalog, class_name)?;
        let lifecycle = &class.lifecycle;

        if args.is_empty() {
            if let (Some(allocate), Some(construct)) = (&lifecycle.allocate, &lifecycle.default_constructor) {
                let handle = allocate();
                if handle.is_null() {
                    return Err(DispatchError::InvocationFailed(format!("allocate {}", class.name)));
                }
                if !construct(handle) {
                    if let Some(deallocate) = &lifecycle.deallocate {
                        deallocate(handle);
                    }
                    return Err(DispatchError::InvocationFailed(format!(
                        "default constructor of {}",
                        class.name
                    )));
                }
                debug!("Created {} instance {:?}", class.name, handle);
                return Ok(MarshalledValue::opaque(handle, class.name.clone()));
            }
        }

        let ctor = match resolve_overload(&class.constructors, args, self.options.overload_policy) {
            Resolution::Found(ctor) => ctor,
            _ if args.is_empty() => {
                return Err(DispatchError::NoBinding(format!("Default constructor of {}", class.name)))
            }
            _ => {
                return Err(DispatchError::NoConstructor {
                    class: class.name.clone(),
                    supplied: args.len(),
                })
            }
        };

        let value = NativeCall::new(&ctor.qualified_name(), bound(ctor)?)
            .run(&ctor.parameters, args, Some(&ctor.return_value), true)?;
        match value.as_handle() {
            Some(handle) if !handle.is_null() => {
                debug!("Created {} instance {:?} via {}", class.name, handle, ctor.name);
                Ok(value)
            }
            _ => Err(DispatchError::InvocationFailed(ctor.qualified_name())),
        }
    }

    fn try_destroy_instance(&self, class_name: &str, instance: Handle) -> Result<MarshalledValue, DispatchError> {
        let catalog = self.catalog()?;
        let class = find_class(&catalog, class_name)?;
        if instance.is_null() {
            return Err(DispatchError::NullInstance);
        }

        let lifecycle = &class.lifecycle;
        if lifecycle.destructor.is_none() && lifecycle.deallocate.is_none() {
            return Err(DispatchError::NoBinding(format!("Destructor of {}", class.name)));
        }
        if let Some(destructor) = &lifecycle.destructor {
            destructor(instance);
        }
        if let Some(deallocate) = &lifecycle.deallocate {
            deallocate(instance);
        }
        debug!("Destroyed {} instance {:?}", class.name, instance);
        Ok(MarshalledValue::Void)
    }
}

fn finish(verb: &str, outcome: Result<MarshalledValue, DispatchError>) -> DispatchResult {
    if let Err(error) = &outcome {
        debug!("{} failed: {}", verb, error);
    }
    outcome.into()
}

fn find_class<'c>(catalog: &'c TypeCatalog, name: &str) -> Result<&'c ClassDescriptor, DispatchError> {
    catalog
        .get_class(name)
        .ok_or_else(|| DispatchError::ClassNotFound(name.to_string()))
}

fn find_property<'c>(class: &'c ClassDescriptor, name: &str) -> Result<&'c PropertyDescriptor, DispatchError> {
    class
        .property(name)
        .ok_or_else(|| DispatchError::PropertyNotFound(format!("{}.{}", class.name, name)))
}

fn bound(method: &MethodDescriptor) -> Result<&NativeCallFn, DispatchError> {
    method
        .binding
        .call()
        .ok_or_else(|| DispatchError::NoBinding(format!("Method {}", method.qualified_name())))
}

/// Receiver slot for member accessors; free accessors take none
fn receiver(binding: &Binding, instance: Handle, owner: TypeId) -> Result<Option<NativeArgument>, DispatchError> {
    if !binding.is_member() {
        return Ok(None);
    }
    if instance.is_null() {
        return Err(DispatchError::NullInstance);
    }
    Ok(Some(NativeArgument::from_handle(instance, owner)))
}

fn read_property(
    property: &PropertyDescriptor,
    instance: Handle,
    owner: TypeId,
) -> Result<MarshalledValue, DispatchError> {
    let target = property.qualified_name();
    let getter = property
        .getter
        .as_ref()
        .ok_or_else(|| DispatchError::WriteOnly(target.clone()))?;
    let call = getter
        .call()
        .ok_or_else(|| DispatchError::NoBinding(format!("Getter of {}", target)))?;

    let mut native = NativeCall::new(&target, call);
    if let Some(slot) = receiver(getter, instance, owner)? {
        native = native.leading(slot);
    }
    native.run(&[], &[], Some(&property.value), true)
}

fn write_property(
    property: &PropertyDescriptor,
    instance: Handle,
    owner: TypeId,
    value: &MarshalledValue,
) -> Result<MarshalledValue, DispatchError> {
    let target = property.qualified_name();
    let setter = property
        .setter
        .as_ref()
        .ok_or_else(|| DispatchError::ReadOnly(target.clone()))?;
    let call = setter
        .call()
        .ok_or_else(|| DispatchError::NoBinding(format!("Setter of {}", target)))?;

    let mut native = NativeCall::new(&target, call);
    if let Some(slot) = receiver(setter, instance, owner)? {
        native = native.leading(slot);
    }
    native.run(
        std::slice::from_ref(&property.value),
        std::slice::from_ref(value),
        None,
        false,
    )
}

// ============================================================================
// Native call
// ============================================================================

/// One native invocation with its scratch storage.
///
/// The arena lives exactly as long as the call and is dropped on every path.
pub(super) struct NativeCall<'a> {
    target: &'a str,
    call: &'a NativeCallFn,
    arena: ScratchArena,
    native: Vec<NativeArgument>,
}

impl<'a> NativeCall<'a> {
    pub(super) fn new(target: &'a str, call: &'a NativeCallFn) -> Self {
        NativeCall {
            target,
            call,
            arena: ScratchArena::with_capacity(4),
            native: Vec::with_capacity(4),
        }
    }

    /// Prepend an implicit slot (receiver)
    pub(super) fn leading(mut self, slot: NativeArgument) -> Self {
        self.native.push(slot);
        self
    }

    /// Prepend a by-value slot (event address)
    pub(super) fn leading_value(
        mut self,
        value: &MarshalledValue,
        expected: &ParameterDescriptor,
    ) -> Result<Self, DispatchError> {
        let slot = marshal_to_native(value, expected, &mut self.arena).map_err(DispatchError::Value)?;
        self.native.push(slot);
        Ok(self)
    }

    /// Marshal `args`, call, and marshal the result.
    ///
    /// With `require_result`, a non-void result kind that has no native
    /// storage is a marshal failure instead of a slot-less call.
    pub(super) fn run(
        mut self,
        params: &[ParameterDescriptor],
        args: &[MarshalledValue],
        result: Option<&ParameterDescriptor>,
        require_result: bool,
    ) -> Result<MarshalledValue, DispatchError> {
        debug_assert_eq!(params.len(), args.len());

        for (index, (value, param)) in args.iter().zip(params).enumerate() {
            let slot = marshal_to_native(value, param, &mut self.arena)
                .map_err(|source| DispatchError::Argument { index, source })?;
            self.native.push(slot);
        }

        let slot = result.and_then(|r| allocate_return_slot(r, &mut self.arena));
        if let Some(r) = result {
            if require_result && slot.is_none() && !r.kind.is_void() {
                return Err(DispatchError::Value(MarshalError::Unsupported(r.kind.clone())));
            }
        }

        trace!("Calling {} with {} native arguments", self.target, self.native.len());
        if !(self.call)(&self.native, slot.as_ref()) {
            return Err(DispatchError::InvocationFailed(self.target.to_string()));
        }

        match (slot, result) {
            // SAFETY: the slot was allocated by `allocate_return_slot` for `r.kind`.
            (Some(slot), Some(r)) => Ok(unsafe { marshal_from_native(&slot, r) }),
            _ => Ok(MarshalledValue::Void),
        }
    }
}
