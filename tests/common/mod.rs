//! Sample interfaces, targets and interceptors shared by the integration tests.
#![allow(dead_code)]

use dynproxy_rs::{
    types::members::{MethodDefinition, Parameter},
    vm::CallFrame,
    InvocationContext, Interceptor, Instance, NativeMethod, ObjectRef, ProxyError, RuntimeType,
    TypeBuilder, TypeDescription, Value,
};
use parking_lot::Mutex;
use std::sync::Arc;

// ============================================================================
// Sample interfaces
// ============================================================================

/// An interface with a single `Execute` method.
pub fn interface(name: &str, execute: MethodDefinition) -> TypeDescription {
    TypeBuilder::interface(name).method(execute).finish()
}

pub fn execute() -> MethodDefinition {
    MethodDefinition::new("Execute")
}

pub fn method_with_no_parameters() -> TypeDescription {
    interface("IMethodWithNoParameters", execute())
}

pub fn method_with_reference_type_parameter() -> TypeDescription {
    interface(
        "IMethodWithReferenceTypeParameter",
        execute().parameter(Parameter::input("value", RuntimeType::String)),
    )
}

pub fn method_with_value_type_parameter() -> TypeDescription {
    interface(
        "IMethodWithValueTypeParameter",
        execute().parameter(Parameter::input("value", RuntimeType::Int32)),
    )
}

pub fn method_with_nullable_parameter() -> TypeDescription {
    interface(
        "IMethodWithNullableParameter",
        execute().parameter(Parameter::input(
            "value",
            RuntimeType::nullable(RuntimeType::Int32),
        )),
    )
}

pub fn method_with_value_type_out_parameter() -> TypeDescription {
    interface(
        "IMethodWithValueTypeOutParameter",
        execute().parameter(Parameter::out("value", RuntimeType::Int32)),
    )
}

pub fn method_with_reference_type_out_parameter() -> TypeDescription {
    interface(
        "IMethodWithReferenceTypeOutParameter",
        execute().parameter(Parameter::out("value", RuntimeType::String)),
    )
}

pub fn method_with_value_type_ref_parameter() -> TypeDescription {
    interface(
        "IMethodWithValueTypeRefParameter",
        execute().parameter(Parameter::by_ref("value", RuntimeType::Int32)),
    )
}

pub fn method_with_reference_type_ref_parameter() -> TypeDescription {
    interface(
        "IMethodWithReferenceTypeRefParameter",
        execute().parameter(Parameter::by_ref(
            "value",
            RuntimeType::Type(reference_type_foo()),
        )),
    )
}

pub fn method_with_reference_type_return_value() -> TypeDescription {
    interface(
        "IMethodWithReferenceTypeReturnValue",
        execute().returns(RuntimeType::String),
    )
}

pub fn method_with_value_type_return_value() -> TypeDescription {
    interface(
        "IMethodWithValueTypeReturnValue",
        execute().returns(RuntimeType::Int32),
    )
}

/// `void Execute<T>(T value)`
pub fn method_with_generic_parameter() -> TypeDescription {
    interface(
        "IMethodWithGenericParameter",
        execute()
            .generic_parameter("T")
            .parameter(Parameter::input("value", RuntimeType::MethodParameter(0))),
    )
}

pub fn method_with_var_args() -> TypeDescription {
    interface(
        "IMethodWithVarArgs",
        execute()
            .parameter(Parameter::input("format", RuntimeType::String))
            .vararg(),
    )
}

pub fn empty_interface() -> TypeDescription {
    TypeBuilder::interface("IEmpty").finish()
}

/// A class carrying a string, standing in for any reference type argument.
pub fn reference_type_foo() -> TypeDescription {
    static FOO: std::sync::LazyLock<TypeDescription> =
        std::sync::LazyLock::new(|| TypeBuilder::class("ReferenceTypeFoo").finish());
    *FOO
}

pub fn foo(value: &str) -> Value {
    Value::Object(ObjectRef::new(Instance::new(
        reference_type_foo(),
        value.to_string(),
    )))
}

pub fn foo_value(value: &Value) -> Option<String> {
    value.as_object()?.state::<String>().cloned()
}

// ============================================================================
// Targets
// ============================================================================

/// Records the arguments of every call it receives.
#[derive(Default)]
pub struct Recorder {
    pub calls: Mutex<Vec<Vec<Value>>>,
}

impl Recorder {
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn last_call(&self) -> Option<Vec<Value>> {
        self.calls.lock().last().cloned()
    }
}

/// A target implementing `Execute` of `iface` with `body`. Every call is
/// recorded before `body` runs.
pub fn target<F>(iface: TypeDescription, body: F) -> ObjectRef
where
    F: Fn(&mut CallFrame) -> Result<Value, ProxyError> + Send + Sync + 'static,
{
    let decl = iface
        .method("Execute")
        .expect("sample interfaces declare Execute");
    let class = TypeBuilder::class(format!("{}Target", iface.type_name()))
        .implements(iface)
        .method_with_body(
            decl.method().clone(),
            NativeMethod::new(move |this, frame| {
                let arguments = (0..frame.argument_count())
                    .map(|i| frame.argument(i))
                    .collect::<Result<Vec<_>, _>>()?;
                if let Some(recorder) = this.state::<Recorder>() {
                    recorder.calls.lock().push(arguments);
                }
                body(frame)
            }),
        )
        .finish();
    ObjectRef::new(Instance::new(class, Recorder::default()))
}

pub fn recorder(target: &ObjectRef) -> &Recorder {
    target.state::<Recorder>().expect("target built by common::target")
}

// ============================================================================
// Interceptors
// ============================================================================

/// Counts invocations and proceeds to the target.
#[derive(Default)]
pub struct RecordingInterceptor {
    pub methods: Mutex<Vec<String>>,
}

impl RecordingInterceptor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn invocation_count(&self) -> usize {
        self.methods.lock().len()
    }
}

impl Interceptor for RecordingInterceptor {
    fn invoke(&self, context: &mut InvocationContext) -> Result<Value, ProxyError> {
        self.methods
            .lock()
            .push(context.method().name().to_string());
        context.proceed()
    }
}
