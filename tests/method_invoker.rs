mod common;

use common::*;
use dynproxy_rs::{
    vm::{call_virtual, CallFrame},
    MethodDescription, ProxyConfig, ProxyError, ProxyFactory, RuntimeType, Value,
    types::members::{MethodDefinition, Parameter},
};

fn factory() -> ProxyFactory {
    ProxyFactory::with_config(ProxyConfig::default())
}

fn execute_of(iface: dynproxy_rs::TypeDescription) -> MethodDescription {
    iface.method("Execute").unwrap()
}

#[test]
fn test_invoke_method_with_no_parameters() {
    let iface = method_with_no_parameters();
    let target = target(iface, |_| Ok(Value::Void));

    let result = factory()
        .invoker()
        .invoke(&execute_of(iface), &target, &mut [])
        .unwrap();

    assert_eq!(result, Value::Void);
    assert_eq!(recorder(&target).call_count(), 1);
}

#[test]
fn test_invoke_method_with_reference_type_parameter() {
    let iface = method_with_reference_type_parameter();
    let target = target(iface, |_| Ok(Value::Void));

    factory()
        .invoker()
        .invoke(&execute_of(iface), &target, &mut [Value::from("SomeValue")])
        .unwrap();

    assert_eq!(
        recorder(&target).last_call(),
        Some(vec![Value::from("SomeValue")])
    );
}

#[test]
fn test_invoke_method_with_value_type_parameter() {
    let iface = method_with_value_type_parameter();
    let target = target(iface, |_| Ok(Value::Void));

    factory()
        .invoker()
        .invoke(&execute_of(iface), &target, &mut [Value::Int32(42)])
        .unwrap();

    assert_eq!(recorder(&target).last_call(), Some(vec![Value::Int32(42)]));
}

#[test]
fn test_invoke_method_with_nullable_parameter() {
    let iface = method_with_nullable_parameter();
    let target = target(iface, |_| Ok(Value::Void));
    let invoker = factory().invoker();
    let method = execute_of(iface);

    invoker.invoke(&method, &target, &mut [Value::Int32(42)]).unwrap();
    invoker.invoke(&method, &target, &mut [Value::Null]).unwrap();

    let calls = recorder(&target).calls.lock().clone();
    assert_eq!(calls, vec![vec![Value::Int32(42)], vec![Value::Null]]);
}

#[test]
fn test_invoke_method_with_value_type_out_parameter() {
    let iface = method_with_value_type_out_parameter();
    let target = target(iface, |frame| {
        frame.store(0, 52)?;
        Ok(Value::Void)
    });

    let mut args = [Value::Int32(42)];
    factory()
        .invoker()
        .invoke(&execute_of(iface), &target, &mut args)
        .unwrap();

    assert_eq!(args[0], Value::Int32(52));
}

#[test]
fn test_out_parameter_seed_is_optional() {
    let iface = method_with_value_type_out_parameter();
    let target = target(iface, |frame| {
        frame.store(0, 52)?;
        Ok(Value::Void)
    });

    // a pure out parameter may be passed anything
    let mut args = [Value::Null];
    factory()
        .invoker()
        .invoke(&execute_of(iface), &target, &mut args)
        .unwrap();

    assert_eq!(args[0], Value::Int32(52));
    assert_eq!(recorder(&target).last_call(), Some(vec![Value::Int32(0)]));
}

#[test]
fn test_invoke_method_with_reference_type_out_parameter() {
    let iface = method_with_reference_type_out_parameter();
    let target = target(iface, |frame| {
        frame.store(0, "AnotherValue")?;
        Ok(Value::Void)
    });

    let mut args = [Value::from("SomeValue")];
    factory()
        .invoker()
        .invoke(&execute_of(iface), &target, &mut args)
        .unwrap();

    assert_eq!(args[0], Value::from("AnotherValue"));
}

#[test]
fn test_invoke_method_with_reference_type_ref_parameter() {
    let iface = method_with_reference_type_ref_parameter();
    let target = target(iface, |frame| {
        assert_eq!(foo_value(&frame.argument(0)?), Some("SomeValue".to_string()));
        frame.store(0, foo("AnotherValue"))?;
        Ok(Value::Void)
    });

    let mut args = [foo("SomeValue")];
    factory()
        .invoker()
        .invoke(&execute_of(iface), &target, &mut args)
        .unwrap();

    assert_eq!(foo_value(&args[0]), Some("AnotherValue".to_string()));
}

#[test]
fn test_invoke_method_with_value_type_ref_parameter() {
    let iface = method_with_value_type_ref_parameter();
    let target = target(iface, |frame| {
        let value = frame.get::<i32>(0)?;
        frame.store(0, value * 2)?;
        Ok(Value::Void)
    });

    let mut args = [Value::Int32(21)];
    factory()
        .invoker()
        .invoke(&execute_of(iface), &target, &mut args)
        .unwrap();

    assert_eq!(args[0], Value::Int32(42));
}

#[test]
fn test_ref_parameter_requires_a_compatible_seed() {
    let iface = method_with_value_type_ref_parameter();
    let target = target(iface, |_| Ok(Value::Void));

    let err = factory()
        .invoker()
        .invoke(&execute_of(iface), &target, &mut [Value::Null])
        .unwrap_err();

    assert!(matches!(err, ProxyError::TypeMismatch { .. }));
    assert_eq!(recorder(&target).call_count(), 0);
}

#[test]
fn test_invoke_method_with_return_values() {
    let reference = method_with_reference_type_return_value();
    let reference_target = target(reference, |_| Ok(Value::from("SomeValue")));
    let value = method_with_value_type_return_value();
    let value_target = target(value, |_| Ok(Value::Int32(42)));
    let invoker = factory().invoker();

    assert_eq!(
        invoker.invoke(&execute_of(reference), &reference_target, &mut []),
        Ok(Value::from("SomeValue"))
    );
    assert_eq!(
        invoker.invoke(&execute_of(value), &value_target, &mut []),
        Ok(Value::Int32(42))
    );
}

#[test]
fn test_wrong_return_type_from_target() {
    let iface = method_with_value_type_return_value();
    let target = target(iface, |_| Ok(Value::from("not a number")));

    let err = factory()
        .invoker()
        .invoke(&execute_of(iface), &target, &mut [])
        .unwrap_err();

    assert!(matches!(err, ProxyError::TypeMismatch { .. }));
}

#[test]
fn test_invoke_closed_generic_method() {
    let iface = method_with_generic_parameter();
    let target = target(iface, |_| Ok(Value::Void));
    let invoker = factory().invoker();
    let open = execute_of(iface);

    let int = open.make_generic(&[RuntimeType::Int32]).unwrap();
    let string = open.make_generic(&[RuntimeType::String]).unwrap();
    invoker.invoke(&int, &target, &mut [Value::Int32(1)]).unwrap();
    invoker.invoke(&string, &target, &mut [Value::from("a")]).unwrap();

    assert_eq!(recorder(&target).call_count(), 2);
    assert!(matches!(
        invoker.invoke(&int, &target, &mut [Value::from("a")]),
        Err(ProxyError::TypeMismatch { .. })
    ));
    assert!(matches!(
        invoker.invoke(&open, &target, &mut [Value::Int32(1)]),
        Err(ProxyError::SignatureUnsupported { .. })
    ));
}

#[test]
fn test_thunk_matches_direct_call() {
    let iface = interface(
        "IMixed",
        MethodDefinition::new("Execute")
            .parameter(Parameter::input("count", RuntimeType::Int32))
            .parameter(Parameter::input("name", RuntimeType::String))
            .parameter(Parameter::input("scale", RuntimeType::Float64))
            .parameter(Parameter::input("foo", RuntimeType::Type(reference_type_foo())))
            .returns(RuntimeType::String),
    );
    let target = target(iface, |frame| {
        let count = frame.get::<i32>(0)?;
        let name = frame.get::<String>(1)?;
        let scale = frame.get::<f64>(2)?;
        let foo = foo_value(&frame.argument(3)?).unwrap_or_default();
        Ok(Value::from(format!("{}:{}:{}:{}", count, name, scale, foo)))
    });
    let method = execute_of(iface);
    let args = vec![Value::Int32(3), Value::from("x"), Value::Float64(0.5), foo("bar")];

    let mut frame = CallFrame::from_values(args.clone());
    let direct = call_virtual(&target, &method, &mut frame).unwrap();

    let mut thunk_args = args.clone();
    let through_thunk = factory()
        .invoker()
        .invoke(&method, &target, &mut thunk_args)
        .unwrap();

    assert_eq!(direct, Value::from("3:x:0.5:bar"));
    assert_eq!(direct, through_thunk);
    assert_eq!(thunk_args, args);
}

#[test]
fn test_cached_invoke_compiles_once() {
    let iface = method_with_value_type_return_value();
    let target = target(iface, |_| Ok(Value::Int32(1)));
    let factory = factory();
    let invoker = factory.invoker();
    let method = execute_of(iface);

    for _ in 0..5 {
        invoker.invoke(&method, &target, &mut []).unwrap();
    }

    let stats = factory.cache_statistics();
    assert_eq!(stats.thunk_compilations, 1);
    assert_eq!(stats.thunk.misses, 1);
    assert_eq!(stats.thunk.hits, 4);
    assert_eq!(stats.thunk.size, 1);
}

#[test]
fn test_create_delegate_is_idempotent() {
    let iface = method_with_value_type_ref_parameter();
    let target = target(iface, |frame| {
        let value = frame.get::<i32>(0)?;
        frame.store(0, value + 1)?;
        Ok(Value::Void)
    });
    let factory = factory();
    let invoker = factory.invoker();
    let method = execute_of(iface);

    let first = invoker.create_delegate(&method).unwrap();
    let second = invoker.create_delegate(&method).unwrap();
    assert_eq!(first.ops(), second.ops());
    assert_eq!(factory.cache_statistics().thunk_compilations, 2);

    let mut a = [Value::Int32(1)];
    let mut b = [Value::Int32(1)];
    assert_eq!(first.invoke(&target, &mut a), second.invoke(&target, &mut b));
    assert_eq!(a, [Value::Int32(2)]);
    assert_eq!(a, b);
}

#[test]
fn test_argument_count_is_checked() {
    let iface = method_with_value_type_parameter();
    let target = target(iface, |_| Ok(Value::Void));

    let err = factory()
        .invoker()
        .invoke(&execute_of(iface), &target, &mut [])
        .unwrap_err();

    assert_eq!(
        err,
        ProxyError::ArgumentCountMismatch {
            expected: 1,
            actual: 0
        }
    );
}

#[test]
fn test_vararg_methods_are_rejected() {
    let iface = method_with_var_args();
    let err = factory()
        .invoker()
        .create_delegate(&execute_of(iface))
        .unwrap_err();
    assert!(matches!(err, ProxyError::SignatureUnsupported { .. }));
}

#[test]
fn test_rejected_invoke_is_not_cached() {
    let iface = method_with_var_args();
    let target = target(iface, |_| Ok(Value::Void));
    let factory = factory();
    let method = execute_of(iface);

    for _ in 0..2 {
        let err = factory
            .invoker()
            .invoke(&method, &target, &mut [Value::from("{0}")])
            .unwrap_err();
        assert!(matches!(err, ProxyError::SignatureUnsupported { .. }));
    }

    let stats = factory.cache_statistics();
    assert_eq!(stats.thunk.size, 0);
    assert_eq!(stats.thunk.misses, 0);
    assert_eq!(stats.thunk_compilations, 0);
    assert!(factory.state().thunks.is_empty());
    assert_eq!(recorder(&target).call_count(), 0);
}

#[test]
fn test_instance_must_implement_declaring_type() {
    let iface = method_with_no_parameters();
    let other = method_with_value_type_return_value();
    let stranger = target(other, |_| Ok(Value::Int32(0)));

    let err = factory()
        .invoker()
        .invoke(&execute_of(iface), &stranger, &mut [])
        .unwrap_err();

    assert!(matches!(err, ProxyError::TypeMismatch { .. }));
}
