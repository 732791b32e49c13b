//! Direct-call trampolines.
//!
//! A [`Thunk`] is a straight-line program that adapts a loosely typed argument
//! array to the calling convention of one method: it checks the receiver,
//! narrows every argument, gives out and by-ref parameters a storage cell,
//! dispatches through the receiver's method table and copies the cells back.
use crate::{
    error::ProxyError,
    types::{
        members::{CallingConvention, MethodDescription, ParameterDirection},
        runtime::RuntimeType,
        TypeDescription,
    },
    utils::{sync::Arc, ArgumentIndex, LocalIndex},
    value::{ObjectRef, Value},
    vm::{body::call_virtual, metrics::RuntimeMetrics, CallFrame},
};
use tracing::debug;

#[derive(Clone, Debug, PartialEq)]
pub enum ThunkOp {
    CastInstance(TypeDescription),
    LoadArgument {
        index: ArgumentIndex,
        ty: RuntimeType,
    },
    LoadArgumentAddress {
        index: ArgumentIndex,
        ty: RuntimeType,
        local: LocalIndex,
        direction: ParameterDirection,
    },
    CallVirtual,
    StoreByRefArgument {
        index: ArgumentIndex,
        local: LocalIndex,
    },
    ReturnValue(RuntimeType),
    ReturnVoid,
}

#[derive(Debug)]
pub struct Thunk {
    method: MethodDescription,
    ops: Vec<ThunkOp>,
    local_count: usize,
    parameter_count: usize,
}

impl Thunk {
    pub fn method(&self) -> &MethodDescription {
        &self.method
    }

    pub fn ops(&self) -> &[ThunkOp] {
        &self.ops
    }

    pub fn local_count(&self) -> usize {
        self.local_count
    }

    /// Calls the method on `instance`. Out and by-ref results are written back
    /// into `arguments`.
    pub fn invoke(&self, instance: &ObjectRef, arguments: &mut [Value]) -> Result<Value, ProxyError> {
        if arguments.len() != self.parameter_count {
            return Err(ProxyError::ArgumentCountMismatch {
                expected: self.parameter_count,
                actual: arguments.len(),
            });
        }

        let mut frame = CallFrame::new(self.method.generics.clone());
        let mut result = Value::Void;
        for op in &self.ops {
            match op {
                ThunkOp::CastInstance(ty) => {
                    if !instance.instance_of(*ty) {
                        return Err(ProxyError::type_mismatch(
                            ty.type_name(),
                            instance.object_type().type_name(),
                        ));
                    }
                }
                ThunkOp::LoadArgument { index, ty } => {
                    frame.push_argument(arguments[index.as_usize()].narrow(ty)?);
                }
                ThunkOp::LoadArgumentAddress {
                    index,
                    ty,
                    local,
                    direction,
                } => {
                    let seed = match arguments[index.as_usize()].narrow(ty) {
                        Ok(v) => v,
                        Err(_) if *direction == ParameterDirection::Out => ty.default_value(),
                        Err(e) => return Err(e),
                    };
                    let cell = frame.declare_local(seed);
                    debug_assert_eq!(cell, *local);
                    frame.push_address(cell);
                }
                ThunkOp::CallVirtual => {
                    result = call_virtual(instance, &self.method, &mut frame)?;
                }
                ThunkOp::StoreByRefArgument { index, local } => {
                    arguments[index.as_usize()] = frame.local(*local)?.clone();
                }
                ThunkOp::ReturnValue(ty) => return result.narrow(ty),
                ThunkOp::ReturnVoid => return Ok(Value::Void),
            }
        }
        Ok(result)
    }
}

pub struct ThunkCompiler {
    metrics: Arc<RuntimeMetrics>,
}

impl ThunkCompiler {
    pub fn new(metrics: Arc<RuntimeMetrics>) -> Self {
        Self { metrics }
    }

    /// Rejects signatures no thunk or proxy body can be produced for. Open
    /// generic definitions pass; they are checked again once closed. Any other
    /// method that passes compiles.
    pub fn check_signature(&self, method: &MethodDescription) -> Result<(), ProxyError> {
        if method.calling_convention() == CallingConvention::VarArg {
            return Err(ProxyError::unsupported(
                method,
                "variable argument lists are not supported",
            ));
        }
        if let Some(p) = method.parameters().iter().find(|p| p.ty.is_void()) {
            return Err(ProxyError::unsupported(
                method,
                format!("parameter {} has type Void", p.name),
            ));
        }
        if method.is_generic_definition() {
            return Ok(());
        }
        for p in method.parameters() {
            let ty = method.generics.make_concrete(&p.ty);
            if ty.is_open() {
                return Err(ProxyError::unsupported(
                    method,
                    format!("parameter {} has unresolved type {:?}", p.name, ty),
                ));
            }
        }
        let return_type = method.return_type();
        if return_type.is_open() {
            return Err(ProxyError::unsupported(
                method,
                format!("return type {:?} is unresolved", return_type),
            ));
        }
        Ok(())
    }

    pub fn compile(&self, method: &MethodDescription) -> Result<Thunk, ProxyError> {
        self.check_signature(method)?;
        if method.is_generic_definition() {
            return Err(ProxyError::unsupported(
                method,
                "generic method definitions must be closed first",
            ));
        }

        let mut ops = vec![ThunkOp::CastInstance(method.parent)];
        let mut by_ref = vec![];
        for (i, p) in method.parameters().iter().enumerate() {
            let ty = method.generics.make_concrete(&p.ty);
            let index = ArgumentIndex(i);
            if p.direction.is_by_ref() {
                let local = LocalIndex(by_ref.len());
                by_ref.push((index, local));
                ops.push(ThunkOp::LoadArgumentAddress {
                    index,
                    ty,
                    local,
                    direction: p.direction,
                });
            } else {
                ops.push(ThunkOp::LoadArgument { index, ty });
            }
        }

        ops.push(ThunkOp::CallVirtual);
        ops.extend(
            by_ref
                .iter()
                .map(|&(index, local)| ThunkOp::StoreByRefArgument { index, local }),
        );

        let return_type = method.return_type();
        ops.push(if return_type.is_void() {
            ThunkOp::ReturnVoid
        } else {
            ThunkOp::ReturnValue(return_type)
        });

        self.metrics.record_thunk_compilation();
        debug!("compiled thunk for {:?} ({} ops)", method, ops.len());

        Ok(Thunk {
            method: method.clone(),
            local_count: by_ref.len(),
            parameter_count: method.parameter_count(),
            ops,
        })
    }
}
