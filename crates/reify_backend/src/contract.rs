//! The member table of each array wrapper, as the front-end sees it.
//!
//! The front-end type-checks a wrapper as the generic sequence of its boxed element type and
//! resolves call sites against the parameter names and defaults declared here. Resolved calls
//! become `bridge_ast::BridgeCall`s with the omitted defaulted arguments left as `None`; the
//! erasure pass fills them in from the same table.

use reify_common::data::bridge_ast::{BridgeCall, Expr, LocalId};
use reify_common::data::operation::Operation;
use reify_common::data::primitive::PrimitiveKind;
use reify_common::data::type_descriptor::TypeDescriptor;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    Integer,
    Element,
    Wrapper,
    GenericView,
}

/// The value an omitted defaulted argument takes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultRule {
    /// The zero value of the element kind.
    ElementDefault,
    Zero,
    /// As many elements as fit in both arrays past their offsets.
    RemainingLength,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnType {
    Unit,
    Integer,
    Element,
    Wrapper,
    GenericView,
    Descriptor,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ParamDecl {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub type_: ParamType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultRule>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OperationDecl {
    pub operation: Operation,
    pub name: &'static str,
    pub is_static: bool,
    pub params: Vec<ParamDecl>,
    pub ret: ReturnType,
}

impl OperationDecl {
    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|param| param.name == name)
    }

    pub fn num_required(&self) -> usize {
        self.params
            .iter()
            .filter(|param| param.default.is_none())
            .count()
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct WrapperContract {
    pub kind: PrimitiveKind,
    pub wrapper_name: &'static str,
    /// The type the front-end checks the wrapper as.
    pub generic_view: TypeDescriptor,
    pub operations: Vec<OperationDecl>,
}

fn param(name: &'static str, type_: ParamType) -> ParamDecl {
    ParamDecl {
        name,
        type_,
        default: None,
    }
}

fn defaulted(name: &'static str, type_: ParamType, rule: DefaultRule) -> ParamDecl {
    ParamDecl {
        name,
        type_,
        default: Some(rule),
    }
}

/// The declaration of `op`. Identical for every kind.
pub fn operation_decl(op: Operation) -> OperationDecl {
    use ParamType as P;

    let (is_static, params, ret) = match op {
        Operation::Construct => (
            true,
            vec![
                param("size", P::Integer),
                defaulted("element", P::Element, DefaultRule::ElementDefault),
            ],
            ReturnType::Wrapper,
        ),
        Operation::Get => (false, vec![param("index", P::Integer)], ReturnType::Element),
        Operation::Set => (
            false,
            vec![param("index", P::Integer), param("element", P::Element)],
            ReturnType::Unit,
        ),
        Operation::Length => (false, vec![], ReturnType::Integer),
        Operation::CopyTo => (
            false,
            vec![
                param("destination", P::Wrapper),
                defaulted("sourcePosition", P::Integer, DefaultRule::Zero),
                defaulted("destinationPosition", P::Integer, DefaultRule::Zero),
                defaulted("length", P::Integer, DefaultRule::RemainingLength),
            ],
            ReturnType::Unit,
        ),
        Operation::ToGenericView => (false, vec![], ReturnType::GenericView),
        Operation::FromGenericView => (
            true,
            vec![param("array", P::GenericView)],
            ReturnType::Wrapper,
        ),
        Operation::ReifiedType => (false, vec![], ReturnType::Descriptor),
    };

    OperationDecl {
        operation: op,
        name: op.name(),
        is_static,
        params,
        ret,
    }
}

pub fn contract_for(kind: PrimitiveKind) -> WrapperContract {
    WrapperContract {
        kind,
        wrapper_name: kind.wrapper_name(),
        generic_view: TypeDescriptor::generic_sequence_of(kind),
        operations: Operation::ALL.into_iter().map(operation_decl).collect(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallArg<T> {
    Positional(T),
    Named(String, T),
}

#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum ResolveError {
    #[error("{wrapper}.{op} takes at most {max} arguments, but {found} were supplied")]
    TooManyArguments {
        wrapper: &'static str,
        op: Operation,
        max: usize,
        found: usize,
    },

    #[error("{wrapper}.{op} has no parameter named `{name}`")]
    UnknownParameter {
        wrapper: &'static str,
        op: Operation,
        name: String,
    },

    #[error("argument `{name}` of {wrapper}.{op} is supplied more than once")]
    DuplicateArgument {
        wrapper: &'static str,
        op: Operation,
        name: &'static str,
    },

    #[error("call to {wrapper}.{op} is missing the required argument `{name}`")]
    MissingArgument {
        wrapper: &'static str,
        op: Operation,
        name: &'static str,
    },

    #[error("positional argument after named arguments in call to {wrapper}.{op}")]
    PositionalAfterNamed { wrapper: &'static str, op: Operation },

    #[error("{wrapper}.{op} is an instance member and needs a receiver")]
    MissingReceiver { wrapper: &'static str, op: Operation },

    #[error("{wrapper}.{op} is a static member and takes no receiver")]
    UnexpectedReceiver { wrapper: &'static str, op: Operation },
}

/// Matches call-site arguments to the parameters of `op`.
///
/// Positional arguments fill parameters in order, then named arguments fill the rest. The result
/// has one slot per declared parameter; a slot is `None` only when its parameter is defaulted
/// and the call site left it out.
pub fn resolve_call<T>(
    kind: PrimitiveKind,
    op: Operation,
    args: Vec<CallArg<T>>,
) -> Result<Vec<Option<T>>, ResolveError> {
    let wrapper = kind.wrapper_name();
    let decl = operation_decl(op);

    if args.len() > decl.params.len() {
        return Err(ResolveError::TooManyArguments {
            wrapper,
            op,
            max: decl.params.len(),
            found: args.len(),
        });
    }

    let mut slots: Vec<Option<T>> = decl.params.iter().map(|_| None).collect();
    let mut seen_named = false;

    for (position, arg) in args.into_iter().enumerate() {
        let (index, value) = match arg {
            CallArg::Positional(value) => {
                if seen_named {
                    return Err(ResolveError::PositionalAfterNamed { wrapper, op });
                }
                (position, value)
            }
            CallArg::Named(name, value) => {
                seen_named = true;
                match decl.param_index(&name) {
                    Some(index) => (index, value),
                    None => return Err(ResolveError::UnknownParameter { wrapper, op, name }),
                }
            }
        };

        if slots[index].is_some() {
            return Err(ResolveError::DuplicateArgument {
                wrapper,
                op,
                name: decl.params[index].name,
            });
        }
        slots[index] = Some(value);
    }

    for (slot, param) in slots.iter().zip(&decl.params) {
        if slot.is_none() && param.default.is_none() {
            return Err(ResolveError::MissingArgument {
                wrapper,
                op,
                name: param.name,
            });
        }
    }

    Ok(slots)
}

/// Resolves a call site and builds the bridge expression for it.
///
/// `receiver` is the wrapper the member is invoked on, for instance members.
pub fn build_call(
    kind: PrimitiveKind,
    op: Operation,
    receiver: Option<LocalId>,
    args: Vec<CallArg<LocalId>>,
) -> Result<Expr, ResolveError> {
    let wrapper = kind.wrapper_name();
    let decl = operation_decl(op);

    let receiver = match (decl.is_static, receiver) {
        (true, None) => None,
        (false, Some(receiver)) => Some(receiver),
        (true, Some(_)) => return Err(ResolveError::UnexpectedReceiver { wrapper, op }),
        (false, None) => return Err(ResolveError::MissingReceiver { wrapper, op }),
    };

    let slots = resolve_call(kind, op, args)?;
    let mut slots = slots.into_iter();
    let mut optional = || slots.next().flatten();

    // Resolution guarantees the required slots are filled.
    let missing = |name| ResolveError::MissingArgument { wrapper, op, name };

    let this = || receiver.ok_or(ResolveError::MissingReceiver { wrapper, op });

    let call = match op {
        Operation::Construct => {
            let size = optional().ok_or_else(|| missing("size"))?;
            let element = optional();
            BridgeCall::Construct { size, element }
        }
        Operation::Get => BridgeCall::Get {
            array: this()?,
            index: optional().ok_or_else(|| missing("index"))?,
        },
        Operation::Set => {
            let index = optional().ok_or_else(|| missing("index"))?;
            let value = optional().ok_or_else(|| missing("element"))?;
            BridgeCall::Set {
                array: this()?,
                index,
                value,
            }
        }
        Operation::Length => BridgeCall::Length { array: this()? },
        Operation::CopyTo => {
            let destination = optional().ok_or_else(|| missing("destination"))?;
            let source_offset = optional();
            let destination_offset = optional();
            let length = optional();
            BridgeCall::CopyTo {
                source: this()?,
                destination,
                source_offset,
                destination_offset,
                length,
            }
        }
        Operation::ToGenericView => BridgeCall::ToGenericView { array: this()? },
        Operation::FromGenericView => BridgeCall::FromGenericView {
            sequence: optional().ok_or_else(|| missing("array"))?,
        },
        Operation::ReifiedType => return Ok(Expr::TypeOf(this()?)),
    };

    Ok(Expr::Bridge(kind, call))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(n: usize) -> LocalId {
        LocalId(n)
    }

    #[test]
    fn every_operation_is_declared() {
        let contract = contract_for(PrimitiveKind::Float);
        assert_eq!(contract.wrapper_name, "FloatArray");
        assert_eq!(
            contract.generic_view.to_string(),
            "reify.lang::Array<reify.lang::Float>"
        );
        let names: Vec<_> = contract.operations.iter().map(|decl| decl.name).collect();
        assert_eq!(
            names,
            vec!["new", "get", "set", "size", "copyTo", "array", "from", "$getType$"]
        );
    }

    #[test]
    fn defaulted_parameters() {
        let copy = operation_decl(Operation::CopyTo);
        assert_eq!(copy.num_required(), 1);
        assert_eq!(copy.params[3].default, Some(DefaultRule::RemainingLength));
        let new = operation_decl(Operation::Construct);
        assert_eq!(new.params[1].default, Some(DefaultRule::ElementDefault));
        assert!(new.is_static);
    }

    #[test]
    fn resolves_positional_and_named_arguments() {
        let slots = resolve_call(
            PrimitiveKind::Int,
            Operation::CopyTo,
            vec![
                CallArg::Positional("dest"),
                CallArg::Named("length".to_owned(), "len"),
            ],
        )
        .unwrap();
        assert_eq!(slots, vec![Some("dest"), None, None, Some("len")]);
    }

    #[test]
    fn resolution_errors() {
        let kind = PrimitiveKind::Long;
        assert_eq!(
            resolve_call(kind, Operation::Get, Vec::<CallArg<()>>::new()).unwrap_err(),
            ResolveError::MissingArgument {
                wrapper: "LongArray",
                op: Operation::Get,
                name: "index"
            }
        );
        assert!(matches!(
            resolve_call(
                kind,
                Operation::Length,
                vec![CallArg::Positional(())]
            ),
            Err(ResolveError::TooManyArguments { max: 0, found: 1, .. })
        ));
        assert!(matches!(
            resolve_call(
                kind,
                Operation::Set,
                vec![CallArg::Named("value".to_owned(), ())]
            ),
            Err(ResolveError::UnknownParameter { .. })
        ));
        assert!(matches!(
            resolve_call(
                kind,
                Operation::Set,
                vec![
                    CallArg::Positional(()),
                    CallArg::Named("index".to_owned(), ())
                ]
            ),
            Err(ResolveError::DuplicateArgument { name: "index", .. })
        ));
        assert!(matches!(
            resolve_call(
                kind,
                Operation::Set,
                vec![
                    CallArg::Named("element".to_owned(), ()),
                    CallArg::Positional(())
                ]
            ),
            Err(ResolveError::PositionalAfterNamed { .. })
        ));
    }

    #[test]
    fn builds_bridge_calls() {
        let expr = build_call(
            PrimitiveKind::Char,
            Operation::CopyTo,
            Some(local(0)),
            vec![
                CallArg::Positional(local(1)),
                CallArg::Named("destinationPosition".to_owned(), local(2)),
            ],
        )
        .unwrap();
        match expr {
            Expr::Bridge(
                PrimitiveKind::Char,
                BridgeCall::CopyTo {
                    source,
                    destination,
                    source_offset: None,
                    destination_offset: Some(destination_offset),
                    length: None,
                },
            ) => {
                assert_eq!(source, local(0));
                assert_eq!(destination, local(1));
                assert_eq!(destination_offset, local(2));
            }
            other => panic!("unexpected expression {:?}", other),
        }

        assert!(matches!(
            build_call(
                PrimitiveKind::Int,
                Operation::ReifiedType,
                Some(local(3)),
                vec![]
            ),
            Ok(Expr::TypeOf(_))
        ));
    }

    #[test]
    fn receivers_must_match_member_kind() {
        assert_eq!(
            build_call(PrimitiveKind::Byte, Operation::Get, None, vec![]).unwrap_err(),
            ResolveError::MissingReceiver {
                wrapper: "ByteArray",
                op: Operation::Get
            }
        );
        assert!(matches!(
            build_call(
                PrimitiveKind::Byte,
                Operation::Construct,
                Some(local(0)),
                vec![CallArg::Positional(local(1))]
            ),
            Err(ResolveError::UnexpectedReceiver { .. })
        ));
    }

    #[test]
    fn serializes_for_tooling() {
        let json = serde_json::to_value(operation_decl(Operation::Construct)).unwrap();
        assert_eq!(json["name"], "new");
        assert_eq!(json["params"][1]["type"], "element");
        assert_eq!(json["params"][1]["default"], "element_default");
        assert!(json["params"][0].get("default").is_none());
    }
}
