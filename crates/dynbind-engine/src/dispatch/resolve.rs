//! Overload resolution

use serde::{Deserialize, Serialize};

use crate::catalog::MethodDescriptor;
use crate::marshal::MarshalledValue;

/// How same-named overloads are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverloadPolicy {
    /// First overload whose arity matches
    #[default]
    ArityOnly,
    /// Among same-arity overloads prefer the first whose parameter kinds
    /// accept the arguments, else fall back to the first same-arity one
    ArityThenKind,
}

impl std::str::FromStr for OverloadPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "arity" | "arity-only" => Ok(OverloadPolicy::ArityOnly),
            "arity-then-kind" => Ok(OverloadPolicy::ArityThenKind),
            other => Err(format!("unknown overload policy '{}'", other)),
        }
    }
}

/// Outcome of resolving a call against its candidates
#[derive(Debug)]
pub enum Resolution<'c> {
    /// Chosen overload
    Found(&'c MethodDescriptor),
    /// Name matched but no overload takes the supplied argument count
    ArityMismatch {
        /// Arities of the candidates
        available: Vec<usize>,
    },
    /// No candidate at all
    NotFound,
}

/// Pick an overload for `args` among same-named `candidates`
pub fn resolve_overload<'c>(
    candidates: impl IntoIterator<Item = &'c MethodDescriptor>,
    args: &[MarshalledValue],
    policy: OverloadPolicy,
) -> Resolution<'c> {
    let candidates: Vec<&MethodDescriptor> = candidates.into_iter().collect();
    if candidates.is_empty() {
        return Resolution::NotFound;
    }

    let mut same_arity = candidates.iter().copied().filter(|m| m.arity() == args.len());
    let chosen = match policy {
        OverloadPolicy::ArityOnly => same_arity.next(),
        OverloadPolicy::ArityThenKind => {
            let same_arity: Vec<&MethodDescriptor> = same_arity.collect();
            same_arity
                .iter()
                .copied()
                .find(|m| accepts(m, args))
                .or_else(|| same_arity.first().copied())
        }
    };

    match chosen {
        Some(method) => Resolution::Found(method),
        None => Resolution::ArityMismatch {
            available: candidates.iter().map(|m| m.arity()).collect(),
        },
    }
}

fn accepts(method: &MethodDescriptor, args: &[MarshalledValue]) -> bool {
    method
        .parameters
        .iter()
        .zip(args)
        .all(|(p, a)| a.fits(&p.kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Binding, Documentation, ParameterDescriptor};
    use crate::marshal::MarshalKind;
    use dynbind_sdk::builtin;

    fn method(kinds: &[MarshalKind]) -> MethodDescriptor {
        MethodDescriptor {
            name: "Add".into(),
            class_name: String::new(),
            is_static: true,
            is_const: false,
            parameters: kinds
                .iter()
                .enumerate()
                .map(|(i, k)| {
                    ParameterDescriptor::new(format!("arg{}", i), "t", builtin::VOID, k.clone())
                })
                .collect(),
            return_value: ParameterDescriptor::void(),
            binding: Binding::default(),
            doc: Documentation::default(),
        }
    }

    #[test]
    fn test_arity_only_takes_first() {
        let ints = method(&[MarshalKind::Int32, MarshalKind::Int32]);
        let floats = method(&[MarshalKind::Float32, MarshalKind::Float32]);
        let args = [MarshalledValue::Float32(1.0), MarshalledValue::Float32(2.0)];

        match resolve_overload([&ints, &floats], &args, OverloadPolicy::ArityOnly) {
            Resolution::Found(m) => assert!(std::ptr::eq(m, &ints)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_arity_then_kind_prefers_matching() {
        let ints = method(&[MarshalKind::Int32, MarshalKind::Int32]);
        let floats = method(&[MarshalKind::Float32, MarshalKind::Float32]);
        let args = [MarshalledValue::Float32(1.0), MarshalledValue::Float32(2.0)];

        match resolve_overload([&ints, &floats], &args, OverloadPolicy::ArityThenKind) {
            Resolution::Found(m) => assert!(std::ptr::eq(m, &floats)),
            other => panic!("unexpected {:?}", other),
        }

        let strings = [MarshalledValue::from("a"), MarshalledValue::from("b")];
        match resolve_overload([&ints, &floats], &strings, OverloadPolicy::ArityThenKind) {
            Resolution::Found(m) => assert!(std::ptr::eq(m, &ints)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_arity_mismatch_and_not_found() {
        let two = method(&[MarshalKind::Int32, MarshalKind::Int32]);
        let args = vec![MarshalledValue::Int32(1); 3];

        match resolve_overload([&two], &args, OverloadPolicy::ArityOnly) {
            Resolution::ArityMismatch { available } => assert_eq!(available, vec![2]),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            resolve_overload(std::iter::empty(), &args, OverloadPolicy::ArityOnly),
            Resolution::NotFound
        ));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("arity".parse::<OverloadPolicy>(), Ok(OverloadPolicy::ArityOnly));
        assert_eq!(
            "arity-then-kind".parse::<OverloadPolicy>(),
            Ok(OverloadPolicy::ArityThenKind)
        );
        assert!("types".parse::<OverloadPolicy>().is_err());
    }
}
