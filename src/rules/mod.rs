//! Built-in rules.
//!
//! Every rule is a small, self-contained predicate over the tree; the
//! interesting machinery lives in the engine, not here. Each module exposes
//! a `METADATA` static and a `from_config` constructor so the provider can
//! decide activation before anything is built.

pub mod forbidden_suppress;
pub mod return_count;
pub mod text_rules;
pub mod too_many_functions;
pub mod undesirable_call;
pub mod unresolved_reference;

use crate::rule_set::RuleSetProvider;

/// The built-in `smells` rule set, in declaration order.
pub fn builtin_provider() -> RuleSetProvider {
    RuleSetProvider::new("smells")
        .register(&return_count::METADATA, return_count::ReturnCount::from_config)
        .register(&text_rules::METADATA, text_rules::TextRules::from_config)
        .register(
            &too_many_functions::METADATA,
            too_many_functions::TooManyFunctions::from_config,
        )
        .register(&undesirable_call::METADATA, undesirable_call::UndesirableCall::from_config)
        .register(
            &unresolved_reference::METADATA,
            unresolved_reference::UnresolvedReference::from_config,
        )
        .register(
            &forbidden_suppress::METADATA,
            forbidden_suppress::ForbiddenSuppress::from_config,
        )
}
