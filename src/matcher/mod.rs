//! Boolean matcher algebra for deny rules.
//!
//! A rule value says both *what* is denied and *when*:
//!
//! | Constructor        | Denies                                               |
//! |--------------------|------------------------------------------------------|
//! | `"x"`              | loads of exactly `x`                                 |
//! | `["x", "y"]`       | loads of `x` or `y`                                  |
//! | `matches(r"x\..*")`| loads whose path starts with a regex match           |
//! | `top_level(m)`     | `m`, but only from eager (module-level) frames       |
//! | `explicit(m)`      | `m`, but only when loaded by the rule's own component|
//! | `depth(n, m)`      | `m` within `n` hops of the immediate caller          |
//! | `star(m)`          | wildcard loads of `m`                                |
//! | `negate(m)`        | everything `m` does not match                        |
//!
//! Every combinator normalizes its members through [`wrap`], so literals are
//! accepted anywhere a matcher is.

mod helpers;
mod types;
mod value;

pub use helpers::{
    all_of, any_of, depth, exact, explicit, hook, matches, negate, regex, star, top_level,
};
pub use types::{Hook, HookFn, Matcher, PrefixPattern};
pub use value::{RuleValue, wrap};
