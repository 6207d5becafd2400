/*
Copyright 2024-2025 The Airport Flight Authors

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

     https://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! The typed expression tree the filter compiler emits SQL from. Every
//! variant corresponds to one recognized expression class; anything the
//! parser can't resolve to real SQL becomes [`Expr::Unsupported`] and is
//! pruned according to its parent's conjunction rule rather than failing
//! the whole filter.

use super::value::{LogicalType, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConjunctionOp {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal value with its declared logical type.
    Constant { logical_type: LogicalType, value: Value },

    /// A reference into the scan's column list, resolved by index at
    /// parse time.
    Column { index: usize, name: String },

    /// A bound query parameter. Parameters carry no literal value in the
    /// pushdown document, so they can never be rendered and are always
    /// unsupported.
    Parameter,

    /// A scalar function call or operator invocation. `is_operator`
    /// selects infix/prefix rendering instead of `name(args...)`.
    Call {
        name: String,
        is_operator: bool,
        children: Vec<Expr>,
    },

    Cast {
        child: Box<Expr>,
        target_type: LogicalType,
    },

    Between {
        input: Box<Expr>,
        lower: Box<Expr>,
        upper: Box<Expr>,
        lower_inclusive: bool,
        upper_inclusive: bool,
    },

    Case {
        branches: Vec<(Expr, Expr)>,
        else_branch: Option<Box<Expr>>,
    },

    Conjunction { op: ConjunctionOp, children: Vec<Expr> },

    /// Aggregate calls, window calls, and subquery/CTE references can
    /// appear in the wire format's closed class set but never translate
    /// to a valid scalar WHERE fragment.
    Unsupported,
}
