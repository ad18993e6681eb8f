//! Data Generator Math
//!
//! This module evaluates the `math` expression of a [`DataGenerator`] element-wise
//! over the results of its variables.
//!
//! # Key Components
//!
//! - [`MathFunctions`]: The fixed table of functions and constants available to
//!   expressions. It is built explicitly and passed to the evaluator.
//! - [`parse_math`]: Parses an infix expression into a [`meval::Expr`]
//! - [`extract_symbols`]: Lists the identifiers and functions an expression uses
//! - [`calc_data_generator_results`]: Computes the result array of a data generator
//!
//! # Numeric Semantics
//!
//! All math is real-valued double precision. `log` and `ln` are both the natural
//! logarithm. Arguments outside the real domain of a function yield NaN.

use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::{E, FRAC_PI_2, PI};

use meval::tokenizer::Token;
use meval::{Context, Expr};
use ndarray::{ArrayD, IxDyn};
use statrs::function::factorial::factorial as statrs_factorial;

use crate::report::data_model::VariableResults;
use crate::sedml::data_model::DataGenerator;
use crate::sedml::error::MathError;

type UnaryFn = fn(f64) -> f64;
type BinaryFn = fn(f64, f64) -> f64;

/// The functions and constants available to data generator expressions.
#[derive(Debug, Clone)]
pub struct MathFunctions {
    unary: BTreeMap<&'static str, UnaryFn>,
    binary: BTreeMap<&'static str, BinaryFn>,
    constants: BTreeMap<&'static str, f64>,
}

impl Default for MathFunctions {
    fn default() -> Self {
        Self::sedml()
    }
}

impl MathFunctions {
    /// Builds the SED-ML function table.
    pub fn sedml() -> Self {
        let unary: BTreeMap<&'static str, UnaryFn> = BTreeMap::from([
            ("abs", f64::abs as UnaryFn),
            ("exp", f64::exp),
            ("ln", f64::ln),
            ("log", f64::ln),
            ("floor", f64::floor),
            ("ceiling", f64::ceil),
            ("factorial", factorial),
            ("sin", f64::sin),
            ("cos", f64::cos),
            ("tan", f64::tan),
            ("sec", sec),
            ("csc", csc),
            ("cot", cot),
            ("sinh", f64::sinh),
            ("cosh", f64::cosh),
            ("tanh", f64::tanh),
            ("sech", sech),
            ("csch", csch),
            ("coth", coth),
            ("arcsin", f64::asin),
            ("arccos", f64::acos),
            ("arctan", f64::atan),
            ("arcsec", arcsec),
            ("arccsc", arccsc),
            ("arccot", arccot),
            ("arcsinh", f64::asinh),
            ("arccosh", f64::acosh),
            ("arctanh", f64::atanh),
            ("arcsech", arcsech),
            ("arccsch", arccsch),
            ("arccoth", arccoth),
        ]);

        let binary: BTreeMap<&'static str, BinaryFn> = BTreeMap::from([("root", root as BinaryFn)]);

        let constants = BTreeMap::from([("pi", PI), ("exponentiale", E)]);

        Self {
            unary,
            binary,
            constants,
        }
    }

    /// Returns whether a function of the given name is available.
    pub fn contains_function(&self, name: &str) -> bool {
        self.unary.contains_key(name) || self.binary.contains_key(name)
    }

    /// Returns whether a constant of the given name is available.
    pub fn contains_constant(&self, name: &str) -> bool {
        self.constants.contains_key(name)
    }

    /// Names of all available functions, in ascending order.
    pub fn function_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self
            .unary
            .keys()
            .chain(self.binary.keys())
            .copied()
            .collect();
        names.sort_unstable();
        names
    }

    /// Builds an evaluation context holding the functions and constants of the table.
    fn context(&self) -> Context<'static> {
        let mut ctx = Context::empty();
        for (name, func) in &self.unary {
            ctx.func(*name, *func);
        }
        for (name, func) in &self.binary {
            ctx.func2(*name, *func);
        }
        for (name, value) in &self.constants {
            ctx.var(*name, *value);
        }
        ctx
    }
}

/// Identifiers and function names used by an expression.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Symbols {
    pub variables: BTreeSet<String>,
    pub functions: BTreeSet<String>,
}

/// Parses an infix expression. `**` is accepted as a synonym for `^`.
///
/// # Arguments
///
/// * `math` - The expression to parse
///
/// # Returns
///
/// Returns the parsed expression or a [`MathError::Parse`].
pub fn parse_math(math: &str) -> Result<Expr, MathError> {
    let normalized = math.replace("**", "^");
    normalized.parse::<Expr>().map_err(|e| MathError::Parse {
        math: math.to_string(),
        message: e.to_string(),
    })
}

/// Extracts the identifiers and function names used by an expression.
pub fn extract_symbols(expr: &Expr) -> Symbols {
    let mut symbols = Symbols::default();

    for token in expr.iter() {
        match token {
            Token::Var(name) => {
                symbols.variables.insert(name.clone());
            }
            Token::Func(name, _) => {
                symbols.functions.insert(name.clone());
            }
            _ => {}
        }
    }

    symbols
}

/// Checks that every function of an expression is in the table and every
/// identifier is either bound or a constant.
///
/// # Arguments
///
/// * `expr` - The parsed expression
/// * `bound` - Ids of the variables and parameters in scope
/// * `functions` - The function table
pub fn check_symbols<'a>(
    expr: &Expr,
    bound: impl IntoIterator<Item = &'a str>,
    functions: &MathFunctions,
) -> Result<(), MathError> {
    let symbols = extract_symbols(expr);
    let bound: BTreeSet<&str> = bound.into_iter().collect();

    if let Some(name) = symbols
        .functions
        .iter()
        .find(|name| !functions.contains_function(name))
    {
        return Err(MathError::UnsupportedFunction(name.clone()));
    }

    if let Some(name) = symbols
        .variables
        .iter()
        .find(|name| !bound.contains(name.as_str()) && !functions.contains_constant(name))
    {
        return Err(MathError::UnresolvedReference(name.clone()));
    }

    Ok(())
}

/// Calculates the result array of a data generator.
///
/// The expression is evaluated once per element of the variable results, with each
/// variable bound to its element and each parameter bound to its value. All
/// variables of the data generator must have the same shape; the result has that
/// shape. A data generator without variables evaluates to a 0-dimensional array.
///
/// # Arguments
///
/// * `data_generator` - The data generator to evaluate
/// * `variable_results` - Results of all variables, keyed by variable id
/// * `functions` - The function table
///
/// # Returns
///
/// Returns the result array or a [`MathError`] if a reference cannot be resolved,
/// a function is unknown, or the variable shapes disagree.
pub fn calc_data_generator_results(
    data_generator: &DataGenerator,
    variable_results: &VariableResults,
    functions: &MathFunctions,
) -> Result<ArrayD<f64>, MathError> {
    let expr = parse_math(&data_generator.math)?;

    let bound = data_generator
        .variables
        .iter()
        .map(|var| var.id.as_str())
        .chain(data_generator.parameters.iter().map(|p| p.id.as_str()));
    check_symbols(&expr, bound, functions)?;

    let mut inputs = Vec::with_capacity(data_generator.variables.len());
    for var in &data_generator.variables {
        let result = variable_results
            .get(&var.id)
            .ok_or_else(|| MathError::UnresolvedReference(var.id.clone()))?;
        inputs.push((var.id.as_str(), result));
    }

    let mut shapes: Vec<Vec<usize>> = inputs.iter().map(|(_, r)| r.shape().to_vec()).collect();
    shapes.dedup();
    if shapes.len() > 1 {
        return Err(MathError::ShapeMismatch {
            data_generator: data_generator.id.clone(),
            shapes,
        });
    }

    let mut ctx = functions.context();
    for param in &data_generator.parameters {
        ctx.var(param.id.as_str(), param.value);
    }

    let shape = match shapes.pop() {
        Some(shape) => shape,
        None => {
            let value = evaluate(&expr, &ctx)?;
            return Ok(ArrayD::from_elem(IxDyn(&[]), value));
        }
    };

    let columns: Vec<(&str, Vec<f64>)> = inputs
        .iter()
        .map(|(id, result)| (*id, result.iter().copied().collect()))
        .collect();
    let size: usize = shape.iter().product();

    let mut values = Vec::with_capacity(size);
    for idx in 0..size {
        for (id, column) in &columns {
            ctx.var(*id, column[idx]);
        }
        values.push(evaluate(&expr, &ctx)?);
    }

    ArrayD::from_shape_vec(IxDyn(&shape), values).map_err(|e| MathError::Evaluation(e.to_string()))
}

fn evaluate(expr: &Expr, ctx: &Context) -> Result<f64, MathError> {
    expr.eval_with_context(ctx).map_err(|e| match e {
        meval::Error::UnknownVariable(name) => MathError::UnresolvedReference(name),
        meval::Error::Function(name, meval::FuncEvalError::UnknownFunction) => {
            MathError::UnsupportedFunction(name)
        }
        other => MathError::Evaluation(other.to_string()),
    })
}

//
// Functions without a direct counterpart in `f64`. The reciprocal functions are
// undefined at their poles, where they evaluate to NaN instead of an infinity.
//

/// `1 / x`, NaN when `x` is zero.
fn reciprocal(x: f64) -> f64 {
    if x == 0.0 {
        f64::NAN
    } else {
        1.0 / x
    }
}

fn root(x: f64, n: f64) -> f64 {
    x.powf(1.0 / n)
}

fn factorial(x: f64) -> f64 {
    if x < 0.0 || x.fract() != 0.0 {
        return f64::NAN;
    }
    statrs_factorial(x as u64)
}

fn sec(x: f64) -> f64 {
    reciprocal(x.cos())
}

fn csc(x: f64) -> f64 {
    reciprocal(x.sin())
}

fn cot(x: f64) -> f64 {
    x.cos() * reciprocal(x.sin())
}

fn sech(x: f64) -> f64 {
    reciprocal(x.cosh())
}

fn csch(x: f64) -> f64 {
    reciprocal(x.sinh())
}

fn coth(x: f64) -> f64 {
    reciprocal(x.tanh())
}

fn arcsec(x: f64) -> f64 {
    reciprocal(x).acos()
}

fn arccsc(x: f64) -> f64 {
    reciprocal(x).asin()
}

fn arccot(x: f64) -> f64 {
    if x == 0.0 {
        FRAC_PI_2
    } else {
        (1.0 / x).atan()
    }
}

fn arcsech(x: f64) -> f64 {
    reciprocal(x).acosh()
}

fn arccsch(x: f64) -> f64 {
    reciprocal(x).asinh()
}

fn arccoth(x: f64) -> f64 {
    reciprocal(x).atanh()
}
