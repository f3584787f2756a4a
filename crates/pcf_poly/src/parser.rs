use crate::error::PolyError;
use crate::rational::RationalFunction;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::multispace0,
    combinator::{map, not, opt},
    multi::fold_many0,
    sequence::{delimited, pair, preceded},
    IResult,
};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::ToPrimitive;

// Intermediate AST for parsing
#[derive(Debug, Clone)]
enum ParseNode {
    Number(BigRational),
    Variable(String),
    Add(Box<ParseNode>, Box<ParseNode>),
    Sub(Box<ParseNode>, Box<ParseNode>),
    Mul(Box<ParseNode>, Box<ParseNode>),
    Div(Box<ParseNode>, Box<ParseNode>),
    Pow(Box<ParseNode>, Box<ParseNode>),
    Neg(Box<ParseNode>),
}

impl ParseNode {
    /// Evaluate the tree into a rational function of the canonical index `n`.
    fn lower(self, variable: &str) -> Result<RationalFunction, PolyError> {
        match self {
            ParseNode::Number(n) => Ok(RationalFunction::constant(n)),
            ParseNode::Variable(s) => {
                if s == variable {
                    Ok(RationalFunction::var())
                } else {
                    Err(PolyError::UnknownVariable {
                        found: s,
                        expected: variable.to_string(),
                    })
                }
            }
            ParseNode::Add(l, r) => Ok(l.lower(variable)? + r.lower(variable)?),
            ParseNode::Sub(l, r) => Ok(l.lower(variable)? - r.lower(variable)?),
            ParseNode::Mul(l, r) => Ok(l.lower(variable)? * r.lower(variable)?),
            ParseNode::Div(l, r) => l.lower(variable)?.div(&r.lower(variable)?),
            ParseNode::Pow(b, e) => {
                let exponent = e.lower(variable)?;
                let exp = integer_exponent(&exponent)?;
                b.lower(variable)?.pow(exp)
            }
            ParseNode::Neg(e) => Ok(-e.lower(variable)?),
        }
    }
}

fn integer_exponent(exponent: &RationalFunction) -> Result<i32, PolyError> {
    let value = exponent
        .as_polynomial()
        .and_then(|p| p.constant_value())
        .filter(|c| c.is_integer())
        .ok_or_else(|| PolyError::BadExponent(exponent.to_string()))?;
    value
        .to_integer()
        .to_i32()
        .ok_or_else(|| PolyError::BadExponent(exponent.to_string()))
}

/// "8.2" → 41/5, ".5" → 1/2, "8." → 8
fn decimal_to_rational(integer_part: &str, fractional_part: &str) -> BigRational {
    let int_val: BigInt = integer_part.parse().unwrap_or_default();
    if fractional_part.is_empty() {
        return BigRational::from_integer(int_val);
    }
    let denominator = num_traits::pow(BigInt::from(10), fractional_part.len());
    let frac_val: BigInt = fractional_part.parse().unwrap_or_default();
    BigRational::new(int_val * &denominator + frac_val, denominator)
}

fn parse_number(input: &str) -> IResult<&str, ParseNode> {
    let (remaining, (int_part, maybe_frac)) = pair(
        take_while(|c: char| c.is_ascii_digit()),
        opt(pair(tag("."), take_while(|c: char| c.is_ascii_digit()))),
    )(input)?;

    let frac_str = maybe_frac.map(|(_, frac)| frac).unwrap_or("");
    if int_part.is_empty() && frac_str.is_empty() {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Digit,
        )));
    }

    Ok((
        remaining,
        ParseNode::Number(decimal_to_rational(int_part, frac_str)),
    ))
}

// Identifiers start with a letter or underscore; a single index symbol is expected
fn parse_variable(input: &str) -> IResult<&str, ParseNode> {
    let first_ok = input
        .chars()
        .next()
        .map_or(false, |c| c.is_alphabetic() || c == '_');
    if !first_ok {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Alpha,
        )));
    }
    let len: usize = input
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .map(char::len_utf8)
        .sum();
    Ok((&input[len..], ParseNode::Variable(input[..len].to_string())))
}

fn parse_parens(input: &str) -> IResult<&str, ParseNode> {
    delimited(
        preceded(multispace0, tag("(")),
        parse_expr,
        preceded(multispace0, tag(")")),
    )(input)
}

fn parse_atom(input: &str) -> IResult<&str, ParseNode> {
    preceded(multispace0, alt((parse_number, parse_variable, parse_parens)))(input)
}

// Power - right associative, `^` or `**`, signed exponents allowed
fn parse_power(input: &str) -> IResult<&str, ParseNode> {
    let (input, base) = parse_atom(input)?;

    let try_caret = preceded::<_, _, _, nom::error::Error<&str>, _, _>(
        multispace0,
        alt((tag("**"), tag("^"))),
    )(input);

    if let Ok((input, _)) = try_caret {
        let (input, exp) = parse_power_exponent(input)?;
        Ok((input, ParseNode::Pow(Box::new(base), Box::new(exp))))
    } else {
        Ok((input, base))
    }
}

fn parse_power_exponent(input: &str) -> IResult<&str, ParseNode> {
    preceded(
        multispace0,
        alt((
            map(pair(tag("-"), parse_power_exponent), |(_, expr)| {
                ParseNode::Neg(Box::new(expr))
            }),
            map(pair(tag("+"), parse_power_exponent), |(_, expr)| expr),
            parse_power,
        )),
    )(input)
}

fn parse_unary(input: &str) -> IResult<&str, ParseNode> {
    alt((
        map(
            pair(preceded(multispace0, tag("-")), parse_unary),
            |(_, expr)| ParseNode::Neg(Box::new(expr)),
        ),
        parse_power,
    ))(input)
}

// Term - explicit * and /, then implicit multiplication after a number: 2n, 3(n+1)
fn parse_term(input: &str) -> IResult<&str, ParseNode> {
    let (input, init) = parse_unary(input)?;

    let (input, result) = fold_many0(
        pair(
            preceded(
                multispace0,
                alt((
                    // `**` belongs to the power parser
                    map(pair(tag("*"), not(tag("*"))), |(op, _)| op),
                    tag("/"),
                )),
            ),
            parse_unary,
        ),
        move || init.clone(),
        |acc, (op, val)| match op {
            "*" => ParseNode::Mul(Box::new(acc), Box::new(val)),
            _ => ParseNode::Div(Box::new(acc), Box::new(val)),
        },
    )(input)?;

    parse_implicit_mul_chain(input, result)
}

fn parse_implicit_mul_chain(input: &str, acc: ParseNode) -> IResult<&str, ParseNode> {
    match input.chars().next() {
        Some(c) if (c.is_alphabetic() || c == '_' || c == '(') && can_implicit_mul(&acc) => {
            match parse_power(input) {
                Ok((remaining, next_factor)) => {
                    let new_acc = ParseNode::Mul(Box::new(acc), Box::new(next_factor));
                    parse_implicit_mul_chain(remaining, new_acc)
                }
                Err(_) => Ok((input, acc)),
            }
        }
        _ => Ok((input, acc)),
    }
}

fn can_implicit_mul(node: &ParseNode) -> bool {
    match node {
        ParseNode::Number(_) | ParseNode::Pow(_, _) => true,
        ParseNode::Mul(_, right) | ParseNode::Div(_, right) => can_implicit_mul(right),
        ParseNode::Neg(inner) => can_implicit_mul(inner),
        _ => false,
    }
}

fn parse_expr(input: &str) -> IResult<&str, ParseNode> {
    let (input, init) = parse_term(input)?;
    fold_many0(
        pair(preceded(multispace0, alt((tag("+"), tag("-")))), parse_term),
        move || init.clone(),
        |acc, (op, val)| match op {
            "+" => ParseNode::Add(Box::new(acc), Box::new(val)),
            _ => ParseNode::Sub(Box::new(acc), Box::new(val)),
        },
    )(input)
}

/// Parse text such as `"(2*k+1)/(k+3)"` into a rational function, mapping
/// `variable` onto the canonical index `n`.
pub fn parse_rational_function(input: &str, variable: &str) -> Result<RationalFunction, PolyError> {
    let (remaining, node) =
        parse_expr(input).map_err(|e| PolyError::Parse(format!("{}", e)))?;

    let remaining = remaining.trim();
    if !remaining.is_empty() {
        return Err(PolyError::UnconsumedInput(remaining.to_string()));
    }

    node.lower(variable)
}

/// Parse a constant; any identifier is rejected.
pub fn parse_rational(input: &str) -> Result<BigRational, PolyError> {
    let f = parse_rational_function(input, "")?;
    f.as_polynomial()
        .and_then(|p| p.constant_value())
        .ok_or_else(|| PolyError::Parse(format!("not a constant: {}", input)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poly::Polynomial;

    fn p(coeffs: &[i64]) -> Polynomial {
        Polynomial::from_integers(coeffs)
    }

    fn rf(num: &[i64], den: &[i64]) -> RationalFunction {
        RationalFunction::new(p(num), p(den)).unwrap()
    }

    #[test]
    fn test_parse_polynomial() {
        assert_eq!(parse_rational_function("2*n+1", "n").unwrap(), rf(&[1, 2], &[1]));
        assert_eq!(parse_rational_function("n^2", "n").unwrap(), rf(&[0, 0, 1], &[1]));
        assert_eq!(parse_rational_function("n**2 - 1", "n").unwrap(), rf(&[-1, 0, 1], &[1]));
        assert_eq!(parse_rational_function("-n", "n").unwrap(), rf(&[0, -1], &[1]));
    }

    #[test]
    fn test_parse_maps_variable() {
        let f = parse_rational_function("(2*k+1)/(k+3)", "k").unwrap();
        assert_eq!(f, rf(&[1, 2], &[3, 1]));
    }

    #[test]
    fn test_implicit_multiplication_and_decimals() {
        assert_eq!(parse_rational_function("3k^2 - 1/2", "k").unwrap(), rf(&[-1, 0, 6], &[2]));
        assert_eq!(parse_rational_function("0.5n", "n").unwrap(), rf(&[0, 1], &[2]));
        assert_eq!(parse_rational_function("2(n+1)", "n").unwrap(), rf(&[2, 2], &[1]));
        assert_eq!(parse_rational_function("-2n^3", "n").unwrap(), rf(&[0, 0, 0, -2], &[1]));
    }

    #[test]
    fn test_negative_exponent() {
        assert_eq!(parse_rational_function("n^-1", "n").unwrap(), rf(&[1], &[0, 1]));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_rational_function("2*m", "n"),
            Err(PolyError::UnknownVariable { .. })
        ));
        assert!(matches!(
            parse_rational_function("n^(1/2)", "n"),
            Err(PolyError::BadExponent(_))
        ));
        assert!(matches!(
            parse_rational_function("n^n", "n"),
            Err(PolyError::BadExponent(_))
        ));
        assert!(matches!(
            parse_rational_function("n + 1)", "n"),
            Err(PolyError::UnconsumedInput(_))
        ));
        assert!(matches!(
            parse_rational_function("1/(n-n)", "n"),
            Err(PolyError::DivisionByZero)
        ));
        assert!(parse_rational_function("", "n").is_err());
    }

    #[test]
    fn test_parse_rational_constant() {
        assert_eq!(
            parse_rational("3/4").unwrap(),
            BigRational::new(BigInt::from(3), BigInt::from(4))
        );
        assert!(parse_rational("n").is_err());
    }
}
