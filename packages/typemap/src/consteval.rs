use cu::pre::*;

use cast::Expr;

/// Fold a constant expression to an integer
///
/// Handles integer literals (hex, binary, octal, decimal, with `l`/`u`
/// suffixes) and the `+ - * << >>` operators. Array dimensions and
/// bitfield widths never need more than this.
pub fn parse_constant_int(expr: &Expr) -> cu::Result<i64> {
    match expr {
        Expr::Constant(text) => {
            let value = cu::check!(
                parse_int_literal(text),
                "failed to parse {expr} as an int literal"
            )?;
            Ok(value)
        }
        Expr::Binary(b) => {
            let lhs = parse_constant_int(&b.left)?;
            let rhs = parse_constant_int(&b.right)?;
            match b.op.as_str() {
                "+" => Ok(lhs.wrapping_add(rhs)),
                "-" => Ok(lhs.wrapping_sub(rhs)),
                "*" => Ok(lhs.wrapping_mul(rhs)),
                "<<" | ">>" => {
                    cu::ensure!(
                        (0..64).contains(&rhs),
                        "shift amount {rhs} out of range in {expr}"
                    )?;
                    if b.op == "<<" {
                        Ok(lhs.wrapping_shl(rhs as u32))
                    } else {
                        Ok(lhs.wrapping_shr(rhs as u32))
                    }
                }
                _ => cu::bail!(
                    "failed to evaluate expression {expr} at compile time; only simple arithmetic is supported for now"
                ),
            }
        }
        _ => cu::bail!(
            "failed to evaluate expression {expr} at compile time; only simple arithmetic is supported for now"
        ),
    }
}

// C literal rules: trailing l/L/u/U stripped, base inferred from prefix
fn parse_int_literal(text: &str) -> Option<i64> {
    let text = text.trim_end_matches(['l', 'L', 'u', 'U']);
    let (digits, radix) = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        (hex, 16)
    } else if let Some(bin) = text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")) {
        (bin, 2)
    } else if text.len() > 1 && text.starts_with('0') {
        (&text[1..], 8)
    } else {
        (text, 10)
    };
    i64::from_str_radix(digits, radix).ok()
}
