use cu::pre::*;
use regex::Regex;

/// Fixed-width typedefs the decompiler emits, pre-defined so hand-written
/// contexts can use them without boilerplate
const BUILTIN_TYPEDEFS: &[(&str, &str)] = &[
    ("u8", "unsigned char"),
    ("s8", "char"),
    ("u16", "unsigned short"),
    ("s16", "short"),
    ("u32", "unsigned int"),
    ("s32", "int"),
    ("u64", "unsigned long long"),
    ("s64", "long long"),
    ("f32", "float"),
    ("f64", "double"),
];

/// Prepend the builtin typedefs as a single line
///
/// Exactly one line is added, so diagnostics downstream subtract 1 from
/// reported line numbers to get back to the user's source.
pub fn add_builtin_typedefs(source: &str) -> String {
    let line = BUILTIN_TYPEDEFS
        .iter()
        .map(|(name, def)| format!("typedef {def} {name};"))
        .collect::<Vec<_>>()
        .join(" ");
    format!("{line}\n{source}")
}

/// Replace C comments with whitespace, preserving line count
///
/// String and char literals are matched by the same alternation and kept
/// as-is, so comment-looking content inside a literal survives. Comments
/// become a single space followed by as many newlines as they spanned.
pub fn strip_comments(text: &str) -> cu::Result<String> {
    let pattern = match Regex::new(
        r#"//[^\n]*|/\*(?s:.)*?\*/|'(?:\\(?s:.)|[^\\'])*'|"(?:\\(?s:.)|[^\\"])*""#,
    ) {
        Ok(x) => x,
        Err(e) => cu::bail!("failed to compile comment pattern: {e}"),
    };
    let replaced = pattern.replace_all(text, |caps: &regex::Captures| {
        let matched = &caps[0];
        if matched.starts_with('/') {
            let newlines = matched.matches('\n').count();
            format!(" {}", "\n".repeat(newlines))
        } else {
            matched.to_string()
        }
    });
    Ok(replaced.into_owned())
}
