/// Byte size of a primitive identifier-list type on the target ABI
///
/// The target is a fixed 32-bit ABI: `double` and `long long` are 8,
/// `float` and `int`-likes are 4, `short` is 2, `char` is 1. Alignment
/// always equals size for primitives.
pub fn primitive_size(names: &[String]) -> u32 {
    if names.iter().any(|x| x == "double") {
        return 8;
    }
    if names.iter().any(|x| x == "float") {
        return 4;
    }
    if names.iter().any(|x| x == "short") {
        return 2;
    }
    if names.iter().any(|x| x == "char") {
        return 1;
    }
    if names.iter().filter(|x| *x == "long").count() == 2 {
        return 8;
    }
    4
}
