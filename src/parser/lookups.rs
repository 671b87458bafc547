use std::collections::HashMap;

use lazy_static::lazy_static;

/// Characters that may start a unary operator or name a user-defined operator.
pub const OPERATOR_CHARS: [char; 12] = ['+', '-', '*', '/', '\\', '|', ':', '&', '^', '!', '<', '>'];

/// Binding power reported for anything that is not a known binary operator.
pub const NO_PRECEDENCE: i32 = -1;

lazy_static! {
    /// The binary operators every compilation unit starts with.
    pub static ref DEFAULT_PRECEDENCE: HashMap<char, i32> = {
        let mut map = HashMap::new();
        map.insert('=', 2);
        map.insert('<', 10);
        map.insert('+', 20);
        map.insert('-', 30);
        map.insert('*', 40);
        map
    };
}

pub fn is_operator(c: char) -> bool {
    OPERATOR_CHARS.contains(&c)
}

/// Whether `c` may be declared as a `unary` or `binary` operator. Only
/// characters the expression builder treats as operators qualify.
pub fn is_overloadable(c: char) -> bool {
    is_operator(c)
}
