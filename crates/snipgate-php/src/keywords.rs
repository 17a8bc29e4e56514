//! Reserved words and language constructs of PHP.

use std::collections::BTreeSet;

/// Every PHP keyword and language construct guarded by the gate.
///
/// Besides the reserved words this includes the constructs that look like
/// function calls (`echo`, `isset`, `exit`, `include`, ...), since a snippet
/// can reach them without going through the function table.
pub const PHP_KEYWORDS: &[&str] = &[
    "__halt_compiler",
    "abstract",
    "and",
    "array",
    "as",
    "break",
    "callable",
    "case",
    "catch",
    "class",
    "clone",
    "const",
    "continue",
    "declare",
    "default",
    "die",
    "do",
    "echo",
    "else",
    "elseif",
    "empty",
    "enddeclare",
    "endfor",
    "endforeach",
    "endif",
    "endswitch",
    "endwhile",
    "enum",
    "eval",
    "exit",
    "extends",
    "final",
    "finally",
    "fn",
    "for",
    "foreach",
    "function",
    "global",
    "goto",
    "if",
    "implements",
    "include",
    "include_once",
    "instanceof",
    "insteadof",
    "interface",
    "isset",
    "list",
    "match",
    "namespace",
    "new",
    "or",
    "print",
    "private",
    "protected",
    "public",
    "readonly",
    "require",
    "require_once",
    "return",
    "static",
    "switch",
    "throw",
    "trait",
    "try",
    "unset",
    "use",
    "var",
    "while",
    "xor",
    "yield",
];

/// Returns [`PHP_KEYWORDS`] as an owned set.
#[must_use]
pub fn keyword_set() -> BTreeSet<String> {
    PHP_KEYWORDS.iter().map(|keyword| (*keyword).to_owned()).collect()
}
