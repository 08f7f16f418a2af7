//! Lexer contexts and depth counters.
//!
//! The context stack is what makes the lexer context-sensitive. The stack
//! starts as `[Normal]`; `OBJECT` pushes the header context, every
//! structural `{` pushes a block context, and every `}` pops one. After a
//! full tokenization the stack must be back to `[Normal]` and all depth
//! counters at zero, or the clean-exit check reports the difference.

use std::fmt;

/// A lexical mode. The top of the context stack names the current one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LexerContext {
    /// Outside any object.
    Normal,
    /// Between `OBJECT` and the object's opening `{`.
    ObjectHeader,
    /// Object body or a `PROPERTIES`/`OBJECT-PROPERTIES` section.
    PropertyBlock,
    /// A `FIELDS { ... }` section or one of its rows.
    FieldsBlock,
    /// A `KEYS { ... }` section or one of its rows.
    KeysBlock,
    /// A `CONTROLS { ... }` section or one of its rows.
    ControlsBlock,
    /// A `CODE { ... }` section; `{ ... }` is a comment in here.
    CodeSection,
    /// A report's `RDLDATA { ... }` section; content is consumed raw.
    RdlData,
    /// Inside the quoted payload following the `DotNet` keyword.
    DotNetTypeLiteral,
    /// Inside the quoted payload following the `Automation` keyword.
    AutomationTypeLiteral,
    /// Inside an AL-style `#directive`.
    PreprocDirective,
}

impl LexerContext {
    /// The name used in traces and clean-exit messages.
    pub fn name(&self) -> &'static str {
        match self {
            LexerContext::Normal => "NORMAL",
            LexerContext::ObjectHeader => "OBJECT_HEADER",
            LexerContext::PropertyBlock => "PROPERTY_BLOCK",
            LexerContext::FieldsBlock => "FIELDS_BLOCK",
            LexerContext::KeysBlock => "KEYS_BLOCK",
            LexerContext::ControlsBlock => "CONTROLS_BLOCK",
            LexerContext::CodeSection => "CODE_SECTION",
            LexerContext::RdlData => "RDLDATA_SECTION",
            LexerContext::DotNetTypeLiteral => "DOTNET_TYPE_LITERAL",
            LexerContext::AutomationTypeLiteral => "AUTOMATION_TYPE_LITERAL",
            LexerContext::PreprocDirective => "PREPROC_DIRECTIVE",
        }
    }
}

impl fmt::Display for LexerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The integer depth counters maintained alongside the context stack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DepthCounters {
    /// `{` minus `}` seen so far.
    pub brace: i64,
    /// `(` minus `)` seen so far.
    pub paren: i64,
    /// `[` minus `]` seen so far.
    pub bracket: i64,
}

impl DepthCounters {
    /// True when every counter is back to zero.
    pub fn balanced(&self) -> bool {
        self.brace == 0 && self.paren == 0 && self.bracket == 0
    }
}

/// Render a context stack the way clean-exit messages expect it.
pub fn format_stack(stack: &[LexerContext]) -> String {
    let names: Vec<&str> = stack.iter().map(LexerContext::name).collect();
    format!("[{}]", names.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_names() {
        assert_eq!(LexerContext::Normal.name(), "NORMAL");
        assert_eq!(LexerContext::CodeSection.name(), "CODE_SECTION");
        assert_eq!(LexerContext::DotNetTypeLiteral.name(), "DOTNET_TYPE_LITERAL");
        assert_eq!(format!("{}", LexerContext::ObjectHeader), "OBJECT_HEADER");
    }

    #[test]
    fn test_depth_counters_balanced() {
        let mut counters = DepthCounters::default();
        assert!(counters.balanced());
        counters.brace += 1;
        assert!(!counters.balanced());
        counters.brace -= 1;
        counters.paren -= 1;
        assert!(!counters.balanced());
    }

    #[test]
    fn test_format_stack() {
        assert_eq!(format_stack(&[LexerContext::Normal]), "[NORMAL]");
        assert_eq!(
            format_stack(&[LexerContext::Normal, LexerContext::CodeSection]),
            "[NORMAL, CODE_SECTION]"
        );
    }
}
