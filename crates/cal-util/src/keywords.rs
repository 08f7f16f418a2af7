//! The fixed C/AL keyword table.
//!
//! C/AL keyword recognition is case-insensitive: `begin`, `Begin` and `BEGIN`
//! all map to [`Keyword::Begin`]. The table is built once and read-only
//! afterwards, so it can be shared freely between threads.
//!
//! Several keywords double as ordinary names depending on position: `CODE` is
//! a section keyword in `CODE {`, a datatype in `Code[20]`, and a legal
//! parameter name in `PROCEDURE F(Code : Text)`. The table only classifies
//! the lexeme; positional disambiguation is the lexer's and parser's job.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

/// A reserved C/AL word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Keyword {
    // Object structure
    Object,
    Properties,
    ObjectProperties,
    Fields,
    Keys,
    Controls,
    Code,
    RdlData,

    // Object kinds
    Table,
    Codeunit,
    Page,
    Report,
    XmlPort,
    Query,
    MenuSuite,

    // Statements and control flow
    Begin,
    End,
    If,
    Then,
    Else,
    While,
    Do,
    For,
    To,
    DownTo,
    With,
    Case,
    Of,
    Repeat,
    Until,
    Exit,

    // Declarations
    Var,
    Procedure,
    Local,
    Trigger,
    Record,
    Array,
    Option,
    DotNet,
    Automation,
    WithEvents,
    RunOnClient,

    // Word operators and literals
    And,
    Or,
    Not,
    Xor,
    Mod,
    Div,
    True,
    False,
}

impl Keyword {
    /// The canonical spelling, as it appears in exported C/AL text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Object => "OBJECT",
            Keyword::Properties => "PROPERTIES",
            Keyword::ObjectProperties => "OBJECT-PROPERTIES",
            Keyword::Fields => "FIELDS",
            Keyword::Keys => "KEYS",
            Keyword::Controls => "CONTROLS",
            Keyword::Code => "CODE",
            Keyword::RdlData => "RDLDATA",
            Keyword::Table => "Table",
            Keyword::Codeunit => "Codeunit",
            Keyword::Page => "Page",
            Keyword::Report => "Report",
            Keyword::XmlPort => "XMLport",
            Keyword::Query => "Query",
            Keyword::MenuSuite => "MenuSuite",
            Keyword::Begin => "BEGIN",
            Keyword::End => "END",
            Keyword::If => "IF",
            Keyword::Then => "THEN",
            Keyword::Else => "ELSE",
            Keyword::While => "WHILE",
            Keyword::Do => "DO",
            Keyword::For => "FOR",
            Keyword::To => "TO",
            Keyword::DownTo => "DOWNTO",
            Keyword::With => "WITH",
            Keyword::Case => "CASE",
            Keyword::Of => "OF",
            Keyword::Repeat => "REPEAT",
            Keyword::Until => "UNTIL",
            Keyword::Exit => "EXIT",
            Keyword::Var => "VAR",
            Keyword::Procedure => "PROCEDURE",
            Keyword::Local => "LOCAL",
            Keyword::Trigger => "TRIGGER",
            Keyword::Record => "Record",
            Keyword::Array => "ARRAY",
            Keyword::Option => "Option",
            Keyword::DotNet => "DotNet",
            Keyword::Automation => "Automation",
            Keyword::WithEvents => "WITHEVENTS",
            Keyword::RunOnClient => "RUNONCLIENT",
            Keyword::And => "AND",
            Keyword::Or => "OR",
            Keyword::Not => "NOT",
            Keyword::Xor => "XOR",
            Keyword::Mod => "MOD",
            Keyword::Div => "DIV",
            Keyword::True => "TRUE",
            Keyword::False => "FALSE",
        }
    }

    /// Section keywords open a braced block inside an object body.
    pub fn is_section(&self) -> bool {
        matches!(
            self,
            Keyword::Properties
                | Keyword::ObjectProperties
                | Keyword::Fields
                | Keyword::Keys
                | Keyword::Controls
                | Keyword::Code
                | Keyword::RdlData
        )
    }

    /// Object kinds follow the `OBJECT` keyword in a header.
    pub fn is_object_kind(&self) -> bool {
        matches!(
            self,
            Keyword::Table
                | Keyword::Codeunit
                | Keyword::Page
                | Keyword::Report
                | Keyword::XmlPort
                | Keyword::Query
                | Keyword::MenuSuite
        )
    }

    /// Word-spelled operators participating in expression parsing.
    pub fn is_word_operator(&self) -> bool {
        matches!(
            self,
            Keyword::And | Keyword::Or | Keyword::Not | Keyword::Xor | Keyword::Mod | Keyword::Div
        )
    }

    /// Keywords that are accepted as variable and parameter names.
    ///
    /// Statement-starting and structural keywords are excluded; everything
    /// that merely names a type or an object kind is legal, so
    /// `PROCEDURE F(VAR Table : DotNet "...")` parses with a parameter
    /// called `Table`.
    pub fn usable_as_name(&self) -> bool {
        self.is_object_kind()
            || self.is_section()
            || matches!(self, Keyword::Record | Keyword::Option | Keyword::Array)
    }
}

static KEYWORDS: Lazy<FxHashMap<&'static str, Keyword>> = Lazy::new(|| {
    let all = [
        Keyword::Object,
        Keyword::Properties,
        Keyword::ObjectProperties,
        Keyword::Fields,
        Keyword::Keys,
        Keyword::Controls,
        Keyword::Code,
        Keyword::RdlData,
        Keyword::Table,
        Keyword::Codeunit,
        Keyword::Page,
        Keyword::Report,
        Keyword::XmlPort,
        Keyword::Query,
        Keyword::MenuSuite,
        Keyword::Begin,
        Keyword::End,
        Keyword::If,
        Keyword::Then,
        Keyword::Else,
        Keyword::While,
        Keyword::Do,
        Keyword::For,
        Keyword::To,
        Keyword::DownTo,
        Keyword::With,
        Keyword::Case,
        Keyword::Of,
        Keyword::Repeat,
        Keyword::Until,
        Keyword::Exit,
        Keyword::Var,
        Keyword::Procedure,
        Keyword::Local,
        Keyword::Trigger,
        Keyword::Record,
        Keyword::Array,
        Keyword::Option,
        Keyword::DotNet,
        Keyword::Automation,
        Keyword::WithEvents,
        Keyword::RunOnClient,
        Keyword::And,
        Keyword::Or,
        Keyword::Not,
        Keyword::Xor,
        Keyword::Mod,
        Keyword::Div,
        Keyword::True,
        Keyword::False,
    ];
    // Keys are the canonical spellings uppercased; lookups uppercase the
    // probe, which is what makes recognition case-insensitive.
    all.iter().map(|kw| (kw.as_str(), *kw)).collect()
});

static KEYWORDS_UPPER: Lazy<FxHashMap<String, Keyword>> = Lazy::new(|| {
    KEYWORDS
        .iter()
        .map(|(spelling, kw)| (spelling.to_ascii_uppercase(), *kw))
        .collect()
});

/// Case-insensitive keyword lookup.
///
/// # Examples
///
/// ```
/// use cal_util::{keyword_from_str, Keyword};
///
/// assert_eq!(keyword_from_str("begin"), Some(Keyword::Begin));
/// assert_eq!(keyword_from_str("BEGIN"), Some(Keyword::Begin));
/// assert_eq!(keyword_from_str("Customer"), None);
/// ```
pub fn keyword_from_str(text: &str) -> Option<Keyword> {
    // Identifier-length lexemes only; avoids allocating for long strings.
    if text.is_empty() || text.len() > 17 {
        return None;
    }
    KEYWORDS_UPPER.get(&text.to_ascii_uppercase()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_lookup() {
        assert_eq!(keyword_from_str("object"), Some(Keyword::Object));
        assert_eq!(keyword_from_str("Object"), Some(Keyword::Object));
        assert_eq!(keyword_from_str("OBJECT"), Some(Keyword::Object));
        assert_eq!(keyword_from_str("dOwNtO"), Some(Keyword::DownTo));
    }

    #[test]
    fn test_non_keywords() {
        assert_eq!(keyword_from_str(""), None);
        assert_eq!(keyword_from_str("Customer"), None);
        assert_eq!(keyword_from_str("BEGINNING"), None);
        assert_eq!(keyword_from_str("interface"), None);
        assert_eq!(keyword_from_str("enum"), None);
    }

    #[test]
    fn test_hyphenated_section_keyword() {
        assert_eq!(
            keyword_from_str("OBJECT-PROPERTIES"),
            Some(Keyword::ObjectProperties)
        );
        assert_eq!(
            keyword_from_str("object-properties"),
            Some(Keyword::ObjectProperties)
        );
    }

    #[test]
    fn test_section_classification() {
        assert!(Keyword::Code.is_section());
        assert!(Keyword::Fields.is_section());
        assert!(Keyword::RdlData.is_section());
        assert!(!Keyword::Begin.is_section());
        assert!(!Keyword::Table.is_section());
    }

    #[test]
    fn test_object_kind_classification() {
        assert!(Keyword::Codeunit.is_object_kind());
        assert!(Keyword::MenuSuite.is_object_kind());
        assert!(!Keyword::Object.is_object_kind());
    }

    #[test]
    fn test_word_operators() {
        assert!(Keyword::And.is_word_operator());
        assert!(Keyword::Div.is_word_operator());
        assert!(!Keyword::If.is_word_operator());
    }

    #[test]
    fn test_keywords_usable_as_names() {
        assert!(Keyword::Table.usable_as_name());
        assert!(Keyword::Record.usable_as_name());
        assert!(Keyword::Code.usable_as_name());
        assert!(Keyword::Page.usable_as_name());
        assert!(!Keyword::Begin.usable_as_name());
        assert!(!Keyword::While.usable_as_name());
        assert!(!Keyword::Var.usable_as_name());
    }

    #[test]
    fn test_canonical_spelling_round_trip() {
        for (spelling, kw) in KEYWORDS.iter() {
            assert_eq!(keyword_from_str(spelling), Some(*kw));
        }
    }
}
