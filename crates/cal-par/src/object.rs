//! Object header and section parsing.
//!
//! An object is `OBJECT <Kind> <Id> <Name> { sections }`. A section keyword
//! opens a section only when the very next token is `{`; otherwise it is an
//! ordinary lexeme, which is what lets a field be named `Code` or a
//! parameter be named `Page`. This mirrors the lexer's lookahead exactly;
//! both sides use the same one-token `is_followed_by_left_brace` predicate.
//!
//! Property values are not interpreted: anything from `Yes` to a complete
//! trigger body can sit on the right of `Name=`, so the parser records the
//! raw token range, balancing parens, brackets, braces and `BEGIN`/`END`
//! pairs to find the terminating `;`.

use cal_lex::TokenKind;
use cal_util::Keyword;

use crate::ast::{
    CodeSection, Control, ControlsBlock, Field, FieldsBlock, KeysBlock, Object, ObjectKind,
    Property, PropertyBlock, RdlDataSection, TableKey,
};
use crate::Parser;

impl Parser {
    /// Parses `OBJECT ...` starting at the `OBJECT` keyword.
    pub(crate) fn parse_object(&mut self) -> Option<Object> {
        let start = self.pos;
        self.advance(); // OBJECT

        let kind = match self.peek().keyword().filter(Keyword::is_object_kind) {
            Some(kw) => {
                self.advance();
                object_kind_of(kw)
            }
            None => {
                let message = format!(
                    "Expected object kind after OBJECT, found {}",
                    self.describe_current()
                );
                self.error_at_current(message);
                self.skip_balanced_object();
                return None;
            }
        };

        let id = if self.check(TokenKind::Integer) {
            let token = self.peek().clone();
            self.advance();
            token.value.parse::<i64>().unwrap_or_else(|_| {
                self.error_at_previous("Invalid integer literal: value out of range".to_string());
                0
            })
        } else {
            self.error_at_previous("Expected object ID after object kind".to_string());
            0
        };

        let name = self.collect_object_name();

        let mut object = Object {
            kind,
            id,
            name,
            object_properties: None,
            properties: None,
            fields: None,
            keys: None,
            controls: None,
            code: None,
            rdldata: None,
            start_token: start,
            end_token: start,
        };

        if !self.consume_expected(TokenKind::LBrace, "Expected { to open object body") {
            object.end_token = self.pos.saturating_sub(1).max(start);
            return Some(object);
        }

        loop {
            if self.match_kind(TokenKind::RBrace) {
                break;
            }
            if self.at_eof() {
                self.error_at_previous("Expected } to close object body".to_string());
                break;
            }

            let before = self.pos;
            if let Some(kw) = self.peek().keyword() {
                if kw.is_section() && self.is_followed_by_left_brace() {
                    self.parse_section(kw, &mut object);
                    if self.pos > before {
                        continue;
                    }
                }
            }

            let message = format!(
                "Unexpected token {} in object body",
                self.describe_current()
            );
            self.error_at_current(message);
            self.advance();
        }

        object.end_token = self.pos.saturating_sub(1).max(start);
        Some(object)
    }

    /// Dispatches one section. The keyword and its `{` are guaranteed by
    /// the caller's lookahead.
    fn parse_section(&mut self, keyword: Keyword, object: &mut Object) {
        let start = self.pos;
        self.advance(); // section keyword

        match keyword {
            Keyword::ObjectProperties => {
                let block = self.parse_property_block(start);
                self.assign_section(keyword, object.object_properties.replace(block).is_some());
            }
            Keyword::Properties => {
                let block = self.parse_property_block(start);
                self.assign_section(keyword, object.properties.replace(block).is_some());
            }
            Keyword::Fields => {
                let block = self.parse_fields_block(start);
                self.assign_section(keyword, object.fields.replace(block).is_some());
            }
            Keyword::Keys => {
                let block = self.parse_keys_block(start);
                self.assign_section(keyword, object.keys.replace(block).is_some());
            }
            Keyword::Controls => {
                let block = self.parse_controls_block(start);
                self.assign_section(keyword, object.controls.replace(block).is_some());
            }
            Keyword::Code => {
                let section = self.parse_code_section(start);
                self.assign_section(keyword, object.code.replace(section).is_some());
            }
            Keyword::RdlData => {
                let section = self.parse_rdldata_section(start);
                self.assign_section(keyword, object.rdldata.replace(section).is_some());
            }
            _ => {}
        }
    }

    fn assign_section(&mut self, keyword: Keyword, duplicate: bool) {
        if duplicate {
            self.error_at_previous(format!("Duplicate {} section", keyword.as_str()));
        }
    }

    /// Header tokens up to `{`, joined with source-faithful spacing (tokens
    /// that touch in the source are not separated).
    fn collect_object_name(&mut self) -> String {
        let mut name = String::new();
        let mut last_end = usize::MAX;

        while !self.check(TokenKind::LBrace) && !self.at_eof() {
            let token = self.peek().clone();
            if !name.is_empty() && token.start > last_end {
                name.push(' ');
            }
            name.push_str(&Self::name_text(&token));
            last_end = token.end;
            self.advance();
        }

        name
    }

    /// `{ Name=value; ... }`.
    fn parse_property_block(&mut self, start: usize) -> PropertyBlock {
        self.advance(); // {

        let mut properties = Vec::new();
        loop {
            if self.match_kind(TokenKind::RBrace) {
                break;
            }
            if self.at_eof() {
                self.error_at_previous("Expected } to close property section".to_string());
                break;
            }

            let before = self.pos;
            if let Some(property) = self.parse_property() {
                properties.push(property);
            }
            if self.pos == before {
                let message = format!(
                    "Unexpected token {} in property section",
                    self.describe_current()
                );
                self.error_at_current(message);
                self.advance();
            }
        }

        PropertyBlock {
            properties,
            start_token: start,
            end_token: self.pos.saturating_sub(1).max(start),
        }
    }

    fn parse_property(&mut self) -> Option<Property> {
        let start = self.pos;

        let name = match self.peek().kind {
            TokenKind::Ident | TokenKind::QuotedIdent | TokenKind::Keyword(_) => {
                let token = self.peek().clone();
                self.advance();
                Self::name_text(&token)
            }
            _ => {
                return None;
            }
        };

        if !self.consume_expected(TokenKind::Eq, "Expected = after property name") {
            self.skip_property_value();
            self.match_kind(TokenKind::Semicolon);
            return None;
        }

        let value_start = self.pos;
        self.skip_property_value();
        let value_end = self.pos.saturating_sub(1);
        self.match_kind(TokenKind::Semicolon);

        Some(Property {
            name,
            value_start,
            value_end,
            start_token: start,
            end_token: self.pos.saturating_sub(1).max(start),
        })
    }

    /// Advances past a property value: everything up to the `;` (or the
    /// section's `}`) at zero nesting depth. Trigger-valued properties
    /// (`OnRun=VAR ... BEGIN ... END;`) contain semicolons of their own, so
    /// `BEGIN`/`CASE`..`END` pairs and a leading `VAR` prelude keep the
    /// scan open until the balancing `END`.
    fn skip_property_value(&mut self) {
        let mut depth = 0i64;
        let mut block_depth = 0i64;
        let mut var_prelude = false;

        loop {
            match self.peek().kind {
                TokenKind::Eof => {
                    self.error_at_previous("Expected ; after property value".to_string());
                    return;
                }
                TokenKind::Semicolon if depth == 0 && block_depth == 0 && !var_prelude => {
                    return;
                }
                TokenKind::RBrace if depth == 0 => {
                    return;
                }
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = (depth - 1).max(0);
                    self.advance();
                }
                TokenKind::Keyword(Keyword::Var) if depth == 0 => {
                    var_prelude = true;
                    self.advance();
                }
                TokenKind::Keyword(Keyword::Begin | Keyword::Case) if depth == 0 => {
                    block_depth += 1;
                    var_prelude = false;
                    self.advance();
                }
                TokenKind::Keyword(Keyword::End) if depth == 0 && block_depth > 0 => {
                    block_depth -= 1;
                    self.advance();
                }
                _ => self.advance(),
            }
        }
    }

    /// `FIELDS { { <no>; ; <name>; <type>; props } ... }`.
    fn parse_fields_block(&mut self, start: usize) -> FieldsBlock {
        self.advance(); // {

        let mut fields = Vec::new();
        loop {
            if self.match_kind(TokenKind::RBrace) {
                break;
            }
            if self.at_eof() {
                self.error_at_previous("Expected } to close FIELDS section".to_string());
                break;
            }

            if self.check(TokenKind::LBrace) {
                if let Some(field) = self.parse_field_row() {
                    fields.push(field);
                }
            } else {
                let message = format!(
                    "Unexpected token {} in FIELDS section",
                    self.describe_current()
                );
                self.error_at_current(message);
                self.advance();
            }
        }

        FieldsBlock {
            fields,
            start_token: start,
            end_token: self.pos.saturating_sub(1).max(start),
        }
    }

    fn parse_field_row(&mut self) -> Option<Field> {
        let start = self.pos;
        self.advance(); // {

        let number = if self.check(TokenKind::Integer) {
            let token = self.peek().clone();
            self.advance();
            token.value.parse::<i64>().unwrap_or_else(|_| {
                self.error_at_previous("Invalid integer literal: value out of range".to_string());
                0
            })
        } else {
            self.error_at_current("Expected field number in field row".to_string());
            0
        };
        self.consume_expected(TokenKind::Semicolon, "Expected ; after field number");

        // Enabled flag cell, usually empty.
        self.skip_row_cell();
        self.consume_expected(TokenKind::Semicolon, "Expected ; after field flag cell");

        let name = self.collect_cell_text();
        self.consume_expected(TokenKind::Semicolon, "Expected ; after field name");

        let data_type = if self.check(TokenKind::Semicolon) || self.check(TokenKind::RBrace) {
            None
        } else {
            self.parse_data_type()
        };

        self.skip_to_row_end();

        Some(Field {
            number,
            name,
            data_type,
            start_token: start,
            end_token: self.pos.saturating_sub(1).max(start),
        })
    }

    /// `KEYS { { ; Field1,Field2 ; props } ... }`.
    fn parse_keys_block(&mut self, start: usize) -> KeysBlock {
        self.advance(); // {

        let mut keys = Vec::new();
        loop {
            if self.match_kind(TokenKind::RBrace) {
                break;
            }
            if self.at_eof() {
                self.error_at_previous("Expected } to close KEYS section".to_string());
                break;
            }

            if self.check(TokenKind::LBrace) {
                keys.push(self.parse_key_row());
            } else {
                let message = format!(
                    "Unexpected token {} in KEYS section",
                    self.describe_current()
                );
                self.error_at_current(message);
                self.advance();
            }
        }

        KeysBlock {
            keys,
            start_token: start,
            end_token: self.pos.saturating_sub(1).max(start),
        }
    }

    fn parse_key_row(&mut self) -> TableKey {
        let start = self.pos;
        self.advance(); // {

        // Enabled flag cell.
        self.skip_row_cell();
        self.consume_expected(TokenKind::Semicolon, "Expected ; after key flag cell");

        let mut fields = Vec::new();
        loop {
            let name = self.collect_key_field_name();
            if !name.is_empty() {
                fields.push(name);
            }
            if !self.match_kind(TokenKind::Comma) {
                break;
            }
        }

        self.skip_to_row_end();

        TableKey {
            fields,
            start_token: start,
            end_token: self.pos.saturating_sub(1).max(start),
        }
    }

    /// `CONTROLS { { <id>; <indent>; <kind>; props } ... }`.
    fn parse_controls_block(&mut self, start: usize) -> ControlsBlock {
        self.advance(); // {

        let mut controls = Vec::new();
        loop {
            if self.match_kind(TokenKind::RBrace) {
                break;
            }
            if self.at_eof() {
                self.error_at_previous("Expected } to close CONTROLS section".to_string());
                break;
            }

            if self.check(TokenKind::LBrace) {
                if let Some(control) = self.parse_control_row() {
                    controls.push(control);
                }
            } else {
                let message = format!(
                    "Unexpected token {} in CONTROLS section",
                    self.describe_current()
                );
                self.error_at_current(message);
                self.advance();
            }
        }

        ControlsBlock {
            controls,
            start_token: start,
            end_token: self.pos.saturating_sub(1).max(start),
        }
    }

    fn parse_control_row(&mut self) -> Option<Control> {
        let start = self.pos;
        self.advance(); // {

        let id = if self.check(TokenKind::Integer) {
            let token = self.peek().clone();
            self.advance();
            token.value.parse::<i64>().unwrap_or(0)
        } else {
            self.error_at_current("Expected control ID in control row".to_string());
            0
        };
        self.consume_expected(TokenKind::Semicolon, "Expected ; after control ID");

        // Indentation cell.
        self.skip_row_cell();
        self.consume_expected(TokenKind::Semicolon, "Expected ; after control indent cell");

        let kind = self.collect_cell_text();

        self.skip_to_row_end();

        Some(Control {
            id,
            kind,
            start_token: start,
            end_token: self.pos.saturating_sub(1).max(start),
        })
    }

    /// `CODE { VAR ... procedures ... [BEGIN ... END.] }`.
    fn parse_code_section(&mut self, start: usize) -> CodeSection {
        self.advance(); // {

        let mut section = CodeSection {
            variables: Vec::new(),
            procedures: Vec::new(),
            main_block: None,
            start_token: start,
            end_token: start,
        };

        loop {
            if self.match_kind(TokenKind::RBrace) {
                break;
            }
            if self.at_eof() {
                self.error_at_previous("Expected } to close CODE section".to_string());
                break;
            }

            let before = self.pos;
            if self.check_keyword(Keyword::Var) {
                let mut variables = Vec::new();
                self.parse_var_block(&mut variables);
                section.variables.append(&mut variables);
            } else if self.check_keyword(Keyword::Procedure) || self.check_keyword(Keyword::Local)
            {
                if let Some(procedure) = self.parse_procedure() {
                    section.procedures.push(procedure);
                }
            } else if self.check_keyword(Keyword::Begin) {
                // The object-level trailing block, `BEGIN ... END.` in
                // exports.
                let block = self.parse_block();
                self.match_kind(TokenKind::Dot);
                self.match_kind(TokenKind::Semicolon);
                if section.main_block.replace(block).is_some() {
                    self.error_at_previous(
                        "Duplicate trailing block in CODE section".to_string(),
                    );
                }
            } else {
                let message = format!(
                    "Unexpected token {} in CODE section",
                    self.describe_current()
                );
                self.error_at_current(message);
                self.advance();
            }

            if self.pos == before {
                self.advance();
            }
        }

        section.end_token = self.pos.saturating_sub(1).max(start);
        section
    }

    /// `RDLDATA { }`, the lexer already consumed the content as an opaque
    /// region, so only the braces (and any stray tokens) remain.
    fn parse_rdldata_section(&mut self, start: usize) -> RdlDataSection {
        self.consume_expected(TokenKind::LBrace, "Expected { after RDLDATA");

        let mut depth = 1i64;
        while depth > 0 {
            if self.at_eof() {
                self.error_at_previous("Expected } to close RDLDATA section".to_string());
                break;
            }
            match self.peek().kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth -= 1,
                _ => {}
            }
            self.advance();
        }

        RdlDataSection {
            start_token: start,
            end_token: self.pos.saturating_sub(1).max(start),
        }
    }

    // -------------------------------------------------------------------
    // Row helpers
    // -------------------------------------------------------------------

    /// Skip a row cell without collecting it: everything before the next
    /// `;`, `}` or `,` at zero depth.
    fn skip_row_cell(&mut self) {
        let mut depth = 0i64;
        loop {
            match self.peek().kind {
                TokenKind::Eof => return,
                TokenKind::Semicolon | TokenKind::RBrace if depth == 0 => return,
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = (depth - 1).max(0);
                    self.advance();
                }
                _ => self.advance(),
            }
        }
    }

    /// Collect a row cell as text, preserving source adjacency (so `No.`
    /// stays `No.` while `Search Name` keeps its space).
    fn collect_cell_text(&mut self) -> String {
        let mut text = String::new();
        let mut last_end = usize::MAX;

        loop {
            match self.peek().kind {
                TokenKind::Eof | TokenKind::Semicolon | TokenKind::RBrace => break,
                _ => {
                    let token = self.peek().clone();
                    if !text.is_empty() && token.start > last_end {
                        text.push(' ');
                    }
                    text.push_str(&Self::name_text(&token));
                    last_end = token.end;
                    self.advance();
                }
            }
        }

        text
    }

    /// Like [`collect_cell_text`](Self::collect_cell_text) but also stops
    /// at `,`, for comma-separated key field lists.
    fn collect_key_field_name(&mut self) -> String {
        let mut text = String::new();
        let mut last_end = usize::MAX;

        loop {
            match self.peek().kind {
                TokenKind::Eof
                | TokenKind::Semicolon
                | TokenKind::RBrace
                | TokenKind::Comma => break,
                _ => {
                    let token = self.peek().clone();
                    if !text.is_empty() && token.start > last_end {
                        text.push(' ');
                    }
                    text.push_str(&Self::name_text(&token));
                    last_end = token.end;
                    self.advance();
                }
            }
        }

        text
    }

    /// Consume the remainder of a `{ ... }` row including its closing `}`.
    fn skip_to_row_end(&mut self) {
        let mut depth = 0i64;
        loop {
            match self.peek().kind {
                TokenKind::Eof => {
                    self.error_at_previous("Expected } to close row".to_string());
                    return;
                }
                TokenKind::LBrace => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::RBrace => {
                    self.advance();
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                }
                _ => self.advance(),
            }
        }
    }

    /// Skip an entire `{ ... }` body after a failed object header (recovery
    /// strategy 3, object scale).
    fn skip_balanced_object(&mut self) {
        while !self.at_eof() && !self.check(TokenKind::LBrace) {
            self.advance();
        }
        if self.at_eof() {
            return;
        }
        let mut depth = 0i64;
        while !self.at_eof() {
            match self.peek().kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        return;
                    }
                }
                _ => {}
            }
            self.advance();
        }
    }
}

fn object_kind_of(keyword: Keyword) -> ObjectKind {
    match keyword {
        Keyword::Table => ObjectKind::Table,
        Keyword::Codeunit => ObjectKind::Codeunit,
        Keyword::Page => ObjectKind::Page,
        Keyword::Report => ObjectKind::Report,
        Keyword::XmlPort => ObjectKind::XmlPort,
        Keyword::Query => ObjectKind::Query,
        _ => ObjectKind::MenuSuite,
    }
}
