//! Interned lexical data.
//!
//! Every token is a kind tag plus either a row in a byte arena (strings and
//! the canonical text of numbers) or an index into [`KEYWORDS`]. Equal
//! strings are not deduplicated; each allocation gets a fresh row.

use serde::Serialize;

use crate::arena::{define_handle, Buffer, RowArena, RowParts};
use crate::constants::KEYWORDS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Integer,
    Real,
    Keyword,
}

define_handle!(
    /// Handle to an interned token.
    TokenRef
);

#[derive(Debug, Clone, Copy)]
struct Token {
    kind: DataType,
    slot: usize,
}

/// Position to rewind a [`TokenTable`] to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenMark {
    tokens: usize,
    rows: usize,
}

#[derive(Debug, Default)]
pub struct TokenTable {
    tokens: Buffer<Token>,
    data: RowArena<u8>,
}

#[derive(Debug, Default)]
pub struct TokenParts {
    tokens: Vec<Token>,
    data: RowParts<u8>,
}

impl TokenTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(parts: TokenParts) -> Self {
        Self {
            tokens: Buffer::from_vec(parts.tokens),
            data: RowArena::from_parts(parts.data),
        }
    }

    pub fn into_parts(self) -> TokenParts {
        TokenParts {
            tokens: self.tokens.release(),
            data: self.data.into_parts(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Copies `data` into a fresh row tagged with `kind`.
    ///
    /// # Panics
    ///
    /// Panics for [`DataType::Keyword`]; keywords go through
    /// [`TokenTable::allocate_keyword_token`].
    pub fn allocate_token(&mut self, kind: DataType, data: &str) -> TokenRef {
        assert!(
            kind != DataType::Keyword,
            "keyword tokens reference the static keyword table"
        );
        let slot = self.data.push_row_from(data.as_bytes());
        TokenRef::new(self.tokens.push(Token { kind, slot }))
    }

    pub fn allocate_keyword_token(&mut self, index: usize) -> TokenRef {
        assert!(index < KEYWORDS.len(), "keyword index {index} out of range");
        TokenRef::new(self.tokens.push(Token {
            kind: DataType::Keyword,
            slot: index,
        }))
    }

    pub fn get_token_data(&self, token: TokenRef) -> &str {
        let header = self.tokens[token.index()];
        match header.kind {
            DataType::Keyword => KEYWORDS[header.slot],
            _ => std::str::from_utf8(self.data.row(header.slot))
                .expect("token rows must hold valid UTF-8"),
        }
    }

    #[inline]
    pub fn get_token_kind(&self, token: TokenRef) -> DataType {
        self.tokens[token.index()].kind
    }

    pub fn mark(&self) -> TokenMark {
        TokenMark {
            tokens: self.tokens.len(),
            rows: self.data.rows_count(),
        }
    }

    /// Forgets every token allocated after `mark` was taken.
    pub fn rewind(&mut self, mark: TokenMark) {
        self.tokens.truncate(mark.tokens);
        self.data.truncate_rows(mark.rows);
    }

    pub fn clear(&mut self) {
        self.tokens.clear();
        self.data.clear();
    }
}
