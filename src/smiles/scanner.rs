//! SMILES tokenizer.
//!
//! Stereo marks (`@`, `@@`, `/`, `\`) and atom classes are consumed so that
//! annotated input parses, but they carry no meaning for graph conversion.

use crate::element::Element;
use crate::smiles::error::SmilesError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Atom(AtomToken),
    Bond(BondToken),
    RingClosure { digit: u16, pos: usize },
    OpenParen(usize),
    CloseParen(usize),
    Dot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomToken {
    pub element: Element,
    pub is_aromatic: bool,
    pub isotope: u16,
    /// `Some` for bracket atoms, whose hydrogen count is explicit.
    pub hcount: Option<u8>,
    pub charge: i8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondToken {
    Single,
    Double,
    Triple,
    Aromatic,
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, SmilesError> {
    let mut scanner = Scanner {
        chars: input.chars().collect(),
        pos: 0,
    };
    let mut tokens = Vec::new();
    while let Some(tok) = scanner.next_token()? {
        tokens.push(tok);
    }
    Ok(tokens)
}

struct Scanner {
    chars: Vec<char>,
    pos: usize,
}

impl Scanner {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn number(&mut self) -> Option<u32> {
        let start = self.pos;
        let mut value: u32 = 0;
        while let Some(d) = self.peek().and_then(|c| c.to_digit(10)) {
            value = value.saturating_mul(10).saturating_add(d);
            self.pos += 1;
        }
        (self.pos > start).then_some(value)
    }

    fn next_token(&mut self) -> Result<Option<Token>, SmilesError> {
        let pos = self.pos;
        let Some(ch) = self.bump() else {
            return Ok(None);
        };
        let token = match ch {
            '[' => Token::Atom(self.bracket_atom(pos)?),
            'B' if self.eat('r') => Token::Atom(bare(Element::Br, false)),
            'C' if self.eat('l') => Token::Atom(bare(Element::Cl, false)),
            'B' => Token::Atom(bare(Element::B, false)),
            'C' => Token::Atom(bare(Element::C, false)),
            'N' => Token::Atom(bare(Element::N, false)),
            'O' => Token::Atom(bare(Element::O, false)),
            'P' => Token::Atom(bare(Element::P, false)),
            'S' => Token::Atom(bare(Element::S, false)),
            'F' => Token::Atom(bare(Element::F, false)),
            'I' => Token::Atom(bare(Element::I, false)),
            'b' => Token::Atom(bare(Element::B, true)),
            'c' => Token::Atom(bare(Element::C, true)),
            'n' => Token::Atom(bare(Element::N, true)),
            'o' => Token::Atom(bare(Element::O, true)),
            'p' => Token::Atom(bare(Element::P, true)),
            's' => Token::Atom(bare(Element::S, true)),
            '-' | '/' | '\\' => Token::Bond(BondToken::Single),
            '=' => Token::Bond(BondToken::Double),
            '#' => Token::Bond(BondToken::Triple),
            ':' => Token::Bond(BondToken::Aromatic),
            '(' => Token::OpenParen(pos),
            ')' => Token::CloseParen(pos),
            '.' => Token::Dot,
            '%' => {
                let (Some(d1), Some(d2)) = (
                    self.peek().and_then(|c| c.to_digit(10)),
                    self.peek_at(1).and_then(|c| c.to_digit(10)),
                ) else {
                    return Err(SmilesError::UnexpectedChar { pos, ch });
                };
                self.pos += 2;
                Token::RingClosure {
                    digit: (d1 * 10 + d2) as u16,
                    pos,
                }
            }
            d @ '0'..='9' => Token::RingClosure {
                digit: d as u16 - '0' as u16,
                pos,
            },
            _ => return Err(SmilesError::UnexpectedChar { pos, ch }),
        };
        Ok(Some(token))
    }

    /// `[` isotope? symbol chirality? hcount? charge? class? `]`
    fn bracket_atom(&mut self, start: usize) -> Result<AtomToken, SmilesError> {
        let isotope = self.number().map(|n| n.min(u16::MAX as u32) as u16).unwrap_or(0);
        let (element, is_aromatic) = self.bracket_element(start)?;

        while self.eat('@') {}

        let hcount = if self.eat('H') {
            self.peek()
                .and_then(|c| c.to_digit(10))
                .map(|d| {
                    self.pos += 1;
                    d as u8
                })
                .unwrap_or(1)
        } else {
            0
        };

        let charge = self.charge(start)?;

        if self.eat(':') {
            self.number();
        }

        if !self.eat(']') {
            return Err(SmilesError::UnclosedBracket { pos: start });
        }

        Ok(AtomToken {
            element,
            is_aromatic,
            isotope,
            hcount: Some(hcount),
            charge,
        })
    }

    fn bracket_element(&mut self, start: usize) -> Result<(Element, bool), SmilesError> {
        const AROMATIC: [(&str, Element); 8] = [
            ("se", Element::Se),
            ("te", Element::Te),
            ("as", Element::As),
            ("b", Element::B),
            ("c", Element::C),
            ("n", Element::N),
            ("o", Element::O),
            ("p", Element::P),
        ];

        let Some(first) = self.peek() else {
            return Err(SmilesError::UnclosedBracket { pos: start });
        };

        if first.is_ascii_lowercase() {
            let second = self.peek_at(1);
            for (pat, elem) in AROMATIC {
                let mut pc = pat.chars();
                let matches = pc.next() == Some(first)
                    && match pc.next() {
                        Some(p2) => second == Some(p2),
                        None => true,
                    };
                if matches {
                    self.pos += pat.len();
                    return Ok((elem, true));
                }
            }
            if first == 's' {
                self.pos += 1;
                return Ok((Element::S, true));
            }
        }

        if first.is_ascii_uppercase() {
            if let Some(second) = self.peek_at(1).filter(|c| c.is_ascii_lowercase()) {
                if let Some(e) = Element::from_symbol(&format!("{first}{second}")) {
                    self.pos += 2;
                    return Ok((e, false));
                }
            }
            if let Some(e) = Element::from_symbol(&first.to_string()) {
                self.pos += 1;
                return Ok((e, false));
            }
        }

        Err(SmilesError::InvalidElement {
            pos: self.pos,
            text: first.to_string(),
        })
    }

    fn charge(&mut self, start: usize) -> Result<i8, SmilesError> {
        let sign: i8 = match self.peek() {
            Some('+') => 1,
            Some('-') => -1,
            _ => return Ok(0),
        };
        let symbol = if sign > 0 { '+' } else { '-' };
        self.pos += 1;

        let magnitude = if let Some(n) = self.number() {
            n
        } else {
            let mut repeats = 1u32;
            while self.eat(symbol) {
                repeats += 1;
            }
            repeats
        };
        i8::try_from(magnitude)
            .map(|m| m * sign)
            .map_err(|_| SmilesError::InvalidCharge { pos: start })
    }
}

fn bare(element: Element, is_aromatic: bool) -> AtomToken {
    AtomToken {
        element,
        is_aromatic,
        isotope: 0,
        hcount: None,
        charge: 0,
    }
}
