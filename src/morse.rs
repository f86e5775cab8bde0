use std::cmp::Ordering;
use std::fmt::Write;
use std::marker::PhantomData;
use std::ops::BitOr;

use itertools::Itertools;
use tracing::{debug, instrument};

use crate::avl_tree::{AvlTree, Insertion};
use crate::bitree::NodeId;
use crate::error::{MorseError, MorseResult};

/// Everything the codec needs to know about an alphabet.
pub trait AlphabetT {
    /// Every character of the alphabet in tree order (in-order traversal).
    const PRIORITY: &'static str;
    /// Order in which `PRIORITY` is inserted. The resulting shape depends
    /// on it, so it is not derived from `PRIORITY`.
    const INSERTION_ORDER: &'static str;
    /// Placeholders that keep the tree shape; never encoded.
    const FILLERS: &'static [char];
    /// Fillers drawn as blanks by [`Morse::render`].
    const BLANKS: &'static [char];

    const DIT: char;
    const DAH: char;
    const SYMBOL_SEPARATOR: char;
    const CHAR_SEPARATOR: &'static str;
    const WORD_SEPARATOR: &'static str;

    const PROSIGN_START: &'static str;
    const PROSIGN_END: &'static str;
}

/// International Morse code.
pub struct Itu;

impl AlphabetT for Itu {
    const PRIORITY: &'static str = "5H4SV3IFU[2ELR+]APWJ1~6B=D/XNCKYT7ZGQM8(O9)0";
    const INSERTION_ORDER: &'static str = "~ETIAMNSURWDKGOHVFLPJBXYCZQ()543[2]+16=/7890";
    const FILLERS: &'static [char] = &['~', '(', ')', '[', ']'];
    const BLANKS: &'static [char] = &['(', ')', '[', ']'];

    const DIT: char = '.';
    const DAH: char = '-';
    const SYMBOL_SEPARATOR: char = ' ';
    // spacing is 3 and 7 units, one of which follows the last symbol
    const CHAR_SEPARATOR: &'static str = "  ";
    const WORD_SEPARATOR: &'static str = "      ";

    // <CT>: start of transmission, <SK>: end of work
    const PROSIGN_START: &'static str = "CT";
    const PROSIGN_END: &'static str = "SK";
}

pub type Compare = fn(&char, &char) -> Ordering;

/// Position of `c` (case-insensitive) in the alphabet.
pub fn rank<A: AlphabetT>(c: char) -> Option<usize> {
    let c = c.to_ascii_uppercase();
    A::PRIORITY.chars().position(|p| p == c)
}

/// Characters outside the alphabet sort after every known one.
pub fn compare<A: AlphabetT>(a: &char, b: &char) -> Ordering {
    let ra = rank::<A>(*a).unwrap_or(usize::MAX);
    let rb = rank::<A>(*b).unwrap_or(usize::MAX);
    ra.cmp(&rb)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Flags {
    pub separators: bool,
    pub prosigns: bool,
}

impl Flags {
    pub const NONE: Flags = Flags {
        separators: false,
        prosigns: false,
    };
    pub const SEPARATORS: Flags = Flags {
        separators: true,
        prosigns: false,
    };
    pub const PROSIGNS: Flags = Flags {
        separators: false,
        prosigns: true,
    };
    pub const ALL: Flags = Flags {
        separators: true,
        prosigns: true,
    };
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags {
            separators: self.separators || rhs.separators,
            prosigns: self.prosigns || rhs.prosigns,
        }
    }
}

/// Encoder/decoder walking a Morse code tree: dit is left, dah is right.
pub struct Morse<A: AlphabetT> {
    tree: AvlTree<char, Compare>,
    alphabet: PhantomData<A>,
}

pub type Standard = Morse<Itu>;

impl<A: AlphabetT> Morse<A> {
    #[instrument(level = "debug")]
    pub fn new() -> MorseResult<Self> {
        let mut tree = AvlTree::new(compare::<A> as Compare);
        for c in A::INSERTION_ORDER.chars() {
            if tree.insert(c)?.is_duplicate() {
                debug!(?c, "ignoring repeated character");
            }
        }
        debug!(size = tree.size(), "built code tree");
        Ok(Morse {
            tree,
            alphabet: PhantomData,
        })
    }

    pub fn tree(&self) -> &AvlTree<char, Compare> {
        &self.tree
    }

    pub fn is_encodable(c: char) -> bool {
        !A::FILLERS.contains(&c) && rank::<A>(c).is_some()
    }

    /// Code of a single character. Fillers have no code.
    pub fn encode_char(&self, c: char, separators: bool) -> MorseResult<String> {
        if !Self::is_encodable(c) {
            return Err(MorseError::Unencodable(c));
        }
        let mut out = String::new();
        self.encode_char_into(&mut out, c, separators)?;
        Ok(out)
    }

    fn encode_char_into(&self, out: &mut String, c: char, separators: bool) -> MorseResult<()> {
        let mut cur = self.tree.root();
        while let Some(node) = cur {
            let symbol = match (self.tree.compare())(&c, self.tree.data(node)) {
                Ordering::Less => {
                    cur = self.tree.left(node);
                    A::DIT
                }
                Ordering::Greater => {
                    cur = self.tree.right(node);
                    A::DAH
                }
                Ordering::Equal if self.tree.is_hidden(node) => break,
                Ordering::Equal => return Ok(()),
            };
            out.push(symbol);
            if separators {
                out.push(A::SYMBOL_SEPARATOR);
            }
        }
        Err(MorseError::Unencodable(c))
    }

    // prosigns are sent without inter-character spacing
    fn encode_prosign(&self, out: &mut String, prosign: &str, flags: Flags) -> MorseResult<()> {
        prosign
            .chars()
            .try_for_each(|c| self.encode_char_into(out, c, flags.separators))
    }

    /// Encodes `src`, skipping characters outside the alphabet.
    #[instrument(level = "trace", skip(self))]
    pub fn encode(&self, src: &str, flags: Flags) -> MorseResult<String> {
        let mut out = String::new();
        if flags.prosigns {
            self.encode_prosign(&mut out, A::PROSIGN_START, flags)?;
            if flags.separators {
                out.push_str(A::WORD_SEPARATOR);
            }
        }

        let mut chars = src.chars().peekable();
        while let Some(c) = chars.next() {
            if A::FILLERS.contains(&c) {
                continue;
            }
            if flags.separators && c == ' ' {
                out.push_str(A::WORD_SEPARATOR);
                continue;
            }
            if rank::<A>(c).is_none() {
                continue;
            }
            self.encode_char_into(&mut out, c, flags.separators)?;
            if flags.separators && chars.peek().is_some_and(|&next| next != ' ') {
                out.push_str(A::CHAR_SEPARATOR);
            }
        }

        if flags.prosigns {
            if flags.separators {
                out.push_str(A::WORD_SEPARATOR);
            }
            self.encode_prosign(&mut out, A::PROSIGN_END, flags)?;
        }
        Ok(out)
    }

    /// Decodes the code of a single character.
    pub fn decode_char(&self, code: &str) -> MorseResult<char> {
        let invalid = || MorseError::InvalidCode(code.to_string());
        let mut node = self.tree.root().ok_or_else(invalid)?;
        for symbol in code.chars() {
            let next = if symbol == A::SYMBOL_SEPARATOR {
                continue;
            } else if symbol == A::DIT {
                self.tree.left(node)
            } else if symbol == A::DAH {
                self.tree.right(node)
            } else {
                None
            };
            node = next.ok_or_else(invalid)?;
        }
        if self.tree.is_hidden(node) {
            return Err(invalid());
        }
        Ok(*self.tree.data(node))
    }

    fn flush_token(&self, token: &mut String, out: &mut String) {
        if token.is_empty() {
            return;
        }
        match self.decode_char(token) {
            Ok(c) => out.push(c),
            Err(err) => debug!(%err, "dropping token"),
        }
        token.clear();
    }

    /// Decodes a message. Undecodable characters are dropped and anything
    /// that is not a symbol or a separator is ignored.
    ///
    /// With separators the message is expected in the spacing `encode`
    /// produces; without them one space ends a character and two or more
    /// end a word.
    #[instrument(level = "trace", skip(self))]
    pub fn decode(&self, src: &str, flags: Flags) -> String {
        let mut out = String::new();
        let mut token = String::new();
        let mut rest = src;

        while let Some(c) = rest.chars().next() {
            if flags.separators {
                if let Some(after) = rest.strip_prefix(A::WORD_SEPARATOR) {
                    self.flush_token(&mut token, &mut out);
                    out.push(' ');
                    rest = after;
                    continue;
                }
                if let Some(after) = rest.strip_prefix(A::CHAR_SEPARATOR) {
                    self.flush_token(&mut token, &mut out);
                    rest = after;
                    continue;
                }
            } else if c == ' ' {
                self.flush_token(&mut token, &mut out);
                let after = rest.trim_start_matches(' ');
                if rest.len() - after.len() >= 2 {
                    out.push(' ');
                }
                rest = after;
                continue;
            }

            if c == A::DIT || c == A::DAH || c == A::SYMBOL_SEPARATOR {
                token.push(c);
            }
            rest = &rest[c.len_utf8()..];
        }
        self.flush_token(&mut token, &mut out);

        out.trim().to_string()
    }

    /// Stops encoding and decoding `c` without touching the tree shape.
    pub fn forget(&mut self, c: char) -> MorseResult<()> {
        if !Self::is_encodable(c) {
            return Err(MorseError::Unencodable(c));
        }
        self.tree.remove(&c)?;
        Ok(())
    }

    /// Undoes [`Morse::forget`].
    pub fn learn(&mut self, c: char) -> MorseResult<Insertion<char>> {
        if !Self::is_encodable(c) {
            return Err(MorseError::Unencodable(c));
        }
        Ok(self.tree.insert(c.to_ascii_uppercase())?)
    }

    /// Code of every encodable character, in tree order.
    pub fn table(&self) -> Vec<(char, String)> {
        A::PRIORITY
            .chars()
            .filter(|&c| Self::is_encodable(c))
            .filter_map(|c| self.encode_char(c, false).ok().map(|code| (c, code)))
            .collect_vec()
    }

    /// Sideways dump of the tree, dah branches on top. Hidden characters
    /// are shown in brackets and the bracket fillers as blanks.
    pub fn render(&self) -> String {
        fn traverse<A: AlphabetT>(
            tree: &AvlTree<char, Compare>,
            idx: Option<NodeId>,
            level: usize,
            out: &mut String,
        ) {
            let Some(i) = idx else {
                return;
            };
            traverse::<A>(tree, tree.right(i), level + 4, out);
            let c = *tree.data(i);
            let c = if A::BLANKS.contains(&c) { ' ' } else { c };
            let (open, close) = if tree.is_hidden(i) {
                ('[', ']')
            } else {
                ('{', '}')
            };
            writeln!(out, "{:>level$} {open}{c}{close}", "->")
                .expect("writing to String cannot fail");
            traverse::<A>(tree, tree.left(i), level + 4, out);
        }

        let mut out = String::new();
        traverse::<A>(&self.tree, self.tree.root(), 2, &mut out);
        out
    }
}
