//! Parser and writer for bfsat formula archives.
//!
//! An archive stores a sequence of formulas in a DIMACS-like text format. Each formula is
//! preceded by a tag comment naming its problem id, the number of literals per clause and the
//! result of checking it:
//!
//! ```text
//! c 3 2 S
//! p cnf 4 2
//! 1,-2,0
//! 3,4,0
//! ```
//!
//! Every literal of a clause line is followed by a comma and the line ends in `0`. The parser
//! also accepts whitespace separated plain DIMACS CNF, with or without tags.

use std::{borrow::Borrow, fmt, io, mem::replace};

use bfsat_formula::{CnfFormula, Lit, Var};

use anyhow::Error;
use thiserror::Error;

/// Possible errors while parsing an archive.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("line {}: Unexpected character in archive input: '{}'", line, unexpected)]
    UnexpectedInput { line: usize, unexpected: char },
    #[error(
        "line {}: Literal index is too large: {}{}...",
        line,
        index,
        final_digit
    )]
    LiteralTooLarge {
        line: usize,
        index: usize,
        final_digit: usize,
    },
    #[error("line {}: Invalid header syntax: {}", line, header)]
    InvalidHeader { line: usize, header: String },
    #[error("line {}: Unterminated clause", line)]
    UnterminatedClause { line: usize },
    #[error(
        "formula {}: Formula has {} variables while the header specifies {} variables",
        entry,
        var_count,
        header_var_count
    )]
    VarCount {
        entry: usize,
        var_count: usize,
        header_var_count: usize,
    },
    #[error(
        "formula {}: Formula has {} clauses while the header specifies {} clauses",
        entry,
        clause_count,
        header_clause_count
    )]
    ClauseCount {
        entry: usize,
        clause_count: usize,
        header_clause_count: usize,
    },
    #[error("Parser invoked after a previous error")]
    PreviousError,
}

/// Result recorded for a formula in its tag line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResultTag {
    /// `S`
    Satisfiable,
    /// `U`
    Unsatisfiable,
    /// `?`, the result was not recorded.
    Unknown,
}

impl ResultTag {
    pub fn from_result(satisfied: bool) -> ResultTag {
        if satisfied {
            ResultTag::Satisfiable
        } else {
            ResultTag::Unsatisfiable
        }
    }

    pub fn as_char(self) -> char {
        match self {
            ResultTag::Satisfiable => 'S',
            ResultTag::Unsatisfiable => 'U',
            ResultTag::Unknown => '?',
        }
    }

    pub fn parse(value: &str) -> Option<ResultTag> {
        match value {
            "S" => Some(ResultTag::Satisfiable),
            "U" => Some(ResultTag::Unsatisfiable),
            "?" => Some(ResultTag::Unknown),
            _ => None,
        }
    }

    /// The recorded result, if any.
    pub fn satisfied(self) -> Option<bool> {
        match self {
            ResultTag::Satisfiable => Some(true),
            ResultTag::Unsatisfiable => Some(false),
            ResultTag::Unknown => None,
        }
    }
}

impl fmt::Display for ResultTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Contents of a `c <problem id> <literals per clause> <S|U|?>` tag line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EntryTag {
    pub problem_id: u64,
    pub lits_per_clause: usize,
    pub result: ResultTag,
}

/// Variable and clause count present in a `p cnf` header.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DimacsHeader {
    pub var_count: usize,
    pub clause_count: usize,
}

/// A single formula of an archive.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArchiveEntry {
    pub tag: Option<EntryTag>,
    pub header: Option<DimacsHeader>,
    pub formula: CnfFormula,
}

impl ArchiveEntry {
    /// An entry with a tag and a header matching the formula.
    pub fn new(tag: EntryTag, formula: CnfFormula) -> ArchiveEntry {
        ArchiveEntry {
            tag: Some(tag),
            header: Some(DimacsHeader {
                var_count: formula.var_count(),
                clause_count: formula.len(),
            }),
            formula,
        }
    }
}

/// Parser for archive files.
///
/// Consumes the input in chunks and collects completed entries, which can be taken out while
/// parsing continues.
pub struct ArchiveParser {
    entries: Vec<ArchiveEntry>,
    current: ArchiveEntry,
    finished_entries: usize,
    clause_count: usize,
    partial_clause: Vec<Lit>,

    line_number: usize,
    partial_lit: usize,
    negate_next_lit: bool,

    in_lit: bool,
    in_comment_or_header: bool,
    in_header: bool,
    start_of_line: bool,
    error: bool,

    line: Vec<u8>,
}

impl Default for ArchiveParser {
    fn default() -> ArchiveParser {
        ArchiveParser::new()
    }
}

impl ArchiveParser {
    /// Create a new archive parser.
    pub fn new() -> ArchiveParser {
        ArchiveParser {
            entries: vec![],
            current: ArchiveEntry::default(),
            finished_entries: 0,
            clause_count: 0,
            partial_clause: vec![],

            line_number: 1,
            partial_lit: 0,
            negate_next_lit: false,

            in_lit: false,
            in_comment_or_header: false,
            in_header: false,
            start_of_line: true,
            error: false,

            line: vec![],
        }
    }

    /// Parse a whole archive.
    pub fn parse(input: impl io::Read) -> Result<Vec<ArchiveEntry>, Error> {
        let mut entries = vec![];
        Self::parse_incremental(input, |parser| {
            entries.extend(parser.take_entries());
            Ok(())
        })?;
        Ok(entries)
    }

    /// Parse the given input incrementally.
    ///
    /// The callback is invoked after every chunk and once more after the end of input. It can
    /// process completed formulas by calling [`take_entries`](ArchiveParser::take_entries).
    pub fn parse_incremental(
        input: impl io::Read,
        mut callback: impl FnMut(&mut ArchiveParser) -> Result<(), Error>,
    ) -> Result<ArchiveParser, Error> {
        use io::BufRead;

        let mut buffer = io::BufReader::new(input);
        let mut parser = Self::new();

        loop {
            let data = buffer.fill_buf()?;
            if data.is_empty() {
                break;
            }
            parser.parse_chunk(data)?;
            let len = data.len();
            buffer.consume(len);

            callback(&mut parser)?;
        }
        parser.eof()?;
        callback(&mut parser)?;

        Ok(parser)
    }

    /// Parse a chunk of input.
    ///
    /// After the last chunk call [`eof`](ArchiveParser::eof). Once this returned an error the
    /// parser refuses further input.
    pub fn parse_chunk(&mut self, chunk: &[u8]) -> Result<(), ParserError> {
        if self.error {
            return Err(ParserError::PreviousError);
        }
        let result = self.parse_bytes(chunk);
        self.error = result.is_err();
        result
    }

    /// Finish parsing the input, completing the last entry.
    pub fn eof(&mut self) -> Result<(), ParserError> {
        if self.error {
            return Err(ParserError::PreviousError);
        }
        let result = self.finish_input();
        self.error = result.is_err();
        result
    }

    /// Returns the entries completed since the last call to this method.
    pub fn take_entries(&mut self) -> Vec<ArchiveEntry> {
        replace(&mut self.entries, vec![])
    }

    /// Number of entries completed so far, including those already taken.
    pub fn entry_count(&self) -> usize {
        self.finished_entries
    }

    fn parse_bytes(&mut self, chunk: &[u8]) -> Result<(), ParserError> {
        for &byte in chunk.iter() {
            match byte {
                b'\n' | b'\r' if self.in_comment_or_header => {
                    self.finish_line()?;
                    self.start_of_line = true
                }
                _ if self.in_comment_or_header => self.line.push(byte),
                b'0'..=b'9' => {
                    self.in_lit = true;
                    let digit = (byte - b'0') as usize;

                    const CAN_OVERFLOW: usize = Var::max_count() / 10;
                    const OVERFLOW_DIGIT: usize = Var::max_count() % 10;

                    if CAN_OVERFLOW <= self.partial_lit {
                        let carry = (digit <= OVERFLOW_DIGIT) as usize;

                        if CAN_OVERFLOW + carry <= self.partial_lit {
                            return Err(ParserError::LiteralTooLarge {
                                line: self.line_number,
                                index: self.partial_lit,
                                final_digit: digit,
                            });
                        }
                    }

                    self.partial_lit = self.partial_lit * 10 + digit;

                    self.start_of_line = false
                }
                b'-' if !self.negate_next_lit && !self.in_lit => {
                    self.negate_next_lit = true;
                    self.start_of_line = false
                }
                b' ' | b'\t' | b',' | b'\n' | b'\r' if !self.negate_next_lit || self.in_lit => {
                    self.finish_literal();
                    self.negate_next_lit = false;
                    self.in_lit = false;
                    self.partial_lit = 0;
                    self.start_of_line = byte == b'\n' || byte == b'\r';
                }
                b'c' | b'p' if self.start_of_line => {
                    self.in_comment_or_header = true;
                    self.in_header = byte == b'p';
                    self.line.push(byte);
                }
                _ => {
                    return Err(ParserError::UnexpectedInput {
                        line: self.line_number,
                        unexpected: byte as char,
                    });
                }
            }
            if byte == b'\n' {
                self.line_number += 1;
            }
        }

        Ok(())
    }

    fn finish_input(&mut self) -> Result<(), ParserError> {
        if self.in_comment_or_header {
            self.finish_line()?;
        }

        self.finish_literal();
        self.in_lit = false;
        self.partial_lit = 0;

        if self.entry_started() {
            self.finish_entry()?;
        }

        Ok(())
    }

    fn finish_literal(&mut self) {
        if self.in_lit {
            if self.partial_lit == 0 {
                self.current.formula.add_clause(&self.partial_clause);
                self.partial_clause.clear();
                self.clause_count += 1;
            } else {
                self.partial_clause
                    .push(Var::from_dimacs(self.partial_lit as isize).lit(!self.negate_next_lit));
            }
        }
    }

    fn entry_started(&self) -> bool {
        self.current.tag.is_some()
            || self.current.header.is_some()
            || self.clause_count > 0
            || !self.partial_clause.is_empty()
    }

    fn finish_entry(&mut self) -> Result<(), ParserError> {
        if !self.partial_clause.is_empty() {
            return Err(ParserError::UnterminatedClause {
                line: self.line_number,
            });
        }

        if let Some(header) = self.current.header {
            let entry = self.finished_entries + 1;
            let var_count = self.current.formula.var_count();
            if var_count != header.var_count {
                return Err(ParserError::VarCount {
                    entry,
                    var_count,
                    header_var_count: header.var_count,
                });
            }

            if self.clause_count != header.clause_count {
                return Err(ParserError::ClauseCount {
                    entry,
                    clause_count: self.clause_count,
                    header_clause_count: header.clause_count,
                });
            }
        }

        let entry = replace(&mut self.current, ArchiveEntry::default());
        self.entries.push(entry);
        self.finished_entries += 1;
        self.clause_count = 0;

        Ok(())
    }

    fn finish_line(&mut self) -> Result<(), ParserError> {
        let line = String::from_utf8_lossy(&self.line).into_owned();
        self.line.clear();
        self.in_comment_or_header = false;

        if self.in_header {
            self.in_header = false;
            self.parse_header_line(line)
        } else {
            self.parse_comment_line(line)
        }
    }

    /// Comments whose first word is a number are tags, all others are ignored.
    /// A comment is a tag only if it holds exactly a problem id, a clause width and a result.
    /// Anything else is an ordinary comment.
    fn parse_comment_line(&mut self, line: String) -> Result<(), ParserError> {
        let mut values = line[1..].split_whitespace();

        let problem_id = values.next().and_then(|value| str::parse::<u64>(value).ok());
        let lits_per_clause = values.next().and_then(|value| str::parse::<usize>(value).ok());
        let result = values.next().and_then(ResultTag::parse);

        if let (Some(problem_id), Some(lits_per_clause), Some(result), None) =
            (problem_id, lits_per_clause, result, values.next())
        {
            if self.entry_started() {
                self.finish_entry()?;
            }
            self.current.tag = Some(EntryTag {
                problem_id,
                lits_per_clause,
                result,
            });
        }
        Ok(())
    }

    fn parse_header_line(&mut self, header_line: String) -> Result<(), ParserError> {
        if !header_line.starts_with("p ") {
            return self.invalid_header(header_line);
        }

        let mut header_values = header_line[2..].split_whitespace();

        if header_values.next() != Some("cnf") {
            return self.invalid_header(header_line);
        }

        let var_count: usize = match header_values
            .next()
            .and_then(|value| str::parse(value).ok())
        {
            None => return self.invalid_header(header_line),
            Some(value) => value,
        };

        if var_count > Var::max_count() {
            return Err(ParserError::LiteralTooLarge {
                line: self.line_number,
                index: var_count / 10,
                final_digit: var_count % 10,
            });
        }

        let clause_count: usize = match header_values
            .next()
            .and_then(|value| str::parse(value).ok())
        {
            None => return self.invalid_header(header_line),
            Some(value) => value,
        };

        if header_values.next().is_some() {
            return self.invalid_header(header_line);
        }

        // A second header, or a header after clauses, starts the next formula.
        if self.current.header.is_some() || self.clause_count > 0 {
            self.finish_entry()?;
        }

        self.current.header = Some(DimacsHeader {
            var_count,
            clause_count,
        });

        self.current.formula.set_var_count(var_count);

        Ok(())
    }

    fn invalid_header(&mut self, header_line: String) -> Result<(), ParserError> {
        Err(ParserError::InvalidHeader {
            line: self.line_number,
            header: header_line,
        })
    }
}

/// Write a `c <problem id> <literals per clause> <S|U|?>` tag line.
pub fn write_tag(target: &mut impl io::Write, tag: EntryTag) -> io::Result<()> {
    writeln!(
        target,
        "c {problem_id} {lits_per_clause} {result}",
        problem_id = tag.problem_id,
        lits_per_clause = tag.lits_per_clause,
        result = tag.result
    )
}

/// Write a `p cnf` header.
pub fn write_header(target: &mut impl io::Write, header: DimacsHeader) -> io::Result<()> {
    writeln!(
        target,
        "p cnf {var_count} {clause_count}",
        var_count = header.var_count,
        clause_count = header.clause_count
    )
}

/// Write clauses as comma terminated literal lines ending in `0`.
pub fn write_clauses(
    target: &mut impl io::Write,
    clauses: impl IntoIterator<Item = impl IntoIterator<Item = impl Borrow<Lit>>>,
) -> io::Result<()> {
    for clause in clauses.into_iter() {
        for lit in clause.into_iter() {
            itoa::write(&mut *target, lit.borrow().to_dimacs())?;
            target.write_all(b",")?;
        }
        target.write_all(b"0\n")?;
    }
    Ok(())
}

/// Write a complete archive entry.
///
/// Without a stored header, one is derived from the formula.
pub fn write_entry(target: &mut impl io::Write, entry: &ArchiveEntry) -> io::Result<()> {
    if let Some(tag) = entry.tag {
        write_tag(&mut *target, tag)?;
    }
    let header = entry.header.unwrap_or(DimacsHeader {
        var_count: entry.formula.var_count(),
        clause_count: entry.formula.len(),
    });
    write_header(&mut *target, header)?;
    write_clauses(&mut *target, entry.formula.iter())
}
