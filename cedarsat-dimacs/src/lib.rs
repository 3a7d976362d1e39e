//! Reading and writing of DIMACS CNF files for the cedarsat SAT solver.

use std::{borrow::Borrow, io, mem::replace};

use cedarsat_formula::{CnfFormula, Lit, Var};

use anyhow::Error;
use thiserror::Error;

/// Ways in which DIMACS CNF input can be rejected.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("line {line}: the character '{unexpected}' is not valid DIMACS CNF")]
    UnexpectedInput { line: usize, unexpected: char },
    #[error("line {line}: literal {value} is beyond the supported variable range")]
    LiteralTooLarge { line: usize, value: usize },
    #[error("line {line}: malformed DIMACS CNF header: {header}")]
    InvalidHeader { line: usize, header: String },
    #[error("line {line}: last clause is missing its terminating 0")]
    UnterminatedClause { line: usize },
    #[error("header announced {header_var_count} variables but the formula has {var_count}")]
    VarCount {
        var_count: usize,
        header_var_count: usize,
    },
    #[error("header announced {header_clause_count} clauses but the formula has {clause_count}")]
    ClauseCount {
        clause_count: usize,
        header_clause_count: usize,
    },
    #[error("parser reused after it already failed")]
    PreviousError,
}

/// The counts announced by a `p cnf` header line.
#[derive(Copy, Clone, Debug)]
pub struct DimacsHeader {
    pub var_count: usize,
    pub clause_count: usize,
}

/// Parser for DIMACS CNF files.
///
/// The input can be consumed in chunks and the parsed formula can be taken out in chunks, so
/// arbitrarily large files can be processed in constant memory.
///
/// A `p cnf` header line is optional. When present, the declared counts are checked against the
/// parsed formula by [`check_header`](DimacsParser::check_header).
pub struct DimacsParser {
    formula: CnfFormula,
    partial_clause: Vec<Lit>,
    header: Option<DimacsHeader>,

    line_number: usize,
    clause_count: usize,
    partial_lit: usize,
    negate_next_lit: bool,

    in_lit: bool,
    in_comment: bool,
    in_header: bool,
    at_line_start: bool,
    error: bool,

    header_line: Vec<u8>,
}

impl Default for DimacsParser {
    fn default() -> DimacsParser {
        DimacsParser::new()
    }
}

impl DimacsParser {
    /// Create a parser ready for the first chunk of input.
    pub fn new() -> DimacsParser {
        DimacsParser {
            formula: CnfFormula::new(),
            partial_clause: vec![],
            header: None,

            line_number: 1,
            clause_count: 0,
            partial_lit: 0,
            negate_next_lit: false,

            in_lit: false,
            in_comment: false,
            in_header: false,
            at_line_start: true,
            error: false,

            header_line: vec![],
        }
    }

    /// Parse a complete input into one [`CnfFormula`](cedarsat_formula::CnfFormula), validating
    /// the header counts when a header is present.
    ///
    /// Use [`parse_incremental`](DimacsParser::parse_incremental) or
    /// [`parse_chunk`](DimacsParser::parse_chunk) to process the input in chunks instead.
    pub fn parse(input: impl io::Read) -> Result<CnfFormula, Error> {
        Ok(Self::parse_incremental(input, |_| Ok(()))?.take_formula())
    }

    /// Parse a complete input, handing the parser to the callback after every chunk.
    ///
    /// The callback can drain the clauses parsed so far with
    /// [`take_formula`](DimacsParser::take_formula), which keeps the memory usage independent of
    /// the input size. Header counts are validated at the end when a header is present.
    pub fn parse_incremental(
        input: impl io::Read,
        mut callback: impl FnMut(&mut DimacsParser) -> Result<(), Error>,
    ) -> Result<DimacsParser, Error> {
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
        parser.check_header()?;

        Ok(parser)
    }

    /// Feed the next chunk of input to the parser.
    ///
    /// Chunks may split the input anywhere, even inside a literal. Call
    /// [`eof`](DimacsParser::eof) once the input is exhausted. A returned error is fatal for
    /// this parser instance; later calls report [`ParserError::PreviousError`].
    pub fn parse_chunk(&mut self, chunk: &[u8]) -> Result<(), ParserError> {
        if self.error {
            return Err(ParserError::PreviousError);
        }
        for &byte in chunk.iter() {
            if byte == b'\n' {
                self.line_number += 1;
            }
            match byte {
                b'\n' | b'\r' if self.in_comment || self.in_header => {
                    if self.in_header {
                        self.in_header = false;
                        self.parse_header_line()?;
                    }
                    self.in_comment = false;
                    self.at_line_start = true;
                }
                _ if self.in_comment => (),
                _ if self.in_header => {
                    self.header_line.push(byte);
                }
                b'0'..=b'9' => {
                    self.in_lit = true;
                    self.partial_lit = self.partial_lit * 10 + (byte - b'0') as usize;

                    if self.partial_lit > Var::max_count() {
                        self.error = true;
                        return Err(ParserError::LiteralTooLarge {
                            line: self.line_number,
                            value: self.partial_lit,
                        });
                    }

                    self.at_line_start = false;
                }
                b'-' if !self.negate_next_lit && !self.in_lit => {
                    self.negate_next_lit = true;
                    self.at_line_start = false;
                }
                b' ' | b'\t' | b'\n' | b'\r' if self.in_lit || !self.negate_next_lit => {
                    self.finish_literal();
                    self.at_line_start = byte == b'\n' || byte == b'\r';
                }
                b'c' if self.at_line_start => {
                    self.in_comment = true;
                }
                b'p' if self.at_line_start && self.header.is_none() => {
                    self.in_header = true;
                    self.header_line.push(b'p');
                }
                _ => {
                    self.error = true;
                    return Err(ParserError::UnexpectedInput {
                        line: self.line_number,
                        unexpected: byte as char,
                    });
                }
            }
        }

        Ok(())
    }

    /// Tell the parser the input has ended.
    ///
    /// Flushes a literal that ended with the input and rejects a dangling unterminated clause.
    /// Header count validation is separate, see [`check_header`](DimacsParser::check_header).
    pub fn eof(&mut self) -> Result<(), ParserError> {
        if self.in_header {
            self.in_header = false;
            self.parse_header_line()?;
        }

        self.finish_literal();

        if !self.partial_clause.is_empty() {
            return Err(ParserError::UnterminatedClause {
                line: self.line_number,
            });
        }

        Ok(())
    }

    /// Compare the parsed formula against the header counts, if the input had a header.
    pub fn check_header(&self) -> Result<(), ParserError> {
        if let Some(header) = self.header {
            let var_count = self.formula.var_count();
            if var_count != header.var_count {
                return Err(ParserError::VarCount {
                    var_count,
                    header_var_count: header.var_count,
                });
            }

            if self.clause_count != header.clause_count {
                return Err(ParserError::ClauseCount {
                    clause_count: self.clause_count,
                    header_clause_count: header.clause_count,
                });
            }
        }

        Ok(())
    }

    /// Take the clauses parsed since the previous call, leaving the parser ready for more.
    ///
    /// Called once after [`eof`](DimacsParser::eof) this yields the whole formula; called after
    /// every [`parse_chunk`](DimacsParser::parse_chunk) it drains the formula piecewise. The
    /// returned formula always carries the full variable count seen so far, including a header
    /// declaration if there was one.
    pub fn take_formula(&mut self) -> CnfFormula {
        let mut new_formula = CnfFormula::new();
        new_formula.set_var_count(self.formula.var_count());
        replace(&mut self.formula, new_formula)
    }

    /// The header counts, when the input declared them.
    pub fn header(&self) -> Option<DimacsHeader> {
        self.header
    }

    /// Total number of clauses parsed so far.
    pub fn clause_count(&self) -> usize {
        self.clause_count
    }

    /// Number of variables seen so far, including a header declaration.
    pub fn var_count(&self) -> usize {
        self.formula.var_count()
    }

    fn finish_literal(&mut self) {
        if self.in_lit {
            if self.partial_lit == 0 {
                self.formula.add_clause(self.partial_clause.iter());
                self.partial_clause.clear();
                self.clause_count += 1;
            } else {
                let number = self.partial_lit as isize;
                self.partial_clause.push(Lit::from_dimacs(if self.negate_next_lit {
                    -number
                } else {
                    number
                }));
            }
        }
        self.in_lit = false;
        self.negate_next_lit = false;
        self.partial_lit = 0;
    }

    fn parse_header_line(&mut self) -> Result<(), ParserError> {
        let header_line = String::from_utf8_lossy(&self.header_line).into_owned();

        let mut tokens = header_line.split_whitespace();

        if tokens.next() != Some("p") || tokens.next() != Some("cnf") {
            return self.invalid_header(header_line);
        }

        let var_count: usize = match tokens.next().and_then(|token| token.parse().ok()) {
            Some(value) => value,
            None => return self.invalid_header(header_line),
        };

        if var_count > Var::max_count() {
            self.error = true;
            return Err(ParserError::LiteralTooLarge {
                line: self.line_number,
                value: var_count,
            });
        }

        let clause_count: usize = match tokens.next().and_then(|token| token.parse().ok()) {
            Some(value) => value,
            None => return self.invalid_header(header_line),
        };

        if tokens.next().is_some() {
            return self.invalid_header(header_line);
        }

        self.header = Some(DimacsHeader {
            var_count,
            clause_count,
        });

        self.formula.set_var_count(var_count);

        Ok(())
    }

    fn invalid_header(&mut self, header_line: String) -> Result<(), ParserError> {
        self.error = true;
        Err(ParserError::InvalidHeader {
            line: self.line_number,
            header: header_line,
        })
    }
}

/// Write a `p cnf` header line; combine with [`write_dimacs_clauses`] for streamed output.
pub fn write_dimacs_header(target: &mut impl io::Write, header: DimacsHeader) -> io::Result<()> {
    writeln!(
        target,
        "p cnf {var_count} {clause_count}",
        var_count = header.var_count,
        clause_count = header.clause_count
    )
}

/// Write clauses in DIMACS CNF syntax, without a header.
pub fn write_dimacs_clauses(
    target: &mut impl io::Write,
    clauses: impl IntoIterator<Item = impl IntoIterator<Item = impl Borrow<Lit>>>,
) -> io::Result<()> {
    for clause in clauses.into_iter() {
        for lit in clause.into_iter() {
            itoa::write(&mut *target, lit.borrow().to_dimacs())?;
            target.write_all(b" ")?;
        }
        target.write_all(b"0\n")?;
    }
    Ok(())
}

/// Write a whole formula as DIMACS CNF, header included.
pub fn write_dimacs(target: &mut impl io::Write, formula: &CnfFormula) -> io::Result<()> {
    write_dimacs_header(
        &mut *target,
        DimacsHeader {
            var_count: formula.var_count(),
            clause_count: formula.len(),
        },
    )?;
    write_dimacs_clauses(&mut *target, formula.iter())
}

#[cfg(test)]
mod tests {
    use super::*;

    use anyhow::Error;
    use proptest::{test_runner::TestCaseError, *};

    use cedarsat_formula::{cnf::strategy::cnf_formula, cnf_formula};

    #[test]
    fn odd_whitespace() -> Result<(), Error> {
        let parsed = DimacsParser::parse(
            b"p  cnf  4   3  \n  1  \n 2\t3\n0 -4 0 2\nccomment  \n\n0\n\n" as &[_],
        )?;

        let expected = cnf_formula![
            1, 2, 3;
            -4;
            2;
        ];

        assert_eq!(parsed, expected);

        Ok(())
    }

    #[test]
    fn missing_header_is_fine() -> Result<(), Error> {
        let parsed = DimacsParser::parse(b"1 -2 0\n2 3 0\n" as &[_])?;

        let expected = cnf_formula![
            1, -2;
            2, 3;
        ];

        assert_eq!(parsed, expected);

        Ok(())
    }

    macro_rules! expect_error {
        ( $input:expr, $( $cases:tt )* ) => {
            match DimacsParser::parse($input as &[_]) {
                Ok(parsed) => panic!("Expected error but got {:?}", parsed),
                Err(err) => match err.downcast_ref() {
                    Some(casted_err) => match casted_err {
                        $( $cases )*,
                        _ => panic!("Unexpected error {:?}", casted_err),
                    },
                    None => panic!("Unexpected error type {:?}", err),
                }
            }
        };
    }

    #[test]
    fn invalid_headers() {
        expect_error!(b"pcnf 1 3", ParserError::InvalidHeader { .. } => ());
        expect_error!(b"p notcnf 1 3", ParserError::InvalidHeader { .. } => ());
        expect_error!(b"p cnf 1", ParserError::InvalidHeader { .. } => ());
        expect_error!(b"p cnf 1 2 3", ParserError::InvalidHeader { .. } => ());
        expect_error!(b"p cnf foo bar", ParserError::InvalidHeader { .. } => ());
        expect_error!(b"p cnf -3 -6", ParserError::InvalidHeader { .. } => ());

        expect_error!(
            format!("p cnf {} 4", Var::max_var().to_dimacs() + 1).as_bytes(),
            ParserError::LiteralTooLarge { .. } => ()
        );
        DimacsParser::parse(format!("p cnf {} 0", Var::max_var().to_dimacs()).as_bytes()).unwrap();

        expect_error!(
            b"p cnf 1 2\np cnf 1 2\n",
            ParserError::UnexpectedInput { unexpected: 'p', .. } => ()
        );
    }

    #[test]
    fn invalid_header_data() {
        expect_error!(
            b"p cnf 1 1\n 2 0",
            ParserError::VarCount { var_count: 2, header_var_count: 1 } => ()
        );

        expect_error!(
            b"p cnf 10 1\n 1 0 0",
            ParserError::ClauseCount { clause_count: 2, header_clause_count: 1 } => ()
        );

        expect_error!(
            b"p cnf 10 4\n 1 0",
            ParserError::ClauseCount { clause_count: 1, header_clause_count: 4 } => ()
        );
    }

    #[test]
    fn syntax_errors() {
        expect_error!(
            b"1 2 ?foo",
            ParserError::UnexpectedInput { unexpected: '?', .. } => ()
        );

        expect_error!(
            b"1 2 - 3 0",
            ParserError::UnexpectedInput { unexpected: ' ', .. } => ()
        );

        expect_error!(
            b"1 2 -\n3 0",
            ParserError::UnexpectedInput { unexpected: '\n', .. } => ()
        );

        expect_error!(
            b"1 2 --3 0",
            ParserError::UnexpectedInput { unexpected: '-', .. } => ()
        );

        expect_error!(
            b"1 2-3 0",
            ParserError::UnexpectedInput { unexpected: '-', .. } => ()
        );
    }

    #[test]
    fn unterminated_clause() {
        expect_error!(
            b"1 2 3",
            ParserError::UnterminatedClause { .. } => ()
        );
    }

    #[test]
    fn literal_too_large() {
        expect_error!(
            format!("1 {} 2 0", Var::max_var().to_dimacs() + 1).as_bytes(),
            ParserError::LiteralTooLarge { .. } => ()
        );

        assert_eq!(
            DimacsParser::parse(format!("1 {} 2 0", Var::max_var().to_dimacs()).as_bytes())
                .unwrap(),
            cnf_formula![
                1, Var::max_var().to_dimacs(), 2;
            ]
        );
    }

    proptest! {

        #[test]
        fn roundtrip(input in cnf_formula(1..100usize, 0..1000, 0..10)) {
            let mut buf = vec![];

            write_dimacs(&mut buf, &input)?;

            let parsed = DimacsParser::parse(&buf[..]).map_err(|e| TestCaseError::fail(e.to_string()))?;

            prop_assert_eq!(parsed, input);
        }
    }
}
