//! `//go:build` and legacy `// +build` constraint expressions
//!
//! Grammar: `expr = or; or = and ("||" and)*; and = unary ("&&" unary)*;
//! unary = "!" unary | "(" expr ")" | tag`.

/// Nesting limit for `!` and parentheses
const MAX_DEPTH: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildConstraint {
    Tag(String),
    Not(Box<BuildConstraint>),
    And(Vec<BuildConstraint>),
    Or(Vec<BuildConstraint>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Tag(String),
    Not,
    And,
    Or,
    LParen,
    RParen,
}

impl BuildConstraint {
    /// Parse the expression after `//go:build`. Returns `None` on syntax
    /// errors and on nesting deeper than the parser accepts.
    pub fn parse(expr: &str) -> Option<Self> {
        let tokens = tokenize(expr)?;
        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            depth: 0,
        };
        let parsed = parser.or()?;
        (parser.pos == tokens.len()).then_some(parsed)
    }

    /// Parse the body of one `// +build` line: space-separated options are
    /// OR'ed, comma-separated terms within an option are AND'ed.
    pub fn parse_plus_build(line: &str) -> Option<Self> {
        let options = line
            .split_whitespace()
            .map(|option| {
                option
                    .split(',')
                    .map(|term| {
                        let (negated, tag) = match term.strip_prefix('!') {
                            Some(tag) => (true, tag),
                            None => (false, term),
                        };
                        if tag.is_empty() || !tag.chars().all(is_tag_char) {
                            return None;
                        }
                        let tag = Self::Tag(tag.to_string());
                        Some(if negated { Self::Not(Box::new(tag)) } else { tag })
                    })
                    .collect::<Option<Vec<_>>>()
                    .map(Self::all)
            })
            .collect::<Option<Vec<_>>>()?;
        (!options.is_empty()).then(|| Self::any(options))
    }

    /// Extract and parse the constraint from a Go file header.
    ///
    /// Only comments and blank lines before the package clause are
    /// considered. A `//go:build` line wins; without one, every `// +build`
    /// line must hold. `Ok(None)` means the file carries no constraint.
    pub fn from_source(src: &str) -> Result<Option<Self>, String> {
        let mut plus_build = Vec::new();
        let mut in_block = false;

        for raw in src.lines() {
            let mut line = raw.trim();
            if in_block {
                match line.find("*/") {
                    Some(end) => {
                        in_block = false;
                        line = line[end + 2..].trim_start();
                    }
                    None => continue,
                }
            }
            while let Some(rest) = line.strip_prefix("/*") {
                match rest.find("*/") {
                    Some(end) => line = rest[end + 2..].trim_start(),
                    None => {
                        in_block = true;
                        line = "";
                    }
                }
            }
            if line.is_empty() {
                continue;
            }

            if let Some(expr) = directive(line, "//go:build") {
                return Self::parse(expr)
                    .map(Some)
                    .ok_or_else(|| format!("malformed constraint: {expr}"));
            }
            if let Some(body) = line
                .strip_prefix("//")
                .and_then(|comment| directive(comment.trim_start(), "+build"))
            {
                if !body.is_empty() {
                    let clause = Self::parse_plus_build(body)
                        .ok_or_else(|| format!("malformed +build line: {body}"))?;
                    plus_build.push(clause);
                }
                continue;
            }
            if line.starts_with("//") {
                continue;
            }
            break;
        }

        Ok((!plus_build.is_empty()).then(|| Self::all(plus_build)))
    }

    pub fn eval(&self, satisfied: &dyn Fn(&str) -> bool) -> bool {
        match self {
            Self::Tag(tag) => satisfied(tag),
            Self::Not(inner) => !inner.eval(satisfied),
            Self::And(terms) => terms.iter().all(|t| t.eval(satisfied)),
            Self::Or(terms) => terms.iter().any(|t| t.eval(satisfied)),
        }
    }

    fn all(mut terms: Vec<Self>) -> Self {
        if terms.len() == 1 {
            terms.swap_remove(0)
        } else {
            Self::And(terms)
        }
    }

    fn any(mut terms: Vec<Self>) -> Self {
        if terms.len() == 1 {
            terms.swap_remove(0)
        } else {
            Self::Or(terms)
        }
    }
}

/// Text after `prefix` when `line` is exactly that directive
fn directive<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(prefix)?;
    (rest.is_empty() || rest.starts_with([' ', '\t'])).then(|| rest.trim())
}

fn is_tag_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

fn tokenize(expr: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
            }
            '!' => {
                chars.next();
                tokens.push(Token::Not);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '&' | '|' => {
                chars.next();
                if chars.next() != Some(c) {
                    return None;
                }
                tokens.push(if c == '&' { Token::And } else { Token::Or });
            }
            c if is_tag_char(c) => {
                let mut tag = String::new();
                while let Some(&c) = chars.peek() {
                    if is_tag_char(c) {
                        tag.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Tag(tag));
            }
            _ => return None,
        }
    }
    Some(tokens)
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn or(&mut self) -> Option<BuildConstraint> {
        let mut terms = vec![self.and()?];
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            terms.push(self.and()?);
        }
        Some(BuildConstraint::any(terms))
    }

    fn and(&mut self) -> Option<BuildConstraint> {
        let mut terms = vec![self.unary()?];
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            terms.push(self.unary()?);
        }
        Some(BuildConstraint::all(terms))
    }

    fn unary(&mut self) -> Option<BuildConstraint> {
        let tokens = self.tokens;
        let token = tokens.get(self.pos)?;
        self.pos += 1;
        match token {
            Token::Not => {
                let inner = self.nested(Self::unary)?;
                Some(BuildConstraint::Not(Box::new(inner)))
            }
            Token::LParen => {
                let inner = self.nested(Self::or)?;
                if self.peek() != Some(&Token::RParen) {
                    return None;
                }
                self.pos += 1;
                Some(inner)
            }
            Token::Tag(tag) => Some(BuildConstraint::Tag(tag.clone())),
            _ => None,
        }
    }

    fn nested(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Option<BuildConstraint>,
    ) -> Option<BuildConstraint> {
        if self.depth >= MAX_DEPTH {
            return None;
        }
        self.depth += 1;
        let parsed = parse(self);
        self.depth -= 1;
        parsed
    }
}
