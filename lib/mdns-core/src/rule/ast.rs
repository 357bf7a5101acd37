//! Expression tree produced by the rule parser

use std::fmt;

/// Matcher vocabulary accepted in rule expressions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Matcher {
    ClientIP,
    Method,
    Host,
    HostRegexp,
    Path,
    PathRegexp,
    PathPrefix,
    Header,
    Headers,
    HeaderRegexp,
    Query,
    QueryRegexp,
}

impl Matcher {
    /// Every matcher the parser recognizes
    pub const ALL: [Matcher; 12] = [
        Matcher::ClientIP,
        Matcher::Method,
        Matcher::Host,
        Matcher::HostRegexp,
        Matcher::Path,
        Matcher::PathRegexp,
        Matcher::PathPrefix,
        Matcher::Header,
        Matcher::Headers,
        Matcher::HeaderRegexp,
        Matcher::Query,
        Matcher::QueryRegexp,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Matcher::ClientIP => "ClientIP",
            Matcher::Method => "Method",
            Matcher::Host => "Host",
            Matcher::HostRegexp => "HostRegexp",
            Matcher::Path => "Path",
            Matcher::PathRegexp => "PathRegexp",
            Matcher::PathPrefix => "PathPrefix",
            Matcher::Header => "Header",
            Matcher::Headers => "Headers",
            Matcher::HeaderRegexp => "HeaderRegexp",
            Matcher::Query => "Query",
            Matcher::QueryRegexp => "QueryRegexp",
        }
    }

    /// Look up a matcher by its exact, case-sensitive name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|matcher| matcher.as_str() == name)
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boolean combinator joining two sub-rules
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
}

/// Parsed rule expression
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rule {
    /// Two sub-rules joined by `&&` or `||`
    Composite {
        op: Operator,
        negated: bool,
        left: Box<Rule>,
        right: Box<Rule>,
    },
    /// A single matcher call such as ``Host(`a.local`)``
    Clause {
        matcher: Matcher,
        negated: bool,
        args: Vec<String>,
    },
}

impl Rule {
    pub fn clause(matcher: Matcher, args: Vec<String>) -> Self {
        Rule::Clause {
            matcher,
            negated: false,
            args,
        }
    }

    pub fn composite(op: Operator, left: Rule, right: Rule) -> Self {
        Rule::Composite {
            op,
            negated: false,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Toggle the negation flag of this node. Children are left untouched.
    pub fn negate(mut self) -> Self {
        match &mut self {
            Rule::Composite { negated, .. } | Rule::Clause { negated, .. } => {
                *negated = !*negated;
            }
        }
        self
    }

    pub fn is_negated(&self) -> bool {
        match self {
            Rule::Composite { negated, .. } | Rule::Clause { negated, .. } => *negated,
        }
    }
}
