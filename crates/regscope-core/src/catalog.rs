//! # Architecture Catalogs
//!
//! Ordered rule tables that map a register name to a group label.
//!
//! A rule either names one register literally or matches a family of names
//! with a regular expression. Patterns always match the *whole* name: the
//! pattern `mm[0-7]` matches `mm3` but not `mm30`.
//!
//! Order matters. The classifier stops at the first matching rule, so more
//! specific rules must come before broader ones. A `.+` rule placed early
//! would swallow every register after it.
//!
//! ## Built-in catalogs
//!
//! | Catalog    | Groups                                                   |
//! |------------|----------------------------------------------------------|
//! | `arm32`    | CPU, FPU, IEEE Single, IEEE Double, Vector               |
//! | `x86`      | CPU, MMX, SSE2, SSE, AVX, AMD3DNow                       |
//! | `generic`  | CPU (everything)                                         |
//!
//! The built-in tables are compiled once and shared.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Label used when no rule matches.
pub const DEFAULT_GROUP: &str = "Other Registers";

/// Failure to compile a catalog rule.
#[derive(Error, Debug)]
pub enum CatalogError
{
    /// The pattern is not a valid regular expression
    #[error("invalid register pattern '{pattern}': {source}")]
    InvalidPattern
    {
        /// Pattern as written in the rule
        pattern: String,
        /// Underlying regex error
        #[source]
        source: regex::Error,
    },
}

/// How a rule recognizes register names.
#[derive(Debug, Clone)]
pub enum Matcher
{
    /// Exact, case-sensitive name
    Literal(String),
    /// Whole-name regular expression
    Pattern(Regex),
}

impl Matcher
{
    /// Compile `pattern` so that it only matches complete names.
    ///
    /// ## Errors
    ///
    /// [`CatalogError::InvalidPattern`] if `pattern` is not a valid regex.
    pub fn pattern(pattern: &str) -> Result<Self, CatalogError>
    {
        Regex::new(&format!("^(?:{pattern})$"))
            .map(Self::Pattern)
            .map_err(|source| CatalogError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    /// Whether `name` satisfies this matcher.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool
    {
        match self {
            Self::Literal(literal) => literal == name,
            Self::Pattern(regex) => regex.is_match(name),
        }
    }
}

/// One rule of a catalog.
#[derive(Debug, Clone)]
pub struct CatalogEntry
{
    matcher: Matcher,
    group: String,
}

impl CatalogEntry
{
    /// Rule matching exactly `name`.
    #[must_use]
    pub fn literal(name: impl Into<String>, group: impl Into<String>) -> Self
    {
        Self {
            matcher: Matcher::Literal(name.into()),
            group: group.into(),
        }
    }

    /// Rule matching every name `pattern` matches in full.
    ///
    /// ## Errors
    ///
    /// [`CatalogError::InvalidPattern`] if `pattern` is not a valid regex.
    pub fn pattern(pattern: &str, group: impl Into<String>) -> Result<Self, CatalogError>
    {
        Ok(Self {
            matcher: Matcher::pattern(pattern)?,
            group: group.into(),
        })
    }

    /// The matcher of this rule.
    #[must_use]
    pub fn matcher(&self) -> &Matcher
    {
        &self.matcher
    }

    /// Group label assigned on a match.
    #[must_use]
    pub fn group(&self) -> &str
    {
        &self.group
    }
}

/// An ordered, immutable set of classification rules.
#[derive(Debug, Clone)]
pub struct Catalog
{
    name: String,
    entries: Vec<CatalogEntry>,
}

impl Catalog
{
    /// Build a catalog from rules in priority order.
    #[must_use]
    pub fn new(name: impl Into<String>, entries: Vec<CatalogEntry>) -> Self
    {
        Self {
            name: name.into(),
            entries,
        }
    }

    /// Catalog name, used in logs.
    #[must_use]
    pub fn name(&self) -> &str
    {
        &self.name
    }

    /// Rules in priority order.
    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry]
    {
        &self.entries
    }

    /// 32-bit ARM register set.
    #[must_use]
    pub fn arm32() -> Arc<Self>
    {
        Arc::clone(&ARM32)
    }

    /// 32-bit x86 register set, including x87, MMX and SSE views.
    #[must_use]
    pub fn x86() -> Arc<Self>
    {
        Arc::clone(&X86)
    }

    /// Single catch-all group for unrecognized architectures.
    #[must_use]
    pub fn generic() -> Arc<Self>
    {
        Arc::clone(&GENERIC)
    }
}

/// Table form of a built-in rule.
enum Rule
{
    Literal(&'static str, &'static str),
    Pattern(&'static str, &'static str),
}

const ARM32_RULES: &[Rule] = &[
    Rule::Literal("sp", "CPU"),
    Rule::Literal("lr", "CPU"),
    Rule::Literal("pc", "CPU"),
    Rule::Literal("cpsr", "CPU"),
    Rule::Pattern("r[0-9]+", "CPU"),
    Rule::Literal("fpscr", "FPU"),
    Rule::Pattern("f[0-9]+", "FPU"),
    Rule::Pattern("s[0-9]+", "IEEE Single"),
    Rule::Pattern("d[0-9]+", "IEEE Double"),
    Rule::Pattern("q[0-9]+", "Vector"),
];

const X86_RULES: &[Rule] = &[
    Rule::Literal("eax", "CPU"),
    Rule::Literal("ecx", "CPU"),
    Rule::Literal("edx", "CPU"),
    Rule::Literal("ebx", "CPU"),
    Rule::Literal("esp", "CPU"),
    Rule::Literal("ebp", "CPU"),
    Rule::Literal("esi", "CPU"),
    Rule::Literal("edi", "CPU"),
    Rule::Literal("eip", "CPU"),
    Rule::Literal("eflags", "CPU"),
    Rule::Literal("cs", "CPU"),
    Rule::Literal("ss", "CPU"),
    Rule::Literal("ds", "CPU"),
    Rule::Literal("es", "CPU"),
    Rule::Literal("fs", "CPU"),
    Rule::Literal("gs", "CPU"),
    // x87 stack; shown with the CPU registers
    Rule::Pattern("st[0-9]+", "CPU"),
    Rule::Literal("fctrl", "CPU"),
    Rule::Literal("fstat", "CPU"),
    Rule::Literal("ftag", "CPU"),
    Rule::Literal("fiseg", "CPU"),
    Rule::Literal("fioff", "CPU"),
    Rule::Literal("foseg", "CPU"),
    Rule::Literal("fooff", "CPU"),
    Rule::Literal("fop", "CPU"),
    Rule::Literal("mxcsr", "CPU"),
    Rule::Literal("orig_eax", "CPU"),
    Rule::Literal("al", "CPU"),
    Rule::Literal("cl", "CPU"),
    Rule::Literal("dl", "CPU"),
    Rule::Literal("bl", "CPU"),
    Rule::Literal("ah", "CPU"),
    Rule::Literal("ch", "CPU"),
    Rule::Literal("dh", "CPU"),
    Rule::Literal("bh", "CPU"),
    Rule::Literal("ax", "CPU"),
    Rule::Literal("cx", "CPU"),
    Rule::Literal("dx", "CPU"),
    Rule::Literal("bx", "CPU"),
    Rule::Literal("bp", "CPU"),
    Rule::Literal("si", "CPU"),
    Rule::Literal("di", "CPU"),
    Rule::Pattern("mm[0-7]", "MMX"),
    Rule::Pattern("xmm[0-7]ih", "SSE2"),
    Rule::Pattern("xmm[0-7]il", "SSE2"),
    Rule::Pattern("xmm[0-7]dh", "SSE2"),
    Rule::Pattern("xmm[0-7]dl", "SSE2"),
    Rule::Pattern("xmm[0-7][0-7]", "SSE"),
    Rule::Pattern("ymm.+", "AVX"),
    Rule::Pattern("mm[0-7][0-7]", "AMD3DNow"),
];

const GENERIC_RULES: &[Rule] = &[Rule::Pattern(".+", "CPU")];

static ARM32: Lazy<Arc<Catalog>> = Lazy::new(|| compile_builtin("arm32", ARM32_RULES));
static X86: Lazy<Arc<Catalog>> = Lazy::new(|| compile_builtin("x86", X86_RULES));
static GENERIC: Lazy<Arc<Catalog>> = Lazy::new(|| compile_builtin("generic", GENERIC_RULES));

fn compile_builtin(name: &str, rules: &[Rule]) -> Arc<Catalog>
{
    let entries = rules
        .iter()
        .map(|rule| match rule {
            Rule::Literal(literal, group) => CatalogEntry::literal(*literal, *group),
            Rule::Pattern(pattern, group) => CatalogEntry::pattern(pattern, *group)
                .unwrap_or_else(|err| panic!("built-in {name} catalog rule is invalid: {err}")),
        })
        .collect();
    Arc::new(Catalog::new(name, entries))
}
