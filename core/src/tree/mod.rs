//! Typed program tree.
//!
//! This is the contract with the front-end: a fully type-checked program in
//! which every expression carries its resolved static type and, when the
//! front-end could fold it, its constant value. The compiler treats the tree
//! as read-only ground truth.
//!
//! The tree is plain owned data with serde derives, so a front-end can hand it
//! over in-process or through a JSON/postcard file (see [`crate::api::load_program`]).

pub mod builder;
mod types;
pub mod visit;

use core::fmt;

use serde::{Deserialize, Serialize};

pub use types::{Field, StructType, Type, TypeName};

/// Byte range in the owning file's source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Path of the package that holds the entry function.
    pub root: String,
    pub packages: Vec<Package>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    /// Name used to qualify calls (`storage` in `storage.Put`).
    pub name: String,
    /// Import path; packages are compiled in path order.
    pub path: String,
    #[serde(default)]
    pub files: Vec<File>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
    pub name: String,
    /// Source text, only used to render diagnostics.
    #[serde(default)]
    pub source: Option<String>,
    /// Package-level `var` and `const` specs.
    #[serde(default)]
    pub globals: Vec<VarSpec>,
    #[serde(default)]
    pub funcs: Vec<FuncDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncDecl {
    pub name: String,
    #[serde(default)]
    pub receiver: Option<Param>,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub results: Vec<Type>,
    pub body: Block,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: Type,
}

pub type Block = Vec<Stmt>;

/// `var a, b T = x, y` (or a `const` spec).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarSpec {
    pub names: Vec<String>,
    #[serde(default)]
    pub ty: Option<Type>,
    #[serde(default)]
    pub values: Vec<Expr>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Expr(Expr),
    Assign {
        lhs: Vec<Expr>,
        op: AssignOp,
        rhs: Vec<Expr>,
    },
    Var(VarSpec),
    IncDec {
        target: Expr,
        inc: bool,
    },
    Return(Vec<Expr>),
    If {
        #[serde(default)]
        init: Option<Box<Stmt>>,
        cond: Expr,
        then: Block,
        #[serde(default)]
        otherwise: Option<Box<Stmt>>,
    },
    For {
        #[serde(default)]
        init: Option<Box<Stmt>>,
        #[serde(default)]
        cond: Option<Expr>,
        #[serde(default)]
        post: Option<Box<Stmt>>,
        body: Block,
    },
    Block(Block),
    Break,
    Continue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    /// `=`
    Assign,
    /// `:=`
    Define,
    /// `+=`
    Add,
    /// `-=`
    Sub,
    /// `*=`
    Mul,
    /// `/=`
    Quo,
    /// `%=`
    Rem,
    /// `&=`
    And,
    /// `|=`
    Or,
    /// `^=`
    Xor,
    /// `<<=`
    Shl,
    /// `>>=`
    Shr,
}

impl AssignOp {
    /// The operator applied by a compound assignment.
    pub fn binary_op(self) -> Option<BinaryOp> {
        match self {
            AssignOp::Assign | AssignOp::Define => None,
            AssignOp::Add => Some(BinaryOp::Add),
            AssignOp::Sub => Some(BinaryOp::Sub),
            AssignOp::Mul => Some(BinaryOp::Mul),
            AssignOp::Quo => Some(BinaryOp::Quo),
            AssignOp::Rem => Some(BinaryOp::Rem),
            AssignOp::And => Some(BinaryOp::And),
            AssignOp::Or => Some(BinaryOp::Or),
            AssignOp::Xor => Some(BinaryOp::Xor),
            AssignOp::Shl => Some(BinaryOp::Shl),
            AssignOp::Shr => Some(BinaryOp::Shr),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: Type,
    /// Constant value folded by the front-end, if any.
    #[serde(default)]
    pub value: Option<Constant>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    /// Basic literal; its value is in [`Expr::value`].
    Lit,
    Ident(String),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Call {
        callee: Callee,
        args: Vec<Expr>,
        /// Last argument is spread (`f(xs...)`).
        #[serde(default)]
        spread: bool,
    },
    Selector {
        base: Box<Expr>,
        field: String,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    ArrayLit(Vec<Expr>),
    StructLit(Vec<FieldInit>),
    TypeAssert(Box<Expr>),
    /// Type conversion such as `[]byte("abc")` or `int(b)`.
    Conversion(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInit {
    pub name: String,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Callee {
    /// `f(..)` in the current package, a universe builtin, or `pkg.F(..)`.
    Func {
        #[serde(default)]
        package: Option<String>,
        name: String,
    },
    /// `x.M(..)`: `receiver` is passed as the first argument.
    Method { receiver: Box<Expr>, name: String },
}

impl Callee {
    pub fn name(&self) -> &str {
        match self {
            Callee::Func { name, .. } | Callee::Method { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Quo,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    AndNot,
    LogicalAnd,
    LogicalOr,
    Eq,
    Neq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Neq | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::LogicalAnd | BinaryOp::LogicalOr)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Quo => "/",
            BinaryOp::Rem => "%",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
            BinaryOp::Xor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::AndNot => "&^",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::LogicalOr => "||",
            BinaryOp::Eq => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `+x`
    Plus,
    /// `-x`
    Neg,
    /// `!x`
    Not,
    /// `^x`
    BitNot,
    /// `*p`
    Deref,
    /// `&x`
    Addr,
    /// `<-ch`
    Recv,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnaryOp::Plus => "+",
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "^",
            UnaryOp::Deref => "*",
            UnaryOp::Addr => "&",
            UnaryOp::Recv => "<-",
        };
        f.write_str(s)
    }
}

/// A compile-time constant as folded by the front-end.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Constant {
    Int(i128),
    Bool(bool),
    String(String),
}

impl Constant {
    pub fn as_int(&self) -> Option<i128> {
        match self {
            Constant::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Constant::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(n) => write!(f, "{}", n),
            Constant::Bool(b) => write!(f, "{}", b),
            Constant::String(s) => write!(f, "{:?}", s),
        }
    }
}

impl Program {
    /// Look a package up by import path.
    pub fn package(&self, path: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.path == path)
    }

    /// Packages sorted by import path, the order code is generated in.
    pub fn sorted_packages(&self) -> Vec<&Package> {
        let mut packages: Vec<&Package> = self.packages.iter().collect();
        packages.sort_by(|a, b| a.path.cmp(&b.path));
        packages
    }
}

impl Package {
    /// Package-level specs, in file then declaration order.
    pub fn globals(&self) -> impl Iterator<Item = &VarSpec> {
        self.files.iter().flat_map(|f| f.globals.iter())
    }

    /// Number of package-level names copied into every frame.
    pub fn global_count(&self) -> usize {
        self.globals().map(|spec| spec.names.len()).sum()
    }

    /// Function declarations with the file declaring them, in declaration order.
    pub fn funcs(&self) -> impl Iterator<Item = (&File, &FuncDecl)> {
        self.files
            .iter()
            .flat_map(|file| file.funcs.iter().map(move |decl| (file, decl)))
    }
}

impl Expr {
    pub fn new(kind: ExprKind, ty: Type) -> Self {
        Self {
            kind,
            ty,
            value: None,
            span: Span::default(),
        }
    }

    pub fn with_value(mut self, value: Constant) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// The identifier name, if this expression is a plain identifier.
    pub fn as_ident(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Ident(name) => Some(name),
            _ => None,
        }
    }
}
