// AST (Abstract Syntax Tree) definitions for the PL/I subset

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Declared data attributes after resolving the attribute list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    /// FIXED BINARY(p)
    FixedBinary { precision: Option<u32> },
    /// FIXED DECIMAL(p[,q])
    FixedDecimal {
        precision: Option<u32>,
        scale: Option<u32>,
    },
    /// CHARACTER(n) [VARYING]
    Character { length: u32, varying: bool },
}

impl DataType {
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::FixedBinary { .. } | DataType::FixedDecimal { .. }
        )
    }
}

/// One declared name with its own (possibly empty) dimension list
#[derive(Debug, Clone, PartialEq)]
pub struct DeclItem {
    pub name: String,
    pub dims: Vec<i64>, // Logical extents as written; validated by the layout model
    pub location: SourceLocation,
}

/// A `DCL` statement: one or more names sharing a data type
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub items: Vec<DeclItem>,
    pub data_type: DataType,
    pub location: SourceLocation,
}

/// Arithmetic and string operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Concat, // ||
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
}

/// Relational operators (only valid in conditions)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Built-in functions callable from expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Substr,
    Index,
    Decimal,
    Mod,
}

impl Builtin {
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Substr => "SUBSTR",
            Builtin::Index => "INDEX",
            Builtin::Decimal => "DECIMAL",
            Builtin::Mod => "MOD",
        }
    }
}

/// A (possibly subscripted) variable reference
#[derive(Debug, Clone, PartialEq)]
pub struct VarRef {
    pub name: String,
    pub subscripts: Vec<Expr>,
    pub location: SourceLocation,
}

/// Expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(i64, SourceLocation),
    Text(String, SourceLocation),
    Var(VarRef),
    Unary {
        op: UnOp,
        operand: Box<Expr>,
        location: SourceLocation,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        location: SourceLocation,
    },
    Call {
        builtin: Builtin,
        args: Vec<Expr>,
        location: SourceLocation,
    },
    /// ENDFILE('name'): 1 once a READ on the file hit end of file, else 0
    EndFile {
        file: String,
        location: SourceLocation,
    },
}

impl Expr {
    pub fn location(&self) -> SourceLocation {
        match self {
            Expr::Number(_, loc) | Expr::Text(_, loc) => *loc,
            Expr::Var(var) => var.location,
            Expr::Unary { location, .. }
            | Expr::Binary { location, .. }
            | Expr::Call { location, .. }
            | Expr::EndFile { location, .. } => *location,
        }
    }
}

/// `left op right` as used by IF and DO WHILE
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub left: Expr,
    pub op: RelOp,
    pub right: Expr,
    pub location: SourceLocation,
}

/// One WHEN branch of a SELECT group
#[derive(Debug, Clone, PartialEq)]
pub struct WhenClause {
    pub values: Vec<Expr>,
    pub body: Vec<Stmt>,
    pub location: SourceLocation,
}

/// Direction of an OPEN
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    Input,
    Output,
}

/// Statements
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Assign {
        target: VarRef,
        value: Expr,
        location: SourceLocation,
    },
    If {
        condition: Condition,
        then_branch: Vec<Stmt>,
        else_branch: Vec<Stmt>,
        location: SourceLocation,
    },
    While {
        condition: Condition,
        body: Vec<Stmt>,
        location: SourceLocation,
    },
    /// DO v = start TO end [BY step]
    DoLoop {
        var: VarRef,
        start: Expr,
        end: Expr,
        step: Option<Expr>,
        body: Vec<Stmt>,
        location: SourceLocation,
    },
    Select {
        subject: Expr,
        whens: Vec<WhenClause>,
        other: Option<Vec<Stmt>>,
        location: SourceLocation,
    },
    Put {
        items: Vec<Expr>,
        location: SourceLocation,
    },
    Get {
        targets: Vec<VarRef>,
        location: SourceLocation,
    },
    Open {
        file: String,
        mode: FileMode,
        location: SourceLocation,
    },
    Read {
        file: String,
        target: VarRef,
        location: SourceLocation,
    },
    Write {
        file: String,
        source: VarRef,
        location: SourceLocation,
    },
    Close {
        file: String,
        location: SourceLocation,
    },
    /// EXEC SQL "query" INTO v
    Query {
        sql: String,
        target: VarRef,
        location: SourceLocation,
    },
}

impl Stmt {
    /// Get the source location of this statement
    pub fn location(&self) -> SourceLocation {
        match self {
            Stmt::Assign { location, .. }
            | Stmt::If { location, .. }
            | Stmt::While { location, .. }
            | Stmt::DoLoop { location, .. }
            | Stmt::Select { location, .. }
            | Stmt::Put { location, .. }
            | Stmt::Get { location, .. }
            | Stmt::Open { location, .. }
            | Stmt::Read { location, .. }
            | Stmt::Write { location, .. }
            | Stmt::Close { location, .. }
            | Stmt::Query { location, .. } => *location,
        }
    }
}

/// A whole `name: PROC OPTIONS(MAIN); ... END name;` unit
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub name: String,
    pub declarations: Vec<Declaration>,
    pub statements: Vec<Stmt>,
    pub location: SourceLocation,
}
