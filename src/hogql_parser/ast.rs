use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// A literal value carried by a [`Expr::Constant`] node.
///
/// The temporal and UUID variants never come out of the parser; they are built by
/// callers (the events query binds timestamps this way) and rendered by the escaper.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
    List(Vec<ConstantValue>),
    Tuple(Vec<ConstantValue>),
    Uuid(Uuid),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

impl From<&str> for ConstantValue {
    fn from(value: &str) -> Self {
        ConstantValue::String(value.to_string())
    }
}

impl From<String> for ConstantValue {
    fn from(value: String) -> Self {
        ConstantValue::String(value)
    }
}

impl From<i64> for ConstantValue {
    fn from(value: i64) -> Self {
        ConstantValue::Integer(value)
    }
}

impl From<f64> for ConstantValue {
    fn from(value: f64) -> Self {
        ConstantValue::Float(value)
    }
}

impl From<bool> for ConstantValue {
    fn from(value: bool) -> Self {
        ConstantValue::Boolean(value)
    }
}

impl From<DateTime<Utc>> for ConstantValue {
    fn from(value: DateTime<Utc>) -> Self {
        ConstantValue::DateTime(value)
    }
}

impl From<Vec<String>> for ConstantValue {
    fn from(values: Vec<String>) -> Self {
        ConstantValue::List(values.into_iter().map(ConstantValue::String).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mult,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    In,
    NotIn,
    Like,
    ILike,
}

impl BinaryOperator {
    /// Arithmetic operators are printed as calls rather than infix.
    pub fn function_name(&self) -> Option<&'static str> {
        match self {
            BinaryOperator::Add => Some("plus"),
            BinaryOperator::Sub => Some("minus"),
            BinaryOperator::Mult => Some("multiply"),
            BinaryOperator::Div => Some("divide"),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mult => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Mod => "%",
            BinaryOperator::Eq => "=",
            BinaryOperator::NotEq => "!=",
            BinaryOperator::Lt => "<",
            BinaryOperator::LtE => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::GtE => ">=",
            BinaryOperator::In => "IN",
            BinaryOperator::NotIn => "NOT IN",
            BinaryOperator::Like => "LIKE",
            BinaryOperator::ILike => "ILIKE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderExpr {
    pub expr: Expr,
    pub order: OrderDirection,
}

impl OrderExpr {
    pub fn new(expr: Expr, order: OrderDirection) -> Self {
        OrderExpr { expr, order }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinExpr {
    pub table: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectQuery {
    pub select: Vec<Expr>,
    pub select_from: Option<JoinExpr>,
    pub where_expr: Option<Box<Expr>>,
    pub group_by: Option<Vec<Expr>>,
    pub having: Option<Box<Expr>>,
    pub order_by: Option<Vec<OrderExpr>>,
    pub limit: Option<Box<Expr>>,
    pub offset: Option<Box<Expr>>,
}

/// HogQL expression tree. Nodes own their children; trees are never shared.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Constant(ConstantValue),
    /// Attribute/subscript access chain, e.g. `person.properties.email`.
    Field(Vec<String>),
    BinaryOperation {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    UnaryOperation {
        op: UnaryOperator,
        operand: Box<Expr>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Alias {
        alias: String,
        expr: Box<Expr>,
    },
    /// `{name}` in a template, replaced before rendering.
    Placeholder(String),
    Select(Box<SelectQuery>),
}

impl Expr {
    pub fn constant(value: impl Into<ConstantValue>) -> Self {
        Expr::Constant(value.into())
    }

    pub fn field(chain: &[&str]) -> Self {
        Expr::Field(chain.iter().map(|s| s.to_string()).collect())
    }

    pub fn call(name: &str, args: Vec<Expr>) -> Self {
        Expr::Call {
            name: name.to_string(),
            args,
        }
    }

    pub fn binary(op: BinaryOperator, left: Expr, right: Expr) -> Self {
        Expr::BinaryOperation {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn not(operand: Expr) -> Self {
        Expr::UnaryOperation {
            op: UnaryOperator::Not,
            operand: Box::new(operand),
        }
    }

    /// The constant this node denotes, folding a unary minus over a number.
    pub fn as_constant(&self) -> Option<ConstantValue> {
        match self {
            Expr::Constant(value) => Some(value.clone()),
            Expr::UnaryOperation {
                op: UnaryOperator::Neg,
                operand,
            } => match operand.as_ref() {
                Expr::Constant(ConstantValue::Integer(i)) => Some(ConstantValue::Integer(-i)),
                Expr::Constant(ConstantValue::Float(f)) => Some(ConstantValue::Float(-f)),
                _ => None,
            },
            _ => None,
        }
    }
}
