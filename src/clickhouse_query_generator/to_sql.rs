use super::aggregation::contains_aggregation;
use super::errors::ClickhouseQueryGeneratorError;
use super::escape::{
    escape_clickhouse_string, escape_identifier, escape_literal, parse_timezone, Dialect,
};
use super::field_resolver::{resolve_field_chain, PropertyResolver, EVENTS_TABLE};
use super::function_registry::{
    adds_timezone, is_reserved_keyword, resolve_aggregation, resolve_function,
};
use crate::hogql_parser::ast::{
    BinaryOperator, ConstantValue, Expr, OrderExpr, SelectQuery, UnaryOperator,
};

/// Rows returned by a top-level SELECT that does not set its own LIMIT.
pub const DEFAULT_RETURNED_ROWS: i64 = 100;

/// Settings appended to every top-level ClickHouse query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HogQLSettings {
    pub readonly: u32,
    pub max_execution_time: u32,
}

impl Default for HogQLSettings {
    fn default() -> Self {
        HogQLSettings {
            readonly: 1,
            max_execution_time: 60,
        }
    }
}

/// Everything the printer needs besides the tree itself.
pub struct PrintContext<'a> {
    pub team_id: i64,
    pub dialect: Dialect,
    pub timezone: Option<String>,
    pub settings: HogQLSettings,
    pub property_resolver: &'a dyn PropertyResolver,
}

impl<'a> PrintContext<'a> {
    pub fn new(team_id: i64, property_resolver: &'a dyn PropertyResolver) -> Self {
        PrintContext {
            team_id,
            dialect: Dialect::ClickHouse,
            timezone: None,
            settings: HogQLSettings::default(),
            property_resolver,
        }
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    pub fn with_settings(mut self, settings: HogQLSettings) -> Self {
        self.settings = settings;
        self
    }

    fn timezone(&self) -> &str {
        self.timezone.as_deref().unwrap_or("UTC")
    }
}

/// Convert an AST node to SQL in the context's dialect
pub trait ToSql {
    fn to_sql(&self, ctx: &PrintContext<'_>) -> Result<String, ClickhouseQueryGeneratorError>;
}

impl ToSql for Expr {
    fn to_sql(&self, ctx: &PrintContext<'_>) -> Result<String, ClickhouseQueryGeneratorError> {
        Printer::new(ctx)?.visit(self)
    }
}

impl ToSql for OrderExpr {
    fn to_sql(&self, ctx: &PrintContext<'_>) -> Result<String, ClickhouseQueryGeneratorError> {
        Printer::new(ctx)?.visit_order(self)
    }
}

impl ToSql for SelectQuery {
    fn to_sql(&self, ctx: &PrintContext<'_>) -> Result<String, ClickhouseQueryGeneratorError> {
        Printer::new(ctx)?.visit_select(self)
    }
}

pub fn print_expr(
    expr: &Expr,
    ctx: &PrintContext<'_>,
) -> Result<String, ClickhouseQueryGeneratorError> {
    expr.to_sql(ctx)
}

pub fn print_select(
    query: &SelectQuery,
    ctx: &PrintContext<'_>,
) -> Result<String, ClickhouseQueryGeneratorError> {
    let sql = query.to_sql(ctx)?;
    log::debug!("printed {:?} query: {}", ctx.dialect, sql);
    Ok(sql)
}

struct Printer<'c, 'a> {
    ctx: &'c PrintContext<'a>,
    /// Name of the aggregation whose arguments are being printed.
    aggregation: Option<String>,
    select_depth: usize,
}

impl<'c, 'a> Printer<'c, 'a> {
    fn new(ctx: &'c PrintContext<'a>) -> Result<Self, ClickhouseQueryGeneratorError> {
        parse_timezone(ctx.timezone())?;
        Ok(Printer {
            ctx,
            aggregation: None,
            select_depth: 0,
        })
    }

    fn visit_all(
        &mut self,
        exprs: &[Expr],
    ) -> Result<Vec<String>, ClickhouseQueryGeneratorError> {
        exprs.iter().map(|e| self.visit(e)).collect()
    }

    fn visit(&mut self, expr: &Expr) -> Result<String, ClickhouseQueryGeneratorError> {
        match expr {
            Expr::Constant(value) => {
                escape_literal(value, self.ctx.dialect, self.ctx.timezone.as_deref())
            }
            Expr::Field(chain) => match self.ctx.dialect {
                Dialect::HogQL => Ok(chain
                    .iter()
                    .map(|segment| escape_identifier(segment, Dialect::HogQL))
                    .collect::<Vec<_>>()
                    .join(".")),
                Dialect::ClickHouse => resolve_field_chain(chain, self.ctx.property_resolver),
            },
            Expr::BinaryOperation {
                op: op @ (BinaryOperator::Eq | BinaryOperator::NotEq),
                left,
                right,
            } if matches!(right.as_ref(), Expr::Constant(ConstantValue::Null)) => {
                let function = if *op == BinaryOperator::Eq {
                    "isNull"
                } else {
                    "isNotNull"
                };
                Ok(format!("{}({})", function, self.visit(left)?))
            }
            Expr::BinaryOperation { op, left, right } => {
                let left = self.visit(left)?;
                let right = self.visit(right)?;
                match op.function_name() {
                    Some(function) => Ok(format!("{}({}, {})", function, left, right)),
                    None => Ok(format!("({} {} {})", left, op.symbol(), right)),
                }
            }
            Expr::UnaryOperation { op, operand } => {
                let operand = self.visit(operand)?;
                match op {
                    UnaryOperator::Neg => Ok(format!("-{}", operand)),
                    UnaryOperator::Not => Ok(format!("not({})", operand)),
                }
            }
            Expr::And(exprs) => self.visit_boolean("and", "true", exprs),
            Expr::Or(exprs) => self.visit_boolean("or", "false", exprs),
            Expr::Call { name, args } => self.visit_call(name, args),
            Expr::Alias { alias, expr } => {
                if is_reserved_keyword(alias) {
                    return Err(ClickhouseQueryGeneratorError::ReservedAlias(alias.clone()));
                }
                Ok(format!(
                    "{} AS {}",
                    self.visit(expr)?,
                    escape_identifier(alias, self.ctx.dialect)
                ))
            }
            Expr::Placeholder(name) => Err(ClickhouseQueryGeneratorError::UnresolvedPlaceholder(
                name.clone(),
            )),
            Expr::Select(query) => Ok(format!("({})", self.visit_select(query)?)),
        }
    }

    fn visit_boolean(
        &mut self,
        function: &str,
        empty: &str,
        exprs: &[Expr],
    ) -> Result<String, ClickhouseQueryGeneratorError> {
        match exprs {
            [] => Ok(empty.to_string()),
            [single] => self.visit(single),
            _ => Ok(format!("{}({})", function, self.visit_all(exprs)?.join(", "))),
        }
    }

    fn visit_call(
        &mut self,
        name: &str,
        args: &[Expr],
    ) -> Result<String, ClickhouseQueryGeneratorError> {
        if let Some(bounds) = resolve_aggregation(name) {
            if let Some(outer) = &self.aggregation {
                return Err(ClickhouseQueryGeneratorError::NestedAggregation {
                    outer: outer.clone(),
                    inner: name.to_string(),
                });
            }
            bounds.validate(name, args.len())?;
            if name == "total" {
                return Ok(match self.ctx.dialect {
                    Dialect::HogQL => "total()".to_string(),
                    Dialect::ClickHouse => "count(*)".to_string(),
                });
            }
            self.aggregation = Some(name.to_string());
            let printed = self.visit_all(args);
            self.aggregation = None;
            return Ok(format!("{}({})", name, printed?.join(", ")));
        }

        let mapping = resolve_function(name)
            .ok_or_else(|| ClickhouseQueryGeneratorError::UnsupportedFunction(name.to_string()))?;
        mapping.arity.validate(name, args.len())?;
        let mut printed = self.visit_all(args)?;
        match self.ctx.dialect {
            Dialect::HogQL => Ok(format!("{}({})", mapping.hogql_name, printed.join(", "))),
            Dialect::ClickHouse => {
                if adds_timezone(name) {
                    printed.push(escape_clickhouse_string(self.ctx.timezone()));
                }
                Ok(format!("{}({})", mapping.clickhouse_name, printed.join(", ")))
            }
        }
    }

    fn visit_order(&mut self, order: &OrderExpr) -> Result<String, ClickhouseQueryGeneratorError> {
        Ok(format!("{} {}", self.visit(&order.expr)?, order.order.as_str()))
    }

    fn visit_select(&mut self, query: &SelectQuery) -> Result<String, ClickhouseQueryGeneratorError> {
        // aggregation scope does not leak into subqueries
        let outer_aggregation = self.aggregation.take();
        self.select_depth += 1;
        let result = self.visit_select_clauses(query);
        self.select_depth -= 1;
        self.aggregation = outer_aggregation;
        result
    }

    fn visit_select_clauses(
        &mut self,
        query: &SelectQuery,
    ) -> Result<String, ClickhouseQueryGeneratorError> {
        let top_level = self.select_depth == 1;
        let clickhouse = self.ctx.dialect == Dialect::ClickHouse;

        if query.select.is_empty() {
            return Err(ClickhouseQueryGeneratorError::EmptySelect);
        }
        let mut clauses = vec![format!("SELECT {}", self.visit_all(&query.select)?.join(", "))];

        let mut from_events = false;
        if let Some(join) = &query.select_from {
            match join.table.as_ref() {
                Expr::Field(chain) if chain.len() == 1 && chain[0] == EVENTS_TABLE => {
                    from_events = true;
                    clauses.push(format!(
                        "FROM {}",
                        escape_identifier(EVENTS_TABLE, self.ctx.dialect)
                    ));
                }
                Expr::Select(subquery) => {
                    clauses.push(format!("FROM ({})", self.visit_select(subquery)?));
                }
                Expr::Field(chain) => {
                    return Err(ClickhouseQueryGeneratorError::UnsupportedTable(chain.join(".")))
                }
                _ => {
                    return Err(ClickhouseQueryGeneratorError::UnsupportedTable(
                        "a non-table expression".to_string(),
                    ))
                }
            }
        }

        if let Some(where_expr) = &query.where_expr {
            if contains_aggregation(where_expr) {
                return Err(ClickhouseQueryGeneratorError::AggregationInWhere(
                    self.visit(where_expr)?,
                ));
            }
        }
        let mut where_sql = query
            .where_expr
            .as_ref()
            .map(|w| self.visit(w))
            .transpose()?;
        if clickhouse && from_events {
            let guard = format!("equals(team_id, {})", self.ctx.team_id);
            where_sql = Some(match where_sql {
                Some(user_where) => format!("and({}, {})", guard, user_where),
                None => guard,
            });
        }
        if let Some(where_sql) = where_sql {
            clauses.push(format!("WHERE {}", where_sql));
        }

        if let Some(group_by) = &query.group_by {
            if !group_by.is_empty() {
                clauses.push(format!("GROUP BY {}", self.visit_all(group_by)?.join(", ")));
            }
        }
        if let Some(having) = &query.having {
            clauses.push(format!("HAVING {}", self.visit(having)?));
        }
        if let Some(order_by) = &query.order_by {
            if !order_by.is_empty() {
                let order_by = order_by
                    .iter()
                    .map(|o| self.visit_order(o))
                    .collect::<Result<Vec<_>, _>>()?;
                clauses.push(format!("ORDER BY {}", order_by.join(", ")));
            }
        }

        match &query.limit {
            Some(limit) => clauses.push(format!("LIMIT {}", self.visit(limit)?)),
            None if clickhouse && top_level => {
                clauses.push(format!("LIMIT {}", DEFAULT_RETURNED_ROWS))
            }
            None => {}
        }
        if let Some(offset) = &query.offset {
            clauses.push(format!("OFFSET {}", self.visit(offset)?));
        }

        if clickhouse && top_level {
            clauses.push(format!(
                "SETTINGS readonly={}, max_execution_time={}",
                self.ctx.settings.readonly, self.ctx.settings.max_execution_time
            ));
        }

        Ok(clauses.join(" "))
    }
}
