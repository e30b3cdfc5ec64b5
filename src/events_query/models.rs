use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Request for a page of events, as sent by the events table UI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsQuery {
    /// Columns to return; each is a HogQL expression, `*` or `person`.
    #[serde(default)]
    pub select: Vec<String>,
    /// Free HogQL filter expressions.
    #[serde(rename = "where", default, skip_serializing_if = "Option::is_none")]
    pub where_exprs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<PropertyFilter>>,
    /// Filters forced by the embedding context (e.g. a person page).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_properties: Option<Vec<PropertyFilter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_id: Option<String>,
    /// Upper time bound: an ISO timestamp or a relative date such as `-1d`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    /// Lower time bound, same formats as `before`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsQueryResponse {
    pub results: Vec<Vec<Value>>,
    pub columns: Vec<String>,
    pub types: Vec<String>,
    pub has_more: bool,
}

/// Which ClickHouse resource class should serve a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Workload {
    #[default]
    Default,
    Online,
    Offline,
}

/// The tenant a query runs for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamContext {
    pub team_id: i64,
    pub timezone: String,
}

impl TeamContext {
    pub fn new(team_id: i64) -> Self {
        TeamContext {
            team_id,
            timezone: "UTC".to_string(),
        }
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyFilterType {
    #[default]
    Event,
    Person,
    /// The key itself is a HogQL expression.
    Hogql,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyOperator {
    #[default]
    Exact,
    IsNot,
    Icontains,
    NotIcontains,
    Regex,
    NotRegex,
    Gt,
    Gte,
    Lt,
    Lte,
    IsSet,
    IsNotSet,
}

impl PropertyOperator {
    /// Operators under which a list value means "none of these" rather than "any of these".
    pub fn is_negative(&self) -> bool {
        matches!(
            self,
            PropertyOperator::IsNot | PropertyOperator::NotIcontains | PropertyOperator::NotRegex
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyFilter {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<PropertyOperator>,
    #[serde(rename = "type", default)]
    pub filter_type: PropertyFilterType,
}

impl PropertyFilter {
    pub fn event(key: impl Into<String>, value: Value, operator: PropertyOperator) -> Self {
        PropertyFilter {
            key: key.into(),
            value: Some(value),
            operator: Some(operator),
            filter_type: PropertyFilterType::Event,
        }
    }

    pub fn person(key: impl Into<String>, value: Value, operator: PropertyOperator) -> Self {
        PropertyFilter {
            filter_type: PropertyFilterType::Person,
            ..PropertyFilter::event(key, value, operator)
        }
    }

    pub fn hogql(expression: impl Into<String>) -> Self {
        PropertyFilter {
            key: expression.into(),
            value: None,
            operator: None,
            filter_type: PropertyFilterType::Hogql,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlMatching {
    #[default]
    Contains,
    Regex,
    Exact,
}

/// One alternative of an action: every condition set on a step must hold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionStep {
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub url_matching: Option<UrlMatching>,
    #[serde(default)]
    pub properties: Vec<PropertyFilter>,
    // Element matching is not expressible in HogQL yet; steps using it are rejected.
    #[serde(default)]
    pub selector: Option<String>,
    #[serde(default)]
    pub tag_name: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// A saved, named event matcher ("action").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub id: i64,
    pub team_id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub steps: Vec<ActionStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: i64,
    pub uuid: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub properties: Option<Value>,
    #[serde(default)]
    pub distinct_ids: Vec<String>,
}

/// A DOM element decoded from an `elements_chain`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub text: Option<String>,
    pub tag_name: Option<String>,
    pub attr_class: Option<Vec<String>>,
    pub href: Option<String>,
    pub attr_id: Option<String>,
    pub nth_child: Option<i64>,
    pub nth_of_type: Option<i64>,
    pub attributes: serde_json::Map<String, Value>,
    pub order: Option<i64>,
}
