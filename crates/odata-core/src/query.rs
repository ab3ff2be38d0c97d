//! OData v2 system query options.

use std::collections::BTreeMap;

/// Builder for OData v2 query parameters (`$filter`, `$top`, ...).
///
/// Setting an option twice replaces the earlier value, except
/// [`order_by`](Self::order_by), which appends.
///
/// # Example
///
/// ```
/// use odata_core::QueryOptions;
///
/// let params = QueryOptions::new()
///     .filter("Price gt 20.00")
///     .order_by("Name", true)
///     .order_by("CreatedOn", false)
///     .top(5)
///     .build();
///
/// assert_eq!(params["$orderby"], "Name asc,CreatedOn desc");
/// assert_eq!(params["$top"], "5");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    params: BTreeMap<String, String>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Response format, e.g. `json`.
    pub fn format(self, format: &str) -> Self {
        self.param("$format", format)
    }

    pub fn filter(self, filter: &str) -> Self {
        self.param("$filter", filter)
    }

    pub fn select<I, S>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = join(fields);
        self.param("$select", &joined)
    }

    pub fn expand<I, S>(self, navigations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = join(navigations);
        self.param("$expand", &joined)
    }

    /// Append an ordering clause.
    pub fn order_by(mut self, field: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        let clause = format!("{field} {direction}");
        self.params
            .entry("$orderby".to_string())
            .and_modify(|current| {
                current.push(',');
                current.push_str(&clause);
            })
            .or_insert(clause);
        self
    }

    pub fn top(self, n: u32) -> Self {
        self.param("$top", &n.to_string())
    }

    pub fn skip(self, n: u32) -> Self {
        self.param("$skip", &n.to_string())
    }

    /// Ask for the total count (`allpages`) or not (`none`).
    pub fn inline_count(self, all_pages: bool) -> Self {
        self.param("$inlinecount", if all_pages { "allpages" } else { "none" })
    }

    /// Set an arbitrary query parameter, e.g. `sap-client`.
    pub fn param(mut self, key: &str, value: &str) -> Self {
        self.params.insert(key.to_string(), value.to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns the query parameters.
    pub fn build(&self) -> BTreeMap<String, String> {
        self.params.clone()
    }
}

fn join<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| item.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(",")
}
