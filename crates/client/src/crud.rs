//! Generic table operations built at runtime from [`HasuraTable`] metadata.
//!
//! Each `*_document` function is pure and returns the [`Document`] it would
//! send; the matching [`GraphQLClient`] method sends it and decodes the root
//! field into the table's types.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use payroll_graphql_types::aggregate::Statistic;
use payroll_graphql_types::{Aggregate, Column, HasuraTable, MutationResponse};

use crate::client::{GraphQLClient, RawRequest};
use crate::error::{Error, Result};
use crate::subscription::Subscription;

/// A runtime-built operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub operation_name: String,
    pub query: String,
    pub variables: Value,
    /// Field under `data` holding the result.
    pub root_field: String,
}

/// Arguments of a `<table>(where, order_by, limit, offset, distinct_on)`
/// selection.
#[derive(Debug, Clone)]
pub struct SelectArgs<T: HasuraTable> {
    pub filter: Option<T::BoolExp>,
    pub order_by: Vec<T::OrderBy>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub distinct_on: Vec<T::SelectColumn>,
    /// Empty selects every column.
    pub columns: Vec<T::SelectColumn>,
}

impl<T: HasuraTable> Default for SelectArgs<T> {
    fn default() -> Self {
        Self {
            filter: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
            distinct_on: Vec::new(),
            columns: Vec::new(),
        }
    }
}

impl<T: HasuraTable> SelectArgs<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: T::BoolExp) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn order_by(mut self, order_by: T::OrderBy) -> Self {
        self.order_by.push(order_by);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn distinct_on(mut self, columns: Vec<T::SelectColumn>) -> Self {
        self.distinct_on = columns;
        self
    }

    pub fn columns(mut self, columns: Vec<T::SelectColumn>) -> Self {
        self.columns = columns;
        self
    }
}

/// `notes` → `Notes`, `billing_invoice` → `BillingInvoice`.
fn pascal_case(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

fn selection<C: Column>(columns: &[C]) -> String {
    let columns = if columns.is_empty() { C::all() } else { columns };
    columns
        .iter()
        .map(Column::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collects `$name: Type` declarations, `name: $name` arguments and their
/// values. Unset optional arguments are left out of all three.
#[derive(Default)]
struct Args {
    declarations: Vec<String>,
    arguments: Vec<String>,
    variables: Map<String, Value>,
}

impl Args {
    fn push(&mut self, name: &str, ty: &str, value: impl Serialize) -> Result<()> {
        self.push_as(name, name, ty, value)
    }

    fn push_as(&mut self, argument: &str, variable: &str, ty: &str, value: impl Serialize) -> Result<()> {
        self.declarations.push(format!("${variable}: {ty}"));
        self.arguments.push(format!("{argument}: ${variable}"));
        self.variables
            .insert(variable.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    fn declarations(&self) -> String {
        if self.declarations.is_empty() {
            String::new()
        } else {
            format!("({})", self.declarations.join(", "))
        }
    }

    fn arguments(&self) -> String {
        if self.arguments.is_empty() {
            String::new()
        } else {
            format!("({})", self.arguments.join(", "))
        }
    }

    fn into_document(
        self,
        kind: &str,
        operation_name: String,
        root_field: String,
        body: &str,
    ) -> Document {
        let query = format!(
            "{kind} {operation_name}{} {{\n  {root_field}{} {{\n    {body}\n  }}\n}}\n",
            self.declarations(),
            self.arguments(),
        );
        Document {
            operation_name,
            query,
            variables: Value::Object(self.variables),
            root_field,
        }
    }
}

/// `query Select<Table>` over `<table>`.
pub fn select_document<T: HasuraTable>(args: &SelectArgs<T>) -> Result<Document> {
    let mut vars = Args::default();
    if let Some(filter) = &args.filter {
        vars.push_as("where", "where", &T::bool_exp_type(), filter)?;
    }
    if !args.order_by.is_empty() {
        vars.push("order_by", &format!("[{}!]", T::order_by_type()), &args.order_by)?;
    }
    if let Some(limit) = args.limit {
        vars.push("limit", "Int", limit)?;
    }
    if let Some(offset) = args.offset {
        vars.push("offset", "Int", offset)?;
    }
    if !args.distinct_on.is_empty() {
        vars.push(
            "distinct_on",
            &format!("[{}!]", T::select_column_type()),
            &args.distinct_on,
        )?;
    }
    Ok(vars.into_document(
        "query",
        format!("Select{}", pascal_case(T::NAME)),
        T::NAME.to_string(),
        &selection(&args.columns),
    ))
}

/// `query Select<Table>ByPk` over `<table>_by_pk`.
pub fn select_by_pk_document<T: HasuraTable>(
    pk: &T::PkColumns,
    columns: &[T::SelectColumn],
) -> Result<Document> {
    let vars = pk_args::<T>(pk)?;
    Ok(vars.into_document(
        "query",
        format!("Select{}ByPk", pascal_case(T::NAME)),
        format!("{}_by_pk", T::NAME),
        &selection(columns),
    ))
}

/// `query Aggregate<Table>` selecting `count` plus each requested statistic
/// over its columns.
pub fn aggregate_document<T: HasuraTable>(
    filter: Option<&T::BoolExp>,
    statistics: &[(Statistic, Vec<T::SelectColumn>)],
) -> Result<Document> {
    let mut vars = Args::default();
    if let Some(filter) = filter {
        vars.push_as("where", "where", &T::bool_exp_type(), filter)?;
    }
    let mut body = String::from("aggregate {\n      count");
    for (statistic, columns) in statistics {
        if columns.is_empty() {
            return Err(Error::Document(format!(
                "{} needs at least one column",
                statistic.as_str()
            )));
        }
        body.push_str(&format!(
            "\n      {} {{ {} }}",
            statistic.as_str(),
            selection(columns)
        ));
    }
    body.push_str("\n    }");
    Ok(vars.into_document(
        "query",
        format!("Aggregate{}", pascal_case(T::NAME)),
        format!("{}_aggregate", T::NAME),
        &body,
    ))
}

/// `mutation Insert<Table>` over `insert_<table>`.
pub fn insert_document<T: HasuraTable>(
    objects: &[T::InsertInput],
    on_conflict: Option<&T::OnConflict>,
    returning: &[T::SelectColumn],
) -> Result<Document> {
    if objects.is_empty() {
        return Err(Error::InvalidInput(format!(
            "insert into {} needs at least one object",
            T::NAME
        )));
    }
    let mut vars = Args::default();
    vars.push("objects", &format!("[{}!]!", T::insert_input_type()), objects)?;
    if let Some(on_conflict) = on_conflict {
        vars.push("on_conflict", &T::on_conflict_type(), on_conflict)?;
    }
    Ok(vars.into_document(
        "mutation",
        format!("Insert{}", pascal_case(T::NAME)),
        format!("insert_{}", T::NAME),
        &mutation_response_body(returning),
    ))
}

/// `mutation Insert<Table>One` over `insert_<table>_one`.
pub fn insert_one_document<T: HasuraTable>(
    object: &T::InsertInput,
    on_conflict: Option<&T::OnConflict>,
    columns: &[T::SelectColumn],
) -> Result<Document> {
    let mut vars = Args::default();
    vars.push("object", &format!("{}!", T::insert_input_type()), object)?;
    if let Some(on_conflict) = on_conflict {
        vars.push("on_conflict", &T::on_conflict_type(), on_conflict)?;
    }
    Ok(vars.into_document(
        "mutation",
        format!("Insert{}One", pascal_case(T::NAME)),
        format!("insert_{}_one", T::NAME),
        &selection(columns),
    ))
}

/// `mutation Update<Table>` over `update_<table>`. Hasura requires a
/// `where`; pass an empty expression to update every row.
pub fn update_document<T: HasuraTable>(
    filter: &T::BoolExp,
    set: &T::SetInput,
    returning: &[T::SelectColumn],
) -> Result<Document> {
    let mut vars = Args::default();
    vars.push_as("where", "where", &format!("{}!", T::bool_exp_type()), filter)?;
    vars.push_as("_set", "set", &T::set_input_type(), set)?;
    Ok(vars.into_document(
        "mutation",
        format!("Update{}", pascal_case(T::NAME)),
        format!("update_{}", T::NAME),
        &mutation_response_body(returning),
    ))
}

/// `mutation Update<Table>ByPk` over `update_<table>_by_pk`.
pub fn update_by_pk_document<T: HasuraTable>(
    pk: &T::PkColumns,
    set: &T::SetInput,
    columns: &[T::SelectColumn],
) -> Result<Document> {
    let mut vars = Args::default();
    vars.push("pk_columns", &format!("{}!", T::pk_columns_type()), pk)?;
    vars.push_as("_set", "set", &T::set_input_type(), set)?;
    Ok(vars.into_document(
        "mutation",
        format!("Update{}ByPk", pascal_case(T::NAME)),
        format!("update_{}_by_pk", T::NAME),
        &selection(columns),
    ))
}

/// `mutation Delete<Table>` over `delete_<table>`.
pub fn delete_document<T: HasuraTable>(
    filter: &T::BoolExp,
    returning: &[T::SelectColumn],
) -> Result<Document> {
    let mut vars = Args::default();
    vars.push_as("where", "where", &format!("{}!", T::bool_exp_type()), filter)?;
    Ok(vars.into_document(
        "mutation",
        format!("Delete{}", pascal_case(T::NAME)),
        format!("delete_{}", T::NAME),
        &mutation_response_body(returning),
    ))
}

/// `mutation Delete<Table>ByPk` over `delete_<table>_by_pk`.
pub fn delete_by_pk_document<T: HasuraTable>(
    pk: &T::PkColumns,
    columns: &[T::SelectColumn],
) -> Result<Document> {
    let vars = pk_args::<T>(pk)?;
    Ok(vars.into_document(
        "mutation",
        format!("Delete{}ByPk", pascal_case(T::NAME)),
        format!("delete_{}_by_pk", T::NAME),
        &selection(columns),
    ))
}

/// `subscription Stream<Table>` over `<table>_stream`.
pub fn stream_document<T: HasuraTable>(
    batch_size: u32,
    cursor: &T::StreamCursorInput,
    filter: Option<&T::BoolExp>,
    columns: &[T::SelectColumn],
) -> Result<Document> {
    if batch_size == 0 {
        return Err(Error::InvalidInput("batch_size must be positive".into()));
    }
    let mut vars = Args::default();
    vars.push("batch_size", "Int!", batch_size)?;
    vars.push("cursor", &format!("[{}]!", T::stream_cursor_type()), [cursor])?;
    if let Some(filter) = filter {
        vars.push_as("where", "where", &T::bool_exp_type(), filter)?;
    }
    Ok(vars.into_document(
        "subscription",
        format!("Stream{}", pascal_case(T::NAME)),
        format!("{}_stream", T::NAME),
        &selection(columns),
    ))
}

/// One argument per primary-key column, typed from `HasuraTable::PRIMARY_KEY`.
fn pk_args<T: HasuraTable>(pk: &T::PkColumns) -> Result<Args> {
    let Value::Object(values) = serde_json::to_value(pk)? else {
        return Err(Error::InvalidInput(format!(
            "{} primary key did not serialise to an object",
            T::NAME
        )));
    };
    let mut vars = Args::default();
    for (column, ty) in T::PRIMARY_KEY {
        let value = values.get(*column).ok_or_else(|| {
            Error::InvalidInput(format!("{} primary key is missing {column}", T::NAME))
        })?;
        vars.push(column, &format!("{ty}!"), value)?;
    }
    Ok(vars)
}

fn mutation_response_body<C: Column>(returning: &[C]) -> String {
    if returning.is_empty() {
        "affected_rows".to_string()
    } else {
        format!("affected_rows\n    returning {{ {} }}", selection(returning))
    }
}

/// Take `field` out of a `data` object and decode it.
fn take_field<R: DeserializeOwned>(mut data: Value, field: &str) -> Result<R> {
    let value = data
        .get_mut(field)
        .map(Value::take)
        .ok_or(Error::MissingData)?;
    Ok(serde_json::from_value(value)?)
}

impl GraphQLClient {
    /// Send a runtime-built query or mutation; returns its root field.
    pub async fn execute_document<R: DeserializeOwned>(&self, document: &Document) -> Result<R> {
        let data = self
            .execute_raw(
                &document.query,
                Some(&document.operation_name),
                document.variables.clone(),
            )
            .await?;
        take_field(data, &document.root_field)
    }

    pub async fn select<T: HasuraTable>(&self, args: &SelectArgs<T>) -> Result<Vec<T::Row>> {
        self.execute_document(&select_document(args)?).await
    }

    pub async fn select_by_pk<T: HasuraTable>(
        &self,
        pk: &T::PkColumns,
        columns: &[T::SelectColumn],
    ) -> Result<Option<T::Row>> {
        self.execute_document(&select_by_pk_document::<T>(pk, columns)?)
            .await
    }

    pub async fn aggregate<T: HasuraTable>(
        &self,
        filter: Option<&T::BoolExp>,
        statistics: &[(Statistic, Vec<T::SelectColumn>)],
    ) -> Result<Aggregate<T::Row>> {
        self.execute_document(&aggregate_document::<T>(filter, statistics)?)
            .await
    }

    /// Row count matching `filter`.
    pub async fn count<T: HasuraTable>(&self, filter: Option<&T::BoolExp>) -> Result<i64> {
        Ok(self.aggregate::<T>(filter, &[]).await?.count())
    }

    pub async fn insert<T: HasuraTable>(
        &self,
        objects: &[T::InsertInput],
        on_conflict: Option<&T::OnConflict>,
        returning: &[T::SelectColumn],
    ) -> Result<MutationResponse<T::Row>> {
        self.execute_document(&insert_document::<T>(objects, on_conflict, returning)?)
            .await
    }

    /// `None` when `on_conflict` skipped the row.
    pub async fn insert_one<T: HasuraTable>(
        &self,
        object: &T::InsertInput,
        on_conflict: Option<&T::OnConflict>,
        columns: &[T::SelectColumn],
    ) -> Result<Option<T::Row>> {
        self.execute_document(&insert_one_document::<T>(object, on_conflict, columns)?)
            .await
    }

    pub async fn update<T: HasuraTable>(
        &self,
        filter: &T::BoolExp,
        set: &T::SetInput,
        returning: &[T::SelectColumn],
    ) -> Result<MutationResponse<T::Row>> {
        self.execute_document(&update_document::<T>(filter, set, returning)?)
            .await
    }

    pub async fn update_by_pk<T: HasuraTable>(
        &self,
        pk: &T::PkColumns,
        set: &T::SetInput,
        columns: &[T::SelectColumn],
    ) -> Result<Option<T::Row>> {
        self.execute_document(&update_by_pk_document::<T>(pk, set, columns)?)
            .await
    }

    pub async fn delete<T: HasuraTable>(
        &self,
        filter: &T::BoolExp,
        returning: &[T::SelectColumn],
    ) -> Result<MutationResponse<T::Row>> {
        self.execute_document(&delete_document::<T>(filter, returning)?)
            .await
    }

    pub async fn delete_by_pk<T: HasuraTable>(
        &self,
        pk: &T::PkColumns,
        columns: &[T::SelectColumn],
    ) -> Result<Option<T::Row>> {
        self.execute_document(&delete_by_pk_document::<T>(pk, columns)?)
            .await
    }

    /// Stream rows past `cursor` in batches of at most `batch_size`.
    pub async fn stream<T: HasuraTable>(
        &self,
        batch_size: u32,
        cursor: &T::StreamCursorInput,
        filter: Option<&T::BoolExp>,
        columns: &[T::SelectColumn],
    ) -> Result<Subscription<Vec<T::Row>>> {
        let document = stream_document::<T>(batch_size, cursor, filter, columns)?;
        let body = RawRequest {
            query: &document.query,
            operation_name: Some(&document.operation_name),
            variables: &document.variables,
        };
        let root_field = document.root_field.clone();
        self.subscribe_body(
            &body,
            Box::new(move |data| take_field(data, &root_field)),
        )
        .await
    }
}
