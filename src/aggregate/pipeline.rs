use std::collections::HashMap;

use futures_util::future::BoxFuture;
use serde_json::Value;

use super::{Collection, CollectionSource, Document};
use crate::error::AppError;

/// Row selector, used both for the initial fetch and for in-memory filtering.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq { field: String, value: Value },
    In { field: String, values: Vec<Value> },
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self::Eq {
            field: field.into(),
            value,
        }
    }

    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::Eq { field, value } => values_at(doc, field).iter().any(|v| v == value),
            Filter::In { field, values } => values_at(doc, field)
                .iter()
                .any(|v| values.contains(v)),
        }
    }
}

/// Computed field expressions. Paths are dotted and step through arrays.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Size(String),
    First(String),
    /// False when `value` is `None`.
    Contains { path: String, value: Option<Value> },
}

impl Expr {
    pub fn evaluate(&self, doc: &Document) -> Value {
        match self {
            Expr::Size(path) => Value::from(values_at(doc, path).len() as u64),
            Expr::First(path) => values_at(doc, path).into_iter().next().unwrap_or(Value::Null),
            Expr::Contains { path, value } => Value::Bool(match value {
                Some(value) => values_at(doc, path).iter().any(|v| v == value),
                None => false,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Match(Filter),
    /// Left join: every input row gets `as_field` set to the joined rows, an
    /// empty array when nothing matches. An array-valued `local_field` joins
    /// per element, so the output keeps element order and duplicates.
    Lookup {
        from: Collection,
        local_field: String,
        foreign_field: String,
        as_field: String,
        pipeline: Vec<Stage>,
    },
    Derive { field: String, expr: Expr },
    Project(Vec<String>),
}

impl Stage {
    pub fn matching(field: impl Into<String>, value: Value) -> Self {
        Stage::Match(Filter::eq(field, value))
    }

    pub fn lookup(
        from: Collection,
        local_field: impl Into<String>,
        foreign_field: impl Into<String>,
        as_field: impl Into<String>,
    ) -> Self {
        Stage::Lookup {
            from,
            local_field: local_field.into(),
            foreign_field: foreign_field.into(),
            as_field: as_field.into(),
            pipeline: Vec::new(),
        }
    }

    /// Attaches a sub-plan that runs over the joined rows before they are embedded.
    pub fn with_pipeline(self, stages: Vec<Stage>) -> Self {
        match self {
            Stage::Lookup {
                from,
                local_field,
                foreign_field,
                as_field,
                ..
            } => Stage::Lookup {
                from,
                local_field,
                foreign_field,
                as_field,
                pipeline: stages,
            },
            other => other,
        }
    }

    pub fn derive(field: impl Into<String>, expr: Expr) -> Self {
        Stage::Derive {
            field: field.into(),
            expr,
        }
    }

    pub fn project<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Stage::Project(fields.into_iter().map(Into::into).collect())
    }
}

/// A query plan rooted at one collection. The leading `Match` selects the
/// rows fetched from the source; every later stage runs in memory, except
/// lookups, which issue one batched fetch each.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    pub from: Collection,
    pub stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new(from: Collection, stages: Vec<Stage>) -> Self {
        Self { from, stages }
    }

    pub async fn run(&self, source: &dyn CollectionSource) -> Result<Vec<Document>, AppError> {
        let Some((Stage::Match(filter), rest)) = self.stages.split_first() else {
            return Err(AppError::internal("query plan must start with a match stage"));
        };

        let rows = source
            .fetch(self.from, filter)
            .await?
            .into_iter()
            .map(|doc| ((), doc))
            .collect();

        let rows = apply_stages(source, rows, rest).await?;
        Ok(rows.into_iter().map(|(_, doc)| doc).collect())
    }
}

/// Runs `stages` over tagged rows. The tag rides along untouched, which is
/// how a lookup remembers each joined row's key through its sub-plan.
pub fn apply_stages<'a, T>(
    source: &'a dyn CollectionSource,
    mut rows: Vec<(T, Document)>,
    stages: &'a [Stage],
) -> BoxFuture<'a, Result<Vec<(T, Document)>, AppError>>
where
    T: Send + 'a,
{
    Box::pin(async move {
        for stage in stages {
            rows = match stage {
                Stage::Match(filter) => rows
                    .into_iter()
                    .filter(|(_, doc)| filter.matches(doc))
                    .collect(),
                Stage::Derive { field, expr } => rows
                    .into_iter()
                    .map(|(tag, mut doc)| {
                        let value = expr.evaluate(&doc);
                        doc.insert(field.clone(), value);
                        (tag, doc)
                    })
                    .collect(),
                Stage::Project(fields) => rows
                    .into_iter()
                    .map(|(tag, doc)| (tag, project(doc, fields)))
                    .collect(),
                Stage::Lookup {
                    from,
                    local_field,
                    foreign_field,
                    as_field,
                    pipeline,
                } => {
                    lookup(
                        source,
                        rows,
                        *from,
                        local_field,
                        foreign_field,
                        as_field,
                        pipeline,
                    )
                    .await?
                }
            };
        }
        Ok(rows)
    })
}

async fn lookup<T: Send>(
    source: &dyn CollectionSource,
    rows: Vec<(T, Document)>,
    from: Collection,
    local_field: &str,
    foreign_field: &str,
    as_field: &str,
    pipeline: &[Stage],
) -> Result<Vec<(T, Document)>, AppError> {
    let mut keys: Vec<Value> = Vec::new();
    for (_, doc) in &rows {
        for value in values_at(doc, local_field) {
            if !value.is_null() && !keys.contains(&value) {
                keys.push(value);
            }
        }
    }

    let mut joined: HashMap<String, Vec<Document>> = HashMap::new();
    if !keys.is_empty() {
        let filter = Filter::In {
            field: foreign_field.to_string(),
            values: keys,
        };
        let fetched = source.fetch(from, &filter).await?;

        let mut tagged = Vec::with_capacity(fetched.len());
        for doc in fetched {
            for key in values_at(&doc, foreign_field) {
                tagged.push((join_key(&key), doc.clone()));
            }
        }

        for (key, doc) in apply_stages(source, tagged, pipeline).await? {
            joined.entry(key).or_default().push(doc);
        }
    }

    Ok(rows
        .into_iter()
        .map(|(tag, mut doc)| {
            let matches: Vec<Value> = values_at(&doc, local_field)
                .iter()
                .flat_map(|key| joined.get(&join_key(key)).cloned().unwrap_or_default())
                .map(Value::Object)
                .collect();
            doc.insert(as_field.to_string(), Value::Array(matches));
            (tag, doc)
        })
        .collect())
}

fn project(doc: Document, fields: &[String]) -> Document {
    doc.into_iter()
        .filter(|(key, _)| fields.iter().any(|field| field == key))
        .collect()
}

fn join_key(value: &Value) -> String {
    value.to_string()
}

/// Resolves a dotted path, flattening arrays met along the way.
pub fn values_at(doc: &Document, path: &str) -> Vec<Value> {
    let mut current: Vec<&Value> = Vec::new();
    let mut segments = path.split('.');

    let Some(first) = segments.next() else {
        return Vec::new();
    };
    if let Some(value) = doc.get(first) {
        push_flattened(&mut current, value);
    }

    for segment in segments {
        let mut next = Vec::new();
        for value in current {
            if let Some(inner) = value.as_object().and_then(|obj| obj.get(segment)) {
                push_flattened(&mut next, inner);
            }
        }
        current = next;
    }

    current.into_iter().cloned().collect()
}

fn push_flattened<'v>(out: &mut Vec<&'v Value>, value: &'v Value) {
    match value {
        Value::Array(items) => out.extend(items.iter()),
        other => out.push(other),
    }
}
